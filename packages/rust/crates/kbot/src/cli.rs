use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "kbot")]
#[command(about = "Telegram bot with traced outbound dispatch to a remote application.")]
pub(crate) struct Cli {
    /// Optional YAML settings file; environment variables override its values.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Debug-level logs for kbot (ignored when RUST_LOG is set).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    /// Log line format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub(crate) log_format: LogFormat,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Start the bot: long-poll Telegram and answer commands.
    #[command(alias = "kbot")]
    Start,
    /// Print the application version.
    Version,
}
