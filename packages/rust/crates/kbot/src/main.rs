//! kbot CLI: `start` runs the bot, `version` prints the version.
//!
//! Configuration comes from the environment (`TELE_TOKEN`, `APP_URL`,
//! `METRICS_HOST`, `TRACES_HOST`), optionally layered over `--config <yaml>`.
//!
//! Logging: set `RUST_LOG=kbot=debug` (or `warn`, `info`) to tune logs on stderr.

mod cli;
mod logging;

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use kbot::{
    CommandRouter, Dispatcher, TelegramBot, ValidatedSettings, app_version, init_telemetry,
    load_settings, run_bot,
};

use crate::cli::{Cli, Command};
use crate::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let version = app_version();

    match cli.command {
        Command::Version => {
            println!("{version}");
            Ok(())
        }
        Command::Start => run_start(&cli, &version).await,
    }
}

async fn run_start(cli: &Cli, version: &str) -> anyhow::Result<()> {
    let loaded = match load_settings(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(error) => {
            init_logging(cli.verbose, cli.log_format, None);
            tracing::error!(error = %error, "failed to load kbot settings");
            return Err(error.into());
        }
    };
    let settings = match loaded.settings.validate() {
        Ok(settings) => settings,
        Err(error) => {
            init_logging(cli.verbose, cli.log_format, None);
            loaded.log_ignored();
            tracing::error!(error = %error, "invalid kbot settings");
            return Err(error.into());
        }
    };

    let telemetry = match init_telemetry(&settings, version) {
        Ok(telemetry) => telemetry,
        Err(error) => {
            init_logging(cli.verbose, cli.log_format, None);
            loaded.log_ignored();
            tracing::error!(error = %error, "<initTraces> failed to initialize telemetry");
            return Err(error);
        }
    };
    init_logging(cli.verbose, cli.log_format, Some(telemetry.tracer()));
    loaded.log_ignored();
    tracing::info!(
        traces_exported = telemetry.traces_exported(),
        metrics_exported = telemetry.metrics_exported(),
        "telemetry initialized"
    );

    let bot = Arc::new(build_bot(&settings));
    let identity = match bot.get_me().await {
        Ok(identity) => identity,
        Err(error) => {
            tracing::error!(error = %error, "Please check TELE_TOKEN env variable.");
            telemetry.shutdown();
            return Err(error).context("bot credential check failed");
        }
    };
    tracing::info!(
        version,
        bot = identity.username.as_deref().unwrap_or(identity.first_name.as_str()),
        "kbot started"
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl+C; shutting down");
            signal_token.cancel();
        }
    });

    let dispatcher = Dispatcher::new(
        reqwest::Client::new(),
        settings.app_url.as_str(),
        telemetry.command_tracer(),
    )
    .with_shutdown(shutdown.clone());
    tracing::debug!(
        endpoint = dispatcher.endpoint(),
        max_jitter_ms = dispatcher.timing().max_jitter.as_millis(),
        tick_ms = dispatcher.timing().tick_period.as_millis(),
        "dispatcher configured"
    );
    let router = Arc::new(CommandRouter::new(
        telemetry.command_tracer(),
        telemetry.command_metrics(),
        dispatcher,
        version,
    ));

    let result = run_bot(bot, router, shutdown).await;
    if let Err(error) = &result {
        tracing::error!(error = %error, "kbot stopped with error");
    }
    telemetry.shutdown();
    result
}

fn build_bot(settings: &ValidatedSettings) -> TelegramBot {
    match settings.telegram_api_base_url.clone() {
        Some(api_base_url) => TelegramBot::new_with_base_url(
            settings.telegram_token.clone(),
            api_base_url,
            settings.poll_timeout,
        ),
        None => TelegramBot::new(settings.telegram_token.clone(), settings.poll_timeout),
    }
}
