//! Receive loop: one inbound command is fully handled before the next is taken.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::channels::telegram::TelegramBot;
use crate::router::{CommandRouter, InboundCommand};

/// Inbound queue between the long-poll listener and the handler loop.
pub const INBOUND_QUEUE_CAPACITY: usize = 64;

/// Run the bot until the listener stops or `shutdown` fires.
///
/// Shutdown takes priority over queued commands: none is started once it fires.
///
/// `shutdown` should also be the dispatcher's shutdown token: cancelling it
/// while a command is being handled cuts its pending deliveries short, and the
/// command still completes its span and metric lifecycle. It is cancelled on
/// the way out.
pub async fn run_bot(
    bot: Arc<TelegramBot>,
    router: Arc<CommandRouter>,
    shutdown: CancellationToken,
) -> Result<()> {
    let (tx, mut inbound_rx) = mpsc::channel::<InboundCommand>(INBOUND_QUEUE_CAPACITY);
    let listener_bot = Arc::clone(&bot);
    let mut listener = tokio::spawn(async move { listener_bot.listen(tx).await });

    let listener_result = loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                tracing::info!("shutdown requested; stopping receive loop");
                listener.abort();
                break Ok(Ok(()));
            }
            maybe_command = inbound_rx.recv() => {
                let Some(command) = maybe_command else {
                    break (&mut listener).await;
                };
                handle_command(&router, bot.as_ref(), &command).await;
            }
            joined = &mut listener => {
                break joined;
            }
        }
    };
    shutdown.cancel();

    match listener_result {
        Ok(result) => result,
        Err(error) if error.is_cancelled() => Ok(()),
        Err(error) => Err(anyhow::anyhow!("Telegram listener crashed: {error}")),
    }
}

async fn handle_command(router: &CommandRouter, bot: &TelegramBot, command: &InboundCommand) {
    match router.handle(command, bot).await {
        Ok(handled) => tracing::debug!(
            id = %command.id,
            intent = handled.intent.label(),
            replied = handled.reply.is_some(),
            "command handled"
        ),
        Err(error) => tracing::error!(
            id = %command.id,
            error = %error,
            "failed to send reply"
        ),
    }
}
