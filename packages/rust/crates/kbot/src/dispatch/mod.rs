//! Dual-path delivery of one payload to the remote application.
//!
//! Each call runs two independent workers against the configured endpoint:
//! - timer path: waits a random jitter in `[0, max_jitter)` then sends `GET <endpoint>`;
//! - ticker path: waits for the first tick of a `tick_period` ticker then sends
//!   `POST <endpoint>/post` with form body `text=<payload>`.
//!
//! Both race a per-call cancellation signal, open their own span under the
//! caller's context, and send at most once. The call returns after both
//! workers have terminated and reports nothing back.

mod path;
mod timing;

use std::sync::Arc;

use rand::Rng as _;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::telemetry::{CommandTracer, TraceContext};

pub use path::{DeliveryError, DeliveryPath, PathOutcome};
pub use timing::DispatchTiming;

use path::DeliveryTarget;

/// Traced, cancellable dual-path dispatcher.
#[derive(Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    endpoint: String,
    tracer: Arc<dyn CommandTracer>,
    timing: DispatchTiming,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        tracer: Arc<dyn CommandTracer>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            tracer,
            timing: DispatchTiming::default(),
            shutdown: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_timing(mut self, timing: DispatchTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Parent token for every per-call cancellation signal.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timing(&self) -> DispatchTiming {
        self.timing
    }

    /// Deliver `payload` on both paths; cancelled only by process shutdown.
    pub async fn dispatch(&self, payload: &str, parent: &TraceContext) {
        let shutdown = self.shutdown.clone();
        self.dispatch_with_cancel(payload, parent, &shutdown).await;
    }

    /// Deliver `payload` on both paths, aborting pending sends once `cancel` fires.
    ///
    /// The per-call signal is a fresh child of `cancel`; it also fires when this
    /// future is dropped, and the worker set aborts whatever is still running.
    pub async fn dispatch_with_cancel(
        &self,
        payload: &str,
        parent: &TraceContext,
        cancel: &CancellationToken,
    ) {
        let signal = cancel.child_token();
        let _cancel_on_drop = signal.clone().drop_guard();

        let target = DeliveryTarget {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            tracer: Arc::clone(&self.tracer),
        };
        let delay = self.draw_jitter();
        tracing::debug!(
            trace_id = %parent.trace_id_hex(),
            jitter_ms = delay.as_millis(),
            tick_ms = self.timing.tick_period.as_millis(),
            "dispatch started"
        );

        let mut workers = JoinSet::new();
        workers.spawn(path::run_timer_path(
            target.clone(),
            *parent,
            delay,
            signal.clone(),
        ));
        workers.spawn(path::run_ticker_path(
            target,
            *parent,
            payload.to_string(),
            self.timing.tick_period,
            signal,
        ));

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((path, outcome)) => tracing::debug!(
                    path = path.as_str(),
                    outcome = outcome.as_str(),
                    "dispatch path finished"
                ),
                Err(error) => tracing::error!(error = %error, "dispatch path crashed"),
            }
        }
    }

    fn draw_jitter(&self) -> std::time::Duration {
        let max_ms = u64::try_from(self.timing.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return std::time::Duration::ZERO;
        }
        std::time::Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
    }
}
