use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::telemetry::{CommandTracer, SpanGuard, TraceContext};

const TIMER_SPAN_NAME: &str = "push_request_start_timer_span";
const TICKER_SPAN_NAME: &str = "push_request_start_ticker_span";

/// Which of the two delivery strategies a worker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPath {
    /// One-shot send after a random delay.
    Timer,
    /// Send on the first tick of a periodic ticker.
    Ticker,
}

impl DeliveryPath {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Ticker => "ticker",
        }
    }

    fn operation_name(self) -> &'static str {
        match self {
            Self::Timer => "push request Timer span",
            Self::Ticker => "push request Ticker span",
        }
    }
}

/// How a worker terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    Sent,
    Failed,
    Cancelled,
}

impl PathOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("error building request: {0}")]
    Build(#[source] reqwest::Error),
    #[error("error doing request: {0}")]
    Execute(#[source] reqwest::Error),
}

/// Shared, cheaply clonable handles a worker needs to send.
#[derive(Clone)]
pub(super) struct DeliveryTarget {
    pub(super) client: reqwest::Client,
    pub(super) endpoint: String,
    pub(super) tracer: Arc<dyn CommandTracer>,
}

impl DeliveryTarget {
    fn open_span(&self, path: DeliveryPath, parent: &TraceContext) -> SpanGuard {
        let span_name = match path {
            DeliveryPath::Timer => TIMER_SPAN_NAME,
            DeliveryPath::Ticker => TICKER_SPAN_NAME,
        };
        let mut span = SpanGuard::open(
            self.tracer.as_ref(),
            span_name,
            Some(parent),
            vec![("dispatch.path", path.as_str().to_string())],
        );
        span.set_operation_name(path.operation_name());
        span
    }

    fn ping_request(&self) -> reqwest::RequestBuilder {
        self.client.get(self.endpoint.as_str())
    }

    fn post_request(&self, payload: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/post", self.endpoint.trim_end_matches('/'));
        self.client.post(url).form(&[("text", payload)])
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        context: &TraceContext,
    ) -> Result<reqwest::StatusCode, DeliveryError> {
        let builder = if context.is_valid() {
            context
                .http_headers()
                .into_iter()
                .fold(builder, |builder, (name, value)| builder.header(name, value))
        } else {
            tracing::debug!("invalid trace context; sending without traceparent");
            builder
        };
        let request = builder.build().map_err(DeliveryError::Build)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(DeliveryError::Execute)?;
        // Body is dropped unread; only the status is of interest.
        Ok(response.status())
    }

    async fn deliver(
        &self,
        path: DeliveryPath,
        span: &mut SpanGuard,
        builder: reqwest::RequestBuilder,
    ) -> PathOutcome {
        let context = span.context();
        match self.send(builder, &context).await {
            Ok(status) => {
                span.set_tag("http.status_code", status.as_u16().to_string());
                tracing::debug!(
                    path = path.as_str(),
                    status = %status,
                    "dispatch request delivered"
                );
                PathOutcome::Sent
            }
            Err(error) => {
                span.set_tag("error", "true");
                tracing::error!(
                    path = path.as_str(),
                    error = %error,
                    "<push_request {}> {error}",
                    path.as_str()
                );
                PathOutcome::Failed
            }
        }
    }
}

fn close_with_outcome(
    mut span: SpanGuard,
    path: DeliveryPath,
    outcome: PathOutcome,
) -> (DeliveryPath, PathOutcome) {
    span.set_tag("dispatch.outcome", outcome.as_str());
    span.finish();
    (path, outcome)
}

pub(super) async fn run_timer_path(
    target: DeliveryTarget,
    parent: TraceContext,
    delay: Duration,
    cancel: CancellationToken,
) -> (DeliveryPath, PathOutcome) {
    let path = DeliveryPath::Timer;
    let mut span = target.open_span(path, &parent);

    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => PathOutcome::Cancelled,
        () = tokio::time::sleep(delay) => {
            target.deliver(path, &mut span, target.ping_request()).await
        }
    };

    close_with_outcome(span, path, outcome)
}

/// Ticker path. Sends on the first tick only; the ticker is dropped afterwards.
pub(super) async fn run_ticker_path(
    target: DeliveryTarget,
    parent: TraceContext,
    payload: String,
    period: Duration,
    cancel: CancellationToken,
) -> (DeliveryPath, PathOutcome) {
    let path = DeliveryPath::Ticker;
    let mut span = target.open_span(path, &parent);

    let period = period.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => PathOutcome::Cancelled,
        _ = ticker.tick() => {
            target
                .deliver(path, &mut span, target.post_request(&payload))
                .await
        }
    };
    drop(ticker);

    close_with_outcome(span, path, outcome)
}
