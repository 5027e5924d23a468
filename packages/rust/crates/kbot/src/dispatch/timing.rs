use std::time::Duration;

/// Default upper bound (exclusive) of the timer path's random delay.
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(2_000);
/// Default period of the ticker path.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Delays used by the two delivery paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTiming {
    /// Timer path sleeps a uniform random duration in `[0, max_jitter)`.
    pub max_jitter: Duration,
    /// Ticker path sends on the first tick, one full period after start.
    pub tick_period: Duration,
}

impl Default for DispatchTiming {
    fn default() -> Self {
        Self {
            max_jitter: DEFAULT_MAX_JITTER,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }
}
