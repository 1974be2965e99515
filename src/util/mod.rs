use crate::drift::store::SAMPLING_INTERVAL_SECS;
use std::time::Duration;

/// Cadence of the read-compute-render loop.
pub fn tick_interval() -> Duration {
    Duration::from_secs_f64(SAMPLING_INTERVAL_SECS)
}

/// Delay before the next tick given how long the current one took. A tick that
/// overran the interval schedules the next one immediately.
pub fn next_delay(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_shrinks_with_tick_duration() {
        let interval = tick_interval();
        assert_eq!(interval, Duration::from_secs(5));
        assert_eq!(next_delay(interval, Duration::ZERO), interval);
        assert_eq!(
            next_delay(interval, Duration::from_millis(1_200)),
            Duration::from_millis(3_800)
        );
    }

    #[test]
    fn overrun_never_goes_negative() {
        let interval = tick_interval();
        assert_eq!(next_delay(interval, interval), Duration::ZERO);
        assert_eq!(next_delay(interval, Duration::from_secs(60)), Duration::ZERO);
    }
}
