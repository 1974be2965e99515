use thiserror::Error;

/// Minutes below which an approaching target is reported as imminent.
pub const IMMINENT_MINUTES: f64 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("no sample recorded yet; cannot derive a target frequency")]
    NoSamples,
    #[error("target offset must be a finite number, got {0}")]
    InvalidDelta(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub frequency_hz: f64,
    /// Reading the target was declared against; only used for reference lines.
    pub start_frequency_hz: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertLevel {
    Nominal,
    Imminent,
    Overshot,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlertState {
    pub freq_left_hz: f64,
    /// `f64::INFINITY` when the drift rate is zero and the target is never reached.
    pub time_left_minutes: f64,
    pub level: AlertLevel,
}

impl AlertLevel {
    pub fn classify(time_left_minutes: f64) -> Self {
        if time_left_minutes >= IMMINENT_MINUTES {
            AlertLevel::Nominal
        } else if time_left_minutes >= 0.0 {
            AlertLevel::Imminent
        } else {
            AlertLevel::Overshot
        }
    }
}

/// Minutes until `freq_left_hz` is consumed at `slope_hz_per_min`.
///
/// A zero slope, or any quotient that is not finite, maps to positive infinity.
pub fn time_left_minutes(freq_left_hz: f64, slope_hz_per_min: f64) -> f64 {
    if slope_hz_per_min == 0.0 {
        return f64::INFINITY;
    }
    let minutes = -freq_left_hz / slope_hz_per_min;
    if minutes.is_finite() {
        minutes
    } else {
        f64::INFINITY
    }
}

/// Operator-declared frequency goal. Unarmed until `set_target`, armed for the rest
/// of the process lifetime.
#[derive(Clone, Debug, Default)]
pub struct TargetTracker {
    target: Option<Target>,
}

impl TargetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target(&mut self, current_frequency_hz: f64, delta_hz: f64) -> Result<Target, TrackerError> {
        if !delta_hz.is_finite() {
            return Err(TrackerError::InvalidDelta(delta_hz));
        }
        let target = Target {
            frequency_hz: current_frequency_hz - delta_hz,
            start_frequency_hz: current_frequency_hz,
        };
        self.target = Some(target);
        Ok(target)
    }

    /// Arms against the newest reading, if any.
    pub fn set_target_from(&mut self, latest_frequency_hz: Option<f64>, delta_hz: f64) -> Result<Target, TrackerError> {
        let current = latest_frequency_hz.ok_or(TrackerError::NoSamples)?;
        self.set_target(current, delta_hz)
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.target.is_some()
    }

    pub fn evaluate(&self, latest_frequency_hz: f64, short_slope: f64) -> Option<AlertState> {
        let target = self.target?;
        let freq_left_hz = latest_frequency_hz - target.frequency_hz;
        let time_left_minutes = time_left_minutes(freq_left_hz, short_slope);
        Some(AlertState {
            freq_left_hz,
            time_left_minutes,
            level: AlertLevel::classify(time_left_minutes),
        })
    }
}
