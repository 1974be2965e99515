use super::regression::slope_hz_per_min;

/// Seconds between two consecutive counter readings.
pub const SAMPLING_INTERVAL_SECS: f64 = 5.0;
/// Trailing points used for the near-term drift rate.
pub const SHORT_WINDOW: usize = 5;
/// Trailing points used for the baseline trend.
pub const LONG_WINDOW: usize = 50;
/// Short slope reported until `SHORT_WINDOW` samples exist. Non-zero so it is
/// distinguishable from a flat fit while staying invisible on the chart.
pub const INSUFFICIENT_HISTORY_SLOPE: f64 = -0.0001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub index: u64,
    /// Seconds since the first sample after startup or the last clear.
    pub elapsed_secs: f64,
    pub frequency_hz: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AppendResult {
    pub sample: Sample,
    /// Hz/min over the short window (or the insufficient-history sentinel).
    pub short_slope: f64,
    /// Hz/min over the long window, last computed value.
    pub long_slope: f64,
}

/// Append-only frequency series with sliding-window drift estimates.
#[derive(Clone, Debug, Default)]
pub struct SampleStore {
    samples: Vec<Sample>,
    short_slopes: Vec<f64>,
    long_slope: f64,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, frequency_hz: f64) -> AppendResult {
        let index = self.samples.len() as u64;
        let sample = Sample {
            index,
            elapsed_secs: index as f64 * SAMPLING_INTERVAL_SECS,
            frequency_hz,
        };
        self.samples.push(sample);

        let short_slope = if self.samples.len() < SHORT_WINDOW {
            INSUFFICIENT_HISTORY_SLOPE
        } else {
            slope_hz_per_min(&self.window(SHORT_WINDOW)).unwrap_or(INSUFFICIENT_HISTORY_SLOPE)
        };
        self.short_slopes.push(short_slope);

        // Below the long window the previous trend is kept, including one computed
        // before a clear().
        if self.samples.len() >= LONG_WINDOW {
            if let Some(slope) = slope_hz_per_min(&self.window(LONG_WINDOW)) {
                self.long_slope = slope;
            }
        }

        AppendResult {
            sample,
            short_slope,
            long_slope: self.long_slope,
        }
    }

    /// Drops every sample and short slope. The long slope is left untouched.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.short_slopes.clear();
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn short_slopes(&self) -> &[f64] {
        &self.short_slopes
    }

    pub fn long_slope(&self) -> f64 {
        self.long_slope
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn latest_short_slope(&self) -> Option<f64> {
        self.short_slopes.last().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn window(&self, n: usize) -> Vec<(f64, f64)> {
        let start = self.samples.len().saturating_sub(n);
        self.samples[start..]
            .iter()
            .map(|s| (s.elapsed_secs, s.frequency_hz))
            .collect()
    }
}
