use super::{Frame, RenderError, Renderer};
use crate::drift::Target;
use std::io::{self, Write};

/// Text status panel, one block per tick.
pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        let now = chrono::Local::now();
        let latest = &frame.latest;
        writeln!(self.out, "{}: ", now.format("%H:%M:%S"))?;
        writeln!(self.out, "Last freq Hz: {:.4}", latest.sample.frequency_hz)?;
        writeln!(self.out, "Diff Hz/min: {:.4}", latest.short_slope)?;
        writeln!(self.out, "Slope (last 50 points) Hz/min: {:.4}", latest.long_slope)?;
        if let Some(alert) = &frame.alert {
            writeln!(self.out)?;
            writeln!(self.out, "Freq left [Hz]: {:.2}", alert.freq_left_hz)?;
            writeln!(self.out, "Time left [min]: {:.2}", alert.time_left_minutes)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn cleared(&mut self) -> Result<(), RenderError> {
        writeln!(self.out, "\n======Clear======")?;
        self.out.flush()?;
        Ok(())
    }

    fn armed(&mut self, target: &Target) -> Result<(), RenderError> {
        writeln!(self.out, "\n======Start======")?;
        writeln!(
            self.out,
            "Target {:.4} Hz (from {:.4} Hz)",
            target.frequency_hz, target.start_frequency_hz
        )?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::{AlertLevel, AlertState, AppendResult, Sample};

    fn frame_parts() -> (Vec<Sample>, Vec<f64>, AppendResult) {
        let sample = Sample {
            index: 3,
            elapsed_secs: 15.0,
            frequency_hz: 123.45678,
        };
        let latest = AppendResult {
            sample,
            short_slope: -0.0001,
            long_slope: 0.0,
        };
        (vec![sample], vec![-0.0001], latest)
    }

    #[test]
    fn panel_lists_readings_and_slopes() {
        let (samples, slopes, latest) = frame_parts();
        let mut r = ConsoleRenderer::new(Vec::new());
        r.render(&Frame {
            samples: &samples,
            short_slopes: &slopes,
            latest,
            target: None,
            alert: None,
        })
        .unwrap();
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert!(text.contains("Last freq Hz: 123.4568"));
        assert!(text.contains("Diff Hz/min: -0.0001"));
        assert!(text.contains("Slope (last 50 points) Hz/min: 0.0000"));
        assert!(!text.contains("Time left"));
    }

    #[test]
    fn panel_shows_countdown_when_armed() {
        let (samples, slopes, latest) = frame_parts();
        let mut r = ConsoleRenderer::new(Vec::new());
        r.render(&Frame {
            samples: &samples,
            short_slopes: &slopes,
            latest,
            target: None,
            alert: Some(AlertState {
                freq_left_hz: 50.0,
                time_left_minutes: f64::INFINITY,
                level: AlertLevel::Nominal,
            }),
        })
        .unwrap();
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert!(text.contains("Freq left [Hz]: 50.00"));
        assert!(text.contains("Time left [min]: inf"));
    }

    #[test]
    fn banners_for_operator_commands() {
        let mut r = ConsoleRenderer::new(Vec::new());
        r.cleared().unwrap();
        r.armed(&Target {
            frequency_hz: 900.0,
            start_frequency_hz: 1000.0,
        })
        .unwrap();
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert!(text.contains("======Clear======"));
        assert!(text.contains("======Start======"));
        assert!(text.contains("Target 900.0000 Hz"));
    }
}
