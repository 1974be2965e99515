use super::{Frame, RenderError, Renderer};
use crate::{config::ChartCfg, drift::store::SAMPLING_INTERVAL_SECS};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Two stacked panels sharing the time axis: frequency on top, short-window drift
/// below. The SVG file is rewritten on every tick.
pub struct ChartRenderer {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl ChartRenderer {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width: width.max(100),
            height: height.max(100),
        }
    }

    pub fn from_config(cfg: &ChartCfg) -> Option<Self> {
        cfg.path
            .as_ref()
            .map(|path| Self::new(path.clone(), cfg.width, cfg.height))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn draw(&self, frame: &Frame<'_>) -> Result<(), RenderError> {
        let root = SVGBackend::new(&self.path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;
        let (upper, lower) = root.split_vertically((self.height / 2) as i32);

        let x_max = frame
            .samples
            .last()
            .map(|s| s.elapsed_secs)
            .unwrap_or(0.0)
            .max(SAMPLING_INTERVAL_SECS);

        let levels: Vec<f64> = frame
            .target
            .iter()
            .flat_map(|t| [t.start_frequency_hz, t.frequency_hz])
            .collect();
        let (f_lo, f_hi) = padded_range(
            frame
                .samples
                .iter()
                .map(|s| s.frequency_hz)
                .chain(levels.iter().copied()),
        );

        let mut freq = ChartBuilder::on(&upper)
            .margin(10)
            .x_label_area_size(20)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..x_max, f_lo..f_hi)
            .map_err(chart_err)?;
        freq.configure_mesh()
            .y_desc("Freq [Hz]")
            .draw()
            .map_err(chart_err)?;
        freq.draw_series(
            frame
                .samples
                .iter()
                .map(|s| Circle::new((s.elapsed_secs, s.frequency_hz), 2, BLUE.filled())),
        )
        .map_err(chart_err)?;
        for level in levels {
            freq.draw_series(LineSeries::new(vec![(0.0, level), (x_max, level)], &BLUE))
                .map_err(chart_err)?;
        }

        let (d_lo, d_hi) = padded_range(frame.short_slopes.iter().copied());
        let mut diff = ChartBuilder::on(&lower)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..x_max, d_lo..d_hi)
            .map_err(chart_err)?;
        diff.configure_mesh()
            .x_desc("Time [s]")
            .y_desc("Diff [Hz/min]")
            .draw()
            .map_err(chart_err)?;
        diff.draw_series(
            frame
                .samples
                .iter()
                .zip(frame.short_slopes)
                .map(|(s, d)| Circle::new((s.elapsed_secs, *d), 2, RED.filled())),
        )
        .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
        Ok(())
    }
}

impl Renderer for ChartRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        self.draw(frame)
    }
}

fn chart_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Chart(err.to_string())
}

/// Axis range covering every finite value with a 5% margin; never empty.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (-1.0, 1.0);
    }
    let span = hi - lo;
    if span <= f64::EPSILON * lo.abs().max(1.0) {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * 0.05, hi + span * 0.05)
}
