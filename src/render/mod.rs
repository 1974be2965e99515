//! Per-tick presentation of the drift series: a text status panel and an optional
//! two-panel chart.

pub mod chart;
pub mod console;

use crate::drift::{AlertState, AppendResult, Sample, Target};
use thiserror::Error;

pub use chart::ChartRenderer;
pub use console::ConsoleRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("console write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("chart drawing failed: {0}")]
    Chart(String),
}

/// Everything a renderer may show for one tick.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub samples: &'a [Sample],
    pub short_slopes: &'a [f64],
    pub latest: AppendResult,
    pub target: Option<Target>,
    pub alert: Option<AlertState>,
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), RenderError>;

    /// The series was emptied by the operator.
    fn cleared(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    /// A new target was declared.
    fn armed(&mut self, _target: &Target) -> Result<(), RenderError> {
        Ok(())
    }
}
