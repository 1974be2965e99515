//! Drift estimation over the counter series and the target countdown built on it.

pub mod regression;
pub mod store;
pub mod target;

pub use store::{AppendResult, Sample, SampleStore};
pub use target::{AlertLevel, AlertState, Target, TargetTracker, TrackerError};
