//! Frequency counter logger: polls a counter over a serial link, estimates short-
//! and long-window drift, and counts down to an operator-declared target.

pub mod alert;
pub mod config;
pub mod console;
pub mod counter;
pub mod drift;
pub mod monitor;
pub mod render;
pub mod util;

pub use monitor::{run, Control, Monitor, TickReport};
