use super::transport::{Transport, TransportError};
use crate::config::{CalibrationCfg, SerialCfg};
use once_cell::sync::OnceCell;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const UNITS_MARKER: &[u8] = b"MHz";
const RESPONSE_TERMINATOR: u8 = b'\r';
const HZ_PER_MHZ: f64 = 1.0e6;

#[derive(Debug, Error)]
pub enum ReadingError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("response {0:?} has no MHz marker")]
    MissingUnits(String),
    #[error("response {0:?} does not start with a number")]
    BadNumber(String),
}

/// One reading per tick, already calibration-corrected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub frequency_hz: f64,
    pub attempts: u32,
    /// True when every attempt failed and the zero fallback was used.
    pub fallback: bool,
}

/// Polls the counter through a `Transport`, retrying a bounded number of times.
pub struct CounterReader<T: Transport> {
    transport: T,
    query: Vec<u8>,
    settle: Duration,
    attempts: u32,
    zero_freq_hz: f64,
}

impl<T: Transport> CounterReader<T> {
    pub fn new(transport: T, serial: &SerialCfg, calibration: &CalibrationCfg) -> Self {
        CounterReader {
            transport,
            query: serial.query.as_bytes().to_vec(),
            settle: Duration::from_millis(serial.settle_ms),
            attempts: serial.attempts.max(1),
            zero_freq_hz: calibration.zero_freq_hz,
        }
    }

    /// Returns the corrected frequency, or 0.0 when all attempts fail.
    pub async fn read(&mut self) -> Reading {
        if !self.transport.is_open() {
            static WARN_ONCE: OnceCell<()> = OnceCell::new();
            WARN_ONCE.get_or_init(|| {
                warn!("cannot open serial port; readings fall back to zero");
            });
            debug!("cannot open serial port");
            return Reading {
                frequency_hz: 0.0,
                attempts: 0,
                fallback: true,
            };
        }
        for attempt in 1..=self.attempts {
            match self.query_once().await {
                Ok(mhz) => {
                    return Reading {
                        frequency_hz: mhz * HZ_PER_MHZ - self.zero_freq_hz,
                        attempts: attempt,
                        fallback: false,
                    };
                }
                Err(err) => {
                    debug!("counter read attempt {attempt}/{} failed: {err}", self.attempts);
                    if matches!(err, ReadingError::MissingUnits(_) | ReadingError::BadNumber(_)) {
                        self.pause().await;
                    }
                }
            }
        }
        warn!("no valid reading after {} attempts; recording 0", self.attempts);
        Reading {
            frequency_hz: 0.0,
            attempts: self.attempts,
            fallback: true,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Releases the transport. Called once on shutdown.
    pub fn close(&mut self) {
        self.transport.close();
    }

    async fn query_once(&mut self) -> Result<f64, ReadingError> {
        self.transport.write(&self.query)?;
        self.pause().await;
        let response = self.transport.read_until(RESPONSE_TERMINATOR)?;
        parse_response(&response)
    }

    /// Yields to the runtime so commands and signals are still serviced.
    async fn pause(&self) {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
    }
}

/// Extracts the MHz value from a counter response such as `b"5.970012 MHz\r"`.
pub fn parse_response(response: &[u8]) -> Result<f64, ReadingError> {
    let text = || String::from_utf8_lossy(response).into_owned();
    let idx = response
        .windows(UNITS_MARKER.len())
        .position(|w| w == UNITS_MARKER)
        .filter(|idx| *idx > 0)
        .ok_or_else(|| ReadingError::MissingUnits(text()))?;
    std::str::from_utf8(&response[..idx])
        .ok()
        .map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| ReadingError::BadNumber(text()))
}
