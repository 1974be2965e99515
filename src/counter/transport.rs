use crate::config::SerialCfg;
use std::{
    io::{self, Read, Write},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Longest response accepted before giving up on the terminator.
const MAX_RESPONSE: usize = 128;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("serial port is not open")]
    NotOpen,
    #[error("timed out waiting for the counter")]
    Timeout,
    #[error("response exceeded {0} bytes without a terminator")]
    Overrun(usize),
    #[error("serial i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Byte-level link to the counter.
pub trait Transport {
    fn is_open(&self) -> bool;
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
    /// Reads until `terminator` (included) or the per-read timeout. A timeout
    /// after some bytes arrived returns the partial response.
    fn read_until(&mut self, terminator: u8) -> Result<Vec<u8>, TransportError>;
    /// Releases the underlying device. Further calls report `NotOpen`.
    fn close(&mut self);
}

pub struct SerialTransport {
    name: String,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialTransport {
    /// Opens the configured port. A port that cannot be opened yields a closed
    /// transport so the logger keeps ticking with zero readings.
    pub fn open(cfg: &SerialCfg) -> Self {
        let port = serialport::new(&cfg.port, cfg.baud_rate)
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .open();
        match port {
            Ok(port) => {
                info!("opened {} at {} baud", cfg.port, cfg.baud_rate);
                Self {
                    name: cfg.port.clone(),
                    port: Some(port),
                }
            }
            Err(err) => {
                warn!("unable to open serial port {}: {}", cfg.port, err);
                Self {
                    name: cfg.port.clone(),
                    port: None,
                }
            }
        }
    }
}

impl Transport for SerialTransport {
    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::NotOpen)?;
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }

    fn read_until(&mut self, terminator: u8) -> Result<Vec<u8>, TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::NotOpen)?;
        let mut out = Vec::with_capacity(32);
        let mut byte = [0u8; 1];
        loop {
            match port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    out.push(byte[0]);
                    if byte[0] == terminator {
                        break;
                    }
                    if out.len() >= MAX_RESPONSE {
                        return Err(TransportError::Overrun(MAX_RESPONSE));
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::TimedOut => {
                    if out.is_empty() {
                        return Err(TransportError::Timeout);
                    }
                    break;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(out)
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!("closed serial port {}", self.name);
        } else {
            debug!("serial port {} already closed", self.name);
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.port.is_some() {
            self.close();
        }
    }
}
