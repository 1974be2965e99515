use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

use anyhow::Context;

#[derive(Clone, Debug, Deserialize)]
pub struct SerialCfg {
    /// Device path or COM port of the counter.
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Per-attempt read timeout (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Query sent to the counter before every read.
    #[serde(default = "default_query")]
    pub query: String,
    /// Pause between writing the query and reading, and between failed attempts.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Read attempts per tick before the reading falls back to zero.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CalibrationCfg {
    /// Subtracted from every reading to keep the plotted numbers short (Hz).
    #[serde(default = "default_zero_freq_hz")]
    pub zero_freq_hz: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct ToneCfg {
    pub frequency_hz: u32,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AlertCfg {
    #[serde(default = "default_short_tone")]
    pub short_tone: ToneCfg,
    #[serde(default = "default_long_tone")]
    pub long_tone: ToneCfg,
    /// Ring the terminal bell in addition to logging.
    #[serde(default = "default_true")]
    pub bell: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChartCfg {
    /// SVG file redrawn every tick; no chart when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_chart_width")]
    pub width: u32,
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialCfg,
    #[serde(default)]
    pub calibration: CalibrationCfg,
    #[serde(default)]
    pub alert: AlertCfg,
    #[serde(default)]
    pub chart: ChartCfg,
}

impl Default for SerialCfg {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            query: default_query(),
            settle_ms: default_settle_ms(),
            attempts: default_attempts(),
        }
    }
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            zero_freq_hz: default_zero_freq_hz(),
        }
    }
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            short_tone: default_short_tone(),
            long_tone: default_long_tone(),
            bell: true,
        }
    }
}

impl Default for ChartCfg {
    fn default() -> Self {
        Self {
            path: None,
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let buf = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse(&buf).with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse(buf: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str::<Config>(buf)?)
}

pub fn ensure_defaults(cfg: &mut Config) {
    if cfg.serial.attempts == 0 {
        tracing::info!("serial.attempts is 0; using a single read attempt per tick");
        cfg.serial.attempts = 1;
    }
    if cfg.serial.query.is_empty() {
        tracing::info!("serial.query is empty; falling back to {:?}", default_query());
        cfg.serial.query = default_query();
    }
    if !cfg.calibration.zero_freq_hz.is_finite() {
        tracing::warn!(
            "calibration.zero_freq_hz {} is not finite; using {}",
            cfg.calibration.zero_freq_hz,
            default_zero_freq_hz()
        );
        cfg.calibration.zero_freq_hz = default_zero_freq_hz();
    }
    if cfg.chart.width == 0 || cfg.chart.height == 0 {
        cfg.chart.width = default_chart_width();
        cfg.chart.height = default_chart_height();
    }
}

fn default_port() -> String {
    if cfg!(windows) {
        "COM4".into()
    } else {
        "/dev/ttyUSB0".into()
    }
}

fn default_baud_rate() -> u32 {
    9_600
}

fn default_timeout_ms() -> u64 {
    1_000
}

fn default_query() -> String {
    "xmt\r".into()
}

fn default_settle_ms() -> u64 {
    100
}

fn default_attempts() -> u32 {
    5
}

fn default_zero_freq_hz() -> f64 {
    5.97e6
}

fn default_short_tone() -> ToneCfg {
    ToneCfg {
        frequency_hz: 2_500,
        duration_ms: 100,
    }
}

fn default_long_tone() -> ToneCfg {
    ToneCfg {
        frequency_hz: 2_500,
        duration_ms: 1_000,
    }
}

fn default_true() -> bool {
    true
}

fn default_chart_width() -> u32 {
    700
}

fn default_chart_height() -> u32 {
    800
}
