use crate::{
    config::{AlertCfg, ToneCfg},
    drift::AlertLevel,
};
use std::io::{self, Write};
use tracing::{info, warn};

/// One terminal bell per started quarter second of tone.
const BELL_SLICE_MS: u64 = 250;

/// Receives the per-tick classification. Called on every tick the target is
/// armed, so a held condition repeats.
pub trait AlertSink {
    fn alert(&mut self, level: AlertLevel);
}

/// Audible alerts through the terminal bell.
pub struct BellSink<W: Write> {
    out: W,
    short_tone: ToneCfg,
    long_tone: ToneCfg,
    bell: bool,
}

impl BellSink<io::Stderr> {
    pub fn stderr(cfg: &AlertCfg) -> Self {
        Self::new(io::stderr(), cfg)
    }
}

impl<W: Write> BellSink<W> {
    pub fn new(out: W, cfg: &AlertCfg) -> Self {
        Self {
            out,
            short_tone: cfg.short_tone,
            long_tone: cfg.long_tone,
            bell: cfg.bell,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn play(&mut self, tone: ToneCfg) {
        if !self.bell {
            return;
        }
        let bells = bell_count(tone.duration_ms);
        let res = self
            .out
            .write_all(&vec![0x07; bells])
            .and_then(|_| self.out.flush());
        if let Err(err) = res {
            warn!("alert tone failed: {err}");
        }
    }
}

impl<W: Write> AlertSink for BellSink<W> {
    fn alert(&mut self, level: AlertLevel) {
        match level {
            AlertLevel::Nominal => {}
            AlertLevel::Imminent => {
                info!(
                    "target imminent ({} Hz, {} ms)",
                    self.short_tone.frequency_hz, self.short_tone.duration_ms
                );
                self.play(self.short_tone);
            }
            // Long tone only; the short tone is not chained in front of it.
            AlertLevel::Overshot => {
                warn!(
                    "target overshot ({} Hz, {} ms)",
                    self.long_tone.frequency_hz, self.long_tone.duration_ms
                );
                self.play(self.long_tone);
            }
        }
    }
}

fn bell_count(duration_ms: u64) -> usize {
    duration_ms.div_ceil(BELL_SLICE_MS).max(1) as usize
}
