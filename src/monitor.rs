use crate::{
    alert::{AlertSink, BellSink},
    config::Config,
    console::Command,
    counter::{CounterReader, Reading, Transport},
    drift::{AlertState, AppendResult, SampleStore, Target, TargetTracker, TrackerError},
    render::{ChartRenderer, ConsoleRenderer, Frame, Renderer},
    util::{next_delay, tick_interval},
};
use anyhow::Result;
use std::future::Future;
use tokio::{
    sync::mpsc,
    time::{sleep_until, Instant},
};
use tracing::{debug, info, warn};

/// Whether the loop keeps going after an operator command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub reading: Reading,
    pub appended: AppendResult,
    pub alert: Option<AlertState>,
}

/// Owns everything a tick touches: the counter link, the series, the target and
/// the output sinks.
pub struct Monitor<T: Transport> {
    reader: CounterReader<T>,
    store: SampleStore,
    tracker: TargetTracker,
    renderers: Vec<Box<dyn Renderer>>,
    alerts: Box<dyn AlertSink>,
}

impl<T: Transport> Monitor<T> {
    pub fn new(reader: CounterReader<T>, alerts: Box<dyn AlertSink>) -> Self {
        Monitor {
            reader,
            store: SampleStore::new(),
            tracker: TargetTracker::new(),
            renderers: Vec::new(),
            alerts,
        }
    }

    /// Console panel, optional chart and terminal bell as configured.
    pub fn from_config(cfg: &Config, transport: T) -> Self {
        let reader = CounterReader::new(transport, &cfg.serial, &cfg.calibration);
        let mut monitor = Self::new(reader, Box::new(BellSink::stderr(&cfg.alert)));
        monitor.add_renderer(Box::new(ConsoleRenderer::stdout()));
        if let Some(chart) = ChartRenderer::from_config(&cfg.chart) {
            info!("drawing chart to {}", chart.path().display());
            monitor.add_renderer(Box::new(chart));
        }
        monitor
    }

    pub fn add_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderers.push(renderer);
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn target(&self) -> Option<&Target> {
        self.tracker.target()
    }

    pub fn reader(&self) -> &CounterReader<T> {
        &self.reader
    }

    /// Folds one reading into the series and evaluates the target. No I/O.
    pub fn step(&mut self, frequency_hz: f64) -> (AppendResult, Option<AlertState>) {
        let appended = self.store.append(frequency_hz);
        let alert = self
            .tracker
            .evaluate(appended.sample.frequency_hz, appended.short_slope);
        (appended, alert)
    }

    /// Read, compute, render, alert.
    pub async fn tick(&mut self) -> TickReport {
        let reading = self.reader.read().await;
        let (appended, alert) = self.step(reading.frequency_hz);
        debug!(
            "sample {} f={:.4} Hz diff={:.4} slope={:.4}",
            appended.sample.index, appended.sample.frequency_hz, appended.short_slope, appended.long_slope
        );

        let frame = Frame {
            samples: self.store.samples(),
            short_slopes: self.store.short_slopes(),
            latest: appended,
            target: self.tracker.target().copied(),
            alert,
        };
        for renderer in self.renderers.iter_mut() {
            if let Err(err) = renderer.render(&frame) {
                warn!("render failed: {err}");
            }
        }
        if let Some(state) = &alert {
            self.alerts.alert(state.level);
        }

        TickReport {
            reading,
            appended,
            alert,
        }
    }

    pub fn handle(&mut self, cmd: Command) -> Result<Control, TrackerError> {
        match cmd {
            Command::Start(delta) => {
                let latest = self.store.latest().map(|s| s.frequency_hz);
                let target = self.tracker.set_target_from(latest, delta)?;
                info!(
                    "target armed at {:.4} Hz ({:+} Hz from {:.4} Hz)",
                    target.frequency_hz, -delta, target.start_frequency_hz
                );
                for renderer in self.renderers.iter_mut() {
                    if let Err(err) = renderer.armed(&target) {
                        warn!("render failed: {err}");
                    }
                }
                Ok(Control::Continue)
            }
            Command::Clear => {
                // Target and long-window slope survive a clear.
                self.store.clear();
                info!("series cleared");
                for renderer in self.renderers.iter_mut() {
                    if let Err(err) = renderer.cleared() {
                        warn!("render failed: {err}");
                    }
                }
                Ok(Control::Continue)
            }
            Command::Exit => Ok(Control::Exit),
        }
    }

    /// Releases the counter link. Consumes the monitor so it happens once.
    pub fn shutdown(mut self) -> CounterReader<T> {
        info!("shutting down after {} samples", self.store.len());
        self.reader.close();
        self.reader
    }
}

/// Drives ticks at the sampling cadence until the operator exits or `shutdown`
/// resolves. Commands are handled between ticks without moving the next deadline.
///
/// `commands` carries raw operator lines; a pending receive never holds up
/// shutdown.
pub async fn run<T, S>(
    mut monitor: Monitor<T>,
    mut commands: mpsc::Receiver<String>,
    shutdown: S,
) -> Result<CounterReader<T>>
where
    T: Transport,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let interval = tick_interval();
    let mut commands_open = true;
    loop {
        let started = Instant::now();
        monitor.tick().await;
        let deadline = Instant::now() + next_delay(interval, started.elapsed());

        loop {
            tokio::select! {
                _ = sleep_until(deadline) => break,
                _ = &mut shutdown => {
                    info!("shutdown signal received");
                    return Ok(monitor.shutdown());
                }
                line = commands.recv(), if commands_open => match line {
                    Some(line) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let cmd = match line.parse::<Command>() {
                            Ok(cmd) => cmd,
                            Err(err) => {
                                warn!("{err}");
                                continue;
                            }
                        };
                        match monitor.handle(cmd) {
                            Ok(Control::Continue) => {}
                            Ok(Control::Exit) => {
                                info!("exit requested");
                                return Ok(monitor.shutdown());
                            }
                            Err(err) => warn!("{cmd:?} ignored: {err}"),
                        }
                    }
                    None => {
                        debug!("command input closed");
                        commands_open = false;
                    }
                },
            }
        }
    }
}
