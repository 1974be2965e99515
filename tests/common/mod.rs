#![allow(dead_code)]

use freqdrift::{
    alert::AlertSink,
    config::{CalibrationCfg, SerialCfg},
    counter::{CounterReader, Transport, TransportError},
    drift::{AlertLevel, Target},
    render::{Frame, RenderError, Renderer},
    Monitor,
};
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

/// Counter replies for `hz` after calibration, as the instrument formats them.
pub fn mhz_reply(hz: f64) -> Vec<u8> {
    format!("{:.7} MHz\r", (CalibrationCfg::default().zero_freq_hz + hz) / 1.0e6).into_bytes()
}

/// Transport that plays back canned replies; an exhausted script times out.
#[derive(Default)]
pub struct ScriptedCounter {
    pub open: bool,
    pub replies: VecDeque<Result<Vec<u8>, TransportError>>,
    pub queries: usize,
    pub closed: u32,
}

impl ScriptedCounter {
    pub fn with_frequencies(freqs: impl IntoIterator<Item = f64>) -> Self {
        ScriptedCounter {
            open: true,
            replies: freqs.into_iter().map(|f| Ok(mhz_reply(f))).collect(),
            ..Default::default()
        }
    }
}

impl Transport for ScriptedCounter {
    fn is_open(&self) -> bool {
        self.open
    }

    fn write(&mut self, _bytes: &[u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        self.queries += 1;
        Ok(())
    }

    fn read_until(&mut self, _terminator: u8) -> Result<Vec<u8>, TransportError> {
        self.replies.pop_front().unwrap_or(Err(TransportError::Timeout))
    }

    fn close(&mut self) {
        self.open = false;
        self.closed += 1;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Rendered {
        index: u64,
        frequency_hz: f64,
        alert: Option<AlertLevel>,
    },
    Armed(Target),
    Cleared,
}

#[derive(Clone, Default)]
pub struct Events(pub Rc<RefCell<Vec<Event>>>);

impl Events {
    pub fn snapshot(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn renders(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Rendered { .. }))
            .count()
    }
}

pub struct RecordingRenderer(pub Events);

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        self.0 .0.borrow_mut().push(Event::Rendered {
            index: frame.latest.sample.index,
            frequency_hz: frame.latest.sample.frequency_hz,
            alert: frame.alert.map(|a| a.level),
        });
        Ok(())
    }

    fn cleared(&mut self) -> Result<(), RenderError> {
        self.0 .0.borrow_mut().push(Event::Cleared);
        Ok(())
    }

    fn armed(&mut self, target: &Target) -> Result<(), RenderError> {
        self.0 .0.borrow_mut().push(Event::Armed(*target));
        Ok(())
    }
}

/// Renderer that always fails, to show rendering cannot stop the loop.
pub struct BrokenRenderer;

impl Renderer for BrokenRenderer {
    fn render(&mut self, _frame: &Frame<'_>) -> Result<(), RenderError> {
        Err(RenderError::Chart("display unplugged".into()))
    }
}

#[derive(Clone, Default)]
pub struct RecordingSink(pub Rc<RefCell<Vec<AlertLevel>>>);

impl AlertSink for RecordingSink {
    fn alert(&mut self, level: AlertLevel) {
        self.0.borrow_mut().push(level);
    }
}

pub fn monitor(counter: ScriptedCounter) -> (Monitor<ScriptedCounter>, Events, RecordingSink) {
    let serial = SerialCfg {
        settle_ms: 0,
        ..SerialCfg::default()
    };
    let reader = CounterReader::new(counter, &serial, &CalibrationCfg::default());
    let sink = RecordingSink::default();
    let events = Events::default();
    let mut monitor = Monitor::new(reader, Box::new(sink.clone()));
    monitor.add_renderer(Box::new(RecordingRenderer(events.clone())));
    (monitor, events, sink)
}
