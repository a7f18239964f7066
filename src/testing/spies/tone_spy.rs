use crate::audio::ToneSink;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq)]
pub enum ToneEvent {
    Started,
    Stopped,
    Frequency(f64),
}

pub struct ToneSpyHandle(Arc<Mutex<Vec<ToneEvent>>>);

impl ToneSpyHandle {
    pub fn events(&self) -> Vec<ToneEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ToneEvent::Frequency(hz) => Some(hz),
                _ => None,
            })
            .collect()
    }

    pub fn last(&self) -> Option<ToneEvent> {
        self.0.lock().unwrap().last().cloned()
    }
}

/// Records every call the session makes on its tone sink.
pub struct ToneSpy {
    events: Arc<Mutex<Vec<ToneEvent>>>,
}

impl ToneSpy {
    pub fn new() -> (Self, ToneSpyHandle) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: events.clone(),
            },
            ToneSpyHandle(events),
        )
    }

    fn push(&self, event: ToneEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ToneSink for ToneSpy {
    fn start(&mut self) {
        self.push(ToneEvent::Started);
    }

    fn stop(&mut self) {
        self.push(ToneEvent::Stopped);
    }

    fn set_frequency(&mut self, hz: f64) {
        self.push(ToneEvent::Frequency(hz));
    }
}
