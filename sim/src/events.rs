//! Engine event log.
//!
//! Each engine owns its own log; callers drain it whenever they like. Every
//! event is also emitted through `tracing` when it is recorded.

use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A serialized body could not be rebuilt and was dropped.
    BodySkipped { id: u32, label: String, reason: String },
    /// Composite construction failed and a box stands in for the body.
    PlaceholderBody { label: String, reason: String },
    /// A body was created with a label already in use.
    DuplicateLabel { label: String },
    /// A scripted item could not be applied.
    ScenarioItemSkipped { step: u64, reason: String },
    /// The state was replaced wholesale.
    StateRestored { tick: u64, bodies: usize },
}

#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<EngineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: EngineEvent) {
        match &event {
            EngineEvent::BodySkipped { id, label, reason } => {
                warn!(id, %label, %reason, "body skipped during rehydration");
            }
            EngineEvent::PlaceholderBody { label, reason } => {
                warn!(%label, %reason, "composite construction failed, using placeholder");
            }
            EngineEvent::DuplicateLabel { label } => {
                warn!(%label, "duplicate body label");
            }
            EngineEvent::ScenarioItemSkipped { step, reason } => {
                warn!(step, %reason, "scenario item skipped");
            }
            EngineEvent::StateRestored { tick, bodies } => {
                debug!(tick, bodies, "state restored");
            }
        }
        self.events.push(event);
    }

    /// Take all recorded events, oldest first.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
