//! Append-only event storage.
//!
//! Events are kept in the exact order the interpreter produced them. Nothing is
//! sorted or deduplicated; the interpreter is responsible for emitting each
//! track in non-decreasing time, which the sink checks in debug builds.

use std::collections::BTreeMap;

use super::time::Time;
use super::types::{Event, Layer, TrackId};

/// The ordered output of one interpretation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSink {
    events: Vec<Event>,
    last_start: BTreeMap<TrackId, Time>,
}

impl EventSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: Event) {
        let last = self.last_start.entry(event.track).or_insert(Time::ZERO);
        debug_assert!(
            event.time >= *last,
            "track {:?} went back in time: {} after {}",
            event.track,
            event.time,
            last
        );
        *last = event.time;
        self.events.push(event);
    }

    /// All events in emission order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events on one track, in emission order.
    pub fn track(&self, track: TrackId) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(move |e| e.track == track)
    }

    /// Events produced by one layer, in emission order.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(move |e| e.layer == layer)
    }

    /// Total number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event has been emitted.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
