//! Events the simulation reports to the presentation layer.
//!
//! Rules push events into an [`EventQueue`] during a tick; the caller drains
//! it once per frame. Nothing is broadcast.

use serde::{Deserialize, Serialize};

use crate::components::ItemId;

/// Something the presentation layer should react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Player health changed; carries the new value
    PlayerHealthChanged { health: i32 },
    /// Player health reached zero. Emitted once per life.
    PlayerDied,
    /// A pickup was taken and removed from the world
    ItemConsumed { item_id: ItemId },
}

/// FIFO of events produced since the last drain
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Take all pending events in emission order
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
