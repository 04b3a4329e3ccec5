use std::collections::VecDeque;

use crate::event::InputEvent;

/// FIFO of input events awaiting the next frame.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        tracing::trace!(?event, "queued input event");
        self.events.push_back(event);
    }

    /// Remove and yield every pending event in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
