//! Append-only log of emitted status events.

use loadwatch_types::{StatusEvent, StatusEventKind};

/// Ordered record of every status event, oldest first.
///
/// Events are only ever appended. Insertion order is detection order,
/// which is also timestamp order because evaluations move forward in
/// time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<StatusEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event.
    pub fn push(&mut self, event: StatusEvent) {
        self.events.push(event);
    }

    /// All events, oldest first.
    pub fn all(&self) -> &[StatusEvent] {
        &self.events
    }

    /// The most recent event.
    pub fn latest(&self) -> Option<&StatusEvent> {
        self.events.last()
    }

    /// Events of one kind, oldest first.
    pub fn of_kind(&self, kind: StatusEventKind) -> impl Iterator<Item = &StatusEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Number of events recorded.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
