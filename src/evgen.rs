//! This module defines how the analysis pulls events from a generator
//!
//! Event generation proper is not our business: we only consume events one at
//! a time through the EventSource trait, be they produced on the fly or read
//! back from a sample file.

use crate::{event::Event, Result};

#[cfg(test)]
use std::collections::VecDeque;

/// Outcome of asking a generator for its next event
#[derive(Clone, Debug, PartialEq)]
pub enum Generated {
    /// A new event was produced
    Event(Event),

    /// Generation of this event failed, but the generator may be retried
    Aborted,

    /// The generator has no more events to provide
    Exhausted,
}

/// Generator of events, consumed by the selection pipeline
pub trait EventSource {
    /// Produce the next event
    ///
    /// Errors are reserved for unrecoverable failures (e.g. I/O errors), a
    /// single bad event should be reported as `Generated::Aborted`.
    ///
    fn next_event(&mut self) -> Result<Generated>;

    /// Number of events which this source declares it can produce, if known
    fn declared_events(&self) -> Option<usize> {
        None
    }

    /// Truth that produced events carry a hard-process record
    fn provides_hard_process(&self) -> bool {
        false
    }
}

/// Source which replays a pre-recorded sequence of generation outcomes
#[cfg(test)]
pub struct RecordedEvents {
    outcomes: VecDeque<Generated>,
    hard_process: bool,
}
//
#[cfg(test)]
impl RecordedEvents {
    /// Replay a sequence of generation outcomes
    pub fn new(outcomes: impl IntoIterator<Item = Generated>) -> Self {
        let outcomes = outcomes.into_iter().collect::<VecDeque<_>>();
        let hard_process = outcomes.iter().any(|outcome| match outcome {
            Generated::Event(event) => event.hard_process.is_some(),
            _ => false,
        });
        Self {
            outcomes,
            hard_process,
        }
    }

    /// Replay a sequence of events, none of which fails
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        Self::new(events.into_iter().map(Generated::Event))
    }
}
//
#[cfg(test)]
impl EventSource for RecordedEvents {
    fn next_event(&mut self) -> Result<Generated> {
        Ok(self.outcomes.pop_front().unwrap_or(Generated::Exhausted))
    }

    fn declared_events(&self) -> Option<usize> {
        Some(
            self.outcomes
                .iter()
                .filter(|outcome| matches!(outcome, Generated::Event(_)))
                .count(),
        )
    }

    fn provides_hard_process(&self) -> bool {
        self.hard_process
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_events_replay_in_order() {
        let mut source = RecordedEvents::new([
            Generated::Aborted,
            Generated::Event(Event::default()),
        ]);
        assert_eq!(source.declared_events(), Some(1));
        assert!(!source.provides_hard_process());
        assert_eq!(source.next_event().unwrap(), Generated::Aborted);
        assert_eq!(
            source.next_event().unwrap(),
            Generated::Event(Event::default())
        );
        assert_eq!(source.next_event().unwrap(), Generated::Exhausted);
    }

    #[test]
    fn hard_process_capability_is_detected() {
        let event = Event::default().with_hard_process(Vec::new());
        let source = RecordedEvents::from_events([event]);
        assert!(source.provides_hard_process());
    }
}
