//! # Outbox and Reactor Pump
//!
//! The outbox is an append-only log of transition events, written in the
//! same logical step as the record mutation. Side effects (metrics,
//! reminders, notifications, audit) are reactors that consume the outbox
//! through a pump rather than being fired directly from the engine, so:
//!
//! - a reactor crash never rolls back or blocks the committed mutation;
//! - redelivery after a crash is safe, because the pump deduplicates on
//!   event id per reactor;
//! - the whole side-effect state can be rebuilt by replaying the log
//!   through fresh reactors.
//!
//! Delivery order is the append order of the log. A reactor failure stops
//! the pump and surfaces to the caller, whose retry policy governs
//! redelivery; successfully processed (reactor, event) pairs are remembered
//! and skipped on retry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pcert_core::EventId;

use crate::event::TransitionEvent;

// ─── Errors ──────────────────────────────────────────────────────────

/// A failure inside a single reactor, with no further structure — the
/// pump wraps it with event context before surfacing it.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ReactorError(pub String);

impl ReactorError {
    /// Build a reactor error from any displayable cause.
    pub fn new(msg: impl std::fmt::Display) -> Self {
        Self(msg.to_string())
    }
}

/// A reactor failure surfaced by the pump, carrying delivery context.
#[derive(Error, Debug)]
#[error("reactor {reactor} failed on {kind} event {event} for {certification}: {source}")]
pub struct PumpError {
    /// The reactor that failed.
    pub reactor: &'static str,
    /// The event being delivered.
    pub event: EventId,
    /// The event kind label.
    pub kind: &'static str,
    /// The certification the event concerns.
    pub certification: String,
    /// The underlying reactor failure.
    #[source]
    pub source: ReactorError,
}

// ─── Reactor Trait ───────────────────────────────────────────────────

/// An independent consumer of transition events.
///
/// Implementations must be idempotent per event id: the pump already
/// deduplicates within one process lifetime, but replay from a restored
/// log hands every event to a fresh reactor exactly once, so applying a
/// given event must be a pure function of (reactor state, event).
pub trait Reactor {
    /// Stable reactor name, used for dedupe bookkeeping and logs.
    fn name(&self) -> &'static str;

    /// Apply one event. Failures are surfaced, never swallowed.
    fn apply(&mut self, event: &TransitionEvent) -> Result<(), ReactorError>;
}

// ─── Outbox ──────────────────────────────────────────────────────────

/// Append-only log of transition events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outbox {
    events: Vec<TransitionEvent>,
}

impl Outbox {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore an outbox from previously exported events.
    pub fn from_events(events: Vec<TransitionEvent>) -> Self {
        Self { events }
    }

    /// Append one event.
    pub fn append(&mut self, event: TransitionEvent) {
        self.events.push(event);
    }

    /// All events in append order.
    pub fn events(&self) -> &[TransitionEvent] {
        &self.events
    }

    /// Number of events in the log.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ─── Reactor Pump ────────────────────────────────────────────────────

/// Delivers outbox events to reactors, at least once, deduplicated per
/// (reactor name, event id).
#[derive(Debug, Default)]
pub struct ReactorPump {
    processed: BTreeMap<&'static str, BTreeSet<EventId>>,
}

impl ReactorPump {
    /// Create a pump with no delivery history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-mark events as already delivered to one reactor, so a pump
    /// rebuilt from a persisted checkpoint resumes instead of replaying.
    pub fn mark_processed(
        &mut self,
        reactor: &'static str,
        events: impl IntoIterator<Item = EventId>,
    ) {
        self.processed.entry(reactor).or_default().extend(events);
    }

    /// Deliver every not-yet-processed event to every reactor, in log order.
    ///
    /// Returns the number of (reactor, event) deliveries performed. On a
    /// reactor failure the error is logged with its event context and
    /// returned; already-successful deliveries stay marked, so a retry
    /// resumes where it stopped instead of double-applying.
    pub fn pump(
        &mut self,
        outbox: &Outbox,
        reactors: &mut [&mut dyn Reactor],
    ) -> Result<usize, PumpError> {
        let mut delivered = 0;
        for event in outbox.events() {
            for reactor in reactors.iter_mut() {
                let name = reactor.name();
                let seen = self.processed.entry(name).or_default();
                if seen.contains(&event.id) {
                    continue;
                }
                if let Err(err) = reactor.apply(event) {
                    tracing::error!(
                        reactor = name,
                        event = %event.id,
                        kind = event.kind.label(),
                        certification = %event.certification(),
                        error = %err,
                        "reactor failed; delivery will be retried"
                    );
                    return Err(PumpError {
                        reactor: name,
                        event: event.id,
                        kind: event.kind.label(),
                        certification: event.certification().to_string(),
                        source: err,
                    });
                }
                seen.insert(event.id);
                delivered += 1;
            }
        }
        Ok(delivered)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{RecordSnapshot, TransitionKind};
    use crate::record::{CertificationRecord, CertificationStatus, NewCertification};
    use pcert_core::{Actor, CertificationId, ProviderId, Timestamp};

    fn make_event() -> TransitionEvent {
        let input = NewCertification {
            provider: ProviderId::new(),
            name: "Cold Chain".to_string(),
            issuing_organization: "TÜV".to_string(),
            category: "logistics".to_string(),
            certification_number: "CC-7".to_string(),
            issue_date: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            expiry_date: Timestamp::parse("2027-01-01T00:00:00Z").unwrap(),
            recurring: false,
            initial_status: None,
        };
        let record = CertificationRecord::new(CertificationId::new(), &input, input.issue_date);
        TransitionEvent {
            id: pcert_core::EventId::new(),
            at: input.issue_date,
            actor: Actor::System,
            origin: None,
            snapshot: RecordSnapshot::of(&record, CertificationStatus::Pending),
            kind: TransitionKind::Created,
        }
    }

    /// Counts deliveries; fails on demand to exercise retry semantics.
    struct CountingReactor {
        applied: usize,
        fail_next: bool,
    }

    impl Reactor for CountingReactor {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn apply(&mut self, _event: &TransitionEvent) -> Result<(), ReactorError> {
            if self.fail_next {
                self.fail_next = false;
                return Err(ReactorError::new("simulated failure"));
            }
            self.applied += 1;
            Ok(())
        }
    }

    #[test]
    fn test_pump_delivers_each_event_once() {
        let mut outbox = Outbox::new();
        outbox.append(make_event());
        outbox.append(make_event());

        let mut reactor = CountingReactor { applied: 0, fail_next: false };
        let mut pump = ReactorPump::new();

        let delivered = pump.pump(&outbox, &mut [&mut reactor]).unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(reactor.applied, 2);

        // Pumping again delivers nothing new.
        let delivered = pump.pump(&outbox, &mut [&mut reactor]).unwrap();
        assert_eq!(delivered, 0);
        assert_eq!(reactor.applied, 2);
    }

    #[test]
    fn test_pump_retry_resumes_after_failure() {
        let mut outbox = Outbox::new();
        outbox.append(make_event());
        outbox.append(make_event());

        let mut reactor = CountingReactor { applied: 0, fail_next: true };
        let mut pump = ReactorPump::new();

        let err = pump.pump(&outbox, &mut [&mut reactor]).unwrap_err();
        assert_eq!(err.reactor, "counting");
        assert_eq!(err.kind, "created");
        assert_eq!(reactor.applied, 0);

        // Retry succeeds and applies both events exactly once.
        let delivered = pump.pump(&outbox, &mut [&mut reactor]).unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(reactor.applied, 2);
    }

    #[test]
    fn test_new_events_after_pump_are_picked_up() {
        let mut outbox = Outbox::new();
        outbox.append(make_event());

        let mut reactor = CountingReactor { applied: 0, fail_next: false };
        let mut pump = ReactorPump::new();
        pump.pump(&outbox, &mut [&mut reactor]).unwrap();

        outbox.append(make_event());
        let delivered = pump.pump(&outbox, &mut [&mut reactor]).unwrap();
        assert_eq!(delivered, 1);
        assert_eq!(reactor.applied, 2);
    }
}
