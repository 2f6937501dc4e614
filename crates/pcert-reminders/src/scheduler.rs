//! # Reminder Scheduler
//!
//! Reacts to lifecycle transitions by maintaining the schedule table, and
//! delivers due reminders through the notification sink. Scheduling is a
//! pure function of the record snapshot in the event plus the clock, so
//! replaying the outbox reproduces the same table.

use std::sync::Arc;

use pcert_core::Timestamp;
use pcert_notify::{NotificationSink, ProviderNotification};
use pcert_state::{
    CertificationStatus, Reactor, ReactorError, RecordSnapshot, TransitionEvent, TransitionKind,
};

use crate::schedule::{ReminderKind, ScheduleStore};

// ─── Eligibility ─────────────────────────────────────────────────────

/// Whether a record should carry a reminder schedule at all.
///
/// Expired and revoked records never get a fresh schedule. A
/// non-recurring certification that is already past due is also skipped;
/// a recurring one keeps its after-expiry follow-ups because a renewal
/// is expected.
pub fn should_schedule(snapshot: &RecordSnapshot, now: Timestamp) -> bool {
    match snapshot.status {
        CertificationStatus::Expired | CertificationStatus::Revoked => false,
        _ => snapshot.recurring || snapshot.expiry_date >= now,
    }
}

// ─── Reactor ─────────────────────────────────────────────────────────

/// Keeps the schedule table in lockstep with the lifecycle.
///
/// Renewals and expiry-date edits supersede the whole existing schedule
/// before laying down the new one; terminal transitions supersede and
/// schedule nothing. Offsets whose fire time is already in the past are
/// never scheduled.
pub struct ReminderReactor {
    store: Arc<ScheduleStore>,
}

impl ReminderReactor {
    /// Build a scheduler over a shared schedule table.
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self { store }
    }

    fn schedule_all(&self, snapshot: &RecordSnapshot, now: Timestamp) {
        if !should_schedule(snapshot, now) {
            return;
        }
        for kind in ReminderKind::ALL {
            let fire_at = snapshot.expiry_date.add_days(kind.offset_days());
            if fire_at < now {
                continue;
            }
            self.store.schedule(snapshot.certification, snapshot.provider, kind, fire_at);
        }
    }

    fn reschedule(&self, snapshot: &RecordSnapshot, now: Timestamp) {
        let superseded = self.store.supersede_all(snapshot.certification);
        if superseded > 0 {
            tracing::debug!(
                certification = %snapshot.certification,
                superseded,
                "stale reminders superseded"
            );
        }
        self.schedule_all(snapshot, now);
    }
}

impl Reactor for ReminderReactor {
    fn name(&self) -> &'static str {
        "reminders"
    }

    fn apply(&mut self, event: &TransitionEvent) -> Result<(), ReactorError> {
        match &event.kind {
            TransitionKind::Created => self.schedule_all(&event.snapshot, event.at),
            TransitionKind::Renewed { .. } => self.reschedule(&event.snapshot, event.at),
            TransitionKind::Updated { changes } => {
                if changes.contains_key("expiry_date") {
                    self.reschedule(&event.snapshot, event.at);
                }
            }
            TransitionKind::Expired | TransitionKind::Revoked { .. } => {
                self.store.supersede_all(event.snapshot.certification);
            }
            TransitionKind::Verified { .. }
            | TransitionKind::Rejected { .. }
            | TransitionKind::Suspended { .. } => {}
        }
        Ok(())
    }
}

// ─── Delivery ────────────────────────────────────────────────────────

/// Fire every due reminder through the sink, marking each Sent.
///
/// Before-expiry offsets deliver `ExpiringSoon` with their day count; the
/// expiry day and the after-expiry follow-ups deliver `Expired`. Returns
/// how many reminders were sent. A sink failure stops delivery with the
/// already-sent entries marked, so a retry resumes where it stopped.
pub fn deliver_due(
    store: &ScheduleStore,
    sink: &dyn NotificationSink,
    now: Timestamp,
) -> Result<usize, ReactorError> {
    let mut sent = 0;
    for entry in store.due(now) {
        let notification = match entry.kind.days_before_expiry() {
            Some(days) => ProviderNotification::ExpiringSoon { days_until_expiry: days },
            None => ProviderNotification::Expired,
        };
        sink.send(entry.provider, notification)?;
        store.mark_sent(entry.certification, entry.kind);
        tracing::info!(
            certification = %entry.certification,
            provider = %entry.provider,
            kind = %entry.kind,
            "reminder sent"
        );
        sent += 1;
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use pcert_core::ProviderId;
    use pcert_notify::InMemoryInbox;
    use pcert_state::{
        CertificationEngine, CertificationUpdate, NewCertification, OpContext, ReactorPump,
    };

    use crate::schedule::ReminderState;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn make_input(provider: ProviderId, expiry: Timestamp, recurring: bool) -> NewCertification {
        NewCertification {
            provider,
            name: "ISO 9001".to_string(),
            issuing_organization: "ISO".to_string(),
            category: "quality".to_string(),
            certification_number: "Q-1".to_string(),
            issue_date: ts("2026-01-01T00:00:00Z"),
            expiry_date: expiry,
            recurring,
            initial_status: None,
        }
    }

    fn pump_into(engine: &CertificationEngine, reactor: &mut ReminderReactor) {
        ReactorPump::new().pump(engine.outbox(), &mut [reactor]).unwrap();
    }

    #[test]
    fn test_eligibility_truth_table() {
        use pcert_state::{CertificationRecord, RecordSnapshot};

        let now = ts("2026-06-01T00:00:00Z");
        let future = now.add_days(30);
        let past = now.add_days(-30);

        let snap = |status: CertificationStatus, recurring: bool, expiry: Timestamp| {
            let mut input = make_input(pcert_core::ProviderId::new(), expiry, recurring);
            input.issue_date = expiry.add_days(-365);
            let record =
                CertificationRecord::new(pcert_core::CertificationId::new(), &input, input.issue_date);
            let mut snapshot = RecordSnapshot::of(&record, status);
            snapshot.status = status;
            snapshot
        };

        use CertificationStatus::*;
        // (status, recurring, expiry, expected)
        let cases = [
            (Pending, false, future, true),
            (Pending, false, past, false),
            (Pending, true, past, true),
            (Active, false, future, true),
            (Active, false, past, false),
            (Active, true, past, true),
            (Suspended, false, future, true),
            (Suspended, true, past, true),
            (Expired, true, future, false),
            (Expired, false, past, false),
            (Revoked, true, future, false),
            (Revoked, false, future, false),
        ];
        for (status, recurring, expiry, expected) in cases {
            assert_eq!(
                should_schedule(&snap(status, recurring, expiry), now),
                expected,
                "status={status:?} recurring={recurring} expiry={expiry}"
            );
        }
    }

    #[test]
    fn test_near_expiry_schedules_only_future_offsets() {
        let mut engine = CertificationEngine::new();
        let now = ts("2026-01-01T00:00:00Z");
        // Expires in five days: the 90..7-day offsets are already past.
        let expiry = now.add_days(5);
        let id = engine
            .create(make_input(ProviderId::new(), expiry, false), &OpContext::system(now))
            .unwrap()
            .id;

        let store = Arc::new(ScheduleStore::new());
        let mut reactor = ReminderReactor::new(Arc::clone(&store));
        pump_into(&engine, &mut reactor);

        let kinds: BTreeSet<ReminderKind> =
            store.entries_for(id).into_iter().map(|e| e.kind).collect();
        let expected: BTreeSet<ReminderKind> = [
            ReminderKind::Before1,
            ReminderKind::ExpiryDay,
            ReminderKind::After1,
            ReminderKind::After7,
            ReminderKind::After30,
        ]
        .into_iter()
        .collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn test_full_horizon_schedules_all_ten() {
        let mut engine = CertificationEngine::new();
        let now = ts("2026-01-01T00:00:00Z");
        let id = engine
            .create(make_input(ProviderId::new(), now.add_days(365), false), &OpContext::system(now))
            .unwrap()
            .id;

        let store = Arc::new(ScheduleStore::new());
        let mut reactor = ReminderReactor::new(Arc::clone(&store));
        pump_into(&engine, &mut reactor);

        assert_eq!(store.entries_for(id).len(), ReminderKind::ALL.len());
    }

    #[test]
    fn test_renewal_supersedes_and_reschedules() {
        let mut engine = CertificationEngine::new();
        let now = ts("2026-01-01T00:00:00Z");
        let id = engine
            .create(make_input(ProviderId::new(), now.add_days(30), false), &OpContext::system(now))
            .unwrap()
            .id;

        let store = Arc::new(ScheduleStore::new());
        let mut reactor = ReminderReactor::new(Arc::clone(&store));
        let mut pump = ReactorPump::new();
        pump.pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        let new_expiry = now.add_days(400);
        engine.renew(id, new_expiry, &OpContext::system(now.add_days(10))).unwrap();
        pump.pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        // Live entries all point at the new expiry.
        let live: Vec<_> = store
            .entries_for(id)
            .into_iter()
            .filter(|e| e.state == ReminderState::Scheduled)
            .collect();
        assert_eq!(live.len(), ReminderKind::ALL.len());
        for entry in &live {
            assert_eq!(entry.scheduled_for, new_expiry.add_days(entry.kind.offset_days()));
        }
    }

    #[test]
    fn test_expiry_date_edit_reschedules() {
        let mut engine = CertificationEngine::new();
        let now = ts("2026-01-01T00:00:00Z");
        let id = engine
            .create(make_input(ProviderId::new(), now.add_days(200), false), &OpContext::system(now))
            .unwrap()
            .id;

        let store = Arc::new(ScheduleStore::new());
        let mut reactor = ReminderReactor::new(Arc::clone(&store));
        let mut pump = ReactorPump::new();
        pump.pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        let update = CertificationUpdate {
            expiry_date: Some(now.add_days(300)),
            ..Default::default()
        };
        engine.update(id, &update, &OpContext::system(now.add_days(1))).unwrap();
        pump.pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        let live: Vec<_> = store
            .entries_for(id)
            .into_iter()
            .filter(|e| e.state == ReminderState::Scheduled)
            .collect();
        for entry in &live {
            assert_eq!(
                entry.scheduled_for,
                now.add_days(300).add_days(entry.kind.offset_days())
            );
        }
    }

    #[test]
    fn test_non_expiry_edit_leaves_schedule_alone() {
        let mut engine = CertificationEngine::new();
        let now = ts("2026-01-01T00:00:00Z");
        let id = engine
            .create(make_input(ProviderId::new(), now.add_days(200), false), &OpContext::system(now))
            .unwrap()
            .id;

        let store = Arc::new(ScheduleStore::new());
        let mut reactor = ReminderReactor::new(Arc::clone(&store));
        let mut pump = ReactorPump::new();
        pump.pump(engine.outbox(), &mut [&mut reactor]).unwrap();
        let before = store.entries_for(id);

        let update = CertificationUpdate {
            name: Some("ISO 9001:2026".to_string()),
            ..Default::default()
        };
        engine.update(id, &update, &OpContext::system(now.add_days(1))).unwrap();
        pump.pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        let after = store.entries_for(id);
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(b.scheduled_for, a.scheduled_for);
            assert_eq!(b.state, a.state);
        }
    }

    #[test]
    fn test_revocation_supersedes_everything() {
        let mut engine = CertificationEngine::new();
        let now = ts("2026-01-01T00:00:00Z");
        let id = engine
            .create(make_input(ProviderId::new(), now.add_days(200), false), &OpContext::system(now))
            .unwrap()
            .id;

        let store = Arc::new(ScheduleStore::new());
        let mut reactor = ReminderReactor::new(Arc::clone(&store));
        let mut pump = ReactorPump::new();
        pump.pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        engine.revoke(id, "fraud", &OpContext::system(now.add_days(2))).unwrap();
        pump.pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        assert!(store
            .entries_for(id)
            .iter()
            .all(|e| e.state == ReminderState::Superseded));
    }

    #[test]
    fn test_non_recurring_past_due_gets_no_schedule() {
        let mut engine = CertificationEngine::new();
        let now = ts("2026-06-01T00:00:00Z");
        let mut input = make_input(ProviderId::new(), ts("2026-03-01T00:00:00Z"), false);
        input.issue_date = ts("2025-03-01T00:00:00Z");
        let id = engine.create(input, &OpContext::system(now)).unwrap().id;

        let store = Arc::new(ScheduleStore::new());
        let mut reactor = ReminderReactor::new(Arc::clone(&store));
        pump_into(&engine, &mut reactor);

        assert!(store.entries_for(id).is_empty());
    }

    #[test]
    fn test_recurring_past_due_keeps_follow_ups() {
        let mut engine = CertificationEngine::new();
        let now = ts("2026-03-05T00:00:00Z");
        let mut input = make_input(ProviderId::new(), ts("2026-03-01T00:00:00Z"), true);
        input.issue_date = ts("2025-03-01T00:00:00Z");
        let id = engine.create(input, &OpContext::system(now)).unwrap().id;

        let store = Arc::new(ScheduleStore::new());
        let mut reactor = ReminderReactor::new(Arc::clone(&store));
        pump_into(&engine, &mut reactor);

        // Only the +7 and +30 day follow-ups are still in the future.
        let kinds: BTreeSet<ReminderKind> =
            store.entries_for(id).into_iter().map(|e| e.kind).collect();
        let expected: BTreeSet<ReminderKind> =
            [ReminderKind::After7, ReminderKind::After30].into_iter().collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn test_delivery_sends_right_subtype_and_marks_sent() {
        let mut engine = CertificationEngine::new();
        let provider = ProviderId::new();
        let now = ts("2026-01-01T00:00:00Z");
        let expiry = now.add_days(90);
        engine.create(make_input(provider, expiry, false), &OpContext::system(now)).unwrap();

        let store = Arc::new(ScheduleStore::new());
        let mut reactor = ReminderReactor::new(Arc::clone(&store));
        pump_into(&engine, &mut reactor);

        let inbox = InMemoryInbox::new();
        inbox.register(provider);

        // Day 83: the 90-day offset (day 0) and the 7-days-before offset
        // (day 83) are both due.
        let sent = deliver_due(&store, &inbox, now.add_days(83)).unwrap();
        assert_eq!(sent, 5); // -90, -60, -30, -14, -7
        let messages = inbox.messages(provider);
        assert_eq!(
            messages.last(),
            Some(&ProviderNotification::ExpiringSoon { days_until_expiry: 7 })
        );

        // Nothing re-fires.
        assert_eq!(deliver_due(&store, &inbox, now.add_days(83)).unwrap(), 0);

        // On the expiry day the subtype flips to Expired.
        let sent = deliver_due(&store, &inbox, expiry).unwrap();
        assert_eq!(sent, 2); // -1 and day 0
        assert_eq!(inbox.messages(provider).last(), Some(&ProviderNotification::Expired));
    }
}
