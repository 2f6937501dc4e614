//! # Reminder Schedule Table
//!
//! The schedule is a real table keyed by (certification id, reminder
//! kind), not a fire-and-forget queue of delayed jobs. Rescheduling marks
//! entries Superseded, and delivery checks the entry state at fire time —
//! so a stale schedule can never send, and a Sent mark survives in the
//! table instead of living only in a log line.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use pcert_core::{CertificationId, ProviderId, Timestamp};

// ─── Reminder Kinds ──────────────────────────────────────────────────

/// The fixed reminder offsets around a certification's expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReminderKind {
    /// 90 days before expiry.
    Before90,
    /// 60 days before expiry.
    Before60,
    /// 30 days before expiry.
    Before30,
    /// 14 days before expiry.
    Before14,
    /// 7 days before expiry.
    Before7,
    /// 1 day before expiry.
    Before1,
    /// The expiry day itself.
    ExpiryDay,
    /// 1 day after expiry.
    After1,
    /// 7 days after expiry.
    After7,
    /// 30 days after expiry.
    After30,
}

impl ReminderKind {
    /// Every kind, in chronological firing order.
    pub const ALL: [ReminderKind; 10] = [
        Self::Before90,
        Self::Before60,
        Self::Before30,
        Self::Before14,
        Self::Before7,
        Self::Before1,
        Self::ExpiryDay,
        Self::After1,
        Self::After7,
        Self::After30,
    ];

    /// Signed day offset relative to the expiry date.
    pub fn offset_days(&self) -> i64 {
        match self {
            Self::Before90 => -90,
            Self::Before60 => -60,
            Self::Before30 => -30,
            Self::Before14 => -14,
            Self::Before7 => -7,
            Self::Before1 => -1,
            Self::ExpiryDay => 0,
            Self::After1 => 1,
            Self::After7 => 7,
            Self::After30 => 30,
        }
    }

    /// Days before expiry, for the before-offsets only. The expiry day
    /// and the after-offsets all deliver the "expired" notification.
    pub fn days_before_expiry(&self) -> Option<u32> {
        match self.offset_days() {
            offset if offset < 0 => Some(offset.unsigned_abs() as u32),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Before90 => "BEFORE_90",
            Self::Before60 => "BEFORE_60",
            Self::Before30 => "BEFORE_30",
            Self::Before14 => "BEFORE_14",
            Self::Before7 => "BEFORE_7",
            Self::Before1 => "BEFORE_1",
            Self::ExpiryDay => "EXPIRY_DAY",
            Self::After1 => "AFTER_1",
            Self::After7 => "AFTER_7",
            Self::After30 => "AFTER_30",
        };
        f.write_str(s)
    }
}

// ─── Entries ─────────────────────────────────────────────────────────

/// Delivery state of one schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderState {
    /// Waiting for its scheduled time.
    Scheduled,
    /// Delivered; never fires again.
    Sent,
    /// Cancelled by a reschedule or a terminal transition; never fires.
    Superseded,
}

/// One scheduled reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderEntry {
    /// The certification the reminder concerns.
    pub certification: CertificationId,
    /// The provider to notify.
    pub provider: ProviderId,
    /// Which offset this entry is.
    pub kind: ReminderKind,
    /// When it should fire.
    pub scheduled_for: Timestamp,
    /// Current delivery state.
    pub state: ReminderState,
}

// ─── Store ───────────────────────────────────────────────────────────

/// Thread-safe schedule table, one slot per (certification, kind).
#[derive(Debug, Default)]
pub struct ScheduleStore {
    inner: Mutex<BTreeMap<(CertificationId, ReminderKind), ReminderEntry>>,
}

impl ScheduleStore {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a table from exported entries.
    pub fn restore(entries: Vec<ReminderEntry>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.lock();
            for entry in entries {
                guard.insert((entry.certification, entry.kind), entry);
            }
        }
        store
    }

    /// Upsert one Scheduled entry.
    ///
    /// Idempotent against replay: an existing non-superseded entry for the
    /// same slot and the same instant is kept as-is, so a Sent mark is
    /// never regressed to Scheduled by re-applying the event that created
    /// it.
    pub fn schedule(
        &self,
        certification: CertificationId,
        provider: ProviderId,
        kind: ReminderKind,
        scheduled_for: Timestamp,
    ) {
        let mut guard = self.lock();
        let key = (certification, kind);
        if let Some(existing) = guard.get(&key) {
            if existing.scheduled_for == scheduled_for && existing.state != ReminderState::Superseded
            {
                return;
            }
        }
        guard.insert(
            key,
            ReminderEntry {
                certification,
                provider,
                kind,
                scheduled_for,
                state: ReminderState::Scheduled,
            },
        );
    }

    /// Mark every Scheduled entry for a certification Superseded.
    pub fn supersede_all(&self, certification: CertificationId) -> usize {
        let mut count = 0;
        for entry in self.lock().values_mut() {
            if entry.certification == certification && entry.state == ReminderState::Scheduled {
                entry.state = ReminderState::Superseded;
                count += 1;
            }
        }
        count
    }

    /// Mark one entry Sent. Returns false if the slot is absent.
    pub fn mark_sent(&self, certification: CertificationId, kind: ReminderKind) -> bool {
        match self.lock().get_mut(&(certification, kind)) {
            Some(entry) => {
                entry.state = ReminderState::Sent;
                true
            }
            None => false,
        }
    }

    /// Scheduled entries whose time has come, in firing order.
    ///
    /// The state check happens here, at delivery time — a Superseded or
    /// Sent entry never comes back as due.
    pub fn due(&self, now: Timestamp) -> Vec<ReminderEntry> {
        let mut due: Vec<ReminderEntry> = self
            .lock()
            .values()
            .filter(|e| e.state == ReminderState::Scheduled && e.scheduled_for <= now)
            .cloned()
            .collect();
        due.sort_by_key(|e| e.scheduled_for);
        due
    }

    /// Every entry for one certification, in kind order.
    pub fn entries_for(&self, certification: CertificationId) -> Vec<ReminderEntry> {
        self.lock()
            .values()
            .filter(|e| e.certification == certification)
            .cloned()
            .collect()
    }

    /// Every entry in the table, for persistence.
    pub fn entries(&self) -> Vec<ReminderEntry> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<(CertificationId, ReminderKind), ReminderEntry>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
