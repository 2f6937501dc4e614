//! # Certification Lifecycle Engine
//!
//! The single entry point for all certification mutations. Each operation
//! validates its preconditions, mutates the record, and appends exactly one
//! transition event to the outbox — record and event move together, so a
//! reactor can never observe an event for a mutation that did not happen.
//!
//! The engine owns the record store and the outbox. It performs no side
//! effects itself: counters, reminders, notifications, and audit entries
//! are all downstream reactors (see [`crate::outbox`]).

use std::collections::BTreeMap;

use pcert_core::{Actor, ActorId, CertificationId, EventId, ProviderId, Timestamp};

use crate::event::{RecordSnapshot, RequestOrigin, TransitionEvent, TransitionKind};
use crate::outbox::Outbox;
use crate::record::{
    CertificationError, CertificationRecord, CertificationStatus, CertificationUpdate,
    NewCertification,
};

// ─── Operation Context ───────────────────────────────────────────────

/// Per-operation context: attribution, origin metadata, and the clock.
///
/// Operations take `now` from the context instead of reading the wall
/// clock, which keeps transition timestamps consistent within a request
/// and makes the engine fully deterministic under test.
#[derive(Debug, Clone)]
pub struct OpContext {
    /// Who is performing the operation.
    pub actor: Actor,
    /// Request origin metadata, when available.
    pub origin: Option<RequestOrigin>,
    /// The current time.
    pub now: Timestamp,
}

impl OpContext {
    /// A system-attributed context at the given instant (sweeps, jobs).
    pub fn system(now: Timestamp) -> Self {
        Self { actor: Actor::System, origin: None, now }
    }

    /// A user-attributed context at the given instant.
    pub fn user(actor: ActorId, now: Timestamp) -> Self {
        Self { actor: Actor::User(actor), origin: None, now }
    }
}

// ─── Engine ──────────────────────────────────────────────────────────

/// Owns the certification records and the transition outbox.
#[derive(Debug, Default)]
pub struct CertificationEngine {
    records: BTreeMap<CertificationId, CertificationRecord>,
    /// (provider, certification_number) -> record, for per-provider
    /// uniqueness of externally issued numbers.
    numbers: BTreeMap<(ProviderId, String), CertificationId>,
    outbox: Outbox,
}

impl CertificationEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine from restored records and events.
    pub fn restore(records: Vec<CertificationRecord>, events: Vec<TransitionEvent>) -> Self {
        let mut numbers = BTreeMap::new();
        let mut map = BTreeMap::new();
        for record in records {
            numbers.insert((record.provider, record.certification_number.clone()), record.id);
            map.insert(record.id, record);
        }
        Self { records: map, numbers, outbox: Outbox::from_events(events) }
    }

    // ── Lifecycle operations ─────────────────────────────────────────

    /// Persist a new certification record. Emits Created.
    pub fn create(
        &mut self,
        input: NewCertification,
        ctx: &OpContext,
    ) -> Result<&CertificationRecord, CertificationError> {
        input.validate()?;
        let number_key = (input.provider, input.certification_number.clone());
        if self.numbers.contains_key(&number_key) {
            return Err(CertificationError::DuplicateCertificationNumber {
                number: input.certification_number.clone(),
            });
        }

        let id = CertificationId::new();
        let record = CertificationRecord::new(id, &input, ctx.now);
        let previous = record.status;
        let snapshot = RecordSnapshot::of(&record, previous);
        self.numbers.insert(number_key, id);
        self.records.insert(id, record);
        self.emit(snapshot, TransitionKind::Created, ctx);

        tracing::info!(certification = %id, provider = %input.provider, "certification created");
        self.records.get(&id).ok_or(CertificationError::NotFound(id))
    }

    /// Confirm the certification as authentic. Emits Verified.
    pub fn verify(
        &mut self,
        id: CertificationId,
        verifier: ActorId,
        ctx: &OpContext,
    ) -> Result<&CertificationRecord, CertificationError> {
        let record = self.records.get_mut(&id).ok_or(CertificationError::NotFound(id))?;
        let previous = record.status;
        record.verify(verifier, ctx.now)?;
        let snapshot = RecordSnapshot::of(record, previous);
        self.emit(snapshot, TransitionKind::Verified { verifier }, ctx);
        self.records.get(&id).ok_or(CertificationError::NotFound(id))
    }

    /// Reject the certification as inauthentic. Emits Rejected.
    pub fn reject(
        &mut self,
        id: CertificationId,
        reason: &str,
        ctx: &OpContext,
    ) -> Result<&CertificationRecord, CertificationError> {
        let record = self.records.get_mut(&id).ok_or(CertificationError::NotFound(id))?;
        let previous = record.status;
        record.reject(reason, ctx.actor, ctx.now)?;
        let snapshot = RecordSnapshot::of(record, previous);
        self.emit(snapshot, TransitionKind::Rejected { reason: reason.to_string() }, ctx);
        self.records.get(&id).ok_or(CertificationError::NotFound(id))
    }

    /// Renew the certification with a fresh expiry date. Emits Renewed.
    pub fn renew(
        &mut self,
        id: CertificationId,
        new_expiry: Timestamp,
        ctx: &OpContext,
    ) -> Result<&CertificationRecord, CertificationError> {
        let record = self.records.get_mut(&id).ok_or(CertificationError::NotFound(id))?;
        let previous = record.status;
        record.renew(new_expiry, ctx.now)?;
        let snapshot = RecordSnapshot::of(record, previous);
        self.emit(snapshot, TransitionKind::Renewed { new_expiry }, ctx);
        self.records.get(&id).ok_or(CertificationError::NotFound(id))
    }

    /// Suspend the certification. Emits Suspended.
    pub fn suspend(
        &mut self,
        id: CertificationId,
        reason: &str,
        ctx: &OpContext,
    ) -> Result<&CertificationRecord, CertificationError> {
        let record = self.records.get_mut(&id).ok_or(CertificationError::NotFound(id))?;
        let previous = record.status;
        record.suspend(reason, ctx.actor, ctx.now)?;
        let snapshot = RecordSnapshot::of(record, previous);
        self.emit(snapshot, TransitionKind::Suspended { reason: reason.to_string() }, ctx);
        self.records.get(&id).ok_or(CertificationError::NotFound(id))
    }

    /// Revoke the certification permanently. Emits Revoked.
    pub fn revoke(
        &mut self,
        id: CertificationId,
        reason: &str,
        ctx: &OpContext,
    ) -> Result<&CertificationRecord, CertificationError> {
        let record = self.records.get_mut(&id).ok_or(CertificationError::NotFound(id))?;
        let previous = record.status;
        record.revoke(reason, ctx.actor, ctx.now)?;
        let snapshot = RecordSnapshot::of(record, previous);
        self.emit(snapshot, TransitionKind::Revoked { reason: reason.to_string() }, ctx);
        self.records.get(&id).ok_or(CertificationError::NotFound(id))
    }

    /// Expire one past-due certification. Emits Expired.
    pub fn expire(
        &mut self,
        id: CertificationId,
        ctx: &OpContext,
    ) -> Result<&CertificationRecord, CertificationError> {
        let record = self.records.get_mut(&id).ok_or(CertificationError::NotFound(id))?;
        let previous = record.status;
        record.expire(ctx.now)?;
        let snapshot = RecordSnapshot::of(record, previous);
        self.emit(snapshot, TransitionKind::Expired, ctx);
        self.records.get(&id).ok_or(CertificationError::NotFound(id))
    }

    /// Apply a partial field diff. Emits Updated with the effective changes.
    ///
    /// An update whose every supplied field equals the current value emits
    /// nothing — there was no transition.
    pub fn update(
        &mut self,
        id: CertificationId,
        update: &CertificationUpdate,
        ctx: &OpContext,
    ) -> Result<&CertificationRecord, CertificationError> {
        // Number uniqueness is checked against the index before mutating.
        if let Some(number) = &update.certification_number {
            let record = self.records.get(&id).ok_or(CertificationError::NotFound(id))?;
            let key = (record.provider, number.clone());
            if let Some(holder) = self.numbers.get(&key) {
                if *holder != id {
                    return Err(CertificationError::DuplicateCertificationNumber {
                        number: number.clone(),
                    });
                }
            }
        }

        let record = self.records.get_mut(&id).ok_or(CertificationError::NotFound(id))?;
        let previous = record.status;
        let old_number = record.certification_number.clone();
        let changes = record.apply_update(update)?;

        if changes.contains_key("certification_number") {
            let provider = record.provider;
            let new_number = record.certification_number.clone();
            self.numbers.remove(&(provider, old_number));
            self.numbers.insert((provider, new_number), id);
        }

        if !changes.is_empty() {
            let record = self.records.get(&id).ok_or(CertificationError::NotFound(id))?;
            let snapshot = RecordSnapshot::of(record, previous);
            self.emit(snapshot, TransitionKind::Updated { changes }, ctx);
        }
        self.records.get(&id).ok_or(CertificationError::NotFound(id))
    }

    /// Expire every past-due record still in Pending/Active/Suspended.
    ///
    /// This is the scheduled sweep; it returns the ids it expired.
    pub fn sweep_expired(&mut self, ctx: &OpContext) -> Vec<CertificationId> {
        let due: Vec<CertificationId> = self
            .records
            .values()
            .filter(|r| {
                r.is_past_due(ctx.now)
                    && matches!(
                        r.status,
                        CertificationStatus::Pending
                            | CertificationStatus::Active
                            | CertificationStatus::Suspended
                    )
            })
            .map(|r| r.id)
            .collect();

        let mut expired = Vec::with_capacity(due.len());
        for id in due {
            match self.expire(id, ctx) {
                Ok(_) => expired.push(id),
                // Races with concurrent callers are not modeled in-process;
                // a precondition failure here means the filter and the
                // record disagree, which is a bug worth hearing about.
                Err(err) => {
                    tracing::error!(certification = %id, error = %err, "sweep failed to expire");
                }
            }
        }
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "expiry sweep completed");
        }
        expired
    }

    // ── Read accessors ───────────────────────────────────────────────

    /// Fetch a record by id.
    pub fn get(&self, id: CertificationId) -> Option<&CertificationRecord> {
        self.records.get(&id)
    }

    /// All records, in id order.
    pub fn records(&self) -> impl Iterator<Item = &CertificationRecord> {
        self.records.values()
    }

    /// All records belonging to one provider.
    pub fn records_for(&self, provider: ProviderId) -> impl Iterator<Item = &CertificationRecord> {
        self.records.values().filter(move |r| r.provider == provider)
    }

    /// The transition outbox, for pumping reactors and trend queries.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    // ── Internals ────────────────────────────────────────────────────

    fn emit(&mut self, snapshot: RecordSnapshot, kind: TransitionKind, ctx: &OpContext) {
        let event = TransitionEvent {
            id: EventId::new(),
            at: ctx.now,
            actor: ctx.actor,
            origin: ctx.origin.clone(),
            snapshot,
            kind,
        };
        tracing::debug!(
            event = %event.id,
            kind = event.kind.label(),
            certification = %event.certification(),
            "transition event emitted"
        );
        self.outbox.append(event);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
