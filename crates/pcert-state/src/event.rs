//! # Transition Events
//!
//! Every successful lifecycle operation emits exactly one `TransitionEvent`
//! into the outbox. Events are self-contained: they carry a snapshot of the
//! record as of the transition, so reactors never reach back into the
//! record store and replay stays deterministic.

use serde::{Deserialize, Serialize};

use pcert_core::{Actor, ActorId, CertificationId, EventId, ProviderId, Timestamp};

use crate::record::{CertificationRecord, CertificationStatus, ChangeSet, VerificationStatus};

// ─── Request Origin ──────────────────────────────────────────────────

/// Where the triggering request came from, when known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestOrigin {
    /// Remote IP address, if the operation came in over the wire.
    pub ip: Option<String>,
    /// User agent string, if available.
    pub agent: Option<String>,
}

// ─── Record Snapshot ─────────────────────────────────────────────────

/// The state of a certification as of a transition.
///
/// `previous_status` is what the metrics reactor uses to move the
/// per-status population counters without consulting the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSnapshot {
    /// The certification the event concerns.
    pub certification: CertificationId,
    /// Its owning provider.
    pub provider: ProviderId,
    /// Certification name at transition time.
    pub name: String,
    /// Category at transition time.
    pub category: String,
    /// Issuing organization at transition time.
    pub issuing_organization: String,
    /// Lifecycle status before the transition.
    pub previous_status: CertificationStatus,
    /// Lifecycle status after the transition.
    pub status: CertificationStatus,
    /// Verification outcome after the transition.
    pub verification_status: VerificationStatus,
    /// Issue date after the transition.
    pub issue_date: Timestamp,
    /// Expiry date after the transition.
    pub expiry_date: Timestamp,
    /// Renewal date after the transition, if any.
    pub renewal_date: Option<Timestamp>,
    /// Verification timestamp after the transition, if any.
    pub verified_at: Option<Timestamp>,
    /// When the record was created.
    pub created_at: Timestamp,
    /// Recurrence flag after the transition.
    pub recurring: bool,
}

impl RecordSnapshot {
    /// Capture a record after a transition, remembering its prior status.
    pub fn of(record: &CertificationRecord, previous_status: CertificationStatus) -> Self {
        Self {
            certification: record.id,
            provider: record.provider,
            name: record.name.clone(),
            category: record.category.clone(),
            issuing_organization: record.issuing_organization.clone(),
            previous_status,
            status: record.status,
            verification_status: record.verification_status,
            issue_date: record.issue_date,
            expiry_date: record.expiry_date,
            renewal_date: record.renewal_date,
            verified_at: record.verified_at,
            created_at: record.created_at,
            recurring: record.recurring,
        }
    }
}

// ─── Transition Kind ─────────────────────────────────────────────────

/// Which lifecycle operation fired, with its operation-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransitionKind {
    /// A new certification record was persisted.
    Created,
    /// The certification was confirmed authentic.
    Verified {
        /// The user who verified it.
        verifier: ActorId,
    },
    /// The certification was rejected as inauthentic.
    Rejected {
        /// Why it was rejected.
        reason: String,
    },
    /// The certification was renewed with a fresh expiry.
    Renewed {
        /// The new expiry date.
        new_expiry: Timestamp,
    },
    /// The certification was suspended.
    Suspended {
        /// Why it was suspended.
        reason: String,
    },
    /// The certification was permanently revoked.
    Revoked {
        /// Why it was revoked.
        reason: String,
    },
    /// The certification passed its expiry date.
    Expired,
    /// Descriptive fields were edited.
    Updated {
        /// Effective field diff (no-op fields omitted).
        changes: ChangeSet,
    },
}

impl TransitionKind {
    /// Stable lowercase label for logging and trend bucketing.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Verified { .. } => "verified",
            Self::Rejected { .. } => "rejected",
            Self::Renewed { .. } => "renewed",
            Self::Suspended { .. } => "suspended",
            Self::Revoked { .. } => "revoked",
            Self::Expired => "expired",
            Self::Updated { .. } => "updated",
        }
    }
}

// ─── Transition Event ────────────────────────────────────────────────

/// One lifecycle transition, as appended to the outbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Unique event id; reactors deduplicate on this.
    pub id: EventId,
    /// When the transition happened.
    pub at: Timestamp,
    /// Who triggered it.
    pub actor: Actor,
    /// Request origin metadata, when available.
    pub origin: Option<RequestOrigin>,
    /// The record as of the transition.
    pub snapshot: RecordSnapshot,
    /// The operation that fired and its payload.
    pub kind: TransitionKind,
}

impl TransitionEvent {
    /// Convenience accessor for the certification id.
    pub fn certification(&self) -> CertificationId {
        self.snapshot.certification
    }

    /// Convenience accessor for the provider id.
    pub fn provider(&self) -> ProviderId {
        self.snapshot.provider
    }
}
