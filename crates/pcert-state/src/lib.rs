//! # pcert-state — Certification Lifecycle
//!
//! The core of the Provider Certification Stack: the certification record
//! state machine, the lifecycle engine, the transition event log, and
//! snapshot export/import.
//!
//! ## Shape
//!
//! - **Record** (`record.rs`): `CertificationRecord` with two independent
//!   axes — lifecycle status (Pending/Active/Expired/Suspended/Revoked)
//!   and verification outcome (Pending/Verified/Rejected). Transitions are
//!   guarded methods; Revoked is the only terminal state.
//!
//! - **Engine** (`engine.rs`): the single mutation entry point. Every
//!   successful operation mutates the record and appends exactly one
//!   transition event to the outbox.
//!
//! - **Outbox** (`outbox.rs`): append-only event log plus the reactor pump
//!   that delivers events to side-effect consumers with per-event-id
//!   dedupe. Metrics, reminders, notifications, and audit all hang off
//!   this seam.
//!
//! - **Snapshot** (`snapshot.rs`): versioned JSON export/import of records
//!   and their transition log.

pub mod engine;
pub mod event;
pub mod outbox;
pub mod record;
pub mod snapshot;

// ─── Record re-exports ──────────────────────────────────────────────

pub use record::{
    CertificationError, CertificationRecord, CertificationStatus, CertificationUpdate, ChangeSet,
    FieldChange, NewCertification, NoteEntry, VerificationStatus,
};

// ─── Engine re-exports ──────────────────────────────────────────────

pub use engine::{CertificationEngine, OpContext};

// ─── Event re-exports ───────────────────────────────────────────────

pub use event::{RecordSnapshot, RequestOrigin, TransitionEvent, TransitionKind};

// ─── Outbox re-exports ──────────────────────────────────────────────

pub use outbox::{Outbox, PumpError, Reactor, ReactorError, ReactorPump};

// ─── Snapshot re-exports ────────────────────────────────────────────

pub use snapshot::{export, import, Snapshot, SNAPSHOT_FORMAT_VERSION};
