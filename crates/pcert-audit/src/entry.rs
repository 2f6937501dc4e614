//! # Audit Entries
//!
//! An audit entry is the durable record of one lifecycle transition.
//! Severity is a function of the operation alone: routine progress is
//! Info, adverse decisions are Warning, and the expected-but-notable
//! passage into expiry is Notice.

use serde::{Deserialize, Serialize};

use pcert_core::{Actor, CertificationId, EventId, ProviderId, Timestamp};
use pcert_state::{TransitionEvent, TransitionKind};

// ─── Severity ────────────────────────────────────────────────────────

/// How loud the trail should be about an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditSeverity {
    /// Routine lifecycle progress.
    Info,
    /// Expected but operationally notable (expiry).
    Notice,
    /// An adverse decision against the certification.
    Warning,
}

impl AuditSeverity {
    /// The severity for a transition kind.
    pub fn of(kind: &TransitionKind) -> Self {
        match kind {
            TransitionKind::Created
            | TransitionKind::Verified { .. }
            | TransitionKind::Renewed { .. }
            | TransitionKind::Updated { .. } => Self::Info,
            TransitionKind::Expired => Self::Notice,
            TransitionKind::Rejected { .. }
            | TransitionKind::Suspended { .. }
            | TransitionKind::Revoked { .. } => Self::Warning,
        }
    }
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
        };
        f.write_str(s)
    }
}

// ─── Entry ───────────────────────────────────────────────────────────

/// One line of the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The transition event this entry records.
    pub event: EventId,
    /// When the transition happened.
    pub at: Timestamp,
    /// The certification acted on.
    pub certification: CertificationId,
    /// Its owning provider.
    pub provider: ProviderId,
    /// Who acted; the scheduler and sweeps act as `system`.
    pub actor: String,
    /// Remote IP, when the operation came in over the wire.
    pub ip: Option<String>,
    /// User agent, when available.
    pub agent: Option<String>,
    /// Stable operation label (`created`, `verified`, ...).
    pub operation: String,
    /// Severity derived from the operation.
    pub severity: AuditSeverity,
    /// Human-readable account of what happened.
    pub detail: String,
}

impl AuditEntry {
    /// Build the entry for a transition event.
    pub fn of(event: &TransitionEvent) -> Self {
        let (ip, agent) = match &event.origin {
            Some(origin) => (origin.ip.clone(), origin.agent.clone()),
            None => (None, None),
        };
        Self {
            event: event.id,
            at: event.at,
            certification: event.certification(),
            provider: event.provider(),
            actor: actor_label(&event.actor),
            ip,
            agent,
            operation: event.kind.label().to_string(),
            severity: AuditSeverity::of(&event.kind),
            detail: detail_for(event),
        }
    }
}

fn actor_label(actor: &Actor) -> String {
    actor.to_string()
}

fn detail_for(event: &TransitionEvent) -> String {
    let name = &event.snapshot.name;
    match &event.kind {
        TransitionKind::Created => {
            format!("certification '{name}' recorded with status {:?}", event.snapshot.status)
        }
        TransitionKind::Verified { verifier } => {
            format!("certification '{name}' verified by {verifier}")
        }
        TransitionKind::Rejected { reason } => {
            format!("certification '{name}' rejected: {reason}")
        }
        TransitionKind::Renewed { new_expiry } => {
            format!("certification '{name}' renewed until {new_expiry}")
        }
        TransitionKind::Suspended { reason } => {
            format!("certification '{name}' suspended: {reason}")
        }
        TransitionKind::Revoked { reason } => {
            format!("certification '{name}' revoked: {reason}")
        }
        TransitionKind::Expired => {
            format!("certification '{name}' expired on {}", event.snapshot.expiry_date)
        }
        TransitionKind::Updated { changes } => {
            let fields: Vec<&str> = changes.keys().map(String::as_str).collect();
            format!("certification '{name}' updated: {}", fields.join(", "))
        }
    }
}
