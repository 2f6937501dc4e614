//! # Notification Subtypes
//!
//! One provider-facing notification per lifecycle transition, plus the
//! reminder-driven expiry notifications. Each before-expiry offset gets
//! its own `ExpiringSoon` message; the expiry day and the after-expiry
//! follow-ups all reuse `Expired`.

use serde::{Deserialize, Serialize};

use pcert_core::Timestamp;
use pcert_state::{TransitionEvent, TransitionKind};

/// What the provider is told.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProviderNotification {
    /// A certification was recorded for you.
    Added,
    /// Your certification was verified.
    Verified,
    /// Your certification was rejected.
    Rejected {
        /// Why it was rejected.
        reason: String,
    },
    /// Your certification expires soon.
    ExpiringSoon {
        /// Days until expiry for the reminder that fired.
        days_until_expiry: u32,
    },
    /// Your certification has expired.
    Expired,
    /// Your certification was renewed.
    Renewed {
        /// The new expiry date.
        new_expiry: Timestamp,
    },
    /// Your certification was suspended.
    Suspended {
        /// Why it was suspended.
        reason: String,
    },
    /// Your certification was revoked.
    Revoked {
        /// Why it was revoked.
        reason: String,
    },
    /// Your certification's details were updated.
    Updated,
}

impl ProviderNotification {
    /// The notification for a lifecycle transition event.
    pub fn for_transition(event: &TransitionEvent) -> Self {
        match &event.kind {
            TransitionKind::Created => Self::Added,
            TransitionKind::Verified { .. } => Self::Verified,
            TransitionKind::Rejected { reason } => Self::Rejected { reason: reason.clone() },
            TransitionKind::Renewed { new_expiry } => Self::Renewed { new_expiry: *new_expiry },
            TransitionKind::Suspended { reason } => Self::Suspended { reason: reason.clone() },
            TransitionKind::Revoked { reason } => Self::Revoked { reason: reason.clone() },
            TransitionKind::Expired => Self::Expired,
            TransitionKind::Updated { .. } => Self::Updated,
        }
    }
}
