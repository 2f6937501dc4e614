//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the stack. These prevent
//! accidental identifier confusion — you cannot pass a `ProviderId` where a
//! `CertificationId` is expected, and an audit entry cannot swap the acting
//! user for the record it acted on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a provider (supplier) account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(pub Uuid);

/// Unique identifier for a certification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CertificationId(pub Uuid);

/// Unique identifier for an acting user (verifier, admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

/// Unique identifier for a lifecycle transition event.
///
/// Reactors deduplicate on this id, so it must never be reused across
/// distinct transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl ProviderId {
    /// Generate a new random provider identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl CertificationId {
    /// Generate a new random certification identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl ActorId {
    /// Generate a new random actor identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl EventId {
    /// Generate a new random event identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// The identity a lifecycle operation is attributed to.
///
/// Scheduled sweeps and reminder delivery run as [`Actor::System`];
/// administrative actions carry the acting user's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// A system-triggered operation (expiry sweep, reminder delivery).
    System,
    /// An administrative user.
    User(ActorId),
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::User(id) => write!(f, "{id}"),
        }
    }
}

impl Default for ProviderId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for CertificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "provider:{}", self.0)
    }
}

impl std::fmt::Display for CertificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "certification:{}", self.0)
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor:{}", self.0)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event:{}", self.0)
    }
}
