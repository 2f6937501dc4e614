//! # pcert-audit — Lifecycle Activity Log
//!
//! Every lifecycle transition produces one audit entry: who did what to
//! which certification, when, from where, at what severity. Entries are
//! emitted as structured `tracing` events at the level their severity
//! maps to, and duplicated into an [`AuditSink`] so the trail survives
//! independently of log routing.

pub mod entry;
pub mod reactor;

pub use entry::{AuditEntry, AuditSeverity};
pub use reactor::{AuditReactor, AuditSink, InMemoryAuditLog};
