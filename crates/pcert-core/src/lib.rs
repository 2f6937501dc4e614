//! # pcert-core — Foundational Types for the Provider Certification Stack
//!
//! This crate is the bedrock of the stack. It defines the type-system
//! primitives every other crate builds on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `ProviderId`,
//!    `CertificationId`, `ActorId`, `EventId` — all uuid-backed newtypes.
//!    No bare strings or raw uuids for identifiers.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision, and carries the day-offset arithmetic
//!    the reminder scheduler is built on.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pcert-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use identity::{Actor, ActorId, CertificationId, EventId, ProviderId};
pub use temporal::Timestamp;
