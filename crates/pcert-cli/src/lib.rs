//! # pcert-cli — Provider Certification Command-Line Interface
//!
//! Structured clap-based CLI over the certification engine. State lives
//! in a JSON registry file; every command opens it, performs its
//! operation, pumps the outbox through the reactors, and writes it back.
//!
//! ## Subcommands
//!
//! - `create`, `verify`, `reject`, `renew`, `suspend`, `revoke`,
//!   `update` — lifecycle operations on one certification
//! - `sweep` — expire every past-due record
//! - `remind` — deliver due expiry reminders
//! - `stats` — per-provider profile or global roll-up, with trends
//! - `export` / `import` — versioned snapshot transfer
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to domain crates — no business logic here.

pub mod lifecycle;
pub mod registry;
pub mod reporting;
pub mod transfer;
