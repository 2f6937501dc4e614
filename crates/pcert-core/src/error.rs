//! # Error Types — Shared Error Hierarchy
//!
//! Errors for the foundational types. Domain crates define their own
//! error enums; this crate only covers failures constructing the
//! primitives themselves.

use thiserror::Error;

/// Errors raised by the foundational types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A timestamp string failed parsing or violated the UTC-only rule.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An identifier string was not a valid UUID.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
