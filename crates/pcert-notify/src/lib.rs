//! # pcert-notify — Provider-Facing Notifications
//!
//! Maps lifecycle transitions 1:1 to provider-facing notification
//! subtypes and delivers them through pluggable seams:
//!
//! - [`ProviderDirectory`] answers "does this provider exist" — a missing
//!   provider is logged and skipped, never an error;
//! - [`NotificationSink`] actually delivers (mail, push, queue); an
//!   in-memory inbox implementation backs tests and the CLI.

pub mod dispatcher;
pub mod notification;

pub use dispatcher::{InMemoryInbox, NotificationSink, NotifyReactor, ProviderDirectory};
pub use notification::ProviderNotification;
