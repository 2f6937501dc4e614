//! # Notification Dispatcher
//!
//! The reactor that turns transition events into provider-facing
//! notifications. Provider resolution and actual delivery are both
//! behind traits; the in-memory inbox is the default implementation for
//! tests and the CLI registry.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use pcert_core::ProviderId;
use pcert_state::{Reactor, ReactorError, TransitionEvent};

use crate::notification::ProviderNotification;

// ─── Seams ───────────────────────────────────────────────────────────

/// Answers whether a provider reference resolves to a known provider.
///
/// The full provider entity lives outside this subsystem; the dispatcher
/// only needs existence.
pub trait ProviderDirectory: Send + Sync {
    /// Whether the provider exists.
    fn exists(&self, provider: ProviderId) -> bool;
}

/// Delivers one notification to one provider.
pub trait NotificationSink: Send + Sync {
    /// Deliver the notification. Failures are surfaced to the pump.
    fn send(
        &self,
        provider: ProviderId,
        notification: ProviderNotification,
    ) -> Result<(), ReactorError>;
}

// ─── In-Memory Inbox ─────────────────────────────────────────────────

/// A sink that files notifications into per-provider inboxes. Doubles as
/// a directory: a provider exists once registered.
#[derive(Debug, Default)]
pub struct InMemoryInbox {
    inboxes: Mutex<BTreeMap<ProviderId, Vec<ProviderNotification>>>,
}

impl InMemoryInbox {
    /// Create an empty inbox set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore inboxes from a persisted snapshot.
    pub fn restore(inboxes: BTreeMap<ProviderId, Vec<ProviderNotification>>) -> Self {
        Self { inboxes: Mutex::new(inboxes) }
    }

    /// Register a provider so the directory resolves it.
    pub fn register(&self, provider: ProviderId) {
        self.lock().entry(provider).or_default();
    }

    /// Snapshot every inbox, for persistence.
    pub fn snapshot(&self) -> BTreeMap<ProviderId, Vec<ProviderNotification>> {
        self.lock().clone()
    }

    /// Everything delivered to one provider, in delivery order.
    pub fn messages(&self, provider: ProviderId) -> Vec<ProviderNotification> {
        self.lock().get(&provider).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ProviderId, Vec<ProviderNotification>>> {
        self.inboxes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProviderDirectory for InMemoryInbox {
    fn exists(&self, provider: ProviderId) -> bool {
        self.lock().contains_key(&provider)
    }
}

impl NotificationSink for InMemoryInbox {
    fn send(
        &self,
        provider: ProviderId,
        notification: ProviderNotification,
    ) -> Result<(), ReactorError> {
        self.lock().entry(provider).or_default().push(notification);
        Ok(())
    }
}

// ─── Reactor ─────────────────────────────────────────────────────────

/// Maps each transition event to its notification and delivers it.
///
/// A missing provider reference logs a warning and skips delivery — the
/// transition itself already committed, and a dangling reference is an
/// upstream data problem, not a reason to wedge the pump.
pub struct NotifyReactor {
    directory: Arc<dyn ProviderDirectory>,
    sink: Arc<dyn NotificationSink>,
}

impl NotifyReactor {
    /// Build a dispatcher over a directory and a sink.
    pub fn new(directory: Arc<dyn ProviderDirectory>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { directory, sink }
    }
}

impl Reactor for NotifyReactor {
    fn name(&self) -> &'static str {
        "notify"
    }

    fn apply(&mut self, event: &TransitionEvent) -> Result<(), ReactorError> {
        let provider = event.provider();
        if !self.directory.exists(provider) {
            tracing::warn!(
                provider = %provider,
                certification = %event.certification(),
                kind = event.kind.label(),
                "provider not found; notification skipped"
            );
            return Ok(());
        }
        let notification = ProviderNotification::for_transition(event);
        self.sink.send(provider, notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcert_core::Timestamp;
    use pcert_state::{CertificationEngine, NewCertification, OpContext, ReactorPump};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn make_input(provider: ProviderId) -> NewCertification {
        NewCertification {
            provider,
            name: "B Corp".to_string(),
            issuing_organization: "B Lab".to_string(),
            category: "ethics".to_string(),
            certification_number: "B-1".to_string(),
            issue_date: ts("2026-01-01T00:00:00Z"),
            expiry_date: ts("2027-01-01T00:00:00Z"),
            recurring: false,
            initial_status: None,
        }
    }

    #[test]
    fn test_registered_provider_receives_notifications() {
        let mut engine = CertificationEngine::new();
        let provider = ProviderId::new();
        let inbox = Arc::new(InMemoryInbox::new());
        inbox.register(provider);

        let ctx = OpContext::system(ts("2026-01-01T00:00:00Z"));
        let id = engine.create(make_input(provider), &ctx).unwrap().id;
        engine.suspend(id, "audit", &OpContext::system(ts("2026-02-01T00:00:00Z"))).unwrap();

        let mut reactor =
            NotifyReactor::new(Arc::clone(&inbox) as Arc<dyn ProviderDirectory>, inbox.clone());
        ReactorPump::new().pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        let messages = inbox.messages(provider);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ProviderNotification::Added);
        assert_eq!(messages[1], ProviderNotification::Suspended { reason: "audit".to_string() });
    }

    #[test]
    fn test_missing_provider_is_skipped_not_failed() {
        let mut engine = CertificationEngine::new();
        let provider = ProviderId::new();
        let inbox = Arc::new(InMemoryInbox::new());
        // Provider deliberately not registered.

        let ctx = OpContext::system(ts("2026-01-01T00:00:00Z"));
        engine.create(make_input(provider), &ctx).unwrap();

        let mut reactor =
            NotifyReactor::new(Arc::clone(&inbox) as Arc<dyn ProviderDirectory>, inbox.clone());
        let delivered = ReactorPump::new().pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        // The event is processed (delivery attempted) but nothing lands.
        assert_eq!(delivered, 1);
        assert!(inbox.messages(provider).is_empty());
    }
}
