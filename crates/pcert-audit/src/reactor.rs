//! # Audit Reactor
//!
//! Turns each transition event into an [`AuditEntry`], emits it as a
//! structured `tracing` event at the level its severity maps to, and
//! appends it to the sink. Notice has no native `tracing` level, so it
//! rides on `info` and keeps its severity as a field.

use std::sync::{Arc, Mutex, MutexGuard};

use pcert_core::CertificationId;
use pcert_state::{Reactor, ReactorError, TransitionEvent};

use crate::entry::{AuditEntry, AuditSeverity};

// ─── Sink ────────────────────────────────────────────────────────────

/// Durable destination for audit entries.
pub trait AuditSink: Send + Sync {
    /// Append one entry. Failures are surfaced to the pump.
    fn append(&self, entry: AuditEntry) -> Result<(), ReactorError>;
}

/// In-memory trail, for tests and the CLI registry.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    /// Create an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a trail from persisted entries.
    pub fn restore(entries: Vec<AuditEntry>) -> Self {
        Self { entries: Mutex::new(entries) }
    }

    /// Every entry, in append order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().clone()
    }

    /// Entries for one certification, in append order.
    pub fn entries_for(&self, certification: CertificationId) -> Vec<AuditEntry> {
        self.lock().iter().filter(|e| e.certification == certification).cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AuditEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AuditSink for InMemoryAuditLog {
    fn append(&self, entry: AuditEntry) -> Result<(), ReactorError> {
        self.lock().push(entry);
        Ok(())
    }
}

// ─── Reactor ─────────────────────────────────────────────────────────

/// The activity-logging reactor.
pub struct AuditReactor {
    sink: Arc<dyn AuditSink>,
}

impl AuditReactor {
    /// Build an audit reactor over a sink.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }
}

impl Reactor for AuditReactor {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn apply(&mut self, event: &TransitionEvent) -> Result<(), ReactorError> {
        let entry = AuditEntry::of(event);
        match entry.severity {
            AuditSeverity::Warning => tracing::warn!(
                certification = %entry.certification,
                provider = %entry.provider,
                actor = %entry.actor,
                operation = entry.operation,
                severity = %entry.severity,
                detail = %entry.detail,
                "certification activity"
            ),
            AuditSeverity::Info | AuditSeverity::Notice => tracing::info!(
                certification = %entry.certification,
                provider = %entry.provider,
                actor = %entry.actor,
                operation = entry.operation,
                severity = %entry.severity,
                detail = %entry.detail,
                "certification activity"
            ),
        }
        self.sink.append(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcert_core::{ActorId, ProviderId, Timestamp};
    use pcert_state::{CertificationEngine, NewCertification, OpContext, ReactorPump, RequestOrigin};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn make_input(provider: ProviderId) -> NewCertification {
        NewCertification {
            provider,
            name: "HACCP".to_string(),
            issuing_organization: "Codex Alimentarius".to_string(),
            category: "food-safety".to_string(),
            certification_number: "H-1".to_string(),
            issue_date: ts("2026-01-01T00:00:00Z"),
            expiry_date: ts("2027-01-01T00:00:00Z"),
            recurring: false,
            initial_status: None,
        }
    }

    #[test]
    fn test_every_transition_leaves_one_entry() {
        let mut engine = CertificationEngine::new();
        let provider = ProviderId::new();
        let verifier = ActorId::new();
        let id = engine
            .create(make_input(provider), &OpContext::system(ts("2026-01-01T00:00:00Z")))
            .unwrap()
            .id;
        engine
            .verify(id, verifier, &OpContext::user(verifier, ts("2026-01-02T00:00:00Z")))
            .unwrap();
        engine.suspend(id, "audit hold", &OpContext::system(ts("2026-02-01T00:00:00Z"))).unwrap();

        let log = Arc::new(InMemoryAuditLog::new());
        let mut reactor = AuditReactor::new(Arc::clone(&log) as Arc<dyn AuditSink>);
        ReactorPump::new().pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        let trail = log.entries_for(id);
        assert_eq!(trail.len(), 3);
        assert_eq!(trail[0].operation, "created");
        assert_eq!(trail[0].severity, AuditSeverity::Info);
        assert_eq!(trail[0].actor, "system");
        assert_eq!(trail[1].operation, "verified");
        assert_eq!(trail[1].actor, verifier.to_string());
        assert_eq!(trail[2].operation, "suspended");
        assert_eq!(trail[2].severity, AuditSeverity::Warning);
    }

    #[test]
    fn test_origin_metadata_is_carried() {
        let mut engine = CertificationEngine::new();
        let actor = ActorId::new();
        let mut ctx = OpContext::user(actor, ts("2026-01-01T00:00:00Z"));
        ctx.origin = Some(RequestOrigin {
            ip: Some("203.0.113.9".to_string()),
            agent: Some("curl/8.5".to_string()),
        });
        let id = engine.create(make_input(ProviderId::new()), &ctx).unwrap().id;

        let log = Arc::new(InMemoryAuditLog::new());
        let mut reactor = AuditReactor::new(Arc::clone(&log) as Arc<dyn AuditSink>);
        ReactorPump::new().pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        let trail = log.entries_for(id);
        assert_eq!(trail[0].ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(trail[0].agent.as_deref(), Some("curl/8.5"));
    }

    #[test]
    fn test_expiry_is_notice_and_detail_names_the_date() {
        let mut engine = CertificationEngine::new();
        let now = ts("2026-01-01T00:00:00Z");
        let id = engine.create(make_input(ProviderId::new()), &OpContext::system(now)).unwrap().id;
        engine.expire(id, &OpContext::system(ts("2027-06-01T00:00:00Z"))).unwrap();

        let log = Arc::new(InMemoryAuditLog::new());
        let mut reactor = AuditReactor::new(Arc::clone(&log) as Arc<dyn AuditSink>);
        ReactorPump::new().pump(engine.outbox(), &mut [&mut reactor]).unwrap();

        let trail = log.entries_for(id);
        assert_eq!(trail[1].severity, AuditSeverity::Notice);
        assert!(trail[1].detail.contains("2027-01-01"));
    }
}
