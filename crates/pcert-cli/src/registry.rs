//! # Registry File and Runtime
//!
//! The registry file is the CLI's storage: records, the transition log,
//! the reminder schedule, delivered notifications, and the audit trail,
//! in one versioned JSON document.
//!
//! Metrics are deliberately not persisted — they are derived state, and
//! every open rebuilds them by replaying the full transition log into a
//! fresh store. The persistent sinks (reminders, notifications, audit)
//! instead resume from the `delivered_through` checkpoint so replay
//! never duplicates a notification or an audit line.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use pcert_audit::{AuditEntry, AuditReactor, AuditSink, InMemoryAuditLog};
use pcert_core::ProviderId;
use pcert_metrics::{MetricsReactor, MetricsStore};
use pcert_notify::{
    InMemoryInbox, NotificationSink, NotifyReactor, ProviderDirectory, ProviderNotification,
};
use pcert_reminders::{ReminderEntry, ReminderReactor, ScheduleStore};
use pcert_state::{CertificationEngine, CertificationRecord, ReactorPump, TransitionEvent};

/// Current registry file format version.
pub const REGISTRY_FORMAT_VERSION: u32 = 1;

// ─── File Format ─────────────────────────────────────────────────────

/// On-disk shape of the registry.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistryFile {
    /// File format version; unknown versions are rejected on open.
    pub format_version: u32,
    /// All certification records.
    pub records: Vec<CertificationRecord>,
    /// The full transition log.
    pub events: Vec<TransitionEvent>,
    /// The reminder schedule table.
    pub reminders: Vec<ReminderEntry>,
    /// Delivered notifications per provider. A provider's presence here
    /// is also what makes it resolvable by the notification directory.
    pub inboxes: BTreeMap<ProviderId, Vec<ProviderNotification>>,
    /// The audit trail.
    pub audit: Vec<AuditEntry>,
    /// How many log events the persistent sinks have already consumed.
    pub delivered_through: usize,
}

impl RegistryFile {
    fn empty() -> Self {
        Self {
            format_version: REGISTRY_FORMAT_VERSION,
            records: Vec::new(),
            events: Vec::new(),
            reminders: Vec::new(),
            inboxes: BTreeMap::new(),
            audit: Vec::new(),
            delivered_through: 0,
        }
    }
}

// ─── Runtime ─────────────────────────────────────────────────────────

/// The engine plus all reactor state, wired for one CLI invocation.
pub struct Runtime {
    path: PathBuf,
    /// The lifecycle engine.
    pub engine: CertificationEngine,
    /// Derived per-provider counters, rebuilt on every open.
    pub metrics: Arc<MetricsStore>,
    /// The reminder schedule table.
    pub schedule: Arc<ScheduleStore>,
    /// Provider notification inboxes; doubles as the provider directory.
    pub inbox: Arc<InMemoryInbox>,
    /// The audit trail.
    pub audit_log: Arc<InMemoryAuditLog>,
    pump: ReactorPump,
}

impl Runtime {
    /// Open a registry file, creating an empty runtime if it does not
    /// exist yet. Rebuilds metrics by full replay and resumes the
    /// persistent sinks from the delivery checkpoint.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = if path.exists() {
            let bytes = fs::read(path)
                .with_context(|| format!("reading registry {}", path.display()))?;
            let file: RegistryFile = serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing registry {}", path.display()))?;
            if file.format_version != REGISTRY_FORMAT_VERSION {
                anyhow::bail!(
                    "unsupported registry format version {} (expected {})",
                    file.format_version,
                    REGISTRY_FORMAT_VERSION
                );
            }
            file
        } else {
            RegistryFile::empty()
        };
        Self::assemble(path.to_path_buf(), file)
    }

    /// Build a runtime from an imported snapshot: records and events are
    /// taken as-is, every derived store is rebuilt by full replay.
    pub fn from_snapshot(
        path: PathBuf,
        records: Vec<CertificationRecord>,
        events: Vec<TransitionEvent>,
    ) -> anyhow::Result<Self> {
        let mut file = RegistryFile::empty();
        // Providers become resolvable again so replayed notifications land.
        for record in &records {
            file.inboxes.entry(record.provider).or_default();
        }
        file.records = records;
        file.events = events;
        Self::assemble(path, file)
    }

    fn assemble(path: PathBuf, file: RegistryFile) -> anyhow::Result<Self> {
        let engine = CertificationEngine::restore(file.records, file.events);
        let checkpoint: Vec<_> = engine
            .outbox()
            .events()
            .iter()
            .take(file.delivered_through)
            .map(|e| e.id)
            .collect();

        let mut pump = ReactorPump::new();
        for reactor in ["reminders", "notify", "audit"] {
            pump.mark_processed(reactor, checkpoint.iter().copied());
        }

        let mut runtime = Self {
            path,
            engine,
            metrics: Arc::new(MetricsStore::new()),
            schedule: Arc::new(ScheduleStore::restore(file.reminders)),
            inbox: Arc::new(InMemoryInbox::restore(file.inboxes)),
            audit_log: Arc::new(InMemoryAuditLog::restore(file.audit)),
            pump,
        };
        runtime.sync()?;
        Ok(runtime)
    }

    /// Pump every undelivered outbox event through the reactors. Returns
    /// the number of (reactor, event) deliveries performed.
    pub fn sync(&mut self) -> anyhow::Result<usize> {
        let mut metrics = MetricsReactor::new(Arc::clone(&self.metrics));
        let mut reminders = ReminderReactor::new(Arc::clone(&self.schedule));
        let mut notify = NotifyReactor::new(
            Arc::clone(&self.inbox) as Arc<dyn ProviderDirectory>,
            Arc::clone(&self.inbox) as Arc<dyn NotificationSink>,
        );
        let mut audit = AuditReactor::new(Arc::clone(&self.audit_log) as Arc<dyn AuditSink>);

        let delivered = self.pump.pump(
            self.engine.outbox(),
            &mut [&mut metrics, &mut reminders, &mut notify, &mut audit],
        )?;
        Ok(delivered)
    }

    /// Write the registry back to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let file = RegistryFile {
            format_version: REGISTRY_FORMAT_VERSION,
            records: self.engine.records().cloned().collect(),
            events: self.engine.outbox().events().to_vec(),
            reminders: self.schedule.entries(),
            inboxes: self.inbox.snapshot(),
            audit: self.audit_log.entries(),
            delivered_through: self.engine.outbox().len(),
        };
        let bytes = serde_json::to_vec_pretty(&file).context("serializing registry")?;
        fs::write(&self.path, bytes)
            .with_context(|| format!("writing registry {}", self.path.display()))?;
        Ok(())
    }
}
