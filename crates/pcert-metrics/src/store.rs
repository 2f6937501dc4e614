//! # Metrics Store
//!
//! Holds the provider aggregates behind a single lock. Every counter
//! mutation for every provider goes through [`MetricsStore::apply`], so
//! concurrent transitions on the same provider serialize instead of
//! racing read-modify-write cycles against each other. Readers get
//! point-in-time clones tagged with the aggregate version.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use pcert_core::ProviderId;
use pcert_state::{Reactor, ReactorError, TransitionEvent};

use crate::profile::ProviderProfile;

/// Thread-safe owner of all provider aggregates.
#[derive(Debug, Default)]
pub struct MetricsStore {
    inner: Mutex<BTreeMap<ProviderId, ProviderProfile>>,
}

impl MetricsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into its provider's aggregate, creating the
    /// aggregate on first sight.
    pub fn apply(&self, event: &TransitionEvent) {
        let mut guard = self.lock();
        let profile = guard
            .entry(event.provider())
            .or_insert_with(|| ProviderProfile::new(event.provider()));
        profile.apply(event);
        tracing::debug!(
            provider = %event.provider(),
            kind = event.kind.label(),
            version = profile.version,
            "metrics applied"
        );
    }

    /// Point-in-time clone of one provider's aggregate.
    pub fn profile(&self, provider: ProviderId) -> Option<ProviderProfile> {
        self.lock().get(&provider).cloned()
    }

    /// Point-in-time clones of every aggregate.
    pub fn all_profiles(&self) -> Vec<ProviderProfile> {
        self.lock().values().cloned().collect()
    }

    /// Number of providers with an aggregate.
    pub fn provider_count(&self) -> usize {
        self.lock().len()
    }

    // A poisoned lock means another thread panicked mid-apply; the
    // aggregates are still structurally valid (profile.apply does not
    // unwind between related counters), so recover the guard.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<ProviderId, ProviderProfile>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The reactor that feeds the store from the outbox.
#[derive(Debug, Clone)]
pub struct MetricsReactor {
    store: Arc<MetricsStore>,
}

impl MetricsReactor {
    /// Wrap a shared store.
    pub fn new(store: Arc<MetricsStore>) -> Self {
        Self { store }
    }

    /// The underlying store, for read access.
    pub fn store(&self) -> &Arc<MetricsStore> {
        &self.store
    }
}

impl Reactor for MetricsReactor {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn apply(&mut self, event: &TransitionEvent) -> Result<(), ReactorError> {
        self.store.apply(event);
        Ok(())
    }
}
