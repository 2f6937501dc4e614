//! # Aggregate Statistics and Trend Queries
//!
//! Read accessors over the metrics store and the transition log: global
//! roll-ups across providers, and per-day activity trends over a date
//! range. These are pure reads — nothing here mutates an aggregate.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pcert_core::Timestamp;
use pcert_state::{CertificationStatus, TransitionEvent};

use crate::store::MetricsStore;

/// Stack-wide roll-up across every provider aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Providers with at least one certification.
    pub providers: usize,
    /// Certifications across all providers.
    pub total_certifications: u64,
    /// Verification occurrences across all providers.
    pub verified_certifications: u64,
    /// Certifications currently expired, across all providers.
    pub expired_certifications: u64,
    /// Certification count per category.
    pub by_category: BTreeMap<String, u64>,
    /// Current population per lifecycle status.
    pub by_status: BTreeMap<CertificationStatus, u64>,
}

/// Roll up every provider aggregate into one global view.
pub fn global_stats(store: &MetricsStore) -> GlobalStats {
    let mut stats = GlobalStats::default();
    for profile in store.all_profiles() {
        stats.providers += 1;
        stats.total_certifications += profile.total_certifications;
        stats.verified_certifications += profile.verified_certifications;
        stats.expired_certifications += profile.expired_certifications;
        for (category, count) in &profile.by_category {
            *stats.by_category.entry(category.clone()).or_default() += count;
        }
        for (status, count) in &profile.by_status {
            *stats.by_status.entry(*status).or_default() += count;
        }
    }
    stats
}

/// Per-day transition counts, keyed by UTC date then event kind label.
pub type Trend = BTreeMap<NaiveDate, BTreeMap<&'static str, u64>>;

/// Count transitions per UTC day per kind within `[from, to]` inclusive.
pub fn trend(events: &[TransitionEvent], from: Timestamp, to: Timestamp) -> Trend {
    let mut buckets = Trend::new();
    for event in events {
        if event.at < from || event.at > to {
            continue;
        }
        *buckets
            .entry(event.at.date())
            .or_default()
            .entry(event.kind.label())
            .or_default() += 1;
    }
    buckets
}
