//! # Provider Profile Aggregate
//!
//! The denormalized per-provider counter aggregate behind dashboards.
//! One profile is the single owner of all counters for its provider:
//! every mutation flows through [`ProviderProfile::apply`], keyed by a
//! transition event, and bumps the aggregate's version tag. Nothing else
//! writes counters.
//!
//! Named population counters (active/expired/suspended/revoked) track the
//! current number of certifications in that status and move on every
//! status change; verified/rejected/renewed count occurrences and only
//! ever grow. The per-status map is enum-keyed — no status name is ever
//! interpolated into a storage key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pcert_core::{ProviderId, Timestamp};
use pcert_state::{CertificationStatus, TransitionEvent, TransitionKind};

use crate::scores::{self, Scores};
use crate::timeline::RollingAverage;

/// Per-provider counters, scores, and timeline averages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// The provider this aggregate belongs to.
    pub provider: ProviderId,
    /// Bumped on every applied event; lets readers detect stale reads.
    pub version: u64,

    // ── Counters ─────────────────────────────────────────────────────
    /// All certifications ever recorded for this provider.
    pub total_certifications: u64,
    /// Occurrences of verification.
    pub verified_certifications: u64,
    /// Occurrences of rejection.
    pub rejected_certifications: u64,
    /// Certifications currently Active.
    pub active_certifications: u64,
    /// Certifications currently Expired.
    pub expired_certifications: u64,
    /// Certifications currently Suspended.
    pub suspended_certifications: u64,
    /// Certifications currently Revoked.
    pub revoked_certifications: u64,
    /// Occurrences of renewal.
    pub renewed_certifications: u64,
    /// Certification count per category.
    pub by_category: BTreeMap<String, u64>,
    /// Current population per lifecycle status (enum-keyed).
    pub by_status: BTreeMap<CertificationStatus, u64>,
    /// Certification count per issuing organization; diversity is the
    /// number of distinct keys.
    pub organizations: BTreeMap<String, u64>,

    // ── Derived ──────────────────────────────────────────────────────
    /// The three dashboard scores; `None` until total > 0.
    pub scores: Scores,
    /// Days from record creation to verification.
    pub verification_time: RollingAverage,
    /// Days from issue to expiry, observed at expiry.
    pub certification_lifespan: RollingAverage,
    /// Days from issue to renewal, observed at renewal.
    pub renewal_time: RollingAverage,
    /// Timestamp of the most recent lifecycle activity.
    pub last_certification_activity: Option<Timestamp>,
}

impl ProviderProfile {
    /// Fresh aggregate with every counter at zero.
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            version: 0,
            total_certifications: 0,
            verified_certifications: 0,
            rejected_certifications: 0,
            active_certifications: 0,
            expired_certifications: 0,
            suspended_certifications: 0,
            revoked_certifications: 0,
            renewed_certifications: 0,
            by_category: BTreeMap::new(),
            by_status: BTreeMap::new(),
            organizations: BTreeMap::new(),
            scores: Scores::default(),
            verification_time: RollingAverage::default(),
            certification_lifespan: RollingAverage::default(),
            renewal_time: RollingAverage::default(),
            last_certification_activity: None,
        }
    }

    /// Number of distinct issuing organizations.
    pub fn issuing_organization_diversity(&self) -> usize {
        self.organizations.len()
    }

    /// Fold one transition event into the aggregate.
    ///
    /// Status-population moves are driven entirely by the event's
    /// previous/new status snapshot, so applying a replayed log to a fresh
    /// profile reproduces the same counters.
    pub fn apply(&mut self, event: &TransitionEvent) {
        let snapshot = &event.snapshot;
        match &event.kind {
            TransitionKind::Created => {
                self.total_certifications += 1;
                bump(&mut self.by_category, &snapshot.category, 1);
                bump(&mut self.organizations, &snapshot.issuing_organization, 1);
                // No previous population to move from on create.
                *self.by_status.entry(snapshot.status).or_default() += 1;
                self.sync_named_population(snapshot.status, 1);
            }
            TransitionKind::Verified { .. } => {
                self.verified_certifications += 1;
                if let Some(verified_at) = snapshot.verified_at {
                    let days = snapshot.created_at.days_until(verified_at);
                    self.verification_time.add(days.max(0) as f64);
                }
            }
            TransitionKind::Rejected { .. } => {
                self.rejected_certifications += 1;
            }
            TransitionKind::Renewed { .. } => {
                self.renewed_certifications += 1;
                self.move_status(snapshot.previous_status, snapshot.status);
                if let Some(renewal_date) = snapshot.renewal_date {
                    let days = snapshot.issue_date.days_until(renewal_date);
                    self.renewal_time.add(days.max(0) as f64);
                }
            }
            TransitionKind::Suspended { .. } | TransitionKind::Revoked { .. } => {
                self.move_status(snapshot.previous_status, snapshot.status);
            }
            TransitionKind::Expired => {
                self.move_status(snapshot.previous_status, snapshot.status);
                let days = snapshot.issue_date.days_until(snapshot.expiry_date);
                self.certification_lifespan.add(days.max(0) as f64);
            }
            TransitionKind::Updated { changes } => {
                if let Some(change) = changes.get("category") {
                    bump_down(&mut self.by_category, &change.old);
                    bump(&mut self.by_category, &change.new, 1);
                }
                if let Some(change) = changes.get("issuing_organization") {
                    bump_down(&mut self.organizations, &change.old);
                    bump(&mut self.organizations, &change.new, 1);
                }
            }
        }

        self.last_certification_activity = Some(event.at);
        self.scores = scores::compute(self);
        self.version += 1;
    }

    /// Move one certification between status populations.
    fn move_status(&mut self, from: CertificationStatus, to: CertificationStatus) {
        if from == to {
            return;
        }
        if let Some(count) = self.by_status.get_mut(&from) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.by_status.remove(&from);
            }
        }
        *self.by_status.entry(to).or_default() += 1;
        self.sync_named_population(from, -1);
        self.sync_named_population(to, 1);
    }

    /// Keep the named population counters consistent with `by_status`.
    fn sync_named_population(&mut self, status: CertificationStatus, delta: i64) {
        let counter = match status {
            CertificationStatus::Active => &mut self.active_certifications,
            CertificationStatus::Expired => &mut self.expired_certifications,
            CertificationStatus::Suspended => &mut self.suspended_certifications,
            CertificationStatus::Revoked => &mut self.revoked_certifications,
            // Pending has no named counter; by_status covers it.
            CertificationStatus::Pending => return,
        };
        if delta >= 0 {
            *counter += delta as u64;
        } else {
            *counter = counter.saturating_sub(delta.unsigned_abs());
        }
    }
}

fn bump(map: &mut BTreeMap<String, u64>, key: &str, delta: u64) {
    *map.entry(key.to_string()).or_default() += delta;
}

fn bump_down(map: &mut BTreeMap<String, u64>, key: &str) {
    if let Some(count) = map.get_mut(key) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            map.remove(key);
        }
    }
}
