//! # Derived Provider Scores
//!
//! Pure functions from counter values to the three 0–100 scores shown on
//! provider dashboards. Scores are undefined (`None`) until the provider
//! has at least one certification — a rate over zero records is noise,
//! not a score.

use serde::{Deserialize, Serialize};

use crate::profile::ProviderProfile;

/// The three derived scores, recomputed after every applied event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// 0.4·verification_rate + 0.4·active_rate + 0.2·(100 − expiry_rate).
    pub certification_score: Option<f64>,
    /// 0.6·verification_rate + 0.4·compliance_rate.
    pub trust_score: Option<f64>,
    /// renewed / total · 100.
    pub renewal_rate: Option<f64>,
}

/// Recompute all three scores from current counter values.
pub fn compute(profile: &ProviderProfile) -> Scores {
    let total = profile.total_certifications;
    if total == 0 {
        return Scores::default();
    }
    let total = total as f64;

    let verification_rate = rate(profile.verified_certifications, total);
    let active_rate = rate(profile.active_certifications, total);
    let expiry_rate = rate(profile.expired_certifications, total);

    // Compliant population: everything not rejected, suspended, or revoked.
    // The subtraction can undershoot zero when a rejected certification is
    // later suspended (occurrence vs population counters), so saturate.
    let noncompliant = profile.rejected_certifications
        + profile.suspended_certifications
        + profile.revoked_certifications;
    let compliant = profile.total_certifications.saturating_sub(noncompliant);
    let compliance_rate = rate(compliant, total);

    let certification_score = 0.4 * verification_rate + 0.4 * active_rate + 0.2 * (100.0 - expiry_rate);
    let trust_score = 0.6 * verification_rate + 0.4 * compliance_rate;
    let renewal_rate = rate(profile.renewed_certifications, total);

    Scores {
        certification_score: Some(clamp(certification_score)),
        trust_score: Some(clamp(trust_score)),
        renewal_rate: Some(clamp(renewal_rate)),
    }
}

fn rate(count: u64, total: f64) -> f64 {
    count as f64 / total * 100.0
}

fn clamp(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
