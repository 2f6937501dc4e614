//! # Certification Record State Machine
//!
//! Models the lifecycle of a provider certification, from creation through
//! verification, renewal, suspension, revocation, or expiry.
//!
//! ## States
//!
//! ```text
//! Pending ──▶ Active ──▶ Suspended ──▶ Active (via renew)
//!    │           │            │
//!    │           │            └──▶ Revoked (terminal)
//!    │           │
//!    │           └──▶ Expired ──▶ Active (via renew)
//!    │
//!    └──▶ Suspended / Revoked / Expired
//! ```
//!
//! ## Two Independent Axes
//!
//! `status` (lifecycle) and `verification_status` (review outcome) are
//! independent: a certification can be Active while its verification is
//! still Pending. Only `status` gates reminder scheduling; only
//! `verification_status` gates verify/reject.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pcert_core::{Actor, ActorId, CertificationId, ProviderId, Timestamp};

// ─── Lifecycle Status ────────────────────────────────────────────────

/// The lifecycle state of a certification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CertificationStatus {
    /// Certification recorded but not yet in force.
    Pending,
    /// Certification is in force.
    Active,
    /// Certification passed its expiry date without renewal.
    Expired,
    /// Certification temporarily suspended pending review.
    Suspended,
    /// Certification permanently revoked (terminal).
    Revoked,
}

impl CertificationStatus {
    /// Whether this state is terminal. Only Revoked is — an Expired
    /// certification can still be renewed back to Active.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl std::fmt::Display for CertificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::Suspended => "SUSPENDED",
            Self::Revoked => "REVOKED",
        };
        f.write_str(s)
    }
}

// ─── Verification Status ─────────────────────────────────────────────

/// The review outcome of a certification, independent of lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Not yet reviewed.
    Pending,
    /// Reviewed and confirmed authentic.
    Verified,
    /// Reviewed and rejected.
    Rejected,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by certification lifecycle operations.
#[derive(Error, Debug)]
pub enum CertificationError {
    /// Required fields missing or malformed on create/update.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The targeted certification does not exist.
    #[error("certification not found: {0}")]
    NotFound(CertificationId),

    /// Attempted transition is not valid from the current state.
    #[error("invalid certification transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Attempted target status.
        to: String,
    },

    /// The certification is in a terminal state.
    #[error("certification is in terminal state {state}")]
    TerminalState {
        /// The terminal state.
        state: String,
    },

    /// verify/reject called when the verification decision is already made.
    #[error("verification already decided: {current}")]
    VerificationAlreadyDecided {
        /// The current verification status.
        current: String,
    },

    /// Certification number already exists for this provider.
    #[error("duplicate certification number for provider: {number}")]
    DuplicateCertificationNumber {
        /// The conflicting externally issued number.
        number: String,
    },

    /// Expire called before the expiry date has passed.
    #[error("certification is not past due: expires {expiry}")]
    NotPastDue {
        /// The expiry date that has not yet passed.
        expiry: Timestamp,
    },

    /// Serialization or storage failure, surfaced unmodified.
    #[error("persistence error: {0}")]
    Persistence(String),
}

// ─── Change Tracking ─────────────────────────────────────────────────

/// Old and new value of one field touched by an update, stringified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Value before the update.
    pub old: String,
    /// Value after the update.
    pub new: String,
}

/// Map of field name to old/new values, carried by Updated events.
pub type ChangeSet = BTreeMap<String, FieldChange>;

// ─── Notes ───────────────────────────────────────────────────────────

/// One entry in the append-only notes trail on a certification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteEntry {
    /// When the note was appended.
    pub at: Timestamp,
    /// Who appended it.
    pub author: Actor,
    /// Free-text reason or remark.
    pub text: String,
}

// ─── Inputs ──────────────────────────────────────────────────────────

/// Fields required to create a certification record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCertification {
    /// Owning provider.
    pub provider: ProviderId,
    /// Human-readable certification name.
    pub name: String,
    /// The organization that issued the certification.
    pub issuing_organization: String,
    /// Free-form classification (e.g., "food_safety", "iso").
    pub category: String,
    /// Externally issued certification number; unique within a provider.
    pub certification_number: String,
    /// When the certification was issued.
    pub issue_date: Timestamp,
    /// When the certification expires.
    pub expiry_date: Timestamp,
    /// Whether the certification is expected to auto-renew.
    pub recurring: bool,
    /// Initial lifecycle status; defaults to Pending when absent.
    pub initial_status: Option<CertificationStatus>,
}

impl NewCertification {
    /// Validate required fields before any mutation happens.
    pub fn validate(&self) -> Result<(), CertificationError> {
        if self.name.trim().is_empty() {
            return Err(CertificationError::Validation("name must not be empty".into()));
        }
        if self.issuing_organization.trim().is_empty() {
            return Err(CertificationError::Validation(
                "issuing_organization must not be empty".into(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(CertificationError::Validation("category must not be empty".into()));
        }
        if self.certification_number.trim().is_empty() {
            return Err(CertificationError::Validation(
                "certification_number must not be empty".into(),
            ));
        }
        if self.expiry_date <= self.issue_date {
            return Err(CertificationError::Validation(
                "expiry_date must be after issue_date".into(),
            ));
        }
        Ok(())
    }
}

/// Partial field diff for the update operation. `None` fields are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificationUpdate {
    /// New certification name.
    pub name: Option<String>,
    /// New issuing organization.
    pub issuing_organization: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New certification number.
    pub certification_number: Option<String>,
    /// New issue date.
    pub issue_date: Option<Timestamp>,
    /// New expiry date. Changing this triggers reminder rescheduling.
    pub expiry_date: Option<Timestamp>,
    /// New recurrence flag.
    pub recurring: Option<bool>,
}

impl CertificationUpdate {
    /// Whether the update touches any field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.issuing_organization.is_none()
            && self.category.is_none()
            && self.certification_number.is_none()
            && self.issue_date.is_none()
            && self.expiry_date.is_none()
            && self.recurring.is_none()
    }
}

// ─── Certification Record ───────────────────────────────────────────

/// A provider certification with its lifecycle state and notes trail.
///
/// All state mutation goes through the transition methods below, which
/// enforce the valid-transition rules and append to the notes trail where
/// a reason is required. The record never mutates `ProviderProfile`
/// counters itself — that is the metrics reactor's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificationRecord {
    /// Unique record identifier.
    pub id: CertificationId,
    /// Owning provider.
    pub provider: ProviderId,
    /// Human-readable certification name.
    pub name: String,
    /// The organization that issued the certification.
    pub issuing_organization: String,
    /// Free-form classification.
    pub category: String,
    /// Externally issued number, unique within the provider.
    pub certification_number: String,
    /// When the certification was issued.
    pub issue_date: Timestamp,
    /// When the certification expires.
    pub expiry_date: Timestamp,
    /// When the certification was last renewed, if ever.
    pub renewal_date: Option<Timestamp>,
    /// When verification was confirmed, if it was.
    pub verified_at: Option<Timestamp>,
    /// Current lifecycle status.
    pub status: CertificationStatus,
    /// Current verification outcome.
    pub verification_status: VerificationStatus,
    /// Who verified the certification, if anyone.
    pub verified_by: Option<ActorId>,
    /// Append-only trail of reasons and remarks.
    pub notes: Vec<NoteEntry>,
    /// Whether the certification is expected to auto-renew.
    pub recurring: bool,
    /// When the record was created.
    pub created_at: Timestamp,
}

impl CertificationRecord {
    /// Build a record from validated create input.
    pub fn new(id: CertificationId, input: &NewCertification, now: Timestamp) -> Self {
        Self {
            id,
            provider: input.provider,
            name: input.name.clone(),
            issuing_organization: input.issuing_organization.clone(),
            category: input.category.clone(),
            certification_number: input.certification_number.clone(),
            issue_date: input.issue_date,
            expiry_date: input.expiry_date,
            renewal_date: None,
            verified_at: None,
            status: input.initial_status.unwrap_or(CertificationStatus::Pending),
            verification_status: VerificationStatus::Pending,
            verified_by: None,
            notes: Vec::new(),
            recurring: input.recurring,
            created_at: now,
        }
    }

    /// Confirm the certification as authentic.
    ///
    /// Requires `verification_status == Pending`; a repeat call fails with
    /// [`CertificationError::VerificationAlreadyDecided`] so the Verified
    /// event fires at most once per decision.
    pub fn verify(&mut self, verifier: ActorId, now: Timestamp) -> Result<(), CertificationError> {
        self.require_verification_pending()?;
        self.verification_status = VerificationStatus::Verified;
        self.verified_at = Some(now);
        self.verified_by = Some(verifier);
        Ok(())
    }

    /// Reject the certification as inauthentic, recording the reason.
    pub fn reject(
        &mut self,
        reason: &str,
        actor: Actor,
        now: Timestamp,
    ) -> Result<(), CertificationError> {
        self.require_verification_pending()?;
        self.verification_status = VerificationStatus::Rejected;
        self.push_note(reason, actor, now);
        Ok(())
    }

    /// Renew the certification: back to Active with a fresh expiry date.
    ///
    /// Callable from Pending, Active, Suspended, and Expired — renewal is
    /// the sanctioned path back to Active from both Suspended and Expired.
    pub fn renew(&mut self, new_expiry: Timestamp, now: Timestamp) -> Result<(), CertificationError> {
        self.require_not_terminal()?;
        if new_expiry <= now {
            return Err(CertificationError::Validation(
                "renewal expiry_date must be in the future".into(),
            ));
        }
        self.status = CertificationStatus::Active;
        self.expiry_date = new_expiry;
        self.renewal_date = Some(now);
        Ok(())
    }

    /// Suspend the certification, recording the reason.
    pub fn suspend(
        &mut self,
        reason: &str,
        actor: Actor,
        now: Timestamp,
    ) -> Result<(), CertificationError> {
        self.require_not_terminal()?;
        if !matches!(self.status, CertificationStatus::Pending | CertificationStatus::Active) {
            return Err(CertificationError::InvalidTransition {
                from: self.status.to_string(),
                to: "SUSPENDED".to_string(),
            });
        }
        self.status = CertificationStatus::Suspended;
        self.push_note(reason, actor, now);
        Ok(())
    }

    /// Revoke the certification permanently, recording the reason.
    pub fn revoke(
        &mut self,
        reason: &str,
        actor: Actor,
        now: Timestamp,
    ) -> Result<(), CertificationError> {
        self.require_not_terminal()?;
        self.status = CertificationStatus::Revoked;
        self.push_note(reason, actor, now);
        Ok(())
    }

    /// Expire the certification. System-triggered by the sweep.
    ///
    /// Requires the expiry date to have passed and the status to be one of
    /// Pending/Active/Suspended.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), CertificationError> {
        self.require_not_terminal()?;
        if self.status == CertificationStatus::Expired {
            return Err(CertificationError::InvalidTransition {
                from: self.status.to_string(),
                to: "EXPIRED".to_string(),
            });
        }
        if self.expiry_date > now {
            return Err(CertificationError::NotPastDue { expiry: self.expiry_date });
        }
        self.status = CertificationStatus::Expired;
        Ok(())
    }

    /// Apply a partial field diff, returning the map of effective changes.
    ///
    /// Fields that are supplied but equal to the current value are omitted
    /// from the change set, so the reminder reactor only reschedules when
    /// `expiry_date` genuinely changed.
    pub fn apply_update(
        &mut self,
        update: &CertificationUpdate,
    ) -> Result<ChangeSet, CertificationError> {
        if update.is_empty() {
            return Err(CertificationError::Validation("update touches no fields".into()));
        }
        let mut changes = ChangeSet::new();

        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(CertificationError::Validation("name must not be empty".into()));
            }
            record_change(&mut changes, "name", &self.name, name);
            self.name = name.clone();
        }
        if let Some(org) = &update.issuing_organization {
            if org.trim().is_empty() {
                return Err(CertificationError::Validation(
                    "issuing_organization must not be empty".into(),
                ));
            }
            record_change(&mut changes, "issuing_organization", &self.issuing_organization, org);
            self.issuing_organization = org.clone();
        }
        if let Some(category) = &update.category {
            if category.trim().is_empty() {
                return Err(CertificationError::Validation("category must not be empty".into()));
            }
            record_change(&mut changes, "category", &self.category, category);
            self.category = category.clone();
        }
        if let Some(number) = &update.certification_number {
            if number.trim().is_empty() {
                return Err(CertificationError::Validation(
                    "certification_number must not be empty".into(),
                ));
            }
            record_change(&mut changes, "certification_number", &self.certification_number, number);
            self.certification_number = number.clone();
        }
        if let Some(issue) = update.issue_date {
            record_change(&mut changes, "issue_date", &self.issue_date.to_string(), &issue.to_string());
            self.issue_date = issue;
        }
        if let Some(expiry) = update.expiry_date {
            record_change(
                &mut changes,
                "expiry_date",
                &self.expiry_date.to_string(),
                &expiry.to_string(),
            );
            self.expiry_date = expiry;
        }
        if let Some(recurring) = update.recurring {
            record_change(
                &mut changes,
                "recurring",
                &self.recurring.to_string(),
                &recurring.to_string(),
            );
            self.recurring = recurring;
        }

        Ok(changes)
    }

    /// Append a note to the trail. Notes are never edited or removed.
    pub fn push_note(&mut self, text: &str, author: Actor, at: Timestamp) {
        self.notes.push(NoteEntry { at, author, text: text.to_string() });
    }

    /// Whether the expiry date has passed as of `now`.
    pub fn is_past_due(&self, now: Timestamp) -> bool {
        self.expiry_date <= now
    }

    fn require_not_terminal(&self) -> Result<(), CertificationError> {
        if self.status.is_terminal() {
            return Err(CertificationError::TerminalState { state: self.status.to_string() });
        }
        Ok(())
    }

    fn require_verification_pending(&self) -> Result<(), CertificationError> {
        if self.status.is_terminal() {
            return Err(CertificationError::TerminalState { state: self.status.to_string() });
        }
        if self.verification_status != VerificationStatus::Pending {
            return Err(CertificationError::VerificationAlreadyDecided {
                current: self.verification_status.to_string(),
            });
        }
        Ok(())
    }
}

/// Record a change only when old and new genuinely differ.
fn record_change(changes: &mut ChangeSet, field: &str, old: &str, new: &str) {
    if old != new {
        changes.insert(
            field.to_string(),
            FieldChange { old: old.to_string(), new: new.to_string() },
        );
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn make_input() -> NewCertification {
        NewCertification {
            provider: ProviderId::new(),
            name: "Organic Handling".to_string(),
            issuing_organization: "USDA".to_string(),
            category: "food_safety".to_string(),
            certification_number: "OH-2041".to_string(),
            issue_date: ts("2026-01-01T00:00:00Z"),
            expiry_date: ts("2027-01-01T00:00:00Z"),
            recurring: true,
            initial_status: None,
        }
    }

    fn make_record() -> CertificationRecord {
        CertificationRecord::new(CertificationId::new(), &make_input(), ts("2026-01-01T00:00:00Z"))
    }

    // ── Creation ─────────────────────────────────────────────────────

    #[test]
    fn test_new_record_defaults_to_pending() {
        let rec = make_record();
        assert_eq!(rec.status, CertificationStatus::Pending);
        assert_eq!(rec.verification_status, VerificationStatus::Pending);
        assert!(rec.verified_at.is_none());
        assert!(rec.renewal_date.is_none());
        assert!(rec.notes.is_empty());
    }

    #[test]
    fn test_new_record_honors_initial_status() {
        let mut input = make_input();
        input.initial_status = Some(CertificationStatus::Active);
        let rec = CertificationRecord::new(CertificationId::new(), &input, ts("2026-01-01T00:00:00Z"));
        assert_eq!(rec.status, CertificationStatus::Active);
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut input = make_input();
        input.name = "  ".to_string();
        assert!(input.validate().is_err());

        let mut input = make_input();
        input.certification_number = String::new();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_expiry_before_issue() {
        let mut input = make_input();
        input.expiry_date = ts("2025-01-01T00:00:00Z");
        assert!(input.validate().is_err());
    }

    // ── Verification axis ────────────────────────────────────────────

    #[test]
    fn test_verify_sets_fields() {
        let mut rec = make_record();
        let verifier = ActorId::new();
        rec.verify(verifier, ts("2026-02-01T00:00:00Z")).unwrap();
        assert_eq!(rec.verification_status, VerificationStatus::Verified);
        assert_eq!(rec.verified_at, Some(ts("2026-02-01T00:00:00Z")));
        assert_eq!(rec.verified_by, Some(verifier));
        // Lifecycle axis untouched.
        assert_eq!(rec.status, CertificationStatus::Pending);
    }

    #[test]
    fn test_repeat_verify_rejected() {
        let mut rec = make_record();
        rec.verify(ActorId::new(), ts("2026-02-01T00:00:00Z")).unwrap();
        let result = rec.verify(ActorId::new(), ts("2026-02-02T00:00:00Z"));
        assert!(matches!(result, Err(CertificationError::VerificationAlreadyDecided { .. })));
    }

    #[test]
    fn test_reject_appends_reason_note() {
        let mut rec = make_record();
        rec.reject("document forged", Actor::System, ts("2026-02-01T00:00:00Z")).unwrap();
        assert_eq!(rec.verification_status, VerificationStatus::Rejected);
        assert_eq!(rec.notes.len(), 1);
        assert_eq!(rec.notes[0].text, "document forged");
    }

    #[test]
    fn test_reject_after_verify_rejected() {
        let mut rec = make_record();
        rec.verify(ActorId::new(), ts("2026-02-01T00:00:00Z")).unwrap();
        assert!(rec.reject("late", Actor::System, ts("2026-02-02T00:00:00Z")).is_err());
    }

    // ── Lifecycle axis ───────────────────────────────────────────────

    #[test]
    fn test_renew_resets_expiry_and_activates() {
        let mut rec = make_record();
        rec.renew(ts("2028-01-01T00:00:00Z"), ts("2026-06-01T00:00:00Z")).unwrap();
        assert_eq!(rec.status, CertificationStatus::Active);
        assert_eq!(rec.expiry_date, ts("2028-01-01T00:00:00Z"));
        assert_eq!(rec.renewal_date, Some(ts("2026-06-01T00:00:00Z")));
    }

    #[test]
    fn test_renew_from_expired() {
        let mut rec = make_record();
        rec.expire(ts("2027-06-01T00:00:00Z")).unwrap();
        rec.renew(ts("2028-06-01T00:00:00Z"), ts("2027-07-01T00:00:00Z")).unwrap();
        assert_eq!(rec.status, CertificationStatus::Active);
    }

    #[test]
    fn test_renew_from_suspended_reinstates() {
        let mut rec = make_record();
        rec.suspend("audit", Actor::System, ts("2026-03-01T00:00:00Z")).unwrap();
        rec.renew(ts("2028-01-01T00:00:00Z"), ts("2026-04-01T00:00:00Z")).unwrap();
        assert_eq!(rec.status, CertificationStatus::Active);
    }

    #[test]
    fn test_renew_with_past_expiry_rejected() {
        let mut rec = make_record();
        let result = rec.renew(ts("2026-01-01T00:00:00Z"), ts("2026-06-01T00:00:00Z"));
        assert!(matches!(result, Err(CertificationError::Validation(_))));
    }

    #[test]
    fn test_suspend_from_expired_rejected() {
        let mut rec = make_record();
        rec.expire(ts("2027-06-01T00:00:00Z")).unwrap();
        let result = rec.suspend("late", Actor::System, ts("2027-07-01T00:00:00Z"));
        assert!(matches!(result, Err(CertificationError::InvalidTransition { .. })));
    }

    #[test]
    fn test_revoke_is_terminal() {
        let mut rec = make_record();
        rec.revoke("fraud", Actor::System, ts("2026-02-01T00:00:00Z")).unwrap();
        assert_eq!(rec.status, CertificationStatus::Revoked);
        assert!(rec.status.is_terminal());

        assert!(matches!(
            rec.renew(ts("2028-01-01T00:00:00Z"), ts("2026-03-01T00:00:00Z")),
            Err(CertificationError::TerminalState { .. })
        ));
        assert!(matches!(
            rec.expire(ts("2027-06-01T00:00:00Z")),
            Err(CertificationError::TerminalState { .. })
        ));
        assert!(matches!(
            rec.verify(ActorId::new(), ts("2026-03-01T00:00:00Z")),
            Err(CertificationError::TerminalState { .. })
        ));
    }

    #[test]
    fn test_expire_before_due_rejected() {
        let mut rec = make_record();
        let result = rec.expire(ts("2026-06-01T00:00:00Z"));
        assert!(matches!(result, Err(CertificationError::NotPastDue { .. })));
    }

    #[test]
    fn test_expire_twice_rejected() {
        let mut rec = make_record();
        rec.expire(ts("2027-06-01T00:00:00Z")).unwrap();
        assert!(matches!(
            rec.expire(ts("2027-07-01T00:00:00Z")),
            Err(CertificationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_axes_are_independent() {
        let mut rec = make_record();
        rec.renew(ts("2028-01-01T00:00:00Z"), ts("2026-06-01T00:00:00Z")).unwrap();
        assert_eq!(rec.status, CertificationStatus::Active);
        assert_eq!(rec.verification_status, VerificationStatus::Pending);
    }

    // ── Update diffs ─────────────────────────────────────────────────

    #[test]
    fn test_update_collects_changes() {
        let mut rec = make_record();
        let update = CertificationUpdate {
            category: Some("iso".to_string()),
            expiry_date: Some(ts("2027-06-01T00:00:00Z")),
            ..Default::default()
        };
        let changes = rec.apply_update(&update).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes["category"].old, "food_safety");
        assert_eq!(changes["category"].new, "iso");
        assert!(changes.contains_key("expiry_date"));
        assert_eq!(rec.category, "iso");
    }

    #[test]
    fn test_update_omits_no_op_fields() {
        let mut rec = make_record();
        let update = CertificationUpdate {
            category: Some("food_safety".to_string()),
            name: Some("Organic Handling 2".to_string()),
            ..Default::default()
        };
        let changes = rec.apply_update(&update).unwrap();
        assert!(!changes.contains_key("category"));
        assert!(changes.contains_key("name"));
    }

    #[test]
    fn test_empty_update_rejected() {
        let mut rec = make_record();
        let result = rec.apply_update(&CertificationUpdate::default());
        assert!(matches!(result, Err(CertificationError::Validation(_))));
    }

    // ── Serialization ────────────────────────────────────────────────

    #[test]
    fn test_record_serde_roundtrip() {
        let mut rec = make_record();
        rec.suspend("audit", Actor::System, ts("2026-03-01T00:00:00Z")).unwrap();
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: CertificationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, rec.status);
        assert_eq!(parsed.notes.len(), 1);
    }
}
