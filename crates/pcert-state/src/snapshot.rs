//! # Snapshot Export / Import
//!
//! Certification data leaves and enters the subsystem as a versioned JSON
//! blob: the records plus the transition log they were produced by. The
//! blob is opaque to callers — the format version field is the only
//! compatibility contract.

use serde::{Deserialize, Serialize};

use pcert_core::{ProviderId, Timestamp};

use crate::engine::CertificationEngine;
use crate::event::TransitionEvent;
use crate::record::{CertificationError, CertificationRecord};

/// Current snapshot format version. Bump on any incompatible change.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A self-describing export of certification data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version; imports reject unknown versions.
    pub format_version: u32,
    /// When the export was taken.
    pub exported_at: Timestamp,
    /// The certification records.
    pub records: Vec<CertificationRecord>,
    /// The transition log the records were produced by. Kept alongside the
    /// records so an import can rebuild reactor state by replay.
    pub events: Vec<TransitionEvent>,
}

/// Export an engine's data, optionally restricted to one provider.
///
/// When a provider filter is given, only that provider's records and
/// events are included.
pub fn export(
    engine: &CertificationEngine,
    provider: Option<ProviderId>,
    now: Timestamp,
) -> Result<Vec<u8>, CertificationError> {
    let records: Vec<CertificationRecord> = engine
        .records()
        .filter(|r| provider.map_or(true, |p| r.provider == p))
        .cloned()
        .collect();
    let events: Vec<TransitionEvent> = engine
        .outbox()
        .events()
        .iter()
        .filter(|e| provider.map_or(true, |p| e.provider() == p))
        .cloned()
        .collect();

    let snapshot =
        Snapshot { format_version: SNAPSHOT_FORMAT_VERSION, exported_at: now, records, events };
    serde_json::to_vec_pretty(&snapshot).map_err(|e| CertificationError::Persistence(e.to_string()))
}

/// Parse and validate an exported blob.
pub fn import(bytes: &[u8]) -> Result<Snapshot, CertificationError> {
    let snapshot: Snapshot = serde_json::from_slice(bytes)
        .map_err(|e| CertificationError::Persistence(format!("malformed snapshot: {e}")))?;
    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(CertificationError::Persistence(format!(
            "unsupported snapshot format version {} (expected {})",
            snapshot.format_version, SNAPSHOT_FORMAT_VERSION
        )));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OpContext;
    use crate::record::NewCertification;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn make_input(provider: ProviderId, number: &str) -> NewCertification {
        NewCertification {
            provider,
            name: "Halal".to_string(),
            issuing_organization: "JAKIM".to_string(),
            category: "food_safety".to_string(),
            certification_number: number.to_string(),
            issue_date: ts("2026-01-01T00:00:00Z"),
            expiry_date: ts("2027-01-01T00:00:00Z"),
            recurring: true,
            initial_status: None,
        }
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut engine = CertificationEngine::new();
        let provider = ProviderId::new();
        let ctx = OpContext::system(ts("2026-01-01T00:00:00Z"));
        engine.create(make_input(provider, "H-1"), &ctx).unwrap();
        engine.create(make_input(provider, "H-2"), &ctx).unwrap();

        let blob = export(&engine, None, ts("2026-02-01T00:00:00Z")).unwrap();
        let snapshot = import(&blob).unwrap();
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.events.len(), 2);

        let restored = CertificationEngine::restore(snapshot.records, snapshot.events);
        assert_eq!(restored.records().count(), 2);
        assert_eq!(restored.outbox().len(), 2);
    }

    #[test]
    fn test_export_filters_by_provider() {
        let mut engine = CertificationEngine::new();
        let keep = ProviderId::new();
        let drop = ProviderId::new();
        let ctx = OpContext::system(ts("2026-01-01T00:00:00Z"));
        engine.create(make_input(keep, "H-1"), &ctx).unwrap();
        engine.create(make_input(drop, "H-2"), &ctx).unwrap();

        let blob = export(&engine, Some(keep), ts("2026-02-01T00:00:00Z")).unwrap();
        let snapshot = import(&blob).unwrap();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].provider, keep);
        assert_eq!(snapshot.events.len(), 1);
    }

    #[test]
    fn test_import_rejects_unknown_version() {
        let engine = CertificationEngine::new();
        let blob = export(&engine, None, ts("2026-02-01T00:00:00Z")).unwrap();
        let mut snapshot: serde_json::Value = serde_json::from_slice(&blob).unwrap();
        snapshot["format_version"] = serde_json::json!(99);
        let bytes = serde_json::to_vec(&snapshot).unwrap();
        assert!(matches!(import(&bytes), Err(CertificationError::Persistence(_))));
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(import(b"not json").is_err());
        assert!(import(b"{}").is_err());
    }

    #[test]
    fn test_restored_engine_enforces_number_uniqueness() {
        let mut engine = CertificationEngine::new();
        let provider = ProviderId::new();
        let ctx = OpContext::system(ts("2026-01-01T00:00:00Z"));
        engine.create(make_input(provider, "H-1"), &ctx).unwrap();

        let blob = export(&engine, None, ts("2026-02-01T00:00:00Z")).unwrap();
        let snapshot = import(&blob).unwrap();
        let mut restored = CertificationEngine::restore(snapshot.records, snapshot.events);
        assert!(restored.create(make_input(provider, "H-1"), &ctx).is_err());
    }
}
