//! Record codec: validation at the ingestion boundary and the persisted
//! on-disk representation.
//!
//! Decoding never partially succeeds: a payload either yields a complete
//! [`DocumentRecord`] or a [`RegistryError::Validation`] naming every
//! offending field. The persisted form is a single pretty-printed JSON
//! array of complete records, self-describing and human-inspectable.

use crate::error::{RegistryError, Result};
use crate::models::{DocumentRecord, StoredRecord};

/// Decode and validate an ingestion payload.
///
/// Rejects a missing or blank `document_type`, a zero `version`, and
/// present-but-blank `language` or `reporting_period` values.
pub fn decode(raw: &serde_json::Value) -> Result<DocumentRecord> {
    let record: DocumentRecord = serde_json::from_value(raw.clone())
        .map_err(|e| RegistryError::validation("payload", e.to_string()))?;

    let mut bad_fields: Vec<&str> = Vec::new();

    if record.document_type.trim().is_empty() {
        bad_fields.push("document_type");
    }
    if record.version == Some(0) {
        bad_fields.push("version");
    }
    if is_blank(&record.language) {
        bad_fields.push("language");
    }
    if is_blank(&record.reporting_period) {
        bad_fields.push("reporting_period");
    }
    if is_blank(&record.document_id) {
        bad_fields.push("document_id");
    }

    if !bad_fields.is_empty() {
        return Err(RegistryError::validation(
            bad_fields.join(", "),
            "missing or malformed required field(s)",
        ));
    }

    Ok(record)
}

fn is_blank(value: &Option<String>) -> bool {
    matches!(value, Some(v) if v.trim().is_empty())
}

/// Encode the full collection for persistence.
///
/// Total for any records satisfying the store's invariants; an encoding
/// failure is surfaced as a durability error by the caller.
pub fn encode_collection(records: &[StoredRecord]) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(records).map_err(|e| RegistryError::Durability {
        reason: format!("failed to encode collection: {}", e),
    })
}

/// Decode a persisted collection read from the backing file.
///
/// Any parse failure or duplicate id is corruption; the caller maps the
/// error to `StoreCorrupt` with the file path attached.
pub fn decode_collection(bytes: &[u8]) -> std::result::Result<Vec<StoredRecord>, String> {
    let records: Vec<StoredRecord> =
        serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

    let mut seen = std::collections::BTreeSet::new();
    for record in &records {
        if record.version == 0 {
            return Err(format!(
                "record {} has version 0",
                record.document_id
            ));
        }
        if !seen.insert(record.document_id.as_str()) {
            return Err(format!("duplicate document_id: {}", record.document_id));
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentStatus;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn decode_accepts_minimal_payload() {
        let record = decode(&json!({ "document_type": "factsheet" })).unwrap();
        assert_eq!(record.document_type, "factsheet");
        assert!(record.document_id.is_none());
        assert!(record.status.is_none());
    }

    #[test]
    fn decode_rejects_missing_document_type() {
        let err = decode(&json!({ "issuer": "Acme Capital" })).unwrap_err();
        assert!(err.to_string().contains("payload") || err.to_string().contains("document_type"));
    }

    #[test]
    fn decode_rejects_blank_document_type() {
        let err = decode(&json!({ "document_type": "  " })).unwrap_err();
        assert!(err.to_string().contains("document_type"));
    }

    #[test]
    fn decode_rejects_zero_version() {
        let err = decode(&json!({ "document_type": "report", "version": 0 })).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn decode_names_all_offending_fields() {
        let err = decode(&json!({
            "document_type": "",
            "language": " ",
            "reporting_period": ""
        }))
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("document_type"));
        assert!(msg.contains("language"));
        assert!(msg.contains("reporting_period"));
    }

    #[test]
    fn collection_round_trips() {
        let records = vec![StoredRecord {
            document_id: "doc-1".to_string(),
            tenant_id: Some("t1".to_string()),
            source: None,
            issuer: Some("Acme Capital".to_string()),
            product: None,
            document_type: "factsheet".to_string(),
            reporting_period: None,
            language: Some("en".to_string()),
            version: 1,
            status: DocumentStatus::Received,
            ingested_at: Utc::now(),
        }];
        let bytes = encode_collection(&records).unwrap();
        let decoded = decode_collection(&bytes).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].document_id, "doc-1");
        assert_eq!(decoded[0].version, 1);
    }

    #[test]
    fn decode_collection_rejects_duplicate_ids() {
        let bytes = serde_json::to_vec(&json!([
            { "document_id": "d", "document_type": "a", "version": 1,
              "status": "received", "ingested_at": "2026-01-01T00:00:00Z" },
            { "document_id": "d", "document_type": "b", "version": 2,
              "status": "received", "ingested_at": "2026-01-01T00:00:00Z" }
        ]))
        .unwrap();
        let err = decode_collection(&bytes).unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn decode_collection_rejects_garbage() {
        assert!(decode_collection(b"{not json").is_err());
    }
}
