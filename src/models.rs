//! Core data models used throughout the registry.
//!
//! These types represent the records that flow through ingestion, the
//! authoritative stored form, and the derived outputs of the query and
//! compliance engines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing status of a document, set by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Received,
    Processed,
}

/// Ingestion payload for one document's metadata, before the store
/// resolves identity, version, and timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// System-assigned identifier; omitted for new documents.
    #[serde(default)]
    pub document_id: Option<String>,
    /// Opaque tenant identifier, carried but never interpreted.
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Origin of the document (upload, sftp, email, api, ...).
    #[serde(default)]
    pub source: Option<String>,
    /// Issuer or asset manager associated with the document.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Product or fund name the document describes.
    #[serde(default)]
    pub product: Option<String>,
    /// Document category (factsheet, report, filing, ...). Required.
    pub document_type: String,
    /// Reporting period represented in the document, if known.
    #[serde(default)]
    pub reporting_period: Option<String>,
    /// ISO language code of the document.
    #[serde(default)]
    pub language: Option<String>,
    /// Version number; assigned by the store, rejected if zero.
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
}

/// Authoritative stored form of a document record.
///
/// `document_id` and `ingested_at` are set at first write and never
/// change; `version` starts at 1 and increments by exactly one per
/// update to the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub document_id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    pub document_type: String,
    #[serde(default)]
    pub reporting_period: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    pub version: u64,
    pub status: DocumentStatus,
    pub ingested_at: DateTime<Utc>,
}

/// Severity of a compliance alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One compliance rule firing against one record.
///
/// Alerts are recomputed from the current snapshot on every evaluation
/// pass; they have no independent lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub document_id: String,
    pub rule_id: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// A matched field/value pair returned as evidence for a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub field: &'static str,
    pub value: String,
}

/// A search result returned from the query engine.
#[derive(Debug, Clone, Serialize)]
pub struct QueryMatch {
    pub document_id: String,
    /// Number of query terms matched, summed across searchable fields.
    pub score: u32,
    /// Fields where at least one term matched, in fixed field order.
    pub citations: Vec<Citation>,
}
