//! Query engine: deterministic keyword search over a store snapshot with
//! citation evidence.
//!
//! # Ranking
//!
//! 1. Tokenize the query into lowercase terms (split on whitespace and
//!    punctuation, discard empties).
//! 2. For each record, examine the searchable fields in fixed order; a
//!    term scores at most once per field but may match several fields.
//! 3. Exclude score-0 records; cite every field with at least one match.
//! 4. Sort by score (desc), ingested_at (desc), document_id (asc).

use serde::Serialize;

use crate::models::{Citation, QueryMatch, StoredRecord};

/// Searchable fields, in the fixed order used for scoring and citations.
const SEARCHABLE_FIELDS: [&str; 6] = [
    "issuer",
    "product",
    "document_type",
    "source",
    "reporting_period",
    "language",
];

fn field_value<'a>(record: &'a StoredRecord, field: &str) -> Option<&'a str> {
    match field {
        "issuer" => record.issuer.as_deref(),
        "product" => record.product.as_deref(),
        "document_type" => Some(record.document_type.as_str()),
        "source" => record.source.as_deref(),
        "reporting_period" => record.reporting_period.as_deref(),
        "language" => record.language.as_deref(),
        _ => None,
    }
}

/// Split a query into lowercase terms on whitespace and punctuation.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Rank a snapshot against a free-text query.
///
/// An empty query yields an empty result set, not every record. Re-running
/// the same query against an unchanged snapshot always returns the same
/// ordered list.
pub fn search(query: &str, snapshot: &[StoredRecord]) -> Vec<QueryMatch> {
    let terms = tokenize(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<(QueryMatch, chrono::DateTime<chrono::Utc>)> = Vec::new();

    for record in snapshot {
        let mut score = 0u32;
        let mut citations: Vec<Citation> = Vec::new();

        for field in SEARCHABLE_FIELDS {
            let Some(value) = field_value(record, field) else {
                continue;
            };
            let value_lower = value.to_lowercase();
            let hits = terms.iter().filter(|t| value_lower.contains(t.as_str())).count() as u32;
            if hits > 0 {
                score += hits;
                citations.push(Citation {
                    field,
                    value: value.to_string(),
                });
            }
        }

        if score > 0 {
            matches.push((
                QueryMatch {
                    document_id: record.document_id.clone(),
                    score,
                    citations,
                },
                record.ingested_at,
            ));
        }
    }

    matches.sort_by(|(a, a_at), (b, b_at)| {
        b.score
            .cmp(&a.score)
            .then(b_at.cmp(a_at))
            .then(a.document_id.cmp(&b.document_id))
    });

    matches.into_iter().map(|(m, _)| m).collect()
}

/// JSON shape returned by the query endpoint and CLI.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<QueryMatch>,
}

/// CLI entry point — searches the snapshot and prints ranked results.
pub fn run_search(snapshot: &[StoredRecord], query: &str, limit: usize) -> anyhow::Result<()> {
    let mut results = search(query, snapshot);
    results.truncate(limit);

    if results.is_empty() {
        println!("no matches");
        return Ok(());
    }

    for m in &results {
        println!("{}  score={}", m.document_id, m.score);
        for c in &m.citations {
            println!("  {}: {}", c.field, c.value);
        }
    }
    println!("{} result(s)", results.len());

    Ok(())
}
