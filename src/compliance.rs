//! Compliance engine: an ordered registry of independent rules evaluated
//! against a store snapshot.
//!
//! Each rule is a pure predicate over one record; no rule may depend on
//! evaluation order or on other records, so a pass is deterministic and
//! trivially parallelizable. A predicate that cannot evaluate is skipped
//! for that record and logged as a diagnostic; it never aborts the pass
//! and never surfaces as a user-facing alert.

use anyhow::Result;
use serde::Serialize;

use crate::config::ComplianceConfig;
use crate::models::{Alert, Severity, StoredRecord};

/// One compliance rule: a fixed id, a fixed severity, and a fallible
/// predicate that returns the alert message when the rule fires.
///
/// Adding a rule means appending to [`default_rules`]; evaluation control
/// flow never changes.
pub struct Rule {
    pub id: &'static str,
    pub severity: Severity,
    pub check: fn(&StoredRecord, &ComplianceConfig) -> Result<Option<String>>,
}

fn missing_reporting_period(
    record: &StoredRecord,
    _cfg: &ComplianceConfig,
) -> Result<Option<String>> {
    let missing = match &record.reporting_period {
        None => true,
        Some(p) => p.trim().is_empty(),
    };
    Ok(missing.then(|| "Document metadata is missing a reporting period.".to_string()))
}

fn unsupported_language(record: &StoredRecord, cfg: &ComplianceConfig) -> Result<Option<String>> {
    let Some(language) = record.language.as_deref() else {
        return Ok(None);
    };
    let lang = language.to_lowercase();
    if cfg.allowed_languages.iter().any(|a| a.to_lowercase() == lang) {
        Ok(None)
    } else {
        Ok(Some(format!(
            "Language '{}' is outside the supported set; ensure translated disclosures are available.",
            language
        )))
    }
}

/// The fixed rule set, ordered by rule id.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "missing_reporting_period",
            severity: Severity::Warning,
            check: missing_reporting_period,
        },
        Rule {
            id: "unsupported_language",
            severity: Severity::Warning,
            check: unsupported_language,
        },
    ]
}

/// Evaluate the default rule set against a snapshot.
///
/// Alerts are ordered by `document_id` ascending, then `rule_id`
/// ascending. Repeated evaluation of the same snapshot yields the same
/// alerts, with no duplicates.
pub fn evaluate(snapshot: &[StoredRecord], cfg: &ComplianceConfig) -> Vec<Alert> {
    evaluate_with(&default_rules(), snapshot, cfg)
}

/// Evaluate an explicit rule set. Rules are applied per record in
/// isolation; a failing predicate skips that rule for that record.
pub fn evaluate_with(rules: &[Rule], snapshot: &[StoredRecord], cfg: &ComplianceConfig) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = Vec::new();

    for record in snapshot {
        for rule in rules {
            match (rule.check)(record, cfg) {
                Ok(Some(message)) => alerts.push(Alert {
                    document_id: record.document_id.clone(),
                    rule_id: rule.id,
                    severity: rule.severity,
                    message,
                }),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        document_id = %record.document_id,
                        rule_id = rule.id,
                        error = %e,
                        "rule predicate failed to evaluate; skipping"
                    );
                }
            }
        }
    }

    alerts.sort_by(|a, b| {
        a.document_id
            .cmp(&b.document_id)
            .then(a.rule_id.cmp(b.rule_id))
    });

    alerts
}

/// JSON shape returned by the alerts endpoint and CLI.
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub total: usize,
}

/// CLI entry point — evaluates the snapshot and prints alerts.
pub fn run_alerts(snapshot: &[StoredRecord], cfg: &ComplianceConfig) -> anyhow::Result<()> {
    let alerts = evaluate(snapshot, cfg);

    if alerts.is_empty() {
        println!("no alerts");
        return Ok(());
    }

    for alert in &alerts {
        println!(
            "{}  {}  {:?}",
            alert.document_id, alert.rule_id, alert.severity
        );
        println!("  {}", alert.message);
    }
    println!("{} alert(s)", alerts.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentStatus;
    use chrono::Utc;

    fn record(id: &str, reporting_period: Option<&str>, language: Option<&str>) -> StoredRecord {
        StoredRecord {
            document_id: id.to_string(),
            tenant_id: None,
            source: None,
            issuer: None,
            product: None,
            document_type: "factsheet".to_string(),
            reporting_period: reporting_period.map(|s| s.to_string()),
            language: language.map(|s| s.to_string()),
            version: 1,
            status: DocumentStatus::Received,
            ingested_at: Utc::now(),
        }
    }

    fn cfg() -> ComplianceConfig {
        ComplianceConfig::default()
    }

    #[test]
    fn missing_period_fires_exactly_once() {
        let snapshot = vec![record("d1", None, Some("en"))];
        let alerts = evaluate(&snapshot, &cfg());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule_id, "missing_reporting_period");
        assert_eq!(alerts[0].severity, Severity::Warning);

        // Stable on repeated evaluation of the same snapshot.
        let again = evaluate(&snapshot, &cfg());
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn blank_period_counts_as_missing() {
        let snapshot = vec![record("d1", Some("  "), Some("en"))];
        let alerts = evaluate(&snapshot, &cfg());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule_id, "missing_reporting_period");
    }

    #[test]
    fn unlisted_language_fires() {
        let snapshot = vec![record("d1", Some("2026-Q1"), Some("fr"))];
        let alerts = evaluate(&snapshot, &cfg());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule_id, "unsupported_language");
        assert!(alerts[0].message.contains("fr"));
    }

    #[test]
    fn allow_list_is_configurable_and_case_insensitive() {
        let snapshot = vec![record("d1", Some("2026-Q1"), Some("FR"))];
        let cfg = ComplianceConfig {
            allowed_languages: vec!["en".to_string(), "fr".to_string()],
        };
        assert!(evaluate(&snapshot, &cfg).is_empty());
    }

    #[test]
    fn unset_language_never_fires() {
        let snapshot = vec![record("d1", Some("2026-Q1"), None)];
        assert!(evaluate(&snapshot, &cfg()).is_empty());
    }

    #[test]
    fn alerts_ordered_by_id_then_rule() {
        let snapshot = vec![record("b", None, Some("fr")), record("a", None, Some("de"))];
        let alerts = evaluate(&snapshot, &cfg());
        let keys: Vec<(String, &str)> = alerts
            .iter()
            .map(|a| (a.document_id.clone(), a.rule_id))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a".to_string(), "missing_reporting_period"),
                ("a".to_string(), "unsupported_language"),
                ("b".to_string(), "missing_reporting_period"),
                ("b".to_string(), "unsupported_language"),
            ]
        );
    }

    #[test]
    fn failing_predicate_skips_without_aborting() {
        fn broken(_: &StoredRecord, _: &ComplianceConfig) -> Result<Option<String>> {
            anyhow::bail!("malformed field")
        }
        let mut rules = default_rules();
        rules.push(Rule {
            id: "always_broken",
            severity: Severity::Error,
            check: broken,
        });

        let snapshot = vec![record("d1", None, Some("fr"))];
        let alerts = evaluate_with(&rules, &snapshot, &cfg());
        // The broken rule contributes nothing; the other two still fire.
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.rule_id != "always_broken"));
    }
}
