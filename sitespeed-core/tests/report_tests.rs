// Tests for report building, writing and summaries

use serde_json::{Value, json};
use sitespeed_core::report::{
    PageReport, Report, StrategyReport, generate_text_summary, save_report, to_percent,
};
use sitespeed_scanner::{AuditResult, ScanError, Strategy};
use tempfile::TempDir;

fn audit_result(score: Value) -> AuditResult {
    serde_json::from_value(json!({
        "lighthouseResult": {
            "categories": { "performance": { "score": score } },
            "audits": {
                "first-contentful-paint": { "title": "FCP", "displayValue": "1.2 s" },
                "speed-index": { "title": "SI", "displayValue": "2.3 s" },
                "interactive": { "title": "TTI", "displayValue": "3.4 s" },
                "first-meaningful-paint": { "title": "FMP", "displayValue": "1.3 s" },
                "first-cpu-idle": { "title": "FCI", "displayValue": "3.1 s" },
                "estimated-input-latency": { "title": "EIL", "displayValue": "20 ms" },
                "render-blocking-resources": {
                    "title": "Eliminate render-blocking resources",
                    "description": "Resources are blocking the first paint of your page.",
                    "score": 0.46,
                    "scoreDisplayMode": "numeric",
                    "displayValue": "Potential savings of 1,230 ms",
                    "details": { "type": "opportunity" }
                }
            }
        }
    }))
    .unwrap()
}

fn sample_report() -> Report {
    let desktop = StrategyReport::from_audit(
        "https://example.com/",
        Strategy::Desktop,
        &audit_result(json!(0.87)),
    )
    .unwrap();
    let mobile = StrategyReport::from_audit(
        "https://example.com/",
        Strategy::Mobile,
        &audit_result(json!(0.42)),
    )
    .unwrap();

    let mut report = Report::new();
    report.push(PageReport {
        url: "https://example.com/".to_string(),
        desktop,
        mobile,
    });
    report
}

// ============================================================================
// Score Mapping Tests
// ============================================================================

#[test]
fn test_to_percent() {
    assert_eq!(to_percent(0.87), 87);
    assert_eq!(to_percent(0.0), 0);
    assert_eq!(to_percent(1.0), 100);
    assert_eq!(to_percent(0.29), 29);
}

#[test]
fn test_strategy_report_from_audit() {
    let report = StrategyReport::from_audit(
        "https://example.com/",
        Strategy::Desktop,
        &audit_result(json!(0.87)),
    )
    .unwrap();

    assert_eq!(report.score, 87);
    assert_eq!(report.stats.get("First Contentful Paint"), Some("1.2 s"));
    assert_eq!(report.opportunities.len(), 1);
    assert_eq!(
        report.opportunities[0].title,
        "Eliminate render-blocking resources"
    );
}

#[test]
fn test_strategy_report_without_performance_score() {
    let err = StrategyReport::from_audit(
        "https://example.com/contact",
        Strategy::Mobile,
        &audit_result(Value::Null),
    )
    .unwrap_err();

    match err {
        ScanError::AuditError { url, strategy, .. } => {
            assert_eq!(url, "https://example.com/contact");
            assert_eq!(strategy, Strategy::Mobile);
        }
        other => panic!("expected AuditError, got {:?}", other),
    }
}

// ============================================================================
// Report Writer Tests
// ============================================================================

#[test]
fn test_report_serializes_as_array() {
    let value = serde_json::to_value(sample_report()).unwrap();
    let pages = value.as_array().expect("report should be a JSON array");

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["url"], "https://example.com/");
    assert_eq!(pages[0]["desktop"]["score"], 87);
    assert_eq!(pages[0]["mobile"]["score"], 42);
    assert_eq!(pages[0]["mobile"]["stats"]["Speed Index"], "2.3 s");
    assert_eq!(
        pages[0]["desktop"]["opportunities"][0]["type"],
        "opportunity"
    );
}

#[test]
fn test_save_report_writes_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");

    save_report(&sample_report(), &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let parsed: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
}

#[test]
fn test_save_empty_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");

    save_report(&Report::new(), &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.trim(), "[]");
}

#[test]
fn test_save_report_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("report.json");

    let result = save_report(&sample_report(), &path);
    assert!(matches!(result, Err(ScanError::IoError(_))));
    assert!(!path.exists());
}

// ============================================================================
// Text Summary Tests
// ============================================================================

#[test]
fn test_text_summary_contents() {
    let summary = generate_text_summary(&sample_report());

    assert!(summary.contains("SITESPEED PERFORMANCE SUMMARY"));
    assert!(summary.contains("Pages:        1"));
    assert!(summary.contains("[1] https://example.com/"));
    assert!(summary.contains("DESKTOP  score  87  [AVERAGE]"));
    assert!(summary.contains("MOBILE   score  42  [FAIL]"));
    assert!(summary.contains("First CPU Idle"));
    assert!(summary.contains(
        "[FAIL] Eliminate render-blocking resources (Potential savings of 1,230 ms)"
    ));
}

#[test]
fn test_text_summary_empty_report() {
    let summary = generate_text_summary(&Report::new());

    assert!(summary.contains("Pages:        0"));
    assert!(!summary.contains("Avg desktop"));
    assert!(summary.contains("End of Summary"));
}
