//! Projection of raw audit data into the metrics and opportunities kept in the report.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use sitespeed_scanner::{
    AuditItem, AuditResult, Audits, Result, ScanError, ScoreDisplayMode, Strategy,
};

/// Minimum score for a numeric or binary audit to count as passed.
pub const PASS_THRESHOLD: f64 = 0.9;

/// Minimum score for a non-passing audit to rate as average rather than failing.
pub const AVERAGE_THRESHOLD: f64 = 0.5;

/// Report label and Lighthouse audit identifier for each metric in a snapshot.
pub const METRICS: [(&str, &str); 6] = [
    ("First Contentful Paint", "first-contentful-paint"),
    ("Speed Index", "speed-index"),
    ("Time To Interactive", "interactive"),
    ("First Meaningful Paint", "first-meaningful-paint"),
    ("First CPU Idle", "first-cpu-idle"),
    ("Estimated Input Latency", "estimated-input-latency"),
];

/// Display values of the [`METRICS`] audits, serialized as a label-keyed object
/// in table order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsSnapshot {
    entries: Vec<(&'static str, Option<String>)>,
}

impl MetricsSnapshot {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        self.entries
            .iter()
            .map(|(label, value)| (*label, value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MetricsSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let present: Vec<_> = self
            .entries
            .iter()
            .filter_map(|(label, value)| value.as_ref().map(|v| (label, v)))
            .collect();

        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (label, value) in present {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Look up every metric in [`METRICS`]. An absent audit is an error; an audit
/// without a `displayValue` is kept as an empty slot. `url` and `strategy` name
/// the audit in the error.
pub fn extract_metrics(
    url: &str,
    strategy: Strategy,
    result: &AuditResult,
) -> Result<MetricsSnapshot> {
    let audits = result.audits();
    let entries = METRICS
        .iter()
        .map(|(label, id)| {
            audits
                .get(id)
                .map(|item| (*label, item.display_value.clone()))
                .ok_or_else(|| ScanError::MissingMetricError {
                    url: url.to_string(),
                    strategy,
                    metric: id.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MetricsSnapshot { entries })
}

/// Whether Lighthouse would show this audit in the "passed" group.
pub fn is_passed(item: &AuditItem) -> bool {
    match item.score_display_mode {
        Some(ScoreDisplayMode::Manual) | Some(ScoreDisplayMode::NotApplicable) => true,
        Some(ScoreDisplayMode::Error) | Some(ScoreDisplayMode::Informative) => false,
        _ => item.score.is_some_and(|score| score >= PASS_THRESHOLD),
    }
}

/// An actionable, non-passing audit finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_display_mode: Option<ScoreDisplayMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Opportunity {
    fn from_item(item: &AuditItem) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            score: item.score,
            score_display_mode: item.score_display_mode.clone(),
            display_value: item.display_value.clone(),
            kind: item.details_type().map(str::to_string),
        }
    }

    pub fn rating(&self) -> Rating {
        if self.score_display_mode == Some(ScoreDisplayMode::Error) {
            return Rating::Error;
        }
        Rating::from_score(self.score)
    }
}

/// Failed and average audits tagged `details.type == "opportunity"`, in audit order.
pub fn extract_opportunities(audits: &Audits) -> Vec<Opportunity> {
    audits
        .iter()
        .filter(|(_, item)| !is_passed(item) && item.details_type() == Some("opportunity"))
        .map(|(_, item)| Opportunity::from_item(item))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Pass,
    Average,
    Fail,
    Error,
}

impl Rating {
    /// Rate a 0.0-1.0 score. A missing score rates as failing.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s >= PASS_THRESHOLD => Rating::Pass,
            Some(s) if s >= AVERAGE_THRESHOLD => Rating::Average,
            _ => Rating::Fail,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Pass => "pass",
            Rating::Average => "average",
            Rating::Fail => "fail",
            Rating::Error => "error",
        }
    }
}
