//! Raw PageSpeed Insights response data.
//!
//! Only the parts of the `runPagespeed` payload that the report needs are modelled;
//! everything else in the response is ignored during deserialization.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Parsed response for one URL and one strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub lighthouse_result: LighthouseResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LighthouseResult {
    #[serde(default)]
    pub categories: Categories,
    #[serde(default)]
    pub audits: Audits,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Categories {
    pub performance: Option<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub score: Option<f64>,
}

impl AuditResult {
    /// Performance category score in the 0.0-1.0 range, if Lighthouse produced one.
    pub fn performance_score(&self) -> Option<f64> {
        self.lighthouse_result
            .categories
            .performance
            .as_ref()
            .and_then(|c| c.score)
    }

    pub fn audits(&self) -> &Audits {
        &self.lighthouse_result.audits
    }
}

/// One named Lighthouse check.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditItem {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub score: Option<f64>,
    pub score_display_mode: Option<ScoreDisplayMode>,
    pub display_value: Option<String>,
    pub details: Option<AuditDetails>,
}

impl AuditItem {
    /// The `details.type` tag, e.g. `"opportunity"` or `"table"`.
    pub fn details_type(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.kind.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditDetails {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// How Lighthouse wants an audit's score interpreted.
///
/// Unknown modes are kept verbatim so they round-trip into the report unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScoreDisplayMode {
    Manual,
    NotApplicable,
    Error,
    Informative,
    Numeric,
    Binary,
    Other(String),
}

impl ScoreDisplayMode {
    pub fn as_str(&self) -> &str {
        match self {
            ScoreDisplayMode::Manual => "manual",
            ScoreDisplayMode::NotApplicable => "notApplicable",
            ScoreDisplayMode::Error => "error",
            ScoreDisplayMode::Informative => "informative",
            ScoreDisplayMode::Numeric => "numeric",
            ScoreDisplayMode::Binary => "binary",
            ScoreDisplayMode::Other(s) => s,
        }
    }
}

impl From<String> for ScoreDisplayMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "manual" => ScoreDisplayMode::Manual,
            "notApplicable" => ScoreDisplayMode::NotApplicable,
            "error" => ScoreDisplayMode::Error,
            "informative" => ScoreDisplayMode::Informative,
            "numeric" => ScoreDisplayMode::Numeric,
            "binary" => ScoreDisplayMode::Binary,
            _ => ScoreDisplayMode::Other(s),
        }
    }
}

impl From<ScoreDisplayMode> for String {
    fn from(mode: ScoreDisplayMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for ScoreDisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `audits` object, keyed by audit identifier, in the order the API sent it.
///
/// `serde_json::Map` sorts its keys unless `preserve_order` is enabled, so the
/// mapping is collected by hand to keep the response order.
#[derive(Debug, Clone, Default)]
pub struct Audits(Vec<(String, AuditItem)>);

impl Audits {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert an audit. A repeated key keeps its original position and takes the new value.
    pub fn insert(&mut self, id: impl Into<String>, item: AuditItem) {
        let id = id.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = item,
            None => self.0.push((id, item)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&AuditItem> {
        self.0
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, item)| item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AuditItem)> {
        self.0.iter().map(|(id, item)| (id.as_str(), item))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, AuditItem)> for Audits {
    fn from_iter<I: IntoIterator<Item = (String, AuditItem)>>(iter: I) -> Self {
        let mut audits = Audits::new();
        for (id, item) in iter {
            audits.insert(id, item);
        }
        audits
    }
}

impl<'de> Deserialize<'de> for Audits {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AuditsVisitor;

        impl<'de> Visitor<'de> for AuditsVisitor {
            type Value = Audits;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of audit identifiers to audit items")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Audits, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut audits = Audits::new();
                while let Some((id, item)) = map.next_entry::<String, AuditItem>()? {
                    audits.insert(id, item);
                }
                Ok(audits)
            }
        }

        deserializer.deserialize_map(AuditsVisitor)
    }
}
