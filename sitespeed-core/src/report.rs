// Report model, JSON writer and text summary

use crate::extract::{
    MetricsSnapshot, Opportunity, Rating, extract_metrics, extract_opportunities,
};
use serde::Serialize;
use sitespeed_scanner::{AuditResult, Result, ScanError, Strategy};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Scale a 0.0-1.0 category score to a whole 0-100 score.
pub fn to_percent(score: f64) -> u32 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyReport {
    pub score: u32,
    pub stats: MetricsSnapshot,
    pub opportunities: Vec<Opportunity>,
}

impl StrategyReport {
    pub fn from_audit(url: &str, strategy: Strategy, result: &AuditResult) -> Result<Self> {
        let score = result
            .performance_score()
            .ok_or_else(|| ScanError::audit(url, strategy, "response has no performance score"))?;

        Ok(Self {
            score: to_percent(score),
            stats: extract_metrics(url, strategy, result)?,
            opportunities: extract_opportunities(result.audits()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    pub url: String,
    pub desktop: StrategyReport,
    pub mobile: StrategyReport,
}

/// Page reports in sitemap order. Serializes as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Report {
    pages: Vec<PageReport>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: PageReport) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[PageReport] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

pub fn save_report(report: &Report, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn generate_text_summary(report: &Report) -> String {
    let rule = "━".repeat(80);
    let mut summary = String::new();

    summary.push_str(&format!("{}\n", rule));
    summary.push_str("                         SITESPEED PERFORMANCE SUMMARY\n");
    summary.push_str(&format!("{}\n\n", rule));

    summary.push_str(&format!(
        "Generated:    {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    summary.push_str(&format!("Pages:        {}\n", report.len()));

    if !report.is_empty() {
        let average = |pick: fn(&PageReport) -> u32| {
            report.pages().iter().map(pick).sum::<u32>() as f64 / report.len() as f64
        };
        summary.push_str(&format!(
            "Avg desktop:  {:.0}\n",
            average(|p| p.desktop.score)
        ));
        summary.push_str(&format!(
            "Avg mobile:   {:.0}\n",
            average(|p| p.mobile.score)
        ));
    }
    summary.push('\n');

    for (idx, page) in report.pages().iter().enumerate() {
        summary.push_str(&format!("{}\n", rule));
        summary.push_str(&format!("[{}] {}\n", idx + 1, page.url));
        summary.push_str(&format!("{}\n", rule));

        for (strategy, strategy_report) in [
            (Strategy::Desktop, &page.desktop),
            (Strategy::Mobile, &page.mobile),
        ] {
            summary.push_str(&format_strategy(strategy, strategy_report));
        }
    }

    summary.push_str(&format!("{}\n", rule));
    summary.push_str("                                End of Summary\n");
    summary.push_str(&format!("{}\n", rule));

    summary
}

fn format_strategy(strategy: Strategy, report: &StrategyReport) -> String {
    let mut out = String::new();
    let rating = Rating::from_score(Some(report.score as f64 / 100.0));

    out.push_str(&format!(
        "\n  {:<8} score {:>3}  [{}]\n",
        strategy.as_str().to_uppercase(),
        report.score,
        rating.label().to_uppercase()
    ));

    for (label, value) in report.stats.iter() {
        if let Some(value) = value {
            out.push_str(&format!("    {:<26} {}\n", label, value));
        }
    }

    if report.opportunities.is_empty() {
        out.push_str("    No opportunities found\n");
    } else {
        out.push_str(&format!("    Opportunities ({}):\n", report.opportunities.len()));
        for opportunity in &report.opportunities {
            let mut line = format!(
                "      [{}] {}",
                opportunity.rating().label().to_uppercase(),
                opportunity.title
            );
            if let Some(ref savings) = opportunity.display_value {
                line.push_str(&format!(" ({})", savings));
            }
            out.push_str(&line);
            out.push('\n');
        }
    }
    out.push('\n');

    out
}
