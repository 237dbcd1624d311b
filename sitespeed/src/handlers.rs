use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitespeed_core::report::{Report, generate_text_summary, save_report};
use sitespeed_core::traversal::{
    TraversalEvent, TraversalOptions, TraversalProgressCallback, execute_traversal,
};
use sitespeed_scanner::{AuditClient, SitemapLoader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use url::Url;

pub const DEFAULT_WEBSITE: &str = "https://www.centreforsight.net";

/// Environment variable holding the PageSpeed Insights API key
pub const API_KEY_VAR: &str = "PAGES_SPEED_KEY";

/// Everything one audit run needs
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub website: String,
    pub output: PathBuf,
    pub delay: Duration,
    pub endpoint: String,
    pub api_key: String,
}

/// Pick the API key from the command line, falling back to the environment
/// (after loading `.env` if one exists)
pub fn resolve_api_key(explicit: Option<&str>) -> Result<String, String> {
    if let Some(key) = explicit.map(str::trim)
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }

    dotenv::dotenv().ok();
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(format!(
            "No API key: pass --api-key or set {} (a .env file is read)",
            API_KEY_VAR
        )),
    }
}

/// Expand `~` in a user supplied output path
pub fn resolve_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn format_elapsed(elapsed: Duration) -> String {
    format!(
        "Report generated in {:.2} minutes",
        elapsed.as_millis() as f64 / 1000.0 / 60.0
    )
}

/// Load the sitemap, audit every page and write the report.
///
/// Nothing is written unless every page was audited.
pub async fn run_audit(
    options: &AuditOptions,
    progress_callback: Option<TraversalProgressCallback>,
) -> anyhow::Result<Report> {
    let loader = SitemapLoader::new()?;
    let urls = loader.load(&options.website).await?;

    let client = AuditClient::with_endpoint(options.endpoint.as_str(), options.api_key.as_str())?;
    let traversal_options = TraversalOptions {
        delay: options.delay,
    };
    let report = execute_traversal(&client, &urls, &traversal_options, progress_callback).await?;

    save_report(&report, &options.output)
        .with_context(|| format!("Failed to write report to {}", options.output.display()))?;
    info!("Wrote {} pages to {}", report.len(), options.output.display());

    Ok(report)
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn progress_message(event: &TraversalEvent) -> Option<String> {
    match event {
        TraversalEvent::Auditing {
            index,
            total,
            url,
            strategy,
        } => Some(format!("Auditing {}/{} [{}] {}", index + 1, total, strategy, url)),
        TraversalEvent::PageComplete { index, total, url } => {
            Some(format!("Audited {}/{} {}", index + 1, total, url))
        }
        TraversalEvent::Waiting {
            next_index,
            total,
            delay,
        } => Some(format!(
            "Waiting {}s before page {}/{}",
            delay.as_secs(),
            next_index + 1,
            total
        )),
        TraversalEvent::Finished { .. } => None,
    }
}

pub async fn handle_audit(sub_matches: &ArgMatches, quiet: bool) {
    // Initialize tracing for logging
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();

    let start = Instant::now();

    let website = sub_matches
        .get_one::<Url>("url")
        .map(|u| u.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_WEBSITE.to_string());
    let output = resolve_output_path(
        sub_matches
            .get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or("report.json"),
    );
    let delay = Duration::from_secs(*sub_matches.get_one::<u64>("delay").unwrap_or(&60));
    let endpoint = sub_matches
        .get_one::<Url>("endpoint")
        .map(|u| u.as_str().to_string())
        .unwrap_or_else(|| sitespeed_scanner::PAGESPEED_ENDPOINT.to_string());
    let show_summary = sub_matches.get_flag("summary");

    let api_key = match resolve_api_key(sub_matches.get_one::<String>("api-key").map(String::as_str))
    {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if !quiet {
        println!("\n{} Auditing {}", "→".blue(), website.bright_white());
        println!("Output: {}", output.display());
        println!("Delay between pages: {}s\n", delay.as_secs());
    }

    let options = AuditOptions {
        website,
        output,
        delay,
        endpoint,
        api_key,
    };

    let pb = spinner(quiet);
    let pb_clone = pb.clone();
    let progress_callback: TraversalProgressCallback = Arc::new(move |event: TraversalEvent| {
        if let Some(msg) = progress_message(&event) {
            pb_clone.set_message(msg);
        }
    });

    match run_audit(&options, Some(progress_callback)).await {
        Ok(report) => {
            pb.finish_and_clear();
            println!(
                "{} Audited {} pages, report written to {}",
                "✓".green().bold(),
                report.len(),
                options.output.display().to_string().bright_white()
            );
            println!("{}", format_elapsed(start.elapsed()));
            if show_summary {
                print!("\n{}", generate_text_summary(&report));
            }
        }
        Err(e) => {
            pb.finish_and_clear();
            eprintln!("{} Audit failed: {:#}", "✗".red().bold(), e);
            eprintln!("No report was written.");
            std::process::exit(1);
        }
    }
}

pub async fn handle_sitemap(sub_matches: &ArgMatches, quiet: bool) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();

    let website = sub_matches
        .get_one::<Url>("url")
        .map(|u| u.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_WEBSITE.to_string());

    let urls = match SitemapLoader::new() {
        Ok(loader) => loader.load(&website).await,
        Err(e) => Err(e),
    };

    match urls {
        Ok(urls) => {
            if !quiet {
                println!(
                    "{} {} pages in sitemap for {}\n",
                    "✓".green().bold(),
                    urls.len(),
                    website.bright_white()
                );
            }
            for url in urls {
                println!("{}", url);
            }
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
