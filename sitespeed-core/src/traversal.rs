use crate::report::{PageReport, Report, StrategyReport};
use sitespeed_scanner::{AuditClient, Result, Strategy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Pause between pages, sized to stay inside the PageSpeed Insights rate limit.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(60);

/// Options for configuring a traversal
#[derive(Debug, Clone)]
pub struct TraversalOptions {
    /// Pause between finishing one page and starting the next
    pub delay: Duration,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }
}

/// Progress notifications emitted while a traversal runs
#[derive(Debug, Clone, PartialEq)]
pub enum TraversalEvent {
    Auditing {
        index: usize,
        total: usize,
        url: String,
        strategy: Strategy,
    },
    PageComplete {
        index: usize,
        total: usize,
        url: String,
    },
    Waiting {
        next_index: usize,
        total: usize,
        delay: Duration,
    },
    Finished {
        pages: usize,
    },
}

/// Callback for reporting traversal progress
pub type TraversalProgressCallback = Arc<dyn Fn(TraversalEvent) + Send + Sync>;

enum State {
    Running(usize),
    Delay(usize),
    Done,
}

/// Audit one page with both strategies, desktop first.
pub async fn audit_page(client: &AuditClient, url: &str) -> Result<PageReport> {
    audit_page_with(client, url, |_| {}).await
}

async fn audit_page_with<F>(client: &AuditClient, url: &str, on_request: F) -> Result<PageReport>
where
    F: Fn(Strategy),
{
    on_request(Strategy::Desktop);
    let desktop = client.audit(url, Strategy::Desktop).await?;
    on_request(Strategy::Mobile);
    let mobile = client.audit(url, Strategy::Mobile).await?;

    Ok(PageReport {
        url: url.to_string(),
        desktop: StrategyReport::from_audit(url, Strategy::Desktop, &desktop)?,
        mobile: StrategyReport::from_audit(url, Strategy::Mobile, &mobile)?,
    })
}

/// Audit every URL in order, one request at a time, pausing `options.delay`
/// between pages.
///
/// The first failure aborts the traversal and the partial report is dropped.
pub async fn execute_traversal(
    client: &AuditClient,
    urls: &[String],
    options: &TraversalOptions,
    progress_callback: Option<TraversalProgressCallback>,
) -> Result<Report> {
    let total = urls.len();
    let emit = |event: TraversalEvent| {
        if let Some(ref callback) = progress_callback {
            callback(event);
        }
    };

    info!("Auditing {} pages, {:?} apart", total, options.delay);

    let mut report = Report::new();
    let mut state = State::Running(0);

    loop {
        state = match state {
            State::Running(i) if i < total => {
                let url = &urls[i];
                let page = audit_page_with(client, url, |strategy| {
                    debug!("[{}/{}] {} {}", i + 1, total, strategy, url);
                    emit(TraversalEvent::Auditing {
                        index: i,
                        total,
                        url: url.clone(),
                        strategy,
                    });
                })
                .await;

                match page {
                    Ok(page) => {
                        info!(
                            "[{}/{}] {} desktop {} mobile {}",
                            i + 1,
                            total,
                            url,
                            page.desktop.score,
                            page.mobile.score
                        );
                        report.push(page);
                        emit(TraversalEvent::PageComplete {
                            index: i,
                            total,
                            url: url.clone(),
                        });
                        State::Delay(i + 1)
                    }
                    Err(e) => {
                        error!("Aborting at page {}/{} ({}): {}", i + 1, total, url, e);
                        return Err(e);
                    }
                }
            }
            State::Running(_) => State::Done,
            State::Delay(next) if next < total => {
                emit(TraversalEvent::Waiting {
                    next_index: next,
                    total,
                    delay: options.delay,
                });
                debug!("Sleeping {:?} before page {}", options.delay, next + 1);
                tokio::time::sleep(options.delay).await;
                State::Running(next)
            }
            // Nothing left to pace against
            State::Delay(next) => State::Running(next),
            State::Done => break,
        };
    }

    info!("Traversal complete: {} pages audited", report.len());
    emit(TraversalEvent::Finished {
        pages: report.len(),
    });
    Ok(report)
}
