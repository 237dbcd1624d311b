pub mod extract;
pub mod report;
pub mod traversal;

pub use extract::{
    METRICS, MetricsSnapshot, Opportunity, PASS_THRESHOLD, Rating, extract_metrics,
    extract_opportunities, is_passed,
};
pub use report::{
    PageReport, Report, StrategyReport, generate_text_summary, save_report, to_percent,
};
pub use traversal::{
    DEFAULT_DELAY, TraversalEvent, TraversalOptions, TraversalProgressCallback, audit_page,
    execute_traversal,
};
