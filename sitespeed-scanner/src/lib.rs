pub mod audit;
pub mod error;
pub mod result;
pub mod sitemap;

pub use audit::{AuditClient, PAGESPEED_ENDPOINT, Strategy};
pub use error::{Result, ScanError};
pub use result::{AuditDetails, AuditItem, AuditResult, Audits, ScoreDisplayMode};
pub use sitemap::{SitemapLoader, parse_sitemap, sitemap_url};
