use crate::error::{Result, ScanError};
use crate::result::AuditResult;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

pub const PAGESPEED_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Device profile the audit API simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Desktop,
    Mobile,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Desktop => "desktop",
            Strategy::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client for the PageSpeed Insights `runPagespeed` endpoint.
///
/// One request per call; no retries and no timeout beyond the transport default.
pub struct AuditClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl AuditClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(PAGESPEED_ENDPOINT, api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("Sitespeed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request the audit for `url` rendered with `strategy`.
    pub async fn audit(&self, url: &str, strategy: Strategy) -> Result<AuditResult> {
        info!("Requesting {} audit for {}", strategy, url);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("url", url),
                ("strategy", strategy.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ScanError::audit(url, strategy, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::audit(
                url,
                strategy,
                format!("API responded with HTTP {}", status.as_u16()),
            ));
        }

        let result = response
            .json::<AuditResult>()
            .await
            .map_err(|e| ScanError::audit(url, strategy, format!("unreadable response: {}", e)))?;

        debug!(
            "{} audit for {} returned {} audits",
            strategy,
            url,
            result.audits().len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn endpoint(server: &MockServer) -> String {
        format!("{}/pagespeedonline/v5/runPagespeed", server.uri())
    }

    #[tokio::test]
    async fn test_audit_sends_url_strategy_and_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/pagespeedonline/v5/runPagespeed"))
            .and(query_param("url", "https://example.com/about"))
            .and(query_param("strategy", "mobile"))
            .and(query_param("key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "lighthouseResult": {
                    "categories": { "performance": { "score": 0.73 } },
                    "audits": {}
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AuditClient::with_endpoint(endpoint(&mock_server), "secret").unwrap();
        let result = client
            .audit("https://example.com/about", Strategy::Mobile)
            .await
            .unwrap();

        assert_eq!(result.performance_score(), Some(0.73));
    }

    #[tokio::test]
    async fn test_non_success_status_is_audit_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let client = AuditClient::with_endpoint(endpoint(&mock_server), "secret").unwrap();
        let err = client
            .audit("https://example.com/", Strategy::Desktop)
            .await
            .unwrap_err();

        match err {
            ScanError::AuditError {
                url,
                strategy,
                reason,
            } => {
                assert_eq!(url, "https://example.com/");
                assert_eq!(strategy, Strategy::Desktop);
                assert!(reason.contains("429"), "unexpected reason: {}", reason);
            }
            other => panic!("expected AuditError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_audit_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = AuditClient::with_endpoint(endpoint(&mock_server), "secret").unwrap();
        let err = client
            .audit("https://example.com/", Strategy::Mobile)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScanError::AuditError {
                strategy: Strategy::Mobile,
                ..
            }
        ));
        assert!(err.to_string().contains("https://example.com/ (mobile)"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_audit_error() {
        let client = AuditClient::with_endpoint("http://127.0.0.1:1/runPagespeed", "secret").unwrap();
        let err = client
            .audit("https://example.com/", Strategy::Desktop)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::AuditError { .. }));
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Desktop.to_string(), "desktop");
        assert_eq!(Strategy::Mobile.to_string(), "mobile");
        assert_eq!(
            serde_json::to_string(&Strategy::Mobile).unwrap(),
            r#""mobile""#
        );
    }
}
