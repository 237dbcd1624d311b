//! Fetch `sitemap.xml` and parse it into page URLs.

use crate::error::{Result, ScanError};
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

/// Location of the sitemap for a website root.
pub fn sitemap_url(website: &str) -> Result<String> {
    let candidate = format!("{}/sitemap.xml", website.trim_end_matches('/'));
    Url::parse(&candidate).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", website, e)))?;
    Ok(candidate)
}

/// Parse a sitemap protocol document (`urlset` / `url` / `loc`) into its locations,
/// in document order.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut saw_root = false;
    // Set while inside a <url> element, filled by its <loc> child
    let mut current_loc: Option<Option<String>> = None;
    let mut loc_text: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match open.len() {
                    0 => {
                        check_root(&name, saw_root)?;
                        saw_root = true;
                    }
                    1 if name == "url" => current_loc = Some(None),
                    2 if name == "loc" && current_loc.is_some() => {
                        loc_text = Some(String::new());
                    }
                    _ => {}
                }
                open.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match open.len() {
                    0 => {
                        check_root(&name, saw_root)?;
                        saw_root = true;
                    }
                    1 if name == "url" => {
                        return Err(ScanError::ParseError(format!(
                            "url entry {} has no loc",
                            urls.len() + 1
                        )));
                    }
                    2 if name == "loc" => {
                        if let Some(loc) = current_loc.as_mut() {
                            *loc = Some(String::new());
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if open.is_empty() && saw_root {
                    return Err(trailing_content());
                }
                if let Some(text) = loc_text.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| ScanError::ParseError(err.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(e)) => {
                if open.is_empty() && saw_root {
                    return Err(trailing_content());
                }
                if let Some(text) = loc_text.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                let depth = open.len();
                let name = open.pop().unwrap_or_default();
                match (depth, name.as_str()) {
                    (3, "loc") => {
                        if let (Some(loc), Some(text)) = (current_loc.as_mut(), loc_text.take()) {
                            *loc = Some(text);
                        }
                    }
                    (2, "url") => {
                        let loc = current_loc.take().flatten().unwrap_or_default();
                        let loc = loc.trim();
                        if loc.is_empty() {
                            return Err(ScanError::ParseError(format!(
                                "url entry {} has no loc",
                                urls.len() + 1
                            )));
                        }
                        urls.push(loc.to_string());
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ScanError::ParseError(format!(
                    "malformed XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err(ScanError::ParseError(format!(
            "unexpected end of document inside <{}>",
            open.join("><")
        )));
    }
    if !saw_root {
        return Err(ScanError::ParseError(
            "document has no urlset element".to_string(),
        ));
    }

    Ok(urls)
}

fn trailing_content() -> ScanError {
    ScanError::ParseError("unexpected content after </urlset>".to_string())
}

fn check_root(name: &str, saw_root: bool) -> Result<()> {
    if saw_root {
        return Err(ScanError::ParseError(format!(
            "unexpected second root element <{}>",
            name
        )));
    }
    if name != "urlset" {
        return Err(ScanError::ParseError(format!(
            "expected <urlset> root element, found <{}>",
            name
        )));
    }
    Ok(())
}

/// Loads the page list for a website from its `sitemap.xml`.
pub struct SitemapLoader {
    client: Client,
}

impl SitemapLoader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("Sitespeed/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }

    pub async fn load(&self, website: &str) -> Result<Vec<String>> {
        let url = sitemap_url(website)?;
        info!("Fetching sitemap {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ScanError::FetchError {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::FetchError {
                url,
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| ScanError::FetchError {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        debug!("Sitemap body is {} bytes", body.len());

        let urls = parse_sitemap(&body)?;
        info!("Sitemap lists {} pages", urls.len());
        Ok(urls)
    }
}
