//! Optional web-augmented context.
//!
//! Web snippets enrich the answer prompt but are never required: every
//! failure mode (network error, rate limit, capability disabled) degrades to
//! an empty string and the pipeline carries on with transcript context alone.

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

/// Trait for fetching short supplementary snippets for a query.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web for `query`.
    ///
    /// Returns newline-joined `title: snippet` lines, or an empty string when
    /// the capability is unavailable or the call fails.
    async fn search(&self, query: &str, max_results: usize) -> String;
}

/// Searcher used when web augmentation is disabled.
#[derive(Debug, Default)]
pub struct DisabledSearcher;

#[async_trait]
impl WebSearcher for DisabledSearcher {
    async fn search(&self, _query: &str, _max_results: usize) -> String {
        String::new()
    }
}

/// DuckDuckGo searcher scraping the HTML endpoint.
pub struct DuckDuckGoSearcher {
    client: reqwest::Client,
    endpoint: String,
    result_re: Regex,
    snippet_re: Regex,
    tag_re: Regex,
}

const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

impl DuckDuckGoSearcher {
    /// Create a searcher against the public DuckDuckGo HTML endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(DUCKDUCKGO_HTML_ENDPOINT)
    }

    /// Create a searcher against a custom endpoint (used in tests).
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            result_re: Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*>(.*?)</a>"#)
                .expect("valid result regex"),
            snippet_re: Regex::new(r#"(?s)<a[^>]*class="result__snippet"[^>]*>(.*?)</a>"#)
                .expect("valid snippet regex"),
            tag_re: Regex::new(r"<[^>]+>").expect("valid tag regex"),
        }
    }

    /// Parse `title: snippet` lines out of a results page.
    fn parse_results(&self, html: &str, max_results: usize) -> String {
        let titles = self
            .result_re
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| self.clean_fragment(m.as_str()));
        let snippets = self
            .snippet_re
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| self.clean_fragment(m.as_str()));

        titles
            .zip(snippets)
            .filter(|(title, snippet)| !title.is_empty() && !snippet.is_empty())
            .take(max_results)
            .map(|(title, snippet)| format!("{}: {}", title, snippet))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn clean_fragment(&self, fragment: &str) -> String {
        let without_tags = self.tag_re.replace_all(fragment, "");
        decode_entities(without_tags.trim())
    }

    async fn fetch(&self, query: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let url = Url::parse_with_params(&self.endpoint, &[("q", query)])?;
        let html = self
            .client
            .get(url)
            .header("User-Agent", "Mozilla/5.0 (compatible; sporre)")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(html)
    }
}

impl Default for DuckDuckGoSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearcher for DuckDuckGoSearcher {
    async fn search(&self, query: &str, max_results: usize) -> String {
        if query.trim().is_empty() || max_results == 0 {
            return String::new();
        }

        match self.fetch(query).await {
            Ok(html) => {
                let results = self.parse_results(&html, max_results);
                debug!("Web search returned {} lines", results.lines().count());
                results
            }
            Err(e) => {
                warn!("Web search failed: {}", e);
                String::new()
            }
        }
    }
}

/// Decode the handful of HTML entities DuckDuckGo emits in snippets.
fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
}
