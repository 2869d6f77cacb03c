use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use thiserror::Error;

use crate::models::SearchHit;

const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// A result record as the provider hands it over, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub title: String,
    pub body: Option<String>,
    pub snippet: Option<String>,
}

impl RawRecord {
    /// Snippet priority: body, then snippet, then empty
    pub fn into_hit(self) -> SearchHit {
        let snippet = self.body.or(self.snippet).unwrap_or_default();
        SearchHit {
            title: self.title,
            snippet,
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(String),
    #[error("search response could not be parsed: {0}")]
    Parse(String),
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<RawRecord>, SearchError>;
}

/// Scrapes DuckDuckGo's JavaScript-free HTML endpoint
pub struct DuckDuckGoProvider {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoProvider {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_endpoint(DUCKDUCKGO_HTML_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; LifeHacksCycle/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RawRecord>, SearchError> {
        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));

        let response = self
            .client
            .get(&url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http(format!("DuckDuckGo returned {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo response read failed: {e}")))?;

        parse_duckduckgo_html(&html, max_results)
    }
}

pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<RawRecord>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = selector(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )?;
    let title_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut records = Vec::new();

    for element in document.select(&result_sel) {
        if records.len() >= max_results {
            break;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = collapse_whitespace(&title_el.text().collect::<String>());
        if title.is_empty() {
            continue;
        }

        let body = element
            .select(&snippet_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|text| !text.is_empty());

        records.push(RawRecord {
            title,
            body,
            snippet: None,
        });
    }

    Ok(records)
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("invalid selector {css}: {e:?}")))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Runs the configured query and normalizes what comes back.
///
/// Never fails: any provider error is logged and yields no hits, so later
/// stages always get a well-typed input.
#[derive(Clone)]
pub struct ResultFetcher {
    provider: Arc<dyn SearchProvider>,
}

impl ResultFetcher {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        tracing::info!(query, limit, "executing web search");

        match self.provider.search(query, limit).await {
            Ok(records) => {
                let hits: Vec<SearchHit> = records
                    .into_iter()
                    .take(limit)
                    .map(RawRecord::into_hit)
                    .collect();
                tracing::debug!(count = hits.len(), "web search returned hits");
                hits
            }
            Err(e) => {
                tracing::error!(error = %e, "web search failed");
                Vec::new()
            }
        }
    }
}
