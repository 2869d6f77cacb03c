use anyhow::Result;
use std::sync::Arc;

use crate::categorizer::{Categorizer, Classifier, GrokClient};
use crate::config::Config;
use crate::models::{OutputBundle, UserProfile};
use crate::projector::OutputProjector;
use crate::relay::WebhookRelay;
use crate::search::{DuckDuckGoProvider, ResultFetcher, SearchProvider};

/// One search, categorize and project cycle.
///
/// Holds only immutable collaborators, so a single instance can serve any
/// number of concurrent cycles.
pub struct Pipeline {
    fetcher: ResultFetcher,
    categorizer: Categorizer,
    relay: Option<WebhookRelay>,
    query: String,
    limit: usize,
}

impl Pipeline {
    /// Build the production pipeline: DuckDuckGo search and Grok classification
    pub fn from_config(config: &Config) -> Result<Self> {
        let search = Arc::new(DuckDuckGoProvider::new()?);
        let classifier = Arc::new(GrokClient::new(config)?);
        Self::new(config, search, classifier)
    }

    pub fn new(
        config: &Config,
        search: Arc<dyn SearchProvider>,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self> {
        let relay = match &config.webhook_url {
            Some(url) => Some(WebhookRelay::new(url.clone())?),
            None => None,
        };

        Ok(Self {
            fetcher: ResultFetcher::new(search),
            categorizer: Categorizer::new(classifier),
            relay,
            query: config.search_query.clone(),
            limit: config.search_limit,
        })
    }

    pub fn relay_enabled(&self) -> bool {
        self.relay.is_some()
    }

    pub async fn run_cycle(&self, profiles: &[UserProfile]) -> OutputBundle {
        let raw_hits = self.fetcher.fetch(&self.query, self.limit).await;
        let categorized = self.categorizer.categorize(&raw_hits).await;
        let bundle = OutputProjector::project(&categorized, &raw_hits, profiles);

        if let Some(relay) = &self.relay {
            relay.deliver(&bundle).await;
        }

        tracing::info!(
            hits = raw_hits.len(),
            categorized = categorized.total_hits(),
            profiles = profiles.len(),
            "automation cycle completed"
        );

        bundle
    }
}
