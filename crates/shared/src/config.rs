use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_SEARCH_QUERY: &str =
    "latest AI life hacks for productivity health creativity site:reddit.com OR x.com";
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const DEFAULT_MODEL: &str = "grok-beta";
pub const DEFAULT_API_BASE: &str = "https://api.x.ai";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub grok_api_key: String,
    pub grok_model: String,
    pub grok_api_base: String,
    pub webhook_url: Option<String>,
    pub search_query: String,
    pub search_limit: usize,
    pub listen_addr: String,
}

impl Config {
    /// Configuration with every optional setting at its default
    pub fn new(grok_api_key: impl Into<String>) -> Self {
        Self {
            grok_api_key: grok_api_key.into(),
            grok_model: DEFAULT_MODEL.to_string(),
            grok_api_base: DEFAULT_API_BASE.to_string(),
            webhook_url: None,
            search_query: DEFAULT_SEARCH_QUERY.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Unset and blank values are treated
    /// the same.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            get(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let grok_api_key = var("GROK_API_KEY").context(
            "GROK_API_KEY environment variable is not set.\n\n\
            To fix this, create ~/.config/life-hacks-cycle/.env with:\n  \
            GROK_API_KEY=your_key_here\n  \
            ZAPIER_WEBHOOK_URL=https://hooks.zapier.com/... (optional)\n\n\
            Get your xAI API key from: https://console.x.ai",
        )?;

        let mut config = Self::new(grok_api_key);

        config.webhook_url = var("ZAPIER_WEBHOOK_URL");
        if let Some(model) = var("GROK_MODEL") {
            config.grok_model = model;
        }
        if let Some(base) = var("GROK_API_BASE") {
            config.grok_api_base = base;
        }
        if let Some(query) = var("SEARCH_QUERY") {
            config.search_query = query;
        }
        if let Some(limit) = var("SEARCH_LIMIT") {
            config.search_limit = parse_search_limit(&limit)?;
        }
        if let Some(addr) = var("LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        Ok(config)
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/life-hacks-cycle/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("life-hacks-cycle").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

fn parse_search_limit(raw: &str) -> Result<usize> {
    let limit: usize = raw
        .parse()
        .with_context(|| format!("SEARCH_LIMIT must be a positive integer, got '{}'", raw))?;
    if limit == 0 {
        anyhow::bail!("SEARCH_LIMIT must be a positive integer, got 0");
    }
    Ok(limit)
}
