use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::models::{CategorizedResult, SearchHit};

pub const SYSTEM_INSTRUCTION: &str = "You are an efficient categorizer. Output only valid JSON.";

const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Error)]
pub enum CategorizeError {
    #[error("classification request failed: {0}")]
    Http(String),
    #[error("classification service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("classification service returned no completion")]
    EmptyCompletion,
    #[error("categorization is not valid: {0}")]
    Schema(#[from] serde_json::Error),
}

/// A hosted text-completion service
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CategorizeError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for xAI's OpenAI-compatible chat completions API
pub struct GrokClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GrokClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.grok_api_key.clone(),
            model: config.grok_model.clone(),
            endpoint: format!(
                "{}/v1/chat/completions",
                config.grok_api_base.trim_end_matches('/')
            ),
        })
    }
}

#[async_trait]
impl Classifier for GrokClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CategorizeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CategorizeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(CategorizeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| CategorizeError::Http(format!("unreadable response: {e}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CategorizeError::EmptyCompletion)
    }
}

/// Sorts hits into the fixed taxonomy through a [`Classifier`].
///
/// Categorization is all-or-nothing: any failure produces
/// [`CategorizedResult::empty`].
#[derive(Clone)]
pub struct Categorizer {
    classifier: Arc<dyn Classifier>,
}

impl Categorizer {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub async fn categorize(&self, hits: &[SearchHit]) -> CategorizedResult {
        if hits.is_empty() {
            return CategorizedResult::empty();
        }

        match self.try_categorize(hits).await {
            Ok(categorized) => categorized,
            Err(e) => {
                tracing::error!(error = %e, "categorization failed, using empty fallback");
                CategorizedResult::empty()
            }
        }
    }

    async fn try_categorize(
        &self,
        hits: &[SearchHit],
    ) -> Result<CategorizedResult, CategorizeError> {
        let prompt = build_prompt(hits)?;
        let completion = self.classifier.complete(SYSTEM_INSTRUCTION, &prompt).await?;
        let categorized = parse_categorization(&completion)?;

        tracing::debug!(
            productivity = categorized.productivity.len(),
            health = categorized.health.len(),
            creativity = categorized.creativity.len(),
            "categorization complete"
        );

        Ok(categorized)
    }
}

pub fn build_prompt(hits: &[SearchHit]) -> Result<String, CategorizeError> {
    let data = serde_json::to_string(hits)?;

    Ok(format!(
        r#"Categorize the following search results into 'productivity', 'health' and 'creativity'.

RULES:
1. Every result belongs to exactly one category
2. Filter for uniqueness: merge results that describe the same hack
3. Use exactly the three keys below, even when a category is empty
4. Each entry is an object with a "title" string and a "snippet" string

Format your response as JSON:
{{"productivity": [{{"title": "...", "snippet": "..."}}], "health": [], "creativity": []}}

Data: {}"#,
        data
    ))
}

/// Strictly validate a completion as a categorization.
///
/// The JSON object is taken from the first `{` to the last `}`. Missing
/// keys, extra keys and wrongly typed values are all rejected.
pub fn parse_categorization(text: &str) -> Result<CategorizedResult, CategorizeError> {
    let json_text = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    };

    Ok(serde_json::from_str(json_text)?)
}
