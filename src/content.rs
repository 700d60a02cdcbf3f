//! Content collaborator boundary.
//!
//! Upstream question objects arrive with inconsistent field names depending
//! on which editor produced the material. All of that looseness is absorbed
//! here, in one adapter at the boundary: the engine only ever sees the
//! canonical [`Question`] shape.

use crate::types::{Question, QuestionId};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Result type for content operations
pub type ContentResult<T> = Result<T, ContentError>;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// A question as it arrives from upstream content, before normalization.
/// Field names vary across producers; the aliases cover the shapes seen in
/// the wild.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    #[serde(default, alias = "_id", alias = "questionId")]
    pub id: Option<QuestionId>,

    #[serde(default, alias = "prompt", alias = "title", alias = "text")]
    pub question: Option<String>,

    #[serde(default, alias = "solution", alias = "correct", alias = "correctAnswer")]
    pub answer: Option<String>,

    #[serde(default, alias = "position", alias = "sortOrder")]
    pub order: Option<u32>,
}

impl RawQuestion {
    /// Canonicalize one raw entry. `fallback_order` is the entry's position
    /// in the upstream list, used when no explicit order is present.
    fn into_question(self, fallback_order: u32) -> Option<Question> {
        let prompt = self.question.as_deref().map(str::trim).unwrap_or_default();
        let answer = self.answer.as_deref().map(str::trim).unwrap_or_default();

        if prompt.is_empty() || answer.is_empty() {
            return None;
        }

        Some(Question {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| ulid::Ulid::new().to_string()),
            prompt: prompt.to_string(),
            answer: answer.to_string(),
            order: self.order.unwrap_or(fallback_order),
        })
    }
}

/// Normalize an upstream batch: drop unusable entries (logged, not fatal)
/// and order by the explicit `order` field, upstream position as tiebreak.
pub fn canonicalize(raw: Vec<RawQuestion>) -> Vec<Question> {
    let total = raw.len();

    let mut questions: Vec<Question> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, r)| r.into_question(i as u32))
        .collect();
    questions.sort_by_key(|q| q.order);

    let dropped = total - questions.len();
    if dropped > 0 {
        tracing::warn!(dropped, total, "dropped malformed questions from content");
    }

    questions
}

/// Trait the engine consumes questions through: an ordered list, fetched
/// once before setup. No paging, no streaming.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_questions(&self, material_id: &str) -> ContentResult<Vec<Question>>;

    /// Get the name of this source
    fn name(&self) -> &str;
}

/// Configuration for the HTTP content source
#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ContentConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: std::env::var("CONTENT_BASE_URL")
                .ok()
                .and_then(|v| {
                    let trimmed = v.trim();
                    (!trimmed.is_empty()).then(|| trimmed.trim_end_matches('/').to_string())
                })
                .unwrap_or(defaults.base_url),
            api_token: std::env::var("CONTENT_API_TOKEN").ok().and_then(|v| {
                let trimmed = v.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }),
            timeout: std::env::var("CONTENT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// HTTP implementation against the product's REST API
pub struct HttpContentSource {
    config: ContentConfig,
    client: reqwest::Client,
}

impl HttpContentSource {
    pub fn new(config: ContentConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_questions(&self, material_id: &str) -> ContentResult<Vec<Question>> {
        let url = format!("{}/materials/{}/questions", self.config.base_url, material_id);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = tokio::time::timeout(self.config.timeout, request.send())
            .await
            .map_err(|_| ContentError::Timeout(self.config.timeout))?
            .map_err(|e| ContentError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ContentError::ApiError(format!(
                "content API returned status: {}",
                response.status()
            )));
        }

        let raw: Vec<RawQuestion> = response
            .json()
            .await
            .map_err(|e| ContentError::ParseError(e.to_string()))?;

        Ok(canonicalize(raw))
    }

    fn name(&self) -> &str {
        "http"
    }
}
