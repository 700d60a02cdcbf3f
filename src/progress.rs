//! Progress-tracking collaborator boundary.
//!
//! The engine reports exactly two things per run: one `start` when the
//! session first becomes playable and one `submit` with the final score when
//! it completes. Both are best-effort from the player's point of view — the
//! session driver logs failures and never retries or surfaces them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Result type for progress operations
pub type ProgressResult<T> = Result<T, ProgressError>;

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Final-score payload sent on completion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub score: u32,
    pub total_items: usize,
    /// Free-form per-run detail (team breakdown, spin count); the upstream
    /// service stores it opaquely.
    pub answers_data: Value,
    pub finished_at: String,
}

#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Record that a play session began for this material.
    async fn start(&self, material_id: &str) -> ProgressResult<()>;

    /// Record the final result for this material.
    async fn submit(&self, material_id: &str, report: &ProgressReport) -> ProgressResult<()>;

    /// Get the name of this sink
    fn name(&self) -> &str;
}

/// Configuration for the HTTP progress sink
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ProgressConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: std::env::var("PROGRESS_BASE_URL")
                .ok()
                .and_then(|v| {
                    let trimmed = v.trim();
                    (!trimmed.is_empty()).then(|| trimmed.trim_end_matches('/').to_string())
                })
                .unwrap_or(defaults.base_url),
            api_token: std::env::var("PROGRESS_API_TOKEN").ok().and_then(|v| {
                let trimmed = v.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }),
            timeout: std::env::var("PROGRESS_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// HTTP implementation against the product's REST API
pub struct HttpProgressSink {
    config: ProgressConfig,
    client: reqwest::Client,
}

impl HttpProgressSink {
    pub fn new(config: ProgressConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    async fn post(&self, url: String, body: Option<&ProgressReport>) -> ProgressResult<()> {
        let mut request = self.client.post(&url);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }
        if let Some(report) = body {
            request = request.json(report);
        }

        let response = tokio::time::timeout(self.config.timeout, request.send())
            .await
            .map_err(|_| ProgressError::Timeout(self.config.timeout))?
            .map_err(|e| ProgressError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProgressError::ApiError(format!(
                "progress API returned status: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl ProgressSink for HttpProgressSink {
    async fn start(&self, material_id: &str) -> ProgressResult<()> {
        let url = format!("{}/progress/{}/start", self.config.base_url, material_id);
        self.post(url, None).await
    }

    async fn submit(&self, material_id: &str, report: &ProgressReport) -> ProgressResult<()> {
        let url = format!("{}/progress/{}/submit", self.config.base_url, material_id);
        self.post(url, Some(report)).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// No-op sink for tests and offline play
pub struct NoopProgressSink;

#[async_trait]
impl ProgressSink for NoopProgressSink {
    async fn start(&self, _material_id: &str) -> ProgressResult<()> {
        Ok(())
    }

    async fn submit(&self, _material_id: &str, _report: &ProgressReport) -> ProgressResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_uses_upstream_field_names() {
        let report = ProgressReport {
            score: 4,
            total_items: 15,
            answers_data: json!({"spins": 15}),
            finished_at: "2025-11-02T12:00:00+00:00".to_string(),
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["score"], 4);
        assert_eq!(value["totalItems"], 15);
        assert_eq!(value["answersData"]["spins"], 15);
        assert!(value["finishedAt"].is_string());
    }

    #[tokio::test]
    async fn test_noop_sink_always_succeeds() {
        let sink = NoopProgressSink;
        assert!(sink.start("m1").await.is_ok());

        let report = ProgressReport {
            score: 0,
            total_items: 0,
            answers_data: Value::Null,
            finished_at: String::new(),
        };
        assert!(sink.submit("m1", &report).await.is_ok());
        assert_eq!(sink.name(), "noop");
    }
}
