//! HTTP recommender adapter.
//!
//! POSTs the [`ContextView`] as JSON to a configured endpoint and expects a
//! JSON body `{"recommendations": [...]}` of [`RecommendationDraft`]s.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{RecommendationDraft, RecommenderConfig};
use crate::domain::ports::{ContextView, Recommender};

const SERVICE: &str = "recommender";
const API_KEY_ENV: &str = "DEPLOYTRACK_RECOMMENDER_API_KEY";

/// Configuration for the HTTP recommender.
#[derive(Debug, Clone)]
pub struct HttpRecommenderConfig {
    pub endpoint: String,
    /// Bearer token. Falls back to `DEPLOYTRACK_RECOMMENDER_API_KEY`; the
    /// request is sent unauthenticated when neither is set.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl HttpRecommenderConfig {
    /// Build from the `recommender` config section; `None` when no endpoint
    /// is configured.
    pub fn from_config(config: &RecommenderConfig) -> Option<Self> {
        config.endpoint.as_ref().map(|endpoint| Self {
            endpoint: endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
    }
}

pub struct HttpRecommender {
    config: HttpRecommenderConfig,
    client: Arc<reqwest::Client>,
}

impl HttpRecommender {
    pub fn new(config: HttpRecommenderConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::external(SERVICE, format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl Recommender for HttpRecommender {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn recommend(&self, view: &ContextView) -> DomainResult<Vec<RecommendationDraft>> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .json(&RecommendRequest { context: view });
        if let Some(key) = self.config.api_key() {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::external(SERVICE, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(DomainError::external(SERVICE, format!("returned {status}: {body}")));
        }

        let result: RecommendResponse = response
            .json()
            .await
            .map_err(|e| DomainError::SerializationError(format!("Failed to parse recommender response: {e}")))?;

        Ok(result.recommendations)
    }
}

#[derive(Debug, Serialize)]
struct RecommendRequest<'a> {
    context: &'a ContextView,
}

#[derive(Debug, Deserialize)]
struct RecommendResponse {
    #[serde(default)]
    recommendations: Vec<RecommendationDraft>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RecommendationType;
    use crate::services::test_support::sample_context;

    fn recommender(endpoint: String, api_key: Option<&str>) -> HttpRecommender {
        HttpRecommender::new(HttpRecommenderConfig {
            endpoint,
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_parses_recommendations() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/recommend")
            .match_header("authorization", "Bearer secret")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"context": {"project_id": "proj-1"}}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"recommendations": [{
                    "recommendation_type": "timeline",
                    "title": "Add a second install crew",
                    "description": "Deployment is the critical path",
                    "confidence": 0.8,
                    "priority": "high"
                }]}"#,
            )
            .create_async()
            .await;

        let view = ContextView::from_context(&sample_context(), 20);
        let drafts = recommender(format!("{}/recommend", server.url()), Some("secret"))
            .recommend(&view)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].recommendation_type, RecommendationType::Timeline);
        assert_eq!(drafts[0].estimated_impact, Default::default());
    }

    #[tokio::test]
    async fn test_error_status_is_external_service_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/recommend")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let view = ContextView::from_context(&sample_context(), 20);
        let err = recommender(format!("{}/recommend", server.url()), None)
            .recommend(&view)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ExternalService { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_serialization_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/recommend")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let view = ContextView::from_context(&sample_context(), 20);
        let err = recommender(format!("{}/recommend", server.url()), None)
            .recommend(&view)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SerializationError(_)));
    }

    #[test]
    fn test_config_requires_endpoint() {
        let config = RecommenderConfig::default();
        assert!(HttpRecommenderConfig::from_config(&config).is_none());

        let config = RecommenderConfig {
            enabled: true,
            endpoint: Some("http://localhost:9000/recommend".to_string()),
            api_key: None,
            timeout_ms: 1500,
        };
        let http = HttpRecommenderConfig::from_config(&config).unwrap();
        assert_eq!(http.timeout, Duration::from_millis(1500));
    }
}
