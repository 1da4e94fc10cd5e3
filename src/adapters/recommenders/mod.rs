//! Recommender adapters.

pub mod http;
pub mod mock;

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::RecommenderConfig;
use crate::domain::ports::{NullRecommender, Recommender};

pub use http::{HttpRecommender, HttpRecommenderConfig};
pub use mock::{MockBehavior, MockRecommender};

/// Pick the recommender described by the config: HTTP when enabled with an
/// endpoint, the null recommender otherwise.
pub fn from_config(config: &RecommenderConfig) -> DomainResult<Arc<dyn Recommender>> {
    if !config.enabled {
        return Ok(Arc::new(NullRecommender::new()));
    }

    match HttpRecommenderConfig::from_config(config) {
        Some(http) => {
            info!(endpoint = %http.endpoint, "using HTTP recommender");
            Ok(Arc::new(HttpRecommender::new(http)?))
        }
        None => {
            warn!("recommender enabled without an endpoint, falling back to null recommender");
            Ok(Arc::new(NullRecommender::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_selects_adapter() {
        let disabled = RecommenderConfig::default();
        assert_eq!(from_config(&disabled).unwrap().name(), "null");

        let no_endpoint = RecommenderConfig {
            enabled: true,
            ..RecommenderConfig::default()
        };
        assert_eq!(from_config(&no_endpoint).unwrap().name(), "null");

        let http = RecommenderConfig {
            enabled: true,
            endpoint: Some("http://localhost:9000".to_string()),
            ..RecommenderConfig::default()
        };
        assert_eq!(from_config(&http).unwrap().name(), "http");
    }
}
