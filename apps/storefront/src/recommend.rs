//! # Santa's Recommendation
//!
//! A short festive blurb for a product, produced by an outside text service.
//!
//! ## Fallback Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  recommend_or_fallback(recommender, "Berry Merry Chaat", timeout)      │
//! │                                                                         │
//! │  Ok(Some("Ho ho ho! ..."))  ──► that text                              │
//! │  Ok(Some("   ")) / Ok(None) ──► EMPTY_FALLBACK                         │
//! │  Err(_)                     ──► ERROR_FALLBACK                         │
//! │  no answer within timeout   ──► ERROR_FALLBACK                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller always gets a string; nothing here fails.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Shown when the service answered with nothing.
pub const EMPTY_FALLBACK: &str = "Ho ho ho! It looks delicious, my friend!";

/// Shown when the service failed or took too long.
pub const ERROR_FALLBACK: &str = "Ho ho ho! This treat is on my nice list this year!";

/// Recommendation failures.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// No service is configured or reachable.
    #[error("Recommendation service unavailable")]
    Unavailable,

    /// The service answered with an error.
    #[error("Recommendation request failed: {0}")]
    Request(String),
}

/// Source of product recommendations.
#[async_trait]
pub trait Recommender: Send + Sync {
    /// Produces a blurb for `product_name`, or `None` if the service had
    /// nothing to say.
    async fn recommend(&self, product_name: &str) -> Result<Option<String>, RecommendError>;
}

/// The built-in recommender: no service, always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRecommender;

#[async_trait]
impl Recommender for OfflineRecommender {
    async fn recommend(&self, _product_name: &str) -> Result<Option<String>, RecommendError> {
        Err(RecommendError::Unavailable)
    }
}

/// Asks `recommender` about `product_name`, substituting a fallback on empty
/// answers, errors and timeouts.
pub async fn recommend_or_fallback(
    recommender: &dyn Recommender,
    product_name: &str,
    timeout: Duration,
) -> String {
    match tokio::time::timeout(timeout, recommender.recommend(product_name)).await {
        Ok(Ok(Some(text))) if !text.trim().is_empty() => {
            debug!(product = %product_name, "Recommendation received");
            text
        }
        Ok(Ok(_)) => {
            debug!(product = %product_name, "Empty recommendation");
            EMPTY_FALLBACK.to_string()
        }
        Ok(Err(RecommendError::Unavailable)) => {
            debug!(product = %product_name, "Recommendation service unavailable");
            ERROR_FALLBACK.to_string()
        }
        Ok(Err(err)) => {
            warn!(product = %product_name, error = %err, "Recommendation failed");
            ERROR_FALLBACK.to_string()
        }
        Err(_) => {
            warn!(product = %product_name, ?timeout, "Recommendation timed out");
            ERROR_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers with a fixed result after an optional delay.
    struct Scripted {
        delay: Duration,
        answer: fn() -> Result<Option<String>, RecommendError>,
    }

    #[async_trait]
    impl Recommender for Scripted {
        async fn recommend(&self, _product_name: &str) -> Result<Option<String>, RecommendError> {
            tokio::time::sleep(self.delay).await;
            (self.answer)()
        }
    }

    fn scripted(answer: fn() -> Result<Option<String>, RecommendError>) -> Scripted {
        Scripted {
            delay: Duration::ZERO,
            answer,
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(3);

    #[tokio::test]
    async fn test_text_passes_through() {
        let santa = scripted(|| Ok(Some("Ho ho! Try the chaat.".to_string())));
        let text = recommend_or_fallback(&santa, "Berry Merry Chaat", TIMEOUT).await;
        assert_eq!(text, "Ho ho! Try the chaat.");
    }

    #[tokio::test]
    async fn test_empty_answers_use_empty_fallback() {
        let none = scripted(|| Ok(None));
        assert_eq!(recommend_or_fallback(&none, "x", TIMEOUT).await, EMPTY_FALLBACK);

        let blank = scripted(|| Ok(Some("  \n".to_string())));
        assert_eq!(recommend_or_fallback(&blank, "x", TIMEOUT).await, EMPTY_FALLBACK);
    }

    #[tokio::test]
    async fn test_errors_use_error_fallback() {
        let failing = scripted(|| Err(RecommendError::Request("503".into())));
        assert_eq!(recommend_or_fallback(&failing, "x", TIMEOUT).await, ERROR_FALLBACK);

        assert_eq!(
            recommend_or_fallback(&OfflineRecommender, "x", TIMEOUT).await,
            ERROR_FALLBACK
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_error_fallback() {
        let slow = Scripted {
            delay: Duration::from_secs(60),
            answer: || Ok(Some("too late".to_string())),
        };

        let text = recommend_or_fallback(&slow, "x", TIMEOUT).await;
        assert_eq!(text, ERROR_FALLBACK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_within_timeout() {
        let thoughtful = Scripted {
            delay: Duration::from_secs(1),
            answer: || Ok(Some("worth the wait".to_string())),
        };

        let text = recommend_or_fallback(&thoughtful, "x", TIMEOUT).await;
        assert_eq!(text, "worth the wait");
    }
}
