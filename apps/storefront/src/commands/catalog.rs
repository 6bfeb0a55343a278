//! # Catalog Commands
//!
//! Browsing the treats and asking Santa about one.

use tracing::debug;

use bites_core::Product;

use crate::error::ApiError;
use crate::recommend::{recommend_or_fallback, Recommender};
use crate::state::Session;

/// Lists the catalog in display order.
pub fn list_products(session: &Session) -> Vec<Product> {
    debug!("list_products command");
    session.catalog.products().to_vec()
}

/// Asks the recommender about a product.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  ask berry-merry-chaat                                                 │
/// │        │                                                                │
/// │        ▼                                                                │
/// │  look up product ──(unknown)──► [NOT_FOUND]                            │
/// │        │                                                                │
/// │        ▼                                                                │
/// │  recommend_or_fallback(name, timeout) ──► always a festive line        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn ask_santa(
    session: &Session,
    recommender: &dyn Recommender,
    product_id: &str,
) -> Result<String, ApiError> {
    debug!(product_id = %product_id, "ask_santa command");

    let product = session.catalog.get(product_id)?;
    Ok(recommend_or_fallback(recommender, &product.name, session.recommend_timeout).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::error::ErrorCode;
    use crate::recommend::{OfflineRecommender, RecommendError, ERROR_FALLBACK};
    use async_trait::async_trait;
    use bites_store::MemoryStore;
    use std::sync::Arc;

    struct EchoSanta;

    #[async_trait]
    impl Recommender for EchoSanta {
        async fn recommend(&self, product_name: &str) -> Result<Option<String>, RecommendError> {
            Ok(Some(format!("Ho ho ho! Try the {}!", product_name)))
        }
    }

    fn session() -> Session {
        let kv = Arc::new(MemoryStore::new());
        Session::open(kv, &StorefrontConfig::default()).unwrap().0
    }

    #[test]
    fn test_list_products() {
        let products = list_products(&session());
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "berry-merry-chaat");
    }

    #[tokio::test]
    async fn test_ask_santa_uses_product_name() {
        let text = ask_santa(&session(), &EchoSanta, "merry-strawberry-chocolate")
            .await
            .unwrap();
        assert_eq!(text, "Ho ho ho! Try the Merry StrawBERRY chocolate!");
    }

    #[tokio::test]
    async fn test_ask_santa_offline() {
        let text = ask_santa(&session(), &OfflineRecommender, "berry-merry-chaat")
            .await
            .unwrap();
        assert_eq!(text, ERROR_FALLBACK);
    }

    #[tokio::test]
    async fn test_ask_santa_unknown_product() {
        let err = ask_santa(&session(), &EchoSanta, "fruitcake")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
