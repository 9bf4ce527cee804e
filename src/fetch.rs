//! The category-fetch collaborator boundary.
//!
//! The tree is fetched exactly once per browsing session, awaited at
//! startup. Transport is someone else's concern: the loader accepts any
//! future producing the category list. Every failure mode (transport
//! error, timeout, cancellation) resolves to an empty tree so the rest of
//! the page renders; nothing here is fatal and nothing stays pending.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::tree::{Category, CategoryTree};

/// Await the category fetch and build the session tree.
///
/// `timeout` bounds the wait (None waits indefinitely); `cancel` aborts it
/// early, e.g. when the user navigates away during startup.
pub async fn load_category_tree<F, E>(
    fetch: F,
    cancel: CancellationToken,
    timeout: Option<Duration>,
) -> CategoryTree
where
    F: Future<Output = Result<Vec<Category>, E>>,
    E: Display,
{
    let bounded = async {
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, fetch).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => Err(format!("timed out after {:?}", limit)),
            },
            None => fetch.await.map_err(|e| e.to_string()),
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => {
            log::warn!("category fetch cancelled; starting with an empty tree");
            CategoryTree::empty()
        }
        result = bounded => match result {
            Ok(categories) => {
                log::info!("category fetch complete: {} categories", categories.len());
                CategoryTree::new(categories)
            }
            Err(message) => {
                log::warn!("category fetch failed ({}); starting with an empty tree", message);
                CategoryTree::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrowseError;
    use crate::tree::Category;

    fn sample_categories() -> Vec<Category> {
        vec![Category::new(1, "Vehicles"), Category::new(2, "Electronics")]
    }

    #[test]
    fn test_successful_fetch_builds_tree() {
        let fetch = async { Ok::<_, BrowseError>(sample_categories()) };
        let tree =
            tokio_test::block_on(load_category_tree(fetch, CancellationToken::new(), None));

        assert_eq!(tree.len(), 2);
        assert!(tree.category(1).is_some());
    }

    #[tokio::test]
    async fn test_fetch_error_yields_empty_tree() {
        let fetch = async { Err::<Vec<Category>, _>(BrowseError::Fetch("503".to_string())) };
        let tree = load_category_tree(fetch, CancellationToken::new(), None).await;

        assert!(tree.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout_yields_empty_tree() {
        let fetch = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, BrowseError>(sample_categories())
        };
        let tree =
            load_category_tree(fetch, CancellationToken::new(), Some(Duration::from_secs(5)))
                .await;

        assert!(tree.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_yields_empty_tree() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        // The fetch itself never completes; cancellation must win
        let fetch = async {
            std::future::pending::<()>().await;
            Ok::<_, BrowseError>(sample_categories())
        };
        let tree = load_category_tree(fetch, cancel, None).await;

        assert!(tree.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_fetch() {
        let cancel = CancellationToken::new();
        let child = cancel.child_token();

        let loader = tokio::spawn(async move {
            let fetch = async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, BrowseError>(sample_categories())
            };
            load_category_tree(fetch, child, None).await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();

        let tree = loader.await.unwrap();
        assert!(tree.is_empty());
    }
}
