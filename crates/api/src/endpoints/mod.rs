//! API endpoints.

mod friendships;
mod participants;

use axum::Router;
use serde::Deserialize;
use tobaeki_core::{LedgerStore, Page};
use validator::Validate;

use crate::middleware::AppState;

/// `?page=&limit=` query for paginated listings.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PageQuery {
    /// 1-based page number.
    #[validate(range(min = 1, max = 10_000))]
    pub page: Option<u64>,

    /// Items per page.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
}

impl PageQuery {
    /// The requested page, with defaults filled in.
    #[must_use]
    pub fn to_page(&self) -> Page {
        Page::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(Page::DEFAULT_LIMIT),
        )
    }
}

/// Create the API router.
pub fn router<S: LedgerStore>() -> Router<AppState<S>> {
    Router::new()
        .nest("/friendships", friendships::router())
        .nest("/participant", participants::router())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let page = PageQuery::default().to_page();
        assert_eq!(page, Page::new(1, Page::DEFAULT_LIMIT));
    }

    #[test]
    fn test_page_query_rejects_large_limit() {
        let query = PageQuery {
            page: Some(1),
            limit: Some(500),
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_page_query_rejects_huge_page() {
        let query = PageQuery {
            page: Some(u64::MAX),
            limit: None,
        };
        assert!(query.validate().is_err());
    }
}
