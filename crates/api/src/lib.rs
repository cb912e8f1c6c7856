//! HTTP API layer for tobaeki.
//!
//! Exposes the relationship engine over JSON:
//!
//! - **Endpoints**: `/friendships` and `/participant` routes
//! - **Middleware**: shared state and request timing
//!
//! Built on Axum 0.8. The router is generic over the ledger store, so tests
//! run it against the in-memory store.

pub mod endpoints;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, request_timing};
