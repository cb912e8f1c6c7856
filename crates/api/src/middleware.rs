//! API middleware.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tobaeki_core::RelationshipEngine;

/// Application state.
pub struct AppState<S> {
    /// The engine every handler calls into.
    pub engine: RelationshipEngine<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<S> AppState<S> {
    /// Create application state around an engine.
    #[must_use]
    pub const fn new(engine: RelationshipEngine<S>) -> Self {
        Self { engine }
    }
}

/// Log method, URI, status and elapsed time of every request.
pub async fn request_timing(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}
