//! Router builder for the fake service

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};

use crate::handlers;
use crate::store::Store;

/// Builder for constructing the fake service router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount the collection and item routes backed by `store`
    pub fn with_collections(mut self, store: Arc<Store>) -> Self {
        let collections = Router::new()
            .route(
                "/{collection}/",
                get(handlers::list).post(handlers::create),
            )
            .route(
                "/{collection}/{id}",
                get(handlers::read)
                    .put(handlers::update)
                    .delete(handlers::delete),
            )
            .with_state(store);
        self.router = self.router.merge(collections);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(tracing::Level::DEBUG)),
        );
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
