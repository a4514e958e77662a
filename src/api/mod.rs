//! HTTP API - axum router, shared state and request extractors.
//!
//! Every route lives under `/api/foodfleet` and requires a bearer token that
//! matches a `users.api_token`. Handlers parse the request, call into
//! [`crate::core`] and shape the result with [`crate::resources`].

pub mod auth;
pub mod companies;
pub mod documents;
pub mod menu_items;
pub mod payment_types;
pub mod stores;

use crate::{
    config::AppConfig,
    errors::{Error, Result},
    query::ListQuery,
    square::LocationsApi,
    storage::Storage,
};
use axum::{
    Router,
    extract::{FromRequestParts, OriginalUri, Query},
    http::request::Parts,
    middleware,
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Path prefix shared by every route
pub const API_PREFIX: &str = "/api/foodfleet";

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared connection pool
    pub db: DatabaseConnection,
    /// Configuration loaded at startup
    pub config: Arc<AppConfig>,
    /// Where store images are written
    pub storage: Storage,
    /// Square Locations API, faked in tests
    pub square: Arc<dyn LocationsApi>,
}

/// Parsed list parameters plus the request path used in pagination links
#[derive(Debug, Clone)]
pub struct ListParams {
    /// Parsed `filter`, `sort`, `include` and `page` parameters
    pub query: ListQuery,
    /// Full request path, including the API prefix
    pub path: String,
}

#[async_trait]
impl FromRequestParts<AppState> for ListParams {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri).map_err(
            |e| Error::InvalidQuery {
                message: e.body_text(),
            },
        )?;
        // Nested routers see the path without the API prefix
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path(), |uri| uri.path())
            .to_string();
        Ok(Self {
            query: ListQuery::from_pairs(pairs, state.config.pagination),
            path,
        })
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(documents::routes())
        .merge(stores::routes())
        .merge(companies::routes())
        .merge(menu_items::routes())
        .merge(payment_types::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
