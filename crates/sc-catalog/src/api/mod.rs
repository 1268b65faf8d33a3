//! API Layer
//!
//! REST endpoints for the catalog. Handlers only translate HTTP to catalog
//! operations; status codes come from [`common::status_for`].

pub mod common;
pub mod middleware;
pub mod openapi;

pub mod instances;
pub mod services;
pub mod teams;

use axum::Router;

pub use common::*;
pub use middleware::{ApiState, Authenticated};
pub use openapi::CatalogApiDoc;

pub use instances::instances_router;
pub use services::services_router;
pub use teams::teams_router;

/// All catalog routes.
pub fn catalog_router(state: ApiState) -> Router {
    Router::new()
        .merge(services_router(state.clone()))
        .merge(instances_router(state.clone()))
        .merge(teams_router(state))
}
