//! Services API
//!
//! Service registration from YAML manifests, documentation and team access.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::middleware::{ApiState, Authenticated};
use crate::domain::{Service, ServiceModel};
use crate::error::CatalogError;
use crate::manifest::Manifest;

/// Service definition
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub name: String,
    /// Environment name to URL
    pub endpoint: BTreeMap<String, String>,
    pub doc: String,
    pub owner_teams: Vec<String>,
    pub teams: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Service> for ServiceResponse {
    fn from(s: Service) -> Self {
        Self {
            owner_teams: s.owner_teams().iter().cloned().collect(),
            teams: s.teams().iter().cloned().collect(),
            name: s.name,
            endpoint: s.endpoint,
            doc: s.doc,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// List the services owned by the caller's teams
#[utoipa::path(
    get,
    path = "/services",
    tag = "services",
    responses(
        (status = 200, description = "Owned services with their instances", body = Vec<ServiceModel>)
    ),
    security(("basic_auth" = []))
)]
pub async fn list_services(
    State(state): State<ApiState>,
    auth: Authenticated,
) -> Result<Json<Vec<ServiceModel>>, CatalogError> {
    Ok(Json(state.catalog.list_for_user(&auth.0).await?))
}

/// Register a service from a YAML manifest
#[utoipa::path(
    post,
    path = "/services",
    tag = "services",
    request_body(content = String, description = "Service manifest", content_type = "application/x-yaml"),
    responses(
        (status = 201, description = "Service created", body = ServiceResponse),
        (status = 400, description = "Invalid manifest or missing production endpoint"),
        (status = 403, description = "Caller belongs to no team"),
        (status = 409, description = "Service name already taken")
    ),
    security(("basic_auth" = []))
)]
pub async fn create_service(
    State(state): State<ApiState>,
    auth: Authenticated,
    body: String,
) -> Result<(StatusCode, Json<ServiceResponse>), CatalogError> {
    let manifest = Manifest::parse(&body)?;
    let service = state.catalog.create(&manifest, &auth.0).await?;
    Ok((StatusCode::CREATED, Json(service.into())))
}

/// Replace a service definition from a YAML manifest
#[utoipa::path(
    put,
    path = "/services",
    tag = "services",
    request_body(content = String, description = "Service manifest", content_type = "application/x-yaml"),
    responses(
        (status = 204, description = "Service updated"),
        (status = 400, description = "Invalid manifest or missing production endpoint"),
        (status = 403, description = "Caller is not an owner"),
        (status = 404, description = "Service not found")
    ),
    security(("basic_auth" = []))
)]
pub async fn update_service(
    State(state): State<ApiState>,
    auth: Authenticated,
    body: String,
) -> Result<StatusCode, CatalogError> {
    let manifest = Manifest::parse(&body)?;
    state.catalog.update(&manifest, &auth.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/services/{name}",
    tag = "services",
    params(("name" = String, Path, description = "Service name")),
    responses(
        (status = 200, description = "Service found", body = ServiceResponse),
        (status = 403, description = "No access"),
        (status = 404, description = "Service not found")
    ),
    security(("basic_auth" = []))
)]
pub async fn get_service(
    State(state): State<ApiState>,
    auth: Authenticated,
    Path(name): Path<String>,
) -> Result<Json<ServiceResponse>, CatalogError> {
    let service = state.catalog.get(&name, &auth.0).await?;
    Ok(Json(service.into()))
}

#[utoipa::path(
    delete,
    path = "/services/{name}",
    tag = "services",
    params(("name" = String, Path, description = "Service name")),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 403, description = "Not an owner, or the service still has instances"),
        (status = 404, description = "Service not found")
    ),
    security(("basic_auth" = []))
)]
pub async fn delete_service(
    State(state): State<ApiState>,
    auth: Authenticated,
    Path(name): Path<String>,
) -> Result<StatusCode, CatalogError> {
    state.catalog.delete(&name, &auth.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/services/{name}/doc",
    tag = "services",
    params(("name" = String, Path, description = "Service name")),
    responses(
        (status = 200, description = "Service documentation", body = String, content_type = "text/plain"),
        (status = 403, description = "No access"),
        (status = 404, description = "Service not found")
    ),
    security(("basic_auth" = []))
)]
pub async fn get_doc(
    State(state): State<ApiState>,
    auth: Authenticated,
    Path(name): Path<String>,
) -> Result<String, CatalogError> {
    state.catalog.get_doc(&name, &auth.0).await
}

#[utoipa::path(
    put,
    path = "/services/{name}/doc",
    tag = "services",
    params(("name" = String, Path, description = "Service name")),
    request_body(content = String, description = "Documentation text", content_type = "text/plain"),
    responses(
        (status = 204, description = "Documentation stored"),
        (status = 403, description = "Not an owner"),
        (status = 404, description = "Service not found")
    ),
    security(("basic_auth" = []))
)]
pub async fn set_doc(
    State(state): State<ApiState>,
    auth: Authenticated,
    Path(name): Path<String>,
    body: String,
) -> Result<StatusCode, CatalogError> {
    state.catalog.set_doc(&name, &body, &auth.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Give a team access to a service
#[utoipa::path(
    put,
    path = "/services/{name}/teams/{team}",
    tag = "services",
    params(
        ("name" = String, Path, description = "Service name"),
        ("team" = String, Path, description = "Team name")
    ),
    responses(
        (status = 204, description = "Access granted"),
        (status = 403, description = "Caller has no access to the service"),
        (status = 404, description = "Service or team not found"),
        (status = 409, description = "Team already has access")
    ),
    security(("basic_auth" = []))
)]
pub async fn grant_team(
    State(state): State<ApiState>,
    auth: Authenticated,
    Path((name, team)): Path<(String, String)>,
) -> Result<StatusCode, CatalogError> {
    state.catalog.grant_access(&name, &team, &auth.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a team's access to a service
#[utoipa::path(
    delete,
    path = "/services/{name}/teams/{team}",
    tag = "services",
    params(
        ("name" = String, Path, description = "Service name"),
        ("team" = String, Path, description = "Team name")
    ),
    responses(
        (status = 204, description = "Access revoked"),
        (status = 403, description = "No access, or the team is the last one with access"),
        (status = 404, description = "Service or team not found, or team has no access")
    ),
    security(("basic_auth" = []))
)]
pub async fn revoke_team(
    State(state): State<ApiState>,
    auth: Authenticated,
    Path((name, team)): Path<(String, String)>,
) -> Result<StatusCode, CatalogError> {
    state.catalog.revoke_access(&name, &team, &auth.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn services_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/services",
            get(list_services).post(create_service).put(update_service),
        )
        .route("/services/:name", get(get_service).delete(delete_service))
        .route("/services/:name/doc", get(get_doc).put(set_doc))
        .route("/services/:name/teams/:team", put(grant_team).delete(revoke_team))
        .with_state(state)
}
