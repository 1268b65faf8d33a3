//! Service Instances API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::middleware::{ApiState, Authenticated};
use crate::domain::ServiceInstance;
use crate::error::CatalogError;

/// Create instance request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceRequest {
    /// Unique instance name
    pub name: String,
    /// Service to provision from
    pub service_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanceResponse {
    pub name: String,
    pub service_name: String,
    pub teams: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceInstance> for InstanceResponse {
    fn from(i: ServiceInstance) -> Self {
        Self {
            name: i.name,
            service_name: i.service_name,
            teams: i.teams.into_iter().collect(),
            created_at: i.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/instances",
    tag = "instances",
    request_body = CreateInstanceRequest,
    responses(
        (status = 201, description = "Instance created", body = InstanceResponse),
        (status = 403, description = "No access to the service"),
        (status = 404, description = "Service not found"),
        (status = 409, description = "Instance name already taken")
    ),
    security(("basic_auth" = []))
)]
pub async fn create_instance(
    State(state): State<ApiState>,
    auth: Authenticated,
    Json(req): Json<CreateInstanceRequest>,
) -> Result<(StatusCode, Json<InstanceResponse>), CatalogError> {
    let instance = state
        .instances
        .create(&req.name, &req.service_name, &auth.0)
        .await?;
    Ok((StatusCode::CREATED, Json(instance.into())))
}

#[utoipa::path(
    get,
    path = "/instances/{name}",
    tag = "instances",
    params(("name" = String, Path, description = "Instance name")),
    responses(
        (status = 200, description = "Instance found", body = InstanceResponse),
        (status = 403, description = "No access"),
        (status = 404, description = "Instance not found")
    ),
    security(("basic_auth" = []))
)]
pub async fn get_instance(
    State(state): State<ApiState>,
    auth: Authenticated,
    Path(name): Path<String>,
) -> Result<Json<InstanceResponse>, CatalogError> {
    let instance = state.instances.get(&name, &auth.0).await?;
    Ok(Json(instance.into()))
}

#[utoipa::path(
    delete,
    path = "/instances/{name}",
    tag = "instances",
    params(("name" = String, Path, description = "Instance name")),
    responses(
        (status = 204, description = "Instance removed"),
        (status = 403, description = "No access"),
        (status = 404, description = "Instance not found")
    ),
    security(("basic_auth" = []))
)]
pub async fn delete_instance(
    State(state): State<ApiState>,
    auth: Authenticated,
    Path(name): Path<String>,
) -> Result<StatusCode, CatalogError> {
    state.instances.delete(&name, &auth.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn instances_router(state: ApiState) -> Router {
    Router::new()
        .route("/instances", post(create_instance))
        .route("/instances/:name", get(get_instance).delete(delete_instance))
        .with_state(state)
}
