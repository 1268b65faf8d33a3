//! Teams and Users API
//!
//! User registration is the only unauthenticated endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::CreatedResponse;
use crate::api::middleware::{ApiState, Authenticated};
use crate::domain::Team;
use crate::error::CatalogError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    pub name: String,
    /// Member emails
    pub users: Vec<String>,
}

impl From<Team> for TeamResponse {
    fn from(t: Team) -> Self {
        Self {
            name: t.name,
            users: t.users,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
}

/// Create a team with the caller as its first member
#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Missing team name"),
        (status = 409, description = "Team already exists")
    ),
    security(("basic_auth" = []))
)]
pub async fn create_team(
    State(state): State<ApiState>,
    auth: Authenticated,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), CatalogError> {
    let team = state.identity.create_team(&req.name, &auth.0).await?;
    Ok((StatusCode::CREATED, Json(team.into())))
}

/// Add a registered user to a team the caller belongs to
#[utoipa::path(
    put,
    path = "/teams/{team}/users/{email}",
    tag = "teams",
    params(
        ("team" = String, Path, description = "Team name"),
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 204, description = "User added"),
        (status = 403, description = "Caller is not a member of the team"),
        (status = 404, description = "Team or user not found"),
        (status = 409, description = "User is already a member")
    ),
    security(("basic_auth" = []))
)]
pub async fn add_member(
    State(state): State<ApiState>,
    auth: Authenticated,
    Path((team, email)): Path<(String, String)>,
) -> Result<StatusCode, CatalogError> {
    state.identity.add_member(&team, &email, &auth.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = CreatedResponse),
        (status = 400, description = "Missing email or password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_user(
    State(state): State<ApiState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), CatalogError> {
    let user = state.identity.register_user(&req.email, &req.password).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(user.email))))
}

pub fn teams_router(state: ApiState) -> Router {
    Router::new()
        .route("/teams", post(create_team))
        .route("/teams/:team/users/:email", put(add_member))
        .route("/users", post(register_user))
        .with_state(state)
}
