//! OpenAPI Documentation

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Service Catalog OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Service Catalog API",
        version = "1.0.0",
        description = "Team-scoped registration of services and service instances"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "services", description = "Service registration, documentation and access"),
        (name = "instances", description = "Service instances"),
        (name = "teams", description = "Teams and membership"),
        (name = "users", description = "User registration")
    ),
    paths(
        // Services
        super::services::list_services,
        super::services::create_service,
        super::services::update_service,
        super::services::get_service,
        super::services::delete_service,
        super::services::get_doc,
        super::services::set_doc,
        super::services::grant_team,
        super::services::revoke_team,
        // Instances
        super::instances::create_instance,
        super::instances::get_instance,
        super::instances::delete_instance,
        // Teams and users
        super::teams::create_team,
        super::teams::add_member,
        super::teams::register_user,
    ),
    components(
        schemas(
            crate::domain::ServiceModel,
            super::services::ServiceResponse,
            super::instances::CreateInstanceRequest,
            super::instances::InstanceResponse,
            super::teams::CreateTeamRequest,
            super::teams::TeamResponse,
            super::teams::RegisterUserRequest,
            super::common::ApiError,
            super::common::CreatedResponse,
        )
    ),
    modifiers(&BasicAuthAddon)
)]
pub struct CatalogApiDoc;

struct BasicAuthAddon;

impl Modify for BasicAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}
