//! API Middleware
//!
//! Shared handler state and HTTP Basic authentication for Axum.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::{debug, warn};

use crate::api::common::ApiError;
use crate::domain::Identity;
use crate::repository::CatalogStore;
use crate::service::{IdentityService, InstanceRegistry, ServiceCatalog};

/// Application state shared by every handler
#[derive(Clone)]
pub struct ApiState {
    pub catalog: ServiceCatalog,
    pub instances: InstanceRegistry,
    pub identity: IdentityService,
}

impl ApiState {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog: ServiceCatalog::new(store.clone()),
            instances: InstanceRegistry::new(store.clone()),
            identity: IdentityService::new(store),
        }
    }
}

/// Extractor for requests carrying valid Basic credentials.
/// Resolves the user together with their team memberships.
pub struct Authenticated(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    ApiState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = ApiState::from_ref(state);

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let (email, password) = decode_basic(header)
            .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

        match state.identity.authenticate(&email, &password).await {
            Ok(Some(identity)) => {
                debug!(user = %identity.email(), "BasicAuth successful");
                Ok(Authenticated(identity))
            }
            Ok(None) => Err(unauthorized("Invalid credentials")),
            Err(e) => Err(e.into_response()),
        }
    }
}

/// Split a `Basic` Authorization header into email and password.
pub fn decode_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = match BASE64.decode(encoded.trim()) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "Invalid base64 in Authorization header");
            return None;
        }
    };
    let credentials = String::from_utf8(decoded).ok()?;
    let (email, password) = credentials.split_once(':')?;
    Some((email.to_string(), password.to_string()))
}

fn unauthorized(message: &str) -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(ApiError::new("UNAUTHORIZED", message)),
    )
        .into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"Service Catalog\""),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic() {
        let header = format!("Basic {}", BASE64.encode("a@b.com:s3cr:et"));
        assert_eq!(
            decode_basic(&header),
            Some(("a@b.com".to_string(), "s3cr:et".to_string()))
        );

        assert_eq!(decode_basic("Bearer abc"), None);
        assert_eq!(decode_basic("Basic !!!"), None);
        assert_eq!(decode_basic(&format!("Basic {}", BASE64.encode("nocolon"))), None);
    }
}
