//! Service Manifest
//!
//! YAML document uploaded to create or update a service:
//!
//! ```yaml
//! id: mysqlapi
//! endpoint:
//!   production: mysqlapi.com
//!   test: localhost:8000
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::PRODUCTION_ENVIRONMENT;
use crate::error::{messages, CatalogError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    pub id: String,

    #[serde(default)]
    pub endpoint: BTreeMap<String, String>,

    #[serde(default)]
    pub doc: Option<String>,
}

impl Manifest {
    /// Parse a manifest. Only syntax and the `id` are checked here; the
    /// production endpoint rule is enforced by the catalog operations.
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = serde_yml::from_str(content)
            .map_err(|e| CatalogError::validation(format!("Invalid manifest: {}", e)))?;

        if manifest.id.trim().is_empty() {
            return Err(CatalogError::validation(messages::MANIFEST_ID_REQUIRED));
        }

        Ok(manifest)
    }

    /// Only the key is required; an empty URL still counts.
    pub fn has_production_endpoint(&self) -> bool {
        self.endpoint.contains_key(PRODUCTION_ENVIRONMENT)
    }

    pub(crate) fn require_production_endpoint(&self) -> Result<()> {
        if self.has_production_endpoint() {
            Ok(())
        } else {
            Err(CatalogError::validation(messages::PRODUCTION_ENDPOINT_REQUIRED))
        }
    }
}
