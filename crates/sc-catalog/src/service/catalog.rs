//! Service Catalog
//!
//! Service lifecycle, documentation, access grants and the per-user catalog
//! listing.
//!
//! Store access is check-then-act without transactions. Two concurrent
//! requests on the same service can interleave between a check and the
//! write that depends on it (for example an instance created while the
//! service is being deleted). Operations on different services never
//! interfere.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{Identity, Service, ServiceModel};
use crate::error::{messages, CatalogError, Result};
use crate::manifest::Manifest;
use crate::repository::CatalogStore;
use crate::service::checks;

#[derive(Clone)]
pub struct ServiceCatalog {
    store: Arc<dyn CatalogStore>,
}

impl ServiceCatalog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    async fn find_active(&self, name: &str) -> Result<Service> {
        checks::active_service(self.store.find_service(name).await?)
    }

    /// Register a new service owned by the requester's first team.
    #[instrument(skip_all, fields(service = %manifest.id, user = %identity.email()))]
    pub async fn create(&self, manifest: &Manifest, identity: &Identity) -> Result<Service> {
        let team = checks::require_team(identity)?;
        manifest.require_production_endpoint()?;

        let exists = || {
            CatalogError::conflict(format!("Service with name {} already exists.", manifest.id))
        };
        // Deleted services keep their name reserved.
        if self.store.find_service(&manifest.id).await?.is_some() {
            return Err(exists());
        }

        let mut service = Service::new(&manifest.id, manifest.endpoint.clone(), &team.name);
        if let Some(doc) = &manifest.doc {
            service.doc = doc.clone();
        }

        self.store.insert_service(&service).await.map_err(|e| {
            if e.is_duplicate() { exists() } else { e.into() }
        })?;

        info!(team = %team.name, "Service created");
        Ok(service)
    }

    /// Replace the definition of the service named by `manifest.id`.
    #[instrument(skip_all, fields(service = %manifest.id, user = %identity.email()))]
    pub async fn update(&self, manifest: &Manifest, identity: &Identity) -> Result<Service> {
        let mut service = self.find_active(&manifest.id).await?;
        checks::require_owner(identity, &service)?;
        manifest.require_production_endpoint()?;

        service.redefine(manifest.endpoint.clone(), manifest.doc.clone());
        self.store.update_service(&service).await?;

        info!("Service updated");
        Ok(service)
    }

    /// Soft delete. Refused while any instance of the service exists.
    #[instrument(skip(self, identity), fields(user = %identity.email()))]
    pub async fn delete(&self, name: &str, identity: &Identity) -> Result<()> {
        let mut service = self.find_active(name).await?;
        checks::require_owner(identity, &service)?;
        checks::require_no_instances(self.store.count_instances(name).await?)?;

        service.mark_deleted();
        self.store.update_service(&service).await?;

        info!("Service deleted");
        Ok(())
    }

    /// Service definition, visible to every team with access.
    pub async fn get(&self, name: &str, identity: &Identity) -> Result<Service> {
        let service = self.find_active(name).await?;
        checks::require_service_access(identity, &service)?;
        Ok(service)
    }

    #[instrument(skip(self, doc, identity), fields(user = %identity.email()))]
    pub async fn set_doc(&self, name: &str, doc: &str, identity: &Identity) -> Result<()> {
        let mut service = self.find_active(name).await?;
        checks::require_owner(identity, &service)?;

        service.set_doc(doc);
        self.store.update_service(&service).await?;

        info!("Service documentation updated");
        Ok(())
    }

    pub async fn get_doc(&self, name: &str, identity: &Identity) -> Result<String> {
        let service = self.find_active(name).await?;
        checks::require_service_access(identity, &service)?;
        Ok(service.doc)
    }

    /// Give `team` access to the service. Access does not imply ownership.
    #[instrument(skip(self, identity), fields(user = %identity.email()))]
    pub async fn grant_access(&self, service: &str, team: &str, identity: &Identity) -> Result<()> {
        let mut service = self.find_active(service).await?;
        checks::require_service_access(identity, &service)?;
        let team = self
            .store
            .find_team(team)
            .await?
            .ok_or_else(CatalogError::team_not_found)?;

        if !service.grant_access(&team.name) {
            return Err(CatalogError::conflict(messages::TEAM_ALREADY_HAS_ACCESS));
        }
        self.store.update_service(&service).await?;

        info!(service = %service.name, team = %team.name, "Service access granted");
        Ok(())
    }

    /// Remove `team` from the service. The last team with access cannot be
    /// removed.
    #[instrument(skip(self, identity), fields(user = %identity.email()))]
    pub async fn revoke_access(&self, service: &str, team: &str, identity: &Identity) -> Result<()> {
        let mut service = self.find_active(service).await?;
        let team = self
            .store
            .find_team(team)
            .await?
            .ok_or_else(CatalogError::team_not_found)?;
        checks::require_service_access(identity, &service)?;
        checks::require_revocable(&service, &team.name)?;

        service.revoke_access(&team.name);
        self.store.update_service(&service).await?;

        info!(service = %service.name, team = %team.name, "Service access revoked");
        Ok(())
    }

    /// Services owned by any of the user's teams with all their instances,
    /// ordered by service name.
    pub async fn list_for_user(&self, identity: &Identity) -> Result<Vec<ServiceModel>> {
        let teams = identity.team_names();
        if teams.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_name = BTreeMap::new();
        for service in self.store.find_services_owned_by(&teams).await? {
            if by_name.contains_key(&service.name) {
                continue;
            }
            let mut instances: Vec<String> = self
                .store
                .find_instances_of(&service.name)
                .await?
                .into_iter()
                .map(|i| i.name)
                .collect();
            instances.sort();
            by_name.insert(service.name.clone(), instances);
        }

        Ok(by_name
            .into_iter()
            .map(|(service, instances)| ServiceModel { service, instances })
            .collect())
    }
}
