//! Instance Registry
//!
//! Named instances provisioned from an active service.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{Identity, ServiceInstance};
use crate::error::{messages, CatalogError, Result};
use crate::repository::CatalogStore;
use crate::service::checks;

#[derive(Clone)]
pub struct InstanceRegistry {
    store: Arc<dyn CatalogStore>,
}

impl InstanceRegistry {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Provision `name` from `service_name`. The instance is accessible to
    /// the first of the requester's teams that can use the service.
    #[instrument(skip(self, identity), fields(user = %identity.email()))]
    pub async fn create(
        &self,
        name: &str,
        service_name: &str,
        identity: &Identity,
    ) -> Result<ServiceInstance> {
        if name.trim().is_empty() {
            return Err(CatalogError::validation("You must provide the instance name"));
        }

        let service = checks::active_service(self.store.find_service(service_name).await?)?;
        let team = checks::team_with_access(identity, &service)?;

        let exists = || CatalogError::conflict(format!("Instance with name {} already exists.", name));
        if self.store.find_instance(name).await?.is_some() {
            return Err(exists());
        }

        let instance = ServiceInstance::new(name, &service.name, &team.name);
        self.store.insert_instance(&instance).await.map_err(|e| {
            if e.is_duplicate() { exists() } else { e.into() }
        })?;

        info!(service = %service.name, team = %team.name, "Instance created");
        Ok(instance)
    }

    #[instrument(skip(self, identity), fields(user = %identity.email()))]
    pub async fn delete(&self, name: &str, identity: &Identity) -> Result<()> {
        let instance = self.find(name).await?;
        checks::require_instance_access(identity, &instance)?;

        if !self.store.remove_instance(name).await? {
            return Err(CatalogError::not_found(messages::INSTANCE_NOT_FOUND));
        }

        info!(service = %instance.service_name, "Instance removed");
        Ok(())
    }

    pub async fn get(&self, name: &str, identity: &Identity) -> Result<ServiceInstance> {
        let instance = self.find(name).await?;
        checks::require_instance_access(identity, &instance)?;
        Ok(instance)
    }

    async fn find(&self, name: &str) -> Result<ServiceInstance> {
        self.store
            .find_instance(name)
            .await?
            .ok_or_else(|| CatalogError::not_found(messages::INSTANCE_NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::repository::CatalogStore;
    use crate::service::test_support::Fixture;

    #[tokio::test]
    async fn test_create_binds_first_team_with_access() {
        let fx = Fixture::new().await;
        let user = fx.user_in(&["alpha", "beta", "gamma"]).await;
        let mut service = fx.service("mysql", "gamma").await;
        service.grant_access("beta");
        fx.store.update_service(&service).await.unwrap();

        let instance = fx.instances.create("my-mysql", "mysql", &user).await.unwrap();
        assert_eq!(instance.service_name, "mysql");
        assert_eq!(instance.teams.iter().collect::<Vec<_>>(), vec!["beta"]);

        let stored = fx.store.find_instance("my-mysql").await.unwrap().unwrap();
        assert_eq!(stored, instance);
    }

    #[tokio::test]
    async fn test_create_failures() {
        let fx = Fixture::new().await;
        let user = fx.user_in(&["tsuruteam"]).await;
        let stranger = fx.user_in(&["strangers"]).await;

        let err = fx.instances.create("my-mysql", "mysql", &user).await.unwrap_err();
        assert_eq!(err.to_string(), "Service not found");

        fx.service("mysql", "tsuruteam").await;
        let err = fx.instances.create("my-mysql", "mysql", &stranger).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(err.to_string(), "This user does not have access to this service");

        fx.instances.create("my-mysql", "mysql", &user).await.unwrap();
        let err = fx.instances.create("my-mysql", "mysql", &user).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "Instance with name my-mysql already exists.");

        let err = fx.instances.create(" ", "mysql", &user).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_on_deleted_service_is_not_found() {
        let fx = Fixture::new().await;
        let user = fx.user_in(&["tsuruteam"]).await;
        fx.service("mysql", "tsuruteam").await;
        fx.catalog.delete("mysql", &user).await.unwrap();

        let err = fx.instances.create("my-mysql", "mysql", &user).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_requires_instance_access() {
        let fx = Fixture::new().await;
        let user = fx.user_in(&["tsuruteam"]).await;
        let other = fx.user_in(&["others"]).await;
        let mut service = fx.service("mysql", "tsuruteam").await;
        service.grant_access("others");
        fx.store.update_service(&service).await.unwrap();
        fx.instances.create("my-mysql", "mysql", &user).await.unwrap();

        let err = fx.instances.delete("my-mysql", &other).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(err.to_string(), "This user does not have access to this instance");
        assert!(fx.store.find_instance("my-mysql").await.unwrap().is_some());

        let err = fx.instances.get("my-mysql", &other).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        fx.instances.delete("my-mysql", &user).await.unwrap();
        assert!(fx.store.find_instance("my-mysql").await.unwrap().is_none());

        let err = fx.instances.delete("my-mysql", &user).await.unwrap_err();
        assert_eq!(err.to_string(), "Instance not found");
    }
}
