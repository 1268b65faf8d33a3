//! MongoDB store
//!
//! One collection per entity. Record names are the `_id`, so the primary
//! key index provides the uniqueness guarantee for inserts.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Collection, Database};

use super::{CatalogStore, StoreError, StoreResult};
use crate::domain::{Service, ServiceInstance, Team, User};

const DUPLICATE_KEY_CODE: i32 = 11000;

pub struct MongoStore {
    services: Collection<Service>,
    instances: Collection<ServiceInstance>,
    teams: Collection<Team>,
    users: Collection<User>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            services: db.collection("services"),
            instances: db.collection("service_instances"),
            teams: db.collection("teams"),
            users: db.collection("users"),
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE
    )
}

fn map_insert_error(err: mongodb::error::Error, collection: &str, key: &str) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::duplicate(collection, key)
    } else {
        StoreError::Mongo(err)
    }
}

#[async_trait]
impl CatalogStore for MongoStore {
    async fn find_service(&self, name: &str) -> StoreResult<Option<Service>> {
        Ok(self.services.find_one(doc! { "_id": name }).await?)
    }

    async fn insert_service(&self, service: &Service) -> StoreResult<()> {
        self.services
            .insert_one(service)
            .await
            .map_err(|e| map_insert_error(e, "services", &service.name))?;
        Ok(())
    }

    async fn update_service(&self, service: &Service) -> StoreResult<()> {
        self.services
            .replace_one(doc! { "_id": &service.name }, service)
            .await?;
        Ok(())
    }

    async fn find_services_owned_by(&self, teams: &[String]) -> StoreResult<Vec<Service>> {
        let cursor = self
            .services
            .find(doc! {
                "ownerTeams": { "$in": teams },
                "status": "active",
            })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_instance(&self, name: &str) -> StoreResult<Option<ServiceInstance>> {
        Ok(self.instances.find_one(doc! { "_id": name }).await?)
    }

    async fn insert_instance(&self, instance: &ServiceInstance) -> StoreResult<()> {
        self.instances
            .insert_one(instance)
            .await
            .map_err(|e| map_insert_error(e, "service_instances", &instance.name))?;
        Ok(())
    }

    async fn remove_instance(&self, name: &str) -> StoreResult<bool> {
        let result = self.instances.delete_one(doc! { "_id": name }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count_instances(&self, service_name: &str) -> StoreResult<u64> {
        Ok(self
            .instances
            .count_documents(doc! { "serviceName": service_name })
            .await?)
    }

    async fn find_instances_of(&self, service_name: &str) -> StoreResult<Vec<ServiceInstance>> {
        let cursor = self
            .instances
            .find(doc! { "serviceName": service_name })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_team(&self, name: &str) -> StoreResult<Option<Team>> {
        Ok(self.teams.find_one(doc! { "_id": name }).await?)
    }

    async fn insert_team(&self, team: &Team) -> StoreResult<()> {
        self.teams
            .insert_one(team)
            .await
            .map_err(|e| map_insert_error(e, "teams", &team.name))?;
        Ok(())
    }

    async fn update_team(&self, team: &Team) -> StoreResult<()> {
        self.teams.replace_one(doc! { "_id": &team.name }, team).await?;
        Ok(())
    }

    async fn find_teams_of_user(&self, email: &str) -> StoreResult<Vec<Team>> {
        let cursor = self
            .teams
            .find(doc! { "users": email })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_user(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users.find_one(doc! { "_id": email }).await?)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.users
            .insert_one(user)
            .await
            .map_err(|e| map_insert_error(e, "users", &user.email))?;
        Ok(())
    }
}
