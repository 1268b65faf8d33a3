//! Repository Layer
//!
//! The catalog's persistence seam. Backends only provide atomic
//! single-document operations; there are no multi-document transactions, so
//! every invariant check in the service layer is check-then-act.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Service, ServiceInstance, Team, User};

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Duplicate key in {collection}: {key}")]
    Duplicate { collection: String, key: String },

    #[error("Database error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

impl StoreError {
    pub fn duplicate(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Duplicate {
            collection: collection.into(),
            key: key.into(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Document store holding services, instances, teams and users.
///
/// Lookups return records regardless of status; treating deleted services
/// as absent is the service layer's job.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_service(&self, name: &str) -> StoreResult<Option<Service>>;

    /// Fails with `StoreError::Duplicate` if the name is taken.
    async fn insert_service(&self, service: &Service) -> StoreResult<()>;

    /// Replace the stored document with the same name.
    async fn update_service(&self, service: &Service) -> StoreResult<()>;

    /// Active services owned by any of `teams`, ordered by name.
    async fn find_services_owned_by(&self, teams: &[String]) -> StoreResult<Vec<Service>>;

    async fn find_instance(&self, name: &str) -> StoreResult<Option<ServiceInstance>>;

    async fn insert_instance(&self, instance: &ServiceInstance) -> StoreResult<()>;

    /// Returns false if nothing was removed.
    async fn remove_instance(&self, name: &str) -> StoreResult<bool>;

    async fn count_instances(&self, service_name: &str) -> StoreResult<u64>;

    /// Instances of a service, ordered by name.
    async fn find_instances_of(&self, service_name: &str) -> StoreResult<Vec<ServiceInstance>>;

    async fn find_team(&self, name: &str) -> StoreResult<Option<Team>>;

    async fn insert_team(&self, team: &Team) -> StoreResult<()>;

    async fn update_team(&self, team: &Team) -> StoreResult<()>;

    /// Teams listing `email` as a member, ordered by name.
    async fn find_teams_of_user(&self, email: &str) -> StoreResult<Vec<Team>>;

    async fn find_user(&self, email: &str) -> StoreResult<Option<User>>;

    async fn insert_user(&self, user: &User) -> StoreResult<()>;
}
