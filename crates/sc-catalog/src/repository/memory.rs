//! In-memory store for tests and single-process deployments.
//!
//! Each collection is a `DashMap` keyed by the record name, so single-record
//! operations are atomic the same way document-store writes are.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{CatalogStore, StoreError, StoreResult};
use crate::domain::{Service, ServiceInstance, Team, User};

#[derive(Debug, Default)]
pub struct MemoryStore {
    services: DashMap<String, Service>,
    instances: DashMap<String, ServiceInstance>,
    teams: DashMap<String, Team>,
    users: DashMap<String, User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn insert_unique<T: Clone>(
    map: &DashMap<String, T>,
    collection: &str,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    match map.entry(key.to_string()) {
        Entry::Occupied(_) => Err(StoreError::duplicate(collection, key)),
        Entry::Vacant(slot) => {
            slot.insert(value.clone());
            Ok(())
        }
    }
}

fn sorted_by_name<T>(mut items: Vec<T>, name: impl Fn(&T) -> &str) -> Vec<T> {
    items.sort_by(|a, b| name(a).cmp(name(b)));
    items
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_service(&self, name: &str) -> StoreResult<Option<Service>> {
        Ok(self.services.get(name).map(|s| s.value().clone()))
    }

    async fn insert_service(&self, service: &Service) -> StoreResult<()> {
        insert_unique(&self.services, "services", &service.name, service)
    }

    async fn update_service(&self, service: &Service) -> StoreResult<()> {
        self.services.insert(service.name.clone(), service.clone());
        Ok(())
    }

    async fn find_services_owned_by(&self, teams: &[String]) -> StoreResult<Vec<Service>> {
        let owned = self
            .services
            .iter()
            .filter(|s| s.is_active() && teams.iter().any(|t| s.is_owner(t)))
            .map(|s| s.value().clone())
            .collect();
        Ok(sorted_by_name(owned, |s: &Service| s.name.as_str()))
    }

    async fn find_instance(&self, name: &str) -> StoreResult<Option<ServiceInstance>> {
        Ok(self.instances.get(name).map(|i| i.value().clone()))
    }

    async fn insert_instance(&self, instance: &ServiceInstance) -> StoreResult<()> {
        insert_unique(&self.instances, "service_instances", &instance.name, instance)
    }

    async fn remove_instance(&self, name: &str) -> StoreResult<bool> {
        Ok(self.instances.remove(name).is_some())
    }

    async fn count_instances(&self, service_name: &str) -> StoreResult<u64> {
        let count = self
            .instances
            .iter()
            .filter(|i| i.service_name == service_name)
            .count();
        Ok(count as u64)
    }

    async fn find_instances_of(&self, service_name: &str) -> StoreResult<Vec<ServiceInstance>> {
        let instances = self
            .instances
            .iter()
            .filter(|i| i.service_name == service_name)
            .map(|i| i.value().clone())
            .collect();
        Ok(sorted_by_name(instances, |i: &ServiceInstance| i.name.as_str()))
    }

    async fn find_team(&self, name: &str) -> StoreResult<Option<Team>> {
        Ok(self.teams.get(name).map(|t| t.value().clone()))
    }

    async fn insert_team(&self, team: &Team) -> StoreResult<()> {
        insert_unique(&self.teams, "teams", &team.name, team)
    }

    async fn update_team(&self, team: &Team) -> StoreResult<()> {
        self.teams.insert(team.name.clone(), team.clone());
        Ok(())
    }

    async fn find_teams_of_user(&self, email: &str) -> StoreResult<Vec<Team>> {
        let teams = self
            .teams
            .iter()
            .filter(|t| t.has_user(email))
            .map(|t| t.value().clone())
            .collect();
        Ok(sorted_by_name(teams, |t: &Team| t.name.as_str()))
    }

    async fn find_user(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users.get(email).map(|u| u.value().clone()))
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        insert_unique(&self.users, "users", &user.email, user)
    }
}
