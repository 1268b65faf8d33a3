//! Service Layer
//!
//! Catalog operations on top of the store. Permission and invariant
//! decisions live in [`checks`]; the services here load records, apply the
//! checks and write the result back.

pub mod catalog;
pub mod checks;
pub mod identity;
pub mod instances;

pub use catalog::ServiceCatalog;
pub use identity::IdentityService;
pub use instances::InstanceRegistry;

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{InstanceRegistry, ServiceCatalog};
    use crate::domain::{Identity, Service, Team, User};
    use crate::repository::{CatalogStore, MemoryStore};

    /// A memory-backed catalog with helpers to seed users, teams and
    /// services without going through the permission checks.
    pub struct Fixture {
        pub store: Arc<MemoryStore>,
        pub catalog: ServiceCatalog,
        pub instances: InstanceRegistry,
        next_user: AtomicUsize,
    }

    impl Fixture {
        pub async fn new() -> Self {
            let store = MemoryStore::new_shared();
            Self {
                catalog: ServiceCatalog::new(store.clone()),
                instances: InstanceRegistry::new(store.clone()),
                store,
                next_user: AtomicUsize::new(0),
            }
        }

        pub async fn team(&self, name: &str) -> Team {
            match self.store.find_team(name).await.unwrap() {
                Some(team) => team,
                None => {
                    let team = Team::new(name);
                    self.store.insert_team(&team).await.unwrap();
                    team
                }
            }
        }

        /// A fresh user belonging to `teams`, creating missing teams.
        pub async fn user_in(&self, teams: &[&str]) -> Identity {
            let n = self.next_user.fetch_add(1, Ordering::SeqCst);
            let user = User::new(format!("user{}@catalog.test", n), "hash");
            self.store.insert_user(&user).await.unwrap();

            for name in teams {
                let mut team = self.team(name).await;
                team.add_user(&user.email);
                self.store.update_team(&team).await.unwrap();
            }

            let teams = self.store.find_teams_of_user(&user.email).await.unwrap();
            Identity::new(user, teams)
        }

        pub async fn service(&self, name: &str, owner: &str) -> Service {
            let service = Service::new(name, BTreeMap::new(), owner)
                .with_endpoint("production", format!("{}.com", name));
            self.store.insert_service(&service).await.unwrap();
            service
        }
    }
}
