//! Startup Seeding
//!
//! Creates the users and teams listed in the `[seed]` configuration section.
//! Records that already exist are left alone, so seeding on every start is
//! safe.

use std::sync::Arc;

use sc_config::SeedConfig;
use tracing::{info, warn};

use crate::domain::{Team, User};
use crate::error::Result;
use crate::repository::CatalogStore;
use crate::service::identity::hash_password;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub teams_created: usize,
}

pub struct CatalogSeeder {
    store: Arc<dyn CatalogStore>,
}

impl CatalogSeeder {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn seed(&self, config: &SeedConfig) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        for seed in &config.users {
            let email = seed.email.trim().to_lowercase();
            if self.store.find_user(&email).await?.is_some() {
                warn!(user = %email, "Seed user already exists, skipping");
                continue;
            }
            self.store
                .insert_user(&User::new(&email, hash_password(&seed.password)?))
                .await?;
            report.users_created += 1;
        }

        for seed in &config.teams {
            if self.store.find_team(&seed.name).await?.is_some() {
                warn!(team = %seed.name, "Seed team already exists, skipping");
                continue;
            }

            let mut team = Team::new(&seed.name);
            for member in &seed.members {
                let email = member.trim().to_lowercase();
                if self.store.find_user(&email).await?.is_none() {
                    warn!(team = %seed.name, user = %email, "Unknown seed team member, skipping");
                    continue;
                }
                team.add_user(email);
            }
            self.store.insert_team(&team).await?;
            report.teams_created += 1;
        }

        info!(
            users = report.users_created,
            teams = report.teams_created,
            "Seeding complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;
    use crate::service::IdentityService;
    use sc_config::{SeedTeam, SeedUser};

    fn config() -> SeedConfig {
        SeedConfig {
            users: vec![SeedUser {
                email: "Admin@Example.com".to_string(),
                password: "change-me".to_string(),
            }],
            teams: vec![SeedTeam {
                name: "platform".to_string(),
                members: vec!["admin@example.com".to_string(), "ghost@example.com".to_string()],
            }],
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new_shared();
        let seeder = CatalogSeeder::new(store.clone());

        let first = seeder.seed(&config()).await.unwrap();
        assert_eq!(first, SeedReport { users_created: 1, teams_created: 1 });

        let second = seeder.seed(&config()).await.unwrap();
        assert_eq!(second, SeedReport::default());

        let team = store.find_team("platform").await.unwrap().unwrap();
        assert_eq!(team.users, vec!["admin@example.com"]);
    }

    #[tokio::test]
    async fn test_seeded_user_can_authenticate() {
        let store = MemoryStore::new_shared();
        CatalogSeeder::new(store.clone()).seed(&config()).await.unwrap();

        let identity = IdentityService::new(store)
            .authenticate("admin@example.com", "change-me")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(identity.team_names(), vec!["platform"]);
    }
}
