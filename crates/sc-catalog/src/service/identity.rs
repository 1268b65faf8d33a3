//! Identity Service
//!
//! Users, credentials and team membership.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::{debug, info, instrument};

use crate::domain::{Identity, Team, User};
use crate::error::{messages, CatalogError, Result};
use crate::repository::CatalogStore;
use crate::service::checks;

#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn CatalogStore>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, password))]
    pub async fn register_user(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(CatalogError::validation("Email and password are required"));
        }

        if self.store.find_user(&email).await?.is_some() {
            return Err(CatalogError::conflict(format!("User with email {} already exists.", email)));
        }

        let user = User::new(&email, hash_password(password)?);
        self.store.insert_user(&user).await.map_err(|e| {
            if e.is_duplicate() {
                CatalogError::conflict(format!("User with email {} already exists.", email))
            } else {
                e.into()
            }
        })?;

        info!(user = %email, "User registered");
        Ok(user)
    }

    /// `Ok(None)` for unknown users and wrong passwords alike.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<Identity>> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.store.find_user(&email).await? else {
            debug!(user = %email, "Unknown user");
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash) {
            debug!(user = %email, "Password mismatch");
            return Ok(None);
        }

        let teams = self.store.find_teams_of_user(&user.email).await?;
        Ok(Some(Identity::new(user, teams)))
    }

    #[instrument(skip(self, identity), fields(user = %identity.email()))]
    pub async fn create_team(&self, name: &str, identity: &Identity) -> Result<Team> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::validation("You must provide the team name"));
        }

        let exists = || CatalogError::conflict(format!("Team {} already exists.", name));
        if self.store.find_team(name).await?.is_some() {
            return Err(exists());
        }

        let team = Team::new(name).with_user(identity.email());
        self.store.insert_team(&team).await.map_err(|e| {
            if e.is_duplicate() { exists() } else { e.into() }
        })?;

        info!(team = %name, "Team created");
        Ok(team)
    }

    #[instrument(skip(self, identity), fields(user = %identity.email()))]
    pub async fn add_member(&self, team: &str, email: &str, identity: &Identity) -> Result<Team> {
        let mut team = self
            .store
            .find_team(team)
            .await?
            .ok_or_else(CatalogError::team_not_found)?;
        checks::require_membership(identity, &team)?;

        let email = email.trim().to_lowercase();
        if self.store.find_user(&email).await?.is_none() {
            return Err(CatalogError::not_found(messages::USER_NOT_FOUND));
        }

        if !team.add_user(&email) {
            return Err(CatalogError::conflict(format!(
                "User {} is already a member of team {}.",
                email, team.name
            )));
        }
        self.store.update_team(&team).await?;

        info!(team = %team.name, member = %email, "User added to team");
        Ok(team)
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CatalogError::internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}
