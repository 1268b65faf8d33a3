//! Identity Entities
//!
//! Users and the teams they belong to. Every authorization decision in the
//! catalog is made against the authenticated user's teams.

use serde::{Deserialize, Serialize};

/// Catalog user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub email: String,

    /// Argon2 PHC string
    pub password_hash: String,
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// Team of users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(rename = "_id")]
    pub name: String,

    /// Member emails, in join order, without duplicates
    #[serde(default)]
    pub users: Vec<String>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            users: Vec::new(),
        }
    }

    pub fn with_user(mut self, email: impl Into<String>) -> Self {
        self.add_user(email);
        self
    }

    /// Returns false if the user was already a member.
    pub fn add_user(&mut self, email: impl Into<String>) -> bool {
        let email = email.into();
        if self.has_user(&email) {
            return false;
        }
        self.users.push(email);
        true
    }

    pub fn has_user(&self, email: &str) -> bool {
        self.users.iter().any(|u| u == email)
    }
}

/// An authenticated user together with their team memberships
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    /// Ordered by team name
    teams: Vec<Team>,
}

impl Identity {
    pub fn new(user: User, mut teams: Vec<Team>) -> Self {
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        teams.dedup_by(|a, b| a.name == b.name);
        Self { user, teams }
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team_names(&self) -> Vec<String> {
        self.teams.iter().map(|t| t.name.clone()).collect()
    }

    pub fn is_member_of(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t.name == team)
    }

    /// Deterministic default team: the first by name.
    pub fn primary_team(&self) -> Option<&Team> {
        self.teams.first()
    }
}
