//! Service Entity
//!
//! A registered backing service (e.g. a database API) with per-environment
//! endpoints, owned by one or more teams and visible to a larger set.

use std::collections::{BTreeMap, BTreeSet};

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Environment name that every service must expose.
pub const PRODUCTION_ENVIRONMENT: &str = "production";

/// Service lifecycle status. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Active,
    Deleted,
}

/// Registered service.
///
/// Owner teams are always a subset of the access teams; every mutator below
/// keeps that true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Unique service name
    #[serde(rename = "_id")]
    pub name: String,

    /// Environment name -> endpoint URL
    #[serde(default)]
    pub endpoint: BTreeMap<String, String>,

    /// Free-text documentation
    #[serde(default)]
    pub doc: String,

    #[serde(default)]
    pub status: ServiceStatus,

    /// Teams allowed to administer the service
    #[serde(default)]
    owner_teams: BTreeSet<String>,

    /// Teams allowed to provision instances (superset of owners)
    #[serde(default)]
    teams: BTreeSet<String>,

    /// Audit fields
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn new(
        name: impl Into<String>,
        endpoint: BTreeMap<String, String>,
        owner_team: impl Into<String>,
    ) -> Self {
        let owner = owner_team.into();
        let now = Utc::now();

        Self {
            name: name.into(),
            endpoint,
            doc: String::new(),
            status: ServiceStatus::Active,
            owner_teams: BTreeSet::from([owner.clone()]),
            teams: BTreeSet::from([owner]),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_endpoint(mut self, environment: impl Into<String>, url: impl Into<String>) -> Self {
        self.endpoint.insert(environment.into(), url.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ServiceStatus::Active
    }

    pub fn owner_teams(&self) -> &BTreeSet<String> {
        &self.owner_teams
    }

    pub fn teams(&self) -> &BTreeSet<String> {
        &self.teams
    }

    pub fn is_owner(&self, team: &str) -> bool {
        self.owner_teams.contains(team)
    }

    pub fn has_access(&self, team: &str) -> bool {
        self.teams.contains(team)
    }

    pub fn production_endpoint(&self) -> Option<&str> {
        self.endpoint.get(PRODUCTION_ENVIRONMENT).map(String::as_str)
    }

    /// Make `team` an owner; owners always have access too.
    pub fn add_owner(&mut self, team: impl Into<String>) {
        let team = team.into();
        self.teams.insert(team.clone());
        self.owner_teams.insert(team);
        self.updated_at = Utc::now();
    }

    /// Returns false if the team already had access.
    pub fn grant_access(&mut self, team: impl Into<String>) -> bool {
        let inserted = self.teams.insert(team.into());
        if inserted {
            self.updated_at = Utc::now();
        }
        inserted
    }

    /// Removes the team from the access set, and from the owners with it.
    /// Returns false if the team had no access.
    pub fn revoke_access(&mut self, team: &str) -> bool {
        let removed = self.teams.remove(team);
        if removed {
            self.owner_teams.remove(team);
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Replace the manifest-derived definition. Team sets are untouched.
    pub fn redefine(&mut self, endpoint: BTreeMap<String, String>, doc: Option<String>) {
        self.endpoint = endpoint;
        if let Some(doc) = doc {
            self.doc = doc;
        }
        self.updated_at = Utc::now();
    }

    pub fn set_doc(&mut self, doc: impl Into<String>) {
        self.doc = doc.into();
        self.updated_at = Utc::now();
    }

    /// Soft delete.
    pub fn mark_deleted(&mut self) {
        self.status = ServiceStatus::Deleted;
        self.updated_at = Utc::now();
    }
}

/// One row of a team's catalog listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServiceModel {
    pub service: String,
    pub instances: Vec<String>,
}
