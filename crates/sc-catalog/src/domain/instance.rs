//! Service Instance Entity

use std::collections::BTreeSet;

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, provisioned instance of a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    /// Unique instance name
    #[serde(rename = "_id")]
    pub name: String,

    /// Parent service, by name
    pub service_name: String,

    /// Teams that can see and remove the instance
    #[serde(default)]
    pub teams: BTreeSet<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ServiceInstance {
    pub fn new(
        name: impl Into<String>,
        service_name: impl Into<String>,
        team: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            service_name: service_name.into(),
            teams: BTreeSet::from([team.into()]),
            created_at: Utc::now(),
        }
    }

    pub fn has_access(&self, team: &str) -> bool {
        self.teams.contains(team)
    }
}
