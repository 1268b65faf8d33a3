//! Access checks
//!
//! Pure decisions over an authenticated identity and the records it wants to
//! touch. Nothing here talks to the store.

use crate::domain::{Identity, Service, ServiceInstance, Team};
use crate::error::{messages, CatalogError, Result};

/// Collapse absent and soft-deleted services into the same NotFound.
pub fn active_service(service: Option<Service>) -> Result<Service> {
    match service {
        Some(service) if service.is_active() => Ok(service),
        _ => Err(CatalogError::service_not_found()),
    }
}

/// The team a new service is registered under.
pub fn require_team(identity: &Identity) -> Result<&Team> {
    identity
        .primary_team()
        .ok_or_else(|| CatalogError::permission_denied(messages::NO_TEAM))
}

pub fn require_owner(identity: &Identity, service: &Service) -> Result<()> {
    if identity.teams().iter().any(|t| service.is_owner(&t.name)) {
        Ok(())
    } else {
        Err(CatalogError::permission_denied(messages::NO_SERVICE_ACCESS))
    }
}

pub fn require_service_access(identity: &Identity, service: &Service) -> Result<()> {
    team_with_access(identity, service).map(|_| ())
}

/// First of the identity's teams (by name) that can use the service.
pub fn team_with_access<'a>(identity: &'a Identity, service: &Service) -> Result<&'a Team> {
    identity
        .teams()
        .iter()
        .find(|t| service.has_access(&t.name))
        .ok_or_else(|| CatalogError::permission_denied(messages::NO_SERVICE_ACCESS))
}

pub fn require_instance_access(identity: &Identity, instance: &ServiceInstance) -> Result<()> {
    if identity.teams().iter().any(|t| instance.has_access(&t.name)) {
        Ok(())
    } else {
        Err(CatalogError::permission_denied(messages::NO_INSTANCE_ACCESS))
    }
}

pub fn require_membership(identity: &Identity, team: &Team) -> Result<()> {
    if identity.is_member_of(&team.name) {
        Ok(())
    } else {
        Err(CatalogError::permission_denied(messages::NOT_TEAM_MEMBER))
    }
}

pub fn require_no_instances(live_instances: u64) -> Result<()> {
    if live_instances == 0 {
        Ok(())
    } else {
        Err(CatalogError::permission_denied(messages::SERVICE_HAS_INSTANCES))
    }
}

/// A service must always keep at least one team with access.
pub fn require_revocable(service: &Service, team: &str) -> Result<()> {
    if service.teams().len() < 2 {
        return Err(CatalogError::permission_denied(messages::ORPHANED_SERVICE));
    }
    if !service.has_access(team) {
        return Err(CatalogError::not_found(messages::TEAM_HAS_NO_ACCESS));
    }
    Ok(())
}
