//! Service Catalog
//!
//! Core catalog providing:
//! - Service registration with environment endpoints and documentation
//! - Service instance provisioning
//! - Team-scoped ownership and access grants
//! - Orphan prevention and dependency-based deletion guards

pub mod domain;
pub mod repository;
pub mod service;
pub mod api;
pub mod error;
pub mod manifest;
pub mod seed;

pub use domain::*;
pub use error::{CatalogError, ErrorKind};
pub use manifest::Manifest;
