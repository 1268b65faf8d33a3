//! Domain Models
//!
//! Catalog entities as stored in the document store. Names are the primary
//! keys and serialize as `_id`.

pub mod service;
pub mod instance;
pub mod team;

pub use service::*;
pub use instance::*;
pub use team::*;
