//! `tenantgate-core` — control-plane naming primitives.
//!
//! This crate contains **pure** identifiers and errors (no directory or transport concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ApplicationName, DomainName, TenantName};
