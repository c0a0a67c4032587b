//! `tenantgate-auth` — role resolution for tenant/application-scoped requests.
//!
//! This crate is intentionally decoupled from HTTP, token verification and
//! directory storage: it classifies an already-authenticated principal.

pub mod config;
pub mod directory;
pub mod path;
pub mod principal;
pub mod resolver;
pub mod roles;

pub use config::{ConfigError, PathMatcherConfig};
pub use directory::{Application, DirectoryError, DirectoryView, MembershipDirectory, Tenant};
pub use path::{PathMatcher, PathScope};
pub use principal::{Principal, PrincipalId, PrincipalKind};
pub use resolver::{ResolutionTier, RoleResolution, RoleResolver};
pub use roles::{Role, RoleKind, RoleSet, render_roles};
