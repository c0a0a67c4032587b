//! Membership directory adapters.

mod in_memory;
mod seed;
mod snapshot;

pub use in_memory::{DirectoryAdminError, InMemoryMembershipDirectory};
pub use seed::{ApplicationSeed, DirectorySeed, SeedError, TenantSeed};
pub use snapshot::DirectorySnapshot;
