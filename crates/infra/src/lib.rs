//! Infrastructure layer: membership directory adapters.

pub mod directory;

pub use directory::{DirectorySeed, DirectorySnapshot, InMemoryMembershipDirectory};
