//! Collaborator traits defined in `civic-core` and implemented by other crates.

pub mod directory;
pub mod identity;

pub use directory::{LocalUser, UserDirectory};
pub use identity::{IdentityProfile, IdentityProvider};
