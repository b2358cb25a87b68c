//! Connection lifecycle: handles, registry, handshake and event routing.

pub mod authenticator;
pub mod handle;
pub mod manager;
pub mod registry;
