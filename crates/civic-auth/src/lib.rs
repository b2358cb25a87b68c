//! # civic-auth
//!
//! Credential handling for the channel handshake:
//!
//! - Bearer-prefix stripping and structural claim decoding of session tokens
//! - Identity provider clients (hosted REST provider, in-memory provider)

pub mod identity;
pub mod token;

pub use identity::{ClerkIdentityProvider, MemoryIdentityProvider};
pub use token::{TokenClaims, TokenDecoder, TokenError};
