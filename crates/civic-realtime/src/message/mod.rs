//! Socket event protocol.

pub mod serializer;
pub mod types;
pub mod validator;
