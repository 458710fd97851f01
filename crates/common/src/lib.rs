//! Shared types for the OIDC relying-party gateway

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
