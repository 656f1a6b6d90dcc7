//! Clients for the other services.

mod auth;

pub use auth::{AccessIdentity, AuthClient, TokenValidator};
