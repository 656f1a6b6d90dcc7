//! Service layer: authentication business logic.

mod auth_service;

pub use auth_service::{AuthResponse, AuthService};
