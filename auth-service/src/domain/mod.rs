//! Domain layer: entities persisted by the auth service.

mod entities;

pub use entities::{NewRefreshToken, NewUser, RefreshTokenRecord, User, UserProfile};
