//! # Authentication Primitives
//!
//! This module provides the credential primitives shared by the auth
//! service and, indirectly, by every service that checks identity.
//!
//! ## Module Structure
//!
//! ```text
//! auth/
//! ├── jwt.rs      - Signed bearer token generation and validation
//! └── password.rs - Secure password hashing with Argon2id
//! ```
//!
//! ## Overview
//!
//! | Component | Purpose | See Also |
//! |-----------|---------|----------|
//! | [`JwtService`] | Generate and validate signed tokens | [RFC 7519](https://tools.ietf.org/html/rfc7519) |
//! | [`PasswordHasher`] | Argon2id password hashing | [OWASP Password Storage](https://cheatsheetseries.owasp.org/cheatsheets/Password_Storage_Cheat_Sheet.html) |
//!
//! ## Token Flow
//!
//! ```text
//! ┌────────┐        ┌────────────┐        ┌────────────┐
//! │ Client │        │ Auth API   │        │ Protected  │
//! └───┬────┘        └─────┬──────┘        │    API     │
//!     │                   │               └─────┬──────┘
//!     │ POST /login       │                     │
//!     │ (name, password)  │                     │
//!     │──────────────────>│                     │
//!     │                   │                     │
//!     │ {access_token,    │                     │
//!     │  refresh_token}   │                     │
//!     │<──────────────────│                     │
//!     │                   │                     │
//!     │ GET /resource     │                     │
//!     │ Authorization:    │                     │
//!     │ Bearer <access>   │                     │
//!     │────────────────────────────────────────>│
//!     │                   │                     │
//!     │ 200 OK {data}     │                     │
//!     │<────────────────────────────────────────│
//!     │                   │                     │
//!     │ (after 15 min)    │                     │
//!     │ POST /refresh     │                     │
//!     │ (refresh_token)   │                     │
//!     │──────────────────>│                     │
//!     │                   │                     │
//!     │ {new access_token,│                     │
//!     │  new refresh}     │                     │
//!     │<──────────────────│                     │
//! ```

pub mod jwt;
pub mod password;

// Re-export main types for convenient access
pub use jwt::{Claims, JwtService, TokenPair, TokenType};
pub use password::PasswordHasher;
