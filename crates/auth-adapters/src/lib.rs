//! gram-bazaar/crates/auth-adapters/src/lib.rs
//!
//! Identity plugins. Sign-in itself lives with the external identity
//! provider; this crate only turns a bearer credential into a [`Caller`],
//! which means checking the signature and then the account's current
//! role/disabled state in the store (so a disable takes effect on the
//! very next request, not at token expiry).

#[cfg(feature = "auth-jwt")]
mod jwt;

#[cfg(feature = "auth-jwt")]
pub use jwt::{issue_token, JwtIdentity};
