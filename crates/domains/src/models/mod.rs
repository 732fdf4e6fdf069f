//! # Domain Models
//!
//! These structs represent the core entities of Gram-Bazaar.
//! Identifiers are UUIDs; all timestamps are UTC.

mod ad;
mod conversation;
mod notification;
mod site;
mod support;
mod user;

pub use ad::*;
pub use conversation::*;
pub use notification::*;
pub use site::*;
pub use support::*;
pub use user::*;
