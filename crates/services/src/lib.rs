//! gram-bazaar/crates/services/src/lib.rs
//!
//! Application services sitting between the port traits in `domains` and
//! the adapters. Each service owns one slice of behavior; the binary wires
//! them all to the same store and [`live::ChangeHub`].

pub mod ads;
pub mod directory;
pub mod enhancer;
pub mod live;
pub mod messaging;
pub mod moderation;
pub mod notifications;
pub mod site;
pub mod support;

pub use ads::{AdDraft, AdPatch, AdsService};
pub use directory::DirectoryService;
pub use enhancer::PassthroughEnhancer;
pub use live::{Change, ChangeHub};
pub use messaging::MessagingService;
pub use moderation::ModerationService;
pub use notifications::NotificationService;
pub use site::SiteService;
pub use support::{IssueReport, SupportService};
