//! Moira dumper core library: local file model, schedule normalization, errors.
//!
//! Public API surface:
//! - [`types`]: triggers, contacts, subscriptions, user settings
//! - [`schedule`]: the [`Schedule`] type and its normalizer
//! - [`document`]: typed local YAML documents ([`Document`])
//! - [`error`]: [`DocumentError`]

pub mod document;
pub mod error;
pub mod schedule;
pub mod types;

pub use document::{Document, DocumentKind};
pub use error::DocumentError;
pub use schedule::{normalize_for_local_storage, normalize_for_remote, Day, Schedule};
pub use types::{
    Contact, ContactEntry, ContactId, Plotting, Subscription, TagCollection, Trigger, TriggerId,
    TriggerType, UserSettings,
};
