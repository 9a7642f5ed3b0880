//! # moira-api
//!
//! Blocking client for the Moira REST API: fetchers for the dump path and
//! reconcilers for the apply path.
//!
//! Build a [`MoiraClient`] once per run with [`MoiraClient::from_config`] and
//! share it by reference. Tests drive the same client through
//! `fake::FakeTransport` (feature `fake`).

pub mod client;
pub mod compare;
pub mod config;
pub mod error;
pub mod fetch;
pub mod reconcile;
pub mod transport;
pub mod wire;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use client::MoiraClient;
pub use compare::{subscription_changed_fields, trigger_changed_fields, trigger_needs_update};
pub use config::{ApplyOptions, ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use fetch::{contact_table, derive_users};
pub use reconcile::{
    Action, DocumentOutcome, SubscriptionOutcome, TriggerOutcome, UserSettingsOutcome,
};
pub use transport::{ApiRequest, ApiResponse, Method, Transport, UreqTransport};
