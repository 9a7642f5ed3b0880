//! Domain types in their local file shape.
//!
//! These are the objects a human edits. Server-assigned identities are kept
//! in memory (so updates can address the remote object) but are never read
//! from or written to a local file. The JSON shapes Moira speaks live in
//! `moira-api`, which converts to and from these types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schedule::Schedule;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Server-assigned trigger identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub String);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TriggerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TriggerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Server-assigned contact identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(pub String);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ContactId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContactId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Trigger type
// ---------------------------------------------------------------------------

/// Trigger evaluation mode.
///
/// Types this tool does not know how to compare are preserved verbatim in
/// [`TriggerType::Other`] so a dump/apply cycle never rewrites them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerType {
    Rising,
    Falling,
    Expression,
    Other(String),
}

impl TriggerType {
    pub fn as_str(&self) -> &str {
        match self {
            TriggerType::Rising => "rising",
            TriggerType::Falling => "falling",
            TriggerType::Expression => "expression",
            TriggerType::Other(s) => s,
        }
    }

    /// `true` for the threshold-based types (`rising`, `falling`).
    pub fn uses_thresholds(&self) -> bool {
        matches!(self, TriggerType::Rising | TriggerType::Falling)
    }
}

impl Default for TriggerType {
    fn default() -> Self {
        TriggerType::Other(String::new())
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TriggerType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "rising" => TriggerType::Rising,
            "falling" => TriggerType::Falling,
            "expression" => TriggerType::Expression,
            _ => TriggerType::Other(s),
        }
    }
}

impl From<&str> for TriggerType {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<TriggerType> for String {
    fn from(t: TriggerType) -> Self {
        match t {
            TriggerType::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A remote alert rule evaluated against metric data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trigger {
    /// Present only for objects read from the remote system.
    #[serde(skip)]
    pub id: Option<TriggerId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    #[serde(default)]
    pub trigger_type: TriggerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_value: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expression: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Schedule::is_empty")]
    pub sched: Schedule,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ttl_state: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ttl: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_remote: bool,
}

/// All tags known to the server. Read-only from this tool's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagCollection {
    #[serde(default)]
    pub list: Vec<String>,
}

/// A notification destination as the remote system knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// `None` until the server has created the contact.
    pub id: Option<ContactId>,
    /// Delivery channel, e.g. `mail` or `slack`.
    pub kind: String,
    /// Login of the owning user.
    pub user: String,
    pub value: String,
}

impl Contact {
    /// Natural-key match: same owner, channel and destination.
    pub fn matches(&self, login: &str, entry: &ContactEntry) -> bool {
        self.user == login && self.kind == entry.kind && self.value == entry.value
    }

    pub fn entry(&self) -> ContactEntry {
        ContactEntry {
            kind: self.kind.clone(),
            value: self.value.clone(),
        }
    }
}

/// A contact embedded in a local subscription. Owner and id are implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactEntry {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// Graph attachment preference of a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Plotting {
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub theme: String,
}

impl Plotting {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A user's rule for which tagged events notify which contacts, and when.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<ContactEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Schedule::is_empty")]
    pub sched: Schedule,
    #[serde(default, skip_serializing_if = "Plotting::is_default")]
    pub plotting: Plotting,
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub any_tags: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_warnings: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub throttling: bool,
}

impl Subscription {
    /// Natural key used to pair local and remote subscriptions: the sorted,
    /// de-duplicated tag set.
    pub fn tag_key(&self) -> Vec<String> {
        let mut tags = self.tags.clone();
        tags.sort();
        tags.dedup();
        tags
    }
}

/// Notification settings of a single user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
