//! JSON shapes spoken by the Moira API, and the conversions to and from the
//! local file model.
//!
//! Conversion is where the two representations are reconciled:
//!
//! | Direction        | Schedule                         | Identity                 |
//! |------------------|----------------------------------|--------------------------|
//! | remote → local   | `normalize_for_local_storage`    | kept in memory only      |
//! | local → remote   | `normalize_for_remote`           | set only for updates     |
//!
//! Moira sends `null` for unset strings and lists; those decode as empty.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use moira_core::{
    normalize_for_local_storage, normalize_for_remote, Contact as LocalContact, ContactId, Day,
    Plotting, Schedule as LocalSchedule, Subscription as LocalSubscription, Trigger as LocalTrigger,
    TriggerId, TriggerType, UserSettings as LocalUserSettings,
};

/// `{"list": [...]}` envelope used by the collection endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListResponse<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: Vec<T>,
}

/// Body returned by a successful trigger save.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, deserialize_with = "null_as_default")]
    pub days: Vec<Day>,
    #[serde(rename = "tzOffset", default)]
    pub tz_offset: i64,
    #[serde(rename = "startOffset", default)]
    pub start_offset: i64,
    #[serde(rename = "endOffset", default)]
    pub end_offset: i64,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::from(LocalSchedule::empty())
    }
}

impl From<LocalSchedule> for Schedule {
    fn from(s: LocalSchedule) -> Self {
        Self {
            days: s.days,
            tz_offset: s.tz_offset,
            start_offset: s.start_offset,
            end_offset: s.end_offset,
        }
    }
}

impl From<Schedule> for LocalSchedule {
    fn from(s: Schedule) -> Self {
        Self {
            days: s.days,
            tz_offset: s.tz_offset,
            start_offset: s.start_offset,
            end_offset: s.end_offset,
        }
    }
}

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub desc: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trigger_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_value: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expression: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sched: Schedule,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttl_state: String,
    #[serde(default)]
    pub ttl: i64,
    #[serde(default)]
    pub is_remote: bool,
}

impl Trigger {
    /// Remote → local: keep the id in memory, collapse the default schedule.
    pub fn into_local(self) -> LocalTrigger {
        LocalTrigger {
            id: self.id.filter(|id| !id.is_empty()).map(TriggerId::from),
            name: self.name,
            desc: self.desc,
            targets: self.targets,
            trigger_type: TriggerType::from(self.trigger_type),
            warn_value: self.warn_value,
            error_value: self.error_value,
            expression: self.expression,
            tags: self.tags,
            sched: normalize_for_local_storage(self.sched.into()),
            ttl_state: self.ttl_state,
            ttl: self.ttl,
            is_remote: self.is_remote,
        }
    }

    /// Local → remote: expand the empty schedule, carry the id if set.
    pub fn from_local(trigger: &LocalTrigger) -> Self {
        Self {
            id: trigger.id.as_ref().map(|id| id.0.clone()),
            name: trigger.name.clone(),
            desc: trigger.desc.clone(),
            targets: trigger.targets.clone(),
            trigger_type: trigger.trigger_type.to_string(),
            warn_value: trigger.warn_value,
            error_value: trigger.error_value,
            expression: trigger.expression.clone(),
            tags: trigger.tags.clone(),
            sched: normalize_for_remote(trigger.sched.clone()).into(),
            ttl_state: trigger.ttl_state.clone(),
            ttl: trigger.ttl,
            is_remote: trigger.is_remote,
        }
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

impl Contact {
    pub fn into_local(self) -> LocalContact {
        LocalContact {
            id: self.id.filter(|id| !id.is_empty()).map(ContactId::from),
            kind: self.kind,
            user: self.user,
            value: self.value,
        }
    }

    pub fn from_local(contact: &LocalContact) -> Self {
        Self {
            id: contact.id.as_ref().map(|id| id.0.clone()),
            kind: contact.kind.clone(),
            user: contact.user.clone(),
            value: contact.value.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription / user settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contacts: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sched: Schedule,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plotting: Plotting,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub any_tags: bool,
    #[serde(default)]
    pub ignore_warnings: bool,
    #[serde(default)]
    pub throttling: bool,
}

impl Subscription {
    /// Remote → local: resolve contact ids through `contacts`.
    ///
    /// Ids with no matching contact are dropped with a warning.
    pub fn into_local(self, contacts: &HashMap<ContactId, LocalContact>) -> LocalSubscription {
        let mut resolved = Vec::with_capacity(self.contacts.len());
        for id in self.contacts {
            match contacts.get(&ContactId::from(id.as_str())) {
                Some(contact) => resolved.push(contact.entry()),
                None => tracing::warn!(
                    user = %self.user,
                    contact_id = %id,
                    "subscription references unknown contact; dropping it"
                ),
            }
        }
        LocalSubscription {
            contacts: resolved,
            tags: self.tags,
            sched: normalize_for_local_storage(self.sched.into()),
            plotting: self.plotting,
            enabled: self.enabled,
            any_tags: self.any_tags,
            ignore_warnings: self.ignore_warnings,
            throttling: self.throttling,
        }
    }

    /// Local → remote, with contacts already resolved to ids.
    pub fn from_local(
        subscription: &LocalSubscription,
        login: &str,
        contact_ids: Vec<ContactId>,
        id: Option<String>,
    ) -> Self {
        Self {
            id,
            user: login.to_string(),
            contacts: contact_ids.into_iter().map(|id| id.0).collect(),
            tags: subscription.tags.clone(),
            sched: normalize_for_remote(subscription.sched.clone()).into(),
            plotting: subscription.plotting.clone(),
            enabled: subscription.enabled,
            any_tags: subscription.any_tags,
            ignore_warnings: subscription.ignore_warnings,
            throttling: subscription.throttling,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UserSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub login: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contacts: Vec<Contact>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscriptions: Vec<Subscription>,
}

impl UserSettings {
    /// Remote → local. `login` fills in for servers that omit it.
    pub fn into_local(
        self,
        login: &str,
        contacts: &HashMap<ContactId, LocalContact>,
    ) -> LocalUserSettings {
        let login = if self.login.is_empty() {
            login.to_string()
        } else {
            self.login
        };
        LocalUserSettings {
            login,
            subscriptions: self
                .subscriptions
                .into_iter()
                .map(|s| s.into_local(contacts))
                .collect(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn default_sched_json() -> serde_json::Value {
        json!({
            "days": [
                {"enabled": true, "name": "Mon"}, {"enabled": true, "name": "Tue"},
                {"enabled": true, "name": "Wed"}, {"enabled": true, "name": "Thu"},
                {"enabled": true, "name": "Fri"}, {"enabled": true, "name": "Sat"},
                {"enabled": true, "name": "Sun"}
            ],
            "tzOffset": -420, "startOffset": 0, "endOffset": 1439
        })
    }

    #[test]
    fn remote_trigger_collapses_default_schedule() {
        let wire: Trigger = serde_json::from_value(json!({
            "id": "t-1", "name": "cpu-high", "desc": null, "targets": ["m1"],
            "trigger_type": "rising", "warn_value": 80, "error_value": 95,
            "expression": null, "tags": null, "sched": default_sched_json(),
            "ttl_state": "NODATA", "ttl": 600, "is_remote": false
        }))
        .expect("decode");
        let local = wire.into_local();
        assert_eq!(local.id, Some(TriggerId::from("t-1")));
        assert!(local.sched.is_empty());
        assert!(local.desc.is_empty());
        assert!(local.tags.is_empty());
    }

    #[test]
    fn local_trigger_expands_schedule_and_omits_missing_id() {
        let local = LocalTrigger {
            name: "cpu-high".to_string(),
            trigger_type: TriggerType::Rising,
            warn_value: Some(90.0),
            ..LocalTrigger::default()
        };
        let body = serde_json::to_value(Trigger::from_local(&local)).expect("encode");
        assert!(body.get("id").is_none());
        assert_eq!(body["sched"], default_sched_json());
        assert_eq!(body["warn_value"], json!(90.0));
        assert!(body.get("error_value").is_none());
        assert_eq!(body["ttl_state"], json!(""));
    }

    #[test]
    fn subscription_resolves_known_contacts_and_drops_unknown() {
        let mut table = HashMap::new();
        table.insert(
            ContactId::from("c-1"),
            LocalContact {
                id: Some(ContactId::from("c-1")),
                kind: "mail".to_string(),
                user: "alice".to_string(),
                value: "alice@example.com".to_string(),
            },
        );
        let wire = Subscription {
            user: "alice".to_string(),
            contacts: vec!["c-1".to_string(), "c-gone".to_string()],
            tags: vec!["db".to_string()],
            sched: LocalSchedule::platform_default().into(),
            ..Subscription::default()
        };
        let local = wire.into_local(&table);
        assert_eq!(local.contacts.len(), 1);
        assert_eq!(local.contacts[0].value, "alice@example.com");
        assert!(local.sched.is_empty());
    }

    #[test]
    fn user_settings_login_falls_back_to_requested_user() {
        let wire: UserSettings =
            serde_json::from_value(json!({"subscriptions": null})).expect("decode");
        let local = wire.into_local("bob", &HashMap::new());
        assert_eq!(local.login, "bob");
        assert!(local.subscriptions.is_empty());
    }
}
