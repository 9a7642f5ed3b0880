//! Apply path: reconcile local objects against remote state.
//!
//! Objects are matched by natural key, never by identity:
//!
//! - triggers by `name` (when names collide remotely, the last one wins),
//! - contacts by `(user, type, value)`,
//! - subscriptions by their sorted tag set (only with
//!   [`ApplyOptions::upload_subscriptions`]).
//!
//! A matched trigger is updated only when [`trigger_changed_fields`] reports
//! a difference. With [`ApplyOptions::dry_run`] every decision is made and
//! reported but no `PUT` is sent.

use std::collections::HashMap;

use moira_core::{
    Contact, ContactEntry, ContactId, Document, Subscription, TagCollection, Trigger, TriggerId,
    UserSettings,
};

use crate::client::{decode, MoiraClient};
use crate::compare::{subscription_changed_fields, trigger_changed_fields};
use crate::config::ApplyOptions;
use crate::error::ApiError;
use crate::fetch::contact_table;
use crate::transport::Transport;
use crate::wire;

/// What the reconciler did (or, in a dry run, would do) with one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated { fields: Vec<&'static str> },
    UpToDate,
}

impl Action {
    /// `true` for actions that write to the remote system.
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::UpToDate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub name: String,
    /// Remote id of the matched trigger, or the id returned by a create.
    pub id: Option<TriggerId>,
    pub action: Action,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionOutcome {
    /// Sorted tag set the subscription was matched on.
    pub tags: Vec<String>,
    pub id: Option<String>,
    pub action: Action,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSettingsOutcome {
    pub login: String,
    /// Contact references resolved to an already known contact.
    pub contacts_reused: usize,
    /// Contacts created for this user, in creation order.
    pub contacts_created: Vec<Contact>,
    /// `None` unless subscription upload was requested.
    pub subscriptions: Option<Vec<SubscriptionOutcome>>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Trigger(TriggerOutcome),
    User(UserSettingsOutcome),
    /// Tags are created by the server together with triggers.
    TagsSkipped(TagCollection),
}

impl<T: Transport> MoiraClient<T> {
    /// Run the reconciler matching the document's type.
    pub fn apply_document(
        &self,
        document: &Document,
        options: ApplyOptions,
    ) -> Result<DocumentOutcome, ApiError> {
        match document {
            Document::Trigger(trigger) => {
                self.apply_trigger(trigger, options).map(DocumentOutcome::Trigger)
            }
            Document::User(settings) => self
                .apply_user_settings(settings, options)
                .map(DocumentOutcome::User),
            Document::Tag(tags) => {
                tracing::info!(tags = tags.list.len(), "tag documents are not applied");
                Ok(DocumentOutcome::TagsSkipped(tags.clone()))
            }
        }
    }

    /// Create or update one trigger, matched by name.
    pub fn apply_trigger(
        &self,
        local: &Trigger,
        options: ApplyOptions,
    ) -> Result<TriggerOutcome, ApiError> {
        if local.name.is_empty() {
            return Err(ApiError::Invalid("trigger has no name".to_string()));
        }

        let remote_by_name: HashMap<String, Trigger> = self
            .fetch_triggers()?
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();

        // Identity is never taken from a local file.
        let mut local = local.clone();
        local.id = None;
        local.sched = moira_core::normalize_for_local_storage(local.sched);

        let Some(remote) = remote_by_name.get(&local.name) else {
            let id = if options.dry_run {
                tracing::info!(trigger = %local.name, "would create trigger");
                None
            } else {
                let body = self.put_json("trigger", &wire::Trigger::from_local(&local), None)?;
                let id = created_trigger_id(&body);
                tracing::info!(trigger = %local.name, id = ?id, "trigger created");
                id
            };
            return Ok(TriggerOutcome {
                name: local.name,
                id,
                action: Action::Created,
                dry_run: options.dry_run,
            });
        };

        let fields = trigger_changed_fields(&local, remote);
        if fields.is_empty() {
            tracing::info!(trigger = %local.name, "trigger is up to date");
            return Ok(TriggerOutcome {
                name: local.name,
                id: remote.id.clone(),
                action: Action::UpToDate,
                dry_run: options.dry_run,
            });
        }

        let id = remote.id.clone().ok_or_else(|| {
            ApiError::Invalid(format!("remote trigger '{}' has no id", local.name))
        })?;
        if options.dry_run {
            tracing::info!(trigger = %local.name, %id, ?fields, "would update trigger");
        } else {
            local.id = Some(id.clone());
            self.put_json(
                &format!("trigger/{id}"),
                &wire::Trigger::from_local(&local),
                None,
            )?;
            tracing::info!(trigger = %local.name, %id, ?fields, "trigger updated");
        }
        Ok(TriggerOutcome {
            name: local.name,
            id: Some(id),
            action: Action::Updated { fields },
            dry_run: options.dry_run,
        })
    }

    /// Make sure every contact referenced by `local` exists for its user,
    /// creating missing ones, then optionally upload its subscriptions.
    pub fn apply_user_settings(
        &self,
        local: &UserSettings,
        options: ApplyOptions,
    ) -> Result<UserSettingsOutcome, ApiError> {
        let login = local.login.as_str();
        if login.is_empty() {
            return Err(ApiError::Invalid("user settings have no login".to_string()));
        }

        let mut known = self.fetch_contacts()?;
        let mut outcome = UserSettingsOutcome {
            login: login.to_string(),
            contacts_reused: 0,
            contacts_created: Vec::new(),
            subscriptions: None,
            dry_run: options.dry_run,
        };

        // Contact ids per subscription, in local order.
        let mut resolved: Vec<Vec<Option<ContactId>>> = Vec::with_capacity(local.subscriptions.len());
        for subscription in &local.subscriptions {
            let mut ids = Vec::with_capacity(subscription.contacts.len());
            for entry in &subscription.contacts {
                if let Some(existing) = known.iter().find(|c| c.matches(login, entry)) {
                    outcome.contacts_reused += 1;
                    ids.push(existing.id.clone());
                    continue;
                }
                let created = self.create_contact(login, entry, options.dry_run)?;
                ids.push(created.id.clone());
                known.push(created.clone());
                outcome.contacts_created.push(created);
            }
            resolved.push(ids);
        }

        if options.upload_subscriptions {
            outcome.subscriptions =
                Some(self.upload_subscriptions(local, &resolved, &known, options)?);
        }
        Ok(outcome)
    }

    fn create_contact(
        &self,
        login: &str,
        entry: &ContactEntry,
        dry_run: bool,
    ) -> Result<Contact, ApiError> {
        let mut contact = Contact {
            id: None,
            kind: entry.kind.clone(),
            user: login.to_string(),
            value: entry.value.clone(),
        };
        if dry_run {
            tracing::info!(user = login, kind = %contact.kind, value = %contact.value, "would create contact");
            return Ok(contact);
        }

        let body = self.put_json("contact", &wire::Contact::from_local(&contact), Some(login))?;
        let created: wire::Contact = decode(&self.url("contact"), &body)?;
        contact.id = created.into_local().id;
        tracing::info!(
            user = login,
            kind = %contact.kind,
            value = %contact.value,
            id = ?contact.id,
            "contact created"
        );
        Ok(contact)
    }

    fn upload_subscriptions(
        &self,
        local: &UserSettings,
        resolved: &[Vec<Option<ContactId>>],
        known: &[Contact],
        options: ApplyOptions,
    ) -> Result<Vec<SubscriptionOutcome>, ApiError> {
        let login = local.login.as_str();
        let remote = self.fetch_remote_settings(login)?;

        let mut table = contact_table(known);
        table.extend(
            remote
                .contacts
                .into_iter()
                .map(wire::Contact::into_local)
                .filter_map(|c| c.id.clone().map(|id| (id, c))),
        );

        let remote: Vec<(Option<String>, Subscription)> = remote
            .subscriptions
            .into_iter()
            .map(|s| {
                let id = s.id.clone().filter(|id| !id.is_empty());
                (id, s.into_local(&table))
            })
            .collect();
        for tags in duplicate_tag_keys(remote.iter().map(|(_, s)| s)) {
            tracing::warn!(
                user = login,
                ?tags,
                "several remote subscriptions share this tag set; only the last is matched"
            );
        }
        for tags in duplicate_tag_keys(&local.subscriptions) {
            tracing::warn!(
                user = login,
                ?tags,
                "several local subscriptions share this tag set; they target the same remote subscription"
            );
        }
        let remote_by_tags: HashMap<Vec<String>, (Option<String>, Subscription)> = remote
            .into_iter()
            .map(|(id, s)| (s.tag_key(), (id, s)))
            .collect();

        let mut outcomes = Vec::with_capacity(local.subscriptions.len());
        for (subscription, ids) in local.subscriptions.iter().zip(resolved) {
            let tags = subscription.tag_key();
            let (id, action) = match remote_by_tags.get(&tags) {
                None => (None, Action::Created),
                Some((id, remote)) => {
                    let fields = subscription_changed_fields(subscription, remote);
                    if fields.is_empty() {
                        (id.clone(), Action::UpToDate)
                    } else {
                        let id = id.clone().ok_or_else(|| {
                            ApiError::Invalid(format!(
                                "remote subscription of '{login}' for tags {tags:?} has no id"
                            ))
                        })?;
                        (Some(id), Action::Updated { fields })
                    }
                }
            };

            let id = if options.dry_run || !action.is_write() {
                tracing::info!(user = login, ?tags, ?action, dry_run = options.dry_run, "subscription");
                id
            } else {
                let contact_ids = ids
                    .iter()
                    .cloned()
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| {
                        ApiError::Invalid(format!(
                            "subscription of '{login}' for tags {tags:?} references a contact without id"
                        ))
                    })?;
                let body = wire::Subscription::from_local(subscription, login, contact_ids, id.clone());
                let path = match &id {
                    Some(id) => format!("subscription/{id}"),
                    None => "subscription".to_string(),
                };
                let response = self.put_json(&path, &body, Some(login))?;
                let id = id.or_else(|| created_subscription_id(&response));
                tracing::info!(user = login, ?tags, ?id, ?action, "subscription saved");
                id
            };

            outcomes.push(SubscriptionOutcome {
                tags,
                id,
                action,
                dry_run: options.dry_run,
            });
        }
        Ok(outcomes)
    }
}

/// Tag sets shared by more than one subscription, in sorted order.
fn duplicate_tag_keys<'a>(
    subscriptions: impl IntoIterator<Item = &'a Subscription>,
) -> Vec<Vec<String>> {
    let mut seen: HashMap<Vec<String>, usize> = HashMap::new();
    for subscription in subscriptions {
        *seen.entry(subscription.tag_key()).or_default() += 1;
    }
    let mut duplicates: Vec<_> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(tags, _)| tags)
        .collect();
    duplicates.sort();
    duplicates
}

/// Id in a trigger save response, if the server sent one.
fn created_trigger_id(body: &str) -> Option<TriggerId> {
    serde_json::from_str::<wire::SaveResponse>(body)
        .ok()
        .map(|r| r.id)
        .filter(|id| !id.is_empty())
        .map(TriggerId::from)
}

fn created_subscription_id(body: &str) -> Option<String> {
    serde_json::from_str::<wire::Subscription>(body)
        .ok()
        .and_then(|s| s.id)
        .filter(|id| !id.is_empty())
}
