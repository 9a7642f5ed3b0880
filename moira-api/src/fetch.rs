//! Remote collection fetchers.
//!
//! Every fetcher is read-only and converts what it reads into the local
//! model. User settings are assembled in explicit steps because the API has
//! no "list users" endpoint:
//!
//! 1. fetch all contacts,
//! 2. derive the distinct owning users ([`derive_users`]),
//! 3. fetch each user's settings with the impersonation header and resolve
//!    subscription contact ids through the contact table ([`contact_table`]).
//!
//! Any failure aborts the whole fetch; no partial result is returned.

use std::collections::{BTreeSet, HashMap};

use moira_core::{Contact, ContactId, TagCollection, Trigger, UserSettings};

use crate::client::MoiraClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::wire;

impl<T: Transport> MoiraClient<T> {
    /// `GET /tag`.
    pub fn fetch_tags(&self) -> Result<TagCollection, ApiError> {
        let response: wire::ListResponse<String> = self.get_json("tag", None)?;
        Ok(TagCollection {
            list: response.list,
        })
    }

    /// `GET /trigger`, with schedules reduced to the local empty form.
    pub fn fetch_triggers(&self) -> Result<Vec<Trigger>, ApiError> {
        let response: wire::ListResponse<wire::Trigger> = self.get_json("trigger", None)?;
        Ok(response
            .list
            .into_iter()
            .map(wire::Trigger::into_local)
            .collect())
    }

    /// `GET /contact`.
    pub fn fetch_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        let response: wire::ListResponse<wire::Contact> = self.get_json("contact", None)?;
        Ok(response
            .list
            .into_iter()
            .map(wire::Contact::into_local)
            .collect())
    }

    /// Settings of every user that owns at least one contact, sorted by login.
    pub fn fetch_user_settings(&self) -> Result<Vec<UserSettings>, ApiError> {
        let contacts = self.fetch_contacts()?;
        let users = derive_users(&contacts);
        let table = contact_table(&contacts);
        tracing::debug!(users = users.len(), contacts = contacts.len(), "fetching user settings");

        users
            .iter()
            .map(|login| self.fetch_settings_for(login, &table))
            .collect()
    }

    /// Settings of one user, with contact ids resolved through `contacts`.
    pub fn fetch_settings_for(
        &self,
        login: &str,
        contacts: &HashMap<ContactId, Contact>,
    ) -> Result<UserSettings, ApiError> {
        Ok(self.fetch_remote_settings(login)?.into_local(login, contacts))
    }

    /// `GET /user/settings` impersonating `login`, in wire form.
    pub fn fetch_remote_settings(&self, login: &str) -> Result<wire::UserSettings, ApiError> {
        self.get_json("user/settings", Some(login))
    }
}

/// Distinct, non-empty owning users of `contacts`.
pub fn derive_users(contacts: &[Contact]) -> BTreeSet<String> {
    contacts
        .iter()
        .filter(|c| !c.user.is_empty())
        .map(|c| c.user.clone())
        .collect()
}

/// id → contact lookup. Contacts without an id are left out.
pub fn contact_table(contacts: &[Contact]) -> HashMap<ContactId, Contact> {
    contacts
        .iter()
        .filter_map(|c| c.id.clone().map(|id| (id, c.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: &str, user: &str, value: &str) -> Contact {
        Contact {
            id: Some(ContactId::from(id)),
            kind: "mail".to_string(),
            user: user.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn users_are_distinct_sorted_and_non_empty() {
        let contacts = vec![
            contact("c-1", "bob", "bob@example.com"),
            contact("c-2", "alice", "alice@example.com"),
            contact("c-3", "bob", "bob@work.example.com"),
            contact("c-4", "", "orphan@example.com"),
        ];
        let users: Vec<_> = derive_users(&contacts).into_iter().collect();
        assert_eq!(users, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn table_skips_contacts_without_id() {
        let mut pending = contact("x", "alice", "new@example.com");
        pending.id = None;
        let contacts = vec![contact("c-1", "alice", "alice@example.com"), pending];
        let table = contact_table(&contacts);
        assert_eq!(table.len(), 1);
        assert!(table.contains_key(&ContactId::from("c-1")));
    }
}
