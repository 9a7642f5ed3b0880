//! Change detection between a local object and its remote counterpart.
//!
//! Comparisons are declared as rule tables: each [`FieldRule`] names a field
//! and says whether the two sides differ on it. Trigger comparison runs the
//! common rules, then the rules for the *remote* trigger's type:
//!
//! | Remote type          | Extra rules                  |
//! |----------------------|------------------------------|
//! | `rising`, `falling`  | `warn_value`, `error_value`  |
//! | `expression`         | `expression`                 |
//! | anything else        | none, with a warning         |
//!
//! Schedules and tags are not compared for triggers.

use std::collections::BTreeSet;

use moira_core::{normalize_for_remote, Subscription, Trigger, TriggerType};

/// One named comparison.
pub struct FieldRule<T> {
    pub field: &'static str,
    pub differs: fn(&T, &T) -> bool,
}

/// Rules applied to every trigger regardless of type.
pub const TRIGGER_RULES: &[FieldRule<Trigger>] = &[
    FieldRule {
        field: "desc",
        differs: |l, r| l.desc != r.desc,
    },
    FieldRule {
        field: "trigger_type",
        differs: |l, r| l.trigger_type != r.trigger_type,
    },
    FieldRule {
        field: "ttl_state",
        differs: |l, r| l.ttl_state != r.ttl_state,
    },
    FieldRule {
        field: "ttl",
        differs: |l, r| l.ttl != r.ttl,
    },
    FieldRule {
        field: "is_remote",
        differs: |l, r| l.is_remote != r.is_remote,
    },
    FieldRule {
        field: "targets",
        differs: |l, r| l.targets != r.targets,
    },
];

/// Extra rules for `rising` and `falling` triggers.
pub const THRESHOLD_RULES: &[FieldRule<Trigger>] = &[
    FieldRule {
        field: "warn_value",
        differs: |l, r| l.warn_value != r.warn_value,
    },
    FieldRule {
        field: "error_value",
        differs: |l, r| l.error_value != r.error_value,
    },
];

/// Extra rules for `expression` triggers.
pub const EXPRESSION_RULES: &[FieldRule<Trigger>] = &[FieldRule {
    field: "expression",
    differs: |l, r| l.expression != r.expression,
}];

/// Rules for subscriptions, both sides in local form.
pub const SUBSCRIPTION_RULES: &[FieldRule<Subscription>] = &[
    FieldRule {
        field: "contacts",
        differs: |l, r| {
            let local: BTreeSet<_> = l.contacts.iter().collect();
            let remote: BTreeSet<_> = r.contacts.iter().collect();
            local != remote
        },
    },
    FieldRule {
        field: "tags",
        differs: |l, r| l.tag_key() != r.tag_key(),
    },
    FieldRule {
        field: "sched",
        differs: |l, r| {
            normalize_for_remote(l.sched.clone()) != normalize_for_remote(r.sched.clone())
        },
    },
    FieldRule {
        field: "plotting",
        differs: |l, r| l.plotting != r.plotting,
    },
    FieldRule {
        field: "enabled",
        differs: |l, r| l.enabled != r.enabled,
    },
    FieldRule {
        field: "any_tags",
        differs: |l, r| l.any_tags != r.any_tags,
    },
    FieldRule {
        field: "ignore_warnings",
        differs: |l, r| l.ignore_warnings != r.ignore_warnings,
    },
    FieldRule {
        field: "throttling",
        differs: |l, r| l.throttling != r.throttling,
    },
];

/// Names of the fields on which `local` and `remote` differ, in rule order.
pub fn changed_fields<T>(rules: &[FieldRule<T>], local: &T, remote: &T) -> Vec<&'static str> {
    rules
        .iter()
        .filter(|rule| (rule.differs)(local, remote))
        .map(|rule| rule.field)
        .collect()
}

/// Type-specific rules, or `None` for a type we cannot compare.
pub fn type_rules(trigger_type: &TriggerType) -> Option<&'static [FieldRule<Trigger>]> {
    match trigger_type {
        TriggerType::Rising | TriggerType::Falling => Some(THRESHOLD_RULES),
        TriggerType::Expression => Some(EXPRESSION_RULES),
        TriggerType::Other(_) => None,
    }
}

pub fn trigger_changed_fields(local: &Trigger, remote: &Trigger) -> Vec<&'static str> {
    let mut fields = changed_fields(TRIGGER_RULES, local, remote);
    match type_rules(&remote.trigger_type) {
        Some(rules) => fields.extend(changed_fields(rules, local, remote)),
        None => tracing::warn!(
            trigger = %remote.name,
            trigger_type = %remote.trigger_type,
            "unsupported trigger type; thresholds and expression not compared"
        ),
    }
    fields
}

pub fn trigger_needs_update(local: &Trigger, remote: &Trigger) -> bool {
    !trigger_changed_fields(local, remote).is_empty()
}

pub fn subscription_changed_fields(local: &Subscription, remote: &Subscription) -> Vec<&'static str> {
    changed_fields(SUBSCRIPTION_RULES, local, remote)
}
