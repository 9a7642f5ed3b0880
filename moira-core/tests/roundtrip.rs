//! Dump/parse round trips for local documents.
//!
//! Each `#[case]` builds its own document.

use moira_core::{
    ContactEntry, Day, Document, Plotting, Schedule, Subscription, TagCollection, Trigger,
    TriggerType, UserSettings,
};
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn night_shift() -> Schedule {
    Schedule {
        days: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
            .iter()
            .enumerate()
            .map(|(i, name)| Day::new(name, i < 5))
            .collect(),
        tz_offset: 0,
        start_offset: 1200,
        end_offset: 1439,
    }
}

fn threshold_trigger() -> Document {
    Document::Trigger(Trigger {
        name: "cpu-high".to_string(),
        desc: "CPU above normal".to_string(),
        targets: vec!["servers.*.cpu.user".to_string()],
        trigger_type: TriggerType::Rising,
        warn_value: Some(80.0),
        error_value: Some(95.5),
        tags: vec!["cpu".to_string(), "infra".to_string()],
        ttl_state: "NODATA".to_string(),
        ttl: 600,
        ..Trigger::default()
    })
}

fn expression_trigger() -> Document {
    Document::Trigger(Trigger {
        name: "disk ratio".to_string(),
        targets: vec!["a.free".to_string(), "a.total".to_string()],
        trigger_type: TriggerType::Expression,
        expression: "t1 / t2 < 0.1 ? ERROR : OK".to_string(),
        sched: night_shift(),
        is_remote: true,
        ..Trigger::default()
    })
}

fn unknown_type_trigger() -> Document {
    Document::Trigger(Trigger {
        name: "legacy".to_string(),
        trigger_type: TriggerType::Other("custom".to_string()),
        ..Trigger::default()
    })
}

fn user_settings() -> Document {
    Document::User(UserSettings {
        login: "алиса".to_string(),
        subscriptions: vec![Subscription {
            contacts: vec![ContactEntry {
                kind: "mail".to_string(),
                value: "alice@example.com".to_string(),
            }],
            tags: vec!["db".to_string()],
            sched: night_shift(),
            plotting: Plotting {
                enabled: true,
                theme: "dark".to_string(),
            },
            enabled: true,
            throttling: true,
            ..Subscription::default()
        }],
    })
}

fn tags() -> Document {
    Document::Tag(TagCollection {
        list: vec!["cpu".to_string(), "日本語".to_string()],
    })
}

// ---------------------------------------------------------------------------
// Parameterised round trip
// ---------------------------------------------------------------------------

#[rstest]
#[case("threshold_trigger", threshold_trigger())]
#[case("expression_trigger", expression_trigger())]
#[case("unknown_type_trigger", unknown_type_trigger())]
#[case("user_settings", user_settings())]
#[case("tags", tags())]
fn document_roundtrip(#[case] label: &str, #[case] doc: Document) {
    let yaml = doc
        .to_yaml()
        .unwrap_or_else(|e| panic!("[{label}] render failed: {e}"));
    let back =
        Document::from_yaml(&yaml).unwrap_or_else(|e| panic!("[{label}] parse failed: {e}"));
    assert_eq!(back, doc, "[{label}] document changed across round trip");
    assert_eq!(back.kind(), doc.kind(), "[{label}] kind");
}
