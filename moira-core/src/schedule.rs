//! Trigger and subscription schedules.
//!
//! Moira always answers with a fully populated schedule, even when nobody
//! configured one: every day enabled, `tzOffset` -420, minutes `0..=1439`.
//! Local files store that "no custom schedule" state as the empty form
//! instead, so they carry no schedule boilerplate.
//!
//! | Layer        | "no custom schedule" looks like        |
//! |--------------|----------------------------------------|
//! | Remote API   | [`Schedule::platform_default`]         |
//! | Local files  | [`Schedule::empty`] (omitted entirely) |
//!
//! [`normalize_for_local_storage`] and [`normalize_for_remote`] convert
//! between the two and must be applied at every read and write boundary.

use serde::{Deserialize, Serialize};

/// Weekday names in the order the platform returns them.
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Timezone offset (minutes) of the platform default schedule.
pub const DEFAULT_TZ_OFFSET: i64 = -420;
/// First minute of the day covered by the platform default schedule.
pub const DEFAULT_START_OFFSET: i64 = 0;
/// Last minute of the day covered by the platform default schedule.
pub const DEFAULT_END_OFFSET: i64 = 1439;

/// A single weekday entry of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub name: String,
}

impl Day {
    pub fn new(name: &str, enabled: bool) -> Self {
        Self {
            enabled,
            name: name.to_owned(),
        }
    }
}

/// When a trigger or subscription is active.
///
/// An empty `days` list is the canonical empty form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<Day>,
    #[serde(rename = "tzOffset", default, skip_serializing_if = "is_zero")]
    pub tz_offset: i64,
    #[serde(rename = "startOffset", default, skip_serializing_if = "is_zero")]
    pub start_offset: i64,
    #[serde(rename = "endOffset", default, skip_serializing_if = "is_zero")]
    pub end_offset: i64,
}

impl Schedule {
    /// The local "no custom schedule" form: no days, zero offsets.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The schedule the platform reports for objects without a custom one.
    pub fn platform_default() -> Self {
        Self {
            days: WEEKDAYS.iter().map(|name| Day::new(name, true)).collect(),
            tz_offset: DEFAULT_TZ_OFFSET,
            start_offset: DEFAULT_START_OFFSET,
            end_offset: DEFAULT_END_OFFSET,
        }
    }

    /// `true` when no days are listed; offsets are ignored, as the platform does.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// `true` when the day list and all three offsets match the platform default.
    pub fn is_platform_default(&self) -> bool {
        *self == Self::platform_default()
    }
}

/// Replace the platform default with the empty form before a local write.
pub fn normalize_for_local_storage(schedule: Schedule) -> Schedule {
    if schedule.is_platform_default() {
        Schedule::empty()
    } else {
        schedule
    }
}

/// Expand the empty form to the platform default before a remote write or
/// a comparison against remote state.
pub fn normalize_for_remote(schedule: Schedule) -> Schedule {
    if schedule.is_empty() {
        Schedule::platform_default()
    } else {
        schedule
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
