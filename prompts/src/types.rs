// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Remote site identifier.
///
/// The prompt settings service addresses settings by site, e.g. `/sites/12345/...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteId(String);

impl SiteId {
    /// Creates a new `SiteId` from a string.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SiteId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SiteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SiteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Days of the week on which prompt reminders fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDays {
    /// Monday.
    #[serde(default)]
    pub monday: bool,
    /// Tuesday.
    #[serde(default)]
    pub tuesday: bool,
    /// Wednesday.
    #[serde(default)]
    pub wednesday: bool,
    /// Thursday.
    #[serde(default)]
    pub thursday: bool,
    /// Friday.
    #[serde(default)]
    pub friday: bool,
    /// Saturday.
    #[serde(default)]
    pub saturday: bool,
    /// Sunday.
    #[serde(default)]
    pub sunday: bool,
}

impl ReminderDays {
    /// The days in Monday..Sunday order.
    #[must_use]
    pub const fn as_array(&self) -> [bool; 7] {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
    }

    /// Builds from days in Monday..Sunday order.
    #[must_use]
    pub const fn from_array(days: [bool; 7]) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = days;
        Self {
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
        }
    }

    /// Returns true if no day is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.as_array().iter().any(|&d| d)
    }
}

/// Blogging prompt settings of a site, as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSettings {
    /// Whether prompt reminders are enabled.
    #[serde(rename = "prompt_reminders_enabled")]
    pub enabled: bool,

    /// The weekdays reminders fire on.
    #[serde(rename = "reminders_days", default)]
    pub reminder_days: ReminderDays,

    /// Time of day in `HH.mm` format, e.g. `"09.30"`.
    #[serde(rename = "reminders_time")]
    pub reminder_time: String,
}

impl PromptSettings {
    /// Formats an hour and minute the way the service expects, `HH.mm`.
    #[must_use]
    pub fn format_time(hour: i8, minute: i8) -> String {
        format!("{hour:02}.{minute:02}")
    }

    /// Parses the `HH.mm` reminder time into hour and minute.
    ///
    /// Returns `None` if the value is malformed or out of range.
    #[must_use]
    pub fn reminder_hour_minute(&self) -> Option<(i8, i8)> {
        let (h, m) = self.reminder_time.split_once('.')?;
        let hour: i8 = h.trim().parse().ok()?;
        let minute: i8 = m.trim().parse().ok()?;
        ((0..24).contains(&hour) && (0..60).contains(&minute)).then_some((hour, minute))
    }
}
