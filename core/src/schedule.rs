// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use cadence_prompts::PromptSettings;
use serde::de;

use crate::error::InvalidTimeError;

/// Opaque, stable identifier of a blog. All reminder state is scoped by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlogId(String);

impl BlogId {
    /// Creates a new `BlogId`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BlogId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for BlogId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Day of the week, independent of any locale's first day of the week.
///
/// The ordinal is stable and used in storage and notification identifiers: Sunday is 0,
/// Saturday is 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    /// Sunday, ordinal 0.
    Sunday,
    /// Monday, ordinal 1.
    Monday,
    /// Tuesday, ordinal 2.
    Tuesday,
    /// Wednesday, ordinal 3.
    Wednesday,
    /// Thursday, ordinal 4.
    Thursday,
    /// Friday, ordinal 5.
    Friday,
    /// Saturday, ordinal 6.
    Saturday,
}

impl Weekday {
    /// All weekdays in ordinal order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// The stable ordinal, 0 (Sunday) to 6 (Saturday).
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Looks up a weekday by ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }

    /// Index in a Monday-first week, as used by the prompt settings.
    pub(crate) const fn monday_index(self) -> usize {
        (self.ordinal() as usize + 6) % 7
    }
}

impl From<jiff::civil::Weekday> for Weekday {
    fn from(day: jiff::civil::Weekday) -> Self {
        use jiff::civil::Weekday as W;
        match day {
            W::Sunday => Weekday::Sunday,
            W::Monday => Weekday::Monday,
            W::Tuesday => Weekday::Tuesday,
            W::Wednesday => Weekday::Wednesday,
            W::Thursday => Weekday::Thursday,
            W::Friday => Weekday::Friday,
            W::Saturday => Weekday::Saturday,
        }
    }
}

impl From<Weekday> for jiff::civil::Weekday {
    fn from(day: Weekday) -> Self {
        use jiff::civil::Weekday as W;
        match day {
            Weekday::Sunday => W::Sunday,
            Weekday::Monday => W::Monday,
            Weekday::Tuesday => W::Tuesday,
            Weekday::Wednesday => W::Wednesday,
            Weekday::Thursday => W::Thursday,
            Weekday::Friday => W::Friday,
            Weekday::Saturday => W::Saturday,
        }
    }
}

/// A user-defined reminder schedule.
///
/// Equality compares the reminders a schedule produces, so an empty weekday set equals
/// [`Schedule::None`].
#[derive(Debug, Clone, Default)]
pub enum Schedule {
    /// No reminders.
    #[default]
    None,

    /// Reminders on the given weekdays.
    ///
    /// An empty set means the same as [`Schedule::None`]; see [`Schedule::normalized`].
    Weekdays(BTreeSet<Weekday>),
}

impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Schedule::Weekdays(a), Schedule::Weekdays(b)) => a == b,
            _ => self.is_none() && other.is_none(),
        }
    }
}

impl Eq for Schedule {}

impl Schedule {
    /// Builds a normalized schedule from a set of weekdays.
    pub fn weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        Schedule::Weekdays(days.into_iter().collect()).normalized()
    }

    /// Collapses an empty weekday set into [`Schedule::None`].
    pub fn normalized(self) -> Self {
        match self {
            Schedule::Weekdays(days) if days.is_empty() => Schedule::None,
            other => other,
        }
    }

    /// Returns true if no reminder fires under this schedule.
    pub fn is_none(&self) -> bool {
        match self {
            Schedule::None => true,
            Schedule::Weekdays(days) => days.is_empty(),
        }
    }

    /// The selected weekdays, in ordinal order.
    pub fn days(&self) -> Vec<Weekday> {
        match self {
            Schedule::None => Vec::new(),
            Schedule::Weekdays(days) => days.iter().copied().collect(),
        }
    }

    /// Returns true if reminders fire on the given day.
    pub fn contains(&self, day: Weekday) -> bool {
        match self {
            Schedule::None => false,
            Schedule::Weekdays(days) => days.contains(&day),
        }
    }

    /// Bitmask with bit `n` set for the weekday of ordinal `n`.
    pub(crate) fn to_bits(&self) -> u8 {
        self.days()
            .into_iter()
            .fold(0, |bits, day| bits | (1 << day.ordinal()))
    }

    /// Inverse of [`Schedule::to_bits`]; unknown bits are ignored.
    pub(crate) fn from_bits(bits: u8) -> Self {
        Schedule::weekdays(
            Weekday::ALL
                .into_iter()
                .filter(|day| bits & (1 << day.ordinal()) != 0),
        )
    }
}

/// Time of day at which reminders fire, without date or timezone.
///
/// Stored as wall-clock time and reinterpreted in the user's current timezone when a
/// notification trigger is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduledTime {
    hour: i8,
    minute: i8,
}

impl ScheduledTime {
    /// Reminder time used when nothing has been stored: 10:00.
    pub const DEFAULT: ScheduledTime = ScheduledTime {
        hour: 10,
        minute: 0,
    };

    /// Creates a time of day, or `None` if the hour or minute is out of range.
    pub fn new(hour: i8, minute: i8) -> Option<Self> {
        ((0..24).contains(&hour) && (0..60).contains(&minute)).then_some(Self { hour, minute })
    }

    /// Hour, 0 to 23.
    pub fn hour(&self) -> i8 {
        self.hour
    }

    /// Minute, 0 to 59.
    pub fn minute(&self) -> i8 {
        self.minute
    }

    /// Converts to a civil time on the hour and minute.
    pub fn to_civil(self) -> jiff::civil::Time {
        jiff::civil::time(self.hour, self.minute, 0, 0)
    }

    /// Formats the time as the prompt settings service expects, `HH.mm`.
    pub fn to_prompt_time(self) -> String {
        PromptSettings::format_time(self.hour, self.minute)
    }

    /// Reads the reminder time of prompt settings.
    pub fn from_prompt_settings(settings: &PromptSettings) -> Option<Self> {
        let (hour, minute) = settings.reminder_hour_minute()?;
        Self::new(hour, minute)
    }
}

impl Default for ScheduledTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<jiff::civil::Time> for ScheduledTime {
    fn from(time: jiff::civil::Time) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }
}

impl fmt::Display for ScheduledTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ScheduledTime {
    type Err = InvalidTimeError;

    /// Parses `HH:MM`, e.g. `09:30`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidTimeError(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(err)?;
        let hour: i8 = h.trim().parse().map_err(|_| err())?;
        let minute: i8 = m.trim().parse().map_err(|_| err())?;
        Self::new(hour, minute).ok_or_else(err)
    }
}

impl<'de> serde::Deserialize<'de> for ScheduledTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TimeVisitor;

        impl de::Visitor<'_> for TimeVisitor {
            type Value = ScheduledTime;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(r#"a time of day like "09:30""#)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(TimeVisitor)
    }
}
