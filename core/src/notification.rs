// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use jiff::{Span, Zoned};
use serde::Deserialize;

use crate::error::NotificationError;
use crate::schedule::{BlogId, Schedule, ScheduledTime, Weekday};

const IDENTIFIER_PREFIX: &str = "blogging-reminder";

/// A recurring weekly trigger at a wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyTrigger {
    /// Day of the week the trigger fires on.
    pub weekday: Weekday,
    /// Wall-clock time, interpreted in the user's timezone at evaluation.
    pub time: ScheduledTime,
    /// Whether the trigger repeats every week.
    pub repeats: bool,
}

impl WeeklyTrigger {
    /// Computes the next instant strictly after `now` at which the trigger fires, in the
    /// timezone of `now`.
    pub fn next_fire(&self, now: &Zoned) -> Result<Zoned, jiff::Error> {
        let target = jiff::civil::Weekday::from(self.weekday).to_sunday_zero_offset();
        let today = now.weekday().to_sunday_zero_offset();
        let days_ahead = i64::from((target - today).rem_euclid(7));

        let candidate = self.at(now, days_ahead)?;
        if candidate > *now {
            Ok(candidate)
        } else {
            self.at(now, days_ahead + 7)
        }
    }

    fn at(&self, now: &Zoned, days_ahead: i64) -> Result<Zoned, jiff::Error> {
        now.date()
            .checked_add(Span::new().days(days_ahead))?
            .to_datetime(self.time.to_civil())
            .to_zoned(now.time_zone().clone())
    }
}

/// Kind of reminder a notification delivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    /// Plain reminder to write a post.
    #[default]
    Blogging,
    /// Reminder to answer the day's blogging prompt.
    Prompt,
}

impl ReminderKind {
    /// Notification category, used by the host to pick the actions offered on the
    /// notification.
    pub const fn category(self) -> &'static str {
        match self {
            ReminderKind::Blogging => "blogging-reminder",
            ReminderKind::Prompt => "blogging-prompt",
        }
    }
}

/// Routing data attached to a request, so a tap opens the right blog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    /// What the reminder is about.
    pub kind: ReminderKind,
    /// The blog the reminder belongs to.
    pub blog: BlogId,
}

/// A pending local notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Unique identifier; adding a request with an existing identifier replaces it.
    pub identifier: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// When the notification fires.
    pub trigger: WeeklyTrigger,
    /// Data handed back to the app when the notification is tapped.
    pub payload: NotificationPayload,
}

impl NotificationRequest {
    /// Notification category of the request.
    pub fn category(&self) -> &'static str {
        self.payload.kind.category()
    }
}

/// The OS local notification scheduler.
#[async_trait]
pub trait NotificationCenter: Send + Sync {
    /// Adds a request, replacing any pending request with the same identifier.
    async fn add(&self, request: NotificationRequest) -> Result<(), NotificationError>;

    /// Removes pending requests by identifier. Unknown identifiers are ignored.
    async fn remove_pending(&self, identifiers: &[String]);

    /// Lists all pending requests.
    async fn pending_requests(&self) -> Vec<NotificationRequest>;
}

/// Process-local notification center, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct InMemoryNotificationCenter {
    requests: Mutex<BTreeMap<String, NotificationRequest>>,
}

impl InMemoryNotificationCenter {
    /// Creates an empty notification center.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationCenter for InMemoryNotificationCenter {
    async fn add(&self, request: NotificationRequest) -> Result<(), NotificationError> {
        let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        requests.insert(request.identifier.clone(), request);
        Ok(())
    }

    async fn remove_pending(&self, identifiers: &[String]) {
        let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        for id in identifiers {
            requests.remove(id);
        }
    }

    async fn pending_requests(&self) -> Vec<NotificationRequest> {
        let requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        requests.values().cloned().collect()
    }
}

/// Title and body of reminder notifications.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotificationContent {
    /// Title of blogging reminders.
    pub title: String,
    /// Body of blogging reminders.
    pub body: String,
    /// Title of prompt reminders.
    pub prompt_title: String,
    /// Body of prompt reminders. The prompt itself is loaded when the notification is opened.
    pub prompt_body: String,
}

impl NotificationContent {
    /// Title and body for the given kind of reminder.
    pub fn for_kind(&self, kind: ReminderKind) -> (&str, &str) {
        match kind {
            ReminderKind::Blogging => (&self.title, &self.body),
            ReminderKind::Prompt => (&self.prompt_title, &self.prompt_body),
        }
    }
}

impl Default for NotificationContent {
    fn default() -> Self {
        Self {
            title: "Blogging Reminders".to_string(),
            body: "It's time to write your next post.".to_string(),
            prompt_title: "Today's Prompt \u{1f4a1}".to_string(),
            prompt_body: "Tap to load today's prompt...".to_string(),
        }
    }
}

/// Translates schedules into notification requests and reconciles them with the
/// notification center.
#[derive(Clone)]
pub struct NotificationMaterializer {
    center: Arc<dyn NotificationCenter>,
    content: NotificationContent,
}

impl NotificationMaterializer {
    /// Creates a materializer posting `content` to `center`.
    pub fn new(center: Arc<dyn NotificationCenter>, content: NotificationContent) -> Self {
        Self { center, content }
    }

    /// Deterministic identifier of the request for a blog and weekday.
    pub fn identifier(blog: &BlogId, weekday: Weekday) -> String {
        format!("{IDENTIFIER_PREFIX}:{blog}:{}", weekday.ordinal())
    }

    /// Returns true if the identifier belongs to the blog's namespace.
    fn owns(blog: &BlogId, identifier: &str) -> bool {
        identifier
            .rsplit_once(':')
            .and_then(|(namespace, _)| namespace.strip_prefix(IDENTIFIER_PREFIX))
            .and_then(|rest| rest.strip_prefix(':'))
            .is_some_and(|id| id == blog.as_str())
    }

    fn all_identifiers(blog: &BlogId) -> impl Iterator<Item = String> + '_ {
        Weekday::ALL
            .into_iter()
            .map(move |day| Self::identifier(blog, day))
    }

    /// Reconciles the blog's pending requests with the schedule.
    ///
    /// Requests of both kinds share the blog's identifiers, so committing one kind replaces
    /// the requests of the other. Returns the identifiers of the requests now pending for the
    /// blog. Calling it twice with the same input leaves the same requests pending.
    pub async fn commit(
        &self,
        blog: &BlogId,
        schedule: &Schedule,
        time: ScheduledTime,
        kind: ReminderKind,
    ) -> Result<Vec<String>, NotificationError> {
        let wanted: BTreeSet<String> = schedule
            .days()
            .into_iter()
            .map(|day| Self::identifier(blog, day))
            .collect();

        let mut stale: BTreeSet<String> = Self::all_identifiers(blog)
            .filter(|id| !wanted.contains(id))
            .collect();
        stale.extend(
            self.materialized(blog)
                .await
                .into_iter()
                .filter(|id| !wanted.contains(id)),
        );
        let stale: Vec<String> = stale.into_iter().collect();
        self.center.remove_pending(&stale).await;

        let (title, body) = self.content.for_kind(kind);
        for day in schedule.days() {
            let request = NotificationRequest {
                identifier: Self::identifier(blog, day),
                title: title.to_string(),
                body: body.to_string(),
                trigger: WeeklyTrigger {
                    weekday: day,
                    time,
                    repeats: true,
                },
                payload: NotificationPayload {
                    kind,
                    blog: blog.clone(),
                },
            };
            tracing::debug!(blog = %blog, id = %request.identifier, ?kind, %time, "adding notification request");
            self.center.add(request).await?;
        }

        Ok(wanted.into_iter().collect())
    }

    /// Removes every pending request of the blog.
    pub async fn revoke_all(&self, blog: &BlogId) {
        let mut ids: BTreeSet<String> = Self::all_identifiers(blog).collect();
        ids.extend(self.materialized(blog).await);
        let ids: Vec<String> = ids.into_iter().collect();
        tracing::debug!(blog = %blog, count = ids.len(), "revoking notification requests");
        self.center.remove_pending(&ids).await;
    }

    /// Identifiers of the requests currently pending for the blog.
    pub async fn materialized(&self, blog: &BlogId) -> Vec<String> {
        self.pending(blog)
            .await
            .into_iter()
            .map(|r| r.identifier)
            .collect()
    }

    /// Requests currently pending for the blog.
    pub async fn pending(&self, blog: &BlogId) -> Vec<NotificationRequest> {
        self.center
            .pending_requests()
            .await
            .into_iter()
            .filter(|r| Self::owns(blog, &r.identifier))
            .collect()
    }
}
