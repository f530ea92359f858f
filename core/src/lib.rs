// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Cadence - blogging reminders scheduling engine.
//!
//! The engine keeps three things in agreement for every blog: the weekly reminder schedule
//! persisted locally, the recurring notification requests handed to the OS, and the optional
//! blogging prompt settings mirrored to a remote service. The UI talks to it through
//! [`SchedulerCoordinator`].

mod config;
mod coordinator;
mod error;
mod localdb;
mod notification;
mod permission;
mod prompts;
mod schedule;
mod store;

pub use crate::config::{APP_NAME, Config, PromptsSection};
pub use crate::coordinator::{PromptSyncHandle, ScheduleOutcome, SchedulerCoordinator};
pub use crate::error::{
    InvalidTimeError, NotificationError, PromptSyncError, SchedulingError, StoreError,
};
pub use crate::localdb::LocalDb;
pub use crate::notification::{
    InMemoryNotificationCenter, NotificationCenter, NotificationContent, NotificationMaterializer,
    NotificationPayload, NotificationRequest, ReminderKind, WeeklyTrigger,
};
pub use crate::permission::{AuthorizationStatus, ManualPermissionGate, PermissionGate};
pub use crate::prompts::{
    PromptSettingsBridge, PromptSettingsRemote, PromptSyncState, RollbackToken,
    prompt_settings_for,
};
pub use crate::schedule::{BlogId, Schedule, ScheduledTime, Weekday};
pub use crate::store::{LocalScheduleStore, MemoryScheduleStore, PromptSettingsStore, ScheduleStore};
pub use cadence_prompts::{PromptSettings, ReminderDays};
