// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.

use std::path::Path;
use std::sync::Arc;

use cadence_core::{
    AuthorizationStatus, BlogId, Config, ManualPermissionGate, MemoryScheduleStore,
    NotificationContent, NotificationMaterializer, NotificationRequest, PromptSettings,
    PromptSettingsBridge, PromptSettingsStore, PromptsSection, ReminderDays, Schedule,
    SchedulerCoordinator, ScheduledTime, Weekday,
};
use cadence_prompts::PromptsConfig;

use crate::common::fakes::{FailingNotificationCenter, FakeRemote};

/// Creates a blog identifier.
#[must_use]
pub fn blog(id: &str) -> BlogId {
    BlogId::from(id)
}

/// 09:00.
#[must_use]
pub fn nine() -> ScheduledTime {
    ScheduledTime::new(9, 0).unwrap()
}

/// Mondays and Thursdays.
#[must_use]
pub fn mon_thu() -> Schedule {
    Schedule::weekdays([Weekday::Monday, Weekday::Thursday])
}

/// Creates prompt settings on the given Monday-first days at 10.00.
#[must_use]
pub fn prompt_settings(enabled: bool, days: [bool; 7]) -> PromptSettings {
    PromptSettings {
        enabled,
        reminder_days: ReminderDays::from_array(days),
        reminder_time: "10.00".to_string(),
    }
}

/// Creates a test configuration rooted at `state_dir`.
///
/// Prompts are configured when `base_url` is given.
#[must_use]
pub fn test_config(state_dir: &Path, base_url: Option<&str>) -> Config {
    Config {
        state_dir: Some(state_dir.to_path_buf()),
        default_time: None,
        notification: NotificationContent::default(),
        prompts: base_url.map(|url| PromptsSection {
            enabled: true,
            remote: PromptsConfig {
                base_url: url.to_string(),
                timeout_secs: 5,
                ..Default::default()
            },
        }),
    }
}

/// A coordinator wired to in-memory fakes.
pub struct Harness {
    pub gate: Arc<ManualPermissionGate>,
    pub center: Arc<FailingNotificationCenter>,
    pub store: Arc<MemoryScheduleStore>,
    pub remote: Arc<FakeRemote>,
    pub coordinator: SchedulerCoordinator,
}

impl Harness {
    /// Notifications authorized, prompts not configured.
    #[must_use]
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Notifications authorized, prompts configured with a fake remote.
    #[must_use]
    pub fn with_prompts() -> Self {
        Self::build(true)
    }

    fn build(prompts: bool) -> Self {
        let gate = Arc::new(ManualPermissionGate::new(AuthorizationStatus::Authorized));
        let center = Arc::new(FailingNotificationCenter::default());
        let store = Arc::new(MemoryScheduleStore::default());
        let remote = Arc::new(FakeRemote::default());

        let materializer =
            NotificationMaterializer::new(center.clone(), NotificationContent::default());
        let mut coordinator = SchedulerCoordinator::new(gate.clone(), store.clone(), materializer);
        if prompts {
            let bridge = PromptSettingsBridge::new(remote.clone(), store.clone(), true);
            coordinator = coordinator.with_prompts(Arc::new(bridge));
        }

        Self {
            gate,
            center,
            store,
            remote,
            coordinator,
        }
    }

    /// Seeds the local prompt settings mirror, making prompts available for the blog.
    pub async fn mirror_prompts(&self, blog: &BlogId, settings: &PromptSettings) {
        self.store
            .write_prompt_settings(blog, Some(settings))
            .await
            .unwrap();
    }

    /// Pending requests of the blog, sorted by identifier.
    pub async fn requests(&self, blog: &BlogId) -> Vec<NotificationRequest> {
        self.coordinator.pending_reminders(blog).await
    }

    /// Weekdays of the pending requests of the blog.
    pub async fn reminder_days(&self, blog: &BlogId) -> Vec<Weekday> {
        let mut days: Vec<_> = self
            .requests(blog)
            .await
            .into_iter()
            .map(|r| r.trigger.weekday)
            .collect();
        days.sort();
        days
    }
}
