// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Fake collaborators with switchable failures.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;
use cadence_core::{
    BlogId, InMemoryNotificationCenter, MemoryScheduleStore, NotificationCenter,
    NotificationError, NotificationRequest, PromptSettings, PromptSettingsRemote, PromptSyncError,
    Schedule, ScheduleStore, ScheduledTime, StoreError,
};

/// Notification center that can be told to reject new requests.
#[derive(Debug, Default)]
pub struct FailingNotificationCenter {
    inner: InMemoryNotificationCenter,
    fail: AtomicBool,
}

impl FailingNotificationCenter {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationCenter for FailingNotificationCenter {
    async fn add(&self, request: NotificationRequest) -> Result<(), NotificationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::Rejected {
                identifier: request.identifier,
                reason: "quota exceeded".to_string(),
            });
        }
        self.inner.add(request).await
    }

    async fn remove_pending(&self, identifiers: &[String]) {
        self.inner.remove_pending(identifiers).await;
    }

    async fn pending_requests(&self) -> Vec<NotificationRequest> {
        self.inner.pending_requests().await
    }
}

/// Notification center that blocks in `add` until released, then reports itself unavailable.
#[derive(Debug, Default)]
pub struct StallingNotificationCenter {
    inner: InMemoryNotificationCenter,
    entered: Notify,
    release: Notify,
}

impl StallingNotificationCenter {
    /// Waits until a request is being added.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Lets the blocked request fail.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl NotificationCenter for StallingNotificationCenter {
    async fn add(&self, _request: NotificationRequest) -> Result<(), NotificationError> {
        self.entered.notify_one();
        self.release.notified().await;
        Err(NotificationError::Unavailable(
            "notification center stalled".to_string(),
        ))
    }

    async fn remove_pending(&self, identifiers: &[String]) {
        self.inner.remove_pending(identifiers).await;
    }

    async fn pending_requests(&self) -> Vec<NotificationRequest> {
        self.inner.pending_requests().await
    }
}

/// Schedule store whose writes can be made to fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryScheduleStore,
    fail: AtomicBool,
}

impl FailingStore {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScheduleStore for FailingStore {
    fn schedule(&self, blog: &BlogId) -> Schedule {
        self.inner.schedule(blog)
    }

    fn scheduled_time(&self, blog: &BlogId) -> ScheduledTime {
        self.inner.scheduled_time(blog)
    }

    async fn persist(
        &self,
        blog: &BlogId,
        schedule: &Schedule,
        time: ScheduledTime,
    ) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::InvalidPath("store is read-only".to_string()));
        }
        self.inner.persist(blog, schedule, time).await
    }

    fn publish(&self, blog: &BlogId, schedule: &Schedule, time: ScheduledTime) {
        self.inner.publish(blog, schedule, time);
    }

    fn has_shown_flow(&self, blog: &BlogId) -> bool {
        self.inner.has_shown_flow(blog)
    }

    async fn mark_flow_shown(&self, blog: &BlogId) -> Result<(), StoreError> {
        self.inner.mark_flow_shown(blog).await
    }
}

/// Remote prompt settings service that records updates.
#[derive(Debug, Default)]
pub struct FakeRemote {
    fail: AtomicBool,
    remote: Mutex<Option<PromptSettings>>,
    updates: Mutex<Vec<PromptSettings>>,
}

impl FakeRemote {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_remote(&self, settings: PromptSettings) {
        *self.remote.lock().unwrap() = Some(settings);
    }

    pub fn updates(&self) -> Vec<PromptSettings> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl PromptSettingsRemote for FakeRemote {
    async fn fetch_settings(&self, _blog: &BlogId) -> Result<PromptSettings, PromptSyncError> {
        self.remote
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PromptSyncError::Other("no settings".to_string()))
    }

    async fn update_settings(
        &self,
        _blog: &BlogId,
        settings: &PromptSettings,
    ) -> Result<Option<PromptSettings>, PromptSyncError> {
        self.updates.lock().unwrap().push(settings.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(PromptSyncError::Other("network unreachable".to_string()));
        }
        *self.remote.lock().unwrap() = Some(settings.clone());
        Ok(Some(settings.clone()))
    }
}
