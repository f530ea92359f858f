// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use cadence_prompts::{PromptSettings, PromptsClient};
use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{PromptSyncError, SchedulingError};
use crate::localdb::LocalDb;
use crate::notification::{
    NotificationCenter, NotificationMaterializer, NotificationRequest, ReminderKind,
};
use crate::permission::{AuthorizationStatus, PermissionGate};
use crate::prompts::{PromptSettingsBridge, PromptSyncState};
use crate::schedule::{BlogId, Schedule, ScheduledTime};
use crate::store::{LocalScheduleStore, ScheduleStore};

const DB_NAME: &str = "cadence.db";

type CommitLocks = Mutex<HashMap<BlogId, Arc<tokio::sync::Mutex<()>>>>;

/// Holds the commit lock of a blog. The lock is removed from the map when its last holder
/// releases it.
struct CommitGuard<'a> {
    locks: &'a CommitLocks,
    blog: BlogId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        self.guard.take();
        if locks
            .get(&self.blog)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.blog);
        }
    }
}

/// Result of a successful commit.
#[derive(Debug)]
pub struct ScheduleOutcome {
    /// The remote prompt settings sync started by the commit, if any. It runs in the
    /// background whether or not the handle is kept.
    pub prompt_sync: Option<PromptSyncHandle>,
}

/// Handle to a background prompt settings sync.
#[derive(Debug)]
pub struct PromptSyncHandle(JoinHandle<PromptSyncState>);

impl PromptSyncHandle {
    /// Waits for the sync to finish. Returns `None` if the task was aborted or panicked.
    pub async fn wait(self) -> Option<PromptSyncState> {
        self.0.await.ok()
    }
}

/// The entry point of the reminders engine.
///
/// A commit runs the steps permission check, store write, notification materialization and
/// finally the prompt settings sync, in that order. Commits for the same blog are serialized;
/// commits for different blogs run concurrently.
pub struct SchedulerCoordinator {
    gate: Arc<dyn PermissionGate>,
    store: Arc<dyn ScheduleStore>,
    materializer: NotificationMaterializer,
    prompts: Option<Arc<PromptSettingsBridge>>,
    locks: CommitLocks,
}

impl SchedulerCoordinator {
    /// Creates a coordinator without prompt settings sync.
    pub fn new(
        gate: Arc<dyn PermissionGate>,
        store: Arc<dyn ScheduleStore>,
        materializer: NotificationMaterializer,
    ) -> Self {
        Self {
            gate,
            store,
            materializer,
            prompts: None,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Enables prompt settings sync through the given bridge.
    #[must_use]
    pub fn with_prompts(mut self, bridge: Arc<PromptSettingsBridge>) -> Self {
        self.prompts = Some(bridge);
        self
    }

    /// Builds a coordinator from the configuration, backed by the sqlite store in the state
    /// directory.
    pub async fn open(
        mut config: Config,
        gate: Arc<dyn PermissionGate>,
        center: Arc<dyn NotificationCenter>,
    ) -> Result<Self, SchedulingError> {
        config
            .normalize()
            .map_err(|e| SchedulingError::Initialization(e.to_string()))?;

        let db_path = match &config.state_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    SchedulingError::Initialization(format!(
                        "failed to create state directory {}: {e}",
                        dir.display()
                    ))
                })?;
                Some(dir.join(DB_NAME))
            }
            None => None,
        };

        let db = LocalDb::open(db_path.as_deref())
            .await
            .map_err(|e| SchedulingError::Initialization(e.to_string()))?;
        let store = Arc::new(
            LocalScheduleStore::open(db, config.default_time())
                .await
                .map_err(|e| SchedulingError::Initialization(e.to_string()))?,
        );

        let materializer = NotificationMaterializer::new(center, config.notification.clone());
        let coordinator = Self::new(gate, store.clone(), materializer);

        match config.prompts {
            Some(section) => {
                let client = PromptsClient::new(section.remote)
                    .map_err(|e| SchedulingError::Initialization(e.to_string()))?;
                tracing::debug!(enabled = section.enabled, "prompt settings sync configured");
                let bridge = PromptSettingsBridge::new(Arc::new(client), store, section.enabled);
                Ok(coordinator.with_prompts(Arc::new(bridge)))
            }
            None => Ok(coordinator),
        }
    }

    async fn lock_blog(&self, blog: &BlogId) -> CommitGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(blog.clone()).or_default().clone()
        };
        let guard = lock.lock_owned().await;
        CommitGuard {
            locks: &self.locks,
            blog: blog.clone(),
            guard: Some(guard),
        }
    }

    /// Prompt reminders replace blogging reminders while the blog's prompt toggle is on.
    fn reminder_kind(&self, blog: &BlogId) -> ReminderKind {
        let prompts_on = self.prompts.as_ref().is_some_and(|bridge| {
            bridge.is_available(blog) && bridge.current(blog).is_some_and(|s| s.enabled)
        });
        if prompts_on {
            ReminderKind::Prompt
        } else {
            ReminderKind::Blogging
        }
    }

    /// Commits a schedule for the blog, keeping the blog's current prompt toggle.
    ///
    /// Fails with [`SchedulingError::NeedsPermissionForPushNotifications`] if reminders are
    /// requested but notifications are not authorized; the caller should ask the user and
    /// retry with the same arguments. On any error the stored schedule is left unchanged.
    pub async fn schedule(
        &self,
        blog: &BlogId,
        schedule: Schedule,
        time: ScheduledTime,
    ) -> Result<ScheduleOutcome, SchedulingError> {
        self.schedule_with_prompt(blog, schedule, time, None).await
    }

    /// Commits a schedule for the blog and sets the prompt toggle.
    ///
    /// `include_prompt` of `None` keeps the current toggle. The toggle is always off for an
    /// empty schedule.
    pub async fn schedule_with_prompt(
        &self,
        blog: &BlogId,
        schedule: Schedule,
        time: ScheduledTime,
        include_prompt: Option<bool>,
    ) -> Result<ScheduleOutcome, SchedulingError> {
        let schedule = schedule.normalized();

        let _guard = self.lock_blog(blog).await;
        tracing::debug!(blog = %blog, "acquired commit lock");

        let previous_kind = self.reminder_kind(blog);
        let token = match &self.prompts {
            Some(bridge) => {
                let current = bridge.current(blog).is_some_and(|s| s.enabled);
                let enabled = include_prompt.unwrap_or(current) && !schedule.is_none();
                bridge.stage_update(blog, &schedule, time, enabled).await
            }
            None => None,
        };

        let kind = match &token {
            Some(token) if token.staged().enabled => ReminderKind::Prompt,
            _ => ReminderKind::Blogging,
        };

        if let Err(err) = self
            .commit_locally(blog, &schedule, time, kind, previous_kind)
            .await
        {
            if let (Some(bridge), Some(token)) = (&self.prompts, token) {
                bridge.rollback(token).await;
            }
            return Err(err);
        }

        tracing::info!(blog = %blog, ?schedule, %time, ?kind, "reminders scheduled");
        let prompt_sync = match (&self.prompts, token) {
            (Some(bridge), Some(token)) => Some(PromptSyncHandle(tokio::spawn(
                bridge.clone().sync(token),
            ))),
            _ => None,
        };
        Ok(ScheduleOutcome { prompt_sync })
    }

    async fn commit_locally(
        &self,
        blog: &BlogId,
        schedule: &Schedule,
        time: ScheduledTime,
        kind: ReminderKind,
        previous_kind: ReminderKind,
    ) -> Result<(), SchedulingError> {
        if !schedule.is_none() {
            let status = self.gate.current_authorization_status().await;
            if !status.is_granted() {
                tracing::debug!(blog = %blog, ?status, "notifications not authorized");
                return Err(SchedulingError::NeedsPermissionForPushNotifications);
            }
        }

        // readers keep seeing the previous pair until the requests are in place
        let previous = (self.store.schedule(blog), self.store.scheduled_time(blog));
        self.store.persist(blog, schedule, time).await?;

        if let Err(err) = self.materializer.commit(blog, schedule, time, kind).await {
            tracing::warn!(blog = %blog, %err, "failed to materialize reminders, restoring previous schedule");
            self.restore(blog, previous, previous_kind).await;
            return Err(err.into());
        }

        self.store.publish(blog, schedule, time);
        Ok(())
    }

    async fn restore(
        &self,
        blog: &BlogId,
        (schedule, time): (Schedule, ScheduledTime),
        kind: ReminderKind,
    ) {
        if let Err(err) = self.store.persist(blog, &schedule, time).await {
            tracing::error!(blog = %blog, %err, "failed to restore previous schedule");
        }
        if let Err(err) = self.materializer.commit(blog, &schedule, time, kind).await {
            tracing::error!(blog = %blog, %err, "failed to restore previous reminders");
        }
    }

    /// Turns reminders off for the blog, including prompt reminders.
    pub async fn unschedule(&self, blog: &BlogId) -> Result<ScheduleOutcome, SchedulingError> {
        let time = self.store.scheduled_time(blog);
        self.schedule_with_prompt(blog, Schedule::None, time, Some(false))
            .await
    }

    /// The stored schedule of the blog.
    pub fn schedule_for(&self, blog: &BlogId) -> Schedule {
        self.store.schedule(blog)
    }

    /// The stored reminder time of the blog.
    pub fn scheduled_time_for(&self, blog: &BlogId) -> ScheduledTime {
        self.store.scheduled_time(blog)
    }

    /// Re-checks notification permission, e.g. when the app returns to the foreground.
    ///
    /// Pending reminders are removed while permission is missing and restored from the
    /// stored schedule once it is granted again. The stored schedule itself is never changed.
    pub async fn refresh_authorization(
        &self,
        blog: &BlogId,
    ) -> Result<AuthorizationStatus, SchedulingError> {
        let status = self.gate.current_authorization_status().await;

        let _guard = self.lock_blog(blog).await;

        let schedule = self.store.schedule(blog);
        if schedule.is_none() {
            return Ok(status);
        }

        if status.is_granted() {
            let time = self.store.scheduled_time(blog);
            let kind = self.reminder_kind(blog);
            self.materializer.commit(blog, &schedule, time, kind).await?;
        } else {
            tracing::info!(blog = %blog, ?status, "notification permission revoked, pruning reminders");
            self.materializer.revoke_all(blog).await;
        }

        Ok(status)
    }

    /// Whether the "set up reminders" flow was already offered for the blog.
    pub fn has_shown_flow(&self, blog: &BlogId) -> bool {
        self.store.has_shown_flow(blog)
    }

    /// Records that the "set up reminders" flow was offered for the blog.
    pub async fn mark_flow_shown(&self, blog: &BlogId) -> Result<(), SchedulingError> {
        Ok(self.store.mark_flow_shown(blog).await?)
    }

    /// Notification requests currently pending for the blog.
    pub async fn pending_reminders(&self, blog: &BlogId) -> Vec<NotificationRequest> {
        self.materializer.pending(blog).await
    }

    /// Whether prompt settings sync is available for the blog.
    pub fn prompts_available(&self, blog: &BlogId) -> bool {
        self.prompts.as_ref().is_some_and(|b| b.is_available(blog))
    }

    /// The mirrored prompt settings of the blog.
    pub fn prompt_settings_for(&self, blog: &BlogId) -> Option<PromptSettings> {
        self.prompts.as_ref().and_then(|b| b.current(blog))
    }

    /// The prompt settings sync state of the blog, if prompts are configured.
    pub fn prompt_sync_state(&self, blog: &BlogId) -> Option<PromptSyncState> {
        self.prompts.as_ref().map(|b| b.state(blog))
    }

    /// Fetches the remote prompt settings of the blog into the local mirror.
    ///
    /// Returns `None` if prompts are not configured.
    pub async fn refresh_prompt_settings(
        &self,
        blog: &BlogId,
    ) -> Result<Option<PromptSettings>, PromptSyncError> {
        match &self.prompts {
            Some(bridge) => bridge.refresh(blog).await.map(Some),
            None => Ok(None),
        }
    }
}
