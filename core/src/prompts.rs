// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use cadence_prompts::{PromptSettings, PromptsClient, ReminderDays, SiteId};

use crate::error::PromptSyncError;
use crate::schedule::{BlogId, Schedule, ScheduledTime};
use crate::store::PromptSettingsStore;

/// Remote service holding the blogging prompt settings of each blog.
#[async_trait]
pub trait PromptSettingsRemote: Send + Sync {
    /// Fetches the current remote settings.
    async fn fetch_settings(&self, blog: &BlogId) -> Result<PromptSettings, PromptSyncError>;

    /// Pushes new settings. Returns the settings as stored remotely, or `None` if the
    /// service accepted the call without reporting a change.
    async fn update_settings(
        &self,
        blog: &BlogId,
        settings: &PromptSettings,
    ) -> Result<Option<PromptSettings>, PromptSyncError>;
}

#[async_trait]
impl PromptSettingsRemote for PromptsClient {
    async fn fetch_settings(&self, blog: &BlogId) -> Result<PromptSettings, PromptSyncError> {
        let site = SiteId::from(blog.as_str());
        Ok(PromptsClient::fetch_settings(self, &site).await?)
    }

    async fn update_settings(
        &self,
        blog: &BlogId,
        settings: &PromptSettings,
    ) -> Result<Option<PromptSettings>, PromptSyncError> {
        let site = SiteId::from(blog.as_str());
        Ok(PromptsClient::update_settings(self, &site, settings).await?)
    }
}

/// Sync state of the prompt settings of a blog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptSyncState {
    /// Nothing staged since the bridge was created.
    #[default]
    Idle,
    /// A speculative local write is waiting for the remote sync.
    Staged,
    /// The last staged value reached the remote service.
    Synced,
    /// The last staged value was reverted.
    RolledBack,
}

/// Snapshot of the mirrored prompt settings taken before a speculative write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackToken {
    blog: BlogId,
    previous: PromptSettings,
    staged: PromptSettings,
}

impl RollbackToken {
    /// The blog the token belongs to.
    pub fn blog(&self) -> &BlogId {
        &self.blog
    }

    /// The value restored on rollback.
    pub fn previous(&self) -> &PromptSettings {
        &self.previous
    }

    /// The speculatively written value.
    pub fn staged(&self) -> &PromptSettings {
        &self.staged
    }
}

/// Derives prompt settings from a reminder schedule.
pub fn prompt_settings_for(
    schedule: &Schedule,
    time: ScheduledTime,
    enabled: bool,
) -> PromptSettings {
    let mut days = [false; 7];
    for day in schedule.days() {
        days[day.monday_index()] = true;
    }

    PromptSettings {
        enabled,
        reminder_days: ReminderDays::from_array(days),
        reminder_time: time.to_prompt_time(),
    }
}

/// Mirrors reminder selections into the blogging prompt settings and syncs them to the
/// remote service.
///
/// Updates are speculative: [`PromptSettingsBridge::stage_update`] writes the new value to
/// the local mirror and returns a [`RollbackToken`], then the remote call either confirms it
/// or the token is used to restore the previous value.
pub struct PromptSettingsBridge {
    remote: Arc<dyn PromptSettingsRemote>,
    store: Arc<dyn PromptSettingsStore>,
    feature_enabled: bool,
    states: Mutex<HashMap<BlogId, PromptSyncState>>,
}

impl PromptSettingsBridge {
    /// Creates a bridge. With `feature_enabled` false no update is ever staged.
    pub fn new(
        remote: Arc<dyn PromptSettingsRemote>,
        store: Arc<dyn PromptSettingsStore>,
        feature_enabled: bool,
    ) -> Self {
        Self {
            remote,
            store,
            feature_enabled,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Prompts are available once the feature is on and settings were mirrored for the blog.
    pub fn is_available(&self, blog: &BlogId) -> bool {
        self.feature_enabled && self.store.prompt_settings(blog).is_some()
    }

    /// The mirrored settings of the blog.
    pub fn current(&self, blog: &BlogId) -> Option<PromptSettings> {
        self.store.prompt_settings(blog)
    }

    /// The sync state of the blog.
    pub fn state(&self, blog: &BlogId) -> PromptSyncState {
        let states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.get(blog).copied().unwrap_or_default()
    }

    fn set_state(&self, blog: &BlogId, state: PromptSyncState) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.insert(blog.clone(), state);
    }

    /// Speculatively writes the settings derived from the schedule to the local mirror.
    ///
    /// Returns `None` when nothing was written: prompts are unavailable for the blog, or the
    /// prompt toggle is off and was already off.
    pub async fn stage_update(
        &self,
        blog: &BlogId,
        schedule: &Schedule,
        time: ScheduledTime,
        enabled: bool,
    ) -> Option<RollbackToken> {
        if !self.feature_enabled {
            return None;
        }
        let previous = self.store.prompt_settings(blog)?;
        if !enabled && !previous.enabled {
            return None;
        }

        let staged = prompt_settings_for(schedule, time, enabled);
        if let Err(err) = self.store.write_prompt_settings(blog, Some(&staged)).await {
            tracing::warn!(blog = %blog, %err, "failed to stage prompt settings");
            return None;
        }

        tracing::debug!(blog = %blog, enabled, time = %staged.reminder_time, "staged prompt settings");
        self.set_state(blog, PromptSyncState::Staged);
        Some(RollbackToken {
            blog: blog.clone(),
            previous,
            staged,
        })
    }

    /// Pushes the staged value to the remote service.
    ///
    /// On success the value reported back by the service, if any, replaces the mirror. On
    /// failure the caller is expected to [`rollback`](Self::rollback).
    pub async fn commit_remote(&self, token: &RollbackToken) -> Result<(), PromptSyncError> {
        let updated = self
            .remote
            .update_settings(&token.blog, &token.staged)
            .await?;

        if let Some(updated) = updated {
            self.store
                .write_prompt_settings(&token.blog, Some(&updated))
                .await?;
        }

        self.set_state(&token.blog, PromptSyncState::Synced);
        Ok(())
    }

    /// Restores the value captured in the token.
    ///
    /// The mirror is left alone if it no longer holds the staged value, i.e. a later update
    /// has replaced it.
    pub async fn rollback(&self, token: RollbackToken) {
        let blog = &token.blog;
        if self.store.prompt_settings(blog).as_ref() != Some(&token.staged) {
            tracing::debug!(blog = %blog, "prompt settings changed since staging, skip rollback");
            return;
        }

        match self
            .store
            .write_prompt_settings(blog, Some(&token.previous))
            .await
        {
            Ok(()) => {
                tracing::warn!(blog = %blog, "rolled back prompt settings");
                self.set_state(blog, PromptSyncState::RolledBack);
            }
            Err(err) => {
                tracing::error!(blog = %blog, %err, "failed to roll back prompt settings");
            }
        }
    }

    /// Pushes the staged value, rolling back on failure. Failures are logged, not returned.
    pub async fn sync(self: Arc<Self>, token: RollbackToken) -> PromptSyncState {
        let blog = token.blog.clone();
        match self.commit_remote(&token).await {
            Ok(()) => tracing::debug!(blog = %blog, "prompt settings synced"),
            Err(err) => {
                tracing::warn!(blog = %blog, %err, "prompt settings sync failed");
                self.rollback(token).await;
            }
        }
        self.state(&blog)
    }

    /// Fetches the remote settings of the blog into the local mirror.
    pub async fn refresh(&self, blog: &BlogId) -> Result<PromptSettings, PromptSyncError> {
        let settings = self.remote.fetch_settings(blog).await?;
        self.store.write_prompt_settings(blog, Some(&settings)).await?;
        tracing::debug!(blog = %blog, enabled = settings.enabled, "refreshed prompt settings");
        Ok(settings)
    }
}
