// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use cadence_prompts::PromptSettings;

use crate::error::StoreError;
use crate::localdb::{LocalDb, PromptSettingsRecord, ReminderRecord};
use crate::schedule::{BlogId, Schedule, ScheduledTime};

/// Persists the reminder schedule of each blog.
///
/// Reads never fail: a blog without stored state reads as [`Schedule::None`] at the store's
/// default time. A write replaces the (schedule, time) pair atomically, so readers never see
/// the schedule of one write with the time of another.
///
/// Writing is split in two steps. [`persist`](Self::persist) makes the pair durable and
/// [`publish`](Self::publish) makes it visible to readers, so a caller can hold a new pair
/// back until its side effects succeeded.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// The stored schedule of the blog.
    fn schedule(&self, blog: &BlogId) -> Schedule;

    /// The stored reminder time of the blog.
    fn scheduled_time(&self, blog: &BlogId) -> ScheduledTime;

    /// Durably stores the schedule and time of the blog without changing what readers see.
    async fn persist(
        &self,
        blog: &BlogId,
        schedule: &Schedule,
        time: ScheduledTime,
    ) -> Result<(), StoreError>;

    /// Makes the schedule and time of the blog visible to readers. The schedule is
    /// normalized first.
    fn publish(&self, blog: &BlogId, schedule: &Schedule, time: ScheduledTime);

    /// Persists and publishes the schedule and time of the blog.
    async fn write(
        &self,
        blog: &BlogId,
        schedule: &Schedule,
        time: ScheduledTime,
    ) -> Result<(), StoreError> {
        self.persist(blog, schedule, time).await?;
        self.publish(blog, schedule, time);
        Ok(())
    }

    /// Whether the "set up reminders" flow was already offered for the blog.
    fn has_shown_flow(&self, blog: &BlogId) -> bool;

    /// Records that the "set up reminders" flow was offered for the blog.
    async fn mark_flow_shown(&self, blog: &BlogId) -> Result<(), StoreError>;
}

/// Local mirror of the remote prompt settings of each blog.
#[async_trait]
pub trait PromptSettingsStore: Send + Sync {
    /// The mirrored settings, or `None` if prompts are not available for the blog.
    fn prompt_settings(&self, blog: &BlogId) -> Option<PromptSettings>;

    /// Replaces the mirrored settings; `None` removes the entry.
    async fn write_prompt_settings(
        &self,
        blog: &BlogId,
        settings: Option<&PromptSettings>,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct Cache {
    reminders: HashMap<BlogId, (Schedule, ScheduledTime)>,
    shown: HashSet<BlogId>,
    prompts: HashMap<BlogId, PromptSettings>,
}

#[derive(Debug, Default)]
struct SharedCache(RwLock<Cache>);

impl SharedCache {
    fn read(&self) -> RwLockReadGuard<'_, Cache> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cache> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule(&self, blog: &BlogId) -> Schedule {
        self.read()
            .reminders
            .get(blog)
            .map(|(schedule, _)| schedule.clone())
            .unwrap_or_default()
    }

    fn scheduled_time(&self, blog: &BlogId, default: ScheduledTime) -> ScheduledTime {
        self.read()
            .reminders
            .get(blog)
            .map_or(default, |(_, time)| *time)
    }

    fn set_reminders(&self, blog: &BlogId, schedule: Schedule, time: ScheduledTime) {
        self.write().reminders.insert(blog.clone(), (schedule, time));
    }

    fn has_shown_flow(&self, blog: &BlogId) -> bool {
        self.read().shown.contains(blog)
    }

    fn mark_flow_shown(&self, blog: &BlogId) {
        self.write().shown.insert(blog.clone());
    }

    fn prompt_settings(&self, blog: &BlogId) -> Option<PromptSettings> {
        self.read().prompts.get(blog).cloned()
    }

    fn set_prompt_settings(&self, blog: &BlogId, settings: Option<&PromptSettings>) {
        let mut cache = self.write();
        match settings {
            Some(settings) => cache.prompts.insert(blog.clone(), settings.clone()),
            None => cache.prompts.remove(blog),
        };
    }
}

/// Process-local store. State is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryScheduleStore {
    cache: SharedCache,
    default_time: ScheduledTime,
}

impl MemoryScheduleStore {
    /// Creates an empty store reading unset times as `default_time`.
    pub fn new(default_time: ScheduledTime) -> Self {
        Self {
            cache: SharedCache::default(),
            default_time,
        }
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    fn schedule(&self, blog: &BlogId) -> Schedule {
        self.cache.schedule(blog)
    }

    fn scheduled_time(&self, blog: &BlogId) -> ScheduledTime {
        self.cache.scheduled_time(blog, self.default_time)
    }

    async fn persist(
        &self,
        _blog: &BlogId,
        _schedule: &Schedule,
        _time: ScheduledTime,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn publish(&self, blog: &BlogId, schedule: &Schedule, time: ScheduledTime) {
        self.cache
            .set_reminders(blog, schedule.clone().normalized(), time);
    }

    fn has_shown_flow(&self, blog: &BlogId) -> bool {
        self.cache.has_shown_flow(blog)
    }

    async fn mark_flow_shown(&self, blog: &BlogId) -> Result<(), StoreError> {
        self.cache.mark_flow_shown(blog);
        Ok(())
    }
}

#[async_trait]
impl PromptSettingsStore for MemoryScheduleStore {
    fn prompt_settings(&self, blog: &BlogId) -> Option<PromptSettings> {
        self.cache.prompt_settings(blog)
    }

    async fn write_prompt_settings(
        &self,
        blog: &BlogId,
        settings: Option<&PromptSettings>,
    ) -> Result<(), StoreError> {
        self.cache.set_prompt_settings(blog, settings);
        Ok(())
    }
}

/// Store persisted in the local sqlite database.
///
/// All rows are loaded when the store is opened, so reads are served from memory. Reminder
/// pairs reach the in-memory state only when published.
#[derive(Debug)]
pub struct LocalScheduleStore {
    db: LocalDb,
    cache: SharedCache,
    default_time: ScheduledTime,
}

impl LocalScheduleStore {
    /// Opens the store over the given database and loads its state.
    pub async fn open(db: LocalDb, default_time: ScheduledTime) -> Result<Self, StoreError> {
        let mut cache = Cache::default();

        for record in db.reminders.list().await? {
            let time = record.time().unwrap_or_else(|| {
                tracing::warn!(blog = %record.blog, hour = record.hour, minute = record.minute, "invalid stored reminder time, using default");
                default_time
            });
            cache
                .reminders
                .insert(BlogId::from(record.blog.as_str()), (record.schedule(), time));
        }

        cache.shown = db
            .flow_flags
            .list_shown()
            .await?
            .into_iter()
            .map(BlogId::from)
            .collect();

        for record in db.prompt_settings.list().await? {
            match record.to_settings() {
                Ok(settings) => {
                    cache
                        .prompts
                        .insert(BlogId::from(record.blog.as_str()), settings);
                }
                Err(err) => {
                    tracing::warn!(blog = %record.blog, %err, "skipping unreadable prompt settings");
                }
            }
        }

        tracing::debug!(
            reminders = cache.reminders.len(),
            prompts = cache.prompts.len(),
            "loaded reminder state"
        );
        Ok(Self {
            db,
            cache: SharedCache(RwLock::new(cache)),
            default_time,
        })
    }

    /// The underlying database.
    pub fn db(&self) -> &LocalDb {
        &self.db
    }
}

#[async_trait]
impl ScheduleStore for LocalScheduleStore {
    fn schedule(&self, blog: &BlogId) -> Schedule {
        self.cache.schedule(blog)
    }

    fn scheduled_time(&self, blog: &BlogId) -> ScheduledTime {
        self.cache.scheduled_time(blog, self.default_time)
    }

    async fn persist(
        &self,
        blog: &BlogId,
        schedule: &Schedule,
        time: ScheduledTime,
    ) -> Result<(), StoreError> {
        let record = ReminderRecord::from(blog, &schedule.clone().normalized(), time);
        self.db.reminders.upsert(&record).await?;
        Ok(())
    }

    fn publish(&self, blog: &BlogId, schedule: &Schedule, time: ScheduledTime) {
        self.cache
            .set_reminders(blog, schedule.clone().normalized(), time);
    }

    fn has_shown_flow(&self, blog: &BlogId) -> bool {
        self.cache.has_shown_flow(blog)
    }

    async fn mark_flow_shown(&self, blog: &BlogId) -> Result<(), StoreError> {
        self.db.flow_flags.mark_shown(blog.as_str()).await?;
        self.cache.mark_flow_shown(blog);
        Ok(())
    }
}

#[async_trait]
impl PromptSettingsStore for LocalScheduleStore {
    fn prompt_settings(&self, blog: &BlogId) -> Option<PromptSettings> {
        self.cache.prompt_settings(blog)
    }

    async fn write_prompt_settings(
        &self,
        blog: &BlogId,
        settings: Option<&PromptSettings>,
    ) -> Result<(), StoreError> {
        match settings {
            Some(settings) => {
                let record = PromptSettingsRecord::from_settings(blog.as_str(), settings)?;
                self.db.prompt_settings.upsert(&record).await?;
            }
            None => self.db.prompt_settings.delete(blog.as_str()).await?,
        }
        self.cache.set_prompt_settings(blog, settings);
        Ok(())
    }
}
