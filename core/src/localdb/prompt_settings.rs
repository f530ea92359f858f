// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use cadence_prompts::PromptSettings;
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct PromptSettingsTable {
    pool: SqlitePool,
}

impl PromptSettingsTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, record: &PromptSettingsRecord) -> Result<(), sqlx::Error> {
        const SQL: &str = "\
INSERT INTO prompt_settings (blog, enabled, reminder_days, reminder_time)
VALUES (?, ?, ?, ?)
ON CONFLICT(blog) DO UPDATE SET
    enabled       = excluded.enabled,
    reminder_days = excluded.reminder_days,
    reminder_time = excluded.reminder_time;
";

        sqlx::query(SQL)
            .bind(&record.blog)
            .bind(record.enabled)
            .bind(&record.reminder_days)
            .bind(&record.reminder_time)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, blog: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM prompt_settings WHERE blog = ?")
            .bind(blog)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<PromptSettingsRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT blog, enabled, reminder_days, reminder_time
FROM prompt_settings
ORDER BY blog;
";

        sqlx::query_as(SQL).fetch_all(&self.pool).await
    }
}

/// One row of the `prompt_settings` table. Reminder days are kept as JSON.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PromptSettingsRecord {
    pub blog: String,
    pub enabled: bool,
    pub reminder_days: String,
    pub reminder_time: String,
}

impl PromptSettingsRecord {
    pub fn from_settings(blog: &str, settings: &PromptSettings) -> Result<Self, serde_json::Error> {
        Ok(Self {
            blog: blog.to_string(),
            enabled: settings.enabled,
            reminder_days: serde_json::to_string(&settings.reminder_days)?,
            reminder_time: settings.reminder_time.clone(),
        })
    }

    pub fn to_settings(&self) -> Result<PromptSettings, serde_json::Error> {
        Ok(PromptSettings {
            enabled: self.enabled,
            reminder_days: serde_json::from_str(&self.reminder_days)?,
            reminder_time: self.reminder_time.clone(),
        })
    }
}
