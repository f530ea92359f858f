// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

use crate::schedule::{BlogId, Schedule, ScheduledTime};

#[derive(Debug, Clone)]
pub struct Reminders {
    pool: SqlitePool,
}

impl Reminders {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, record: &ReminderRecord) -> Result<(), sqlx::Error> {
        const SQL: &str = "\
INSERT INTO reminders (blog, has_reminders, weekdays, hour, minute)
VALUES (?, ?, ?, ?, ?)
ON CONFLICT(blog) DO UPDATE SET
    has_reminders = excluded.has_reminders,
    weekdays      = excluded.weekdays,
    hour          = excluded.hour,
    minute        = excluded.minute;
";

        sqlx::query(SQL)
            .bind(&record.blog)
            .bind(record.has_reminders)
            .bind(record.weekdays)
            .bind(record.hour)
            .bind(record.minute)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[cfg(test)]
    pub async fn get(&self, blog: &str) -> Result<Option<ReminderRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT blog, has_reminders, weekdays, hour, minute
FROM reminders
WHERE blog = ?;
";

        sqlx::query_as(SQL)
            .bind(blog)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list(&self) -> Result<Vec<ReminderRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT blog, has_reminders, weekdays, hour, minute
FROM reminders
ORDER BY blog;
";

        sqlx::query_as(SQL).fetch_all(&self.pool).await
    }
}

/// One row of the `reminders` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ReminderRecord {
    pub blog: String,
    pub has_reminders: bool,
    /// Bit `n` is set for the weekday of ordinal `n`.
    pub weekdays: i64,
    pub hour: i64,
    pub minute: i64,
}

impl ReminderRecord {
    pub fn from(blog: &BlogId, schedule: &Schedule, time: ScheduledTime) -> Self {
        Self {
            blog: blog.to_string(),
            has_reminders: !schedule.is_none(),
            weekdays: i64::from(schedule.to_bits()),
            hour: i64::from(time.hour()),
            minute: i64::from(time.minute()),
        }
    }

    pub fn schedule(&self) -> Schedule {
        if !self.has_reminders {
            return Schedule::None;
        }
        Schedule::from_bits(u8::try_from(self.weekdays & 0x7f).unwrap_or_default())
    }

    /// The stored time, or `None` if the row holds an out-of-range value.
    pub fn time(&self) -> Option<ScheduledTime> {
        let hour = i8::try_from(self.hour).ok()?;
        let minute = i8::try_from(self.minute).ok()?;
        ScheduledTime::new(hour, minute)
    }
}
