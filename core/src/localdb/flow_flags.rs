// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

/// Whether the "set up reminders" flow was already offered for a blog.
#[derive(Debug, Clone)]
pub struct FlowFlags {
    pool: SqlitePool,
}

impl FlowFlags {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn mark_shown(&self, blog: &str) -> Result<(), sqlx::Error> {
        const SQL: &str = "\
INSERT INTO flow_flags (blog, shown) VALUES (?, 1)
ON CONFLICT(blog) DO UPDATE SET shown = excluded.shown;
";

        sqlx::query(SQL).bind(blog).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn list_shown(&self) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT blog FROM flow_flags WHERE shown = 1 ORDER BY blog")
            .fetch_all(&self.pool)
            .await
    }
}
