// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod flow_flags;
mod prompt_settings;
mod reminders;


use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use crate::localdb::flow_flags::FlowFlags;
pub use crate::localdb::prompt_settings::{PromptSettingsRecord, PromptSettingsTable};
pub use crate::localdb::reminders::{ReminderRecord, Reminders};
use crate::error::StoreError;

/// Distinguishes in-memory databases; each open gets its own shared-cache name.
pub(crate) static IN_MEMORY_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Local sqlite database holding reminder state.
#[derive(Debug, Clone)]
pub struct LocalDb {
    pool: SqlitePool,

    pub(crate) reminders: Reminders,
    pub(crate) flow_flags: FlowFlags,
    pub(crate) prompt_settings: PromptSettingsTable,
}

impl LocalDb {
    /// Opens a sqlite database connection.
    /// If `filename` is `None`, it opens an in-memory database.
    pub async fn open(filename: Option<&Path>) -> Result<Self, StoreError> {
        let (options, pool_options) = if let Some(filename) = filename {
            tracing::info!(path = %filename.display(), "connecting to SQLite database");
            let filename = filename
                .to_str()
                .ok_or_else(|| StoreError::InvalidPath(filename.display().to_string()))?;
            let options = SqliteConnectOptions::new()
                .filename(filename)
                .create_if_missing(true);
            (options, SqlitePoolOptions::new())
        } else {
            tracing::info!("connecting to in-memory SQLite database");
            // a single long-lived connection keeps the database alive
            let id = IN_MEMORY_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
            let options = SqliteConnectOptions::new()
                .filename(format!("file:cadence_{id}:?mode=memory&cache=shared"))
                .in_memory(true);
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (options, pool_options)
        };

        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("src/localdb/migrations") // relative path from the crate root
            .run(&pool)
            .await?;

        let reminders = Reminders::new(pool.clone());
        let flow_flags = FlowFlags::new(pool.clone());
        let prompt_settings = PromptSettingsTable::new(pool.clone());
        Ok(LocalDb {
            pool,
            reminders,
            flow_flags,
            prompt_settings,
        })
    }

    /// Closes the connection pool.
    pub async fn close(self) {
        tracing::debug!("closing database connection");
        self.pool.close().await;
    }
}
