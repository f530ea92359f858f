// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use cadence_prompts::PromptsError;

/// Errors returned by [`crate::SchedulerCoordinator`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    /// Notifications are not authorized. The caller should ask the user for permission and
    /// retry the same commit.
    #[error("push notification permission is required to schedule reminders")]
    NeedsPermissionForPushNotifications,

    /// The scheduler or one of its collaborators could not be constructed.
    #[error("failed to initialize reminders scheduler: {0}")]
    Initialization(String),

    /// The local schedule store is unavailable.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The OS notification scheduler rejected a request.
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

/// Local persistence errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be encoded or decoded.
    #[error("invalid stored value: {0}")]
    Json(#[from] serde_json::Error),

    /// The database path is not usable.
    #[error("invalid database path: {0}")]
    InvalidPath(String),
}

/// OS notification scheduler errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// A request was refused.
    #[error("notification request `{identifier}` rejected: {reason}")]
    Rejected {
        /// Identifier of the refused request.
        identifier: String,
        /// Reason given by the notification center.
        reason: String,
    },

    /// The notification center could not be reached.
    #[error("notification center unavailable: {0}")]
    Unavailable(String),
}

/// Remote prompt settings synchronization errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PromptSyncError {
    /// The remote service call failed.
    #[error("prompt settings sync failed: {0}")]
    Remote(#[from] PromptsError),

    /// The updated settings could not be mirrored locally.
    #[error("failed to mirror prompt settings: {0}")]
    Store(#[from] StoreError),

    /// Any other failure, e.g. from a custom remote implementation.
    #[error("prompt settings sync failed: {0}")]
    Other(String),
}

/// A time of day that is not `HH:MM` or is out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day `{0}`, expected HH:MM")]
pub struct InvalidTimeError(pub String);
