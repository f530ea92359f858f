// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

/// OS-level push notification authorization status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorizationStatus {
    /// The user has not been asked yet.
    #[default]
    NotDetermined,

    /// The user refused notifications.
    Denied,

    /// Notifications are allowed.
    Authorized,

    /// Notifications are delivered quietly until the user decides.
    Provisional,

    /// Temporary authorization, e.g. for an app clip.
    Ephemeral,
}

impl AuthorizationStatus {
    /// Returns true if scheduled notifications will be delivered.
    pub const fn is_granted(self) -> bool {
        matches!(
            self,
            AuthorizationStatus::Authorized
                | AuthorizationStatus::Provisional
                | AuthorizationStatus::Ephemeral
        )
    }
}

/// Queries the OS for the notification authorization status.
///
/// Implementations only report the status; asking the user for permission is left to the UI.
/// The gate is polled whenever a decision is needed, never subscribed to.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Returns the current authorization status.
    async fn current_authorization_status(&self) -> AuthorizationStatus;
}

/// A gate whose status is pushed in by the host, e.g. after the platform permission callback.
#[derive(Debug, Default)]
pub struct ManualPermissionGate {
    status: RwLock<AuthorizationStatus>,
}

impl ManualPermissionGate {
    /// Creates a gate reporting the given status.
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            status: RwLock::new(status),
        }
    }

    /// Updates the reported status.
    pub fn set(&self, status: AuthorizationStatus) {
        tracing::debug!(?status, "notification authorization status changed");
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

#[async_trait]
impl PermissionGate for ManualPermissionGate {
    async fn current_authorization_status(&self) -> AuthorizationStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }
}
