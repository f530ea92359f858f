// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Notification permission handling.

use cadence_core::{AuthorizationStatus, Schedule, SchedulingError, Weekday};

use crate::common::{Harness, blog, mon_thu, nine};

#[tokio::test]
async fn denied_permission_blocks_commit() {
    // Arrange
    let h = Harness::new();
    let x = blog("x");
    h.coordinator.schedule(&x, mon_thu(), nine()).await.unwrap();
    h.gate.set(AuthorizationStatus::Denied);

    // Act
    let err = h
        .coordinator
        .schedule(&x, Schedule::weekdays([Weekday::Monday]), nine())
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(
        err,
        SchedulingError::NeedsPermissionForPushNotifications
    ));
    assert_eq!(h.coordinator.schedule_for(&x), mon_thu());
    assert_eq!(h.requests(&x).await.len(), 2);
}

#[tokio::test]
async fn undetermined_permission_blocks_commit() {
    let h = Harness::new();
    let x = blog("x");
    h.gate.set(AuthorizationStatus::NotDetermined);

    let err = h.coordinator.schedule(&x, mon_thu(), nine()).await.unwrap_err();

    assert!(matches!(
        err,
        SchedulingError::NeedsPermissionForPushNotifications
    ));
    assert_eq!(h.coordinator.schedule_for(&x), Schedule::None);
    assert!(h.requests(&x).await.is_empty());
}

#[tokio::test]
async fn retry_after_grant_succeeds_with_same_input() {
    let h = Harness::new();
    let x = blog("x");
    h.gate.set(AuthorizationStatus::Denied);
    assert!(h.coordinator.schedule(&x, mon_thu(), nine()).await.is_err());

    h.gate.set(AuthorizationStatus::Authorized);
    h.coordinator.schedule(&x, mon_thu(), nine()).await.unwrap();

    assert_eq!(h.coordinator.schedule_for(&x), mon_thu());
    assert_eq!(h.requests(&x).await.len(), 2);
}

#[tokio::test]
async fn provisional_and_ephemeral_permission_allow_commit() {
    let h = Harness::new();
    for (id, status) in [
        ("p", AuthorizationStatus::Provisional),
        ("e", AuthorizationStatus::Ephemeral),
    ] {
        h.gate.set(status);
        let b = blog(id);
        h.coordinator.schedule(&b, mon_thu(), nine()).await.unwrap();
        assert_eq!(h.requests(&b).await.len(), 2);
    }
}

#[tokio::test]
async fn turning_off_needs_no_permission() {
    let h = Harness::new();
    let x = blog("x");
    h.coordinator.schedule(&x, mon_thu(), nine()).await.unwrap();
    h.gate.set(AuthorizationStatus::Denied);

    h.coordinator.schedule(&x, Schedule::None, nine()).await.unwrap();

    assert_eq!(h.coordinator.schedule_for(&x), Schedule::None);
    assert!(h.requests(&x).await.is_empty());
}

#[tokio::test]
async fn refresh_prunes_requests_when_permission_revoked() {
    let h = Harness::new();
    let x = blog("x");
    h.coordinator.schedule(&x, mon_thu(), nine()).await.unwrap();

    h.gate.set(AuthorizationStatus::Denied);
    let status = h.coordinator.refresh_authorization(&x).await.unwrap();

    assert_eq!(status, AuthorizationStatus::Denied);
    assert!(h.requests(&x).await.is_empty());
    // the stored schedule survives
    assert_eq!(h.coordinator.schedule_for(&x), mon_thu());
}

#[tokio::test]
async fn refresh_restores_requests_when_permission_granted_again() {
    let h = Harness::new();
    let x = blog("x");
    h.coordinator.schedule(&x, mon_thu(), nine()).await.unwrap();
    h.gate.set(AuthorizationStatus::Denied);
    h.coordinator.refresh_authorization(&x).await.unwrap();

    h.gate.set(AuthorizationStatus::Authorized);
    let status = h.coordinator.refresh_authorization(&x).await.unwrap();

    assert_eq!(status, AuthorizationStatus::Authorized);
    assert_eq!(
        h.reminder_days(&x).await,
        vec![Weekday::Monday, Weekday::Thursday]
    );
}

#[tokio::test]
async fn refresh_without_schedule_is_a_no_op() {
    let h = Harness::new();
    let x = blog("x");
    h.gate.set(AuthorizationStatus::Denied);

    let status = h.coordinator.refresh_authorization(&x).await.unwrap();

    assert_eq!(status, AuthorizationStatus::Denied);
    assert!(h.requests(&x).await.is_empty());
}
