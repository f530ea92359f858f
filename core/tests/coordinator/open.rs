// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Coordinators built from configuration: sqlite persistence and the HTTP prompts remote.

use std::sync::Arc;

use cadence_core::{
    AuthorizationStatus, InMemoryNotificationCenter, ManualPermissionGate, NotificationCenter,
    PromptSyncState, Schedule, SchedulerCoordinator, SchedulingError, ScheduledTime, Weekday,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{blog, mon_thu, nine, setup_temp_dirs, test_config};

const SETTINGS_PATH: &str = "/wpcom/v2/sites/x/blogging-prompts/settings";

fn authorized() -> Arc<ManualPermissionGate> {
    Arc::new(ManualPermissionGate::new(AuthorizationStatus::Authorized))
}

#[tokio::test]
async fn open_persists_schedule_across_restarts() {
    // Arrange
    let temp_dirs = setup_temp_dirs().unwrap();
    let config = test_config(&temp_dirs.state_dir, None);
    let center = Arc::new(InMemoryNotificationCenter::new());
    let x = blog("x");

    // Act
    {
        let coordinator =
            SchedulerCoordinator::open(config.clone(), authorized(), center.clone())
                .await
                .unwrap();
        coordinator.schedule(&x, mon_thu(), nine()).await.unwrap();
        coordinator.mark_flow_shown(&x).await.unwrap();
    }
    let coordinator = SchedulerCoordinator::open(config, authorized(), center.clone())
        .await
        .unwrap();

    // Assert
    assert!(temp_dirs.state_dir.join("cadence.db").exists());
    assert_eq!(coordinator.schedule_for(&x), mon_thu());
    assert_eq!(coordinator.scheduled_time_for(&x), nine());
    assert!(coordinator.has_shown_flow(&x));
    assert_eq!(center.pending_requests().await.len(), 2);
}

#[tokio::test]
async fn open_uses_configured_default_time_and_content() {
    let temp_dirs = setup_temp_dirs().unwrap();
    let mut config = test_config(&temp_dirs.state_dir, None);
    config.default_time = Some(ScheduledTime::new(7, 45).unwrap());
    config.notification.title = "Write something".to_string();
    let center = Arc::new(InMemoryNotificationCenter::new());
    let x = blog("x");

    let coordinator = SchedulerCoordinator::open(config, authorized(), center.clone())
        .await
        .unwrap();
    assert_eq!(
        coordinator.scheduled_time_for(&x),
        ScheduledTime::new(7, 45).unwrap()
    );

    let time = coordinator.scheduled_time_for(&x);
    coordinator.schedule(&x, mon_thu(), time).await.unwrap();
    let requests = center.pending_requests().await;
    assert!(requests.iter().all(|r| r.title == "Write something"));
}

#[tokio::test]
async fn open_rejects_invalid_prompts_config() {
    let temp_dirs = setup_temp_dirs().unwrap();
    let config = test_config(&temp_dirs.state_dir, Some(""));
    let center = Arc::new(InMemoryNotificationCenter::new());

    let result = SchedulerCoordinator::open(config, authorized(), center).await;

    assert!(matches!(result, Err(SchedulingError::Initialization(_))));
}

#[tokio::test]
async fn open_syncs_prompts_over_http() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SETTINGS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prompt_reminders_enabled": false,
            "reminders_days": {},
            "reminders_time": "10.00",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SETTINGS_PATH))
        .and(body_partial_json(json!({
            "prompt_reminders_enabled": true,
            "reminders_days": { "monday": true, "thursday": true, "tuesday": false },
            "reminders_time": "09.00",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updated": false })))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dirs = setup_temp_dirs().unwrap();
    let config = test_config(&temp_dirs.state_dir, Some(server.uri().as_str()));
    let center: Arc<dyn NotificationCenter> = Arc::new(InMemoryNotificationCenter::new());
    let coordinator = SchedulerCoordinator::open(config, authorized(), center)
        .await
        .unwrap();
    let x = blog("x");

    // Act
    coordinator.refresh_prompt_settings(&x).await.unwrap();
    let outcome = coordinator
        .schedule_with_prompt(&x, mon_thu(), nine(), Some(true))
        .await
        .unwrap();
    let state = outcome.prompt_sync.unwrap().wait().await;

    // Assert
    assert_eq!(state, Some(PromptSyncState::Synced));
    let mirrored = coordinator.prompt_settings_for(&x).unwrap();
    assert!(mirrored.enabled);
    assert_eq!(mirrored.reminder_time, "09.00");
}

#[tokio::test]
async fn open_rolls_back_prompts_on_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SETTINGS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prompt_reminders_enabled": false,
            "reminders_days": {},
            "reminders_time": "10.00",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SETTINGS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let temp_dirs = setup_temp_dirs().unwrap();
    let config = test_config(&temp_dirs.state_dir, Some(server.uri().as_str()));
    let center = Arc::new(InMemoryNotificationCenter::new());
    let coordinator = SchedulerCoordinator::open(config, authorized(), center)
        .await
        .unwrap();
    let x = blog("x");
    let before = coordinator.refresh_prompt_settings(&x).await.unwrap();

    let outcome = coordinator
        .schedule_with_prompt(
            &x,
            Schedule::weekdays([Weekday::Tuesday]),
            nine(),
            Some(true),
        )
        .await
        .unwrap();
    let state = outcome.prompt_sync.unwrap().wait().await;

    assert_eq!(state, Some(PromptSyncState::RolledBack));
    assert_eq!(coordinator.prompt_settings_for(&x), before);
    assert_eq!(
        coordinator.schedule_for(&x),
        Schedule::weekdays([Weekday::Tuesday])
    );
}
