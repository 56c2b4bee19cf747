//! Shared setup for integration tests: a throwaway SQLite file per test and
//! helpers for driving the router with a session cookie.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use quartermaster::api::AppState;
use quartermaster::config::Config;
use quartermaster::domain::{Actor, Role, TrackingMode};
use quartermaster::entities::{departments, item_types};
use quartermaster::services::{NewDepartment, NewItemType, NewUser, UserDto};
use quartermaster::state::SharedState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const SUPER_ADMIN_PHONE: &str = "0500000000";
pub const NEW_PASSWORD: &str = "changed-pass-1";

pub fn test_config() -> Config {
    let db_path = std::env::temp_dir().join(format!(
        "quartermaster-test-{}.db",
        uuid::Uuid::new_v4()
    ));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    config.scheduler.enabled = false;
    config.observability.metrics_enabled = false;
    config.security.argon2_memory_cost_kib = 64;
    config.security.argon2_time_cost = 1;
    config.storefront.token_secret = Some("integration-test-storefront-secret".to_string());
    config
}

pub async fn spawn_shared() -> Arc<SharedState> {
    Arc::new(
        SharedState::new(test_config())
            .await
            .expect("failed to create shared state"),
    )
}

pub async fn spawn_app() -> (Arc<AppState>, Router) {
    let state = quartermaster::api::create_app_state_from_config(test_config(), None)
        .await
        .expect("failed to create app state");
    let router = quartermaster::api::router(state.clone()).await;
    (state, router)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<String>,
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        body,
        cookie,
    }
}

/// Logs in and returns the session cookie.
pub async fn login(app: &Router, phone: &str, password: &str) -> String {
    let response = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "phone": phone, "password": password })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
    response.cookie.expect("login did not set a session cookie")
}

/// Logs in with the initial password and completes the forced change.
pub async fn login_ready(app: &Router, phone: &str) -> String {
    let cookie = login(app, phone, phone).await;
    let response = send(
        app,
        "PUT",
        "/api/auth/password",
        Some(&cookie),
        Some(serde_json::json!({
            "current_password": phone,
            "new_password": NEW_PASSWORD,
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "password change failed: {}", response.body);
    cookie
}

pub async fn base_id(shared: &SharedState) -> i32 {
    shared.org_service.list_bases().await.unwrap()[0].id
}

pub async fn create_department(shared: &SharedState, name: &str) -> departments::Model {
    let base_id = base_id(shared).await;
    shared
        .org_service
        .create_department(
            &Actor::system(),
            NewDepartment {
                base_id,
                name: name.to_string(),
                allow_immediate: true,
                allow_scheduled: true,
                auto_approve_requests: false,
                is_hq: false,
            },
        )
        .await
        .unwrap()
        .department
}

pub async fn create_user(
    shared: &SharedState,
    name: &str,
    phone: &str,
    role: Role,
    department_id: Option<i32>,
    barcode: Option<&str>,
) -> UserDto {
    shared
        .user_service
        .create_user(
            &Actor::system(),
            NewUser {
                name: name.to_string(),
                phone: phone.to_string(),
                role,
                department_id,
                base_id: None,
                barcode: barcode.map(str::to_string),
                department_ids: Vec::new(),
            },
        )
        .await
        .unwrap()
}

pub const fn actor_of(user: &UserDto) -> Actor {
    Actor {
        user_id: Some(user.id),
        role: user.role,
        department_id: user.department_id,
        base_id: user.base_id,
    }
}

pub async fn create_item_type(
    shared: &SharedState,
    department_id: i32,
    name: &str,
    tracking: TrackingMode,
    total_quantity: i32,
    requires_double_approval: bool,
) -> item_types::Model {
    shared
        .catalog_service
        .create_item_type(
            &Actor::system(),
            NewItemType {
                department_id,
                category_id: None,
                name: name.to_string(),
                description: None,
                tracking,
                total_quantity,
                minimum_alert: 2,
                max_loan_days: Some(14),
                requires_double_approval,
            },
        )
        .await
        .unwrap()
}
