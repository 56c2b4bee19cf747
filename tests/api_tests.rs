mod common;

use axum::http::StatusCode;
use common::{NEW_PASSWORD, SUPER_ADMIN_PHONE, login, login_ready, send, spawn_app};
use quartermaster::domain::Role;
use serde_json::json;

#[tokio::test]
async fn test_health_endpoints_are_public() {
    let (_, app) = spawn_app().await;

    let live = send(&app, "GET", "/api/health/live", None, None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body["data"]["status"], "alive");

    let ready = send(&app, "GET", "/api/health/ready", None, None).await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.body["data"]["database"], true);
}

#[tokio::test]
async fn test_protected_routes_require_login() {
    let (_, app) = spawn_app().await;

    for uri in ["/api/dashboard", "/api/requests", "/api/admin/users", "/api/auth/me"] {
        let response = send(&app, "GET", uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(response.body["success"], false);
    }
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let (_, app) = spawn_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "phone": SUPER_ADMIN_PHONE, "password": "nope" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "phone": "0599999999", "password": "0599999999" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forced_password_change_gates_everything_else() {
    let (_, app) = spawn_app().await;

    // Phone formatting is ignored on login.
    let cookie = login(&app, "050-000-0000", SUPER_ADMIN_PHONE).await;

    let me = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["must_change_password"], true);

    let dashboard = send(&app, "GET", "/api/dashboard", Some(&cookie), None).await;
    assert_eq!(dashboard.status, StatusCode::FORBIDDEN);

    let too_short = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&cookie),
        Some(json!({ "current_password": SUPER_ADMIN_PHONE, "new_password": "abc" })),
    )
    .await;
    assert_eq!(too_short.status, StatusCode::BAD_REQUEST);

    let changed = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&cookie),
        Some(json!({ "current_password": SUPER_ADMIN_PHONE, "new_password": NEW_PASSWORD })),
    )
    .await;
    assert_eq!(changed.status, StatusCode::OK);
    assert_eq!(changed.body["data"]["must_change_password"], false);

    let dashboard = send(&app, "GET", "/api/dashboard", Some(&cookie), None).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(dashboard.body["data"]["role"], "super_admin");

    // The old password no longer works.
    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "phone": SUPER_ADMIN_PHONE, "password": SUPER_ADMIN_PHONE })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_by_role() {
    let (state, app) = spawn_app().await;
    let department = common::create_department(&state.shared, "מחלקת קשר").await;
    common::create_user(
        &state.shared,
        "חייל",
        "0521111111",
        Role::Soldier,
        Some(department.id),
        None,
    )
    .await;

    let soldier = login_ready(&app, "0521111111").await;
    let response = send(&app, "GET", "/api/admin/users", Some(&soldier), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = send(&app, "GET", "/api/requests", Some(&soldier), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let admin = login_ready(&app, SUPER_ADMIN_PHONE).await;
    let response = send(&app, "GET", "/api/admin/users", Some(&admin), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (_, app) = spawn_app().await;
    let cookie = login_ready(&app, SUPER_ADMIN_PHONE).await;

    let response = send(&app, "POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(&app, "GET", "/api/dashboard", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_admin_flow() {
    let (_, app) = spawn_app().await;
    let admin = login_ready(&app, SUPER_ADMIN_PHONE).await;

    let departments = send(&app, "GET", "/api/admin/departments", Some(&admin), None).await;
    let department_id = departments.body["data"][0]["id"].as_i64().unwrap();

    let created = send(
        &app,
        "POST",
        "/api/admin/users",
        Some(&admin),
        Some(json!({
            "name": "מפקד מחלקה",
            "phone": "052-222-2222",
            "role": "dept_commander",
            "department_id": department_id,
        })),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK, "{}", created.body);
    assert_eq!(created.body["data"]["phone"], "0522222222");
    assert_eq!(created.body["data"]["must_change_password"], true);
    let user_id = created.body["data"]["id"].as_i64().unwrap();

    let duplicate = send(
        &app,
        "POST",
        "/api/admin/users",
        Some(&admin),
        Some(json!({
            "name": "כפול",
            "phone": "0522222222",
            "role": "soldier",
            "department_id": department_id,
        })),
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let uri = format!("/api/admin/users/{user_id}/toggle-active");
    let toggled = send(&app, "POST", &uri, Some(&admin), None).await;
    assert_eq!(toggled.body["data"]["is_active"], false);

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "phone": "0522222222", "password": "0522222222" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let toggled = send(&app, "POST", &uri, Some(&admin), None).await;
    assert_eq!(toggled.body["data"]["is_active"], true);

    let audit = send(
        &app,
        "GET",
        "/api/admin/audit-logs?action=toggle_user_active",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(audit.status, StatusCode::OK);
    assert_eq!(audit.body["data"]["logs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_period_rules() {
    let (state, app) = spawn_app().await;
    let admin = login_ready(&app, SUPER_ADMIN_PHONE).await;
    let base_id = common::base_id(&state.shared).await;

    let response = send(
        &app,
        "POST",
        "/api/admin/periods",
        Some(&admin),
        Some(json!({ "base_id": base_id, "name": "   " })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let first = send(
        &app,
        "POST",
        "/api/admin/periods",
        Some(&admin),
        Some(json!({ "base_id": base_id, "name": "תעסוקה מבצעית" })),
    )
    .await;
    assert_eq!(first.status, StatusCode::OK);
    let period_id = first.body["data"]["id"].as_i64().unwrap();

    let second = send(
        &app,
        "POST",
        "/api/admin/periods",
        Some(&admin),
        Some(json!({ "base_id": base_id, "name": "תקופה נוספת" })),
    )
    .await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let ended = send(
        &app,
        "POST",
        &format!("/api/admin/periods/{period_id}/end"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(ended.status, StatusCode::OK);
    assert_eq!(ended.body["data"]["is_active"], false);

    let again = send(
        &app,
        "POST",
        "/api/admin/periods",
        Some(&admin),
        Some(json!({ "base_id": base_id, "name": "תקופה נוספת" })),
    )
    .await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn test_deactivation_revokes_live_session() {
    let (state, app) = spawn_app().await;
    let hq_phone = state.config().read().await.seed.hq_commander_phone.clone();
    let hq_id = state
        .shared
        .store
        .users()
        .get_by_phone(&hq_phone)
        .await
        .unwrap()
        .expect("seeded hq commander")
        .id;

    let admin = login_ready(&app, SUPER_ADMIN_PHONE).await;
    let commander = login_ready(&app, &hq_phone).await;

    let response = send(&app, "GET", "/api/admin/users", Some(&commander), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let uri = format!("/api/admin/users/{hq_id}/toggle-active");
    let toggled = send(&app, "POST", &uri, Some(&admin), None).await;
    assert_eq!(toggled.body["data"]["is_active"], false);

    let response = send(&app, "GET", "/api/admin/users", Some(&commander), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let base_id = common::base_id(&state.shared).await;
    let response = send(
        &app,
        "POST",
        "/api/admin/departments",
        Some(&commander),
        Some(json!({ "base_id": base_id, "name": "מחלקה חדשה" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let departments = send(&app, "GET", "/api/admin/departments", Some(&admin), None).await;
    assert_eq!(departments.body["data"].as_array().unwrap().len(), 1);

    // Reactivating does not revive the flushed session.
    send(&app, "POST", &uri, Some(&admin), None).await;
    let response = send(&app, "GET", "/api/dashboard", Some(&commander), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
