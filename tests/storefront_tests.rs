mod common;

use axum::http::StatusCode;
use common::{create_department, create_item_type, create_user, send, spawn_app};
use quartermaster::domain::{Role, TrackingMode};
use serde_json::json;

#[tokio::test]
async fn identify_browse_and_request() {
    let (state, app) = spawn_app().await;
    let department = create_department(&state.shared, "מחסן פלוגתי").await;
    let item = create_item_type(
        &state.shared,
        department.id,
        "שק שינה",
        TrackingMode::Quantity,
        8,
        false,
    )
    .await;
    create_user(
        &state.shared,
        "חייל",
        "0523333333",
        Role::Soldier,
        Some(department.id),
        Some("7290001"),
    )
    .await;

    let identified = send(
        &app,
        "POST",
        "/api/storefront/identify",
        None,
        Some(json!({ "barcode": "7290001" })),
    )
    .await;
    assert_eq!(identified.status, StatusCode::OK, "{}", identified.body);
    let token = identified.body["data"]["token"].as_str().unwrap().to_string();

    let catalog = send(&app, "GET", &format!("/api/storefront/{token}/catalog"), None, None).await;
    assert_eq!(catalog.status, StatusCode::OK);
    assert_eq!(catalog.body["data"]["user"]["name"], "חייל");
    let items = &catalog.body["data"]["departments"][0]["items"];
    assert_eq!(items[0]["id"], item.id);

    let created = send(
        &app,
        "POST",
        &format!("/api/storefront/{token}/requests"),
        None,
        Some(json!({ "item_type_id": item.id, "quantity": 2, "urgency": "immediate" })),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK, "{}", created.body);
    assert_eq!(created.body["data"]["status"], "submitted");
    assert_eq!(created.body["data"]["quantity"], 2);
}

#[tokio::test]
async fn phone_wins_over_barcode() {
    let (state, app) = spawn_app().await;
    let department = create_department(&state.shared, "מחסן").await;
    create_user(&state.shared, "ראשון", "0524444444", Role::Soldier, Some(department.id), Some("111"))
        .await;
    create_user(&state.shared, "שני", "0525555555", Role::Soldier, Some(department.id), Some("222"))
        .await;

    let identified = send(
        &app,
        "POST",
        "/api/storefront/identify",
        None,
        Some(json!({ "phone": "052-444-4444", "barcode": "222" })),
    )
    .await;
    let token = identified.body["data"]["token"].as_str().unwrap().to_string();

    let catalog = send(&app, "GET", &format!("/api/storefront/{token}/catalog"), None, None).await;
    assert_eq!(catalog.body["data"]["user"]["name"], "ראשון");
}

#[tokio::test]
async fn unknown_or_tampered_tokens_are_rejected() {
    let (state, app) = spawn_app().await;
    let department = create_department(&state.shared, "מחסן").await;
    let soldier = create_user(
        &state.shared,
        "חייל",
        "0526666666",
        Role::Soldier,
        Some(department.id),
        None,
    )
    .await;

    let unknown = send(
        &app,
        "POST",
        "/api/storefront/identify",
        None,
        Some(json!({ "phone": "0529999999" })),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let issued = state
        .shared
        .storefront_service
        .issue_for_user(soldier.id)
        .await
        .unwrap();
    let mut tampered = issued.token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = send(&app, "GET", &format!("/api/storefront/{tampered}/catalog"), None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = send(&app, "GET", "/api/storefront/not-a-token/catalog", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // Deactivated users lose storefront access immediately.
    state
        .shared
        .user_service
        .toggle_user_active(&quartermaster::domain::Actor::system(), soldier.id)
        .await
        .unwrap();
    let response = send(
        &app,
        "GET",
        &format!("/api/storefront/{}/catalog", issued.token),
        None,
        None,
    )
    .await;
    assert_ne!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn logged_in_user_can_issue_own_token() {
    let (state, app) = spawn_app().await;
    let department = create_department(&state.shared, "מחסן").await;
    create_user(&state.shared, "חייל", "0527777777", Role::Soldier, Some(department.id), None).await;

    let cookie = common::login_ready(&app, "0527777777").await;
    let issued = send(&app, "POST", "/api/storefront/token", Some(&cookie), None).await;
    assert_eq!(issued.status, StatusCode::OK);
    let token = issued.body["data"]["token"].as_str().unwrap().to_string();

    let catalog = send(&app, "GET", &format!("/api/storefront/{token}/catalog"), None, None).await;
    assert_eq!(catalog.status, StatusCode::OK);

    let unauthenticated = send(&app, "POST", "/api/storefront/token", None, None).await;
    assert_eq!(unauthenticated.status, StatusCode::UNAUTHORIZED);
}
