mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{
    SUPER_ADMIN_PHONE, actor_of, create_department, create_item_type, create_user, login_ready,
    send, spawn_app, spawn_shared,
};
use quartermaster::db::repositories::audit::AuditQuery;
use quartermaster::domain::{
    Actor, AuditAction, Role, TrackingMode, UnitStatus, Urgency, entity_kind,
};
use quartermaster::entities::{
    bases, departments, item_types, item_units, operational_periods, users,
};
use quartermaster::services::{
    HandoverInput, InventoryError, NewBase, NewDepartment, NewRequest, SystemError, audit,
};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set, SqlErr};
use serde_json::json;

#[tokio::test]
async fn reset_requires_exact_confirmation() {
    let (state, app) = spawn_app().await;
    let admin = login_ready(&app, SUPER_ADMIN_PHONE).await;
    let department = create_department(&state.shared, "פלוגה").await;
    create_item_type(&state.shared, department.id, "אפוד", TrackingMode::Quantity, 3, false).await;

    let (phrase, code) = {
        let config = state.shared.config().await;
        (config.reset.confirmation_phrase, config.reset.confirmation_code)
    };

    let wrong = send(
        &app,
        "POST",
        "/api/admin/system/reset",
        Some(&admin),
        Some(json!({ "phrase": format!("{phrase} "), "code": code })),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);

    let reset = send(
        &app,
        "POST",
        "/api/admin/system/reset",
        Some(&admin),
        Some(json!({ "phrase": phrase, "code": code })),
    )
    .await;
    assert_eq!(reset.status, StatusCode::OK, "{}", reset.body);
    assert_eq!(reset.body["data"]["user_ids"].as_array().unwrap().len(), 2);

    // The caller's session ends with the reset.
    let me = send(&app, "GET", "/api/auth/me", Some(&admin), None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let items = state
        .shared
        .catalog_service
        .list_item_types(&Actor::system(), None)
        .await
        .unwrap();
    assert!(items.is_empty());
    let conn = &state.shared.store.conn;
    assert_eq!(bases::Entity::find().count(conn).await.unwrap(), 1);
    assert_eq!(departments::Entity::find().count(conn).await.unwrap(), 1);
    assert_eq!(users::Entity::find().count(conn).await.unwrap(), 2);

    // Default accounts are back with their phone as password.
    let cookie = common::login(&app, SUPER_ADMIN_PHONE, SUPER_ADMIN_PHONE).await;
    let me = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(me.body["data"]["must_change_password"], true);
}

#[tokio::test]
async fn reset_is_super_admin_only() {
    let shared = spawn_shared().await;
    let department = create_department(&shared, "פלוגה").await;
    let hq = create_user(&shared, "מפקד", "0528888888", Role::HqCommander, Some(department.id), None)
        .await;

    let config = shared.config().await;
    let result = shared
        .system_service
        .reset_system(
            &actor_of(&hq),
            &config.reset.confirmation_phrase,
            &config.reset.confirmation_code,
        )
        .await;
    assert!(matches!(result, Err(SystemError::Forbidden)));
}

#[tokio::test]
async fn sync_repairs_quantity_and_unit_drift() {
    let shared = spawn_shared().await;
    let department = create_department(&shared, "פלוגה").await;
    let soldier = create_user(&shared, "חייל", "0529000001", Role::Soldier, Some(department.id), None)
        .await;
    let system = Actor::system();

    let vests = create_item_type(&shared, department.id, "אפוד", TrackingMode::Quantity, 10, false)
        .await;
    let request = shared
        .request_service
        .create_request(
            &actor_of(&soldier),
            NewRequest {
                soldier_id: None,
                item_type_id: vests.id,
                item_unit_id: None,
                quantity: 3,
                urgency: Urgency::Immediate,
                scheduled_pickup_at: None,
                scheduled_return_at: None,
                notes: None,
                submit: true,
            },
        )
        .await
        .unwrap();
    shared.request_service.approve(&system, request.id).await.unwrap();
    shared
        .request_service
        .handover(&system, request.id, HandoverInput::default())
        .await
        .unwrap();

    let radios = create_item_type(&shared, department.id, "מכשיר קשר", TrackingMode::Serial, 0, false)
        .await;
    let unit = shared
        .catalog_service
        .add_unit(&system, radios.id, "R-1", None)
        .await
        .unwrap();

    // Consistent data needs no fixes.
    let report = shared.inventory_service.sync_inventory(&system, None).await.unwrap();
    assert_eq!(report.checked, 2);
    assert_eq!(report.fixed, 0);

    // Corrupt the counters behind the services' back.
    item_types::ActiveModel {
        id: Set(vests.id),
        available_quantity: Set(1),
        ..Default::default()
    }
    .update(&shared.store.conn)
    .await
    .unwrap();
    item_units::ActiveModel {
        id: Set(unit.id),
        status: Set(UnitStatus::InUse),
        ..Default::default()
    }
    .update(&shared.store.conn)
    .await
    .unwrap();

    let report = shared.inventory_service.sync_inventory(&system, None).await.unwrap();
    assert_eq!(report.checked, 2);
    assert!(report.fixed >= 2);

    let vests = shared.catalog_service.get_item_type(vests.id).await.unwrap();
    assert_eq!(vests.available_quantity, 7);
    let units = shared.catalog_service.list_units(radios.id).await.unwrap();
    assert_eq!(units[0].status, UnitStatus::Available);
    let radios = shared.catalog_service.get_item_type(radios.id).await.unwrap();
    assert_eq!((radios.total_quantity, radios.available_quantity), (1, 1));

    // Soldiers manage nothing.
    assert!(matches!(
        shared
            .inventory_service
            .sync_inventory(&actor_of(&soldier), None)
            .await,
        Err(InventoryError::Forbidden)
    ));
}

#[tokio::test]
async fn snapshots_and_low_stock() {
    let shared = spawn_shared().await;
    let department = create_department(&shared, "פלוגה").await;
    let system = Actor::system();

    let low = create_item_type(&shared, department.id, "סוללה", TrackingMode::Quantity, 1, false).await;
    create_item_type(&shared, department.id, "מימיה", TrackingMode::Quantity, 20, false).await;

    let count = quartermaster::scheduler::take_snapshot(&shared).await.unwrap();
    assert_eq!(count, 2);

    let snapshots = shared
        .inventory_service
        .list_snapshots(&system, Some(low.id))
        .await
        .unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].available_quantity, 1);

    let alerts = shared.catalog_service.low_stock(&system).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].item_type_id, low.id);
}

#[tokio::test]
async fn unit_status_rules() {
    let shared = spawn_shared().await;
    let department = create_department(&shared, "פלוגה").await;
    let system = Actor::system();
    let item = create_item_type(&shared, department.id, "משקפת", TrackingMode::Serial, 0, false).await;
    let unit = shared
        .catalog_service
        .add_unit(&system, item.id, "B-1", None)
        .await
        .unwrap();

    assert!(
        shared
            .catalog_service
            .set_unit_status(&system, unit.id, UnitStatus::InUse, None)
            .await
            .is_err()
    );

    shared
        .catalog_service
        .set_unit_status(&system, unit.id, UnitStatus::Maintenance, None)
        .await
        .unwrap();
    let stock = shared.catalog_service.get_item_type(item.id).await.unwrap();
    assert_eq!((stock.total_quantity, stock.available_quantity), (1, 0));

    shared
        .catalog_service
        .set_unit_status(&system, unit.id, UnitStatus::Destroyed, None)
        .await
        .unwrap();
    let stock = shared.catalog_service.get_item_type(item.id).await.unwrap();
    assert_eq!((stock.total_quantity, stock.available_quantity), (0, 0));

    let duplicate = shared
        .catalog_service
        .add_unit(&system, item.id, "B-1", None)
        .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn database_allows_one_active_period_per_base() {
    let shared = spawn_shared().await;
    let base_id = common::base_id(&shared).await;
    let conn = &shared.store.conn;

    let period = |name: &str, is_active: bool| operational_periods::ActiveModel {
        base_id: Set(base_id),
        name: Set(name.to_string()),
        starts_at: Set(Utc::now()),
        ends_at: Set(None),
        is_active: Set(is_active),
        created_by: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    period("תרגיל", true).insert(conn).await.unwrap();
    period("ארכיון", false).insert(conn).await.unwrap();
    period("ארכיון 2", false).insert(conn).await.unwrap();

    let err = period("כפילות", true).insert(conn).await.unwrap_err();
    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));
}

#[tokio::test]
async fn audit_log_is_scoped_to_the_callers_base() {
    let shared = spawn_shared().await;
    let home = create_department(&shared, "פלוגה").await;
    let north = shared
        .org_service
        .create_base(
            &Actor::system(),
            NewBase {
                name: "בסיס צפון".to_string(),
                commander_name: None,
                commander_phone: None,
            },
        )
        .await
        .unwrap();
    let north_department = shared
        .org_service
        .create_department(
            &Actor::system(),
            NewDepartment {
                base_id: north.id,
                name: "פלוגה צפון".to_string(),
                allow_immediate: true,
                allow_scheduled: true,
                auto_approve_requests: false,
                is_hq: false,
            },
        )
        .await
        .unwrap();

    let home_commander =
        create_user(&shared, "מפקד", "0527000001", Role::DeptCommander, Some(home.id), None).await;
    let north_commander = create_user(
        &shared,
        "מפקד צפון",
        "0527000002",
        Role::DeptCommander,
        Some(north_department.department.id),
        None,
    )
    .await;

    for user in [&home_commander, &north_commander] {
        audit::record(
            &shared.store.conn,
            &actor_of(user),
            AuditAction::UpdateUser,
            entity_kind::USER,
            Some(user.id),
            None,
            None,
        )
        .await
        .unwrap();
    }

    let hq_phone = shared.config().await.seed.hq_commander_phone;
    let hq = shared
        .store
        .users()
        .get_by_phone(&hq_phone)
        .await
        .unwrap()
        .expect("seeded hq commander");
    let hq = Actor {
        user_id: Some(hq.id),
        role: hq.role,
        department_id: hq.department_id,
        base_id: hq.base_id,
    };

    let page = shared
        .audit_log
        .list(&hq, 1, 50, AuditQuery::default())
        .await
        .unwrap();
    assert_eq!(page.logs.len(), 1);
    assert_eq!(page.logs[0].user_id, Some(home_commander.id));

    let admin = Actor {
        role: Role::SuperAdmin,
        ..hq
    };
    let page = shared
        .audit_log
        .list(&admin, 1, 50, AuditQuery::default())
        .await
        .unwrap();
    assert!(page.logs.iter().any(|log| log.user_id == Some(north_commander.id)));
    assert!(page.logs.iter().any(|log| log.user_id.is_none()));
}
