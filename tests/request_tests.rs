mod common;

use chrono::{Duration, Utc};
use common::{actor_of, create_department, create_item_type, create_user, spawn_shared};
use quartermaster::domain::{Actor, RequestStatus, Role, TrackingMode, UnitStatus, Urgency};
use quartermaster::services::{
    HandoverInput, NewRequest, RequestError, RequestFilter, ReturnInput, UserDto,
};
use quartermaster::domain::events::NotificationEvent;
use quartermaster::entities::requests as request_rows;
use quartermaster::state::SharedState;
use sea_orm::{ConnectionTrait, EntityTrait};
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;

struct Fixture {
    shared: Arc<SharedState>,
    department_id: i32,
    soldier: UserDto,
    commander: UserDto,
}

async fn fixture() -> Fixture {
    let shared = spawn_shared().await;
    let department = create_department(&shared, "פלוגה א").await;
    let soldier = create_user(
        &shared,
        "חייל",
        "0521000001",
        Role::Soldier,
        Some(department.id),
        None,
    )
    .await;
    let commander = create_user(
        &shared,
        "מפקד",
        "0521000002",
        Role::DeptCommander,
        Some(department.id),
        None,
    )
    .await;

    Fixture {
        shared,
        department_id: department.id,
        soldier,
        commander,
    }
}

fn immediate(item_type_id: i32, quantity: i32) -> NewRequest {
    NewRequest {
        soldier_id: None,
        item_type_id,
        item_unit_id: None,
        quantity,
        urgency: Urgency::Immediate,
        scheduled_pickup_at: None,
        scheduled_return_at: None,
        notes: None,
        submit: false,
    }
}

#[tokio::test]
async fn quantity_request_full_lifecycle() {
    let f = fixture().await;
    let requests = &f.shared.request_service;
    let soldier = actor_of(&f.soldier);
    let commander = actor_of(&f.commander);
    let item = create_item_type(&f.shared, f.department_id, "אפוד", TrackingMode::Quantity, 10, false)
        .await;

    let request = requests
        .create_request(&soldier, immediate(item.id, 3))
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Draft);
    assert!(request.scheduled_return_at.is_some());

    let request = requests.submit(&soldier, request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Submitted);

    // Soldiers cannot approve.
    assert!(matches!(
        requests.approve(&soldier, request.id).await,
        Err(RequestError::Forbidden)
    ));

    let request = requests.approve(&commander, request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    assert_eq!(request.approved_by, Some(f.commander.id));

    let request = requests
        .handover(&commander, request.id, HandoverInput::default())
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::HandedOver);

    let stock = f.shared.catalog_service.get_item_type(item.id).await.unwrap();
    assert_eq!(stock.available_quantity, 7);
    assert_eq!(stock.total_quantity, 10);

    let request = requests
        .return_request(&commander, request.id, ReturnInput::default())
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Returned);

    let stock = f.shared.catalog_service.get_item_type(item.id).await.unwrap();
    assert_eq!(stock.available_quantity, 10);

    let request = requests.close(&commander, request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Closed);

    let movements = requests.list_movements(&soldier, request.id).await.unwrap();
    assert_eq!(movements.len(), 2);

    let err = requests.approve(&commander, request.id).await.unwrap_err();
    assert!(matches!(
        err,
        RequestError::InvalidTransition {
            from: RequestStatus::Closed,
            ..
        }
    ));
}

#[tokio::test]
async fn request_validation_rules() {
    let f = fixture().await;
    let requests = &f.shared.request_service;
    let soldier = actor_of(&f.soldier);
    let quantity = create_item_type(&f.shared, f.department_id, "מימיה", TrackingMode::Quantity, 5, false)
        .await;
    let serial = create_item_type(&f.shared, f.department_id, "משקפת", TrackingMode::Serial, 0, false)
        .await;

    assert!(matches!(
        requests.create_request(&soldier, immediate(quantity.id, 0)).await,
        Err(RequestError::InvalidQuantity)
    ));
    assert!(matches!(
        requests.create_request(&soldier, immediate(serial.id, 2)).await,
        Err(RequestError::InvalidQuantity)
    ));
    assert!(matches!(
        requests.create_request(&soldier, immediate(quantity.id, 6)).await,
        Err(RequestError::InsufficientStock { available: 5 })
    ));

    let now = Utc::now();
    let mut scheduled = immediate(quantity.id, 1);
    scheduled.urgency = Urgency::Scheduled;
    scheduled.scheduled_pickup_at = Some(now + Duration::days(2));
    scheduled.scheduled_return_at = Some(now + Duration::days(1));
    assert!(matches!(
        requests.create_request(&soldier, scheduled.clone()).await,
        Err(RequestError::InvalidSchedule)
    ));

    scheduled.scheduled_return_at = Some(now + Duration::days(30));
    assert!(matches!(
        requests.create_request(&soldier, scheduled.clone()).await,
        Err(RequestError::LoanTooLong(14))
    ));

    scheduled.scheduled_return_at = Some(now + Duration::days(5));
    let created = requests.create_request(&soldier, scheduled).await.unwrap();
    assert_eq!(created.urgency, Urgency::Scheduled);

    // A soldier cannot request on someone else's behalf.
    let mut other = immediate(quantity.id, 1);
    other.soldier_id = Some(f.commander.id);
    assert!(matches!(
        requests.create_request(&soldier, other).await,
        Err(RequestError::Forbidden)
    ));
}

#[tokio::test]
async fn serial_request_needs_two_approvers() {
    let f = fixture().await;
    let requests = &f.shared.request_service;
    let soldier = actor_of(&f.soldier);
    let commander = actor_of(&f.commander);
    let hq = create_user(
        &f.shared,
        "מפקד בסיס נוסף",
        "0521000003",
        Role::HqCommander,
        None,
        None,
    )
    .await;
    let hq = Actor {
        base_id: Some(common::base_id(&f.shared).await),
        ..actor_of(&hq)
    };

    let item = create_item_type(&f.shared, f.department_id, "נשק", TrackingMode::Serial, 0, true)
        .await;
    let unit = f
        .shared
        .catalog_service
        .add_unit(&Actor::system(), item.id, "SN-100", None)
        .await
        .unwrap();

    let stock = f.shared.catalog_service.get_item_type(item.id).await.unwrap();
    assert_eq!((stock.total_quantity, stock.available_quantity), (1, 1));

    let mut input = immediate(item.id, 1);
    input.item_unit_id = Some(unit.id);
    input.submit = true;
    let request = requests.create_request(&soldier, input.clone()).await.unwrap();
    assert_eq!(request.status, RequestStatus::Submitted);

    let mut events = f.shared.event_bus.subscribe();
    let request = requests.approve(&commander, request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Submitted);
    assert_eq!(request.first_approved_by, Some(f.commander.id));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    assert!(matches!(
        requests.approve(&commander, request.id).await,
        Err(RequestError::SecondApproverRequired)
    ));

    let request = requests.approve(&hq, request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    match events.try_recv() {
        Ok(NotificationEvent::RequestStatusChanged { from, to, .. }) => {
            assert_eq!(from, Some(RequestStatus::Submitted));
            assert_eq!(to, RequestStatus::Approved);
        }
        other => panic!("expected a status change, got {other:?}"),
    }

    let request = requests.mark_ready(&commander, request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::ReadyForPickup);

    let request = requests
        .handover(
            &commander,
            request.id,
            HandoverInput {
                signature: Some("data:image/png;base64,AAAA".to_string()),
                ..HandoverInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::HandedOver);

    let units = f.shared.catalog_service.list_units(item.id).await.unwrap();
    assert_eq!(units[0].status, UnitStatus::InUse);

    // The unit is out, so a second request for it fails.
    assert!(matches!(
        requests.create_request(&soldier, input).await,
        Err(RequestError::UnitUnavailable)
    ));

    let detail = requests.get_request(&soldier, request.id).await.unwrap();
    assert_eq!(detail.signatures.len(), 1);
    assert_eq!(detail.movements.len(), 1);

    requests
        .return_request(
            &commander,
            request.id,
            ReturnInput {
                unit_condition: Some(UnitStatus::Damaged),
                notes: Some("עדשה סדוקה".to_string()),
            },
        )
        .await
        .unwrap();

    let units = f.shared.catalog_service.list_units(item.id).await.unwrap();
    assert_eq!(units[0].status, UnitStatus::Damaged);
    let stock = f.shared.catalog_service.get_item_type(item.id).await.unwrap();
    assert_eq!((stock.total_quantity, stock.available_quantity), (1, 0));
}

#[tokio::test]
async fn reject_requires_reason() {
    let f = fixture().await;
    let requests = &f.shared.request_service;
    let soldier = actor_of(&f.soldier);
    let commander = actor_of(&f.commander);
    let item = create_item_type(&f.shared, f.department_id, "קסדה", TrackingMode::Quantity, 4, false)
        .await;

    let mut input = immediate(item.id, 1);
    input.submit = true;
    let request = requests.create_request(&soldier, input).await.unwrap();

    assert!(matches!(
        requests.reject(&commander, request.id, "  ").await,
        Err(RequestError::Validation(_))
    ));

    let request = requests
        .reject(&commander, request.id, "אין צורך מבצעי")
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Rejected);

    let request = requests.close(&commander, request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Closed);
}

#[tokio::test]
async fn overdue_sweep_and_write_off() {
    let f = fixture().await;
    let requests = &f.shared.request_service;
    let soldier = actor_of(&f.soldier);
    let commander = actor_of(&f.commander);
    let item = create_item_type(&f.shared, f.department_id, "אלונקה", TrackingMode::Quantity, 6, false)
        .await;

    let mut input = immediate(item.id, 2);
    input.submit = true;
    let request = requests.create_request(&soldier, input).await.unwrap();
    requests.approve(&commander, request.id).await.unwrap();
    requests
        .handover(&commander, request.id, HandoverInput::default())
        .await
        .unwrap();

    assert_eq!(requests.mark_overdue_sweep(Utc::now()).await.unwrap(), 0);
    let marked = requests
        .mark_overdue_sweep(Utc::now() + Duration::days(30))
        .await
        .unwrap();
    assert_eq!(marked, 1);

    let detail = requests.get_request(&commander, request.id).await.unwrap();
    assert_eq!(detail.request.status, RequestStatus::Overdue);

    let request = requests.close(&commander, request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Closed);

    let stock = f.shared.catalog_service.get_item_type(item.id).await.unwrap();
    assert_eq!((stock.total_quantity, stock.available_quantity), (4, 4));
}

#[tokio::test]
async fn overdue_sweep_skips_a_failing_request() {
    let f = fixture().await;
    let requests = &f.shared.request_service;
    let soldier = actor_of(&f.soldier);
    let commander = actor_of(&f.commander);
    let item = create_item_type(&f.shared, f.department_id, "מימייה", TrackingMode::Quantity, 6, false)
        .await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let mut input = immediate(item.id, 1);
        input.submit = true;
        let request = requests.create_request(&soldier, input).await.unwrap();
        requests.approve(&commander, request.id).await.unwrap();
        requests
            .handover(&commander, request.id, HandoverInput::default())
            .await
            .unwrap();
        ids.push(request.id);
    }

    let blocked = ids[0];
    f.shared
        .store
        .conn
        .execute_unprepared(&format!(
            "CREATE TRIGGER block_overdue BEFORE UPDATE OF status ON requests \
             WHEN NEW.id = {blocked} AND NEW.status = 'overdue' \
             BEGIN SELECT RAISE(ABORT, 'blocked'); END"
        ))
        .await
        .unwrap();

    let marked = requests
        .mark_overdue_sweep(Utc::now() + Duration::days(30))
        .await
        .unwrap();
    assert_eq!(marked, 1);

    assert_eq!(stored_status(&f.shared, ids[0]).await, RequestStatus::HandedOver);
    assert_eq!(stored_status(&f.shared, ids[1]).await, RequestStatus::Overdue);
}

async fn stored_status(shared: &SharedState, id: i32) -> RequestStatus {
    request_rows::Entity::find_by_id(id)
        .one(&shared.store.conn)
        .await
        .unwrap()
        .expect("request row")
        .status
}

#[tokio::test]
async fn listing_is_scoped_by_role() {
    let f = fixture().await;
    let requests = &f.shared.request_service;
    let soldier = actor_of(&f.soldier);
    let commander = actor_of(&f.commander);
    let other_department = create_department(&f.shared, "פלוגה ב").await;
    let other_soldier = create_user(
        &f.shared,
        "חייל אחר",
        "0521000009",
        Role::Soldier,
        Some(other_department.id),
        None,
    )
    .await;
    let item = create_item_type(&f.shared, f.department_id, "פנס", TrackingMode::Quantity, 9, false)
        .await;
    let other_item = create_item_type(
        &f.shared,
        other_department.id,
        "פנס",
        TrackingMode::Quantity,
        9,
        false,
    )
    .await;

    requests
        .create_request(&soldier, immediate(item.id, 1))
        .await
        .unwrap();
    requests
        .create_request(&actor_of(&other_soldier), immediate(other_item.id, 1))
        .await
        .unwrap();

    // Items of an unrelated department are not borrowable.
    assert!(matches!(
        requests.create_request(&soldier, immediate(other_item.id, 1)).await,
        Err(RequestError::Forbidden)
    ));

    let own = requests
        .list_requests(&soldier, RequestFilter::default())
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert!(own.iter().all(|r| r.soldier_id == f.soldier.id));

    let department = requests
        .list_requests(&commander, RequestFilter::default())
        .await
        .unwrap();
    assert_eq!(department.len(), 1);

    assert!(matches!(
        requests
            .list_requests(
                &commander,
                RequestFilter {
                    department_id: Some(other_department.id),
                    ..RequestFilter::default()
                },
            )
            .await,
        Err(RequestError::Forbidden)
    ));

    let all = requests
        .list_requests(&Actor::system(), RequestFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}
