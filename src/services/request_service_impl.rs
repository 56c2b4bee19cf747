//! `SeaORM` implementation of the `RequestService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, Set, TransactionTrait,
};
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::db::Store;
use crate::db::repositories::request::RequestQuery;
use crate::domain::events::NotificationEvent;
use crate::domain::{
    Actor, AuditAction, MovementKind, RequestStatus, Role, TrackingMode, Transition, UnitStatus,
    Urgency, entity_kind, phone_digits,
};
use crate::entities::{
    departments, item_types, item_units, movements, prelude::*, requests, signatures,
};
use crate::services::audit;
use crate::services::request_service::{
    HandoverInput, NewRequest, RequestDetail, RequestError, RequestFilter, RequestService,
    ReturnInput,
};

pub struct SeaOrmRequestService {
    store: Store,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl SeaOrmRequestService {
    #[must_use]
    pub const fn new(store: Store, event_bus: broadcast::Sender<NotificationEvent>) -> Self {
        Self { store, event_bus }
    }

    /// Writes the audit entry, commits, then publishes the change.
    async fn commit_transition(
        &self,
        txn: DatabaseTransaction,
        actor: &Actor,
        transition: Transition,
        from: Option<RequestStatus>,
        request: requests::Model,
    ) -> Result<requests::Model, RequestError> {
        audit::record(
            &txn,
            actor,
            AuditAction::RequestTransition,
            entity_kind::REQUEST,
            Some(request.id),
            from.map(|status| json!({ "status": status })),
            Some(json!({
                "status": request.status,
                "transition": transition.as_str(),
                "first_approved_by": request.first_approved_by,
                "approved_by": request.approved_by,
            })),
        )
        .await?;

        txn.commit().await?;
        self.announce(transition, from, &request);
        Ok(request)
    }

    /// Moves one handed-over request to overdue in its own transaction.
    /// Returns `false` if it left `handed_over` since the sweep query ran.
    async fn mark_one_overdue(&self, actor: &Actor, request_id: i32) -> Result<bool, RequestError> {
        let txn = self.store.conn.begin().await?;
        let request = load_request(&txn, request_id).await?;
        if request.status != RequestStatus::HandedOver {
            return Ok(false);
        }

        let from = request.status;
        let mut active: requests::ActiveModel = request.into();
        active.status = Set(RequestStatus::Overdue);
        active.updated_at = Set(Utc::now());
        let request = active.update(&txn).await?;

        self.commit_transition(txn, actor, Transition::MarkOverdue, Some(from), request)
            .await?;
        Ok(true)
    }

    fn announce(
        &self,
        transition: Transition,
        from: Option<RequestStatus>,
        request: &requests::Model,
    ) {
        if from == Some(request.status) {
            info!(
                event = "request_first_approval",
                request_id = request.id,
                first_approved_by = request.first_approved_by,
                "First of two approvals recorded"
            );
            return;
        }

        metrics::counter!("request_transitions_total", "transition" => transition.as_str())
            .increment(1);

        info!(
            event = "request_transition",
            request_id = request.id,
            transition = transition.as_str(),
            from = from.map(RequestStatus::as_str),
            to = %request.status,
            "Request status changed"
        );

        let _ = self.event_bus.send(NotificationEvent::RequestStatusChanged {
            request_id: request.id,
            department_id: request.department_id,
            from,
            to: request.status,
        });
    }

    fn warn_low_stock(&self, item_type: &item_types::Model) {
        if item_type.available_quantity >= item_type.minimum_alert {
            return;
        }

        warn!(
            event = "low_stock",
            item_type_id = item_type.id,
            available = item_type.available_quantity,
            minimum = item_type.minimum_alert,
            "Item type below its alert threshold"
        );

        let _ = self.event_bus.send(NotificationEvent::LowStock {
            item_type_id: item_type.id,
            name: item_type.name.clone(),
            available: item_type.available_quantity,
            minimum: item_type.minimum_alert,
        });
    }

    /// Loads a request for a manager action inside `txn`.
    async fn managed_request(
        txn: &DatabaseTransaction,
        actor: &Actor,
        id: i32,
    ) -> Result<requests::Model, RequestError> {
        let request = load_request(txn, id).await?;
        let department = load_department(txn, request.department_id).await?;
        if !actor.can_manage_department(&department) {
            return Err(RequestError::Forbidden);
        }
        Ok(request)
    }

    /// Single-field status moves that touch nothing but the request row.
    async fn simple_transition(
        &self,
        actor: &Actor,
        id: i32,
        to: RequestStatus,
        transition: Transition,
    ) -> Result<requests::Model, RequestError> {
        let txn = self.store.conn.begin().await?;
        let request = Self::managed_request(&txn, actor, id).await?;
        guard(request.status, to)?;

        let from = request.status;
        let mut active: requests::ActiveModel = request.into();
        active.status = Set(to);
        active.updated_at = Set(Utc::now());
        let request = active.update(&txn).await?;

        self.commit_transition(txn, actor, transition, Some(from), request)
            .await
    }

    fn can_view(actor: &Actor, request: &requests::Model, department: &departments::Model) -> bool {
        actor.user_id == Some(request.soldier_id)
            || matches!(actor.role, Role::SuperAdmin | Role::HqCommander)
            || actor.can_manage_department(department)
    }

    async fn visible_request(&self, actor: &Actor, id: i32) -> Result<requests::Model, RequestError> {
        let request = self
            .store
            .requests()
            .get(id)
            .await?
            .ok_or(RequestError::NotFound)?;
        let department = load_department(&self.store.conn, request.department_id).await?;
        if !Self::can_view(actor, &request, &department) {
            return Err(RequestError::Forbidden);
        }
        Ok(request)
    }
}

fn guard(from: RequestStatus, to: RequestStatus) -> Result<(), RequestError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(RequestError::InvalidTransition { from, to })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn load_request<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<requests::Model, RequestError> {
    Requests::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(RequestError::NotFound)
}

async fn load_department<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<departments::Model, RequestError> {
    Departments::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| RequestError::Internal(format!("department {id} is missing")))
}

async fn load_item_type<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<item_types::Model, RequestError> {
    ItemTypes::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(RequestError::ItemTypeNotFound)
}

async fn load_unit<C: ConnectionTrait>(
    conn: &C,
    unit_id: i32,
    item_type_id: i32,
) -> Result<item_units::Model, RequestError> {
    ItemUnits::find_by_id(unit_id)
        .one(conn)
        .await?
        .filter(|u| u.item_type_id == item_type_id)
        .ok_or(RequestError::UnitNotFound)
}

async fn set_unit_status<C: ConnectionTrait>(
    conn: &C,
    unit: item_units::Model,
    status: UnitStatus,
    now: DateTime<Utc>,
) -> Result<(), RequestError> {
    let mut active: item_units::ActiveModel = unit.into();
    active.status = Set(status);
    active.updated_at = Set(now);
    active.update(conn).await?;
    Ok(())
}

#[async_trait]
impl RequestService for SeaOrmRequestService {
    #[allow(clippy::too_many_lines)]
    async fn create_request(
        &self,
        actor: &Actor,
        input: NewRequest,
    ) -> Result<requests::Model, RequestError> {
        let soldier_id = match (actor.role, input.soldier_id) {
            (Role::Soldier, Some(id)) if Some(id) != actor.user_id => {
                return Err(RequestError::Forbidden);
            }
            (_, Some(id)) => id,
            (_, None) => actor
                .user_id
                .ok_or_else(|| RequestError::Validation("יש לבחור חייל".to_string()))?,
        };

        let soldier = self
            .store
            .users()
            .get(soldier_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| RequestError::Validation("החייל לא נמצא או שאינו פעיל".to_string()))?;

        let item_type = self
            .store
            .catalog()
            .get_item_type(input.item_type_id)
            .await?
            .ok_or(RequestError::ItemTypeNotFound)?;
        let department = load_department(&self.store.conn, item_type.department_id).await?;

        let allowed = if actor.role == Role::Soldier || actor.user_id == Some(soldier_id) {
            actor.can_manage_department(&department)
                || self
                    .store
                    .org()
                    .borrowable_departments(soldier_id, soldier.department_id)
                    .await?
                    .contains(&department.id)
        } else {
            actor.can_manage_department(&department)
        };
        if !allowed {
            return Err(RequestError::Forbidden);
        }

        if input.quantity < 1 || (item_type.tracking == TrackingMode::Serial && input.quantity != 1)
        {
            return Err(RequestError::InvalidQuantity);
        }

        match input.urgency {
            Urgency::Immediate if !department.allow_immediate => {
                return Err(RequestError::ImmediateNotAllowed);
            }
            Urgency::Scheduled if !department.allow_scheduled => {
                return Err(RequestError::ScheduledNotAllowed);
            }
            _ => {}
        }

        let now = Utc::now();
        let pickup = input.scheduled_pickup_at;
        let mut return_at = input.scheduled_return_at;

        if input.urgency == Urgency::Scheduled && pickup.is_none() {
            return Err(RequestError::Validation("יש לבחור מועד איסוף".to_string()));
        }
        if let (Some(p), Some(r)) = (pickup, return_at)
            && p >= r
        {
            return Err(RequestError::InvalidSchedule);
        }
        if return_at.is_some_and(|r| r <= now) {
            return Err(RequestError::InvalidSchedule);
        }

        if let Some(days) = item_type.max_loan_days {
            let limit = pickup.unwrap_or(now) + chrono::Duration::days(i64::from(days));
            match return_at {
                Some(r) if r > limit => return Err(RequestError::LoanTooLong(days)),
                None => return_at = Some(limit),
                Some(_) => {}
            }
        }

        if let Some(unit_id) = input.item_unit_id {
            if item_type.tracking != TrackingMode::Serial {
                return Err(RequestError::Validation(
                    "ניתן לבחור פריט ספציפי רק בסוג פריט סדרתי".to_string(),
                ));
            }
            let unit = load_unit(&self.store.conn, unit_id, item_type.id).await?;
            if unit.status != UnitStatus::Available {
                return Err(RequestError::UnitUnavailable);
            }
        } else if input.urgency == Urgency::Immediate
            && item_type.available_quantity < input.quantity
        {
            return Err(RequestError::InsufficientStock {
                available: item_type.available_quantity,
            });
        }

        let status = if !input.submit {
            RequestStatus::Draft
        } else if department.auto_approve_requests && !item_type.requires_double_approval {
            RequestStatus::Approved
        } else {
            RequestStatus::Submitted
        };

        let txn = self.store.conn.begin().await?;

        let request = requests::ActiveModel {
            soldier_id: Set(soldier_id),
            department_id: Set(department.id),
            item_type_id: Set(item_type.id),
            item_unit_id: Set(input.item_unit_id),
            quantity: Set(input.quantity),
            urgency: Set(input.urgency),
            status: Set(status),
            scheduled_pickup_at: Set(pickup),
            scheduled_return_at: Set(return_at),
            notes: Set(non_empty(input.notes)),
            recipient_name: Set(None),
            recipient_phone: Set(None),
            first_approved_by: Set(None),
            approved_by: Set(None),
            rejected_reason: Set(None),
            handed_over_at: Set(None),
            returned_at: Set(None),
            created_by: Set(actor.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        self.commit_transition(txn, actor, Transition::Create, None, request)
            .await
    }

    async fn get_request(&self, actor: &Actor, id: i32) -> Result<RequestDetail, RequestError> {
        let request = self.visible_request(actor, id).await?;
        let movements = self.store.requests().movements(id).await?;
        let signatures = self.store.requests().signatures(id).await?;

        Ok(RequestDetail {
            request,
            movements,
            signatures,
        })
    }

    async fn list_requests(
        &self,
        actor: &Actor,
        filter: RequestFilter,
    ) -> Result<Vec<requests::Model>, RequestError> {
        let mut query = RequestQuery {
            statuses: filter.status.into_iter().collect(),
            department_ids: filter.department_id.map(|id| vec![id]),
            soldier_id: filter.soldier_id,
            item_type_id: filter.item_type_id,
        };

        match actor.role {
            Role::Soldier => {
                query.soldier_id = Some(actor.user_id.ok_or(RequestError::Forbidden)?);
            }
            Role::DeptCommander => {
                let own = actor.department_id.ok_or(RequestError::Forbidden)?;
                if filter.department_id.is_some_and(|id| id != own) {
                    return Err(RequestError::Forbidden);
                }
                query.department_ids = Some(vec![own]);
            }
            Role::HqCommander | Role::SuperAdmin => {}
        }

        Ok(self.store.requests().list(&query).await?)
    }

    async fn submit(&self, actor: &Actor, id: i32) -> Result<requests::Model, RequestError> {
        let txn = self.store.conn.begin().await?;
        let request = load_request(&txn, id).await?;
        let department = load_department(&txn, request.department_id).await?;

        let owner = actor.user_id.is_some()
            && (actor.user_id == Some(request.soldier_id) || actor.user_id == request.created_by);
        if !owner && !actor.can_manage_department(&department) {
            return Err(RequestError::Forbidden);
        }
        guard(request.status, RequestStatus::Submitted)?;

        let item_type = load_item_type(&txn, request.item_type_id).await?;
        let to = if department.auto_approve_requests && !item_type.requires_double_approval {
            RequestStatus::Approved
        } else {
            RequestStatus::Submitted
        };

        let from = request.status;
        let mut active: requests::ActiveModel = request.into();
        active.status = Set(to);
        active.updated_at = Set(Utc::now());
        let request = active.update(&txn).await?;

        self.commit_transition(txn, actor, Transition::Submit, Some(from), request)
            .await
    }

    async fn approve(&self, actor: &Actor, id: i32) -> Result<requests::Model, RequestError> {
        let txn = self.store.conn.begin().await?;
        let request = Self::managed_request(&txn, actor, id).await?;
        guard(request.status, RequestStatus::Approved)?;
        let item_type = load_item_type(&txn, request.item_type_id).await?;

        let from = request.status;
        let first_approved_by = request.first_approved_by;
        let mut active: requests::ActiveModel = request.into();

        if item_type.requires_double_approval {
            let approver = actor
                .user_id
                .ok_or(RequestError::SecondApproverRequired)?;
            match first_approved_by {
                None => active.first_approved_by = Set(Some(approver)),
                Some(first) if first == approver => {
                    return Err(RequestError::SecondApproverRequired);
                }
                Some(_) => {
                    active.approved_by = Set(Some(approver));
                    active.status = Set(RequestStatus::Approved);
                }
            }
        } else {
            active.approved_by = Set(actor.user_id);
            active.status = Set(RequestStatus::Approved);
        }

        active.updated_at = Set(Utc::now());
        let request = active.update(&txn).await?;

        self.commit_transition(txn, actor, Transition::Approve, Some(from), request)
            .await
    }

    async fn reject(
        &self,
        actor: &Actor,
        id: i32,
        reason: &str,
    ) -> Result<requests::Model, RequestError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(RequestError::Validation("יש לציין סיבת דחייה".to_string()));
        }

        let txn = self.store.conn.begin().await?;
        let request = Self::managed_request(&txn, actor, id).await?;
        guard(request.status, RequestStatus::Rejected)?;

        let from = request.status;
        let mut active: requests::ActiveModel = request.into();
        active.status = Set(RequestStatus::Rejected);
        active.rejected_reason = Set(Some(reason.to_string()));
        active.updated_at = Set(Utc::now());
        let request = active.update(&txn).await?;

        self.commit_transition(txn, actor, Transition::Reject, Some(from), request)
            .await
    }

    async fn mark_ready(&self, actor: &Actor, id: i32) -> Result<requests::Model, RequestError> {
        self.simple_transition(
            actor,
            id,
            RequestStatus::ReadyForPickup,
            Transition::MarkReady,
        )
        .await
    }

    #[allow(clippy::too_many_lines)]
    async fn handover(
        &self,
        actor: &Actor,
        id: i32,
        input: HandoverInput,
    ) -> Result<requests::Model, RequestError> {
        let txn = self.store.conn.begin().await?;
        let request = Self::managed_request(&txn, actor, id).await?;
        guard(request.status, RequestStatus::HandedOver)?;

        let item_type = load_item_type(&txn, request.item_type_id).await?;
        let soldier = Users::find_by_id(request.soldier_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RequestError::Internal("request soldier is missing".to_string()))?;
        let now = Utc::now();

        let mut type_active: item_types::ActiveModel = item_type.clone().into();
        let unit_id = match item_type.tracking {
            TrackingMode::Serial => {
                let unit_id = input
                    .unit_id
                    .or(request.item_unit_id)
                    .ok_or_else(|| RequestError::Validation("יש לבחור פריט למסירה".to_string()))?;
                let unit = load_unit(&txn, unit_id, item_type.id).await?;
                if unit.status != UnitStatus::Available {
                    return Err(RequestError::UnitUnavailable);
                }
                set_unit_status(&txn, unit, UnitStatus::InUse, now).await?;
                type_active.available_quantity = Set((item_type.available_quantity - 1).max(0));
                Some(unit_id)
            }
            TrackingMode::Quantity => {
                if item_type.available_quantity < request.quantity {
                    return Err(RequestError::InsufficientStock {
                        available: item_type.available_quantity,
                    });
                }
                type_active.available_quantity =
                    Set(item_type.available_quantity - request.quantity);
                None
            }
        };
        type_active.updated_at = Set(now);
        let item_type = type_active.update(&txn).await?;

        let recipient_name = non_empty(input.recipient_name).unwrap_or_else(|| soldier.name.clone());
        let recipient_phone = input
            .recipient_phone
            .map(|p| phone_digits(&p))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| soldier.phone.clone());

        let movement = movements::ActiveModel {
            request_id: Set(Some(request.id)),
            item_type_id: Set(item_type.id),
            item_unit_id: Set(unit_id),
            quantity: Set(request.quantity),
            kind: Set(MovementKind::Handover),
            from_user_id: Set(None),
            to_user_id: Set(Some(request.soldier_id)),
            executed_by: Set(actor.user_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(signature_data) = non_empty(input.signature) {
            signatures::ActiveModel {
                request_id: Set(request.id),
                movement_id: Set(Some(movement.id)),
                signer_name: Set(recipient_name.clone()),
                signer_phone: Set(Some(recipient_phone.clone())),
                signature_data: Set(signature_data),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let return_at = request.scheduled_return_at.or_else(|| {
            item_type
                .max_loan_days
                .map(|days| now + chrono::Duration::days(i64::from(days)))
        });

        let from = request.status;
        let mut active: requests::ActiveModel = request.into();
        active.status = Set(RequestStatus::HandedOver);
        if unit_id.is_some() {
            active.item_unit_id = Set(unit_id);
        }
        active.recipient_name = Set(Some(recipient_name));
        active.recipient_phone = Set(Some(recipient_phone));
        active.handed_over_at = Set(Some(now));
        active.scheduled_return_at = Set(return_at);
        active.updated_at = Set(now);
        let request = active.update(&txn).await?;

        let request = self
            .commit_transition(txn, actor, Transition::Handover, Some(from), request)
            .await?;
        self.warn_low_stock(&item_type);
        Ok(request)
    }

    async fn return_request(
        &self,
        actor: &Actor,
        id: i32,
        input: ReturnInput,
    ) -> Result<requests::Model, RequestError> {
        let condition = input.unit_condition.unwrap_or(UnitStatus::Available);
        if condition == UnitStatus::InUse {
            return Err(RequestError::Validation("מצב החזרה לא תקין".to_string()));
        }

        let txn = self.store.conn.begin().await?;
        let request = Self::managed_request(&txn, actor, id).await?;
        guard(request.status, RequestStatus::Returned)?;

        let item_type = load_item_type(&txn, request.item_type_id).await?;
        let now = Utc::now();

        let mut available = item_type.available_quantity;
        let mut total = item_type.total_quantity;
        match item_type.tracking {
            TrackingMode::Serial => {
                let unit_id = request.item_unit_id.ok_or(RequestError::UnitNotFound)?;
                let unit = load_unit(&txn, unit_id, item_type.id).await?;
                set_unit_status(&txn, unit, condition, now).await?;
                if condition == UnitStatus::Available {
                    available += 1;
                }
                if !condition.counts_toward_total() {
                    total -= 1;
                }
            }
            // Anything not returned in working order is written off.
            TrackingMode::Quantity => {
                if condition == UnitStatus::Available {
                    available += request.quantity;
                } else {
                    total -= request.quantity;
                }
            }
        }

        let mut type_active: item_types::ActiveModel = item_type.into();
        type_active.total_quantity = Set(total.max(0));
        type_active.available_quantity = Set(available.clamp(0, total.max(0)));
        type_active.updated_at = Set(now);
        type_active.update(&txn).await?;

        movements::ActiveModel {
            request_id: Set(Some(request.id)),
            item_type_id: Set(request.item_type_id),
            item_unit_id: Set(request.item_unit_id),
            quantity: Set(request.quantity),
            kind: Set(MovementKind::Return),
            from_user_id: Set(Some(request.soldier_id)),
            to_user_id: Set(None),
            executed_by: Set(actor.user_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let notes = match (request.notes.clone(), non_empty(input.notes)) {
            (Some(existing), Some(extra)) => Some(format!("{existing}\n{extra}")),
            (existing, extra) => extra.or(existing),
        };

        let from = request.status;
        let mut active: requests::ActiveModel = request.into();
        active.status = Set(RequestStatus::Returned);
        active.returned_at = Set(Some(now));
        active.notes = Set(notes);
        active.updated_at = Set(now);
        let request = active.update(&txn).await?;

        self.commit_transition(txn, actor, Transition::Return, Some(from), request)
            .await
    }

    async fn close(&self, actor: &Actor, id: i32) -> Result<requests::Model, RequestError> {
        let txn = self.store.conn.begin().await?;
        let request = Self::managed_request(&txn, actor, id).await?;
        guard(request.status, RequestStatus::Closed)?;

        let now = Utc::now();
        if request.status == RequestStatus::Overdue {
            let item_type = load_item_type(&txn, request.item_type_id).await?;
            match (item_type.tracking, request.item_unit_id) {
                (TrackingMode::Serial, Some(unit_id)) => {
                    let unit = load_unit(&txn, unit_id, item_type.id).await?;
                    set_unit_status(&txn, unit, UnitStatus::Lost, now).await?;
                }
                (TrackingMode::Serial, None) => {}
                (TrackingMode::Quantity, _) => {
                    let total = (item_type.total_quantity - request.quantity).max(0);
                    let available = item_type.available_quantity.min(total);
                    let mut type_active: item_types::ActiveModel = item_type.into();
                    type_active.total_quantity = Set(total);
                    type_active.available_quantity = Set(available);
                    type_active.updated_at = Set(now);
                    type_active.update(&txn).await?;
                }
            }
        }

        let from = request.status;
        let mut active: requests::ActiveModel = request.into();
        active.status = Set(RequestStatus::Closed);
        active.updated_at = Set(now);
        let request = active.update(&txn).await?;

        self.commit_transition(txn, actor, Transition::Close, Some(from), request)
            .await
    }

    async fn mark_overdue_sweep(&self, now: DateTime<Utc>) -> Result<u64, RequestError> {
        let due = self.store.requests().due_for_overdue(now).await?;
        let actor = Actor::system();
        let mut marked = 0u64;

        for candidate in due {
            match self.mark_one_overdue(&actor, candidate.id).await {
                Ok(true) => marked += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(request_id = candidate.id, error = %e, "Failed to mark request overdue");
                }
            }
        }

        if marked > 0 {
            info!(event = "overdue_sweep", marked, "Overdue requests marked");
        }
        let _ = self
            .event_bus
            .send(NotificationEvent::OverdueSweepFinished { marked });

        Ok(marked)
    }

    async fn list_movements(
        &self,
        actor: &Actor,
        request_id: i32,
    ) -> Result<Vec<movements::Model>, RequestError> {
        self.visible_request(actor, request_id).await?;
        Ok(self.store.requests().movements(request_id).await?)
    }
}
