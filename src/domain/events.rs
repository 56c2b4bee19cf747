use serde::Serialize;

use super::RequestStatus;

/// Pushed to connected clients over `GET /api/events`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    RequestStatusChanged {
        request_id: i32,
        department_id: i32,
        from: Option<RequestStatus>,
        to: RequestStatus,
    },

    OverdueSweepFinished {
        marked: u64,
    },

    InventorySynced {
        checked: u64,
        fixed: u64,
    },

    SnapshotTaken {
        count: u64,
    },

    LowStock {
        item_type_id: i32,
        name: String,
        available: i32,
        minimum: i32,
    },

    SystemReset,

    Info {
        message: String,
    },
}
