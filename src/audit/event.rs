//! Capability interfaces of the built-in audit event kinds.
//!
//! Every trait here is a sub-trait of [`AuditEntry`]. An implementor must
//! also return the matching [`EventClass`](super::EventClass) variant from
//! `classify`, otherwise the entry is treated as an extension kind.

use serde_json::Value;

use super::AuditEntry;

/// A user account was created, changed or deleted.
pub trait UserEvent: AuditEntry {
    /// Id of the affected user.
    fn target_id(&self) -> &str;
    /// Snapshot of the user before the change.
    fn before(&self) -> &Value;
    /// Snapshot of the user after the change.
    fn after(&self) -> &Value;
}

/// A websocket API request handled by the server.
pub trait WsApiCall: AuditEntry {
    /// Name of the invoked API method.
    fn api_method(&self) -> &str;
    /// Request UUID as sent by the client.
    fn uuid(&self) -> &str;
    /// Numeric status returned to the client.
    fn status_code(&self) -> i64;
    /// Human readable status.
    fn status_string(&self) -> &str;
    /// Remote endpoint the request came from.
    fn source_endpoint(&self) -> &str;
    /// Time spent handling the request, in milliseconds.
    fn duration_ms(&self) -> u64;
    /// Raw request payload.
    fn request_content(&self) -> &str;
    /// Raw response payload.
    fn response_content(&self) -> &str;
}

/// A schedule was edited.
pub trait ScheduleEvent: AuditEntry {
    /// Id of the affected schedule.
    fn target_id(&self) -> &str;
    /// Snapshot before the change.
    fn before(&self) -> &Value;
    /// Snapshot after the change.
    fn after(&self) -> &Value;
}

/// A group was edited.
pub trait GroupEvent: AuditEntry {
    /// Id of the affected group.
    fn target_id(&self) -> &str;
    /// Snapshot before the change.
    fn before(&self) -> &Value;
    /// Snapshot after the change.
    fn after(&self) -> &Value;
}

/// A credential was edited.
pub trait CredentialEvent: AuditEntry {
    /// Id of the affected credential.
    fn target_id(&self) -> &str;
    /// Snapshot before the change.
    fn before(&self) -> &Value;
    /// Snapshot after the change.
    fn after(&self) -> &Value;
}

/// A door was edited.
pub trait DoorEvent: AuditEntry {
    /// Id of the affected door.
    fn target_id(&self) -> &str;
    /// Snapshot before the change.
    fn before(&self) -> &Value;
    /// Snapshot after the change.
    fn after(&self) -> &Value;
}

/// A user joined or left a group.
pub trait UserGroupMembershipEvent: AuditEntry {
    /// Id of the group.
    fn target_group_id(&self) -> &str;
    /// Id of the member.
    fn target_user_id(&self) -> &str;
    /// Rank of the member inside the group.
    fn rank(&self) -> &str;
}
