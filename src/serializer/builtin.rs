//! Serializers for the built-in event kinds.
//!
//! Each one starts from the base envelope, overrides `type`, links its
//! target and adds sensitive attributes only for callers holding
//! [`Action::AuditReadFull`]. Without that permission the keys are absent,
//! not null.

use serde_json::{Value, json};

use super::SerializedDocument;
use super::base::begin;
use crate::audit::{
    CredentialEvent, DoorEvent, EventClass, EventKind, GroupEvent, ScheduleEvent, UserEvent,
    UserGroupMembershipEvent, WsApiCall,
};
use crate::security::{Action, SecurityContext};

/// Type tag of user events.
pub const USER_EVENT: &str = "audit-user-event";
/// Type tag of websocket API calls.
pub const WS_API_CALL: &str = "audit-ws-api-call";
/// Type tag of schedule events.
pub const SCHEDULE_EVENT: &str = "audit-schedule-event";
/// Type tag of group events.
pub const GROUP_EVENT: &str = "audit-group-event";
/// Type tag of credential events.
pub const CREDENTIAL_EVENT: &str = "audit-credential-event";
/// Type tag of door events.
pub const DOOR_EVENT: &str = "audit-door-event";
/// Type tag of user/group membership events.
pub const USER_GROUP_MEMBERSHIP_EVENT: &str = "audit-user-group-membership-event";

/// Returns the fixed type tag of a built-in kind, `None` for extensions.
pub fn type_tag(kind: EventKind) -> Option<&'static str> {
    match kind {
        EventKind::User => Some(USER_EVENT),
        EventKind::WsApiCall => Some(WS_API_CALL),
        EventKind::Schedule => Some(SCHEDULE_EVENT),
        EventKind::Group => Some(GROUP_EVENT),
        EventKind::Credential => Some(CREDENTIAL_EVENT),
        EventKind::Door => Some(DOOR_EVENT),
        EventKind::UserGroupMembership => Some(USER_GROUP_MEMBERSHIP_EVENT),
        EventKind::Extension => None,
    }
}

/// Serializes a classified entry, or returns `None` for extension kinds.
pub fn serialize_builtin(
    class: EventClass<'_>,
    security_context: &dyn SecurityContext,
) -> Option<SerializedDocument> {
    let doc = match class {
        EventClass::User(e) => serialize_user_event(e, security_context),
        EventClass::WsApiCall(e) => serialize_ws_api_call(e, security_context),
        EventClass::Schedule(e) => serialize_schedule_event(e, security_context),
        EventClass::Group(e) => serialize_group_event(e, security_context),
        EventClass::Credential(e) => serialize_credential_event(e, security_context),
        EventClass::Door(e) => serialize_door_event(e, security_context),
        EventClass::UserGroupMembership(e) => {
            serialize_user_group_membership_event(e, security_context)
        }
        EventClass::Extension => return None,
    };
    Some(doc)
}

fn full_read(security_context: &dyn SecurityContext) -> bool {
    security_context.check_permission(Action::AuditReadFull)
}

fn snapshot_document(
    doc: &mut SerializedDocument,
    tag: &str,
    target_id: &str,
    target_type: &str,
    snapshots: Option<(&Value, &Value)>,
) {
    doc.set_type(tag);
    doc.set_target(target_id, target_type);
    if let Some((before, after)) = snapshots {
        doc.set_attribute("before", before.clone());
        doc.set_attribute("after", after.clone());
    }
}

/// Serializes a [`UserEvent`].
pub fn serialize_user_event<E>(
    event: &E,
    security_context: &dyn SecurityContext,
) -> SerializedDocument
where
    E: UserEvent + ?Sized,
{
    let mut doc = begin(event, security_context);
    let snapshots = full_read(security_context).then(|| (event.before(), event.after()));
    snapshot_document(&mut doc, USER_EVENT, event.target_id(), "user", snapshots);
    doc
}

/// Serializes a [`ScheduleEvent`].
pub fn serialize_schedule_event<E>(
    event: &E,
    security_context: &dyn SecurityContext,
) -> SerializedDocument
where
    E: ScheduleEvent + ?Sized,
{
    let mut doc = begin(event, security_context);
    let snapshots = full_read(security_context).then(|| (event.before(), event.after()));
    snapshot_document(&mut doc, SCHEDULE_EVENT, event.target_id(), "schedule", snapshots);
    doc
}

/// Serializes a [`GroupEvent`].
///
/// # Examples
///
/// ```
/// use audit_serializer::audit::{EntryHeader, GroupEventRecord};
/// use audit_serializer::serializer::serialize_group_event;
/// use audit_serializer::PermissionSet;
/// use serde_json::json;
///
/// let header = EntryHeader::new("1");
/// let entry = GroupEventRecord::new(header, "g1", json!({"a": 1}), json!({"a": 2}));
/// let doc = serialize_group_event(&entry, &PermissionSet::new());
///
/// assert_eq!(doc.type_name(), "audit-group-event");
/// assert!(doc.attribute("before").is_none());
/// ```
pub fn serialize_group_event<E>(
    event: &E,
    security_context: &dyn SecurityContext,
) -> SerializedDocument
where
    E: GroupEvent + ?Sized,
{
    let mut doc = begin(event, security_context);
    let snapshots = full_read(security_context).then(|| (event.before(), event.after()));
    snapshot_document(&mut doc, GROUP_EVENT, event.target_id(), "group", snapshots);
    doc
}

/// Serializes a [`CredentialEvent`].
pub fn serialize_credential_event<E>(
    event: &E,
    security_context: &dyn SecurityContext,
) -> SerializedDocument
where
    E: CredentialEvent + ?Sized,
{
    let mut doc = begin(event, security_context);
    let snapshots = full_read(security_context).then(|| (event.before(), event.after()));
    snapshot_document(&mut doc, CREDENTIAL_EVENT, event.target_id(), "credential", snapshots);
    doc
}

/// Serializes a [`DoorEvent`].
pub fn serialize_door_event<E>(
    event: &E,
    security_context: &dyn SecurityContext,
) -> SerializedDocument
where
    E: DoorEvent + ?Sized,
{
    let mut doc = begin(event, security_context);
    let snapshots = full_read(security_context).then(|| (event.before(), event.after()));
    snapshot_document(&mut doc, DOOR_EVENT, event.target_id(), "door", snapshots);
    doc
}

/// Serializes a [`WsApiCall`].
///
/// API calls have no target. The raw request and response payloads are
/// the sensitive part.
pub fn serialize_ws_api_call<E>(
    event: &E,
    security_context: &dyn SecurityContext,
) -> SerializedDocument
where
    E: WsApiCall + ?Sized,
{
    let mut doc = begin(event, security_context);
    doc.set_type(WS_API_CALL);
    doc.set_attribute("api_method", json!(event.api_method()));
    doc.set_attribute("uuid", json!(event.uuid()));
    doc.set_attribute("status_code", json!(event.status_code()));
    doc.set_attribute("status_string", json!(event.status_string()));
    doc.set_attribute("source_endpoint", json!(event.source_endpoint()));
    doc.set_attribute("duration", json!(event.duration_ms()));

    if full_read(security_context) {
        doc.set_attribute("request_content", json!(event.request_content()));
        doc.set_attribute("response_content", json!(event.response_content()));
    }
    doc
}

/// Serializes a [`UserGroupMembershipEvent`].
///
/// The group is the target; the member is linked as `user`.
pub fn serialize_user_group_membership_event<E>(
    event: &E,
    security_context: &dyn SecurityContext,
) -> SerializedDocument
where
    E: UserGroupMembershipEvent + ?Sized,
{
    let mut doc = begin(event, security_context);
    doc.set_type(USER_GROUP_MEMBERSHIP_EVENT);
    doc.set_target(event.target_group_id(), "group");
    doc.set_relationship("user", event.target_user_id(), "user");

    if full_read(security_context) {
        doc.set_attribute("rank", json!(event.rank()));
    }
    doc
}
