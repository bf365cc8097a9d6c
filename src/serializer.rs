//! Serialization of audit entries into permission-filtered documents.
//!
//! - `serialize_base`: the envelope every document starts from
//! - `serialize_*_event`: one serializer per built-in event kind
//! - `SerializerRegistry`: runtime fallback serializers from extension modules
//! - `PolymorphicSerializer`: picks the right one for any entry

mod base;
mod builtin;
mod dispatch;
mod document;
mod registry;

pub use base::{BASE_TYPE, serialize_base};
pub use builtin::{
    CREDENTIAL_EVENT, DOOR_EVENT, GROUP_EVENT, SCHEDULE_EVENT, USER_EVENT,
    USER_GROUP_MEMBERSHIP_EVENT, WS_API_CALL, serialize_builtin, serialize_credential_event,
    serialize_door_event, serialize_group_event, serialize_schedule_event, serialize_user_event,
    serialize_user_group_membership_event, serialize_ws_api_call, type_tag,
};
pub use dispatch::{PolymorphicSerializer, SerializerBuilder};
pub use document::SerializedDocument;
pub use registry::{
    Connection, Position, RuntimeSerializer, ScopedConnection, SerializerRegistry,
    runtime_serializer,
};
