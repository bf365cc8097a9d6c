//! Owned implementations of the built-in event kinds.
//!
//! Callers with their own persistence types implement the capability traits
//! directly; these records cover everyone else.

use std::any::Any;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::event::{
    CredentialEvent, DoorEvent, GroupEvent, ScheduleEvent, UserEvent, UserGroupMembershipEvent,
    WsApiCall,
};
use super::{AuditEntry, EntryHeader, EventClass, Principal};

macro_rules! impl_audit_entry {
    ($record:ty, $variant:ident) => {
        impl AuditEntry for $record {
            fn id(&self) -> &str {
                &self.header.id
            }

            fn timestamp(&self) -> DateTime<Utc> {
                self.header.timestamp
            }

            fn author(&self) -> Option<&Principal> {
                self.header.author.as_ref()
            }

            fn classify(&self) -> EventClass<'_> {
                EventClass::$variant(self)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

macro_rules! snapshot_record {
    ($(#[$doc:meta])* $record:ident, $capability:ident, $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $record {
            /// Identity of the entry
            pub header: EntryHeader,
            /// Id of the edited object
            pub target_id: String,
            /// State before the change
            pub before: Value,
            /// State after the change
            pub after: Value,
        }

        impl $record {
            /// Creates a record describing a change of `target_id`.
            pub fn new(
                header: EntryHeader,
                target_id: impl Into<String>,
                before: Value,
                after: Value,
            ) -> Self {
                Self {
                    header,
                    target_id: target_id.into(),
                    before,
                    after,
                }
            }
        }

        impl_audit_entry!($record, $variant);

        impl $capability for $record {
            fn target_id(&self) -> &str {
                &self.target_id
            }

            fn before(&self) -> &Value {
                &self.before
            }

            fn after(&self) -> &Value {
                &self.after
            }
        }
    };
}

snapshot_record!(
    /// A change to a user account.
    UserEventRecord,
    UserEvent,
    User
);
snapshot_record!(
    /// A change to a schedule.
    ScheduleEventRecord,
    ScheduleEvent,
    Schedule
);
snapshot_record!(
    /// A change to a group.
    ///
    /// ```
    /// use audit_serializer::audit::{EntryHeader, EventKind, AuditEntry, GroupEventRecord};
    /// use serde_json::json;
    ///
    /// let header = EntryHeader::new("1");
    /// let entry = GroupEventRecord::new(header, "g1", json!({}), json!({"name": "ops"}));
    /// assert_eq!(entry.classify().kind(), EventKind::Group);
    /// ```
    GroupEventRecord,
    GroupEvent,
    Group
);
snapshot_record!(
    /// A change to a credential.
    CredentialEventRecord,
    CredentialEvent,
    Credential
);
snapshot_record!(
    /// A change to a door.
    DoorEventRecord,
    DoorEvent,
    Door
);

/// A handled websocket API call.
#[derive(Debug, Clone)]
pub struct WsApiCallRecord {
    /// Identity of the entry
    pub header: EntryHeader,
    /// Invoked API method
    pub api_method: String,
    /// Client-side request UUID
    pub uuid: String,
    /// Status code returned
    pub status_code: i64,
    /// Status message returned
    pub status_string: String,
    /// Remote endpoint
    pub source_endpoint: String,
    /// Handling time in milliseconds
    pub duration_ms: u64,
    /// Raw request
    pub request_content: String,
    /// Raw response
    pub response_content: String,
}

impl WsApiCallRecord {
    /// Creates a record for a call to `api_method` with an empty exchange.
    pub fn new(header: EntryHeader, api_method: impl Into<String>) -> Self {
        Self {
            header,
            api_method: api_method.into(),
            uuid: String::new(),
            status_code: 0,
            status_string: String::new(),
            source_endpoint: String::new(),
            duration_ms: 0,
            request_content: String::new(),
            response_content: String::new(),
        }
    }

    /// Sets the request UUID.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    /// Sets the returned status.
    pub fn with_status(mut self, code: i64, message: impl Into<String>) -> Self {
        self.status_code = code;
        self.status_string = message.into();
        self
    }

    /// Sets the remote endpoint.
    pub fn with_source_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.source_endpoint = endpoint.into();
        self
    }

    /// Sets the handling time.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Sets the raw request and response payloads.
    pub fn with_exchange(
        mut self,
        request: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.request_content = request.into();
        self.response_content = response.into();
        self
    }
}

impl_audit_entry!(WsApiCallRecord, WsApiCall);

impl WsApiCall for WsApiCallRecord {
    fn api_method(&self) -> &str {
        &self.api_method
    }

    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn status_code(&self) -> i64 {
        self.status_code
    }

    fn status_string(&self) -> &str {
        &self.status_string
    }

    fn source_endpoint(&self) -> &str {
        &self.source_endpoint
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    fn request_content(&self) -> &str {
        &self.request_content
    }

    fn response_content(&self) -> &str {
        &self.response_content
    }
}

/// A user joining or leaving a group.
#[derive(Debug, Clone)]
pub struct UserGroupMembershipRecord {
    /// Identity of the entry
    pub header: EntryHeader,
    /// Group id
    pub group_id: String,
    /// Member id
    pub user_id: String,
    /// Member rank inside the group
    pub rank: String,
}

impl UserGroupMembershipRecord {
    /// Creates a membership record.
    pub fn new(
        header: EntryHeader,
        group_id: impl Into<String>,
        user_id: impl Into<String>,
        rank: impl Into<String>,
    ) -> Self {
        Self {
            header,
            group_id: group_id.into(),
            user_id: user_id.into(),
            rank: rank.into(),
        }
    }
}

impl_audit_entry!(UserGroupMembershipRecord, UserGroupMembership);

impl UserGroupMembershipEvent for UserGroupMembershipRecord {
    fn target_group_id(&self) -> &str {
        &self.group_id
    }

    fn target_user_id(&self) -> &str {
        &self.user_id
    }

    fn rank(&self) -> &str {
        &self.rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::EventKind;
    use serde_json::json;

    #[test]
    fn records_classify_as_their_kind() {
        let header = EntryHeader::new("1");
        let user = UserEventRecord::new(header.clone(), "u1", json!(null), json!(null));
        let door = DoorEventRecord::new(header.clone(), "d1", json!(null), json!(null));
        let call = WsApiCallRecord::new(header.clone(), "get_logs");
        let membership = UserGroupMembershipRecord::new(header, "g1", "u1", "member");

        assert_eq!(user.classify().kind(), EventKind::User);
        assert_eq!(door.classify().kind(), EventKind::Door);
        assert_eq!(call.classify().kind(), EventKind::WsApiCall);
        assert_eq!(membership.classify().kind(), EventKind::UserGroupMembership);
    }

    #[test]
    fn classify_exposes_capability_accessors() {
        let entry =
            GroupEventRecord::new(EntryHeader::new("9"), "g1", json!({"a": 1}), json!({"a": 2}));
        match entry.classify() {
            EventClass::Group(group) => {
                assert_eq!(group.target_id(), "g1");
                assert_eq!(group.before(), &json!({"a": 1}));
                assert_eq!(group.after(), &json!({"a": 2}));
                assert_eq!(group.id(), "9");
            }
            other => panic!("unexpected class {:?}", other),
        }
    }

    #[test]
    fn ws_api_call_builder() {
        let call = WsApiCallRecord::new(EntryHeader::new("3"), "user_get")
            .with_uuid("abc")
            .with_status(0, "ok")
            .with_source_endpoint("10.0.0.1:4242")
            .with_duration_ms(12)
            .with_exchange("{\"id\":1}", "{\"user\":{}}");

        assert_eq!(call.api_method(), "user_get");
        assert_eq!(call.uuid(), "abc");
        assert_eq!(call.status_string(), "ok");
        assert_eq!(call.duration_ms(), 12);
        assert_eq!(call.request_content(), "{\"id\":1}");
    }

    #[test]
    fn header_carries_author() {
        let entry = UserGroupMembershipRecord::new(
            EntryHeader::new("5").by(Principal::new("admin", "Admin")),
            "g1",
            "u2",
            "operator",
        );
        assert_eq!(entry.author().map(|p| p.id.as_str()), Some("admin"));
    }
}
