//! Audit entry model.
//!
//! This module provides:
//! - `AuditEntry`: identity shared by every audited action
//! - `EventClass` / `EventKind`: resolution of an entry against the closed
//!   set of built-in event kinds
//! - One capability trait per built-in kind (`GroupEvent`, `DoorEvent`, ...)
//! - Owned records implementing those traits
//!
//! Kinds defined by extension modules implement only `AuditEntry` and are
//! invisible to built-in dispatch.

mod entry;
mod event;
mod record;

pub use entry::{AuditEntry, EntryHeader, EventClass, EventKind, Principal};
pub use event::{
    CredentialEvent, DoorEvent, GroupEvent, ScheduleEvent, UserEvent, UserGroupMembershipEvent,
    WsApiCall,
};
pub use record::{
    CredentialEventRecord, DoorEventRecord, GroupEventRecord, ScheduleEventRecord,
    UserEventRecord, UserGroupMembershipRecord, WsApiCallRecord,
};
