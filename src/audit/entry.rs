//! The audit entry identity and its classification into built-in kinds.

use std::any::Any;
use std::fmt;

use chrono::{DateTime, Utc};

use super::event::{
    CredentialEvent, DoorEvent, GroupEvent, ScheduleEvent, UserEvent, UserGroupMembershipEvent,
    WsApiCall,
};

/// A user or service that performed an audited action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique identifier for this principal
    pub id: String,
    /// Display name
    pub name: String,
}

impl Principal {
    /// Creates a principal.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Built-in event kinds plus the catch-all for module-defined kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A user account was created, changed or deleted
    User,
    /// A websocket API call was handled
    WsApiCall,
    /// A schedule was edited
    Schedule,
    /// A group was edited
    Group,
    /// A credential (card, PIN, ...) was edited
    Credential,
    /// A door was edited
    Door,
    /// A user joined or left a group
    UserGroupMembership,
    /// Defined by an extension module; opaque to this crate
    Extension,
}

impl EventKind {
    /// Returns `true` for every kind handled without the fallback chain.
    pub fn is_builtin(self) -> bool {
        !matches!(self, EventKind::Extension)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::User => "user",
            EventKind::WsApiCall => "ws_api_call",
            EventKind::Schedule => "schedule",
            EventKind::Group => "group",
            EventKind::Credential => "credential",
            EventKind::Door => "door",
            EventKind::UserGroupMembership => "user_group_membership",
            EventKind::Extension => "extension",
        };
        write!(f, "{}", s)
    }
}

/// The dynamic capability of an entry, resolved against the closed set of
/// built-in event interfaces.
///
/// The dispatcher matches on this exhaustively; `Extension` is the only arm
/// that reaches the runtime fallback chain.
#[derive(Clone, Copy)]
pub enum EventClass<'a> {
    /// See [`UserEvent`]
    User(&'a dyn UserEvent),
    /// See [`WsApiCall`]
    WsApiCall(&'a dyn WsApiCall),
    /// See [`ScheduleEvent`]
    Schedule(&'a dyn ScheduleEvent),
    /// See [`GroupEvent`]
    Group(&'a dyn GroupEvent),
    /// See [`CredentialEvent`]
    Credential(&'a dyn CredentialEvent),
    /// See [`DoorEvent`]
    Door(&'a dyn DoorEvent),
    /// See [`UserGroupMembershipEvent`]
    UserGroupMembership(&'a dyn UserGroupMembershipEvent),
    /// None of the built-in interfaces
    Extension,
}

impl EventClass<'_> {
    /// Returns the kind tag of this class.
    pub fn kind(&self) -> EventKind {
        match self {
            EventClass::User(_) => EventKind::User,
            EventClass::WsApiCall(_) => EventKind::WsApiCall,
            EventClass::Schedule(_) => EventKind::Schedule,
            EventClass::Group(_) => EventKind::Group,
            EventClass::Credential(_) => EventKind::Credential,
            EventClass::Door(_) => EventKind::Door,
            EventClass::UserGroupMembership(_) => EventKind::UserGroupMembership,
            EventClass::Extension => EventKind::Extension,
        }
    }
}

impl fmt::Debug for EventClass<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventClass({})", self.kind())
    }
}

/// A record of one auditable action.
///
/// Entries are owned by the audit subsystem and only borrowed here. Built-in
/// kinds override [`classify`](Self::classify) to expose their capability
/// interface; extension kinds keep the default and are reached through
/// [`as_any`](Self::as_any) downcasts inside their registered serializer.
///
/// # Examples
///
/// ```
/// use std::any::Any;
/// use audit_serializer::audit::{AuditEntry, EntryHeader, EventKind, Principal};
/// use chrono::{DateTime, Utc};
///
/// struct BadgePrinted {
///     header: EntryHeader,
/// }
///
/// impl AuditEntry for BadgePrinted {
///     fn id(&self) -> &str { &self.header.id }
///     fn timestamp(&self) -> DateTime<Utc> { self.header.timestamp }
///     fn author(&self) -> Option<&Principal> { self.header.author.as_ref() }
///     fn as_any(&self) -> &dyn Any { self }
/// }
///
/// let entry = BadgePrinted { header: EntryHeader::new("7") };
/// assert_eq!(entry.classify().kind(), EventKind::Extension);
/// ```
pub trait AuditEntry: Send + Sync {
    /// Unique identifier of the entry.
    fn id(&self) -> &str;

    /// When the audited action happened.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Who performed the action, if anyone did.
    fn author(&self) -> Option<&Principal>;

    /// Resolves the built-in capability of this entry.
    fn classify(&self) -> EventClass<'_> {
        EventClass::Extension
    }

    /// Access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl dyn AuditEntry + '_ {
    /// Downcasts to a concrete entry type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Identity fields shared by every audit entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryHeader {
    /// Unique identifier
    pub id: String,
    /// When the action happened
    pub timestamp: DateTime<Utc>,
    /// Who performed it
    pub author: Option<Principal>,
}

impl EntryHeader {
    /// Creates a header stamped with the current time and no author.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: Utc::now(),
            author: None,
        }
    }

    /// Sets the timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the author.
    pub fn by(mut self, author: Principal) -> Self {
        self.author = Some(author);
        self
    }
}
