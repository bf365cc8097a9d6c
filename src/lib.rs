//! Permission-filtered serialization of access-control audit entries.
//!
//! This crate turns audit entries (user, door, credential, group and
//! schedule edits, group membership changes, API calls) into structured
//! JSON documents through:
//! - **Built-in dispatch**: entries of the built-in kinds are matched
//!   exhaustively and always handled by their own serializer
//! - **Runtime fallback**: extension modules register serializers for their
//!   own entry kinds; the registry holds them weakly so unloading a module
//!   invalidates its serializer
//! - **Redaction**: sensitive fields are only emitted for callers whose
//!   [`SecurityContext`] grants [`Action::AuditReadFull`]
//!
//! # Core Types
//!
//! - [`PolymorphicSerializer`]: the single `serialize` entry point
//! - [`SerializerRegistry`]: ordered, thread-safe fallback chain
//! - [`SerializedDocument`]: `{ "type", "attributes", "relationships" }`
//! - [`audit::AuditEntry`]: what gets serialized
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use audit_serializer::audit::{EntryHeader, GroupEventRecord};
//! use audit_serializer::{PermissionSet, PolymorphicSerializer, SerializerRegistry};
//! use serde_json::json;
//!
//! let registry = Arc::new(SerializerRegistry::new());
//! let serializer = PolymorphicSerializer::new(registry);
//!
//! let entry = GroupEventRecord::new(
//!     EntryHeader::new("17"),
//!     "g1",
//!     json!({"name": "staff"}),
//!     json!({"name": "employees"}),
//! );
//!
//! // No full-read permission: snapshots are left out.
//! let doc = serializer.serialize(&entry, &PermissionSet::new()).unwrap();
//! assert_eq!(doc.type_name(), "audit-group-event");
//! assert!(doc.attribute("before").is_none());
//! assert_eq!(doc.target(), Some(&json!({"id": "g1", "type": "group"})));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod error;
mod security;
pub mod serializer;

pub use error::{Error, Result};
pub use security::{Action, PermissionSet, SecurityContext, SystemSecurityContext};
pub use serializer::{
    Connection, PolymorphicSerializer, RuntimeSerializer, ScopedConnection, SerializedDocument,
    SerializerRegistry,
};
