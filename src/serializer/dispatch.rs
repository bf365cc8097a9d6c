//! The single entry point turning any audit entry into a document.

use std::sync::Arc;

use super::base::ensure_overridden;
use super::builtin::{serialize_builtin, type_tag};
use super::{SerializedDocument, SerializerRegistry};
use crate::audit::{AuditEntry, EventKind};
use crate::error::{Error, Result};
use crate::security::SecurityContext;

const TARGET: &str = "audit_serializer::dispatch";

/// Serializes audit entries of any kind.
///
/// Built-in kinds are resolved through [`AuditEntry::classify`] and always
/// go to their built-in serializer, even when a registered fallback would
/// also accept them. Everything else is offered to the registry's fallback
/// chain. An entry nobody can represent is an
/// [`Error::NoMatchingSerializer`], never an empty document.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use audit_serializer::audit::{EntryHeader, GroupEventRecord};
/// use audit_serializer::{Action, PermissionSet, PolymorphicSerializer, SerializerRegistry};
/// use serde_json::json;
///
/// let serializer = PolymorphicSerializer::new(Arc::new(SerializerRegistry::new()));
/// let header = EntryHeader::new("1");
/// let entry = GroupEventRecord::new(header, "g1", json!({"a": 1}), json!({"a": 2}));
///
/// let sc = PermissionSet::new().grant(Action::AuditReadFull);
/// let doc = serializer.serialize(&entry, &sc).unwrap();
///
/// assert_eq!(doc.type_name(), "audit-group-event");
/// assert_eq!(doc.attribute("after"), Some(&json!({"a": 2})));
/// ```
#[derive(Debug, Clone)]
pub struct PolymorphicSerializer {
    registry: Arc<SerializerRegistry>,
    fallback: bool,
}

impl PolymorphicSerializer {
    /// Creates a dispatcher over `registry` with fallback enabled.
    pub fn new(registry: Arc<SerializerRegistry>) -> Self {
        Self {
            registry,
            fallback: true,
        }
    }

    /// Starts configuring a dispatcher.
    pub fn builder() -> SerializerBuilder {
        SerializerBuilder::default()
    }

    /// Returns the registry extension modules register with.
    pub fn registry(&self) -> &Arc<SerializerRegistry> {
        &self.registry
    }

    /// Serializes `entry` for a caller holding `security_context`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMatchingSerializer`] when the entry is not a
    /// built-in kind and no registered serializer accepts it.
    ///
    /// # Panics
    ///
    /// Panics if a built-in serializer leaves the placeholder type in place.
    pub fn serialize(
        &self,
        entry: &dyn AuditEntry,
        security_context: &dyn SecurityContext,
    ) -> Result<SerializedDocument> {
        let class = entry.classify();
        let kind = class.kind();

        if let Some(doc) = serialize_builtin(class, security_context) {
            ensure_overridden(&doc, kind);
            tracing::debug!(
                target: TARGET,
                entry_id = entry.id(),
                %kind,
                route = "builtin",
                "audit entry serialized"
            );
            return Ok(doc);
        }

        match self.fallback(entry, security_context) {
            Some(doc) => {
                tracing::debug!(
                    target: TARGET,
                    entry_id = entry.id(),
                    %kind,
                    route = "fallback",
                    doc_type = doc.type_name(),
                    "audit entry serialized"
                );
                Ok(doc)
            }
            None => {
                tracing::warn!(
                    target: TARGET,
                    entry_id = entry.id(),
                    "no serializer for audit entry"
                );
                Err(Error::no_match(entry.id()))
            }
        }
    }

    /// Returns the type tag `serialize` would produce, e.g.
    /// `"audit-user-event"`.
    ///
    /// Built-in kinds are answered without building a document.
    ///
    /// # Errors
    ///
    /// Same as [`serialize`](Self::serialize) for extension kinds.
    pub fn type_name(
        &self,
        entry: &dyn AuditEntry,
        security_context: &dyn SecurityContext,
    ) -> Result<String> {
        match type_tag(entry.classify().kind()) {
            Some(tag) => Ok(tag.to_string()),
            None => self
                .serialize(entry, security_context)
                .map(|doc| doc.type_name().to_string()),
        }
    }

    /// Serializes `entry` and encodes it as a JSON string.
    pub fn to_json_string(
        &self,
        entry: &dyn AuditEntry,
        security_context: &dyn SecurityContext,
    ) -> Result<String> {
        self.serialize(entry, security_context)?.to_json_string()
    }

    /// Serializes several entries, one result per entry, in input order.
    ///
    /// A failure for one entry does not stop the others, so listings can
    /// skip entries that are [`no match`](Error::is_no_match).
    pub fn serialize_many<'a, I>(
        &self,
        entries: I,
        security_context: &dyn SecurityContext,
    ) -> Vec<Result<SerializedDocument>>
    where
        I: IntoIterator<Item = &'a dyn AuditEntry>,
    {
        entries
            .into_iter()
            .map(|entry| self.serialize(entry, security_context))
            .collect()
    }

    fn fallback(
        &self,
        entry: &dyn AuditEntry,
        security_context: &dyn SecurityContext,
    ) -> Option<SerializedDocument> {
        debug_assert_eq!(entry.classify().kind(), EventKind::Extension);
        if !self.fallback {
            return None;
        }
        self.registry.dispatch_fallback(entry, security_context)
    }
}

/// Builder for [`PolymorphicSerializer`].
///
/// ```
/// use std::sync::Arc;
/// use audit_serializer::{PolymorphicSerializer, SerializerRegistry};
///
/// let registry = Arc::new(SerializerRegistry::new());
/// let serializer = PolymorphicSerializer::builder()
///     .registry(Arc::clone(&registry))
///     .fallback(false)
///     .build();
///
/// assert!(Arc::ptr_eq(serializer.registry(), &registry));
/// ```
#[derive(Debug)]
pub struct SerializerBuilder {
    registry: Option<Arc<SerializerRegistry>>,
    fallback: bool,
}

impl Default for SerializerBuilder {
    fn default() -> Self {
        Self {
            registry: None,
            fallback: true,
        }
    }
}

impl SerializerBuilder {
    /// Shares an existing registry. Defaults to a fresh empty one.
    pub fn registry(mut self, registry: Arc<SerializerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Enables or disables the runtime fallback chain. Enabled by default.
    ///
    /// With fallback disabled, registered serializers are never invoked and
    /// extension kinds report [`Error::NoMatchingSerializer`].
    pub fn fallback(mut self, enabled: bool) -> Self {
        self.fallback = enabled;
        self
    }

    /// Builds the dispatcher.
    pub fn build(self) -> PolymorphicSerializer {
        PolymorphicSerializer {
            registry: self.registry.unwrap_or_default(),
            fallback: self.fallback,
        }
    }
}
