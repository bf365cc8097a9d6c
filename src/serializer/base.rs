//! The envelope shared by every audit document.

use chrono::SecondsFormat;
use serde_json::Value;

use super::SerializedDocument;
use crate::audit::{AuditEntry, EventKind};
use crate::security::SecurityContext;

/// Placeholder type tag written by [`serialize_base`].
///
/// Built-in serializers always replace it; seeing it in output means a
/// serializer skipped its override.
pub const BASE_TYPE: &str = "audit-entry";

/// Produces the common envelope for `entry`.
///
/// Sets `id`, the provisional `type`, `attributes.timestamp` (RFC 3339, UTC,
/// with fractional seconds only when present)
/// and, when the entry has an author, `relationships.author`.
///
/// The security context is accepted for symmetry with kind-specific
/// serializers; nothing in the envelope is permission-gated.
pub fn serialize_base<E>(entry: &E, _security_context: &dyn SecurityContext) -> SerializedDocument
where
    E: AuditEntry + ?Sized,
{
    let mut doc = SerializedDocument::new(BASE_TYPE);
    doc.set_id(entry.id());
    doc.set_attribute(
        "timestamp",
        Value::String(
            entry
                .timestamp()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ),
    );
    if let Some(author) = entry.author() {
        doc.set_relationship("author", &author.id, "user");
    }
    doc
}

/// Runs the base serializer and checks the envelope before a built-in
/// serializer overrides its type.
///
/// # Panics
///
/// Panics if the base produced a `type` that is not a string. That is a
/// defect in this crate, never a data problem.
pub(crate) fn begin<E>(entry: &E, security_context: &dyn SecurityContext) -> SerializedDocument
where
    E: AuditEntry + ?Sized,
{
    let doc = serialize_base(entry, security_context);
    ensure_overridable(&doc);
    doc
}

/// Checks that a built-in serializer replaced the placeholder type.
///
/// # Panics
///
/// Panics if `doc` still carries [`BASE_TYPE`].
pub(crate) fn ensure_overridden(doc: &SerializedDocument, kind: EventKind) {
    assert_ne!(
        doc.type_name(),
        BASE_TYPE,
        "built-in serializer for {} did not override the audit type",
        kind
    );
}

/// Checks that the envelope `type` is a string a serializer can override.
fn ensure_overridable(doc: &SerializedDocument) {
    assert!(
        doc.raw_type().is_some_and(Value::is_string),
        "base audit serialization did something unexpected"
    );
}
