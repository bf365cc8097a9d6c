//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use audit_serializer::audit::{AuditEntry, Principal};
use audit_serializer::serializer::runtime_serializer;
use audit_serializer::{RuntimeSerializer, SerializedDocument};
use chrono::{DateTime, Utc};

/// An entry kind defined outside the crate, e.g. by a door-controller module.
pub struct BadgePrinted {
    pub id: String,
    pub printer: String,
}

impl BadgePrinted {
    pub fn new(id: &str, printer: &str) -> Self {
        Self {
            id: id.to_string(),
            printer: printer.to_string(),
        }
    }
}

impl AuditEntry for BadgePrinted {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        DateTime::<Utc>::default()
    }

    fn author(&self) -> Option<&Principal> {
        None
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Serializer that counts its invocations and answers with `tag` for
/// every entry.
pub fn accepting(tag: &'static str, calls: &Arc<AtomicUsize>) -> RuntimeSerializer {
    let calls = Arc::clone(calls);
    runtime_serializer(move |entry, _sc| {
        calls.fetch_add(1, Ordering::SeqCst);
        let mut doc = SerializedDocument::new(tag);
        doc.set_id(entry.id());
        Some(doc)
    })
}

/// Serializer that counts its invocations and declines every entry.
pub fn declining(calls: &Arc<AtomicUsize>) -> RuntimeSerializer {
    let calls = Arc::clone(calls);
    runtime_serializer(move |_entry, _sc| {
        calls.fetch_add(1, Ordering::SeqCst);
        None
    })
}

/// Serializer that only handles [`BadgePrinted`].
pub fn badge_serializer() -> RuntimeSerializer {
    runtime_serializer(|entry, _sc| {
        entry.downcast_ref::<BadgePrinted>().map(|badge| {
            let mut doc = SerializedDocument::new("audit-badge-printed");
            doc.set_id(badge.id.clone());
            doc.set_attribute("printer", serde_json::json!(badge.printer));
            doc
        })
    })
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}
