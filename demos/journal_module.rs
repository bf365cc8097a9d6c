//! Extension module lifecycle demonstration.
//!
//! This example plays the part of a journal-logger module that ships its own
//! audit entry kind:
//! 1. Built-in entries serialize without any module loaded
//! 2. Loading the module registers a serializer for its entry kind
//! 3. Unloading the module drops that serializer
//! 4. The module's entries then report "no matching serializer"
//!
//! Run with: `cargo run --example journal_module`

use std::any::Any;
use std::sync::Arc;

use audit_serializer::audit::{AuditEntry, EntryHeader, Principal, UserEventRecord};
use audit_serializer::serializer::{runtime_serializer, serialize_base};
use audit_serializer::{
    Action, Connection, PermissionSet, PolymorphicSerializer, RuntimeSerializer,
    SerializerRegistry,
};
use chrono::{DateTime, Utc};
use serde_json::json;

/// Audit entry written when the journal flushes a batch to disk.
struct JournalFlushed {
    header: EntryHeader,
    path: String,
    records: u64,
}

impl AuditEntry for JournalFlushed {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.header.timestamp
    }

    fn author(&self) -> Option<&Principal> {
        self.header.author.as_ref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A loaded module instance. Owns its serializer; the registry only
/// refers to it.
struct JournalModule {
    serializer: RuntimeSerializer,
    connection: Connection,
}

impl JournalModule {
    fn load(registry: &SerializerRegistry) -> Self {
        let serializer = runtime_serializer(|entry, sc| {
            let flushed = entry.downcast_ref::<JournalFlushed>()?;
            let mut doc = serialize_base(flushed, sc);
            doc.set_type("audit-journal-flushed");
            doc.set_attribute("records", json!(flushed.records));
            if sc.check_permission(Action::AuditReadFull) {
                doc.set_attribute("path", json!(flushed.path));
            }
            Some(doc)
        });
        let connection = registry.register_serializer(&serializer);
        Self {
            serializer,
            connection,
        }
    }

    fn unload(self) {
        let Self {
            serializer,
            connection,
        } = self;
        drop(serializer);
        println!("  connection still live after unload: {}", connection.connected());
    }
}

fn main() {
    println!("=== Journal Module Example ===\n");

    let registry = Arc::new(SerializerRegistry::new());
    let serializer = PolymorphicSerializer::new(Arc::clone(&registry));
    let auditor = PermissionSet::new().grant(Action::AuditRead);
    let admin = auditor.clone().grant(Action::AuditReadFull);

    // Scenario 1: built-in kinds need no module
    println!("--- Scenario 1: Built-in Entry ---");
    let user_edit = UserEventRecord::new(
        EntryHeader::new("100").by(Principal::new("1", "admin")),
        "42",
        json!({"firstname": "Jon"}),
        json!({"firstname": "John"}),
    );
    match serializer.to_json_string(&user_edit, &auditor) {
        Ok(text) => println!("✓ auditor view: {}", text),
        Err(err) => println!("✗ {}", err),
    }

    let flushed = JournalFlushed {
        header: EntryHeader::new("101"),
        path: "/var/log/access/journal.db".to_string(),
        records: 128,
    };

    // Scenario 2: module loaded
    println!("\n--- Scenario 2: Module Loaded ---");
    let module = JournalModule::load(&registry);
    println!("  registered serializers: {}", registry.len());
    for (who, sc) in [("auditor", &auditor), ("admin", &admin)] {
        match serializer.to_json_string(&flushed, sc) {
            Ok(text) => println!("✓ {} view: {}", who, text),
            Err(err) => println!("✗ {}", err),
        }
    }

    // Scenario 3: module unloaded
    println!("\n--- Scenario 3: Module Unloaded ---");
    module.unload();
    match serializer.serialize(&flushed, &admin) {
        Ok(doc) => println!("✗ unexpectedly serialized as {}", doc.type_name()),
        Err(err) if err.is_no_match() => println!("✓ {}", err),
        Err(err) => println!("✗ {}", err),
    }
    println!("  registered serializers: {}", registry.len());

    println!("\n=== Example Complete ===");
}
