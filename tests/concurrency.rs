//! Serialization racing with module load and unload.

mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use audit_serializer::audit::{EntryHeader, GroupEventRecord};
use audit_serializer::serializer::runtime_serializer;
use audit_serializer::{
    PermissionSet, PolymorphicSerializer, SerializedDocument, SerializerRegistry,
};
use common::{BadgePrinted, badge_serializer, init_tracing};
use serde_json::json;

const READERS: usize = 4;
const ROUNDS: usize = 500;

#[test]
fn serialize_races_register_and_disconnect() {
    init_tracing();
    let registry = Arc::new(SerializerRegistry::new());
    let serializer = PolymorphicSerializer::new(Arc::clone(&registry));

    // Always present so every extension entry has at least one taker.
    let stable = badge_serializer();
    let _stable_connection = registry.register_serializer(&stable);

    let stop = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(READERS + 1));

    let readers: Vec<_> = (0..READERS)
        .map(|i| {
            let serializer = serializer.clone();
            let stop = Arc::clone(&stop);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let badge = BadgePrinted::new(&format!("x{}", i), "lobby");
                let group =
                    GroupEventRecord::new(EntryHeader::new("g"), "g1", json!({}), json!({}));
                let sc = PermissionSet::new();
                barrier.wait();
                let mut served = 0usize;
                while !stop.load(Ordering::Acquire) {
                    let doc = serializer.serialize(&badge, &sc).expect("stable serializer present");
                    assert!(
                        matches!(doc.type_name(), "audit-badge-printed" | "audit-transient"),
                        "unexpected type {}",
                        doc.type_name()
                    );
                    let doc = serializer.serialize(&group, &sc).expect("built-in kind");
                    assert_eq!(doc.type_name(), "audit-group-event");
                    served += 1;
                }
                served
            })
        })
        .collect();

    barrier.wait();
    for _ in 0..ROUNDS {
        let transient =
            runtime_serializer(|_entry, _sc| Some(SerializedDocument::new("audit-transient")));
        let connection = registry.register_serializer_at(
            &transient,
            audit_serializer::serializer::Position::Front,
        );
        thread::yield_now();
        connection.disconnect();
    }
    stop.store(true, Ordering::Release);

    for reader in readers {
        reader.join().expect("reader thread panicked");
    }
    assert_eq!(registry.len(), 1);
}

#[test]
fn disconnected_serializer_is_not_called_after_disconnect_returns() {
    init_tracing();
    let registry = Arc::new(SerializerRegistry::new());
    let serializer = PolymorphicSerializer::new(Arc::clone(&registry));
    let stable = badge_serializer();
    let _stable_connection = registry.register_serializer(&stable);

    let disconnected = Arc::new(AtomicBool::new(false));
    let late_calls = Arc::new(AtomicUsize::new(0));

    let tracked = {
        let disconnected = Arc::clone(&disconnected);
        let late_calls = Arc::clone(&late_calls);
        runtime_serializer(move |_entry, _sc| {
            if disconnected.load(Ordering::SeqCst) {
                late_calls.fetch_add(1, Ordering::SeqCst);
            }
            None
        })
    };
    let connection = registry.register_serializer_at(
        &tracked,
        audit_serializer::serializer::Position::Front,
    );

    connection.disconnect();
    disconnected.store(true, Ordering::SeqCst);

    let handles: Vec<_> = (0..READERS)
        .map(|i| {
            let serializer = serializer.clone();
            thread::spawn(move || {
                let badge = BadgePrinted::new(&format!("x{}", i), "lobby");
                for _ in 0..ROUNDS {
                    serializer
                        .serialize(&badge, &PermissionSet::new())
                        .expect("stable serializer present");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("reader thread panicked");
    }

    assert_eq!(late_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn concurrent_registrations_are_all_kept() {
    init_tracing();
    let registry = Arc::new(SerializerRegistry::new());
    let barrier = Arc::new(Barrier::new(READERS));

    let handles: Vec<_> = (0..READERS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let serializers: Vec<_> =
                    (0..25).map(|_| runtime_serializer(|_e, _sc| None)).collect();
                barrier.wait();
                let connections: Vec<_> = serializers
                    .iter()
                    .map(|s| registry.register_serializer(s))
                    .collect();
                (serializers, connections)
            })
        })
        .collect();

    let kept: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("registering thread panicked"))
        .collect();

    assert_eq!(registry.len(), READERS * 25);
    drop(kept);
    assert!(registry.is_empty());
}
