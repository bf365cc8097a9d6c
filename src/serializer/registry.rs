//! Runtime-registered fallback serializers.
//!
//! Extension modules register a [`RuntimeSerializer`] for audit kinds the
//! built-in dispatch does not know. The registry never owns those callables:
//! it keeps a [`Weak`] handle, so a module dropping its `Arc` on unload makes
//! the slot unreachable without telling the registry.
//!
//! The slot list is copy-on-write. Each dispatch loads one immutable
//! snapshot and iterates it without locks; register and disconnect build a
//! new list under a writer mutex and swap it in atomically. Writers never
//! wait on a running callable.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use super::SerializedDocument;
use crate::audit::AuditEntry;
use crate::security::SecurityContext;

const TARGET: &str = "audit_serializer::registry";

type SerializerFn =
    dyn Fn(&dyn AuditEntry, &dyn SecurityContext) -> Option<SerializedDocument> + Send + Sync;

/// A fallback serializer provided by an extension module.
///
/// It returns `None` for entries it cannot represent, letting the next
/// registered serializer try.
pub type RuntimeSerializer = Arc<SerializerFn>;

/// Wraps a closure as a [`RuntimeSerializer`].
///
/// # Examples
///
/// ```
/// use audit_serializer::serializer::runtime_serializer;
///
/// let never = runtime_serializer(|_entry, _sc| None);
/// ```
pub fn runtime_serializer<F>(f: F) -> RuntimeSerializer
where
    F: Fn(&dyn AuditEntry, &dyn SecurityContext) -> Option<SerializedDocument>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Where a new serializer is placed in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Tried before everything already registered
    Front,
    /// Tried after everything already registered
    #[default]
    Back,
}

struct Slot {
    id: u64,
    callable: Weak<SerializerFn>,
    connected: AtomicBool,
}

impl Slot {
    fn is_live(&self) -> bool {
        self.connected.load(Ordering::Acquire) && self.callable.strong_count() > 0
    }
}

struct Shared {
    slots: ArcSwap<Vec<Arc<Slot>>>,
    mutation: Mutex<()>,
    next_id: AtomicU64,
}

impl Shared {
    /// Rebuilds the slot list under the writer lock, dropping dead slots.
    fn mutate(&self, edit: impl FnOnce(&mut Vec<Arc<Slot>>)) -> usize {
        let _guard = self.mutation.lock();
        let current = self.slots.load_full();
        let before = current.len();
        let mut next: Vec<Arc<Slot>> = current.iter().filter(|s| s.is_live()).cloned().collect();
        let pruned = before - next.len();
        if pruned > 0 {
            tracing::trace!(target: TARGET, pruned, "pruned dead serializer slots");
        }
        edit(&mut next);
        let live = next.len();
        self.slots.store(Arc::new(next));
        live
    }

    fn remove(&self, id: u64) {
        let live = self.mutate(|slots| slots.retain(|s| s.id != id));
        tracing::debug!(target: TARGET, slot = id, live, "serializer disconnected");
    }
}

/// Ordered, thread-safe collection of fallback serializers.
///
/// Registration order is priority order: the first serializer registered at
/// the back is tried first, and one registered at the front jumps ahead of
/// everything present at that time. The order never changes between calls
/// except through registration and disconnection.
///
/// # Examples
///
/// ```
/// use audit_serializer::serializer::{runtime_serializer, SerializerRegistry};
///
/// let registry = SerializerRegistry::new();
/// let serializer = runtime_serializer(|_entry, _sc| None);
///
/// let connection = registry.register_serializer(&serializer);
/// assert_eq!(registry.len(), 1);
///
/// connection.disconnect();
/// assert!(registry.is_empty());
/// ```
pub struct SerializerRegistry {
    shared: Arc<Shared>,
}

impl SerializerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                slots: ArcSwap::from_pointee(Vec::new()),
                mutation: Mutex::new(()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Registers `callable` at the back of the fallback chain.
    ///
    /// Only a weak handle is stored. The caller must keep its `Arc` alive
    /// for as long as the serializer should stay active; dropping it has
    /// the same effect as disconnecting.
    pub fn register_serializer(&self, callable: &RuntimeSerializer) -> Connection {
        self.register_serializer_at(callable, Position::Back)
    }

    /// Registers `callable` at the given position.
    pub fn register_serializer_at(
        &self,
        callable: &RuntimeSerializer,
        position: Position,
    ) -> Connection {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let slot = Arc::new(Slot {
            id,
            callable: Arc::downgrade(callable),
            connected: AtomicBool::new(true),
        });

        let inserted = Arc::clone(&slot);
        let live = self.shared.mutate(move |slots| match position {
            Position::Front => slots.insert(0, inserted),
            Position::Back => slots.push(inserted),
        });
        tracing::debug!(target: TARGET, slot = id, ?position, live, "serializer registered");

        Connection {
            slot,
            registry: Arc::downgrade(&self.shared),
        }
    }

    /// Offers `entry` to each live serializer in priority order.
    ///
    /// Returns the first document produced. Serializers after the first
    /// success are not invoked.
    pub fn dispatch_fallback(
        &self,
        entry: &dyn AuditEntry,
        security_context: &dyn SecurityContext,
    ) -> Option<SerializedDocument> {
        let snapshot = self.shared.slots.load_full();
        for slot in snapshot.iter() {
            // Re-checked per slot so a disconnect landing mid-iteration is honoured.
            if !slot.connected.load(Ordering::Acquire) {
                continue;
            }
            let Some(callable) = slot.callable.upgrade() else {
                tracing::trace!(target: TARGET, slot = slot.id, "skipping dropped serializer");
                continue;
            };
            tracing::trace!(
                target: TARGET,
                slot = slot.id,
                entry_id = entry.id(),
                "trying serializer"
            );
            if let Some(doc) = (*callable)(entry, security_context) {
                return Some(doc);
            }
        }
        None
    }

    /// Returns the number of live, connected serializers.
    pub fn len(&self) -> usize {
        self.shared
            .slots
            .load()
            .iter()
            .filter(|s| s.is_live())
            .count()
    }

    /// Returns `true` if no live serializer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Disconnects every serializer.
    pub fn clear(&self) {
        self.shared.mutate(|slots| {
            for slot in slots.drain(..) {
                slot.connected.store(false, Ordering::Release);
            }
        });
        tracing::debug!(target: TARGET, "all serializers disconnected");
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerRegistry")
            .field("live", &self.len())
            .finish()
    }
}

/// Handle to one registration.
///
/// Dropping a `Connection` does not disconnect; use [`scoped`](Self::scoped)
/// for that. A connection never keeps its registry alive, and disconnecting
/// after the registry is gone is a no-op.
#[derive(Clone)]
pub struct Connection {
    slot: Arc<Slot>,
    registry: Weak<Shared>,
}

impl Connection {
    /// Identifier of the registration, unique within its registry.
    pub fn id(&self) -> u64 {
        self.slot.id
    }

    /// Returns `true` while the serializer can still be invoked.
    pub fn connected(&self) -> bool {
        self.slot.is_live() && self.registry.strong_count() > 0
    }

    /// Removes the serializer from future dispatch. Idempotent.
    ///
    /// Once this returns, no dispatch invokes the serializer unless it had
    /// already started calling it.
    pub fn disconnect(&self) {
        if !self.slot.connected.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(shared) = self.registry.upgrade() {
            shared.remove(self.slot.id);
        }
    }

    /// Converts into a guard that disconnects when dropped.
    pub fn scoped(self) -> ScopedConnection {
        ScopedConnection { inner: Some(self) }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.slot.id)
            .field("connected", &self.connected())
            .finish()
    }
}

/// A [`Connection`] that disconnects on drop.
#[derive(Debug)]
pub struct ScopedConnection {
    inner: Option<Connection>,
}

impl ScopedConnection {
    /// Returns the underlying connection without disconnecting it.
    pub fn release(mut self) -> Connection {
        match self.inner.take() {
            Some(connection) => connection,
            None => unreachable!("scoped connection is only emptied by release or drop"),
        }
    }

    /// Returns `true` while the serializer can still be invoked.
    pub fn connected(&self) -> bool {
        self.inner.as_ref().is_some_and(Connection::connected)
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        if let Some(connection) = self.inner.take() {
            connection.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{EntryHeader, GroupEventRecord};
    use crate::security::PermissionSet;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn entry() -> GroupEventRecord {
        GroupEventRecord::new(EntryHeader::new("1"), "g1", json!({}), json!({}))
    }

    fn tagging(tag: &'static str, calls: Arc<AtomicUsize>) -> RuntimeSerializer {
        runtime_serializer(move |_entry, _sc| {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(SerializedDocument::new(tag))
        })
    }

    fn declining(calls: Arc<AtomicUsize>) -> RuntimeSerializer {
        runtime_serializer(move |_entry, _sc| {
            calls.fetch_add(1, Ordering::SeqCst);
            None
        })
    }

    #[test]
    fn empty_registry_yields_nothing() {
        let registry = SerializerRegistry::new();
        assert!(registry.dispatch_fallback(&entry(), &PermissionSet::new()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn first_success_short_circuits() {
        let registry = SerializerRegistry::new();
        let (a_calls, b_calls) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let a = tagging("audit-a", a_calls.clone());
        let b = tagging("audit-b", b_calls.clone());
        let _ca = registry.register_serializer(&a);
        let _cb = registry.register_serializer(&b);

        let doc = registry.dispatch_fallback(&entry(), &PermissionSet::new()).unwrap();
        assert_eq!(doc.type_name(), "audit-a");
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn declining_serializer_continues_chain() {
        let registry = SerializerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let a = declining(calls.clone());
        let b = tagging("audit-b", calls.clone());
        let _ca = registry.register_serializer(&a);
        let _cb = registry.register_serializer(&b);

        let doc = registry.dispatch_fallback(&entry(), &PermissionSet::new()).unwrap();
        assert_eq!(doc.type_name(), "audit-b");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn front_position_takes_priority() {
        let registry = SerializerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let back = tagging("audit-back", calls.clone());
        let front = tagging("audit-front", calls.clone());
        let _cb = registry.register_serializer(&back);
        let _cf = registry.register_serializer_at(&front, Position::Front);

        let doc = registry.dispatch_fallback(&entry(), &PermissionSet::new()).unwrap();
        assert_eq!(doc.type_name(), "audit-front");
    }

    #[test]
    fn disconnect_removes_and_is_idempotent() {
        let registry = SerializerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let a = tagging("audit-a", calls.clone());
        let connection = registry.register_serializer(&a);
        assert!(connection.connected());

        connection.disconnect();
        connection.disconnect();

        assert!(!connection.connected());
        assert!(registry.dispatch_fallback(&entry(), &PermissionSet::new()).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropping_owner_invalidates_slot() {
        let registry = SerializerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let a = tagging("audit-a", calls.clone());
        let connection = registry.register_serializer(&a);
        assert_eq!(registry.len(), 1);

        drop(a);

        assert!(!connection.connected());
        assert_eq!(registry.len(), 0);
        assert!(registry.dispatch_fallback(&entry(), &PermissionSet::new()).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn registry_does_not_extend_callable_lifetime() {
        let registry = SerializerRegistry::new();
        let a = runtime_serializer(|_e, _sc| None);
        let _c = registry.register_serializer(&a);
        assert_eq!(Arc::strong_count(&a), 1);
    }

    #[test]
    fn scoped_connection_disconnects_on_drop() {
        let registry = SerializerRegistry::new();
        let a = runtime_serializer(|_e, _sc| Some(SerializedDocument::new("audit-a")));
        {
            let scoped = registry.register_serializer(&a).scoped();
            assert!(scoped.connected());
            assert_eq!(registry.len(), 1);
        }
        assert!(registry.is_empty());

        let kept = registry.register_serializer(&a).scoped().release();
        assert!(kept.connected());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn connection_outliving_registry_is_harmless() {
        let a = runtime_serializer(|_e, _sc| None);
        let connection = {
            let registry = SerializerRegistry::new();
            registry.register_serializer(&a)
        };
        assert!(!connection.connected());
        connection.disconnect();
    }

    #[test]
    fn clear_disconnects_everything() {
        let registry = SerializerRegistry::new();
        let a = runtime_serializer(|_e, _sc| None);
        let b = runtime_serializer(|_e, _sc| None);
        let ca = registry.register_serializer(&a);
        let cb = registry.register_serializer(&b);

        registry.clear();

        assert!(registry.is_empty());
        assert!(!ca.connected());
        assert!(!cb.connected());
    }

    #[test]
    fn connection_ids_are_unique() {
        let registry = SerializerRegistry::new();
        let a = runtime_serializer(|_e, _sc| None);
        let c1 = registry.register_serializer(&a);
        let c2 = registry.register_serializer(&a);
        assert_ne!(c1.id(), c2.id());
        assert_eq!(registry.len(), 2);
    }
}
