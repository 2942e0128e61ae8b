/// Pending-operation table shared by the scan-based rules.
///
/// Each entry moves through a small state machine:
///
/// ```text
///   (absent) ──insert──► Pending ──commit──► Committed   (value handed back to be emitted)
///                           │
///                           └─────cancel───► Cancelled   (value handed back, not emitted)
/// ```
///
/// Entries live in an arena in insertion order and are indexed by every wire
/// they hold. At most one pending entry holds a given wire, so "which pending
/// entry does this operation interfere with" is a direct lookup and
/// end-of-scan draining follows insertion order.
use std::collections::HashMap;

use crate::circuit::Wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EntryId(usize);

#[derive(Debug)]
enum EntryState<T> {
    Pending(T),
    Committed,
    Cancelled,
}

#[derive(Debug)]
struct Entry<T> {
    wires: Vec<Wire>,
    state: EntryState<T>,
}

#[derive(Debug)]
pub struct PendingTable<T> {
    entries: Vec<Entry<T>>,
    by_wire: HashMap<Wire, EntryId>,
}

impl<T> Default for PendingTable<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), by_wire: HashMap::new() }
    }
}

impl<T> PendingTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a pending entry holding `wires`.
    ///
    /// Callers commit or cancel whatever held those wires first.
    pub fn insert(&mut self, wires: &[Wire], value: T) -> EntryId {
        let id = EntryId(self.entries.len());
        for &w in wires {
            let previous = self.by_wire.insert(w, id);
            debug_assert!(previous.is_none(), "wire {w} already held by a pending entry");
        }
        self.entries.push(Entry { wires: wires.to_vec(), state: EntryState::Pending(value) });
        id
    }

    /// Let a pending entry also hold `wire`.
    pub fn claim(&mut self, id: EntryId, wire: Wire) {
        let previous = self.by_wire.insert(wire, id);
        debug_assert!(previous.map_or(true, |p| p == id), "wire {wire} already held");
        let entry = &mut self.entries[id.0];
        if !entry.wires.contains(&wire) {
            entry.wires.push(wire);
        }
    }

    /// The pending entry holding `wire`, if any.
    pub fn on_wire(&self, wire: Wire) -> Option<EntryId> {
        self.by_wire.get(&wire).copied()
    }

    pub fn get(&self, id: EntryId) -> Option<&T> {
        match &self.entries[id.0].state {
            EntryState::Pending(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        match &mut self.entries[id.0].state {
            EntryState::Pending(v) => Some(v),
            _ => None,
        }
    }

    /// Pending → Committed. Returns the value for emission.
    pub fn commit(&mut self, id: EntryId) -> Option<T> {
        self.settle(id, EntryState::Committed)
    }

    /// Pending → Cancelled. Returns the value, which must not be emitted.
    pub fn cancel(&mut self, id: EntryId) -> Option<T> {
        self.settle(id, EntryState::Cancelled)
    }

    /// Commit every pending entry holding one of `wires`, in insertion order.
    pub fn commit_touching(&mut self, wires: &[Wire]) -> Vec<T> {
        let mut ids: Vec<EntryId> = wires.iter().filter_map(|w| self.on_wire(*w)).collect();
        ids.sort();
        ids.dedup();
        ids.into_iter().filter_map(|id| self.commit(id)).collect()
    }

    /// Commit everything still pending, in insertion order.
    pub fn drain(&mut self) -> Vec<T> {
        (0..self.entries.len()).filter_map(|i| self.commit(EntryId(i))).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.state, EntryState::Pending(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.by_wire.is_empty()
    }

    fn settle(&mut self, id: EntryId, next: EntryState<T>) -> Option<T> {
        let entry = &mut self.entries[id.0];
        if !matches!(entry.state, EntryState::Pending(_)) {
            return None;
        }
        for w in &entry.wires {
            self.by_wire.remove(w);
        }
        match std::mem::replace(&mut entry.state, next) {
            EntryState::Pending(v) => Some(v),
            _ => None,
        }
    }
}
