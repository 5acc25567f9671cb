use super::*;

use std::collections::BTreeMap;

pub type SignalId = usize;

/// Points at one piece of storage inside a model.
/// `index` selects the element of a memory and is 0 for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    pub signal: SignalId,
    pub index: usize,
}

impl Handle {
    pub fn new(signal: SignalId) -> Handle {
        Handle { signal, index: 0 }
    }

    pub fn element(signal: SignalId, index: usize) -> Handle {
        Handle { signal, index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugKind {
    Input,
    Wire,
    Reg,
    Memory { depth: usize },
    /// Another name for storage that is already exposed under a different path.
    Alias,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugItem {
    pub kind: DebugKind,
    pub width: Width,
    pub handle: Handle,
}

impl DebugItem {
    pub fn new(kind: DebugKind, width: Width, signal: SignalId) -> DebugItem {
        DebugItem {
            kind,
            width,
            handle: Handle::new(signal),
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self.kind, DebugKind::Memory { .. })
    }
}

/// The signals a model exposes for observation, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct DebugItems(BTreeMap<Path, DebugItem>);

impl DebugItems {
    pub fn new() -> DebugItems {
        DebugItems(BTreeMap::new())
    }

    /// # Panics
    ///
    /// If `path` is already present. Paths are fixed by the model, so this
    /// is a bug in the model's `debug_items`.
    pub fn add<P: Into<Path>>(&mut self, path: P, item: DebugItem) {
        let path = path.into();
        assert!(!self.0.contains_key(&path), "Duplicate debug item: {path}");
        self.0.insert(path, item);
    }

    pub fn get<P: Into<Path>>(&self, path: P) -> Option<&DebugItem> {
        self.0.get(&path.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &DebugItem)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only access to the current state of a model.
pub trait Probe {
    fn peek(&self, handle: Handle) -> Value;
}

/// A clocked simulation model driven by a [`CycleDriver`].
///
/// `Default` constructs the model in its reset state. The clock input starts
/// low and only changes through `set_clock`.
pub trait Model: Probe {
    fn set_clock(&mut self, level: bool);

    /// Propagate the current inputs through one evaluation pass.
    fn step(&mut self) -> Result<(), ModelFault>;

    fn debug_items(&self) -> DebugItems;
}
