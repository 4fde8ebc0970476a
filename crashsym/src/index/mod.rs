//! The per-scan-root symbol index.
//!
//! Two parallel mappings keyed by [`MethodKey`]: one to the method's ordered
//! sequence-point table, one to its identity. An index is built once, by a
//! scan or by loading a cache, and is read-only while frames resolve
//! against it.

pub mod cache;

use std::collections::HashMap;

use log::debug;

use crate::domain::{MethodIdentity, MethodKey, SequencePoint};
use crate::report::frames::ManagedFrame;

/// Accumulates method debug information during a scan.
///
/// Consuming the builder with [`SymbolIndexBuilder::finish`] is the only way
/// to obtain a [`SymbolIndex`], which keeps post-scan indexes immutable.
#[derive(Debug, Default)]
pub struct SymbolIndexBuilder {
    lookup: HashMap<MethodKey, Vec<SequencePoint>>,
    types: HashMap<MethodKey, MethodIdentity>,
}

impl SymbolIndexBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the identity and sequence table for one method.
    ///
    /// Re-adding a key overwrites the earlier entry wholesale: last writer
    /// wins, nothing is merged. This is what a re-scan or a duplicate module
    /// on disk produces.
    pub fn add(
        &mut self,
        assembly: &str,
        class: &str,
        function: &str,
        mvid: &str,
        token: u32,
        points: Vec<SequencePoint>,
    ) {
        let key = MethodKey::new(mvid, token);
        if self.lookup.contains_key(&key) {
            debug!("re-adding {key}, earlier entry replaced");
        }
        self.types.insert(
            key.clone(),
            MethodIdentity {
                assembly: assembly.to_string(),
                class: class.to_string(),
                function: function.to_string(),
            },
        );
        self.lookup.insert(key, points);
    }

    /// Number of methods recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Freeze the builder into a read-only index.
    #[must_use]
    pub fn finish(self) -> SymbolIndex {
        SymbolIndex { lookup: self.lookup, types: self.types }
    }
}

/// Read-only mapping from method keys to identities and sequence tables,
/// probed during managed-frame resolution.
#[derive(Debug)]
pub struct SymbolIndex {
    lookup: HashMap<MethodKey, Vec<SequencePoint>>,
    types: HashMap<MethodKey, MethodIdentity>,
}

impl SymbolIndex {
    /// Try to resolve a managed frame against this index.
    ///
    /// Returns `false` and leaves the frame untouched when the frame's
    /// method key is unknown here, so the caller can probe the next index in
    /// priority order. When the key is known, the identity fields are always
    /// filled in; the line/column/file fields are filled only when a
    /// sequence point matches the frame's offset exactly (first match wins),
    /// leaving class-level resolution otherwise.
    pub fn try_resolve(&self, frame: &mut ManagedFrame) -> bool {
        let key = MethodKey::new(&frame.mvid, frame.token);
        let Some(identity) = self.types.get(&key) else {
            return false;
        };

        frame.assembly = Some(identity.assembly.clone());
        frame.class = Some(identity.class.clone());
        frame.function = Some(identity.function.clone());

        if let Some(points) = self.lookup.get(&key) {
            if let Some(point) = points.iter().find(|p| p.il_offset == frame.il_offset) {
                frame.start_line = Some(point.start_line);
                frame.start_col = Some(point.start_col);
                frame.end_line = Some(point.end_line);
                frame.end_col = Some(point.end_col);
                frame.source_file = Some(point.document.clone());
            }
        }
        true
    }

    /// Number of methods indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
