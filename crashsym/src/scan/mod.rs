//! Module scanning.
//!
//! Walks a scan root, opens every candidate module through the
//! [`ModuleReader`] boundary, and feeds each method's debug information into
//! a [`SymbolIndexBuilder`]. A module that fails to open is logged and
//! skipped; the walk continues. Every scan root produces its own index;
//! roots are probed in priority order at resolution time, never merged.

pub mod symfile;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::domain::{ModuleReadError, SequencePoint};
use crate::index::SymbolIndexBuilder;

pub use symfile::SymFileReader;

/// Boundary with the debug-metadata reader collaborator: anything that can
/// open one compiled module (plus its debug companion) and produce
/// per-method sequence tables. The reader's own wire format is its business.
pub trait ModuleReader {
    /// Whether `path` looks like a module this reader can open.
    fn is_candidate(&self, path: &Path) -> bool;

    /// Open the module and extract its identity and method debug records.
    ///
    /// # Errors
    /// Fails when the file is unreadable or is not a valid module; the scan
    /// treats this as skip-and-continue.
    fn read_module(&self, path: &Path) -> Result<ModuleDebugInfo, ModuleReadError>;
}

/// Everything a reader extracts from one module.
#[derive(Debug, Clone)]
pub struct ModuleDebugInfo {
    /// The module's build-unique identity, upper-case hex.
    pub mvid: String,
    pub methods: Vec<MethodDebugRecord>,
}

/// Debug information for one method of a module.
#[derive(Debug, Clone)]
pub struct MethodDebugRecord {
    pub token: u32,
    pub class: String,
    pub function: String,
    pub sequence_points: Vec<SequencePoint>,
}

/// Counters reported back from one scan.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanStats {
    pub modules_indexed: usize,
    pub modules_skipped: usize,
    pub methods_indexed: usize,
}

impl ScanStats {
    /// Fold another scan's counters into this one.
    pub fn absorb(&mut self, other: ScanStats) {
        self.modules_indexed += other.modules_indexed;
        self.modules_skipped += other.modules_skipped;
        self.methods_indexed += other.methods_indexed;
    }
}

/// Walk `root` and add every readable candidate module to `builder`.
///
/// # Errors
/// Fails only when the root directory itself cannot be enumerated;
/// everything below that is per-module and recoverable.
pub fn scan_root<R: ModuleReader>(
    reader: &R,
    root: &Path,
    builder: &mut SymbolIndexBuilder,
) -> Result<ScanStats> {
    let mut stats = ScanStats::default();
    let mut pending = vec![root.to_path_buf()];
    let mut at_root = true;

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if at_root => {
                return Err(e)
                    .with_context(|| format!("failed to read scan root {}", dir.display()));
            }
            Err(e) => {
                warn!("skipping unreadable directory {}: {e}", dir.display());
                continue;
            }
        };
        at_root = false;

        for entry in entries {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if reader.is_candidate(&path) {
                scan_module(reader, &path, builder, &mut stats);
            }
        }
    }

    Ok(stats)
}

fn scan_module<R: ModuleReader>(
    reader: &R,
    path: &Path,
    builder: &mut SymbolIndexBuilder,
    stats: &mut ScanStats,
) {
    let info = match reader.read_module(path) {
        Ok(info) => info,
        Err(e) => {
            warn!("skipping {}: {e}", path.display());
            stats.modules_skipped += 1;
            return;
        }
    };

    let assembly = path.display().to_string();
    debug!("indexed {assembly} as {}", info.mvid);
    for method in info.methods {
        builder.add(
            &assembly,
            &method.class,
            &method.function,
            &info.mvid,
            method.token,
            method.sequence_points,
        );
        stats.methods_indexed += 1;
    }
    stats.modules_indexed += 1;
}
