//! Builds the offline native symbol index from a binary's symbol table.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use object::{Object, ObjectSymbol, SymbolKind};
use rustc_demangle::demangle;

/// Write the text index consumed by [`super::NativeOffsetMap`]: a `Name:`
/// header for the binary followed by one `<address> <name>` record per
/// defined text symbol, names demangled.
///
/// # Errors
/// Fails when the binary cannot be read or parsed as an object file, or the
/// output cannot be written.
pub fn write_native_index(binary: &Path, out: &Path) -> Result<()> {
    let data = fs::read(binary)
        .with_context(|| format!("failed to read binary {}", binary.display()))?;
    let obj = object::File::parse(&*data).context("failed to parse object file")?;

    let file = fs::File::create(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let mut writer = BufWriter::new(file);

    let file_name = binary
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    writeln!(writer, "Name: {file_name}")?;

    let mut written = 0usize;
    for symbol in obj.symbols() {
        if symbol.kind() != SymbolKind::Text || symbol.address() == 0 {
            continue;
        }
        let Ok(name) = symbol.name() else { continue };
        if name.is_empty() {
            continue;
        }
        writeln!(writer, "{:x} {:#}", symbol.address(), demangle(name))?;
        written += 1;
    }
    writer.flush()?;

    info!("wrote {written} symbols for {file_name}");
    Ok(())
}
