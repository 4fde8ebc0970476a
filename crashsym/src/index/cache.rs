//! Gzip-compressed persistence for a [`SymbolIndex`].
//!
//! The on-disk document has two top-level mappings, `Lookup` (key string →
//! sequence-point list) and `Types` (key string → method identity), with
//! keys rendered through [`MethodKey`]'s `Display`/`FromStr` pair. Files
//! conventionally end in `.gz` (callers compose `<root>.symcache.gz`). A
//! cache is trusted as-is; nothing checks it against the modules it was
//! built from.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::domain::{IndexError, MethodIdentity, MethodKey, SequencePoint};

use super::SymbolIndex;

#[derive(Serialize, Deserialize)]
struct CacheDocument {
    #[serde(rename = "Lookup")]
    lookup: HashMap<String, Vec<SequencePoint>>,
    #[serde(rename = "Types")]
    types: HashMap<String, MethodIdentity>,
}

/// Persist an index as a gzip-compressed JSON document.
///
/// # Errors
/// Fails when the file cannot be created or written.
pub fn save(index: &SymbolIndex, path: &Path) -> Result<(), IndexError> {
    let doc = CacheDocument {
        lookup: index.lookup.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        types: index.types.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
    };

    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_json::to_writer(&mut encoder, &doc)?;
    let mut inner = encoder.finish()?;
    inner.flush()?;

    debug!("wrote {} methods to {}", index.len(), path.display());
    Ok(())
}

/// Restore an index from a gzip-compressed JSON document.
///
/// # Errors
/// Fails when the file cannot be read or decompressed, the JSON does not
/// match the document shape, or a key string does not parse back into a
/// [`MethodKey`] (a malformed key aborts the load rather than dropping the
/// entry).
pub fn load(path: &Path) -> Result<SymbolIndex, IndexError> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let doc: CacheDocument = serde_json::from_reader(decoder)?;

    let mut lookup = HashMap::with_capacity(doc.lookup.len());
    for (key, points) in doc.lookup {
        lookup.insert(MethodKey::from_str(&key)?, points);
    }
    let mut types = HashMap::with_capacity(doc.types.len());
    for (key, identity) in doc.types {
        types.insert(MethodKey::from_str(&key)?, identity);
    }

    Ok(SymbolIndex { lookup, types })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SymbolIndexBuilder;
    use crate::report::frames::ManagedFrame;

    fn sample_index() -> SymbolIndex {
        let mut builder = SymbolIndexBuilder::new();
        builder.add(
            "Lib.dll",
            "Lib.Widget",
            "Lib.Widget::Spin()",
            "AAAA",
            0x0600_0001,
            vec![SequencePoint {
                il_offset: 0x10,
                start_line: 42,
                start_col: 9,
                end_line: 42,
                end_col: 30,
                document: "widget.cs".to_string(),
            }],
        );
        builder.add("Lib.dll", "Lib.Empty", "Lib.Empty::Noop()", "AAAA", 0x0600_0002, Vec::new());
        builder.finish()
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.symcache.gz");

        let index = sample_index();
        save(&index, &path).unwrap();
        let restored = load(&path).unwrap();
        assert_eq!(restored.len(), index.len());

        let mut before = ManagedFrame::new("AAAA".to_string(), 0x0600_0001, 0x10);
        let mut after = before.clone();
        assert!(index.try_resolve(&mut before));
        assert!(restored.try_resolve(&mut after));
        assert_eq!(before.assembly, after.assembly);
        assert_eq!(before.function, after.function);
        assert_eq!(before.source_file, after.source_file);
        assert_eq!(before.start_line, after.start_line);

        // The method with no sequence points survives as class-level data.
        let mut empty = ManagedFrame::new("AAAA".to_string(), 0x0600_0002, 0);
        assert!(restored.try_resolve(&mut empty));
        assert_eq!(empty.class.as_deref(), Some("Lib.Empty"));
        assert_eq!(empty.start_line, None);
    }

    #[test]
    fn test_malformed_key_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.symcache.gz");

        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder
            .write_all(br#"{"Lookup": {}, "Types": {"no-separator-here": {"Assembly": "a", "Class": "b", "Function": "c"}}}"#)
            .unwrap();
        encoder.finish().unwrap().flush().unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, IndexError::MalformedKey(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load(Path::new("/nonexistent/cache.gz")).unwrap_err();
        assert!(matches!(err, IndexError::Io(_)));
    }
}
