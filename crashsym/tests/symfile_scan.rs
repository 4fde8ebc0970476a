//! Scanning a root of module symbol dumps: skip-and-continue behavior,
//! cache round trip, and the offline native index builder.

use std::fs;
use std::path::Path;

use crashsym::index::{cache, SymbolIndexBuilder};
use crashsym::native::{map_builder, NativeOffsetMap};
use crashsym::report::frames::ManagedFrame;
use crashsym::scan::{scan_root, SymFileReader};

const GOOD_DUMP: &str = "\
MODULE 923f3cab8e1a4f34a582df5aef5bad21 mscorlib.dll
FILE 1 /build/corlib/System/String.cs
FUNC 0x6000001 System.String System.String::get_Length()
0x0 35 3 35 40 1
0x10 36 3 36 21 1
";

fn write(path: &Path, text: &str) {
    fs::write(path, text).unwrap();
}

#[test]
fn test_scan_skips_broken_modules_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("nested")).unwrap();

    write(&root.join("nested/mscorlib.dll.sym"), GOOD_DUMP);
    write(&root.join("broken.sym"), "FUNC 0x1 A A::F()\n"); // no MODULE header
    write(&root.join("notes.txt"), "not a module at all");

    let reader = SymFileReader;
    let mut builder = SymbolIndexBuilder::new();
    let stats = scan_root(&reader, root, &mut builder).unwrap();

    assert_eq!(stats.modules_indexed, 1);
    assert_eq!(stats.modules_skipped, 1);
    assert_eq!(stats.methods_indexed, 1);

    let index = builder.finish();
    let mut frame =
        ManagedFrame::new("923F3CAB8E1A4F34A582DF5AEF5BAD21".to_string(), 0x0600_0001, 0x10);
    assert!(index.try_resolve(&mut frame));
    assert_eq!(frame.start_line, Some(36));
    assert_eq!(frame.source_file.as_deref(), Some("/build/corlib/System/String.cs"));
}

#[test]
fn test_unreadable_root_is_an_error() {
    let reader = SymFileReader;
    let mut builder = SymbolIndexBuilder::new();
    assert!(scan_root(&reader, Path::new("/nonexistent/scan-root"), &mut builder).is_err());
}

#[test]
fn test_scan_then_cache_then_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("modules");
    fs::create_dir(&root).unwrap();
    write(&root.join("mscorlib.dll.sym"), GOOD_DUMP);

    let reader = SymFileReader;
    let mut builder = SymbolIndexBuilder::new();
    scan_root(&reader, &root, &mut builder).unwrap();
    let index = builder.finish();

    let cache_path = dir.path().join("mscorlib.symcache.gz");
    cache::save(&index, &cache_path).unwrap();
    let restored = cache::load(&cache_path).unwrap();

    let mut fresh =
        ManagedFrame::new("923F3CAB8E1A4F34A582DF5AEF5BAD21".to_string(), 0x0600_0001, 0x0);
    let mut cached = fresh.clone();
    assert!(index.try_resolve(&mut fresh));
    assert!(restored.try_resolve(&mut cached));
    assert_eq!(fresh.function, cached.function);
    assert_eq!(fresh.start_line, cached.start_line);
    assert_eq!(fresh.source_file, cached.source_file);
}

#[test]
fn test_native_index_builder_output_is_loadable() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("self.nsym");

    // The test binary itself is a perfectly good ELF with text symbols.
    let binary = Path::new(env!("CARGO_BIN_EXE_crashsym"));
    map_builder::write_native_index(binary, &out).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Name: crashsym"));

    let map = NativeOffsetMap::load(&out).unwrap();
    assert!(!map.is_empty());

    // Every record the builder wrote must resolve through the map.
    let record = lines.find(|l| !l.trim().is_empty()).unwrap();
    let address = record.split_whitespace().next().unwrap();
    assert!(map.resolve(address).is_some());
}
