//! Native resolution: offline map, resolver staging, and the symbolizer
//! session driven against scripted fake subprocesses.

use std::path::PathBuf;
use std::time::Duration;

use crashsym::native::{
    NativeOffsetMap, NativeResolver, SymbolizerSession, OUTSIDE_RUNTIME_ADDRESS,
};

#[test]
fn test_offset_map_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mono.nsym");
    std::fs::write(&path, "Name: mono-sgen\n40121e mono_handle_native_crash\n").unwrap();

    let map = NativeOffsetMap::load(&path).unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.resolve("0x40121e").as_deref(), Some("mono_handle_native_crash (mono-sgen)"));
}

#[test]
fn test_map_hit_skips_the_session() {
    // The session points at a command that cannot exist; a map hit must
    // never touch it.
    let map = NativeOffsetMap::parse("Name: mono-sgen\n40121e mono_handle_native_crash\n");
    let session = SymbolizerSession::new(
        "/nonexistent/symbolizer-zzz".to_string(),
        PathBuf::from("/bin/true"),
        Duration::from_millis(100),
    );
    let mut resolver = NativeResolver::new(Some(map), Some(session));

    assert_eq!(
        resolver.resolve("0x40121e").as_deref(),
        Some("mono_handle_native_crash (mono-sgen)")
    );
    resolver.shutdown();
}

#[test]
fn test_sentinel_short_circuits_everything() {
    let map = NativeOffsetMap::parse("40121e some_symbol\n");
    let mut resolver = NativeResolver::new(Some(map), None);
    assert_eq!(resolver.resolve(OUTSIDE_RUNTIME_ADDRESS), None);
}

#[cfg(unix)]
mod session {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// Answers every request with `sym_<address>`, speaking the
    /// line-plus-blank protocol the session expects.
    const ECHO_SYMBOLIZER: &str = "#!/bin/sh
while read addr; do
  read blank
  echo \"sym_$addr\"
  echo \"\"
done
";

    /// Accepts requests and never answers them.
    const STALLED_SYMBOLIZER: &str = "#!/bin/sh
while read addr; do
  read blank
  sleep 30
done
";

    #[test]
    fn test_session_request_response_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "fake-symbolizer", ECHO_SYMBOLIZER);

        let mut session = SymbolizerSession::new(
            script.display().to_string(),
            PathBuf::from("/bin/true"),
            Duration::from_secs(5),
        );
        assert_eq!(session.symbolize("0x40121e").as_deref(), Some("sym_0x40121e"));
        assert_eq!(session.symbolize("0x52f00").as_deref(), Some("sym_0x52f00"));

        session.shutdown();
        session.shutdown(); // safe to repeat
    }

    #[test]
    fn test_stalled_subprocess_times_out_and_is_abandoned() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "stalled-symbolizer", STALLED_SYMBOLIZER);

        let mut session = SymbolizerSession::new(
            script.display().to_string(),
            PathBuf::from("/bin/true"),
            Duration::from_millis(200),
        );
        assert_eq!(session.symbolize("0x1000"), None);

        // Abandoned: the second request must fail fast, not wait out
        // another timeout against a dead session.
        let start = std::time::Instant::now();
        assert_eq!(session.symbolize("0x2000"), None);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_spawn_failure_marks_session_unavailable() {
        let mut session = SymbolizerSession::new(
            "/nonexistent/symbolizer-zzz".to_string(),
            PathBuf::from("/bin/true"),
            Duration::from_millis(100),
        );
        assert_eq!(session.symbolize("0x1000"), None);
        assert_eq!(session.symbolize("0x2000"), None);
        session.shutdown();
    }

    #[test]
    fn test_shutdown_without_start_is_a_no_op() {
        let mut session = SymbolizerSession::new(
            "/bin/true".to_string(),
            PathBuf::from("/bin/true"),
            Duration::from_millis(100),
        );
        session.shutdown();
    }
}
