//! Native-frame resolution.
//!
//! Addresses are resolved in two stages: the offline offset map (fast,
//! loaded once from a precomputed text index) and, on a miss, the external
//! symbolizer subprocess. The sentinel address crash reports use for frames
//! outside the instrumented runtime short-circuits both.

pub mod map_builder;
pub mod offset_map;
pub mod session;

pub use offset_map::NativeOffsetMap;
pub use session::SymbolizerSession;

/// Address value crash reports use for a frame outside the instrumented
/// runtime module. Resolved immediately to "no name" without consulting the
/// map or the subprocess.
pub const OUTSIDE_RUNTIME_ADDRESS: &str = "outside mono-sgen";

/// The native resolution path handed to a symbolication request. Either
/// stage is optional; with neither configured every address resolves to
/// `None`.
#[derive(Default)]
pub struct NativeResolver {
    map: Option<NativeOffsetMap>,
    session: Option<SymbolizerSession>,
}

impl NativeResolver {
    #[must_use]
    pub fn new(map: Option<NativeOffsetMap>, session: Option<SymbolizerSession>) -> Self {
        Self { map, session }
    }

    /// Resolve one raw address to a display name, or `None` when no
    /// configured source knows it.
    pub fn resolve(&mut self, address: &str) -> Option<String> {
        if address == OUTSIDE_RUNTIME_ADDRESS {
            return None;
        }
        if let Some(map) = &self.map {
            if let Some(name) = map.resolve(address) {
                return Some(name);
            }
        }
        self.session.as_mut().and_then(|session| session.symbolize(address))
    }

    /// Release the symbolizer subprocess, if one was ever started.
    pub fn shutdown(&mut self) {
        if let Some(session) = &mut self.session {
            session.shutdown();
        }
    }
}
