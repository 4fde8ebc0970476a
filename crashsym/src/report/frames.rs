//! The parsed representation of crash threads and frames.

/// One stack frame from the crash report, tagged by execution mode.
///
/// The two cases carry disjoint field sets; resolution and emission switch
/// on the tag explicitly rather than inspecting field presence.
#[derive(Debug, Clone)]
pub enum CrashFrame {
    Managed(ManagedFrame),
    Native(NativeFrame),
}

/// A frame executing under the managed runtime, identified by module id,
/// method token, and IL offset.
///
/// The resolution fields start out `None` and are written by at most one
/// index, the first one in priority order that knows the method key.
#[derive(Debug, Clone)]
pub struct ManagedFrame {
    pub mvid: String,
    pub token: u32,
    pub il_offset: u32,

    pub assembly: Option<String>,
    pub class: Option<String>,
    pub function: Option<String>,
    pub source_file: Option<String>,
    pub start_line: Option<i32>,
    pub start_col: Option<i32>,
    pub end_line: Option<i32>,
    pub end_col: Option<i32>,
}

impl ManagedFrame {
    #[must_use]
    pub fn new(mvid: String, token: u32, il_offset: u32) -> Self {
        Self {
            mvid,
            token,
            il_offset,
            assembly: None,
            class: None,
            function: None,
            source_file: None,
            start_line: None,
            start_col: None,
            end_line: None,
            end_col: None,
        }
    }

    /// Whether any index recognized this frame's method key.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.assembly.is_some()
    }
}

/// A frame outside the managed runtime, identified only by its raw address.
/// The name stays `None` until native resolution finds one, and stays
/// `None` for the outside-the-runtime sentinel address.
#[derive(Debug, Clone)]
pub struct NativeFrame {
    pub address: String,
    pub name: Option<String>,
}

impl NativeFrame {
    #[must_use]
    pub fn new(address: String) -> Self {
        Self { address, name: None }
    }
}

/// One thread from the crash report. Frame order matches the report and is
/// preserved through emission; nothing is reordered or deduplicated.
#[derive(Debug, Clone, Default)]
pub struct CrashThread {
    pub name: String,
    pub managed: Vec<ManagedFrame>,
    pub native: Vec<NativeFrame>,
}

impl CrashThread {
    /// Route a parsed frame into the list matching its tag.
    pub fn push(&mut self, frame: CrashFrame) {
        match frame {
            CrashFrame::Managed(f) => self.managed.push(f),
            CrashFrame::Native(f) => self.native.push(f),
        }
    }
}
