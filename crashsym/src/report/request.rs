//! Crash report parsing and frame resolution.

use log::{debug, warn};
use serde_json::Value;

use crate::domain::CrashDocError;
use crate::index::SymbolIndex;
use crate::native::NativeResolver;

use super::frames::{CrashFrame, CrashThread, ManagedFrame, NativeFrame};

/// A parsed crash report, ready to resolve and emit.
///
/// Threads appear in input order, one entry per thread object in the
/// payload; a thread with no frame lists at all still yields a
/// present-but-empty entry rather than a gap.
#[derive(Debug)]
pub struct SymbolicationRequest {
    pub threads: Vec<CrashThread>,
}

/// Counters for the end-of-run summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveStats {
    pub managed_resolved: usize,
    pub managed_unresolved: usize,
    pub native_resolved: usize,
    pub native_unresolved: usize,
}

impl SymbolicationRequest {
    /// Parse a raw crash payload.
    ///
    /// The one known malformation of these reports (a missing `,` before
    /// the `"EventType":` key) is patched textually before JSON parsing. A
    /// document that still fails to parse is a fatal format error.
    ///
    /// # Errors
    /// Returns [`CrashDocError::Unparsable`] when the patched text is not
    /// valid JSON.
    pub fn parse(text: &str) -> Result<Self, CrashDocError> {
        let patched = patch_missing_separator(text);
        let doc: Value = serde_json::from_str(&patched).map_err(CrashDocError::Unparsable)?;

        let mut threads = Vec::new();
        let Some(raw_threads) = doc["payload"]["threads"].as_array() else {
            warn!("crash document has no payload.threads list");
            return Ok(Self { threads });
        };

        for raw in raw_threads {
            let mut thread = CrashThread {
                name: raw["name"].as_str().unwrap_or("").to_string(),
                ..CrashThread::default()
            };
            // A missing frame list is an empty one, not an error.
            for list in ["managed_frames", "unmanaged_frames"] {
                if let Some(frames) = raw[list].as_array() {
                    for frame in frames {
                        thread.push(parse_frame(frame));
                    }
                }
            }
            threads.push(thread);
        }

        Ok(Self { threads })
    }

    /// Resolve every frame in place.
    ///
    /// Managed frames probe `indexes` in priority order and stop at the
    /// first one that knows the method key; native frames go through the
    /// sentinel check, the offline map, then the symbolizer session.
    /// Frames no source recognizes stay as parsed; unresolved is a valid
    /// terminal state, not an error.
    pub fn resolve(&mut self, indexes: &[SymbolIndex], native: &mut NativeResolver) -> ResolveStats {
        let mut stats = ResolveStats::default();

        for thread in &mut self.threads {
            for frame in &mut thread.managed {
                if indexes.iter().any(|index| index.try_resolve(frame)) {
                    stats.managed_resolved += 1;
                } else {
                    debug!("no index knows {}:{:x}", frame.mvid, frame.token);
                    stats.managed_unresolved += 1;
                }
            }
            for frame in &mut thread.native {
                match native.resolve(&frame.address) {
                    Some(name) => {
                        frame.name = Some(name);
                        stats.native_resolved += 1;
                    }
                    None => stats.native_unresolved += 1,
                }
            }
        }

        stats
    }
}

/// Parse one frame object, switching on the managed discriminator.
///
/// A frame with `is_managed == "true"` and well-formed key fields is
/// managed; everything else (missing or false discriminator, missing or
/// malformed key fields) is kept as a native frame so it still appears in
/// the output.
fn parse_frame(frame: &Value) -> CrashFrame {
    if frame["is_managed"].as_str() == Some("true") {
        let guid = frame["guid"].as_str();
        let token = frame["token"].as_str().and_then(parse_hex_u32);
        let offset = frame["il_offset"].as_str().and_then(parse_hex_u32);
        if let (Some(guid), Some(token), Some(offset)) = (guid, token, offset) {
            return CrashFrame::Managed(ManagedFrame::new(guid.to_string(), token, offset));
        }
        warn!("managed frame is missing guid/token/il_offset, keeping it as native");
    }

    CrashFrame::Native(NativeFrame::new(
        frame["native_address"].as_str().unwrap_or("").to_string(),
    ))
}

/// Parse a hex string, tolerating an optional `0x` prefix.
fn parse_hex_u32(s: &str) -> Option<u32> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u32::from_str_radix(digits, 16).ok()
}

/// Insert the comma the crash writer forgets before its literal
/// `"EventType":` key.
///
/// The patch fires only where the preceding non-whitespace character is a
/// closing quote, which is the exact malformation, so well-formed documents
/// pass through unchanged.
fn patch_missing_separator(text: &str) -> String {
    const KEY: &str = "\"EventType\"";

    if !text.contains(KEY) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + 4);
    let mut rest = text;
    while let Some(pos) = rest.find(KEY) {
        let (before, tail) = rest.split_at(pos);
        out.push_str(before);
        if out.trim_end().ends_with('"') {
            out.push(',');
        }
        out.push_str(KEY);
        rest = &tail[KEY.len()..];
    }
    out.push_str(rest);
    out
}
