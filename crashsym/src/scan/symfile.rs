//! Reader for module symbol-dump files.
//!
//! A `.sym` dump is produced out of band by whatever tool can open the real
//! compiled module and its debug companion. The format is line oriented,
//! one record per line:
//!
//! ```text
//! MODULE 923F3CAB8E1A4F34A582DF5AEF5BAD21 mscorlib.dll
//! FILE 1 /build/corlib/System/String.cs
//! FUNC 0x6000001 System.String System.String::get_Length()
//! 0x0 35 3 35 40 1
//! 0xa 36 3 36 21 1
//! ```
//!
//! `FUNC` introduces a method: token, declaring class, then the function
//! signature running to the end of the line. The numeric records that
//! follow map one IL offset to a source range in the file named by the
//! trailing id. A malformed file is reported as one error and the whole
//! module is skipped by the scan.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::domain::{ModuleReadError, SequencePoint};

use super::{MethodDebugRecord, ModuleDebugInfo, ModuleReader};

/// Reads `.sym` module symbol dumps.
#[derive(Debug, Default)]
pub struct SymFileReader;

impl ModuleReader for SymFileReader {
    fn is_candidate(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("sym"))
    }

    fn read_module(&self, path: &Path) -> Result<ModuleDebugInfo, ModuleReadError> {
        let text = fs::read_to_string(path)?;
        parse(path, &text)
    }
}

fn parse(path: &Path, text: &str) -> Result<ModuleDebugInfo, ModuleReadError> {
    let malformed = |line: usize, reason: &str| ModuleReadError::Malformed {
        path: path.display().to_string(),
        line,
        reason: reason.to_string(),
    };

    let mut mvid: Option<String> = None;
    let mut files: HashMap<u32, String> = HashMap::new();
    let mut methods: Vec<MethodDebugRecord> = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw_line.trim_end();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("MODULE ") {
            let id = rest
                .split_whitespace()
                .next()
                .ok_or_else(|| malformed(lineno, "MODULE needs an id"))?;
            mvid = Some(id.to_uppercase());
        } else if let Some(rest) = line.strip_prefix("FILE ") {
            let (id, name) =
                split_record(rest).ok_or_else(|| malformed(lineno, "FILE needs an id and a path"))?;
            let id: u32 =
                id.parse().map_err(|_| malformed(lineno, "FILE id is not a number"))?;
            files.insert(id, name.to_string());
        } else if let Some(rest) = line.strip_prefix("FUNC ") {
            let (token, rest) =
                split_record(rest).ok_or_else(|| malformed(lineno, "FUNC needs a token"))?;
            let (class, function) = split_record(rest)
                .ok_or_else(|| malformed(lineno, "FUNC needs a class and a function name"))?;
            let token =
                parse_hex(token).ok_or_else(|| malformed(lineno, "FUNC token is not hexadecimal"))?;
            methods.push(MethodDebugRecord {
                token,
                class: class.to_string(),
                function: function.to_string(),
                sequence_points: Vec::new(),
            });
        } else {
            let method = methods
                .last_mut()
                .ok_or_else(|| malformed(lineno, "sequence point before any FUNC"))?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 6 {
                return Err(malformed(lineno, "sequence point needs 6 fields"));
            }
            let il_offset =
                parse_hex(fields[0]).ok_or_else(|| malformed(lineno, "offset is not hexadecimal"))?;
            let start_line =
                fields[1].parse().map_err(|_| malformed(lineno, "bad start line"))?;
            let start_col =
                fields[2].parse().map_err(|_| malformed(lineno, "bad start column"))?;
            let end_line = fields[3].parse().map_err(|_| malformed(lineno, "bad end line"))?;
            let end_col = fields[4].parse().map_err(|_| malformed(lineno, "bad end column"))?;
            let file_id: u32 =
                fields[5].parse().map_err(|_| malformed(lineno, "bad file id"))?;
            let document = files.get(&file_id).cloned().unwrap_or_default();
            method.sequence_points.push(SequencePoint {
                il_offset,
                start_line,
                start_col,
                end_line,
                end_col,
                document,
            });
        }
    }

    let mvid = mvid.ok_or_else(|| ModuleReadError::MissingHeader(path.display().to_string()))?;
    Ok(ModuleDebugInfo { mvid, methods })
}

/// Split off the first whitespace-delimited field, returning it and the
/// trimmed remainder.
fn split_record(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let split = s.find(char::is_whitespace)?;
    let (head, tail) = s.split_at(split);
    Some((head, tail.trim_start()))
}

fn parse_hex(s: &str) -> Option<u32> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u32::from_str_radix(digits, 16).ok()
}
