//! The offline native symbol index.
//!
//! The index is built out of band (or by [`super::map_builder`]) and is line
//! oriented: `Name: <file>` switches the object file all following records
//! belong to, and every other non-empty line is `<address> <name> ...`
//! (columns past the name are ignored).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;

/// Static address-to-symbol table, the fast path of native resolution.
#[derive(Debug, Default)]
pub struct NativeOffsetMap {
    entries: HashMap<String, NativeSymbol>,
}

#[derive(Debug, Clone)]
struct NativeSymbol {
    name: String,
    object_file: String,
}

impl NativeOffsetMap {
    /// Load the index from disk.
    ///
    /// # Errors
    /// Fails when the file cannot be read.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Parse the index text. Lines that fit neither record shape are
    /// skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        let mut current_file = String::new();

        for line in text.lines() {
            if let Some(file) = line.strip_prefix("Name:") {
                current_file = file.trim().to_string();
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(address), Some(name)) = (fields.next(), fields.next()) else {
                continue;
            };
            let Some(key) = canonical_address(address) else {
                continue;
            };
            entries.insert(
                key,
                NativeSymbol { name: name.to_string(), object_file: current_file.clone() },
            );
        }

        debug!("native offset map holds {} entries", entries.len());
        Self { entries }
    }

    /// Look up an address, returning a display name combining the symbol and
    /// the object file it came from.
    #[must_use]
    pub fn resolve(&self, address: &str) -> Option<String> {
        let key = canonical_address(address)?;
        self.entries.get(&key).map(|symbol| {
            if symbol.object_file.is_empty() {
                symbol.name.clone()
            } else {
                format!("{} ({})", symbol.name, symbol.object_file)
            }
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical form for address strings so `0x0040121E` and `40121e` hit the
/// same entry. `None` when the string is not hexadecimal.
fn canonical_address(address: &str) -> Option<String> {
    let trimmed = address.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(digits, 16).ok().map(|value| format!("{value:x}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = "\
Name: mono-sgen
40121e mono_handle_native_crash extra columns
0x52f00 mono_runtime_invoke
Name: libc.so.6
1f3a0 __libc_start_main
this line is skipped
";

    #[test]
    fn test_parse_and_resolve() {
        let map = NativeOffsetMap::parse(INDEX);
        assert_eq!(map.len(), 4);
        assert_eq!(
            map.resolve("40121e").as_deref(),
            Some("mono_handle_native_crash (mono-sgen)")
        );
        assert_eq!(map.resolve("1f3a0").as_deref(), Some("__libc_start_main (libc.so.6)"));
    }

    #[test]
    fn test_address_normalization() {
        let map = NativeOffsetMap::parse(INDEX);
        assert_eq!(
            map.resolve("0x0040121E").as_deref(),
            Some("mono_handle_native_crash (mono-sgen)")
        );
        assert_eq!(map.resolve("0x52F00").as_deref(), Some("mono_runtime_invoke (mono-sgen)"));
    }

    #[test]
    fn test_unknown_address_is_a_miss() {
        let map = NativeOffsetMap::parse(INDEX);
        assert_eq!(map.resolve("0xdeadbeef"), None);
    }

    #[test]
    fn test_records_before_any_header_have_no_file() {
        let map = NativeOffsetMap::parse("10 early_symbol\n");
        assert_eq!(map.resolve("0x10").as_deref(), Some("early_symbol"));
    }
}
