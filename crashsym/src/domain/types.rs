//! Identity types for methods and their source mappings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::IndexError;

/// Identifies one method across every module under consideration: the owning
/// module's build-unique id plus the method's metadata token within it.
///
/// The module id is normalized to upper case on construction so that keys
/// built from a crash report and keys built while scanning modules compare
/// equal regardless of how each producer rendered the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub mvid: String,
    pub token: u32,
}

impl MethodKey {
    #[must_use]
    pub fn new(mvid: &str, token: u32) -> Self {
        Self { mvid: mvid.to_uppercase(), token }
    }
}

impl fmt::Display for MethodKey {
    /// Renders the cache-key form, `<module-id>:<token-hex>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:08x}", self.mvid, self.token)
    }
}

impl FromStr for MethodKey {
    type Err = IndexError;

    /// Parses the cache-key form. A string without exactly one `:` separator
    /// is rejected, as is a non-hexadecimal token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            return Err(IndexError::MalformedKey(s.to_string()));
        }
        let token = u32::from_str_radix(parts[1], 16)
            .map_err(|_| IndexError::InvalidToken(s.to_string()))?;
        Ok(Self::new(parts[0], token))
    }
}

/// The human-readable identity of one method. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MethodIdentity {
    pub assembly: String,
    pub class: String,
    pub function: String,
}

/// One recorded association between an instruction offset in a method body
/// and the source range it was compiled from.
///
/// Offsets within a method are not assumed sorted; lookups match an offset
/// exactly rather than taking the nearest entry below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SequencePoint {
    pub il_offset: u32,
    pub start_line: i32,
    pub start_col: i32,
    pub end_line: i32,
    pub end_col: i32,
    pub document: String,
}
