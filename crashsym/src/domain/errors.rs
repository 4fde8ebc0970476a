//! Structured error types for crashsym
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("malformed cache key \"{0}\": expected <module-id>:<token>")]
    MalformedKey(String),

    #[error("cache key \"{0}\" has a non-hexadecimal token")]
    InvalidToken(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ModuleReadError {
    #[error("{path}:{line}: {reason}")]
    Malformed { path: String, line: usize, reason: String },

    #[error("missing MODULE header in {0}")]
    MissingHeader(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CrashDocError {
    #[error("crash document is not valid JSON (even after separator patch): {0}")]
    Unparsable(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SymbolizerError {
    #[error("failed to spawn symbolizer \"{command}\": {reason}")]
    SpawnFailed { command: String, reason: String },

    #[error("symbolizer did not answer within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("symbolizer exited unexpectedly: {0}")]
    Crashed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_key_display() {
        let err = IndexError::MalformedKey("nope".to_string());
        assert_eq!(err.to_string(), "malformed cache key \"nope\": expected <module-id>:<token>");
    }

    #[test]
    fn test_module_read_error_display() {
        let err = ModuleReadError::Malformed {
            path: "a/b.sym".to_string(),
            line: 3,
            reason: "FUNC needs a token".to_string(),
        };
        assert_eq!(err.to_string(), "a/b.sym:3: FUNC needs a token");
    }

    #[test]
    fn test_timeout_display() {
        let err = SymbolizerError::Timeout { timeout_ms: 250 };
        assert!(err.to_string().contains("250ms"));
    }
}
