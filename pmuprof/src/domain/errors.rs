//! Structured error types for pmuprof
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Every variant except the I/O passthroughs aborts the run: the input is a
//! fixed log and a fixed pair of binaries, so there is nothing to retry.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Malformed profile line {line} ({content:?}): {reason}")]
    MalformedInput { line: usize, content: String, reason: String },

    #[error("No symbol range contains address {0:#x}")]
    AddressNotFound(u64),

    #[error("Function {0} not found in symbol table")]
    SymbolNotFound(String),

    #[error("Failed to run {tool} on {binary}: {error}")]
    ToolFailed { tool: String, binary: String, error: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_not_found_display() {
        let err = ProfileError::AddressNotFound(0xff00);
        assert_eq!(err.to_string(), "No symbol range contains address 0xff00");
    }

    #[test]
    fn test_malformed_input_display() {
        let err = ProfileError::MalformedInput {
            line: 3,
            content: "ff00 0".to_string(),
            reason: "expected <address> <field> <count>".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("ff00 0"));
    }

    #[test]
    fn test_tool_failed_display() {
        let err = ProfileError::ToolFailed {
            tool: "nm".to_string(),
            binary: "/boot/kernel".to_string(),
            error: "exit status: 1".to_string(),
        };
        assert!(err.to_string().contains("nm"));
        assert!(err.to_string().contains("/boot/kernel"));
    }
}
