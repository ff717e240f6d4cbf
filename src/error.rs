//! Error kinds for registration and command execution.
//!
//! Registration problems surface immediately as [`ConfigError`] and are
//! fatal to that call.  Handler failures surface as [`RunError`] and are
//! intercepted at the dispatch boundary: a usage error is reported on a
//! single line with exit status 0, anything else produces a multi-line
//! diagnostic block and the failure's carried exit code.

use thiserror::Error;

// ── Registration errors ───────────────────────────────────────────────────────

/// Invalid command registration.  Never deferred: raised at the
/// registration call itself.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid arguments: command name must not be empty")]
    EmptyName,
    #[error("invalid handler for command `{0}`")]
    InvalidHandler(String),
}

// ── Execution errors ──────────────────────────────────────────────────────────

/// Failure surfaced by a command handler.
#[derive(Debug, Error)]
pub enum RunError {
    /// Malformed user input for the resolved command.  Reported as one
    /// line; the process still exits 0.
    #[error("{0}")]
    Usage(String),

    /// Any other failure.  `code` becomes the exit status (−1 when absent);
    /// `cause` carries the causal chain printed in the diagnostic block.
    #[error("{message}")]
    Failure {
        code: Option<i32>,
        message: String,
        cause: Option<anyhow::Error>,
    },
}

impl RunError {
    pub fn usage(message: impl Into<String>) -> Self {
        RunError::Usage(message.into())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        RunError::Failure {
            code: None,
            message: message.into(),
            cause: None,
        }
    }

    pub fn failure_with_code(code: i32, message: impl Into<String>) -> Self {
        RunError::Failure {
            code: Some(code),
            message: message.into(),
            cause: None,
        }
    }

    /// The exit status this failure maps to at the dispatch boundary.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Usage(_) => 0,
            RunError::Failure { code, .. } => code.unwrap_or(-1),
        }
    }
}

impl From<anyhow::Error> for RunError {
    fn from(err: anyhow::Error) -> Self {
        RunError::Failure {
            code: None,
            message: err.to_string(),
            cause: Some(err),
        }
    }
}

// ── Diagnostic rendering ──────────────────────────────────────────────────────

/// Formats the multi-line diagnostic block for an unexpected failure:
/// kind and exit code, message, originating command, then the causal trace
/// walked from the carried error chain.
pub fn diagnostic_block(command: &str, err: &RunError) -> String {
    match err {
        RunError::Usage(message) => format!("ERROR: {message}"),
        RunError::Failure {
            code,
            message,
            cause,
        } => {
            let code = code.unwrap_or(-1);
            let mut block = format!("Error({code}): {message}\nCommand: {command}");
            if let Some(cause) = cause {
                let causes: Vec<String> = cause
                    .chain()
                    .skip(1)
                    .enumerate()
                    .map(|(i, cause)| format!("  {i}: {cause}"))
                    .collect();
                if !causes.is_empty() {
                    block.push_str("\nTrace:\n");
                    block.push_str(&causes.join("\n"));
                }
            }
            block
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_exit_code_is_zero() {
        assert_eq!(RunError::usage("bad flag").exit_code(), 0);
    }

    #[test]
    fn failure_without_code_maps_to_minus_one() {
        assert_eq!(RunError::failure("boom").exit_code(), -1);
    }

    #[test]
    fn failure_with_code_keeps_it() {
        assert_eq!(RunError::failure_with_code(3, "boom").exit_code(), 3);
    }

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::InvalidHandler("sync".into()).to_string(),
            "invalid handler for command `sync`"
        );
        assert!(ConfigError::EmptyName.to_string().contains("must not be empty"));
    }

    #[test]
    fn anyhow_conversion_carries_chain() {
        let err: anyhow::Error = anyhow::anyhow!("root cause")
            .context("middle")
            .context("top level");
        let run: RunError = err.into();
        let block = diagnostic_block("sync", &run);
        assert!(block.starts_with("Error(-1): top level"));
        assert!(block.contains("Command: sync"));
        assert!(block.contains("Trace:"));
        assert!(block.contains("0: middle"));
        assert!(block.contains("1: root cause"));
    }

    #[test]
    fn block_without_source_has_no_trace() {
        let run = RunError::failure_with_code(2, "boom");
        let block = diagnostic_block("sync", &run);
        assert_eq!(block, "Error(2): boom\nCommand: sync");
    }
}
