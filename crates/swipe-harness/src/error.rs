use std::path::PathBuf;

use swipe_core::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("trace line {line}: {message}")]
    Trace { line: usize, message: String },

    #[error("trace has no header record")]
    MissingHeader,

    #[error("unsupported trace schema {found:?} (expected {expected:?})")]
    Schema {
        found: String,
        expected: &'static str,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::InvalidArgument { .. } => 2,
            Self::Trace { .. } | Self::MissingHeader | Self::Schema { .. } => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn trace(line: usize, message: impl Into<String>) -> Self {
        Self::Trace {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HarnessError;
    use swipe_core::ConfigError;

    #[test]
    fn exit_codes_group_by_failure_kind() {
        assert_eq!(
            HarnessError::Config(ConfigError::Validation(vec!["x".into()])).exit_code(),
            2
        );
        assert_eq!(HarnessError::invalid("steps").exit_code(), 2);
        assert_eq!(HarnessError::trace(4, "bad").exit_code(), 3);
        assert_eq!(HarnessError::MissingHeader.exit_code(), 3);
        assert_eq!(
            HarnessError::Io(std::io::Error::other("disk")).exit_code(),
            1
        );
    }

    #[test]
    fn trace_error_names_the_line() {
        let error = HarnessError::trace(7, "timestamp goes backwards");
        assert_eq!(error.to_string(), "trace line 7: timestamp goes backwards");
    }
}
