//! Error types for the storage layer

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Storage operator could not be created
    E001StorageInit,
    /// E002: Partition file could not be written
    E002WriteFailure,
    /// E003: Scratch file could not be opened, written, or removed
    E003ScratchFailure,
    /// E004: Permission denied by the filesystem
    E004PermissionDenied,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001StorageInit => "E001",
            Self::E002WriteFailure => "E002",
            Self::E003ScratchFailure => "E003",
            Self::E004PermissionDenied => "E004",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while touching local storage
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("[{code}] Failed to initialize storage at '{root}': {reason}")]
    StorageInit {
        code: &'static str,
        root: String,
        reason: String,
    },

    #[error("[{code}] Failed to write '{path}': {reason}")]
    WriteFailure {
        code: &'static str,
        path: String,
        reason: String,
    },

    #[error("[{code}] Scratch operation failed for '{path}': {reason}")]
    ScratchFailure {
        code: &'static str,
        path: String,
        reason: String,
    },

    #[error("[{code}] Permission denied for '{path}': {reason}\n\nCheck that the output and scratch directories are writable")]
    PermissionDenied {
        code: &'static str,
        path: String,
        reason: String,
    },
}

impl WriterError {
    pub fn storage_init(root: impl Into<String>, reason: impl ToString) -> Self {
        Self::StorageInit {
            code: ErrorCode::E001StorageInit.as_str(),
            root: root.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write_failure(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::WriteFailure {
            code: ErrorCode::E002WriteFailure.as_str(),
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn scratch_failure(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::ScratchFailure {
            code: ErrorCode::E003ScratchFailure.as_str(),
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn permission_denied(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::PermissionDenied {
            code: ErrorCode::E004PermissionDenied.as_str(),
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Map an OpenDAL error, singling out permission problems
    pub(crate) fn from_opendal(
        err: opendal::Error,
        path: &str,
        fallback: fn(String, String) -> Self,
    ) -> Self {
        if err.kind() == opendal::ErrorKind::PermissionDenied {
            Self::permission_denied(path, err)
        } else {
            fallback(path.to_string(), err.to_string())
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::StorageInit { .. } => ErrorCode::E001StorageInit,
            Self::WriteFailure { .. } => ErrorCode::E002WriteFailure,
            Self::ScratchFailure { .. } => ErrorCode::E003ScratchFailure,
            Self::PermissionDenied { .. } => ErrorCode::E004PermissionDenied,
        }
    }
}

/// Result type alias for WriterError
pub type Result<T> = std::result::Result<T, WriterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_codes() {
        let err = WriterError::write_failure("2024/01/15/03.parquet", "disk full");
        assert_eq!(err.code(), ErrorCode::E002WriteFailure);
        let message = err.to_string();
        assert!(message.starts_with("[E002]"));
        assert!(message.contains("2024/01/15/03.parquet"));
        assert!(message.contains("disk full"));
    }

    #[test]
    fn test_opendal_permission_errors_are_distinguished() {
        let denied = opendal::Error::new(opendal::ErrorKind::PermissionDenied, "nope");
        let err = WriterError::from_opendal(denied, "out.parquet", |p, r| {
            WriterError::write_failure(p, r)
        });
        assert_eq!(err.code(), ErrorCode::E004PermissionDenied);

        let other = opendal::Error::new(opendal::ErrorKind::Unexpected, "boom");
        let err = WriterError::from_opendal(other, "scratch.gz", |p, r| {
            WriterError::scratch_failure(p, r)
        });
        assert_eq!(err.code(), ErrorCode::E003ScratchFailure);
    }
}
