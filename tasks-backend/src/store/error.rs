use std::path::{Path, PathBuf};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by the task store. A missing task is not an error;
/// lookups return `None` for that.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The task file could not be opened, read or written
    #[error("task file {} is unavailable: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored row (or the header) doesn't decode into a task
    #[error("malformed record in {} at line {line}: {reason}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// The largest stored id leaves no room for another
    #[error("task file {} has no ids left to assign", .path.display())]
    IdsExhausted { path: PathBuf },
}

impl StoreError {
    pub fn unavailable(path: &Path, source: std::io::Error) -> Self {
        StoreError::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn malformed(path: &Path, line: u64, reason: impl Into<String>) -> Self {
        StoreError::MalformedRecord {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    /// Split a csv error into I/O failure vs. undecodable content
    pub fn from_csv(path: &Path, err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::unavailable(path, source),
            _ => Self::malformed(path, line, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_csv_error_is_storage_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::from_csv(Path::new("tasks.csv"), csv::Error::from(io));
        assert!(matches!(err, StoreError::StorageUnavailable { .. }));
        assert!(err.to_string().contains("tasks.csv"));
    }

    #[test]
    fn test_malformed_message_names_line() {
        let err = StoreError::malformed(Path::new("tasks.csv"), 7, "id 'x' is not an integer");
        assert_eq!(
            err.to_string(),
            "malformed record in tasks.csv at line 7: id 'x' is not an integer"
        );
    }
}
