//! Error types for athlete page generation.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while turning one athlete CSV into a page.
///
/// Every variant is scoped to a single athlete; the batch driver records it
/// and moves on to the next file.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("malformed athlete CSV {}: {reason}", .path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error("filesystem error on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unreadable CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Coarse classification used in batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    Filesystem,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedInput => "malformed-input",
            ErrorKind::Filesystem => "filesystem",
        }
    }
}

impl RosterError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RosterError::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RosterError::MalformedInput { .. } => ErrorKind::MalformedInput,
            RosterError::Filesystem { .. } => ErrorKind::Filesystem,
            // An I/O failure underneath the CSV reader is a filesystem problem;
            // anything else the reader rejects is bad input.
            RosterError::Csv { source, .. } => match source.kind() {
                csv::ErrorKind::Io(_) => ErrorKind::Filesystem,
                _ => ErrorKind::MalformedInput,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = RosterError::malformed("mens_team/a.csv", "too few rows");
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("too few rows"));

        let err = RosterError::Filesystem {
            path: PathBuf::from("mens_team/a.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert_eq!(err.kind().as_str(), "filesystem");
    }
}
