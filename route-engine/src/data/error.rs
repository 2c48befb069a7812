//! Data loading error types.

/// Errors that can occur while loading network data from disk.
///
/// Only [`DataError::MissingDirectory`] aborts a load; the other variants
/// describe a single bad file, which the loader logs and skips.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The data directory does not exist
    #[error("data directory not found: {path}")]
    MissingDirectory { path: String },

    /// A file could not be read
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// A file is not valid JSON for its expected format
    #[error("JSON parse error in {path}: {message}")]
    Json { path: String, message: String },

    /// A file parsed but its content is unusable
    #[error("invalid data in {path}: {message}")]
    Invalid { path: String, message: String },

    /// Refresh was requested on a repository that was not loaded from disk
    #[error("repository has no data directory to refresh from")]
    NotRefreshable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DataError::MissingDirectory {
            path: "data".into(),
        };
        assert_eq!(err.to_string(), "data directory not found: data");

        let err = DataError::Json {
            path: "lines/bad.json".into(),
            message: "expected value at line 1 column 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "JSON parse error in lines/bad.json: expected value at line 1 column 1"
        );

        let err = DataError::Invalid {
            path: "lines/stub.json".into(),
            message: "line Stub has fewer than 2 distinct stations".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid data in lines/stub.json: line Stub has fewer than 2 distinct stations"
        );

        assert_eq!(
            DataError::NotRefreshable.to_string(),
            "repository has no data directory to refresh from"
        );
    }
}
