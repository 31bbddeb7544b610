use thiserror::Error;

/// Errors that occur while parsing individual files.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse {file_path}: {source}")]
    File {
        file_path: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Fatal errors from the unit loader.
///
/// A unit that fails to parse is *not* fatal: it is skipped and surfaced as a
/// `LoadDiagnostic`. These variants mean the whole scan cannot proceed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input path does not exist: {0}")]
    MissingPath(String),

    #[error("no Go source files found under the given paths")]
    NoSources,

    #[error("failed to walk source tree: {0}")]
    Walk(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_includes_path() {
        let err = ParseError::File {
            file_path: "pkg/main.go".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        let msg = err.to_string();
        assert!(msg.contains("pkg/main.go"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn load_error_missing_path_display() {
        let err = LoadError::MissingPath("/does/not/exist".to_string());
        assert_eq!(err.to_string(), "input path does not exist: /does/not/exist");
    }

    #[test]
    fn load_error_no_sources_display() {
        assert_eq!(
            LoadError::NoSources.to_string(),
            "no Go source files found under the given paths"
        );
    }
}
