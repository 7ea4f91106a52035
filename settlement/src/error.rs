//! Error types for trip settlement

use thiserror::Error;

/// Result type for settlement loading operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
///
/// The engine itself never fails; these cover loading trip snapshots and
/// configuration from disk or the environment.
#[derive(Error, Debug)]
pub enum Error {
    /// Trip document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_convert() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "IO error: gone");
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::Parse("bad json".to_string()).to_string(),
            "Parse error: bad json"
        );
        assert_eq!(
            Error::Config("display_dp 40 exceeds 28".to_string()).to_string(),
            "Invalid configuration: display_dp 40 exceeds 28"
        );
    }
}
