#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },
}

impl Error {
    /// True when the underlying failure is that a file could not be read at all
    /// (missing, permissions), as opposed to being read and rejected.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Error::IoError(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidManifest(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidRoute {
            route: "pricing".to_string(),
            reason: "must start with '/'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid route 'pricing': must start with '/'"
        );
    }

    #[test]
    fn test_is_unreadable() {
        let io = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io.is_unreadable());
        assert!(!Error::InvalidManifest("bad".into()).is_unreadable());
    }
}
