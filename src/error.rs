use std::path::PathBuf;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the crate
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// The specification file does not have a `yaml`, `yml` or `json` extension
    InvalidSpecFile(PathBuf),
    InvalidConfig(String),
    ParseError { origin: String, message: String },
    ReferenceError { reference: String, message: String },
    FetchError { url: String, message: String },
    TemplateError(String),
    /// The embedded Swagger UI distribution could not be read
    AssetError(String),
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::InvalidSpecFile(path) => {
                write!(f, "invalid specification file: {}", path.display())
            }
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Error::ParseError { origin, message } => {
                write!(f, "failed to parse {}: {}", origin, message)
            }
            Error::ReferenceError { reference, message } => {
                write!(f, "cannot resolve reference '{}': {}", reference, message)
            }
            Error::FetchError { url, message } => write!(f, "failed to fetch {}: {}", url, message),
            Error::TemplateError(msg) => write!(f, "template error: {}", msg),
            Error::AssetError(msg) => write!(f, "bundled asset error: {}", msg),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        Error::TemplateError(err.to_string())
    }
}
