use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Configuration missing or invalid
    Config(String),
    Io(std::io::Error),
    /// HTTP client could not be constructed
    Http(String),
    Runtime(insightdesk_runtime::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Http(msg) => write!(f, "HTTP client error: {}", msg),
            Error::Runtime(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Runtime(err) => Some(err),
            Error::Config(_) | Error::Http(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<insightdesk_runtime::Error> for Error {
    fn from(err: insightdesk_runtime::Error) -> Self {
        Error::Runtime(err)
    }
}

impl From<insightdesk_runtime::BackendError> for Error {
    fn from(err: insightdesk_runtime::BackendError) -> Self {
        Error::Runtime(insightdesk_runtime::Error::Backend(err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
