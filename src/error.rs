use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Reading list is full! Please remove a link before adding a new one.")]
    CapacityExceeded { capacity: usize },

    #[error("No link found with that number.")]
    LinkNotFound,

    #[error("{0}")]
    AlreadyExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Failures the user caused and can fix; reported as a plain line on stdout.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::CapacityExceeded { .. } | Error::LinkNotFound | Error::AlreadyExists(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Error::LinkNotFound => "LINK_NOT_FOUND",
            Error::AlreadyExists(_) => "ALREADY_EXISTS",
            Error::Io(_) => "IO_ERROR",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Config(_) => "CONFIG",
            Error::Browser(_) => "BROWSER",
            Error::Invalid(_) => "INVALID",
        }
    }
}
