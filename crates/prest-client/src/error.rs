use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum PrestError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(code(prest_client::invalid_argument))]
    InvalidArgument(String),

    #[error("Not initialized: {0}")]
    #[diagnostic(
        code(prest_client::not_initialized),
        help("Build queries through `Client::table` so they carry a transport")
    )]
    NotInitialized(String),

    #[error("Failed to make API request: {message}")]
    #[diagnostic(
        code(prest_client::request_failed),
        help("Check the gateway URL, your credentials and the table name")
    )]
    RequestFailed {
        message: String,
        status: Option<u16>,
    },

    #[error(transparent)]
    #[diagnostic(code(prest_client::config))]
    Config(#[from] ConfigError),
}

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    #[diagnostic(
        code(prest_client::config::io),
        help("Check that the file exists and is readable")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(prest_client::config::toml_deserialize),
        help("Check your configuration file syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PrestError>;

impl PrestError {
    /// Wraps a transport or decoding fault that happened without an HTTP status.
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            message: message.into(),
            status: None,
        }
    }

    /// HTTP status carried by a [`PrestError::RequestFailed`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed {
                status, ..
            } => *status,
            _ => None,
        }
    }
}

impl From<ureq::Error> for PrestError {
    fn from(e: ureq::Error) -> Self {
        Self::request_failed(e.to_string())
    }
}

impl From<serde_json::Error> for PrestError {
    fn from(e: serde_json::Error) -> Self {
        Self::request_failed(format!("invalid JSON response: {e}"))
    }
}
