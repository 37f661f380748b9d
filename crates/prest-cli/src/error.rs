use miette::Diagnostic;
use prest_client::PrestError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] PrestError),

    #[error("Error while {action}")]
    #[diagnostic(code(prest::io))]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON data: {0}")]
    #[diagnostic(
        code(prest::data),
        help("Pass a JSON document, or `-` to read one from stdin")
    )]
    InvalidData(#[source] serde_json::Error),

    #[error("{0}")]
    #[diagnostic(code(prest::invalid_input))]
    InvalidInput(String),

    #[error("Invalid proxy `{proxy}`")]
    #[diagnostic(
        code(prest::proxy),
        help("Use a proxy URL such as `http://host:8080` or `socks5://host:1080`")
    )]
    Proxy {
        proxy: String,
        #[source]
        source: ureq::Error,
    },
}

pub type CliResult<T> = std::result::Result<T, CliError>;
