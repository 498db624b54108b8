use thiserror::Error;

#[derive(Debug, Error)]
pub enum DasherError {
    #[error("{0}")]
    InvalidData(&'static str),
    #[error("Unmatched the pattern defined in the XML schema.")]
    UnmatchedPattern,
    #[error("{0}")]
    ParseError(#[from] std::num::ParseIntError),
    #[error("{0}")]
    ChronoParseError(#[from] chrono::format::ParseError),
    #[error("bad parameter: {0}")]
    BadParam(String),
    #[error("invalid url: {0}")]
    UrlError(String),
    #[error("not supported: {0}")]
    NotSupported(String),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("setup failed: {0}")]
    SetupFailed(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("config error: {0}")]
    ConfigError(#[from] toml::de::Error),
}
