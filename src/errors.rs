use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Subgraph error: {0}")]
    Subgraph(String),

    #[error("Invalid reference price: {0} (must be finite and > 0)")]
    InvalidReferencePrice(f64),

    #[error("Invalid strategy parameters: {0}")]
    InvalidStrategy(String),
}
