use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("News API error ({code}): {message}")]
    Api { code: String, message: String },

    // Parsing errors
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    // Output errors
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TrendResult<T> = Result<T, TrendError>;
