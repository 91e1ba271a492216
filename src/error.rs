use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base url '{0}', it must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    #[error("invalid timeout '{value}': {reason}")]
    InvalidTimeout { value: String, reason: String },

    #[error("couldn't read the config folder: {0}")]
    Config(String),

    #[error("server is not reachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },
}
