use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Startup failures; anything that goes wrong after the server is listening is logged instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A single failed GET against the TeamCity REST API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("listing build configurations failed: {0}")]
    ListBuildTypes(#[source] FetchError),
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error("rendering the page failed")]
    Render(#[from] std::fmt::Error),
}
