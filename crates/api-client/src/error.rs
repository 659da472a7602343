use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("The API request returned an error: {0}")]
    ApiError(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("No price data available for {0}")]
    RateUnavailable(String),
}

impl ApiError {
    /// True when the remote side could not be reached or refused the request,
    /// as opposed to answering with something we could not use.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Request(_) | ApiError::Status { .. })
    }
}
