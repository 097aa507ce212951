use thiserror::Error;

#[derive(Debug, Error)]
pub enum OsrmClientError {
    #[error("request to routing service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("routing service returned no route for the given points")]
    NoRouteFound,
    #[error("malformed routing service response: {0}")]
    InvalidResponse(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("request timed out")]
    TimedOut,
}
