/// Failure of a single timeline source.
///
/// The aggregator never propagates these; it records them on the page as
/// degraded sources.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
