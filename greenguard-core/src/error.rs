use thiserror::Error;

/// Error taxonomy for the ingestion core.
///
/// Provider and persistence failures are caught at the smallest enclosing
/// boundary (per parcel, per cycle) and logged; they never escape the
/// scheduler loop or a control-surface handler.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("provider returned a bad response: {0}")]
    ProviderBadResponse(String),

    #[error("store write failed: {0}")]
    Persist(#[from] sqlx::Error),
}

impl IngestError {
    /// Classify a reqwest transport error. Timeouts and connection failures
    /// are `ProviderUnavailable`; a body that fails to decode is
    /// `ProviderBadResponse`.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ProviderBadResponse(err.to_string())
        } else {
            Self::ProviderUnavailable(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
