use thiserror::Error;

/// Failures from the venue REST clients. Callers decide whether a failure is
/// fatal (startup, whole-cycle fetches) or a per-item skip.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Unexpected(String),

    #[error("invalid decimal in response: {0}")]
    Decimal(#[from] rust_decimal::Error),
}
