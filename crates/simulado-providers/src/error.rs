//! Provider error types.
//!
//! The enum itself is defined in `simulado-core` so the generation client can
//! carry it; this module maps transport failures onto it.

pub use simulado_core::error::ProviderError;

/// Map a `reqwest` send/receive failure.
pub(crate) fn network(e: reqwest::Error) -> ProviderError {
    ProviderError::NetworkError(e.to_string())
}

/// Retry delay from a `retry-after` header, in milliseconds (5s if absent).
pub(crate) fn retry_after_ms(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(5)
        * 1000
}
