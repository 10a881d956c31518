//! Gateway error types.

use thiserror::Error;

/// Errors surfaced by a [`RateGateway`](crate::core::currency::RateGateway).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// Transport failure or timeout while talking to the FX API.
    #[error("Network error calling {endpoint}: {reason}")]
    Network { endpoint: String, reason: String },

    /// The FX API answered with a non-success status.
    #[error("HTTP error: {status} for {endpoint}")]
    Http { status: u16, endpoint: String },

    /// The payload decoded but did not carry the expected fields.
    #[error("Invalid response structure from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

impl GatewayError {
    pub fn network(endpoint: &str, reason: impl ToString) -> Self {
        GatewayError::Network {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(endpoint: &str, reason: impl ToString) -> Self {
        GatewayError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether a retry could plausibly succeed: transport failures, 5xx and 429.
    ///
    /// The retry executor does not consult this; it is reported alongside
    /// each failed attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network { .. } => true,
            GatewayError::Http { status, .. } => *status >= 500 || *status == 429,
            GatewayError::MalformedResponse { .. } => false,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors returned by [`CurrencyService`](crate::core::service::CurrencyService).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid amount: {0}, expected a positive number")]
    InvalidAmount(f64),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
