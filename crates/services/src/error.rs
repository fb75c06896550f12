use thiserror::Error;

/// Failure talking to a collaborator endpoint. Every variant is recoverable
/// by a user-initiated retry; nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ServiceError {
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => endpoint,
        }
    }
}

impl From<ServiceError> for tradein_core::ApplicationError {
    fn from(error: ServiceError) -> Self {
        Self::Integration(error.to_string())
    }
}
