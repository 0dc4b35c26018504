use thiserror::Error;

/// Failures surfaced by [`crate::ForecastClient::fetch_points`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The provider answered with a non-success status.
    #[error("Unexpected error returned by the StormGlass service: Error: {body} Code: {status}")]
    UpstreamResponse { status: u16, body: String },

    /// No usable response came back.
    #[error("Unexpected error when trying to communicate to StormGlass: {message}")]
    Transport { message: String },
}

impl ClientError {
    pub fn upstream(status: u16, body: &serde_json::Value) -> Self {
        ClientError::UpstreamResponse { status, body: body.to_string() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ClientError::Transport { message: message.into() }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::UpstreamResponse { status, .. } => Some(*status),
            ClientError::Transport { .. } => None,
        }
    }
}
