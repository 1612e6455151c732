use tokio::task::JoinError;

/// Failures inside a search task. Reported to the client as a generic server
/// error; the connection stays open.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("client channel closed")]
    ChannelClosed,
    #[error("search task panicked: {0}")]
    Panicked(String),
    #[error("search task was cancelled")]
    Cancelled,
}

impl From<JoinError> for GatewayError {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            let payload = err.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            GatewayError::Panicked(message)
        } else {
            GatewayError::Cancelled
        }
    }
}
