use thiserror::Error;

/// Failure while fetching a listing page.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The server answered with a non-success status and a message body.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}
