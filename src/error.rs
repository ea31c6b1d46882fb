use thiserror::Error;

/// Result type for Shelly operations
pub type Result<T> = std::result::Result<T, ShellyError>;

/// Errors that can occur while discovering or controlling a Shelly device
#[derive(Error, Debug)]
pub enum ShellyError {
    /// The mDNS PTR query could not be sent
    #[error("Failed to send mDNS query: {0}")]
    QuerySend(#[source] std::io::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// DNS message encoding/decoding error
    #[error("DNS error: {0}")]
    Dns(#[from] hickory_proto::ProtoError),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered an RPC call with a non-success status
    #[error("RPC {method} returned status {status}")]
    Status {
        /// RPC method name, e.g. `Light.GetStatus`
        method: String,
        /// HTTP status code
        status: u16,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Brightness outside 0..=100
    #[error("Invalid brightness: {0}")]
    InvalidBrightness(u8),

    /// A control request did not reach the device or its answer was unusable
    #[error("Service communication failure")]
    CommunicationFailure,

    /// The discovery socket has been closed
    #[error("Discovery listener closed")]
    ListenerClosed,

    /// The host rejected an accessory registration
    #[error("Registry error: {0}")]
    Registry(String),
}
