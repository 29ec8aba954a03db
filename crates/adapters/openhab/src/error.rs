//! openHAB adapter error types.

use habridge_domain::error::{BridgeError, ConfigurationError, TransportError};

/// Errors specific to the openHAB adapter.
#[derive(Debug, thiserror::Error)]
pub enum OpenHabError {
    /// The HTTP request could not be sent or its body not read.
    #[error("{operation} for item {item} failed")]
    Request {
        item: String,
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{operation} for item {item} returned status {status}")]
    Status {
        item: String,
        operation: &'static str,
        status: u16,
    },

    /// The server does not know the item.
    #[error("item {0} not found")]
    ItemNotFound(String),

    /// The item description could not be understood.
    #[error("invalid description of item {item}")]
    InvalidItem {
        item: String,
        #[source]
        source: ConfigurationError,
    },

    /// The event stream could not be opened or broke.
    #[error("event stream failed")]
    EventStream(#[source] reqwest::Error),

    /// An event of the stream was not valid JSON.
    #[error("failed to parse event payload")]
    EventPayload(#[source] serde_json::Error),
}

impl OpenHabError {
    /// Convert into a [`BridgeError`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> BridgeError {
        match self {
            Self::ItemNotFound(item) => ConfigurationError::ItemNotFound { item }.into(),
            Self::InvalidItem { source, .. } => source.into(),
            Self::Status {
                item,
                operation,
                status,
            } => TransportError::Status {
                item,
                operation,
                status,
            }
            .into(),
            Self::Request {
                item,
                operation,
                source,
            } => TransportError::Request {
                item,
                operation,
                source: Box::new(source),
            }
            .into(),
            Self::EventStream(_) | Self::EventPayload(_) => TransportError::SubscriptionClosed.into(),
        }
    }
}

impl From<OpenHabError> for BridgeError {
    fn from(err: OpenHabError) -> Self {
        err.into_domain()
    }
}
