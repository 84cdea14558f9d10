use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("outport '{port}' of processor '{processor}' is not part of the network")]
    OutportNotInNetwork { processor: String, port: String },

    #[error("inport '{port}' of processor '{processor}' is not part of the network")]
    InportNotInNetwork { processor: String, port: String },

    #[error("property '{0}' is not part of the network")]
    PropertyNotInNetwork(String),

    #[error("processor '{0}' not found")]
    ProcessorNotFound(String),

    #[error("port address '{0}' is invalid, expected 'processor.port'")]
    InvalidPortAddress(String),

    #[error("property path '{0}' is invalid, expected 'processor.property'")]
    InvalidPropertyPath(String),

    #[error("property '{path}' holds a {expected:?}, cannot assign a {got:?}")]
    PropertyKindMismatch {
        path: String,
        expected: crate::core::property::PropertyKind,
        got: crate::core::property::PropertyKind,
    },

    #[error("processor type '{0}' is not registered")]
    UnknownProcessorType(String),

    #[error("processor type '{0}' is already registered")]
    DuplicateProcessorType(String),

    #[error("network document error: {0}")]
    Serialization(String),

    /// Load failed but the network was reset to a clean state; the caller may
    /// retry with a different document.
    #[error("failed to load network: {0}")]
    LoadRecoverable(String),

    /// Load failed in a way that the caller should treat as fatal.
    #[error("failed to load network: {0}")]
    LoadFatal(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
