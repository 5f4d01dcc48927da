use thiserror::Error;

/// Boxed error as carried through tower services.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, HandlerError>;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Body producer failed for {type_name}: {source}")]
    ProducerFailed {
        type_name: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to serialize response body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Formatter for {media_type} failed: {message}")]
    Format { media_type: String, message: String },

    #[error("Invalid setting {key}: {message}")]
    Settings { key: String, message: String },
}

impl HandlerError {
    /// Wrap a body producer failure
    pub fn producer_failed(type_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::ProducerFailed {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// Create a formatter failure
    pub fn format(media_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            media_type: media_type.into(),
            message: message.into(),
        }
    }

    /// Create an invalid setting error
    pub fn settings(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Settings {
            key: key.into(),
            message: message.into(),
        }
    }
}
