use thiserror::Error;

use crate::HostError;

/// Failures while building or querying a [`crate::ModelDescriptor`].
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("host call failed for model '{model}': {source}")]
    HostCall {
        model: String,
        #[source]
        source: HostError,
    },

    #[error("malformed configuration for model '{model}': {message}")]
    MalformedConfig { model: String, message: String },

    #[error("unsupported repository artifact type for model '{model}'")]
    UnsupportedRepositoryKind { model: String },

    #[error(
        "'optional' is set to true for input '{input}' of model '{model}' while the backend model doesn't support optional input"
    )]
    CapabilityMismatch { model: String, input: String },
}

impl DescriptorError {
    pub fn host(model: impl Into<String>, source: HostError) -> Self {
        Self::HostCall {
            model: model.into(),
            source,
        }
    }

    pub fn malformed(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedConfig {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Name of the model the failure belongs to.
    pub fn model(&self) -> &str {
        match self {
            Self::HostCall { model, .. }
            | Self::MalformedConfig { model, .. }
            | Self::UnsupportedRepositoryKind { model }
            | Self::CapabilityMismatch { model, .. } => model,
        }
    }
}

pub type Result<T> = std::result::Result<T, DescriptorError>;
