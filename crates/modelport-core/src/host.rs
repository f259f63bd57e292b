use std::fmt;
use std::ops::BitOr;

use bytes::Bytes;
use thiserror::Error;

/// Configuration schema version requested from the host.
pub const MODEL_CONFIG_VERSION: u32 = 1;

/// Error reported by the host process for a failed call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{call}: {message}")]
pub struct HostError {
    pub call: &'static str,
    pub message: String,
}

impl HostError {
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }
}

/// Where the host keeps a model's repository artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    Filesystem,
    RemoteFilesystem,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filesystem => f.write_str("filesystem"),
            Self::RemoteFilesystem => f.write_str("remote_filesystem"),
        }
    }
}

/// Batch property bitmask returned by [`HostServer::model_batch_properties`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchProperties(u32);

impl BatchProperties {
    pub const UNKNOWN: Self = Self(1);
    pub const FIRST_DIM: Self = Self(2);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

impl BitOr for BatchProperties {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Server-level queries the descriptor needs after the model has loaded.
pub trait HostServer: Send + Sync {
    fn model_batch_properties(
        &self,
        name: &str,
        version: u64,
    ) -> Result<BatchProperties, HostError>;
}

/// The backend hosting the model; only its memory manager is captured.
pub trait HostBackend {
    type MemoryManager: Send + Sync;

    fn memory_manager(&self) -> Result<Self::MemoryManager, HostError>;
}

/// Per-model calls exposed by the host process.
///
/// Handles returned from these calls are opaque to the descriptor: they are
/// stored and handed back, never interpreted.
pub trait HostModel: Send + Sync {
    type Message;
    type Server: HostServer;
    type Backend: HostBackend;

    fn model_config(&self, config_version: u32) -> Result<Self::Message, HostError>;
    fn serialize_message(&self, message: &Self::Message) -> Result<Bytes, HostError>;
    fn delete_message(&self, message: Self::Message) -> Result<(), HostError>;

    fn model_name(&self) -> Result<String, HostError>;
    fn model_version(&self) -> Result<u64, HostError>;
    fn model_repository(&self) -> Result<(ArtifactKind, String), HostError>;

    fn model_server(&self) -> Result<Self::Server, HostError>;
    fn model_backend(&self) -> Result<Self::Backend, HostError>;
}

pub type MemoryManagerOf<M> = <<M as HostModel>::Backend as HostBackend>::MemoryManager;
