use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use modelport_core::{
    ArtifactKind, BatchProperties, HostBackend, HostError, HostModel, HostServer,
};

/// Host backed by a configuration file on local disk.
pub struct FileHost {
    name: String,
    version: u64,
    repository: PathBuf,
    config: Bytes,
    batch_flags: BatchProperties,
}

impl FileHost {
    pub fn load(
        config_path: &Path,
        name: Option<String>,
        version: u64,
        repository: Option<PathBuf>,
        first_dim_batching: bool,
    ) -> Result<Self> {
        let config = std::fs::read(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let repository = match repository {
            Some(dir) => dir,
            None => config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let name = match name {
            Some(name) => name,
            None => repository
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("cannot derive a model name; pass --name")?,
        };

        let batch_flags = if first_dim_batching {
            BatchProperties::FIRST_DIM
        } else {
            BatchProperties::UNKNOWN
        };

        Ok(Self {
            name,
            version,
            repository,
            config: Bytes::from(config),
            batch_flags,
        })
    }
}

pub struct LocalServer {
    batch_flags: BatchProperties,
}

impl HostServer for LocalServer {
    fn model_batch_properties(
        &self,
        _name: &str,
        _version: u64,
    ) -> Result<BatchProperties, HostError> {
        Ok(self.batch_flags)
    }
}

pub struct LocalBackend;

/// Process heap; the tool never allocates through it.
#[derive(Clone, Copy, Debug)]
pub struct HeapMemoryManager;

impl HostBackend for LocalBackend {
    type MemoryManager = HeapMemoryManager;

    fn memory_manager(&self) -> Result<HeapMemoryManager, HostError> {
        Ok(HeapMemoryManager)
    }
}

impl HostModel for FileHost {
    type Message = Bytes;
    type Server = LocalServer;
    type Backend = LocalBackend;

    fn model_config(&self, _config_version: u32) -> Result<Bytes, HostError> {
        Ok(self.config.clone())
    }

    fn serialize_message(&self, message: &Bytes) -> Result<Bytes, HostError> {
        Ok(message.clone())
    }

    fn delete_message(&self, _message: Bytes) -> Result<(), HostError> {
        Ok(())
    }

    fn model_name(&self) -> Result<String, HostError> {
        Ok(self.name.clone())
    }

    fn model_version(&self) -> Result<u64, HostError> {
        Ok(self.version)
    }

    fn model_repository(&self) -> Result<(ArtifactKind, String), HostError> {
        let path = self.repository.to_str().ok_or_else(|| {
            HostError::new("model_repository", "repository path is not valid UTF-8")
        })?;
        Ok((ArtifactKind::Filesystem, path.to_string()))
    }

    fn model_server(&self) -> Result<LocalServer, HostError> {
        Ok(LocalServer {
            batch_flags: self.batch_flags,
        })
    }

    fn model_backend(&self) -> Result<LocalBackend, HostError> {
        Ok(LocalBackend)
    }
}
