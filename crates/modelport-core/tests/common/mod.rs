#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use modelport_core::{
    ArtifactKind, BatchProperties, HostBackend, HostError, HostModel, HostServer,
};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct Counters {
    pub config_requests: AtomicUsize,
    pub released: AtomicUsize,
    pub batch_queries: AtomicUsize,
    pub batch_query_args: Mutex<Vec<(String, u64)>>,
}

impl Counters {
    pub fn config_requests(&self) -> usize {
        self.config_requests.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn batch_queries(&self) -> usize {
        self.batch_queries.load(Ordering::SeqCst)
    }

    /// `(name, version)` of every batch property query, in call order.
    pub fn batch_query_args(&self) -> Vec<(String, u64)> {
        self.batch_query_args
            .lock()
            .expect("query log poisoned")
            .clone()
    }
}

/// Stand-in for the host's serialized message. Not `Clone`, so it can only
/// be deleted once.
#[derive(Debug)]
pub struct MockMessage(Bytes);

#[derive(Debug)]
pub struct ServerState {
    flags: BatchProperties,
    failures_left: AtomicUsize,
    counters: Arc<Counters>,
}

#[derive(Clone, Debug)]
pub struct MockServer(Arc<ServerState>);

impl HostServer for MockServer {
    fn model_batch_properties(
        &self,
        name: &str,
        version: u64,
    ) -> Result<BatchProperties, HostError> {
        self.0.counters.batch_queries.fetch_add(1, Ordering::SeqCst);
        self.0
            .counters
            .batch_query_args
            .lock()
            .expect("query log poisoned")
            .push((name.to_string(), version));
        let failing = self
            .0
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(HostError::new(
                "model_batch_properties",
                "model is not ready",
            ));
        }
        Ok(self.0.flags)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryManagerToken(pub u32);

pub struct MockBackend {
    fail: bool,
}

impl HostBackend for MockBackend {
    type MemoryManager = MemoryManagerToken;

    fn memory_manager(&self) -> Result<MemoryManagerToken, HostError> {
        if self.fail {
            return Err(HostError::new("memory_manager", "no memory manager"));
        }
        Ok(MemoryManagerToken(7))
    }
}

pub struct MockModel {
    name: String,
    version: u64,
    config: Bytes,
    repository: (ArtifactKind, String),
    flags: BatchProperties,
    server_failures: usize,
    fail_on: Option<&'static str>,
    counters: Arc<Counters>,
}

impl MockModel {
    pub fn new(name: &str, config: Value) -> Self {
        Self::with_raw_config(name, Bytes::from(config.to_string()))
    }

    pub fn with_raw_config(name: &str, config: Bytes) -> Self {
        Self {
            name: name.to_string(),
            version: 1,
            config,
            repository: (ArtifactKind::Filesystem, format!("/models/{name}")),
            flags: BatchProperties::FIRST_DIM,
            server_failures: 0,
            fail_on: None,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn repository(mut self, kind: ArtifactKind, path: &str) -> Self {
        self.repository = (kind, path.to_string());
        self
    }

    pub fn batch_flags(mut self, flags: BatchProperties) -> Self {
        self.flags = flags;
        self
    }

    pub fn server_failures(mut self, failures: usize) -> Self {
        self.server_failures = failures;
        self
    }

    /// Make the named host call fail.
    pub fn fail_on(mut self, call: &'static str) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    fn check(&self, call: &'static str) -> Result<(), HostError> {
        if self.fail_on == Some(call) {
            return Err(HostError::new(call, "injected failure"));
        }
        Ok(())
    }
}

impl HostModel for MockModel {
    type Message = MockMessage;
    type Server = MockServer;
    type Backend = MockBackend;

    fn model_config(&self, config_version: u32) -> Result<MockMessage, HostError> {
        assert_eq!(config_version, 1);
        self.check("model_config")?;
        self.counters.config_requests.fetch_add(1, Ordering::SeqCst);
        Ok(MockMessage(self.config.clone()))
    }

    fn serialize_message(&self, message: &MockMessage) -> Result<Bytes, HostError> {
        self.check("serialize_message")?;
        Ok(message.0.clone())
    }

    fn delete_message(&self, _message: MockMessage) -> Result<(), HostError> {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
        self.check("delete_message")
    }

    fn model_name(&self) -> Result<String, HostError> {
        self.check("model_name")?;
        Ok(self.name.clone())
    }

    fn model_version(&self) -> Result<u64, HostError> {
        self.check("model_version")?;
        Ok(self.version)
    }

    fn model_repository(&self) -> Result<(ArtifactKind, String), HostError> {
        self.check("model_repository")?;
        Ok(self.repository.clone())
    }

    fn model_server(&self) -> Result<MockServer, HostError> {
        self.check("model_server")?;
        Ok(MockServer(Arc::new(ServerState {
            flags: self.flags,
            failures_left: AtomicUsize::new(self.server_failures),
            counters: Arc::clone(&self.counters),
        })))
    }

    fn model_backend(&self) -> Result<MockBackend, HostError> {
        self.check("model_backend")?;
        Ok(MockBackend {
            fail: self.fail_on == Some("memory_manager"),
        })
    }
}
