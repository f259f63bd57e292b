use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info};

use crate::config::{ConfigError, ConfigResult};
use crate::{
    ArtifactKind, BatchInput, BatchOutput, BatchOutputIndex, BatchProperties, BatchingCapability,
    BatchingState, DescriptorError, HostBackend, HostError, HostModel, HostServer,
    MemoryManagerOf, MessageGuard, ModelConfig, Result, MODEL_CONFIG_VERSION,
};

/// Per-backend choices that shape how a configuration is accepted.
#[derive(Clone, Copy, Debug, Default)]
pub struct DescriptorOptions {
    /// Whether the backend can serve requests that omit inputs marked
    /// `optional`. When false such inputs reject the configuration.
    pub allow_optional: bool,
}

/// Validated, read-only view of a loaded model's configuration.
///
/// Built once at model load. Everything except the batching capability is
/// fixed at construction and may be read from any thread.
pub struct ModelDescriptor<M: HostModel> {
    model: M,
    server: M::Server,
    memory_manager: MemoryManagerOf<M>,
    config: ModelConfig,

    name: String,
    version: u64,
    max_batch_size: u32,
    repository_path: String,
    pinned_input: bool,
    pinned_output: bool,

    ragged_inputs: HashSet<String>,
    optional_inputs: HashSet<String>,
    batch_inputs: Vec<BatchInput>,
    batch_outputs: Vec<BatchOutput>,
    batch_output_index: BatchOutputIndex,

    batching: BatchingCapability,
}

impl<M: HostModel> ModelDescriptor<M> {
    pub fn new(model: M, options: DescriptorOptions) -> Result<Self> {
        let name = model
            .model_name()
            .map_err(|e| DescriptorError::host("<unnamed>", e))?;
        if name.is_empty() {
            return Err(DescriptorError::host(
                "<unnamed>",
                HostError::new("model_name", "host returned an empty model name"),
            ));
        }
        let host_err = |e: HostError| DescriptorError::host(name.as_str(), e);
        let malformed = |e: ConfigError| DescriptorError::malformed(name.as_str(), e.to_string());

        let version = model.model_version().map_err(host_err)?;
        let config = load_config(&model, &name)?;

        let mbs = config
            .root()
            .optional_i64("max_batch_size", 0)
            .map_err(malformed)?;
        let max_batch_size = u32::try_from(mbs).map_err(|_| {
            DescriptorError::malformed(
                name.as_str(),
                format!("max_batch_size: expected a non-negative 32-bit integer, found {mbs}"),
            )
        })?;

        let (artifact_kind, repository_path) = model.model_repository().map_err(host_err)?;
        if artifact_kind != ArtifactKind::Filesystem {
            return Err(DescriptorError::UnsupportedRepositoryKind {
                model: name.clone(),
            });
        }

        let server = model.model_server().map_err(host_err)?;
        let backend = model.model_backend().map_err(host_err)?;
        let memory_manager = backend.memory_manager().map_err(host_err)?;

        let (pinned_input, pinned_output) = pinned_memory_flags(&config).map_err(malformed)?;

        let batch_inputs = BatchInput::parse_all(&config).map_err(malformed)?;
        let batch_outputs = BatchOutput::parse_all(&config).map_err(malformed)?;
        let batch_output_index = BatchOutputIndex::build(&batch_outputs).map_err(malformed)?;
        for output in &batch_outputs {
            debug!(model = %name, targets = ?output.target_names(), "registered batch output");
        }

        let (ragged_inputs, optional_inputs) = classify_inputs(&config, &name, options)?;

        info!(
            model = %name,
            version,
            max_batch_size,
            ragged = ragged_inputs.len(),
            optional = optional_inputs.len(),
            batch_inputs = batch_inputs.len(),
            batch_outputs = batch_outputs.len(),
            "model descriptor ready"
        );

        Ok(Self {
            model,
            server,
            memory_manager,
            config,
            name,
            version,
            max_batch_size,
            repository_path,
            pinned_input,
            pinned_output,
            ragged_inputs,
            optional_inputs,
            batch_inputs,
            batch_outputs,
            batch_output_index,
            batching: BatchingCapability::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Zero means the model does not batch.
    pub fn max_batch_size(&self) -> u32 {
        self.max_batch_size
    }

    pub fn repository_path(&self) -> &str {
        &self.repository_path
    }

    pub fn pinned_input_enabled(&self) -> bool {
        self.pinned_input
    }

    pub fn pinned_output_enabled(&self) -> bool {
        self.pinned_output
    }

    pub fn is_ragged_input(&self, name: &str) -> bool {
        self.ragged_inputs.contains(name)
    }

    pub fn is_optional_input(&self, name: &str) -> bool {
        self.optional_inputs.contains(name)
    }

    pub fn ragged_inputs(&self) -> impl Iterator<Item = &str> {
        self.ragged_inputs.iter().map(String::as_str)
    }

    pub fn optional_inputs(&self) -> impl Iterator<Item = &str> {
        self.optional_inputs.iter().map(String::as_str)
    }

    pub fn batch_inputs(&self) -> &[BatchInput] {
        &self.batch_inputs
    }

    pub fn batch_outputs(&self) -> &[BatchOutput] {
        &self.batch_outputs
    }

    /// The batch output that owns `output_name`, if any.
    pub fn find_batch_output(&self, output_name: &str) -> Option<&BatchOutput> {
        self.batch_output_index
            .get(output_name)
            .and_then(|idx| self.batch_outputs.get(idx))
    }

    /// Asks the server on first call and caches the answer afterwards. The
    /// server cannot answer until the model has finished loading, so this is
    /// never resolved during construction.
    pub fn supports_first_dim_batching(&self) -> Result<bool> {
        self.batching.resolve_with(|| {
            let flags = self
                .server
                .model_batch_properties(&self.name, self.version)
                .map_err(|e| DescriptorError::host(self.name.as_str(), e))?;
            let supported = flags.contains(BatchProperties::FIRST_DIM);
            debug!(
                model = %self.name,
                flags = flags.bits(),
                supported,
                "resolved first-dim batching"
            );
            Ok(supported)
        })
    }

    pub fn batching_state(&self) -> BatchingState {
        self.batching.state()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn server(&self) -> &M::Server {
        &self.server
    }

    pub fn memory_manager(&self) -> &MemoryManagerOf<M> {
        &self.memory_manager
    }
}

impl<M: HostModel> fmt::Debug for ModelDescriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("max_batch_size", &self.max_batch_size)
            .field("repository_path", &self.repository_path)
            .field("pinned_input", &self.pinned_input)
            .field("pinned_output", &self.pinned_output)
            .field("ragged_inputs", &self.ragged_inputs)
            .field("optional_inputs", &self.optional_inputs)
            .field("batch_inputs", &self.batch_inputs)
            .field("batch_outputs", &self.batch_outputs)
            .field("batching", &self.batching.state())
            .finish_non_exhaustive()
    }
}

/// Fetches, serializes and parses the configuration message. The message is
/// released before either a parse failure or the parsed document is returned.
fn load_config<M: HostModel>(model: &M, name: &str) -> Result<ModelConfig> {
    let message = model
        .model_config(MODEL_CONFIG_VERSION)
        .map_err(|e| DescriptorError::host(name, e))?;
    let guard = MessageGuard::new(model, message);

    let bytes = guard.serialize().map_err(|e| DescriptorError::host(name, e))?;
    let parsed = ModelConfig::parse(&bytes);
    guard.release().map_err(|e| DescriptorError::host(name, e))?;

    parsed.map_err(|e| DescriptorError::malformed(name, e.to_string()))
}

fn pinned_memory_flags(config: &ModelConfig) -> ConfigResult<(bool, bool)> {
    let mut input = false;
    let mut output = false;
    if let Some(optimization) = config.root().find_object("optimization")? {
        if let Some(pinned) = optimization.find_object("input_pinned_memory")? {
            input = pinned.member_as_bool("enable")?;
        }
        if let Some(pinned) = optimization.find_object("output_pinned_memory")? {
            output = pinned.member_as_bool("enable")?;
        }
    }
    Ok((input, output))
}

fn classify_inputs(
    config: &ModelConfig,
    model: &str,
    options: DescriptorOptions,
) -> Result<(HashSet<String>, HashSet<String>)> {
    let malformed = |e: ConfigError| DescriptorError::malformed(model, e.to_string());

    let mut ragged_inputs = HashSet::new();
    let mut optional_inputs = HashSet::new();

    let inputs = config.root().member_as_array("input").map_err(malformed)?;
    for io in inputs.objects() {
        let io = io.map_err(malformed)?;
        let io_name = io.member_as_str("name").map_err(malformed)?;

        let ragged = io
            .optional_bool("allow_ragged_batch", false)
            .map_err(malformed)?;
        if ragged {
            ragged_inputs.insert(io_name.to_string());
        }

        let optional = io.optional_bool("optional", false).map_err(malformed)?;
        if optional {
            if !options.allow_optional {
                return Err(DescriptorError::CapabilityMismatch {
                    model: model.to_string(),
                    input: io_name.to_string(),
                });
            }
            optional_inputs.insert(io_name.to_string());
        }

        debug!(model, input = io_name, ragged, optional, "classified input");
    }

    Ok((ragged_inputs, optional_inputs))
}
