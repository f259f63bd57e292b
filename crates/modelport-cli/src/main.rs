mod cli;
mod host;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use modelport_core::{DType, DescriptorOptions, HostModel, ModelDescriptor};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use host::FileHost;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect {
            config,
            name,
            version,
            repository,
            allow_optional,
            first_dim_batching,
            log,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::try_new(&log).context("invalid --log filter")?)
                .with_writer(std::io::stderr)
                .init();

            let host = FileHost::load(&config, name, version, repository, first_dim_batching)?;
            let descriptor = ModelDescriptor::new(host, DescriptorOptions { allow_optional })
                .with_context(|| format!("failed to resolve {}", config.display()))?;

            let summary = Summary::from_descriptor(&descriptor)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct Summary {
    name: String,
    version: u64,
    max_batch_size: u32,
    repository_path: String,
    pinned_input: bool,
    pinned_output: bool,
    first_dim_batching: bool,
    ragged_inputs: Vec<String>,
    optional_inputs: Vec<String>,
    batch_inputs: Vec<BatchSummary>,
    batch_outputs: Vec<BatchSummary>,
}

#[derive(Serialize)]
struct BatchSummary {
    kind: &'static str,
    target_names: Vec<String>,
    data_type: &'static str,
    source_inputs: Vec<String>,
}

impl Summary {
    fn from_descriptor<M: HostModel>(desc: &ModelDescriptor<M>) -> Result<Self> {
        let mut ragged_inputs: Vec<String> = desc.ragged_inputs().map(str::to_string).collect();
        ragged_inputs.sort();
        let mut optional_inputs: Vec<String> =
            desc.optional_inputs().map(str::to_string).collect();
        optional_inputs.sort();

        Ok(Self {
            name: desc.name().to_string(),
            version: desc.version(),
            max_batch_size: desc.max_batch_size(),
            repository_path: desc.repository_path().to_string(),
            pinned_input: desc.pinned_input_enabled(),
            pinned_output: desc.pinned_output_enabled(),
            first_dim_batching: desc.supports_first_dim_batching()?,
            ragged_inputs,
            optional_inputs,
            batch_inputs: desc
                .batch_inputs()
                .iter()
                .map(|b| {
                    BatchSummary::new(
                        b.kind.as_config_str(),
                        &b.target_names,
                        b.data_type,
                        &b.source_inputs,
                    )
                })
                .collect(),
            batch_outputs: desc
                .batch_outputs()
                .iter()
                .map(|b| {
                    BatchSummary::new(
                        b.kind.as_config_str(),
                        &b.target_names,
                        b.data_type,
                        &b.source_inputs,
                    )
                })
                .collect(),
        })
    }
}

impl BatchSummary {
    fn new(
        kind: &'static str,
        target_names: &[String],
        data_type: DType,
        source_inputs: &[String],
    ) -> Self {
        Self {
            kind,
            target_names: target_names.to_vec(),
            data_type: data_type.as_config_str(),
            source_inputs: source_inputs.to_vec(),
        }
    }
}
