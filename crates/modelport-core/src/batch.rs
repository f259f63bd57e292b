//! Batch input/output descriptors parsed from `batch_input` and
//! `batch_output`.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::config::{ConfigError, ConfigResult, Object};
use crate::{DType, ModelConfig};

pub type Names = SmallVec<[String; 2]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchInputKind {
    ElementCount,
    AccumulatedElementCount,
    AccumulatedElementCountWithZero,
    MaxElementCountAsShape,
    ItemShape,
    ItemShapeFlatten,
}

impl BatchInputKind {
    pub fn from_config_str(raw: &str) -> Option<Self> {
        Some(match raw {
            "BATCH_ELEMENT_COUNT" => Self::ElementCount,
            "BATCH_ACCUMULATED_ELEMENT_COUNT" => Self::AccumulatedElementCount,
            "BATCH_ACCUMULATED_ELEMENT_COUNT_WITH_ZERO" => Self::AccumulatedElementCountWithZero,
            "BATCH_MAX_ELEMENT_COUNT_AS_SHAPE" => Self::MaxElementCountAsShape,
            "BATCH_ITEM_SHAPE" => Self::ItemShape,
            "BATCH_ITEM_SHAPE_FLATTEN" => Self::ItemShapeFlatten,
            _ => return None,
        })
    }

    pub fn as_config_str(self) -> &'static str {
        match self {
            Self::ElementCount => "BATCH_ELEMENT_COUNT",
            Self::AccumulatedElementCount => "BATCH_ACCUMULATED_ELEMENT_COUNT",
            Self::AccumulatedElementCountWithZero => "BATCH_ACCUMULATED_ELEMENT_COUNT_WITH_ZERO",
            Self::MaxElementCountAsShape => "BATCH_MAX_ELEMENT_COUNT_AS_SHAPE",
            Self::ItemShape => "BATCH_ITEM_SHAPE",
            Self::ItemShapeFlatten => "BATCH_ITEM_SHAPE_FLATTEN",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchOutputKind {
    ScatterWithInputShape,
}

impl BatchOutputKind {
    pub fn from_config_str(raw: &str) -> Option<Self> {
        match raw {
            "BATCH_SCATTER_WITH_INPUT_SHAPE" => Some(Self::ScatterWithInputShape),
            _ => None,
        }
    }

    pub fn as_config_str(self) -> &'static str {
        match self {
            Self::ScatterWithInputShape => "BATCH_SCATTER_WITH_INPUT_SHAPE",
        }
    }
}

/// An input the server synthesizes from the composition of a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchInput {
    pub kind: BatchInputKind,
    pub target_names: Names,
    pub data_type: DType,
    pub source_inputs: Names,
}

/// An output whose batched result is scattered back to the requests that
/// formed the batch. One descriptor may own several target outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOutput {
    pub kind: BatchOutputKind,
    pub target_names: Names,
    pub data_type: DType,
    pub source_inputs: Names,
}

impl BatchInput {
    pub fn parse_all(config: &ModelConfig) -> ConfigResult<Vec<Self>> {
        config
            .root()
            .optional_array("batch_input")?
            .objects()
            .map(|entry| {
                let entry = entry?;
                let (kind, common) = parse_common(&entry, BatchInputKind::from_config_str)?;
                Ok(Self {
                    kind,
                    target_names: common.target_names,
                    data_type: common.data_type,
                    source_inputs: common.source_inputs,
                })
            })
            .collect()
    }
}

impl BatchOutput {
    pub fn parse_all(config: &ModelConfig) -> ConfigResult<Vec<Self>> {
        config
            .root()
            .optional_array("batch_output")?
            .objects()
            .map(|entry| {
                let entry = entry?;
                let (kind, common) = parse_common(&entry, BatchOutputKind::from_config_str)?;
                Ok(Self {
                    kind,
                    target_names: common.target_names,
                    data_type: common.data_type,
                    source_inputs: common.source_inputs,
                })
            })
            .collect()
    }

    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }
}

struct Common {
    target_names: Names,
    data_type: DType,
    source_inputs: Names,
}

fn parse_common<K>(
    entry: &Object<'_>,
    kind_of: fn(&str) -> Option<K>,
) -> ConfigResult<(K, Common)> {
    let raw_kind = entry.member_as_str("kind")?;
    let kind = kind_of(raw_kind).ok_or_else(|| {
        ConfigError::new(
            format!("{}.kind", entry.path()),
            format!("unknown kind '{raw_kind}'"),
        )
    })?;

    let target_names: Names = entry.member_as_string_array("target_name")?.into();
    if target_names.is_empty() {
        return Err(ConfigError::new(
            format!("{}.target_name", entry.path()),
            "at least one target name is required",
        ));
    }

    let raw_dtype = entry.member_as_str("data_type")?;
    let data_type = DType::from_config_str(raw_dtype).ok_or_else(|| {
        ConfigError::new(
            format!("{}.data_type", entry.path()),
            format!("unknown data type '{raw_dtype}'"),
        )
    })?;

    let source_inputs: Names = entry.optional_array("source_input")?.strings()?.into();

    Ok((
        kind,
        Common {
            target_names,
            data_type,
            source_inputs,
        },
    ))
}

/// Output name → position of the owning descriptor in the batch output list.
#[derive(Clone, Debug, Default)]
pub struct BatchOutputIndex {
    by_name: HashMap<String, usize>,
}

impl BatchOutputIndex {
    /// Fails on the first target name claimed by two descriptors. A name
    /// repeated within one descriptor maps to that descriptor.
    pub fn build(outputs: &[BatchOutput]) -> ConfigResult<Self> {
        let mut by_name = HashMap::new();
        for (idx, output) in outputs.iter().enumerate() {
            for name in output.target_names() {
                if let Some(prev) = by_name.insert(name.clone(), idx) {
                    if prev != idx {
                        return Err(ConfigError::new(
                            format!("batch_output[{idx}].target_name"),
                            format!("output '{name}' is already a target of batch_output[{prev}]"),
                        ));
                    }
                }
            }
        }
        Ok(Self { by_name })
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}
