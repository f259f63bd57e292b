use std::fmt;

/// Tensor element types as spelled in model configuration (`TYPE_*`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F16,
    F32,
    F64,
    String,
    BF16,
}

impl DType {
    pub fn from_config_str(raw: &str) -> Option<Self> {
        Some(match raw {
            "TYPE_BOOL" => Self::Bool,
            "TYPE_UINT8" => Self::U8,
            "TYPE_UINT16" => Self::U16,
            "TYPE_UINT32" => Self::U32,
            "TYPE_UINT64" => Self::U64,
            "TYPE_INT8" => Self::I8,
            "TYPE_INT16" => Self::I16,
            "TYPE_INT32" => Self::I32,
            "TYPE_INT64" => Self::I64,
            "TYPE_FP16" => Self::F16,
            "TYPE_FP32" => Self::F32,
            "TYPE_FP64" => Self::F64,
            "TYPE_STRING" => Self::String,
            "TYPE_BF16" => Self::BF16,
            _ => return None,
        })
    }

    pub fn as_config_str(self) -> &'static str {
        match self {
            Self::Bool => "TYPE_BOOL",
            Self::U8 => "TYPE_UINT8",
            Self::U16 => "TYPE_UINT16",
            Self::U32 => "TYPE_UINT32",
            Self::U64 => "TYPE_UINT64",
            Self::I8 => "TYPE_INT8",
            Self::I16 => "TYPE_INT16",
            Self::I32 => "TYPE_INT32",
            Self::I64 => "TYPE_INT64",
            Self::F16 => "TYPE_FP16",
            Self::F32 => "TYPE_FP32",
            Self::F64 => "TYPE_FP64",
            Self::String => "TYPE_STRING",
            Self::BF16 => "TYPE_BF16",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_config_str())
    }
}
