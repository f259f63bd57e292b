pub mod batch;
pub mod capability;
pub mod config;
pub mod descriptor;
pub mod dtype;
pub mod error;
pub mod host;
pub mod message;

pub use batch::*;
pub use capability::*;
pub use config::ModelConfig;
pub use descriptor::*;
pub use dtype::*;
pub use error::*;
pub use host::*;
pub use message::*;
