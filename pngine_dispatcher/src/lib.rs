//! Executes a parsed PNGB [`pngine_module::Module`] against a pluggable
//! [`backend::GpuBackend`]: dense per-class resource tables, a render/compute
//! pass state machine, and packed diagnostic counters.

pub mod backend;
pub mod descriptors;
pub mod diagnostics;
pub mod dispatcher;
mod error;
pub mod mock_backend;
pub mod pass;
pub mod resources;
pub mod scene_time;

pub use backend::GpuBackend;
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use pass::PassKind;
pub use scene_time::SceneTime;
