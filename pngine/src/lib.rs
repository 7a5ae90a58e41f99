//! The PNGine facade: re-exports the container/module/dispatcher crates
//! under one name and implements the host-facing `Animation`/`Runtime` API
//! from `spec.md` §6.5 against the dispatcher's mock `GpuBackend`, the way
//! a host embedding PNGine actually wires the three subsystems together.

pub mod animation;
pub mod config;
mod error;
pub mod host_api;
pub mod runtime;

pub use animation::Animation;
pub use config::{PowerPreference, RuntimeConfig};
pub use error::{message_for_code, Error, Result};
pub use runtime::Runtime;

pub use pngine_container as container;
pub use pngine_dispatcher as dispatcher;
pub use pngine_module as module;
