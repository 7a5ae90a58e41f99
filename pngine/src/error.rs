//! Aggregates the three subsystem error enums into one facade-level error,
//! plus the host-API-level codes from `spec.md` §7's "Resource errors"
//! (`AlreadyInitialized`, `NotInitialized`, `OutOfMemory`). Also provides
//! the "error code → string helper" `spec.md` §6.5 calls for: a stable
//! small integer per variant and a lookup back to a human-readable message,
//! for hosts that can only carry an `i32` status code across a boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Container(#[from] pngine_container::Error),

    #[error(transparent)]
    Module(#[from] pngine_module::Error),

    #[error(transparent)]
    Dispatcher(#[from] pngine_dispatcher::Error),

    #[error("runtime already initialized")]
    AlreadyInitialized,

    #[error("runtime not initialized")]
    NotInitialized,

    #[error("allocation of {0} bytes failed")]
    OutOfMemory(u64),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> i32 {
        match self {
            Error::Container(_) => 1,
            Error::Module(_) => 2,
            Error::Dispatcher(_) => 3,
            Error::AlreadyInitialized => 4,
            Error::NotInitialized => 5,
            Error::OutOfMemory(_) => 6,
        }
    }
}

/// `0` is reserved for success; unrecognized codes map to a generic message
/// rather than panicking, since a host may pass back a code this version of
/// the library didn't mint.
pub fn message_for_code(code: i32) -> &'static str {
    match code {
        0 => "success",
        1 => "PNG container error",
        2 => "PNGB module error",
        3 => "dispatcher error",
        4 => "runtime already initialized",
        5 => "runtime not initialized",
        6 => "out of memory",
        _ => "unknown error",
    }
}
