//! The process-wide "initialized" flag, modeled as an explicit runtime
//! object (`spec.md` §9 "Global state": "model these as an explicit runtime
//! object created once at startup and passed to animations, not as
//! module-level singletons"). `init` is idempotent: calling it a second
//! time is a no-op, not an `AlreadyInitialized` error.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::RuntimeConfig;

pub struct Runtime {
    config: RuntimeConfig,
    initialized: AtomicBool,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Runtime {
        Runtime {
            config,
            initialized: AtomicBool::new(false),
        }
    }

    /// Mark the runtime initialized. Safe to call more than once from the
    /// same or different threads; every call after the first observes the
    /// flag already set and returns immediately.
    pub fn init(&self) {
        if !self.initialized.swap(true, Ordering::SeqCst) {
            log::debug!("pngine runtime initialized");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(RuntimeConfig::default())
    }
}
