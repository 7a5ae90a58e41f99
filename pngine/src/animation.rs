//! The host-facing animation object (`spec.md` §6.5), implemented against
//! `pngine_dispatcher`'s mock/in-memory `GpuBackend` — a real embedding
//! swaps that backend for a `wgpu`-backed one; nothing else here changes,
//! since `Dispatcher` is generic over the backend.

use std::sync::Arc;

use pngine_dispatcher::mock_backend::MockBackend;
use pngine_dispatcher::{Dispatcher, SceneTime};
use pngine_module::Module;

use crate::error::{Error, Result};
use crate::runtime::Runtime;

const MAIN_FRAME: &str = "main";

pub struct Animation {
    dispatcher: Dispatcher<MockBackend>,
    width: u32,
    height: u32,
}

impl Animation {
    /// Parse `bytecode` and build a dispatcher over it. Returns `None` on
    /// any failure — an uninitialized runtime, a malformed module, or a
    /// dispatcher that can't complete its load-time setup pass — matching
    /// the host API's "Animation | null" contract (`spec.md` §6.5). There
    /// is no animation to carry a `last_error` in the failure case, so the
    /// cause is logged instead.
    pub fn create(runtime: &Runtime, bytecode: &[u8], width: u32, height: u32) -> Option<Animation> {
        if !runtime.is_initialized() {
            log::error!("pngine::Animation::create called before Runtime::init");
            return None;
        }
        let module = match Module::parse(bytecode.to_vec()) {
            Ok(module) => Arc::new(module),
            Err(err) => {
                log::error!("failed to parse PNGB module: {err}");
                return None;
            }
        };
        let dispatcher = match Dispatcher::new(module, MockBackend::new()) {
            Ok(dispatcher) => dispatcher,
            Err(err) => {
                log::error!("failed to build dispatcher: {err}");
                return None;
            }
        };
        Some(Animation {
            dispatcher,
            width,
            height,
        })
    }

    /// Replay the `"main"` frame once, feeding `time_seconds`/`delta_seconds`
    /// into the host-provided scene-time block (`spec.md` §6.4) ahead of
    /// execution. Returns `0` on success, nonzero on any dispatcher failure
    /// — the literal status-code contract from `spec.md` §6.5.
    pub fn render(&mut self, time_seconds: f32, delta_seconds: f32) -> i32 {
        self.dispatcher.set_scene_time(SceneTime {
            elapsed_seconds: time_seconds,
            delta_seconds,
            frame_count: self.dispatcher.diagnostics().frame_count() as u32,
        });
        match self.dispatcher.execute_frame(MAIN_FRAME) {
            Ok(()) => 0,
            Err(_) => 1,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn compute_counters(&self) -> u32 {
        self.dispatcher.diagnostics().compute_counters()
    }

    pub fn render_counters(&self) -> u32 {
        self.dispatcher.diagnostics().render_counters()
    }

    pub fn last_draw_info(&self) -> u32 {
        self.dispatcher.diagnostics().last_draw_info()
    }

    pub fn frame_count(&self) -> u64 {
        self.dispatcher.diagnostics().frame_count()
    }

    pub fn reset_counters(&mut self) {
        self.dispatcher.reset_counters();
    }

    /// The facade-level error code for the dispatcher's most recent
    /// failure, if any (`spec.md` §6.5's `get_last_error`/error-code-to-
    /// string pairing).
    pub fn get_last_error(&self) -> Option<i32> {
        self.dispatcher
            .get_last_error()
            .map(|err| Error::Dispatcher(err.clone()).code())
    }

    /// Look up `name` in the module's uniform table and write `bytes` into
    /// the associated buffer at the field's offset (`spec.md` §6.5).
    pub fn set_uniform(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let module = self.dispatcher.module();
        let strings = module.strings()?;
        let name_id = (0..strings.len())
            .find(|&id| strings.get(id).map(|s| s == name).unwrap_or(false))
            .ok_or_else(|| {
                Error::Dispatcher(pngine_dispatcher::Error::InvalidArgument(format!(
                    "no string named {name:?} in the module's string table"
                )))
            })?;
        let uniforms = module.uniforms()?;
        let binding = uniforms
            .bindings()
            .iter()
            .find(|binding| binding.field(name_id).is_some())
            .ok_or_else(|| {
                Error::Dispatcher(pngine_dispatcher::Error::InvalidArgument(format!(
                    "no uniform binding has a field named {name:?}"
                )))
            })?;
        let (group, binding_index) = (binding.group, binding.binding);
        self.dispatcher
            .set_uniform(group, binding_index, name_id, bytes)
            .map_err(Error::from)
    }

    /// Drops any optional caches this layer holds. There are none today;
    /// the method exists so the host-facing surface matches `spec.md` §6.5
    /// exactly.
    pub fn memory_warning(&mut self) {}

    pub fn destroy(self) {
        self.dispatcher.destroy();
    }
}
