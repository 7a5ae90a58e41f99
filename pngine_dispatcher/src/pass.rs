//! The mutable pass context: `{ in_pass, active_pipeline_id, bound_bind_groups,
//! bound_vertex_buffers, bound_index_buffer }` from `spec.md` §3.3, plus the
//! state-machine transitions from §4.7.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    None,
    Render,
    Compute,
}

impl PassKind {
    fn label(self) -> &'static str {
        match self {
            PassKind::None => "idle",
            PassKind::Render => "in_render",
            PassKind::Compute => "in_compute",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PassContext {
    in_pass: Option<PassKindInner>,
    active_pipeline_id: Option<u32>,
    bound_bind_groups: Vec<Option<u32>>,
    bound_vertex_buffers: Vec<Option<u32>>,
    bound_index_buffer: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassKindInner {
    Render,
    Compute,
}

impl PassContext {
    pub fn kind(&self) -> PassKind {
        match self.in_pass {
            None => PassKind::None,
            Some(PassKindInner::Render) => PassKind::Render,
            Some(PassKindInner::Compute) => PassKind::Compute,
        }
    }

    pub fn begin_render(&mut self, opcode: u8) -> Result<()> {
        self.begin(PassKindInner::Render, opcode)
    }

    pub fn begin_compute(&mut self, opcode: u8) -> Result<()> {
        self.begin(PassKindInner::Compute, opcode)
    }

    fn begin(&mut self, kind: PassKindInner, opcode: u8) -> Result<()> {
        if self.in_pass.is_some() {
            return Err(Error::InvalidState {
                opcode,
                state: self.kind().label(),
            });
        }
        self.in_pass = Some(kind);
        self.active_pipeline_id = None;
        self.bound_bind_groups.clear();
        self.bound_vertex_buffers.clear();
        self.bound_index_buffer = None;
        Ok(())
    }

    pub fn end_pass(&mut self, opcode: u8) -> Result<()> {
        if self.in_pass.is_none() {
            return Err(Error::InvalidState {
                opcode,
                state: "idle",
            });
        }
        self.in_pass = None;
        Ok(())
    }

    /// Require the context to currently be `idle` (creation opcodes).
    pub fn require_idle(&self, opcode: u8) -> Result<()> {
        if self.in_pass.is_some() {
            return Err(Error::InvalidState {
                opcode,
                state: self.kind().label(),
            });
        }
        Ok(())
    }

    pub fn require_render(&self, opcode: u8) -> Result<()> {
        if self.in_pass != Some(PassKindInner::Render) {
            return Err(Error::InvalidState {
                opcode,
                state: self.kind().label(),
            });
        }
        Ok(())
    }

    pub fn require_compute(&self, opcode: u8) -> Result<()> {
        if self.in_pass != Some(PassKindInner::Compute) {
            return Err(Error::InvalidState {
                opcode,
                state: self.kind().label(),
            });
        }
        Ok(())
    }

    /// Require an active pass of either kind — used by `set_pipeline`, which
    /// is legal in both a render and a compute pass but not while idle.
    pub fn require_any_pass(&self, opcode: u8) -> Result<()> {
        if self.in_pass.is_none() {
            return Err(Error::InvalidState {
                opcode,
                state: "idle",
            });
        }
        Ok(())
    }

    pub fn set_pipeline(&mut self, pipeline_id: u32) {
        self.active_pipeline_id = Some(pipeline_id);
    }

    pub fn active_pipeline_id(&self) -> Option<u32> {
        self.active_pipeline_id
    }

    pub fn set_bind_group(&mut self, slot: u32, bind_group_id: u32) {
        let slot = slot as usize;
        if slot >= self.bound_bind_groups.len() {
            self.bound_bind_groups.resize(slot + 1, None);
        }
        self.bound_bind_groups[slot] = Some(bind_group_id);
    }

    pub fn set_vertex_buffer(&mut self, slot: u32, buffer_id: u32) {
        let slot = slot as usize;
        if slot >= self.bound_vertex_buffers.len() {
            self.bound_vertex_buffers.resize(slot + 1, None);
        }
        self.bound_vertex_buffers[slot] = Some(buffer_id);
    }

    pub fn set_index_buffer(&mut self, buffer_id: u32) {
        self.bound_index_buffer = Some(buffer_id);
    }

    /// Reset to `idle` with no bound state, discarding any partial pass —
    /// called at `end_frame`/next `begin` to drop partial GPU state from a
    /// failed frame.
    pub fn reset(&mut self) {
        *self = PassContext::default();
    }
}
