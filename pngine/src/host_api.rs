//! The literal host-facing surface from `spec.md` §6.5. A C-style host API
//! describes every argument as a possibly-null pointer; the idiomatic Rust
//! equivalent is `Option`, so every function here takes an `Option` and
//! defines the documented no-op/zero/nonzero-code outcome for `None`
//! explicitly (`spec.md` §8 invariant #10), instead of leaving the null
//! case as an unenforced caller contract the way a raw pointer would.

use crate::animation::Animation;
use crate::runtime::Runtime;

pub fn create(runtime: &Runtime, bytecode: &[u8], width: u32, height: u32) -> Option<Animation> {
    Animation::create(runtime, bytecode, width, height)
}

/// Returns `0` on success, nonzero otherwise — including when `anim` is
/// `None`, per invariant #10's "the render variant returns a nonzero code".
pub fn render(anim: Option<&mut Animation>, time_seconds: f32, delta_seconds: f32) -> i32 {
    match anim {
        Some(anim) => anim.render(time_seconds, delta_seconds),
        None => 1,
    }
}

pub fn resize(anim: Option<&mut Animation>, width: u32, height: u32) {
    if let Some(anim) = anim {
        anim.resize(width, height);
    }
}

pub fn get_width(anim: Option<&Animation>) -> u32 {
    anim.map(Animation::width).unwrap_or(0)
}

pub fn get_height(anim: Option<&Animation>) -> u32 {
    anim.map(Animation::height).unwrap_or(0)
}

pub fn destroy(anim: Option<Animation>) {
    if let Some(anim) = anim {
        anim.destroy();
    }
}

pub fn memory_warning(anim: Option<&mut Animation>) {
    if let Some(anim) = anim {
        anim.memory_warning();
    }
}

pub fn compute_counters(anim: Option<&Animation>) -> u32 {
    anim.map(Animation::compute_counters).unwrap_or(0)
}

pub fn render_counters(anim: Option<&Animation>) -> u32 {
    anim.map(Animation::render_counters).unwrap_or(0)
}

pub fn last_draw_info(anim: Option<&Animation>) -> u32 {
    anim.map(Animation::last_draw_info).unwrap_or(0)
}

pub fn frame_count(anim: Option<&Animation>) -> u64 {
    anim.map(Animation::frame_count).unwrap_or(0)
}

/// `0` means "no error"; matches `get_last_error`'s contract when `anim` is
/// absent or has never failed.
pub fn get_last_error(anim: Option<&Animation>) -> i32 {
    anim.and_then(Animation::get_last_error).unwrap_or(0)
}

pub fn error_message(code: i32) -> &'static str {
    crate::error::message_for_code(code)
}

pub fn set_uniform(anim: Option<&mut Animation>, name: &str, bytes: &[u8]) -> i32 {
    match anim {
        Some(anim) => match anim.set_uniform(name, bytes) {
            Ok(()) => 0,
            Err(err) => err.code(),
        },
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_animation_never_panics() {
        destroy(None);
        assert_eq!(render(None, 0.0, 0.0), 1);
        resize(None, 640, 480);
        assert_eq!(get_width(None), 0);
        assert_eq!(get_height(None), 0);
        memory_warning(None);
        assert_eq!(compute_counters(None), 0);
        assert_eq!(render_counters(None), 0);
        assert_eq!(frame_count(None), 0);
        assert_eq!(get_last_error(None), 0);
        assert_eq!(set_uniform(None, "time", &[0u8; 4]), 1);
    }

    #[test]
    fn error_message_never_panics_on_unknown_code() {
        assert_eq!(error_message(0), "success");
        assert_eq!(error_message(9999), "unknown error");
    }
}
