//! The 12-byte host-provided "scene time" block: `elapsed_seconds: f32`,
//! `delta_seconds: f32`, `frame_count: u32`, little-endian. Consumed by
//! `write_time_uniform`.

pub const SCENE_TIME_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTime {
    pub elapsed_seconds: f32,
    pub delta_seconds: f32,
    pub frame_count: u32,
}

impl SceneTime {
    pub fn to_bytes(self) -> [u8; SCENE_TIME_LEN] {
        let mut out = [0u8; SCENE_TIME_LEN];
        out[0..4].copy_from_slice(&self.elapsed_seconds.to_le_bytes());
        out[4..8].copy_from_slice(&self.delta_seconds.to_le_bytes());
        out[8..12].copy_from_slice(&self.frame_count.to_le_bytes());
        out
    }
}
