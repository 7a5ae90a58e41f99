//! `RuntimeConfig`: the knobs a host would reasonably want to persist
//! across runs — target frame rate, default power preference, default
//! surface format — loadable from TOML via `serde`/`toml`. This is ambient
//! configuration plumbing, not a DSL feature (`spec.md` left host
//! configuration unspecified).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerPreference {
    LowPower,
    HighPerformance,
}

impl Default for PowerPreference {
    fn default() -> Self {
        PowerPreference::HighPerformance
    }
}

fn default_surface_format() -> String {
    "bgra8unorm".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Target frames per second. Negative values are a configuration
    /// mistake, not a crash: `effective_frame_rate` clamps them to the
    /// `0` "uncapped" sentinel (`spec.md` §8 invariant #11).
    #[serde(default)]
    pub target_frame_rate: i32,

    #[serde(default)]
    pub power_preference: PowerPreference,

    #[serde(default = "default_surface_format")]
    pub surface_format: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            target_frame_rate: 0,
            power_preference: PowerPreference::default(),
            surface_format: default_surface_format(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(toml: &str) -> Result<RuntimeConfig, toml::de::Error> {
        toml::from_str(toml)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Negative target frame rates clamp to `0`, which the dispatcher and
    /// any real backend treat as "run as fast as possible."
    pub fn effective_frame_rate(&self) -> u32 {
        if self.target_frame_rate < 0 {
            0
        } else {
            self.target_frame_rate as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_frame_rate_clamps_to_max_sentinel() {
        let config = RuntimeConfig {
            target_frame_rate: -30,
            ..RuntimeConfig::default()
        };
        assert_eq!(config.effective_frame_rate(), 0);
    }

    #[test]
    fn positive_frame_rate_passes_through() {
        let config = RuntimeConfig {
            target_frame_rate: 60,
            ..RuntimeConfig::default()
        };
        assert_eq!(config.effective_frame_rate(), 60);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = RuntimeConfig {
            target_frame_rate: 144,
            power_preference: PowerPreference::LowPower,
            surface_format: "rgba8unorm".to_string(),
        };
        let toml = config.to_toml_string().unwrap();
        let parsed = RuntimeConfig::from_toml_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }
}
