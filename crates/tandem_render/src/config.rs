//! # Renderer Configuration
//!
//! Loaded once at startup, either from defaults or from a TOML file:
//!
//! ```toml
//! command_capacity = 4096
//! destroy_defer_frames = 2
//! default_pass_width = 1280
//! default_pass_height = 720
//!
//! [pools]
//! buffers = 256
//! images = 256
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::handle::MAX_POOL_CAPACITY;

/// Slot counts for each handle pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSizes {
    /// Buffer slots.
    pub buffers: usize,
    /// Image slots.
    pub images: usize,
    /// Shader slots.
    pub shaders: usize,
    /// Pipeline slots.
    pub pipelines: usize,
    /// Render target (pass) slots.
    pub passes: usize,
}

impl Default for PoolSizes {
    fn default() -> Self {
        Self {
            buffers: 128,
            images: 128,
            shaders: 32,
            pipelines: 64,
            passes: 16,
        }
    }
}

/// Configuration for a [`Renderer`](crate::Renderer).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Commands reserved up front in each of the two buffers.
    pub command_capacity: usize,
    /// Frames a destroyed handle's slot is held before it can be reused.
    pub destroy_defer_frames: u32,
    /// Initial default pass width (pixels).
    pub default_pass_width: u32,
    /// Initial default pass height (pixels).
    pub default_pass_height: u32,
    /// Panic when producer or consumer calls come from a second thread.
    pub enforce_thread_affinity: bool,
    /// Handle pool sizes.
    pub pools: PoolSizes,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command_capacity: 1024,
            destroy_defer_frames: 1,
            default_pass_width: 0,
            default_pass_height: 0,
            enforce_thread_affinity: true,
            pools: PoolSizes::default(),
        }
    }
}

impl RendererConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] on malformed TOML or
    /// out-of-range values.
    pub fn from_toml_str(source: &str) -> RenderResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| RenderError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Serializes the config back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> RenderResult<String> {
        toml::to_string(self).map_err(|e| RenderError::InvalidConfig(e.to_string()))
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> RenderResult<()> {
        let pools = [
            ("pools.buffers", self.pools.buffers),
            ("pools.images", self.pools.images),
            ("pools.shaders", self.pools.shaders),
            ("pools.pipelines", self.pools.pipelines),
            ("pools.passes", self.pools.passes),
        ];

        for (name, size) in pools {
            if size == 0 {
                return Err(RenderError::InvalidConfig(format!("{name} must be greater than zero")));
            }
            if size > MAX_POOL_CAPACITY {
                return Err(RenderError::InvalidConfig(format!(
                    "{name} = {size} exceeds the maximum of {MAX_POOL_CAPACITY}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RendererConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RendererConfig::from_toml_str(
            r"
            destroy_defer_frames = 3
            default_pass_width = 800

            [pools]
            buffers = 512
            ",
        )
        .unwrap();

        assert_eq!(config.destroy_defer_frames, 3);
        assert_eq!(config.default_pass_width, 800);
        assert_eq!(config.pools.buffers, 512);
        assert_eq!(config.pools.images, PoolSizes::default().images);
        assert_eq!(config.command_capacity, 1024);
        assert!(config.enforce_thread_affinity);
    }

    #[test]
    fn test_zero_pool_rejected() {
        let err = RendererConfig::from_toml_str("[pools]\nshaders = 0\n").unwrap_err();
        assert!(matches!(err, RenderError::InvalidConfig(msg) if msg.contains("pools.shaders")));
    }

    #[test]
    fn test_oversized_pool_rejected() {
        let mut config = RendererConfig::default();
        config.pools.images = MAX_POOL_CAPACITY + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(RendererConfig::from_toml_str("command_capacity = \"lots\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("tandem_config_{id}.toml"));

        let config = RendererConfig {
            command_capacity: 64,
            ..RendererConfig::default()
        };
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = RendererConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RendererConfig::load("/definitely/not/here/tandem.toml").unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
