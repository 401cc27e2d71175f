//! PPU configuration
//!
//! Loaded from JSON; every field is optional and falls back to its default.
//!
//! ```json
//! { "scale": 2, "square_framebuffer": false }
//! ```

use std::fs;
use std::path::Path;

use emu_core::ppu::ShadeTable;
use serde::{Deserialize, Serialize};

use crate::GbError;

/// Largest supported upscale factor
pub const MAX_SCALE: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PpuConfig {
    /// Each logical pixel becomes a `scale × scale` block
    pub scale: u32,
    /// Output shades, lightest first
    pub shades: ShadeTable,
    /// Size the framebuffer `160*scale` tall instead of `144*scale`
    pub square_framebuffer: bool,
    /// Raise the LYC=LY interrupt only when the match begins
    pub edge_triggered_lyc: bool,
}

impl Default for PpuConfig {
    fn default() -> Self {
        Self {
            scale: 3,
            shades: ShadeTable::CLASSIC,
            square_framebuffer: true,
            edge_triggered_lyc: false,
        }
    }
}

impl PpuConfig {
    pub fn with_scale(scale: u32) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GbError> {
        if self.scale == 0 || self.scale > MAX_SCALE {
            return Err(GbError::InvalidScale(self.scale));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, GbError> {
        let config: PpuConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, GbError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Framebuffer dimensions for this configuration
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let width = crate::ppu::SCREEN_WIDTH as u32 * self.scale;
        let rows = if self.square_framebuffer {
            crate::ppu::SCREEN_WIDTH
        } else {
            crate::ppu::SCREEN_HEIGHT
        };
        (width, rows as u32 * self.scale)
    }
}
