//! Indexed shade palettes for monochrome video hardware.
//!
//! Monochrome handhelds do not store colors in palette RAM. A palette
//! register selects one of a small, fixed set of output shades for each
//! 2-bit color id, and the shades themselves are a property of the screen.
//! [`ShadeTable`] models that fixed set; the per-register indirection lives
//! in the system crate.

use serde::{Deserialize, Serialize};

/// Four output shades, lightest first.
///
/// Built once and never mutated; clone it into whatever needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShadeTable {
    shades: [u32; 4],
}

impl ShadeTable {
    /// White, dark gray, dark slate blue, black.
    pub const CLASSIC: ShadeTable = ShadeTable {
        shades: [0xFFFFFFFF, 0xFFA9A9A9, 0xFF48637A, 0xFF000000],
    };

    /// Neutral four-step gray ramp.
    pub const GRAYSCALE: ShadeTable = ShadeTable {
        shades: [0xFFFFFFFF, 0xFFAAAAAA, 0xFF555555, 0xFF000000],
    };

    pub const fn new(shades: [u32; 4]) -> Self {
        Self { shades }
    }

    /// Packed color of a shade id; only the low 2 bits are used.
    #[inline]
    pub fn shade(&self, id: u8) -> u32 {
        self.shades[(id & 0x03) as usize]
    }

    pub fn shades(&self) -> &[u32; 4] {
        &self.shades
    }
}

impl Default for ShadeTable {
    fn default() -> Self {
        Self::CLASSIC
    }
}
