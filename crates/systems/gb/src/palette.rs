//! DMG palette mapping
//!
//! BGP, OBP0 and OBP1 each hold four 2-bit shade ids, one per color id:
//! bits 1-0 for color 0, bits 3-2 for color 1, and so on. The mapper turns
//! (color id, palette byte) into a packed color and keeps, per shade, a
//! pre-filled run of `scale` pixels so an upscaled pixel row is a single
//! slice copy.

use emu_core::ppu::ShadeTable;

/// Shade id selected by `palette` for `color_id`
#[inline]
pub fn shade_id(color_id: u8, palette: u8) -> u8 {
    (palette >> ((color_id & 0x03) * 2)) & 0x03
}

pub struct PaletteMapper {
    shades: ShadeTable,
    /// One run of `scale` identical pixels per shade id
    runs: [Box<[u32]>; 4],
}

impl PaletteMapper {
    pub fn new(shades: ShadeTable, scale: u32) -> Self {
        let run = |id: u8| vec![shades.shade(id); scale as usize].into_boxed_slice();
        Self {
            shades,
            runs: [run(0), run(1), run(2), run(3)],
        }
    }

    /// Packed color for a color id through a palette byte
    #[inline]
    pub fn color(&self, color_id: u8, palette: u8) -> u32 {
        self.shades.shade(shade_id(color_id, palette))
    }

    /// Packed color of a shade id
    #[inline]
    pub fn shade(&self, id: u8) -> u32 {
        self.shades.shade(id)
    }

    /// Pre-filled pixel run for a shade id
    #[inline]
    pub fn run(&self, id: u8) -> &[u32] {
        &self.runs[(id & 0x03) as usize]
    }
}
