//! Sprite (OBJ) layer
//!
//! OAM holds 40 four-byte entries:
//!
//! ```text
//! byte 0: Y position + 16
//! byte 1: X position + 8
//! byte 2: tile index (always $8000 addressing)
//! byte 3: flags
//!         bit 7: draw behind non-zero background colors
//!         bit 6: Y flip
//!         bit 5: X flip
//!         bit 4: palette (0 = OBP0, 1 = OBP1)
//! ```
//!
//! Entries are drawn from slot 39 down to slot 0, so where two sprites
//! overlap the lower slot ends up on top.

use emu_core::ppu::tile::{TileRow, ROW_BYTES, TILE_BYTES};

use crate::bus::PpuBus;
use crate::lcd::{LcdReg, Lcdc, TILEDATA_UNSIGNED};
use crate::palette::shade_id;
use crate::ppu::{SCREEN_WIDTH, SPRITE_COUNT};
use crate::ppu_renderer::LineSurface;

const FLAG_BEHIND_BG: u8 = 0x80;
const FLAG_Y_FLIP: u8 = 0x40;
const FLAG_X_FLIP: u8 = 0x20;
const FLAG_PALETTE: u8 = 0x10;

/// A decoded OAM entry with screen-space position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OamEntry {
    pub y: i16,
    pub x: i16,
    pub tile: u8,
    pub flags: u8,
}

impl OamEntry {
    /// Decode the entry in `slot` (0-39)
    pub fn read<B: PpuBus + ?Sized>(bus: &B, slot: usize) -> Self {
        let base = (slot * 4) as u8;
        Self {
            y: bus.read_oam(base) as i16 - 16,
            x: bus.read_oam(base + 1) as i16 - 8,
            tile: bus.read_oam(base + 2),
            flags: bus.read_oam(base + 3),
        }
    }

    pub fn behind_bg(&self) -> bool {
        self.flags & FLAG_BEHIND_BG != 0
    }

    pub fn y_flip(&self) -> bool {
        self.flags & FLAG_Y_FLIP != 0
    }

    pub fn x_flip(&self) -> bool {
        self.flags & FLAG_X_FLIP != 0
    }

    /// OBP1 instead of OBP0
    pub fn uses_obp1(&self) -> bool {
        self.flags & FLAG_PALETTE != 0
    }

    /// Row of the sprite covering line `ly`, if any
    pub fn row_on_line(&self, ly: u8, height: u8) -> Option<u8> {
        let offset = ly as i16 - self.y;
        if offset < 0 || offset >= height as i16 {
            return None;
        }
        let row = offset as u8;
        Some(if self.y_flip() { height - 1 - row } else { row })
    }
}

/// Draw every sprite covering line `ly` over what is already there
pub fn render_line<B: PpuBus + ?Sized>(surface: &mut LineSurface, bus: &B, ly: u8) {
    let lcdc = Lcdc(bus.reg(LcdReg::Lcdc));
    let height = lcdc.sprite_height();
    let bgp = bus.reg(LcdReg::Bgp);
    let obp0 = bus.reg(LcdReg::Obp0);
    let obp1 = bus.reg(LcdReg::Obp1);

    // Color a behind-BG sprite may cover
    let bg_blank = surface.palette().color(0, bgp);

    for slot in (0..SPRITE_COUNT).rev() {
        let sprite = OamEntry::read(bus, slot);
        let Some(row) = sprite.row_on_line(ly, height) else {
            continue;
        };

        // 8×16 sprites run straight into the following tile
        let addr = TILEDATA_UNSIGNED + sprite.tile as u16 * TILE_BYTES + row as u16 * ROW_BYTES;
        let planes = TileRow::new(bus.read_vram(addr), bus.read_vram(addr + 1));
        let palette = if sprite.uses_obp1() { obp1 } else { obp0 };

        for col in 0..8u8 {
            let px = sprite.x + col as i16;
            if px < 0 || px >= SCREEN_WIDTH as i16 {
                continue;
            }
            let color_id = planes.color_id_flipped(col, sprite.x_flip());
            if color_id == 0 {
                continue;
            }
            if sprite.behind_bg() && surface.color_at(px as i32, ly) != bg_blank {
                continue;
            }
            surface.plot(px as i32, ly, shade_id(color_id, palette));
        }
    }
}
