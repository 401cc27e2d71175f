//! Background and window layer
//!
//! Both layers are 32×32 tile maps of one-byte tile indices. The background
//! scrolls by (SCX, SCY) and wraps at 256 pixels; the window is anchored at
//! screen position (WX-7, WY) and does not scroll. For each pixel the window
//! wins when it is enabled, WY ≤ LY and the pixel lies at or right of WX-7.

use emu_core::ppu::tile::{row_offset, TileRow};

use crate::bus::PpuBus;
use crate::lcd::{LcdReg, Lcdc};
use crate::palette::shade_id;
use crate::ppu::SCREEN_WIDTH;
use crate::ppu_renderer::LineSurface;

/// Map entries per tile-map row
const MAP_WIDTH: u16 = 32;

/// Fetch one row of the tile under source pixel (x, y) of a tile map
#[inline]
fn fetch_row<B: PpuBus + ?Sized>(bus: &B, lcdc: Lcdc, map_base: u16, x: u8, y: u8) -> TileRow {
    let map_addr = map_base + (y / 8) as u16 * MAP_WIDTH + (x / 8) as u16;
    let tile_index = bus.read_vram(map_addr);
    let addr = lcdc.tile_data_address(tile_index) + row_offset(y);
    TileRow::new(bus.read_vram(addr), bus.read_vram(addr + 1))
}

/// Render the background/window pixels of line `ly`
pub fn render_line<B: PpuBus + ?Sized>(surface: &mut LineSurface, bus: &B, ly: u8) {
    let lcdc = Lcdc(bus.reg(LcdReg::Lcdc));
    let scx = bus.reg(LcdReg::Scx);
    let scy = bus.reg(LcdReg::Scy);
    let wx = bus.reg(LcdReg::Wx);
    let wy = bus.reg(LcdReg::Wy);
    let bgp = bus.reg(LcdReg::Bgp);

    let window_on_line = lcdc.window_enabled() && wy <= ly;
    let window_left = wx as i16 - 7;
    let bg_y = ly.wrapping_add(scy);
    let window_y = ly.wrapping_sub(wy);

    let mut row = TileRow::default();
    let mut was_window = false;

    for p in 0..SCREEN_WIDTH as u8 {
        let in_window = window_on_line && p as i16 >= window_left;
        let (x, y, map_base) = if in_window {
            ((p as i16 - window_left) as u8, window_y, lcdc.window_tilemap())
        } else {
            (p.wrapping_add(scx), bg_y, lcdc.bg_tilemap())
        };

        // Plane bytes only change on a tile boundary of the source layer
        if p == 0 || x & 0x07 == 0 || in_window != was_window {
            row = fetch_row(bus, lcdc, map_base, x, y);
            was_window = in_window;
        }

        let color_id = row.color_id(x);
        surface.plot(p as i32, ly, shade_id(color_id, bgp));
    }
}
