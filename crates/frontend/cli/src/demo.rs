//! Built-in scene used when no memory dumps are given.
//!
//! A checkerboard background scrolled a little, a window strip along the
//! bottom and a diagonal of sprites, some of them behind the background.

use emu_gb::GbBus;

const CHECKER: u8 = 1;
const STRIPES: u8 = 2;
const BALL: u8 = 3;

const BALL_ROWS: [u8; 8] = [0x3C, 0x7E, 0xFF, 0xFF, 0xFF, 0xFF, 0x7E, 0x3C];

fn write_tile(bus: &mut GbBus, index: u8, rows: [(u8, u8); 8]) {
    let base = 0x8000 + index as u16 * 16;
    for (i, (lo, hi)) in rows.iter().enumerate() {
        bus.write(base + i as u16 * 2, *lo);
        bus.write(base + i as u16 * 2 + 1, *hi);
    }
}

pub fn build() -> GbBus {
    let mut bus = GbBus::new();

    write_tile(&mut bus, CHECKER, [(0xF0, 0x00); 8]);
    write_tile(
        &mut bus,
        STRIPES,
        [
            (0xFF, 0x00),
            (0x00, 0xFF),
            (0xFF, 0xFF),
            (0x00, 0x00),
            (0xFF, 0x00),
            (0x00, 0xFF),
            (0xFF, 0xFF),
            (0x00, 0x00),
        ],
    );
    write_tile(&mut bus, BALL, BALL_ROWS.map(|row| (row, row & 0x5A)));

    for i in 0..0x400u16 {
        let (row, col) = (i / 32, i % 32);
        bus.write(0x9800 + i, if (row + col) % 2 == 0 { CHECKER } else { 0 });
        bus.write(0x9C00 + i, STRIPES);
    }

    for slot in 0..12usize {
        let pos = slot as u8 * 12;
        let flags = if slot % 3 == 0 { 0x80 } else { (slot as u8 & 1) << 4 };
        bus.write_sprite(slot, pos + 16, pos + 8, BALL, flags);
    }

    // LCDC: display, window at $9C00, window on, $8000 tiles, OBJ, BG
    bus.write(0xFF40, 0xF3);
    bus.write(0xFF42, 4);
    bus.write(0xFF43, 3);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF48, 0xD2);
    bus.write(0xFF49, 0x1B);
    bus.write(0xFF4A, 128);
    bus.write(0xFF4B, 7);

    bus
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_gb::{LcdReg, PpuBus};

    #[test]
    fn test_demo_scene_is_displayed() {
        let bus = build();
        assert_eq!(bus.reg(LcdReg::Lcdc) & 0x80, 0x80);
        assert_eq!(bus.read_vram(0x8010), 0xF0);
        assert_eq!(bus.read_oam(2), BALL);
    }
}
