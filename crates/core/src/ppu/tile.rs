//! 2bpp planar tile decoding.
//!
//! An 8x8 tile occupies 16 bytes. Each row is two consecutive bytes: the
//! low bitplane first, then the high bitplane. Bit 7 of each plane is the
//! leftmost pixel, so pixel `x` of a row reads bit `7 - x`.
//!
//! ```text
//! byte 0: row 0 low plane     byte 1: row 0 high plane
//! byte 2: row 1 low plane     byte 3: row 1 high plane
//! ...
//! ```

/// Size of one tile in bytes.
pub const TILE_BYTES: u16 = 16;

/// Bytes per tile row (one per bitplane).
pub const ROW_BYTES: u16 = 2;

/// The two bitplane bytes of one tile row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileRow {
    pub lo: u8,
    pub hi: u8,
}

impl TileRow {
    pub const fn new(lo: u8, hi: u8) -> Self {
        Self { lo, hi }
    }

    /// Color id stored at plane bit `bit` (7 = leftmost pixel).
    #[inline]
    pub fn color_id_at_bit(&self, bit: u8) -> u8 {
        let bit = bit & 0x07;
        let lo = (self.lo >> bit) & 1;
        let hi = (self.hi >> bit) & 1;
        (hi << 1) | lo
    }

    /// Color id of pixel column `x` (0 = leftmost).
    #[inline]
    pub fn color_id(&self, x: u8) -> u8 {
        self.color_id_at_bit(7 - (x & 0x07))
    }

    /// Color id of column `x`, mirrored horizontally when `flip` is set.
    #[inline]
    pub fn color_id_flipped(&self, x: u8, flip: bool) -> u8 {
        if flip {
            self.color_id_at_bit(x & 0x07)
        } else {
            self.color_id(x)
        }
    }
}

/// Byte offset of row `line` within a tile.
#[inline]
pub fn row_offset(line: u8) -> u16 {
    (line as u16 & 0x07) * ROW_BYTES
}
