//! LCD register definitions
//!
//! - `$FF40 (LCDC)`: LCD control
//!   - Bit 7: Display enable
//!   - Bit 6: Window tile map (0=$9800, 1=$9C00)
//!   - Bit 5: Window enable
//!   - Bit 4: BG/Window tile data (0=$8800 signed, 1=$8000 unsigned)
//!   - Bit 3: BG tile map (0=$9800, 1=$9C00)
//!   - Bit 2: OBJ size (0=8x8, 1=8x16)
//!   - Bit 1: OBJ enable
//!   - Bit 0: BG/Window enable
//! - `$FF41 (STAT)`: LCD status
//!   - Bit 6: LYC=LY interrupt enable
//!   - Bit 5: Mode 2 (OAM scan) interrupt enable
//!   - Bit 4: Mode 1 (VBlank) interrupt enable
//!   - Bit 3: Mode 0 (HBlank) interrupt enable
//!   - Bit 2: LYC=LY coincidence flag
//!   - Bits 1-0: Current mode
//! - `$FF42 (SCY)`, `$FF43 (SCX)`: Background scroll
//! - `$FF44 (LY)`: Current scanline (read-only)
//! - `$FF45 (LYC)`: LY compare
//! - `$FF47 (BGP)`, `$FF48 (OBP0)`, `$FF49 (OBP1)`: Palettes
//! - `$FF4A (WY)`, `$FF4B (WX)`: Window position

// LCDC bits
pub const LCDC_ENABLE: u8 = 0x80;
pub const LCDC_WIN_TILEMAP: u8 = 0x40;
pub const LCDC_WIN_ENABLE: u8 = 0x20;
pub const LCDC_BG_WIN_TILES: u8 = 0x10;
pub const LCDC_BG_TILEMAP: u8 = 0x08;
pub const LCDC_OBJ_SIZE: u8 = 0x04;
pub const LCDC_OBJ_ENABLE: u8 = 0x02;
pub const LCDC_BG_WIN_ENABLE: u8 = 0x01;

// STAT bits
pub const STAT_LYC_INT: u8 = 0x40;
pub const STAT_OAM_INT: u8 = 0x20;
pub const STAT_VBLANK_INT: u8 = 0x10;
pub const STAT_HBLANK_INT: u8 = 0x08;
pub const STAT_COINCIDENCE: u8 = 0x04;
pub const STAT_MODE_MASK: u8 = 0x03;

/// Bits of STAT the CPU cannot write (mode + coincidence)
pub const STAT_READ_ONLY: u8 = STAT_MODE_MASK | STAT_COINCIDENCE;

/// Tile map bases
pub const TILEMAP_LOW: u16 = 0x9800;
pub const TILEMAP_HIGH: u16 = 0x9C00;

/// Tile data bases
pub const TILEDATA_UNSIGNED: u16 = 0x8000;
pub const TILEDATA_SIGNED: u16 = 0x8800;

/// LCD register selector, one per byte register the PPU touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LcdReg {
    Lcdc,
    Stat,
    Scy,
    Scx,
    Ly,
    Lyc,
    Bgp,
    Obp0,
    Obp1,
    Wy,
    Wx,
}

impl LcdReg {
    pub const COUNT: usize = 11;

    pub const ALL: [LcdReg; Self::COUNT] = [
        LcdReg::Lcdc,
        LcdReg::Stat,
        LcdReg::Scy,
        LcdReg::Scx,
        LcdReg::Ly,
        LcdReg::Lyc,
        LcdReg::Bgp,
        LcdReg::Obp0,
        LcdReg::Obp1,
        LcdReg::Wy,
        LcdReg::Wx,
    ];

    /// Dense index for register-file storage
    pub fn index(self) -> usize {
        self as usize
    }

    /// I/O address of the register
    pub fn address(self) -> u16 {
        match self {
            LcdReg::Lcdc => 0xFF40,
            LcdReg::Stat => 0xFF41,
            LcdReg::Scy => 0xFF42,
            LcdReg::Scx => 0xFF43,
            LcdReg::Ly => 0xFF44,
            LcdReg::Lyc => 0xFF45,
            LcdReg::Bgp => 0xFF47,
            LcdReg::Obp0 => 0xFF48,
            LcdReg::Obp1 => 0xFF49,
            LcdReg::Wy => 0xFF4A,
            LcdReg::Wx => 0xFF4B,
        }
    }

    /// Register at an I/O address ($FF46 is DMA and not an LCD register)
    pub fn from_address(addr: u16) -> Option<Self> {
        match addr {
            0xFF40 => Some(LcdReg::Lcdc),
            0xFF41 => Some(LcdReg::Stat),
            0xFF42 => Some(LcdReg::Scy),
            0xFF43 => Some(LcdReg::Scx),
            0xFF44 => Some(LcdReg::Ly),
            0xFF45 => Some(LcdReg::Lyc),
            0xFF47 => Some(LcdReg::Bgp),
            0xFF48 => Some(LcdReg::Obp0),
            0xFF49 => Some(LcdReg::Obp1),
            0xFF4A => Some(LcdReg::Wy),
            0xFF4B => Some(LcdReg::Wx),
            _ => None,
        }
    }
}

/// PPU mode as encoded in STAT bits 0-1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PpuMode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    VramTransfer = 3,
}

impl PpuMode {
    /// Cycles spent in this mode before the next transition
    pub fn budget(self) -> u32 {
        match self {
            PpuMode::OamScan => crate::ppu::OAM_CYCLES,
            PpuMode::VramTransfer => crate::ppu::VRAM_CYCLES,
            PpuMode::HBlank => crate::ppu::HBLANK_CYCLES,
            PpuMode::VBlank => crate::ppu::SCANLINE_CYCLES,
        }
    }

    /// STAT enable bit that raises LCD STAT on entry, if any.
    /// Mode 3 has none.
    pub fn stat_interrupt_bit(self) -> Option<u8> {
        match self {
            PpuMode::HBlank => Some(STAT_HBLANK_INT),
            PpuMode::VBlank => Some(STAT_VBLANK_INT),
            PpuMode::OamScan => Some(STAT_OAM_INT),
            PpuMode::VramTransfer => None,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl From<u8> for PpuMode {
    fn from(value: u8) -> Self {
        match value & STAT_MODE_MASK {
            0 => PpuMode::HBlank,
            1 => PpuMode::VBlank,
            2 => PpuMode::OamScan,
            _ => PpuMode::VramTransfer,
        }
    }
}

/// Decoded view of an LCDC value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcdc(pub u8);

impl Lcdc {
    #[inline]
    pub fn display_enabled(self) -> bool {
        self.0 & LCDC_ENABLE != 0
    }

    #[inline]
    pub fn window_enabled(self) -> bool {
        self.0 & LCDC_WIN_ENABLE != 0
    }

    #[inline]
    pub fn bg_enabled(self) -> bool {
        self.0 & LCDC_BG_WIN_ENABLE != 0
    }

    #[inline]
    pub fn sprites_enabled(self) -> bool {
        self.0 & LCDC_OBJ_ENABLE != 0
    }

    /// 8 or 16
    #[inline]
    pub fn sprite_height(self) -> u8 {
        if self.0 & LCDC_OBJ_SIZE != 0 {
            16
        } else {
            8
        }
    }

    /// True when tile indices are unsigned offsets from $8000
    #[inline]
    pub fn unsigned_tile_data(self) -> bool {
        self.0 & LCDC_BG_WIN_TILES != 0
    }

    #[inline]
    pub fn bg_tilemap(self) -> u16 {
        if self.0 & LCDC_BG_TILEMAP != 0 {
            TILEMAP_HIGH
        } else {
            TILEMAP_LOW
        }
    }

    #[inline]
    pub fn window_tilemap(self) -> u16 {
        if self.0 & LCDC_WIN_TILEMAP != 0 {
            TILEMAP_HIGH
        } else {
            TILEMAP_LOW
        }
    }

    /// Address of a BG/window tile's first byte.
    ///
    /// Unsigned mode: `$8000 + index * 16`. Signed mode: the index is an
    /// `i8`, rebased by 128 onto `$8800`, so index 0 lands at `$9000`.
    #[inline]
    pub fn tile_data_address(self, index: u8) -> u16 {
        if self.unsigned_tile_data() {
            TILEDATA_UNSIGNED + index as u16 * 16
        } else {
            TILEDATA_SIGNED + ((index as i8 as i16 + 128) as u16) * 16
        }
    }
}
