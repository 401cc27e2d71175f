//! PPU-facing memory interface and the reference LCD bus
//!
//! The PPU never owns memory. Everything it reads or writes goes through
//! [`PpuBus`], which the surrounding system implements on top of its own
//! memory map. [`GbBus`] is a self-contained implementation covering the
//! regions the PPU needs:
//!
//! ```text
//! $8000-$9FFF  Video RAM (8KB)
//! $FE00-$FE9F  OAM (160 bytes, 40 sprites × 4 bytes)
//! $FF0F        Interrupt flag (bit 0 VBlank, bit 1 LCD STAT)
//! $FF40-$FF4B  LCD registers ($FF46 DMA excluded)
//! ```

use emu_core::logging::{log, LogCategory, LogLevel};

use crate::lcd::{LcdReg, STAT_READ_ONLY};
use crate::GbError;

pub const VRAM_SIZE: usize = 0x2000;
pub const OAM_SIZE: usize = 0xA0;

/// Interrupts the PPU can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interrupt {
    VBlank = 0,
    LcdStat = 1,
}

impl Interrupt {
    /// Bit in the IF register
    pub fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// What the PPU needs from the rest of the machine.
///
/// Reads always succeed; address validity is the implementor's concern.
pub trait PpuBus {
    /// Read a VRAM byte at its CPU address ($8000-$9FFF)
    fn read_vram(&self, addr: u16) -> u8;

    /// Read an OAM byte by offset (0-159)
    fn read_oam(&self, addr: u8) -> u8;

    /// Read an LCD register
    fn reg(&self, reg: LcdReg) -> u8;

    /// Write an LCD register (PPU side, no masking)
    fn set_reg(&mut self, reg: LcdReg, val: u8);

    /// Fire-and-forget interrupt request
    fn request_interrupt(&mut self, kind: Interrupt);
}

/// Reference bus: VRAM, OAM, LCD registers and IF
pub struct GbBus {
    vram: Box<[u8; VRAM_SIZE]>,
    oam: [u8; OAM_SIZE],
    regs: [u8; LcdReg::COUNT],
    if_reg: u8,
}

impl Default for GbBus {
    fn default() -> Self {
        Self::new()
    }
}

impl GbBus {
    /// Post-boot register values
    pub fn new() -> Self {
        let mut bus = Self {
            vram: Box::new([0; VRAM_SIZE]),
            oam: [0; OAM_SIZE],
            regs: [0; LcdReg::COUNT],
            if_reg: 0,
        };
        bus.regs[LcdReg::Lcdc.index()] = 0x91;
        bus.regs[LcdReg::Bgp.index()] = 0xFC;
        bus.regs[LcdReg::Obp0.index()] = 0xFF;
        bus.regs[LcdReg::Obp1.index()] = 0xFF;
        bus
    }

    /// CPU-side read
    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0x9FFF => self.vram[(addr & 0x1FFF) as usize],
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize],
            0xFF0F => self.if_reg | 0xE0,
            0xFF41 => self.regs[LcdReg::Stat.index()] | 0x80,
            _ => match LcdReg::from_address(addr) {
                Some(reg) => self.regs[reg.index()],
                None => 0xFF,
            },
        }
    }

    /// CPU-side write. LY is read-only; STAT keeps its mode and
    /// coincidence bits.
    pub fn write(&mut self, addr: u16, val: u8) {
        match addr {
            0x8000..=0x9FFF => self.vram[(addr & 0x1FFF) as usize] = val,
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize] = val,
            0xFF0F => self.if_reg = val & 0x1F,
            _ => match LcdReg::from_address(addr) {
                Some(LcdReg::Ly) => {}
                Some(LcdReg::Stat) => {
                    let stat = &mut self.regs[LcdReg::Stat.index()];
                    *stat = (*stat & STAT_READ_ONLY) | (val & !STAT_READ_ONLY & 0x7F);
                }
                Some(reg) => {
                    log(LogCategory::Lcd, LogLevel::Trace, || {
                        format!("LCD: {:?} <- {:02X}", reg, val)
                    });
                    self.regs[reg.index()] = val;
                }
                None => {
                    log(LogCategory::Lcd, LogLevel::Debug, || {
                        format!("LCD: ignored write {:02X} to {:04X}", val, addr)
                    });
                }
            },
        }
    }

    /// Replace VRAM with a full 8KB dump
    pub fn load_vram(&mut self, data: &[u8]) -> Result<(), GbError> {
        if data.len() != VRAM_SIZE {
            return Err(GbError::DumpSize {
                region: "VRAM",
                expected: VRAM_SIZE,
                actual: data.len(),
            });
        }
        self.vram.copy_from_slice(data);
        Ok(())
    }

    /// Replace OAM with a full 160-byte dump
    pub fn load_oam(&mut self, data: &[u8]) -> Result<(), GbError> {
        if data.len() != OAM_SIZE {
            return Err(GbError::DumpSize {
                region: "OAM",
                expected: OAM_SIZE,
                actual: data.len(),
            });
        }
        self.oam.copy_from_slice(data);
        Ok(())
    }

    /// Write one OAM entry (Y, X, tile, flags) for `slot` 0-39
    pub fn write_sprite(&mut self, slot: usize, y: u8, x: u8, tile: u8, flags: u8) {
        if slot >= OAM_SIZE / 4 {
            return;
        }
        self.oam[slot * 4..slot * 4 + 4].copy_from_slice(&[y, x, tile, flags]);
    }

    /// Pending interrupt bits (IF)
    pub fn interrupt_flags(&self) -> u8 {
        self.if_reg
    }

    /// Return and clear pending interrupt bits, as the CPU does on service
    pub fn take_interrupts(&mut self) -> u8 {
        std::mem::take(&mut self.if_reg)
    }
}

impl PpuBus for GbBus {
    fn read_vram(&self, addr: u16) -> u8 {
        self.vram[(addr & 0x1FFF) as usize]
    }

    fn read_oam(&self, addr: u8) -> u8 {
        self.oam.get(addr as usize).copied().unwrap_or(0xFF)
    }

    fn reg(&self, reg: LcdReg) -> u8 {
        self.regs[reg.index()]
    }

    fn set_reg(&mut self, reg: LcdReg, val: u8) {
        self.regs[reg.index()] = val;
    }

    fn request_interrupt(&mut self, kind: Interrupt) {
        log(LogCategory::Interrupts, LogLevel::Trace, || {
            format!("INT: {:?} requested", kind)
        });
        self.if_reg |= kind.mask();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_defaults() {
        let bus = GbBus::new();
        assert_eq!(bus.reg(LcdReg::Lcdc), 0x91);
        assert_eq!(bus.reg(LcdReg::Bgp), 0xFC);
        assert_eq!(bus.reg(LcdReg::Ly), 0);
        assert_eq!(bus.interrupt_flags(), 0);
    }

    #[test]
    fn test_vram_oam_access() {
        let mut bus = GbBus::new();
        bus.write(0x8000, 0x42);
        bus.write(0x9FFF, 0x55);
        bus.write(0xFE9F, 0x20);
        assert_eq!(bus.read_vram(0x8000), 0x42);
        assert_eq!(bus.read(0x9FFF), 0x55);
        assert_eq!(bus.read_oam(0x9F), 0x20);
        assert_eq!(bus.read_oam(0xA0), 0xFF);
    }

    #[test]
    fn test_ly_is_read_only_from_cpu() {
        let mut bus = GbBus::new();
        bus.set_reg(LcdReg::Ly, 50);
        bus.write(0xFF44, 0);
        assert_eq!(bus.read(0xFF44), 50);
    }

    #[test]
    fn test_stat_write_preserves_ppu_bits() {
        let mut bus = GbBus::new();
        bus.set_reg(LcdReg::Stat, 0x06); // coincidence + mode 2
        bus.write(0xFF41, 0xFF);
        assert_eq!(bus.reg(LcdReg::Stat), 0x7E);

        bus.write(0xFF41, 0x00);
        assert_eq!(bus.reg(LcdReg::Stat), 0x06);
        // Bit 7 always reads back set
        assert_eq!(bus.read(0xFF41), 0x86);
    }

    #[test]
    fn test_interrupt_requests() {
        let mut bus = GbBus::new();
        bus.request_interrupt(Interrupt::LcdStat);
        bus.request_interrupt(Interrupt::VBlank);
        assert_eq!(bus.interrupt_flags(), 0x03);
        assert_eq!(bus.take_interrupts(), 0x03);
        assert_eq!(bus.interrupt_flags(), 0);
    }

    #[test]
    fn test_dump_loading() {
        let mut bus = GbBus::new();
        assert!(bus.load_vram(&[0xAB; VRAM_SIZE]).is_ok());
        assert_eq!(bus.read_vram(0x9000), 0xAB);

        let err = bus.load_oam(&[0; 10]).unwrap_err();
        assert!(matches!(
            err,
            GbError::DumpSize {
                region: "OAM",
                expected: OAM_SIZE,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_write_sprite() {
        let mut bus = GbBus::new();
        bus.write_sprite(5, 36, 18, 7, 0x80);
        assert_eq!(bus.read_oam(20), 36);
        assert_eq!(bus.read_oam(21), 18);
        assert_eq!(bus.read_oam(22), 7);
        assert_eq!(bus.read_oam(23), 0x80);

        // Out of range slots are ignored
        bus.write_sprite(40, 1, 1, 1, 1);
    }
}
