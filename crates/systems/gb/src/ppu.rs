//! Game Boy PPU (LCD Controller) mode state machine
//!
//! Each visible line walks OAM scan (mode 2), VRAM transfer (mode 3) and
//! HBlank (mode 0); lines 144-153 are VBlank (mode 1). The whole line is
//! drawn at the mode 3 → mode 0 boundary.
//!
//! ```text
//!            80        172          204
//! line 0:  [ OAM ][  VRAM  ][   HBlank   ]   456 cycles
//! ...
//! line 143:[ OAM ][  VRAM  ][   HBlank   ]
//! line 144:[           VBlank            ]   raises VBlank
//! ...
//! line 153:[           VBlank            ]   -> line 0
//! ```

use emu_core::graphics::Framebuffer;
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::types::Frame;

use crate::bus::{Interrupt, PpuBus};
use crate::config::PpuConfig;
use crate::lcd::{LcdReg, Lcdc, PpuMode, STAT_COINCIDENCE, STAT_LYC_INT, STAT_MODE_MASK};
use crate::ppu_renderer::{render_scanline, LineSurface};
use crate::GbError;

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

pub const OAM_CYCLES: u32 = 80;
pub const VRAM_CYCLES: u32 = 172;
pub const HBLANK_CYCLES: u32 = 204;
pub const SCANLINE_CYCLES: u32 = 456;

/// Last line of VBlank before wrapping to 0
pub const VBLANK_LAST_LINE: u8 = 153;

/// 154 lines × 456 cycles
pub const CYCLES_PER_FRAME: u32 = SCANLINE_CYCLES * (VBLANK_LAST_LINE as u32 + 1);

pub const SPRITE_COUNT: usize = 40;

/// Position of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeState {
    pub mode: PpuMode,
    /// Cycles spent in the current mode, always below its budget between ticks
    pub cycles: u32,
    pub scanline: u8,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            mode: PpuMode::OamScan,
            cycles: 0,
            scanline: 0,
        }
    }
}

/// What happened during one call to [`Ppu::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// VBlank began and a new frame was published
    pub entered_vblank: bool,
    pub scanlines_rendered: u32,
}

/// Game Boy PPU state
pub struct Ppu {
    state: ModeState,
    surface: LineSurface,
    /// Last completed frame
    front: Frame,
    frame_count: u64,
    config: PpuConfig,
    lyc_matched: bool,
    display_on: bool,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::build(PpuConfig::default())
    }
}

impl Ppu {
    pub fn new(config: PpuConfig) -> Result<Self, GbError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PpuConfig) -> Self {
        let surface = LineSurface::new(&config);
        let front = surface.framebuffer().to_frame();
        Self {
            state: ModeState::default(),
            surface,
            front,
            frame_count: 0,
            config,
            lyc_matched: false,
            display_on: false,
        }
    }

    /// Advance by `cycles` elapsed CPU cycles
    pub fn tick<B: PpuBus + ?Sized>(&mut self, cycles: u32, bus: &mut B) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if !Lcdc(bus.reg(LcdReg::Lcdc)).display_enabled() {
            self.disable(bus);
            return outcome;
        }
        if !self.display_on {
            self.display_on = true;
            log(LogCategory::Ppu, LogLevel::Debug, || {
                "PPU: display enabled".to_string()
            });
        }

        // STAT mode bits may be stale after the display was switched back on
        let stat = bus.reg(LcdReg::Stat);
        if stat & STAT_MODE_MASK != self.state.mode.bits() {
            bus.set_reg(
                LcdReg::Stat,
                (stat & !STAT_MODE_MASK) | self.state.mode.bits(),
            );
        }

        // Carried remainder plus elapsed cycles can exceed u32
        let mut pending = self.state.cycles as u64 + cycles as u64;
        while pending >= self.state.mode.budget() as u64 {
            pending -= self.state.mode.budget() as u64;
            self.advance(bus, &mut outcome);
        }
        self.state.cycles = pending as u32;

        self.check_coincidence(bus);
        outcome
    }

    /// Leave the current mode once its budget is spent
    fn advance<B: PpuBus + ?Sized>(&mut self, bus: &mut B, outcome: &mut TickOutcome) {
        match self.state.mode {
            PpuMode::OamScan => self.enter_mode(bus, PpuMode::VramTransfer),
            PpuMode::VramTransfer => {
                render_scanline(&mut self.surface, &*bus, self.state.scanline);
                outcome.scanlines_rendered += 1;
                self.enter_mode(bus, PpuMode::HBlank);
            }
            PpuMode::HBlank => {
                self.set_scanline(bus, self.state.scanline + 1);
                if self.state.scanline as usize == SCREEN_HEIGHT {
                    self.enter_mode(bus, PpuMode::VBlank);
                    bus.request_interrupt(Interrupt::VBlank);
                    self.publish_frame();
                    outcome.entered_vblank = true;
                } else {
                    self.enter_mode(bus, PpuMode::OamScan);
                }
            }
            PpuMode::VBlank => {
                if self.state.scanline >= VBLANK_LAST_LINE {
                    self.set_scanline(bus, 0);
                    self.enter_mode(bus, PpuMode::OamScan);
                } else {
                    self.set_scanline(bus, self.state.scanline + 1);
                }
            }
        }
    }

    /// Switch mode, update STAT and raise LCD STAT if its enable bit is set
    fn enter_mode<B: PpuBus + ?Sized>(&mut self, bus: &mut B, mode: PpuMode) {
        self.state.mode = mode;
        let stat = (bus.reg(LcdReg::Stat) & !STAT_MODE_MASK) | mode.bits();
        bus.set_reg(LcdReg::Stat, stat);

        log(LogCategory::Ppu, LogLevel::Trace, || {
            format!("PPU: LY={} -> {:?}", self.state.scanline, mode)
        });

        if let Some(enable) = mode.stat_interrupt_bit() {
            if stat & enable != 0 {
                bus.request_interrupt(Interrupt::LcdStat);
            }
        }
    }

    fn set_scanline<B: PpuBus + ?Sized>(&mut self, bus: &mut B, line: u8) {
        self.state.scanline = line;
        bus.set_reg(LcdReg::Ly, line);
    }

    /// Compare LY against LYC once per enabled tick
    fn check_coincidence<B: PpuBus + ?Sized>(&mut self, bus: &mut B) {
        let stat = bus.reg(LcdReg::Stat);
        if self.state.scanline == bus.reg(LcdReg::Lyc) {
            bus.set_reg(LcdReg::Stat, stat | STAT_COINCIDENCE);
            let fresh = !self.lyc_matched || !self.config.edge_triggered_lyc;
            if stat & STAT_LYC_INT != 0 && fresh {
                bus.request_interrupt(Interrupt::LcdStat);
            }
            self.lyc_matched = true;
        } else {
            bus.set_reg(LcdReg::Stat, stat & !STAT_COINCIDENCE);
            self.lyc_matched = false;
        }
    }

    fn disable<B: PpuBus + ?Sized>(&mut self, bus: &mut B) {
        if self.display_on {
            self.display_on = false;
            log(LogCategory::Ppu, LogLevel::Debug, || {
                format!("PPU: display disabled at LY={}", self.state.scanline)
            });
        }
        self.state = ModeState::default();
        self.lyc_matched = false;
        bus.set_reg(LcdReg::Ly, 0);
        let stat = bus.reg(LcdReg::Stat);
        bus.set_reg(LcdReg::Stat, stat & !STAT_MODE_MASK);
    }

    fn publish_frame(&mut self) {
        self.surface.framebuffer().copy_into(&mut self.front);
        self.frame_count += 1;
        log(LogCategory::Ppu, LogLevel::Debug, || {
            format!("PPU: frame {} complete", self.frame_count)
        });
    }

    /// Back to line 0 in OAM scan with a blank screen
    pub fn reset(&mut self) {
        self.state = ModeState::default();
        self.surface.clear();
        self.surface.framebuffer().copy_into(&mut self.front);
        self.frame_count = 0;
        self.lyc_matched = false;
    }

    pub fn state(&self) -> ModeState {
        self.state
    }

    pub fn mode(&self) -> PpuMode {
        self.state.mode
    }

    /// Live surface, possibly mid-frame
    pub fn framebuffer(&self) -> &Framebuffer {
        self.surface.framebuffer()
    }

    /// Frame published at the most recent VBlank
    pub fn front_frame(&self) -> &Frame {
        &self.front
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn config(&self) -> &PpuConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::GbBus;
    use emu_core::ppu::ShadeTable;

    const LINE: u32 = SCANLINE_CYCLES;

    fn setup() -> (Ppu, GbBus) {
        let ppu = Ppu::new(PpuConfig::with_scale(1)).expect("valid config");
        (ppu, GbBus::new())
    }

    fn stat_mode(bus: &GbBus) -> u8 {
        bus.reg(LcdReg::Stat) & STAT_MODE_MASK
    }

    #[test]
    fn test_ppu_creation() {
        let ppu = Ppu::default();
        assert_eq!(ppu.mode(), PpuMode::OamScan);
        assert_eq!(ppu.framebuffer().width(), 480);
        assert_eq!(ppu.front_frame().height, 480);
        assert_eq!(ppu.frame_count(), 0);
    }

    #[test]
    fn test_new_rejects_bad_scale() {
        assert!(matches!(
            Ppu::new(PpuConfig::with_scale(0)),
            Err(GbError::InvalidScale(0))
        ));
    }

    #[test]
    fn test_first_line_modes() {
        let (mut ppu, mut bus) = setup();

        ppu.tick(79, &mut bus);
        assert_eq!(ppu.mode(), PpuMode::OamScan);
        assert_eq!(stat_mode(&bus), 2);

        ppu.tick(1, &mut bus);
        assert_eq!(ppu.mode(), PpuMode::VramTransfer);
        assert_eq!(stat_mode(&bus), 3);

        let outcome = ppu.tick(VRAM_CYCLES, &mut bus);
        assert_eq!(outcome.scanlines_rendered, 1);
        assert_eq!(ppu.mode(), PpuMode::HBlank);
        assert_eq!(stat_mode(&bus), 0);
        assert_eq!(bus.reg(LcdReg::Ly), 0);

        ppu.tick(HBLANK_CYCLES, &mut bus);
        assert_eq!(ppu.mode(), PpuMode::OamScan);
        assert_eq!(bus.reg(LcdReg::Ly), 1);
    }

    #[test]
    fn test_overflow_is_carried() {
        let (mut ppu, mut bus) = setup();
        ppu.tick(100, &mut bus);
        assert_eq!(ppu.mode(), PpuMode::VramTransfer);
        assert_eq!(ppu.state().cycles, 20);

        // One call spanning several transitions
        ppu.tick(LINE, &mut bus);
        assert_eq!(ppu.mode(), PpuMode::VramTransfer);
        assert_eq!(ppu.state().scanline, 1);
        assert_eq!(ppu.state().cycles, 20);
    }

    #[test]
    fn test_huge_tick_after_remainder() {
        let (mut ppu, mut bus) = setup();
        // Layers off so the long run stays cheap
        bus.write(0xFF40, 0x80);
        ppu.tick(10, &mut bus);
        ppu.tick(u32::MAX - 5, &mut bus);

        // u32::MAX + 5 = 61160 frames + 147 lines + 428 cycles
        let total = u32::MAX as u64 + 5;
        let frames = total / CYCLES_PER_FRAME as u64;
        let rest = total % CYCLES_PER_FRAME as u64;
        assert_eq!(frames, 61160);
        assert_eq!(rest, 147 * LINE as u64 + 428);

        assert_eq!(ppu.state().scanline, 147);
        assert_eq!(ppu.mode(), PpuMode::VBlank);
        assert_eq!(ppu.state().cycles, 428);
        assert_eq!(bus.reg(LcdReg::Ly), 147);
        assert_eq!(ppu.frame_count(), frames + 1);
    }

    #[test]
    fn test_vblank_entry() {
        let (mut ppu, mut bus) = setup();
        let outcome = ppu.tick(LINE * SCREEN_HEIGHT as u32, &mut bus);

        assert!(outcome.entered_vblank);
        assert_eq!(outcome.scanlines_rendered, 144);
        assert_eq!(ppu.mode(), PpuMode::VBlank);
        assert_eq!(stat_mode(&bus), 1);
        assert_eq!(bus.reg(LcdReg::Ly), 144);
        assert_eq!(bus.interrupt_flags() & Interrupt::VBlank.mask(), 0x01);
        assert_eq!(ppu.frame_count(), 1);
    }

    #[test]
    fn test_full_frame_wraps_to_line_zero() {
        let (mut ppu, mut bus) = setup();
        ppu.tick(LINE * 150, &mut bus);
        assert_eq!(bus.reg(LcdReg::Ly), 150);
        assert_eq!(ppu.mode(), PpuMode::VBlank);

        ppu.tick(LINE * 4, &mut bus);
        assert_eq!(bus.reg(LcdReg::Ly), 0);
        assert_eq!(ppu.mode(), PpuMode::OamScan);
        assert_eq!(ppu.state().cycles, 0);
        assert_eq!(bus.take_interrupts(), Interrupt::VBlank.mask());

        let outcome = ppu.tick(CYCLES_PER_FRAME, &mut bus);
        assert!(outcome.entered_vblank);
        assert_eq!(ppu.frame_count(), 2);
        assert_eq!(bus.reg(LcdReg::Ly), 0);
    }

    #[test]
    fn test_display_disable_resets() {
        let (mut ppu, mut bus) = setup();
        ppu.tick(LINE * 5 + 100, &mut bus);
        assert_eq!(bus.reg(LcdReg::Ly), 5);

        bus.write(0xFF40, 0x11);
        ppu.tick(0, &mut bus);
        assert_eq!(bus.reg(LcdReg::Ly), 0);
        assert_eq!(stat_mode(&bus), 0);
        assert_eq!(ppu.state(), ModeState::default());

        // Cycles are ignored while off
        ppu.tick(LINE * 3, &mut bus);
        assert_eq!(bus.reg(LcdReg::Ly), 0);
        assert_eq!(ppu.state().cycles, 0);

        // Re-enabling restarts in OAM scan
        bus.write(0xFF40, 0x91);
        ppu.tick(0, &mut bus);
        assert_eq!(stat_mode(&bus), 2);
        ppu.tick(80, &mut bus);
        assert_eq!(ppu.mode(), PpuMode::VramTransfer);
    }

    #[test]
    fn test_lyc_level_triggered() {
        let (mut ppu, mut bus) = setup();
        bus.write(0xFF45, 1);
        bus.write(0xFF41, STAT_LYC_INT);

        ppu.tick(LINE, &mut bus);
        assert_ne!(bus.reg(LcdReg::Stat) & STAT_COINCIDENCE, 0);
        assert_eq!(bus.take_interrupts(), Interrupt::LcdStat.mask());

        // Fires again on every tick while LY == LYC
        for _ in 0..3 {
            ppu.tick(4, &mut bus);
            assert_eq!(bus.take_interrupts(), Interrupt::LcdStat.mask());
        }

        ppu.tick(LINE, &mut bus);
        assert_eq!(bus.reg(LcdReg::Stat) & STAT_COINCIDENCE, 0);
        assert_eq!(bus.take_interrupts(), 0);
    }

    #[test]
    fn test_lyc_edge_triggered() {
        let config = PpuConfig {
            edge_triggered_lyc: true,
            ..PpuConfig::with_scale(1)
        };
        let mut ppu = Ppu::new(config).expect("valid config");
        let mut bus = GbBus::new();
        bus.write(0xFF45, 0);
        bus.write(0xFF41, STAT_LYC_INT);

        ppu.tick(4, &mut bus);
        assert_eq!(bus.take_interrupts(), Interrupt::LcdStat.mask());
        ppu.tick(4, &mut bus);
        assert_eq!(bus.take_interrupts(), 0);
        assert_ne!(bus.reg(LcdReg::Stat) & STAT_COINCIDENCE, 0);
    }

    #[test]
    fn test_stat_mode_interrupts() {
        let (mut ppu, mut bus) = setup();
        bus.write(0xFF41, 0x08); // HBlank

        ppu.tick(OAM_CYCLES, &mut bus);
        assert_eq!(bus.take_interrupts(), 0, "mode 3 never interrupts");
        ppu.tick(VRAM_CYCLES, &mut bus);
        assert_eq!(bus.take_interrupts(), Interrupt::LcdStat.mask());

        bus.write(0xFF41, 0x20); // OAM
        ppu.tick(HBLANK_CYCLES, &mut bus);
        assert_eq!(bus.take_interrupts(), Interrupt::LcdStat.mask());
    }

    #[test]
    fn test_vblank_stat_interrupt_precedes_vblank() {
        let (mut ppu, mut bus) = setup();
        bus.write(0xFF41, 0x10);
        ppu.tick(LINE * SCREEN_HEIGHT as u32, &mut bus);
        assert_eq!(bus.interrupt_flags(), 0x03);
    }

    #[test]
    fn test_frame_published_at_vblank() {
        let (mut ppu, mut bus) = setup();
        bus.write(0xFF47, 0xE4);
        for i in 0..16 {
            bus.write(0x8000 + i, 0xFF);
        }

        ppu.tick(LINE * 10, &mut bus);
        let black = ShadeTable::CLASSIC.shade(3);
        assert_eq!(ppu.framebuffer().get(0, 0), black);
        assert_eq!(ppu.front_frame().pixel(0, 0), Some(0));

        ppu.tick(LINE * 134, &mut bus);
        assert_eq!(ppu.front_frame().pixel(0, 0), Some(black));
        assert_eq!(ppu.front_frame().pixel(159, 143), Some(black));
    }

    #[test]
    fn test_bg_disabled_leaves_line() {
        let (mut ppu, mut bus) = setup();
        bus.write(0xFF40, 0x90);
        ppu.tick(LINE, &mut bus);
        assert_eq!(ppu.framebuffer().get(0, 0), 0);
    }

    #[test]
    fn test_reset() {
        let (mut ppu, mut bus) = setup();
        ppu.tick(CYCLES_PER_FRAME + 300, &mut bus);
        assert_eq!(ppu.frame_count(), 1);

        ppu.reset();
        assert_eq!(ppu.state(), ModeState::default());
        assert_eq!(ppu.frame_count(), 0);
        let white = ShadeTable::CLASSIC.shade(0);
        assert!(ppu.framebuffer().pixels().iter().all(|&p| p == white));
        assert_eq!(ppu.front_frame().pixel(0, 0), Some(white));
    }
}
