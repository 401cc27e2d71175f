//! Game Boy (DMG) PPU
//!
//! The PPU is driven by the CPU loop: after each instruction the elapsed
//! cycles are handed to [`Ppu::tick`] together with a [`PpuBus`] giving
//! access to VRAM, OAM, the LCD registers and the interrupt flag.
//!
//! ```no_run
//! use emu_gb::{GbBus, Ppu, PpuConfig};
//!
//! let mut ppu = Ppu::new(PpuConfig::default())?;
//! let mut bus = GbBus::new();
//! loop {
//!     let outcome = ppu.tick(4, &mut bus);
//!     if outcome.entered_vblank {
//!         let _frame = ppu.front_frame();
//!         break;
//!     }
//! }
//! # Ok::<(), emu_gb::GbError>(())
//! ```

pub mod background;
pub mod bus;
pub mod config;
pub mod lcd;
pub mod palette;
pub mod ppu;
pub mod ppu_renderer;
pub mod sprites;

pub use bus::{GbBus, Interrupt, PpuBus};
pub use config::PpuConfig;
pub use lcd::{LcdReg, Lcdc, PpuMode};
pub use ppu::{ModeState, Ppu, TickOutcome, CYCLES_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH};

#[derive(thiserror::Error, Debug)]
pub enum GbError {
    #[error("Invalid scale {0} (expected 1-8)")]
    InvalidScale(u32),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{region} dump is {actual} bytes, expected {expected}")]
    DumpSize {
        region: &'static str,
        expected: usize,
        actual: usize,
    },
}
