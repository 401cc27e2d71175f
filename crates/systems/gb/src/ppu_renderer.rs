//! Scanline rendering backend
//!
//! The mode state machine calls [`render_scanline`] once per visible line,
//! at the end of VRAM transfer. It draws the background/window layer, then
//! sprites on top, into a [`LineSurface`]: the upscaled framebuffer plus
//! the palette mapper that owns the shade table.
//!
//! ```text
//! Ppu::tick -> render_scanline -> background::render_line -> LineSurface
//!                              -> sprites::render_line    -> LineSurface
//! ```

use emu_core::graphics::Framebuffer;
use emu_core::logging::{log, LogCategory, LogLevel};

use crate::bus::PpuBus;
use crate::config::PpuConfig;
use crate::lcd::{LcdReg, Lcdc};
use crate::palette::PaletteMapper;
use crate::{background, sprites};

/// Upscaled render target addressed in logical (160×144) coordinates
pub struct LineSurface {
    framebuffer: Framebuffer,
    palette: PaletteMapper,
    scale: i32,
}

impl LineSurface {
    pub fn new(config: &PpuConfig) -> Self {
        let (width, height) = config.framebuffer_size();
        Self {
            framebuffer: Framebuffer::new(width, height),
            palette: PaletteMapper::new(config.shades, config.scale),
            scale: config.scale as i32,
        }
    }

    /// Fill the `scale × scale` block of logical pixel (x, ly) with a shade
    #[inline]
    pub fn plot(&mut self, x: i32, ly: u8, shade_id: u8) {
        let left = x * self.scale;
        let top = ly as i32 * self.scale;
        let run = self.palette.run(shade_id);
        for dy in 0..self.scale {
            self.framebuffer.fill_run(left, top + dy, run);
        }
    }

    /// Color currently shown at logical pixel (x, ly)
    #[inline]
    pub fn color_at(&self, x: i32, ly: u8) -> u32 {
        self.framebuffer
            .get(x * self.scale, ly as i32 * self.scale)
    }

    pub fn palette(&self) -> &PaletteMapper {
        &self.palette
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Fill everything with shade 0
    pub fn clear(&mut self) {
        let blank = self.palette.shade(0);
        self.framebuffer.clear(blank);
    }
}

/// Draw line `ly`: background/window first, then sprites over it.
///
/// A disabled layer leaves whatever the line held before.
pub fn render_scanline<B: PpuBus + ?Sized>(surface: &mut LineSurface, bus: &B, ly: u8) {
    let lcdc = Lcdc(bus.reg(LcdReg::Lcdc));

    if lcdc.bg_enabled() {
        background::render_line(surface, bus, ly);
    }
    if lcdc.sprites_enabled() {
        sprites::render_line(surface, bus, ly);
    }

    log(LogCategory::Ppu, LogLevel::Trace, || {
        format!("PPU: rendered line {} (LCDC={:02X})", ly, lcdc.0)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::ppu::ShadeTable;

    #[test]
    fn test_surface_dimensions() {
        let surface = LineSurface::new(&PpuConfig::with_scale(2));
        assert_eq!(surface.framebuffer().width(), 320);
        assert_eq!(surface.framebuffer().height(), 320);
    }

    #[test]
    fn test_plot_fills_scaled_block() {
        let mut surface = LineSurface::new(&PpuConfig::with_scale(3));
        surface.plot(2, 1, 3);

        let black = ShadeTable::CLASSIC.shade(3);
        let fb = surface.framebuffer();
        for y in 3..6 {
            for x in 6..9 {
                assert_eq!(fb.get(x, y), black);
            }
        }
        // Neighbours untouched
        assert_eq!(fb.get(5, 3), 0);
        assert_eq!(fb.get(9, 3), 0);
        assert_eq!(fb.get(6, 2), 0);
        assert_eq!(fb.get(6, 6), 0);
        assert_eq!(surface.color_at(2, 1), black);
    }

    #[test]
    fn test_plot_off_surface_is_dropped() {
        let mut surface = LineSurface::new(&PpuConfig::with_scale(1));
        surface.plot(-1, 0, 3);
        surface.plot(160, 0, 3);
        assert!(surface.framebuffer().pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_clear_uses_lightest_shade() {
        let mut surface = LineSurface::new(&PpuConfig::with_scale(1));
        surface.clear();
        assert!(surface
            .framebuffer()
            .pixels()
            .iter()
            .all(|&p| p == ShadeTable::CLASSIC.shade(0)));
    }
}
