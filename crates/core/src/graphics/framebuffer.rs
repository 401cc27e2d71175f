//! Bounds-checked pixel surface for software renderers
//!
//! The framebuffer stores packed ARGB8888 pixels in row-major order
//! (`index = y * width + x`). Every accessor tolerates out-of-range
//! coordinates: reads return 0 and writes are dropped. Renderers can
//! therefore clip sprites and scrolled layers without checking bounds
//! themselves.
//!
//! # Usage
//!
//! ```
//! use emu_core::graphics::Framebuffer;
//!
//! let mut fb = Framebuffer::new(320, 320);
//! fb.set(10, 10, 0xFF000000);
//! assert_eq!(fb.get(10, 10), 0xFF000000);
//!
//! // Off-surface writes are silently ignored
//! fb.set(-1, 400, 0xFFFFFFFF);
//! assert_eq!(fb.get(-1, 400), 0);
//! ```

use crate::types::Frame;

/// Packed-color pixel surface
#[derive(Debug, Clone)]
pub struct Framebuffer {
    /// Width in pixels
    width: u32,

    /// Height in pixels
    height: u32,

    /// Pixels, row-major
    pixels: Vec<u32>,
}

impl Framebuffer {
    /// Create a framebuffer with every pixel set to 0
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![0; size],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel storage, for presentation copies
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Fill the whole surface with one color
    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Read a pixel; 0 outside the surface
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u32 {
        match self.index(x, y) {
            Some(idx) => self.pixels[idx],
            None => 0,
        }
    }

    /// Write a pixel; no-op outside the surface
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }

    /// Copy a horizontal run of pixels starting at (x, y).
    ///
    /// The run is clipped to the row: pixels left of column 0 or right of
    /// the last column are dropped, and it never wraps into the next row.
    #[inline]
    pub fn fill_run(&mut self, x: i32, y: i32, run: &[u32]) {
        if y < 0 || y as u32 >= self.height {
            return;
        }
        let width = self.width as i32;
        let start = x.max(0);
        let end = (x + run.len() as i32).min(width);
        if start >= end {
            return;
        }
        let row = y as usize * self.width as usize;
        let src = (start - x) as usize;
        let len = (end - start) as usize;
        self.pixels[row + start as usize..row + start as usize + len]
            .copy_from_slice(&run[src..src + len]);
    }

    /// Snapshot the surface into a [`Frame`]
    pub fn to_frame(&self) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }

    /// Copy the surface into an existing frame, reusing its allocation
    pub fn copy_into(&self, frame: &mut Frame) {
        frame.width = self.width;
        frame.height = self.height;
        frame.pixels.clear();
        frame.pixels.extend_from_slice(&self.pixels);
    }
}
