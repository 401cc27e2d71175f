//! Core emulator primitives shared by the system crates.

pub mod graphics;
pub mod logging;
pub mod ppu;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// A finished picture handed to presentation.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }

        /// Pixel at (x, y), if inside the frame
        pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
            if x >= self.width || y >= self.height {
                return None;
            }
            self.pixels.get((y * self.width + x) as usize).copied()
        }

        /// Pixels as RGBA8 bytes, for image encoders
        pub fn to_rgba8(&self) -> Vec<u8> {
            let mut out = Vec::with_capacity(self.pixels.len() * 4);
            for &argb in &self.pixels {
                out.push((argb >> 16) as u8);
                out.push((argb >> 8) as u8);
                out.push(argb as u8);
                out.push((argb >> 24) as u8);
            }
            out
        }
    }
}
