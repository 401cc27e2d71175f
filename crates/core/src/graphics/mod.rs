//! Reusable graphics utilities for emulator systems
//!
//! Software renderers across systems draw into the same kind of packed-color
//! surface, so the surface lives here rather than in each system crate.

pub mod framebuffer;

pub use framebuffer::Framebuffer;
