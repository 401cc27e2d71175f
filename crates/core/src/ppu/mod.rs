//! Reusable PPU (Picture Processing Unit) components for tile-based video systems.
//!
//! Building blocks shared by the system PPUs: indexed shade palettes and
//! 2bpp planar tile row decoding. System crates layer their own register
//! semantics on top.

pub mod palette;
pub mod tile;

pub use palette::ShadeTable;
pub use tile::TileRow;
