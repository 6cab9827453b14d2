// src/rendering_lib/mod.rs

pub mod map_painter;
pub mod triangle_cache;

pub use map_painter::show_map;
pub use triangle_cache::TriangleCache;
