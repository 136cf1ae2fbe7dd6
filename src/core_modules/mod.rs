pub mod circle;
pub mod color_hash;
pub mod grid_index;
pub mod migration;
pub mod placement;
pub mod renderer;
