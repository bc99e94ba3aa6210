/// Static draw payload - the single mesh, its transform and its texture

pub mod mesh;
pub mod uniform;
pub mod checkerboard;

pub use mesh::*;
pub use uniform::*;
pub use checkerboard::*;
