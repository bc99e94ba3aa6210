/// Frame module - the per-frame protocol and the collaborator traits it drives

pub mod sync;
pub mod swapchain;
pub mod command_recorder;
pub mod window;
pub mod frame_loop;

pub use sync::*;
pub use swapchain::*;
pub use command_recorder::*;
pub use window::*;
pub use frame_loop::*;

// Scripted backend for tests (no GPU required)
#[cfg(test)]
pub mod mock_backend;
