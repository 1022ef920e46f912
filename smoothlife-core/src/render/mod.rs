//! Renderer boundary: pixel projection and the shared front buffer.

pub mod frame;
pub mod projector;

pub use frame::{Frame, SharedFrame};
pub use projector::PixelProjector;
