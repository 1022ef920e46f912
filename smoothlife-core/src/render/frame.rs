use parking_lot::RwLock;
use std::sync::Arc;

/// A fully committed, projected generation.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub pixels: Vec<u8>,
    pub generation: u64,
}

/// Thread-safe front buffer shared with renderers.
///
/// The engine projects into its own back buffer and swaps it in under the
/// write lock, so a reader holding the read lock always sees one complete
/// generation. Cloning the handle is O(1).
#[derive(Clone, Debug, Default)]
pub struct SharedFrame {
    inner: Arc<RwLock<Frame>>,
}

impl SharedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap `back` in as the visible frame. `back` receives the previous front
    /// buffer for reuse.
    pub fn publish(&self, back: &mut Vec<u8>, generation: u64) {
        let mut front = self.inner.write();
        std::mem::swap(&mut front.pixels, back);
        front.generation = generation;
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Run `f` against the current frame while holding the read lock.
    pub fn with_pixels<R>(&self, f: impl FnOnce(&[u8], u64) -> R) -> R {
        let frame = self.inner.read();
        f(&frame.pixels, frame.generation)
    }

    pub fn snapshot(&self) -> Frame {
        self.inner.read().clone()
    }
}
