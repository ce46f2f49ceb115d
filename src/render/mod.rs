/// Layer compositing into RGB pixel buffers.
pub mod compositor;
