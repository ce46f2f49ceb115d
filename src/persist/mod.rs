//! JSON documents on disk.

/// Frame and animation codecs.
pub mod codec;
/// Named template directories.
pub mod templates;
