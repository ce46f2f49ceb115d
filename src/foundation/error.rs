/// Convenience result type used across stickgrid.
pub type StickgridResult<T> = Result<T, StickgridError>;

/// Top-level error taxonomy used by editor, render and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum StickgridError {
    /// Bad caller-provided value (radius, duration, fps, colour, off-grid line endpoint).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Index or rectangle outside the frame list or grid.
    #[error("index out of range: {0}")]
    IndexOutOfRange(String),

    /// Missing template or file.
    #[error("not found: {0}")]
    NotFound(String),

    /// Unreadable/unwritable file or encoder failure.
    #[error("io failure: {0}")]
    Io(String),

    /// Structurally broken document that could not be recovered with defaults.
    #[error("malformed data: {0}")]
    MalformedData(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StickgridError {
    /// Build a [`StickgridError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`StickgridError::IndexOutOfRange`] value.
    pub fn index_out_of_range(msg: impl Into<String>) -> Self {
        Self::IndexOutOfRange(msg.into())
    }

    /// Build a [`StickgridError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`StickgridError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`StickgridError::MalformedData`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedData(msg.into())
    }

    /// Map a filesystem error on `path` into `NotFound` or `Io`.
    pub fn from_fs(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(format!("'{}'", path.display()))
        } else {
            Self::io(format!("'{}': {err}", path.display()))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
