//! Cell storage: the dense editing buffer and the sparse frame representation.

/// Dense grid with line and circle primitives.
pub mod model;
/// Sparse cell maps, bounds and batch moves.
pub mod sparse;
