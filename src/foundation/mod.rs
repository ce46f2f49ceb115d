/// Grid, viewport and colour value types.
pub mod core;
/// Error taxonomy.
pub mod error;
