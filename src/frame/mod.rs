/// Frame snapshots and backgrounds.
pub mod model;
