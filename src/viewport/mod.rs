/// Viewport policies and resolution.
pub mod resolver;
