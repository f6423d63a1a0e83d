//! Presentation-side coordinate pipeline: camera and viewport

mod camera;
mod viewport;

pub use camera::*;
pub use viewport::*;
