//! Geometry and obstacle model for the robot arena.
//!
//! Everything in this crate is evaluated once per simulation tick on the frame
//! driver's thread, so none of it blocks or allocates more than the result it
//! returns.

mod angle;
mod error;
mod geom;
pub mod math;
mod obstacle;
mod obstacle_field;
mod settings;

pub use angle::*;
pub use error::*;
pub use geom::*;
pub use obstacle::*;
pub use obstacle_field::*;
pub use settings::*;

/// A point or direction in arena coordinates.
pub type Vector2 = nalgebra::Vector2<f64>;
