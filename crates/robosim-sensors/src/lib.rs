//! Robot parts that sense the arena, and the touch sensor event engine.

mod context;
mod error;
mod listener;
mod port;
mod probe;
mod touch;

pub use context::*;
pub use error::*;
pub use listener::*;
pub use port::*;
pub use probe::*;
pub use touch::*;
