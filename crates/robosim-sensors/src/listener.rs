use std::fmt;

use crate::SensorPort;

/// Edge of the touch sensor state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchEvent {
    Pressed,
    Released,
}

impl fmt::Display for TouchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TouchEvent::Pressed => f.write_str("pressed"),
            TouchEvent::Released => f.write_str("released"),
        }
    }
}

/// Receives touch events. Both methods default to doing nothing, so implementors only
/// override what they care about.
///
/// Callbacks run on the sensor's notifier thread, never on the simulation thread. A
/// panicking callback is logged and does not stop later notifications.
pub trait TouchListener: Send + Sync + 'static {
    fn pressed(&self, _port: SensorPort) {}

    fn released(&self, _port: SensorPort) {}
}

/// Adapts a pair of closures to [`TouchListener`].
pub struct FnTouchListener<P, R> {
    pressed: P,
    released: R,
}

impl<P, R> FnTouchListener<P, R>
where
    P: Fn(SensorPort) + Send + Sync + 'static,
    R: Fn(SensorPort) + Send + Sync + 'static,
{
    pub fn new(pressed: P, released: R) -> Self {
        Self { pressed, released }
    }
}

impl<P, R> TouchListener for FnTouchListener<P, R>
where
    P: Fn(SensorPort) + Send + Sync + 'static,
    R: Fn(SensorPort) + Send + Sync + 'static,
{
    fn pressed(&self, port: SensorPort) {
        (self.pressed)(port)
    }

    fn released(&self, port: SensorPort) {
        (self.released)(port)
    }
}
