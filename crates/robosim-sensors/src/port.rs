use std::fmt;

use robosim_core::{LineSegment, Vector2};
use serde::{Deserialize, Serialize};

/// The sensor socket a part is plugged into. The port decides where the part sits on
/// the robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorPort {
    /// Front right.
    S1,
    /// Front left.
    S2,
    /// Front middle.
    S3,
    /// Rear middle.
    S4,
}

impl SensorPort {
    /// Where the part is mounted, in the robot's local frame.
    pub fn mount_offset(&self) -> Vector2 {
        match self {
            SensorPort::S1 => Vector2::new(6.0, -10.0),
            SensorPort::S2 => Vector2::new(6.0, 10.0),
            SensorPort::S3 => Vector2::new(6.0, 0.0),
            SensorPort::S4 => Vector2::new(-35.0, 0.0),
        }
    }

    pub fn is_rear(&self) -> bool {
        matches!(self, SensorPort::S4)
    }

    /// The bumper edge of a touch sensor on this port, in the robot's local frame.
    pub fn touch_probe(&self) -> LineSegment {
        let x = if self.is_rear() { -5.0 } else { 5.0 };
        let mount = self.mount_offset();
        LineSegment::from_finite(mount + Vector2::new(x, -4.0), mount + Vector2::new(x, 4.0))
    }
}

impl fmt::Display for SensorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorPort::S1 => "S1",
            SensorPort::S2 => "S2",
            SensorPort::S3 => "S3",
            SensorPort::S4 => "S4",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_probes_face_forward() {
        for port in [SensorPort::S1, SensorPort::S2, SensorPort::S3] {
            let probe = port.touch_probe();
            assert_eq!(probe.start().x, 11.0);
            assert_eq!(probe.length(), 8.0);
        }
        assert_eq!(SensorPort::S1.touch_probe().start().y, -14.0);
        assert_eq!(SensorPort::S2.touch_probe().end().y, 14.0);
    }

    #[test]
    fn every_probe_passes_segment_validation() {
        for port in [SensorPort::S1, SensorPort::S2, SensorPort::S3, SensorPort::S4] {
            let probe = port.touch_probe();
            assert_eq!(LineSegment::new(probe.start(), probe.end()).unwrap(), probe);
        }
    }

    #[test]
    fn rear_probe_faces_backward() {
        let probe = SensorPort::S4.touch_probe();
        assert_eq!(probe.start(), Vector2::new(-40.0, -4.0));
        assert_eq!(probe.end(), Vector2::new(-40.0, 4.0));
    }
}
