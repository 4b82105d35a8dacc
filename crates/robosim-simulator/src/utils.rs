/// Fires periodically on simulated time.
pub struct IntervalTrigger {
    interval: f64,
    next_trigger: f64,
}

impl IntervalTrigger {
    /// Creates a trigger that fires first at time 0, then every `interval` seconds.
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            next_trigger: 0.0,
        }
    }

    /// Returns true if the trigger is due at `time`. Missed intervals are skipped
    /// rather than fired in a burst.
    pub fn trigger(&mut self, time: f64) -> bool {
        if time >= self.next_trigger {
            self.next_trigger = time + self.interval;
            true
        } else {
            false
        }
    }
}
