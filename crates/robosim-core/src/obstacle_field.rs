use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::{CollisionSettings, Obstacle};

/// Position of an obstacle in its field's registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(usize);

impl ObstacleId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obstacle #{}", self.0)
    }
}

/// An immutable view of the field at one point in time.
pub type FieldSnapshot = Arc<Vec<Arc<Obstacle>>>;

/// The ordered set of obstacles active in a run.
///
/// The field is append-only. Readers load the current snapshot without locking;
/// [`ObstacleField::register`] copies the list under a mutex and publishes a new
/// snapshot, so a sweep that already holds a snapshot never sees a half-written list.
#[derive(Debug)]
pub struct ObstacleField {
    obstacles: ArcSwap<Vec<Arc<Obstacle>>>,
    append_lock: Mutex<()>,
    settings: CollisionSettings,
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::with_settings(CollisionSettings::default())
    }

    pub fn with_settings(settings: CollisionSettings) -> Self {
        Self {
            obstacles: ArcSwap::from_pointee(Vec::new()),
            append_lock: Mutex::new(()),
            settings,
        }
    }

    /// Appends an obstacle and returns its id. Registration order is preserved.
    ///
    /// Costs O(n) in the number of registered obstacles, since the list is copied.
    pub fn register(&self, obstacle: Obstacle) -> ObstacleId {
        let _guard = self
            .append_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let current = self.obstacles.load();
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(Arc::new(obstacle));

        let id = ObstacleId(next.len() - 1);
        self.obstacles.store(Arc::new(next));
        log::debug!("Registered {}", id);
        id
    }

    /// The obstacles registered so far, in registration order.
    pub fn all(&self) -> FieldSnapshot {
        self.obstacles.load_full()
    }

    pub fn get(&self, id: ObstacleId) -> Option<Arc<Obstacle>> {
        self.obstacles.load().get(id.0).cloned()
    }

    pub fn len(&self) -> usize {
        self.obstacles.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn settings(&self) -> &CollisionSettings {
        &self.settings
    }

    /// Boundary tolerance used for every contact test against this field.
    pub fn tolerance(&self) -> f64 {
        self.settings.epsilon
    }
}
