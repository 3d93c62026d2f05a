//! Entity handles and scene identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier of a [`Scene`](super::Scene) within the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneId(pub(crate) u64);

impl SceneId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene#{}", self.0)
    }
}

/// Handle to one entity in one scene.
///
/// Carries no data; components are read and written through the owning
/// [`Scene`](super::Scene). Two handles are equal only if they name the same
/// entity of the same scene. Handles are generational: once an entity is
/// destroyed its handle never matches a later entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Entity {
    pub(crate) handle: hecs::Entity,
    pub(crate) scene: SceneId,
}

impl Entity {
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    /// The raw storage handle.
    pub fn handle(&self) -> hecs::Entity {
        self.handle
    }

    /// Stable integer form of the handle, e.g. for editor selection.
    pub fn to_bits(&self) -> u64 {
        self.handle.to_bits().get()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.handle, self.scene)
    }
}
