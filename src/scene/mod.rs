//! Entity/component scenes.
//!
//! A [`Scene`] owns a `hecs` world and hands out [`Entity`] handles scoped to
//! itself. Components are plain data; GPU resources are referenced by handle.
//!
//! # Example
//!
//! ```ignore
//! use phalanx::*;
//!
//! let mut scene = Scene::new();
//! let ground = scene.create_entity("ground");
//! scene.add_component(ground, Sprite::new().color(Color::GREEN).scale(Vec3::new(3.0, 0.2, 1.0)))?;
//!
//! let player = scene.create_entity("player");
//! scene.add_component(player, AnimatedSprite::new(walk_atlas, 6, 1, 0.1))?;
//! scene.add_component(player, Camera::from_bounds(-1.6, 1.6, -0.9, 0.9, 1.0, true))?;
//!
//! // every frame
//! scene.on_update_runtime(dt, &mut renderer, &mut device, width, height)?;
//! ```

mod components;
mod entity;
#[allow(clippy::module_inception)]
mod scene;

pub use crate::camera::Camera;
pub use components::{Aabb, AnimatedSprite, Circle, RenderInfo, Sprite, Tag, Transform};
pub use entity::{Entity, SceneId};
pub use scene::Scene;
