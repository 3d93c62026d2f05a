//! The entity/component store and its per-frame entry points.

use std::any::type_name;
use std::collections::HashSet;

use glam::{Mat4, Vec3};
use hecs::{Component, ComponentError, Query};

use super::components::{AnimatedSprite, RenderInfo, Sprite, Tag, Transform};
use super::entity::{Entity, SceneId};
use crate::camera::Camera;
use crate::error::SceneError;
use crate::render::{FrameStats, RenderDevice, RenderResult, Renderer};

/// Owns every entity of one world and all of their components.
///
/// Entities are listed in creation order, and every query returns matches in
/// that order, so draw order is stable from frame to frame. Creating or
/// destroying entities while holding the result of a query is not supported.
///
/// # Example
///
/// ```ignore
/// let mut scene = Scene::new();
/// let hero = scene.create_entity("hero");
/// scene.add_component(hero, Sprite::new().color(Color::RED))?;
/// scene.add_component(hero, Camera::from_bounds(-1.6, 1.6, -0.9, 0.9, 1.0, true))?;
///
/// scene.on_update_runtime(dt, &mut renderer, &mut device, 1600, 900)?;
/// ```
pub struct Scene {
    id: SceneId,
    world: hecs::World,
    order: Vec<hecs::Entity>,
    default_camera: Camera,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            id: SceneId::next(),
            world: hecs::World::new(),
            order: Vec::new(),
            default_camera: Camera::from_bounds(-1.6, 1.6, -0.9, 0.9, 1.0, true),
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Spawns an entity carrying a [`Tag`] with `name`.
    pub fn create_entity(&mut self, name: impl Into<String>) -> Entity {
        let handle = self.world.spawn((Tag::new(name),));
        self.order.push(handle);
        self.wrap(handle)
    }

    /// Removes an entity and every component attached to it.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), SceneError> {
        let handle = self.handle(entity)?;
        self.world
            .despawn(handle)
            .map_err(|_| SceneError::UnknownEntity(entity))?;
        self.order.retain(|&h| h != handle);
        log::debug!("destroyed entity {entity}");
        Ok(())
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.handle(entity).is_ok()
    }

    /// Every live entity in creation order.
    pub fn entities(&self) -> Vec<Entity> {
        self.order.iter().map(|&h| self.wrap(h)).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Attaches `component`, replacing any existing one of the same type.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<(), SceneError> {
        let handle = self.handle(entity)?;
        self.world
            .insert_one(handle, component)
            .map_err(|_| SceneError::UnknownEntity(entity))
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<hecs::Ref<'_, T>, SceneError> {
        let handle = self.handle(entity)?;
        self.world
            .get::<&T>(handle)
            .map_err(|err| component_error::<T>(entity, err))
    }

    pub fn get_component_mut<T: Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, SceneError> {
        let handle = self.handle(entity)?;
        self.world
            .get::<&mut T>(handle)
            .map_err(|err| component_error::<T>(entity, err))
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.handle(entity)
            .ok()
            .and_then(|h| self.world.entity(h).ok())
            .is_some_and(|e| e.has::<T>())
    }

    /// Detaches and returns a component.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<T, SceneError> {
        let handle = self.handle(entity)?;
        self.world
            .remove_one::<T>(handle)
            .map_err(|err| component_error::<T>(entity, err))
    }

    /// Entities matching query `Q`, e.g. `(&Transform, &Sprite)`, in creation order.
    pub fn entities_with<Q: Query>(&self) -> Vec<Entity> {
        let mut query = self.world.query::<Q>();
        let matches: HashSet<hecs::Entity> = query.iter().map(|(handle, _)| handle).collect();
        self.order
            .iter()
            .filter(|h| matches.contains(h))
            .map(|&h| self.wrap(h))
            .collect()
    }

    /// Direct access to the underlying storage.
    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    /// The camera used when no entity carries a primary camera.
    pub fn default_camera(&self) -> &Camera {
        &self.default_camera
    }

    pub fn default_camera_mut(&mut self) -> &mut Camera {
        &mut self.default_camera
    }

    /// The earliest-created live entity whose camera is primary.
    pub fn primary_camera_entity(&self) -> Option<Entity> {
        self.order
            .iter()
            .find(|&&h| {
                self.world
                    .get::<&Camera>(h)
                    .is_ok_and(|camera| camera.is_primary())
            })
            .map(|&h| self.wrap(h))
    }

    /// Steps every animated sprite by `dt` seconds.
    pub fn advance_animations(&mut self, dt: f32) {
        for (_, sprite) in self.world.query_mut::<&mut AnimatedSprite>() {
            sprite.advance(dt);
        }
    }

    /// Records draws for every renderable entity: static sprites, then
    /// animated sprites, then [`RenderInfo`] bundles placed by their [`Transform`].
    ///
    /// The renderer must be inside a frame.
    pub fn render(&self, renderer: &mut Renderer, device: &mut dyn RenderDevice, proj_view: Mat4) {
        for entity in self.entities_with::<&Sprite>() {
            if let Some(sprite) = self.copied::<Sprite>(entity) {
                renderer.render_sprite(device, &sprite, proj_view);
            }
        }
        for entity in self.entities_with::<&AnimatedSprite>() {
            if let Some(sprite) = self.copied::<AnimatedSprite>(entity) {
                renderer.render_animated_sprite(device, &sprite, proj_view);
            }
        }
        for entity in self.entities_with::<(&RenderInfo, &Transform)>() {
            let Ok(info) = self.get_component::<RenderInfo>(entity).map(|i| RenderInfo::clone(&i)) else {
                continue;
            };
            let model = match self.get_component::<Transform>(entity) {
                Ok(transform) => transform.model_matrix(),
                Err(_) => continue,
            };
            renderer.render_info(device, &info, model, proj_view);
        }
    }

    /// One full frame: begin, draw the scene, submit.
    pub fn render_frame(
        &self,
        renderer: &mut Renderer,
        device: &mut dyn RenderDevice,
        proj_view: Mat4,
    ) -> RenderResult<FrameStats> {
        renderer.begin_frame()?;
        self.render(renderer, device, proj_view);
        renderer.end_frame(device)
    }

    /// Renders through an editor-owned camera without advancing the scene.
    pub fn on_update_editor(
        &mut self,
        renderer: &mut Renderer,
        device: &mut dyn RenderDevice,
        camera: &mut Camera,
    ) -> RenderResult<FrameStats> {
        self.render_frame(renderer, device, camera.projection_view())
    }

    /// Advances animations, then renders through an editor-owned camera.
    pub fn on_update_simulation(
        &mut self,
        dt: f32,
        renderer: &mut Renderer,
        device: &mut dyn RenderDevice,
        camera: &mut Camera,
    ) -> RenderResult<FrameStats> {
        self.advance_animations(dt);
        self.render_frame(renderer, device, camera.projection_view())
    }

    /// Advances animations and renders through the scene's own primary camera.
    ///
    /// The primary camera follows its entity's sprite (position and Z
    /// rotation) and takes the aspect ratio of `width` x `height`. Without a
    /// primary camera the scene's default camera is used unchanged.
    pub fn on_update_runtime(
        &mut self,
        dt: f32,
        renderer: &mut Renderer,
        device: &mut dyn RenderDevice,
        width: u32,
        height: u32,
    ) -> RenderResult<FrameStats> {
        self.advance_animations(dt);

        let proj_view = self
            .primary_camera_entity()
            .and_then(|entity| self.drive_primary_camera(entity, width, height))
            .unwrap_or_else(|| self.default_camera.projection_view());

        self.render_frame(renderer, device, proj_view)
    }

    fn drive_primary_camera(&self, entity: Entity, width: u32, height: u32) -> Option<Mat4> {
        let (position, rotation) = self.follow_target(entity);
        let mut camera = self.world.get::<&mut Camera>(entity.handle).ok()?;
        camera.set_position(position);
        camera.set_rotation(rotation);
        if height > 0 {
            camera.set_aspect_ratio(width as f32 / height as f32);
        }
        Some(camera.projection_view())
    }

    /// Position and Z rotation (degrees) of the sprite a camera entity follows.
    fn follow_target(&self, entity: Entity) -> (Vec3, f32) {
        let sprite = self
            .copied::<Sprite>(entity)
            .or_else(|| self.copied::<AnimatedSprite>(entity).map(|a| a.sprite));
        match sprite {
            Some(sprite) => (sprite.position, sprite.rotation.z),
            None => (Vec3::ZERO, 0.0),
        }
    }

    fn copied<T: Component + Copy>(&self, entity: Entity) -> Option<T> {
        self.world.get::<&T>(entity.handle).ok().map(|c| *c)
    }

    fn wrap(&self, handle: hecs::Entity) -> Entity {
        Entity {
            handle,
            scene: self.id,
        }
    }

    fn handle(&self, entity: Entity) -> Result<hecs::Entity, SceneError> {
        if entity.scene != self.id {
            return Err(SceneError::ForeignEntity(entity));
        }
        if !self.world.contains(entity.handle) {
            return Err(SceneError::UnknownEntity(entity));
        }
        Ok(entity.handle)
    }
}

fn component_error<T>(entity: Entity, err: ComponentError) -> SceneError {
    match err {
        ComponentError::NoSuchEntity => SceneError::UnknownEntity(entity),
        ComponentError::MissingComponent(_) => SceneError::MissingComponent {
            entity,
            component: type_name::<T>(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::render::{HeadlessDevice, RendererConfig};

    fn renderer() -> (HeadlessDevice, Renderer) {
        let mut device = HeadlessDevice::new();
        let renderer = Renderer::new(&mut device, RendererConfig::new().size(160, 90)).unwrap();
        (device, renderer)
    }

    #[test]
    fn created_entities_get_a_tag() {
        let mut scene = Scene::new();
        let entity = scene.create_entity("player");
        assert_eq!(scene.get_component::<Tag>(entity).unwrap().name, "player");
        assert_eq!(scene.entities(), vec![entity]);
    }

    #[test]
    fn destroying_everything_leaves_nothing_behind() {
        let mut scene = Scene::new();
        let entities: Vec<_> = (0..16).map(|i| scene.create_entity(format!("e{i}"))).collect();
        for &entity in &entities {
            scene.add_component(entity, Sprite::new()).unwrap();
        }
        for &entity in &entities {
            scene.destroy_entity(entity).unwrap();
        }

        assert!(scene.is_empty());
        assert!(scene.entities().is_empty());
        assert!(scene.entities_with::<&Sprite>().is_empty());
        assert!(scene.entities_with::<&Tag>().is_empty());
    }

    #[test]
    fn double_destroy_is_an_error() {
        let mut scene = Scene::new();
        let entity = scene.create_entity("once");
        scene.destroy_entity(entity).unwrap();
        assert_eq!(scene.destroy_entity(entity), Err(SceneError::UnknownEntity(entity)));
        assert!(!scene.contains(entity));
    }

    #[test]
    fn handles_are_not_reused() {
        let mut scene = Scene::new();
        let old = scene.create_entity("old");
        scene.destroy_entity(old).unwrap();
        let new = scene.create_entity("new");
        assert_ne!(old, new);
        assert!(scene.get_component::<Tag>(old).is_err());
    }

    #[test]
    fn entities_from_other_scenes_are_rejected() {
        let mut a = Scene::new();
        let mut b = Scene::new();
        let entity = a.create_entity("a");
        assert_eq!(
            b.add_component(entity, Sprite::new()),
            Err(SceneError::ForeignEntity(entity))
        );
    }

    #[test]
    fn adding_again_overwrites() {
        let mut scene = Scene::new();
        let entity = scene.create_entity("box");
        scene.add_component(entity, Sprite::new().color(Color::RED)).unwrap();
        scene.add_component(entity, Sprite::new().color(Color::BLUE)).unwrap();

        assert_eq!(scene.get_component::<Sprite>(entity).unwrap().color, Color::BLUE);
        assert_eq!(scene.entities_with::<&Sprite>().len(), 1);
    }

    #[test]
    fn missing_components_are_reported() {
        let mut scene = Scene::new();
        let entity = scene.create_entity("bare");
        assert!(matches!(
            scene.get_component::<Transform>(entity),
            Err(SceneError::MissingComponent { .. })
        ));
        assert!(!scene.has_component::<Transform>(entity));

        scene.add_component(entity, Transform::new()).unwrap();
        assert!(scene.has_component::<Transform>(entity));
        scene.remove_component::<Transform>(entity).unwrap();
        assert!(!scene.has_component::<Transform>(entity));
    }

    #[test]
    fn queries_follow_creation_order() {
        let mut scene = Scene::new();
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let c = scene.create_entity("c");
        // attach in reverse so storage order differs from creation order
        for &entity in &[c, a] {
            scene.add_component(entity, Transform::new()).unwrap();
            scene.add_component(entity, Sprite::new()).unwrap();
        }
        scene.add_component(b, Sprite::new()).unwrap();

        assert_eq!(scene.entities_with::<(&Transform, &Sprite)>(), vec![a, c]);
        assert_eq!(scene.entities_with::<&Sprite>(), vec![a, b, c]);
    }

    #[test]
    fn identity_transform_has_identity_model() {
        let mut scene = Scene::new();
        let entity = scene.create_entity("origin");
        scene
            .add_component(
                entity,
                Transform::new()
                    .translation(Vec3::ZERO)
                    .rotation(Vec3::ZERO)
                    .scale(Vec3::ONE),
            )
            .unwrap();
        let model = scene.get_component::<Transform>(entity).unwrap().model_matrix();
        assert_eq!(model, Mat4::IDENTITY);
    }

    #[test]
    fn first_primary_camera_wins() {
        let (mut device, mut renderer) = renderer();
        let mut scene = Scene::new();

        let first = scene.create_entity("first camera");
        scene.add_component(first, Camera::from_bounds(-1.0, 1.0, -1.0, 1.0, 1.0, true)).unwrap();
        scene
            .add_component(first, Sprite::new().position(Vec3::new(2.0, 0.0, 0.0)))
            .unwrap();
        let second = scene.create_entity("second camera");
        scene.add_component(second, Camera::from_bounds(-1.0, 1.0, -1.0, 1.0, 1.0, true)).unwrap();

        assert_eq!(scene.primary_camera_entity(), Some(first));

        let stats = scene.on_update_runtime(0.016, &mut renderer, &mut device, 200, 100).unwrap();
        assert_eq!(stats.draws, 1);
        assert_eq!(device.submissions().len(), 1);

        let driving = scene.get_component::<Camera>(first).unwrap();
        assert_eq!(driving.aspect_ratio(), 2.0);
        assert_eq!(driving.position(), Vec3::new(2.0, 0.0, 0.0));
        let idle = scene.get_component::<Camera>(second).unwrap();
        assert_eq!(idle.aspect_ratio(), 1.0);
        assert_eq!(idle.position(), Vec3::ZERO);
    }

    #[test]
    fn runtime_falls_back_to_default_camera() {
        let (mut device, mut renderer) = renderer();
        let mut scene = Scene::new();
        let entity = scene.create_entity("quad");
        scene.add_component(entity, Sprite::new()).unwrap();

        assert_eq!(scene.primary_camera_entity(), None);
        let stats = scene.on_update_runtime(0.016, &mut renderer, &mut device, 160, 90).unwrap();
        assert_eq!(stats.draws, 1);

        let expected = scene.default_camera_mut().projection_view();
        let draw = &device.last_submission().unwrap().draws[0];
        assert_eq!(draw.uniforms.proj_view, expected.to_cols_array_2d());
    }

    #[test]
    fn simulation_advances_animations() {
        let (mut device, mut renderer) = renderer();
        let atlas = crate::render::Texture::from_image(
            &mut device,
            "atlas",
            &crate::render::ImageData::filled(64, 16, [255; 4]),
        )
        .unwrap();
        let mut scene = Scene::new();
        let entity = scene.create_entity("walker");
        scene
            .add_component(entity, AnimatedSprite::new(atlas.id(), 4, 1, 0.1))
            .unwrap();

        let mut camera = Camera::default();
        scene.on_update_editor(&mut renderer, &mut device, &mut camera).unwrap();
        assert_eq!(scene.get_component::<AnimatedSprite>(entity).unwrap().current_frame, 0);

        let stats = scene
            .on_update_simulation(0.25, &mut renderer, &mut device, &mut camera)
            .unwrap();
        assert_eq!(stats.draws, 1);
        assert_eq!(scene.get_component::<AnimatedSprite>(entity).unwrap().current_frame, 2);
    }

    #[test]
    fn render_info_draws_after_sprites_with_its_transform() {
        use crate::render::{
            ImageData, IndexBuffer, QUAD_VERTICES, SpriteVertex, Texture, VertexArray, VertexBuffer,
        };

        let (mut device, mut renderer) = renderer();
        let atlas = Texture::from_image(&mut device, "atlas", &ImageData::filled(32, 8, [255; 4])).unwrap();
        let vertex = VertexBuffer::new(&mut device, &QUAD_VERTICES[..3], SpriteVertex::layout()).unwrap();
        let index = IndexBuffer::new(&mut device, &[0, 1, 2]).unwrap();
        let info = RenderInfo::new(renderer.shader().id(), VertexArray::new(vertex, index));

        let mut scene = Scene::new();
        let custom = scene.create_entity("custom");
        let transform = Transform::new().translation(Vec3::new(0.0, 3.0, 0.0));
        scene.add_component(custom, info.clone()).unwrap();
        scene.add_component(custom, transform).unwrap();
        let unplaced = scene.create_entity("no transform");
        scene.add_component(unplaced, info).unwrap();
        let runner = scene.create_entity("runner");
        scene.add_component(runner, AnimatedSprite::new(atlas.id(), 4, 1, 0.1)).unwrap();
        let block = scene.create_entity("block");
        scene.add_component(block, Sprite::new()).unwrap();

        let stats = scene.render_frame(&mut renderer, &mut device, Mat4::IDENTITY).unwrap();
        assert_eq!(stats.draws, 3);

        let draws = &device.last_submission().unwrap().draws;
        let counts: Vec<u32> = draws.iter().map(|d| d.index_count).collect();
        assert_eq!(counts, vec![6, 6, 3]);
        assert_eq!(draws[1].texture, atlas.id());
        assert_eq!(draws[2].uniforms.model, transform.model_matrix().to_cols_array_2d());
    }
}
