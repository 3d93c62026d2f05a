//! Editor session state: play/edit mode, viewport size and the editor camera.
//!
//! The editor draws nothing itself. A GUI layer reads
//! [`Renderer::color_attachment`] for its viewport image and forwards panel
//! size changes to [`Editor::set_viewport_size`].

use glam::Vec3;

use crate::camera::Camera;
use crate::render::{FrameStats, RenderDevice, RenderResult, Renderer};
use crate::scene::Scene;

/// Zoom of a fresh editor camera, roughly one world unit per 100 pixels of height.
pub const EDITOR_ZOOM: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Scene is frozen and viewed through the editor camera.
    #[default]
    Edit,
    /// Scene runs and is viewed through its own primary camera.
    Play,
}

#[derive(Debug)]
pub struct Editor {
    mode: GameMode,
    viewport: (u32, u32),
    camera: Camera,
}

impl Editor {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Camera::from_bounds(-1.0, 1.0, -1.0, 1.0, 1.0, true);
        camera.set_zoom(EDITOR_ZOOM);
        if height > 0 {
            camera.on_window_resize(width as f32, height as f32);
        }
        Self {
            mode: GameMode::Edit,
            viewport: (width, height),
            camera,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        if self.mode != mode {
            log::info!("editor mode: {mode:?}");
        }
        self.mode = mode;
    }

    /// Switches between edit and play, returning the new mode.
    pub fn toggle_mode(&mut self) -> GameMode {
        let next = match self.mode {
            GameMode::Edit => GameMode::Play,
            GameMode::Play => GameMode::Edit,
        };
        self.set_mode(next);
        next
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    /// Follows a viewport resize. Unchanged or zero sizes do nothing.
    pub fn set_viewport_size(
        &mut self,
        renderer: &mut Renderer,
        device: &mut dyn RenderDevice,
        width: u32,
        height: u32,
    ) -> RenderResult<()> {
        if width == 0 || height == 0 || self.viewport == (width, height) {
            return Ok(());
        }
        self.viewport = (width, height);
        self.camera.on_window_resize(width as f32, height as f32);
        renderer.resize(device, width, height)
    }

    /// Puts the editor camera back at the origin with zoom 1.
    pub fn reset_camera(&mut self) {
        let (width, height) = self.viewport;
        self.camera.set_position(Vec3::ZERO);
        self.camera.set_rotation(0.0);
        self.camera.set_zoom(1.0);
        if height > 0 {
            self.camera.set_aspect_ratio(width as f32 / height as f32);
        }
    }

    pub fn on_mouse_scroll(&mut self, delta: f32) {
        self.camera.on_mouse_scroll(delta);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Renders one frame of `scene` according to the current mode.
    pub fn update(
        &mut self,
        dt: f32,
        scene: &mut Scene,
        renderer: &mut Renderer,
        device: &mut dyn RenderDevice,
    ) -> RenderResult<FrameStats> {
        match self.mode {
            GameMode::Edit => scene.on_update_editor(renderer, device, &mut self.camera),
            GameMode::Play => {
                let (width, height) = self.viewport;
                scene.on_update_runtime(dt, renderer, device, width, height)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeadlessDevice, ImageData, RendererConfig, Texture};
    use crate::scene::AnimatedSprite;

    fn setup() -> (HeadlessDevice, Renderer, Editor) {
        let mut device = HeadlessDevice::new();
        let renderer = Renderer::new(&mut device, RendererConfig::new().size(800, 400)).unwrap();
        (device, renderer, Editor::new(800, 400))
    }

    #[test]
    fn starts_in_edit_mode_with_wide_zoom() {
        let (_, _, editor) = setup();
        assert_eq!(editor.mode(), GameMode::Edit);
        assert_eq!(editor.camera().zoom(), EDITOR_ZOOM);
        assert_eq!(editor.camera().aspect_ratio(), 2.0);
    }

    #[test]
    fn toggling_flips_mode() {
        let (_, _, mut editor) = setup();
        assert_eq!(editor.toggle_mode(), GameMode::Play);
        assert_eq!(editor.toggle_mode(), GameMode::Edit);
    }

    #[test]
    fn viewport_resize_reaches_camera_and_framebuffer() {
        let (mut device, mut renderer, mut editor) = setup();
        let before = device.render_targets_created();

        editor.set_viewport_size(&mut renderer, &mut device, 800, 400).unwrap();
        assert_eq!(device.render_targets_created(), before);

        editor.set_viewport_size(&mut renderer, &mut device, 300, 300).unwrap();
        assert_eq!(editor.camera().aspect_ratio(), 1.0);
        assert_eq!(renderer.framebuffer().size(), (300, 300));

        editor.set_viewport_size(&mut renderer, &mut device, 0, 300).unwrap();
        assert_eq!(editor.viewport_size(), (300, 300));
    }

    #[test]
    fn reset_restores_origin_and_unit_zoom() {
        let (_, _, mut editor) = setup();
        editor.camera_mut().translate(Vec3::new(4.0, 2.0, 0.0));
        editor.camera_mut().rotate(30.0);
        editor.reset_camera();

        let camera = editor.camera();
        assert_eq!(camera.position(), Vec3::ZERO);
        assert_eq!(camera.rotation(), 0.0);
        assert_eq!(camera.zoom(), 1.0);
        assert_eq!(camera.aspect_ratio(), 2.0);
    }

    #[test]
    fn only_play_mode_advances_the_scene() {
        let (mut device, mut renderer, mut editor) = setup();
        let atlas = Texture::from_image(&mut device, "atlas", &ImageData::filled(32, 8, [255; 4])).unwrap();
        let mut scene = Scene::new();
        let entity = scene.create_entity("runner");
        scene.add_component(entity, AnimatedSprite::new(atlas.id(), 4, 1, 0.1)).unwrap();

        editor.update(0.15, &mut scene, &mut renderer, &mut device).unwrap();
        assert_eq!(scene.get_component::<AnimatedSprite>(entity).unwrap().current_frame, 0);

        editor.toggle_mode();
        let stats = editor.update(0.15, &mut scene, &mut renderer, &mut device).unwrap();
        assert_eq!(stats.draws, 1);
        assert_eq!(scene.get_component::<AnimatedSprite>(entity).unwrap().current_frame, 1);
    }
}
