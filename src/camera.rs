use glam::{Mat4, Vec3};

/// Lowest zoom level reachable through scroll input.
pub const MIN_ZOOM: f32 = 0.25;

/// An orthographic 2D camera.
///
/// Also used as the camera component on scene entities; `primary` marks the
/// camera that drives runtime rendering.
///
/// Rotation is in degrees about the Z axis. Every setter stores its value;
/// zoom and aspect setters rebuild the projection right away, position and
/// rotation setters mark the view dirty and [`projection_view`](Self::projection_view)
/// rebuilds it before use.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    position: Vec3,
    rotation: f32,
    aspect_ratio: f32,
    zoom: f32,
    primary: bool,
    view: Mat4,
    projection: Mat4,
    view_dirty: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0, 1.0, 1.0, false)
    }
}

impl Camera {
    pub fn new(position: Vec3, rotation: f32, aspect_ratio: f32, zoom: f32, primary: bool) -> Self {
        let mut camera = Self {
            position,
            rotation,
            aspect_ratio,
            zoom,
            primary,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_dirty: true,
        };
        camera.reproject();
        camera.recalculate_view_matrix();
        camera
    }

    /// A camera centred on the given bounds, with the aspect ratio they describe.
    pub fn from_bounds(left: f32, right: f32, bottom: f32, top: f32, zoom: f32, primary: bool) -> Self {
        let position = Vec3::new((left + right) / 2.0, (bottom + top) / 2.0, 0.0);
        let aspect_ratio = (right - left) / (top - bottom);
        Self::new(position, 0.0, aspect_ratio, zoom, primary)
    }

    /// Replaces the projection with an orthographic box, near/far fixed at -1/1.
    ///
    /// Inverted or empty bounds are not rejected and give a degenerate matrix.
    pub fn set_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.projection = Mat4::orthographic_rh_gl(left, right, bottom, top, -1.0, 1.0);
    }

    /// Takes the aspect ratio from a viewport size. `height` must be non-zero.
    pub fn on_window_resize(&mut self, width: f32, height: f32) {
        self.aspect_ratio = width / height;
        self.reproject();
    }

    /// Zooms by `delta`, never below [`MIN_ZOOM`].
    pub fn on_mouse_scroll(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta).max(MIN_ZOOM);
        self.reproject();
    }

    /// Rebuilds the view as the inverse of translate(position) * rotate_z(rotation).
    pub fn recalculate_view_matrix(&mut self) {
        let transform = Mat4::from_translation(self.position)
            * Mat4::from_rotation_z(self.rotation.to_radians());
        self.view = transform.inverse();
        self.view_dirty = false;
    }

    /// `projection * view`, refreshing the view first if it is stale.
    pub fn projection_view(&mut self) -> Mat4 {
        if self.view_dirty {
            self.recalculate_view_matrix();
        }
        self.projection * self.view
    }

    /// The cached view. Stale until recalculated after a position or rotation change.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn is_view_dirty(&self) -> bool {
        self.view_dirty
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.view_dirty = true;
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
        self.view_dirty = true;
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.set_rotation(self.rotation + degrees);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
        self.reproject();
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.reproject();
    }

    pub fn set_primary(&mut self, primary: bool) {
        self.primary = primary;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    fn reproject(&mut self) {
        let (a, z) = (self.aspect_ratio, self.zoom);
        self.set_projection(-a * z, a * z, -z, z);
    }
}
