//! Textures and the name-keyed texture library.

use std::collections::HashMap;

use super::device::{ImageData, RenderDevice, RenderResult, TextureId, TextureRegion};
use crate::color::Color;

/// A 2D RGBA texture owned by a device.
///
/// Cloning a `Texture` clones the handle, not the texels: a region written
/// through one clone is what every other holder samples next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    id: TextureId,
    name: String,
    width: u32,
    height: u32,
}

impl Texture {
    /// Uploads decoded pixels.
    pub fn from_image(
        device: &mut dyn RenderDevice,
        name: impl Into<String>,
        image: &ImageData,
    ) -> RenderResult<Self> {
        let name = name.into();
        let id = device.create_texture(&name, image).inspect_err(|err| {
            log::error!("failed to create texture '{name}': {err}");
        })?;
        log::trace!("texture '{name}' {}x{} -> {id:?}", image.width, image.height);
        Ok(Self {
            id,
            name,
            width: image.width,
            height: image.height,
        })
    }

    /// Raw RGBA8 texels.
    pub fn from_rgba(
        device: &mut dyn RenderDevice,
        name: impl Into<String>,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> RenderResult<Self> {
        Self::from_image(device, name, &ImageData::new(width, height, 4, data.to_vec()))
    }

    /// A 1x1 texture of a single color.
    pub fn solid(device: &mut dyn RenderDevice, color: Color) -> RenderResult<Self> {
        let [r, g, b, a] = color.to_rgba8();
        let name = format!("solid #{r:02x}{g:02x}{b:02x}{a:02x}");
        Self::from_rgba(device, name, &[r, g, b, a], 1, 1)
    }

    /// Re-uploads one region of the texture.
    pub fn write_region(
        &self,
        device: &mut dyn RenderDevice,
        region: TextureRegion,
        rgba: &[u8],
    ) -> RenderResult<()> {
        region.validate(self.width, self.height, rgba.len())?;
        device.write_texture(self.id, region, rgba)
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Textures by name.
///
/// Adding a name that already exists warns and replaces the old entry.
#[derive(Debug, Default)]
pub struct TextureLibrary {
    textures: HashMap<String, Texture>,
}

impl TextureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a texture under its own name.
    pub fn add(&mut self, texture: Texture) {
        let name = texture.name().to_string();
        self.add_named(name, texture);
    }

    pub fn add_named(&mut self, name: impl Into<String>, texture: Texture) {
        let name = name.into();
        if self.textures.contains_key(&name) {
            log::warn!("texture '{name}' already exists, replacing it");
        }
        self.textures.insert(name, texture);
    }

    /// Uploads `image` and registers it under `name`.
    pub fn load(
        &mut self,
        device: &mut dyn RenderDevice,
        name: impl Into<String>,
        image: &ImageData,
    ) -> RenderResult<Texture> {
        let name = name.into();
        let texture = Texture::from_image(device, name.clone(), image)?;
        self.add_named(name, texture.clone());
        Ok(texture)
    }

    pub fn get(&self, name: &str) -> Option<&Texture> {
        let texture = self.textures.get(name);
        if texture.is_none() {
            log::debug!("texture '{name}' not found");
        }
        texture
    }

    pub fn exists(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessDevice;

    #[test]
    fn solid_texture_matches_color() {
        let mut device = HeadlessDevice::new();
        let texture = Texture::solid(&mut device, Color::rgba(1.0, 0.0, 0.5, 1.0)).unwrap();

        assert_eq!((texture.width(), texture.height()), (1, 1));
        let pixels = device.texture_pixels(texture.id()).unwrap();
        assert_eq!(pixels.get_pixel(0, 0).0, [255, 0, 128, 255]);
    }

    #[test]
    fn region_writes_are_shared_by_clones() {
        let mut device = HeadlessDevice::new();
        let atlas = Texture::from_image(&mut device, "atlas", &ImageData::filled(4, 2, [0, 0, 0, 255]))
            .unwrap();
        let holder = atlas.clone();

        atlas
            .write_region(&mut device, TextureRegion::new(2, 1, 1, 1), &[9, 9, 9, 9])
            .unwrap();

        let pixels = device.texture_pixels(holder.id()).unwrap();
        assert_eq!(pixels.get_pixel(2, 1).0, [9, 9, 9, 9]);
        assert_eq!(pixels.get_pixel(1, 1).0, [0, 0, 0, 255]);
        assert!(
            atlas
                .write_region(&mut device, TextureRegion::new(3, 1, 2, 1), &[0; 8])
                .is_err()
        );
    }

    #[test]
    fn library_lookup() {
        let mut device = HeadlessDevice::new();
        let mut library = TextureLibrary::new();
        let image = ImageData::filled(2, 2, [255; 4]);

        let first = library.load(&mut device, "player", &image).unwrap();
        assert!(library.exists("player"));
        assert_eq!(library.get("player"), Some(&first));

        let replacement = Texture::from_image(&mut device, "player", &image).unwrap();
        library.add(replacement.clone());
        assert_eq!(library.len(), 1);
        assert_eq!(library.get("player"), Some(&replacement));
        assert_eq!(library.get("enemy"), None);
    }
}
