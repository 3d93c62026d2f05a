//! Shader programs and the name-keyed shader library.
//!
//! Shaders are WGSL modules with `vs` and `fs` entry points. Every shader
//! drawn through a [`Pipeline`](super::Pipeline) shares one binding convention:
//!
//! | Group | Binding | Contents                                     |
//! |-------|---------|----------------------------------------------|
//! | 0     | 0       | [`DrawUniforms`](super::DrawUniforms)        |
//! | 1     | 0       | texture bound to unit 0                      |
//! | 1     | 1       | its sampler                                  |

use std::collections::HashMap;
use std::path::Path;

use super::buffer::{SpriteVertex, VertexLayout};
use super::device::{RenderDevice, RenderResult, ShaderId};
use crate::error::RenderError;

/// WGSL of the built-in sprite shader.
pub const SPRITE_WGSL: &str = include_str!("../shaders/sprite.wgsl");

/// Name the built-in sprite shader is registered under.
pub const SPRITE_SHADER: &str = "sprite";

/// Shader text plus the vertex layout it reads.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderSource {
    pub name: String,
    pub wgsl: String,
    pub layout: VertexLayout,
}

impl ShaderSource {
    pub fn new(name: impl Into<String>, wgsl: impl Into<String>, layout: VertexLayout) -> Self {
        Self {
            name: name.into(),
            wgsl: wgsl.into(),
            layout,
        }
    }

    /// The built-in textured sprite shader.
    pub fn sprite() -> Self {
        Self::new(SPRITE_SHADER, SPRITE_WGSL, SpriteVertex::layout())
    }

    /// Reads a WGSL file, naming the source with [`shader_name_from_path`].
    pub fn from_file(path: impl AsRef<Path>, layout: VertexLayout) -> RenderResult<Self> {
        let path = path.as_ref();
        let wgsl = std::fs::read_to_string(path).map_err(|err| RenderError::ShaderRead {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self::new(shader_name_from_path(path), wgsl, layout))
    }
}

/// Derives a shader name from its file path.
///
/// The file stem is used with a trailing `_vert` or `_frag` removed, so
/// `shaders/sprite_vert.wgsl` and `shaders/sprite.wgsl` both become `sprite`.
pub fn shader_name_from_path(path: impl AsRef<Path>) -> String {
    let stem = path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    ["_vert", "_frag"]
        .iter()
        .find_map(|suffix| stem.strip_suffix(suffix))
        .map(str::to_string)
        .unwrap_or(stem)
}

/// A compiled shader program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shader {
    id: ShaderId,
    name: String,
}

impl Shader {
    /// Compiles `source`. Compile errors are logged and returned.
    pub fn new(device: &mut dyn RenderDevice, source: &ShaderSource) -> RenderResult<Self> {
        match device.create_shader(source) {
            Ok(id) => {
                log::debug!("compiled shader '{}'", source.name);
                Ok(Self {
                    id,
                    name: source.name.clone(),
                })
            }
            Err(err) => {
                log::error!("{err}");
                Err(err)
            }
        }
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Shaders by name.
///
/// Adding a name that already exists warns and replaces the old entry.
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    shaders: HashMap<String, Shader>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shader under its own name.
    pub fn add(&mut self, shader: Shader) {
        let name = shader.name().to_string();
        self.add_named(name, shader);
    }

    pub fn add_named(&mut self, name: impl Into<String>, shader: Shader) {
        let name = name.into();
        if self.shaders.contains_key(&name) {
            log::warn!("shader '{name}' already exists, replacing it");
        }
        self.shaders.insert(name, shader);
    }

    /// Compiles `source` and registers it under `name`.
    pub fn load(
        &mut self,
        device: &mut dyn RenderDevice,
        name: impl Into<String>,
        source: &ShaderSource,
    ) -> RenderResult<Shader> {
        let shader = Shader::new(device, source)?;
        self.add_named(name, shader.clone());
        Ok(shader)
    }

    /// Reads, compiles and registers a WGSL file under the name derived from its path.
    pub fn load_file(
        &mut self,
        device: &mut dyn RenderDevice,
        path: impl AsRef<Path>,
        layout: VertexLayout,
    ) -> RenderResult<Shader> {
        let source = ShaderSource::from_file(path, layout)?;
        self.load(device, source.name.clone(), &source)
    }

    pub fn get(&self, name: &str) -> Option<&Shader> {
        let shader = self.shaders.get(name);
        if shader.is_none() {
            log::debug!("shader '{name}' not found");
        }
        shader
    }

    pub fn exists(&self, name: &str) -> bool {
        self.shaders.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shaders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessDevice;

    #[test]
    fn names_from_paths() {
        assert_eq!(shader_name_from_path("assets/shaders/sprite_vert.glsl"), "sprite");
        assert_eq!(shader_name_from_path("blit_frag.wgsl"), "blit");
        assert_eq!(shader_name_from_path("quad.wgsl"), "quad");
        assert_eq!(shader_name_from_path("vert"), "vert");
    }

    #[test]
    fn library_overwrites_on_collision() {
        let mut device = HeadlessDevice::new();
        let mut library = ShaderLibrary::new();

        let first = library.load(&mut device, "sprite", &ShaderSource::sprite()).unwrap();
        let second = library.load(&mut device, "sprite", &ShaderSource::sprite()).unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(library.len(), 1);
        assert_eq!(library.get("sprite").map(Shader::id), Some(second.id()));
        assert!(library.get("missing").is_none());
        assert!(!library.exists("missing"));
    }

    #[test]
    fn files_register_under_their_stem() {
        let dir = std::env::temp_dir().join(format!("phalanx-shaders-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("glow_frag.wgsl");
        std::fs::write(&path, SPRITE_WGSL).unwrap();

        let mut device = HeadlessDevice::new();
        let mut library = ShaderLibrary::new();
        let shader = library.load_file(&mut device, &path, SpriteVertex::layout()).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(shader.name(), "glow");
        assert_eq!(library.get("glow").map(Shader::id), Some(shader.id()));
        assert_eq!(device.shader_name(shader.id()), Some("glow"));

        let missing = library.load_file(&mut device, dir.join("nope.wgsl"), SpriteVertex::layout());
        assert!(matches!(missing, Err(RenderError::ShaderRead { .. })));
    }

    #[test]
    fn compile_failure_is_reported() {
        let mut device = HeadlessDevice::new();
        let mut library = ShaderLibrary::new();
        let bad = ShaderSource::new("broken", "", SpriteVertex::layout());

        assert!(library.load(&mut device, "broken", &bad).is_err());
        assert!(!library.exists("broken"));
    }
}
