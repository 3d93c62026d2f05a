//! Windowed host: one winit window, one GPU device, one scene.
//!
//! [`run`] opens the window, builds the device and renderer, hands a
//! [`SetupContext`] to the setup closure and then drives the editor session
//! every redraw, presenting the framebuffer to the window.
//!
//! Window resizes resize the viewport (editor camera and framebuffer), the
//! mouse wheel zooms the editor camera, `Tab` toggles edit/play and `Home`
//! resets the editor camera.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::color::Color;
use crate::editor::{Editor, GameMode};
use crate::error::{AppError, RenderError};
use crate::gpu::GpuContext;
use crate::logging::{LoggingConfig, init_logging};
use crate::render::{
    ImageData, RenderResult, Renderer, RendererConfig, Shader, ShaderLibrary, SpriteVertex, Texture,
    TextureLibrary, WgpuDevice,
};
use crate::scene::Scene;

/// Zoom change per wheel line, relative to the current zoom.
const SCROLL_STEP: f32 = 0.1;

/// Configuration for the app window.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: Color,
    pub mode: GameMode,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Phalanx".to_string(),
            width: 1600,
            height: 900,
            clear_color: Color::rgb(0.1, 0.1, 0.12),
            mode: GameMode::Play,
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Mode the editor session starts in.
    pub fn mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}

/// Everything the setup closure may populate.
pub struct SetupContext<'a> {
    pub device: &'a mut WgpuDevice,
    pub renderer: &'a mut Renderer,
    pub scene: &'a mut Scene,
    pub shaders: &'a mut ShaderLibrary,
    pub textures: &'a mut TextureLibrary,
    pub editor: &'a mut Editor,
}

impl SetupContext<'_> {
    /// Decodes an image file and registers it in the texture library.
    pub fn load_texture(&mut self, name: &str, path: &str) -> RenderResult<Texture> {
        let image = image::open(path).map_err(|err| RenderError::InvalidImage {
            label: path.to_string(),
            reason: err.to_string(),
        })?;
        let image = ImageData::from(image.to_rgba8());
        self.textures.load(&mut *self.device, name, &image)
    }

    /// Compiles a sprite-layout WGSL file and registers it under its file stem.
    pub fn load_shader(&mut self, path: &str) -> RenderResult<Shader> {
        self.shaders.load_file(&mut *self.device, path, SpriteVertex::layout())
    }

    /// Decodes embedded image bytes and registers them in the texture library.
    pub fn texture_from_bytes(&mut self, name: &str, bytes: &[u8]) -> RenderResult<Texture> {
        let image = image::load_from_memory(bytes).map_err(|err| RenderError::InvalidImage {
            label: name.to_string(),
            reason: err.to_string(),
        })?;
        let image = ImageData::from(image.to_rgba8());
        self.textures.load(&mut *self.device, name, &image)
    }
}

/// Per-frame state handed to the frame closure before the scene renders.
pub struct Frame<'a> {
    pub scene: &'a mut Scene,
    pub editor: &'a mut Editor,
    pub textures: &'a TextureLibrary,
    pub shaders: &'a ShaderLibrary,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Seconds since the app started.
    pub time: f32,
}

/// Runs a windowed app.
///
/// # Example
/// ```ignore
/// phalanx::run(AppConfig::new().title("Sprites"), |ctx| {
///     let hero = ctx.scene.create_entity("hero");
///     ctx.scene.add_component(hero, Sprite::new().color(Color::RED)).ok();
///
///     move |frame| {
///         if let Ok(mut sprite) = frame.scene.get_component_mut::<Sprite>(hero) {
///             sprite.rotation.z += 90.0 * frame.dt;
///         }
///     }
/// })?;
/// ```
pub fn run<S, F>(config: AppConfig, setup: S) -> Result<(), AppError>
where
    S: FnOnce(&mut SetupContext) -> F + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    init_logging(config.logging.clone());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = PhalanxApp::Pending {
        config,
        setup: Some(Box::new(move |ctx: &mut SetupContext| {
            Box::new(setup(ctx)) as Box<dyn FnMut(&mut Frame)>
        })),
    };
    event_loop.run_app(&mut app)?;

    match app {
        PhalanxApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

type SetupFn = Box<dyn FnOnce(&mut SetupContext) -> Box<dyn FnMut(&mut Frame)>>;

struct Running {
    window: Arc<Window>,
    device: WgpuDevice,
    renderer: Renderer,
    scene: Scene,
    shaders: ShaderLibrary,
    textures: TextureLibrary,
    editor: Editor,
    frame_fn: Box<dyn FnMut(&mut Frame)>,
    start_time: Instant,
    last_frame: Instant,
}

enum PhalanxApp {
    Pending {
        config: AppConfig,
        setup: Option<SetupFn>,
    },
    Running(Box<Running>),
    Failed(AppError),
}

impl PhalanxApp {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &AppConfig,
        setup: SetupFn,
    ) -> Result<Running, AppError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone())?;
        let (width, height) = (gpu.width(), gpu.height());
        let mut device = WgpuDevice::new(gpu);
        let mut renderer = Renderer::new(
            &mut device,
            RendererConfig::new()
                .size(width, height)
                .clear_color(config.clear_color),
        )?;

        let mut scene = Scene::new();
        let mut shaders = ShaderLibrary::new();
        shaders.add(renderer.shader().clone());
        let mut textures = TextureLibrary::new();
        let mut editor = Editor::new(width, height);
        editor.set_mode(config.mode);

        let frame_fn = setup(&mut SetupContext {
            device: &mut device,
            renderer: &mut renderer,
            scene: &mut scene,
            shaders: &mut shaders,
            textures: &mut textures,
            editor: &mut editor,
        });
        log::info!(
            "scene ready: {} entities, {} textures, {} shaders",
            scene.len(),
            textures.len(),
            shaders.len()
        );

        let now = Instant::now();
        Ok(Running {
            window,
            device,
            renderer,
            scene,
            shaders,
            textures,
            editor,
            frame_fn,
            start_time: now,
            last_frame: now,
        })
    }
}

impl ApplicationHandler for PhalanxApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let PhalanxApp::Pending { config, setup } = self else {
            return;
        };
        let Some(setup) = setup.take() else {
            return;
        };

        *self = match Self::start(event_loop, config, setup) {
            Ok(running) => {
                running.window.request_redraw();
                PhalanxApp::Running(Box::new(running))
            }
            Err(err) => {
                log::error!("failed to start: {err}");
                event_loop.exit();
                PhalanxApp::Failed(err)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let PhalanxApp::Running(app) = self else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                app.renderer.release(&mut app.device);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.device.resize_surface(size.width, size.height);
                if let Err(err) =
                    app.editor
                        .set_viewport_size(&mut app.renderer, &mut app.device, size.width, size.height)
                {
                    log::error!("viewport resize failed: {err}");
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                };
                let step = -lines * SCROLL_STEP * app.editor.camera().zoom();
                app.editor.on_mouse_scroll(step);
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Tab) => {
                        app.editor.toggle_mode();
                    }
                    PhysicalKey::Code(KeyCode::Home) => app.editor.reset_camera(),
                    _ => {}
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(app.last_frame).as_secs_f32();
                app.last_frame = now;

                let app = &mut **app;
                (app.frame_fn)(&mut Frame {
                    scene: &mut app.scene,
                    editor: &mut app.editor,
                    textures: &app.textures,
                    shaders: &app.shaders,
                    dt,
                    time: app.start_time.elapsed().as_secs_f32(),
                });

                match app
                    .editor
                    .update(dt, &mut app.scene, &mut app.renderer, &mut app.device)
                {
                    Ok(stats) if stats.skipped > 0 => {
                        log::trace!("{} draws skipped this frame", stats.skipped);
                    }
                    Ok(_) => {}
                    Err(err) => log::error!("frame failed: {err}"),
                }

                match app.renderer.present(&mut app.device) {
                    Ok(()) => {}
                    Err(err @ RenderError::Surface(_)) => {
                        log::error!("presentation failed, exiting: {err}");
                        event_loop.exit();
                        return;
                    }
                    Err(err) => log::warn!("nothing presented: {err}"),
                }

                app.window.request_redraw();
            }
            _ => {}
        }
    }
}
