use phalanx::{
    AnimatedSprite, AppConfig, Camera, Color, ImageData, LoggingConfig, Sprite, Vec3, run,
};

const FRAME: u32 = 16;
const FRAMES: u32 = 6;

/// Six 16x16 frames side by side, each a different hue.
fn walk_atlas() -> ImageData {
    let palette = [
        [230, 80, 70, 255],
        [240, 160, 60, 255],
        [240, 220, 80, 255],
        [90, 200, 110, 255],
        [70, 150, 230, 255],
        [160, 100, 220, 255],
    ];
    let width = FRAME * FRAMES;
    let mut pixels = Vec::with_capacity((width * FRAME * 4) as usize);
    for y in 0..FRAME {
        for x in 0..width {
            let border = x % FRAME == 0 || y == 0 || y == FRAME - 1;
            let texel = if border {
                [20, 20, 20, 255]
            } else {
                palette[(x / FRAME) as usize]
            };
            pixels.extend_from_slice(&texel);
        }
    }
    ImageData::new(width, FRAME, 4, pixels)
}

fn checker() -> ImageData {
    let mut pixels = Vec::with_capacity(8 * 8 * 4);
    for y in 0..8u32 {
        for x in 0..8u32 {
            let shade = if (x / 4 + y / 4) % 2 == 0 { 200 } else { 120 };
            pixels.extend_from_slice(&[shade, shade, shade, 255]);
        }
    }
    ImageData::new(8, 8, 4, pixels)
}

fn main() {
    let config = AppConfig::new()
        .title("Phalanx")
        .size(1280, 720)
        .logging(LoggingConfig::new().filter("info,phalanx=debug,wgpu_core=warn,wgpu_hal=warn"));

    let result = run(config, |ctx| {
        let atlas = ctx.textures.load(&mut *ctx.device, "walk", &walk_atlas());
        let floor = ctx.textures.load(&mut *ctx.device, "checker", &checker());

        let ground = ctx.scene.create_entity("ground");
        let mut ground_sprite = Sprite::new()
            .position(Vec3::new(0.0, -0.6, 0.0))
            .scale(Vec3::new(3.2, 0.4, 1.0))
            .color(Color::rgb(0.3, 0.25, 0.2));
        if let Ok(floor) = &floor {
            ground_sprite = ground_sprite.texture(floor.id()).tiling(8.0);
        }
        ctx.scene.add_component(ground, ground_sprite).ok();

        for (i, color) in [Color::RED, Color::GREEN, Color::BLUE].into_iter().enumerate() {
            let crate_entity = ctx.scene.create_entity(format!("crate {i}"));
            let x = -1.0 + i as f32 * 0.8;
            ctx.scene
                .add_component(
                    crate_entity,
                    Sprite::new()
                        .position(Vec3::new(x, -0.25, 0.0))
                        .scale(Vec3::splat(0.3))
                        .color(color),
                )
                .ok();
        }

        let hero = ctx.scene.create_entity("hero");
        match &atlas {
            Ok(atlas) => {
                let sprite = AnimatedSprite::new(atlas.id(), FRAMES, 1, 0.12).with_sprite(
                    Sprite::new()
                        .texture(atlas.id())
                        .scale(Vec3::splat(0.4)),
                );
                ctx.scene.add_component(hero, sprite).ok();
            }
            Err(err) => log::error!("no hero atlas: {err}"),
        }
        ctx.scene
            .add_component(hero, Camera::from_bounds(-1.6, 1.6, -0.9, 0.9, 1.0, true))
            .ok();

        move |frame| {
            if let Ok(mut sprite) = frame.scene.get_component_mut::<AnimatedSprite>(hero) {
                sprite.sprite.position.x = (frame.time * 0.5).sin();
            }
        }
    });

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}
