use clap::Parser;
use log::{error, info, warn};
use sdl2::keyboard::Keycode;
use std::time::Instant;
use umbra::animation::LightRig;
use umbra::config::Cli;
use umbra::display::{
    to_kernel_space, to_window_space, Display, InputEvent, PixelBuffer, RenderTarget,
};
use umbra::geometry::Point;
use umbra::lighting::{LightSource, Obstacle, ObstacleBuffer, SourceBuffer, DEBUG_OVERLAY};
use umbra::remote::RemoteControl;
use umbra::render::LightField;
use umbra::scene::Scene;
use umbra::util::{FpsCounter, Rng};

/// Seconds between FPS log lines when FPS logging is on
const FPS_LOG_INTERVAL: f32 = 1.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(&Cli::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> umbra::Result<()> {
    let (mut width, mut height) = (cli.width, cli.height);

    let mut scene = match Scene::load(&cli.scene) {
        Ok(scene) => scene,
        Err(e) => {
            info!("No scene at {} ({}), using default layout", cli.scene.display(), e);
            Scene::default_for(width, height)
        },
    };
    let config = cli.kernel_config(scene.kernel)?;
    scene.check_capacity(&config)?;

    let (mut display, texture_creator) =
        Display::with_options("umbra", width, height, !cli.no_vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;
    let mut buffer = PixelBuffer::with_size(width, height);
    let mut field = LightField::new(width, height, config, cli.threads)?;

    let mut rig = LightRig::new(window_center(width, height), config.max_sources);
    rig.restore(scene.sources.clone());

    let remote = match &cli.mqtt_host {
        Some(host) => Some(RemoteControl::connect(host, &cli.mqtt_topic)?),
        None => None,
    };

    let mut rng = Rng::from_time();
    let mut fps_counter = FpsCounter::new(60);
    let mut log_fps = false;
    let mut fps_timer = 0.0;
    let mut flags = 0u32;
    let start = Instant::now();

    info!(
        "{}x{}, vsync {}. Mouse moves the light, click places one, wheel sets intensity.",
        width,
        height,
        if cli.no_vsync { "off" } else { "on" }
    );
    info!("Keys: C color, R orbit, D overlay, F fps, Backspace clear, S save, L load, Esc quit");

    'main: loop {
        let (dt, avg_fps) = fps_counter.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => match key {
                    Keycode::Escape => break 'main,
                    Keycode::C => {
                        let c = rig.randomize_color(&mut rng);
                        info!("Light color ({:.2}, {:.2}, {:.2})", c.r, c.g, c.b);
                    },
                    Keycode::R => rig.resume_orbit(),
                    Keycode::D => flags ^= DEBUG_OVERLAY,
                    Keycode::F => {
                        log_fps = !log_fps;
                        fps_timer = 0.0;
                    },
                    Keycode::Backspace | Keycode::Delete => {
                        let n = rig.clear_placed();
                        info!("Removed {} placed lights", n);
                    },
                    Keycode::S => {
                        scene.sources = rig.placed().to_vec();
                        scene.kernel = config;
                        if let Err(e) = scene.save(&cli.scene) {
                            warn!("Failed to save: {}", e);
                        }
                    },
                    Keycode::L => match reload(&cli.scene, &field) {
                        Ok(loaded) => {
                            rig.restore(loaded.sources.clone());
                            scene = loaded;
                        },
                        Err(e) => warn!("Failed to load: {}", e),
                    },
                    _ => {},
                },
                InputEvent::MouseMove { x, y } => {
                    rig.pointer_moved(to_kernel_space(x, y, height));
                },
                InputEvent::Click { x, y } => {
                    rig.place_source_at(to_kernel_space(x, y, height));
                },
                InputEvent::Wheel(notches) => rig.adjust_intensity(notches),
                InputEvent::PointerLeft => rig.resume_orbit(),
                InputEvent::Resized { width: w, height: h } => {
                    if (w, h) != (width, height) {
                        field.resize(w, h)?;
                        target = RenderTarget::with_size(&texture_creator, w, h)?;
                        buffer = PixelBuffer::with_size(w, h);
                        rig.set_center(window_center(w, h));
                        (width, height) = (w, h);
                        info!("Resized to {}x{}", w, h);
                    }
                },
            }
        }

        if let Some(remote) = &remote {
            for command in remote.poll() {
                if !command.apply(&mut rig) {
                    warn!("Remote command had no effect: {:?}", command);
                }
            }
        }

        rig.update(dt);

        // Snapshot everything the kernel reads for this frame
        let time = start.elapsed().as_secs_f32();
        let lights = rig.snapshot();
        let segments = scene.obstacles(time);
        let sources = SourceBuffer::encode(&lights, config.max_sources)?;
        let obstacles = ObstacleBuffer::encode(&segments, config.max_obstacles)?;

        if field.render(&sources, &obstacles, flags)? {
            field.tone_map(&mut buffer);
            if flags & DEBUG_OVERLAY != 0 {
                draw_overlay(&mut buffer, &segments, &lights, height);
            }
        }

        display.present(&mut target, &buffer)?;

        if log_fps {
            fps_timer += dt;
            if fps_timer >= FPS_LOG_INTERVAL {
                fps_timer = 0.0;
                let (min_fps, max_fps) = fps_counter.min_max_fps();
                info!(
                    "FPS: {:.0} (min {:.0}, max {:.0}), {:.1} ms/frame, {} skipped",
                    avg_fps,
                    min_fps,
                    max_fps,
                    fps_counter.avg_frame_time_ms(),
                    field.guard().skipped()
                );
            }
        }
    }

    Ok(())
}

fn window_center(width: u32, height: u32) -> Point {
    Point::new(width as f32 / 2.0, height as f32 / 2.0)
}

/// Load a scene and make sure it fits the running kernel's buffers
fn reload(path: &std::path::Path, field: &LightField) -> umbra::Result<Scene> {
    let scene = Scene::load(path)?;
    if scene.kernel != *field.config() {
        warn!("Scene kernel settings differ from the running ones, keeping the running ones");
    }
    scene.check_capacity(field.config())?;
    Ok(scene)
}

/// Obstacle segments in red, light positions as yellow rings
fn draw_overlay(buffer: &mut PixelBuffer, segments: &[Obstacle], lights: &[LightSource], height: u32) {
    for segment in segments {
        let (x0, y0) = to_window_space(segment.start, height);
        let (x1, y1) = to_window_space(segment.end, height);
        buffer.line(x0, y0, x1, y1, 255, 40, 40);
    }
    for light in lights.iter().filter(|l| l.is_lit()) {
        let (x, y) = to_window_space(light.position, height);
        buffer.draw_circle(x, y, 4, 255, 220, 0);
    }
}
