use std::path::PathBuf;
use std::process;
use std::time::Instant;

use env_logger::Env;
use log::{debug, error, info};
use macroquad::prelude::*;
use simple3d::Engine;
use simple3d_viz::{
    build_demo_world, draw_backdrop, draw_screen_polygon, load_scene, save_scene, Backdrop, KeyboardCamera,
    ASPECT_RATIO, FOV, WINDOW_HEIGHT, WINDOW_WIDTH,
};

const DEFAULT_LOGGING_LEVEL: &str = "info";
const DEFAULT_SAVE_PATH: &str = "scene.json";

fn window_conf() -> Conf {
    Conf {
        window_title: "3D scene".to_owned(),
        window_width: WINDOW_WIDTH,
        window_height: WINDOW_HEIGHT,
        window_resizable: false,
        ..Default::default()
    }
}

/// Render time statistics, in milliseconds.
#[derive(Default)]
struct Timings {
    frames: u32,
    last: f32,
    total: f32,
    min: Option<f32>,
    max: f32,
}

impl Timings {
    fn record(&mut self, ms: f32) {
        self.frames += 1;
        self.last = ms;
        self.total += ms;
        self.min = Some(self.min.map_or(ms, |min| min.min(ms)));
        self.max = self.max.max(ms);
    }

    fn average(&self) -> f32 {
        if self.frames == 0 { 0.0 } else { self.total / self.frames as f32 }
    }
}

fn open_world(path: Option<&PathBuf>) -> (Engine, Backdrop) {
    match path {
        Some(path) => match load_scene(path) {
            Ok(loaded) => loaded,
            Err(err) => {
                error!("unable to load file: {}", err);
                process::exit(1);
            }
        },
        None => match build_demo_world() {
            Ok(engine) => (engine, Backdrop::default()),
            Err(err) => {
                error!("unable to build demo world: {}", err);
                process::exit(1);
            }
        },
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOGGING_LEVEL)).init();

    let scene_path = std::env::args().nth(1).map(PathBuf::from);
    let (mut engine, backdrop) = open_world(scene_path.as_ref());
    if let Err(err) = engine.setup_scene(FOV, ASPECT_RATIO) {
        error!("scene setup failed: {}", err);
        process::exit(1);
    }
    info!("{}", engine.info(false));

    let mut camera = KeyboardCamera::default();
    let mut timings = Timings::default();

    loop {
        if camera.update(&mut engine) {
            let pos = engine.camera();
            debug!("camera at {:.2}, {:.2}, {:.2}, yaw {:.1} deg", pos.x, pos.y, pos.z, camera.yaw.to_degrees());
        }

        let ctrl = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);
        if ctrl && is_key_pressed(KeyCode::S) {
            let path = scene_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH));
            if let Err(err) = save_scene(&path, &engine, &backdrop) {
                error!("save failed: {}", err);
            }
        }
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        set_default_camera();
        draw_backdrop(&backdrop);

        let start = Instant::now();
        match engine.render(camera.yaw, screen_width() as u32, screen_height() as u32) {
            Ok(frame) => frame.for_each(|polygon| draw_screen_polygon(&polygon)),
            Err(err) => {
                error!("render failed: {}", err);
                break;
            }
        }
        timings.record(start.elapsed().as_secs_f32() * 1000.0);

        draw_text(
            &format!(
                "render {:.2} ms (min {:.2}, max {:.2}, avg {:.2}) | FPS: {}",
                timings.last,
                timings.min.unwrap_or(0.0),
                timings.max,
                timings.average(),
                get_fps()
            ),
            10.0,
            20.0,
            18.0,
            BLACK,
        );
        draw_text("Arrows move, shift+arrows turn and climb, ctrl+S saves", 10.0, 40.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
