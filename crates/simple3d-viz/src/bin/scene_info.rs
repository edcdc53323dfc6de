//! Prints statistics and mesh diagnostics for a scene file, or for the demo
//! world when no file is given.
//!
//! Usage: `scene_info [--quick] [scene.json]`

use std::path::PathBuf;
use std::process;

use env_logger::Env;
use log::error;
use simple3d_viz::{build_demo_world, load_scene};

const DEFAULT_LOGGING_LEVEL: &str = "warn";

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOGGING_LEVEL)).init();

    let mut full_checks = true;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--quick" => full_checks = false,
            _ => path = Some(PathBuf::from(arg)),
        }
    }

    let engine = match path {
        Some(path) => load_scene(&path).map(|(engine, _)| engine).map_err(|err| err.to_string()),
        None => build_demo_world().map_err(|err| err.to_string()),
    };
    match engine {
        Ok(engine) => println!("{}", engine.info(full_checks)),
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    }
}
