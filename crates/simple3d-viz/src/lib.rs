//! Shared utilities for the simple3d viewer: the demo world, scene files,
//! polygon filling and keyboard camera controls.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;
use nalgebra::Point3;
use serde_json::{json, Value};
use simple3d::{Color as RgbColor, Direction, Engine, Light, MeshSource, Node, Polygon, ScreenPolygon, Shape};
use thiserror::Error;

pub const WINDOW_WIDTH: i32 = 1000;
pub const WINDOW_HEIGHT: i32 = 500;
pub const ASPECT_RATIO: f64 = WINDOW_WIDTH as f64 / WINDOW_HEIGHT as f64;

/// Field of view, 60 degrees.
pub const FOV: f64 = std::f64::consts::PI / 3.0;
pub const MOVE_SPEED: f64 = 0.5;
/// Camera turn per key press.
pub const YAW_STEP: f64 = 5.0 * std::f64::consts::PI / 180.0;

pub const SKY_COLOR: RgbColor = RgbColor::new(130, 210, 230);
pub const GROUND_COLOR: RgbColor = RgbColor::new(140, 60, 20);

#[derive(Error, Debug)]
pub enum SceneFileError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Persist(#[from] simple3d::PersistError),
}

/// Background colors kept in a scene document's userdata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backdrop {
    pub sky: RgbColor,
    pub ground: RgbColor,
}

impl Default for Backdrop {
    fn default() -> Self {
        Self {
            sky: SKY_COLOR,
            ground: GROUND_COLOR,
        }
    }
}

impl Backdrop {
    /// Reads `skycolor` and `groundcolor`, keeping the defaults for missing
    /// entries.
    pub fn from_userdata(userdata: Option<&Value>) -> Result<Self, simple3d::PersistError> {
        let mut backdrop = Backdrop::default();
        let Some(userdata) = userdata else {
            return Ok(backdrop);
        };
        if let Some(sky) = userdata.get("skycolor").and_then(Value::as_str) {
            backdrop.sky = RgbColor::parse(sky)?;
        }
        if let Some(ground) = userdata.get("groundcolor").and_then(Value::as_str) {
            backdrop.ground = RgbColor::parse(ground)?;
        }
        Ok(backdrop)
    }

    pub fn to_userdata(&self) -> Value {
        json!({
            "skycolor": self.sky.to_string(),
            "groundcolor": self.ground.to_string(),
        })
    }
}

/// Loads a world document from a JSON file into a fresh engine.
pub fn load_scene(path: &Path) -> Result<(Engine, Backdrop), SceneFileError> {
    let text = fs::read_to_string(path).map_err(|source| SceneFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let world: Value = serde_json::from_str(&text).map_err(|source| SceneFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut engine = Engine::new(Light::new(RgbColor::WHITE, Point3::origin()), Point3::origin());
    let userdata = engine.import_world(&world)?;
    let backdrop = Backdrop::from_userdata(userdata.as_ref())?;
    info!("loaded {} nodes from {}", engine.nodes().len(), path.display());
    Ok((engine, backdrop))
}

/// Writes the engine content as a pretty-printed world document.
pub fn save_scene(path: &Path, engine: &Engine, backdrop: &Backdrop) -> Result<(), SceneFileError> {
    let world = engine.export_world(Some(&backdrop.to_userdata()));
    let text = serde_json::to_string_pretty(&world).map_err(|source| SceneFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| SceneFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("saved scene to {}", path.display());
    Ok(())
}

/// Builds the demo scene: pyramids, cubes, cones, a cylinder and a sphere
/// standing on a large gray floor.
pub fn build_demo_world() -> Result<Engine, simple3d::SceneError> {
    let light = Light::new(RgbColor::WHITE, Point3::new(10.0, 20.0, -10.0));
    let mut engine = Engine::new(light, Point3::new(0.0, 1.7, -10.0));

    // unit cube standing on the origin, three faces take the node color list
    let vertices = vec![
        Point3::new(-0.5, 0.0, -0.5),
        Point3::new(-0.5, 0.0, 0.5),
        Point3::new(0.5, 0.0, 0.5),
        Point3::new(0.5, 0.0, -0.5),
        Point3::new(-0.5, 1.0, -0.5),
        Point3::new(-0.5, 1.0, 0.5),
        Point3::new(0.5, 1.0, 0.5),
        Point3::new(0.5, 1.0, -0.5),
    ];
    let polygons = vec![
        Polygon::new(vec![3, 2, 1, 0]).with_color_index(0),
        Polygon::new(vec![4, 5, 6, 7]),
        Polygon::new(vec![0, 1, 5, 4]).with_color_index(0),
        Polygon::new(vec![1, 2, 6, 5]),
        Polygon::new(vec![2, 3, 7, 6]).with_color_index(0),
        Polygon::new(vec![0, 4, 7, 3]),
    ];
    engine.add_mesh(simple3d::Mesh::new("mycube", vertices, polygons)?)?;

    let mut pyr1 = Node::with_shape("pyr1", Shape::Pyramid, RgbColor::new(0x00, 0x90, 0x90));
    pyr1.apply_scale(1.0, 2.0, 1.0);
    pyr1.apply_translation(0.0, 0.0, 5.0);
    engine.add_node(pyr1);

    let mut pyr2 = Node::with_shape("pyr2", Shape::Pyramid, RgbColor::ORANGE);
    pyr2.apply_scale(1.0, 2.0, 1.0);
    pyr2.apply_translation(5.0, 0.0, 0.0);
    engine.add_node(pyr2);

    let mut cube = Node::with_shape("cube", Shape::Cube, RgbColor::RED);
    cube.apply_translation(2.0, 0.0, 0.0);
    cube.apply_scale(1.0, 3.0, 1.0);
    engine.add_node(cube);

    let mut cube2 = Node::new("cube2", MeshSource::Mesh("mycube".into()), Some(RgbColor::GREEN));
    cube2.set_color_list(vec![RgbColor::BLUE]);
    cube2.apply_translation(-2.0, 1.0, 0.0);
    cube2.apply_rotation_x(30f64.to_radians());
    cube2.apply_rotation_y(45f64.to_radians());
    cube2.apply_rotation_z(60f64.to_radians());
    engine.add_node(cube2);

    let mut cone = Node::with_shape("cone", Shape::Cone, RgbColor::BLUE);
    cone.apply_scale(1.0, 2.0, 1.0);
    cone.apply_translation(-5.0, 0.0, 0.0);
    engine.add_node(cone);

    let mut cone2 = Node::with_shape("cone2", Shape::Cone, RgbColor::CYAN);
    cone2.apply_rotation_x(180f64.to_radians());
    cone2.apply_scale(1.0, 2.0, 1.0);
    cone2.apply_translation(-5.0, 4.0, 0.0);
    engine.add_node(cone2);

    let mut cylinder = Node::with_shape("cylinder", Shape::Cylinder, RgbColor::RED);
    cylinder.apply_translation(-5.0, 0.0, 5.0);
    engine.add_node(cylinder);

    let mut sphere = Node::with_shape("sphere", Shape::Sphere, RgbColor::MAGENTA);
    sphere.apply_translation(5.0, 0.0, 5.0);
    engine.add_node(sphere);

    let mut floor = Node::with_shape("plane", Shape::Square, RgbColor::GRAY);
    floor.apply_scale(20.0, 1.0, 20.0);
    floor.apply_translation(0.0, 0.0, 5.0);
    engine.add_node(floor);

    Ok(engine)
}

pub fn to_macroquad(color: RgbColor) -> Color {
    Color::from_rgba(color.r, color.g, color.b, 255)
}

/// Fills a screen polygon with its flat color.
///
/// Expects the default (pixel space) camera to be active.
pub fn draw_screen_polygon(polygon: &ScreenPolygon) {
    let verts = &polygon.vertices;
    if verts.len() < 3 {
        return;
    }

    let color = to_macroquad(polygon.color);
    let mesh_vertices: Vec<Vertex> = verts
        .iter()
        .map(|p| Vertex::new2(vec3(p.x as f32, p.y as f32, 0.0), vec2(0.0, 0.0), color))
        .collect();

    // Fan triangulation: vertex 0 connects to all edges
    let mut indices: Vec<u16> = Vec::with_capacity((verts.len() - 2) * 3);
    for i in 1..verts.len() - 1 {
        indices.push(0);
        indices.push(i as u16);
        indices.push((i + 1) as u16);
    }

    let mesh = Mesh {
        vertices: mesh_vertices,
        indices,
        texture: None,
    };

    draw_mesh(&mesh);
}

/// Fills the upper half of the screen with the sky and the lower half with
/// the ground.
pub fn draw_backdrop(backdrop: &Backdrop) {
    clear_background(to_macroquad(backdrop.ground));
    draw_rectangle(0.0, 0.0, screen_width(), screen_height() / 2.0, to_macroquad(backdrop.sky));
}

/// First-person camera driven by the arrow keys.
///
/// Arrows walk and strafe. With shift held, up and down change height and
/// left and right turn the camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardCamera {
    pub yaw: f64,
}

impl KeyboardCamera {
    /// Applies this frame's key presses. Returns `true` if the view changed.
    pub fn update(&mut self, engine: &mut Engine) -> bool {
        let shift = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);
        let mut changed = false;

        if is_key_pressed(KeyCode::Up) {
            changed |= engine.update_camera(Direction::Up, shift, self.yaw, MOVE_SPEED);
        }
        if is_key_pressed(KeyCode::Down) {
            changed |= engine.update_camera(Direction::Down, shift, self.yaw, MOVE_SPEED);
        }
        if is_key_pressed(KeyCode::Left) {
            changed |= self.turn_or_strafe(engine, Direction::Left, shift, -YAW_STEP);
        }
        if is_key_pressed(KeyCode::Right) {
            changed |= self.turn_or_strafe(engine, Direction::Right, shift, YAW_STEP);
        }
        changed
    }

    fn turn_or_strafe(&mut self, engine: &mut Engine, direction: Direction, shift: bool, step: f64) -> bool {
        if shift {
            self.yaw += step;
            true
        } else {
            engine.update_camera(direction, false, self.yaw, MOVE_SPEED)
        }
    }
}
