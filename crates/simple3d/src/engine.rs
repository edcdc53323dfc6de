//! The scene container and per-frame render pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, log_enabled, warn, Level};
use nalgebra::{Point3, Vector3, Vector4};

use crate::bsp::{BspTree, FaceId};
use crate::clip::{clip_against_near_plane, to_screen};
use crate::error::SceneError;
use crate::info::SceneInfo;
use crate::mesh::Mesh;
use crate::node::{MeshSource, Node};
use crate::transform::normalize_or_zero;
use crate::{Color, Light, Polyface, Transform};

/// Camera movement commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A polygon ready for rasterization.
///
/// `x` and `y` are pixel coordinates (y down), `z` is the NDC depth.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenPolygon {
    pub vertices: Vec<Point3<f64>>,
    pub color: Color,
}

/// State produced by [`Engine::setup_scene`].
#[derive(Debug, Clone)]
struct Stage {
    projection: Transform,
    tree: BspTree,
}

/// A software renderer for a static scene lit by one point light.
///
/// Usage is in two phases: populate meshes and nodes, call
/// [`Engine::setup_scene`] to flatten them into a BSP tree, then call
/// [`Engine::render`] once per frame. Changing nodes or meshes has no effect
/// on rendering until the scene is set up again.
#[derive(Debug, Clone)]
pub struct Engine {
    nodes: Vec<Node>,
    meshes: BTreeMap<String, Arc<Mesh>>,
    light: Light,
    camera: Point3<f64>,
    stage: Option<Stage>,
}

impl Engine {
    pub fn new(light: Light, camera: Point3<f64>) -> Self {
        Self {
            nodes: Vec::new(),
            meshes: BTreeMap::new(),
            light,
            camera,
            stage: None,
        }
    }

    #[inline]
    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn set_light(&mut self, light: Light) {
        self.light = light;
    }

    #[inline]
    pub fn camera(&self) -> Point3<f64> {
        self.camera
    }

    pub fn set_camera(&mut self, camera: Point3<f64>) {
        self.camera = camera;
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Registers a mesh under its id. Ids are unique.
    pub fn add_mesh(&mut self, mesh: Mesh) -> Result<(), SceneError> {
        if self.meshes.contains_key(mesh.id()) {
            return Err(SceneError::DuplicateMesh(mesh.id().to_string()));
        }
        self.meshes.insert(mesh.id().to_string(), Arc::new(mesh));
        Ok(())
    }

    pub fn mesh(&self, id: &str) -> Option<&Arc<Mesh>> {
        self.meshes.get(id)
    }

    /// Registered meshes, ordered by id.
    pub fn meshes(&self) -> impl Iterator<Item = &Arc<Mesh>> {
        self.meshes.values()
    }

    /// Replaces all nodes and meshes.
    pub(crate) fn replace_scene(&mut self, nodes: Vec<Node>, meshes: Vec<Mesh>) {
        self.nodes = nodes;
        self.meshes = meshes
            .into_iter()
            .map(|m| (m.id().to_string(), Arc::new(m)))
            .collect();
        self.stage = None;
    }

    /// Resolves the mesh a node instances.
    pub fn resolve_mesh(&self, node: &Node) -> Result<Arc<Mesh>, SceneError> {
        match node.source() {
            MeshSource::Mesh(id) => self.meshes.get(id).cloned().ok_or_else(|| SceneError::UnknownMesh {
                node: node.id().to_string(),
                mesh: id.clone(),
            }),
            MeshSource::Shape(shape) => Ok(shape.mesh()?),
        }
    }

    /// The BSP tree of the last scene setup.
    pub fn tree(&self) -> Option<&BspTree> {
        self.stage.as_ref().map(|s| &s.tree)
    }

    /// Prepares the scene for rendering.
    ///
    /// Computes the projection matrix, places every face of every node in
    /// world space and builds the BSP tree over them. `fov` is the vertical
    /// field of view in radians.
    pub fn setup_scene(&mut self, fov: f64, aspect_ratio: f64) -> Result<(), SceneError> {
        if log_enabled!(Level::Debug) {
            debug!("{}", self.info(true));
        }

        let mut faces = Vec::new();
        for node in &self.nodes {
            let mesh = self.resolve_mesh(node)?;
            for face in node.polyfaces(&mesh) {
                if !face.is_convex() {
                    warn!("found non convex polygon in mesh {}", mesh.id());
                }
                faces.push(face);
            }
        }

        let start = Instant::now();
        let face_count = faces.len();
        let tree = BspTree::from_polygons(faces);
        info!(
            "built BSP tree from {} polygons in {:?}: size {}, depth {}",
            face_count,
            start.elapsed(),
            tree.polygon_count(),
            tree.depth()
        );

        self.stage = Some(Stage {
            projection: Transform::projection(fov, aspect_ratio),
            tree,
        });
        Ok(())
    }

    /// Renders the scene as seen from the camera turned by `yaw` radians.
    ///
    /// The returned frame yields screen polygons lazily, farthest first, so
    /// filling them in order paints a correct image.
    pub fn render(&self, yaw: f64, width: u32, height: u32) -> Result<Frame<'_>, SceneError> {
        let stage = self.stage.as_ref().ok_or(SceneError::NotSetUp)?;
        let view_projection = self.view_projection(&stage.projection, yaw);

        Ok(Frame {
            tree: &stage.tree,
            order: stage.tree.draw_order(self.camera).into_iter(),
            projector: Projector {
                view_projection,
                camera: self.camera,
                light: self.light,
                width: width as f64,
                height: height as f64,
            },
        })
    }

    /// Renders into a sink, returning the number of polygons drawn.
    pub fn render_with<F>(&self, yaw: f64, width: u32, height: u32, mut sink: F) -> Result<usize, SceneError>
    where
        F: FnMut(&[Point3<f64>], Color),
    {
        let frame = self.render(yaw, width, height)?;
        let total = frame.order.len();
        let mut drawn = 0;
        for polygon in frame {
            sink(&polygon.vertices, polygon.color);
            drawn += 1;
        }
        debug!("frame: {} of {} polygons drawn", drawn, total);
        Ok(drawn)
    }

    fn view_projection(&self, projection: &Transform, yaw: f64) -> Transform {
        let look = normalize_or_zero(Transform::rotation_y(yaw).transform_vector(&Vector3::z()));
        let target = self.camera + look;
        let view = Transform::point_at(&self.camera, &target, &Vector3::y()).quick_inverse();
        view.then(projection)
    }

    /// Moves the camera one step. Returns `true` if the camera moved.
    ///
    /// Up and Down walk along the view direction, or change height with
    /// `shift`. Left and Right strafe and are ignored with `shift`.
    pub fn update_camera(&mut self, direction: Direction, shift: bool, yaw: f64, speed: f64) -> bool {
        let rotation = Transform::rotation_y(yaw);
        let forward = normalize_or_zero(rotation.transform_vector(&Vector3::z()));
        let right = normalize_or_zero(rotation.transform_vector(&Vector3::x()));

        match (direction, shift) {
            (Direction::Up, true) => self.camera.y += speed,
            (Direction::Up, false) => self.camera += forward * speed,
            (Direction::Down, true) => self.camera.y -= speed,
            (Direction::Down, false) => self.camera -= forward * speed,
            (Direction::Left, false) => self.camera -= right * speed,
            (Direction::Right, false) => self.camera += right * speed,
            (Direction::Left | Direction::Right, true) => return false,
        }
        true
    }

    /// Counts and checks the scene content.
    pub fn info(&self, full_checks: bool) -> SceneInfo {
        SceneInfo::collect(self, full_checks)
    }
}

/// One rendered frame, produced by [`Engine::render`].
///
/// Back faces are culled, the remaining faces are flat shaded, clipped
/// against the near plane and mapped to the viewport.
pub struct Frame<'a> {
    tree: &'a BspTree,
    order: std::vec::IntoIter<FaceId>,
    projector: Projector,
}

/// Per-frame constants of the face pipeline.
struct Projector {
    view_projection: Transform,
    camera: Point3<f64>,
    light: Light,
    width: f64,
    height: f64,
}

impl Projector {
    fn project(&self, face: &Polyface) -> Option<ScreenPolygon> {
        if face.is_back_facing(&self.camera) {
            return None;
        }
        let color = self.light.shade(face);

        let clip_space: Vec<Vector4<f64>> = face
            .vertices()
            .iter()
            .map(|v| self.view_projection.transform_homogeneous(v))
            .collect();
        let clipped = clip_against_near_plane(&clip_space)?;
        let vertices = clipped
            .iter()
            .map(|v| to_screen(v, self.width, self.height))
            .collect::<Option<Vec<_>>>()?;

        Some(ScreenPolygon { vertices, color })
    }
}

impl Iterator for Frame<'_> {
    type Item = ScreenPolygon;

    fn next(&mut self) -> Option<ScreenPolygon> {
        let (tree, projector) = (self.tree, &self.projector);
        self.order.by_ref().find_map(|id| projector.project(tree.face(id)))
    }
}
