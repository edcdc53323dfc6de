//! Scene statistics and advisory mesh diagnostics.

use std::collections::HashSet;
use std::fmt;

use crate::error::SceneError;
use crate::Engine;

/// Counts and diagnostic messages for the content of an [`Engine`].
///
/// Counts are per node: a mesh instanced twice contributes twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneInfo {
    pub nodes: usize,
    pub user_meshes: usize,
    pub polygons: usize,
    pub vertices: usize,
    pub unconnected_parts: usize,
    /// Unique messages, in the order first found.
    pub messages: Vec<String>,
}

impl SceneInfo {
    /// Gathers statistics; `full_checks` adds winding, manifold and
    /// connectivity messages per mesh.
    pub fn collect(engine: &Engine, full_checks: bool) -> Self {
        let mut info = SceneInfo {
            nodes: engine.nodes().len(),
            user_meshes: engine.meshes().count(),
            ..SceneInfo::default()
        };
        let mut seen = HashSet::new();
        let mut report = |message: String| {
            if seen.insert(message.clone()) {
                info.messages.push(message);
            }
        };

        for node in engine.nodes() {
            let mesh = match engine.resolve_mesh(node) {
                Ok(mesh) => mesh,
                Err(SceneError::UnknownMesh { mesh, .. }) => {
                    report(format!("Error: unknown mesh id {}", mesh));
                    continue;
                }
                Err(err) => {
                    report(format!("Error: {}", err));
                    continue;
                }
            };

            info.polygons += mesh.polygons().len();
            info.vertices += mesh.vertices().len();
            let unconnected = mesh.unconnected_parts();
            info.unconnected_parts += unconnected;

            if full_checks {
                if unconnected > 0 {
                    report(format!("Warning: unconnected part found in mesh {}", mesh.id()));
                }
                if !mesh.check_winding() {
                    report(format!("Error found in mesh {}", mesh.id()));
                }
                if !mesh.check_manifold() {
                    report(format!("Warning: mesh {} is not manifold", mesh.id()));
                }
            }
        }
        info
    }
}

impl fmt::Display for SceneInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.messages {
            writeln!(f, "{}", message)?;
        }
        writeln!(f, "Number of nodes: {}", self.nodes)?;
        writeln!(f, "Number of user defined meshes: {}", self.user_meshes)?;
        writeln!(f, "Number of polygons: {}", self.polygons)?;
        write!(f, "Number of vertices: {}", self.vertices)?;
        if self.unconnected_parts > 0 {
            write!(f, "\nNumber of unconnected parts: {}", self.unconnected_parts)?;
        }
        Ok(())
    }
}
