//! Conversion of scene entities to and from JSON documents.
//!
//! A world document looks like:
//!
//! ```json
//! {
//!   "type": "world",
//!   "format": "simple3D.1",
//!   "light": { "color": "#FFFFFF", "position": [10, 20, -10] },
//!   "camera": { "position": [0, 1.7, -10] },
//!   "nodes": [ { "type": "node", "id": "cube", "shape": "cube", "color": "#FF0000" } ],
//!   "meshes": [ { "type": "mesh", "id": "tri", "vertices": [[0,0,0],[1,0,0],[0,1,0]],
//!                 "polygons": [ { "indexes": [0, 1, 2] } ] } ],
//!   "userdata": { }
//! }
//! ```

use log::warn;
use nalgebra::Point3;
use serde_json::{json, Map, Value};

use crate::error::PersistError;
use crate::mesh::{Mesh, Polygon, Shape};
use crate::node::{MeshSource, Node};
use crate::{Color, Engine, Light, Transform};

/// Document format written by [`Engine::export_world`].
pub const WORLD_FORMAT: &str = "simple3D.1";

/// An entity with a JSON representation.
pub trait Persist: Sized {
    fn save(&self) -> Value;
    fn load(value: &Value) -> Result<Self, PersistError>;
}

fn invalid(field: &'static str, message: impl Into<String>) -> PersistError {
    PersistError::InvalidField {
        field,
        message: message.into(),
    }
}

fn object<'a>(value: &'a Value, what: &'static str) -> Result<&'a Map<String, Value>, PersistError> {
    value.as_object().ok_or_else(|| invalid(what, "expected an object"))
}

fn field<'a>(object: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, PersistError> {
    object.get(name).ok_or(PersistError::MissingField(name))
}

fn string<'a>(value: &'a Value, name: &'static str) -> Result<&'a str, PersistError> {
    value.as_str().ok_or_else(|| invalid(name, "expected a string"))
}

fn number(value: &Value, name: &'static str) -> Result<f64, PersistError> {
    value.as_f64().ok_or_else(|| invalid(name, "expected a number"))
}

fn index(value: &Value, name: &'static str) -> Result<usize, PersistError> {
    value
        .as_u64()
        .map(|i| i as usize)
        .ok_or_else(|| invalid(name, "expected a non-negative integer"))
}

fn array<'a>(value: &'a Value, name: &'static str) -> Result<&'a Vec<Value>, PersistError> {
    value.as_array().ok_or_else(|| invalid(name, "expected an array"))
}

fn triple(value: &Value, name: &'static str) -> Result<[f64; 3], PersistError> {
    match array(value, name)?.as_slice() {
        [x, y, z] => Ok([number(x, name)?, number(y, name)?, number(z, name)?]),
        items => Err(invalid(name, format!("expected 3 numbers, found {}", items.len()))),
    }
}

/// Loads every element of an array.
fn load_all<T: Persist>(value: &Value, name: &'static str) -> Result<Vec<T>, PersistError> {
    array(value, name)?.iter().map(T::load).collect()
}

impl Persist for Color {
    fn save(&self) -> Value {
        Value::String(self.to_string())
    }

    fn load(value: &Value) -> Result<Self, PersistError> {
        Color::parse(string(value, "color")?)
    }
}

impl Persist for Point3<f64> {
    fn save(&self) -> Value {
        json!([self.x, self.y, self.z])
    }

    fn load(value: &Value) -> Result<Self, PersistError> {
        let [x, y, z] = triple(value, "vector")?;
        Ok(Point3::new(x, y, z))
    }
}

impl Persist for Transform {
    fn save(&self) -> Value {
        Value::Array(self.rows().iter().map(|row| json!(row)).collect())
    }

    fn load(value: &Value) -> Result<Self, PersistError> {
        const NAME: &str = "transformationMatrix";
        let rows = array(value, NAME)?;
        if rows.len() != 4 {
            return Err(invalid(NAME, format!("expected 4 rows, found {}", rows.len())));
        }
        let mut matrix = [[0.0; 4]; 4];
        for (target, row) in matrix.iter_mut().zip(rows) {
            let row = array(row, NAME)?;
            if row.len() != 4 {
                return Err(invalid(NAME, format!("expected 4 columns, found {}", row.len())));
            }
            for (cell, value) in target.iter_mut().zip(row) {
                *cell = number(value, NAME)?;
            }
        }
        Ok(Transform::from_rows(matrix))
    }
}

impl Persist for Light {
    fn save(&self) -> Value {
        json!({
            "color": self.color.save(),
            "position": self.position.save(),
        })
    }

    fn load(value: &Value) -> Result<Self, PersistError> {
        let light = object(value, "light")?;
        Ok(Light::new(
            Color::load(field(light, "color")?)?,
            Point3::load(field(light, "position")?)?,
        ))
    }
}

impl Persist for Polygon {
    fn save(&self) -> Value {
        let mut polygon = Map::new();
        polygon.insert("indexes".into(), json!(self.indices()));
        if let Some(color_index) = self.color_index() {
            polygon.insert("colorIndex".into(), json!(color_index));
        }
        Value::Object(polygon)
    }

    fn load(value: &Value) -> Result<Self, PersistError> {
        let polygon = object(value, "polygons")?;
        let indices = array(field(polygon, "indexes")?, "indexes")?
            .iter()
            .map(|i| index(i, "indexes"))
            .collect::<Result<Vec<_>, _>>()?;
        let loaded = Polygon::new(indices);
        match polygon.get("colorIndex") {
            Some(i) => Ok(loaded.with_color_index(index(i, "colorIndex")?)),
            None => Ok(loaded),
        }
    }
}

impl Persist for Mesh {
    fn save(&self) -> Value {
        json!({
            "type": "mesh",
            "id": self.id(),
            "vertices": self.vertices().iter().map(Persist::save).collect::<Vec<_>>(),
            "polygons": self.polygons().iter().map(Persist::save).collect::<Vec<_>>(),
        })
    }

    /// Loads and validates a mesh; invalid geometry is a [`PersistError::Mesh`].
    fn load(value: &Value) -> Result<Self, PersistError> {
        let mesh = object(value, "meshes")?;
        let id = string(field(mesh, "id")?, "id")?;
        let vertices = load_all(field(mesh, "vertices")?, "vertices")?;
        let polygons = load_all(field(mesh, "polygons")?, "polygons")?;
        Ok(Mesh::new(id, vertices, polygons)?)
    }
}

fn load_shape(node: &Map<String, Value>, name: &str) -> Result<Shape, PersistError> {
    if let Some(shape) = Shape::from_name(name) {
        return Ok(shape);
    }
    if name != "regularPolygon" {
        return Err(PersistError::UnknownShape(name.to_string()));
    }
    let arguments = object(field(node, "shapeArguments")?, "shapeArguments")?;
    let sides = index(field(arguments, "N")?, "N")?;
    Ok(Shape::RegularPolygon { sides })
}

/// Composes a world transform from the optional `translation`, `rotationX`,
/// `rotationY`, `rotationZ` and `scale` elements, in that order.
fn compose_transform(node: &Map<String, Value>) -> Result<Transform, PersistError> {
    let mut world = Transform::identity();
    if let Some(value) = node.get("translation") {
        let [x, y, z] = triple(value, "translation")?;
        world.apply_translation(x, y, z);
    }
    if let Some(value) = node.get("rotationX") {
        world.apply_rotation_x(number(value, "rotationX")?);
    }
    if let Some(value) = node.get("rotationY") {
        world.apply_rotation_y(number(value, "rotationY")?);
    }
    if let Some(value) = node.get("rotationZ") {
        world.apply_rotation_z(number(value, "rotationZ")?);
    }
    if let Some(value) = node.get("scale") {
        let [sx, sy, sz] = triple(value, "scale")?;
        world.apply_scale(sx, sy, sz);
    }
    Ok(world)
}

impl Persist for Node {
    fn save(&self) -> Value {
        let mut node = Map::new();
        node.insert("type".into(), json!("node"));
        node.insert("id".into(), json!(self.id()));
        match self.source() {
            MeshSource::Mesh(id) => {
                node.insert("meshID".into(), json!(id));
            }
            MeshSource::Shape(shape) => {
                node.insert("shape".into(), json!(shape.name()));
                if let Shape::RegularPolygon { sides } = shape {
                    node.insert("shapeArguments".into(), json!({ "N": sides }));
                }
            }
        }
        if let Some(color) = self.color() {
            node.insert("color".into(), color.save());
        }
        if let Some(colors) = self.color_list() {
            node.insert("colorList".into(), colors.iter().map(Persist::save).collect());
        }
        if !self.world().is_identity() {
            node.insert("transformationMatrix".into(), self.world().save());
        }
        Value::Object(node)
    }

    fn load(value: &Value) -> Result<Self, PersistError> {
        let node = object(value, "nodes")?;
        let id = string(field(node, "id")?, "id")?;

        let source = match (node.get("meshID"), node.get("shape")) {
            (Some(mesh_id), _) => MeshSource::Mesh(string(mesh_id, "meshID")?.to_string()),
            (None, Some(shape)) => MeshSource::Shape(load_shape(node, string(shape, "shape")?)?),
            (None, None) => return Err(PersistError::MissingField("meshID")),
        };
        let color = node.get("color").map(Color::load).transpose()?;

        let mut loaded = Node::new(id, source, color);
        if let Some(colors) = node.get("colorList") {
            loaded.set_color_list(load_all(colors, "colorList")?);
        }
        let world = match node.get("transformationMatrix") {
            Some(matrix) => Transform::load(matrix)?,
            None => compose_transform(node)?,
        };
        loaded.set_world(world);
        Ok(loaded)
    }
}

impl Engine {
    /// Replaces light, camera, nodes and meshes with the content of a world
    /// document, returning its `userdata` element.
    ///
    /// The document is validated completely before anything is replaced.
    pub fn import_world(&mut self, world: &Value) -> Result<Option<Value>, PersistError> {
        let doc = object(world, "world")?;
        let kind = string(field(doc, "type")?, "type")?;
        if kind != "world" {
            return Err(PersistError::UnsupportedType(kind.to_string()));
        }
        match doc.get("format").and_then(Value::as_str) {
            Some(WORLD_FORMAT) => {}
            other => warn!("unsupported world format {:?}, loading anyway", other),
        }

        let light = Light::load(field(doc, "light")?)?;
        let camera = object(field(doc, "camera")?, "camera")?;
        let camera = Point3::load(field(camera, "position")?)?;
        let nodes = load_all(field(doc, "nodes")?, "nodes")?;
        let meshes: Vec<Mesh> = match doc.get("meshes") {
            Some(meshes) => load_all(meshes, "meshes")?,
            None => Vec::new(),
        };

        self.set_light(light);
        self.set_camera(camera);
        self.replace_scene(nodes, meshes);
        Ok(doc.get("userdata").cloned())
    }

    /// Saves the scene as a world document, embedding `userdata` if given.
    pub fn export_world(&self, userdata: Option<&Value>) -> Value {
        let mut world = Map::new();
        world.insert("type".into(), json!("world"));
        world.insert("format".into(), json!(WORLD_FORMAT));
        world.insert("light".into(), self.light().save());
        world.insert("camera".into(), json!({ "position": self.camera().save() }));
        world.insert("nodes".into(), self.nodes().iter().map(Persist::save).collect());

        let meshes: Vec<Value> = self.meshes().map(|m| m.save()).collect();
        if !meshes.is_empty() {
            world.insert("meshes".into(), Value::Array(meshes));
        }
        if let Some(userdata) = userdata {
            world.insert("userdata".into(), userdata.clone());
        }
        Value::Object(world)
    }
}
