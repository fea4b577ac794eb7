use std::fs;
use std::path::Path;

use wavefront_obj::{obj, ParseError};
use std::fmt;

use crate::math::constants::Vector3f;

#[derive(Debug)]
pub enum ObjLoadError {
    Io(std::io::Error),
    Parse(ParseError),
}

impl From<std::io::Error> for ObjLoadError {
    fn from(err: std::io::Error) -> Self {
        ObjLoadError::Io(err)
    }
}

impl From<ParseError> for ObjLoadError {
    fn from(err: ParseError) -> Self {
        ObjLoadError::Parse(err)
    }
}

impl fmt::Display for ObjLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjLoadError::Io(err) => write!(f, "obj io error: {}", err),
            ObjLoadError::Parse(err) => write!(f, "obj parse error: {}", err),
        }
    }
}

impl std::error::Error for ObjLoadError {}

/// Flattened triangle soup: three consecutive entries of `positions` (and of
/// `normals`, when present) form one triangle. Corners without a normal carry
/// the zero vector.
#[derive(Debug, Default)]
pub struct ObjTriangles {
    pub positions: Vec<Vector3f>,
    pub normals: Vec<Vector3f>,
    pub has_normals: bool,
}

impl ObjTriangles {
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

pub fn load_obj_from_str<S: AsRef<str>>(input: S) -> Result<obj::ObjSet, ParseError> {
    let triangulated = triangulate_faces(input.as_ref());
    obj::parse(triangulated)
}

pub fn load_obj_from_file<P: AsRef<Path>>(path: P) -> Result<obj::ObjSet, ObjLoadError> {
    let data = fs::read_to_string(path)?;
    let obj_set = load_obj_from_str(data)?;
    Ok(obj_set)
}

/// Collects every triangle of every object. Points and lines are ignored.
pub fn flatten_triangles(obj_set: &obj::ObjSet) -> ObjTriangles {
    let mut out = ObjTriangles::default();
    for object in &obj_set.objects {
        let position = |idx: usize| {
            object.vertices.get(idx)
                .map(|v| Vector3f::new(v.x as f32, v.y as f32, v.z as f32))
                .unwrap_or_else(Vector3f::zeros)
        };
        let normal = |idx: Option<usize>| {
            idx.and_then(|i| object.normals.get(i))
               .map(|n| Vector3f::new(n.x as f32, n.y as f32, n.z as f32))
        };
        for geom in &object.geometry {
            for shape in &geom.shapes {
                if let obj::Primitive::Triangle(a, b, c) = shape.primitive {
                    for corner in [a, b, c] {
                        out.positions.push(position(corner.0));
                        match normal(corner.2) {
                            Some(n) => {
                                out.has_normals = true;
                                out.normals.push(n);
                            }
                            None => out.normals.push(Vector3f::zeros()),
                        }
                    }
                }
            }
        }
    }
    if !out.has_normals {
        out.normals.clear();
    }
    out
}

pub fn load_obj_triangles<P: AsRef<Path>>(path: P) -> Result<ObjTriangles, ObjLoadError> {
    let obj_set = load_obj_from_file(path)?;
    Ok(flatten_triangles(&obj_set))
}

// Fan-triangulates polygons with more than three corners.
fn triangulate_faces(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let trimmed = line.trim_start();
        let is_face = trimmed.starts_with("f ") || trimmed.starts_with("f\t");
        let corners: Vec<&str> = if is_face {
            trimmed.split_whitespace().skip(1).collect()
        } else {
            Vec::new()
        };
        if corners.len() > 3 {
            for i in 1..(corners.len() - 1) {
                out.push_str(&format!("f {} {} {}\n", corners[0], corners[i], corners[i + 1]));
            }
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
