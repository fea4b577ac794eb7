// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::bsdf::BSDF;
use crate::core::config::{candidate_count, ConfigError, RenderSettings};
use crate::core::material::Material;
use crate::core::scene::{Scene, SceneBuilder, SceneError};
use crate::core::sensor::Sensor;
use crate::io::obj_utils::ObjLoadError;
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::materials::null::NullBSDF;
use crate::materials::roughconductor::RoughConductorBSDF;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;
use crate::sensors::orthographic::OrthographicCamera;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::rectangle::rectangle_mesh;
use crate::shapes::triangle::Triangle;
use crate::shapes::triangle_mesh::TriangleMesh;

#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
    Config(ConfigError),
    Scene(SceneError),
    Obj(ObjLoadError),
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "scene io error: {}", e),
            SceneLoadError::Parse(msg) => write!(f, "scene parse error: {}", msg),
            SceneLoadError::MissingField(field) => write!(f, "scene is missing {}", field),
            SceneLoadError::Config(e) => write!(f, "invalid render settings: {}", e),
            SceneLoadError::Scene(e) => write!(f, "invalid scene: {}", e),
            SceneLoadError::Obj(e) => write!(f, "mesh load failed: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl From<ConfigError> for SceneLoadError {
    fn from(err: ConfigError) -> Self {
        SceneLoadError::Config(err)
    }
}

impl From<SceneError> for SceneLoadError {
    fn from(err: SceneError) -> Self {
        SceneLoadError::Scene(err)
    }
}

impl From<ObjLoadError> for SceneLoadError {
    fn from(err: ObjLoadError) -> Self {
        SceneLoadError::Obj(err)
    }
}

/// Everything a scene file describes.
pub struct SceneDescription {
    pub scene: Arc<Scene>,
    pub sensor: Arc<dyn Sensor>,
    pub settings: RenderSettings,
}

pub fn load_scene_from_file<P: AsRef<Path>>(path: P) -> Result<SceneDescription, SceneLoadError> {
    let path = path.as_ref();
    log::info!("Loading scene from {}", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    load_scene_from_str(&xml, base_dir)
}

/// Parses a scene document. Relative mesh paths resolve against `base_dir`.
pub fn load_scene_from_str(xml: &str, base_dir: &Path) -> Result<SceneDescription, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut parser = SceneParser::new(base_dir);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                let attrs = parser.attributes(&e)?;
                parser.open(&name, attrs)?;
                parser.stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = element_name(&e);
                let attrs = parser.attributes(&e)?;
                parser.open(&name, attrs)?;
                parser.close(&name)?;
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                parser.stack.pop();
                parser.close(&name)?;
            }
            Err(e) => {
                return Err(SceneLoadError::Parse(e.to_string()));
            }
            _ => {}
        }
        buf.clear();
    }

    parser.finish()
}

#[derive(Default)]
struct SensorState {
    kind: String,
    fov: Option<Float>,
    scale: Option<Float>,
    near_clip: Option<Float>,
    far_clip: Option<Float>,
    to_world: Option<Transform>,
    width: Option<usize>,
    height: Option<usize>,
}

struct BsdfState {
    kind: String,
    id: Option<String>,
    reflectance: Option<RGBSpectrum>,
    specular_reflectance: Option<RGBSpectrum>,
    alpha: Option<Float>,
    nested: Option<Arc<dyn BSDF>>,
}

#[derive(Default)]
struct ShapeState {
    kind: String,
    id: Option<String>,
    filename: Option<String>,
    bsdf_ref: Option<String>,
    bsdf: Option<Arc<dyn BSDF>>,
    to_world: Transform,
    radiance: Option<RGBSpectrum>,
    points: [Option<Vector3f>; 3],
}

struct SceneParser {
    base_dir: PathBuf,
    defaults: HashMap<String, String>,
    stack: Vec<String>,
    settings: RenderSettings,
    sensor: Option<SensorState>,
    bsdfs: HashMap<String, Arc<dyn BSDF>>,
    bsdf_stack: Vec<BsdfState>,
    shape: Option<ShapeState>,
    transform: Option<Transform>,
    builder: SceneBuilder,
    shared_materials: HashMap<String, u32>,
    shape_count: usize,
}

impl SceneParser {
    fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            defaults: HashMap::new(),
            stack: Vec::new(),
            settings: RenderSettings::default(),
            sensor: None,
            bsdfs: HashMap::new(),
            bsdf_stack: Vec::new(),
            shape: None,
            transform: None,
            builder: SceneBuilder::new(),
            shared_materials: HashMap::new(),
            shape_count: 0,
        }
    }

    fn inside(&self, element: &str) -> bool {
        self.stack.iter().any(|name| name == element)
    }

    fn parent(&self) -> Option<&str> {
        self.stack.last().map(|s| s.as_str())
    }

    fn attributes(&self, e: &BytesStart) -> Result<HashMap<String, String>, SceneLoadError> {
        let mut out = HashMap::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| SceneLoadError::Parse(err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|err| SceneLoadError::Parse(err.to_string()))?;
            out.insert(key, resolve_value(&value, &self.defaults));
        }
        Ok(out)
    }

    fn open(&mut self, element: &str, attrs: HashMap<String, String>) -> Result<(), SceneLoadError> {
        match element {
            "default" => {
                if let (Some(name), Some(value)) = (attrs.get("name"), attrs.get("value")) {
                    self.defaults.insert(name.clone(), value.clone());
                }
            }
            "integrator" => {
                let kind = attrs.get("type").map(|s| s.as_str()).unwrap_or("");
                if kind != "restir_di" {
                    return Err(SceneLoadError::Parse(format!("unsupported integrator: {}", kind)));
                }
            }
            "sensor" => {
                let kind = attrs.get("type").cloned().unwrap_or_default();
                if kind != "perspective" && kind != "orthographic" {
                    return Err(SceneLoadError::Parse(format!("unsupported sensor: {}", kind)));
                }
                self.sensor = Some(SensorState { kind, ..Default::default() });
            }
            "bsdf" => {
                let kind = attrs.get("type").cloned().ok_or(SceneLoadError::MissingField("bsdf.type"))?;
                self.bsdf_stack.push(BsdfState {
                    kind,
                    id: attrs.get("id").cloned(),
                    reflectance: None,
                    specular_reflectance: None,
                    alpha: None,
                    nested: None,
                });
            }
            "shape" => {
                let kind = attrs.get("type").cloned().ok_or(SceneLoadError::MissingField("shape.type"))?;
                self.shape = Some(ShapeState { kind, id: attrs.get("id").cloned(), ..Default::default() });
            }
            "emitter" => {
                let kind = attrs.get("type").map(|s| s.as_str()).unwrap_or("");
                if kind != "area" || self.shape.is_none() {
                    log::warn!("Ignoring unsupported emitter '{}'", kind);
                }
            }
            "transform" => {
                if attrs.get("name").map(|s| s.as_str()) == Some("to_world") {
                    self.transform = Some(Transform::default());
                }
            }
            "lookat" | "translate" | "scale" | "rotate" => {
                if let Some(current) = self.transform.as_ref() {
                    let next = transform_op(element, &attrs)?.compose(current);
                    self.transform = Some(next);
                }
            }
            "ref" => {
                if let Some(shape) = self.shape.as_mut() {
                    shape.bsdf_ref = Some(attrs.get("id").cloned().ok_or(SceneLoadError::MissingField("ref.id"))?);
                }
            }
            "integer" | "float" | "boolean" | "string" | "rgb" | "point" => {
                let name = attrs.get("name").cloned().ok_or(SceneLoadError::MissingField("property name"))?;
                let value = attrs.get("value").cloned().ok_or(SceneLoadError::MissingField("property value"))?;
                self.property(element, &name, &value)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn property(&mut self, kind: &str, name: &str, value: &str) -> Result<(), SceneLoadError> {
        let parent = self.parent().unwrap_or("").to_string();
        match parent.as_str() {
            "integrator" => match name {
                "m_area" => self.settings.m_area = candidate_count("m_area", parse_i64(value)?)?,
                "m_bsdf" => self.settings.m_bsdf = candidate_count("m_bsdf", parse_i64(value)?)?,
                "sample_count" => self.settings.samples = parse_u32(value)?,
                "seed" => self.settings.seed = parse_u64(value)?,
                "block_size" => self.settings.block_size = parse_usize(value)?,
                "stable_noise" => self.settings.stable_noise = parse_bool(value)?,
                "background" => self.settings.background = parse_spectrum(kind, value)?,
                _ => log::warn!("Ignoring integrator property '{}'", name),
            },
            "film" => {
                if let Some(sensor) = self.sensor.as_mut() {
                    match name {
                        "width" => sensor.width = Some(parse_usize(value)?),
                        "height" => sensor.height = Some(parse_usize(value)?),
                        _ => {}
                    }
                }
            }
            "sensor" => {
                if let Some(sensor) = self.sensor.as_mut() {
                    match name {
                        "fov" => sensor.fov = Some(parse_float(value)?),
                        "scale" => sensor.scale = Some(parse_float(value)?),
                        "near_clip" => sensor.near_clip = Some(parse_float(value)?),
                        "far_clip" => sensor.far_clip = Some(parse_float(value)?),
                        _ => {}
                    }
                }
            }
            "bsdf" => {
                if let Some(bsdf) = self.bsdf_stack.last_mut() {
                    match name {
                        "reflectance" => bsdf.reflectance = Some(parse_spectrum(kind, value)?),
                        "specular_reflectance" => bsdf.specular_reflectance = Some(parse_spectrum(kind, value)?),
                        "alpha" => bsdf.alpha = Some(parse_float(value)?),
                        _ => {}
                    }
                }
            }
            "emitter" => {
                if let Some(shape) = self.shape.as_mut() {
                    if name == "radiance" {
                        shape.radiance = Some(parse_spectrum(kind, value)?);
                    }
                }
            }
            "shape" => {
                if let Some(shape) = self.shape.as_mut() {
                    match name {
                        "filename" => shape.filename = Some(value.to_string()),
                        "p0" => shape.points[0] = Some(parse_vec3(value)?),
                        "p1" => shape.points[1] = Some(parse_vec3(value)?),
                        "p2" => shape.points[2] = Some(parse_vec3(value)?),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, element: &str) -> Result<(), SceneLoadError> {
        match element {
            "transform" => {
                let in_sensor = self.inside("sensor");
                if let Some(transform) = self.transform.take() {
                    if let Some(shape) = self.shape.as_mut() {
                        shape.to_world = transform;
                    } else if let (true, Some(sensor)) = (in_sensor, self.sensor.as_mut()) {
                        sensor.to_world = Some(transform);
                    }
                }
            }
            "bsdf" => {
                let state = self.bsdf_stack.pop().ok_or(SceneLoadError::Parse("unbalanced bsdf".to_string()))?;
                let id = state.id.clone();
                let bsdf = build_bsdf(state)?;
                if let Some(outer) = self.bsdf_stack.last_mut() {
                    outer.nested = Some(bsdf);
                } else if let Some(shape) = self.shape.as_mut() {
                    shape.bsdf = Some(bsdf);
                } else if let Some(id) = id {
                    self.bsdfs.insert(id, bsdf);
                } else {
                    log::warn!("Dropping top-level bsdf without an id");
                }
            }
            "shape" => {
                if let Some(shape) = self.shape.take() {
                    self.add_shape(shape)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn add_shape(&mut self, shape: ShapeState) -> Result<(), SceneLoadError> {
        let mut mesh = match shape.kind.as_str() {
            "obj" => {
                let filename = shape.filename.as_ref().ok_or(SceneLoadError::MissingField("shape.filename"))?;
                let path = Path::new(filename);
                let path = if path.is_absolute() { path.to_path_buf() } else { self.base_dir.join(path) };
                TriangleMesh::from_obj(&path)?
            }
            "rectangle" => rectangle_mesh(&Transform::default()),
            "triangle" => {
                let [p0, p1, p2] = shape.points;
                let p0 = p0.ok_or(SceneLoadError::MissingField("triangle.p0"))?;
                let p1 = p1.ok_or(SceneLoadError::MissingField("triangle.p1"))?;
                let p2 = p2.ok_or(SceneLoadError::MissingField("triangle.p2"))?;
                TriangleMesh::from_triangles(&[Triangle::new(p0, p1, p2)])
            }
            other => return Err(SceneLoadError::Parse(format!("unsupported shape: {}", other))),
        };
        mesh.apply_transform(&shape.to_world);

        let name = shape.id.clone().unwrap_or_else(|| format!("shape_{}", self.shape_count));
        self.shape_count += 1;

        let material = match (shape.bsdf, shape.bsdf_ref) {
            (Some(bsdf), _) => {
                let material = Material::new(&name, bsdf);
                let material = match shape.radiance {
                    Some(radiance) => material.with_emission(radiance),
                    None => material,
                };
                self.builder.add_material(material)
            }
            (None, Some(id)) => {
                let bsdf = self.bsdfs.get(&id)
                    .ok_or_else(|| SceneLoadError::Parse(format!("missing bsdf ref: {}", id)))?
                    .clone();
                match shape.radiance {
                    Some(radiance) => self.builder.add_material(Material::new(&name, bsdf).with_emission(radiance)),
                    None => match self.shared_materials.get(&id) {
                        Some(index) => *index,
                        None => {
                            let index = self.builder.add_material(Material::new(&id, bsdf));
                            self.shared_materials.insert(id, index);
                            index
                        }
                    },
                }
            }
            (None, None) => {
                // Emitters without a surface description only emit.
                if shape.radiance.is_none() {
                    return Err(SceneLoadError::MissingField("shape.bsdf"));
                }
                let material = Material::new(&name, Arc::new(NullBSDF::new()));
                self.builder.add_material(material.with_emission(shape.radiance.unwrap_or_default()))
            }
        };

        log::debug!("Shape '{}': {} triangles, material {}", name, mesh.triangle_count(), material);
        self.builder.add_mesh(&mesh, material)?;
        Ok(())
    }

    fn finish(self) -> Result<SceneDescription, SceneLoadError> {
        let sensor_state = self.sensor.ok_or(SceneLoadError::MissingField("sensor"))?;
        let mut settings = self.settings;
        settings.width = sensor_state.width.unwrap_or(settings.width);
        settings.height = sensor_state.height.unwrap_or(settings.height);
        settings.validate()?;

        let aspect = settings.width as Float / settings.height as Float;
        let to_world = sensor_state.to_world.unwrap_or_default();
        let sensor: Arc<dyn Sensor> = match sensor_state.kind.as_str() {
            "orthographic" => Arc::new(OrthographicCamera::new(to_world, sensor_state.scale.unwrap_or(1.0), aspect)),
            _ => {
                let mut camera = PerspectiveCamera::new(to_world, sensor_state.fov.unwrap_or(45.0), aspect);
                if sensor_state.near_clip.is_some() || sensor_state.far_clip.is_some() {
                    camera = camera.with_clip(sensor_state.near_clip.unwrap_or(1e-2),
                                              sensor_state.far_clip.unwrap_or(1e4));
                }
                Arc::new(camera)
            }
        };

        let scene = self.builder.build()?;
        if scene.lights().is_empty() {
            log::warn!("Scene has no emissive triangles; only emission and background will be visible");
        }
        Ok(SceneDescription { scene: Arc::new(scene), sensor, settings })
    }
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn build_bsdf(state: BsdfState) -> Result<Arc<dyn BSDF>, SceneLoadError> {
    let bsdf: Arc<dyn BSDF> = match state.kind.as_str() {
        "diffuse" => Arc::new(LambertianDiffuseBSDF::new(state.reflectance.unwrap_or(RGBSpectrum::splat(0.5)))),
        "roughconductor" => Arc::new(RoughConductorBSDF::new(
            state.alpha.unwrap_or(0.1),
            state.specular_reflectance.unwrap_or(RGBSpectrum::splat(1.0)))),
        "null" => Arc::new(NullBSDF::new()),
        // Shading frames already face the viewer.
        "twosided" => return state.nested.ok_or(SceneLoadError::MissingField("twosided.bsdf")),
        other => return Err(SceneLoadError::Parse(format!("unsupported bsdf: {}", other))),
    };
    Ok(bsdf)
}

fn transform_op(element: &str, attrs: &HashMap<String, String>) -> Result<Transform, SceneLoadError> {
    let get = |key: &str, default: Float| -> Result<Float, SceneLoadError> {
        attrs.get(key).map(|v| parse_float(v)).unwrap_or(Ok(default))
    };
    match element {
        "lookat" => {
            let origin = parse_vec3(attrs.get("origin").ok_or(SceneLoadError::MissingField("lookat.origin"))?)?;
            let target = parse_vec3(attrs.get("target").ok_or(SceneLoadError::MissingField("lookat.target"))?)?;
            let up = match attrs.get("up") {
                Some(up) => parse_vec3(up)?,
                None => Vector3f::y(),
            };
            Ok(Transform::look_at(&origin, &target, &up))
        }
        "translate" => Ok(Transform::translate(&Vector3f::new(get("x", 0.0)?, get("y", 0.0)?, get("z", 0.0)?))),
        "scale" => {
            if let Some(value) = attrs.get("value") {
                let s = parse_float(value)?;
                Ok(Transform::scale(&Vector3f::new(s, s, s)))
            } else {
                Ok(Transform::scale(&Vector3f::new(get("x", 1.0)?, get("y", 1.0)?, get("z", 1.0)?)))
            }
        }
        "rotate" => {
            let axis = Vector3f::new(get("x", 0.0)?, get("y", 0.0)?, get("z", 0.0)?);
            if axis.norm() == 0.0 {
                return Err(SceneLoadError::Parse("rotate needs a non-zero axis".to_string()));
            }
            Ok(Transform::rotate(&axis, get("angle", 0.0)?))
        }
        other => Err(SceneLoadError::Parse(format!("unsupported transform: {}", other))),
    }
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| SceneLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_i64(value: &str) -> Result<i64, SceneLoadError> {
    value.trim().parse::<i64>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_u32(value: &str) -> Result<u32, SceneLoadError> {
    value.trim().parse::<u32>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_u64(value: &str) -> Result<u64, SceneLoadError> {
    value.trim().parse::<u64>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, SceneLoadError> {
    value.trim().parse::<usize>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_bool(value: &str) -> Result<bool, SceneLoadError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(SceneLoadError::Parse(format!("invalid boolean: {}", value))),
    }
}

fn parse_vec3(value: &str) -> Result<Vector3f, SceneLoadError> {
    let mut parts = value.split(|c: char| c == ',' || c.is_whitespace()).filter(|s| !s.is_empty());
    let mut next = || parts.next().ok_or_else(|| SceneLoadError::Parse(format!("invalid vec3: {}", value)));
    let x = parse_float(next()?)?;
    let y = parse_float(next()?)?;
    let z = parse_float(next()?)?;
    Ok(Vector3f::new(x, y, z))
}

/// `<rgb>` takes three components, `<float>` a grey value.
fn parse_spectrum(kind: &str, value: &str) -> Result<RGBSpectrum, SceneLoadError> {
    if kind == "float" {
        return Ok(RGBSpectrum::splat(parse_float(value)?));
    }
    let v = parse_vec3(value)?;
    Ok(RGBSpectrum::new(v.x, v.y, v.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORNELL_LIKE: &str = r#"
        <scene version="3.0.0">
            <default name="spp" value="16"/>
            <integrator type="restir_di">
                <integer name="m_area" value="8"/>
                <integer name="m_bsdf" value="2"/>
                <integer name="sample_count" value="$spp"/>
                <integer name="seed" value="7"/>
                <boolean name="stable_noise" value="true"/>
                <rgb name="background" value="0.1, 0.2, 0.3"/>
            </integrator>
            <sensor type="perspective">
                <float name="fov" value="40"/>
                <transform name="to_world">
                    <lookat origin="0, 0, 5" target="0, 0, 0" up="0, 1, 0"/>
                </transform>
                <film type="hdrfilm">
                    <integer name="width" value="64"/>
                    <integer name="height" value="32"/>
                </film>
            </sensor>
            <bsdf type="twosided" id="white">
                <bsdf type="diffuse">
                    <rgb name="reflectance" value="0.8, 0.8, 0.8"/>
                </bsdf>
            </bsdf>
            <bsdf type="roughconductor" id="metal">
                <float name="alpha" value="0.2"/>
            </bsdf>
            <shape type="rectangle" id="floor">
                <transform name="to_world">
                    <scale value="4"/>
                </transform>
                <ref id="white"/>
            </shape>
            <shape type="rectangle" id="wall">
                <transform name="to_world">
                    <rotate x="1" angle="90"/>
                    <translate z="1"/>
                </transform>
                <ref id="white"/>
            </shape>
            <shape type="triangle" id="light">
                <point name="p0" value="0, 0, 2"/>
                <point name="p1" value="1, 0, 2"/>
                <point name="p2" value="0, 1, 2"/>
                <emitter type="area">
                    <rgb name="radiance" value="5, 5, 5"/>
                </emitter>
            </shape>
        </scene>
    "#;

    fn load(xml: &str) -> Result<SceneDescription, SceneLoadError> {
        load_scene_from_str(xml, Path::new("."))
    }

    #[test]
    fn test_load_full_scene() {
        let desc = load(CORNELL_LIKE).expect("scene loads");
        assert_eq!(desc.settings.m_area, 8);
        assert_eq!(desc.settings.m_bsdf, 2);
        assert_eq!(desc.settings.samples, 16);
        assert_eq!(desc.settings.seed, 7);
        assert!(desc.settings.stable_noise);
        assert_eq!(desc.settings.background, RGBSpectrum::new(0.1, 0.2, 0.3));
        assert_eq!((desc.settings.width, desc.settings.height), (64, 32));

        assert_eq!(desc.scene.face_count(), 5);
        // Both rectangles share the referenced material; the light gets its own.
        assert_eq!(desc.scene.materials().len(), 2);
        assert_eq!(desc.scene.lights().count(), 1);
        let light = desc.scene.face_material(4).expect("light face");
        assert_eq!(desc.scene.material(light).map(|m| m.emission()), Some(RGBSpectrum::splat(5.0)));
        assert!(desc.scene.material(light).map(|m| m.bsdf().is_null()).unwrap_or(false));
    }

    #[test]
    fn test_shape_transform_is_applied_in_order() {
        let desc = load(CORNELL_LIKE).expect("scene loads");
        // Rotated about x then lifted: the wall spans z in [0, 2] at y = 0.
        let wall = desc.scene.triangle(2).expect("wall face");
        let (p0, p1, p2) = wall.vertices();
        for p in [p0, p1, p2] {
            assert!(p.y.abs() < 1e-5, "{:?}", p);
            assert!(p.z > -1e-5 && p.z < 2.0 + 1e-5, "{:?}", p);
        }
        let floor = desc.scene.triangle(0).expect("floor face");
        assert!((floor.surface_area() - 32.0).abs() < 1e-3);
    }

    #[test]
    fn test_camera_looks_at_target() {
        let desc = load(CORNELL_LIKE).expect("scene loads");
        let ray = desc.sensor.sample_ray(&crate::math::constants::Vector2f::new(0.5, 0.5));
        assert!((ray.origin() - Vector3f::new(0.0, 0.0, 5.0)).norm() < 1e-4);
        assert!((ray.dir() - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-4);
    }

    #[test]
    fn test_negative_candidate_count_is_rejected() {
        let xml = CORNELL_LIKE.replace(r#"name="m_area" value="8""#, r#"name="m_area" value="-3""#);
        match load(&xml) {
            Err(SceneLoadError::Config(ConfigError::NegativeCandidateCount { name, value })) => {
                assert_eq!(name, "m_area");
                assert_eq!(value, -3);
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_missing_sensor_and_bad_reference() {
        let no_sensor = r#"<scene><bsdf type="diffuse" id="a"/>
            <shape type="rectangle"><ref id="a"/></shape></scene>"#;
        assert!(matches!(load(no_sensor), Err(SceneLoadError::MissingField("sensor"))));

        let bad_ref = r#"<scene><sensor type="orthographic"/>
            <shape type="rectangle"><ref id="nope"/></shape></scene>"#;
        assert!(matches!(load(bad_ref), Err(SceneLoadError::Parse(_))));

        let bad_bsdf = r#"<scene><sensor type="orthographic"/><bsdf type="plastic" id="p"/></scene>"#;
        assert!(matches!(load(bad_bsdf), Err(SceneLoadError::Parse(_))));
    }

    #[test]
    fn test_zero_film_size_is_rejected() {
        let xml = r#"<scene><sensor type="orthographic"><film>
            <integer name="width" value="0"/></film></sensor>
            <shape type="rectangle"><bsdf type="diffuse"/></shape></scene>"#;
        assert!(matches!(load(xml), Err(SceneLoadError::Config(ConfigError::InvalidSize { .. }))));
    }

    #[test]
    fn test_obj_shape_resolves_relative_path() {
        let dir = std::env::temp_dir().join(format!("restir_di_loader_{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        fs::write(dir.join("quad.obj"), "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").expect("write obj");

        let xml = r#"<scene><sensor type="orthographic"><float name="scale" value="2"/></sensor>
            <shape type="obj"><string name="filename" value="quad.obj"/>
            <bsdf type="diffuse"/></shape></scene>"#;
        let desc = load_scene_from_str(xml, &dir).expect("scene loads");
        assert_eq!(desc.scene.face_count(), 2);
        assert!(desc.scene.lights().is_empty());

        let _ = fs::remove_dir_all(&dir);
    }
}
