use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use glam::{Vec3, Vec4};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::controller::ROTATE_SPEED;
use crate::input::KeyState;
use crate::lighting::PointLight;
use crate::material::Material;
use crate::session::{DemoKind, Session};
use crate::transform::{Pose, Projection, TransformState};

/// Scale the lit demo applies to its mesh unless told otherwise.
pub const DEFAULT_MESH_SCALE: f32 = 1.0 / 7.5;

/// Everything needed to start one demo, as read from a `<demo>` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    pub kind: DemoKind,
    pub mesh: Option<PathBuf>,
    pub mesh_scale: f32,
    pub texture: Option<PathBuf>,
    pub parent_position: Vec3,
    pub parent_rotation: Vec3,
    pub local_position: Vec3,
    pub local_rotation: Vec3,
    pub camera_position: Vec3,
    pub camera_rotation: Vec3,
    pub projection: Projection,
    pub rotate_speed: f32,
    pub light: PointLight,
    pub material: Material,
}

impl DemoConfig {
    /// Built-in settings of each demo.
    pub fn defaults(kind: DemoKind) -> Self {
        let (parent_position, local_position, local_rotation, texture) = match kind {
            DemoKind::Lit => (
                Vec3::new(0.0, -0.5, -4.0),
                Vec3::new(0.0, -1.25, 0.0),
                Vec3::new(-90.0, -90.0, 0.0),
                None,
            ),
            DemoKind::Textured => (
                Vec3::ZERO,
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::ZERO,
                Some(PathBuf::from("mandrill.png")),
            ),
        };
        Self {
            kind,
            mesh: None,
            mesh_scale: DEFAULT_MESH_SCALE,
            texture,
            parent_position,
            parent_rotation: Vec3::ZERO,
            local_position,
            local_rotation,
            camera_position: Vec3::ZERO,
            camera_rotation: Vec3::ZERO,
            projection: Projection::default(),
            rotate_speed: ROTATE_SPEED,
            light: PointLight::default(),
            material: Material::default(),
        }
    }

    /// Parses a `<demo kind="lit|textured">` document. Elements that are
    /// left out keep the demo's defaults.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid demo XML")?;
        let root = document.root_element();
        if !root.has_tag_name("demo") {
            return Err(anyhow!(
                "expected a <demo> root element, found <{}>",
                root.tag_name().name()
            ));
        }
        let kind_name = root
            .attribute("kind")
            .ok_or_else(|| anyhow!("<demo> is missing its kind attribute"))?;
        let kind = DemoKind::from_name(kind_name)
            .ok_or_else(|| anyhow!("unknown demo kind `{kind_name}`"))?;

        let mut config = Self::defaults(kind);
        if let Some(mesh) = optional_text(&root, "mesh") {
            config.mesh = Some(PathBuf::from(mesh));
        }
        if let Some(texture) = optional_text(&root, "texture") {
            config.texture = Some(PathBuf::from(texture));
        }
        config.mesh_scale = parse_f32(optional_text(&root, "meshScale"), config.mesh_scale)?;
        config.parent_position =
            parse_vec3(optional_text(&root, "parentPosition"), config.parent_position)?;
        config.parent_rotation =
            parse_vec3(optional_text(&root, "parentRotation"), config.parent_rotation)?;
        config.local_position =
            parse_vec3(optional_text(&root, "localPosition"), config.local_position)?;
        config.local_rotation =
            parse_vec3(optional_text(&root, "localRotation"), config.local_rotation)?;
        config.camera_position =
            parse_vec3(optional_text(&root, "cameraPosition"), config.camera_position)?;
        config.camera_rotation =
            parse_vec3(optional_text(&root, "cameraRotation"), config.camera_rotation)?;
        config.projection.fov_y_degrees =
            parse_f32(optional_text(&root, "fov"), config.projection.fov_y_degrees)?;
        config.projection.near = parse_f32(optional_text(&root, "near"), config.projection.near)?;
        config.projection.far = parse_f32(optional_text(&root, "far"), config.projection.far)?;
        config.rotate_speed = parse_f32(optional_text(&root, "rotateSpeed"), config.rotate_speed)?;

        let light = &mut config.light;
        light.position = parse_vec4(optional_text(&root, "lightPosition"), light.position)?;
        light.ambient = parse_rgb(optional_text(&root, "lightAmbient"), light.ambient)?;
        light.diffuse = parse_rgb(optional_text(&root, "lightDiffuse"), light.diffuse)?;
        light.specular = parse_rgb(optional_text(&root, "lightSpecular"), light.specular)?;

        let material = &mut config.material;
        material.ambient = parse_rgb(optional_text(&root, "materialAmbient"), material.ambient)?;
        material.diffuse = parse_rgb(optional_text(&root, "materialDiffuse"), material.diffuse)?;
        material.specular =
            parse_rgb(optional_text(&root, "materialSpecular"), material.specular)?;
        material.shininess = parse_f32(optional_text(&root, "shininess"), material.shininess)?;

        if config.projection.near <= 0.0 || config.projection.far <= config.projection.near {
            return Err(anyhow!(
                "clip range {}..{} is invalid",
                config.projection.near,
                config.projection.far
            ));
        }
        if kind == DemoKind::Lit && config.mesh.is_none() {
            return Err(anyhow!("<mesh> tag is missing; the lit demo needs a mesh"));
        }
        Ok(config)
    }

    /// Reads a demo file and resolves asset paths against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        let mut config =
            Self::from_xml(&xml).with_context(|| format!("invalid demo file {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for asset in [&mut self.mesh, &mut self.texture].into_iter().flatten() {
            if asset.is_relative() {
                *asset = base.join(&*asset);
            }
        }
    }

    /// Starts a session with this configuration's poses, light and material.
    pub fn session(&self) -> Session {
        Session {
            kind: self.kind,
            transforms: TransformState {
                parent: Pose::new(self.parent_position, self.parent_rotation),
                local: Pose::new(self.local_position, self.local_rotation),
                camera: Pose::new(self.camera_position, self.camera_rotation),
            },
            projection: self.projection,
            material: self.material,
            light: self.light,
            keys: KeyState::new(),
        }
    }
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_components(value: &str, tag: &str, count: usize) -> Result<Vec<f32>> {
    let numbers = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid {tag} component `{component}`: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if numbers.len() != count {
        return Err(anyhow!(
            "{tag} needs {count} components, found {}",
            numbers.len()
        ));
    }
    Ok(numbers)
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let n = parse_components(&value, "vector", 3)?;
    Ok(Vec3::new(n[0], n[1], n[2]))
}

fn parse_vec4(value: Option<String>, default: Vec4) -> Result<Vec4> {
    let Some(value) = value else {
        return Ok(default);
    };
    let n = parse_components(&value, "vector", 4)?;
    Ok(Vec4::new(n[0], n[1], n[2], n[3]))
}

/// Colours are given as `r g b` in `0..1`; alpha is always 1.0.
fn parse_rgb(value: Option<String>, default: Vec4) -> Result<Vec4> {
    let Some(value) = value else {
        return Ok(default);
    };
    let n = parse_components(&value, "color", 3)?;
    Ok(Vec4::new(n[0], n[1], n[2], 1.0))
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float `{value}`: {err}")),
        None => Ok(default),
    }
}
