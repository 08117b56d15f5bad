use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use glam::Mat4;
use log::info;
use parking_lot::RwLock;

use crate::config::DemoConfig;
use crate::controller::{ControlEffect, ControlEvent, InteractionController, LabelSink, SliderBank};
use crate::geometry::FlatMesh;
use crate::input::KeyCode;
use crate::material::MaterialGroup;
use crate::obj::parse_obj;
use crate::quad::QUAD_POSITIONS;
use crate::render::{GpuContext, LitMeshRenderer, TexturedQuadRenderer};
use crate::session::{DemoKind, Session};
use crate::texture::{TextureEvent, TextureSlot};
use crate::transform::{aspect_ratio, FrameMatrices, TransformComposer};

/// Drawable size shared between resize listeners and the frame loop.
#[derive(Debug)]
pub struct Viewport {
    size: RwLock<(u32, u32)>,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new((width.max(1), height.max(1))),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        *self.size.write() = (width.max(1), height.max(1));
    }

    pub fn size(&self) -> (u32, u32) {
        *self.size.read()
    }

    pub fn aspect(&self) -> f32 {
        let (width, height) = self.size();
        aspect_ratio(width, height)
    }
}

/// Counts gathered while preparing the lit demo's mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshStats {
    pub vertices: usize,
    pub faces: usize,
    pub indices: usize,
    pub positions: usize,
    pub normals: usize,
}

/// What the demo draws.
#[derive(Debug)]
pub enum DemoContent {
    Lit { mesh: FlatMesh, stats: MeshStats },
    Textured { path: PathBuf, texture: TextureSlot },
}

/// Platform independent state of a running demo.
#[derive(Debug)]
pub struct DemoState {
    pub session: Session,
    pub controller: InteractionController,
    pub composer: TransformComposer,
    pub sliders: SliderBank,
    pub content: DemoContent,
}

impl DemoState {
    /// Prepares the lit demo from OBJ source text.
    pub fn lit(config: &DemoConfig, obj_source: &str, aspect: f32) -> Result<Self> {
        let mut model = parse_obj(obj_source).context("failed to parse OBJ mesh")?;
        model.scale(config.mesh_scale);
        let mesh = FlatMesh::from_model(&model).context("failed to flatten OBJ mesh")?;
        let stats = MeshStats {
            vertices: model.positions.len(),
            faces: model.faces.len(),
            indices: model.faces.len() * 3,
            positions: mesh.positions.len(),
            normals: mesh.normals.len(),
        };
        info!(
            "mesh loaded: {} vertices, {} indices, {} flattened positions, {} normals",
            stats.vertices, stats.indices, stats.positions, stats.normals
        );
        Ok(Self::with_content(
            config,
            DemoContent::Lit { mesh, stats },
            aspect,
        ))
    }

    /// Prepares the textured demo. `load_texture` starts the image request;
    /// headless callers leave it off.
    pub fn textured(config: &DemoConfig, aspect: f32, load_texture: bool) -> Result<Self> {
        let path = config
            .texture
            .clone()
            .ok_or_else(|| anyhow!("textured demo has no texture path"))?;
        let texture = if load_texture {
            TextureSlot::load(path.clone())
        } else {
            TextureSlot::Ready
        };
        Ok(Self::with_content(
            config,
            DemoContent::Textured { path, texture },
            aspect,
        ))
    }

    /// Reads every asset named by `config` from disk.
    pub fn load(config: &DemoConfig, aspect: f32, load_texture: bool) -> Result<Self> {
        match config.kind {
            DemoKind::Lit => {
                let path = config
                    .mesh
                    .as_ref()
                    .ok_or_else(|| anyhow!("lit demo has no mesh path"))?;
                let source = fs::read_to_string(path)
                    .with_context(|| format!("unable to read mesh {}", path.display()))?;
                Self::lit(config, &source, aspect)
            }
            DemoKind::Textured => Self::textured(config, aspect, load_texture),
        }
    }

    fn with_content(config: &DemoConfig, content: DemoContent, aspect: f32) -> Self {
        let session = config.session();
        let composer = TransformComposer::new(session.projection, aspect);
        Self {
            session,
            controller: InteractionController::new(config.rotate_speed),
            composer,
            sliders: SliderBank::default(),
            content,
        }
    }

    pub fn handle(&mut self, event: ControlEvent, labels: &mut dyn LabelSink) -> ControlEffect {
        self.controller.handle(&mut self.session, event, labels)
    }

    /// Key press from a front end without a slider panel: tracked as a key
    /// and also offered to the keyboard slider bank.
    pub fn key_pressed(&mut self, key: KeyCode, labels: &mut dyn LabelSink) -> ControlEffect {
        self.handle(ControlEvent::KeyDown(key), labels);
        match self.sliders.key_pressed(key, &self.session) {
            Some(event) => self.handle(event, labels),
            None => ControlEffect::None,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.composer.set_aspect(aspect_ratio(width, height));
    }

    pub fn matrices(&self) -> FrameMatrices {
        self.composer.compose(&self.session.transforms)
    }

    pub fn publish_labels(&self, labels: &mut dyn LabelSink) {
        self.controller.publish_labels(&self.session, labels);
    }

    /// Human readable description of the demo's initial state.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!("Demo: {}", self.session.kind.name())];
        match &self.content {
            DemoContent::Lit { stats, .. } => {
                lines.push(format!(
                    "Mesh: {} vertices, {} faces, {} indices",
                    stats.vertices, stats.faces, stats.indices
                ));
                lines.push(format!(
                    "Flattened: {} positions, {} normals",
                    stats.positions, stats.normals
                ));
                for group in MaterialGroup::ALL {
                    lines.push(self.session.material.label(group));
                }
            }
            DemoContent::Textured { path, .. } => {
                lines.push(format!("Texture: {}", path.display()));
                lines.push(format!("Quad: {} vertices", QUAD_POSITIONS.len()));
            }
        }
        lines.push("Model matrix:".to_string());
        lines.extend(matrix_rows(&self.matrices().model));
        lines
    }
}

fn matrix_rows(matrix: &Mat4) -> Vec<String> {
    (0..4)
        .map(|row| {
            let row = matrix.row(row);
            format!(
                "  [{:8.4} {:8.4} {:8.4} {:8.4}]",
                row.x, row.y, row.z, row.w
            )
        })
        .collect()
}

pub fn print_summary(state: &DemoState) {
    for line in state.summary() {
        println!("{line}");
    }
}

/// GPU side of a demo.
pub enum DemoRenderer {
    Lit(LitMeshRenderer),
    Textured(TexturedQuadRenderer),
}

impl DemoRenderer {
    pub fn new(gpu: &GpuContext, state: &DemoState) -> Self {
        match &state.content {
            DemoContent::Lit { mesh, .. } => Self::Lit(LitMeshRenderer::new(gpu, mesh)),
            DemoContent::Textured { .. } => Self::Textured(TexturedQuadRenderer::new(gpu)),
        }
    }

    /// One frame: pick up a finished texture load, push uniforms, draw.
    pub fn frame(
        &mut self,
        gpu: &mut GpuContext,
        state: &mut DemoState,
        labels: &mut dyn LabelSink,
    ) -> Result<()> {
        let matrices = state.matrices();
        match self {
            Self::Lit(renderer) => {
                renderer.update(gpu.queue(), &matrices, &state.session.lighting());
                gpu.render(&*renderer)?;
            }
            Self::Textured(renderer) => {
                if let DemoContent::Textured { texture, .. } = &mut state.content {
                    match texture.poll() {
                        Some(TextureEvent::Loaded(image)) => renderer.upload(gpu, &image),
                        Some(TextureEvent::Failed(message)) => {
                            renderer.hide();
                            labels.show_diagnostic(&message);
                        }
                        None => {}
                    }
                }
                renderer.update(gpu.queue(), &matrices);
                gpu.render(&*renderer)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialChannel;
    use std::collections::HashMap;

    const CUBE: &str = "\
v -1 -1 -1\nv 1 -1 -1\nv 1 1 -1\nv -1 1 -1\n\
v -1 -1 1\nv 1 -1 1\nv 1 1 1\nv -1 1 1\n\
f 1 3 2\nf 1 4 3\nf 5 6 7\nf 5 7 8\n\
f 1 2 6\nf 1 6 5\nf 4 8 7\nf 4 7 3\n\
f 1 5 8\nf 1 8 4\nf 2 3 7\nf 2 7 6\n";

    fn lit_config() -> DemoConfig {
        let mut config = DemoConfig::defaults(DemoKind::Lit);
        config.mesh = Some(PathBuf::from("cube.obj"));
        config
    }

    #[test]
    fn lit_state_counts_cube() {
        let state = DemoState::lit(&lit_config(), CUBE, 1.0).unwrap();
        let DemoContent::Lit { stats, mesh } = &state.content else {
            panic!("expected lit content");
        };
        assert_eq!(stats.vertices, 8);
        assert_eq!(stats.faces, 12);
        assert_eq!(mesh.vertex_count(), 36);
        let corner = mesh.positions[0];
        assert!((corner.x - (-1.0 / 7.5)).abs() < 1e-6);
    }

    #[test]
    fn summary_lists_labels_and_matrix() {
        let state = DemoState::lit(&lit_config(), CUBE, 1.0).unwrap();
        let summary = state.summary();
        assert_eq!(summary[0], "Demo: lit");
        assert!(summary.contains(&"Material Shininess (100):".to_string()));
        assert!(summary.contains(&"Model matrix:".to_string()));
        assert_eq!(summary.len(), 1 + 2 + 3 + 1 + 4);
    }

    #[test]
    fn bad_mesh_is_reported() {
        let err = DemoState::lit(&lit_config(), "v 0 0 0\nf 1 2 3\n", 1.0).unwrap_err();
        assert!(format!("{err:#}").contains("out of range"));
    }

    #[test]
    fn key_sliders_update_material() {
        let mut state = DemoState::lit(&lit_config(), CUBE, 1.0).unwrap();
        let mut labels: HashMap<MaterialGroup, String> = HashMap::new();
        state.key_pressed(KeyCode::Digit(7), &mut labels);
        let effect = state.key_pressed(
            KeyCode::Named(crate::input::NamedKey::Up),
            &mut labels,
        );
        assert_eq!(effect, ControlEffect::Material(MaterialGroup::Shininess));
        assert_eq!(state.session.material.value(MaterialChannel::Shininess), 101.0);
        assert!(state.session.keys.is_key_down(KeyCode::Digit(7)));
    }

    #[test]
    fn resize_rebuilds_projection() {
        let config = DemoConfig::defaults(DemoKind::Textured);
        let mut state = DemoState::textured(&config, 1.0, false).unwrap();
        let before = state.matrices().projection;
        state.resize(1600, 800);
        assert_eq!(state.composer.aspect(), 2.0);
        assert_ne!(state.matrices().projection, before);
        assert!(state.summary().contains(&"Quad: 6 vertices".to_string()));
    }

    #[test]
    fn viewport_clamps_to_one_pixel() {
        let viewport = Viewport::new(0, 0);
        assert_eq!(viewport.size(), (1, 1));
        viewport.update(640, 480);
        assert!((viewport.aspect() - 640.0 / 480.0).abs() < 1e-6);
    }
}
