use serde::{Deserialize, Serialize};

use crate::config::DemoConfig;
use crate::input::KeyState;
use crate::lighting::{LightingUniforms, PointLight};
use crate::material::Material;
use crate::transform::{Pose, Projection, TransformState};

/// Which of the two demos a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoKind {
    /// Flat-shaded OBJ mesh with a material panel.
    Lit,
    /// Unlit quad showing one image.
    Textured,
}

impl DemoKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lit" => Some(Self::Lit),
            "textured" | "texture" => Some(Self::Textured),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Lit => "lit",
            Self::Textured => "textured",
        }
    }
}

/// All mutable state of one running demo.
#[derive(Debug)]
pub struct Session {
    pub kind: DemoKind,
    pub transforms: TransformState,
    pub projection: Projection,
    pub material: Material,
    pub light: PointLight,
    pub keys: KeyState,
}

impl Session {
    /// A session with the demo's built-in poses, light and material.
    pub fn new(kind: DemoKind) -> Self {
        DemoConfig::defaults(kind).session()
    }

    /// The pose that pointer drags rotate: the parent pivot of the lit mesh,
    /// or the quad itself.
    pub fn drag_pose_mut(&mut self) -> &mut Pose {
        match self.kind {
            DemoKind::Lit => &mut self.transforms.parent,
            DemoKind::Textured => &mut self.transforms.local,
        }
    }

    pub fn lighting(&self) -> LightingUniforms {
        LightingUniforms::new(&self.light, &self.material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    #[test]
    fn lit_session_places_mesh_in_front_of_camera() {
        let session = Session::new(DemoKind::Lit);
        let origin = session.transforms.model().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, -1.75, -4.0)).length() < 1e-5);
    }

    #[test]
    fn new_session_matches_config_defaults() {
        for kind in [DemoKind::Lit, DemoKind::Textured] {
            let config = DemoConfig::defaults(kind);
            let session = Session::new(kind);
            assert_eq!(
                session.transforms.local,
                Pose::new(config.local_position, config.local_rotation)
            );
            assert_eq!(
                session.transforms.parent,
                Pose::new(config.parent_position, config.parent_rotation)
            );
            assert_eq!(session.material, config.material);
        }
    }

    #[test]
    fn textured_drag_targets_quad_rotation() {
        let mut session = Session::new(DemoKind::Textured);
        session.drag_pose_mut().turn(45.0, 0.0);
        assert_eq!(session.transforms.parent.rotation, Mat4::IDENTITY);
        assert_ne!(session.transforms.local.rotation, Mat4::IDENTITY);
    }

    #[test]
    fn demo_names() {
        assert_eq!(DemoKind::from_name(" Lit "), Some(DemoKind::Lit));
        assert_eq!(DemoKind::from_name("texture"), Some(DemoKind::Textured));
        assert_eq!(DemoKind::from_name("cube"), None);
        assert_eq!(DemoKind::Textured.name(), "textured");
    }
}
