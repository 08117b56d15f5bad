use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::material::Material;

/// The single light of the lit demo.
///
/// A position with `w == 0` is a direction towards the light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec4::new(1.0, 1.0, 1.0, 0.0),
            ambient: Vec4::ONE,
            diffuse: Vec4::ONE,
            specular: Vec4::ONE,
        }
    }
}

/// Uniform values for the lighting stage: light colour times material
/// colour per term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingUniforms {
    pub light_position: Vec4,
    pub ambient_product: Vec4,
    pub diffuse_product: Vec4,
    pub specular_product: Vec4,
    pub shininess: f32,
}

impl LightingUniforms {
    pub fn new(light: &PointLight, material: &Material) -> Self {
        Self {
            light_position: light.position,
            ambient_product: light.ambient * material.ambient,
            diffuse_product: light.diffuse * material.diffuse,
            specular_product: light.specular * material.specular,
            shininess: material.shininess,
        }
    }

    /// Colour of one vertex, evaluated in eye space the same way the vertex
    /// shader does it.
    pub fn shade_vertex(&self, eye_position: Vec3, eye_normal: Vec3) -> Vec4 {
        let to_light = if self.light_position.w == 0.0 {
            self.light_position.truncate().normalize()
        } else {
            (self.light_position.truncate() - eye_position).normalize()
        };
        let to_eye = (-eye_position).normalize_or_zero();
        let halfway = (to_light + to_eye).normalize_or_zero();
        let normal = eye_normal.normalize();

        let lambert = to_light.dot(normal).max(0.0);
        let diffuse = self.diffuse_product * lambert;
        let specular = if to_light.dot(normal) < 0.0 {
            Vec4::ZERO
        } else {
            self.specular_product * normal.dot(halfway).max(0.0).powf(self.shininess)
        };

        let color = self.ambient_product + diffuse + specular;
        color.truncate().extend(1.0)
    }
}
