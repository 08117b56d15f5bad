use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Surface response to the demo light. Alpha is always 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec4::new(0.1, 0.1, 0.1, 1.0),
            diffuse: Vec4::new(0.1, 0.25, 1.0, 1.0),
            specular: Vec4::new(1.0, 1.0, 1.0, 1.0),
            shininess: 100.0,
        }
    }
}

impl Material {
    /// Writes one slider value into the material and reports which group
    /// changed.
    pub fn apply(&mut self, channel: MaterialChannel, value: f32) -> MaterialGroup {
        match channel {
            MaterialChannel::DiffuseR => self.diffuse.x = value,
            MaterialChannel::DiffuseG => self.diffuse.y = value,
            MaterialChannel::DiffuseB => self.diffuse.z = value,
            MaterialChannel::SpecularR => self.specular.x = value,
            MaterialChannel::SpecularG => self.specular.y = value,
            MaterialChannel::SpecularB => self.specular.z = value,
            MaterialChannel::Shininess => self.shininess = value,
        }
        self.diffuse.w = 1.0;
        self.specular.w = 1.0;
        channel.group()
    }

    pub fn value(&self, channel: MaterialChannel) -> f32 {
        match channel {
            MaterialChannel::DiffuseR => self.diffuse.x,
            MaterialChannel::DiffuseG => self.diffuse.y,
            MaterialChannel::DiffuseB => self.diffuse.z,
            MaterialChannel::SpecularR => self.specular.x,
            MaterialChannel::SpecularG => self.specular.y,
            MaterialChannel::SpecularB => self.specular.z,
            MaterialChannel::Shininess => self.shininess,
        }
    }

    /// Human readable label for a group, as shown next to its sliders.
    pub fn label(&self, group: MaterialGroup) -> String {
        match group {
            MaterialGroup::Diffuse => format!(
                "Material Diffuse RGB ({:.2}, {:.2}, {:.2}):",
                self.diffuse.x, self.diffuse.y, self.diffuse.z
            ),
            MaterialGroup::Specular => format!(
                "Material Specular RGB ({:.2}, {:.2}, {:.2}):",
                self.specular.x, self.specular.y, self.specular.z
            ),
            MaterialGroup::Shininess => {
                format!("Material Shininess ({}):", pad_shininess(self.shininess))
            }
        }
    }
}

/// Left pads the shortest decimal form of `value` with zeros to three
/// characters: `5` becomes `005`, `42.5` stays `42.5`.
pub fn pad_shininess(value: f32) -> String {
    format!("{:0>3}", value.to_string())
}

/// One slider of the material panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialChannel {
    DiffuseR,
    DiffuseG,
    DiffuseB,
    SpecularR,
    SpecularG,
    SpecularB,
    Shininess,
}

impl MaterialChannel {
    pub const ALL: [Self; 7] = [
        Self::DiffuseR,
        Self::DiffuseG,
        Self::DiffuseB,
        Self::SpecularR,
        Self::SpecularG,
        Self::SpecularB,
        Self::Shininess,
    ];

    pub fn group(self) -> MaterialGroup {
        match self {
            Self::DiffuseR | Self::DiffuseG | Self::DiffuseB => MaterialGroup::Diffuse,
            Self::SpecularR | Self::SpecularG | Self::SpecularB => MaterialGroup::Specular,
            Self::Shininess => MaterialGroup::Shininess,
        }
    }

    /// Slider range as `(min, max, step)`.
    pub fn range(self) -> (f32, f32, f32) {
        match self {
            Self::Shininess => (1.0, 200.0, 1.0),
            _ => (0.0, 1.0, 0.01),
        }
    }

    /// DOM id of the slider element driving this channel.
    pub fn element_id(self) -> &'static str {
        match self {
            Self::DiffuseR => "materialDiffuseR",
            Self::DiffuseG => "materialDiffuseG",
            Self::DiffuseB => "materialDiffuseB",
            Self::SpecularR => "materialSpecularR",
            Self::SpecularG => "materialSpecularG",
            Self::SpecularB => "materialSpecularB",
            Self::Shininess => "materialShininess",
        }
    }
}

/// Channels that share a label and a uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialGroup {
    Diffuse,
    Specular,
    Shininess,
}

impl MaterialGroup {
    pub const ALL: [Self; 3] = [Self::Diffuse, Self::Specular, Self::Shininess];

    /// DOM id of the label element for this group.
    pub fn element_id(self) -> &'static str {
        match self {
            Self::Diffuse => "materialDiffuseLabel",
            Self::Specular => "materialSpecularLabel",
            Self::Shininess => "materialShininessLabel",
        }
    }
}
