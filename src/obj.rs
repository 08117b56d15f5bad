use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ObjError;

/// Positions and 1-based triangle indices read from mesh text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjModel {
    pub positions: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}

impl ObjModel {
    /// Returns the face indices as one flat list, three entries per face.
    pub fn indices(&self) -> Vec<u32> {
        self.faces.iter().flatten().copied().collect()
    }

    /// Multiplies every position by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for position in &mut self.positions {
            *position *= factor;
        }
    }
}

/// Parses `v x y z` and `f i1 i2 i3` records out of mesh text.
///
/// Every other record type is skipped. Vertex components that are not
/// numbers become `NaN` and are carried through untouched. Face slots may use
/// the `v/vt/vn` form, in which case only the leading position index is
/// kept. Faces with anything other than three slots are rejected.
pub fn parse_obj(data: &str) -> Result<ObjModel, ObjError> {
    let mut model = ObjModel::default();

    for (line_no, line) in data.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => model.positions.push(parse_position(parts)),
            Some("f") => model.faces.push(parse_face(parts, line_no + 1)?),
            _ => {}
        }
    }

    Ok(model)
}

fn parse_position<'a>(mut parts: impl Iterator<Item = &'a str>) -> Vec3 {
    let mut component = || {
        parts
            .next()
            .and_then(|token| token.parse::<f32>().ok())
            .unwrap_or(f32::NAN)
    };
    let x = component();
    let y = component();
    let z = component();
    Vec3::new(x, y, z)
}

fn parse_face<'a>(parts: impl Iterator<Item = &'a str>, line: usize) -> Result<[u32; 3], ObjError> {
    let tokens: Vec<&str> = parts.collect();
    if tokens.len() != 3 {
        return Err(ObjError::FaceArity {
            line,
            found: tokens.len(),
        });
    }

    let mut face = [0u32; 3];
    for (slot, token) in face.iter_mut().zip(&tokens) {
        let position = token.split('/').next().unwrap_or_default();
        *slot = position
            .parse::<u32>()
            .map_err(|_| ObjError::InvalidFaceIndex {
                line,
                token: token.to_string(),
            })?;
    }
    Ok(face)
}
