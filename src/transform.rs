//! Model, view and projection matrices for the demos.
//!
//! Matrices follow the column-vector convention: in `a * b` the transform `b`
//! is applied to a point first.

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Builds a rotation from per-axis angles in degrees, applied X then Y then Z.
pub fn rotation_from_degrees(degrees: Vec3) -> Mat4 {
    Mat4::from_rotation_z(degrees.z.to_radians())
        * Mat4::from_rotation_y(degrees.y.to_radians())
        * Mat4::from_rotation_x(degrees.x.to_radians())
}

/// A placement kept as a separate translation and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: Mat4,
    pub rotation: Mat4,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        translation: Mat4::IDENTITY,
        rotation: Mat4::IDENTITY,
    };

    pub fn new(position: Vec3, rotation_degrees: Vec3) -> Self {
        Self {
            translation: Mat4::from_translation(position),
            rotation: rotation_from_degrees(rotation_degrees),
        }
    }

    /// Rotates first, then translates.
    pub fn matrix(&self) -> Mat4 {
        self.translation * self.rotation
    }

    /// Composes a world-space turn onto the current rotation: `yaw` degrees
    /// about Y, then `pitch` degrees about X, both applied after the
    /// existing rotation.
    pub fn turn(&mut self, yaw_degrees: f32, pitch_degrees: f32) {
        self.rotation = Mat4::from_rotation_y(yaw_degrees.to_radians()) * self.rotation;
        self.rotation = Mat4::from_rotation_x(pitch_degrees.to_radians()) * self.rotation;
    }
}

/// Every independently mutable transform of a demo.
///
/// `parent` wraps `local`, so turning the parent rotates the mesh about the
/// parent's origin instead of the mesh's own.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformState {
    pub parent: Pose,
    pub local: Pose,
    pub camera: Pose,
}

impl TransformState {
    pub fn model(&self) -> Mat4 {
        self.parent.matrix() * self.local.matrix()
    }

    pub fn view(&self) -> Mat4 {
        self.camera.matrix().inverse()
    }
}

/// Perspective parameters. The field of view is vertical, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 90.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

impl Projection {
    /// Right-handed perspective with depth mapped to `0..1`.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            aspect.max(0.01),
            self.near,
            self.far,
        )
    }
}

/// The three matrices handed to the backend each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl FrameMatrices {
    /// Transforms an object-space point all the way to clip space.
    pub fn clip_position(&self, point: Vec3) -> Vec4 {
        self.projection * self.view * self.model * point.extend(1.0)
    }

    pub fn model_cols(&self) -> [f32; 16] {
        self.model.to_cols_array()
    }

    pub fn view_cols(&self) -> [f32; 16] {
        self.view.to_cols_array()
    }

    pub fn projection_cols(&self) -> [f32; 16] {
        self.projection.to_cols_array()
    }
}

/// Recomputes the frame matrices from a [`TransformState`].
///
/// The projection is built once and only rebuilt when the aspect ratio
/// changes. Model and view are rebuilt on every call.
#[derive(Debug, Clone)]
pub struct TransformComposer {
    projection: Projection,
    aspect: f32,
    matrix: Mat4,
}

impl TransformComposer {
    pub fn new(projection: Projection, aspect: f32) -> Self {
        Self {
            projection,
            aspect,
            matrix: projection.matrix(aspect),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if (aspect - self.aspect).abs() > f32::EPSILON {
            self.aspect = aspect;
            self.matrix = self.projection.matrix(aspect);
        }
    }

    pub fn compose(&self, state: &TransformState) -> FrameMatrices {
        FrameMatrices {
            model: state.model(),
            view: state.view(),
            projection: self.matrix,
        }
    }
}

/// Width over height, treating a zero height as square.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}
