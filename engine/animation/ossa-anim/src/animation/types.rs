//! Common types for the animation system

use glam::{Mat4, Quat, Vec3};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Trait for keyframe values that can be interpolated between two samples
pub trait Lerp: Copy {
    /// Interpolate between self and other by `t` in `[0, 1]`
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::lerp(*self, *other, t)
    }
}

impl Lerp for Quat {
    /// Shortest-path spherical interpolation.
    ///
    /// Keys on opposite hemispheres are flipped before interpolating so the
    /// result never travels the long way around.
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let end = if self.dot(*other) < 0.0 { -*other } else { *other };
        self.slerp(end, t).normalize()
    }
}

/// How values are produced between two keyframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum Interpolation {
    /// Hold the earlier key until the next key is reached
    Step,
    /// Linear for vectors, spherical for rotations
    #[default]
    Linear,
}

/// Decomposed local transform of a bone
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// No translation, no rotation, unit scale
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Build the local matrix: scale, then rotate, then translate
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decompose an affine matrix back into translation, rotation and scale
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.to_matrix()
    }
}
