//! Skeleton visualization for debug overlays
//!
//! The immediate-mode drawer lives outside this crate; it implements
//! [`DebugDraw`] and receives one line per parent/child pair plus a joint
//! marker per non-root bone. Drawing reads model-space bone matrices (no
//! skinning offsets) and never touches animation state.

use glam::{Mat4, Vec3};

use crate::animation::bone_position;
use crate::error::{AnimationError, Result};
use crate::skeleton::Skeleton;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Linear RGBA color
pub type Color = [f32; 4];

/// Receiver for debug primitives
pub trait DebugDraw {
    fn add_line(&mut self, from: Vec3, to: Vec3, color: Color);
    fn add_sphere(&mut self, center: Vec3, radius: f32, color: Color);
}

/// Colors and sizes used by [`draw_skeleton`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct SkeletonDrawStyle {
    pub bone_color: Color,
    pub joint_color: Color,
    pub joint_radius: f32,
}

impl SkeletonDrawStyle {
    pub const ORANGE: Color = [1.0, 0.647, 0.0, 1.0];
    pub const RED: Color = [1.0, 0.0, 0.0, 1.0];
}

impl Default for SkeletonDrawStyle {
    fn default() -> Self {
        Self {
            bone_color: Self::ORANGE,
            joint_color: Self::RED,
            joint_radius: 0.02,
        }
    }
}

/// Line from a bone to its parent, in model space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneSegment {
    pub bone: usize,
    pub parent: usize,
    pub bone_position: Vec3,
    pub parent_position: Vec3,
}

/// Segments for every non-root bone, in bone index order
pub fn skeleton_segments(skeleton: &Skeleton, bone_matrices: &[Mat4]) -> Result<Vec<BoneSegment>> {
    if bone_matrices.len() != skeleton.bone_count() {
        return Err(AnimationError::BoneCountMismatch {
            expected: skeleton.bone_count(),
            actual: bone_matrices.len(),
        });
    }

    Ok(skeleton
        .bones()
        .iter()
        .filter_map(|bone| {
            bone.parent.map(|parent| BoneSegment {
                bone: bone.index,
                parent,
                bone_position: bone_position(&bone_matrices[bone.index]),
                parent_position: bone_position(&bone_matrices[parent]),
            })
        })
        .collect())
}

/// Emit the skeleton to a debug drawer
pub fn draw_skeleton<D: DebugDraw + ?Sized>(
    skeleton: &Skeleton,
    bone_matrices: &[Mat4],
    style: &SkeletonDrawStyle,
    sink: &mut D,
) -> Result<()> {
    for segment in skeleton_segments(skeleton, bone_matrices)? {
        sink.add_line(segment.bone_position, segment.parent_position, style.bone_color);
        sink.add_sphere(segment.bone_position, style.joint_radius, style.joint_color);
    }
    Ok(())
}
