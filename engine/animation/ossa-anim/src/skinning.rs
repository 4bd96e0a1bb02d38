//! Skinning matrix palette
//!
//! Combines resolved bone matrices with each bone's inverse bind pose to
//! produce the palette consumed by GPU skinning, and provides a CPU
//! reference implementation of four-influence vertex skinning.
//!
//! # Example
//!
//! ```rust
//! use glam::{Mat4, Vec3};
//! use ossa_anim::animation::bind_pose_transforms;
//! use ossa_anim::skeleton::SkeletonBuilder;
//! use ossa_anim::skinning::apply_bone_offsets;
//!
//! let mut builder = SkeletonBuilder::new();
//! builder.add_bone_with_bind_pose("root", None, Mat4::from_translation(Vec3::Y))?;
//! let skeleton = builder.build()?;
//!
//! let bone_matrices = bind_pose_transforms(&skeleton)?;
//! let palette = apply_bone_offsets(&skeleton, &bone_matrices)?;
//!
//! // In the bind pose every skin matrix is the identity
//! assert!(palette[0].abs_diff_eq(Mat4::IDENTITY, 1e-5));
//! # Ok::<(), ossa_anim::AnimationError>(())
//! ```

use std::ops::Deref;

use glam::{Mat4, Vec3};

use crate::error::{AnimationError, Result};
use crate::skeleton::Skeleton;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Combine bone matrices with the skeleton's inverse bind poses
///
/// `palette[i]` applies `inverse_bind_pose[i]` first and then
/// `bone_matrices[i]`, taking a bind-pose vertex into the animated pose of
/// bone `i`.
pub fn apply_bone_offsets(skeleton: &Skeleton, bone_matrices: &[Mat4]) -> Result<MatrixPalette> {
    let mut palette = MatrixPalette::default();
    apply_bone_offsets_into(skeleton, bone_matrices, &mut palette)?;
    Ok(palette)
}

/// Like [`apply_bone_offsets`], writing into an existing palette
pub fn apply_bone_offsets_into(
    skeleton: &Skeleton,
    bone_matrices: &[Mat4],
    palette: &mut MatrixPalette,
) -> Result<()> {
    if bone_matrices.len() != skeleton.bone_count() {
        return Err(AnimationError::BoneCountMismatch {
            expected: skeleton.bone_count(),
            actual: bone_matrices.len(),
        });
    }

    palette.matrices.clear();
    palette.matrices.extend(
        skeleton
            .bones()
            .iter()
            .zip(bone_matrices)
            .map(|(bone, matrix)| *matrix * bone.inverse_bind_pose),
    );

    Ok(())
}

/// Final skin matrices, index-aligned with the skeleton's bones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixPalette {
    matrices: Vec<Mat4>,
}

impl MatrixPalette {
    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn into_matrices(self) -> Vec<Mat4> {
        self.matrices
    }

    /// Get all matrices as a flat column-major array for GPU upload
    ///
    /// Each bone contributes 16 floats.
    pub fn as_floats(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.matrices.len() * 16);
        for matrix in &self.matrices {
            data.extend_from_slice(&matrix.to_cols_array());
        }
        data
    }

    /// Get all matrices as 4x3 (last row stripped), 12 floats per bone
    pub fn as_4x3(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.matrices.len() * 12);
        for matrix in &self.matrices {
            for column in [matrix.x_axis, matrix.y_axis, matrix.z_axis, matrix.w_axis] {
                data.extend_from_slice(&column.truncate().to_array());
            }
        }
        data
    }
}

impl Deref for MatrixPalette {
    type Target = [Mat4];

    fn deref(&self) -> &Self::Target {
        &self.matrices
    }
}

impl From<Vec<Mat4>> for MatrixPalette {
    fn from(matrices: Vec<Mat4>) -> Self {
        Self { matrices }
    }
}

/// Options for CPU vertex skinning
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct SkinningOptions {
    /// Whether to normalize bone weights automatically
    /// When true, the contributing weights are rescaled to sum to 1.0
    pub normalize_weights: bool,
    /// Minimum weight threshold - weights below this are ignored
    pub weight_threshold: f32,
}

impl Default for SkinningOptions {
    fn default() -> Self {
        Self {
            normalize_weights: true,
            weight_threshold: 0.001,
        }
    }
}

/// Transform a bind-pose position by up to four weighted bone influences
///
/// Influences below the weight threshold or pointing past the palette are
/// skipped. If nothing contributes, the input position is returned.
pub fn skin_position(
    palette: &[Mat4],
    position: Vec3,
    bone_indices: [u16; 4],
    bone_weights: [f32; 4],
    options: &SkinningOptions,
) -> Vec3 {
    let mut final_position = Vec3::ZERO;
    let mut total_weight = 0.0f32;

    for (&index, &weight) in bone_indices.iter().zip(bone_weights.iter()) {
        if weight < options.weight_threshold {
            continue;
        }

        let Some(matrix) = palette.get(index as usize) else {
            log::trace!("Skipping influence of unknown bone {}", index);
            continue;
        };

        final_position += matrix.transform_point3(position) * weight;
        total_weight += weight;
    }

    // If no valid bones influenced this vertex, return original position
    if total_weight < options.weight_threshold {
        return position;
    }

    if options.normalize_weights {
        final_position /= total_weight;
    }

    final_position
}
