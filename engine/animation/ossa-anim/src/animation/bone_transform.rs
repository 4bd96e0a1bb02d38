//! Bone hierarchy transform computation
//!
//! Resolves per-bone local transforms into model-space matrices by walking
//! the skeleton from its root, so every parent is resolved before its
//! children regardless of how the bone array is ordered.
//!
//! Matrices use glam's column-vector convention: "apply `A`, then `B`" is
//! `B * A`. A bone's model matrix is therefore `parent_model * local`, i.e.
//! the local transform is applied first and the parent chain after it.

use glam::{Mat4, Vec3};

use super::clip::LocalPose;
use crate::error::Result;
use crate::skeleton::Skeleton;

/// Local matrix for a bone: the posed transform if present, else the bind pose
fn local_matrix(skeleton: &Skeleton, pose: &LocalPose, bone: usize) -> Mat4 {
    match pose.get(bone) {
        Some(transform) => transform.to_matrix(),
        None => skeleton.bones()[bone].local_bind_transform,
    }
}

/// Compute model-space matrices for every bone
///
/// Bones absent from `pose` use their local bind transform, so an empty pose
/// yields the bind pose. The result is index-aligned with
/// `skeleton.bones()`. Fails with `CorruptSkeleton` if the parent links do
/// not form a tree.
pub fn compute_bone_transforms(skeleton: &Skeleton, pose: &LocalPose) -> Result<Vec<Mat4>> {
    let mut transforms = Vec::new();
    compute_bone_transforms_into(skeleton, pose, &mut transforms)?;
    Ok(transforms)
}

/// Like [`compute_bone_transforms`], writing into a reusable buffer
///
/// The buffer is resized to the bone count. On error its contents are
/// unspecified.
pub fn compute_bone_transforms_into(
    skeleton: &Skeleton,
    pose: &LocalPose,
    transforms: &mut Vec<Mat4>,
) -> Result<()> {
    let order = skeleton.traversal_order()?;

    transforms.clear();
    transforms.resize(skeleton.bone_count(), Mat4::IDENTITY);

    for &index in order {
        let local = local_matrix(skeleton, pose, index);
        transforms[index] = match skeleton.bones()[index].parent {
            Some(parent) => transforms[parent] * local,
            None => local,
        };
    }

    log::trace!(
        "Composed {} bone transforms ({} posed)",
        transforms.len(),
        pose.len()
    );

    Ok(())
}

/// Model-space bind pose of every bone
pub fn bind_pose_transforms(skeleton: &Skeleton) -> Result<Vec<Mat4>> {
    compute_bone_transforms(skeleton, &LocalPose::new())
}

/// Model-space position of a bone's origin
pub fn bone_position(transform: &Mat4) -> Vec3 {
    transform.w_axis.truncate()
}
