//! Skeletal animation playback
//!
//! This module provides:
//! - Keyframe tracks with linear and step interpolation
//! - Animation clips evaluating per-bone local transforms
//! - A per-instance animator tracking the active clip and playback time
//! - Bone hierarchy transform computation
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use glam::{Mat4, Quat, Vec3};
//! use ossa_anim::animation::{AnimationClipBuilder, Animator};
//! use ossa_anim::skeleton::SkeletonBuilder;
//!
//! let mut skeleton = SkeletonBuilder::new();
//! let hip = skeleton.add_bone_with_bind_pose("hip", None, Mat4::IDENTITY)?;
//! skeleton.add_bone_with_bind_pose("knee", Some(hip), Mat4::from_translation(Vec3::NEG_Y))?;
//! let skeleton = Arc::new(skeleton.build()?);
//!
//! let swing = AnimationClipBuilder::new("swing")
//!     .bone(hip)
//!     .rotation_key(Quat::IDENTITY, 0.0)
//!     .rotation_key(Quat::from_rotation_x(0.5), 1.0)
//!     .build()?;
//!
//! let mut animator = Animator::with_clips(skeleton, [Arc::new(swing)])?;
//! animator.play_by_name("swing", true)?;
//! animator.update(0.25);
//!
//! let palette = animator.skin_matrices()?;
//! assert_eq!(palette.len(), 2);
//! # Ok::<(), ossa_anim::AnimationError>(())
//! ```

mod animator;
mod bone_transform;
mod builder;
mod clip;
mod interpolation;
mod state;
mod types;

pub use animator::{Animator, AnimatorOptions};
pub use bone_transform::{
    bind_pose_transforms, bone_position, compute_bone_transforms, compute_bone_transforms_into,
};
pub use builder::AnimationClipBuilder;
pub use clip::{AnimationClip, BoneTracks, LocalPose, SampleCache};
pub use interpolation::{Keyframe, KeyframeTrack, find_keyframe_index};
pub use state::{PlaybackState, advance_time};
pub use types::{Interpolation, Lerp, Transform};
