//! Skeletal animation core
//!
//! Keyframed clips are evaluated by an [`Animator`] into local bone
//! transforms, composed through a [`Skeleton`] into model-space matrices and
//! combined with inverse bind poses into a skinning [`MatrixPalette`].
//! Skeletons and clips are immutable once built and are shared between
//! animators through `Arc`.

pub mod animation;
pub mod debug_draw;
pub mod error;
pub mod skeleton;
pub mod skinning;

// Re-export common types
pub use animation::{AnimationClip, AnimationClipBuilder, Animator, AnimatorOptions, Transform};
pub use debug_draw::{DebugDraw, SkeletonDrawStyle, draw_skeleton};
pub use error::{AnimationError, Result};
pub use skeleton::{Bone, Skeleton, SkeletonBuilder};
pub use skinning::{MatrixPalette, SkinningOptions, apply_bone_offsets};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
