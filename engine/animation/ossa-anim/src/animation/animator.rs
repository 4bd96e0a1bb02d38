//! Per-instance clip playback
//!
//! An [`Animator`] holds the clips available to one skinned model instance
//! and the playback state for the clip currently driving it. Skeletons and
//! clips are shared, immutable assets; animator state never is.

use std::sync::Arc;

use glam::Mat4;

use super::bone_transform::compute_bone_transforms_into;
use super::clip::{AnimationClip, LocalPose, SampleCache};
use super::state::{PlaybackState, advance_time};
use crate::error::{AnimationError, Result};
use crate::skeleton::Skeleton;
use crate::skinning::{MatrixPalette, apply_bone_offsets_into};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Options for controlling animator behavior
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct AnimatorOptions {
    /// Initial playback speed multiplier
    pub speed: f32,
    /// Reject clips that reference bones the skeleton does not have
    pub validate_clip_bones: bool,
    /// Reuse keyframe brackets between frames instead of searching each time
    pub use_sample_cache: bool,
}

impl Default for AnimatorOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            validate_clip_bones: true,
            use_sample_cache: true,
        }
    }
}

fn check_speed(speed: f32) -> Result<()> {
    if speed.is_finite() && speed >= 0.0 {
        Ok(())
    } else {
        Err(AnimationError::InvalidArgument(format!(
            "playback speed must be finite and non-negative, got {}",
            speed
        )))
    }
}

/// Clip playback state machine for one skinned model instance
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use glam::{Mat4, Vec3};
/// use ossa_anim::animation::{AnimationClipBuilder, Animator};
/// use ossa_anim::skeleton::SkeletonBuilder;
///
/// let mut builder = SkeletonBuilder::new();
/// builder.add_bone_with_bind_pose("root", None, Mat4::IDENTITY)?;
/// let skeleton = Arc::new(builder.build()?);
///
/// let clip = AnimationClipBuilder::new("slide")
///     .translation_key(Vec3::ZERO, 0.0)
///     .translation_key(Vec3::X, 1.0)
///     .build()?;
///
/// let mut animator = Animator::new(skeleton);
/// let walk = animator.add_clip(Arc::new(clip))?;
/// animator.play_animation(Some(walk), true)?;
/// animator.update(0.5);
///
/// let bones = animator.bone_transforms()?;
/// assert!((bones[0].w_axis.x - 0.5).abs() < 1e-5);
/// # Ok::<(), ossa_anim::AnimationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Animator {
    skeleton: Arc<Skeleton>,
    clips: Vec<Arc<AnimationClip>>,
    state: PlaybackState,
    /// Seconds into the active clip
    playback_time: f32,
    looping: bool,
    speed: f32,
    options: AnimatorOptions,
    /// Local transforms of the active clip at `playback_time`
    pose: LocalPose,
    cache: SampleCache,
}

impl Animator {
    /// Create a stopped animator with no clips
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        Self {
            speed: 1.0,
            skeleton,
            clips: Vec::new(),
            state: PlaybackState::Stopped,
            playback_time: 0.0,
            looping: false,
            options: AnimatorOptions::default(),
            pose: LocalPose::new(),
            cache: SampleCache::new(),
        }
    }

    pub fn with_options(skeleton: Arc<Skeleton>, options: AnimatorOptions) -> Result<Self> {
        check_speed(options.speed)?;
        Ok(Self {
            speed: options.speed,
            options,
            ..Self::new(skeleton)
        })
    }

    /// Create an animator and register `clips` in order
    pub fn with_clips(
        skeleton: Arc<Skeleton>,
        clips: impl IntoIterator<Item = Arc<AnimationClip>>,
    ) -> Result<Self> {
        let mut animator = Self::new(skeleton);
        for clip in clips {
            animator.add_clip(clip)?;
        }
        Ok(animator)
    }

    /// Register a clip and return its index
    pub fn add_clip(&mut self, clip: Arc<AnimationClip>) -> Result<usize> {
        if self.options.validate_clip_bones {
            if let Some(bone) = clip.max_bone_index() {
                if bone >= self.skeleton.bone_count() {
                    return Err(AnimationError::InvalidArgument(format!(
                        "clip '{}' animates bone {} but the skeleton has {} bones",
                        clip.name(),
                        bone,
                        self.skeleton.bone_count()
                    )));
                }
            }
        }

        log::debug!(
            "Registered clip '{}' ({:.3}s) at index {}",
            clip.name(),
            clip.duration(),
            self.clips.len()
        );
        self.clips.push(clip);
        Ok(self.clips.len() - 1)
    }

    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    /// Get number of clips
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn clips(&self) -> &[Arc<AnimationClip>] {
        &self.clips
    }

    pub fn clip(&self, index: usize) -> Option<&Arc<AnimationClip>> {
        self.clips.get(index)
    }

    /// Index of the first clip with the given name
    pub fn find_clip(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name() == name)
    }

    /// Start a clip from the beginning, or stop with `None`
    ///
    /// An out-of-range index fails and leaves the current playback untouched.
    pub fn play_animation(&mut self, clip_index: Option<usize>, looping: bool) -> Result<()> {
        let Some(index) = clip_index else {
            self.stop();
            return Ok(());
        };

        if index >= self.clips.len() {
            return Err(AnimationError::InvalidClipIndex {
                index,
                count: self.clips.len(),
            });
        }

        self.state = PlaybackState::Playing { clip_index: index };
        self.playback_time = 0.0;
        self.looping = looping;
        self.cache.reset();
        self.refresh_pose();

        log::debug!(
            "Playing clip '{}' (looping: {})",
            self.clips[index].name(),
            looping
        );
        Ok(())
    }

    /// Start the first clip with the given name
    pub fn play_by_name(&mut self, name: &str, looping: bool) -> Result<()> {
        let index = self.find_clip(name).ok_or_else(|| {
            AnimationError::InvalidArgument(format!("no clip named '{}'", name))
        })?;
        self.play_animation(Some(index), looping)
    }

    /// Return to the bind pose
    pub fn stop(&mut self) {
        if self.state.is_playing() {
            log::debug!("Stopping playback at {:.3}s", self.playback_time);
        }
        self.state = PlaybackState::Stopped;
        self.playback_time = 0.0;
        self.pose.clear();
        self.cache.reset();
    }

    /// Advance playback by `delta_time` seconds scaled by the speed
    ///
    /// Looping clips wrap however far the step overshoots; one-shot clips
    /// hold their last frame. Negative or non-finite deltas are ignored.
    pub fn update(&mut self, delta_time: f32) {
        let Some(duration) = self.active_clip().map(|c| c.duration()) else {
            return;
        };

        if !delta_time.is_finite() || delta_time < 0.0 {
            log::warn!("Ignoring invalid animation delta time {}", delta_time);
            return;
        }

        self.playback_time = advance_time(
            self.playback_time,
            f64::from(delta_time) * f64::from(self.speed),
            duration,
            self.looping,
        );
        self.refresh_pose();

        log::trace!("Playback time {:.4}/{:.4}", self.playback_time, duration);
    }

    fn refresh_pose(&mut self) {
        let PlaybackState::Playing { clip_index } = self.state else {
            self.pose.clear();
            return;
        };

        let clip = &self.clips[clip_index];
        if clip.duration() <= 0.0 {
            // Nothing to sample; render the bind pose
            self.pose.clear();
        } else if self.options.use_sample_cache {
            clip.evaluate_into(self.playback_time, &mut self.cache, &mut self.pose);
        } else {
            self.pose = clip.evaluate(self.playback_time);
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn active_clip_index(&self) -> Option<usize> {
        self.state.clip_index()
    }

    pub fn active_clip(&self) -> Option<&Arc<AnimationClip>> {
        self.state.clip_index().and_then(|i| self.clips.get(i))
    }

    /// Seconds into the active clip
    pub fn playback_time(&self) -> f32 {
        self.playback_time
    }

    /// Playback position as a fraction of the clip duration
    pub fn normalized_time(&self) -> f32 {
        match self.active_clip() {
            Some(clip) if clip.duration() > 0.0 => self.playback_time / clip.duration(),
            _ => 0.0,
        }
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        check_speed(speed)?;
        self.speed = speed;
        Ok(())
    }

    /// One-shot playback holding its final frame
    pub fn is_finished(&self) -> bool {
        !self.looping
            && self
                .active_clip()
                .is_some_and(|c| self.playback_time >= c.duration())
    }

    /// Local transforms of the animated bones at the current time
    ///
    /// Empty when stopped or when the clip has zero duration, meaning every
    /// bone uses its bind pose.
    pub fn local_transforms(&self) -> &LocalPose {
        &self.pose
    }

    /// Model-space bone matrices for the current pose
    pub fn bone_transforms(&self) -> Result<Vec<Mat4>> {
        let mut transforms = Vec::with_capacity(self.skeleton.bone_count());
        self.bone_transforms_into(&mut transforms)?;
        Ok(transforms)
    }

    pub fn bone_transforms_into(&self, transforms: &mut Vec<Mat4>) -> Result<()> {
        compute_bone_transforms_into(&self.skeleton, &self.pose, transforms)
    }

    /// Skinning palette for the current pose
    pub fn skin_matrices(&self) -> Result<MatrixPalette> {
        let mut palette = MatrixPalette::default();
        self.skin_matrices_into(&mut Vec::new(), &mut palette)?;
        Ok(palette)
    }

    /// Compute bone matrices into `scratch` and the palette into `palette`
    pub fn skin_matrices_into(
        &self,
        scratch: &mut Vec<Mat4>,
        palette: &mut MatrixPalette,
    ) -> Result<()> {
        self.bone_transforms_into(scratch)?;
        apply_bone_offsets_into(&self.skeleton, scratch, palette)
    }
}
