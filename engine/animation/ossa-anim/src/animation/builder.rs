//! Fluent construction of animation clips

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use super::clip::{AnimationClip, BoneTracks};
use super::interpolation::{Keyframe, KeyframeTrack};
use super::types::Interpolation;
use crate::error::{AnimationError, Result};

#[derive(Debug, Default)]
struct ChannelKeys {
    translation: Vec<Keyframe<Vec3>>,
    rotation: Vec<Keyframe<Quat>>,
    scale: Vec<Keyframe<Vec3>>,
}

impl ChannelKeys {
    fn is_empty(&self) -> bool {
        self.translation.is_empty() && self.rotation.is_empty() && self.scale.is_empty()
    }
}

/// Builder for [`AnimationClip`]
///
/// Keys are added to the currently selected bone (bone 0 until
/// [`bone`](Self::bone) is called). Within one channel keys must be added in
/// ascending time order; violations are reported by [`build`](Self::build).
///
/// ```
/// use glam::{Quat, Vec3};
/// use ossa_anim::animation::AnimationClipBuilder;
///
/// let clip = AnimationClipBuilder::new("bounce")
///     .translation_key(Vec3::ZERO, 0.0)
///     .translation_key(Vec3::new(0.0, -2.0, 0.0), 3.0)
///     .translation_key(Vec3::ZERO, 5.0)
///     .rotation_key(Quat::IDENTITY, 0.0)
///     .scale_key(Vec3::ONE, 0.0)
///     .build()?;
///
/// assert_eq!(clip.duration(), 5.0);
/// # Ok::<(), ossa_anim::AnimationError>(())
/// ```
#[derive(Debug)]
pub struct AnimationClipBuilder {
    name: String,
    duration: Option<f32>,
    interpolation: Interpolation,
    current_bone: usize,
    channels: BTreeMap<usize, ChannelKeys>,
}

impl AnimationClipBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: None,
            interpolation: Interpolation::Linear,
            current_bone: 0,
            channels: BTreeMap::new(),
        }
    }

    /// Builder for a clip that animates a single transform (bone 0)
    pub fn single_bone(name: impl Into<String>) -> Self {
        Self::new(name).bone(0)
    }

    /// Select the bone subsequent keys are added to
    ///
    /// Selecting a bone without keying it leaves it on its bind pose.
    pub fn bone(mut self, bone: usize) -> Self {
        self.current_bone = bone;
        self
    }

    /// Override the duration instead of using the last key time
    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Interpolation mode for every track of the clip
    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn translation_key(mut self, value: Vec3, time: f32) -> Self {
        self.current_channels()
            .translation
            .push(Keyframe::new(time, value));
        self
    }

    pub fn rotation_key(mut self, value: Quat, time: f32) -> Self {
        self.current_channels()
            .rotation
            .push(Keyframe::new(time, value.normalize()));
        self
    }

    pub fn scale_key(mut self, value: Vec3, time: f32) -> Self {
        self.current_channels().scale.push(Keyframe::new(time, value));
        self
    }

    fn current_channels(&mut self) -> &mut ChannelKeys {
        self.channels.entry(self.current_bone).or_default()
    }

    pub fn build(self) -> Result<AnimationClip> {
        let mut tracks = Vec::with_capacity(self.channels.len());

        for (bone, keys) in self.channels {
            if keys.is_empty() {
                continue;
            }

            let with_bone = |e: AnimationError| match e {
                AnimationError::InvalidKeyframes(msg) => {
                    AnimationError::InvalidKeyframes(format!("bone {}: {}", bone, msg))
                }
                other => other,
            };

            tracks.push(BoneTracks {
                bone,
                translation: KeyframeTrack::with_interpolation(keys.translation, self.interpolation)
                    .map_err(with_bone)?,
                rotation: KeyframeTrack::with_interpolation(keys.rotation, self.interpolation)
                    .map_err(with_bone)?,
                scale: KeyframeTrack::with_interpolation(keys.scale, self.interpolation)
                    .map_err(with_bone)?,
            });
        }

        let clip = match self.duration {
            Some(duration) => AnimationClip::with_duration(self.name, duration, tracks)?,
            None => AnimationClip::new(self.name, tracks)?,
        };

        log::debug!(
            "Built clip '{}': {} animated bones, {:.3}s",
            clip.name(),
            clip.tracks().len(),
            clip.duration()
        );

        Ok(clip)
    }
}
