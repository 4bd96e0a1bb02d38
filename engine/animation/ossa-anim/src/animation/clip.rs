//! Animation clips: per-bone track triples and their evaluation

use std::collections::HashMap;

use glam::{Quat, Vec3};

use super::interpolation::KeyframeTrack;
use super::types::Transform;
use crate::error::{AnimationError, Result};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Translation, rotation and scale tracks for one bone
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct BoneTracks {
    /// Index of the animated bone in its skeleton
    pub bone: usize,
    pub translation: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<Vec3>,
}

impl BoneTracks {
    pub fn new(bone: usize) -> Self {
        Self {
            bone,
            ..Self::default()
        }
    }

    /// Last key time over all three channels
    pub fn end_time(&self) -> f32 {
        self.translation
            .end_time()
            .max(self.rotation.end_time())
            .max(self.scale.end_time())
    }

    /// Sample all channels, substituting identity values for empty tracks
    pub fn sample(&self, time: f32) -> Transform {
        Transform {
            translation: self.translation.sample(time, Vec3::ZERO),
            rotation: self.rotation.sample(time, Quat::IDENTITY),
            scale: self.scale.sample(time, Vec3::ONE),
        }
    }

    fn sample_with_hints(&self, time: f32, hints: &mut [usize; 3]) -> Transform {
        let [t, r, s] = hints;
        Transform {
            translation: self.translation.sample_with_hint(time, Vec3::ZERO, t),
            rotation: self.rotation.sample_with_hint(time, Quat::IDENTITY, r),
            scale: self.scale.sample_with_hint(time, Vec3::ONE, s),
        }
    }
}

/// Local transforms keyed by bone index
///
/// Bones missing from the pose are resolved from the skeleton's bind pose.
/// An empty pose therefore means "bind pose".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalPose {
    transforms: HashMap<usize, Transform>,
}

impl LocalPose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transforms: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, bone: usize, transform: Transform) -> Option<Transform> {
        self.transforms.insert(bone, transform)
    }

    pub fn get(&self, bone: usize) -> Option<&Transform> {
        self.transforms.get(&bone)
    }

    pub fn contains(&self, bone: usize) -> bool {
        self.transforms.contains_key(&bone)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn clear(&mut self) {
        self.transforms.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Transform)> {
        self.transforms.iter().map(|(&bone, t)| (bone, t))
    }
}

impl FromIterator<(usize, Transform)> for LocalPose {
    fn from_iter<I: IntoIterator<Item = (usize, Transform)>>(iter: I) -> Self {
        Self {
            transforms: iter.into_iter().collect(),
        }
    }
}

/// Per-channel bracket hints for sequential clip sampling
///
/// Hints are positional: entry `i` belongs to the `i`th track triple of the
/// clip the cache was last used with. Reset it when switching clips.
#[derive(Debug, Clone, Default)]
pub struct SampleCache {
    hints: Vec<[usize; 3]>,
}

impl SampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.hints.clear();
    }
}

/// A named, finite set of keyframe tracks
///
/// Immutable after construction. Share it between animators with `Arc`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(Serialize, Deserialize),
    serde(try_from = "ClipData", into = "ClipData")
)]
pub struct AnimationClip {
    name: String,
    duration: f32,
    /// Sorted by bone index, one entry per bone
    tracks: Vec<BoneTracks>,
}

impl AnimationClip {
    /// Create a clip whose duration is the last key time over all tracks
    pub fn new(name: impl Into<String>, tracks: Vec<BoneTracks>) -> Result<Self> {
        let duration = tracks.iter().map(BoneTracks::end_time).fold(0.0, f32::max);
        Self::with_duration(name, duration, tracks)
    }

    /// Create a clip with an explicitly authored duration
    pub fn with_duration(
        name: impl Into<String>,
        duration: f32,
        mut tracks: Vec<BoneTracks>,
    ) -> Result<Self> {
        let name = name.into();
        if !duration.is_finite() || duration < 0.0 {
            return Err(AnimationError::InvalidArgument(format!(
                "clip '{}' has invalid duration {}",
                name, duration
            )));
        }

        tracks.sort_by_key(|t| t.bone);
        if let Some(pair) = tracks.windows(2).find(|pair| pair[0].bone == pair[1].bone) {
            return Err(AnimationError::InvalidArgument(format!(
                "clip '{}' has more than one track set for bone {}",
                name, pair[0].bone
            )));
        }

        Ok(Self {
            name,
            duration,
            tracks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn tracks(&self) -> &[BoneTracks] {
        &self.tracks
    }

    /// Track triple for a bone, if the clip animates it
    pub fn bone_tracks(&self, bone: usize) -> Option<&BoneTracks> {
        self.tracks
            .binary_search_by_key(&bone, |t| t.bone)
            .ok()
            .map(|i| &self.tracks[i])
    }

    /// Highest bone index referenced by this clip
    pub fn max_bone_index(&self) -> Option<usize> {
        self.tracks.last().map(|t| t.bone)
    }

    /// Sample every animated bone at `time`
    ///
    /// The clip never wraps; `time` is expected in `[0, duration]` and
    /// anything outside clamps per track.
    pub fn evaluate(&self, time: f32) -> LocalPose {
        self.tracks
            .iter()
            .map(|tracks| (tracks.bone, tracks.sample(time)))
            .collect()
    }

    /// Like [`evaluate`](Self::evaluate), reusing `pose` and the bracket
    /// hints in `cache`
    pub fn evaluate_into(&self, time: f32, cache: &mut SampleCache, pose: &mut LocalPose) {
        if cache.hints.len() != self.tracks.len() {
            cache.hints.clear();
            cache.hints.resize(self.tracks.len(), [0; 3]);
        }

        pose.clear();
        for (tracks, hints) in self.tracks.iter().zip(cache.hints.iter_mut()) {
            pose.insert(tracks.bone, tracks.sample_with_hints(time, hints));
        }
    }
}

/// Serialized form of a clip, validated on load
#[cfg(feature = "serde-support")]
#[derive(Serialize, Deserialize)]
struct ClipData {
    name: String,
    duration: f32,
    tracks: Vec<BoneTracks>,
}

#[cfg(feature = "serde-support")]
impl TryFrom<ClipData> for AnimationClip {
    type Error = AnimationError;

    fn try_from(data: ClipData) -> Result<Self> {
        Self::with_duration(data.name, data.duration, data.tracks)
    }
}

#[cfg(feature = "serde-support")]
impl From<AnimationClip> for ClipData {
    fn from(clip: AnimationClip) -> Self {
        Self {
            name: clip.name,
            duration: clip.duration,
            tracks: clip.tracks,
        }
    }
}
