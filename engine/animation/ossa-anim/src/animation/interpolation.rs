//! Keyframe tracks and their interpolation

use super::types::{Interpolation, Lerp};
use crate::error::{AnimationError, Result};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// A timestamped sample of one transform channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Keyframe<T> {
    /// Time in seconds
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub const fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Find the index of the keyframe at or before the given time
///
/// Returns None if there are no keyframes. For interpolation, this returns the
/// index of the earlier keyframe in the bracketing pair, so the caller
/// interpolates between `[index]` and `[index + 1]`. Times before the first
/// key map to 0, times at or after the last key map to the last index.
pub fn find_keyframe_index<T>(keys: &[Keyframe<T>], time: f32) -> Option<usize> {
    if keys.is_empty() {
        return None;
    }

    let last_index = keys.len() - 1;
    if time >= keys[last_index].time {
        return Some(last_index);
    }

    // Largest index with keys[index].time <= time
    let upper = keys.partition_point(|k| k.time <= time);
    Some(upper.saturating_sub(1))
}

/// Ordered keyframes for a single channel of a single bone
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(Serialize, Deserialize),
    serde(
        try_from = "TrackData<T>",
        bound(deserialize = "T: Lerp + Deserialize<'de>")
    )
)]
pub struct KeyframeTrack<T> {
    keys: Vec<Keyframe<T>>,
    interpolation: Interpolation,
}

/// Serialized form of a track, validated on load
#[cfg(feature = "serde-support")]
#[derive(Deserialize)]
struct TrackData<T> {
    keys: Vec<Keyframe<T>>,
    interpolation: Interpolation,
}

#[cfg(feature = "serde-support")]
impl<T: Lerp> TryFrom<TrackData<T>> for KeyframeTrack<T> {
    type Error = AnimationError;

    fn try_from(data: TrackData<T>) -> Result<Self> {
        Self::with_interpolation(data.keys, data.interpolation)
    }
}

impl<T: Lerp> KeyframeTrack<T> {
    /// Create a linearly interpolated track
    ///
    /// Key times must be finite, non-negative and strictly ascending.
    pub fn new(keys: Vec<Keyframe<T>>) -> Result<Self> {
        Self::with_interpolation(keys, Interpolation::Linear)
    }

    pub fn with_interpolation(keys: Vec<Keyframe<T>>, interpolation: Interpolation) -> Result<Self> {
        validate_key_times(&keys)?;
        Ok(Self {
            keys,
            interpolation,
        })
    }

    /// A track with no keys; sampling returns the channel default
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            interpolation: Interpolation::Linear,
        }
    }

    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Time of the last key, or 0 for an empty track
    pub fn end_time(&self) -> f32 {
        self.keys.last().map_or(0.0, |k| k.time)
    }

    /// Sample the track at `time`, clamping outside the key range
    ///
    /// `default` is returned for an empty track.
    pub fn sample(&self, time: f32, default: T) -> T {
        match find_keyframe_index(&self.keys, time) {
            Some(index) => self.sample_at(index, time),
            None => default,
        }
    }

    /// Sample using a cached bracket index
    ///
    /// The hint is checked against `time` before use; if it no longer
    /// brackets the query the following bracket is tried (the common case
    /// for forward playback), then a binary search. The hint is updated to the
    /// bracket that was used.
    pub fn sample_with_hint(&self, time: f32, default: T, hint: &mut usize) -> T {
        if self.keys.is_empty() {
            return default;
        }

        let index = if self.brackets(*hint, time) {
            *hint
        } else if self.brackets(hint.saturating_add(1), time) {
            *hint + 1
        } else {
            find_keyframe_index(&self.keys, time).unwrap_or(0)
        };

        *hint = index;
        self.sample_at(index, time)
    }

    /// Whether `index` is the correct bracket for `time`
    fn brackets(&self, index: usize, time: f32) -> bool {
        let Some(key) = self.keys.get(index) else {
            return false;
        };

        match self.keys.get(index + 1) {
            // Before the first key only index 0 is valid
            Some(next) if index == 0 => time < next.time,
            Some(next) => key.time <= time && time < next.time,
            None => time >= key.time,
        }
    }

    fn sample_at(&self, index: usize, time: f32) -> T {
        let first = &self.keys[index];

        // At or past last keyframe, or before the first one
        let Some(second) = self.keys.get(index + 1) else {
            return first.value;
        };
        if time <= first.time {
            return first.value;
        }

        match self.interpolation {
            Interpolation::Step => first.value,
            Interpolation::Linear => {
                let span = second.time - first.time;
                if span <= 0.0 {
                    return first.value;
                }
                let t = ((time - first.time) / span).clamp(0.0, 1.0);
                first.value.lerp(&second.value, t)
            }
        }
    }
}

impl<T: Lerp> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self::empty()
    }
}

fn validate_key_times<T>(keys: &[Keyframe<T>]) -> Result<()> {
    for (i, key) in keys.iter().enumerate() {
        if !key.time.is_finite() || key.time < 0.0 {
            return Err(AnimationError::InvalidKeyframes(format!(
                "key {} has invalid time {}",
                i, key.time
            )));
        }
    }

    if let Some(i) = keys.windows(2).position(|pair| pair[1].time <= pair[0].time) {
        return Err(AnimationError::InvalidKeyframes(format!(
            "key {} at time {} does not follow key {} at time {}",
            i + 1,
            keys[i + 1].time,
            i,
            keys[i].time
        )));
    }

    Ok(())
}
