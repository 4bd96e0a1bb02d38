//! Playback state tracking for an animator

/// Whether an animator is driving a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No active clip; the skeleton shows its bind pose
    #[default]
    Stopped,
    /// Advancing through the clip at `clip_index`
    Playing { clip_index: usize },
}

impl PlaybackState {
    /// Check if this state has an active clip
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    /// Index of the active clip
    pub fn clip_index(&self) -> Option<usize> {
        match self {
            Self::Playing { clip_index } => Some(*clip_index),
            Self::Stopped => None,
        }
    }
}

/// Advance a playback time by `advance` seconds within a clip of `duration`
///
/// Looping playback wraps with a modulo so any step size lands inside
/// `[0, duration]`; one-shot playback clamps to `duration`. The step is
/// taken in `f64` so `delta * speed` products beyond the `f32` range still
/// wrap. A non-finite step leaves the time unchanged.
pub fn advance_time(time: f32, advance: f64, duration: f32, looping: bool) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    if !advance.is_finite() {
        return time.clamp(0.0, duration);
    }

    let duration = f64::from(duration);
    let time = (f64::from(time) + advance).max(0.0);
    let time = if time <= duration {
        time
    } else if looping {
        time % duration
    } else {
        duration
    };
    time as f32
}
