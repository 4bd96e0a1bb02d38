use thiserror::Error;

/// Error types for skeleton construction, clip playback and pose composition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A clip index outside the animator's clip list was requested
    #[error("Invalid clip index: {index} (animator has {count} clips)")]
    InvalidClipIndex { index: usize, count: usize },

    /// A bone matrix array does not line up with the skeleton
    #[error("Bone count mismatch: expected {expected} matrices, got {actual}")]
    BoneCountMismatch { expected: usize, actual: usize },

    /// Caller supplied a value the operation cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Keyframe data violates track ordering rules
    #[error("Invalid keyframes: {0}")]
    InvalidKeyframes(String),

    /// The bone hierarchy contains a cycle, a dangling parent or no single root
    #[error("Corrupt skeleton: {0}")]
    CorruptSkeleton(String),
}

impl AnimationError {
    /// Whether the caller can retry with corrected input.
    ///
    /// Data corruption (`CorruptSkeleton`, `InvalidKeyframes`) means the asset
    /// itself must be rejected.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidClipIndex { .. } | Self::BoneCountMismatch { .. } | Self::InvalidArgument(_)
        )
    }
}

/// Result type using AnimationError
pub type Result<T> = std::result::Result<T, AnimationError>;
