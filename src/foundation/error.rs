/// Convenience result type used across clipcompose.
pub type ClipcomposeResult<T> = Result<T, ClipcomposeError>;

/// Top-level error taxonomy used by the assembly APIs.
///
/// The first group of variants is raised by timeline validation. They carry the index of the
/// offending section and are always reported before any graph is emitted.
#[derive(thiserror::Error, Debug)]
pub enum ClipcomposeError {
    /// The timeline has no sections.
    #[error("timeline has no sections")]
    EmptyTimeline,

    /// A transition kind outside `crossfade`, `fade_to_black`, `hard_cut`.
    #[error("section {index}: invalid transition kind '{kind}'")]
    InvalidTransitionKind {
        /// Index of the section owning the transition.
        index: usize,
        /// Kind string as supplied.
        kind: String,
    },

    /// A section or transition duration below zero (or not finite).
    #[error("section {index}: {what} must be >= 0, got {value}")]
    NegativeDuration {
        /// Index of the offending section.
        index: usize,
        /// Which duration was rejected.
        what: DurationField,
        /// Rejected value in seconds.
        value: f64,
    },

    /// A crossfade at least as long as one of its adjacent sections.
    #[error(
        "section {index}: crossfade of {overlap}s must be shorter than both adjacent sections (shorter is {shorter}s)"
    )]
    OverlapExceedsClip {
        /// Index of the section owning the crossfade.
        index: usize,
        /// Requested overlap in seconds.
        overlap: f64,
        /// Duration of the shorter adjacent section.
        shorter: f64,
    },

    /// A fade-to-black whose half duration is longer than the run fragment on either side.
    #[error("section {index}: fade of {fade}s does not fit in adjacent run of {shorter}s")]
    FadeExceedsClip {
        /// Index of the section owning the fade-to-black transition.
        index: usize,
        /// Length of each fade half in seconds.
        fade: f64,
        /// Post-overlap length of the shorter adjacent run fragment.
        shorter: f64,
    },

    /// Invalid manifest or user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure while probing a section stream.
    #[error("probe error: {0}")]
    Probe(String),

    /// Failure while running the encoder.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Names the duration rejected by [`ClipcomposeError::NegativeDuration`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DurationField {
    /// The section's own playback length.
    Section,
    /// The section's outgoing transition length.
    Transition,
}

impl std::fmt::Display for DurationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Section => f.write_str("section duration"),
            Self::Transition => f.write_str("transition duration"),
        }
    }
}

impl ClipcomposeError {
    /// Build a [`ClipcomposeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ClipcomposeError::Probe`] value.
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Build a [`ClipcomposeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Section index for timeline validation errors, `None` for everything else.
    pub fn section_index(&self) -> Option<usize> {
        match self {
            Self::InvalidTransitionKind { index, .. }
            | Self::NegativeDuration { index, .. }
            | Self::OverlapExceedsClip { index, .. }
            | Self::FadeExceedsClip { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
