use std::path::{Path, PathBuf};

use crate::foundation::error::{ClipcomposeError, ClipcomposeResult, DurationField};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// How one section hands off to the next.
pub enum TransitionKind {
    /// Both streams overlap and are blended for the transition duration.
    Crossfade,
    /// The outgoing section fades to black over `T/2`, the incoming one fades in over `T/2`.
    FadeToBlack,
    /// Plain concatenation.
    HardCut,
}

impl TransitionKind {
    /// Parse a canonical kind name (`crossfade`, `fade_to_black`, `hard_cut`).
    ///
    /// Returns `None` for anything else so the caller can attach the section index to the error.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "crossfade" => Some(Self::Crossfade),
            "fade_to_black" => Some(Self::FadeToBlack),
            "hard_cut" => Some(Self::HardCut),
            _ => None,
        }
    }

    /// Canonical name, as accepted by [`TransitionKind::parse`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crossfade => "crossfade",
            Self::FadeToBlack => "fade_to_black",
            Self::HardCut => "hard_cut",
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Outgoing transition of a section, with the zero-duration rule already applied.
///
/// A zero-length transition is a hard cut whatever kind was declared, and a hard cut always has
/// zero length. [`Transition::kind`] therefore reports the kind the compiler acts on.
pub struct Transition {
    kind: TransitionKind,
    duration_s: f64,
}

impl Transition {
    /// Build a transition from a declared kind and duration in seconds.
    ///
    /// Negative or non-finite durations are kept as-is so that [`Timeline::new`] rejects them.
    pub fn new(kind: TransitionKind, duration_s: f64) -> Self {
        if is_valid_duration(duration_s) && (kind == TransitionKind::HardCut || duration_s == 0.0) {
            return Self::hard_cut();
        }
        Self { kind, duration_s }
    }

    /// A zero-length cut.
    pub fn hard_cut() -> Self {
        Self {
            kind: TransitionKind::HardCut,
            duration_s: 0.0,
        }
    }

    /// Crossfade with `duration_s` seconds of overlap.
    pub fn crossfade(duration_s: f64) -> Self {
        Self::new(TransitionKind::Crossfade, duration_s)
    }

    /// Fade-to-black lasting `duration_s` seconds in total.
    pub fn fade_to_black(duration_s: f64) -> Self {
        Self::new(TransitionKind::FadeToBlack, duration_s)
    }

    /// Effective kind.
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Duration in seconds; always `0.0` for hard cuts.
    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    /// Seconds of temporal overlap this transition removes from the output.
    pub fn overlap_s(&self) -> f64 {
        match self.kind {
            TransitionKind::Crossfade => self.duration_s,
            TransitionKind::FadeToBlack | TransitionKind::HardCut => 0.0,
        }
    }

    /// Length of each fade half for fade-to-black, `0.0` otherwise.
    pub fn fade_half_s(&self) -> f64 {
        match self.kind {
            TransitionKind::FadeToBlack => self.duration_s / 2.0,
            TransitionKind::Crossfade | TransitionKind::HardCut => 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Unparsed outgoing transition as supplied by a manifest.
pub struct TransitionSpec {
    /// Kind name, see [`TransitionKind::parse`].
    pub kind: String,
    /// Duration in seconds.
    pub duration_s: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Unvalidated section record as handed over by the manifest layer.
pub struct SectionSpec {
    /// Path of the pre-rendered clip.
    pub path: PathBuf,
    /// Playback length in seconds.
    pub duration_s: f64,
    /// Transition into the following section.
    pub transition: TransitionSpec,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One pre-rendered clip placed on the timeline.
pub struct Section {
    /// Path of the clip's video stream.
    pub path: PathBuf,
    /// Playback length in seconds.
    pub duration_s: f64,
    /// Transition into the following section. Ignored on the last section.
    pub outgoing: Transition,
}

impl Section {
    /// Create a section.
    pub fn new(path: impl Into<PathBuf>, duration_s: f64, outgoing: Transition) -> Self {
        Self {
            path: path.into(),
            duration_s,
            outgoing,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Validated, ordered sequence of sections.
///
/// A `Timeline` is never empty and every boundary satisfies:
/// - durations are finite and non-negative
/// - a crossfade is strictly shorter than both adjacent sections
/// - each half of a fade-to-black fits inside the run fragment on its side
///
/// The last section's outgoing transition is normalized to a hard cut since nothing follows it.
pub struct Timeline {
    sections: Vec<Section>,
}

impl Timeline {
    /// Validate `sections` and build a timeline.
    pub fn new(mut sections: Vec<Section>) -> ClipcomposeResult<Self> {
        validate_sections(&sections)?;
        if let Some(last) = sections.last_mut() {
            last.outgoing = Transition::hard_cut();
        }
        Ok(Self { sections })
    }

    /// Parse transition kinds from manifest records, then validate like [`Timeline::new`].
    ///
    /// When several records are invalid, the error for the lowest section index is reported.
    pub fn from_specs(specs: Vec<SectionSpec>) -> ClipcomposeResult<Self> {
        let last = specs.len().saturating_sub(1);
        let mut bad_kind = None;
        let mut sections = Vec::with_capacity(specs.len());
        for (index, spec) in specs.into_iter().enumerate() {
            let outgoing = if index == last {
                Transition::hard_cut()
            } else {
                let parsed = TransitionKind::parse(&spec.transition.kind);
                match parsed {
                    Some(kind) => Transition::new(kind, spec.transition.duration_s),
                    None => {
                        if bad_kind.is_none() {
                            bad_kind = Some(ClipcomposeError::InvalidTransitionKind {
                                index,
                                kind: spec.transition.kind,
                            });
                        }
                        // Placeholder; earlier sections are still validated.
                        Transition::hard_cut()
                    }
                }
            };
            sections.push(Section::new(spec.path, spec.duration_s, outgoing));
        }

        let Some(kind_err) = bad_kind else {
            return Self::new(sections);
        };
        match validate_sections(&sections) {
            Err(e) if e.section_index() <= kind_err.section_index() => Err(e),
            _ => Err(kind_err),
        }
    }

    /// All sections in presentation order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of sections (always at least one).
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section at `index`.
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Transition from section `index` into section `index + 1`, `None` for the last section.
    pub fn transition_after(&self, index: usize) -> Option<&Transition> {
        if index + 1 < self.sections.len() {
            Some(&self.sections[index].outgoing)
        } else {
            None
        }
    }

    /// Input paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.sections.iter().map(|s| s.path.as_path())
    }
}

fn validate_sections(sections: &[Section]) -> ClipcomposeResult<()> {
    if sections.is_empty() {
        return Err(ClipcomposeError::EmptyTimeline);
    }

    let fragments = fragment_lengths(sections);
    for (index, cur) in sections.iter().enumerate() {
        check_non_negative(index, DurationField::Section, cur.duration_s)?;
        let Some(next) = sections.get(index + 1) else {
            break;
        };
        let t = cur.outgoing;
        check_non_negative(index, DurationField::Transition, t.duration_s())?;
        // A bad next duration is reported at its own index.
        if !is_valid_duration(next.duration_s) {
            continue;
        }

        match t.kind() {
            TransitionKind::Crossfade => {
                let shorter = cur.duration_s.min(next.duration_s);
                if t.duration_s() >= shorter {
                    return Err(ClipcomposeError::OverlapExceedsClip {
                        index,
                        overlap: t.duration_s(),
                        shorter,
                    });
                }
            }
            TransitionKind::FadeToBlack => {
                let shorter = fragments[index].min(fragments[index + 1]);
                if t.fade_half_s() > shorter {
                    return Err(ClipcomposeError::FadeExceedsClip {
                        index,
                        fade: t.fade_half_s(),
                        shorter,
                    });
                }
            }
            TransitionKind::HardCut => {}
        }
    }

    Ok(())
}

/// Post-overlap length of the crossfade run containing each section.
fn fragment_lengths(sections: &[Section]) -> Vec<f64> {
    let mut out = vec![0.0; sections.len()];
    let (mut start, mut running) = (0usize, 0.0f64);
    for (i, s) in sections.iter().enumerate() {
        running += s.duration_s;
        let joins_next =
            i + 1 < sections.len() && s.outgoing.kind() == TransitionKind::Crossfade;
        if joins_next {
            running -= s.outgoing.overlap_s();
        } else {
            out[start..=i].fill(running);
            start = i + 1;
            running = 0.0;
        }
    }
    out
}

fn is_valid_duration(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

fn check_non_negative(index: usize, what: DurationField, value: f64) -> ClipcomposeResult<()> {
    if is_valid_duration(value) {
        Ok(())
    } else {
        Err(ClipcomposeError::NegativeDuration { index, what, value })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
