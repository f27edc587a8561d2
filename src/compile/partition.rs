use std::ops::Range;

use crate::timeline::model::{Timeline, TransitionKind};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// Maximal group of consecutive sections joined only by crossfades.
///
/// `sections` is a half-open range of timeline indices and is never empty.
pub struct Run {
    /// Timeline indices covered by the run.
    pub sections: Range<usize>,
}

impl Run {
    /// Index of the first section.
    pub fn first(&self) -> usize {
        self.sections.start
    }

    /// Index of the last section.
    pub fn last(&self) -> usize {
        self.sections.end - 1
    }

    /// Number of sections in the run.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always `false`: runs hold at least one section.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// `true` for a degenerate run with no crossfade inside it.
    pub fn is_single(&self) -> bool {
        self.len() == 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Kind of a non-crossfade boundary.
pub enum BreakKind {
    /// Fade out, then fade in; no overlap.
    FadeToBlack,
    /// Plain concatenation.
    HardCut,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Boundary between two runs.
pub struct Breakpoint {
    /// Index of the section that owns the transition (the last section of the preceding run).
    pub after: usize,
    /// Boundary kind.
    pub kind: BreakKind,
    /// Full transition duration in seconds; `0.0` for hard cuts.
    pub duration_s: f64,
}

impl Breakpoint {
    /// Length of the fade-out and of the fade-in, each `duration_s / 2`.
    pub fn fade_half_s(&self) -> f64 {
        match self.kind {
            BreakKind::FadeToBlack => self.duration_s / 2.0,
            BreakKind::HardCut => 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "segment", rename_all = "snake_case")]
/// One element of a [`TimelinePlan`].
pub enum Segment {
    /// A crossfade run.
    Run(Run),
    /// A non-crossfade boundary.
    Breakpoint(Breakpoint),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Ordered alternation `Run (Breakpoint Run)*` covering every section exactly once.
pub struct TimelinePlan {
    segments: Vec<Segment>,
}

/// A run together with the breakpoints on either side of it.
#[derive(Clone, Copy, Debug)]
pub struct RunContext<'a> {
    /// Breakpoint before the run, `None` for the first run.
    pub incoming: Option<&'a Breakpoint>,
    /// The run itself.
    pub run: &'a Run,
    /// Breakpoint after the run, `None` for the last run.
    pub outgoing: Option<&'a Breakpoint>,
}

impl TimelinePlan {
    /// Segments in presentation order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Runs in order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Run(r) => Some(r),
            Segment::Breakpoint(_) => None,
        })
    }

    /// Breakpoints in order.
    pub fn breakpoints(&self) -> impl Iterator<Item = &Breakpoint> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Breakpoint(b) => Some(b),
            Segment::Run(_) => None,
        })
    }

    /// Number of runs.
    pub fn run_count(&self) -> usize {
        self.runs().count()
    }

    /// Number of breakpoints.
    pub fn breakpoint_count(&self) -> usize {
        self.breakpoints().count()
    }

    /// Each run with its neighbouring breakpoints, in order.
    pub fn run_contexts(&self) -> Vec<RunContext<'_>> {
        let mut out = Vec::with_capacity(self.segments.len() / 2 + 1);
        for (i, seg) in self.segments.iter().enumerate() {
            let Segment::Run(run) = seg else {
                continue;
            };
            let breakpoint_at = |j: Option<usize>| match j.and_then(|j| self.segments.get(j)) {
                Some(Segment::Breakpoint(b)) => Some(b),
                _ => None,
            };
            out.push(RunContext {
                incoming: breakpoint_at(i.checked_sub(1)),
                run,
                outgoing: breakpoint_at(Some(i + 1)),
            });
        }
        out
    }

    /// Section indices obtained by concatenating every run in order.
    ///
    /// For a plan built by [`partition`], this is `0..timeline.len()`.
    pub fn section_indices(&self) -> Vec<usize> {
        self.runs().flat_map(|r| r.sections.clone()).collect()
    }
}

/// Split a timeline into crossfade runs separated by fade-to-black or hard-cut breakpoints.
pub fn partition(timeline: &Timeline) -> TimelinePlan {
    let n = timeline.len();
    let boundaries = timeline.sections()[..n - 1]
        .iter()
        .enumerate()
        .map(|(i, s)| (i, s.outgoing));

    let (mut segments, open_run) =
        boundaries.fold((Vec::new(), 0usize), |(mut segments, start), (i, t)| {
            let kind = match t.kind() {
                TransitionKind::Crossfade => return (segments, start),
                TransitionKind::FadeToBlack => BreakKind::FadeToBlack,
                TransitionKind::HardCut => BreakKind::HardCut,
            };
            segments.push(Segment::Run(Run {
                sections: start..i + 1,
            }));
            segments.push(Segment::Breakpoint(Breakpoint {
                after: i,
                kind,
                duration_s: t.duration_s(),
            }));
            (segments, i + 1)
        });
    segments.push(Segment::Run(Run {
        sections: open_run..n,
    }));

    tracing::debug!(
        sections = n,
        segments = segments.len(),
        "partitioned timeline into runs"
    );
    TimelinePlan { segments }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/partition.rs"]
mod tests;
