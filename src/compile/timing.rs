use crate::timeline::model::Timeline;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Placement of one section in the assembled output.
pub struct SectionTiming {
    /// Timeline index.
    pub index: usize,
    /// First visible instant, in output seconds.
    pub start_s: f64,
    /// `start_s + duration`; overlaps the next start by the outgoing crossfade, if any.
    pub end_s: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Per-section offsets and total output duration.
pub struct TimingTable {
    /// One entry per section, in timeline order.
    pub sections: Vec<SectionTiming>,
    /// `Σ section durations − Σ crossfade overlaps`.
    pub total_duration_s: f64,
}

impl TimingTable {
    /// Start of section `index`, if it exists.
    pub fn start_of(&self, index: usize) -> Option<f64> {
        self.sections.get(index).map(|s| s.start_s)
    }

    /// All start offsets in order.
    pub fn starts(&self) -> Vec<f64> {
        self.sections.iter().map(|s| s.start_s).collect()
    }
}

/// Compute start offsets and total duration directly from the timeline.
///
/// Fade-to-black and hard cuts consume time inside the existing sections, so only crossfades
/// shorten the output.
pub fn compute_timing(timeline: &Timeline) -> TimingTable {
    let mut sections = Vec::with_capacity(timeline.len());
    let mut cursor = 0.0f64;
    for (index, s) in timeline.sections().iter().enumerate() {
        sections.push(SectionTiming {
            index,
            start_s: cursor,
            end_s: cursor + s.duration_s,
        });
        let overlap = timeline
            .transition_after(index)
            .map_or(0.0, |t| t.overlap_s());
        cursor += s.duration_s - overlap;
    }

    TimingTable {
        sections,
        total_duration_s: cursor,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/timing.rs"]
mod tests;
