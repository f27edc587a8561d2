use std::collections::BTreeMap;
use std::ops::Range;
use std::path::PathBuf;

use crate::compile::fingerprint::{GraphFingerprint, fingerprint_graph};
use crate::foundation::math::fmt_secs;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
/// Identifier of an intermediate stream produced by a [`GraphOp`].
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// A stream consumed by a graph operation.
pub enum StreamRef {
    /// Video stream of the `n`-th input file.
    Input(u32),
    /// Output of an earlier operation.
    Node(NodeId),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
/// Typed filter-graph operation.
pub enum GraphOp {
    /// Forward a stream unmodified.
    Passthrough {
        /// Source stream.
        input: StreamRef,
        /// Alias for `input`.
        output: NodeId,
    },
    /// Cross-dissolve from `a` into `b`.
    Crossfade {
        /// Running composite.
        a: StreamRef,
        /// Next raw section stream.
        b: StreamRef,
        /// Seconds both streams are blended.
        overlap_s: f64,
        /// Time in `a` at which the dissolve starts.
        offset_s: f64,
        /// Resulting composite.
        output: NodeId,
    },
    /// Fade to black over the final `duration_s` seconds.
    FadeOut {
        /// Source stream.
        input: StreamRef,
        /// Fade start, relative to the start of `input`.
        start_s: f64,
        /// Fade length in seconds.
        duration_s: f64,
        /// Faded stream.
        output: NodeId,
    },
    /// Fade from black over the first `duration_s` seconds.
    FadeIn {
        /// Source stream.
        input: StreamRef,
        /// Fade length in seconds.
        duration_s: f64,
        /// Faded stream.
        output: NodeId,
    },
    /// Play `inputs` back to back.
    Concat {
        /// Streams in presentation order.
        inputs: Vec<StreamRef>,
        /// Joined stream.
        output: NodeId,
    },
}

impl GraphOp {
    /// Stream produced by this operation.
    pub fn output(&self) -> NodeId {
        match self {
            Self::Passthrough { output, .. }
            | Self::Crossfade { output, .. }
            | Self::FadeOut { output, .. }
            | Self::FadeIn { output, .. }
            | Self::Concat { output, .. } => *output,
        }
    }

    /// Streams consumed by this operation, in argument order.
    pub fn inputs(&self) -> Vec<StreamRef> {
        match self {
            Self::Passthrough { input, .. }
            | Self::FadeOut { input, .. }
            | Self::FadeIn { input, .. } => vec![*input],
            Self::Crossfade { a, b, .. } => vec![*a, *b],
            Self::Concat { inputs, .. } => inputs.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// The compiled form of one run: a single continuous stream.
pub struct Fragment {
    /// Timeline indices covered by the run.
    pub sections: Range<usize>,
    /// Operations building the fragment, in dependency order.
    pub ops: Vec<GraphOp>,
    /// Final stream of the fragment.
    pub output: StreamRef,
    /// Start of the fragment in the assembled output.
    pub start_s: f64,
    /// Length of the fragment after crossfade overlaps.
    pub duration_s: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Complete assembly program for the external encoder.
///
/// `inputs[n]` is the file behind [`StreamRef::Input`]`(n)`. Fragments are joined in order by
/// `join`, which is `None` when the timeline compiles to a single fragment.
pub struct FilterGraph {
    /// Input files, one per section, in timeline order.
    pub inputs: Vec<PathBuf>,
    /// One fragment per run.
    pub fragments: Vec<Fragment>,
    /// Concatenation of all fragments when there is more than one.
    pub join: Option<GraphOp>,
    /// Stream to map into the output file.
    pub output: StreamRef,
    /// Expected output duration in seconds.
    pub total_duration_s: f64,
}

impl FilterGraph {
    /// Every operation in emission order: fragment ops first, then the join.
    pub fn ops(&self) -> impl Iterator<Item = &GraphOp> {
        self.fragments
            .iter()
            .flat_map(|f| f.ops.iter())
            .chain(self.join.iter())
    }

    /// Start time of every section in the output, as implied by fragment starts and crossfade
    /// offsets.
    pub fn section_starts(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.inputs.len());
        for frag in &self.fragments {
            out.push(frag.start_s);
            for op in &frag.ops {
                if let GraphOp::Crossfade { offset_s, .. } = op {
                    out.push(frag.start_s + offset_s);
                }
            }
        }
        out
    }

    /// `true` when the output is a raw input and no filter program is needed.
    pub fn is_passthrough(&self) -> bool {
        matches!(self.resolve(self.output), Label::Input(_))
    }

    /// Render the ffmpeg `-filter_complex` program.
    ///
    /// Pass-through operations do not emit a filter; their consumers read the source stream
    /// directly. The result is empty when [`FilterGraph::is_passthrough`] holds.
    pub fn to_filter_complex(&self) -> String {
        let labels = self.labels();
        let l = |s: StreamRef| resolve_with(&labels, s).bracketed();

        let mut chains = Vec::new();
        for op in self.ops() {
            let out = Label::Node(op.output()).bracketed();
            match op {
                GraphOp::Passthrough { .. } => {}
                GraphOp::Crossfade {
                    a,
                    b,
                    overlap_s,
                    offset_s,
                    ..
                } => chains.push(format!(
                    "{}{}xfade=transition=fade:duration={}:offset={}{out}",
                    l(*a),
                    l(*b),
                    fmt_secs(*overlap_s),
                    fmt_secs(*offset_s),
                )),
                GraphOp::FadeOut {
                    input,
                    start_s,
                    duration_s,
                    ..
                } => chains.push(format!(
                    "{}fade=t=out:st={}:d={}{out}",
                    l(*input),
                    fmt_secs(*start_s),
                    fmt_secs(*duration_s),
                )),
                GraphOp::FadeIn {
                    input, duration_s, ..
                } => chains.push(format!(
                    "{}fade=t=in:st=0:d={}{out}",
                    l(*input),
                    fmt_secs(*duration_s),
                )),
                GraphOp::Concat { inputs, .. } => {
                    let ins: String = inputs.iter().map(|s| l(*s)).collect();
                    chains.push(format!("{ins}concat=n={}:v=1:a=0{out}", inputs.len()));
                }
            }
        }
        chains.join(";")
    }

    /// Argument for ffmpeg's `-map`: `0:v` for a raw input, `[vN]` for a filter output.
    pub fn output_map(&self) -> String {
        match self.resolve(self.output) {
            Label::Input(n) => format!("{n}:v"),
            node @ Label::Node(_) => node.bracketed(),
        }
    }

    /// Stable hash of the rendered program, inputs, and output mapping.
    pub fn fingerprint(&self) -> GraphFingerprint {
        fingerprint_graph(self)
    }

    fn labels(&self) -> BTreeMap<NodeId, Label> {
        let mut labels = BTreeMap::new();
        for op in self.ops() {
            let label = match op {
                GraphOp::Passthrough { input, .. } => resolve_with(&labels, *input),
                _ => Label::Node(op.output()),
            };
            labels.insert(op.output(), label);
        }
        labels
    }

    fn resolve(&self, s: StreamRef) -> Label {
        resolve_with(&self.labels(), s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Label {
    Input(u32),
    Node(NodeId),
}

impl Label {
    fn bracketed(self) -> String {
        match self {
            Self::Input(n) => format!("[{n}:v]"),
            Self::Node(id) => format!("[v{}]", id.0),
        }
    }
}

fn resolve_with(labels: &BTreeMap<NodeId, Label>, s: StreamRef) -> Label {
    match s {
        StreamRef::Input(n) => Label::Input(n),
        StreamRef::Node(id) => labels.get(&id).copied().unwrap_or(Label::Node(id)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/graph.rs"]
mod tests;
