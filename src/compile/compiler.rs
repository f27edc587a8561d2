use std::path::Path;

use crate::compile::graph::{FilterGraph, Fragment, GraphOp, NodeId, StreamRef};
use crate::compile::partition::{BreakKind, RunContext, TimelinePlan, partition};
use crate::compile::timing::{TimingTable, compute_timing};
use crate::foundation::error::ClipcomposeResult;
use crate::timeline::model::{SectionSpec, Timeline};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Everything derived from one timeline: its run plan, the filter graph, and the timing table.
pub struct Assembly {
    /// Runs and breakpoints.
    pub plan: TimelinePlan,
    /// Program for the encoder.
    pub graph: FilterGraph,
    /// Independently computed section offsets.
    pub timing: TimingTable,
}

/// Partition, compile, and time a validated timeline.
#[tracing::instrument(skip(timeline), fields(sections = timeline.len()))]
pub fn compile(timeline: &Timeline) -> Assembly {
    let plan = partition(timeline);
    let graph = compile_graph(timeline, &plan);
    let timing = compute_timing(timeline);
    tracing::debug!(
        runs = plan.run_count(),
        breakpoints = plan.breakpoint_count(),
        total_s = graph.total_duration_s,
        fingerprint = %graph.fingerprint(),
        "compiled assembly graph"
    );
    Assembly {
        plan,
        graph,
        timing,
    }
}

/// Validate manifest records into a [`Timeline`] and [`compile`] it.
///
/// Fails before producing anything when the records violate a timeline invariant.
pub fn compile_specs(specs: Vec<SectionSpec>) -> ClipcomposeResult<Assembly> {
    let timeline = Timeline::from_specs(specs)?;
    Ok(compile(&timeline))
}

/// Map a plan onto graph operations: one fragment per run, joined by concatenation.
pub fn compile_graph(timeline: &Timeline, plan: &TimelinePlan) -> FilterGraph {
    let mut nodes = NodeAlloc::default();
    let mut fragments = Vec::with_capacity(plan.run_count());
    let mut start_s = 0.0f64;
    for ctx in plan.run_contexts() {
        let frag = compile_run(timeline, ctx, start_s, &mut nodes);
        start_s += frag.duration_s;
        fragments.push(frag);
    }

    let (join, output) = match fragments.as_slice() {
        [only] => (None, only.output),
        _ => {
            let output = nodes.next();
            let join = GraphOp::Concat {
                inputs: fragments.iter().map(|f| f.output).collect(),
                output,
            };
            (Some(join), StreamRef::Node(output))
        }
    };

    FilterGraph {
        inputs: timeline.paths().map(Path::to_path_buf).collect(),
        fragments,
        join,
        output,
        total_duration_s: start_s,
    }
}

fn compile_run(
    timeline: &Timeline,
    ctx: RunContext<'_>,
    start_s: f64,
    nodes: &mut NodeAlloc,
) -> Fragment {
    let sections = timeline.sections();
    let run = ctx.run;
    let mut ops = Vec::new();

    let first = run.first();
    let mut running = sections[first].duration_s;
    let mut current = if run.is_single() {
        let output = nodes.next();
        ops.push(GraphOp::Passthrough {
            input: input(first),
            output,
        });
        StreamRef::Node(output)
    } else {
        input(first)
    };

    // Offsets are taken from the composite's post-overlap length, so overlaps compound.
    for i in run.first()..run.last() {
        let overlap_s = sections[i].outgoing.overlap_s();
        let output = nodes.next();
        ops.push(GraphOp::Crossfade {
            a: current,
            b: input(i + 1),
            overlap_s,
            offset_s: running - overlap_s,
            output,
        });
        running += sections[i + 1].duration_s - overlap_s;
        current = StreamRef::Node(output);
    }

    if let Some(bp) = ctx.incoming.filter(|b| b.kind == BreakKind::FadeToBlack) {
        let output = nodes.next();
        ops.push(GraphOp::FadeIn {
            input: current,
            duration_s: bp.fade_half_s(),
            output,
        });
        current = StreamRef::Node(output);
    }
    if let Some(bp) = ctx.outgoing.filter(|b| b.kind == BreakKind::FadeToBlack) {
        let half = bp.fade_half_s();
        let output = nodes.next();
        ops.push(GraphOp::FadeOut {
            input: current,
            start_s: running - half,
            duration_s: half,
            output,
        });
        current = StreamRef::Node(output);
    }

    Fragment {
        sections: run.sections.clone(),
        ops,
        output: current,
        start_s,
        duration_s: running,
    }
}

fn input(index: usize) -> StreamRef {
    StreamRef::Input(index as u32)
}

#[derive(Default)]
struct NodeAlloc {
    next: u32,
}

impl NodeAlloc {
    fn next(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiler.rs"]
mod tests;
