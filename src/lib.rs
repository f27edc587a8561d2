//! clipcompose joins independently rendered video sections into one output file.
//!
//! Each section names its outgoing transition (crossfade, fade-to-black, or hard cut). The
//! compiler turns that timeline into a single ffmpeg filter program:
//!
//! - Load an [`AssemblyManifest`] and fill in unknown durations with a [`DurationProbe`]
//! - Build a validated [`Timeline`] and [`compile`] it into an [`Assembly`]
//! - Hand the [`FilterGraph`] to [`encode`], or inspect it with [`FilterGraph::to_filter_complex`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod compile;
mod encode;
mod foundation;
mod manifest;
mod media;
mod timeline;

pub use crate::foundation::error::{ClipcomposeError, ClipcomposeResult, DurationField};

pub use crate::timeline::model::{
    Section, SectionSpec, Timeline, Transition, TransitionKind, TransitionSpec,
};

pub use crate::compile::compiler::{Assembly, compile, compile_graph, compile_specs};
pub use crate::compile::fingerprint::GraphFingerprint;
pub use crate::compile::graph::{FilterGraph, Fragment, GraphOp, NodeId, StreamRef};
pub use crate::compile::partition::{
    BreakKind, Breakpoint, Run, RunContext, Segment, TimelinePlan, partition,
};
pub use crate::compile::timing::{SectionTiming, TimingTable, compute_timing};

pub use crate::manifest::assembly::{
    AssemblyManifest, ManifestFormat, ManifestSection, VideoSettings,
};
pub use crate::manifest::vars::resolve_path_vars;

pub use crate::media::probe::{
    DurationProbe, Ffprobe, ProbeOpts, parse_ffprobe_duration, probe_durations, resolve_durations,
};

pub use crate::encode::ffmpeg::{
    Codec, EncodeConfig, encode, ensure_parent_dir, ffmpeg_args, is_on_path,
};
