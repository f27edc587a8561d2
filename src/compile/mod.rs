//! Temporal assembly compiler.
//!
//! `Timeline -> TimelinePlan` (run partitioning), then `TimelinePlan -> FilterGraph` (graph
//! fragments joined by concatenation). Timing is computed separately from the timeline and must
//! agree with the offsets baked into the graph.

/// Top-level compile entry points.
pub mod compiler;
/// Stable graph fingerprints.
pub mod fingerprint;
/// Filter-graph IR and its ffmpeg rendering.
pub mod graph;
/// Run partitioner.
pub mod partition;
/// Timing calculator.
pub mod timing;
