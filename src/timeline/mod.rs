//! Sections, transitions, and the validated [`Timeline`](model::Timeline).

/// Timeline data model and invariants.
pub mod model;
