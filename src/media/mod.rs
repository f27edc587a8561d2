//! Stream inspection.

/// Section duration probing.
pub mod probe;
