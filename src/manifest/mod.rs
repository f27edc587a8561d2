//! Assembly manifest loading.

/// Manifest schema, defaults, and path checks.
pub mod assembly;
/// `${name}` path variable substitution.
pub mod vars;
