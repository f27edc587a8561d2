//! Output encoding through the system `ffmpeg`.

/// ffmpeg invocation.
pub mod ffmpeg;
