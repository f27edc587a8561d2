use std::ffi::OsString;
use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::compile::graph::FilterGraph;
use crate::foundation::error::{ClipcomposeError, ClipcomposeResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Output video codec.
pub enum Codec {
    /// Software H.264.
    #[default]
    Libx264,
    /// NVIDIA hardware H.264.
    H264Nvenc,
}

impl Codec {
    /// ffmpeg encoder name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Libx264 => "libx264",
            Self::H264Nvenc => "h264_nvenc",
        }
    }

    fn quality_args(self) -> [&'static str; 2] {
        match self {
            Self::Libx264 => ["-crf", "20"],
            Self::H264Nvenc => ["-cq", "20"],
        }
    }
}

#[derive(Clone, Debug)]
/// How to run ffmpeg for one assembly.
pub struct EncodeConfig {
    /// ffmpeg executable.
    pub ffmpeg_bin: PathBuf,
    /// Output codec.
    pub codec: Codec,
    /// Output frame rate.
    pub fps: u32,
    /// Output file.
    pub out_path: PathBuf,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl EncodeConfig {
    /// Software-encoded MP4 with overwrite enabled.
    pub fn new(out_path: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            codec: Codec::default(),
            fps,
            out_path: out_path.into(),
            overwrite: true,
        }
    }

    /// Reject settings ffmpeg cannot honour.
    pub fn validate(&self) -> ClipcomposeResult<()> {
        if self.fps == 0 {
            return Err(ClipcomposeError::validation("encode fps must be non-zero"));
        }
        if self.out_path.as_os_str().is_empty() {
            return Err(ClipcomposeError::validation("encode output path is empty"));
        }
        Ok(())
    }
}

/// Full ffmpeg argument list (without the program name) for encoding `graph`.
pub fn ffmpeg_args(graph: &FilterGraph, cfg: &EncodeConfig) -> Vec<OsString> {
    let overwrite = if cfg.overwrite { "-y" } else { "-n" };
    let mut args: Vec<OsString> = [overwrite, "-loglevel", "error"]
        .into_iter()
        .map(OsString::from)
        .collect();

    for input in &graph.inputs {
        args.push("-i".into());
        args.push(input.as_os_str().to_owned());
    }

    if !graph.is_passthrough() {
        args.push("-filter_complex".into());
        args.push(graph.to_filter_complex().into());
    }
    args.push("-map".into());
    args.push(graph.output_map().into());

    args.push("-c:v".into());
    args.push(cfg.codec.as_str().into());
    args.extend(cfg.codec.quality_args().into_iter().map(OsString::from));
    for a in ["-pix_fmt", "yuv420p", "-r"] {
        args.push(a.into());
    }
    args.push(cfg.fps.to_string().into());
    args.push("-an".into());
    args.push(cfg.out_path.as_os_str().to_owned());
    args
}

/// Run ffmpeg to completion, writing `cfg.out_path`.
#[tracing::instrument(skip_all, fields(out = %cfg.out_path.display(), codec = cfg.codec.as_str()))]
pub fn encode(graph: &FilterGraph, cfg: &EncodeConfig) -> ClipcomposeResult<()> {
    cfg.validate()?;
    ensure_parent_dir(&cfg.out_path)?;
    if !cfg.overwrite && cfg.out_path.exists() {
        return Err(ClipcomposeError::validation(format!(
            "output file '{}' already exists",
            cfg.out_path.display()
        )));
    }

    let mut cmd = Command::new(&cfg.ffmpeg_bin);
    cmd.args(ffmpeg_args(graph, cfg))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    tracing::info!(
        inputs = graph.inputs.len(),
        fingerprint = %graph.fingerprint(),
        expected_s = graph.total_duration_s,
        "spawning ffmpeg"
    );
    let mut child = cmd.spawn().map_err(|e| {
        ClipcomposeError::encode(format!(
            "failed to spawn '{}' (is it installed and on PATH?): {e}",
            cfg.ffmpeg_bin.display()
        ))
    })?;

    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| ClipcomposeError::encode("failed to open ffmpeg stderr (unexpected)"))?;
    let stderr_drain = std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stderr.read_to_end(&mut bytes)?;
        Ok::<_, std::io::Error>(bytes)
    });

    let status = child
        .wait()
        .map_err(|e| ClipcomposeError::encode(format!("failed to wait for ffmpeg: {e}")))?;
    let stderr_bytes = stderr_drain
        .join()
        .map_err(|_| ClipcomposeError::encode("ffmpeg stderr drain thread panicked"))?
        .map_err(|e| ClipcomposeError::encode(format!("ffmpeg stderr read failed: {e}")))?;

    if !status.success() {
        return Err(ClipcomposeError::encode(format!(
            "ffmpeg exited with status {status}: {}",
            String::from_utf8_lossy(&stderr_bytes).trim()
        )));
    }
    tracing::info!("ffmpeg finished");
    Ok(())
}

/// Create the directory holding `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> ClipcomposeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// `true` when `bin -version` runs successfully.
pub fn is_on_path(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
