use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::foundation::error::{ClipcomposeError, ClipcomposeResult};
use crate::manifest::assembly::AssemblyManifest;

/// Source of true clip durations.
pub trait DurationProbe: Sync {
    /// Playback length of the video at `path`, in seconds.
    fn probe_duration(&self, path: &Path) -> ClipcomposeResult<f64>;
}

/// Reads durations with the system `ffprobe`.
#[derive(Clone, Debug)]
pub struct Ffprobe {
    /// `ffprobe` executable to run.
    pub bin: PathBuf,
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self {
            bin: PathBuf::from("ffprobe"),
        }
    }
}

impl DurationProbe for Ffprobe {
    fn probe_duration(&self, path: &Path) -> ClipcomposeResult<f64> {
        let out = std::process::Command::new(&self.bin)
            .args(["-v", "error", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()
            .map_err(|e| {
                ClipcomposeError::probe(format!(
                    "failed to run '{}': {e}",
                    self.bin.display()
                ))
            })?;
        if !out.status.success() {
            return Err(ClipcomposeError::probe(format!(
                "ffprobe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        parse_ffprobe_duration(&out.stdout).map_err(|e| match e {
            ClipcomposeError::Probe(msg) => {
                ClipcomposeError::probe(format!("'{}': {msg}", path.display()))
            }
            other => other,
        })
    }
}

/// Extract `format.duration` from `ffprobe -print_format json -show_format` output.
pub fn parse_ffprobe_duration(json: &[u8]) -> ClipcomposeResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| ClipcomposeError::probe(format!("ffprobe json parse failed: {e}")))?;
    let raw = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| ClipcomposeError::probe("ffprobe reported no format.duration"))?;
    let d: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ClipcomposeError::probe(format!("invalid format.duration '{raw}'")))?;
    if !(d.is_finite() && d > 0.0) {
        return Err(ClipcomposeError::probe(format!(
            "format.duration must be > 0, got {d}"
        )));
    }
    Ok(d)
}

/// Options for parallel probing.
#[derive(Clone, Debug, Default)]
pub struct ProbeOpts {
    /// Worker threads; `None` uses rayon's default.
    pub threads: Option<usize>,
}

/// Probe every path on a bounded pool. Results keep the order of `paths`.
pub fn probe_durations<P: DurationProbe + ?Sized>(
    probe: &P,
    paths: &[PathBuf],
    opts: &ProbeOpts,
) -> ClipcomposeResult<Vec<f64>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let pool = build_thread_pool(opts.threads)?;
    pool.install(|| {
        paths
            .par_iter()
            .map(|p| probe.probe_duration(p))
            .collect::<ClipcomposeResult<Vec<f64>>>()
    })
}

/// Fill in every section duration the manifest does not supply.
#[tracing::instrument(skip_all, fields(sections = manifest.sections.len()))]
pub fn resolve_durations<P: DurationProbe + ?Sized>(
    manifest: &mut AssemblyManifest,
    probe: &P,
    opts: &ProbeOpts,
) -> ClipcomposeResult<()> {
    let missing = manifest.missing_durations();
    if missing.is_empty() {
        return Ok(());
    }
    let paths: Vec<PathBuf> = missing
        .iter()
        .map(|&i| manifest.sections[i].path.clone())
        .collect();
    let durations = probe_durations(probe, &paths, opts)?;
    for (&i, d) in missing.iter().zip(durations) {
        let section = &mut manifest.sections[i];
        tracing::info!(index = i, duration_s = d, path = %section.path.display(), "probed section");
        section.duration_s = Some(d);
    }
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> ClipcomposeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ClipcomposeError::validation(
            "probe 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ClipcomposeError::probe(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
