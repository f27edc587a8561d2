use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::foundation::error::{ClipcomposeError, ClipcomposeResult};
use crate::manifest::vars::resolve_path_vars;
use crate::timeline::model::{SectionSpec, Timeline, TransitionKind, TransitionSpec};

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    video: Option<RawVideo>,
    #[serde(default)]
    paths: BTreeMap<String, String>,
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVideo {
    fps: Option<u32>,
    transition: Option<f64>,
    transition_type: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSection {
    path: Option<String>,
    transition: Option<f64>,
    transition_type: Option<String>,
    duration: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Global output settings and transition defaults.
pub struct VideoSettings {
    /// Output frame rate.
    pub fps: u32,
    /// Default outgoing transition duration in seconds.
    pub transition_s: f64,
    /// Default outgoing transition kind.
    pub transition_kind: TransitionKind,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One section after path resolution and default application.
pub struct ManifestSection {
    /// Resolved clip path.
    pub path: PathBuf,
    /// Outgoing transition duration in seconds.
    pub transition_s: f64,
    /// Outgoing transition kind.
    pub transition_kind: TransitionKind,
    /// Clip length, when supplied by the manifest or filled in by a probe.
    pub duration_s: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// On-disk encoding of an assembly manifest.
pub enum ManifestFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl ManifestFormat {
    /// `.yaml` and `.yml` files are YAML; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Normalized assembly manifest: which clips to join, in what order, with what transitions.
///
/// Schema (YAML shown; JSON uses the same keys):
///
/// ```yaml
/// video:
///   fps: 30
///   transition: 0.5
///   transition_type: crossfade
/// paths:
///   renders: /path/to/renders
/// sections:
///   - path: ${renders}/title.mp4
///     transition: 0
///     transition_type: fade_to_black
/// ```
pub struct AssemblyManifest {
    /// Output settings.
    pub video: VideoSettings,
    /// Sections in presentation order.
    pub sections: Vec<ManifestSection>,
}

impl AssemblyManifest {
    /// Parse a manifest from a JSON reader. Relative section paths are joined onto `base_dir`.
    pub fn from_reader<R: std::io::Read>(r: R, base_dir: &Path) -> ClipcomposeResult<Self> {
        Self::from_reader_as(r, ManifestFormat::Json, base_dir)
    }

    /// Parse a manifest in the given format.
    pub fn from_reader_as<R: std::io::Read>(
        r: R,
        format: ManifestFormat,
        base_dir: &Path,
    ) -> ClipcomposeResult<Self> {
        let raw: RawManifest = match format {
            ManifestFormat::Json => serde_json::from_reader(r).map_err(|e| {
                ClipcomposeError::validation(format!("parse assembly manifest JSON: {e}"))
            })?,
            ManifestFormat::Yaml => serde_yaml::from_reader(r).map_err(|e| {
                ClipcomposeError::validation(format!("parse assembly manifest YAML: {e}"))
            })?,
        };
        normalize(raw, base_dir)
    }

    /// Parse a manifest from a JSON string.
    pub fn from_json_str(s: &str, base_dir: &Path) -> ClipcomposeResult<Self> {
        Self::from_reader_as(s.as_bytes(), ManifestFormat::Json, base_dir)
    }

    /// Parse a manifest from a YAML string.
    pub fn from_yaml_str(s: &str, base_dir: &Path) -> ClipcomposeResult<Self> {
        Self::from_reader_as(s.as_bytes(), ManifestFormat::Yaml, base_dir)
    }

    /// Load a manifest file, picking the format from its extension.
    ///
    /// Relative section paths resolve against the manifest's directory.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> ClipcomposeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ClipcomposeError::validation(format!(
                "open assembly manifest '{}': {e}",
                path.display()
            ))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let format = ManifestFormat::from_path(path);
        let manifest = Self::from_reader_as(BufReader::new(f), format, base_dir)?;
        tracing::info!(
            sections = manifest.sections.len(),
            ?format,
            "loaded assembly manifest"
        );
        Ok(manifest)
    }

    /// Check that every section file exists, reporting all missing files at once.
    pub fn validate_paths(&self) -> ClipcomposeResult<()> {
        let missing: Vec<&Path> = self
            .sections
            .iter()
            .map(|s| s.path.as_path())
            .filter(|p| !p.exists())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let mut msg = format!("missing {} section file(s):", missing.len());
        for p in missing {
            msg.push_str(&format!("\n  - {}", p.display()));
        }
        Err(ClipcomposeError::validation(msg))
    }

    /// Indices of sections whose duration is still unknown.
    pub fn missing_durations(&self) -> Vec<usize> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.duration_s.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Convert into compiler input records. Every duration must be known.
    pub fn section_specs(&self) -> ClipcomposeResult<Vec<SectionSpec>> {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let duration_s = s.duration_s.ok_or_else(|| {
                    ClipcomposeError::validation(format!(
                        "section {i}: duration of '{}' is unknown (probe it first)",
                        s.path.display()
                    ))
                })?;
                Ok(SectionSpec {
                    path: s.path.clone(),
                    duration_s,
                    transition: TransitionSpec {
                        kind: s.transition_kind.as_str().to_string(),
                        duration_s: s.transition_s,
                    },
                })
            })
            .collect()
    }

    /// Build a validated [`Timeline`] from the manifest.
    pub fn to_timeline(&self) -> ClipcomposeResult<Timeline> {
        Timeline::from_specs(self.section_specs()?)
    }
}

fn normalize(raw: RawManifest, base_dir: &Path) -> ClipcomposeResult<AssemblyManifest> {
    let video = raw.video.ok_or_else(|| {
        ClipcomposeError::validation("assembly manifest: missing required 'video' section")
    })?;
    let fps = video
        .fps
        .ok_or_else(|| ClipcomposeError::validation("assembly manifest: video.fps is required"))?;
    if fps == 0 {
        return Err(ClipcomposeError::validation(
            "assembly manifest: video.fps must be > 0",
        ));
    }
    let transition_s = video.transition.ok_or_else(|| {
        ClipcomposeError::validation("assembly manifest: video.transition is required")
    })?;
    check_transition_s(transition_s, "assembly manifest: video.transition")?;
    let transition_kind = match video.transition_type.as_deref() {
        None => TransitionKind::Crossfade,
        Some(s) => parse_kind(s, "assembly manifest: invalid video.transition_type")?,
    };

    let mut sections = Vec::with_capacity(raw.sections.len());
    for (i, s) in raw.sections.into_iter().enumerate() {
        let path = s.path.ok_or_else(|| {
            ClipcomposeError::validation(format!(
                "assembly section {i}: missing required field 'path'"
            ))
        })?;
        let path = PathBuf::from(resolve_path_vars(&path, &raw.paths).map_err(|e| match e {
            ClipcomposeError::Validation(msg) => {
                ClipcomposeError::validation(format!("assembly section {i}: {msg}"))
            }
            other => other,
        })?);
        let path = if path.is_relative() {
            base_dir.join(path)
        } else {
            path
        };

        let t = match s.transition {
            None => transition_s,
            Some(t) => {
                check_transition_s(t, &format!("assembly section {i}: transition"))?;
                t
            }
        };
        let kind = match s.transition_type.as_deref() {
            None => transition_kind,
            Some(k) => parse_kind(k, &format!("assembly section {i}: invalid transition_type"))?,
        };
        if let Some(d) = s.duration
            && !(d.is_finite() && d >= 0.0)
        {
            return Err(ClipcomposeError::validation(format!(
                "assembly section {i}: duration must be >= 0, got {d}"
            )));
        }

        sections.push(ManifestSection {
            path,
            transition_s: t,
            transition_kind: kind,
            duration_s: s.duration,
        });
    }

    Ok(AssemblyManifest {
        video: VideoSettings {
            fps,
            transition_s,
            transition_kind,
        },
        sections,
    })
}

fn check_transition_s(v: f64, what: &str) -> ClipcomposeResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ClipcomposeError::validation(format!(
            "{what} must be >= 0, got {v}"
        )))
    }
}

fn parse_kind(s: &str, what: &str) -> ClipcomposeResult<TransitionKind> {
    TransitionKind::parse(s).ok_or_else(|| {
        ClipcomposeError::validation(format!(
            "{what} '{s}'. Valid: [crossfade, fade_to_black, hard_cut]"
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/assembly.rs"]
mod tests;
