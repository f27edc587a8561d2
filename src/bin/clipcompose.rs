use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clipcompose", version, about = "Assemble pre-rendered sections into one video")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile the manifest and encode the final video (requires `ffmpeg`).
    Assemble(AssembleArgs),
    /// Load the manifest and check that every section file exists.
    Validate(ValidateArgs),
    /// Print the run plan and filter program without encoding.
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
struct ProbeArgs {
    /// `ffprobe` used for sections without an explicit duration.
    #[arg(long, env = "CLIPCOMPOSE_FFPROBE", default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// Override probe worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct AssembleArgs {
    /// Assembly manifest (`.json`, `.yaml` or `.yml`).
    #[arg(long)]
    manifest: PathBuf,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Encode with NVIDIA NVENC instead of libx264.
    #[arg(long, default_value_t = false)]
    gpu: bool,

    /// Fail if the output file already exists.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// `ffmpeg` used for encoding.
    #[arg(long, env = "CLIPCOMPOSE_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Print the ffmpeg command instead of running it.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[command(flatten)]
    probe: ProbeArgs,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Assembly manifest (`.json`, `.yaml` or `.yml`).
    #[arg(long)]
    manifest: PathBuf,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Assembly manifest (`.json`, `.yaml` or `.yml`).
    #[arg(long)]
    manifest: PathBuf,

    /// Dump the compiled assembly as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(flatten)]
    probe: ProbeArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Assemble(args) => cmd_assemble(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn load_and_compile(
    manifest_path: &Path,
    probe: &ProbeArgs,
) -> anyhow::Result<(clipcompose::AssemblyManifest, clipcompose::Assembly)> {
    let mut manifest = clipcompose::AssemblyManifest::from_path(manifest_path)?;
    manifest.validate_paths()?;

    if !manifest.missing_durations().is_empty() {
        let ffprobe = clipcompose::Ffprobe {
            bin: probe.ffprobe.clone(),
        };
        let opts = clipcompose::ProbeOpts {
            threads: probe.threads,
        };
        clipcompose::resolve_durations(&mut manifest, &ffprobe, &opts)
            .context("probe section durations")?;
    }

    let timeline = manifest.to_timeline()?;
    let assembly = clipcompose::compile(&timeline);
    Ok((manifest, assembly))
}

fn cmd_assemble(args: AssembleArgs) -> anyhow::Result<()> {
    let (manifest, assembly) = load_and_compile(&args.manifest, &args.probe)?;

    let cfg = clipcompose::EncodeConfig {
        ffmpeg_bin: args.ffmpeg.clone(),
        codec: if args.gpu {
            clipcompose::Codec::H264Nvenc
        } else {
            clipcompose::Codec::Libx264
        },
        fps: manifest.video.fps,
        out_path: args.out.clone(),
        overwrite: !args.no_overwrite,
    };
    cfg.validate()?;

    if args.dry_run {
        let mut line = shell_word(cfg.ffmpeg_bin.as_os_str());
        for a in clipcompose::ffmpeg_args(&assembly.graph, &cfg) {
            line.push(' ');
            line.push_str(&shell_word(&a));
        }
        println!("{line}");
        return Ok(());
    }

    if !clipcompose::is_on_path(&cfg.ffmpeg_bin) {
        anyhow::bail!(
            "'{}' was not found; install ffmpeg or pass --ffmpeg",
            cfg.ffmpeg_bin.display()
        );
    }
    clipcompose::encode(&assembly.graph, &cfg)?;

    eprintln!(
        "wrote {} ({:.3}s, {} sections)",
        args.out.display(),
        assembly.graph.total_duration_s,
        manifest.sections.len()
    );
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let manifest = clipcompose::AssemblyManifest::from_path(&args.manifest)?;
    manifest.validate_paths()?;

    println!(
        "{} section(s), {} fps",
        manifest.sections.len(),
        manifest.video.fps
    );
    for (i, s) in manifest.sections.iter().enumerate() {
        let duration = s
            .duration_s
            .map_or_else(|| "?".to_string(), |d| format!("{d:.3}s"));
        println!(
            "{i:>3}  {}  {duration}  -> {} {:.3}s",
            s.path.display(),
            s.transition_kind,
            s.transition_s
        );
    }

    if manifest.missing_durations().is_empty() {
        manifest.to_timeline()?;
        println!("ok");
    } else {
        println!("ok (durations will be probed at assembly time)");
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let (_manifest, assembly) = load_and_compile(&args.manifest, &args.probe)?;

    if args.json {
        let json = serde_json::to_string_pretty(&assembly).context("serialize assembly")?;
        println!("{json}");
        return Ok(());
    }

    let plan = &assembly.plan;
    println!(
        "{} run(s), {} breakpoint(s), total {:.3}s",
        plan.run_count(),
        plan.breakpoint_count(),
        assembly.timing.total_duration_s
    );
    for seg in plan.segments() {
        match seg {
            clipcompose::Segment::Run(run) => {
                println!("run  sections {}..={}", run.first(), run.last());
                for i in run.sections.clone() {
                    if let Some(t) = assembly.timing.sections.get(i) {
                        println!("  {i:>3}  {:.3}s .. {:.3}s", t.start_s, t.end_s);
                    }
                }
            }
            clipcompose::Segment::Breakpoint(b) => {
                let kind = match b.kind {
                    clipcompose::BreakKind::FadeToBlack => "fade_to_black",
                    clipcompose::BreakKind::HardCut => "hard_cut",
                };
                println!("break after {}: {kind} {:.3}s", b.after, b.duration_s);
            }
        }
    }

    if assembly.graph.is_passthrough() {
        println!("filter_complex: (none)");
    } else {
        println!("filter_complex: {}", assembly.graph.to_filter_complex());
    }
    println!("map: {}", assembly.graph.output_map());
    println!("fingerprint: {}", assembly.graph.fingerprint());
    Ok(())
}

fn shell_word(s: &OsStr) -> String {
    let s = s.to_string_lossy();
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,".contains(c));
    if plain {
        s.into_owned()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
