use super::*;
use crate::compile::compiler::compile;
use crate::timeline::model::{Section, Timeline, Transition};

fn strs(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

fn graph(sections: Vec<Section>) -> FilterGraph {
    compile(&Timeline::new(sections).unwrap()).graph
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(EncodeConfig::new("out.mp4", 0).validate().is_err());
    assert!(EncodeConfig::new("", 30).validate().is_err());
    assert!(EncodeConfig::new("out.mp4", 30).validate().is_ok());
}

#[test]
fn args_for_crossfade_pair() {
    let g = graph(vec![
        Section::new("a.mp4", 3.0, Transition::crossfade(1.0)),
        Section::new("b.mp4", 4.0, Transition::hard_cut()),
    ]);
    let cfg = EncodeConfig::new("out/final.mp4", 30);
    let args = strs(&ffmpeg_args(&g, &cfg));
    assert_eq!(
        args,
        vec![
            "-y",
            "-loglevel",
            "error",
            "-i",
            "a.mp4",
            "-i",
            "b.mp4",
            "-filter_complex",
            "[0:v][1:v]xfade=transition=fade:duration=1.000:offset=2.000[v0]",
            "-map",
            "[v0]",
            "-c:v",
            "libx264",
            "-crf",
            "20",
            "-pix_fmt",
            "yuv420p",
            "-r",
            "30",
            "-an",
            "out/final.mp4",
        ]
    );
}

#[test]
fn single_section_maps_input_without_filter() {
    let g = graph(vec![Section::new("only.mp4", 5.0, Transition::hard_cut())]);
    let mut cfg = EncodeConfig::new("o.mp4", 24);
    cfg.overwrite = false;
    let args = strs(&ffmpeg_args(&g, &cfg));
    assert_eq!(args[0], "-n");
    assert!(!args.iter().any(|a| a == "-filter_complex"));
    let map = args.iter().position(|a| a == "-map").unwrap();
    assert_eq!(args[map + 1], "0:v");
}

#[test]
fn nvenc_uses_constant_quality() {
    let g = graph(vec![Section::new("only.mp4", 5.0, Transition::hard_cut())]);
    let mut cfg = EncodeConfig::new("o.mp4", 30);
    cfg.codec = Codec::H264Nvenc;
    let args = strs(&ffmpeg_args(&g, &cfg));
    let codec = args.iter().position(|a| a == "-c:v").unwrap();
    assert_eq!(&args[codec + 1..codec + 4], ["h264_nvenc", "-cq", "20"]);
    assert!(!args.iter().any(|a| a == "-crf"));
}

#[test]
fn one_input_per_section_in_order() {
    let g = graph(vec![
        Section::new("a.mp4", 2.0, Transition::hard_cut()),
        Section::new("b.mp4", 2.0, Transition::fade_to_black(1.0)),
        Section::new("c.mp4", 2.0, Transition::hard_cut()),
    ]);
    let args = strs(&ffmpeg_args(&g, &EncodeConfig::new("o.mp4", 30)));
    let inputs: Vec<&str> = args
        .windows(2)
        .filter(|w| w[0] == "-i")
        .map(|w| w[1].as_str())
        .collect();
    assert_eq!(inputs, vec!["a.mp4", "b.mp4", "c.mp4"]);
}

#[test]
fn existing_output_is_kept_without_overwrite() {
    let dir = PathBuf::from("target/encode_no_overwrite_unit");
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("exists.mp4");
    std::fs::write(&out, b"").unwrap();

    let g = graph(vec![Section::new("only.mp4", 1.0, Transition::hard_cut())]);
    let mut cfg = EncodeConfig::new(&out, 30);
    cfg.overwrite = false;
    cfg.ffmpeg_bin = PathBuf::from("clipcompose-no-such-ffmpeg");
    let err = encode(&g, &cfg).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn missing_ffmpeg_is_an_encode_error() {
    let g = graph(vec![Section::new("only.mp4", 1.0, Transition::hard_cut())]);
    let mut cfg = EncodeConfig::new("target/encode_missing_bin_unit/out.mp4", 30);
    cfg.ffmpeg_bin = PathBuf::from("clipcompose-no-such-ffmpeg");
    let err = encode(&g, &cfg).unwrap_err();
    assert!(matches!(err, ClipcomposeError::Encode(_)));
    assert!(!is_on_path(&cfg.ffmpeg_bin));
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let out = PathBuf::from("target/encode_parent_unit/a/b/out.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(out.parent().unwrap().is_dir());
    ensure_parent_dir(Path::new("bare.mp4")).unwrap();
}
