/// Seconds as they appear in an ffmpeg filter program.
pub(crate) fn fmt_secs(v: f64) -> String {
    // Rounding residue from compounded overlaps must not print as `-0.000`.
    let v = if v.abs() < 0.0005 { 0.0 } else { v };
    format!("{v:.3}")
}
