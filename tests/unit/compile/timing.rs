use super::*;
use crate::timeline::model::{Section, Transition};

fn timeline(parts: &[(f64, Transition)]) -> Timeline {
    let sections = parts
        .iter()
        .enumerate()
        .map(|(i, (d, t))| Section::new(format!("s{i}.mp4"), *d, *t))
        .collect();
    Timeline::new(sections).unwrap()
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn single_section_starts_at_zero() {
    let t = compute_timing(&timeline(&[(4.0, Transition::crossfade(1.0))]));
    assert_eq!(t.sections.len(), 1);
    assert_eq!(t.start_of(0), Some(0.0));
    assert_close(t.total_duration_s, 4.0);
    assert_eq!(t.start_of(1), None);
}

#[test]
fn only_crossfades_shift_later_sections() {
    let t = compute_timing(&timeline(&[
        (3.0, Transition::crossfade(1.0)),
        (4.0, Transition::fade_to_black(0.4)),
        (2.0, Transition::hard_cut()),
    ]));
    let starts = t.starts();
    assert_close(starts[0], 0.0);
    assert_close(starts[1], 2.0);
    assert_close(starts[2], 6.0);
    assert_close(t.sections[1].end_s, 6.0);
    assert_close(t.total_duration_s, 8.0);
}

#[test]
fn last_section_ends_at_total() {
    let t = compute_timing(&timeline(&[
        (5.0, Transition::crossfade(1.0)),
        (5.0, Transition::crossfade(1.0)),
        (5.0, Transition::hard_cut()),
    ]));
    assert_close(t.total_duration_s, 13.0);
    let last = t.sections.last().unwrap();
    assert_close(last.end_s, t.total_duration_s);
    assert_eq!(last.index, 2);
}

#[test]
fn crossfade_ends_overlap_next_start() {
    let t = compute_timing(&timeline(&[
        (2.0, Transition::crossfade(0.5)),
        (2.0, Transition::hard_cut()),
        (2.0, Transition::hard_cut()),
    ]));
    assert_close(t.sections[0].end_s - t.sections[1].start_s, 0.5);
    assert_close(t.sections[1].end_s, t.sections[2].start_s);
}
