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

#[test]
fn single_section_is_one_run_without_breakpoints() {
    let plan = partition(&timeline(&[(4.0, Transition::crossfade(1.0))]));
    assert_eq!(plan.run_count(), 1);
    assert_eq!(plan.breakpoint_count(), 0);
    assert_eq!(plan.segments(), &[Segment::Run(Run { sections: 0..1 })]);
}

#[test]
fn crossfades_extend_the_current_run() {
    let plan = partition(&timeline(&[
        (5.0, Transition::crossfade(1.0)),
        (5.0, Transition::crossfade(1.0)),
        (5.0, Transition::hard_cut()),
    ]));
    assert_eq!(plan.segments(), &[Segment::Run(Run { sections: 0..3 })]);
}

#[test]
fn breakpoints_close_the_run_including_their_owner() {
    let plan = partition(&timeline(&[
        (3.0, Transition::crossfade(1.0)),
        (4.0, Transition::fade_to_black(0.4)),
        (2.0, Transition::hard_cut()),
    ]));
    assert_eq!(
        plan.segments(),
        &[
            Segment::Run(Run { sections: 0..2 }),
            Segment::Breakpoint(Breakpoint {
                after: 1,
                kind: BreakKind::FadeToBlack,
                duration_s: 0.4,
            }),
            Segment::Run(Run { sections: 2..3 }),
        ]
    );
    let bp = plan.breakpoints().next().unwrap();
    assert!((bp.fade_half_s() - 0.2).abs() < 1e-12);
}

#[test]
fn adjacent_hard_cuts_yield_degenerate_runs() {
    let plan = partition(&timeline(&[
        (1.0, Transition::hard_cut()),
        (2.0, Transition::hard_cut()),
        (3.0, Transition::hard_cut()),
    ]));
    assert_eq!(plan.run_count(), 3);
    assert_eq!(plan.breakpoint_count(), 2);
    assert!(plan.runs().all(Run::is_single));
    assert!(plan.breakpoints().all(|b| b.kind == BreakKind::HardCut));
}

#[test]
fn zero_length_crossfade_breaks_the_run() {
    let plan = partition(&timeline(&[
        (3.0, Transition::crossfade(0.0)),
        (3.0, Transition::hard_cut()),
    ]));
    assert_eq!(plan.run_count(), 2);
    assert_eq!(plan.breakpoints().next().unwrap().kind, BreakKind::HardCut);
}

#[test]
fn partition_is_lossless() {
    let tl = timeline(&[
        (3.0, Transition::hard_cut()),
        (3.0, Transition::crossfade(0.5)),
        (3.0, Transition::crossfade(0.5)),
        (3.0, Transition::fade_to_black(1.0)),
        (3.0, Transition::crossfade(0.5)),
        (3.0, Transition::hard_cut()),
    ]);
    let plan = partition(&tl);
    assert_eq!(plan.section_indices(), (0..tl.len()).collect::<Vec<_>>());

    // Runs and breakpoints alternate, starting and ending with a run.
    let segs = plan.segments();
    assert_eq!(segs.len() % 2, 1);
    for (i, seg) in segs.iter().enumerate() {
        assert_eq!(matches!(seg, Segment::Run(_)), i % 2 == 0);
    }

    // Every breakpoint sits on the last section of the run before it.
    for ctx in plan.run_contexts() {
        if let Some(out) = ctx.outgoing {
            assert_eq!(out.after, ctx.run.last());
        }
        if let Some(inc) = ctx.incoming {
            assert_eq!(inc.after + 1, ctx.run.first());
        }
    }
}

#[test]
fn run_contexts_attach_neighbouring_breakpoints() {
    let plan = partition(&timeline(&[
        (3.0, Transition::fade_to_black(1.0)),
        (3.0, Transition::hard_cut()),
        (3.0, Transition::hard_cut()),
    ]));
    let ctx = plan.run_contexts();
    assert_eq!(ctx.len(), 3);
    assert!(ctx[0].incoming.is_none());
    assert_eq!(ctx[0].outgoing.map(|b| b.kind), Some(BreakKind::FadeToBlack));
    assert_eq!(ctx[1].incoming.map(|b| b.kind), Some(BreakKind::FadeToBlack));
    assert_eq!(ctx[1].outgoing.map(|b| b.kind), Some(BreakKind::HardCut));
    assert!(ctx[2].outgoing.is_none());
}
