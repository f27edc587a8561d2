use super::*;

fn two_input_graph(ops: Vec<GraphOp>, output: StreamRef) -> FilterGraph {
    FilterGraph {
        inputs: vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")],
        fragments: vec![Fragment {
            sections: 0..2,
            ops,
            output,
            start_s: 0.0,
            duration_s: 3.0,
        }],
        join: None,
        output,
        total_duration_s: 3.0,
    }
}

#[test]
fn passthrough_aliases_are_resolved_through_chains() {
    let g = two_input_graph(
        vec![
            GraphOp::Passthrough {
                input: StreamRef::Input(1),
                output: NodeId(0),
            },
            GraphOp::Passthrough {
                input: StreamRef::Node(NodeId(0)),
                output: NodeId(1),
            },
            GraphOp::FadeIn {
                input: StreamRef::Node(NodeId(1)),
                duration_s: 0.5,
                output: NodeId(2),
            },
        ],
        StreamRef::Node(NodeId(2)),
    );
    assert_eq!(g.to_filter_complex(), "[1:v]fade=t=in:st=0:d=0.500[v2]");
    assert_eq!(g.output_map(), "[v2]");
    assert!(!g.is_passthrough());
}

#[test]
fn op_accessors_report_streams() {
    let op = GraphOp::Crossfade {
        a: StreamRef::Input(0),
        b: StreamRef::Input(1),
        overlap_s: 1.0,
        offset_s: 2.0,
        output: NodeId(7),
    };
    assert_eq!(op.output(), NodeId(7));
    assert_eq!(op.inputs(), vec![StreamRef::Input(0), StreamRef::Input(1)]);

    let op = GraphOp::Concat {
        inputs: vec![StreamRef::Node(NodeId(1)), StreamRef::Input(3)],
        output: NodeId(4),
    };
    assert_eq!(op.inputs().len(), 2);
}

#[test]
fn fingerprint_tracks_program_and_inputs() {
    let ops = || {
        vec![GraphOp::Crossfade {
            a: StreamRef::Input(0),
            b: StreamRef::Input(1),
            overlap_s: 1.0,
            offset_s: 2.0,
            output: NodeId(0),
        }]
    };
    let a = two_input_graph(ops(), StreamRef::Node(NodeId(0)));
    let b = two_input_graph(ops(), StreamRef::Node(NodeId(0)));
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.fingerprint().to_string().len(), 32);

    let mut c = two_input_graph(ops(), StreamRef::Node(NodeId(0)));
    c.inputs[1] = PathBuf::from("other.mp4");
    assert_ne!(a.fingerprint(), c.fingerprint());

    let mut d = two_input_graph(ops(), StreamRef::Node(NodeId(0)));
    if let GraphOp::Crossfade { offset_s, .. } = &mut d.fragments[0].ops[0] {
        *offset_s = 2.5;
    }
    assert_ne!(a.fingerprint(), d.fingerprint());
}

#[test]
fn graph_serializes_with_tagged_ops() {
    let g = two_input_graph(
        vec![GraphOp::FadeOut {
            input: StreamRef::Input(0),
            start_s: 2.5,
            duration_s: 0.5,
            output: NodeId(0),
        }],
        StreamRef::Node(NodeId(0)),
    );
    let v = serde_json::to_value(&g).unwrap();
    assert_eq!(v["fragments"][0]["ops"][0]["op"], "fade_out");
    assert_eq!(v["fragments"][0]["ops"][0]["input"]["input"], 0);
    assert_eq!(v["output"]["node"], 0);
}
