use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ClipcomposeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ClipcomposeError::probe("x").to_string().contains("probe error:"));
    assert!(
        ClipcomposeError::encode("x")
            .to_string()
            .contains("encode error:")
    );
}

#[test]
fn timeline_errors_name_the_section() {
    let err = ClipcomposeError::OverlapExceedsClip {
        index: 2,
        overlap: 3.0,
        shorter: 2.0,
    };
    assert_eq!(err.section_index(), Some(2));
    assert!(err.to_string().starts_with("section 2:"));

    let err = ClipcomposeError::NegativeDuration {
        index: 0,
        what: DurationField::Transition,
        value: -1.0,
    };
    assert!(err.to_string().contains("transition duration must be >= 0"));

    assert_eq!(ClipcomposeError::EmptyTimeline.section_index(), None);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ClipcomposeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.section_index(), None);
}
