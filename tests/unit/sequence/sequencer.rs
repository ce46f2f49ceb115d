use super::*;
use crate::foundation::core::CellCoord;
use crate::viewport::resolver::ViewportMode;

fn dims() -> GridDimensions {
    GridDimensions::new(40, 30).unwrap()
}

fn tight_policy(lock_to_union: bool) -> ViewportPolicy {
    ViewportPolicy {
        mode: ViewportMode::ContentBoundingBox,
        padding: 1,
        min_width: 1,
        min_height: 1,
        lock_to_union,
    }
}

fn two_frames(seq: &mut Sequencer) {
    seq.append(Frame::new(dims(), 0).with_cell(5, 5, 1), None, 200, "a.json")
        .unwrap();
    seq.append(Frame::new(dims(), 0).with_cell(10, 12, 1), None, 400, "b.json")
        .unwrap();
}

#[test]
fn append_returns_indices_and_rejects_zero_duration() {
    let mut seq = Sequencer::new();
    assert!(seq.is_empty());
    assert_eq!(
        seq.append(Frame::new(dims(), 0), None, 100, "one").unwrap(),
        0
    );
    assert_eq!(
        seq.append(Frame::new(dims(), 0), None, 100, "two").unwrap(),
        1
    );
    assert!(matches!(
        seq.append(Frame::new(dims(), 0), None, 0, "zero"),
        Err(StickgridError::InvalidArgument(_))
    ));
    assert_eq!(seq.len(), 2);
}

#[test]
fn out_of_range_indices_are_reported() {
    let mut seq = Sequencer::new();
    two_frames(&mut seq);
    assert!(matches!(seq.entry(2), Err(StickgridError::IndexOutOfRange(_))));
    assert!(matches!(
        seq.set_duration(5, 100),
        Err(StickgridError::IndexOutOfRange(_))
    ));
    assert!(matches!(
        seq.replace_background(9, None, ""),
        Err(StickgridError::IndexOutOfRange(_))
    ));
    assert!(matches!(
        seq.viewport_for(2),
        Err(StickgridError::IndexOutOfRange(_))
    ));
}

#[test]
fn set_duration_validates() {
    let mut seq = Sequencer::new();
    two_frames(&mut seq);
    seq.set_duration(1, 50).unwrap();
    assert_eq!(seq.entry(1).unwrap().duration_ms, 50);
    assert!(matches!(
        seq.set_duration(1, 0),
        Err(StickgridError::InvalidArgument(_))
    ));
    assert_eq!(seq.entry(1).unwrap().duration_ms, 50);
}

#[test]
fn backgrounds_attach_and_detach_with_labels() {
    let mut seq = Sequencer::new();
    two_frames(&mut seq);
    let bg = Arc::new(Frame::new(dims(), 1));

    seq.replace_background(0, Some(bg.clone()), "bg.json").unwrap();
    let e = seq.entry(0).unwrap();
    assert!(e.background.is_some());
    assert_eq!(e.background_label, "bg.json");

    seq.replace_background(0, None, "ignored").unwrap();
    let e = seq.entry(0).unwrap();
    assert!(e.background.is_none());
    assert!(e.background_label.is_empty());
}

#[test]
fn summaries_describe_every_entry() {
    let mut seq = Sequencer::new();
    two_frames(&mut seq);
    seq.replace_background(1, Some(Arc::new(Frame::new(dims(), 0))), "bg")
        .unwrap();

    let s = seq.summaries();
    assert_eq!(s.len(), 2);
    assert_eq!(s[0].name, "a.json");
    assert_eq!(s[0].duration_ms, 200);
    assert_eq!((s[0].grid_width, s[0].grid_height), (40, 30));
    assert!(!s[0].has_background);
    assert_eq!(s[1].index, 1);
    assert!(s[1].has_background);
}

#[test]
fn edit_frame_copies_shared_frames() {
    let shared = Arc::new(Frame::new(dims(), 0).with_cell(1, 1, 1));
    let mut seq = Sequencer::new();
    seq.append(shared.clone(), None, 100, "shared").unwrap();

    let outcome = seq
        .edit_frame(0, |f| f.translate_cells(&[(1, 1)], 0, 1))
        .unwrap();
    assert_eq!(outcome.moved.len(), 1);

    // The caller's copy is untouched.
    assert!(shared.boxes.contains(CellCoord::new(1, 1)));
    let edited = &seq.entry(0).unwrap().frame;
    assert!(edited.boxes.contains(CellCoord::new(1, 2)));
    assert!(!edited.boxes.contains(CellCoord::new(1, 1)));
}

#[test]
fn locked_policy_shares_the_union_viewport() {
    let mut seq = Sequencer::with_policy(tight_policy(true));
    two_frames(&mut seq);

    let expected = Viewport {
        x0: 4,
        y0: 4,
        width: 10,
        height: 8,
    };
    assert_eq!(seq.locked_viewport(), Some(expected));
    assert_eq!(seq.viewport_for(0).unwrap(), expected);
    assert_eq!(seq.viewport_for(1).unwrap(), expected);
}

#[test]
fn unlocked_policy_resolves_per_frame() {
    let mut seq = Sequencer::with_policy(tight_policy(false));
    two_frames(&mut seq);

    assert_eq!(seq.locked_viewport(), None);
    assert_eq!(
        seq.viewport_for(0).unwrap(),
        Viewport {
            x0: 4,
            y0: 4,
            width: 3,
            height: 3
        }
    );
    assert_eq!(
        seq.viewport_for(1).unwrap(),
        Viewport {
            x0: 11,
            y0: 9,
            width: 3,
            height: 3
        }
    );
}

#[test]
fn full_mode_lock_crops_to_the_padded_union() {
    let mut seq = Sequencer::with_policy(ViewportPolicy {
        mode: ViewportMode::Full,
        lock_to_union: true,
        ..ViewportPolicy::default()
    });
    two_frames(&mut seq);

    let expected = Viewport {
        x0: 1,
        y0: 0,
        width: 16,
        height: 16,
    };
    assert_eq!(seq.locked_viewport(), Some(expected));
    assert_eq!(seq.viewport_for(1).unwrap(), expected);

    seq.set_policy(ViewportPolicy {
        lock_to_union: false,
        ..*seq.policy()
    });
    assert_eq!(seq.locked_viewport(), None);
    assert_eq!(seq.viewport_for(1).unwrap(), Viewport::full(dims()));
}

#[test]
fn locked_union_is_clamped_into_smaller_grids() {
    let mut seq = Sequencer::with_policy(tight_policy(true));
    seq.append(Frame::new(dims(), 0).with_cell(25, 30, 1), None, 100, "big")
        .unwrap();
    let small = GridDimensions::new(10, 8).unwrap();
    seq.append(Frame::new(small, 0).with_cell(1, 1, 1), None, 100, "small")
        .unwrap();

    assert_eq!(
        seq.locked_viewport(),
        Some(Viewport {
            x0: 0,
            y0: 0,
            width: 32,
            height: 27
        })
    );
    assert_eq!(seq.viewport_for(1).unwrap(), Viewport::full(small));

    let settings = RenderSettings {
        cell_size: 1,
        outline: None,
    };
    let buf = seq.render_entry(1, &settings, None).unwrap();
    assert_eq!((buf.width, buf.height), (10, 8));
}

#[test]
fn render_entry_uses_the_resolved_viewport() {
    let mut seq = Sequencer::with_policy(tight_policy(true));
    two_frames(&mut seq);
    let settings = RenderSettings {
        cell_size: 2,
        outline: None,
    };
    let buf = seq.render_entry(0, &settings, None).unwrap();
    assert_eq!((buf.width, buf.height), (20, 16));

    let full = seq
        .render_entry(0, &settings, Some(Viewport::full(dims())))
        .unwrap();
    assert_eq!((full.width, full.height), (80, 60));
}

#[test]
fn clear_keeps_policy() {
    let mut seq = Sequencer::with_policy(tight_policy(true));
    two_frames(&mut seq);
    seq.clear();
    assert!(seq.is_empty());
    assert_eq!(seq.policy(), &tight_policy(true));
    assert_eq!(seq.grid_dimensions(), DEFAULT_GRID_DIMENSIONS);
}
