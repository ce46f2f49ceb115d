use super::*;
use crate::foundation::error::StickgridError;

fn frame() -> Frame {
    Frame::new(GridDimensions::new(10, 8).unwrap(), 0)
}

#[test]
fn move_selection_shifts_cells_inside_rect() {
    let mut f = frame().with_cell(3, 4, 1).with_cell(0, 0, 1);
    let rect = SelectionRect {
        r0: 2,
        c0: 3,
        r1: 4,
        c1: 6,
    };
    f.move_selection(rect, 1, 0).unwrap();

    assert_eq!(f.boxes.get(CellCoord::new(4, 4)), Some(1));
    assert_eq!(f.boxes.get(CellCoord::new(3, 4)), None);
    assert_eq!(f.boxes.get(CellCoord::new(0, 0)), Some(1));
}

#[test]
fn move_selection_does_not_clobber_cells_outside_the_moved_set() {
    // (3,3) is inside the grid but outside the selection; a moved cell lands on it.
    let mut f = frame().with_cell(3, 2, 1).with_cell(3, 3, 5);
    let rect = SelectionRect {
        r0: 3,
        c0: 2,
        r1: 3,
        c1: 2,
    };
    f.move_selection(rect, 0, 1).unwrap();
    assert_eq!(f.boxes.get(CellCoord::new(3, 3)), Some(1));
    assert_eq!(f.boxes.len(), 1);
}

#[test]
fn move_selection_outside_grid_is_index_error() {
    let mut f = frame().with_cell(1, 1, 1);
    let rect = SelectionRect {
        r0: 20,
        c0: 20,
        r1: 30,
        c1: 30,
    };
    assert!(matches!(
        f.move_selection(rect, 1, 1),
        Err(StickgridError::IndexOutOfRange(_))
    ));
    assert_eq!(f.boxes.len(), 1);
}

#[test]
fn translate_drops_off_grid_destinations() {
    let mut f = frame().with_cell(7, 0, 1).with_cell(6, 0, 1);
    let out = f.translate_cells(&[(7, 0), (6, 0), (-1, 4)], 1, 0);
    assert_eq!(out.dropped, vec![CellCoord::new(7, 0)]);
    assert_eq!(f.boxes.get(CellCoord::new(7, 0)), Some(1));
    assert_eq!(f.boxes.len(), 1);
}

#[test]
fn joints_follow_their_cells() {
    let mut f = frame().with_cell(2, 2, 1).with_cell(7, 9, 1);
    f.joints.insert("hip".to_string(), CellCoord::new(2, 2));
    f.joints.insert("r_foot".to_string(), CellCoord::new(7, 9));
    f.joints.insert("head_c".to_string(), CellCoord::new(0, 0));

    f.translate_cells(&[(2, 2), (7, 9)], 0, 1);

    assert_eq!(f.joints.get("hip"), Some(&CellCoord::new(2, 3)));
    assert!(!f.joints.contains_key("r_foot"));
    assert_eq!(f.joints.get("head_c"), Some(&CellCoord::new(0, 0)));
}

#[test]
fn content_bounds_uses_frame_default() {
    let f = Frame::new(GridDimensions::new(10, 8).unwrap(), 1)
        .with_cell(1, 1, 1)
        .with_cell(4, 6, 0);
    let b = f.content_bounds().unwrap();
    assert_eq!((b.min_row, b.max_row, b.min_col, b.max_col), (4, 4, 6, 6));
    assert_eq!(f.painted().count(), 1);
}
