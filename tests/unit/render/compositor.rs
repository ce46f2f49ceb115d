use super::*;
use crate::foundation::core::{ColorSpec, GridDimensions};

fn dims() -> GridDimensions {
    GridDimensions::new(6, 4).unwrap()
}

fn settings(cell_size: u32) -> RenderSettings {
    RenderSettings {
        cell_size,
        outline: None,
    }
}

fn cell_color(buf: &PixelBuffer, cs: u32, vx: u32, vy: u32) -> Rgb8 {
    buf.pixel(vx * cs + cs / 2, vy * cs + cs / 2).unwrap()
}

#[test]
fn buffer_size_follows_viewport_and_cell_size() {
    let f = Frame::new(dims(), 0);
    let vp = Viewport {
        x0: 1,
        y0: 1,
        width: 3,
        height: 2,
    };
    let buf = render_frame(&f, None, &settings(5), vp).unwrap();
    assert_eq!((buf.width, buf.height), (15, 10));
    assert_eq!(buf.data.len(), 15 * 10 * 3);
}

#[test]
fn foreground_ink_on_blank_paper() {
    let f = Frame::new(dims(), 0).with_cell(1, 2, 1).with_cell(2, 2, 0);
    let buf = render_frame(&f, None, &settings(4), Viewport::full(dims())).unwrap();

    assert_eq!(cell_color(&buf, 4, 2, 1), Rgb8::BLACK);
    assert_eq!(cell_color(&buf, 4, 2, 2), Rgb8::WHITE);
    assert_eq!(cell_color(&buf, 4, 0, 0), Rgb8::WHITE);
}

#[test]
fn nonzero_default_inverts_the_mapping() {
    let f = Frame::new(dims(), 1).with_cell(0, 0, 0).with_cell(0, 1, 1);
    let buf = render_frame(&f, None, &settings(2), Viewport::full(dims())).unwrap();

    assert_eq!(cell_color(&buf, 2, 0, 0), Rgb8::WHITE);
    assert_eq!(cell_color(&buf, 2, 1, 0), Rgb8::BLACK);
    assert_eq!(cell_color(&buf, 2, 5, 3), Rgb8::BLACK);
}

#[test]
fn background_shows_through_where_frame_has_no_entry() {
    let bg = Frame::new(dims(), 0).with_cell(3, 0, 1).with_cell(3, 1, 1);
    let f = Frame::new(dims(), 0).with_cell(3, 1, 0).with_cell(0, 5, 1);
    let buf = render_frame(&f, Some(&bg), &settings(3), Viewport::full(dims())).unwrap();

    assert_eq!(cell_color(&buf, 3, 0, 3), Rgb8::BLACK);
    // The frame stores a paper value here, which wins over background ink.
    assert_eq!(cell_color(&buf, 3, 1, 3), Rgb8::WHITE);
    assert_eq!(cell_color(&buf, 3, 5, 0), Rgb8::BLACK);
    assert_eq!(cell_color(&buf, 3, 2, 2), Rgb8::WHITE);
}

#[test]
fn dark_background_fills_unstored_cells() {
    let bg = Frame::new(dims(), 1);
    let f = Frame::new(dims(), 0).with_cell(1, 1, 1);
    let buf = render_frame(&f, Some(&bg), &settings(2), Viewport::full(dims())).unwrap();

    assert_eq!(cell_color(&buf, 2, 0, 0), Rgb8::BLACK);
    assert_eq!(cell_color(&buf, 2, 1, 1), Rgb8::BLACK);
}

#[test]
fn style_override_tints_only_ink() {
    let mut f = Frame::new(dims(), 0).with_cell(0, 0, 1).with_cell(0, 1, 0);
    f.style_override = Some(ColorSpec::parse("#ff0000").unwrap());
    let buf = render_frame(&f, None, &settings(2), Viewport::full(dims())).unwrap();

    assert_eq!(cell_color(&buf, 2, 0, 0), Rgb8([255, 0, 0]));
    assert_eq!(cell_color(&buf, 2, 1, 0), Rgb8::WHITE);
}

#[test]
fn viewport_crops_and_offsets() {
    let f = Frame::new(dims(), 0).with_cell(2, 4, 1).with_cell(0, 0, 1);
    let vp = Viewport {
        x0: 3,
        y0: 1,
        width: 2,
        height: 2,
    };
    let buf = render_frame(&f, None, &settings(1), vp).unwrap();
    assert_eq!((buf.width, buf.height), (2, 2));
    assert_eq!(buf.pixel(1, 1), Some(Rgb8::BLACK));
    assert_eq!(buf.pixel(0, 0), Some(Rgb8::WHITE));
}

#[test]
fn outline_borders_painted_cells() {
    let f = Frame::new(dims(), 0).with_cell(0, 0, 1);
    let s = RenderSettings {
        cell_size: 4,
        outline: Some(Rgb8::OUTLINE_GRAY),
    };
    let buf = render_frame(&f, None, &s, Viewport::full(dims())).unwrap();
    assert_eq!(buf.pixel(0, 0), Some(Rgb8::OUTLINE_GRAY));
    assert_eq!(buf.pixel(3, 2), Some(Rgb8::OUTLINE_GRAY));
    assert_eq!(buf.pixel(1, 1), Some(Rgb8::BLACK));
    // Unstored cells without a background are not outlined.
    assert_eq!(buf.pixel(4, 0), Some(Rgb8::WHITE));

    let bg = Frame::new(dims(), 0);
    let with_bg = render_frame(&f, Some(&bg), &s, Viewport::full(dims())).unwrap();
    assert_eq!(with_bg.pixel(4, 0), Some(Rgb8::OUTLINE_GRAY));
}

#[test]
fn rejects_bad_viewport_and_cell_size() {
    let f = Frame::new(dims(), 0);
    let vp = Viewport {
        x0: 5,
        y0: 0,
        width: 2,
        height: 1,
    };
    assert!(matches!(
        render_frame(&f, None, &settings(2), vp),
        Err(StickgridError::IndexOutOfRange(_))
    ));
    assert!(matches!(
        render_frame(&f, None, &settings(0), Viewport::full(dims())),
        Err(StickgridError::InvalidArgument(_))
    ));
}

#[test]
fn rendering_is_deterministic() {
    let bg = Frame::new(dims(), 0).with_cell(1, 1, 1);
    let f = Frame::new(dims(), 0).with_cell(2, 3, 1);
    let a = render_frame(&f, Some(&bg), &settings(3), Viewport::full(dims())).unwrap();
    let b = render_frame(&f, Some(&bg), &settings(3), Viewport::full(dims())).unwrap();
    assert_eq!(a, b);
}
