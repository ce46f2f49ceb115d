use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{GridDimensions, Rgb8, Viewport};
use crate::frame::model::Frame;
use crate::viewport::resolver::{ViewportMode, ViewportPolicy};

fn dims() -> GridDimensions {
    GridDimensions::new(20, 20).unwrap()
}

fn opts(fps: u32) -> ExportOpts {
    ExportOpts {
        fps,
        settings: RenderSettings {
            cell_size: 2,
            outline: None,
        },
        ..ExportOpts::default()
    }
}

fn seq_with(durations: &[u32]) -> Sequencer {
    let mut seq = Sequencer::new();
    for (i, &ms) in durations.iter().enumerate() {
        seq.append(
            Frame::new(dims(), 0).with_cell(i as u32, i as u32, 1),
            None,
            ms,
            format!("f{i}"),
        )
        .unwrap();
    }
    seq
}

#[test]
fn repeat_count_rounds_and_never_drops_a_frame() {
    assert_eq!(repeat_count(5, 200), 1);
    assert_eq!(repeat_count(5, 400), 2);
    assert_eq!(repeat_count(5, 300), 2);
    assert_eq!(repeat_count(5, 299), 1);
    assert_eq!(repeat_count(1, 10), 1);
    assert_eq!(repeat_count(30, 1000), 30);
}

#[test]
fn durations_drive_the_stream_length() {
    let seq = seq_with(&[200, 400]);
    let mut sink = InMemorySink::new();
    let stats = export_to_sink(&seq, &opts(5), &mut sink).unwrap();

    assert_eq!(
        stats,
        ExportStats {
            frames_rendered: 2,
            frames_written: 3
        }
    );
    assert!(sink.is_ended());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height, cfg.fps), (32, 32, 5));
    let frames = sink.frames();
    assert_eq!(frames.len(), 3);
    assert_ne!(frames[0], frames[1]);
    assert_eq!(frames[1], frames[2]);
    assert_eq!(frames[0].pixel(1, 1), Some(Rgb8::BLACK));
}

#[test]
fn rejects_zero_fps_and_empty_sequences() {
    let mut sink = InMemorySink::new();
    assert!(matches!(
        export_to_sink(&seq_with(&[100]), &opts(0), &mut sink),
        Err(StickgridError::InvalidArgument(_))
    ));
    assert!(matches!(
        export_to_sink(&Sequencer::new(), &opts(5), &mut sink),
        Err(StickgridError::InvalidArgument(_))
    ));
    assert!(sink.frames().is_empty());
    assert!(sink.config().is_none());
}

#[test]
fn unlocked_content_viewports_of_different_size_fail_before_output() {
    let mut seq = Sequencer::with_policy(ViewportPolicy {
        mode: ViewportMode::ContentBoundingBox,
        padding: 0,
        min_width: 1,
        min_height: 1,
        lock_to_union: false,
    });
    seq.append(Frame::new(dims(), 0).with_cell(2, 2, 1), None, 100, "dot")
        .unwrap();
    seq.append(
        Frame::new(dims(), 0).with_cell(2, 2, 1).with_cell(5, 9, 1),
        None,
        100,
        "wide",
    )
    .unwrap();

    let mut sink = InMemorySink::new();
    assert!(matches!(
        export_to_sink(&seq, &opts(5), &mut sink),
        Err(StickgridError::InvalidArgument(_))
    ));
    assert!(sink.config().is_none());
}

#[test]
fn locked_union_viewport_is_shared_by_every_frame() {
    let mut seq = Sequencer::with_policy(ViewportPolicy {
        mode: ViewportMode::ContentBoundingBox,
        padding: 0,
        min_width: 1,
        min_height: 1,
        lock_to_union: true,
    });
    seq.append(Frame::new(dims(), 0).with_cell(2, 2, 1), None, 100, "dot")
        .unwrap();
    seq.append(Frame::new(dims(), 0).with_cell(5, 9, 1), None, 100, "other")
        .unwrap();

    let plan = plan_export(&seq, &opts(10)).unwrap();
    assert_eq!(plan.frames[0].viewport, plan.frames[1].viewport);
    assert_eq!((plan.width, plan.height), (16, 8));
    assert_eq!(plan.total_frames(), 2);
}

#[test]
fn default_policy_exports_the_padded_union_crop() {
    let big = GridDimensions::new(40, 40).unwrap();
    let mut seq = Sequencer::new();
    seq.append(Frame::new(big, 0).with_cell(10, 10, 1), None, 100, "a")
        .unwrap();
    seq.append(Frame::new(big, 0).with_cell(12, 14, 1), None, 100, "b")
        .unwrap();

    let plan = plan_export(&seq, &opts(10)).unwrap();
    let crop = Viewport {
        x0: 5,
        y0: 4,
        width: 16,
        height: 16,
    };
    assert!(plan.frames.iter().all(|f| f.viewport == crop));
    assert_eq!((plan.width, plan.height), (32, 32));
    // Cell (10, 10) sits at crop offset (row 6, col 5).
    assert_eq!(plan.frames[0].pixels.pixel(10, 12), Some(Rgb8::BLACK));
}

#[test]
fn locked_export_handles_a_smaller_second_grid() {
    let mut seq = Sequencer::new();
    seq.append(
        Frame::new(GridDimensions::new(40, 40).unwrap(), 0).with_cell(10, 10, 1),
        None,
        100,
        "big",
    )
    .unwrap();
    seq.append(
        Frame::new(dims(), 0).with_cell(12, 14, 1),
        None,
        100,
        "small",
    )
    .unwrap();

    let plan = plan_export(&seq, &opts(10)).unwrap();
    assert_eq!(
        plan.frames[1].viewport,
        Viewport {
            x0: 4,
            y0: 4,
            width: 16,
            height: 16
        }
    );
    assert_eq!((plan.width, plan.height), (32, 32));
}

#[test]
fn parallel_rendering_preserves_order() {
    let seq = seq_with(&[100, 200, 300, 400, 500]);
    let sequential = plan_export(&seq, &opts(10)).unwrap();
    let parallel = plan_export(
        &seq,
        &ExportOpts {
            parallel: true,
            threads: Some(2),
            ..opts(10)
        },
    )
    .unwrap();

    let a: Vec<_> = sequential.frames.iter().map(|f| &f.pixels).collect();
    let b: Vec<_> = parallel.frames.iter().map(|f| &f.pixels).collect();
    assert_eq!(a, b);
    assert_eq!(parallel.total_frames(), 1 + 2 + 3 + 4 + 5);
}

#[test]
fn zero_threads_is_rejected() {
    let seq = seq_with(&[100]);
    let res = plan_export(
        &seq,
        &ExportOpts {
            parallel: true,
            threads: Some(0),
            ..opts(5)
        },
    );
    assert!(matches!(res, Err(StickgridError::InvalidArgument(_))));
}
