use super::*;
use crate::canvas::observer::InMemoryFrames;
use crate::foundation::core::Point;
use std::sync::{Arc, Mutex};

fn small() -> RasterCanvas {
    RasterCanvas::new(RasterCanvasOpts {
        width: 64,
        height: 48,
        background: Color::BACKGROUND,
        ..RasterCanvasOpts::default()
    })
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Vec<u64>>>);

impl FrameObserver for Shared {
    fn frame_complete(&mut self, index: u64, _frame: &FrameRGBA) -> VisionResult<()> {
        self.0.lock().unwrap().push(index);
        Ok(())
    }
}

#[test]
fn draws_before_refresh_are_rejected() {
    let mut canvas = small();
    let err = canvas
        .line(&Line::new(Point(0.0, 0.0), Point(10.0, 10.0)))
        .unwrap_err();
    assert!(matches!(
        err,
        VisionError::UninitializedCanvas { operation: "line" }
    ));
    assert!(canvas.snapshot().is_err());
    assert_eq!(canvas.frame_count(), 0);
}

#[test]
fn uninitialized_wins_over_bad_geometry() {
    let mut canvas = small();
    let circle = Circle {
        x: 1.0,
        y: 1.0,
        r: -4.0,
        color: Color::WHITE,
        line_width: 1.0,
        fill: false,
    };
    assert!(matches!(
        canvas.circle(&circle),
        Err(VisionError::UninitializedCanvas { .. })
    ));
}

#[test]
fn refresh_paints_background_and_counts_frames() {
    let mut canvas = small();
    canvas.refresh(&Refresh::default()).unwrap();
    assert_eq!(canvas.frame_count(), 1);
    let frame = canvas.snapshot().unwrap();
    assert_eq!((frame.width, frame.height), (64, 48));
    assert_eq!(frame.data.len(), 64 * 48 * 4);
    assert_eq!(frame.pixel_rgb(0, 0), Some(Color::BACKGROUND));
    assert_eq!(frame.pixel_rgb(63, 47), Some(Color::BACKGROUND));

    canvas
        .refresh(&Refresh {
            color: Some(Color::rgb(10, 20, 30)),
            ..Refresh::default()
        })
        .unwrap();
    assert_eq!(canvas.frame_count(), 2);
    let frame = canvas.snapshot().unwrap();
    assert_eq!(frame.pixel_rgb(5, 5), Some(Color::rgb(10, 20, 30)));
}

#[test]
fn explicit_size_persists_but_color_does_not() {
    let mut canvas = small();
    canvas
        .refresh(&Refresh {
            color: Some(Color::rgb(200, 0, 0)),
            width: Some(16),
            height: Some(8),
        })
        .unwrap();
    assert_eq!((canvas.width(), canvas.height()), (16, 8));
    assert_eq!(canvas.center(), (8, 4));

    canvas.refresh(&Refresh::default()).unwrap();
    let frame = canvas.snapshot().unwrap();
    assert_eq!((frame.width, frame.height), (16, 8));
    assert_eq!(frame.pixel_rgb(3, 3), Some(Color::BACKGROUND));
}

#[test]
fn zero_or_oversized_dimensions_fail() {
    let mut canvas = small();
    let zero = Refresh {
        width: Some(0),
        ..Refresh::default()
    };
    assert!(matches!(canvas.refresh(&zero), Err(VisionError::Backend(_))));
    let huge = Refresh {
        height: Some(70_000),
        ..Refresh::default()
    };
    assert!(canvas.refresh(&huge).is_err());
    assert_eq!(canvas.frame_count(), 0);
}

#[test]
fn refresh_over_pixel_budget_keeps_current_frame() {
    let exported = InMemoryFrames::new();
    let mut canvas = small().with_observer(exported.clone());
    assert_eq!(canvas.max_pixels(), DEFAULT_MAX_PIXELS);
    canvas.refresh(&Refresh::default()).unwrap();
    canvas
        .line(
            &Line::new(Point(0.0, 10.5), Point(64.0, 10.5))
                .with_color(Color::rgb(255, 0, 0))
                .with_line_width(3.0),
        )
        .unwrap();
    let before = canvas.snapshot().unwrap();

    let huge = Refresh {
        color: Some(Color::WHITE),
        width: Some(65_535),
        height: Some(65_535),
    };
    let err = canvas.refresh(&huge).unwrap_err();
    assert!(matches!(err, VisionError::Backend(_)));
    assert!(err.to_string().contains("pixels"));

    assert_eq!(canvas.frame_count(), 1);
    assert_eq!((canvas.width(), canvas.height()), (64, 48));
    assert_eq!(canvas.snapshot().unwrap(), before);
    assert!(exported.is_empty());

    canvas.refresh(&Refresh::default()).unwrap();
    assert_eq!(canvas.frame_count(), 2);
    assert_eq!(exported.indices(), vec![1]);
}

#[test]
fn pixel_budget_is_configurable() {
    let mut canvas = RasterCanvas::new(RasterCanvasOpts {
        width: 10,
        height: 10,
        max_pixels: 100,
        ..RasterCanvasOpts::default()
    });
    canvas.refresh(&Refresh::default()).unwrap();
    let wider = Refresh {
        width: Some(11),
        ..Refresh::default()
    };
    assert!(matches!(canvas.refresh(&wider), Err(VisionError::Backend(_))));
    assert_eq!(canvas.frame_count(), 1);
}

#[test]
fn filled_rect_covers_its_interior_only() {
    let mut canvas = small();
    canvas.refresh(&Refresh::default()).unwrap();
    canvas
        .rect(&Rect {
            x: 32.0,
            y: 24.0,
            rx: 8.0,
            ry: 6.0,
            color: Color::rgb(0, 0, 255),
            line_width: 1.0,
            fill: true,
        })
        .unwrap();
    let frame = canvas.snapshot().unwrap();
    assert_eq!(frame.pixel_rgb(32, 24), Some(Color::rgb(0, 0, 255)));
    assert_eq!(frame.pixel_rgb(26, 20), Some(Color::rgb(0, 0, 255)));
    assert_eq!(frame.pixel_rgb(2, 2), Some(Color::BACKGROUND));
}

#[test]
fn red_line_reads_back_as_red() {
    let mut canvas = small();
    canvas.refresh(&Refresh::default()).unwrap();
    canvas
        .line(
            &Line::new(Point(4.0, 20.5), Point(60.0, 20.5))
                .with_color(Color::rgb(255, 0, 0))
                .with_line_width(5.0),
        )
        .unwrap();
    let frame = canvas.snapshot().unwrap();
    assert_eq!(frame.pixel_rgb(30, 20), Some(Color::rgb(255, 0, 0)));
    assert_eq!(frame.pixel_rgb(30, 40), Some(Color::BACKGROUND));
}

#[test]
fn observer_sees_outgoing_frames_before_they_are_replaced() {
    let frames = Shared::default();
    let mut canvas = small().with_observer(frames.clone());

    canvas.refresh(&Refresh::default()).unwrap();
    assert!(frames.0.lock().unwrap().is_empty());
    canvas.refresh(&Refresh::default()).unwrap();
    canvas.refresh(&Refresh::default()).unwrap();
    assert_eq!(*frames.0.lock().unwrap(), vec![1, 2]);

    canvas.export_current().unwrap();
    assert_eq!(*frames.0.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(canvas.frame_count(), 3);
}

#[test]
fn exported_frame_carries_its_drawings() {
    let exported = InMemoryFrames::new();
    let mut canvas = small().with_observer(exported.clone());
    canvas.refresh(&Refresh::default()).unwrap();
    canvas
        .polygon(&Polygon {
            points: vec![Point(0.0, 0.0), Point(64.0, 0.0), Point(64.0, 48.0), Point(0.0, 48.0)],
            color: Color::rgb(0, 255, 0),
        })
        .unwrap();
    let drawn = canvas.snapshot().unwrap();
    assert_eq!(drawn.pixel_rgb(10, 10), Some(Color::rgb(0, 255, 0)));

    assert!(exported.is_empty());

    canvas.refresh(&Refresh::default()).unwrap();
    let fresh = canvas.snapshot().unwrap();
    assert_eq!(fresh.pixel_rgb(10, 10), Some(Color::BACKGROUND));

    let frames = exported.frames();
    assert_eq!(frames.len(), 1);
    let (index, frame) = &frames[0];
    assert_eq!(*index, 1);
    assert_eq!((frame.width, frame.height), (64, 48));
    assert_eq!(frame.pixel_rgb(10, 10), Some(Color::rgb(0, 255, 0)));
    assert_eq!(*frame, drawn);
}

#[test]
fn failing_observer_aborts_refresh() {
    let mut canvas = small().with_observer(|_: u64, _: &FrameRGBA| -> VisionResult<()> {
        Err(VisionError::backend("disk full"))
    });
    canvas.refresh(&Refresh::default()).unwrap();
    let err = canvas.refresh(&Refresh::default()).unwrap_err();
    assert!(err.to_string().contains("disk full"));
    assert_eq!(canvas.frame_count(), 1);
}

#[test]
fn export_without_observer_is_a_no_op() {
    let mut canvas = small();
    canvas.export_current().unwrap();
    canvas.refresh(&Refresh::default()).unwrap();
    canvas.export_current().unwrap();
}

#[test]
fn identical_ops_rasterize_identically() {
    let draw = || {
        let mut canvas = small();
        canvas.refresh(&Refresh::default()).unwrap();
        canvas
            .circle(&Circle {
                x: 30.0,
                y: 20.0,
                r: 12.0,
                color: Color::rgb(255, 255, 0),
                line_width: 2.0,
                fill: false,
            })
            .unwrap();
        canvas
            .polyline(&Polyline {
                points: vec![Point(2.0, 2.0), Point(40.0, 30.0), Point(60.0, 5.0)],
                color: Color::WHITE,
                line_width: 3.0,
                close: true,
            })
            .unwrap();
        canvas.snapshot().unwrap()
    };
    assert_eq!(draw(), draw());
}
