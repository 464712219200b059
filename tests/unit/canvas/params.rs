use super::*;

#[test]
fn line_defaults_to_white_one_pixel() {
    let line: Line = serde_json::from_str(r#"{"xs":0,"ys":1,"xe":2,"ye":3}"#).unwrap();
    assert_eq!(line.color, Color::WHITE);
    assert_eq!(line.line_width, 1.0);
}

#[test]
fn line_width_is_camel_cased() {
    let line: Line =
        serde_json::from_str(r#"{"xs":0,"ys":0,"xe":1,"ye":1,"lineWidth":3}"#).unwrap();
    assert_eq!(line.line_width, 3.0);
    assert!(serde_json::from_str::<Line>(r#"{"xs":0,"ys":0,"xe":1,"ye":1,"line_width":3}"#).is_err());
}

#[test]
fn unknown_and_missing_fields_are_rejected() {
    assert!(serde_json::from_str::<Circle>(r#"{"x":0,"y":0}"#).is_err());
    assert!(serde_json::from_str::<Circle>(r#"{"x":0,"y":0,"r":1,"radius":2}"#).is_err());
    assert!(serde_json::from_str::<Refresh>(r#"{"colour":[0,0,0]}"#).is_err());
}

#[test]
fn refresh_fields_are_all_optional() {
    let r: Refresh = serde_json::from_str("{}").unwrap();
    assert_eq!(r, Refresh::default());
    let r: Refresh = serde_json::from_str(r#"{"color":null,"width":640}"#).unwrap();
    assert_eq!(r.color, None);
    assert_eq!(r.width, Some(640));
}

#[test]
fn open_polyline_splits_into_consecutive_segments() {
    let p = Polyline {
        points: vec![Point(0.0, 0.0), Point(50.0, 0.0), Point(50.0, 50.0)],
        color: Color::rgb(1, 2, 3),
        line_width: 2.0,
        close: false,
    };
    let segs = p.segments();
    assert_eq!(segs.len(), 2);
    assert_eq!((segs[0].xs, segs[0].ys, segs[0].xe, segs[0].ye), (0.0, 0.0, 50.0, 0.0));
    assert_eq!((segs[1].xs, segs[1].ys, segs[1].xe, segs[1].ye), (50.0, 0.0, 50.0, 50.0));
    assert!(segs.iter().all(|s| s.color == Color::rgb(1, 2, 3) && s.line_width == 2.0));
}

#[test]
fn closed_polyline_adds_return_segment() {
    let p = Polyline {
        points: vec![Point(0.0, 0.0), Point(10.0, 0.0), Point(10.0, 10.0)],
        color: Color::WHITE,
        line_width: 1.0,
        close: true,
    };
    let segs = p.segments();
    assert_eq!(segs.len(), 3);
    let last = &segs[2];
    assert_eq!((last.xs, last.ys, last.xe, last.ye), (10.0, 10.0, 0.0, 0.0));
}

#[test]
fn min_point_check_reports_counts() {
    let err = ensure_min_points("polygon", &[Point(0.0, 0.0)], Polygon::MIN_POINTS).unwrap_err();
    assert!(matches!(err, VisionError::InvalidParameter { .. }));
    assert!(err.to_string().contains("at least 3 points, got 1"));
}
