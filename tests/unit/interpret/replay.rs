use super::*;
use crate::canvas::params::{Circle, Line, Polygon, Polyline, Rect, Refresh};
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::VisionResult;
use std::io::Cursor;

/// Canvas double that records operation names and enforces the refresh-first rule.
#[derive(Default)]
struct Recorder {
    ops: Vec<&'static str>,
    frames: u64,
}

impl Recorder {
    fn push(&mut self, op: &'static str) -> VisionResult<()> {
        if self.frames == 0 {
            return Err(VisionError::UninitializedCanvas { operation: op });
        }
        self.ops.push(op);
        Ok(())
    }
}

impl Canvas for Recorder {
    fn refresh(&mut self, _: &Refresh) -> VisionResult<()> {
        self.frames += 1;
        self.ops.push("refresh");
        Ok(())
    }
    fn line(&mut self, _: &Line) -> VisionResult<()> {
        self.push("line")
    }
    fn circle(&mut self, _: &Circle) -> VisionResult<()> {
        self.push("circle")
    }
    fn rect(&mut self, _: &Rect) -> VisionResult<()> {
        self.push("rect")
    }
    fn polyline(&mut self, _: &Polyline) -> VisionResult<()> {
        self.push("polyline")
    }
    fn polygon(&mut self, _: &Polygon) -> VisionResult<()> {
        self.push("polygon")
    }
    fn frame_count(&self) -> u64 {
        self.frames
    }
    fn snapshot(&mut self) -> VisionResult<FrameRGBA> {
        Err(VisionError::backend("recorder has no pixels"))
    }
}

const REFRESH: &str = r#"{"cmd":"refresh","param":{}}"#;
const LINE: &str = r#"{"cmd":"line","param":{"xs":0,"ys":0,"xe":5,"ye":5}}"#;
const RECT: &str = r#"{"cmd":"rect","param":{"x":5,"y":5,"rx":2,"ry":2,"fill":true}}"#;

fn script(lines: &[&str]) -> Cursor<String> {
    Cursor::new(lines.join("\r\n"))
}

#[test]
fn valid_sequence_applies_everything_in_order() {
    let mut interp = Interpreter::new(Recorder::default());
    let stats = interp
        .interpret(script(&[REFRESH, LINE, RECT, REFRESH, LINE]))
        .unwrap();
    assert_eq!(stats, ReplayStats { applied: 5, refreshes: 2 });
    assert_eq!(interp.canvas().frame_count(), 2);
    assert_eq!(
        interp.canvas().ops,
        vec!["refresh", "line", "rect", "refresh", "line"]
    );
}

#[test]
fn stops_at_first_invalid_record() {
    let mut interp = Interpreter::new(Recorder::default());
    let err = interp
        .interpret(script(&[REFRESH, LINE, r#"{"cmd":"line","param":{"xs":0}}"#, RECT]))
        .unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.applied, 2);
    assert!(matches!(err.source, VisionError::InvalidParameter { .. }));
    assert_eq!(interp.canvas().ops, vec!["refresh", "line"]);
}

#[test]
fn canvas_failures_stop_replay_too() {
    let mut interp = Interpreter::new(Recorder::default());
    let err = interp.interpret(script(&[LINE, REFRESH])).unwrap_err();
    assert_eq!((err.line, err.applied), (1, 0));
    assert!(matches!(
        err.source,
        VisionError::UninitializedCanvas { operation: "line" }
    ));
    assert_eq!(interp.canvas().frame_count(), 0);
}

#[test]
fn unknown_command_names_its_line() {
    let mut interp = Interpreter::new(Recorder::default());
    let err = interp
        .interpret(script(&[REFRESH, "", r#"{"cmd":"triangle","param":{}}"#]))
        .unwrap_err();
    assert_eq!(err.line, 3);
    assert!(err.to_string().starts_with("line 3: unknown command 'triangle'"));
}

#[test]
fn run_accepts_decoded_commands() {
    let mut interp = Interpreter::new(Recorder::default());
    let stats = interp
        .run(vec![
            Command::Refresh(Refresh::default()),
            Command::Polygon(Polygon {
                points: vec![
                    crate::foundation::core::Point(0.0, 0.0),
                    crate::foundation::core::Point(1.0, 0.0),
                    crate::foundation::core::Point(0.0, 1.0),
                ],
                color: Default::default(),
            }),
        ])
        .unwrap();
    assert_eq!(stats.applied, 2);
    assert_eq!(interp.into_canvas().ops, vec!["refresh", "polygon"]);
}

#[test]
fn missing_file_reports_line_zero() {
    let mut interp = Interpreter::new(Recorder::default());
    let err = interp
        .interpret_file("target/unit_interpret/does-not-exist.jsonl")
        .unwrap_err();
    assert_eq!((err.line, err.applied), (0, 0));
    assert!(matches!(err.source, VisionError::Io(_)));
}
