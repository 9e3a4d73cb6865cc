use std::thread;

use svgr::{
    spawn, trace_path, Document, DrawingInstruction, Options, Paint, SvgError, Tuple,
};

fn paths(n: usize) -> String {
    let mut content = String::from(r#"<svg xmlns="http://www.w3.org/2000/svg"><g>"#);
    for i in 0..n {
        // two segments, five instructions
        content.push_str(&format!(
            r#"<path id="p{0}" d="M{0} 0 L{0} 1 M{0} 5 L{0} 6"/>"#,
            i
        ));
    }
    content.push_str("</g></svg>");
    content
}

#[test]
fn group_scale_then_child_translate() {
    let document = Document::parse(
        r#"<svg><g transform="scale(2)"><path transform="translate(10,0)" d="M0 0 L1 0"/></g></svg>"#,
    )
    .unwrap();
    let drawing = document.drawing(&Options::default()).collect_all();

    assert_eq!(drawing.instructions[0], DrawingInstruction::Move(Tuple::new(20.0, 0.0)));
    assert_eq!(drawing.instructions[1], DrawingInstruction::Line(Tuple::new(22.0, 0.0)));
    assert_eq!(drawing.segments[0].points[0], Tuple::new(20.0, 0.0));
}

#[test]
fn document_scale_is_outermost() {
    let document = Document::parse(r#"<svg><g transform="translate(1 1)"><path d="M0 0"/></g></svg>"#).unwrap();
    let options = Options {
        scale: 10.0,
        ..Options::default()
    };
    let drawing = document.drawing(&options).collect_all();
    assert_eq!(drawing.instructions[0], DrawingInstruction::Move(Tuple::new(10.0, 10.0)));
}

#[test]
fn malformed_transform_falls_back_to_identity() {
    let document = Document::parse(
        r#"<svg><path id="skewed" transform="translate(5,5" d="M1 1 L2 2"/></svg>"#,
    )
    .unwrap();

    let diagnostics = document.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].element.as_deref(), Some("skewed"));
    assert!(matches!(diagnostics[0].error, SvgError::MalformedTransform(_)));

    let drawing = document.drawing(&Options::default()).collect_all();
    assert_eq!(drawing.instructions[0], DrawingInstruction::Move(Tuple::new(1.0, 1.0)));
}

#[test]
fn structural_error_is_fatal() {
    assert!(matches!(
        Document::parse("<svg><g></svg>"),
        Err(SvgError::StructuralDocument(_))
    ));
    assert!(matches!(
        Document::parse("<path d='M0 0'/>"),
        Err(SvgError::StructuralDocument(_))
    ));
}

#[test]
fn path_errors_are_diagnostics() {
    let document = Document::parse(r#"<svg><path id="a" d="M0 0 A1 1 0 0 0 5 5 L3 3"/></svg>"#).unwrap();
    let mut streams = document.drawing(&Options::default());
    let instructions: Vec<_> = streams.instructions().collect();

    assert_eq!(instructions[1], DrawingInstruction::Line(Tuple::new(3.0, 3.0)));
    let diagnostics = streams.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].element.as_deref(), Some("a"));
    assert!(matches!(
        diagnostics[0].error,
        SvgError::UnsupportedCommand { command: 'A', .. }
    ));
}

#[test]
fn inherited_presentation() {
    let document = Document::parse(
        r#"<svg><g fill="red" style="stroke-width:3;stroke:blue"><path stroke="green" d="M0 0 L1 0"/></g></svg>"#,
    )
    .unwrap();
    let options = Options {
        scale: 2.0,
        ..Options::default()
    };
    let drawing = document.drawing(&options).collect_all();

    assert_eq!(drawing.segments[0].width, 6.0);
    assert_eq!(
        drawing.instructions.last(),
        Some(&DrawingInstruction::Paint(Paint {
            fill: Some("red".to_string()),
            stroke: Some("green".to_string()),
            stroke_width: Some(6.0),
        }))
    );
}

#[test]
fn shapes_in_document_order() {
    let document = Document::parse(
        r#"<svg>
  <rect x="0" y="0" width="2" height="2"/>
  <circle cx="1" cy="1" r="1"/>
  <polyline points="0,0 1,1"/>
</svg>"#,
    )
    .unwrap();
    let drawing = document.drawing(&Options::default()).collect_all();

    assert_eq!(drawing.segments.len(), 2);
    assert!(drawing.segments[0].closed);
    assert!(!drawing.segments[1].closed);
    let circles = drawing
        .instructions
        .iter()
        .position(|i| matches!(i, DrawingInstruction::Circle(..)));
    // Move, 3 Lines, Close, Paint of the rect come first
    assert_eq!(circles, Some(6));
}

#[test]
fn fan_in_drains_both_streams() {
    let n = 20;
    let document = Document::parse(&paths(n)).unwrap();
    let mut streams = document.drawing(&Options::default());

    let mut segments = Vec::new();
    let mut instructions = Vec::new();
    loop {
        let segment = streams.next_segment();
        let instruction = streams.next_instruction();
        if segment.is_none() && instruction.is_none() {
            break;
        }
        segments.extend(segment);
        instructions.extend(instruction);
    }

    assert_eq!(segments.len(), n * 2);
    assert_eq!(instructions.len(), n * 5);
    for (i, child) in instructions.chunks(5).enumerate() {
        let x = i as f64;
        assert_eq!(child[0], DrawingInstruction::Move(Tuple::new(x, 0.0)));
        assert_eq!(child[1], DrawingInstruction::Line(Tuple::new(x, 1.0)));
        assert_eq!(child[2], DrawingInstruction::Move(Tuple::new(x, 5.0)));
        assert_eq!(child[3], DrawingInstruction::Line(Tuple::new(x, 6.0)));
        assert!(matches!(child[4], DrawingInstruction::Paint(_)));
    }
}

#[test]
fn instructions_complete_without_segment_consumer() {
    let document = Document::parse(&paths(50)).unwrap();
    let options = Options {
        discard_segments: true,
        ..Options::default()
    };
    let mut streams = document.drawing(&options);
    assert_eq!(streams.instructions().count(), 250);
    assert_eq!(streams.next_segment(), None);
}

#[test]
fn threaded_concurrent_drain() {
    let n = 200;
    let document = Document::parse(&paths(n)).unwrap();
    let mut handle = spawn(document, Options::default());

    let segments = handle.take_segments().unwrap();
    let collector = thread::spawn(move || segments.iter().count());

    let instructions: Vec<_> = handle.instructions().collect();
    assert!(handle.join().is_empty());
    assert_eq!(collector.join().unwrap(), n * 2);
    assert_eq!(instructions.len(), n * 5);
    assert_eq!(instructions[5], DrawingInstruction::Move(Tuple::new(1.0, 0.0)));
}

#[test]
fn threaded_segments_never_drained() {
    let document = Document::parse(&paths(200)).unwrap();
    let handle = spawn(document, Options::default());
    assert_eq!(handle.instructions().count(), 1000);
    handle.join();
}

#[test]
fn open_from_file() {
    let path = std::env::temp_dir().join(format!("svg-trace-{}.svg", std::process::id()));
    std::fs::write(&path, paths(1)).unwrap();
    let document = Document::open(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(document.root().children.len(), 1);

    assert!(matches!(
        Document::open(path.with_extension("missing")),
        Err(SvgError::Io { .. })
    ));
}

#[test]
fn single_path() {
    let drawing = trace_path("M0 0 L100 0 100 100 L0 100 Z", &Options::default());
    assert_eq!(drawing.segments.len(), 1);
    assert_eq!(drawing.segments[0].points.len(), 5);
    assert!(drawing.diagnostics.is_empty());
}
