use std::io::Write;

use crate::error::{Result, SvgError};
use crate::types::{DrawingInstruction, Segment};

/// A rendering backend that instructions are replayed on.
pub trait Backend {
    fn process(&mut self, instruction: &DrawingInstruction) -> Result<()>;
}

pub fn replay<'i, B, I>(backend: &mut B, instructions: I) -> Result<usize>
where
    B: Backend + ?Sized,
    I: IntoIterator<Item = &'i DrawingInstruction>,
{
    let mut count = 0;
    for instruction in instructions {
        backend.process(instruction)?;
        count += 1;
    }
    Ok(count)
}

/// Writes every instruction as one line of text.
pub struct TextBackend<W: Write> {
    out: W,
}

impl<W: Write> TextBackend<W> {
    pub fn new(out: W) -> Self {
        TextBackend { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_segment(&mut self, segment: &Segment) -> Result<()> {
        let points: Vec<String> = segment.points.iter().map(|p| p.to_string()).collect();
        writeln!(
            self.out,
            "segment width={} closed={} [{}]",
            segment.width,
            segment.closed,
            points.join(", ")
        )
        .map_err(|source| SvgError::Io {
            source,
            msg: "writing segment".to_string(),
        })
    }
}

impl<W: Write> Backend for TextBackend<W> {
    fn process(&mut self, instruction: &DrawingInstruction) -> Result<()> {
        writeln!(self.out, "{}", instruction).map_err(|source| SvgError::Io {
            source,
            msg: "writing instruction".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{replay, TextBackend};
    use crate::types::{DrawingInstruction, Paint, Segment, Tuple};

    #[test]
    fn test_text_backend() {
        let instructions = vec![
            DrawingInstruction::Move(Tuple::new(0.0, 0.0)),
            DrawingInstruction::Line(Tuple::new(1.5, 2.0)),
            DrawingInstruction::Close,
            DrawingInstruction::Paint(Paint {
                fill: Some("red".to_string()),
                stroke: None,
                stroke_width: Some(2.0),
            }),
        ];
        let mut backend = TextBackend::new(Vec::new());
        assert_eq!(replay(&mut backend, &instructions).unwrap(), 4);

        let mut segment = Segment::new(Tuple::new(0.0, 0.0), 1.0);
        segment.add_point(Tuple::new(1.0, 0.0));
        backend.write_segment(&segment).unwrap();

        let text = String::from_utf8(backend.into_inner()).unwrap();
        assert_eq!(
            text,
            "M 0 0\nL 1.5 2\nZ\npaint fill=red stroke-width=2\nsegment width=1 closed=false [0 0, 1 0]\n"
        );
    }
}
