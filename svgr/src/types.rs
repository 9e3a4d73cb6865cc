use std::fmt;
use std::ops::Add;

use crate::error::{Result, SvgError};
use crate::lexer::{number, Lexer, Token};

pub type Id = String;

pub type X = f64;
pub type Y = f64;

pub type Width = f64;
pub type Height = f64;

pub type R = f64;
pub type Cx = f64;
pub type Cy = f64;

pub type StrokeWidth = f64;
pub type Stroke = String;
pub type Fill = String;

/// Raw path description, lexed lazily when the path is traced.
pub type PathData = String;
pub type Points = Vec<Tuple>;

/// An (x, y) coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tuple {
    pub x: f64,
    pub y: f64,
}

impl Tuple {
    pub fn new(x: f64, y: f64) -> Self {
        Tuple { x, y }
    }

    pub fn lerp(self, other: Tuple, t: f64) -> Tuple {
        Tuple::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl Add for Tuple {
    type Output = Tuple;

    fn add(self, other: Tuple) -> Tuple {
        Tuple::new(self.x + other.x, self.y + other.y)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// A finished polyline in device coordinates.
///
/// `points` is never empty, and a closed segment ends on its first point.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub width: f64,
    pub closed: bool,
    pub points: Vec<Tuple>,
}

impl Segment {
    pub fn new(start: Tuple, width: f64) -> Self {
        Segment {
            width,
            closed: false,
            points: vec![start],
        }
    }

    pub fn add_point(&mut self, point: Tuple) {
        self.points.push(point);
    }

    pub fn first(&self) -> Tuple {
        self.points[0]
    }

    pub fn last(&self) -> Tuple {
        self.points[self.points.len() - 1]
    }

    pub fn close(&mut self) {
        let first = self.first();
        self.points.push(first);
        self.closed = true;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paint {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
}

/// One replayable drawing operation. Coordinates are in device space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingInstruction {
    Move(Tuple),
    Line(Tuple),
    Curve(Tuple, Tuple, Tuple),
    Close,
    Paint(Paint),
    Circle(Tuple, f64),
}

impl DrawingInstruction {
    /// Where the pen of a replaying backend rests after this instruction.
    /// `Close` and `Paint` depend on earlier state and return `None`.
    pub fn end_point(&self) -> Option<Tuple> {
        match self {
            DrawingInstruction::Move(p) | DrawingInstruction::Line(p) => Some(*p),
            DrawingInstruction::Curve(_, _, end) => Some(*end),
            _ => None,
        }
    }
}

impl fmt::Display for DrawingInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawingInstruction::Move(p) => write!(f, "M {}", p),
            DrawingInstruction::Line(p) => write!(f, "L {}", p),
            DrawingInstruction::Curve(c1, c2, end) => write!(f, "C {} {} {}", c1, c2, end),
            DrawingInstruction::Close => write!(f, "Z"),
            DrawingInstruction::Paint(paint) => {
                write!(f, "paint")?;
                if let Some(fill) = &paint.fill {
                    write!(f, " fill={}", fill)?;
                }
                if let Some(stroke) = &paint.stroke {
                    write!(f, " stroke={}", stroke)?;
                }
                if let Some(width) = paint.stroke_width {
                    write!(f, " stroke-width={}", width)?;
                }
                Ok(())
            }
            DrawingInstruction::Circle(center, radius) => write!(f, "circle {} r={}", center, radius),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Parses one attribute value of an svg tag. Implemented for every type that
/// appears in the `Tag` enum.
pub trait AttributeValue: Sized {
    fn parse_attribute(name: &str, raw: &str) -> Result<Self>;
}

pub(crate) fn malformed(name: &str, raw: &str) -> SvgError {
    SvgError::MalformedAttribute {
        attribute: name.to_string(),
        value: raw.to_string(),
    }
}

/// Reads every number of a whitespace and/or comma separated list.
fn number_list(name: &str, raw: &str) -> Result<Vec<f64>> {
    let mut lexer = Lexer::new(raw);
    let mut values = Vec::new();
    loop {
        match lexer.next_token() {
            Token::Number(value) => values.push(value),
            Token::WhiteSpace | Token::Comma => (),
            Token::EndOfStream => return Ok(values),
            Token::Letter(_) | Token::Error(_) => return Err(malformed(name, raw)),
        }
    }
}

impl AttributeValue for f64 {
    // Lengths may carry a unit suffix ("12px", "50%"), which is dropped.
    fn parse_attribute(name: &str, raw: &str) -> Result<Self> {
        let is_unit = |c: char| c.is_ascii_alphabetic() || c == '%';
        match number(raw.trim()) {
            Ok((rest, value)) if rest.chars().all(is_unit) => Ok(value),
            _ => Err(malformed(name, raw)),
        }
    }
}

impl AttributeValue for String {
    fn parse_attribute(_name: &str, raw: &str) -> Result<Self> {
        Ok(raw.trim().to_string())
    }
}

impl AttributeValue for Points {
    fn parse_attribute(name: &str, raw: &str) -> Result<Self> {
        let values = number_list(name, raw)?;
        if values.len() % 2 != 0 {
            return Err(malformed(name, raw));
        }
        Ok(values
            .chunks(2)
            .map(|pair| Tuple::new(pair[0], pair[1]))
            .collect())
    }
}

impl AttributeValue for ViewBox {
    fn parse_attribute(name: &str, raw: &str) -> Result<Self> {
        match number_list(name, raw)?.as_slice() {
            [x, y, width, height] => Ok(ViewBox {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            }),
            _ => Err(malformed(name, raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_with_unit() {
        assert_eq!(f64::parse_attribute("width", "595.201px").unwrap(), 595.201);
        assert_eq!(f64::parse_attribute("width", " 12 ").unwrap(), 12.0);
        assert!(f64::parse_attribute("width", "wide").is_err());
        assert!(f64::parse_attribute("width", "12 13").is_err());
    }

    #[test]
    fn test_points() {
        let points = Points::parse_attribute("points", "0,0 10,0 10 10").unwrap();
        assert_eq!(
            points,
            vec![Tuple::new(0.0, 0.0), Tuple::new(10.0, 0.0), Tuple::new(10.0, 10.0)]
        );
        assert!(Points::parse_attribute("points", "0,0 10").is_err());
    }

    #[test]
    fn test_view_box() {
        let vb = ViewBox::parse_attribute("viewBox", "0 0 595.201 841.922").unwrap();
        assert_eq!(vb.width, 595.201);
        assert_eq!(vb.height, 841.922);
        assert!(ViewBox::parse_attribute("viewBox", "0 0 10").is_err());
    }

    #[test]
    fn test_segment_close() {
        let mut segment = Segment::new(Tuple::new(1.0, 2.0), 1.0);
        segment.add_point(Tuple::new(3.0, 4.0));
        segment.close();
        assert!(segment.closed);
        assert_eq!(segment.first(), segment.last());
        assert_eq!(segment.points.len(), 3);
    }
}
