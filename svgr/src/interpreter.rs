//! State machine that traces a path description.
//!
//! The interpreter is a lazy iterator: every call to `next` consumes tokens
//! until at least one segment, instruction or diagnostic is ready. Nothing is
//! computed ahead of the consumer.

use std::collections::VecDeque;

use log::{trace, warn};

use crate::bezier::CubicBezier;
use crate::error::{Diagnostic, Result, SvgError};
use crate::lexer::{Lexer, Token};
use crate::options::{Flattening, MoveRepeats, Options};
use crate::stream::Emission;
use crate::transform::AffineTransform;
use crate::types::{DrawingInstruction, Paint, Segment, Tuple};

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    InSegment(Segment),
    Terminal,
}

/// Mutable state of one interpreter run.
///
/// `x` and `y` are in the element's local coordinates; points only reach
/// device space through `transform` when they are emitted.
#[derive(Debug, Clone)]
pub struct ParserState {
    pub x: f64,
    pub y: f64,
    pub transform: AffineTransform,
    pub stroke_width: f64,
    pub scale: f64,
    phase: Phase,
}

impl ParserState {
    pub fn new(transform: AffineTransform, stroke_width: f64, scale: f64) -> Self {
        ParserState {
            x: 0.0,
            y: 0.0,
            transform,
            stroke_width,
            scale,
            phase: Phase::Idle,
        }
    }

    pub fn current(&self) -> Tuple {
        Tuple::new(self.x, self.y)
    }

    pub fn device_point(&self) -> Tuple {
        self.transform.apply(self.current())
    }

    pub fn segment_width(&self) -> f64 {
        self.stroke_width * self.scale
    }

    fn advance(&mut self, point: Tuple, relative: bool) {
        if relative {
            self.x += point.x;
            self.y += point.y;
        } else {
            self.x = point.x;
            self.y = point.y;
        }
    }

    fn advance_x(&mut self, value: f64, relative: bool) {
        if relative {
            self.x += value;
        } else {
            self.x = value;
        }
    }

    fn advance_y(&mut self, value: f64, relative: bool) {
        if relative {
            self.y += value;
        } else {
            self.y = value;
        }
    }
}

pub struct PathInterpreter<'a> {
    lexer: Lexer<'a>,
    state: ParserState,
    flattening: Flattening,
    move_repeats: MoveRepeats,
    pending: VecDeque<Emission>,
    element: Option<String>,
    fill: Option<String>,
    stroke: Option<String>,
    // Where a replaying backend's pen is after the instructions emitted so
    // far, `None` before the first move.
    pen: Option<Tuple>,
}

impl<'a> PathInterpreter<'a> {
    /// `transform` maps local coordinates to device coordinates and already
    /// includes the document scale.
    pub fn new(
        data: &'a str,
        transform: AffineTransform,
        stroke_width: f64,
        options: &Options,
    ) -> Self {
        PathInterpreter {
            lexer: Lexer::new(data),
            state: ParserState::new(transform, stroke_width, options.effective_scale()),
            flattening: options.flattening,
            move_repeats: options.move_repeats,
            pending: VecDeque::new(),
            element: None,
            fill: None,
            stroke: None,
            pen: None,
        }
    }

    pub fn with_element(mut self, element: Option<String>) -> Self {
        self.element = element;
        self
    }

    pub fn with_paint(mut self, fill: Option<String>, stroke: Option<String>) -> Self {
        self.fill = fill;
        self.stroke = stroke;
        self
    }

    fn emit_instruction(&mut self, instruction: DrawingInstruction) {
        trace!("instruction {}", instruction);
        if let Some(point) = instruction.end_point() {
            self.pen = Some(point);
        }
        self.pending.push_back(Emission::Instruction(instruction));
    }

    fn report(&mut self, error: SvgError) {
        match &self.element {
            Some(id) => warn!("path {}: {}", id, error),
            None => warn!("path: {}", error),
        }
        self.pending
            .push_back(Emission::Diagnostic(Diagnostic::new(self.element.clone(), error)));
    }

    /// Emits the open segment, if any, and returns to `Idle`.
    fn finish_segment(&mut self) {
        if let Phase::InSegment(segment) = std::mem::replace(&mut self.state.phase, Phase::Idle) {
            trace!("segment with {} points", segment.points.len());
            self.pending.push_back(Emission::Segment(segment));
        }
    }

    /// Opens a segment at `start` unless one is open already.
    fn ensure_segment(&mut self, start: Tuple) {
        if let Phase::Idle = self.state.phase {
            self.state.phase = Phase::InSegment(Segment::new(start, self.state.segment_width()));
        }
    }

    fn push_point(&mut self, point: Tuple) {
        if let Phase::InSegment(segment) = &mut self.state.phase {
            segment.add_point(point);
        }
    }

    /// Prepares drawing from `previous`, the device point before the
    /// command. A `Move` is emitted when a backend's pen would not be there.
    fn sync_pen(&mut self, previous: Tuple) {
        if self.pen != Some(previous) {
            self.emit_instruction(DrawingInstruction::Move(previous));
        }
        self.ensure_segment(previous);
    }

    fn start_subpath(&mut self, point: Tuple, relative: bool) {
        self.state.advance(point, relative);
        self.finish_segment();

        let start = self.state.device_point();
        self.state.phase = Phase::InSegment(Segment::new(start, self.state.segment_width()));
        self.emit_instruction(DrawingInstruction::Move(start));
    }

    fn draw_line(&mut self, previous: Tuple) {
        self.sync_pen(previous);
        let target = self.state.device_point();
        self.push_point(target);
        self.emit_instruction(DrawingInstruction::Line(target));
    }

    fn move_to(&mut self, points: Vec<Tuple>, relative: bool) {
        let mut points = points.into_iter();
        if let Some(first) = points.next() {
            self.start_subpath(first, relative);
        }
        for point in points {
            match self.move_repeats {
                MoveRepeats::NewSubpath => self.start_subpath(point, relative),
                MoveRepeats::LineTo => self.line_to(point, relative),
            }
        }
    }

    fn line_to(&mut self, point: Tuple, relative: bool) {
        let previous = self.state.device_point();
        self.state.advance(point, relative);
        self.draw_line(previous);
    }

    fn horizontal_to(&mut self, value: f64, relative: bool) {
        let previous = self.state.device_point();
        self.state.advance_x(value, relative);
        self.draw_line(previous);
    }

    fn vertical_to(&mut self, value: f64, relative: bool) {
        let previous = self.state.device_point();
        self.state.advance_y(value, relative);
        self.draw_line(previous);
    }

    fn curve_to(&mut self, c1: Tuple, c2: Tuple, end: Tuple, relative: bool) {
        let start = self.state.current();
        let origin = if relative { start } else { Tuple::default() };
        let curve = CubicBezier::new(start, origin + c1, origin + c2, origin + end);

        let previous = self.state.device_point();
        self.sync_pen(previous);

        let transform = self.state.transform;
        let device = curve.map(&transform);
        let [_, d1, d2, d3] = device.control_points;
        self.emit_instruction(DrawingInstruction::Curve(d1, d2, d3));

        for vertex in curve.flatten(self.flattening).into_iter().skip(1) {
            self.push_point(transform.apply(vertex));
        }

        self.state.advance(curve.end(), false);
    }

    fn close_path(&mut self) {
        if let Phase::InSegment(mut segment) = std::mem::replace(&mut self.state.phase, Phase::Idle) {
            segment.close();
            self.pen = Some(segment.first());
            self.pending.push_back(Emission::Segment(segment));
        }
        self.pending.push_back(Emission::Instruction(DrawingInstruction::Close));
    }

    /// Skips separators and reports whether another operand follows.
    fn next_is_number(&mut self) -> bool {
        self.lexer.consume_separator();
        matches!(self.lexer.peek_token(), Token::Number(_))
    }

    fn read_number(&mut self, command: char, expected: &'static str) -> Result<f64> {
        self.lexer.consume_separator();
        let offset = self.lexer.peek_offset();
        match self.lexer.peek_token().clone() {
            Token::Number(value) => {
                self.lexer.next_token();
                Ok(value)
            }
            Token::Error(msg) => {
                self.lexer.next_token();
                Err(SvgError::Token { offset, msg })
            }
            _ => Err(SvgError::UnexpectedEndOfCommand {
                command,
                offset,
                expected,
            }),
        }
    }

    fn read_tuple(&mut self, command: char) -> Result<Tuple> {
        let x = self.read_number(command, "a coordinate pair")?;
        let y = self.read_number(command, "a coordinate pair")?;
        Ok(Tuple::new(x, y))
    }

    /// Reads the operands of a command taking pairs: at least one, then as
    /// many as follow.
    fn read_tuples(&mut self, command: char) -> Result<Vec<Tuple>> {
        let mut tuples = vec![self.read_tuple(command)?];
        while self.next_is_number() {
            tuples.push(self.read_tuple(command)?);
        }
        Ok(tuples)
    }

    fn read_scalars(&mut self, command: char) -> Result<Vec<f64>> {
        let mut values = vec![self.read_number(command, "a coordinate")?];
        while self.next_is_number() {
            values.push(self.read_number(command, "a coordinate")?);
        }
        Ok(values)
    }

    /// Reads every operand of `command` before applying any of them, so a
    /// command with a bad operand leaves no trace.
    fn parse_command(&mut self, command: char) -> Result<()> {
        let offset = self.lexer.offset();
        let relative = command.is_ascii_lowercase();

        match command {
            'M' | 'm' => {
                let points = self.read_tuples(command)?;
                self.move_to(points, relative);
            }
            'L' | 'l' => {
                for point in self.read_tuples(command)? {
                    self.line_to(point, relative);
                }
            }
            'H' | 'h' => {
                for value in self.read_scalars(command)? {
                    self.horizontal_to(value, relative);
                }
            }
            'V' | 'v' => {
                for value in self.read_scalars(command)? {
                    self.vertical_to(value, relative);
                }
            }
            'C' | 'c' => {
                let points = self.read_tuples(command)?;
                if points.len() % 3 != 0 {
                    return Err(SvgError::UnexpectedEndOfCommand {
                        command,
                        offset: self.lexer.peek_offset(),
                        expected: "three coordinate pairs per curve",
                    });
                }
                for triple in points.chunks(3) {
                    self.curve_to(triple[0], triple[1], triple[2], relative);
                }
            }
            'Z' | 'z' => self.close_path(),
            _ => return Err(SvgError::UnsupportedCommand { command, offset }),
        }

        Ok(())
    }

    fn finish(&mut self) {
        self.finish_segment();
        let paint = Paint {
            fill: self.fill.clone(),
            stroke: self.stroke.clone(),
            stroke_width: Some(self.state.segment_width()),
        };
        self.pending
            .push_back(Emission::Instruction(DrawingInstruction::Paint(paint)));
        self.state.phase = Phase::Terminal;
    }

    fn step(&mut self) {
        let offset = self.lexer.peek_offset();
        match self.lexer.next_token() {
            Token::EndOfStream => self.finish(),
            Token::WhiteSpace | Token::Comma => (),
            Token::Letter(command) => {
                if let Err(error) = self.parse_command(command) {
                    self.report(error);
                    self.lexer.skip_to_command();
                }
            }
            Token::Number(_) => {
                self.report(SvgError::Token {
                    offset,
                    msg: "number outside of a command".to_string(),
                });
                self.lexer.skip_to_command();
            }
            Token::Error(msg) => {
                self.report(SvgError::Token { offset, msg });
                self.lexer.skip_to_command();
            }
        }
    }
}

impl Iterator for PathInterpreter<'_> {
    type Item = Emission;

    fn next(&mut self) -> Option<Emission> {
        loop {
            if let Some(emission) = self.pending.pop_front() {
                return Some(emission);
            }
            if let Phase::Terminal = self.state.phase {
                return None;
            }
            self.step();
        }
    }
}
