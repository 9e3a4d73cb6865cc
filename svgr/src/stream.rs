//! Pull-based output streams.
//!
//! Every drawable element produces an `EmissionStream`: a lazy iterator of
//! segments, instructions and diagnostics in program order. Groups merge
//! their children with `FanIn`, and `DrawingStreams` splits the merged
//! stream back into a segment stream and an instruction stream that can be
//! drained independently.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::error::Diagnostic;
use crate::types::{DrawingInstruction, Segment};

#[derive(Debug)]
pub enum Emission {
    Segment(Segment),
    Instruction(DrawingInstruction),
    Diagnostic(Diagnostic),
}

pub type EmissionStream<'a> = Box<dyn Iterator<Item = Emission> + 'a>;

/// Creates a child stream when the merge reaches it.
pub type StreamFactory<'a> = Box<dyn FnOnce() -> EmissionStream<'a> + 'a>;

/// Shared flag telling every producer holding a clone to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Merges child streams child by child, in the order they were pushed.
///
/// A child is only created once the previous one is exhausted, and dropped as
/// soon as it is. Cancelling the token releases the current child and every
/// child not created yet.
pub struct FanIn<'a> {
    pending: VecDeque<StreamFactory<'a>>,
    current: Option<EmissionStream<'a>>,
    cancel: CancelToken,
}

impl<'a> FanIn<'a> {
    pub fn new(cancel: CancelToken) -> Self {
        FanIn {
            pending: VecDeque::new(),
            current: None,
            cancel,
        }
    }

    pub fn push<F>(&mut self, child: F)
    where
        F: FnOnce() -> EmissionStream<'a> + 'a,
    {
        self.pending.push_back(Box::new(child));
    }

    /// Children not yet exhausted, including the current one.
    pub fn remaining(&self) -> usize {
        self.pending.len() + self.current.is_some() as usize
    }

    fn release(&mut self) {
        if self.remaining() > 0 {
            debug!("releasing {} child streams", self.remaining());
        }
        self.current = None;
        self.pending.clear();
    }
}

impl Iterator for FanIn<'_> {
    type Item = Emission;

    fn next(&mut self) -> Option<Emission> {
        loop {
            if self.cancel.is_cancelled() {
                self.release();
                return None;
            }

            if let Some(current) = self.current.as_mut() {
                if let Some(emission) = current.next() {
                    return Some(emission);
                }
                self.current = None;
            }

            match self.pending.pop_front() {
                Some(child) => self.current = Some(child()),
                None => return None,
            }
        }
    }
}

/// Everything a stream produced, collected.
#[derive(Debug, Default)]
pub struct Drawing {
    pub segments: Vec<Segment>,
    pub instructions: Vec<DrawingInstruction>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Splits one emission stream into a segment stream and an instruction
/// stream.
///
/// Reading one of them buffers whatever the other one would have returned in
/// the meantime, unless segments are discarded. Diagnostics are kept until
/// asked for.
pub struct DrawingStreams<'a> {
    source: Option<EmissionStream<'a>>,
    segments: VecDeque<Segment>,
    instructions: VecDeque<DrawingInstruction>,
    diagnostics: Vec<Diagnostic>,
    discard_segments: bool,
    cancel: CancelToken,
}

impl<'a> DrawingStreams<'a> {
    pub fn new(source: EmissionStream<'a>, cancel: CancelToken, discard_segments: bool) -> Self {
        DrawingStreams {
            source: Some(source),
            segments: VecDeque::new(),
            instructions: VecDeque::new(),
            diagnostics: Vec::new(),
            discard_segments,
            cancel,
        }
    }

    /// Pulls one emission from the source. Returns `false` once the source is
    /// exhausted or cancelled.
    fn pull(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            self.source = None;
        }
        let emission = match self.source.as_mut().and_then(|source| source.next()) {
            Some(emission) => emission,
            None => {
                self.source = None;
                return false;
            }
        };

        match emission {
            Emission::Segment(segment) => {
                if !self.discard_segments {
                    self.segments.push_back(segment);
                }
            }
            Emission::Instruction(instruction) => self.instructions.push_back(instruction),
            Emission::Diagnostic(diagnostic) => self.diagnostics.push(diagnostic),
        }
        true
    }

    pub fn next_segment(&mut self) -> Option<Segment> {
        loop {
            if let Some(segment) = self.segments.pop_front() {
                return Some(segment);
            }
            if !self.pull() {
                return None;
            }
        }
    }

    pub fn next_instruction(&mut self) -> Option<DrawingInstruction> {
        loop {
            if let Some(instruction) = self.instructions.pop_front() {
                return Some(instruction);
            }
            if !self.pull() {
                return None;
            }
        }
    }

    pub fn segments<'s>(&'s mut self) -> Segments<'s, 'a> {
        Segments { streams: self }
    }

    pub fn instructions<'s>(&'s mut self) -> Instructions<'s, 'a> {
        Instructions { streams: self }
    }

    /// Diagnostics reported so far. Complete once either stream is exhausted.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn is_exhausted(&self) -> bool {
        self.source.is_none()
    }

    /// Stops the producers and drops everything buffered. Both streams end.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.source = None;
        self.segments.clear();
        self.instructions.clear();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn collect_all(mut self) -> Drawing {
        while self.pull() {}
        Drawing {
            segments: self.segments.into_iter().collect(),
            instructions: self.instructions.into_iter().collect(),
            diagnostics: self.diagnostics,
        }
    }
}

pub struct Segments<'s, 'a> {
    streams: &'s mut DrawingStreams<'a>,
}

impl Iterator for Segments<'_, '_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        self.streams.next_segment()
    }
}

pub struct Instructions<'s, 'a> {
    streams: &'s mut DrawingStreams<'a>,
}

impl Iterator for Instructions<'_, '_> {
    type Item = DrawingInstruction;

    fn next(&mut self) -> Option<DrawingInstruction> {
        self.streams.next_instruction()
    }
}
