//! Tracing on a producer thread.
//!
//! Instructions travel over a bounded channel and segments over an unbounded
//! one, so a consumer that never reads segments cannot stall instruction
//! delivery. Dropping the handle cancels the producer and joins it.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::document::Document;
use crate::error::Diagnostic;
use crate::options::Options;
use crate::stream::{CancelToken, Emission};
use crate::types::{DrawingInstruction, Segment};

pub const INSTRUCTION_CAPACITY: usize = 100;

pub struct TraceHandle {
    segments: Option<Receiver<Segment>>,
    instructions: Option<Receiver<DrawingInstruction>>,
    cancel: CancelToken,
    producer: Option<JoinHandle<Vec<Diagnostic>>>,
}

/// Starts tracing `document` on a new thread.
pub fn spawn(mut document: Document, options: Options) -> TraceHandle {
    let (segment_tx, segment_rx) = mpsc::channel();
    let (instruction_tx, instruction_rx) = mpsc::sync_channel(INSTRUCTION_CAPACITY);
    let cancel = CancelToken::new();
    let token = cancel.clone();

    let producer = thread::spawn(move || {
        let mut diagnostics = document.take_diagnostics();
        let mut segment_tx = if options.discard_segments {
            None
        } else {
            Some(segment_tx)
        };

        for emission in document.emissions(&options, token.clone()) {
            if token.is_cancelled() {
                debug!("producer cancelled");
                break;
            }
            match emission {
                Emission::Segment(segment) => {
                    let delivered = match &segment_tx {
                        Some(tx) => tx.send(segment).is_ok(),
                        None => true,
                    };
                    if !delivered {
                        debug!("segment receiver dropped");
                        segment_tx = None;
                    }
                }
                Emission::Instruction(instruction) => {
                    if instruction_tx.send(instruction).is_err() {
                        debug!("instruction receiver dropped, stopping");
                        break;
                    }
                }
                Emission::Diagnostic(diagnostic) => diagnostics.push(diagnostic),
            }
        }

        diagnostics
    });

    TraceHandle {
        segments: Some(segment_rx),
        instructions: Some(instruction_rx),
        cancel,
        producer: Some(producer),
    }
}

impl TraceHandle {
    /// Blocking iterator over the segments. Ends when the producer is done.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.segments.iter().flat_map(|rx| rx.iter())
    }

    /// Blocking iterator over the instructions. Ends when the producer is done.
    pub fn instructions(&self) -> impl Iterator<Item = DrawingInstruction> + '_ {
        self.instructions.iter().flat_map(|rx| rx.iter())
    }

    /// Hands the segment receiver over, e.g. to drain it on another thread.
    /// Sending to it never blocks the producer.
    pub fn take_segments(&mut self) -> Option<Receiver<Segment>> {
        self.segments.take()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the producer and returns its diagnostics. Output not read yet
    /// is dropped.
    pub fn join(mut self) -> Vec<Diagnostic> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Vec<Diagnostic> {
        self.segments = None;
        self.instructions = None;
        match self.producer.take() {
            Some(producer) => producer.join().unwrap_or_else(|_| {
                warn!("producer thread panicked");
                Vec::new()
            }),
            None => Vec::new(),
        }
    }
}

impl Drop for TraceHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.shutdown();
    }
}
