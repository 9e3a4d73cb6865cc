//! Traces svg paths and shapes into device-space polylines ("segments") and
//! replayable drawing instructions.

pub mod bezier;
pub mod concurrent;
pub mod document;
pub mod element;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod options;
pub mod replay;
pub mod shapes;
pub mod stream;
pub mod style;
pub mod tag;
pub mod transform;
pub mod types;

pub use concurrent::{spawn, TraceHandle};
pub use document::Document;
pub use error::{Diagnostic, Result, SvgError};
pub use interpreter::PathInterpreter;
pub use options::{Flattening, MoveRepeats, Options};
pub use stream::{CancelToken, Drawing, DrawingStreams, Emission, EmissionStream, FanIn};
pub use transform::AffineTransform;
pub use types::{DrawingInstruction, Paint, Segment, Tuple};

/// Traces a single path description under the document scale of `options`
/// and a stroke width of 1.
pub fn trace_path(data: &str, options: &Options) -> Drawing {
    let scale = options.effective_scale();
    let interpreter = PathInterpreter::new(
        data,
        AffineTransform::scaling(scale, scale),
        element::DEFAULT_STROKE_WIDTH,
        options,
    );
    DrawingStreams::new(Box::new(interpreter), CancelToken::new(), options.discard_segments)
        .collect_all()
}
