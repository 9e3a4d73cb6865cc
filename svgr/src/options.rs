/// Deepest subdivision a curve is flattened with, `2^20 + 1` vertices.
pub const MAX_FLATTENING_DEPTH: u32 = 20;

/// How cubic curves are approximated by polylines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flattening {
    /// Subdivide every curve exactly `depth` times, giving `2^depth + 1`
    /// vertices. Depths beyond `MAX_FLATTENING_DEPTH` are capped.
    Uniform { depth: u32 },
    /// Subdivide until the control points lie within `tolerance` of the
    /// chord, or `max_depth` is reached. Produces fewer vertices on gentle
    /// curves than `Uniform` does.
    Adaptive { tolerance: f64, max_depth: u32 },
}

impl Default for Flattening {
    fn default() -> Self {
        Flattening::Uniform { depth: 10 }
    }
}

/// What coordinate pairs after the first one of a move command mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveRepeats {
    /// Every pair is a move of its own and starts a new segment.
    NewSubpath,
    /// Pairs after the first are line-tos, as in the SVG path grammar.
    LineTo,
}

impl Default for MoveRepeats {
    fn default() -> Self {
        MoveRepeats::NewSubpath
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Ambient document scale. Negative values mean `1 / -scale`, zero
    /// means no scaling.
    pub scale: f64,
    pub flattening: Flattening,
    pub move_repeats: MoveRepeats,
    /// Drop segments as they are produced instead of buffering them for a
    /// consumer that never reads them.
    pub discard_segments: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            scale: 1.0,
            flattening: Flattening::default(),
            move_repeats: MoveRepeats::default(),
            discard_segments: false,
        }
    }
}

impl Options {
    pub fn effective_scale(&self) -> f64 {
        if self.scale > 0.0 {
            self.scale
        } else if self.scale < 0.0 {
            1.0 / -self.scale
        } else {
            1.0
        }
    }
}
