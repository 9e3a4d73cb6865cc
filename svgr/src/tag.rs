use svg_macro::svg_tag;

use crate::error::SvgError;
use crate::style::Style;
use crate::transform::Transform;
use crate::types::*;

/// The svg elements that take part in tracing, with the attributes read for
/// each of them.
#[svg_tag]
#[derive(Debug, Clone)]
pub enum Tag {
    SVG(
        Id,
        #[attr("viewBox")] ViewBox,
        Width,
        Height,
    ),
    Group(
        Id,
        Transform,
        Style,
        Stroke,
        StrokeWidth,
        Fill,
    ),
    Path(
        Id,
        Transform,
        Style,
        #[attr("d")] PathData,
        Stroke,
        StrokeWidth,
        Fill,
    ),
    Circle(
        Id,
        Transform,
        Style,
        Cx,
        Cy,
        R,
        Stroke,
        StrokeWidth,
        Fill,
    ),
    Rectangle(
        Id,
        Transform,
        Style,
        X,
        Y,
        Width,
        Height,
        Stroke,
        StrokeWidth,
        Fill,
    ),
    Polyline(
        Id,
        Transform,
        Style,
        Points,
        Stroke,
        StrokeWidth,
        Fill,
    ),
}

impl Tag {
    pub fn id(&self) -> Option<&str> {
        let id = match self {
            Tag::SVG(attrs) => &attrs.id,
            Tag::Group(attrs) => &attrs.id,
            Tag::Path(attrs) => &attrs.id,
            Tag::Circle(attrs) => &attrs.id,
            Tag::Rectangle(attrs) => &attrs.id,
            Tag::Polyline(attrs) => &attrs.id,
        };
        id.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: Tag,
    pub children: Vec<Node>,
}

impl Node {
    /// Depth-first search for the element with the given `id`.
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.tag.id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}
