//! Turning the element tree into emission streams.

use log::debug;

use crate::interpreter::PathInterpreter;
use crate::options::Options;
use crate::shapes;
use crate::stream::{CancelToken, EmissionStream, FanIn};
use crate::style::Style;
use crate::tag::{attributes, Node, Tag};
use crate::transform::AffineTransform;
use crate::types::Paint;

pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;

/// Stroke and fill properties of an element, after inheritance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Presentation {
    pub stroke: Option<String>,
    pub fill: Option<String>,
    pub stroke_width: Option<f64>,
}

impl Presentation {
    /// A `style` declaration wins over the attribute of the same name.
    pub fn from_attributes(
        style: Option<&Style>,
        stroke: Option<&String>,
        fill: Option<&String>,
        stroke_width: Option<f64>,
    ) -> Self {
        let style = style.cloned().unwrap_or_default();
        Presentation {
            stroke: style.stroke.or_else(|| stroke.cloned()),
            fill: style.fill.or_else(|| fill.cloned()),
            stroke_width: style.stroke_width.or(stroke_width),
        }
    }

    pub fn inherit(self, parent: &Presentation) -> Presentation {
        Presentation {
            stroke: self.stroke.or_else(|| parent.stroke.clone()),
            fill: self.fill.or_else(|| parent.fill.clone()),
            stroke_width: self.stroke_width.or(parent.stroke_width),
        }
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH)
    }
}

/// Read-only state handed from a parent element to its children.
#[derive(Debug, Clone)]
pub struct TraversalContext {
    pub scale: f64,
    /// Composed ancestor transforms, the document scale outermost.
    pub transform: AffineTransform,
    pub presentation: Presentation,
    pub options: Options,
    pub cancel: CancelToken,
}

impl TraversalContext {
    pub fn root(options: &Options, cancel: CancelToken) -> Self {
        let scale = options.effective_scale();
        TraversalContext {
            scale,
            transform: AffineTransform::scaling(scale, scale),
            presentation: Presentation::default(),
            options: options.clone(),
            cancel,
        }
    }

    /// The transform of an element with its own `transform` attribute `own`.
    pub fn transform_for(&self, own: Option<&AffineTransform>) -> AffineTransform {
        match own {
            Some(own) => AffineTransform::compose(&self.transform, own),
            None => self.transform,
        }
    }

    pub fn resolve(&self, own: Presentation) -> Presentation {
        own.inherit(&self.presentation)
    }

    pub fn descend(&self, own_transform: Option<&AffineTransform>, own: Presentation) -> Self {
        TraversalContext {
            transform: self.transform_for(own_transform),
            presentation: self.resolve(own),
            ..self.clone()
        }
    }

    pub fn paint(&self, presentation: &Presentation) -> Paint {
        Paint {
            fill: presentation.fill.clone(),
            stroke: presentation.stroke.clone(),
            stroke_width: Some(presentation.stroke_width() * self.scale),
        }
    }
}

impl Node {
    /// Everything this element and its descendants draw, in document order.
    pub fn drawing<'n>(&'n self, context: &TraversalContext) -> EmissionStream<'n> {
        match &self.tag {
            Tag::SVG(_) => self.children_drawing(context.clone()),
            Tag::Group(group) => {
                let own = Presentation::from_attributes(
                    group.style.as_ref(),
                    group.stroke.as_ref(),
                    group.fill.as_ref(),
                    group.stroke_width,
                );
                self.children_drawing(context.descend(group.transform.as_ref(), own))
            }
            Tag::Path(path) => path_drawing(path, context),
            Tag::Circle(circle) => shapes::circle(circle, context),
            Tag::Rectangle(rect) => shapes::rectangle(rect, context),
            Tag::Polyline(polyline) => shapes::polyline(polyline, context),
        }
    }

    fn children_drawing<'n>(&'n self, context: TraversalContext) -> EmissionStream<'n> {
        let mut merged = FanIn::new(context.cancel.clone());
        for child in &self.children {
            let context = context.clone();
            merged.push(move || child.drawing(&context));
        }
        Box::new(merged)
    }
}

fn path_drawing<'n>(path: &'n attributes::Path, context: &TraversalContext) -> EmissionStream<'n> {
    let data = match &path.path_data {
        Some(data) => data.as_str(),
        None => {
            debug!("path {:?} has no path data", path.id);
            return Box::new(std::iter::empty());
        }
    };

    let presentation = context.resolve(Presentation::from_attributes(
        path.style.as_ref(),
        path.stroke.as_ref(),
        path.fill.as_ref(),
        path.stroke_width,
    ));
    let transform = context.transform_for(path.transform.as_ref());

    let interpreter = PathInterpreter::new(
        data,
        transform,
        presentation.stroke_width(),
        &context.options,
    )
    .with_element(path.id.clone())
    .with_paint(presentation.fill, presentation.stroke);

    Box::new(interpreter)
}

#[cfg(test)]
mod tests {
    use super::{Presentation, TraversalContext};
    use crate::options::Options;
    use crate::stream::CancelToken;
    use crate::style::Style;
    use crate::transform::AffineTransform;
    use crate::types::Tuple;

    #[test]
    fn test_style_wins_over_attribute() {
        let style = Style::parse("stroke-width:3");
        let own = Presentation::from_attributes(Some(&style), None, Some(&"blue".to_string()), Some(2.0));
        assert_eq!(own.stroke_width, Some(3.0));
        assert_eq!(own.fill.as_deref(), Some("blue"));
    }

    #[test]
    fn test_inherit() {
        let parent = Presentation {
            stroke: Some("black".to_string()),
            fill: Some("red".to_string()),
            stroke_width: Some(4.0),
        };
        let own = Presentation {
            fill: Some("none".to_string()),
            ..Presentation::default()
        };
        let resolved = own.inherit(&parent);
        assert_eq!(resolved.fill.as_deref(), Some("none"));
        assert_eq!(resolved.stroke.as_deref(), Some("black"));
        assert_eq!(resolved.stroke_width(), 4.0);
        assert_eq!(Presentation::default().stroke_width(), 1.0);
    }

    #[test]
    fn test_descend_composes_outer_first() {
        let options = Options {
            scale: 3.0,
            ..Options::default()
        };
        let root = TraversalContext::root(&options, CancelToken::new());
        let group = root.descend(Some(&AffineTransform::scaling(2.0, 2.0)), Presentation::default());
        let child = group.transform_for(Some(&AffineTransform::translation(10.0, 0.0)));
        assert_eq!(child.apply(Tuple::new(0.0, 0.0)), Tuple::new(60.0, 0.0));

        let paint = group.paint(&group.presentation);
        assert_eq!(paint.stroke_width, Some(3.0));
    }
}
