//! Basic shapes. Each one is drawn up front into a short emission list.

use log::debug;

use crate::element::{Presentation, TraversalContext};
use crate::stream::{Emission, EmissionStream};
use crate::style::Style;
use crate::tag::attributes;
use crate::types::{DrawingInstruction, Segment, Tuple};

fn resolve_presentation(
    context: &TraversalContext,
    style: Option<&Style>,
    stroke: Option<&String>,
    fill: Option<&String>,
    stroke_width: Option<f64>,
) -> Presentation {
    context.resolve(Presentation::from_attributes(style, stroke, fill, stroke_width))
}

pub fn circle(circle: &attributes::Circle, context: &TraversalContext) -> EmissionStream<'static> {
    let r = circle.r.unwrap_or(0.0);
    if r <= 0.0 {
        debug!("circle {:?} has no radius, skipped", circle.id);
        return Box::new(std::iter::empty());
    }

    let transform = context.transform_for(circle.transform.as_ref());
    let center = transform.apply(Tuple::new(circle.cx.unwrap_or(0.0), circle.cy.unwrap_or(0.0)));
    let radius = r * transform.scale_factor();
    let presentation = resolve_presentation(
        context,
        circle.style.as_ref(),
        circle.stroke.as_ref(),
        circle.fill.as_ref(),
        circle.stroke_width,
    );

    let emissions = vec![
        Emission::Instruction(DrawingInstruction::Circle(center, radius)),
        Emission::Instruction(DrawingInstruction::Paint(context.paint(&presentation))),
    ];
    Box::new(emissions.into_iter())
}

pub fn rectangle(rect: &attributes::Rectangle, context: &TraversalContext) -> EmissionStream<'static> {
    let (width, height) = match (rect.width, rect.height) {
        (Some(width), Some(height)) if width > 0.0 && height > 0.0 => (width, height),
        _ => {
            debug!("rect {:?} has no area, skipped", rect.id);
            return Box::new(std::iter::empty());
        }
    };

    let x = rect.x.unwrap_or(0.0);
    let y = rect.y.unwrap_or(0.0);
    let transform = context.transform_for(rect.transform.as_ref());
    let corners: Vec<Tuple> = [
        Tuple::new(x, y),
        Tuple::new(x + width, y),
        Tuple::new(x + width, y + height),
        Tuple::new(x, y + height),
    ]
    .iter()
    .map(|corner| transform.apply(*corner))
    .collect();

    let presentation = resolve_presentation(
        context,
        rect.style.as_ref(),
        rect.stroke.as_ref(),
        rect.fill.as_ref(),
        rect.stroke_width,
    );

    let mut segment = Segment::new(corners[0], presentation.stroke_width() * context.scale);
    let mut emissions = vec![Emission::Instruction(DrawingInstruction::Move(corners[0]))];
    for corner in &corners[1..] {
        segment.add_point(*corner);
        emissions.push(Emission::Instruction(DrawingInstruction::Line(*corner)));
    }
    segment.close();

    emissions.push(Emission::Segment(segment));
    emissions.push(Emission::Instruction(DrawingInstruction::Close));
    emissions.push(Emission::Instruction(DrawingInstruction::Paint(context.paint(&presentation))));
    Box::new(emissions.into_iter())
}

pub fn polyline(polyline: &attributes::Polyline, context: &TraversalContext) -> EmissionStream<'static> {
    let points = match &polyline.points {
        Some(points) if !points.is_empty() => points,
        _ => {
            debug!("polyline {:?} has no points, skipped", polyline.id);
            return Box::new(std::iter::empty());
        }
    };

    let transform = context.transform_for(polyline.transform.as_ref());
    let presentation = resolve_presentation(
        context,
        polyline.style.as_ref(),
        polyline.stroke.as_ref(),
        polyline.fill.as_ref(),
        polyline.stroke_width,
    );

    let start = transform.apply(points[0]);
    let mut segment = Segment::new(start, presentation.stroke_width() * context.scale);
    let mut emissions = vec![Emission::Instruction(DrawingInstruction::Move(start))];
    for point in &points[1..] {
        let point = transform.apply(*point);
        segment.add_point(point);
        emissions.push(Emission::Instruction(DrawingInstruction::Line(point)));
    }

    emissions.push(Emission::Segment(segment));
    emissions.push(Emission::Instruction(DrawingInstruction::Paint(context.paint(&presentation))));
    Box::new(emissions.into_iter())
}
