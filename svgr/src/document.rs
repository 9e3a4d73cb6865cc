use std::path::Path;

use log::{debug, warn};
use svg::node::element::tag;
use svg::parser::Event;

use crate::error::{Diagnostic, Result, SvgError};
use crate::element::TraversalContext;
use crate::options::Options;
use crate::stream::{CancelToken, DrawingStreams, EmissionStream};
use crate::tag::{attributes, Node, Tag};

/// Builds the tag for an element, or `None` for elements that are not traced.
fn build_tag<'a, F>(name: &str, lookup: F, errors: &mut Vec<SvgError>) -> Option<Tag>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let tag = match name {
        tag::SVG => Tag::SVG(attributes::SVG::from_attributes(lookup, errors)),
        tag::Group => Tag::Group(attributes::Group::from_attributes(lookup, errors)),
        tag::Path => Tag::Path(attributes::Path::from_attributes(lookup, errors)),
        tag::Circle => Tag::Circle(attributes::Circle::from_attributes(lookup, errors)),
        tag::Rectangle => Tag::Rectangle(attributes::Rectangle::from_attributes(lookup, errors)),
        tag::Polyline => Tag::Polyline(attributes::Polyline::from_attributes(lookup, errors)),
        _ => return None,
    };
    Some(tag)
}

/// Reads the children of the open element `parent` up to its end tag.
fn parse_node<'l, I>(events: &mut I, parent: &str, diagnostics: &mut Vec<Diagnostic>) -> Result<Vec<Node>>
where
    I: Iterator<Item = Event<'l>>,
{
    let mut siblings = Vec::new();

    while let Some(event) = events.next() {
        let (name, kind, raw) = match event {
            Event::Error(error) => return Err(SvgError::StructuralDocument(error.to_string())),
            Event::Tag(name, tag::Type::End, _) => {
                if name != parent {
                    return Err(SvgError::StructuralDocument(format!(
                        "</{}> closes <{}>",
                        name, parent
                    )));
                }
                return Ok(siblings);
            }
            Event::Tag(name, kind, raw) => (name, kind, raw),
            _ => continue,
        };

        let lookup = |key: &str| {
            raw.get(key).map(|value| {
                let text: &str = value;
                text
            })
        };

        let mut errors = Vec::new();
        let node_tag = build_tag(name, lookup, &mut errors);
        if !errors.is_empty() {
            let id = lookup("id").map(str::to_string);
            for error in errors {
                warn!("<{}> {:?}: {}", name, id, error);
                diagnostics.push(Diagnostic::new(id.clone(), error));
            }
        }

        let children = match kind {
            tag::Type::Start => parse_node(events, name, diagnostics)?,
            _ => Vec::new(),
        };

        match node_tag {
            Some(tag) => siblings.push(Node { tag, children }),
            None => debug!("skipping <{}>", name),
        }
    }

    Err(SvgError::StructuralDocument(format!("<{}> is never closed", parent)))
}

fn parse_svg<'l, I>(events: &mut I, diagnostics: &mut Vec<Diagnostic>) -> Result<Node>
where
    I: Iterator<Item = Event<'l>>,
{
    let mut root = None;

    while let Some(event) = events.next() {
        match event {
            Event::Error(error) => return Err(SvgError::StructuralDocument(error.to_string())),
            Event::Tag(tag::SVG, kind, raw) if root.is_none() => {
                let mut errors = Vec::new();
                let attrs = attributes::SVG::from_attributes(
                    |key: &str| {
                        raw.get(key).map(|value| {
                            let text: &str = value;
                            text
                        })
                    },
                    &mut errors,
                );
                diagnostics.extend(errors.into_iter().map(|error| {
                    warn!("<svg>: {}", error);
                    Diagnostic::new(attrs.id.clone(), error)
                }));

                let children = match kind {
                    tag::Type::Start => parse_node(events, tag::SVG, diagnostics)?,
                    tag::Type::Empty => Vec::new(),
                    tag::Type::End => {
                        return Err(SvgError::StructuralDocument("</svg> without <svg>".to_string()))
                    }
                };
                root = Some(Node {
                    tag: Tag::SVG(attrs),
                    children,
                });
            }
            Event::Tag(name, _, _) => {
                return Err(SvgError::StructuralDocument(match root {
                    Some(_) => format!("<{}> after the root element", name),
                    None => format!("expected <svg> as root element, found <{}>", name),
                }))
            }
            _ => (),
        }
    }

    root.ok_or_else(|| SvgError::StructuralDocument("no <svg> root element".to_string()))
}

/// A parsed svg document, ready to be traced any number of times.
#[derive(Debug)]
pub struct Document {
    root: Node,
    diagnostics: Vec<Diagnostic>,
}

impl Document {
    pub fn parse(content: &str) -> Result<Document> {
        let mut events = svg::read(content).map_err(|source| SvgError::Io {
            source,
            msg: "reading svg content".to_string(),
        })?;
        Document::from_events(&mut events)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Document> {
        let path = path.as_ref();
        let mut content = String::new();
        let mut events = svg::open(path, &mut content).map_err(|source| SvgError::Io {
            source,
            msg: format!("opening {}", path.display()),
        })?;
        Document::from_events(&mut events)
    }

    fn from_events<'l, I>(events: &mut I) -> Result<Document>
    where
        I: Iterator<Item = Event<'l>>,
    {
        let mut diagnostics = Vec::new();
        let root = parse_svg(events, &mut diagnostics)?;
        debug!(
            "parsed document with {} top-level elements, {} diagnostics",
            root.children.len(),
            diagnostics.len()
        );
        Ok(Document { root, diagnostics })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Problems found in attribute values while parsing. The affected
    /// attributes are treated as absent.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn emissions<'d>(&'d self, options: &Options, cancel: CancelToken) -> EmissionStream<'d> {
        let context = TraversalContext::root(options, cancel);
        self.root.drawing(&context)
    }

    /// Traces the whole document into a segment stream and an instruction
    /// stream.
    pub fn drawing<'d>(&'d self, options: &Options) -> DrawingStreams<'d> {
        let cancel = CancelToken::new();
        let emissions = self.emissions(options, cancel.clone());
        DrawingStreams::new(emissions, cancel, options.discard_segments)
    }
}
