use crate::error::Result;
use crate::types::AttributeValue;

/// The presentation properties read from a `style` attribute.
///
/// Parsing never fails: unknown keys and malformed declarations are skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub stroke_width: Option<f64>,
    pub stroke: Option<String>,
    pub fill: Option<String>,
}

impl Style {
    pub fn parse(input: &str) -> Style {
        let mut style = Style::default();

        for declaration in input.split(';') {
            let (key, value) = match declaration.find(':') {
                Some(colon) => (&declaration[..colon], &declaration[colon + 1..]),
                None => continue,
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.trim() {
                "stroke-width" => {
                    if let Ok(width) = f64::parse_attribute("stroke-width", value) {
                        style.stroke_width = Some(width);
                    }
                }
                "stroke" => style.stroke = Some(value.to_string()),
                "fill" => style.fill = Some(value.to_string()),
                _ => (),
            }
        }

        style
    }
}

impl AttributeValue for Style {
    fn parse_attribute(_name: &str, raw: &str) -> Result<Self> {
        Ok(Style::parse(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::Style;

    #[test]
    fn test_stroke_width() {
        let style = Style::parse("fill:none;stroke:#000000;stroke-width:0.75;stroke-miterlimit:10");
        assert_eq!(style.stroke_width, Some(0.75));
        assert_eq!(style.stroke.as_deref(), Some("#000000"));
        assert_eq!(style.fill.as_deref(), Some("none"));
    }

    #[test]
    fn test_lenient() {
        let style = Style::parse(" stroke-width : 2px ;garbage; :; opacity:0.5;");
        assert_eq!(style.stroke_width, Some(2.0));
        assert_eq!(Style::parse("stroke-width:thick"), Style::default());
        assert_eq!(Style::parse(""), Style::default());
    }
}
