use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map_opt, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{Result, SvgError};
use crate::lexer::number;
use crate::types::{AttributeValue, Tuple};

/// A 2D affine map
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

pub type Transform = AffineTransform;

impl Default for AffineTransform {
    fn default() -> Self {
        AffineTransform::identity()
    }
}

impl AffineTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        AffineTransform { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        AffineTransform::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        AffineTransform::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        AffineTransform::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees` around the origin.
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        AffineTransform::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub fn skew_x(degrees: f64) -> Self {
        AffineTransform::new(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        AffineTransform::new(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// The map that applies `inner` first and `outer` second.
    pub fn compose(outer: &AffineTransform, inner: &AffineTransform) -> AffineTransform {
        AffineTransform {
            a: outer.a * inner.a + outer.c * inner.b,
            b: outer.b * inner.a + outer.d * inner.b,
            c: outer.a * inner.c + outer.c * inner.d,
            d: outer.b * inner.c + outer.d * inner.d,
            e: outer.a * inner.e + outer.c * inner.f + outer.e,
            f: outer.b * inner.e + outer.d * inner.f + outer.f,
        }
    }

    /// Folds an ancestor chain given root first, then the element's own
    /// transform, into one effective transform.
    pub fn compose_chain(ancestors: &[AffineTransform], own: &AffineTransform) -> AffineTransform {
        let outer = ancestors
            .iter()
            .fold(AffineTransform::identity(), |acc, t| {
                AffineTransform::compose(&acc, t)
            });
        AffineTransform::compose(&outer, own)
    }

    pub fn apply(&self, point: Tuple) -> Tuple {
        Tuple::new(
            self.a * point.x + self.c * point.y + self.e,
            self.b * point.x + self.d * point.y + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Uniform length scale of the map, used for radii and stroke widths.
    pub fn scale_factor(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    pub fn is_identity(&self) -> bool {
        *self == AffineTransform::identity()
    }
}

fn separator(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(tuple((multispace0, char(','), multispace0))),
        multispace1,
    ))(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<f64>> {
    separated_list1(separator, number)(input)
}

fn css_function<'a, F, O>(name: &'static str, arg_parser: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(
        pair(tag(name), multispace0),
        delimited(
            pair(char('('), multispace0),
            arg_parser,
            pair(multispace0, char(')')),
        ),
    )
}

fn transform_function(input: &str) -> IResult<&str, AffineTransform> {
    alt((
        map_opt(css_function("matrix", arguments), |args: Vec<f64>| match args.as_slice() {
            [a, b, c, d, e, f] => Some(AffineTransform::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }),
        map_opt(css_function("translate", arguments), |args: Vec<f64>| {
            match args.as_slice() {
                [tx] => Some(AffineTransform::translation(*tx, 0.0)),
                [tx, ty] => Some(AffineTransform::translation(*tx, *ty)),
                _ => None,
            }
        }),
        map_opt(css_function("scale", arguments), |args: Vec<f64>| match args.as_slice() {
            [s] => Some(AffineTransform::scaling(*s, *s)),
            [sx, sy] => Some(AffineTransform::scaling(*sx, *sy)),
            _ => None,
        }),
        map_opt(css_function("rotate", arguments), |args: Vec<f64>| match args.as_slice() {
            [angle] => Some(AffineTransform::rotation(*angle)),
            [angle, cx, cy] => {
                let to_center = AffineTransform::translation(*cx, *cy);
                let from_center = AffineTransform::translation(-*cx, -*cy);
                let rotated = AffineTransform::compose(&AffineTransform::rotation(*angle), &from_center);
                Some(AffineTransform::compose(&to_center, &rotated))
            }
            _ => None,
        }),
        map_opt(css_function("skewX", arguments), |args: Vec<f64>| match args.as_slice() {
            [angle] => Some(AffineTransform::skew_x(*angle)),
            _ => None,
        }),
        map_opt(css_function("skewY", arguments), |args: Vec<f64>| match args.as_slice() {
            [angle] => Some(AffineTransform::skew_y(*angle)),
            _ => None,
        }),
    ))(input)
}

fn transform_list(input: &str) -> IResult<&str, Vec<AffineTransform>> {
    preceded(
        multispace0,
        many0(terminated(transform_function, opt(separator))),
    )(input)
}

impl FromStr for AffineTransform {
    type Err = SvgError;

    /// Parses a transform attribute. The leftmost function is the outermost.
    fn from_str(s: &str) -> Result<Self> {
        let (_, transforms) = all_consuming(transform_list)(s)
            .map_err(|_| SvgError::MalformedTransform(s.to_string()))?;

        Ok(transforms
            .iter()
            .fold(AffineTransform::identity(), |acc, t| {
                AffineTransform::compose(&acc, t)
            }))
    }
}

impl AttributeValue for AffineTransform {
    fn parse_attribute(_name: &str, raw: &str) -> Result<Self> {
        raw.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::AffineTransform;
    use crate::types::Tuple;

    fn assert_close(actual: Tuple, expected: Tuple) {
        assert!(
            (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn test_compose_order() {
        let outer = AffineTransform::scaling(2.0, 2.0);
        let inner = AffineTransform::translation(10.0, 0.0);
        let composed = AffineTransform::compose(&outer, &inner);
        assert_eq!(composed.apply(Tuple::new(0.0, 0.0)), Tuple::new(20.0, 0.0));

        let reversed = AffineTransform::compose(&inner, &outer);
        assert_eq!(reversed.apply(Tuple::new(0.0, 0.0)), Tuple::new(10.0, 0.0));
    }

    #[test]
    fn test_compose_chain() {
        let ancestors = [
            AffineTransform::scaling(2.0, 2.0),
            AffineTransform::translation(5.0, 5.0),
        ];
        let own = AffineTransform::translation(1.0, 0.0);
        let composed = AffineTransform::compose_chain(&ancestors, &own);
        assert_eq!(composed.apply(Tuple::new(0.0, 0.0)), Tuple::new(12.0, 10.0));
        assert!(AffineTransform::compose_chain(&[], &AffineTransform::identity()).is_identity());
    }

    #[test]
    fn test_parse_translate() {
        let t: AffineTransform = "translate(10)".parse().unwrap();
        assert_eq!(t, AffineTransform::translation(10.0, 0.0));
        let t: AffineTransform = "translate( 10 , -5 )".parse().unwrap();
        assert_eq!(t, AffineTransform::translation(10.0, -5.0));
    }

    #[test]
    fn test_parse_matrix() {
        let t: AffineTransform = "matrix(1 0 0 1 232.3306 107.5952)".parse().unwrap();
        assert_eq!(t, AffineTransform::translation(232.3306, 107.5952));
    }

    #[test]
    fn test_parse_list_leftmost_outermost() {
        let t: AffineTransform = "scale(2) translate(10,0)".parse().unwrap();
        assert_eq!(t.apply(Tuple::new(0.0, 0.0)), Tuple::new(20.0, 0.0));
        let t: AffineTransform = "translate(10,0),scale(2)".parse().unwrap();
        assert_eq!(t.apply(Tuple::new(1.0, 0.0)), Tuple::new(12.0, 0.0));
    }

    #[test]
    fn test_parse_rotate_about_center() {
        let t: AffineTransform = "rotate(90 10 10)".parse().unwrap();
        assert_close(t.apply(Tuple::new(20.0, 10.0)), Tuple::new(10.0, 20.0));
        let t: AffineTransform = "rotate(90)".parse().unwrap();
        assert_close(t.apply(Tuple::new(1.0, 0.0)), Tuple::new(0.0, 1.0));
    }

    #[test]
    fn test_parse_skew() {
        let t: AffineTransform = "skewX(45)".parse().unwrap();
        assert_close(t.apply(Tuple::new(0.0, 1.0)), Tuple::new(1.0, 1.0));
        assert_close(t.apply(Tuple::new(1.0, 0.0)), Tuple::new(1.0, 0.0));

        let t: AffineTransform = "skewY(45)".parse().unwrap();
        assert_close(t.apply(Tuple::new(1.0, 0.0)), Tuple::new(1.0, 1.0));
        assert_close(t.apply(Tuple::new(0.0, 1.0)), Tuple::new(0.0, 1.0));

        assert!("skewX(1 2)".parse::<AffineTransform>().is_err());
    }

    #[test]
    fn test_parse_empty_is_identity() {
        let t: AffineTransform = "  ".parse().unwrap();
        assert!(t.is_identity());
    }

    #[test]
    fn test_parse_malformed() {
        assert!("translate(10".parse::<AffineTransform>().is_err());
        assert!("shear(1)".parse::<AffineTransform>().is_err());
        assert!("matrix(1 2 3)".parse::<AffineTransform>().is_err());
    }

    #[test]
    fn test_scale_factor() {
        let t = AffineTransform::scaling(2.0, 8.0);
        assert_eq!(t.scale_factor(), 4.0);
    }
}
