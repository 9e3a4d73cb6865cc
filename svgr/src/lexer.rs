//! Tokenizer for the path description mini-language.
//!
//! The lexer yields whitespace and commas as tokens of their own; the
//! interpreter decides where they are allowed.

use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1, multispace1, one_of, satisfy},
    combinator::{map, map_opt, opt, recognize},
    sequence::{pair, tuple},
    IResult,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Letter(char),
    Number(f64),
    Comma,
    WhiteSpace,
    EndOfStream,
    Error(String),
}

fn number_text(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

/// A finite signed decimal number with optional fraction and exponent.
///
/// An exponent marker without digits is left in the input, so `1e` lexes as
/// the number `1` followed by the letter `e`.
pub fn number(input: &str) -> IResult<&str, f64> {
    map_opt(number_text, |text: &str| {
        text.parse::<f64>().ok().filter(|value| value.is_finite())
    })(input)
}

fn number_token(text: &str) -> Token {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Token::Number(value),
        _ => Token::Error(format!("number {} out of range", text)),
    }
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((
        map(multispace1, |_: &str| Token::WhiteSpace),
        map(char(','), |_| Token::Comma),
        map(number_text, number_token),
        map(satisfy(|c: char| c.is_ascii_alphabetic()), Token::Letter),
    ))(input)
}

pub struct Lexer<'a> {
    input: &'a str,
    rest: &'a str,
    peeked: Option<(usize, Token)>,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            rest: input,
            peeked: None,
            offset: 0,
        }
    }

    /// Byte offset of the most recently returned token.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte offset of the token `peek_token` would return.
    pub fn peek_offset(&mut self) -> usize {
        self.peek_token();
        match &self.peeked {
            Some((offset, _)) => *offset,
            None => self.input.len(),
        }
    }

    pub fn next_token(&mut self) -> Token {
        let (offset, token) = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.read_token(),
        };
        self.offset = offset;
        token
    }

    pub fn peek_token(&mut self) -> &Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.read_token());
        }
        match &self.peeked {
            Some((_, token)) => token,
            None => &Token::EndOfStream,
        }
    }

    fn read_token(&mut self) -> (usize, Token) {
        let offset = self.input.len() - self.rest.len();
        if self.rest.is_empty() {
            return (offset, Token::EndOfStream);
        }

        match token(self.rest) {
            Ok((rest, token)) => {
                self.rest = rest;
                (offset, token)
            }
            Err(_) => {
                let mut chars = self.rest.chars();
                let unexpected = chars.next().unwrap_or_default();
                self.rest = chars.as_str();
                (
                    offset,
                    Token::Error(format!("unexpected character {:?}", unexpected)),
                )
            }
        }
    }

    pub fn consume_white_space(&mut self) {
        while let Token::WhiteSpace = self.peek_token() {
            self.next_token();
        }
    }

    pub fn consume_comma(&mut self) {
        if let Token::Comma = self.peek_token() {
            self.next_token();
        }
    }

    /// Skips the separator between two numbers: optional whitespace around
    /// at most one comma.
    pub fn consume_separator(&mut self) {
        self.consume_white_space();
        self.consume_comma();
        self.consume_white_space();
    }

    /// Drops tokens up to the next command letter or the end of input.
    pub fn skip_to_command(&mut self) {
        loop {
            match self.peek_token() {
                Token::Letter(_) | Token::EndOfStream => return,
                _ => {
                    self.next_token();
                }
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.next_token() {
            Token::EndOfStream => None,
            token => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Lexer, Token};

    fn token_result(input: &str) -> Vec<Token> {
        Lexer::new(input).collect()
    }

    #[test]
    fn test_read_command() {
        assert_eq!(
            token_result("M0 0"),
            vec![
                Token::Letter('M'),
                Token::Number(0.0),
                Token::WhiteSpace,
                Token::Number(0.0)
            ]
        );
    }

    #[test]
    fn test_read_real() {
        assert_eq!(token_result("-80"), vec![Token::Number(-80.0)]);
        assert_eq!(token_result(".5"), vec![Token::Number(0.5)]);
        assert_eq!(token_result("1e3"), vec![Token::Number(1000.0)]);
        assert_eq!(token_result("2.5E-1"), vec![Token::Number(0.25)]);
    }

    #[test]
    fn test_adjacent_numbers() {
        assert_eq!(
            token_result("1-2.5.5"),
            vec![Token::Number(1.0), Token::Number(-2.5), Token::Number(0.5)]
        );
        assert_eq!(
            token_result("10,20"),
            vec![Token::Number(10.0), Token::Comma, Token::Number(20.0)]
        );
    }

    #[test]
    fn test_dangling_exponent() {
        assert_eq!(token_result("1e"), vec![Token::Number(1.0), Token::Letter('e')]);
    }

    #[test]
    fn test_out_of_range() {
        let tokens = token_result("1e400,-1e999 2");
        assert!(matches!(&tokens[0], Token::Error(msg) if msg.contains("1e400")));
        assert_eq!(tokens[1], Token::Comma);
        assert!(matches!(tokens[2], Token::Error(_)));
        assert_eq!(tokens[4], Token::Number(2.0));
        assert!(super::number("1e400").is_err());
    }

    #[test]
    fn test_error_token() {
        let tokens = token_result("M#1");
        assert_eq!(tokens[0], Token::Letter('M'));
        assert!(matches!(tokens[1], Token::Error(_)));
        assert_eq!(tokens[2], Token::Number(1.0));
    }

    #[test]
    fn test_peek_and_skip() {
        let mut lexer = Lexer::new("  12 , 3 L");
        lexer.consume_white_space();
        assert_eq!(lexer.peek_token(), &Token::Number(12.0));
        assert_eq!(lexer.peek_offset(), 2);
        lexer.skip_to_command();
        assert_eq!(lexer.next_token(), Token::Letter('L'));
        assert_eq!(lexer.offset(), 9);
        assert_eq!(lexer.next_token(), Token::EndOfStream);
        assert_eq!(lexer.next_token(), Token::EndOfStream);
    }
}
