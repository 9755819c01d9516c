//! Constraint annotation parser
//!
//! Turns one field's annotation into an ordered list of [`Constraint`]s:
//!
//! ```text
//! required, min(3); include("a,b", c)
//! ```
//!
//! Items are separated by `,` or `;`. Arguments are bare text or
//! double/single-quoted strings (`\` escapes the quote and itself). A bare
//! argument cannot contain `,` `(` `)` or quotes; quote it instead. The
//! annotation `-` excludes the field from validation entirely.

use thiserror::Error;

/// Annotation that excludes a field from validation and recursion.
pub const SKIP: &str = "-";

/// One parsed `name(args...)` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// Lower-cased constraint name.
    pub name: String,
    /// Arguments in declaration order, passed verbatim to the evaluator.
    pub args: Vec<String>,
}

impl Constraint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            args: Vec::new(),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Result of parsing one annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// The field is excluded.
    Skip,
    /// Constraints to apply, possibly none.
    Constraints(Vec<Constraint>),
}

/// Why an annotation could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("unexpected end of annotation")]
    UnexpectedEnd,
    #[error("unterminated quoted argument")]
    UnterminatedQuote,
    #[error("empty constraint")]
    EmptyConstraint,
    #[error("empty argument")]
    EmptyArgument,
}

/// Annotation syntax error with the byte offset where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at byte {position}")]
pub struct TagSyntaxError {
    pub kind: SyntaxErrorKind,
    pub position: usize,
}

/// Parses one field annotation.
///
/// # Examples
///
/// ```rust,ignore
/// use fieldguard::tag::{parse, Annotation, Constraint};
///
/// let parsed = parse("required, between(1, 5)").unwrap();
/// assert_eq!(
///     parsed,
///     Annotation::Constraints(vec![
///         Constraint::new("required"),
///         Constraint::new("between").with_arg("1").with_arg("5"),
///     ])
/// );
/// ```
pub fn parse(input: &str) -> Result<Annotation, TagSyntaxError> {
    if input.trim() == SKIP {
        return Ok(Annotation::Skip);
    }
    Parser::new(input).constraints().map(Annotation::Constraints)
}

struct Parser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn constraints(&mut self) -> Result<Vec<Constraint>, TagSyntaxError> {
        let mut constraints = Vec::new();

        self.skip_whitespace();
        if self.current_char().is_none() {
            return Ok(constraints);
        }

        loop {
            constraints.push(self.constraint()?);
            self.skip_whitespace();
            match self.current_char() {
                None => return Ok(constraints),
                Some(',' | ';') => {
                    self.advance();
                    self.skip_whitespace();
                }
                Some(ch) => return Err(self.error(SyntaxErrorKind::UnexpectedChar(ch))),
            }
        }
    }

    fn constraint(&mut self) -> Result<Constraint, TagSyntaxError> {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        if self.position == start {
            let kind = match self.current_char() {
                None => SyntaxErrorKind::UnexpectedEnd,
                Some(',' | ';') => SyntaxErrorKind::EmptyConstraint,
                Some(ch) => SyntaxErrorKind::UnexpectedChar(ch),
            };
            return Err(self.error(kind));
        }

        let mut constraint = Constraint::new(&self.input[start..self.position]);
        self.skip_whitespace();
        if self.current_char() == Some('(') {
            self.advance();
            constraint.args = self.arguments()?;
        }
        Ok(constraint)
    }

    fn arguments(&mut self) -> Result<Vec<String>, TagSyntaxError> {
        let mut args = Vec::new();

        self.skip_whitespace();
        if self.current_char() == Some(')') {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.argument()?);
            self.skip_whitespace();
            match self.current_char() {
                Some(',') => {
                    self.advance();
                    self.skip_whitespace();
                }
                Some(')') => {
                    self.advance();
                    return Ok(args);
                }
                Some(ch) => return Err(self.error(SyntaxErrorKind::UnexpectedChar(ch))),
                None => return Err(self.error(SyntaxErrorKind::UnexpectedEnd)),
            }
        }
    }

    fn argument(&mut self) -> Result<String, TagSyntaxError> {
        match self.current_char() {
            Some(quote @ ('"' | '\'')) => self.quoted(quote),
            _ => self.bare(),
        }
    }

    fn bare(&mut self) -> Result<String, TagSyntaxError> {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if matches!(ch, ',' | '(' | ')' | '"' | '\'') {
                break;
            }
            self.advance();
        }

        let raw = self.input[start..self.position].trim();
        if raw.is_empty() {
            let kind = match self.current_char() {
                None => SyntaxErrorKind::UnexpectedEnd,
                Some(ch @ ('(' | '"' | '\'')) => SyntaxErrorKind::UnexpectedChar(ch),
                Some(_) => SyntaxErrorKind::EmptyArgument,
            };
            return Err(self.error(kind));
        }
        Ok(raw.to_owned())
    }

    fn quoted(&mut self, quote: char) -> Result<String, TagSyntaxError> {
        let start = self.position;
        self.advance(); // opening quote

        let mut value = String::new();
        while let Some(ch) = self.current_char() {
            self.advance();
            match ch {
                c if c == quote => return Ok(value),
                '\\' => match self.current_char() {
                    Some(escaped) if escaped == quote || escaped == '\\' => {
                        value.push(escaped);
                        self.advance();
                    }
                    // Unknown escapes stay verbatim so regex classes survive.
                    Some(_) => value.push('\\'),
                    None => break,
                },
                c => value.push(c),
            }
        }

        Err(TagSyntaxError {
            kind: SyntaxErrorKind::UnterminatedQuote,
            position: start,
        })
    }

    fn error(&self, kind: SyntaxErrorKind) -> TagSyntaxError {
        TagSyntaxError {
            kind,
            position: self.position,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn constraints(input: &str) -> Vec<Constraint> {
        match parse(input).unwrap() {
            Annotation::Constraints(constraints) => constraints,
            Annotation::Skip => panic!("unexpected skip for {input:?}"),
        }
    }

    fn c(name: &str, args: &[&str]) -> Constraint {
        args.iter()
            .fold(Constraint::new(name), |constraint, arg| constraint.with_arg(*arg))
    }

    #[rstest]
    #[case("", vec![])]
    #[case("   ", vec![])]
    #[case("required", vec![c("required", &[])])]
    #[case("required()", vec![c("required", &[])])]
    #[case("Required,MIN(3)", vec![c("required", &[]), c("min", &["3"])])]
    #[case("required;min(3)", vec![c("required", &[]), c("min", &["3"])])]
    #[case(" min(2), max(5) ", vec![c("min", &["2"]), c("max", &["5"])])]
    #[case("between( 1 , 5 )", vec![c("between", &["1", "5"])])]
    #[case("regexp(^[a-z]+$)", vec![c("regexp", &["^[a-z]+$"])])]
    #[case(r#"include("a,b", c)"#, vec![c("include", &["a,b", "c"])])]
    #[case(r"include('it\'s')", vec![c("include", &["it's"])])]
    #[case(r#"regexp("^\d+(\.\d+)?$")"#, vec![c("regexp", &[r"^\d+(\.\d+)?$"])])]
    #[case("uuid4 ; base64", vec![c("uuid4", &[]), c("base64", &[])])]
    fn parses(#[case] input: &str, #[case] expected: Vec<Constraint>) {
        assert_eq!(constraints(input), expected);
    }

    #[rstest]
    #[case("-")]
    #[case(" - ")]
    fn skip_sentinel(#[case] input: &str) {
        assert_eq!(parse(input).unwrap(), Annotation::Skip);
    }

    #[rstest]
    #[case("min(10)|bv", SyntaxErrorKind::UnexpectedChar('|'), 7)]
    #[case("min(10", SyntaxErrorKind::UnexpectedEnd, 6)]
    #[case("required,,min(1)", SyntaxErrorKind::EmptyConstraint, 9)]
    #[case("required,", SyntaxErrorKind::UnexpectedEnd, 9)]
    #[case("min(,)", SyntaxErrorKind::EmptyArgument, 4)]
    #[case(r#"include("abc)"#, SyntaxErrorKind::UnterminatedQuote, 8)]
    #[case("-,required", SyntaxErrorKind::UnexpectedChar('-'), 0)]
    #[case("min(1)(2)", SyntaxErrorKind::UnexpectedChar('('), 6)]
    fn rejects(#[case] input: &str, #[case] kind: SyntaxErrorKind, #[case] position: usize) {
        assert_eq!(parse(input), Err(TagSyntaxError { kind, position }));
    }

    #[test]
    fn error_display_mentions_offset() {
        let err = parse("a|b").unwrap_err();
        assert_eq!(err.to_string(), "unexpected character `|` at byte 1");
    }
}
