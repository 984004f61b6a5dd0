//! Restricted evaluator for Python-style literal expressions.
//!
//! Wizard frontends write query values the way a Python REPL prints them:
//! `'50'`, `50`, `True`, `['a', 'b']`, `{'Price': '50'}`. This parser accepts
//! exactly that literal subset and maps it onto JSON values. Nothing is
//! executed: names other than `True`, `False`, and `None` are rejected.
//!
//! | literal              | value           |
//! |----------------------|-----------------|
//! | `'text'`, `"text"`   | string          |
//! | `42`, `-7`, `0x1f`   | integer         |
//! | `1.5`, `.5`, `2e3`   | float           |
//! | `True`, `False`      | boolean         |
//! | `None`               | null            |
//! | `[..]`, `(..)`       | array           |
//! | `{'k': ..}`          | object          |
//!
//! Adjacent string literals are concatenated and `(x)` is just `x`, as in
//! Python. Mapping keys must be strings because the result is JSON.

use std::iter::Peekable;
use std::str::CharIndices;

use serde_json::{Map, Number, Value};

use super::errors::LiteralError;

/// Deepest collection nesting accepted.
pub const MAX_DEPTH: usize = 64;

/// Parses `source` as a single literal expression.
///
/// Leading and trailing whitespace is ignored.
///
/// # Errors
///
/// Returns a [`LiteralError`] describing the first problem found.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use woz_protocol::parse_literal;
///
/// let value = parse_literal("[{'Price': '50'}, (1, 2.5, None)]").expect("valid literal");
/// assert_eq!(value, json!([{"Price": "50"}, [1, 2.5, null]]));
///
/// assert!(parse_literal("__import__('os')").is_err());
/// ```
pub fn parse_literal(source: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new(source);
    let value = parser.value(0)?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(value),
        Some((offset, _)) => Err(LiteralError::TrailingCharacters { offset }),
    }
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, ch)| ch == expected).is_some()
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, ch)| ch.is_whitespace()).is_some() {}
    }

    fn value(&mut self, depth: usize) -> Result<Value, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(LiteralError::NestingTooDeep { limit: MAX_DEPTH });
        }
        self.skip_whitespace();
        let (offset, ch) = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
        match ch {
            '\'' | '"' => self.strings().map(Value::String),
            '[' => {
                self.bump();
                self.sequence(']', depth).map(Value::Array)
            }
            '(' => {
                self.bump();
                self.parenthesized(depth)
            }
            '{' => {
                self.bump();
                self.mapping(depth).map(Value::Object)
            }
            '+' | '-' | '.' | '0'..='9' => self.number(),
            c if c == '_' || c.is_alphabetic() => self.name(),
            found => Err(LiteralError::UnexpectedCharacter { found, offset }),
        }
    }

    // Adjacent literals concatenate: `'a' "b"` is `'ab'`.
    fn strings(&mut self) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            self.string(&mut out)?;
            self.skip_whitespace();
            if !matches!(self.peek(), Some((_, '\'' | '"'))) {
                return Ok(out);
            }
        }
    }

    fn string(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let (start, quote) = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
        let unterminated = LiteralError::UnterminatedString { offset: start };
        loop {
            let (offset, ch) = self.bump().ok_or_else(|| unterminated.clone())?;
            match ch {
                c if c == quote => return Ok(()),
                '\n' => return Err(unterminated),
                '\\' => self.escape(offset, out)?,
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, offset: usize, out: &mut String) -> Result<(), LiteralError> {
        let (_, ch) = self
            .bump()
            .ok_or(LiteralError::InvalidEscape { offset })?;
        match ch {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(ch),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{b}'),
            '0'..='7' => {
                let mut code = ch.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match self.chars.next_if(|&(_, c)| c.is_digit(8)) {
                        Some((_, digit)) => code = code * 8 + digit.to_digit(8).unwrap_or_default(),
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or(LiteralError::InvalidEscape { offset })?);
            }
            'x' => out.push(self.hex_escape(offset, 2)?),
            'u' => out.push(self.hex_escape(offset, 4)?),
            'U' => out.push(self.hex_escape(offset, 8)?),
            // Unrecognised escapes are kept verbatim.
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, offset: usize, digits: usize) -> Result<char, LiteralError> {
        let invalid = LiteralError::InvalidEscape { offset };
        let mut code: u32 = 0;
        for _ in 0..digits {
            let (_, ch) = self
                .chars
                .next_if(|&(_, c)| c.is_ascii_hexdigit())
                .ok_or_else(|| invalid.clone())?;
            code = (code << 4) | ch.to_digit(16).unwrap_or_default();
        }
        char::from_u32(code).ok_or(invalid)
    }

    fn sequence(&mut self, close: char, depth: usize) -> Result<Vec<Value>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.value(depth + 1)?);
            self.skip_whitespace();
            match self.bump() {
                Some((_, ',')) => {}
                Some((_, ch)) if ch == close => return Ok(items),
                Some((offset, found)) => {
                    return Err(LiteralError::UnexpectedCharacter { found, offset });
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    // `()` is an empty tuple, `(x)` is `x`, `(x,)` and `(x, y)` are tuples.
    fn parenthesized(&mut self, depth: usize) -> Result<Value, LiteralError> {
        self.skip_whitespace();
        if self.eat(')') {
            return Ok(Value::Array(Vec::new()));
        }
        let first = self.value(depth + 1)?;
        self.skip_whitespace();
        match self.bump() {
            Some((_, ')')) => Ok(first),
            Some((_, ',')) => {
                let mut items = vec![first];
                items.extend(self.sequence(')', depth)?);
                Ok(Value::Array(items))
            }
            Some((offset, found)) => Err(LiteralError::UnexpectedCharacter { found, offset }),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    fn mapping(&mut self, depth: usize) -> Result<Map<String, Value>, LiteralError> {
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.eat('}') {
                return Ok(map);
            }
            let (key_offset, _) = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
            let Value::String(key) = self.value(depth + 1)? else {
                return Err(LiteralError::NonStringKey { offset: key_offset });
            };
            self.skip_whitespace();
            match self.bump() {
                Some((_, ':')) => {}
                Some((offset, found)) => {
                    return Err(LiteralError::UnexpectedCharacter { found, offset });
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
            let value = self.value(depth + 1)?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.bump() {
                Some((_, ',')) => {}
                Some((_, '}')) => return Ok(map),
                Some((offset, found)) => {
                    return Err(LiteralError::UnexpectedCharacter { found, offset });
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn name(&mut self) -> Result<Value, LiteralError> {
        let mut name = String::new();
        while let Some((_, ch)) = self
            .chars
            .next_if(|&(_, c)| c == '_' || c.is_alphanumeric())
        {
            name.push(ch);
        }
        match name.as_str() {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            _ => Err(LiteralError::UnknownName { name }),
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let mut literal = String::new();
        let negative = match self.chars.next_if(|&(_, c)| c == '+' || c == '-') {
            Some((_, sign)) => {
                literal.push(sign);
                self.skip_whitespace();
                sign == '-'
            }
            None => false,
        };
        let body_start = literal.len();
        let mut previous = ' ';
        loop {
            let after = previous;
            let Some((_, ch)) = self
                .chars
                .next_if(|&(_, c)| continues_number(c, after))
            else {
                break;
            };
            literal.push(ch);
            previous = ch;
        }
        let body = literal.get(body_start..).unwrap_or_default();
        match parse_number(body, negative) {
            Ok(value) => Ok(value),
            Err(NumberError::Malformed) => Err(LiteralError::InvalidNumber { literal }),
            Err(NumberError::OutOfRange) => Err(LiteralError::NumberOutOfRange { literal }),
        }
    }
}

enum NumberError {
    Malformed,
    OutOfRange,
}

// A sign only continues a number as part of an exponent.
fn continues_number(ch: char, previous: char) -> bool {
    ch.is_ascii_alphanumeric()
        || ch == '_'
        || ch == '.'
        || (matches!(ch, '+' | '-') && matches!(previous, 'e' | 'E'))
}

fn parse_number(body: &str, negative: bool) -> Result<Value, NumberError> {
    let lower = body.to_ascii_lowercase();
    if let Some((radix, digits)) = radix_digits(&lower) {
        let cleaned = strip_underscores(digits).ok_or(NumberError::Malformed)?;
        if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_digit(radix)) {
            return Err(NumberError::Malformed);
        }
        return integer_value(&cleaned, radix, negative);
    }
    let cleaned = strip_underscores(&lower).ok_or(NumberError::Malformed)?;
    if cleaned.contains(['.', 'e']) {
        return float_value(&cleaned, negative);
    }
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(NumberError::Malformed);
    }
    // `007` is a syntax error in Python; `000` is zero.
    if cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.chars().any(|c| c != '0') {
        return Err(NumberError::Malformed);
    }
    integer_value(&cleaned, 10, negative)
}

fn radix_digits(lower: &str) -> Option<(u32, &str)> {
    [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| lower.strip_prefix(prefix).map(|digits| (radix, digits)))
}

// Underscores may only separate digits: `1_000` but not `_1`, `1_`, `1__0`.
fn strip_underscores(text: &str) -> Option<String> {
    let mut cleaned = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    for ch in text.chars() {
        if ch == '_' {
            if !previous.is_some_and(|c| c.is_ascii_alphanumeric()) {
                return None;
            }
        } else {
            if previous == Some('_') && !ch.is_ascii_alphanumeric() {
                return None;
            }
            cleaned.push(ch);
        }
        previous = Some(ch);
    }
    if previous == Some('_') {
        return None;
    }
    Some(cleaned)
}

fn integer_value(digits: &str, radix: u32, negative: bool) -> Result<Value, NumberError> {
    let magnitude = u128::from_str_radix(digits, radix).map_err(|_| NumberError::OutOfRange)?;
    if negative {
        0_i128
            .checked_sub_unsigned(magnitude)
            .and_then(|signed| i64::try_from(signed).ok())
            .map(Value::from)
            .ok_or(NumberError::OutOfRange)
    } else if let Ok(small) = i64::try_from(magnitude) {
        Ok(Value::from(small))
    } else {
        u64::try_from(magnitude)
            .map(Value::from)
            .map_err(|_| NumberError::OutOfRange)
    }
}

fn float_value(text: &str, negative: bool) -> Result<Value, NumberError> {
    let valid = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | '+' | '-'))
        && text.chars().any(|c| c.is_ascii_digit());
    if !valid {
        return Err(NumberError::Malformed);
    }
    let signed = if negative {
        format!("-{text}")
    } else {
        text.to_owned()
    };
    let parsed: f64 = signed.parse().map_err(|_| NumberError::Malformed)?;
    Number::from_f64(parsed)
        .map(Value::Number)
        .ok_or(NumberError::OutOfRange)
}
