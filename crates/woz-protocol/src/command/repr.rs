//! Python-compatible string forms for list payloads.
//!
//! The suggestion frontend parses `SupplySuggestions` payloads as Python
//! `str(list)` output, so the encoding here must match it byte for byte: single quotes unless the text contains a
//! single quote and no double quote, backslash escapes for the active quote,
//! and `\t`, `\n`, `\r`, `\xNN`, `\uNNNN`, `\UNNNNNNNN` for non-printable
//! characters.

use std::fmt::Write;

/// Renders a list of strings the way Python's `str(list)` does.
pub(crate) fn python_list_repr(items: &[String]) -> String {
    let mut out = String::from("[");
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        push_python_str_repr(&mut out, item);
    }
    out.push(']');
    out
}

fn push_python_str_repr(out: &mut String, text: &str) {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_printable(c) => out.push(c),
            c => push_escaped(out, c),
        }
    }
    out.push(quote);
}

// Approximates `str.isprintable`: control characters and separators other
// than the ASCII space are escaped.
fn is_printable(ch: char) -> bool {
    if ch == ' ' {
        return true;
    }
    let format_char = matches!(
        ch,
        '\u{ad}' | '\u{200b}'..='\u{200f}' | '\u{202a}'..='\u{202e}' | '\u{2060}'..='\u{2064}' | '\u{feff}'
    );
    !(ch.is_control() || ch.is_whitespace() || format_char)
}

fn push_escaped(out: &mut String, ch: char) {
    let code = u32::from(ch);
    // Writing to a String cannot fail.
    let _written = if code <= 0xff {
        write!(out, "\\x{code:02x}")
    } else if code <= 0xffff {
        write!(out, "\\u{code:04x}")
    } else {
        write!(out, "\\U{code:08x}")
    };
}
