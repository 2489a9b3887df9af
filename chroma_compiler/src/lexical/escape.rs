//! String escape decoding
//!
//! Recognised: `\n \r \t \" \' \\`, `\uXXXX`, `\u{X..}` and `\xXX`. Anything
//! else, including a malformed numeric escape, is kept verbatim.

use super::stream::{text_of, CharacterStream, StreamError};
use crate::config::constants::compile_time::lexical::MAX_UNICODE_ESCAPE_DIGITS;

pub fn unescape(raw: &str) -> Result<String, StreamError> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let mut stream = CharacterStream::new(raw);
    let mut out = String::with_capacity(raw.len());

    while let Some(ch) = stream.next_char().value {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let Some(escaped) = stream.next_char().value else {
            out.push('\\');
            break;
        };

        let decoded = match escaped {
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            '"' => Some('"'),
            '\'' => Some('\''),
            '\\' => Some('\\'),
            'u' => match braced_code_point(&mut stream)? {
                Some(c) => Some(c),
                None => fixed_code_point(&mut stream, 4)?,
            },
            'x' => fixed_code_point(&mut stream, 2)?,
            _ => None,
        };

        match decoded {
            Some(c) => out.push(c),
            None => {
                out.push('\\');
                out.push(escaped);
            }
        }
    }

    Ok(out)
}

/// `{41}` style code point; consumes nothing unless well formed
fn braced_code_point(stream: &mut CharacterStream) -> Result<Option<char>, StreamError> {
    stream.speculate(|s| {
        if s.next_char().value != Some('{') {
            return None;
        }

        let digits = s.consume_while(|c| c.value.is_some_and(|v| v.is_ascii_hexdigit()));
        if digits.is_empty() || digits.len() > MAX_UNICODE_ESCAPE_DIGITS {
            return None;
        }

        if s.next_char().value != Some('}') {
            return None;
        }

        u32::from_str_radix(&text_of(&digits), 16)
            .ok()
            .and_then(char::from_u32)
    })
}

/// Exactly `width` hex digits
fn fixed_code_point(
    stream: &mut CharacterStream,
    width: usize,
) -> Result<Option<char>, StreamError> {
    stream.speculate(|s| {
        let mut digits = String::with_capacity(width);
        for _ in 0..width {
            let c = s.next_char().value.filter(char::is_ascii_hexdigit)?;
            digits.push(c);
        }

        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
    })
}
