//! Human-readable dumps of tokens and characters
//!
//! Output is plain text for terminals and debug logs. Nothing here affects
//! tokenization or parsing.

use crate::config::constants::compile_time::diagnostics::{HEADER_BOX_WIDTH, MAX_DUMP_VALUE_LENGTH};
use crate::lexical::{visible_width, Character, CharacterStream};
use crate::tokens::Token;

/// Draw `title` inside a single-line box
pub fn render_header(title: &str) -> String {
    let title = elide(title, HEADER_BOX_WIDTH.saturating_sub(2));
    let used = 1 + display_width(&title);
    let padding = HEADER_BOX_WIDTH.saturating_sub(used);
    let rule = "─".repeat(HEADER_BOX_WIDTH);

    format!(
        "┌{rule}┐\n│ {title}{}│\n└{rule}┘",
        " ".repeat(padding)
    )
}

/// `line:col  KIND  "value"`
pub fn token_line(token: &Token) -> String {
    let position = format!("{}:{}", token.span.start.line, token.span.start.column);
    format!(
        "{:<9} {:<11} {:?}",
        position,
        token.kind.as_str(),
        elide(&token.value, MAX_DUMP_VALUE_LENGTH)
    )
}

/// `line:col  KIND  'c'  width`
pub fn character_line(character: &Character) -> String {
    let position = format!("{}:{}", character.position.line, character.position.column);
    let (shown, width) = match character.value {
        Some(c) => (format!("{:?}", c), visible_width(c)),
        None => ("EOS".to_string(), 0),
    };
    format!("{:<9} {:<13} {:<10} w={}", position, character.kind.as_str(), shown, width)
}

pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut out = render_header(&format!("Tokens ({})", tokens.len()));
    for token in tokens {
        out.push('\n');
        out.push_str(&token_line(token));
    }
    out
}

/// Every character of `source` after normalization, END included
pub fn dump_characters(source: &str) -> String {
    let mut stream = CharacterStream::new(source);
    let mut lines = Vec::new();
    loop {
        let character = stream.next_char();
        lines.push(character_line(&character));
        if character.is_end() {
            break;
        }
    }

    let mut out = render_header(&format!("Characters ({})", lines.len() - 1));
    for line in lines {
        out.push('\n');
        out.push_str(&line);
    }
    out
}

fn display_width(text: &str) -> usize {
    text.chars().map(|c| visible_width(c) as usize).sum()
}

fn elide(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut short: String = text.chars().take(limit.saturating_sub(1)).collect();
    short.push('…');
    short
}
