//! Tokenizer driving the character stream through the lexical state machine
//!
//! Characters accepted between two emissions are kept in a working buffer and
//! turned into one token. The buffer holds exactly the characters whose
//! values make up the token text, so every input character is either part of
//! one token or dropped by an ignore action.

use super::classifier::visible_width;
use super::context::{Action, LexicalContext};
use super::escape::unescape;
use super::stream::{Character, CharacterStream, StreamError};
use crate::config::runtime::LexicalPreferences;
use crate::grammar::keywords::classify_word;
use crate::logging::codes;
use crate::tokens::{classify_symbol, Token, TokenKind};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success, log_warning};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Cannot build a {kind} token from an empty buffer (at {position})")]
    EmptyTokenBuffer { kind: TokenKind, position: Position },

    #[error("Too many tokens: {count} exceeds the limit of {limit} (at {position})")]
    TooManyTokens {
        count: usize,
        limit: usize,
        position: Position,
    },

    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::EmptyTokenBuffer { .. } => codes::lexical::EMPTY_TOKEN_BUFFER,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexerError::Stream(e) => e.error_code(),
        }
    }

    pub fn position(&self) -> Position {
        match self {
            LexerError::EmptyTokenBuffer { position, .. }
            | LexerError::TooManyTokens { position, .. } => *position,
            LexerError::Stream(e) => e.position(),
        }
    }
}

/// Counters collected over one tokenize call
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub characters: usize,
    pub trivia_tokens: usize,
    pub max_token_length: usize,
    pub max_string_length: usize,
    pub unterminated_constructs: usize,
    pub tokens_by_kind: BTreeMap<TokenKind, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        self.max_token_length = self.max_token_length.max(token.value.chars().count());

        if token.is_trivia() {
            self.trivia_tokens += 1;
            if !preferences.include_trivia_in_counts {
                return;
            }
        }

        if preferences.collect_detailed_metrics {
            *self.tokens_by_kind.entry(token.kind).or_insert(0) += 1;
        }
    }

    pub(crate) fn record_string_length(&mut self, length: usize) {
        self.max_string_length = self.max_string_length.max(length);
    }

    /// Tokens the parser will see, including the end sentinel
    pub fn significant_tokens(&self) -> usize {
        self.total_tokens - self.trivia_tokens
    }

    pub fn count_of(&self, kind: TokenKind) -> usize {
        self.tokens_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

pub struct Tokenizer {
    context: LexicalContext,
    preferences: LexicalPreferences,
    metrics: LexicalMetrics,
    buffer: Vec<Character>,
    tokens: Vec<Token>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::with_preferences(crate::config::runtime_config().lexical.clone())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        let trace = crate::config::runtime_config().syntax.trace_contexts;
        Self {
            context: LexicalContext::new().with_trace(trace),
            preferences,
            metrics: LexicalMetrics::default(),
            buffer: Vec::new(),
            tokens: Vec::new(),
        }
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    /// Metrics of the most recent tokenize call
    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn tokenize(&mut self, source: &str) -> Result<Vec<Token>, LexerError> {
        let mut stream = CharacterStream::new(source);
        self.tokenize_stream(&mut stream)
    }

    /// Tokenize the rest of `stream`. The result always ends with exactly one
    /// END token.
    pub fn tokenize_stream(
        &mut self,
        stream: &mut CharacterStream,
    ) -> Result<Vec<Token>, LexerError> {
        self.context.reset();
        self.metrics = LexicalMetrics::default();
        self.buffer.clear();
        self.tokens.clear();

        log_debug!("Starting tokenization",
            "chars" => stream.len() - stream.index(),
            "max_tokens" => self.preferences.max_token_count
        );

        let end = loop {
            let character = stream.next_char();
            if !character.is_end() {
                self.metrics.characters += 1;
            }

            self.feed(&character)?;

            if character.is_end() {
                break character.position;
            }
        };

        // Every state emits on end of input; this only catches a run left
        // behind by a state that did not
        if !self.buffer.is_empty() {
            let kind = self.context.pending_kind().unwrap_or(TokenKind::Symbol);
            self.flush(kind)?;
        }

        self.push(Token::end(end))?;

        log_success!(
            codes::success::TOKENIZATION_COMPLETE,
            "Tokenization completed",
            "tokens" => self.metrics.total_tokens,
            "characters" => self.metrics.characters,
            "unterminated" => self.metrics.unterminated_constructs
        );

        Ok(std::mem::take(&mut self.tokens))
    }

    fn feed(&mut self, character: &Character) -> Result<(), LexerError> {
        loop {
            let action = self.context.process(character);

            if action.unterminated {
                self.report_unterminated(&action, character);
            }

            if action.reprocess {
                if action.emit {
                    self.flush_action(&action)?;
                }
                continue;
            }

            if action.ignore {
                if action.emit {
                    // A multi-line comment's closing slash is consumed by the
                    // state machine without buffering; put it back.
                    if action.kind == Some(TokenKind::Comment) {
                        self.buffer.push(character.clone());
                    }
                    self.flush_action(&action)?;
                }
                return Ok(());
            }

            self.buffer.push(character.clone());
            if action.emit {
                self.flush_action(&action)?;
            }
            return Ok(());
        }
    }

    fn flush_action(&mut self, action: &Action) -> Result<(), LexerError> {
        match action.kind {
            Some(kind) => self.flush(kind),
            None => Ok(()),
        }
    }

    /// Emit the buffered run; an empty buffer emits nothing
    fn flush(&mut self, kind: TokenKind) -> Result<(), LexerError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let token = build_token(kind, &self.buffer)?;
        self.buffer.clear();

        if token.kind == TokenKind::String {
            self.metrics.record_string_length(token.value.chars().count());
        }

        self.push(token)
    }

    fn push(&mut self, token: Token) -> Result<(), LexerError> {
        let limit = self.preferences.max_token_count;
        if self.tokens.len() >= limit {
            let error = LexerError::TooManyTokens {
                count: self.tokens.len() + 1,
                limit,
                position: token.span.start,
            };
            log_error!(error.error_code(), &error.to_string(),
                span = token.span,
                "limit" => limit
            );
            return Err(error);
        }

        self.metrics.record_token(&token, &self.preferences);
        self.tokens.push(token);
        Ok(())
    }

    fn report_unterminated(&mut self, action: &Action, character: &Character) {
        self.metrics.unterminated_constructs += 1;

        let what = match action.kind {
            Some(TokenKind::Comment) => "comment",
            _ => "string",
        };
        let start = self
            .buffer
            .first()
            .map(|c| c.position)
            .unwrap_or(character.position);

        log_warning!(
            code = codes::lexical::UNTERMINATED_CONSTRUCT,
            &format!("Unterminated {} closed at {}", what, character.position),
            span = Span::new(start, character.position),
            "construct" => what
        );
    }
}

/// Position just past `character`
fn end_of(character: &Character) -> Position {
    match character.value {
        Some(c @ ('\n' | '\r')) => character.position.newline(c),
        Some(c) => character.position.advance(c, visible_width(c)),
        None => character.position,
    }
}

/// Turn a buffered run into a token, converting its text by kind
pub fn build_token(kind: TokenKind, buffer: &[Character]) -> Result<Token, LexerError> {
    let (Some(first), Some(last)) = (buffer.first(), buffer.last()) else {
        return Err(LexerError::EmptyTokenBuffer {
            kind,
            position: Position::start(),
        });
    };

    let text: String = buffer.iter().filter_map(|c| c.value).collect();
    let span = Span::new(first.position, end_of(last));

    let (kind, value) = match kind {
        TokenKind::String => (kind, unescape(&text)?),
        TokenKind::Identifier => (classify_word(&text), text),
        TokenKind::Symbol => (classify_symbol(&text).unwrap_or(TokenKind::Symbol), text),
        _ => (kind, text),
    };

    Ok(Token::new(kind, value, span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn tokenize(source: &str) -> Vec<Token> {
        Tokenizer::with_preferences(LexicalPreferences::default())
            .tokenize(source)
            .unwrap()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).iter().map(|t| t.kind).collect()
    }

    fn values(source: &str) -> Vec<String> {
        tokenize(source).into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn test_rgb_call() {
        use TokenKind::*;
        assert_eq!(
            kinds("rgb(255, 0, 0)"),
            vec![
                Function, LParen, Number, Comma, Whitespace, Number, Comma, Whitespace, Number,
                RParen, End
            ]
        );
        assert_eq!(
            values("rgb(255, 0, 0)"),
            vec!["rgb", "(", "255", ",", " ", "0", ",", " ", "0", ")", ""]
        );
    }

    #[test]
    fn test_single_literal_tokens() {
        assert_eq!(kinds("#ff00ff"), vec![TokenKind::HexValue, TokenKind::End]);
        assert_eq!(values("#ff00ff")[0], "#ff00ff");
        assert_eq!(kinds("50%"), vec![TokenKind::Percent, TokenKind::End]);
        assert_eq!(kinds("90deg"), vec![TokenKind::Dimension, TokenKind::End]);
        assert_eq!(values("90deg")[0], "90deg");
        assert_eq!(kinds("1.5"), vec![TokenKind::Number, TokenKind::End]);
    }

    #[test]
    fn test_empty_input_yields_only_end() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_end());
        assert_eq!(tokens[0].span.start, Position::start());
    }

    #[test]
    fn test_exactly_one_end_token() {
        for source in ["a", "\"x", "/* open", "1 +", "//", "#", "50%\n"] {
            let tokens = tokenize(source);
            assert_eq!(tokens.iter().filter(|t| t.is_end()).count(), 1, "{source}");
            assert!(tokens.last().unwrap().is_end());
        }
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize(r#"'a\tb' "q\"x""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, "a\tb");
        assert_eq!(tokens[2].value, "q\"x");

        // unterminated strings are emitted at end of input
        let tokens = tokenize("\"hello");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, "hello");
        assert!(tokens[1].is_end());
    }

    #[test]
    fn test_string_unicode_escapes() {
        let tokens = tokenize("\"\\u0041\"");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, "A");

        assert_eq!(values(r"'\u{263A} \u00e9'")[0], "☺ é");
    }

    #[test]
    fn test_unterminated_string_stops_at_newline() {
        let tokens = tokenize("\"ab\ncd");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::String,
                TokenKind::NewLine,
                TokenKind::Identifier,
                TokenKind::End
            ]
        );
        assert_eq!(tokens[2].span.start, Position::new(4, 2, 1));
    }

    #[test]
    fn test_unterminated_is_counted() {
        let mut tokenizer = Tokenizer::with_preferences(LexicalPreferences::default());
        tokenizer.tokenize("'open").unwrap();
        assert_eq!(tokenizer.metrics().unterminated_constructs, 1);
    }

    #[test]
    fn test_comments_keep_their_text() {
        let tokens = tokenize("/* a * b */1 // tail\n2");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].value, "/* a * b */");
        assert_eq!(tokens[0].span.end.offset, 11);
        assert_eq!(tokens[1].value, "1");
        assert_eq!(tokens[3].kind, TokenKind::Comment);
        assert_eq!(tokens[3].value, "// tail");
        assert_eq!(tokens[4].kind, TokenKind::NewLine);
        assert_eq!(tokens[5].value, "2");
    }

    #[test]
    fn test_slash_is_division() {
        use TokenKind::*;
        assert_eq!(kinds("6/2"), vec![Number, Slash, Number, End]);
        assert_eq!(kinds("6/"), vec![Number, Slash, End]);
    }

    #[test]
    fn test_keywords_and_symbols() {
        use TokenKind::*;
        assert_eq!(
            kinds("let c = red;"),
            vec![Keyword, Whitespace, Identifier, Whitespace, Equals, Whitespace, Keyword, Symbol, End]
        );
        assert_eq!(kinds("a*-b"), vec![Identifier, Star, Minus, Identifier, End]);
    }

    #[test]
    fn test_emoji_and_unicode_symbols() {
        let tokens = tokenize("😀€");
        assert_eq!(tokens[0].kind, TokenKind::Symbol);
        assert_eq!(tokens[0].value, "😀");
        assert_eq!(tokens[1].span.start, Position::new(4, 1, 3));
    }

    #[test]
    fn test_every_character_accounted_for() {
        let source = "let x = rgb(1, 2%, 3deg) /* c */ + 'q' // end\n#abc";
        let tokens = tokenize(source);
        let joined: String = tokens.iter().map(|t| t.value.as_str()).collect();
        // only the two string quotes are dropped
        assert_eq!(joined.len(), source.len() - 2);
    }

    #[test]
    fn test_token_spans() {
        let tokens = tokenize("ab  cd");
        assert_eq!(tokens[0].span.start, Position::new(0, 1, 1));
        assert_eq!(tokens[0].span.end, Position::new(2, 1, 3));
        assert_eq!(tokens[3].span.start, Position::new(4, 1, 5));
        assert_eq!(tokens[3].span.slice("ab  cd"), Some("cd"));
    }

    #[test]
    fn test_too_many_tokens() {
        let preferences = LexicalPreferences {
            max_token_count: 3,
            ..Default::default()
        };
        let mut tokenizer = Tokenizer::with_preferences(preferences);
        assert_matches!(
            tokenizer.tokenize("a b c"),
            Err(LexerError::TooManyTokens { limit: 3, .. })
        );
        assert!(tokenizer.tokenize("ab").is_ok());
    }

    #[test]
    fn test_build_token_rejects_empty_buffer() {
        let error = build_token(TokenKind::Number, &[]).unwrap_err();
        assert_matches!(error, LexerError::EmptyTokenBuffer { kind: TokenKind::Number, .. });
        assert_eq!(error.error_code(), codes::lexical::EMPTY_TOKEN_BUFFER);
    }

    #[test]
    fn test_metrics() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: true,
            include_trivia_in_counts: false,
            ..Default::default()
        };
        let mut tokenizer = Tokenizer::with_preferences(preferences);
        tokenizer.tokenize("rgb(1, 2) 'abc'").unwrap();

        let metrics = tokenizer.metrics();
        assert_eq!(metrics.characters, 15);
        assert_eq!(metrics.count_of(TokenKind::Number), 2);
        assert_eq!(metrics.count_of(TokenKind::Whitespace), 0);
        assert_eq!(metrics.trivia_tokens, 2);
        assert_eq!(metrics.max_string_length, 3);
        assert_eq!(metrics.significant_tokens(), 8);
    }

    #[test]
    fn test_reuse_resets_state() {
        let mut tokenizer = Tokenizer::with_preferences(LexicalPreferences::default());
        tokenizer.tokenize("\"unterminated").unwrap();
        let tokens = tokenizer.tokenize("a").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens.len(), 2);
    }
}
