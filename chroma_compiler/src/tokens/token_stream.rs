//! Span-accurate token stream for the parser
//!
//! Whitespace, newline and comment tokens are kept in `all_tokens` for dumps
//! and diagnostics but skipped for navigation. Positions saved with
//! `save_position` index the significant tokens only.

use crate::config::constants::compile_time::syntax::MAX_LOOKAHEAD_TOKENS;
use crate::tokens::token::{Token, TokenKind};
use crate::utils::{SourceMap, Span};

#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens, trivia included
    all_tokens: Vec<Token>,
    /// Indices into `all_tokens` of the significant tokens
    significant_indices: Vec<usize>,
    /// Cursor into `significant_indices`
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.is_trivia())
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        crate::log_debug!("Token stream built",
            "total_tokens" => tokens.len(),
            "significant_tokens" => significant_indices.len()
        );

        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
            source_map: None,
        }
    }

    /// Stream that can render errors against the source text
    pub fn with_source_map(tokens: Vec<Token>, source_map: SourceMap) -> Self {
        let mut stream = Self::new(tokens);
        stream.source_map = Some(source_map);
        stream
    }

    // === NAVIGATION ===

    pub fn current(&self) -> Option<&Token> {
        self.peek_ahead(0)
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|token| token.kind)
    }

    pub fn current_span(&self) -> Option<Span> {
        self.current().map(|token| token.span)
    }

    /// Next significant token after the current one
    pub fn peek(&self) -> Option<&Token> {
        self.peek_ahead(1)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.significant_indices
            .get(self.position + n)
            .and_then(|&index| self.all_tokens.get(index))
    }

    /// Consume and return the current token. The END sentinel is never
    /// stepped over.
    pub fn advance(&mut self) -> Option<Token> {
        let token = self.current()?.clone();
        if !token.is_end() {
            self.position += 1;
        }
        Some(token)
    }

    /// True at the END sentinel or past the last token
    pub fn is_at_end(&self) -> bool {
        self.current().map_or(true, Token::is_end)
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    /// Consume the current token when it has `kind`
    pub fn consume_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            self.advance()
        } else {
            None
        }
    }

    // === CHECKPOINTS ===

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.significant_indices.len());
    }

    /// Up to `count` upcoming tokens, capped at the lookahead limit
    pub fn lookahead_tokens(&self, count: usize) -> Vec<&Token> {
        (0..count.min(MAX_LOOKAHEAD_TOKENS))
            .map_while(|offset| self.peek_ahead(offset))
            .collect()
    }

    // === ACCESS ===

    pub fn iter_significant(&self) -> impl Iterator<Item = &Token> {
        self.significant_indices
            .iter()
            .filter_map(|&i| self.all_tokens.get(i))
    }

    pub fn all_tokens(&self) -> &[Token] {
        &self.all_tokens
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    pub fn remaining_count(&self) -> usize {
        self.significant_indices.len().saturating_sub(self.position)
    }

    pub fn has_end(&self) -> bool {
        self.iter_significant().last().is_some_and(Token::is_end)
    }

    // === DIAGNOSTICS ===

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    /// Render `message` against the source when a source map is attached
    pub fn format_error(&self, span: Span, message: &str) -> String {
        match &self.source_map {
            Some(map) => map.format_error(&span, message),
            None => format!("{} at {}", message, span.start),
        }
    }

    /// Significant tokens within `radius` of the cursor
    pub fn context_snippet(&self, radius: usize) -> Vec<&Token> {
        let start = self.position.saturating_sub(radius);
        let end = (self.position + radius + 1).min(self.significant_indices.len());

        (start..end)
            .filter_map(|pos| {
                self.significant_indices
                    .get(pos)
                    .and_then(|&i| self.all_tokens.get(i))
            })
            .collect()
    }

    pub fn diagnostic(&self) -> String {
        let current = match self.current() {
            Some(token) => format!("{} at {}", token.describe(), token.span.start),
            None => "<none>".to_string(),
        };

        format!(
            "TokenStream(pos: {}/{}, current: {})",
            self.position,
            self.significant_indices.len(),
            current
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LexicalPreferences;
    use crate::lexical::{CharacterStream, Tokenizer};

    fn stream(source: &str) -> TokenStream {
        let tokens = Tokenizer::with_preferences(LexicalPreferences::default())
            .tokenize(source)
            .unwrap();
        TokenStream::with_source_map(tokens, CharacterStream::new(source).source_map())
    }

    #[test]
    fn test_trivia_is_skipped() {
        let stream = stream("a /* c */ +\n b");
        let kinds: Vec<_> = stream.iter_significant().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Plus,
                TokenKind::Identifier,
                TokenKind::End
            ]
        );
        assert_eq!(stream.all_tokens().len(), 9);
        assert!(stream.has_end());
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut stream = stream("x");
        assert_eq!(stream.advance().unwrap().value, "x");
        assert!(stream.is_at_end());
        assert!(stream.advance().unwrap().is_end());
        assert!(stream.advance().unwrap().is_end());
        assert_eq!(stream.remaining_count(), 1);
    }

    #[test]
    fn test_consume_if_and_checkpoints() {
        let mut stream = stream("( 1 )");
        let saved = stream.save_position();

        assert!(stream.consume_if(TokenKind::RParen).is_none());
        assert!(stream.consume_if(TokenKind::LParen).is_some());
        assert!(stream.check(TokenKind::Number));
        assert_eq!(stream.peek().map(|t| t.kind), Some(TokenKind::RParen));

        stream.restore_position(saved);
        assert!(stream.check(TokenKind::LParen));
        stream.restore_position(99);
        assert!(stream.current().is_none());
        assert!(stream.is_at_end());
    }

    #[test]
    fn test_lookahead_is_capped() {
        let source = "1 ".repeat(MAX_LOOKAHEAD_TOKENS * 2);
        let stream = stream(&source);
        assert_eq!(stream.lookahead_tokens(100).len(), MAX_LOOKAHEAD_TOKENS);
        assert_eq!(stream.lookahead_tokens(2).len(), 2);
    }

    #[test]
    fn test_format_error_uses_source() {
        let stream = stream("1 + ;");
        let span = stream.iter_significant().nth(2).unwrap().span;
        let rendered = stream.format_error(span, "unexpected");
        assert!(rendered.contains("1 + ;"));
        assert!(rendered.contains("1:5"));

        let bare = TokenStream::new(Vec::new());
        assert!(bare.is_empty());
        assert_eq!(bare.format_error(span, "oops"), "oops at 1:5");
    }

    #[test]
    fn test_context_snippet_and_diagnostic() {
        let mut stream = stream("a + b * c");
        stream.advance();
        stream.advance();
        let snippet: Vec<_> = stream
            .context_snippet(1)
            .iter()
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(snippet, vec!["+", "b", "*"]);
        assert!(stream.diagnostic().starts_with("TokenStream(pos: 2/6"));
    }
}
