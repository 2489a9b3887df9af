//! Lexical state machine
//!
//! One classified character goes in, one [`Action`] comes out. The machine
//! never looks ahead; everything it needs to know about the run so far is
//! encoded in the current state (plus the open quote for strings).

use super::classifier::CharKind;
use super::stream::Character;
use crate::tokens::TokenKind;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LexicalState {
    Initial,
    InIdentifier,
    InString,
    InHex,
    InNumber,
    InPercent,
    InDimension,
    SeenSlash,
    InSingleLineComment,
    InMultiLineComment,
    InMultiLineCommentSawStar,
    InEscape,
    InSymbol,
    End,
}

impl LexicalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::InIdentifier => "InIdentifier",
            Self::InString => "InString",
            Self::InHex => "InHex",
            Self::InNumber => "InNumber",
            Self::InPercent => "InPercent",
            Self::InDimension => "InDimension",
            Self::SeenSlash => "SeenSlash",
            Self::InSingleLineComment => "InSingleLineComment",
            Self::InMultiLineComment => "InMultiLineComment",
            Self::InMultiLineCommentSawStar => "InMultiLineCommentSawStar",
            Self::InEscape => "InEscape",
            Self::InSymbol => "InSymbol",
            Self::End => "End",
        }
    }

    /// Kind a partially accumulated run would be emitted as
    pub fn pending_kind(&self) -> Option<TokenKind> {
        match self {
            Self::Initial | Self::End => None,
            Self::InIdentifier => Some(TokenKind::Identifier),
            Self::InString | Self::InEscape => Some(TokenKind::String),
            Self::InHex => Some(TokenKind::HexValue),
            Self::InNumber => Some(TokenKind::Number),
            Self::InPercent => Some(TokenKind::Percent),
            Self::InDimension => Some(TokenKind::Dimension),
            Self::SeenSlash => Some(TokenKind::Slash),
            Self::InSingleLineComment
            | Self::InMultiLineComment
            | Self::InMultiLineCommentSawStar => Some(TokenKind::Comment),
            Self::InSymbol => Some(TokenKind::Symbol),
        }
    }
}

impl fmt::Display for LexicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the tokenizer should do with the character it just fed in.
///
/// * `reprocess`: do not consume the character; feed it again after handling `emit`
/// * `ignore`: consume the character without buffering it
/// * neither: buffer the character
///
/// When `emit` is set the buffered run is turned into a token of `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Action {
    pub emit: bool,
    pub reprocess: bool,
    pub ignore: bool,
    pub kind: Option<TokenKind>,
    /// Set when a string or comment was cut short by a newline or end of input
    pub unterminated: bool,
}

impl Action {
    /// Buffer the character and keep accumulating
    pub const fn buffer() -> Self {
        Self {
            emit: false,
            reprocess: false,
            ignore: false,
            kind: None,
            unterminated: false,
        }
    }

    /// Drop the character
    pub const fn skip() -> Self {
        Self {
            emit: false,
            reprocess: false,
            ignore: true,
            kind: None,
            unterminated: false,
        }
    }

    /// Buffer the character, then emit the run including it
    pub const fn accept(kind: TokenKind) -> Self {
        Self {
            emit: true,
            reprocess: false,
            ignore: false,
            kind: Some(kind),
            unterminated: false,
        }
    }

    /// Emit the run and feed the character again
    pub const fn finish(kind: TokenKind) -> Self {
        Self {
            emit: true,
            reprocess: true,
            ignore: false,
            kind: Some(kind),
            unterminated: false,
        }
    }

    /// Emit the run and drop the character (a closing delimiter)
    pub const fn close(kind: TokenKind) -> Self {
        Self {
            emit: true,
            reprocess: false,
            ignore: true,
            kind: Some(kind),
            unterminated: false,
        }
    }

    /// Feed the character again without emitting
    pub const fn retry() -> Self {
        Self {
            emit: false,
            reprocess: true,
            ignore: false,
            kind: None,
            unterminated: false,
        }
    }

    const fn cut_short(mut self) -> Self {
        self.unterminated = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct LexicalContext {
    state: LexicalState,
    quote: Option<char>,
    trace: bool,
}

impl Default for LexicalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalContext {
    pub fn new() -> Self {
        Self {
            state: LexicalState::Initial,
            quote: None,
            trace: false,
        }
    }

    /// Log every transition at debug level
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn state(&self) -> LexicalState {
        self.state
    }

    /// Delimiter of the string currently being read
    pub fn quote(&self) -> Option<char> {
        self.quote
    }

    pub fn reset(&mut self) {
        self.state = LexicalState::Initial;
        self.quote = None;
    }

    pub fn pending_kind(&self) -> Option<TokenKind> {
        self.state.pending_kind()
    }

    /// Advance the machine by one character
    pub fn process(&mut self, character: &Character) -> Action {
        let before = self.state;
        let (next, action) = self.transition(character);
        self.state = next;

        if self.trace {
            crate::log_debug!("Lexical transition",
                "from" => before,
                "to" => next,
                "char" => format!("{:?}", character.text()),
                "kind" => character.kind,
                "emit" => action.emit,
                "reprocess" => action.reprocess
            );
        }

        action
    }

    fn transition(&mut self, character: &Character) -> (LexicalState, Action) {
        use LexicalState::*;

        let kind = character.kind;
        let value = character.value;
        let state = self.state;

        match state {
            Initial => self.from_initial(character),

            InIdentifier => match kind {
                CharKind::Letter | CharKind::Number => (InIdentifier, Action::buffer()),
                _ => (Initial, Action::finish(TokenKind::Identifier)),
            },

            InNumber => match kind {
                CharKind::Number | CharKind::Dot => (InNumber, Action::buffer()),
                CharKind::Percent => (InPercent, Action::buffer()),
                CharKind::Letter => (InDimension, Action::buffer()),
                _ => (Initial, Action::finish(TokenKind::Number)),
            },

            InPercent => (Initial, Action::finish(TokenKind::Percent)),

            // Unit words are several letters long
            InDimension => match kind {
                CharKind::Letter => (InDimension, Action::buffer()),
                _ => (Initial, Action::finish(TokenKind::Dimension)),
            },

            InHex => match value {
                Some(c) if c.is_ascii_hexdigit() => (InHex, Action::buffer()),
                _ => (Initial, Action::finish(TokenKind::HexValue)),
            },

            InString => match kind {
                CharKind::Backslash => (InEscape, Action::buffer()),
                CharKind::NewLine | CharKind::EndOfStream => {
                    self.quote = None;
                    (Initial, Action::finish(TokenKind::String).cut_short())
                }
                _ if value.is_some() && value == self.quote => {
                    self.quote = None;
                    (Initial, Action::close(TokenKind::String))
                }
                _ => (InString, Action::buffer()),
            },

            InEscape => match kind {
                CharKind::EndOfStream => {
                    self.quote = None;
                    (Initial, Action::finish(TokenKind::String).cut_short())
                }
                _ => (InString, Action::buffer()),
            },

            SeenSlash => match kind {
                CharKind::Slash => (InSingleLineComment, Action::buffer()),
                CharKind::Asterisk => (InMultiLineComment, Action::buffer()),
                _ => (Initial, Action::finish(TokenKind::Slash)),
            },

            InSingleLineComment => match kind {
                CharKind::NewLine | CharKind::EndOfStream => {
                    (Initial, Action::finish(TokenKind::Comment))
                }
                _ => (InSingleLineComment, Action::buffer()),
            },

            InMultiLineComment => match kind {
                CharKind::Asterisk => (InMultiLineCommentSawStar, Action::buffer()),
                CharKind::EndOfStream => (Initial, Action::finish(TokenKind::Comment).cut_short()),
                _ => (InMultiLineComment, Action::buffer()),
            },

            InMultiLineCommentSawStar => match kind {
                CharKind::Slash => (Initial, Action::close(TokenKind::Comment)),
                CharKind::Asterisk => (InMultiLineCommentSawStar, Action::buffer()),
                CharKind::EndOfStream => (Initial, Action::finish(TokenKind::Comment).cut_short()),
                _ => (InMultiLineComment, Action::buffer()),
            },

            InSymbol => (Initial, Action::finish(TokenKind::Symbol)),

            // Input after the end marker restarts the machine
            End => match kind {
                CharKind::EndOfStream => (End, Action::skip()),
                _ => (Initial, Action::retry()),
            },
        }
    }

    fn from_initial(&mut self, character: &Character) -> (LexicalState, Action) {
        use LexicalState::*;

        match character.kind {
            CharKind::EndOfStream => (End, Action::skip()),
            CharKind::Whitespace => (Initial, Action::accept(TokenKind::Whitespace)),
            CharKind::NewLine => (Initial, Action::accept(TokenKind::NewLine)),
            CharKind::Letter => (InIdentifier, Action::buffer()),
            CharKind::Number => (InNumber, Action::buffer()),
            CharKind::Hash => (InHex, Action::buffer()),
            CharKind::SingleQuote | CharKind::DoubleQuote => {
                self.quote = character.value;
                (InString, Action::skip())
            }
            CharKind::Slash => (SeenSlash, Action::buffer()),
            _ => (InSymbol, Action::buffer()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn ch(c: char) -> Character {
        Character::new(c, Position::start())
    }

    fn eos() -> Character {
        Character::end_of_stream(Position::start())
    }

    fn feed(context: &mut LexicalContext, input: &str) -> Vec<Action> {
        input.chars().map(|c| context.process(&ch(c))).collect()
    }

    #[test]
    fn test_identifier_finishes_on_other() {
        let mut context = LexicalContext::new();
        feed(&mut context, "rgb");
        assert_eq!(context.state(), LexicalState::InIdentifier);

        let action = context.process(&ch('('));
        assert_eq!(action, Action::finish(TokenKind::Identifier));
        assert_eq!(context.state(), LexicalState::Initial);
    }

    #[test]
    fn test_number_percent_and_dimension() {
        let mut context = LexicalContext::new();
        feed(&mut context, "12.5");
        assert_eq!(context.state(), LexicalState::InNumber);
        context.process(&ch('%'));
        assert_eq!(context.state(), LexicalState::InPercent);
        assert_eq!(context.process(&ch(' ')), Action::finish(TokenKind::Percent));

        let mut context = LexicalContext::new();
        feed(&mut context, "90deg");
        assert_eq!(context.state(), LexicalState::InDimension);
        assert_eq!(context.process(&eos()), Action::finish(TokenKind::Dimension));
    }

    #[test]
    fn test_hex_stops_at_non_hex_letter() {
        let mut context = LexicalContext::new();
        feed(&mut context, "#ff0a");
        assert_eq!(context.state(), LexicalState::InHex);
        assert_eq!(context.process(&ch('g')), Action::finish(TokenKind::HexValue));
    }

    #[test]
    fn test_string_quotes_are_ignored() {
        let mut context = LexicalContext::new();
        let actions = feed(&mut context, "'a\"");
        assert!(actions[0].ignore);
        assert_eq!(context.quote(), Some('\''));
        // a different quote character is ordinary content
        assert_eq!(actions[2], Action::buffer());

        let close = context.process(&ch('\''));
        assert_eq!(close, Action::close(TokenKind::String));
        assert_eq!(context.quote(), None);
    }

    #[test]
    fn test_escape_buffers_one_character() {
        let mut context = LexicalContext::new();
        feed(&mut context, "\"\\");
        assert_eq!(context.state(), LexicalState::InEscape);
        assert_eq!(context.process(&ch('"')), Action::buffer());
        assert_eq!(context.state(), LexicalState::InString);
    }

    #[test]
    fn test_unterminated_string_emits_early() {
        let mut context = LexicalContext::new();
        feed(&mut context, "\"abc");
        let action = context.process(&ch('\n'));
        assert!(action.emit && action.reprocess && action.unterminated);
        assert_eq!(action.kind, Some(TokenKind::String));

        let mut context = LexicalContext::new();
        feed(&mut context, "\"abc");
        assert!(context.process(&eos()).unterminated);
    }

    #[test]
    fn test_slash_paths() {
        let mut context = LexicalContext::new();
        context.process(&ch('/'));
        assert_eq!(context.process(&ch('2')), Action::finish(TokenKind::Slash));

        let mut context = LexicalContext::new();
        feed(&mut context, "//x");
        assert_eq!(context.state(), LexicalState::InSingleLineComment);
        assert_eq!(context.process(&ch('\n')), Action::finish(TokenKind::Comment));
    }

    #[test]
    fn test_multiline_comment_close() {
        let mut context = LexicalContext::new();
        feed(&mut context, "/* a **");
        assert_eq!(context.state(), LexicalState::InMultiLineCommentSawStar);
        assert_eq!(context.process(&ch('/')), Action::close(TokenKind::Comment));

        let mut context = LexicalContext::new();
        feed(&mut context, "/* a *b");
        assert_eq!(context.state(), LexicalState::InMultiLineComment);
        assert!(context.process(&eos()).unterminated);
    }

    #[test]
    fn test_initial_trivia_and_symbols() {
        let mut context = LexicalContext::new();
        assert_eq!(context.process(&ch(' ')), Action::accept(TokenKind::Whitespace));
        assert_eq!(context.process(&ch('\n')), Action::accept(TokenKind::NewLine));
        assert_eq!(context.process(&ch('(')), Action::buffer());
        assert_eq!(context.state(), LexicalState::InSymbol);
        assert_eq!(context.process(&ch(')')), Action::finish(TokenKind::Symbol));
    }

    #[test]
    fn test_end_state() {
        let mut context = LexicalContext::new();
        assert_eq!(context.process(&eos()), Action::skip());
        assert_eq!(context.state(), LexicalState::End);
        assert_eq!(context.process(&eos()), Action::skip());

        // a real character after the end restarts from the initial state
        assert_eq!(context.process(&ch('a')), Action::retry());
        assert_eq!(context.state(), LexicalState::Initial);
    }

    #[test]
    fn test_pending_kind_follows_state() {
        let mut context = LexicalContext::new();
        assert_eq!(context.pending_kind(), None);
        feed(&mut context, "\"x\\");
        assert_eq!(context.pending_kind(), Some(TokenKind::String));
        context.reset();
        assert_eq!(context.state(), LexicalState::Initial);
        assert_eq!(context.quote(), None);
    }
}
