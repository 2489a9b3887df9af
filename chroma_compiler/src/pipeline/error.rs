use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::logging::Code;
use crate::syntax::SyntaxError;
use crate::utils::Position;

/// Failure of any pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),
}

impl PipelineError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(e) => e.error_code(),
            Self::LexicalAnalysis(e) => e.error_code(),
            Self::SyntaxAnalysis(e) => e.error_code(),
        }
    }

    /// Source position of the failure, when it has one
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::FileProcessing(_) => None,
            Self::LexicalAnalysis(e) => Some(e.position()),
            Self::SyntaxAnalysis(e) => e.span().map(|span| span.start),
        }
    }
}
