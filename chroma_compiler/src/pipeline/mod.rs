//! Source text to tokens and AST in one call

mod error;
mod result;

pub use error::PipelineError;
pub use result::PipelineResult;

use crate::lexical::{CharacterStream, Tokenizer};
use crate::logging;
use crate::tokens::TokenStream;
use std::path::Path;
use std::time::Instant;

/// Tokenize and parse `source`
pub fn process_source(source: &str) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    let mut characters = CharacterStream::new(source);
    let mut tokenizer = Tokenizer::new();
    let tokens = tokenizer.tokenize_stream(&mut characters)?;
    let metrics = tokenizer.metrics().clone();

    let stream = TokenStream::with_source_map(tokens.clone(), characters.source_map());
    let program = crate::syntax::parse_token_stream(stream)?;

    Ok(PipelineResult {
        tokens,
        program,
        metrics,
        duration: start_time.elapsed(),
        file_metadata: None,
    })
}

/// Read, tokenize and parse one file, logging under its file context
pub fn process_file(file_path: &Path) -> Result<PipelineResult, PipelineError> {
    process_file_with_id(file_path, 0)
}

pub(crate) fn process_file_with_id(
    file_path: &Path,
    file_id: usize,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(file_path.to_path_buf(), file_id, || {
        crate::log_info!("Starting file pipeline", "file" => file_path.display());

        let file_result = crate::file_processor::process_file(file_path)?;
        let mut result = process_source(&file_result.source)?;

        result.duration = start_time.elapsed();
        result.file_metadata = Some(file_result.metadata);
        result.log_success(&file_path.display().to_string());

        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxError;
    use crate::tokens::TokenKind;
    use crate::utils::Span;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_process_source() {
        let result = process_source("let c = rgb(255, 0, 0);\nc").unwrap();
        assert_eq!(result.statement_count(), 2);
        assert_eq!(result.tokens.last().map(|t| t.kind), Some(TokenKind::End));
        assert_eq!(result.metrics.total_tokens, result.tokens.len());
        assert!(result.file_metadata.is_none());
    }

    #[test]
    fn test_syntax_errors_carry_position() {
        let error = process_source("a +\n  )").unwrap_err();
        assert_matches!(error, PipelineError::SyntaxAnalysis(SyntaxError::UnexpectedToken { .. }));
        assert_eq!(error.error_code().as_str(), "E050");
        let position = error.position().unwrap();
        assert_eq!((position.line, position.column), (2, 3));
    }

    #[test]
    fn test_error_rendering_uses_normalized_lines() {
        // decomposed é and a lone carriage return
        let source = "e\u{301} +\r)";
        let error = process_source(source).unwrap_err();
        let position = error.position().unwrap();
        assert_eq!((position.line, position.column), (2, 1));

        let map = CharacterStream::new(source).source_map();
        assert_eq!(map.get_line(1), Some("\u{e9} +"));
        assert_eq!(map.get_line(2), Some(")"));

        let rendered = map.format_error(&Span::point(position), "unexpected ')'");
        assert!(rendered.contains("2 | )\n"));
        assert!(rendered.contains("  | ^\n"));
    }

    #[test]
    fn test_process_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("theme.chroma");
        fs::write(&path, "const primary = hsl(210deg, 50%, 40%)\n").unwrap();

        let result = process_file(&path).unwrap();
        assert_eq!(result.statement_count(), 1);
        assert_eq!(result.file_metadata.map(|m| m.line_count), Some(1));
    }

    #[test]
    fn test_process_missing_file() {
        let dir = tempdir().unwrap();
        let error = process_file(&dir.path().join("nope.chroma")).unwrap_err();
        assert_matches!(error, PipelineError::FileProcessing(_));
        assert_eq!(error.position(), None);
    }
}
