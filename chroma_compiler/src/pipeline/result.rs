use crate::file_processor::FileMetadata;
use crate::grammar::ast::Program;
use crate::lexical::LexicalMetrics;
use crate::tokens::Token;
use std::time::Duration;

/// Everything the front end produces for one source
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Full token sequence, trivia included, ending with END
    pub tokens: Vec<Token>,
    pub program: Program,
    pub metrics: LexicalMetrics,
    pub duration: Duration,
    /// Present when the source came from a file
    pub file_metadata: Option<FileMetadata>,
}

impl PipelineResult {
    pub fn statement_count(&self) -> usize {
        self.program.len()
    }

    pub fn log_success(&self, label: &str) {
        crate::log_performance!(
            crate::logging::codes::success::PIPELINE_COMPLETE,
            "Front-end pipeline succeeded",
            duration = self.duration,
            "source" => label,
            "tokens" => self.tokens.len(),
            "statements" => self.program.len(),
            "nodes" => self.program.node_count()
        );
    }
}
