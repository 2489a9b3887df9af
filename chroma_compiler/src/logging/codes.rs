//! Error and success codes with their classification metadata
//!
//! Single source of truth for every code the pipeline can log. Each stage's
//! error enum maps its variants onto these constants through `error_code()`.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Character stream error codes
pub mod stream {
    use super::Code;

    pub const INVALID_ARGUMENT: Code = Code::new("E015");
    pub const REWIND_UNDERFLOW: Code = Code::new("E016");
    pub const NO_ACTIVE_MARK: Code = Code::new("E017");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const EMPTY_TOKEN_BUFFER: Code = Code::new("E020");
    pub const UNTERMINATED_CONSTRUCT: Code = Code::new("E021");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Syntax error codes
pub mod syntax {
    use super::Code;

    pub const MISSING_END: Code = Code::new("E040");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const INVALID_ASSIGNMENT_TARGET: Code = Code::new("E051");
    pub const INVALID_DIMENSION_UNIT: Code = Code::new("E052");
    pub const INVALID_NUMERIC_LITERAL: Code = Code::new("E053");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E087");
}

/// Batch processing error codes
pub mod batch {
    use super::Code;

    pub const DISCOVERY_FAILED: Code = Code::new("E090");
    pub const NO_SOURCE_FILES: Code = Code::new("E091");
    pub const WORKER_FAILED: Code = Code::new("E092");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const AST_CONSTRUCTION_COMPLETE: Code = Code::new("I040");
    pub const PIPELINE_COMPLETE: Code = Code::new("I060");
    pub const BATCH_PROCESSING_COMPLETE: Code = Code::new("I090");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    use Severity::*;

    ERROR_REGISTRY.get_or_init(|| {
        // (code, category, severity, recoverable, requires_halt, description, action)
        let entries = [
            ("ERR001", "System", Critical, false, true,
             "Critical internal system error",
             "File a bug report with the input that triggered it"),
            ("ERR002", "System", Critical, false, true,
             "System initialization failure",
             "Check logging and configuration setup"),
            ("ERR003", "System", High, false, true,
             "Invalid runtime configuration",
             "Fix the configuration file or CHROMA_* environment variables"),
            ("E005", "FileProcessing", Medium, false, true,
             "Source file not found",
             "Check the file path"),
            ("E006", "FileProcessing", Low, false, true,
             "Source file has the wrong extension",
             "Rename the file to use the .chroma extension"),
            ("E007", "FileProcessing", High, false, true,
             "Source file exceeds the maximum size",
             "Split the source into smaller files"),
            ("E009", "FileProcessing", Medium, false, true,
             "Permission denied reading source file",
             "Check file permissions"),
            ("E010", "FileProcessing", Medium, false, true,
             "Source file is not valid UTF-8",
             "Re-encode the file as UTF-8"),
            ("E011", "FileProcessing", Medium, false, true,
             "I/O error reading source file",
             "Retry or check the underlying storage"),
            ("E012", "FileProcessing", Medium, false, true,
             "Path is not a regular file",
             "Pass a file path, or a directory to the batch command"),
            ("E015", "Stream", High, false, true,
             "Negative lookahead distance",
             "Pass a non-negative distance to peek"),
            ("E016", "Stream", High, false, true,
             "Rewind past the start of the consumed history",
             "Rewind at most as many characters as were consumed"),
            ("E017", "Stream", High, false, true,
             "Commit or reset without an active mark",
             "Pair every mark with exactly one commit or reset"),
            ("E020", "Lexical", Critical, false, true,
             "Token built from an empty buffer",
             "File a bug report with the input that triggered it"),
            ("E021", "Lexical", Low, true, false,
             "Unterminated string or comment closed at end of input",
             "Add the missing closing delimiter"),
            ("E027", "Lexical", High, false, true,
             "Token count exceeds the configured maximum",
             "Reduce the source size or raise lexical.max_token_count"),
            ("E040", "Syntax", High, false, true,
             "Token stream does not end with an END token",
             "File a bug report with the input that triggered it"),
            ("E050", "Syntax", High, false, true,
             "Unexpected token",
             "Check the expression near the reported position"),
            ("E051", "Syntax", High, false, true,
             "Left side of assignment is not an identifier",
             "Assign only to plain identifiers"),
            ("E052", "Syntax", High, false, true,
             "Unknown dimension unit",
             "Use a supported unit such as px, em, deg or ms"),
            ("E053", "Syntax", High, false, true,
             "Malformed numeric literal",
             "Write numbers with at most one decimal point"),
            ("E087", "Syntax", Critical, false, true,
             "Parser recursion depth exceeded",
             "Reduce nesting of groups and unary operators"),
            ("E090", "Batch", Medium, false, true,
             "Failed to discover source files",
             "Check the directory path and permissions"),
            ("E091", "Batch", Low, false, false,
             "No source files found",
             "Check the directory contains .chroma files"),
            ("E092", "Batch", Critical, false, true,
             "Batch worker thread failed",
             "File a bug report"),
        ];

        entries
            .into_iter()
            .map(
                |(code, category, severity, recoverable, halt, description, action)| {
                    (
                        code,
                        ErrorMetadata::new(
                            code,
                            category,
                            severity,
                            recoverable,
                            halt,
                            description,
                            action,
                        ),
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
