pub mod compile_time {
    pub mod file_processing {
        /// Maximum source file size accepted for processing (10MB)
        /// SECURITY: Prevents memory exhaustion via oversized inputs
        pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

        /// Extension recognised for source files
        pub const SOURCE_EXTENSION: &str = "chroma";

        /// Threshold for considering a file "large" (1MB)
        pub const LARGE_FILE_THRESHOLD: u64 = 1024 * 1024;
    }

    pub mod lexical {
        /// Maximum number tokens allowed in a single source
        /// SECURITY: Prevents DoS via token explosion
        pub const MAX_TOKEN_COUNT: usize = 1_000_000;

        /// Maximum hex digits accepted by a `\u{...}` escape
        pub const MAX_UNICODE_ESCAPE_DIGITS: usize = 6;
    }

    pub mod syntax {
        /// Maximum parser recursion depth to prevent stack overflow
        /// SECURITY: Prevents DoS via deeply nested groups and unary chains
        pub const MAX_PARSE_DEPTH: usize = 256;

        /// Maximum context stack depth kept for error reporting
        pub const MAX_CONTEXT_STACK_DEPTH: usize = 20;

        /// Token lookahead limit for parsing decisions
        pub const MAX_LOOKAHEAD_TOKENS: usize = 10;
    }

    pub mod batch_processing {
        /// Maximum number of worker threads for file processing
        pub const MAX_WORKER_THREADS: usize = 8;

        /// Maximum files per batch
        /// SECURITY: Prevents DoS via batch size explosion
        pub const MAX_FILES_PER_BATCH: usize = 1000;
    }

    pub mod logging {
        /// Log buffer size for memory loggers and collectors
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log events retained per file before truncation
        pub const MAX_LOG_EVENTS_PER_FILE: usize = 1_000;

        /// Maximum log message length
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 10_000;
    }

    pub mod diagnostics {
        /// Inner width of the box drawn around dump headers
        pub const HEADER_BOX_WIDTH: usize = 60;

        /// Token values longer than this are elided in dump lines
        pub const MAX_DUMP_VALUE_LENGTH: usize = 40;
    }
}
