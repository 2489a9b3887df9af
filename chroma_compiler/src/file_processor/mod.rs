//! Source file loading

mod processor;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

use std::path::Path;

/// Read a file with the configured preferences
pub fn process_file(file_path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// True when `path` carries the source extension
pub fn is_source_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ext.eq_ignore_ascii_case(crate::config::constants::compile_time::file_processing::SOURCE_EXTENSION)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("swatch.chroma");
        fs::write(&file_path, "rgb(1, 2, 3)\n").unwrap();

        let result = process_file(&file_path).unwrap();
        assert_eq!(result.metadata.line_count, 1);
    }

    #[test]
    fn test_is_source_path() {
        assert!(is_source_path(Path::new("a/b.chroma")));
        assert!(is_source_path(Path::new("B.CHROMA")));
        assert!(!is_source_path(Path::new("b.css")));
        assert!(!is_source_path(Path::new("chroma")));
    }
}
