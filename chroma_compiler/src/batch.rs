//! Directory batch processing
//!
//! Discovers `.chroma` files and runs each through the pipeline, either
//! sequentially or across worker threads. Sources are independent, so
//! workers share nothing but the result sink.

use crate::config::constants::compile_time::batch_processing::{
    MAX_FILES_PER_BATCH, MAX_WORKER_THREADS,
};
use crate::config::runtime::BatchPreferences;
use crate::file_processor::is_source_path;
use crate::logging::codes;
use crate::pipeline::{self, PipelineError, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: usize,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_preferences(&crate::config::runtime_config().batch)
    }
}

impl BatchConfig {
    pub fn from_preferences(prefs: &BatchPreferences) -> Self {
        Self {
            max_threads: prefs.max_threads.clamp(1, MAX_WORKER_THREADS),
            recursive: prefs.recursive,
            max_files: MAX_FILES_PER_BATCH,
            fail_fast: prefs.fail_fast,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch processing completed: {} files processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }

    fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to discover files in {path}: {message}")]
    Discovery { path: String, message: String },

    #[error("No .chroma files found in {path}")]
    NoFiles { path: String },

    #[error("Worker thread failed: {message}")]
    Thread { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::Discovery { .. } => codes::batch::DISCOVERY_FAILED,
            Self::NoFiles { .. } => codes::batch::NO_SOURCE_FILES,
            Self::Thread { .. } => codes::batch::WORKER_FAILED,
        }
    }

    fn discovery(path: &Path, message: impl ToString) -> Self {
        Self::Discovery {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Source files under `dir_path`, sorted
pub fn discover_source_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        let error = BatchError::discovery(dir_path, "not a directory");
        crate::log_error!(error.error_code(), &error.to_string());
        return Err(error);
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config)?;

    if files.is_empty() {
        let error = BatchError::NoFiles {
            path: dir_path.display().to_string(),
        };
        crate::log_error!(error.error_code(), &error.to_string());
        return Err(error);
    }

    files.sort();
    crate::log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    config: &BatchConfig,
) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::discovery(dir_path, e))?;

    for entry in entries {
        let path = entry.map_err(|e| BatchError::discovery(dir_path, e))?.path();

        if path.is_dir() {
            if config.recursive {
                visit_directory(&path, files, config)?;
            }
        } else if is_source_path(&path) {
            if files.len() >= config.max_files {
                crate::log_warning!("Reached maximum file limit",
                    "files_found" => files.len(),
                    "limit" => config.max_files
                );
                return Ok(());
            }
            files.push(path);
        }
    }

    Ok(())
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// Process every source file under `dir_path`
pub fn process_directory(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let files = discover_source_files(dir_path, config)?;

    let mut results = if config.max_threads <= 1 || files.len() == 1 {
        process_sequential(&files, config)
    } else {
        process_parallel(&files, config)?
    };

    results.files_discovered = files.len();
    results.processing_duration = start_time.elapsed();
    results.sort();

    crate::log_performance!(
        codes::success::BATCH_PROCESSING_COMPLETE,
        "Batch processing completed",
        duration = results.processing_duration,
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads" => config.max_threads
    );

    Ok(results)
}

fn process_sequential(files: &[PathBuf], config: &BatchConfig) -> BatchResults {
    let mut results = BatchResults::new();

    for (file_id, file_path) in files.iter().enumerate() {
        match pipeline::process_file_with_id(file_path, file_id) {
            Ok(result) => results.add_success(file_path.clone(), result),
            Err(error) => {
                results.add_failure(file_path.clone(), error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
                    break;
                }
            }
        }
    }

    results
}

fn process_parallel(files: &[PathBuf], config: &BatchConfig) -> Result<BatchResults, BatchError> {
    let chunk_size = calculate_chunk_size(files.len(), config.max_threads);
    let mut results = BatchResults::new();

    crate::log_debug!("Parallel processing configuration",
        "total_files" => files.len(),
        "chunk_size" => chunk_size,
        "threads" => config.max_threads
    );

    for (chunk_index, chunk) in files.chunks(chunk_size).enumerate() {
        results.merge(process_chunk(chunk, chunk_index * chunk_size, config.max_threads)?);

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    Ok(results)
}

/// Split `files` across up to `threads` workers
fn process_chunk(
    files: &[PathBuf],
    first_id: usize,
    threads: usize,
) -> Result<BatchResults, BatchError> {
    let sink = Arc::new(Mutex::new(BatchResults::new()));
    let per_thread = files.len().div_ceil(threads).max(1);
    let mut handles = Vec::new();

    for (worker, slice) in files.chunks(per_thread).enumerate() {
        let thread_files = slice.to_vec();
        let offset = first_id + worker * per_thread;
        let sink = Arc::clone(&sink);

        handles.push(thread::spawn(move || {
            for (local_id, file_path) in thread_files.into_iter().enumerate() {
                let outcome = pipeline::process_file_with_id(&file_path, offset + local_id);
                let mut guard = lock(&sink);
                match outcome {
                    Ok(result) => guard.add_success(file_path, result),
                    Err(error) => guard.add_failure(file_path, error),
                }
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| {
            let error = BatchError::Thread {
                message: "worker panicked during processing".to_string(),
            };
            crate::log_error!(error.error_code(), &error.to_string());
            error
        })?;
    }

    let sink = Arc::try_unwrap(sink).map_err(|_| BatchError::Thread {
        message: "results still shared after workers finished".to_string(),
    })?;

    Ok(sink
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner()))
}

/// A panicking worker cannot leave the results half-written, so a
/// poisoned lock is still usable
fn lock(sink: &Mutex<BatchResults>) -> MutexGuard<'_, BatchResults> {
    sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn calculate_chunk_size(file_count: usize, max_threads: usize) -> usize {
    const MAX_CHUNK_SIZE: usize = 50;
    file_count.div_ceil(max_threads.max(1)).clamp(1, MAX_CHUNK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn config(threads: usize) -> BatchConfig {
        BatchConfig {
            max_threads: threads,
            recursive: true,
            max_files: MAX_FILES_PER_BATCH,
            fail_fast: false,
        }
    }

    fn write_tree(root: &Path) {
        fs::write(root.join("a.chroma"), "let a = red\n").unwrap();
        fs::write(root.join("b.chroma"), "rgb(1, 2,\n").unwrap();
        fs::write(root.join("notes.txt"), "not a source").unwrap();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested").join("c.chroma"), "50% * 2\n").unwrap();
    }

    #[test]
    fn test_discovery() {
        let dir = tempdir().unwrap();
        write_tree(dir.path());

        let files = discover_source_files(dir.path(), &config(1)).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|f| f.extension().unwrap() == "chroma"));

        let flat = BatchConfig {
            recursive: false,
            ..config(1)
        };
        assert_eq!(discover_source_files(dir.path(), &flat).unwrap().len(), 2);
    }

    #[test]
    fn test_discovery_errors() {
        let dir = tempdir().unwrap();
        assert_matches!(
            discover_source_files(dir.path(), &config(1)),
            Err(BatchError::NoFiles { .. })
        );
        let missing = dir.path().join("missing");
        let error = discover_source_files(&missing, &config(1)).unwrap_err();
        assert_matches!(error, BatchError::Discovery { .. });
        assert_eq!(error.error_code().as_str(), "E090");
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let dir = tempdir().unwrap();
        write_tree(dir.path());

        for threads in [1, 4] {
            let results = process_directory(dir.path(), &config(threads)).unwrap();
            assert_eq!(results.files_discovered, 3);
            assert_eq!(results.files_processed, 3);
            assert_eq!(results.success_count(), 2);
            assert_eq!(results.failure_count(), 1);
            assert!(results.failed_files[0].0.ends_with("b.chroma"));
            assert!(results.successful_files[0].0.ends_with("a.chroma"));
        }
    }

    #[test]
    fn test_fail_fast() {
        let dir = tempdir().unwrap();
        write_tree(dir.path());

        let fail_fast = BatchConfig {
            fail_fast: true,
            ..config(1)
        };
        let results = process_directory(dir.path(), &fail_fast).unwrap();
        // a.chroma succeeds, b.chroma fails and stops the run
        assert_eq!(results.files_processed, 2);
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(1, 4), 1);
        assert_eq!(calculate_chunk_size(200, 4), 50);
        assert_eq!(calculate_chunk_size(0, 0), 1);
    }

    #[test]
    fn test_results_summary() {
        let results = BatchResults::new();
        assert_eq!(results.success_rate(), 0.0);
        assert!(results.summary().contains("0 files processed"));
    }
}
