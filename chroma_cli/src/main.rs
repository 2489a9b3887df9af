//! # chroma
//!
//! Command line front end: dump tokens, print the AST, or check files.

use chroma_compiler::config::{self, RuntimeConfig};
use chroma_compiler::file_processor;
use chroma_compiler::logging::{self, diagnostics, LogEvent, LogLevel, Logger, LoggingService};
use chroma_compiler::lexical::CharacterStream;
use chroma_compiler::utils::Span;
use chroma_compiler::{batch, pipeline, PipelineError, PipelineResult};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "chroma", version, about = "Lexer and parser for color-function expressions")]
struct Cli {
    /// TOML file with runtime preferences
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Where library events go
    #[arg(long, global = true, value_enum, default_value_t = LogOutput::Env)]
    log_output: LogOutput,

    /// Print logging diagnostics after the command finishes
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the token sequence
    Tokens {
        #[command(flatten)]
        source: SourceArgs,

        /// Also print every normalized character
        #[arg(long)]
        characters: bool,
    },

    /// Print the syntax tree
    Parse {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Tokenize and parse a file or every .chroma file under a directory
    Check {
        path: PathBuf,

        #[arg(long, default_value_t = num_cpus::get())]
        threads: usize,

        #[arg(long)]
        fail_fast: bool,

        #[arg(long)]
        no_recursive: bool,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Source file
    #[arg(required_unless_present = "expr", conflicts_with = "expr")]
    file: Option<PathBuf>,

    /// Inline source text
    #[arg(long, short = 'e')]
    expr: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Json,
    Pretty,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogOutput {
    /// Forward to the `log` facade, filtered by RUST_LOG
    Env,
    /// The compiler's own console or JSON loggers, per the runtime preferences
    Native,
}

/// Forwards library events to the `log` facade
struct LogBridge;

impl Logger for LogBridge {
    fn log(&self, event: &LogEvent) {
        let level = match event.level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        };

        if event.context.is_empty() {
            log::log!(target: "chroma", level, "{}", event.format());
        } else {
            let context: Vec<String> = event
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            log::log!(target: "chroma", level, "{} ({})", event.format(), context.join(", "));
        }
    }
}

fn bridge_level() -> LogLevel {
    match log::max_level() {
        log::LevelFilter::Off | log::LevelFilter::Error => LogLevel::Error,
        log::LevelFilter::Warn => LogLevel::Warning,
        log::LevelFilter::Info => LogLevel::Info,
        log::LevelFilter::Debug | log::LevelFilter::Trace => LogLevel::Debug,
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` means the input was processed and rejected
fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    if let Some(path) = &cli.config {
        config::init_runtime_config(RuntimeConfig::from_toml_file(path)?)?;
    }

    match cli.log_output {
        LogOutput::Env => {
            let service = LoggingService::new(Arc::new(LogBridge), bridge_level());
            logging::init_global_logging_with_service(Arc::new(service))?;
        }
        LogOutput::Native => logging::init_global_logging()?,
    }

    let verbose = cli.verbose;
    let outcome = execute(cli.command);

    if verbose {
        eprintln!("{}", logging::get_system_diagnostics());
    }

    outcome
}

fn execute(command: Command) -> Result<bool, Box<dyn Error>> {
    match command {
        Command::Tokens { source, characters } => {
            let (label, text) = load_source(&source)?;
            if characters {
                println!("{}", diagnostics::dump_characters(&text));
            }
            match pipeline::process_source(&text) {
                Ok(result) => {
                    println!("{}", diagnostics::dump_tokens(&result.tokens));
                    Ok(true)
                }
                // A syntax error still leaves a valid token sequence
                Err(PipelineError::SyntaxAnalysis(_)) => {
                    let tokens = chroma_compiler::tokenize(&text)?;
                    println!("{}", diagnostics::dump_tokens(&tokens));
                    Ok(true)
                }
                Err(error) => {
                    report(&error, &label, &text);
                    Ok(false)
                }
            }
        }

        Command::Parse { source, format } => {
            let (label, text) = load_source(&source)?;
            match pipeline::process_source(&text) {
                Ok(result) => {
                    print_program(&result, format)?;
                    Ok(true)
                }
                Err(error) => {
                    report(&error, &label, &text);
                    Ok(false)
                }
            }
        }

        Command::Check {
            path,
            threads,
            fail_fast,
            no_recursive,
        } => check(&path, threads, fail_fast, !no_recursive),
    }
}

fn load_source(args: &SourceArgs) -> Result<(String, String), Box<dyn Error>> {
    match (&args.file, &args.expr) {
        (_, Some(expr)) => Ok(("<expr>".to_string(), expr.clone())),
        (Some(path), None) => {
            let file = file_processor::process_file(path)?;
            Ok((path.display().to_string(), file.source))
        }
        (None, None) => Err("no source given: pass a file or --expr".into()),
    }
}

fn print_program(result: &PipelineResult, format: Format) -> Result<(), Box<dyn Error>> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result.program)?),
        Format::Pretty => println!("{:#?}", result.program),
    }
    Ok(())
}

/// Cargo-style rendering with the offending line underlined
fn report(error: &PipelineError, label: &str, text: &str) {
    let heading = format!("error[{}]: ", error.error_code());
    let span = match error {
        PipelineError::SyntaxAnalysis(e) => e.span(),
        PipelineError::LexicalAnalysis(e) => Some(Span::point(e.position())),
        PipelineError::FileProcessing(_) => None,
    };

    match span {
        Some(span) => {
            let rendered = CharacterStream::new(text)
                .source_map()
                .format_error(&span, &error.to_string())
                .replacen("error: ", &heading, 1)
                .replacen("  --> ", &format!("  --> {}:", label), 1);
            eprint!("{}", rendered);
        }
        None => eprintln!("{}{}", heading, error),
    }
}

fn check(path: &Path, threads: usize, fail_fast: bool, recursive: bool) -> Result<bool, Box<dyn Error>> {
    if path.is_file() {
        let ok = match pipeline::process_file(path) {
            Ok(result) => {
                println!(
                    "ok: {} ({} statements, {} tokens)",
                    path.display(),
                    result.statement_count(),
                    result.tokens.len()
                );
                true
            }
            Err(_) => false,
        };
        print_collected();
        return Ok(ok);
    }

    let config = batch::BatchConfig {
        recursive,
        fail_fast,
        ..batch::BatchConfig::default()
    }
    .with_threads(threads);

    let results = batch::process_directory(path, &config)?;
    print_collected();
    println!("{}", results.summary());

    Ok(results.failure_count() == 0)
}

fn print_collected() {
    if let Some(summary) = logging::cargo_style_summary() {
        if !summary.trim().is_empty() {
            eprint!("{}", summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from(["chroma", "parse", "--expr", "rgb(1, 2, 3)", "--format", "pretty"])
            .unwrap();
        match cli.command {
            Command::Parse { source, format } => {
                assert_eq!(source.expr.as_deref(), Some("rgb(1, 2, 3)"));
                assert_eq!(format, Format::Pretty);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["chroma", "--config", "c.toml", "check", "dir", "--threads", "2"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Command::Check { threads: 2, .. }));
        assert_eq!(cli.log_output, LogOutput::Env);
        assert!(!cli.verbose);

        let cli = Cli::try_parse_from(["chroma", "tokens", "-e", "red", "-v", "--log-output", "native"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_output, LogOutput::Native);

        assert!(Cli::try_parse_from(["chroma", "tokens"]).is_err());
    }

    #[test]
    fn test_load_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.chroma");
        std::fs::write(&path, "red").unwrap();

        let args = SourceArgs {
            file: Some(path),
            expr: None,
        };
        let (_, text) = load_source(&args).unwrap();
        assert_eq!(text, "red");
    }
}
