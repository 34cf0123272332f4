//! Borrow trace checker CLI
//!
//! Main entry point for the `btrace` command.

use borrowtrace::common::SourceText;
use borrowtrace::config::{CheckMode, CheckerConfig, ConfigOverrides, ErrorFormat, UnusedBorrows};
use borrowtrace::{Reporter, Violation, loader};
use clap::{Parser, Subcommand, ValueEnum};
use miette::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "btrace")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Check ownership traces against the shared-xor-exclusive access discipline",
    long_about = "Checks traces of abstract ownership operations (bind, move, borrow, use, write, scopes)\nand reports the first violation of the single-owner, shared-xor-exclusive rules."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one or more trace files
    Check {
        /// Trace files (`.json` for JSON traces, anything else for text)
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Report every violation instead of stopping at the first
        #[arg(long)]
        all: bool,

        /// Diagnostic output format
        #[arg(long, value_enum)]
        error_format: Option<FormatArg>,

        /// Print the parsed trace before checking
        #[arg(long)]
        show_trace: bool,

        /// How long a reference that is never used stays live
        #[arg(long, value_enum)]
        unused_borrows: Option<UnusedBorrowsArg>,

        /// Configuration file (default: nearest btrace.toml or .btrace.toml)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Explain an error code
    Explain {
        /// Error code (e.g., O0002)
        code: String,
    },

    /// List all error codes
    ErrorIndex {
        /// Filter by category (lexer, parser, resolve, ownership)
        #[arg(long)]
        category: Option<String>,

        /// Output format (text, markdown, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Human,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnusedBorrowsArg {
    ScopeEnd,
    Immediate,
}

impl From<FormatArg> for ErrorFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Human => ErrorFormat::Human,
            FormatArg::Json => ErrorFormat::Json,
        }
    }
}

impl From<UnusedBorrowsArg> for UnusedBorrows {
    fn from(arg: UnusedBorrowsArg) -> Self {
        match arg {
            UnusedBorrowsArg::ScopeEnd => UnusedBorrows::ScopeEnd,
            UnusedBorrowsArg::Immediate => UnusedBorrows::Immediate,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("borrowtrace=debug,btrace=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Check {
            inputs,
            all,
            error_format,
            show_trace,
            unused_borrows,
            config,
        } => {
            let overrides = ConfigOverrides {
                mode: all.then_some(CheckMode::All),
                unused_borrows: unused_borrows.map(Into::into),
                error_format: error_format.map(Into::into),
            };
            check(&inputs, &overrides, config.as_deref(), show_trace)
        }

        Commands::Explain { code } => explain_error(&code),

        Commands::ErrorIndex { category, format } => {
            show_error_index(category.as_deref(), &format)
        }
    }
}

fn check(
    inputs: &[PathBuf],
    overrides: &ConfigOverrides,
    config_path: Option<&Path>,
    show_trace: bool,
) -> Result<()> {
    let mut rejected = 0;

    for input in inputs {
        let mut config = match config_path {
            Some(path) => CheckerConfig::from_file(path).map_err(|e| {
                miette::miette!("Failed to load config {}: {}", path.display(), e)
            })?,
            None => CheckerConfig::find_config(input).unwrap_or_default(),
        };
        config.merge(overrides);
        tracing::debug!(?config, "checking {:?}", input);

        if !check_file(input, &config, show_trace)? {
            rejected += 1;
        }
    }

    if rejected > 0 {
        return Err(miette::miette!(
            "{} of {} trace(s) rejected",
            rejected,
            inputs.len()
        ));
    }
    Ok(())
}

/// Check a single file; returns whether the trace was accepted
fn check_file(input: &Path, config: &CheckerConfig, show_trace: bool) -> Result<bool> {
    let loaded = loader::load_trace(input)?;

    if show_trace {
        println!("=== Trace ===");
        for (index, op) in loaded.trace.ops.iter().enumerate() {
            println!("  #{:<3} {}", index, op.kind);
        }
        println!();
    }

    let violations = borrowtrace::check_trace_with(&loaded.trace, config);
    let use_json = config.error_format == ErrorFormat::Json;

    if use_json {
        let text = SourceText::new(input.to_string_lossy(), &loaded.source.content);
        for violation in &violations {
            eprintln!("{}", violation_json(&text, violation));
        }
        let verdict = if violations.is_empty() {
            "valid"
        } else {
            "rejected"
        };
        let reason = violations.first().map(|v| v.kind.reason());
        let summary = serde_json::json!({
            "file": input.to_string_lossy(),
            "verdict": verdict,
            "reason": reason,
            "violations": violations.len(),
        });
        println!("{}", summary);
    } else if violations.is_empty() {
        println!("valid: {}", input.display());
    } else {
        let mut reporter = Reporter::new(loaded.source);
        for violation in &violations {
            reporter.violation(violation);
        }
        reporter.emit_all();
        println!("rejected: {} ({})", input.display(), violations[0].kind);
    }

    Ok(violations.is_empty())
}

fn violation_json(text: &SourceText, violation: &Violation) -> serde_json::Value {
    let (line, column) = text.line_col(violation.span.start);
    let related: Vec<_> = violation
        .related
        .iter()
        .map(|site| {
            let (line, column) = text.line_col(site.span.start);
            serde_json::json!({
                "op_index": site.op_index,
                "message": site.label,
                "line": line,
                "column": column
            })
        })
        .collect();

    let notes: Vec<&String> = violation.help.iter().collect();

    serde_json::json!({
        "level": "error",
        "message": violation.message,
        "code": violation.kind.code(),
        "reason": violation.kind.reason(),
        "op_index": violation.op_index,
        "binding": violation.name,
        "location": {
            "file": text.path,
            "line": line,
            "column": column
        },
        "notes": notes,
        "related": related
    })
}

fn explain_error(code: &str) -> Result<()> {
    use borrowtrace::diagnostic::codes::{ErrorIndex, explain_error as get_explanation};

    if let Some(explanation) = get_explanation(code) {
        println!("{}", explanation);
        return Ok(());
    }

    // Try to find similar codes
    let index = ErrorIndex::new();
    let prefix = code
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('O');
    let similar: Vec<_> = index
        .all()
        .into_iter()
        .filter(|e| e.code.starts_with(prefix))
        .take(5)
        .collect();

    println!("Error code '{}' not found.", code);

    if !similar.is_empty() {
        println!();
        println!("Similar error codes:");
        for e in similar {
            println!("  {} - {}", e.code, e.title);
        }
    }

    println!();
    println!("Use 'btrace error-index' to see all error codes.");

    Err(miette::miette!("unknown error code '{}'", code))
}

/// Show all error codes
fn show_error_index(category: Option<&str>, format: &str) -> Result<()> {
    use borrowtrace::diagnostic::codes::{ErrorCategory, ErrorIndex};

    let index = ErrorIndex::new();

    let category_filter = match category {
        Some(name) => Some(
            ErrorCategory::from_filter(name)
                .ok_or_else(|| miette::miette!("Unknown error category '{}'", name))?,
        ),
        None => None,
    };

    let codes = match category_filter {
        Some(cat) => index.by_category(cat),
        None => index.all(),
    };

    match format {
        "markdown" | "md" => {
            println!("{}", index.generate_docs());
        }
        "json" => {
            let entries: Vec<_> = codes
                .iter()
                .map(|code| {
                    serde_json::json!({
                        "code": code.code,
                        "title": code.title,
                        "category": code.category.name()
                    })
                })
                .collect();
            let doc = serde_json::json!({ "errors": entries });
            let rendered = serde_json::to_string_pretty(&doc)
                .map_err(|e| miette::miette!("Failed to serialize error index: {}", e))?;
            println!("{}", rendered);
        }
        _ => {
            // Text format
            println!("Borrow Trace Checker Error Index");
            println!("================================");
            println!();

            if let Some(cat) = category_filter {
                println!("Category: {}", cat.name());
                println!();
            }

            for code in &codes {
                println!("{}: {}", code.code, code.title);
                println!("  Category: {}", code.category.name());
                println!();
            }

            println!("Total: {} error codes", codes.len());
            println!();
            println!("Use 'btrace explain <CODE>' for detailed information about a specific error.");
        }
    }

    Ok(())
}
