//! Trace file loading
//!
//! Picks the input format from the file extension: `.json` traces are
//! deserialized, anything else goes through the lexer and parser.

use crate::ast::Trace;
use crate::diagnostics::SourceFile;
use crate::{lexer, parser};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::Path;

/// Input format of a trace file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    Text,
    Json,
}

impl TraceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TraceFormat::Json,
            _ => TraceFormat::Text,
        }
    }
}

/// A parsed trace together with its source
#[derive(Debug)]
pub struct LoadedTrace {
    pub trace: Trace,
    pub source: SourceFile,
    pub format: TraceFormat,
}

/// Parse source text in the given format
pub fn parse_source(source: &SourceFile, format: TraceFormat) -> Result<Trace> {
    match format {
        TraceFormat::Json => parser::json::parse_json(&source.content),
        TraceFormat::Text => {
            let tokens = lexer::lex(&source.content)
                .map_err(|report| report.with_source_code(source.to_named_source()))?;
            parser::parse(&tokens, source)
        }
    }
}

/// Read and parse a trace file
pub fn load_trace(path: &Path) -> Result<LoadedTrace> {
    tracing::info!("Loading trace {:?}", path);

    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read trace file {}", path.display()))?;

    let source = SourceFile::new(path.to_string_lossy().to_string(), content);
    let format = TraceFormat::from_path(path);
    let trace = parse_source(&source, format)?;
    tracing::debug!(ops = trace.len(), ?format, "parsed trace");

    Ok(LoadedTrace {
        trace,
        source,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TraceFormat::from_path(Path::new("a.json")), TraceFormat::Json);
        assert_eq!(TraceFormat::from_path(Path::new("a.JSON")), TraceFormat::Json);
        assert_eq!(TraceFormat::from_path(Path::new("a.trace")), TraceFormat::Text);
        assert_eq!(TraceFormat::from_path(Path::new("trace")), TraceFormat::Text);
    }

    #[test]
    fn test_load_text_and_json() {
        let dir = TempDir::new().unwrap();
        let text = dir.path().join("moves.trace");
        fs::write(&text, "bind(s)\nmove(s -> t)\n").unwrap();
        let json = dir.path().join("moves.json");
        fs::write(&json, r#"[{"op": "bind", "name": "s"}, {"op": "move", "from": "s", "to": "t"}]"#)
            .unwrap();

        let from_text = load_trace(&text).unwrap();
        let from_json = load_trace(&json).unwrap();
        assert_eq!(from_text.format, TraceFormat::Text);
        assert_eq!(from_json.format, TraceFormat::Json);
        assert_eq!(
            from_text.trace.kinds().collect::<Vec<_>>(),
            from_json.trace.kinds().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_trace(&dir.path().join("nope.trace")).unwrap_err();
        assert!(err.to_string().contains("Failed to read trace file"));
    }
}
