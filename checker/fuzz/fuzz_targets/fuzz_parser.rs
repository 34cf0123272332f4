//! Parser Fuzz Target
//!
//! INVARIANT: Neither trace parser may panic on any input.
//! Text input goes through the lexer first; the same bytes are also fed to
//! the JSON trace parser.

#![no_main]

use borrowtrace::SourceFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let input_str: &str = &input;
    let source = SourceFile::new("<fuzz>", input_str);
    let preview: String = input.chars().take(100).collect();

    let tokens = match std::panic::catch_unwind(|| borrowtrace::lexer::lex(input_str)) {
        Ok(Ok(tokens)) => tokens,
        Ok(Err(_)) => return,
        Err(_) => {
            panic!("Lexer panicked on input: {:?}", preview);
        }
    };

    if std::panic::catch_unwind(|| borrowtrace::parser::parse(&tokens, &source)).is_err() {
        panic!("Parser panicked on input: {:?}", preview);
    }

    if std::panic::catch_unwind(|| borrowtrace::parser::json::parse_json(input_str)).is_err() {
        panic!("JSON parser panicked on input: {:?}", preview);
    }
});
