//! Lexer Fuzz Target
//!
//! INVARIANT: The lexer must NEVER panic on any input.
//! Unknown characters are reported as L0001 errors, never as panics.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    let result = std::panic::catch_unwind(|| borrowtrace::lexer::lex(&input));

    match result {
        Ok(Ok(tokens)) => {
            // Every token stream ends with exactly one Eof
            let eofs = tokens
                .iter()
                .filter(|t| t.kind == borrowtrace::lexer::TokenKind::Eof)
                .count();
            assert_eq!(eofs, 1);
        }
        Ok(Err(_e)) => {}
        Err(_panic) => {
            let preview: String = input.chars().take(100).collect();
            panic!("Lexer panicked on input: {:?}", preview);
        }
    }
});
