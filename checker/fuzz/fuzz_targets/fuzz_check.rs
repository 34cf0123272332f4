//! Checker Fuzz Target
//!
//! INVARIANT: Every trace that parses gets a verdict without panicking,
//! and the first-violation verdict matches the head of the full report.

#![no_main]

use borrowtrace::{CheckerConfig, check_trace_with, parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    let Ok(trace) = parser::parse_str(&input) else {
        return;
    };

    let first = check_trace_with(&trace, &CheckerConfig::default());
    let all = check_trace_with(&trace, &CheckerConfig::all());

    assert!(first.len() <= 1);
    assert_eq!(first.first(), all.first());
});
