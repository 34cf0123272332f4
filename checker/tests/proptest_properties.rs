//! Property-based tests for the trace checker
//!
//! Generates families of traces and checks the access-discipline verdicts
//! hold for every member, plus crash-freedom of every pipeline stage.

use borrowtrace::ast::build::*;
use borrowtrace::ast::{OpKind, Trace};
use borrowtrace::{
    CheckerConfig, ViolationKind, check_trace, check_trace_with, lexer, parser,
};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

/// Operations on bindings named `f0..f9` that never touch `s` and are always valid
fn arb_unrelated_ops() -> impl Strategy<Value = Vec<OpKind>> {
    prop::collection::vec((0usize..10, 0u8..3), 0..8).prop_map(|picks| {
        let mut ops = Vec::new();
        for (i, (n, kind)) in picks.into_iter().enumerate() {
            let name = format!("f{}_{}", n, i);
            ops.push(bind(&name));
            match kind {
                0 => ops.push(use_(&name)),
                1 => {
                    let r = format!("{}_ref", name);
                    ops.push(borrow_shared(&name, &r));
                    ops.push(use_(&r));
                }
                _ => {}
            }
        }
        ops
    })
}

/// An access to `s` that must observe its current value
fn arb_access(name: &'static str) -> impl Strategy<Value = OpKind> {
    prop_oneof![
        Just(use_(name)),
        Just(borrow_shared(name, "late_ref")),
        Just(borrow_exclusive(name, "late_mut")),
        Just(mv(name, "late_owner")),
    ]
}

/// Step in a trace that only ever takes shared references to `s`
#[derive(Debug, Clone)]
enum SharedStep {
    /// Borrow from `s` or from the n-th existing reference
    Borrow(usize),
    /// Read `s` or the n-th existing reference
    Use(usize),
    /// Copy the n-th existing reference into a new binding
    Copy(usize),
    Scope(Vec<SharedStep>),
}

fn arb_shared_step(depth: u32) -> BoxedStrategy<SharedStep> {
    let leaf = prop_oneof![
        3 => any::<usize>().prop_map(SharedStep::Borrow),
        3 => any::<usize>().prop_map(SharedStep::Use),
        1 => any::<usize>().prop_map(SharedStep::Copy),
    ];
    if depth == 0 {
        leaf.boxed()
    } else {
        prop_oneof![
            6 => leaf,
            1 => prop::collection::vec(arb_shared_step(depth - 1), 0..6)
                .prop_map(SharedStep::Scope),
        ]
        .boxed()
    }
}

fn lower_shared(
    steps: &[SharedStep],
    visible: &mut Vec<String>,
    counter: &mut usize,
    ops: &mut Vec<OpKind>,
) {
    for step in steps {
        match step {
            SharedStep::Borrow(n) => {
                let from = visible[n % visible.len()].clone();
                *counter += 1;
                let to = format!("r{}", counter);
                ops.push(borrow_shared(&from, &to));
                visible.push(to);
            }
            SharedStep::Use(n) => ops.push(use_(&visible[n % visible.len()])),
            SharedStep::Copy(n) => {
                // index 0 is the owner; only references are copied
                if visible.len() > 1 {
                    let from = visible[1 + n % (visible.len() - 1)].clone();
                    *counter += 1;
                    let to = format!("r{}", counter);
                    ops.push(mv(&from, &to));
                    visible.push(to);
                }
            }
            SharedStep::Scope(inner) => {
                let saved = visible.len();
                ops.push(begin_scope());
                lower_shared(inner, visible, counter, ops);
                ops.push(end_scope());
                visible.truncate(saved);
            }
        }
    }
}

/// Arbitrary operations over a small fixed set of names, keywords included
fn arb_op() -> impl Strategy<Value = OpKind> {
    let name = prop::sample::select(vec!["a", "b", "c", "mut", "copy", "use"]);
    prop_oneof![
        name.clone().prop_map(bind),
        name.clone().prop_map(bind_mut),
        name.clone().prop_map(bind_copy),
        name.clone().prop_map(declare),
        (name.clone(), name.clone()).prop_map(|(a, b)| mv(a, b)),
        (name.clone(), name.clone()).prop_map(|(a, b)| borrow_shared(a, b)),
        (name.clone(), name.clone()).prop_map(|(a, b)| borrow_exclusive(a, b)),
        name.clone().prop_map(use_),
        name.prop_map(write),
        prop::sample::select(vec![begin_scope(), end_scope()]),
    ]
}

// ============================================================================
// Verdict properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn use_after_move_is_always_rejected(
        before in arb_unrelated_ops(),
        between in arb_unrelated_ops(),
        after in arb_unrelated_ops(),
        access in arb_access("s"),
    ) {
        let mut ops = before;
        ops.push(bind_mut("s"));
        ops.extend(between);
        ops.push(mv("s", "s2"));
        ops.extend(after);
        ops.push(access);

        let verdict = check_trace(&Trace::from_kinds(ops));
        prop_assert_eq!(verdict.reason(), Some(ViolationKind::UseAfterMove));
    }

    #[test]
    fn simultaneous_exclusive_references_conflict(
        mutable in any::<bool>(),
        between in arb_unrelated_ops(),
        use_first_later in any::<bool>(),
    ) {
        let mut ops = vec![if mutable { bind_mut("s") } else { bind("s") }];
        ops.push(borrow_exclusive("s", "r1"));
        ops.extend(between);
        ops.push(borrow_exclusive("s", "r2"));
        if use_first_later {
            ops.push(use_("r1"));
        }

        let verdict = check_trace(&Trace::from_kinds(ops));
        prop_assert_eq!(verdict.reason(), Some(ViolationKind::BorrowConflict));
    }

    #[test]
    fn shared_references_alone_are_accepted(
        steps in prop::collection::vec(arb_shared_step(3), 0..24),
    ) {
        let mut ops = vec![bind("s")];
        let mut visible = vec!["s".to_string()];
        let mut counter = 0;
        lower_shared(&steps, &mut visible, &mut counter, &mut ops);

        let trace = Trace::from_kinds(ops);
        let verdict = check_trace(&trace);
        prop_assert!(verdict.is_valid(), "{} rejected: {}", trace, verdict);
    }

    #[test]
    fn exclusive_after_last_shared_use_is_accepted(
        shared in 1usize..5,
        uses in 1usize..4,
        write_after in any::<bool>(),
    ) {
        let mut ops = vec![bind("s")];
        for i in 0..shared {
            ops.push(borrow_shared("s", &format!("r{}", i)));
        }
        for _ in 0..uses {
            for i in 0..shared {
                ops.push(use_(&format!("r{}", i)));
            }
        }
        ops.push(borrow_exclusive("s", "m"));
        if write_after {
            ops.push(write("m"));
        }

        let trace = Trace::from_kinds(ops);
        prop_assert!(check_trace(&trace).is_valid(), "{} rejected", trace);
    }

    #[test]
    fn first_mode_agrees_with_all_mode(ops in prop::collection::vec(arb_op(), 0..20)) {
        let trace = Trace::from_kinds(ops);
        let first = check_trace_with(&trace, &CheckerConfig::default());
        let all = check_trace_with(&trace, &CheckerConfig::all());

        prop_assert!(first.len() <= 1);
        prop_assert_eq!(first.first(), all.first());

        let indices: Vec<_> = all.iter().map(|v| v.op_index).collect();
        let mut sorted = indices.clone();
        sorted.sort();
        prop_assert_eq!(indices, sorted);
    }

    #[test]
    fn printed_traces_parse_back_with_the_same_verdict(
        ops in prop::collection::vec(arb_op(), 0..20),
    ) {
        let trace = Trace::from_kinds(ops);
        let reparsed = parser::parse_str(&trace.to_string()).unwrap();
        let outcome = |t: &Trace| check_trace(t).violation().map(|v| (v.kind, v.op_index));
        prop_assert_eq!(outcome(&trace), outcome(&reparsed));
    }
}

// ============================================================================
// Crash freedom
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn lexer_never_panics(source in ".*") {
        let _ = lexer::lex(&source);
    }

    #[test]
    fn pipeline_never_panics(source in "[a-z_(){}\\[\\]>,; \n-]{0,80}") {
        if let Ok(trace) = parser::parse_str(&source) {
            let _ = check_trace_with(&trace, &CheckerConfig::all());
        }
    }
}
