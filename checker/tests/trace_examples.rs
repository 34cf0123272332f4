//! End-to-end checks of trace text against expected verdicts
//!
//! Each scenario mirrors a classic ownership situation: the textbook
//! examples of moves, simultaneous borrows, dangling references, and the
//! cases that are accepted once a reference's last use has passed.

use borrowtrace::parser::json::parse_json;
use borrowtrace::parser::parse_str;
use borrowtrace::{
    CheckerConfig, UnusedBorrows, Verdict, ViolationKind, check_source, check_trace,
    check_trace_with,
};

fn verdict(source: &str) -> Verdict {
    check_source(source).unwrap_or_else(|e| panic!("failed to parse {:?}: {:?}", source, e))
}

fn reason(source: &str) -> Option<ViolationKind> {
    verdict(source).reason()
}

fn assert_valid(source: &str) {
    let verdict = verdict(source);
    assert!(verdict.is_valid(), "expected {:?} to be valid, got {}", source, verdict);
}

// ============================================================================
// Reference examples
// ============================================================================

#[test]
fn use_after_move_is_rejected() {
    let verdict = verdict("[bind(s), move(s->s2), use(s)]");
    assert_eq!(verdict.reason(), Some(ViolationKind::UseAfterMove));
    assert_eq!(verdict.to_string(), "rejected: use-after-move");

    let violation = verdict.violation().unwrap();
    assert_eq!(violation.op_index, 2);
    assert_eq!(violation.name, "s");
    assert_eq!(violation.related.as_ref().map(|r| r.op_index), Some(1));
}

#[test]
fn concurrent_shared_borrows_are_accepted() {
    assert_valid("[bind(s), borrow_shared(s)->r1, borrow_shared(s)->r2, use(r1), use(r2)]");
}

#[test]
fn two_exclusive_borrows_conflict() {
    let verdict = verdict("[bind(s), borrow_exclusive(s)->r1, borrow_exclusive(s)->r2]");
    assert_eq!(verdict.reason(), Some(ViolationKind::BorrowConflict));
    assert_eq!(verdict.to_string(), "rejected: exclusive/shared conflict");
    assert_eq!(verdict.violation().unwrap().op_index, 2);
}

#[test]
fn exclusive_borrow_after_last_shared_use_is_accepted() {
    assert_valid("bind(s) borrow_shared(s) -> r use(r) borrow_exclusive(s) -> m write(m)");
}

// ============================================================================
// Moves
// ============================================================================

#[test]
fn move_while_borrowed_dangles() {
    let verdict = verdict("bind(v) borrow(v) -> r move(v -> v2) use(r)");
    assert_eq!(verdict.reason(), Some(ViolationKind::DanglingReference));
    assert_eq!(verdict.to_string(), "rejected: reference outlives resource");
}

#[test]
fn move_after_last_borrow_use_is_accepted() {
    assert_valid("bind(v) borrow(v) -> r use(r) move(v -> v2) use(v2)");
}

#[test]
fn moved_binding_cannot_be_borrowed_or_moved_again() {
    assert_eq!(
        reason("bind(mut s) move(s -> t) borrow(s) -> r"),
        Some(ViolationKind::UseAfterMove)
    );
    assert_eq!(
        reason("bind(s) move(s -> t) move(s -> u)"),
        Some(ViolationKind::UseAfterMove)
    );
}

#[test]
fn assigning_a_moved_binding_gives_it_a_new_value() {
    // let mut s = ..; let t = s; s = ..; use(s)
    assert_valid("bind(mut s) move(s -> t) write(s) use(s) use(t)");
    assert_eq!(
        reason("bind(s) move(s -> t) write(s) use(s)"),
        Some(ViolationKind::ImmutableAccess)
    );
}

#[test]
fn copy_values_are_duplicated() {
    assert_valid("bind(mut copy n) move(n -> m) write(n) use(m) use(n)");
}

#[test]
fn shared_references_are_copied_by_moves() {
    assert_valid("bind(s) borrow(s) -> r move(r -> r2) use(r) use(r2)");
}

#[test]
fn exclusive_references_are_moved() {
    assert_eq!(
        reason("bind(mut s) borrow_mut(s) -> m move(m -> m2) use(m)"),
        Some(ViolationKind::UseAfterMove)
    );
    assert_valid("bind(mut s) borrow_mut(s) -> m move(m -> m2) write(m2) use(s)");
}

// ============================================================================
// Simultaneous access
// ============================================================================

#[test]
fn exclusive_and_shared_arguments_conflict() {
    // extend(&mut wave, &wave)
    let verdict = verdict(
        "bind(mut wave)
         borrow_exclusive(wave) -> dst
         borrow_shared(wave) -> src
         use(dst)
         use(src)",
    );
    assert_eq!(verdict.reason(), Some(ViolationKind::BorrowConflict));
    assert_eq!(verdict.violation().unwrap().op_index, 2);
}

#[test]
fn write_while_shared_borrow_live_conflicts() {
    // let r = &x; x += 10; use(r)
    assert_eq!(
        reason("bind(mut x) borrow(x) -> r write(x) use(r)"),
        Some(ViolationKind::BorrowConflict)
    );
    assert_valid("bind(mut x) borrow(x) -> r use(r) write(x) use(x)");
}

#[test]
fn read_while_exclusive_borrow_live_conflicts() {
    assert_eq!(
        reason("bind(mut y) borrow_mut(y) -> m use(y) write(m)"),
        Some(ViolationKind::BorrowConflict)
    );
    assert_eq!(
        reason("bind(mut y) borrow_mut(y) -> m move(y -> z) write(m)"),
        Some(ViolationKind::DanglingReference)
    );
}

#[test]
fn reborrows_nest_inside_their_parent() {
    assert_valid(
        "bind(mut v)
         borrow_mut(v) -> m
         borrow(m) -> r
         use(r)
         write(m)
         use(v)",
    );
    assert_eq!(
        reason("bind(mut v) borrow_mut(v) -> m borrow_mut(m) -> m2 use(m) write(m2)"),
        Some(ViolationKind::BorrowConflict)
    );
}

#[test]
fn shared_reborrow_keeps_exclusive_parent_live() {
    assert_eq!(
        reason("bind(mut v) borrow_mut(v) -> m borrow(m) -> r use(v) use(r)"),
        Some(ViolationKind::BorrowConflict)
    );
}

// ============================================================================
// Scopes and lifetimes
// ============================================================================

#[test]
fn reference_outliving_inner_scope_dangles() {
    let verdict = verdict(
        "declare(r)
         {
             bind(x)
             borrow(x) -> r
         }
         use(r)",
    );
    assert_eq!(verdict.reason(), Some(ViolationKind::DanglingReference));
    let violation = verdict.violation().unwrap();
    assert_eq!(violation.name, "x");
    assert_eq!(violation.op_index, 4);
}

#[test]
fn reference_used_inside_scope_is_accepted() {
    assert_valid(
        "bind(x)
         begin_scope
             borrow(x) -> r
             use(r)
         end_scope
         use(x)",
    );
}

#[test]
fn inner_shadowing_leaves_outer_binding_untouched() {
    assert_valid("bind(x) { bind(x) move(x -> y) } use(x)");
}

#[test]
fn out_of_scope_names_are_undefined() {
    let verdict = verdict("{ bind(x) } use(x)");
    assert_eq!(verdict.reason(), Some(ViolationKind::UndefinedName));
}

#[test]
fn undefined_name_suggests_close_match() {
    let verdict = verdict("bind(wave) use(wvae)");
    let violation = verdict.violation().unwrap();
    assert_eq!(violation.kind, ViolationKind::UndefinedName);
    assert_eq!(violation.help.as_deref(), Some("did you mean `wave`?"));
}

#[test]
fn unbalanced_scope_is_rejected() {
    assert_eq!(reason("bind(x) end_scope"), Some(ViolationKind::UnbalancedScope));
}

#[test]
fn unclosed_scope_closes_at_end_of_trace() {
    assert_valid("bind(x) { borrow(x) -> r use(r)");
}

// ============================================================================
// Mutability and initialization
// ============================================================================

#[test]
fn write_to_immutable_binding_is_rejected() {
    assert_eq!(reason("bind(x) write(x)"), Some(ViolationKind::ImmutableAccess));
    assert_valid("bind(mut x) write(x) use(x)");
}

#[test]
fn write_through_shared_reference_is_rejected() {
    assert_eq!(
        reason("bind(mut x) borrow(x) -> r write(r)"),
        Some(ViolationKind::ImmutableAccess)
    );
    assert_eq!(
        reason("bind(mut x) borrow(x) -> r borrow_mut(r) -> m"),
        Some(ViolationKind::ImmutableAccess)
    );
}

#[test]
fn declared_binding_must_be_assigned_before_use() {
    assert_eq!(reason("declare(r) use(r)"), Some(ViolationKind::Uninitialized));
    assert_valid("bind(s) declare(r) borrow(s) -> r use(r)");
}

#[test]
fn write_assigns_a_declared_binding() {
    // let mut x; x = 5; use(x)
    assert_valid("declare(mut x) write(x) use(x)");
    assert_valid("declare(x) write(x) use(x)");
    assert_eq!(
        reason("declare(x) write(x) write(x)"),
        Some(ViolationKind::ImmutableAccess)
    );
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn keywords_can_name_bindings() {
    assert_valid("bind(copy) use(copy)");
    assert_valid("bind(use); borrow(use) -> mut; use(mut); use(use)");
    assert_eq!(
        reason("bind(write) move(write -> move) use(write)"),
        Some(ViolationKind::UseAfterMove)
    );
}

#[test]
fn immediate_policy_ends_unused_references_at_creation() {
    let trace = parse_str("[bind(s), borrow_exclusive(s)->r1, borrow_exclusive(s)->r2]").unwrap();
    let config = CheckerConfig {
        unused_borrows: UnusedBorrows::Immediate,
        ..CheckerConfig::default()
    };
    assert!(check_trace_with(&trace, &config).is_empty());
    assert!(!check_trace(&trace).is_valid());
}

#[test]
fn all_mode_reports_every_violation_in_order() {
    let trace = parse_str(
        "bind(s) move(s -> t) use(s)
         bind(mut x) borrow(x) -> r write(x) use(r)
         declare(u) use(u)",
    )
    .unwrap();
    let violations = check_trace_with(&trace, &CheckerConfig::all());
    let kinds: Vec<_> = violations.iter().map(|v| v.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ViolationKind::UseAfterMove,
            ViolationKind::BorrowConflict,
            ViolationKind::Uninitialized
        ]
    );
    let indices: Vec<_> = violations.iter().map(|v| v.op_index).collect();
    assert_eq!(indices, vec![2, 5, 8]);
}

#[test]
fn json_traces_check_like_text_traces() {
    let trace = parse_json(
        r#"{"ops": [
            {"op": "bind", "name": "s"},
            {"op": "borrow_exclusive", "from": "s", "to": "r1"},
            {"op": "borrow_exclusive", "from": "s", "to": "r2"}
        ]}"#,
    )
    .unwrap();
    assert_eq!(check_trace(&trace).reason(), Some(ViolationKind::BorrowConflict));
}
