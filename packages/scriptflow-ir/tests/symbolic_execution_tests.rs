//! Symbolic execution over source snippets

mod common;

use common::*;
use pretty_assertions::assert_eq;
use scriptflow_ir::config::SymbolicExecutionConfig;
use scriptflow_ir::features::flow_graph::{BlockId, ControlFlowGraph};
use scriptflow_ir::features::symbolic_execution::{
    Constraint, ExecutionListener, ExecutionStats, ExecutionStatus, ParameterSeed, ProgramState,
    PropertyResolution, SymbolicExecutionEngine,
};
use scriptflow_ir::shared::models::{NodeId, SyntaxKind};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Condition narrowing
// ---------------------------------------------------------------------------

#[test]
fn test_loose_null_check_narrows_both_branches() {
    let fixture = parse_function("function f(x) { if (x == null) { a(x); } else { b(x); } }");
    let result = fixture.execute();

    assert_completed(&result);
    assert_constraint(&result, fixture.nth_ref("x", 1), Constraint::NULL_OR_UNDEFINED);
    assert_constraint(&result, fixture.nth_ref("x", 2), Constraint::NOT_NULLY);
    assert_both_outcomes(&result, fixture.first(SyntaxKind::Equal));
}

#[test]
fn test_strict_undefined_check_excludes_undefined() {
    let fixture = parse_function("function f(x) { if (x === undefined) { return; } g(x); }");
    let result = fixture.execute();

    assert_constraint(
        &result,
        fixture.nth_ref("x", 1),
        Constraint::ANY_VALUE.and(Constraint::UNDEFINED.not()),
    );
}

#[test]
fn test_typeof_guard_narrows_to_type() {
    let fixture = parse_function(r#"function f(x) { if (typeof x === "string") { g(x); } }"#);
    let result = fixture.execute();

    assert_constraint(&result, fixture.nth_ref("x", 1), Constraint::STRING_PRIMITIVE);
}

#[test]
fn test_negated_condition_swaps_edges() {
    let fixture = parse_function("function f(x) { if (!x) { a(x); } else { b(x); } }");
    let result = fixture.execute();

    assert_constraint(&result, fixture.nth_ref("x", 1), Constraint::FALSY);
    assert_constraint(&result, fixture.nth_ref("x", 2), Constraint::TRUTHY);
}

#[test]
fn test_known_truthy_condition_is_always_true() {
    let fixture = parse_function("function f() { var x = 1; if (x) { a(); } else { b(); } }");
    let result = fixture.execute();

    assert_always_true(&result, fixture.nth_ref("x", 0));
    assert!(result.constraint_of(fixture.nth_ref("b", 0)).is_none());
}

#[test]
fn test_parameter_condition_takes_both_edges() {
    let fixture = parse_function("function f(x) { if (x) { a(); } }");
    let result = fixture.execute();

    assert_both_outcomes(&result, fixture.nth_ref("x", 0));
    // Dead variables are not dropped at the end block, so the edges stay apart
    assert_eq!(result.terminal_states.len(), 2);

    let unpruned = fixture.execute_with(SymbolicExecutionConfig::default().prune_dead_variables(false));
    let x = fixture.var("x");
    let ends: BTreeSet<_> = unpruned
        .terminal_states
        .iter()
        .map(|state| state.variable_constraint(x).bits())
        .collect();
    assert_eq!(
        ends,
        BTreeSet::from([Constraint::TRUTHY.bits(), Constraint::FALSY.bits()])
    );
}

#[test]
fn test_short_circuit_operand_outcomes_are_keyed_separately() {
    let fixture = parse_function("function f(a) { var b = null; if (a && b) { g(); } }");
    let result = fixture.execute();

    assert_both_outcomes(&result, fixture.nth_ref("a", 0));
    assert_always_false(&result, fixture.nth_ref("b", 0));
    assert!(result.constraint_of(fixture.nth_ref("g", 0)).is_none());
}

#[test]
fn test_literal_loop_condition_is_not_recorded() {
    let fixture = parse_function("function f() { while (true) { if (g()) break; } }");
    let result = fixture.execute();

    assert_completed(&result);
    assert!(result
        .condition_outcome(fixture.first(SyntaxKind::BooleanLiteral))
        .is_none());
}

#[test]
fn test_operand_read_before_reassignment_keeps_its_value() {
    let fixture = parse_function(
        "function f() { var x = null; if (x === (x = 0)) { a(); } else { b(x); } }",
    );
    let result = fixture.execute();

    assert_completed(&result);
    assert_always_false(&result, fixture.first(SyntaxKind::StrictEqual));
    assert!(result.constraint_of(fixture.nth_ref("a", 0)).is_none());
    assert_constraint(&result, fixture.nth_ref("x", 2), Constraint::ZERO);
}

#[test]
fn test_increment_inside_expression_does_not_rewrite_earlier_operand() {
    let fixture = parse_function("function f() { var i = 0; var j = i + i++; g(j); }");
    let result = fixture.execute();

    let plus = fixture.first(SyntaxKind::Plus);
    let fact = result.facts_for(plus).next().unwrap();
    assert_eq!(fact.operands, vec![Constraint::ZERO, Constraint::ZERO]);
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[test]
fn test_member_access_on_null_drops_the_path() {
    let fixture = parse_function(
        "function f(c) { var o = null; if (c) { o = { p: 1 }; } return o.p; }",
    );
    let result = fixture.execute();

    assert_completed(&result);
    assert_eq!(result.terminal_states.len(), 1);
    assert!(result.stats.pruned_paths >= 1);
    assert_constraint(&result, fixture.first(SyntaxKind::DotMember), Constraint::POSITIVE_NUMBER);
}

#[test]
fn test_string_plus_anything_is_string() {
    let fixture = parse_function(r#"function f(n) { var s = "a"; return s + n; }"#);
    let result = fixture.execute();

    assert_constraint(&result, fixture.first(SyntaxKind::Plus), Constraint::STRING_PRIMITIVE);
}

#[test]
fn test_plus_of_unknowns_stays_unknown() {
    let fixture = parse_function("function f(a, b) { return a + b; }");
    let result = fixture.execute();

    assert_constraint(&result, fixture.first(SyntaxKind::Plus), Constraint::ANY_VALUE);
}

#[test]
fn test_plus_resolves_per_path() {
    let fixture = parse_function(r#"function f(c) { var x = c ? 1 : "s"; return x + 1; }"#);
    let result = fixture.execute();

    let plus = fixture.first(SyntaxKind::Plus);
    let observed: BTreeSet<_> = result
        .facts_for(plus)
        .map(|fact| fact.constraint.bits())
        .collect();
    let expected: BTreeSet<_> = [Constraint::NUMBER_PRIMITIVE, Constraint::STRING_PRIMITIVE]
        .iter()
        .map(|c| c.bits())
        .collect();
    assert_eq!(observed, expected);
}

#[test]
fn test_host_parameter_constraint_is_honored() {
    let mut fixture = parse_function("function f(s, n) { return s + n; }");
    let (s, n) = (fixture.var("s"), fixture.var("n"));
    fixture.scope.parameters = vec![
        ParameterSeed::new(s).with_constraint(Constraint::STRING_PRIMITIVE),
        ParameterSeed::new(n),
    ];
    let result = fixture.execute();

    assert_constraint(&result, fixture.first(SyntaxKind::Plus), Constraint::STRING_PRIMITIVE);
}

#[test]
fn test_arithmetic_on_undefined_is_nan() {
    let fixture = parse_function("function f() { var u; return u * 2; }");
    let result = fixture.execute();

    assert_constraint(&result, fixture.first(SyntaxKind::Multiply), Constraint::NAN);
}

#[test]
fn test_nullish_coalescing_result_is_not_nully() {
    let fixture = parse_function("function f(x) { var y = x ?? 0; return y; }");
    let result = fixture.execute();

    assert_constraint(&result, fixture.nth_ref("y", 0), Constraint::NOT_NULLY);
}

#[test]
fn test_object_shape_is_forgotten_after_escape() {
    let kept = parse_function("function f() { var o = { n: 1 }; return o.n; }");
    assert_constraint(&kept.execute(), kept.first(SyntaxKind::DotMember), Constraint::POSITIVE_NUMBER);

    let escaped = parse_function("function f() { var o = { n: 1 }; g(o); return o.n; }");
    assert_constraint(&escaped.execute(), escaped.first(SyntaxKind::DotMember), Constraint::ANY_VALUE);
}

#[test]
fn test_complete_property_resolution_treats_missing_as_undefined() {
    let fixture = parse_function("function f() { var o = { n: 1 }; return o.m; }");

    let partial = fixture.execute();
    assert_constraint(&partial, fixture.first(SyntaxKind::DotMember), Constraint::ANY_VALUE);

    let complete = fixture.execute_with(
        SymbolicExecutionConfig::default().property_resolution(PropertyResolution::Complete),
    );
    assert_constraint(&complete, fixture.first(SyntaxKind::DotMember), Constraint::UNDEFINED);
}

#[test]
fn test_builtin_string_length() {
    let fixture = parse_function(r#"function f() { var s = "abc"; return s.length; }"#);
    let result = fixture.execute();

    assert_constraint(
        &result,
        fixture.first(SyntaxKind::DotMember),
        Constraint::NON_NEGATIVE_NUMBER,
    );
}

// ---------------------------------------------------------------------------
// Loops, switch, try
// ---------------------------------------------------------------------------

#[test]
fn test_counting_loop_reaches_fixpoint() {
    let fixture = parse_function("function f(n) { var i = 0; while (i < n) { i++; } return i; }");
    let result = fixture.execute();

    assert_completed(&result);
    assert!(result.stats.memo_hits > 0);
    assert_constraint(&result, fixture.nth_ref("i", 2), Constraint::NON_NEGATIVE_NUMBER);
}

#[test]
fn test_state_cap_truncates_without_failing() {
    let fixture = parse_function("function f(n) { var i = 0; while (i < n) { i++; } return i; }");
    let result = fixture.execute_with(SymbolicExecutionConfig::default().max_states_per_block(1));

    assert_completed(&result);
    assert!(result.stats.truncated_states > 0);
    // The capped state never reaches the return
    assert_constraint(&result, fixture.nth_ref("i", 2), Constraint::ZERO);
}

#[test]
fn test_budget_exhaustion_keeps_partial_facts() {
    let fixture = parse_function("function f(n) { var i = 0; while (i < n) { i++; } return i; }");
    let result = fixture.execute_with(
        SymbolicExecutionConfig::default()
            .max_states_per_block(1)
            .max_block_executions(1),
    );

    assert_eq!(result.status, ExecutionStatus::BudgetExhausted);
    assert_eq!(result.stats.block_executions, 1);
    assert!(!result.facts.is_empty());
    assert!(result.terminal_states.is_empty());
}

#[test]
fn test_for_of_over_null_skips_the_body() {
    let fixture = parse_function("function f() { var xs = null; for (var v of xs) { g(v); } }");
    let result = fixture.execute();

    assert_completed(&result);
    assert!(result.constraint_of(fixture.nth_ref("g", 0)).is_none());
}

#[test]
fn test_for_in_binding_is_unknown_in_body() {
    let fixture = parse_function("function f(o) { for (var k in o) { g(k); } }");
    let result = fixture.execute();

    assert_constraint(&result, fixture.nth_ref("k", 0), Constraint::ANY_VALUE);
}

#[test]
fn test_switch_compares_cases_strictly() {
    let fixture = parse_function(
        "function f() { var x = 1; switch (x) { case 0: a(); break; case 1: b(); break; } }",
    );
    let result = fixture.execute();

    assert!(result.constraint_of(fixture.nth_ref("a", 0)).is_none());
    assert!(result.constraint_of(fixture.nth_ref("b", 0)).is_some());
}

#[test]
fn test_switch_leaves_a_balanced_stack() {
    for source in [
        "function f(x) { switch (x) { case 1: a(); } }",
        "function f(x) { switch (x) { case 1: a(); break; default: b(); } }",
        "function f(x) { switch (x) { default: b(); case 1: a(); case 2: c(); } }",
    ] {
        let fixture = parse_function(source);
        let result = fixture.execute();

        assert_completed(&result);
        assert!(!result.terminal_states.is_empty(), "{source}");
        for state in &result.terminal_states {
            assert_eq!(state.stack_depth(), 0, "{source}: {:?}", state.stack());
        }
    }
}

#[test]
fn test_try_is_abandoned_by_default() {
    let fixture = parse_function("function f() { try { a(); } catch (e) { b(e); } }");

    let result = fixture.execute();
    assert_eq!(result.status, ExecutionStatus::Abandoned);
    assert!(result.facts.is_empty());

    let explored = fixture.execute_with(SymbolicExecutionConfig::default().abandon_on_try(false));
    assert_completed(&explored);
    assert_constraint(&explored, fixture.nth_ref("e", 0), Constraint::ANY_VALUE);
}

// ---------------------------------------------------------------------------
// Engine plumbing
// ---------------------------------------------------------------------------

#[test]
fn test_dead_variable_pruning_merges_states() {
    let fixture = parse_function(
        r#"function f(c) { var x; if (c) { x = 1; } else { x = "s"; } g(); }"#,
    );

    let pruned = fixture.execute();
    let unpruned = fixture.execute_with(SymbolicExecutionConfig::default().prune_dead_variables(false));

    assert_completed(&pruned);
    assert_completed(&unpruned);
    assert!(pruned.stats.memo_hits > unpruned.stats.memo_hits);
    assert!(pruned.stats.block_executions < unpruned.stats.block_executions);
}

#[test]
fn test_terminal_states_keep_variable_constraints() {
    let fixture = parse_function("function f() { var x = 0; return; }");
    let result = fixture.execute();

    assert_eq!(result.terminal_states.len(), 1);
    assert_eq!(
        result.terminal_states[0].variable_constraint(fixture.var("x")),
        Constraint::ZERO
    );
}

#[test]
fn test_statements_are_reported_as_reached() {
    let fixture = parse_function("function f(c) { if (c) { return; } g(); }");
    let result = fixture.execute();

    let statement = fixture.first(SyntaxKind::ExpressionStatement);
    assert_constraint(&result, statement, Constraint::ANY_VALUE);
    assert!(result
        .facts_for(statement)
        .all(|fact| fact.operands.is_empty()));
}

#[derive(Default)]
struct Recorder {
    started: usize,
    before: usize,
    after: usize,
    paths: usize,
    finished: Option<(ExecutionStatus, ExecutionStats)>,
    blocks: BTreeSet<BlockId>,
}

impl ExecutionListener for Recorder {
    fn on_start(&mut self, _cfg: &ControlFlowGraph, _initial: &ProgramState) {
        self.started += 1;
    }

    fn before_element(&mut self, block: BlockId, _node: NodeId, _state: &ProgramState) {
        self.before += 1;
        self.blocks.insert(block);
    }

    fn after_element(&mut self, _block: BlockId, _node: NodeId, _state: &ProgramState) {
        self.after += 1;
    }

    fn on_end_of_path(&mut self, _state: &ProgramState) {
        self.paths += 1;
    }

    fn on_end_of_execution(&mut self, status: ExecutionStatus, stats: &ExecutionStats) {
        self.finished = Some((status, *stats));
    }
}

#[test]
fn test_listener_observes_every_path() {
    let fixture = parse_function(r#"function f(c) { var x; if (c) { x = 1; } else { x = "s"; } }"#);
    let cfg = fixture.cfg();
    let mut recorder = Recorder::default();

    let result = SymbolicExecutionEngine::new(
        &cfg,
        &fixture.tree,
        &fixture.resolver,
        SymbolicExecutionConfig::default().prune_dead_variables(false),
    )
    .execute(fixture.scope.initial_state(), &mut recorder);

    assert_eq!(recorder.started, 1);
    assert_eq!(recorder.paths, 2);
    assert_eq!(recorder.paths, result.terminal_states.len());
    assert!(recorder.before > 0);
    assert_eq!(recorder.before, recorder.after);
    assert_eq!(recorder.blocks.len(), 3);
    assert_eq!(recorder.finished, Some((ExecutionStatus::Completed, result.stats)));
}

#[test]
fn test_arguments_object_is_truthy() {
    let fixture = parse_function("function f() { if (arguments) { a(); } }");
    let result = fixture.execute();

    assert_always_true(&result, fixture.nth_ref("arguments", 0));
}
