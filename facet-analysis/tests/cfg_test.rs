//! CFG builder structure tests: block/edge shapes per statement kind,
//! jump targeting, and the build_all discovery pass.

use facet_analysis::cfg::builder::CfgBuilder;
use facet_analysis::cfg::types::{Cfg, EdgeKind};
use facet_core::types::ast::{AstNode, SourceLocation};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn loc(line: u32, end: u32) -> SourceLocation {
    SourceLocation::new("test.js", line, end)
}

fn ident(name: &str) -> AstNode {
    AstNode::new("Identifier").with_name(name)
}

fn call(name: &str) -> AstNode {
    AstNode::new("CallExpression").with_callee(ident(name))
}

fn expr_stmt(inner: AstNode) -> AstNode {
    AstNode::new("ExpressionStatement").with_child(inner)
}

fn ret() -> AstNode {
    AstNode::new("ReturnStatement")
}

fn func(name: &str, stmts: Vec<AstNode>) -> AstNode {
    let mut f = AstNode::new("FunctionDeclaration")
        .with_name(name)
        .with_location(loc(1, 10));
    for s in stmts {
        f = f.with_stmt(s);
    }
    f
}

fn edge_kinds(cfg: &Cfg) -> Vec<EdgeKind> {
    cfg.edges().map(|e| e.kind).collect()
}

fn count_kind(cfg: &Cfg, kind: EdgeKind) -> usize {
    cfg.edges().filter(|e| e.kind == kind).count()
}

// ─── Basics ────────────────────────────────────────────────────────────────

#[test]
fn empty_function_connects_entry_to_exit() {
    let cfg = CfgBuilder::new().build(&func("f", vec![])).unwrap();
    assert_eq!(cfg.block_count(), 2);
    assert_eq!(edge_kinds(&cfg), vec![EdgeKind::Normal]);
    assert!(cfg.block(cfg.entry).is_entry);
    assert!(cfg.block(cfg.exit).is_exit);
}

#[test]
fn straight_line_statements_share_one_block() {
    let cfg = CfgBuilder::new()
        .build(&func("f", vec![expr_stmt(call("a")), expr_stmt(call("b"))]))
        .unwrap();
    assert_eq!(cfg.block_count(), 2);
    assert_eq!(cfg.block(cfg.entry).statements.len(), 2);
}

#[test]
fn non_function_input_is_rejected() {
    let err = CfgBuilder::new().build(&ident("x")).unwrap_err();
    assert!(err.to_string().contains("CFG construction failed"));
}

#[test]
fn entry_has_no_predecessors_exit_no_successors() {
    let ast = func(
        "f",
        vec![
            AstNode::new("IfStatement")
                .with_test(ident("x"))
                .with_consequent(expr_stmt(call("a"))),
            AstNode::new("WhileStatement")
                .with_test(ident("y"))
                .with_stmt(expr_stmt(call("b"))),
            ret(),
        ],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    assert_eq!(cfg.predecessors(cfg.entry).count(), 0);
    assert_eq!(cfg.successors(cfg.exit).count(), 0);
}

#[test]
fn every_edge_is_mirrored_in_predecessors() {
    let ast = func(
        "f",
        vec![AstNode::new("IfStatement")
            .with_test(ident("x"))
            .with_consequent(expr_stmt(call("a")))
            .with_alternate(expr_stmt(call("b")))],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    for edge in cfg.edges() {
        assert!(
            cfg.predecessors(edge.to).any(|e| e.from == edge.from && e.kind == edge.kind),
            "edge {:?} not mirrored",
            edge
        );
        assert!(cfg.successors(edge.from).any(|e| e.to == edge.to && e.kind == edge.kind));
    }
}

// ─── If ────────────────────────────────────────────────────────────────────

#[test]
fn if_without_else_branches_to_merge() {
    let ast = func(
        "f",
        vec![AstNode::new("IfStatement")
            .with_test(ident("x"))
            .with_consequent(expr_stmt(call("a")))],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    // entry --CondTrue--> then, entry --CondFalse--> merge
    assert_eq!(count_kind(&cfg, EdgeKind::CondTrue), 1);
    assert_eq!(count_kind(&cfg, EdgeKind::CondFalse), 1);
    let cond_false = cfg.edges().find(|e| e.kind == EdgeKind::CondFalse).unwrap();
    assert!(cfg.block(cond_false.to).label.starts_with("if_merge"));
}

#[test]
fn if_else_gets_separate_else_block() {
    let ast = func(
        "f",
        vec![AstNode::new("IfStatement")
            .with_test(ident("x"))
            .with_consequent(expr_stmt(call("a")))
            .with_alternate(expr_stmt(call("b")))],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    let cond_false = cfg.edges().find(|e| e.kind == EdgeKind::CondFalse).unwrap();
    assert!(cfg.block(cond_false.to).label.starts_with("if_else"));
}

// ─── Loops ─────────────────────────────────────────────────────────────────

#[test]
fn while_loop_has_loop_back_edge() {
    let ast = func(
        "f",
        vec![AstNode::new("WhileStatement")
            .with_test(ident("x"))
            .with_stmt(expr_stmt(call("body")))],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    assert_eq!(count_kind(&cfg, EdgeKind::Loop), 1);
    let back = cfg.edges().find(|e| e.kind == EdgeKind::Loop).unwrap();
    assert!(cfg.block(back.to).label.starts_with("while_header"));
}

#[test]
fn do_while_enters_body_first() {
    let ast = func(
        "f",
        vec![AstNode::new("DoWhileStatement")
            .with_test(ident("x"))
            .with_stmt(expr_stmt(call("body")))],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    // The edge out of entry goes straight to the body, not the header.
    let first = cfg.successors(cfg.entry).next().unwrap();
    assert!(cfg.block(first.to).label.starts_with("do_body"));
    // Header tests after the body: CondTrue back to body.
    let cond_true = cfg.edges().find(|e| e.kind == EdgeKind::CondTrue).unwrap();
    assert!(cfg.block(cond_true.from).label.starts_with("do_header"));
    assert!(cfg.block(cond_true.to).label.starts_with("do_body"));
}

#[test]
fn for_loop_appends_update_before_back_edge() {
    let ast = func(
        "f",
        vec![AstNode::new("ForStatement")
            .with_init(AstNode::new("VariableDeclaration").with_name("i"))
            .with_test(ident("cond"))
            .with_update(AstNode::new("UpdateExpression").with_value("++"))
            .with_stmt(expr_stmt(call("body")))],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    let back = cfg.edges().find(|e| e.kind == EdgeKind::Loop).unwrap();
    let tail = cfg.block(back.from);
    assert_eq!(tail.last_statement().unwrap().kind.as_str(), "UpdateExpression");
    // Init landed before the header.
    assert_eq!(
        cfg.block(cfg.entry).statements[0].kind.as_str(),
        "VariableDeclaration"
    );
}

#[test]
fn for_of_emits_iteration_condition_edges() {
    let ast = func(
        "f",
        vec![AstNode::new("ForOfStatement")
            .with_left(AstNode::new("VariableDeclaration").with_name("item"))
            .with_right(ident("items"))
            .with_stmt(expr_stmt(call("body")))],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    assert_eq!(count_kind(&cfg, EdgeKind::CondTrue), 1);
    assert_eq!(count_kind(&cfg, EdgeKind::CondFalse), 1);
    assert_eq!(count_kind(&cfg, EdgeKind::Loop), 1);
}

#[test]
fn break_targets_loop_exit_continue_targets_header() {
    let ast = func(
        "f",
        vec![AstNode::new("WhileStatement").with_test(ident("x")).with_stmt(
            AstNode::new("IfStatement")
                .with_test(ident("y"))
                .with_consequent(AstNode::new("BreakStatement"))
                .with_alternate(AstNode::new("ContinueStatement")),
        )],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    let brk = cfg.edges().find(|e| e.kind == EdgeKind::Break).unwrap();
    assert!(cfg.block(brk.to).label.starts_with("while_exit"));
    let cont = cfg.edges().find(|e| e.kind == EdgeKind::Continue).unwrap();
    assert!(cfg.block(cont.to).label.starts_with("while_header"));
}

// ─── Switch ────────────────────────────────────────────────────────────────

fn switch_case(test: Option<AstNode>, stmts: Vec<AstNode>) -> AstNode {
    let mut case = AstNode::new("SwitchCase");
    if let Some(t) = test {
        case = case.with_test(t);
    }
    for s in stmts {
        case = case.with_stmt(s);
    }
    case
}

#[test]
fn switch_cases_get_cond_edges_and_fallthrough() {
    let ast = func(
        "f",
        vec![AstNode::new("SwitchStatement")
            .with_test(ident("x"))
            .with_case(switch_case(Some(ident("a")), vec![expr_stmt(call("one"))]))
            .with_case(switch_case(
                Some(ident("b")),
                vec![expr_stmt(call("two")), AstNode::new("BreakStatement")],
            ))
            .with_case(switch_case(None, vec![expr_stmt(call("dflt"))]))],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    // Two non-default cases get CondTrue, the default gets CondFalse.
    assert_eq!(count_kind(&cfg, EdgeKind::CondTrue), 2);
    assert_eq!(count_kind(&cfg, EdgeKind::CondFalse), 1);
    // Case one falls through to case two.
    let fallthrough = cfg
        .edges()
        .find(|e| {
            e.kind == EdgeKind::Normal
                && cfg.block(e.from).label.starts_with("switch_case")
                && cfg.block(e.to).label.starts_with("switch_case")
        })
        .expect("fallthrough edge");
    assert!(cfg.block(fallthrough.from).label.ends_with("_0"));
    // Case two breaks to the merge.
    let brk = cfg.edges().find(|e| e.kind == EdgeKind::Break).unwrap();
    assert!(cfg.block(brk.to).label.starts_with("switch_merge"));
}

#[test]
fn switch_without_default_falls_to_merge() {
    let ast = func(
        "f",
        vec![AstNode::new("SwitchStatement")
            .with_test(ident("x"))
            .with_case(switch_case(Some(ident("a")), vec![AstNode::new("BreakStatement")]))],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    let cond_false = cfg.edges().find(|e| e.kind == EdgeKind::CondFalse).unwrap();
    assert!(cfg.block(cond_false.to).label.starts_with("switch_merge"));
}

// ─── Try / catch / finally ─────────────────────────────────────────────────

fn try_stmt(body: Vec<AstNode>, catch: Option<Vec<AstNode>>, finally: Option<Vec<AstNode>>) -> AstNode {
    let mut t = AstNode::new("TryStatement");
    for s in body {
        t = t.with_stmt(s);
    }
    if let Some(stmts) = catch {
        let mut clause = AstNode::new("CatchClause").with_param(ident("e"));
        for s in stmts {
            clause = clause.with_stmt(s);
        }
        t = t.with_handler(clause);
    }
    if let Some(stmts) = finally {
        let mut block = AstNode::new("BlockStatement");
        for s in stmts {
            block = block.with_stmt(s);
        }
        t = t.with_finalizer(block);
    }
    t
}

#[test]
fn try_catch_gets_exception_edge() {
    let ast = func(
        "f",
        vec![try_stmt(
            vec![expr_stmt(call("risky"))],
            Some(vec![expr_stmt(call("recover"))]),
            None,
        )],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    let exc = cfg.edges().find(|e| e.kind == EdgeKind::Exception).unwrap();
    assert!(cfg.block(exc.from).label.starts_with("try_body"));
    assert!(cfg.block(exc.to).label.starts_with("catch"));
}

#[test]
fn try_finally_funnels_both_tails() {
    let ast = func(
        "f",
        vec![try_stmt(
            vec![expr_stmt(call("risky"))],
            Some(vec![expr_stmt(call("recover"))]),
            Some(vec![expr_stmt(call("cleanup"))]),
        )],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    let finally = cfg.blocks().find(|b| b.label.starts_with("finally")).unwrap();
    // Both the try tail and the catch tail flow into finally.
    assert_eq!(cfg.predecessors(finally.id).count(), 2);
    // Finally flows to the merge.
    let out = cfg.successors(finally.id).next().unwrap();
    assert_eq!(out.kind, EdgeKind::Normal);
    assert!(cfg.block(out.to).label.starts_with("try_merge"));
}

#[test]
fn throw_targets_nearest_catch() {
    let ast = func(
        "f",
        vec![try_stmt(
            vec![AstNode::new("ThrowStatement").with_argument(ident("err"))],
            Some(vec![expr_stmt(call("recover"))]),
            None,
        )],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    let exceptions: Vec<_> = cfg.edges().filter(|e| e.kind == EdgeKind::Exception).collect();
    // One structural edge plus the throw itself, both into the catch.
    assert_eq!(exceptions.len(), 2);
    for e in exceptions {
        assert!(cfg.block(e.to).label.starts_with("catch"));
    }
}

#[test]
fn throw_outside_try_targets_exit() {
    let ast = func("f", vec![AstNode::new("ThrowStatement").with_argument(ident("err"))]);
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    let exc = cfg.edges().find(|e| e.kind == EdgeKind::Exception).unwrap();
    assert_eq!(exc.to, cfg.exit);
}

// ─── Returns and dead cursors ──────────────────────────────────────────────

#[test]
fn return_edge_goes_to_exit() {
    let cfg = CfgBuilder::new().build(&func("f", vec![ret()])).unwrap();
    let r = cfg.edges().find(|e| e.kind == EdgeKind::Return).unwrap();
    assert_eq!(r.to, cfg.exit);
}

#[test]
fn two_returns_two_return_edges() {
    let ast = func(
        "f",
        vec![
            AstNode::new("IfStatement")
                .with_test(ident("x"))
                .with_consequent(ret())
                .with_alternate(ret()),
        ],
    );
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    assert_eq!(count_kind(&cfg, EdgeKind::Return), 2);
}

#[test]
fn statements_after_return_land_in_unreachable_block() {
    let ast = func("f", vec![ret(), expr_stmt(call("dead"))]);
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    let dead = cfg.blocks().find(|b| b.label.starts_with("unreachable")).unwrap();
    assert_eq!(dead.statements.len(), 1);
    assert_eq!(dead.fallthrough_from, Some(cfg.entry));
}

#[test]
fn jump_terminated_function_creates_no_empty_dead_block() {
    let ast = func("f", vec![expr_stmt(call("a")), ret()]);
    let cfg = CfgBuilder::new().build(&ast).unwrap();
    assert!(cfg.blocks().all(|b| !b.label.starts_with("unreachable")));
}

// ─── build_all ─────────────────────────────────────────────────────────────

#[test]
fn build_all_registers_main_and_discovers_functions() {
    let program = AstNode::new("Program")
        .with_stmt(func("top", vec![ret()]))
        .with_stmt(expr_stmt(
            AstNode::new("CallExpression")
                .with_callee(ident("register"))
                .with_arg(
                    AstNode::new("ArrowFunctionExpression")
                        .with_location(loc(7, 9))
                        .with_stmt(ret()),
                ),
        ));
    let cfgs = CfgBuilder::new().build_all(&program).unwrap();
    assert!(cfgs.contains_key("__main__"));
    assert!(cfgs.contains_key("top"));
    assert!(cfgs.contains_key("anonymous_7"), "keys: {:?}", cfgs.keys().collect::<Vec<_>>());
}

#[test]
fn build_all_disambiguates_name_collisions() {
    let program = AstNode::new("Program")
        .with_stmt(func("f", vec![ret()]))
        .with_stmt(func("f", vec![ret()]));
    let cfgs = CfgBuilder::new().build_all(&program).unwrap();
    assert!(cfgs.contains_key("f"));
    assert!(cfgs.contains_key("f_2"));
}

#[test]
fn nested_function_is_one_statement_in_outer_cfg() {
    let inner = func("inner", vec![ret()]);
    let outer = func("outer", vec![inner, ret()]);
    let cfg = CfgBuilder::new().build(&outer).unwrap();
    // The inner function does not add blocks to the outer CFG.
    assert_eq!(cfg.block_count(), 2);
    assert_eq!(cfg.block(cfg.entry).statements.len(), 2);
}
