//! End-to-end pipeline scenarios.

use facet_analysis::cfg::dead_code::{DeadCodeReason, Severity};
use facet_analysis::pipeline::AnalysisPipeline;
use facet_core::cancel::CancelToken;
use facet_core::config::FacetConfig;
use facet_core::types::ast::{AstNode, SourceLocation};
use facet_core::types::collections::FxHashMap;

// ─── Helpers ───────────────────────────────────────────────────────────────

fn ident(name: &str) -> AstNode {
    AstNode::new("Identifier").with_name(name)
}

fn lit(value: &str) -> AstNode {
    AstNode::new("Literal").with_value(value)
}

fn gt(left: AstNode, right: AstNode) -> AstNode {
    AstNode::new("BinaryExpression")
        .with_value(">")
        .with_left(left)
        .with_right(right)
}

fn ret(arg: AstNode) -> AstNode {
    AstNode::new("ReturnStatement").with_argument(arg)
}

fn import_named(source: &str, locals: &[&str]) -> AstNode {
    let mut decl = AstNode::new("ImportDeclaration").with_value(source);
    for local in locals {
        decl = decl.with_spec(AstNode::new("ImportSpecifier").with_name(*local));
    }
    decl
}

fn program(stmts: Vec<AstNode>) -> AstNode {
    let mut p = AstNode::new("Program");
    for s in stmts {
        p = p.with_stmt(s);
    }
    p
}

fn run(files: FxHashMap<String, AstNode>) -> facet_analysis::pipeline::ProjectAnalysis {
    AnalysisPipeline::new(FacetConfig::default())
        .analyze(&files, &CancelToken::new())
        .unwrap()
}

fn single_file(ast: AstNode) -> FxHashMap<String, AstNode> {
    let mut files = FxHashMap::default();
    files.insert("src/main.ts".to_string(), ast);
    files
}

// ─── Scenario 1: branch with two returns ───────────────────────────────────

#[test]
fn branchy_function_is_complexity_two_fully_reachable() {
    // f(x) { if (x > 0) return 1; return 0; }
    let f = AstNode::new("FunctionDeclaration")
        .with_name("f")
        .with_location(SourceLocation::new("src/main.ts", 1, 4))
        .with_param(ident("x"))
        .with_stmt(
            AstNode::new("IfStatement")
                .with_test(gt(ident("x"), lit("0")))
                .with_consequent(ret(lit("1"))),
        )
        .with_stmt(ret(lit("0")));

    let result = run(single_file(program(vec![f])));
    let file = &result.files[0];
    let f = file.functions.iter().find(|func| func.name == "f").unwrap();
    assert_eq!(f.complexity.complexity, 2);
    assert_eq!(f.reachability_ratio, 1.0);
    assert!(f.dead_code.is_empty());
    assert!(file.error.is_none());
}

// ─── Scenario 2: statement after return ────────────────────────────────────

#[test]
fn statement_after_return_is_critical_dead_code() {
    // f() { return 1; console.log("x"); }
    let log = AstNode::new("ExpressionStatement")
        .with_location(SourceLocation::new("src/main.ts", 2, 2))
        .with_child(
            AstNode::new("CallExpression")
                .with_callee(
                    AstNode::new("MemberExpression")
                        .with_object(ident("console"))
                        .with_property(ident("log")),
                )
                .with_arg(lit("\"x\"")),
        );
    let f = AstNode::new("FunctionDeclaration")
        .with_name("f")
        .with_stmt(ret(lit("1")))
        .with_stmt(log);

    let result = run(single_file(program(vec![f])));
    let f = result.files[0].functions.iter().find(|func| func.name == "f").unwrap();
    assert_eq!(f.complexity.complexity, 1);
    assert_eq!(f.dead_code.len(), 1);
    assert_eq!(f.dead_code[0].reason, DeadCodeReason::UnreachableAfterReturn);
    assert_eq!(f.dead_code[0].severity, Severity::Critical);
    assert!(f.reachability_ratio < 1.0);
}

// ─── Scenario 3: dead call after exhaustive if/else ────────────────────────

#[test]
fn call_after_exhaustive_branches_is_unreachable() {
    // f(x) { if (x) return 1; else return 0; dead(); }
    let dead = AstNode::new("ExpressionStatement")
        .with_location(SourceLocation::new("src/main.ts", 5, 5))
        .with_child(AstNode::new("CallExpression").with_callee(ident("dead")));
    let f = AstNode::new("FunctionDeclaration")
        .with_name("f")
        .with_param(ident("x"))
        .with_stmt(
            AstNode::new("IfStatement")
                .with_test(ident("x"))
                .with_consequent(ret(lit("1")))
                .with_alternate(ret(lit("0"))),
        )
        .with_stmt(dead);

    let result = run(single_file(program(vec![f])));
    let f = result.files[0].functions.iter().find(|func| func.name == "f").unwrap();
    assert_eq!(f.dead_code.len(), 1);
    assert!(f.reachability_ratio < 1.0);
}

// ─── Scenario 4: two-module cycle ──────────────────────────────────────────

#[test]
fn mutual_imports_form_low_severity_cycle() {
    let mut files = FxHashMap::default();
    files.insert(
        "a.js".to_string(),
        program(vec![import_named("./b", &["fromB"])]),
    );
    files.insert(
        "b.js".to_string(),
        program(vec![import_named("./a", &["fromA"])]),
    );
    let result = run(files);
    assert_eq!(result.cycles.cycles.len(), 1);
    let cycle = &result.cycles.cycles[0];
    assert_eq!(cycle.modules, vec!["a.js", "b.js"]);
    assert_eq!(
        cycle.severity,
        facet_analysis::graph::cycles::CycleSeverity::Low
    );
    let brk = cycle.suggested_break.as_ref().unwrap();
    assert_eq!(brk.weight, 1);
}

// ─── Scenario 5: externals excluded ────────────────────────────────────────

#[test]
fn external_package_is_absent_from_graph_metrics() {
    let mut files = FxHashMap::default();
    files.insert(
        "a.js".to_string(),
        program(vec![
            import_named("react", &["useState"]),
            import_named("./b", &["helper"]),
        ]),
    );
    files.insert("b.js".to_string(), program(vec![]));
    let result = run(files);

    let modules: Vec<&str> = result.coupling.iter().map(|m| m.module.as_str()).collect();
    assert_eq!(modules, vec!["a.js", "b.js"]);
    let a = &result.coupling[0];
    assert_eq!(a.ce, 1, "react must not contribute an edge");
    // CBO still sees the package dependency.
    assert_eq!(result.cbo[0].cbo, 2);
}

// ─── Scenario 6 is covered in apted_test.rs ────────────────────────────────

// ─── Cross-cutting behavior ────────────────────────────────────────────────

#[test]
fn unused_import_and_orphan_show_up_in_project_analysis() {
    let mut files = FxHashMap::default();
    files.insert(
        "src/index.ts".to_string(),
        program(vec![import_named("./used", &["x", "neverCalled"])]),
    );
    files.insert(
        "src/used.ts".to_string(),
        program(vec![
            AstNode::new("ExportNamedDeclaration")
                .with_decl(AstNode::new("FunctionDeclaration").with_name("x")),
            AstNode::new("ExportNamedDeclaration")
                .with_decl(AstNode::new("FunctionDeclaration").with_name("neverCalled")),
        ]),
    );
    files.insert("src/island.ts".to_string(), program(vec![import_named("./island2", &["y"])]));
    files.insert("src/island2.ts".to_string(), program(vec![import_named("./island", &["z"])]));

    let result = run(files);
    // index imports two names but uses neither in code; both flagged.
    assert_eq!(result.unused.unused_imports.len(), 2);
    assert_eq!(
        result.unused.orphan_files,
        vec!["src/island.ts".to_string(), "src/island2.ts".to_string()]
    );
}

#[test]
fn empty_and_odd_files_analyze_without_failing_the_run() {
    let mut files = FxHashMap::default();
    files.insert("good.ts".to_string(), program(vec![ret(lit("1"))]));
    files.insert("odd.ts".to_string(), AstNode::new("Program"));
    let result = run(files);
    assert_eq!(result.files.len(), 2);
    assert!(result.files.iter().all(|f| f.error.is_none()));
    let odd = result.files.iter().find(|f| f.file == "odd.ts").unwrap();
    // The empty program still gets a fully-reachable __main__.
    assert_eq!(odd.functions.len(), 1);
    assert_eq!(odd.functions[0].reachability_ratio, 1.0);
}

#[test]
fn cancellation_surfaces_as_error() {
    let token = CancelToken::new();
    token.cancel();
    let files = single_file(program(vec![]));
    let err = AnalysisPipeline::new(FacetConfig::default())
        .analyze(&files, &token)
        .unwrap_err();
    assert!(err.to_string().contains("Cancelled"));
}

#[test]
fn file_paths_are_slash_normalized() {
    let mut files = FxHashMap::default();
    files.insert("src\\win\\style.ts".to_string(), program(vec![]));
    let result = run(files);
    assert_eq!(result.files[0].file, "src/win/style.ts");
}

#[test]
fn timings_are_recorded() {
    let result = run(single_file(program(vec![ret(lit("1"))])));
    assert!(result.timings.total_us >= result.timings.clone_phase_us);
}

// ─── Custom AST providers ──────────────────────────────────────────────────

struct SourcedProvider {
    files: FxHashMap<String, AstNode>,
    sources: FxHashMap<String, String>,
}

impl facet_core::traits::AstProvider for SourcedProvider {
    fn files(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    fn ast(&self, file: &str) -> Option<&AstNode> {
        self.files.get(file)
    }

    fn source_text(&self, file: &str) -> Option<&str> {
        self.sources.get(file).map(String::as_str)
    }
}

#[test]
fn provider_source_text_enables_type_only_detection() {
    // The AST carries no type marker; only the raw source line does.
    let ast = program(vec![
        import_named("./types", &["Props"]).with_location(SourceLocation::new("src/main.ts", 1, 1)),
    ]);
    let mut files = FxHashMap::default();
    files.insert("src/main.ts".to_string(), ast);
    let mut sources = FxHashMap::default();
    sources.insert(
        "src/main.ts".to_string(),
        "import type { Props } from './types';\n".to_string(),
    );
    let provider = SourcedProvider { files, sources };

    let result = AnalysisPipeline::new(FacetConfig::default())
        .analyze(&provider, &CancelToken::new())
        .unwrap();
    let import = &result.files[0].module.imports[0];
    assert!(import.is_type_only);
    // Type-only imports are exempt from unused-import findings.
    assert!(result.unused.unused_imports.is_empty());
}
