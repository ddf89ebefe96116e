//! CfgBuilder: statement-directed CFG construction.
//!
//! The builder keeps a mutable "current block" cursor and two stacks:
//! a frame stack for break/continue targets (loops and switches) and a
//! try stack for exception targets. After a jump the cursor is marked
//! dead; the `unreachable_*` landing block is only materialized when a
//! statement actually follows, so jump-terminated functions stay fully
//! reachable.

use std::collections::BTreeMap;

use facet_core::errors::AnalysisError;
use facet_core::types::ast::AstNode;
use facet_core::types::collections::FxHashSet;

use super::types::{BlockId, Cfg, EdgeKind};

/// Break/continue target frame. Switches push a frame with no header:
/// `break` targets the innermost frame of either kind, `continue` only
/// frames that have a header.
struct JumpFrame {
    header: Option<BlockId>,
    exit: BlockId,
}

/// Exception target frame for an enclosing try statement.
struct TryFrame {
    catch: Option<BlockId>,
    finally: Option<BlockId>,
}

/// Builds control-flow graphs from function or program ASTs.
#[derive(Debug, Default)]
pub struct CfgBuilder;

impl CfgBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the CFG for a single function node.
    ///
    /// Fails on nodes that are neither function-like nor a program root.
    pub fn build(&self, function: &AstNode) -> Result<Cfg, AnalysisError> {
        if !function.kind.is_function() && !function.kind.is_program() {
            return Err(AnalysisError::build_failure(
                function.name.as_deref().unwrap_or("<unnamed>"),
                format!("expected a function or program node, got {}", function.kind),
            ));
        }
        let name = resolve_name(function);
        let mut state = BuildState::new(&name);
        if function.kind.is_function() {
            state.cfg.function_location = Some(function.location.clone());
        }
        state.process_statements(&function.body);
        Ok(state.finish())
    }

    /// Build CFGs for every function in a program, plus `__main__` for
    /// the top level. Individual function failures are logged and
    /// skipped; only an unusable input is fatal.
    pub fn build_all(&self, program: &AstNode) -> Result<BTreeMap<String, Cfg>, AnalysisError> {
        let mut cfgs = BTreeMap::new();

        let mut main_state = BuildState::new("__main__");
        main_state.process_statements(&program.body);
        if program.body.is_empty() {
            main_state.process_statements(&program.children);
        }
        cfgs.insert("__main__".to_string(), main_state.finish());

        // Discover every function in the tree, including ones nested in
        // variable declarations, object literals, and call arguments.
        let mut functions: Vec<&AstNode> = Vec::new();
        collect_functions(program, &mut functions);

        let mut taken: FxHashSet<String> = FxHashSet::default();
        taken.insert("__main__".to_string());
        for func in functions {
            let base = resolve_name(func);
            let name = disambiguate(&base, &mut taken);
            match self.build(func) {
                Ok(mut cfg) => {
                    cfg.name = name.clone();
                    cfgs.insert(name, cfg);
                }
                Err(e) => {
                    tracing::warn!(function = %base, error = %e, "skipping function: CFG build failed");
                }
            }
        }
        Ok(cfgs)
    }
}

/// Resolved CFG name: the function's own name, else `anonymous_<line>`.
fn resolve_name(node: &AstNode) -> String {
    if node.kind.is_program() {
        return "__main__".to_string();
    }
    match &node.name {
        Some(name) if !name.is_empty() => name.clone(),
        _ => format!("anonymous_{}", node.location.start_line),
    }
}

fn disambiguate(base: &str, taken: &mut FxHashSet<String>) -> String {
    if taken.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{base}_{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn collect_functions<'a>(node: &'a AstNode, out: &mut Vec<&'a AstNode>) {
    for child in node.slots() {
        if child.kind.is_function() {
            out.push(child);
        }
        collect_functions(child, out);
    }
}

struct BuildState {
    cfg: Cfg,
    current: BlockId,
    /// Set after a jump: the block whose trailing jump killed the
    /// cursor. The next statement materializes the landing block.
    pending_dead: Option<BlockId>,
    jump_stack: Vec<JumpFrame>,
    try_stack: Vec<TryFrame>,
    counter: u32,
}

impl BuildState {
    fn new(name: &str) -> Self {
        let cfg = Cfg::new(name);
        let current = cfg.entry;
        Self {
            cfg,
            current,
            pending_dead: None,
            jump_stack: Vec::new(),
            try_stack: Vec::new(),
            counter: 0,
        }
    }

    fn next_id(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }

    /// Move the cursor, dropping any pending dead region.
    fn set_cursor(&mut self, block: BlockId) {
        self.pending_dead = None;
        self.current = block;
    }

    /// Materialize the dead landing block if a jump left one pending.
    fn materialize_dead(&mut self) {
        if let Some(origin) = self.pending_dead.take() {
            let n = self.next_id();
            let dead = self.cfg.add_block(format!("unreachable_{n}"));
            self.cfg.block_mut(dead).fallthrough_from = Some(origin);
            self.current = dead;
        }
    }

    /// Seal the build: a dangling cursor flows to exit.
    fn finish(mut self) -> Cfg {
        if self.pending_dead.is_none()
            && self.current != self.cfg.exit
            && self.cfg.block(self.current).successors.is_empty()
        {
            self.cfg.connect(self.current, self.cfg.exit, EdgeKind::Normal);
        }
        self.cfg
    }

    fn process_statements(&mut self, stmts: &[AstNode]) {
        for stmt in stmts {
            self.process_statement(stmt);
        }
    }

    fn process_statement(&mut self, stmt: &AstNode) {
        self.materialize_dead();
        match stmt.kind.as_str() {
            "BlockStatement" => self.process_statements(&stmt.body),
            "IfStatement" => self.handle_if(stmt),
            "WhileStatement" => self.handle_while(stmt),
            "DoWhileStatement" => self.handle_do_while(stmt),
            "ForStatement" | "ForInStatement" | "ForOfStatement" => self.handle_for(stmt),
            "SwitchStatement" => self.handle_switch(stmt),
            "TryStatement" => self.handle_try(stmt),
            "ReturnStatement" | "BreakStatement" | "ContinueStatement" | "ThrowStatement" => {
                self.handle_jump(stmt)
            }
            // Nested functions and classes are a single statement here;
            // build_all gives each its own CFG.
            _ => self.cfg.push_statement(self.current, stmt.clone()),
        }
    }

    /// Seal a branch tail: unless it ended in a jump (whose edge was
    /// emitted when the jump statement was processed), it flows to
    /// `target`.
    fn seal(&mut self, target: BlockId, kind: EdgeKind) {
        if self.pending_dead.is_some() {
            return;
        }
        if !self.cfg.ends_in_jump(self.current) && !self.cfg.has_edge(self.current, target) {
            self.cfg.connect(self.current, target, kind);
        }
    }

    fn handle_if(&mut self, stmt: &AstNode) {
        let n = self.next_id();
        if let Some(test) = &stmt.test {
            self.cfg.push_statement(self.current, (**test).clone());
        }
        let cond = self.current;
        let then_block = self.cfg.add_block(format!("if_then_{n}"));
        let merge = self.cfg.add_block(format!("if_merge_{n}"));
        self.cfg.connect(cond, then_block, EdgeKind::CondTrue);

        let else_block = if stmt.alternate.is_some() {
            let b = self.cfg.add_block(format!("if_else_{n}"));
            self.cfg.connect(cond, b, EdgeKind::CondFalse);
            Some(b)
        } else {
            self.cfg.connect(cond, merge, EdgeKind::CondFalse);
            None
        };

        self.set_cursor(then_block);
        if let Some(consequent) = &stmt.consequent {
            self.process_statement(consequent);
        }
        self.seal(merge, EdgeKind::Normal);

        if let (Some(else_block), Some(alternate)) = (else_block, &stmt.alternate) {
            self.set_cursor(else_block);
            self.process_statement(alternate);
            self.seal(merge, EdgeKind::Normal);
        }
        self.set_cursor(merge);
    }

    fn handle_while(&mut self, stmt: &AstNode) {
        let n = self.next_id();
        let header = self.cfg.add_block(format!("while_header_{n}"));
        let body = self.cfg.add_block(format!("while_body_{n}"));
        self.cfg.connect(self.current, header, EdgeKind::Normal);

        let exit = if let Some(test) = &stmt.test {
            let exit = self.cfg.add_block(format!("while_exit_{n}"));
            self.cfg.push_statement(header, (**test).clone());
            self.cfg.connect(header, body, EdgeKind::CondTrue);
            self.cfg.connect(header, exit, EdgeKind::CondFalse);
            exit
        } else {
            // No test: only a break can leave the loop.
            let exit = self.cfg.add_block(format!("while_exit_unreachable_{n}"));
            self.cfg.connect(header, body, EdgeKind::Normal);
            exit
        };

        self.jump_stack.push(JumpFrame {
            header: Some(header),
            exit,
        });
        self.set_cursor(body);
        self.process_statements(&stmt.body);
        self.seal(header, EdgeKind::Loop);
        self.jump_stack.pop();
        self.set_cursor(exit);
    }

    fn handle_do_while(&mut self, stmt: &AstNode) {
        let n = self.next_id();
        let body = self.cfg.add_block(format!("do_body_{n}"));
        let header = self.cfg.add_block(format!("do_header_{n}"));
        let exit = self.cfg.add_block(format!("do_exit_{n}"));

        // Body runs first; the header carries the test after it.
        self.cfg.connect(self.current, body, EdgeKind::Normal);
        self.jump_stack.push(JumpFrame {
            header: Some(header),
            exit,
        });
        self.set_cursor(body);
        self.process_statements(&stmt.body);
        self.seal(header, EdgeKind::Normal);
        self.jump_stack.pop();

        if let Some(test) = &stmt.test {
            self.cfg.push_statement(header, (**test).clone());
        }
        self.cfg.connect(header, body, EdgeKind::CondTrue);
        self.cfg.connect(header, exit, EdgeKind::CondFalse);
        self.set_cursor(exit);
    }

    fn handle_for(&mut self, stmt: &AstNode) {
        let n = self.next_id();
        let is_plain_for = stmt.kind == "ForStatement";

        // Init (plain for) or iteration variable + iterable (for-in/of)
        // run once, before the header.
        if is_plain_for {
            if let Some(init) = &stmt.init {
                self.cfg.push_statement(self.current, (**init).clone());
            }
        } else {
            if let Some(left) = &stmt.left {
                self.cfg.push_statement(self.current, (**left).clone());
            }
            if let Some(right) = &stmt.right {
                self.cfg.push_statement(self.current, (**right).clone());
            }
        }

        let header = self.cfg.add_block(format!("for_header_{n}"));
        let body = self.cfg.add_block(format!("for_body_{n}"));
        self.cfg.connect(self.current, header, EdgeKind::Normal);

        let exit = if is_plain_for && stmt.test.is_none() {
            // `for (;;)`: the exit is only reachable through a break.
            let exit = self.cfg.add_block(format!("for_exit_unreachable_{n}"));
            self.cfg.connect(header, body, EdgeKind::Normal);
            exit
        } else {
            let exit = self.cfg.add_block(format!("for_exit_{n}"));
            if let Some(test) = &stmt.test {
                self.cfg.push_statement(header, (**test).clone());
            }
            self.cfg.connect(header, body, EdgeKind::CondTrue);
            self.cfg.connect(header, exit, EdgeKind::CondFalse);
            exit
        };

        self.jump_stack.push(JumpFrame {
            header: Some(header),
            exit,
        });
        self.set_cursor(body);
        self.process_statements(&stmt.body);
        // The update expression belongs to the body tail, ahead of the
        // back-edge.
        if let Some(update) = &stmt.update {
            if self.pending_dead.is_none() && !self.cfg.ends_in_jump(self.current) {
                self.cfg.push_statement(self.current, (**update).clone());
            }
        }
        self.seal(header, EdgeKind::Loop);
        self.jump_stack.pop();
        self.set_cursor(exit);
    }

    fn handle_switch(&mut self, stmt: &AstNode) {
        let n = self.next_id();
        if let Some(discriminant) = &stmt.test {
            self.cfg.push_statement(self.current, (**discriminant).clone());
        }
        let test_block = self.current;
        let merge = self.cfg.add_block(format!("switch_merge_{n}"));

        let case_blocks: Vec<(BlockId, &AstNode)> = stmt
            .cases
            .iter()
            .enumerate()
            .map(|(i, case)| {
                let label = if case.test.is_some() {
                    format!("switch_case_{n}_{i}")
                } else {
                    format!("switch_default_{n}")
                };
                (self.cfg.add_block(label), case)
            })
            .collect();

        let mut has_default = false;
        for (block, case) in &case_blocks {
            if case.test.is_some() {
                self.cfg.connect(test_block, *block, EdgeKind::CondTrue);
            } else {
                has_default = true;
                self.cfg.connect(test_block, *block, EdgeKind::CondFalse);
            }
        }
        if !has_default {
            self.cfg.connect(test_block, merge, EdgeKind::CondFalse);
        }

        // `break` inside a case targets the merge block.
        self.jump_stack.push(JumpFrame {
            header: None,
            exit: merge,
        });
        for (i, (block, case)) in case_blocks.iter().enumerate() {
            self.set_cursor(*block);
            if let Some(test) = &case.test {
                self.cfg.push_statement(*block, (**test).clone());
            }
            self.process_statements(&case.body);
            // A case without a break falls through to the next case.
            let next = case_blocks.get(i + 1).map(|(b, _)| *b).unwrap_or(merge);
            self.seal(next, EdgeKind::Normal);
        }
        self.jump_stack.pop();
        self.set_cursor(merge);
    }

    fn handle_try(&mut self, stmt: &AstNode) {
        let n = self.next_id();
        let try_block = self.cfg.add_block(format!("try_body_{n}"));
        self.cfg.connect(self.current, try_block, EdgeKind::Normal);

        let catch_block = stmt
            .handler
            .as_ref()
            .map(|_| self.cfg.add_block(format!("catch_{n}")));
        let finally_block = stmt
            .finalizer
            .as_ref()
            .map(|_| self.cfg.add_block(format!("finally_{n}")));
        let merge = self.cfg.add_block(format!("try_merge_{n}"));
        let after = finally_block.unwrap_or(merge);

        if let Some(catch) = catch_block {
            self.cfg.connect(try_block, catch, EdgeKind::Exception);
        }

        self.try_stack.push(TryFrame {
            catch: catch_block,
            finally: finally_block,
        });
        self.set_cursor(try_block);
        self.process_statements(&stmt.body);
        self.seal(after, EdgeKind::Normal);
        self.try_stack.pop();

        if let (Some(catch), Some(handler)) = (catch_block, &stmt.handler) {
            self.set_cursor(catch);
            self.process_statements(&handler.body);
            self.seal(after, EdgeKind::Normal);
        }
        if let (Some(finally), Some(finalizer)) = (finally_block, &stmt.finalizer) {
            self.set_cursor(finally);
            self.process_statements(&finalizer.body);
            self.seal(merge, EdgeKind::Normal);
        }
        self.set_cursor(merge);
    }

    fn handle_jump(&mut self, stmt: &AstNode) {
        self.cfg.push_statement(self.current, stmt.clone());

        let (target, kind) = match stmt.kind.as_str() {
            "ReturnStatement" => (self.cfg.exit, EdgeKind::Return),
            "BreakStatement" => {
                let target = self
                    .jump_stack
                    .last()
                    .map(|f| f.exit)
                    .unwrap_or(self.cfg.exit);
                (target, EdgeKind::Break)
            }
            "ContinueStatement" => {
                let target = self
                    .jump_stack
                    .iter()
                    .rev()
                    .find_map(|f| f.header)
                    .unwrap_or(self.cfg.exit);
                (target, EdgeKind::Continue)
            }
            _ => {
                // Throw: nearest catch, else nearest finally, else exit.
                let target = self
                    .try_stack
                    .iter()
                    .rev()
                    .find_map(|f| f.catch.or(f.finally))
                    .unwrap_or(self.cfg.exit);
                (target, EdgeKind::Exception)
            }
        };
        self.cfg.connect(self.current, target, kind);

        // Anything after this statement is dead; remember the origin so
        // the landing block (if one is ever needed) can say who
        // orphaned it.
        self.pending_dead = Some(self.current);
    }
}
