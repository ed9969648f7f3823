// AST to Lua lowering.
//
// A `Compiler` owns the parser, the scope stack and the per-run
// emission state. Transform methods append Lua fragments to an output
// segment list which is concatenated once at the end; every construct
// is lowered under an `ExpUsage` describing the position it appears in.

mod assign;
mod chain;
mod class;
mod cond;
mod expr;
mod loops;
mod scope;
mod stmt;

pub use scope::{ExportMode, Scope, ScopeStack};

use crate::ast::*;
use crate::config::{CompilerConfig, GlobalVar};
use crate::error::{CompileError, format_at};
use crate::grammar::MoonParser;
use crate::parser::InputRange;
use ahash::AHashMap;
use smol_str::SmolStr;

/// How the value of a lowered construct is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpUsage {
    /// Result discarded; emit statements directly.
    Common,
    /// Prepend `return`.
    Return,
    /// Assign into a caller-provided expression list.
    Assignment,
    /// Wrap in `(function() ... end)()` to yield a value in expression
    /// position.
    Closure,
}

pub struct CompileOutput {
    pub code: String,
    pub globals: Vec<GlobalVar>,
}

/// One compiler instance handles one compilation at a time; it is not
/// reentrant, create separate instances for concurrent compiles.
pub struct Compiler {
    parser: MoonParser,
    pub(crate) config: CompilerConfig,
    pub(crate) input: Vec<char>,
    pub(crate) scopes: ScopeStack,
    pub(crate) indent_offset: i32,
    pub(crate) with_vars: Vec<String>,
    pub(crate) continue_vars: Vec<String>,
    pub(crate) globals: AHashMap<SmolStr, (usize, usize)>,
    pub(crate) lint: bool,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Compiler {
        Compiler {
            parser: MoonParser::new(),
            config,
            input: Vec::new(),
            scopes: ScopeStack::new(),
            indent_offset: 0,
            with_vars: Vec::new(),
            continue_vars: Vec::new(),
            globals: AHashMap::new(),
            lint: false,
        }
    }

    pub fn compile(&mut self, source: &str) -> Result<CompileOutput, CompileError> {
        self.input = source.chars().collect();
        self.scopes.clear();
        self.indent_offset = 0;
        self.with_vars.clear();
        self.continue_vars.clear();
        self.globals.clear();
        self.lint = self.config.lint_global_variable;

        let info = match self.parser.parse_chars(&self.input) {
            Ok(info) => info,
            Err(err) => {
                let message = format_at(
                    &self.input,
                    err.message(),
                    err.pos.line,
                    err.pos.col,
                    self.config.line_offset,
                );
                return Err(CompileError::Parse {
                    message,
                    line: err.pos.line,
                    col: err.pos.col,
                });
            }
        };

        let mut out = Vec::new();
        self.scopes.push();
        let implicit_return = self.config.implicit_return_root;
        let result = self.transform_block(info.root.block, &mut out, implicit_return);
        self.scopes.pop();
        result?;

        let line_offset = self.config.line_offset;
        let mut globals: Vec<GlobalVar> = self
            .globals
            .iter()
            .map(|(name, (line, col))| GlobalVar {
                name: name.clone(),
                line: line + line_offset,
                col: *col,
            })
            .collect();
        globals.sort_by(|a, b| (a.line, a.col, &a.name).cmp(&(b.line, b.col, &b.name)));
        Ok(CompileOutput {
            code: out.concat(),
            globals,
        })
    }

    // Emission helpers.

    pub(crate) fn indent_level(&self, offset: i32) -> String {
        let level = self.scopes.len() as i32 - 1 + self.indent_offset + offset;
        let level = level.max(0) as usize;
        if self.config.use_space_over_tab {
            "  ".repeat(level)
        } else {
            "\t".repeat(level)
        }
    }

    pub(crate) fn indent(&self) -> String {
        self.indent_level(0)
    }

    /// Line terminator carrying the node's starting source line.
    pub(crate) fn nll(&self, range: InputRange) -> String {
        if self.config.reserve_line_number {
            let mut buffer = itoa::Buffer::new();
            format!(
                " -- {}\n",
                buffer.format(range.begin.line + self.config.line_offset)
            )
        } else {
            String::from("\n")
        }
    }

    /// Line terminator carrying the node's ending source line.
    pub(crate) fn nlr(&self, range: InputRange) -> String {
        if self.config.reserve_line_number {
            let mut buffer = itoa::Buffer::new();
            format!(
                " -- {}\n",
                buffer.format(range.end.line + self.config.line_offset)
            )
        } else {
            String::from("\n")
        }
    }

    pub(crate) fn logic_error(&self, msg: &str, range: InputRange) -> CompileError {
        let line = range.begin.line;
        let col = range.begin.col;
        CompileError::Logic {
            message: format_at(&self.input, msg, line, col, self.config.line_offset),
            line,
            col,
        }
    }

    pub(crate) fn register_global(&mut self, name: &str, range: InputRange) {
        if !self.globals.contains_key(name) {
            self.globals
                .insert(SmolStr::new(name), (range.begin.line, range.begin.col));
        }
    }

    // Block and statement lowering.

    pub(crate) fn transform_block(
        &mut self,
        block: Block,
        out: &mut Vec<String>,
        implicit_return: bool,
    ) -> Result<(), CompileError> {
        self.transform_codes(block.statements, out, implicit_return)
    }

    pub(crate) fn transform_body(
        &mut self,
        body: Body,
        out: &mut Vec<String>,
        implicit_return: bool,
    ) -> Result<(), CompileError> {
        match body.content {
            BodyContent::Block(block) => self.transform_codes(block.statements, out, implicit_return),
            BodyContent::Statement(stmt) => self.transform_codes(vec![*stmt], out, implicit_return),
        }
    }

    pub(crate) fn transform_codes(
        &mut self,
        mut nodes: Vec<Statement>,
        out: &mut Vec<String>,
        implicit_return: bool,
    ) -> Result<(), CompileError> {
        self.fold_backcall(&mut nodes);
        self.scan_local_decls(&mut nodes);

        if implicit_return {
            if let Some(last) = nodes.last_mut() {
                let comp_appendix = matches!(
                    &last.appendix,
                    Some(appendix) if matches!(appendix.item, AppendixItem::CompInner(_))
                );
                if !comp_appendix {
                    if let StatementContent::ExpListAssign(ela) = &last.content {
                        if ela.action.is_none() {
                            let range = ela.exp_list.range;
                            let exprs = ela.exp_list.exprs.clone();
                            last.content = StatementContent::Return(Return {
                                range,
                                value_list: Some(ExpListLow { range, exprs }),
                            });
                        }
                    }
                }
            }
        }

        let mut temp = Vec::new();
        for stmt in nodes {
            self.transform_statement(stmt, &mut temp)?;
        }
        out.push(temp.concat());
        Ok(())
    }

    /// A backcall statement captures the remaining statements of its
    /// block as a function literal passed as the call's last argument.
    fn fold_backcall(&mut self, nodes: &mut Vec<Statement>) {
        let Some(idx) = nodes
            .iter()
            .position(|s| matches!(s.content, StatementContent::Backcall(_)))
        else {
            return;
        };
        let rest: Vec<Statement> = nodes.split_off(idx + 1);
        let stmt = nodes.pop().expect("backcall statement");
        let backcall = match stmt.content {
            StatementContent::Backcall(backcall) => backcall,
            _ => unreachable!(),
        };
        let range = backcall.range;
        let fun = FunLit {
            range,
            args_def: backcall.args_def,
            fat: backcall.fat,
            body: Some(Box::new(Body::from_block(Block {
                range,
                statements: rest,
            }))),
        };
        let fun_exp = Exp::from_value(Value::from_simple(SimpleValueKind::FunLit(fun), range));
        let mut chain = *backcall.value;
        match chain.items.last_mut() {
            Some(ChainItem::Invoke(invoke)) => invoke.args.push(InvokeArg::Exp(fun_exp)),
            Some(ChainItem::InvokeArgs(invoke_args)) => {
                invoke_args.args.push(InvokeArgsItem::Exp(fun_exp))
            }
            _ => chain.items.push(ChainItem::Invoke(Invoke {
                range,
                args: vec![InvokeArg::Exp(fun_exp)],
            })),
        }
        nodes.push(Statement {
            range: stmt.range,
            content: StatementContent::ExpListAssign(ExpListAssign::new(
                ExpList::single(Exp::from_chain(chain)),
                None,
            )),
            appendix: stmt.appendix,
        });
    }

    /// Pre-scan for `local *` / `local ^`: collect the names every
    /// later statement in the block introduces, so a single `local`
    /// line can pre-declare them.
    fn scan_local_decls(&mut self, nodes: &mut Vec<Statement>) {
        const NONE: u8 = 0;
        const CAPITAL: u8 = 1;
        const ANY: u8 = 2;
        let mut mode = NONE;
        let mut any_idx: Option<usize> = None;
        let mut capital_idx: Option<usize> = None;
        for i in 0..nodes.len() {
            let mut force: Option<Vec<SmolStr>> = None;
            let mut found: Vec<SmolStr> = Vec::new();
            match &nodes[i].content {
                StatementContent::Local(local) => match &local.target {
                    LocalTarget::Flag(flag) => {
                        let new_mode = match flag.kind {
                            LocalFlagKind::Any => ANY,
                            LocalFlagKind::Capital => CAPITAL,
                        };
                        if new_mode > mode {
                            mode = new_mode;
                        }
                        if mode == ANY {
                            if any_idx.is_none() {
                                any_idx = Some(i);
                            }
                            if capital_idx.is_none() {
                                capital_idx = Some(i);
                            }
                        } else if capital_idx.is_none() {
                            capital_idx = Some(i);
                        }
                    }
                    LocalTarget::Names(names) => {
                        force = Some(names.names.iter().map(|v| v.name.text.clone()).collect());
                    }
                },
                content if mode != NONE => {
                    if let StatementContent::ExpListAssign(ela) = content {
                        if matches!(ela.action, Some(AssignAction::Assign(_))) {
                            for exp in &ela.exp_list.exprs {
                                if let Some(var) = single_variable_from(exp) {
                                    found.push(var);
                                }
                            }
                            found.extend(assign::destructure_names(ela));
                            if let Some(decl) = class_decl_from_assignment(ela) {
                                if let Some(name) = class_decl_variable(decl) {
                                    found.push(name);
                                }
                            }
                        } else if ela.action.is_none() {
                            if let Some(decl) = class_decl_from_exp_list(&ela.exp_list) {
                                if let Some(name) = class_decl_variable(decl) {
                                    found.push(name);
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
            if let Some(force) = force {
                if let StatementContent::Local(local) = &mut nodes[i].content {
                    local.force_decls = force;
                }
            }
            for name in found {
                let target = if name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                    capital_idx
                } else {
                    any_idx
                };
                let Some(target) = target else { continue };
                if let StatementContent::Local(local) = &mut nodes[target].content {
                    local.decls.push(name);
                }
            }
        }
    }

    pub(crate) fn transform_statement(
        &mut self,
        mut statement: Statement,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        if statement.appendix.is_some() {
            if let StatementContent::ExpListAssign(ela) = &statement.content {
                if matches!(ela.action, Some(AssignAction::Assign(_))) {
                    let pre = self.get_predefine_assignment(ela)?;
                    if !pre.is_empty() {
                        out.push(format!("{}{}", pre, self.nll(statement.range)));
                    }
                }
            }
            let appendix = statement.appendix.take().expect("appendix");
            let range = statement.range;
            match appendix.item {
                AppendixItem::IfLine(line) => {
                    let mut if_nodes = vec![IfNode::Cond(IfCond {
                        range: line.condition.range,
                        condition: line.condition,
                        assign: line.assign,
                    })];
                    let old_content = std::mem::replace(
                        &mut statement.content,
                        StatementContent::Return(Return {
                            range,
                            value_list: None,
                        }),
                    );
                    if_nodes.push(IfNode::Body(Body::from_statement(Statement::from_content(
                        old_content,
                        range,
                    ))));
                    if let Some(else_expr) = line.else_expr {
                        if_nodes.push(IfNode::Body(Body::from_statement(Statement::from_exp(
                            *else_expr,
                        ))));
                    }
                    let if_node = If {
                        range,
                        nodes: if_nodes,
                    };
                    statement.content = StatementContent::ExpListAssign(ExpListAssign::new(
                        ExpList::single(Exp::from_value(Value::from_simple(
                            SimpleValueKind::If(if_node),
                            range,
                        ))),
                        None,
                    ));
                }
                AppendixItem::UnlessLine(line) => {
                    let old_content = std::mem::replace(
                        &mut statement.content,
                        StatementContent::Return(Return {
                            range,
                            value_list: None,
                        }),
                    );
                    let unless = Unless {
                        range,
                        nodes: vec![
                            IfNode::Cond(IfCond {
                                range: line.condition.range,
                                condition: line.condition,
                                assign: None,
                            }),
                            IfNode::Body(Body::from_statement(Statement::from_content(
                                old_content,
                                range,
                            ))),
                        ],
                    };
                    statement.content = StatementContent::ExpListAssign(ExpListAssign::new(
                        ExpList::single(Exp::from_value(Value::from_simple(
                            SimpleValueKind::Unless(unless),
                            range,
                        ))),
                        None,
                    ));
                }
                AppendixItem::CompInner(inner) => {
                    let old_content = std::mem::replace(
                        &mut statement.content,
                        StatementContent::Return(Return {
                            range,
                            value_list: None,
                        }),
                    );
                    let comp = Comprehension {
                        range,
                        value: CompValueKind::Statement(Box::new(Statement::from_content(
                            old_content,
                            range,
                        ))),
                        for_loop: inner,
                    };
                    statement.content = StatementContent::ExpListAssign(ExpListAssign::new(
                        ExpList::single(Exp::from_value(Value::from_simple(
                            SimpleValueKind::Comprehension(comp),
                            range,
                        ))),
                        None,
                    ));
                }
            }
        }

        match statement.content {
            StatementContent::Import(import) => self.transform_import(import, out),
            StatementContent::While(node) => self.transform_while(node, out),
            StatementContent::For(node) => self.transform_for(node, out),
            StatementContent::ForEach(node) => self.transform_for_each(node, out),
            StatementContent::Return(node) => self.transform_return(node, out),
            StatementContent::Local(node) => self.transform_local(node, out),
            StatementContent::Export(node) => self.transform_export(node, out),
            StatementContent::BreakLoop(node) => self.transform_break_loop(node, out),
            StatementContent::Backcall(node) => {
                // A lone backcall not folded by its block; treat its
                // chain as a plain call statement.
                let backcall = node;
                let mut nodes = vec![Statement {
                    range: backcall.range,
                    content: StatementContent::Backcall(backcall),
                    appendix: None,
                }];
                self.fold_backcall(&mut nodes);
                let stmt = nodes.pop().expect("folded backcall");
                self.transform_statement(stmt, out)
            }
            StatementContent::ExpListAssign(ela) => {
                if ela.action.is_some() {
                    self.transform_assignment(ela, out)
                } else {
                    let list_range = ela.exp_list.range;
                    let mut exprs = ela.exp_list.exprs;
                    if exprs.is_empty() {
                        out.push(String::new());
                        return Ok(());
                    }
                    if exprs.len() == 1 && exprs[0].op_values.is_empty() {
                        let exp = exprs.pop().expect("single expression");
                        let value = *exp.value;
                        match value.item {
                            ValueItem::SimpleValue(simple) => match simple.value {
                                SimpleValueKind::If(node) => {
                                    return self.transform_if(node, out, ExpUsage::Common);
                                }
                                SimpleValueKind::ClassDecl(node) => {
                                    return self
                                        .transform_class_decl(node, out, ExpUsage::Common, None);
                                }
                                SimpleValueKind::Unless(node) => {
                                    return self.transform_unless(node, out, ExpUsage::Common);
                                }
                                SimpleValueKind::Switch(node) => {
                                    return self.transform_switch(node, out, false);
                                }
                                SimpleValueKind::With(node) => {
                                    return self.transform_with(node, out, None, false);
                                }
                                SimpleValueKind::ForEach(node) => {
                                    return self.transform_for_each(node, out);
                                }
                                SimpleValueKind::For(node) => {
                                    return self.transform_for(node, out);
                                }
                                SimpleValueKind::While(node) => {
                                    return self.transform_while(node, out);
                                }
                                SimpleValueKind::Do(node) => {
                                    return self.transform_do(node, out, false);
                                }
                                SimpleValueKind::Comprehension(node) => {
                                    return self.transform_comp_common(node, out);
                                }
                                _ => {}
                            },
                            ValueItem::ChainValue(chain) => {
                                if is_chain_value_call(&chain) {
                                    return self.transform_chain_value(
                                        *chain,
                                        out,
                                        ExpUsage::Common,
                                        None,
                                    );
                                }
                            }
                            _ => {}
                        }
                    }
                    Err(self.logic_error(
                        "Expression list must appear at the end of body block.",
                        list_range,
                    ))
                }
            }
        }
    }

    /// Rewrites the trailing statement of a body into an assignment to
    /// the given target list, when that statement can produce a value.
    pub(crate) fn assign_last_explist(&self, exp_list: &ExpList, body: &mut Body) {
        let Some(last) = last_statement_mut(body) else {
            return;
        };
        let assignable = match &last.content {
            StatementContent::ExpListAssign(ela) => ela.action.is_none(),
            StatementContent::For(_) | StatementContent::ForEach(_) | StatementContent::While(_) => {
                true
            }
            _ => false,
        };
        if !assignable {
            return;
        }
        let range = last.range;
        let old = std::mem::replace(
            &mut last.content,
            StatementContent::Return(Return {
                range,
                value_list: None,
            }),
        );
        let assign = match old {
            StatementContent::ExpListAssign(ela) => Assign {
                range,
                values: ela.exp_list.exprs.into_iter().map(AssignValue::Exp).collect(),
            },
            StatementContent::For(node) => Assign::single(
                AssignValue::Exp(Exp::from_value(Value::from_simple(
                    SimpleValueKind::For(node),
                    range,
                ))),
                range,
            ),
            StatementContent::ForEach(node) => Assign::single(
                AssignValue::Exp(Exp::from_value(Value::from_simple(
                    SimpleValueKind::ForEach(node),
                    range,
                ))),
                range,
            ),
            StatementContent::While(node) => Assign::single(
                AssignValue::Exp(Exp::from_value(Value::from_simple(
                    SimpleValueKind::While(node),
                    range,
                ))),
                range,
            ),
            _ => unreachable!(),
        };
        last.content = StatementContent::ExpListAssign(ExpListAssign {
            range,
            exp_list: exp_list.clone(),
            action: Some(AssignAction::Assign(assign)),
        });
    }
}

// Read-only AST inspection shared by the transform modules.

pub(crate) fn single_value(exp: &Exp) -> Option<&Value> {
    if exp.op_values.is_empty() {
        Some(&exp.value)
    } else {
        None
    }
}

pub(crate) fn single_value_in_list(list: &ExpList) -> Option<&Value> {
    if list.exprs.len() == 1 {
        single_value(&list.exprs[0])
    } else {
        None
    }
}

pub(crate) fn simple_single_value(exp: &Exp) -> Option<&SimpleValue> {
    match &single_value(exp)?.item {
        ValueItem::SimpleValue(simple) => Some(simple.as_ref()),
        _ => None,
    }
}

pub(crate) fn single_variable_from_chain(chain: &ChainValue) -> Option<SmolStr> {
    single_variable_from_items(&chain.items)
}

pub(crate) fn single_variable_from_items(items: &[ChainItem]) -> Option<SmolStr> {
    if items.len() != 1 {
        return None;
    }
    match &items[0] {
        ChainItem::Callable(callable) => match &callable.item {
            CallableItem::Variable(var) => Some(var.name.text.clone()),
            CallableItem::SelfName(self_name) if matches!(self_name.kind, SelfKind::Plain) => {
                Some(SmolStr::new("self"))
            }
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn single_variable_from(exp: &Exp) -> Option<SmolStr> {
    match &single_value(exp)?.item {
        ValueItem::ChainValue(chain) => single_variable_from_chain(chain),
        _ => None,
    }
}

pub(crate) fn single_variable_in_list(list: &ExpList) -> Option<SmolStr> {
    if list.exprs.len() == 1 {
        single_variable_from(&list.exprs[0])
    } else {
        None
    }
}

pub(crate) fn is_chain_value_call(chain: &ChainValue) -> bool {
    matches!(
        chain.items.last(),
        Some(ChainItem::Invoke(_)) | Some(ChainItem::InvokeArgs(_))
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChainType {
    Common,
    EndWithColon,
    EndWithEop,
    HasEop,
    HasKeyword,
}

pub(crate) fn special_chain_value(chain: &ChainValue) -> ChainType {
    match chain.items.last() {
        Some(ChainItem::ColonChain(_)) => return ChainType::EndWithColon,
        Some(ChainItem::Existential) => return ChainType::EndWithEop,
        _ => {}
    }
    let mut chain_type = ChainType::Common;
    for item in &chain.items {
        match item {
            ChainItem::ColonChain(colon) if colon.is_lua_keyword => {
                chain_type = ChainType::HasKeyword;
            }
            ChainItem::Existential => return ChainType::HasEop,
            _ => {}
        }
    }
    chain_type
}

pub(crate) fn is_assignable_items(items: &[ChainItem]) -> bool {
    if items.len() == 1 {
        match &items[0] {
            ChainItem::Callable(callable) => matches!(
                callable.item,
                CallableItem::Variable(_) | CallableItem::SelfName(_)
            ),
            ChainItem::DotChain(_) => true,
            _ => false,
        }
    } else {
        matches!(
            items.last(),
            Some(ChainItem::DotChain(_)) | Some(ChainItem::Index(_))
        )
    }
}

pub(crate) fn is_assignable_exp(exp: &Exp) -> bool {
    if let Some(value) = single_value(exp) {
        match &value.item {
            ValueItem::SimpleTable(_) => true,
            ValueItem::SimpleValue(simple) => {
                matches!(simple.value, SimpleValueKind::TableLit(_))
            }
            ValueItem::ChainValue(chain) => is_assignable_items(&chain.items),
            _ => false,
        }
    } else {
        false
    }
}

pub(crate) fn is_assignable(assignable: &Assignable) -> bool {
    match &assignable.item {
        AssignableItem::Chain(chain) => is_assignable_items(&chain.items),
        _ => true,
    }
}

pub(crate) fn last_statement_mut(body: &mut Body) -> Option<&mut Statement> {
    match &mut body.content {
        BodyContent::Statement(stmt) => Some(stmt),
        BodyContent::Block(block) => block.statements.last_mut(),
    }
}

/// The table-literal source of a destructuring target, if the
/// expression is one.
pub(crate) fn destructure_target(exp: &Exp) -> bool {
    if let Some(value) = single_value(exp) {
        match &value.item {
            ValueItem::SimpleTable(_) => true,
            ValueItem::SimpleValue(simple) => matches!(simple.value, SimpleValueKind::TableLit(_)),
            _ => false,
        }
    } else {
        false
    }
}

pub(crate) fn class_decl_from_assignment(ela: &ExpListAssign) -> Option<&ClassDecl> {
    let Some(AssignAction::Assign(assign)) = &ela.action else {
        return None;
    };
    if assign.values.len() != 1 {
        return None;
    }
    let AssignValue::Exp(exp) = &assign.values[0] else {
        return None;
    };
    match &single_value(exp)?.item {
        ValueItem::SimpleValue(simple) => match &simple.value {
            SimpleValueKind::ClassDecl(decl) => Some(decl),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn class_decl_from_exp_list(list: &ExpList) -> Option<&ClassDecl> {
    match &single_value_in_list(list)?.item {
        ValueItem::SimpleValue(simple) => match &simple.value {
            SimpleValueKind::ClassDecl(decl) => Some(decl),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn class_decl_variable(decl: &ClassDecl) -> Option<SmolStr> {
    match &decl.name.as_deref()?.item {
        AssignableItem::Variable(var) => Some(var.name.text.clone()),
        _ => None,
    }
}

/// A bare identifier per the grammar's `Name` rule.
pub(crate) fn is_plain_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
