// Pre-order traversal over the syntax tree.
//
// The visitor receives the node kinds lowering actually inspects; the
// walk itself descends through every construct. `Return` skips the
// current subtree but continues with siblings, `Stop` aborts the whole
// walk.

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Continue,
    Return,
    Stop,
}

use Traversal::{Continue, Return, Stop};

/// Mutable view of a visited node.
pub enum NodeMut<'a> {
    Statement(&'a mut Statement),
    Body(&'a mut Body),
    IfCond(&'a mut IfCond),
    Exp(&'a mut Exp),
    ChainValue(&'a mut ChainValue),
    Callable(&'a mut Callable),
    For(&'a mut For),
    ForEach(&'a mut ForEach),
    BreakLoop(&'a mut BreakLoop),
    ClassDecl(&'a mut ClassDecl),
}

pub type VisitFn<'f> = dyn FnMut(NodeMut<'_>) -> Traversal + 'f;

macro_rules! visit {
    ($f:expr, $node:expr) => {
        match $f($node) {
            Stop => return Stop,
            Return => return Continue,
            Continue => {}
        }
    };
}

macro_rules! descend {
    ($e:expr) => {
        if $e == Stop {
            return Stop;
        }
    };
}

pub fn walk_block(block: &mut Block, f: &mut VisitFn) -> Traversal {
    for stmt in &mut block.statements {
        descend!(walk_statement(stmt, f));
    }
    Continue
}

pub fn walk_statement(stmt: &mut Statement, f: &mut VisitFn) -> Traversal {
    visit!(f, NodeMut::Statement(stmt));
    if let Some(appendix) = &mut stmt.appendix {
        descend!(walk_appendix(appendix, f));
    }
    match &mut stmt.content {
        StatementContent::Import(import) => walk_import(import, f),
        StatementContent::While(node) => walk_while(node, f),
        StatementContent::For(node) => walk_for(node, f),
        StatementContent::ForEach(node) => walk_for_each(node, f),
        StatementContent::Return(node) => walk_return(node, f),
        StatementContent::Local(_) => Continue,
        StatementContent::Export(node) => walk_export(node, f),
        StatementContent::BreakLoop(node) => {
            visit!(f, NodeMut::BreakLoop(node));
            Continue
        }
        StatementContent::Backcall(node) => walk_chain_value(&mut node.value, f),
        StatementContent::ExpListAssign(node) => walk_exp_list_assign(node, f),
    }
}

fn walk_appendix(appendix: &mut StatementAppendix, f: &mut VisitFn) -> Traversal {
    match &mut appendix.item {
        AppendixItem::IfLine(line) => {
            descend!(walk_exp(&mut line.condition, f));
            if let Some(assign) = &mut line.assign {
                descend!(walk_assign(assign, f));
            }
            if let Some(exp) = &mut line.else_expr {
                descend!(walk_exp(exp, f));
            }
            Continue
        }
        AppendixItem::UnlessLine(line) => walk_exp(&mut line.condition, f),
        AppendixItem::CompInner(inner) => walk_comp_inner(inner, f),
    }
}

pub fn walk_body(body: &mut Body, f: &mut VisitFn) -> Traversal {
    visit!(f, NodeMut::Body(body));
    match &mut body.content {
        BodyContent::Block(block) => walk_block(block, f),
        BodyContent::Statement(stmt) => walk_statement(stmt, f),
    }
}

pub fn walk_if_nodes(nodes: &mut [IfNode], f: &mut VisitFn) -> Traversal {
    for node in nodes {
        match node {
            IfNode::Cond(cond) => descend!(walk_if_cond(cond, f)),
            IfNode::Body(body) => descend!(walk_body(body, f)),
        }
    }
    Continue
}

pub fn walk_if_cond(cond: &mut IfCond, f: &mut VisitFn) -> Traversal {
    visit!(f, NodeMut::IfCond(cond));
    descend!(walk_exp(&mut cond.condition, f));
    if let Some(assign) = &mut cond.assign {
        descend!(walk_assign(assign, f));
    }
    Continue
}

fn walk_switch(node: &mut Switch, f: &mut VisitFn) -> Traversal {
    descend!(walk_exp(&mut node.target, f));
    for branch in &mut node.branches {
        descend!(walk_exp_list(&mut branch.value_list, f));
        descend!(walk_body(&mut branch.body, f));
    }
    if let Some(last) = &mut node.last_branch {
        descend!(walk_body(last, f));
    }
    Continue
}

fn walk_with(node: &mut With, f: &mut VisitFn) -> Traversal {
    descend!(walk_exp_list(&mut node.value_list, f));
    if let Some(assign) = &mut node.assigns {
        descend!(walk_assign(assign, f));
    }
    walk_body(&mut node.body, f)
}

fn walk_while(node: &mut While, f: &mut VisitFn) -> Traversal {
    descend!(walk_exp(&mut node.condition, f));
    walk_body(&mut node.body, f)
}

pub fn walk_for(node: &mut For, f: &mut VisitFn) -> Traversal {
    visit!(f, NodeMut::For(node));
    descend!(walk_exp(&mut node.start, f));
    descend!(walk_exp(&mut node.stop, f));
    if let Some(step) = &mut node.step {
        descend!(walk_exp(step, f));
    }
    walk_body(&mut node.body, f)
}

pub fn walk_for_each(node: &mut ForEach, f: &mut VisitFn) -> Traversal {
    visit!(f, NodeMut::ForEach(node));
    descend!(walk_assignable_name_list(&mut node.name_list, f));
    match &mut node.loop_value {
        ForTarget::Star(star) => descend!(walk_exp(&mut star.value, f)),
        ForTarget::ExpList(list) => descend!(walk_exp_list(list, f)),
    }
    walk_body(&mut node.body, f)
}

fn walk_return(node: &mut super::Return, f: &mut VisitFn) -> Traversal {
    if let Some(list) = &mut node.value_list {
        descend!(walk_exp_list_low(list, f));
    }
    Continue
}

fn walk_export(node: &mut Export, f: &mut VisitFn) -> Traversal {
    match &mut node.item {
        ExportItem::ClassDecl(decl) => walk_class_decl(decl, f),
        ExportItem::Op(_) => Continue,
        ExportItem::Values(values) => {
            if let Some(list) = &mut values.value_list {
                descend!(walk_exp_list_low(list, f));
            }
            Continue
        }
    }
}

fn walk_import(node: &mut Import, f: &mut VisitFn) -> Traversal {
    match &mut node.content {
        ImportContent::As(_) => Continue,
        ImportContent::From(from) => walk_exp(&mut from.exp, f),
    }
}

fn walk_exp_list_assign(node: &mut ExpListAssign, f: &mut VisitFn) -> Traversal {
    descend!(walk_exp_list(&mut node.exp_list, f));
    match &mut node.action {
        Some(AssignAction::Update(update)) => walk_exp(&mut update.value, f),
        Some(AssignAction::Assign(assign)) => walk_assign(assign, f),
        None => Continue,
    }
}

pub fn walk_assign(assign: &mut Assign, f: &mut VisitFn) -> Traversal {
    for value in &mut assign.values {
        descend!(walk_assign_value(value, f));
    }
    Continue
}

pub fn walk_assign_value(value: &mut AssignValue, f: &mut VisitFn) -> Traversal {
    match value {
        AssignValue::With(node) => walk_with(node, f),
        AssignValue::If(node) => walk_if_nodes(&mut node.nodes, f),
        AssignValue::Switch(node) => walk_switch(node, f),
        AssignValue::TableBlock(node) => walk_table_block(node, f),
        AssignValue::Exp(exp) => walk_exp(exp, f),
    }
}

pub fn walk_exp_list(list: &mut ExpList, f: &mut VisitFn) -> Traversal {
    for exp in &mut list.exprs {
        descend!(walk_exp(exp, f));
    }
    Continue
}

pub fn walk_exp_list_low(list: &mut ExpListLow, f: &mut VisitFn) -> Traversal {
    for exp in &mut list.exprs {
        descend!(walk_exp(exp, f));
    }
    Continue
}

pub fn walk_exp(exp: &mut Exp, f: &mut VisitFn) -> Traversal {
    visit!(f, NodeMut::Exp(exp));
    descend!(walk_value(&mut exp.value, f));
    for op_value in &mut exp.op_values {
        descend!(walk_value(&mut op_value.value, f));
    }
    Continue
}

pub fn walk_value(value: &mut Value, f: &mut VisitFn) -> Traversal {
    match &mut value.item {
        ValueItem::SimpleValue(simple) => walk_simple_value(simple, f),
        ValueItem::SimpleTable(table) => {
            for pair in &mut table.pairs {
                descend!(walk_table_pair(pair, f));
            }
            Continue
        }
        ValueItem::ChainValue(chain) => walk_chain_value(chain, f),
        ValueItem::Str(s) => walk_str(s, f),
    }
}

fn walk_simple_value(simple: &mut SimpleValue, f: &mut VisitFn) -> Traversal {
    match &mut simple.value {
        SimpleValueKind::Const(_) | SimpleValueKind::Num(_) => Continue,
        SimpleValueKind::If(node) => walk_if_nodes(&mut node.nodes, f),
        SimpleValueKind::Unless(node) => walk_if_nodes(&mut node.nodes, f),
        SimpleValueKind::Switch(node) => walk_switch(node, f),
        SimpleValueKind::With(node) => walk_with(node, f),
        SimpleValueKind::ClassDecl(node) => walk_class_decl(node, f),
        SimpleValueKind::ForEach(node) => walk_for_each(node, f),
        SimpleValueKind::For(node) => walk_for(node, f),
        SimpleValueKind::While(node) => walk_while(node, f),
        SimpleValueKind::Do(node) => walk_body(&mut node.body, f),
        SimpleValueKind::UnaryExp(node) => walk_exp(&mut node.item, f),
        SimpleValueKind::TblComprehension(node) => {
            descend!(walk_exp(&mut node.key, f));
            if let Some(value) = &mut node.value {
                descend!(walk_exp(value, f));
            }
            walk_comp_inner(&mut node.for_loop, f)
        }
        SimpleValueKind::TableLit(node) => walk_table_lit(node, f),
        SimpleValueKind::Comprehension(node) => {
            match &mut node.value {
                CompValueKind::Exp(exp) => descend!(walk_exp(exp, f)),
                CompValueKind::Statement(stmt) => descend!(walk_statement(stmt, f)),
            }
            walk_comp_inner(&mut node.for_loop, f)
        }
        SimpleValueKind::FunLit(node) => walk_fun_lit(node, f),
    }
}

fn walk_fun_lit(node: &mut FunLit, f: &mut VisitFn) -> Traversal {
    if let Some(args_def) = &mut node.args_def {
        if let Some(def_list) = &mut args_def.def_list {
            for def in &mut def_list.definitions {
                if let Some(default) = &mut def.default_value {
                    descend!(walk_exp(default, f));
                }
            }
        }
    }
    if let Some(body) = &mut node.body {
        descend!(walk_body(body, f));
    }
    Continue
}

pub fn walk_class_decl(node: &mut ClassDecl, f: &mut VisitFn) -> Traversal {
    visit!(f, NodeMut::ClassDecl(node));
    if let Some(extend) = &mut node.extend {
        descend!(walk_exp(extend, f));
    }
    if let Some(body) = &mut node.body {
        for content in &mut body.contents {
            match content {
                ClassContent::MemberList(list) => {
                    for pair in &mut list.values {
                        descend!(walk_table_pair(pair, f));
                    }
                }
                ClassContent::Statement(stmt) => descend!(walk_statement(stmt, f)),
            }
        }
    }
    Continue
}

pub fn walk_chain_value(chain: &mut ChainValue, f: &mut VisitFn) -> Traversal {
    visit!(f, NodeMut::ChainValue(chain));
    walk_chain_items(&mut chain.items, f)
}

pub fn walk_chain_items(items: &mut [ChainItem], f: &mut VisitFn) -> Traversal {
    for item in items {
        descend!(walk_chain_item(item, f));
    }
    Continue
}

fn walk_chain_item(item: &mut ChainItem, f: &mut VisitFn) -> Traversal {
    match item {
        ChainItem::Callable(callable) => walk_callable(callable, f),
        ChainItem::Invoke(invoke) => {
            for arg in &mut invoke.args {
                match arg {
                    InvokeArg::Exp(exp) => descend!(walk_exp(exp, f)),
                    InvokeArg::DoubleString(s) => descend!(walk_double_string(s, f)),
                    InvokeArg::SingleString(_) | InvokeArg::LuaString(_) => {}
                }
            }
            Continue
        }
        ChainItem::InvokeArgs(invoke_args) => {
            for arg in &mut invoke_args.args {
                match arg {
                    InvokeArgsItem::Exp(exp) => descend!(walk_exp(exp, f)),
                    InvokeArgsItem::TableBlock(table) => descend!(walk_table_block(table, f)),
                }
            }
            Continue
        }
        ChainItem::Index(exp) => walk_exp(exp, f),
        ChainItem::Slice(slice) => {
            if let Some(exp) = &mut slice.start {
                descend!(walk_exp(exp, f));
            }
            if let Some(exp) = &mut slice.stop {
                descend!(walk_exp(exp, f));
            }
            if let Some(exp) = &mut slice.step {
                descend!(walk_exp(exp, f));
            }
            Continue
        }
        ChainItem::Str(s) => walk_str(s, f),
        ChainItem::DotChain(_) | ChainItem::ColonChain(_) | ChainItem::Existential => Continue,
    }
}

pub fn walk_callable(callable: &mut Callable, f: &mut VisitFn) -> Traversal {
    visit!(f, NodeMut::Callable(callable));
    match &mut callable.item {
        CallableItem::Parens(parens) => walk_exp(&mut parens.expr, f),
        _ => Continue,
    }
}

fn walk_str(s: &mut Str, f: &mut VisitFn) -> Traversal {
    match &mut s.item {
        StrItem::Double(double) => walk_double_string(double, f),
        StrItem::Single(_) | StrItem::Lua(_) => Continue,
    }
}

fn walk_double_string(s: &mut DoubleString, f: &mut VisitFn) -> Traversal {
    for seg in &mut s.segments {
        if let DoubleStringSegment::Exp(exp) = &mut seg.segment {
            descend!(walk_exp(exp, f));
        }
    }
    Continue
}

pub fn walk_comp_inner(inner: &mut CompInner, f: &mut VisitFn) -> Traversal {
    for item in &mut inner.items {
        match item {
            CompItem::For(comp_for) => {
                descend!(walk_exp(&mut comp_for.start, f));
                descend!(walk_exp(&mut comp_for.stop, f));
                if let Some(step) = &mut comp_for.step {
                    descend!(walk_exp(step, f));
                }
            }
            CompItem::ForEach(comp_for_each) => {
                descend!(walk_assignable_name_list(&mut comp_for_each.name_list, f));
                match &mut comp_for_each.loop_value {
                    CompForTarget::Star(star) => descend!(walk_exp(&mut star.value, f)),
                    CompForTarget::Exp(exp) => descend!(walk_exp(exp, f)),
                }
            }
            CompItem::When(exp) => descend!(walk_exp(exp, f)),
        }
    }
    Continue
}

fn walk_assignable_name_list(list: &mut AssignableNameList, f: &mut VisitFn) -> Traversal {
    for item in &mut list.items {
        if let NameOrDestructureItem::Destructure(table) = &mut item.item {
            descend!(walk_table_lit(table, f));
        }
    }
    Continue
}

pub fn walk_table_lit(table: &mut TableLit, f: &mut VisitFn) -> Traversal {
    for entry in &mut table.values {
        match entry {
            TableEntry::VariablePair(_) => {}
            TableEntry::NormalPair(pair) => descend!(walk_normal_pair(pair, f)),
            TableEntry::Exp(exp) => descend!(walk_exp(exp, f)),
        }
    }
    Continue
}

pub fn walk_table_block(table: &mut TableBlock, f: &mut VisitFn) -> Traversal {
    for pair in &mut table.values {
        descend!(walk_table_pair(pair, f));
    }
    Continue
}

pub fn walk_table_pair(pair: &mut TablePair, f: &mut VisitFn) -> Traversal {
    match pair {
        TablePair::Variable(_) => Continue,
        TablePair::Normal(pair) => walk_normal_pair(pair, f),
    }
}

fn walk_normal_pair(pair: &mut NormalPair, f: &mut VisitFn) -> Traversal {
    match &mut pair.key {
        PairKey::Exp(exp) => descend!(walk_exp(exp, f)),
        PairKey::DoubleString(s) => descend!(walk_double_string(s, f)),
        PairKey::KeyName(_) | PairKey::SingleString(_) => {}
    }
    match &mut pair.value {
        PairValue::Exp(exp) => walk_exp(exp, f),
        PairValue::TableBlock(table) => walk_table_block(table, f),
    }
}
