// Deferred semantic actions. Each one fires after the whole parse
// succeeded, pops the children its rule produced (in reverse
// declaration order, variable-length lists bounded by the Separator
// sentinel) and pushes the composite node back.

use crate::ast::*;
use crate::parser::InputRange;
use smol_str::SmolStr;

fn text(input: &[char], range: InputRange) -> String {
    input[range.begin.offset..range.end.offset].iter().collect()
}

pub(super) fn num(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::Num(Num {
        range,
        text: text(input, range),
    }));
}

pub(super) fn name(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::Name(Name {
        range,
        text: SmolStr::new(text(input, range)),
    }));
}

pub(super) fn separator(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    stack.push(AstNode::Separator(Separator { range }));
}

pub(super) fn variable(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let name = stack.pop_name();
    stack.push(AstNode::Variable(Variable { range, name }));
}

pub(super) fn lua_keyword(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let name = stack.pop_name();
    stack.push(AstNode::LuaKeyword(LuaKeyword { range, name }));
}

pub(super) fn self_plain(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    stack.push(AstNode::SelfName(SelfName {
        range,
        kind: SelfKind::Plain,
    }));
}

pub(super) fn self_field(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let name = stack.pop_name();
    stack.push(AstNode::SelfName(SelfName {
        range,
        kind: SelfKind::Field(name),
    }));
}

pub(super) fn self_class(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    stack.push(AstNode::SelfName(SelfName {
        range,
        kind: SelfKind::Class,
    }));
}

pub(super) fn self_class_field(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let name = stack.pop_name();
    stack.push(AstNode::SelfName(SelfName {
        range,
        kind: SelfKind::ClassField(name),
    }));
}

pub(super) fn key_name(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let item = match stack.pop() {
        AstNode::SelfName(node) => KeyNameItem::SelfName(node),
        AstNode::Name(node) => KeyNameItem::Name(node),
        _ => panic!("invalid AST stack: KeyName"),
    };
    stack.push(AstNode::KeyName(KeyName { range, item }));
}

pub(super) fn var_arg(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    stack.push(AstNode::VarArg(VarArg { range }));
}

pub(super) fn name_list(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut names = Vec::new();
    while let Some(variable) = stack.try_pop_variable() {
        names.push(variable);
    }
    names.reverse();
    stack.pop_separator();
    stack.push(AstNode::NameList(NameList { range, names }));
}

pub(super) fn local_flag(stack: &mut AstStack, range: InputRange, input: &[char]) {
    let kind = if text(input, range) == "*" {
        LocalFlagKind::Any
    } else {
        LocalFlagKind::Capital
    };
    stack.push(AstNode::LocalFlag(LocalFlag { range, kind }));
}

pub(super) fn local(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let target = match stack.pop() {
        AstNode::LocalFlag(flag) => LocalTarget::Flag(flag),
        AstNode::NameList(names) => LocalTarget::Names(names),
        _ => panic!("invalid AST stack: Local"),
    };
    stack.push(AstNode::Local(Local {
        range,
        target,
        force_decls: Vec::new(),
        decls: Vec::new(),
    }));
}

pub(super) fn colon_import_name(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let name = stack.pop_variable();
    stack.push(AstNode::ColonImportName(ColonImportName { range, name }));
}

pub(super) fn import_literal_inner(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::ImportLiteralInner(ImportLiteralInner {
        range,
        text: text(input, range),
    }));
}

pub(super) fn import_literal(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut parts = Vec::new();
    while let Some(inner) = stack.try_pop_import_literal_inner() {
        parts.push(inner.text);
    }
    parts.reverse();
    stack.pop_separator();
    stack.push(AstNode::ImportLiteral(ImportLiteral { range, parts }));
}

pub(super) fn import_from(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let exp = stack.pop_exp();
    let mut names = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::ColonImportName(_)) => {
                names.push(ImportNameItem::Colon(stack.pop_colon_import_name().name));
            }
            Some(AstNode::Variable(_)) => {
                names.push(ImportNameItem::Plain(stack.pop_variable()));
            }
            _ => break,
        }
    }
    names.reverse();
    stack.pop_separator();
    stack.push(AstNode::ImportFrom(ImportFrom {
        range,
        names,
        exp: Box::new(exp),
    }));
}

pub(super) fn import_as(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let target = match stack.last() {
        Some(AstNode::Variable(_)) => Some(ImportTarget::Variable(stack.pop_variable())),
        Some(AstNode::TableLit(_)) => Some(ImportTarget::TableLit(stack.pop_table_lit())),
        _ => None,
    };
    let literal = stack.pop_import_literal();
    stack.push(AstNode::ImportAs(ImportAs {
        range,
        literal,
        target,
    }));
}

pub(super) fn import(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let content = match stack.pop() {
        AstNode::ImportAs(node) => ImportContent::As(node),
        AstNode::ImportFrom(node) => ImportContent::From(node),
        _ => panic!("invalid AST stack: Import"),
    };
    stack.push(AstNode::Import(Import { range, content }));
}

pub(super) fn break_loop(stack: &mut AstStack, range: InputRange, input: &[char]) {
    let kind = if text(input, range) == "break" {
        BreakKind::Break
    } else {
        BreakKind::Continue
    };
    stack.push(AstNode::BreakLoop(BreakLoop { range, kind }));
}

pub(super) fn return_(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let value_list = stack.try_pop_exp_list_low();
    stack.push(AstNode::Return(Return { range, value_list }));
}

pub(super) fn with(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let body = stack.pop_body();
    let assigns = stack.try_pop_assign();
    let value_list = stack.pop_exp_list();
    stack.push(AstNode::With(With {
        range,
        value_list,
        assigns,
        body: Box::new(body),
    }));
}

pub(super) fn switch_case(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let body = stack.pop_body();
    let value_list = stack.pop_exp_list();
    stack.push(AstNode::SwitchCase(SwitchCase {
        range,
        value_list,
        body,
    }));
}

pub(super) fn switch(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let last_branch = stack.try_pop_body();
    let mut branches = Vec::new();
    while let Some(case) = stack.try_pop_switch_case() {
        branches.push(case);
    }
    branches.reverse();
    stack.pop_separator();
    let target = stack.pop_exp();
    stack.push(AstNode::Switch(Switch {
        range,
        target: Box::new(target),
        branches,
        last_branch,
    }));
}

pub(super) fn if_cond(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let assign = stack.try_pop_assign().map(Box::new);
    let condition = stack.pop_exp();
    stack.push(AstNode::IfCond(IfCond {
        range,
        condition: Box::new(condition),
        assign,
    }));
}

fn pop_if_nodes(stack: &mut AstStack) -> Vec<IfNode> {
    let mut nodes = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::IfCond(_)) => nodes.push(IfNode::Cond(stack.pop_if_cond())),
            Some(AstNode::Body(_)) => nodes.push(IfNode::Body(stack.pop_body())),
            _ => break,
        }
    }
    nodes.reverse();
    stack.pop_separator();
    nodes
}

pub(super) fn if_(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let nodes = pop_if_nodes(stack);
    stack.push(AstNode::If(If { range, nodes }));
}

pub(super) fn unless(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let nodes = pop_if_nodes(stack);
    stack.push(AstNode::Unless(Unless { range, nodes }));
}

pub(super) fn while_(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let body = stack.pop_body();
    let condition = stack.pop_exp();
    stack.push(AstNode::While(While {
        range,
        condition: Box::new(condition),
        body: Box::new(body),
    }));
}

pub(super) fn for_step_value(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let value = stack.pop_exp();
    stack.push(AstNode::ForStepValue(ForStepValue { range, value }));
}

pub(super) fn for_(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let body = stack.pop_body();
    let step = stack.try_pop_for_step_value().map(|s| Box::new(s.value));
    let stop = stack.pop_exp();
    let start = stack.pop_exp();
    let var = stack.pop_variable();
    stack.push(AstNode::For(For {
        range,
        var,
        start: Box::new(start),
        stop: Box::new(stop),
        step,
        body: Box::new(body),
    }));
}

pub(super) fn for_each(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let body = stack.pop_body();
    let loop_value = match stack.pop() {
        AstNode::StarExp(star) => ForTarget::Star(star),
        AstNode::ExpList(list) => ForTarget::ExpList(list),
        _ => panic!("invalid AST stack: ForEach"),
    };
    let name_list = stack.pop_assignable_name_list();
    stack.push(AstNode::ForEach(ForEach {
        range,
        name_list,
        loop_value,
        body: Box::new(body),
    }));
}

pub(super) fn do_(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let body = stack.pop_body();
    stack.push(AstNode::Do(Do {
        range,
        body: Box::new(body),
    }));
}

pub(super) fn comprehension(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let for_loop = stack.pop_comp_inner();
    let value = match stack.pop() {
        AstNode::Exp(exp) => CompValueKind::Exp(Box::new(exp)),
        AstNode::Statement(stmt) => CompValueKind::Statement(Box::new(stmt)),
        _ => panic!("invalid AST stack: Comprehension"),
    };
    stack.push(AstNode::Comprehension(Comprehension {
        range,
        value,
        for_loop,
    }));
}

pub(super) fn comp_value(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let value = stack.pop_exp();
    stack.push(AstNode::CompValue(CompValue { range, value }));
}

pub(super) fn tbl_comprehension(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let for_loop = stack.pop_comp_inner();
    let value = stack.try_pop_comp_value().map(|v| Box::new(v.value));
    let key = stack.pop_exp();
    stack.push(AstNode::TblComprehension(TblComprehension {
        range,
        key: Box::new(key),
        value,
        for_loop,
    }));
}

pub(super) fn star_exp(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let value = stack.pop_exp();
    stack.push(AstNode::StarExp(StarExp {
        range,
        value: Box::new(value),
    }));
}

pub(super) fn comp_for_each(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let loop_value = match stack.pop() {
        AstNode::StarExp(star) => CompForTarget::Star(star),
        AstNode::Exp(exp) => CompForTarget::Exp(Box::new(exp)),
        _ => panic!("invalid AST stack: CompForEach"),
    };
    let name_list = stack.pop_assignable_name_list();
    stack.push(AstNode::CompForEach(CompForEach {
        range,
        name_list,
        loop_value,
    }));
}

pub(super) fn comp_for(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let step = stack.try_pop_for_step_value().map(|s| Box::new(s.value));
    let stop = stack.pop_exp();
    let start = stack.pop_exp();
    let var = stack.pop_variable();
    stack.push(AstNode::CompFor(CompFor {
        range,
        var,
        start: Box::new(start),
        stop: Box::new(stop),
        step,
    }));
}

pub(super) fn comp_inner(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut items = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::CompFor(_)) => {
                if let AstNode::CompFor(node) = stack.pop() {
                    items.push(CompItem::For(node));
                }
            }
            Some(AstNode::CompForEach(_)) => {
                if let AstNode::CompForEach(node) = stack.pop() {
                    items.push(CompItem::ForEach(node));
                }
            }
            Some(AstNode::Exp(_)) => items.push(CompItem::When(stack.pop_exp())),
            _ => break,
        }
    }
    items.reverse();
    stack.pop_separator();
    stack.push(AstNode::CompInner(CompInner { range, items }));
}

pub(super) fn assign(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut values = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::With(_)) => {
                if let AstNode::With(node) = stack.pop() {
                    values.push(AssignValue::With(node));
                }
            }
            Some(AstNode::If(_)) => {
                if let AstNode::If(node) = stack.pop() {
                    values.push(AssignValue::If(node));
                }
            }
            Some(AstNode::Switch(_)) => {
                if let AstNode::Switch(node) = stack.pop() {
                    values.push(AssignValue::Switch(node));
                }
            }
            Some(AstNode::TableBlock(_)) => {
                if let AstNode::TableBlock(node) = stack.pop() {
                    values.push(AssignValue::TableBlock(node));
                }
            }
            Some(AstNode::Exp(_)) => values.push(AssignValue::Exp(stack.pop_exp())),
            _ => break,
        }
    }
    values.reverse();
    stack.pop_separator();
    stack.push(AstNode::Assign(Assign { range, values }));
}

pub(super) fn update_op(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::UpdateOp(UpdateOp {
        range,
        op: text(input, range),
    }));
}

pub(super) fn update(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let value = stack.pop_exp();
    let op = stack.pop_update_op();
    stack.push(AstNode::Update(Update {
        range,
        op: op.op,
        value: Box::new(value),
    }));
}

pub(super) fn binary_operator(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::BinaryOperator(BinaryOperator {
        range,
        op: text(input, range),
    }));
}

pub(super) fn backcall_operator(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    stack.push(AstNode::BackcallOperator(BackcallOperator { range }));
}

pub(super) fn assignable(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let item = match stack.pop() {
        AstNode::AssignableChain(node) => AssignableItem::Chain(node),
        AstNode::Variable(node) => AssignableItem::Variable(node),
        AstNode::SelfName(node) => AssignableItem::SelfName(node),
        _ => panic!("invalid AST stack: Assignable"),
    };
    stack.push(AstNode::Assignable(Assignable { range, item }));
}

fn pop_chain_items(stack: &mut AstStack) -> Vec<ChainItem> {
    let mut items = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::Callable(_)) => {
                if let AstNode::Callable(node) = stack.pop() {
                    items.push(ChainItem::Callable(Box::new(node)));
                }
            }
            Some(AstNode::Invoke(_)) => {
                if let AstNode::Invoke(node) = stack.pop() {
                    items.push(ChainItem::Invoke(node));
                }
            }
            Some(AstNode::DotChainItem(_)) => {
                if let AstNode::DotChainItem(node) = stack.pop() {
                    items.push(ChainItem::DotChain(node));
                }
            }
            Some(AstNode::ColonChainItem(_)) => {
                if let AstNode::ColonChainItem(node) = stack.pop() {
                    items.push(ChainItem::ColonChain(node));
                }
            }
            Some(AstNode::Slice(_)) => {
                if let AstNode::Slice(node) = stack.pop() {
                    items.push(ChainItem::Slice(node));
                }
            }
            Some(AstNode::Exp(_)) => items.push(ChainItem::Index(stack.pop_exp())),
            Some(AstNode::Str(_)) => {
                if let AstNode::Str(node) = stack.pop() {
                    items.push(ChainItem::Str(node));
                }
            }
            Some(AstNode::InvokeArgs(_)) => {
                if let AstNode::InvokeArgs(node) = stack.pop() {
                    items.push(ChainItem::InvokeArgs(node));
                }
            }
            Some(AstNode::ExistentialOp(_)) => {
                stack.pop();
                items.push(ChainItem::Existential);
            }
            _ => break,
        }
    }
    items.reverse();
    items
}

pub(super) fn assignable_chain(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let items = pop_chain_items(stack);
    stack.pop_separator();
    stack.push(AstNode::AssignableChain(AssignableChain { range, items }));
}

pub(super) fn exp_op_value(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let value = stack.pop_value();
    let op = match stack.pop() {
        AstNode::BinaryOperator(node) => ExpOp::Binary(node.op),
        AstNode::BackcallOperator(_) => ExpOp::Backcall,
        _ => panic!("invalid AST stack: ExpOpValue"),
    };
    stack.push(AstNode::ExpOpValue(ExpOpValue { range, op, value }));
}

pub(super) fn exp(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut op_values = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::ExpOpValue(_)) => {
                if let AstNode::ExpOpValue(node) = stack.pop() {
                    op_values.push(node);
                }
            }
            _ => break,
        }
    }
    op_values.reverse();
    let value = stack.pop_value();
    stack.push(AstNode::Exp(Exp {
        range,
        value: Box::new(value),
        op_values,
    }));
}

pub(super) fn callable(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let item = match stack.pop() {
        AstNode::Variable(node) => CallableItem::Variable(node),
        AstNode::SelfName(node) => CallableItem::SelfName(node),
        AstNode::VarArg(_) => CallableItem::VarArg,
        AstNode::Parens(node) => CallableItem::Parens(node),
        _ => panic!("invalid AST stack: Callable"),
    };
    stack.push(AstNode::Callable(Callable { range, item }));
}

pub(super) fn chain_value(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let items = pop_chain_items(stack);
    stack.pop_separator();
    stack.push(AstNode::ChainValue(ChainValue { range, items }));
}

fn pop_table_pairs(stack: &mut AstStack) -> Vec<TablePair> {
    let mut pairs = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::VariablePair(_)) => {
                if let AstNode::VariablePair(node) = stack.pop() {
                    pairs.push(TablePair::Variable(node));
                }
            }
            Some(AstNode::NormalPair(_)) => {
                if let AstNode::NormalPair(node) = stack.pop() {
                    pairs.push(TablePair::Normal(node));
                }
            }
            _ => break,
        }
    }
    pairs.reverse();
    pairs
}

pub(super) fn simple_table(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let pairs = pop_table_pairs(stack);
    stack.pop_separator();
    stack.push(AstNode::SimpleTable(SimpleTable { range, pairs }));
}

pub(super) fn simple_value(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let value = match stack.pop() {
        AstNode::ConstValue(node) => SimpleValueKind::Const(node),
        AstNode::If(node) => SimpleValueKind::If(node),
        AstNode::Unless(node) => SimpleValueKind::Unless(node),
        AstNode::Switch(node) => SimpleValueKind::Switch(node),
        AstNode::With(node) => SimpleValueKind::With(node),
        AstNode::ClassDecl(node) => SimpleValueKind::ClassDecl(node),
        AstNode::ForEach(node) => SimpleValueKind::ForEach(node),
        AstNode::For(node) => SimpleValueKind::For(node),
        AstNode::While(node) => SimpleValueKind::While(node),
        AstNode::Do(node) => SimpleValueKind::Do(node),
        AstNode::UnaryExp(node) => SimpleValueKind::UnaryExp(node),
        AstNode::TblComprehension(node) => SimpleValueKind::TblComprehension(node),
        AstNode::TableLit(node) => SimpleValueKind::TableLit(node),
        AstNode::Comprehension(node) => SimpleValueKind::Comprehension(node),
        AstNode::FunLit(node) => SimpleValueKind::FunLit(node),
        AstNode::Num(node) => SimpleValueKind::Num(node),
        _ => panic!("invalid AST stack: SimpleValue"),
    };
    stack.push(AstNode::SimpleValue(SimpleValue { range, value }));
}

pub(super) fn value(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let item = match stack.pop() {
        AstNode::SimpleValue(node) => ValueItem::SimpleValue(Box::new(node)),
        AstNode::SimpleTable(node) => ValueItem::SimpleTable(node),
        AstNode::ChainValue(node) => ValueItem::ChainValue(Box::new(node)),
        AstNode::Str(node) => ValueItem::Str(node),
        _ => panic!("invalid AST stack: Value"),
    };
    stack.push(AstNode::Value(Value { range, item }));
}

pub(super) fn lua_string_open(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::LuaStringOpen(LuaStringOpen {
        range,
        text: text(input, range),
    }));
}

pub(super) fn lua_string_content(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::LuaStringContent(LuaStringContent {
        range,
        text: text(input, range),
    }));
}

pub(super) fn lua_string_close(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::LuaStringClose(LuaStringClose {
        range,
        text: text(input, range),
    }));
}

pub(super) fn lua_string(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let close = stack.pop_lua_string_close();
    let content = stack.pop_lua_string_content();
    let open = stack.pop_lua_string_open();
    stack.push(AstNode::LuaString(LuaString {
        range,
        open: open.text,
        content: content.text,
        close: close.text,
    }));
}

pub(super) fn single_string(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::SingleString(SingleString {
        range,
        text: text(input, range),
    }));
}

pub(super) fn double_string_inner(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::DoubleStringInner(DoubleStringInner {
        range,
        text: text(input, range),
    }));
}

pub(super) fn double_string_content(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let segment = match stack.pop() {
        AstNode::DoubleStringInner(node) => DoubleStringSegment::Inner(node.text),
        AstNode::Exp(node) => DoubleStringSegment::Exp(Box::new(node)),
        _ => panic!("invalid AST stack: DoubleStringContent"),
    };
    stack.push(AstNode::DoubleStringContent(DoubleStringContent {
        range,
        segment,
    }));
}

pub(super) fn double_string(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut segments = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::DoubleStringContent(_)) => {
                if let AstNode::DoubleStringContent(node) = stack.pop() {
                    segments.push(node);
                }
            }
            _ => break,
        }
    }
    segments.reverse();
    stack.pop_separator();
    stack.push(AstNode::DoubleString(DoubleString { range, segments }));
}

pub(super) fn string(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let item = match stack.pop() {
        AstNode::DoubleString(node) => StrItem::Double(node),
        AstNode::SingleString(node) => StrItem::Single(node),
        AstNode::LuaString(node) => StrItem::Lua(node),
        _ => panic!("invalid AST stack: String"),
    };
    stack.push(AstNode::Str(Str { range, item }));
}

pub(super) fn parens(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let expr = stack.pop_exp();
    stack.push(AstNode::Parens(Parens {
        range,
        expr: Box::new(expr),
    }));
}

pub(super) fn dot_chain_item(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let name = stack.pop_name();
    stack.push(AstNode::DotChainItem(DotChainItem { range, name }));
}

pub(super) fn colon_chain_item(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let (name, is_lua_keyword) = match stack.pop() {
        AstNode::LuaKeyword(node) => (node.name, true),
        AstNode::Name(node) => (node, false),
        _ => panic!("invalid AST stack: ColonChainItem"),
    };
    stack.push(AstNode::ColonChainItem(ColonChainItem {
        range,
        name,
        is_lua_keyword,
        switch_to_dot: false,
    }));
}

pub(super) fn default_value(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    stack.push(AstNode::DefaultValue(DefaultValue { range }));
}

fn pop_slice_value(stack: &mut AstStack) -> Option<Box<Exp>> {
    match stack.pop() {
        AstNode::Exp(exp) => Some(Box::new(exp)),
        AstNode::DefaultValue(_) => None,
        _ => panic!("invalid AST stack: Slice"),
    }
}

pub(super) fn slice(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let step = pop_slice_value(stack);
    let stop = pop_slice_value(stack);
    let start = pop_slice_value(stack);
    stack.push(AstNode::Slice(Slice {
        range,
        start,
        stop,
        step,
    }));
}

pub(super) fn invoke(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut args = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::Exp(_)) => args.push(InvokeArg::Exp(stack.pop_exp())),
            Some(AstNode::SingleString(_)) => {
                if let AstNode::SingleString(node) = stack.pop() {
                    args.push(InvokeArg::SingleString(node));
                }
            }
            Some(AstNode::DoubleString(_)) => {
                if let AstNode::DoubleString(node) = stack.pop() {
                    args.push(InvokeArg::DoubleString(node));
                }
            }
            Some(AstNode::LuaString(_)) => {
                if let AstNode::LuaString(node) = stack.pop() {
                    args.push(InvokeArg::LuaString(node));
                }
            }
            _ => break,
        }
    }
    args.reverse();
    stack.pop_separator();
    stack.push(AstNode::Invoke(Invoke { range, args }));
}

pub(super) fn existential_op(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    stack.push(AstNode::ExistentialOp(ExistentialOp { range }));
}

pub(super) fn table_lit(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut values = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::VariablePair(_)) => {
                if let AstNode::VariablePair(node) = stack.pop() {
                    values.push(TableEntry::VariablePair(node));
                }
            }
            Some(AstNode::NormalPair(_)) => {
                if let AstNode::NormalPair(node) = stack.pop() {
                    values.push(TableEntry::NormalPair(node));
                }
            }
            Some(AstNode::Exp(_)) => values.push(TableEntry::Exp(stack.pop_exp())),
            _ => break,
        }
    }
    values.reverse();
    stack.pop_separator();
    stack.push(AstNode::TableLit(TableLit { range, values }));
}

pub(super) fn table_block(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let values = pop_table_pairs(stack);
    stack.pop_separator();
    stack.push(AstNode::TableBlock(TableBlock { range, values }));
}

pub(super) fn class_member_list(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let values = pop_table_pairs(stack);
    stack.pop_separator();
    stack.push(AstNode::ClassMemberList(ClassMemberList { range, values }));
}

pub(super) fn class_block(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut contents = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::ClassMemberList(_)) => {
                if let AstNode::ClassMemberList(node) = stack.pop() {
                    contents.push(ClassContent::MemberList(node));
                }
            }
            Some(AstNode::Statement(_)) => {
                contents.push(ClassContent::Statement(stack.pop_statement()));
            }
            _ => break,
        }
    }
    contents.reverse();
    stack.pop_separator();
    stack.push(AstNode::ClassBlock(ClassBlock { range, contents }));
}

pub(super) fn class_decl(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let body = stack.try_pop_class_block();
    let extend = stack.try_pop_exp().map(Box::new);
    let name = stack.try_pop_assignable().map(Box::new);
    stack.push(AstNode::ClassDecl(ClassDecl {
        range,
        name,
        extend,
        body,
    }));
}

pub(super) fn export_op(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::ExportOp(ExportOp {
        range,
        op: text(input, range),
    }));
}

pub(super) fn export_values(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let value_list = stack.try_pop_exp_list_low();
    let name_list = stack.pop_name_list();
    stack.push(AstNode::ExportValues(ExportValues {
        range,
        name_list,
        value_list,
    }));
}

pub(super) fn export(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let item = match stack.pop() {
        AstNode::ClassDecl(node) => ExportItem::ClassDecl(Box::new(node)),
        AstNode::ExportOp(node) => ExportItem::Op(node),
        AstNode::ExportValues(node) => ExportItem::Values(node),
        _ => panic!("invalid AST stack: Export"),
    };
    stack.push(AstNode::Export(Export { range, item }));
}

pub(super) fn variable_pair(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let name = stack.pop_variable();
    stack.push(AstNode::VariablePair(VariablePair { range, name }));
}

pub(super) fn normal_pair(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let value = match stack.pop() {
        AstNode::Exp(node) => PairValue::Exp(Box::new(node)),
        AstNode::TableBlock(node) => PairValue::TableBlock(node),
        _ => panic!("invalid AST stack: NormalPair value"),
    };
    let key = match stack.pop() {
        AstNode::KeyName(node) => PairKey::KeyName(node),
        AstNode::Exp(node) => PairKey::Exp(Box::new(node)),
        AstNode::DoubleString(node) => PairKey::DoubleString(node),
        AstNode::SingleString(node) => PairKey::SingleString(node),
        _ => panic!("invalid AST stack: NormalPair key"),
    };
    stack.push(AstNode::NormalPair(NormalPair { range, key, value }));
}

pub(super) fn fn_arg_def(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let default_value = stack.try_pop_exp();
    let name = match stack.pop() {
        AstNode::Variable(node) => FnArgName::Variable(node),
        AstNode::SelfName(node) => FnArgName::SelfName(node),
        _ => panic!("invalid AST stack: FnArgDef"),
    };
    stack.push(AstNode::FnArgDef(FnArgDef {
        range,
        name,
        default_value,
    }));
}

pub(super) fn fn_arg_def_list(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let var_arg = stack.try_pop_var_arg().is_some();
    let mut definitions = Vec::new();
    while let Some(def) = stack.try_pop_fn_arg_def() {
        definitions.push(def);
    }
    definitions.reverse();
    stack.pop_separator();
    stack.push(AstNode::FnArgDefList(FnArgDefList {
        range,
        definitions,
        var_arg,
    }));
}

pub(super) fn outer_var_shadow(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let var_list = stack.try_pop_name_list();
    stack.push(AstNode::OuterVarShadow(OuterVarShadow { range, var_list }));
}

pub(super) fn fn_args_def(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let shadow = stack.try_pop_outer_var_shadow();
    let def_list = stack.try_pop_fn_arg_def_list();
    stack.push(AstNode::FnArgsDef(FnArgsDef {
        range,
        def_list,
        shadow,
    }));
}

pub(super) fn fn_arrow(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::FnArrow(FnArrow {
        range,
        fat: text(input, range) == "=>",
    }));
}

pub(super) fn fun_lit(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let body = stack.try_pop_body().map(Box::new);
    let arrow = stack.pop_fn_arrow();
    let args_def = stack.try_pop_fn_args_def();
    stack.push(AstNode::FunLit(FunLit {
        range,
        args_def,
        fat: arrow.fat,
        body,
    }));
}

pub(super) fn name_or_destructure(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let item = match stack.pop() {
        AstNode::Variable(node) => NameOrDestructureItem::Name(node),
        AstNode::TableLit(node) => NameOrDestructureItem::Destructure(node),
        _ => panic!("invalid AST stack: NameOrDestructure"),
    };
    stack.push(AstNode::NameOrDestructure(NameOrDestructure { range, item }));
}

pub(super) fn assignable_name_list(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut items = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::NameOrDestructure(_)) => {
                if let AstNode::NameOrDestructure(node) = stack.pop() {
                    items.push(node);
                }
            }
            _ => break,
        }
    }
    items.reverse();
    stack.pop_separator();
    stack.push(AstNode::AssignableNameList(AssignableNameList {
        range,
        items,
    }));
}

pub(super) fn fn_arrow_back(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::FnArrowBack(FnArrowBack {
        range,
        fat: text(input, range) == "<=",
    }));
}

pub(super) fn backcall(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let value = stack.pop_chain_value();
    let arrow = stack.pop_fn_arrow_back();
    let args_def = stack.try_pop_fn_args_def();
    stack.push(AstNode::Backcall(Backcall {
        range,
        args_def,
        fat: arrow.fat,
        value: Box::new(value),
    }));
}

fn pop_exprs(stack: &mut AstStack) -> Vec<Exp> {
    let mut exprs = Vec::new();
    while let Some(exp) = stack.try_pop_exp() {
        exprs.push(exp);
    }
    exprs.reverse();
    exprs
}

pub(super) fn exp_list(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let exprs = pop_exprs(stack);
    stack.pop_separator();
    stack.push(AstNode::ExpList(ExpList { range, exprs }));
}

pub(super) fn exp_list_low(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let exprs = pop_exprs(stack);
    stack.pop_separator();
    stack.push(AstNode::ExpListLow(ExpListLow { range, exprs }));
}

pub(super) fn invoke_args(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut args = Vec::new();
    loop {
        match stack.last() {
            Some(AstNode::Exp(_)) => args.push(InvokeArgsItem::Exp(stack.pop_exp())),
            Some(AstNode::TableBlock(_)) => {
                if let AstNode::TableBlock(node) = stack.pop() {
                    args.push(InvokeArgsItem::TableBlock(node));
                }
            }
            _ => break,
        }
    }
    args.reverse();
    stack.pop_separator();
    stack.push(AstNode::InvokeArgs(InvokeArgs { range, args }));
}

pub(super) fn const_value(stack: &mut AstStack, range: InputRange, input: &[char]) {
    stack.push(AstNode::ConstValue(ConstValue {
        range,
        text: text(input, range),
    }));
}

pub(super) fn unary_exp(stack: &mut AstStack, range: InputRange, input: &[char]) {
    let item = stack.pop_exp();
    let op: String = input[range.begin.offset..item.range.begin.offset]
        .iter()
        .collect();
    stack.push(AstNode::UnaryExp(UnaryExp {
        range,
        op,
        item: Box::new(item),
    }));
}

pub(super) fn exp_list_assign(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let action = match stack.last() {
        Some(AstNode::Update(_)) => match stack.pop() {
            AstNode::Update(node) => Some(AssignAction::Update(node)),
            _ => unreachable!(),
        },
        Some(AstNode::Assign(_)) => stack.try_pop_assign().map(AssignAction::Assign),
        _ => None,
    };
    let exp_list = stack.pop_exp_list();
    stack.push(AstNode::ExpListAssign(ExpListAssign {
        range,
        exp_list,
        action,
    }));
}

pub(super) fn if_line(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let else_expr = match stack.pop() {
        AstNode::Exp(exp) => Some(Box::new(exp)),
        AstNode::DefaultValue(_) => None,
        _ => panic!("invalid AST stack: if line"),
    };
    let assign = stack.try_pop_assign().map(Box::new);
    let condition = stack.pop_exp();
    stack.push(AstNode::IfLine(IfLine {
        range,
        condition: Box::new(condition),
        assign,
        else_expr,
    }));
}

pub(super) fn unless_line(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let condition = stack.pop_exp();
    stack.push(AstNode::UnlessLine(UnlessLine {
        range,
        condition: Box::new(condition),
    }));
}

pub(super) fn statement_appendix(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let item = match stack.pop() {
        AstNode::IfLine(node) => AppendixItem::IfLine(node),
        AstNode::UnlessLine(node) => AppendixItem::UnlessLine(node),
        AstNode::CompInner(node) => AppendixItem::CompInner(node),
        _ => panic!("invalid AST stack: StatementAppendix"),
    };
    stack.push(AstNode::StatementAppendix(StatementAppendix { range, item }));
}

pub(super) fn statement(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let appendix = stack.try_pop_statement_appendix();
    let content = match stack.pop() {
        AstNode::Import(node) => StatementContent::Import(node),
        AstNode::While(node) => StatementContent::While(node),
        AstNode::For(node) => StatementContent::For(node),
        AstNode::ForEach(node) => StatementContent::ForEach(node),
        AstNode::Return(node) => StatementContent::Return(node),
        AstNode::Local(node) => StatementContent::Local(node),
        AstNode::Export(node) => StatementContent::Export(node),
        AstNode::BreakLoop(node) => StatementContent::BreakLoop(node),
        AstNode::Backcall(node) => StatementContent::Backcall(node),
        AstNode::ExpListAssign(node) => StatementContent::ExpListAssign(node),
        _ => panic!("invalid AST stack: Statement"),
    };
    stack.push(AstNode::Statement(Statement {
        range,
        content,
        appendix,
    }));
}

pub(super) fn body(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let content = match stack.pop() {
        AstNode::Block(node) => BodyContent::Block(node),
        AstNode::Statement(node) => BodyContent::Statement(Box::new(node)),
        _ => panic!("invalid AST stack: Body"),
    };
    stack.push(AstNode::Body(Body { range, content }));
}

pub(super) fn block(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let mut statements = Vec::new();
    while let Some(stmt) = stack.try_pop_statement() {
        statements.push(stmt);
    }
    statements.reverse();
    stack.pop_separator();
    stack.push(AstNode::Block(Block { range, statements }));
}

pub(super) fn file(stack: &mut AstStack, range: InputRange, _input: &[char]) {
    let block = stack.pop_block();
    stack.push(AstNode::File(File { range, block }));
}
