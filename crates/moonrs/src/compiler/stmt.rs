// Statement lowering: `with` blocks, `do`, `return` (with its
// value-position special cases), `local` pre-declarations, `export`
// visibility, both import forms and `break`/`continue`.

use super::{
    Compiler, ExpUsage, class_decl_from_assignment, class_decl_from_exp_list, class_decl_variable,
    single_value, single_variable_from, single_variable_in_list,
};
use crate::ast::*;
use crate::compiler::scope::ExportMode;
use crate::error::CompileError;

enum ReturnKind {
    Comprehension,
    TblComprehension,
    With,
    ClassDecl,
    Do,
    Switch,
    While,
    For,
    ForEach,
    If,
    Unless,
    SpecialChain,
    Plain,
}

impl Compiler {
    pub(crate) fn transform_do(
        &mut self,
        node: Do,
        out: &mut Vec<String>,
        implicit_return: bool,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = vec![format!("{}do{}", self.indent(), self.nll(range))];
        self.scopes.push();
        let result = self.transform_body(*node.body, &mut temp, implicit_return);
        self.scopes.pop();
        result?;
        temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_do_closure(
        &mut self,
        node: Do,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = vec![format!("(function(){}", self.nll(range))];
        self.scopes.push();
        let result = self.transform_body(*node.body, &mut temp, true);
        self.scopes.pop();
        result?;
        temp.push(format!("{}end)()", self.indent()));
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_with_closure(
        &mut self,
        node: With,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = vec![format!("(function(){}", self.nll(range))];
        self.scopes.push();
        let result = self.transform_with(node, &mut temp, None, true);
        self.scopes.pop();
        result?;
        temp.push(format!("{}end)()", self.indent()));
        out.push(temp.concat());
        Ok(())
    }

    /// Binds the `with` target to a variable (fresh, or reused when the
    /// target is already a plain variable); short-dot and short-colon
    /// items inside the body resolve against it.
    pub(crate) fn transform_with(
        &mut self,
        node: With,
        out: &mut Vec<String>,
        assign_list: Option<&ExpList>,
        return_value: bool,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = Vec::new();
        let mut with_var = String::new();
        let mut scoped = false;
        let body = *node.body;
        if let Some(assigns) = node.assigns {
            self.check_assignable(&node.value_list)?;
            let first_var = node.value_list.exprs.first().and_then(single_variable_from);
            match first_var {
                None => {
                    if assigns.values.len() == 1 {
                        if let AssignValue::Exp(exp) = &assigns.values[0] {
                            if let Some(var) = single_variable_from(exp) {
                                with_var = var.to_string();
                            }
                        }
                    }
                    if with_var.is_empty() {
                        with_var = self.scopes.fresh("_with_");
                        let first_value =
                            assigns.values.first().cloned().expect("with assign value");
                        let assignment = ExpListAssign::new(
                            ExpList::var(&with_var, range),
                            Some(AssignAction::Assign(Assign {
                                range,
                                values: vec![first_value],
                            })),
                        );
                        if !return_value {
                            scoped = true;
                            temp.push(format!("{}do{}", self.indent(), self.nll(range)));
                            self.scopes.push();
                        }
                        self.transform_assignment(assignment, &mut temp)?;
                    }
                    let mut new_values: Vec<AssignValue> =
                        vec![AssignValue::Exp(Exp::var(&with_var, range))];
                    new_values.extend(assigns.values.into_iter().skip(1));
                    let assignment = ExpListAssign::new(
                        node.value_list,
                        Some(AssignAction::Assign(Assign {
                            range,
                            values: new_values,
                        })),
                    );
                    self.transform_assignment(assignment, &mut temp)?;
                }
                Some(var) => {
                    with_var = var.to_string();
                    let assignment = ExpListAssign::new(
                        node.value_list,
                        Some(AssignAction::Assign(assigns)),
                    );
                    if !return_value {
                        scoped = true;
                        temp.push(format!("{}do{}", self.indent(), self.nll(range)));
                        self.scopes.push();
                    }
                    self.transform_assignment(assignment, &mut temp)?;
                }
            }
        } else {
            with_var = single_variable_in_list(&node.value_list)
                .map(|s| s.to_string())
                .unwrap_or_default();
            if with_var.is_empty() {
                with_var = self.scopes.fresh("_with_");
                let values: Vec<AssignValue> = node
                    .value_list
                    .exprs
                    .iter()
                    .cloned()
                    .map(AssignValue::Exp)
                    .collect();
                let assignment = ExpListAssign::new(
                    ExpList::var(&with_var, range),
                    Some(AssignAction::Assign(Assign { range, values })),
                );
                if !return_value {
                    scoped = true;
                    temp.push(format!("{}do{}", self.indent(), self.nll(range)));
                    self.scopes.push();
                }
                self.transform_assignment(assignment, &mut temp)?;
            }
        }
        if !scoped && !return_value {
            self.scopes.push();
            let needs_scope = self.with_body_defines(&body);
            self.scopes.pop();
            if needs_scope? {
                scoped = true;
                temp.push(format!("{}do{}", self.indent(), self.nll(range)));
                self.scopes.push();
            }
        }
        let ends_with_return = matches!(
            last_statement(&body).map(|s| &s.content),
            Some(StatementContent::Return(_))
        );
        self.with_vars.push(with_var.clone());
        let result = self.transform_body(body, &mut temp, false);
        self.with_vars.pop();
        result?;
        if let Some(list) = assign_list {
            let assignment = ExpListAssign::new(
                list.clone(),
                Some(AssignAction::Assign(Assign::single(
                    AssignValue::Exp(Exp::var(&with_var, range)),
                    range,
                ))),
            );
            self.transform_assignment(assignment, &mut temp)?;
        }
        if return_value && !ends_with_return {
            temp.push(format!(
                "{}return {}{}",
                self.indent(),
                with_var,
                self.nll(range)
            ));
        }
        if scoped {
            self.scopes.pop();
            temp.push(format!("{}end{}", self.indent(), self.nll(range)));
        }
        out.push(temp.concat());
        Ok(())
    }

    /// Does the body introduce any new definitions at its top level?
    /// If so the `with` needs its own `do` scope.
    fn with_body_defines(&mut self, body: &Body) -> Result<bool, CompileError> {
        let single;
        let statements: &[Statement] = match &body.content {
            BodyContent::Block(block) => &block.statements,
            BodyContent::Statement(stmt) => {
                single = std::slice::from_ref(&**stmt);
                single
            }
        };
        for stmt in statements {
            if let StatementContent::ExpListAssign(ela) = &stmt.content {
                if let Some(AssignAction::Assign(assign)) = &ela.action {
                    let defs = self.get_assign_defs(&ela.exp_list)?;
                    if !defs.is_empty() {
                        return Ok(true);
                    }
                    let (destructs, _) =
                        self.extract_destructure_info(&ela.exp_list, assign, true)?;
                    for destruct in &destructs {
                        for item in &destruct.items {
                            if item.is_variable && !self.scopes.is_defined(&item.name) {
                                return Ok(true);
                            }
                        }
                    }
                    if let Some(name) =
                        class_decl_from_assignment(ela).and_then(class_decl_variable)
                    {
                        if !self.scopes.is_defined(&name) {
                            return Ok(true);
                        }
                    }
                } else if ela.action.is_none() {
                    if let Some(name) =
                        class_decl_from_exp_list(&ela.exp_list).and_then(class_decl_variable)
                    {
                        if !self.scopes.is_defined(&name) {
                            return Ok(true);
                        }
                    }
                }
            }
        }
        Ok(false)
    }

    pub(crate) fn transform_return(
        &mut self,
        node: Return,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let Some(value_list) = node.value_list else {
            out.push(format!("{}return{}", self.indent(), self.nll(range)));
            return Ok(());
        };
        let single = value_list.exprs.len() == 1 && value_list.exprs[0].op_values.is_empty();
        if single {
            let kind = {
                let exp = &value_list.exprs[0];
                match &single_value(exp).expect("single value").item {
                    ValueItem::SimpleValue(simple) => match &simple.value {
                        SimpleValueKind::Comprehension(_) => ReturnKind::Comprehension,
                        SimpleValueKind::TblComprehension(_) => ReturnKind::TblComprehension,
                        SimpleValueKind::With(_) => ReturnKind::With,
                        SimpleValueKind::ClassDecl(_) => ReturnKind::ClassDecl,
                        SimpleValueKind::Do(_) => ReturnKind::Do,
                        SimpleValueKind::Switch(_) => ReturnKind::Switch,
                        SimpleValueKind::While(_) => ReturnKind::While,
                        SimpleValueKind::For(_) => ReturnKind::For,
                        SimpleValueKind::ForEach(_) => ReturnKind::ForEach,
                        SimpleValueKind::If(_) => ReturnKind::If,
                        SimpleValueKind::Unless(_) => ReturnKind::Unless,
                        _ => ReturnKind::Plain,
                    },
                    ValueItem::ChainValue(chain) => {
                        if super::special_chain_value(chain) != super::ChainType::Common {
                            ReturnKind::SpecialChain
                        } else {
                            ReturnKind::Plain
                        }
                    }
                    _ => ReturnKind::Plain,
                }
            };
            let exp = value_list.exprs.into_iter().next().expect("return value");
            let value = *exp.value;
            match kind {
                ReturnKind::Plain => {
                    let mut tmp = Vec::new();
                    self.transform_value(&value, &mut tmp)?;
                    out.push(format!(
                        "{}return {}{}",
                        self.indent(),
                        tmp.concat(),
                        self.nlr(range)
                    ));
                    return Ok(());
                }
                ReturnKind::SpecialChain => {
                    let chain = match value.item {
                        ValueItem::ChainValue(chain) => *chain,
                        _ => unreachable!(),
                    };
                    return self.transform_chain_value(chain, out, ExpUsage::Return, None);
                }
                _ => {}
            }
            let simple = match value.item {
                ValueItem::SimpleValue(simple) => *simple,
                _ => unreachable!(),
            };
            return match simple.value {
                SimpleValueKind::Comprehension(n) => {
                    self.transform_comprehension(n, out, ExpUsage::Return, None)
                }
                SimpleValueKind::TblComprehension(n) => {
                    self.transform_tbl_comprehension(n, out, ExpUsage::Return, None)
                }
                SimpleValueKind::With(n) => self.transform_with(n, out, None, true),
                SimpleValueKind::ClassDecl(n) => {
                    self.transform_class_decl(n, out, ExpUsage::Return, None)
                }
                SimpleValueKind::Do(n) => self.transform_do(n, out, true),
                SimpleValueKind::Switch(n) => self.transform_switch(n, out, true),
                SimpleValueKind::While(n) => self.transform_while_in_place(n, out, None),
                SimpleValueKind::For(n) => self.transform_for_in_place(n, out, None),
                SimpleValueKind::ForEach(n) => self.transform_for_each_in_place(n, out, None),
                SimpleValueKind::If(n) => self.transform_if(n, out, ExpUsage::Return),
                SimpleValueKind::Unless(n) => self.transform_unless(n, out, ExpUsage::Return),
                _ => unreachable!(),
            };
        }
        let mut tmp = Vec::new();
        self.transform_exp_list_low(&value_list, &mut tmp)?;
        out.push(format!(
            "{}return {}{}",
            self.indent(),
            tmp.concat(),
            self.nlr(range)
        ));
        Ok(())
    }

    pub(crate) fn transform_local(
        &mut self,
        node: Local,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        if node.force_decls.is_empty() && node.decls.is_empty() {
            return Ok(());
        }
        let mut defs = Vec::new();
        for decl in &node.force_decls {
            self.scopes.force_add(decl);
            defs.push(decl.to_string());
        }
        for decl in &node.decls {
            if self.scopes.add_to_scope(decl) {
                defs.push(decl.to_string());
            }
        }
        let pre = self.predefine_line(&defs);
        if !pre.is_empty() {
            out.push(format!("{}{}", pre, self.nll(node.range)));
        }
        Ok(())
    }

    pub(crate) fn transform_break_loop(
        &mut self,
        node: BreakLoop,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        match node.kind {
            BreakKind::Break => {
                out.push(format!("{}break{}", self.indent(), self.nll(range)));
                Ok(())
            }
            BreakKind::Continue => {
                let Some(continue_var) = self.continue_vars.last().cloned() else {
                    return Err(self.logic_error("Continue is not inside a loop.", range));
                };
                out.push(format!(
                    "{}{} = true{}{}break{}",
                    self.indent(),
                    continue_var,
                    self.nll(range),
                    self.indent(),
                    self.nll(range)
                ));
                Ok(())
            }
        }
    }

    pub(crate) fn transform_export(
        &mut self,
        node: Export,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        match node.item {
            ExportItem::ClassDecl(decl) => {
                if let Some(name) = class_decl_variable(&decl) {
                    self.scopes.mark_exported(ExportMode::Any, true);
                    self.scopes.add_exported(&name);
                }
                self.transform_class_decl(*decl, out, ExpUsage::Common, None)
            }
            ExportItem::Op(op) => {
                if op.op == "*" {
                    self.scopes.mark_exported(ExportMode::Any, false);
                } else {
                    self.scopes.mark_exported(ExportMode::Capital, false);
                }
                Ok(())
            }
            ExportItem::Values(values) => {
                self.scopes.mark_exported(ExportMode::Any, true);
                match values.value_list {
                    Some(value_list) => {
                        let mut exprs = Vec::new();
                        for name in &values.name_list.names {
                            self.scopes.add_exported(&name.name.text);
                            exprs.push(Exp::var(&name.name.text, name.range));
                        }
                        let assignment = ExpListAssign::new(
                            ExpList {
                                range: values.range,
                                exprs,
                            },
                            Some(AssignAction::Assign(Assign {
                                range: values.range,
                                values: value_list
                                    .exprs
                                    .into_iter()
                                    .map(AssignValue::Exp)
                                    .collect(),
                            })),
                        );
                        self.transform_assignment(assignment, out)
                    }
                    None => {
                        for name in &values.name_list.names {
                            self.scopes.add_exported(&name.name.text);
                        }
                        Ok(())
                    }
                }
            }
        }
    }

    pub(crate) fn transform_import(
        &mut self,
        node: Import,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        match node.content {
            ImportContent::As(import) => self.transform_import_as(import, out),
            ImportContent::From(import) => self.transform_import_from(import, out),
        }
    }

    /// `import "a.b" as target` — a `require` call assigned (or
    /// destructured) into the target.
    fn transform_import_as(
        &mut self,
        import: ImportAs,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = import.range;
        let target = import.target.unwrap_or_else(|| {
            let name = import
                .literal
                .parts
                .last()
                .cloned()
                .unwrap_or_default()
                .replace(['-', ' '], "_");
            ImportTarget::Variable(Variable::synth(&name, range))
        });
        let target_exp = match target {
            ImportTarget::Variable(var) => {
                let name = var.name.text.to_string();
                Exp::var(&name, range)
            }
            ImportTarget::TableLit(table) => {
                Exp::from_value(Value::from_simple(SimpleValueKind::TableLit(table), range))
            }
        };
        let literal = format!("'{}'", import.literal.parts.join("."));
        let require_exp = Exp::from_chain(ChainValue {
            range,
            items: vec![
                ChainItem::Callable(Box::new(Callable::var("require", range))),
                ChainItem::Invoke(Invoke {
                    range,
                    args: vec![InvokeArg::SingleString(SingleString {
                        range,
                        text: literal,
                    })],
                }),
            ],
        });
        let assignment = ExpListAssign::new(
            ExpList::single(target_exp),
            Some(AssignAction::Assign(Assign::single(
                AssignValue::Exp(require_exp),
                range,
            ))),
        );
        self.transform_assignment(assignment, out)
    }

    /// `import a, \b from obj` — dot accesses for plain names, method
    /// closures for `\name` imports.
    fn transform_import_from(
        &mut self,
        import: ImportFrom,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = import.range;
        let mut temp = Vec::new();
        let existing = single_variable_from(&import.exp).map(|s| s.to_string());
        let (obj_name, obj_assignment) = match existing {
            Some(name) => (name, None),
            None => {
                let name = self.scopes.fresh("_obj_");
                let assignment = ExpListAssign::new(
                    ExpList::var(&name, range),
                    Some(AssignAction::Assign(Assign::single(
                        AssignValue::Exp(*import.exp),
                        range,
                    ))),
                );
                (name, Some(assignment))
            }
        };
        let mut target_exprs = Vec::new();
        let mut values = Vec::new();
        for name in import.names {
            let (var, colon) = match name {
                ImportNameItem::Plain(var) => (var, false),
                ImportNameItem::Colon(var) => (var, true),
            };
            let accessor = if colon {
                ChainItem::ColonChain(ColonChainItem {
                    range: var.range,
                    name: var.name.clone(),
                    is_lua_keyword: false,
                    switch_to_dot: false,
                })
            } else {
                ChainItem::DotChain(DotChainItem {
                    range: var.range,
                    name: var.name.clone(),
                })
            };
            values.push(AssignValue::Exp(Exp::from_chain(ChainValue {
                range: var.range,
                items: vec![
                    ChainItem::Callable(Box::new(Callable::var(&obj_name, var.range))),
                    accessor,
                ],
            })));
            target_exprs.push(Exp::var(&var.name.text, var.range));
        }
        let exp_list = ExpList {
            range,
            exprs: target_exprs,
        };
        let assign = Assign { range, values };
        if let Some(obj_assignment) = obj_assignment {
            let defs = self.transform_assign_defs(&exp_list)?;
            let pre = self.predefine_line(&defs);
            if !pre.is_empty() {
                temp.push(format!("{}{}", pre, self.nll(range)));
            }
            temp.push(format!("{}do{}", self.indent(), self.nll(range)));
            self.scopes.push();
            self.transform_assignment(obj_assignment, &mut temp)?;
            let assignment = ExpListAssign::new(exp_list, Some(AssignAction::Assign(assign)));
            let result = self.transform_assignment(assignment, &mut temp);
            self.scopes.pop();
            result?;
            temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
        } else {
            let assignment = ExpListAssign::new(exp_list, Some(AssignAction::Assign(assign)));
            self.transform_assignment(assignment, &mut temp)?;
        }
        out.push(temp.concat());
        Ok(())
    }
}

fn last_statement(body: &Body) -> Option<&Statement> {
    match &body.content {
        BodyContent::Statement(stmt) => Some(stmt),
        BodyContent::Block(block) => block.statements.last(),
    }
}
