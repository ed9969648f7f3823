// Expression-level lowering: expressions with operator tails, values,
// function literals, strings and table constructors.

use super::{Compiler, ExpUsage};
use crate::ast::*;
use crate::error::CompileError;
use crate::grammar::is_lua_keyword;
use crate::parser::InputRange;

pub(crate) enum EntryRef<'x> {
    Exp(&'x Exp),
    Var(&'x VariablePair),
    Normal(&'x NormalPair),
}

impl EntryRef<'_> {
    fn range(&self) -> InputRange {
        match self {
            EntryRef::Exp(exp) => exp.range,
            EntryRef::Var(pair) => pair.range,
            EntryRef::Normal(pair) => pair.range,
        }
    }
}

impl Compiler {
    pub(crate) fn transform_exp(
        &mut self,
        exp: &Exp,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        if exp
            .op_values
            .iter()
            .any(|op_value| matches!(op_value.op, ExpOp::Backcall))
        {
            return self.transform_pipeline(exp, out);
        }
        let mut temp = Vec::new();
        self.transform_value(&exp.value, &mut temp)?;
        for op_value in &exp.op_values {
            if let ExpOp::Binary(op) = &op_value.op {
                temp.push(if op == "!=" {
                    String::from("~=")
                } else {
                    op.clone()
                });
            }
            self.transform_value(&op_value.value, &mut temp)?;
        }
        out.push(temp.join(" "));
        Ok(())
    }

    /// `a |> f b` threads the accumulated expression in as the first
    /// call argument of the right-hand chain.
    fn transform_pipeline(
        &mut self,
        exp: &Exp,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut current = Exp {
            range: exp.range,
            value: exp.value.clone(),
            op_values: Vec::new(),
        };
        for op_value in &exp.op_values {
            match &op_value.op {
                ExpOp::Binary(op) => {
                    current.op_values.push(ExpOpValue {
                        range: op_value.range,
                        op: ExpOp::Binary(op.clone()),
                        value: op_value.value.clone(),
                    });
                }
                ExpOp::Backcall => {
                    let mut chain = match &op_value.value.item {
                        ValueItem::ChainValue(chain) => (**chain).clone(),
                        _ => {
                            return Err(self.logic_error(
                                "Backcall operator must be followed by a chain value.",
                                op_value.range,
                            ));
                        }
                    };
                    let arg = current;
                    match chain.items.last_mut() {
                        Some(ChainItem::Invoke(invoke)) => {
                            invoke.args.insert(0, InvokeArg::Exp(arg));
                        }
                        Some(ChainItem::InvokeArgs(invoke_args)) => {
                            invoke_args.args.insert(0, InvokeArgsItem::Exp(arg));
                        }
                        _ => chain.items.push(ChainItem::Invoke(Invoke {
                            range: op_value.range,
                            args: vec![InvokeArg::Exp(arg)],
                        })),
                    }
                    current = Exp::from_chain(chain);
                }
            }
        }
        self.transform_exp(&current, out)
    }

    pub(crate) fn transform_exp_list(
        &mut self,
        list: &ExpList,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut temp = Vec::new();
        for exp in &list.exprs {
            self.transform_exp(exp, &mut temp)?;
        }
        out.push(temp.join(", "));
        Ok(())
    }

    pub(crate) fn transform_exp_list_low(
        &mut self,
        list: &ExpListLow,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut temp = Vec::new();
        for exp in &list.exprs {
            self.transform_exp(exp, &mut temp)?;
        }
        out.push(temp.join(", "));
        Ok(())
    }

    pub(crate) fn transform_value(
        &mut self,
        value: &Value,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        match &value.item {
            ValueItem::SimpleValue(simple) => self.transform_simple_value(simple, out),
            ValueItem::SimpleTable(table) => self.transform_simple_table(table, out),
            ValueItem::ChainValue(chain) => {
                self.transform_chain_value((**chain).clone(), out, ExpUsage::Closure, None)
            }
            ValueItem::Str(s) => self.transform_string(s, out),
        }
    }

    pub(crate) fn transform_simple_value(
        &mut self,
        simple: &SimpleValue,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        match &simple.value {
            SimpleValueKind::Const(node) => {
                out.push(node.text.clone());
                Ok(())
            }
            SimpleValueKind::If(node) => self.transform_if(node.clone(), out, ExpUsage::Closure),
            SimpleValueKind::Unless(node) => {
                self.transform_unless(node.clone(), out, ExpUsage::Closure)
            }
            SimpleValueKind::Switch(node) => self.transform_switch_closure(node.clone(), out),
            SimpleValueKind::With(node) => self.transform_with_closure(node.clone(), out),
            SimpleValueKind::ClassDecl(node) => {
                self.transform_class_decl_closure(node.clone(), out)
            }
            SimpleValueKind::ForEach(node) => self.transform_for_each_closure(node.clone(), out),
            SimpleValueKind::For(node) => self.transform_for_closure(node.clone(), out),
            SimpleValueKind::While(node) => self.transform_while_closure(node.clone(), out),
            SimpleValueKind::Do(node) => self.transform_do_closure(node.clone(), out),
            SimpleValueKind::UnaryExp(node) => self.transform_unary_exp(node, out),
            SimpleValueKind::TblComprehension(node) => {
                self.transform_tbl_comprehension(node.clone(), out, ExpUsage::Closure, None)
            }
            SimpleValueKind::TableLit(node) => self.transform_table_lit(node, out),
            SimpleValueKind::Comprehension(node) => {
                self.transform_comprehension(node.clone(), out, ExpUsage::Closure, None)
            }
            SimpleValueKind::FunLit(node) => self.transform_fun_lit(node, out),
            SimpleValueKind::Num(node) => {
                out.push(node.text.clone());
                Ok(())
            }
        }
    }

    pub(crate) fn transform_unary_exp(
        &mut self,
        unary: &UnaryExp,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut temp = vec![if unary.op == "not" {
            String::from("not ")
        } else {
            unary.op.clone()
        }];
        self.transform_exp(&unary.item, &mut temp)?;
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_parens(
        &mut self,
        parens: &Parens,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut temp = Vec::new();
        self.transform_exp(&parens.expr, &mut temp)?;
        out.push(format!("({})", temp.concat()));
        Ok(())
    }

    pub(crate) fn transform_fun_lit(
        &mut self,
        fun_lit: &FunLit,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut temp = Vec::new();
        let fat = fun_lit.fat;
        self.scopes.push();
        if fat {
            self.scopes.force_add("self");
        }
        let mut buf = String::new();
        if let Some(args_def) = &fun_lit.args_def {
            if let Err(err) = self.transform_fn_args_def(args_def, &mut temp) {
                self.scopes.pop();
                return Err(err);
            }
            if let Some(body) = &fun_lit.body {
                if let Err(err) = self.transform_body((**body).clone(), &mut temp, true) {
                    self.scopes.pop();
                    return Err(err);
                }
            } else {
                temp.push(String::new());
            }
            let args = temp[0].clone();
            let init_args = temp[1].clone();
            let body_codes = temp[2].clone();
            let params = if fat {
                if args.is_empty() {
                    String::from("self")
                } else {
                    format!("self, {}", args)
                }
            } else {
                args
            };
            buf.push_str(&format!("function({})", params));
            if !init_args.is_empty() || !body_codes.is_empty() {
                buf.push_str(&self.nlr(args_def.range));
                buf.push_str(&init_args);
                buf.push_str(&body_codes);
                self.scopes.pop();
                buf.push_str(&format!("{}end", self.indent()));
            } else {
                self.scopes.pop();
                buf.push_str(" end");
            }
        } else {
            if let Some(body) = &fun_lit.body {
                if let Err(err) = self.transform_body((**body).clone(), &mut temp, true) {
                    self.scopes.pop();
                    return Err(err);
                }
            } else {
                temp.push(String::new());
            }
            let body_codes = temp.last().cloned().unwrap_or_default();
            buf.push_str(&format!("function({})", if fat { "self" } else { "" }));
            if !body_codes.is_empty() {
                buf.push_str(&self.nll(fun_lit.range));
                buf.push_str(&body_codes);
                self.scopes.pop();
                buf.push_str(&format!("{}end", self.indent()));
            } else {
                self.scopes.pop();
                buf.push_str(" end");
            }
        }
        out.push(buf);
        Ok(())
    }

    /// Pushes two segments: the parameter list and the initialization
    /// lines (default values, `@field` assignments).
    pub(crate) fn transform_fn_args_def(
        &mut self,
        args_def: &FnArgsDef,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        match &args_def.def_list {
            None => {
                out.push(String::new());
                out.push(String::new());
            }
            Some(def_list) => self.transform_fn_arg_def_list(def_list, out)?,
        }
        if let Some(shadow) = &args_def.shadow {
            self.transform_outer_var_shadow(shadow);
        }
        Ok(())
    }

    fn transform_outer_var_shadow(&mut self, shadow: &OuterVarShadow) {
        self.scopes.mark_shadowed();
        if let Some(var_list) = &shadow.var_list {
            for name in &var_list.names {
                self.scopes.add_to_allow_list(&name.name.text);
            }
        }
    }

    fn transform_fn_arg_def_list(
        &mut self,
        def_list: &FnArgDefList,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        struct ArgItem {
            name: String,
            assign_self: String,
        }
        let mut arg_items: Vec<ArgItem> = Vec::new();
        let mut temp = Vec::new();
        let mut var_names = String::new();
        let mut assign_self = false;
        for def in &def_list.definitions {
            let (name, self_path) = match &def.name {
                FnArgName::Variable(var) => (var.name.text.to_string(), String::new()),
                FnArgName::SelfName(self_name) => {
                    assign_self = true;
                    match &self_name.kind {
                        SelfKind::ClassField(field) => (
                            field.text.to_string(),
                            format!("self.__class.{}", field.text),
                        ),
                        SelfKind::Class => (String::from("self.__class"), String::new()),
                        SelfKind::Field(field) => {
                            (field.text.to_string(), format!("self.{}", field.text))
                        }
                        SelfKind::Plain => (String::from("self"), String::new()),
                    }
                }
            };
            self.scopes.force_add(&name);
            if let Some(default) = &def.default_value {
                self.scopes.push();
                let assignment = ExpListAssign::new(
                    ExpList::var(&name, def.range),
                    Some(AssignAction::Assign(Assign::single(
                        AssignValue::Exp(default.clone()),
                        def.range,
                    ))),
                );
                let result = self.transform_assignment(assignment, &mut temp);
                self.scopes.pop();
                result?;
                let inner = temp.pop().unwrap_or_default();
                temp.push(format!(
                    "{}if {} == nil then{}{}{}end{}",
                    self.indent(),
                    name,
                    self.nll(def.range),
                    inner,
                    self.indent(),
                    self.nll(def.range)
                ));
            }
            if var_names.is_empty() {
                var_names = name.clone();
            } else {
                var_names.push_str(&format!(", {}", name));
            }
            arg_items.push(ArgItem {
                name,
                assign_self: self_path,
            });
        }
        if def_list.var_arg {
            if var_names.is_empty() {
                var_names = String::from("...");
            } else {
                var_names.push_str(", ...");
            }
        }
        let mut init_codes = temp.concat();
        if assign_self {
            let lefts: Vec<&str> = arg_items
                .iter()
                .filter(|item| !item.assign_self.is_empty())
                .map(|item| item.assign_self.as_str())
                .collect();
            let rights: Vec<&str> = arg_items
                .iter()
                .filter(|item| !item.assign_self.is_empty())
                .map(|item| item.name.as_str())
                .collect();
            init_codes.push_str(&format!(
                "{}{} = {}{}",
                self.indent(),
                lefts.join(", "),
                rights.join(", "),
                self.nll(def_list.range)
            ));
        }
        out.push(var_names);
        out.push(init_codes);
        Ok(())
    }

    // Strings.

    pub(crate) fn transform_string(
        &mut self,
        s: &Str,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        match &s.item {
            StrItem::Single(node) => self.transform_single_string(node, out),
            StrItem::Double(node) => self.transform_double_string(node, out),
            StrItem::Lua(node) => self.transform_lua_string(node, out),
        }
    }

    pub(crate) fn transform_single_string(
        &mut self,
        s: &SingleString,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let text = s.text.replace('\r', "").replace('\n', "\\n");
        out.push(text);
        Ok(())
    }

    pub(crate) fn transform_double_string(
        &mut self,
        s: &DoubleString,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut temp = Vec::new();
        for segment in &s.segments {
            match &segment.segment {
                DoubleStringSegment::Inner(text) => {
                    let text = text.replace('\r', "").replace('\n', "\\n");
                    temp.push(format!("\"{}\"", text));
                }
                DoubleStringSegment::Exp(exp) => {
                    let mut tmp = Vec::new();
                    self.transform_exp(exp, &mut tmp)?;
                    temp.push(format!("tostring({})", tmp.concat()));
                }
            }
        }
        out.push(if temp.is_empty() {
            String::from("\"\"")
        } else {
            temp.join(" .. ")
        });
        Ok(())
    }

    pub(crate) fn transform_lua_string(
        &mut self,
        s: &LuaString,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut content = s.content.replace('\r', "");
        if content.starts_with('\n') {
            content.remove(0);
        }
        out.push(format!("{}{}{}", s.open, content, s.close));
        Ok(())
    }

    // Tables.

    pub(crate) fn transform_table(
        &mut self,
        range: InputRange,
        entries: &[EntryRef<'_>],
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        if entries.is_empty() {
            out.push(String::from("{ }"));
            return Ok(());
        }
        let mut temp = Vec::new();
        self.scopes.push();
        let last = entries.len() - 1;
        for (i, entry) in entries.iter().enumerate() {
            let mut tmp = Vec::new();
            let result = match entry {
                EntryRef::Exp(exp) => self.transform_exp(exp, &mut tmp),
                EntryRef::Var(pair) => self.transform_variable_pair(pair, &mut tmp),
                EntryRef::Normal(pair) => self.transform_normal_pair(pair, &mut tmp),
            };
            if let Err(err) = result {
                self.scopes.pop();
                return Err(err);
            }
            temp.push(format!(
                "{}{}{}{}",
                self.indent(),
                tmp.concat(),
                if i == last { "" } else { "," },
                self.nll(entry.range())
            ));
        }
        let mut output = format!("{}{}{}", "{", self.nll(range), temp.concat());
        self.scopes.pop();
        output.push_str(&format!("{}{}", self.indent(), "}"));
        out.push(output);
        Ok(())
    }

    pub(crate) fn transform_table_lit(
        &mut self,
        table: &TableLit,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let entries: Vec<EntryRef<'_>> = table
            .values
            .iter()
            .map(|entry| match entry {
                TableEntry::Exp(exp) => EntryRef::Exp(exp),
                TableEntry::VariablePair(pair) => EntryRef::Var(pair),
                TableEntry::NormalPair(pair) => EntryRef::Normal(pair),
            })
            .collect();
        self.transform_table(table.range, &entries, out)
    }

    pub(crate) fn transform_simple_table(
        &mut self,
        table: &SimpleTable,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let entries: Vec<EntryRef<'_>> = table.pairs.iter().map(pair_entry).collect();
        self.transform_table(table.range, &entries, out)
    }

    pub(crate) fn transform_table_block(
        &mut self,
        table: &TableBlock,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let entries: Vec<EntryRef<'_>> = table.values.iter().map(pair_entry).collect();
        self.transform_table(table.range, &entries, out)
    }

    pub(crate) fn transform_variable_pair(
        &mut self,
        pair: &VariablePair,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let name = &pair.name.name.text;
        out.push(format!("{} = {}", name, name));
        Ok(())
    }

    pub(crate) fn transform_normal_pair(
        &mut self,
        pair: &NormalPair,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut temp = Vec::new();
        match &pair.key {
            PairKey::KeyName(key_name) => {
                self.transform_key_name(key_name, &mut temp)?;
                if is_lua_keyword(temp.last().map(String::as_str).unwrap_or_default()) {
                    let key = temp.pop().unwrap_or_default();
                    temp.push(format!("[\"{}\"]", key));
                }
            }
            PairKey::Exp(exp) => {
                self.transform_exp(exp, &mut temp)?;
                let key = temp.pop().unwrap_or_default();
                temp.push(format!("[{}]", key));
            }
            PairKey::DoubleString(s) => {
                self.transform_double_string(s, &mut temp)?;
                let key = temp.pop().unwrap_or_default();
                temp.push(format!("[{}]", key));
            }
            PairKey::SingleString(s) => {
                self.transform_single_string(s, &mut temp)?;
                let key = temp.pop().unwrap_or_default();
                temp.push(format!("[{}]", key));
            }
        }
        match &pair.value {
            PairValue::Exp(exp) => self.transform_exp(exp, &mut temp)?,
            PairValue::TableBlock(table) => self.transform_table_block(table, &mut temp)?,
        }
        let value = temp.pop().unwrap_or_default();
        let key = temp.pop().unwrap_or_default();
        out.push(format!("{} = {}", key, value));
        Ok(())
    }

    pub(crate) fn transform_key_name(
        &mut self,
        key_name: &KeyName,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        match &key_name.item {
            KeyNameItem::SelfName(self_name) => {
                let text = self.transform_self_name(self_name, None)?;
                out.push(text);
                Ok(())
            }
            KeyNameItem::Name(name) => {
                out.push(name.text.to_string());
                Ok(())
            }
        }
    }
}

fn pair_entry(pair: &TablePair) -> EntryRef<'_> {
    match pair {
        TablePair::Variable(pair) => EntryRef::Var(pair),
        TablePair::Normal(pair) => EntryRef::Normal(pair),
    }
}
