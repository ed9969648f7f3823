// Chain lowering: base values followed by dot/colon/index/invoke items,
// existential `?` splits and colon-chain method closures.

use super::{Compiler, ExpUsage, single_variable_from_items};
use crate::ast::*;
use crate::error::CompileError;
use crate::grammar::is_keyword;
use crate::parser::InputRange;

/// Mutable handle on the invocation following a callable, for the
/// self-prepending rewrites of keyword-named members.
pub(crate) enum InvokeRef<'x> {
    Invoke(&'x mut Invoke),
    InvokeArgs(&'x mut InvokeArgs),
}

impl InvokeRef<'_> {
    fn prepend(&mut self, exp: Exp) {
        match self {
            InvokeRef::Invoke(invoke) => invoke.args.insert(0, InvokeArg::Exp(exp)),
            InvokeRef::InvokeArgs(invoke_args) => {
                invoke_args.args.insert(0, InvokeArgsItem::Exp(exp))
            }
        }
    }
}

impl Compiler {
    pub(crate) fn transform_chain_value(
        &mut self,
        chain: ChainValue,
        out: &mut Vec<String>,
        usage: ExpUsage,
        assign_list: Option<&ExpList>,
    ) -> Result<(), CompileError> {
        let range = chain.range;
        let items = chain.items;
        if self.try_chain_end_with_colon(&items, range, out, usage, assign_list)? {
            return Ok(());
        }
        if self.try_chain_end_with_eop(&items, range, out, usage, assign_list)? {
            return Ok(());
        }
        if self.try_chain_with_eop(&items, range, out, usage, assign_list)? {
            return Ok(());
        }
        self.transform_chain_list(items, range, out, usage, assign_list)
    }

    pub(crate) fn transform_assignable_chain(
        &mut self,
        chain: &AssignableChain,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        self.transform_chain_list(
            chain.items.clone(),
            chain.range,
            out,
            ExpUsage::Closure,
            None,
        )
    }

    /// A chain ending in `\name` with no invocation is a method
    /// closure: bind the base and the function once, then forward.
    fn try_chain_end_with_colon(
        &mut self,
        items: &[ChainItem],
        range: InputRange,
        out: &mut Vec<String>,
        usage: ExpUsage,
        assign_list: Option<&ExpList>,
    ) -> Result<bool, CompileError> {
        let Some(ChainItem::ColonChain(colon)) = items.last() else {
            return Ok(false);
        };
        let mut temp = Vec::new();
        match usage {
            ExpUsage::Assignment => {
                temp.push(format!("{}do{}", self.indent(), self.nll(range)));
                self.scopes.push();
            }
            ExpUsage::Closure => {
                temp.push(format!("(function(){}", self.nll(range)));
                self.scopes.push();
            }
            _ => {}
        }
        let mut base_items: Vec<ChainItem> = Vec::new();
        if matches!(
            items.first(),
            Some(ChainItem::DotChain(_)) | Some(ChainItem::ColonChain(_))
        ) {
            let with_var = self.with_vars.last().cloned();
            match with_var {
                Some(with_var) => {
                    base_items.push(ChainItem::Callable(Box::new(Callable::var(&with_var, range))));
                }
                None => {
                    return Err(self.logic_error(
                        "Short dot/colon syntax must be called within a with block.",
                        range,
                    ));
                }
            }
        }
        base_items.extend(items[..items.len() - 1].iter().cloned());
        let func_name = colon.name.text.clone();
        let base_var = self.scopes.fresh("_base_");
        let fn_var = self.scopes.fresh("_fn_");
        let assignment = ExpListAssign::new(
            ExpList::var(&base_var, range),
            Some(AssignAction::Assign(Assign::single(
                AssignValue::Exp(Exp::from_chain(ChainValue {
                    range,
                    items: base_items,
                })),
                range,
            ))),
        );
        self.transform_assignment(assignment, &mut temp)?;
        let fn_chain = ChainValue {
            range,
            items: vec![
                ChainItem::Callable(Box::new(Callable::var(&base_var, range))),
                ChainItem::DotChain(DotChainItem {
                    range,
                    name: Name::synth(&func_name, range),
                }),
            ],
        };
        let assignment = ExpListAssign::new(
            ExpList::var(&fn_var, range),
            Some(AssignAction::Assign(Assign::single(
                AssignValue::Exp(Exp::from_chain(fn_chain)),
                range,
            ))),
        );
        self.transform_assignment(assignment, &mut temp)?;
        let fun_exp = Exp::from_value(Value::from_simple(
            SimpleValueKind::FunLit(method_closure(&base_var, &fn_var, range)),
            range,
        ));
        match usage {
            ExpUsage::Closure | ExpUsage::Return => {
                let ret = Return {
                    range,
                    value_list: Some(ExpListLow::single(fun_exp)),
                };
                self.transform_return(ret, &mut temp)?;
            }
            ExpUsage::Assignment => {
                if let Some(list) = assign_list {
                    let assignment = ExpListAssign::new(
                        list.clone(),
                        Some(AssignAction::Assign(Assign::single(
                            AssignValue::Exp(fun_exp),
                            range,
                        ))),
                    );
                    self.transform_assignment(assignment, &mut temp)?;
                }
            }
            ExpUsage::Common => {}
        }
        match usage {
            ExpUsage::Assignment => {
                self.scopes.pop();
                temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
            }
            ExpUsage::Closure => {
                self.scopes.pop();
                temp.push(format!("{}end)()", self.indent()));
            }
            _ => {}
        }
        out.push(temp.concat());
        Ok(true)
    }

    /// A trailing `?` rewrites the whole chain to `(prefix ~= nil)`.
    fn try_chain_end_with_eop(
        &mut self,
        items: &[ChainItem],
        range: InputRange,
        out: &mut Vec<String>,
        usage: ExpUsage,
        assign_list: Option<&ExpList>,
    ) -> Result<bool, CompileError> {
        if !matches!(items.last(), Some(ChainItem::Existential)) {
            return Ok(false);
        }
        let inner = items[..items.len() - 1].to_vec();
        let exp = Exp {
            range,
            value: Box::new(Value::from_chain(ChainValue { range, items: inner })),
            op_values: vec![ExpOpValue {
                range,
                op: ExpOp::Binary(String::from("!=")),
                value: Value::from_simple(
                    SimpleValueKind::Const(ConstValue {
                        range,
                        text: String::from("nil"),
                    }),
                    range,
                ),
            }],
        };
        let parens = Parens {
            range,
            expr: Box::new(exp),
        };
        match usage {
            ExpUsage::Assignment => {
                if let Some(list) = assign_list {
                    let callable = Callable {
                        range,
                        item: CallableItem::Parens(parens),
                    };
                    let chain = ChainValue {
                        range,
                        items: vec![ChainItem::Callable(Box::new(callable))],
                    };
                    let assignment = ExpListAssign::new(
                        list.clone(),
                        Some(AssignAction::Assign(Assign::single(
                            AssignValue::Exp(Exp::from_chain(chain)),
                            range,
                        ))),
                    );
                    self.transform_assignment(assignment, out)?;
                }
            }
            ExpUsage::Return => {
                self.transform_parens(&parens, out)?;
                if let Some(last) = out.last_mut() {
                    last.insert_str(0, &format!("{}return ", self.indent()));
                    last.push_str(&self.nlr(range));
                }
            }
            _ => self.transform_parens(&parens, out)?,
        }
        Ok(true)
    }

    /// A `?` mid-chain binds the prefix and guards the remainder with
    /// `if _obj_N ~= nil then`.
    fn try_chain_with_eop(
        &mut self,
        items: &[ChainItem],
        range: InputRange,
        out: &mut Vec<String>,
        usage: ExpUsage,
        assign_list: Option<&ExpList>,
    ) -> Result<bool, CompileError> {
        let Some(op_idx) = items
            .iter()
            .position(|item| matches!(item, ChainItem::Existential))
        else {
            return Ok(false);
        };
        let mut temp = Vec::new();
        if usage == ExpUsage::Closure {
            temp.push(format!("(function(){}", self.nll(range)));
            self.scopes.push();
        }
        let mut part_one: Vec<ChainItem> = items[..op_idx].to_vec();
        if let Some(ChainItem::Callable(callable)) = part_one.last() {
            if let CallableItem::SelfName(self_name) = &callable.item {
                let item_range = callable.range;
                let rewrite = match &self_name.kind {
                    SelfKind::Field(name) => Some((SelfKind::Plain, name.clone())),
                    SelfKind::ClassField(name) => Some((SelfKind::Class, name.clone())),
                    _ => None,
                };
                if let Some((kind, name)) = rewrite {
                    part_one.pop();
                    part_one.push(ChainItem::Callable(Box::new(Callable {
                        range: item_range,
                        item: CallableItem::SelfName(SelfName {
                            range: item_range,
                            kind,
                        }),
                    })));
                    part_one.push(ChainItem::ColonChain(ColonChainItem {
                        range: item_range,
                        name,
                        is_lua_keyword: false,
                        switch_to_dot: false,
                    }));
                }
            }
        }
        let mut rest: Vec<ChainItem> = items[op_idx + 1..].to_vec();
        let mut obj_var = single_variable_from_items(&part_one)
            .map(|s| s.to_string())
            .unwrap_or_default();
        if obj_var.is_empty() {
            obj_var = self.scopes.fresh("_obj_");
            if matches!(part_one.last(), Some(ChainItem::ColonChain(_))) {
                let colon = match part_one.pop() {
                    Some(ChainItem::ColonChain(colon)) => colon,
                    _ => unreachable!(),
                };
                let mut base_items = part_one.clone();
                if base_items.is_empty() {
                    let with_var = self.with_vars.last().cloned();
                    match with_var {
                        Some(with_var) => base_items.push(ChainItem::Callable(Box::new(
                            Callable::var(&with_var, range),
                        ))),
                        None => {
                            return Err(self.logic_error(
                                "Short dot/colon syntax must be called within a with block.",
                                range,
                            ));
                        }
                    }
                }
                match single_variable_from_items(&base_items) {
                    Some(new_obj) => obj_var = new_obj.to_string(),
                    None => {
                        let assignment = ExpListAssign::new(
                            ExpList::var(&obj_var, range),
                            Some(AssignAction::Assign(Assign::single(
                                AssignValue::Exp(Exp::from_chain(ChainValue {
                                    range,
                                    items: base_items,
                                })),
                                range,
                            ))),
                        );
                        self.transform_assignment(assignment, &mut temp)?;
                    }
                }
                part_one.clear();
                part_one.push(ChainItem::Callable(Box::new(Callable::var(&obj_var, range))));
                part_one.push(ChainItem::DotChain(DotChainItem {
                    range: colon.range,
                    name: colon.name,
                }));
                if let Some(first) = rest.first_mut() {
                    match first {
                        ChainItem::Invoke(invoke) => invoke
                            .args
                            .insert(0, InvokeArg::Exp(Exp::var(&obj_var, range))),
                        ChainItem::InvokeArgs(invoke_args) => invoke_args
                            .args
                            .insert(0, InvokeArgsItem::Exp(Exp::var(&obj_var, range))),
                        _ => {}
                    }
                }
                obj_var = self.scopes.fresh("_obj_");
            }
            let assignment = ExpListAssign::new(
                ExpList::var(&obj_var, range),
                Some(AssignAction::Assign(Assign::single(
                    AssignValue::Exp(Exp::from_chain(ChainValue {
                        range,
                        items: part_one.clone(),
                    })),
                    range,
                ))),
            );
            self.transform_assignment(assignment, &mut temp)?;
        }
        temp.push(format!(
            "{}if {} ~= nil then{}",
            self.indent(),
            obj_var,
            self.nll(range)
        ));
        self.scopes.push();
        let mut part_two: Vec<ChainItem> =
            vec![ChainItem::Callable(Box::new(Callable::var(&obj_var, range)))];
        part_two.extend(rest);
        let part_two_chain = ChainValue {
            range,
            items: part_two,
        };
        match usage {
            ExpUsage::Common => {
                self.transform_chain_value(part_two_chain, &mut temp, ExpUsage::Common, None)?;
            }
            ExpUsage::Assignment => {
                if let Some(list) = assign_list {
                    let assignment = ExpListAssign::new(
                        list.clone(),
                        Some(AssignAction::Assign(Assign::single(
                            AssignValue::Exp(Exp::from_chain(part_two_chain)),
                            range,
                        ))),
                    );
                    self.transform_assignment(assignment, &mut temp)?;
                }
            }
            ExpUsage::Return | ExpUsage::Closure => {
                let ret = Return {
                    range,
                    value_list: Some(ExpListLow::single(Exp::from_chain(part_two_chain))),
                };
                self.transform_return(ret, &mut temp)?;
            }
        }
        self.scopes.pop();
        temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
        match usage {
            ExpUsage::Return => {
                temp.push(format!("{}return nil{}", self.indent(), self.nlr(range)));
            }
            ExpUsage::Closure => {
                temp.push(format!("{}return nil{}", self.indent(), self.nlr(range)));
                self.scopes.pop();
                temp.push(format!("{}end)()", self.indent()));
            }
            _ => {}
        }
        out.push(temp.concat());
        Ok(true)
    }

    pub(crate) fn transform_chain_list(
        &mut self,
        mut items: Vec<ChainItem>,
        range: InputRange,
        out: &mut Vec<String>,
        usage: ExpUsage,
        assign_list: Option<&ExpList>,
    ) -> Result<(), CompileError> {
        let mut temp = Vec::new();
        if matches!(
            items.first(),
            Some(ChainItem::DotChain(_)) | Some(ChainItem::ColonChain(_))
        ) {
            match self.with_vars.last().cloned() {
                Some(with_var) => temp.push(with_var),
                None => {
                    return Err(self.logic_error(
                        "Short dot/colon syntax must be called within a with block.",
                        range,
                    ));
                }
            }
        }
        let mut i = 0;
        while i < items.len() {
            match &items[i] {
                ChainItem::Invoke(invoke) => {
                    let invoke = invoke.clone();
                    self.transform_invoke(&invoke, &mut temp)?;
                }
                ChainItem::DotChain(dot) => {
                    let name = dot.name.text.clone();
                    if is_keyword(&name) {
                        temp.push(format!("[\"{}\"]", name));
                    } else {
                        temp.push(format!(".{}", name));
                    }
                }
                ChainItem::ColonChain(colon_item) => {
                    let colon = colon_item.clone();
                    let cur_idx = if i > 0 && matches!(items[i - 1], ChainItem::Existential) {
                        i - 1
                    } else {
                        i
                    };
                    let mut follow_idx = i + 1;
                    if matches!(items.get(follow_idx), Some(ChainItem::Existential)) {
                        follow_idx += 1;
                    }
                    let follow_is_invoke = matches!(
                        items.get(follow_idx),
                        Some(ChainItem::Invoke(_)) | Some(ChainItem::InvokeArgs(_))
                    );
                    if !follow_is_invoke {
                        return Err(self.logic_error(
                            "Colon chain item must be followed by invoke arguments.",
                            colon.range,
                        ));
                    }
                    if colon.is_lua_keyword {
                        return self.transform_keyword_colon_call(
                            items,
                            range,
                            i,
                            cur_idx,
                            colon,
                            out,
                            usage,
                            assign_list,
                        );
                    }
                    temp.push(format!(
                        "{}{}",
                        if colon.switch_to_dot { "." } else { ":" },
                        colon.name.text
                    ));
                }
                ChainItem::Slice(slice) => {
                    return Err(self.logic_error("Slice syntax not supported here.", slice.range));
                }
                ChainItem::Callable(callable) => {
                    let callable = (**callable).clone();
                    let follows_invoke = matches!(
                        items.get(i + 1),
                        Some(ChainItem::Invoke(_)) | Some(ChainItem::InvokeArgs(_))
                    );
                    if follows_invoke {
                        let (_, right) = items.split_at_mut(i + 1);
                        let invoke = match &mut right[0] {
                            ChainItem::Invoke(invoke) => Some(InvokeRef::Invoke(invoke)),
                            ChainItem::InvokeArgs(invoke_args) => {
                                Some(InvokeRef::InvokeArgs(invoke_args))
                            }
                            _ => None,
                        };
                        self.transform_callable(&callable, &mut temp, invoke)?;
                    } else {
                        self.transform_callable(&callable, &mut temp, None)?;
                    }
                }
                ChainItem::Str(s) => {
                    let s = s.clone();
                    let mut tmp = Vec::new();
                    self.transform_string(&s, &mut tmp)?;
                    temp.push(format!("({})", tmp.concat()));
                }
                ChainItem::Index(exp) => {
                    let exp = exp.clone();
                    let mut tmp = Vec::new();
                    self.transform_exp(&exp, &mut tmp)?;
                    temp.push(format!("[{}]", tmp.concat()));
                }
                ChainItem::InvokeArgs(invoke_args) => {
                    let invoke_args = invoke_args.clone();
                    self.transform_invoke_args(&invoke_args, &mut temp)?;
                }
                ChainItem::Existential => {}
            }
            i += 1;
        }
        match usage {
            ExpUsage::Common => out.push(format!(
                "{}{}{}",
                self.indent(),
                temp.concat(),
                self.nll(range)
            )),
            ExpUsage::Return => out.push(format!(
                "{}return {}{}",
                self.indent(),
                temp.concat(),
                self.nll(range)
            )),
            _ => out.push(temp.concat()),
        }
        Ok(())
    }

    /// `obj\end args` and friends: a colon call whose method name is a
    /// Lua keyword cannot use `:`; bind the receiver and index with a
    /// string key, passing the receiver explicitly.
    #[allow(clippy::too_many_arguments)]
    fn transform_keyword_colon_call(
        &mut self,
        items: Vec<ChainItem>,
        range: InputRange,
        colon_idx: usize,
        cur_idx: usize,
        colon: ColonChainItem,
        out: &mut Vec<String>,
        usage: ExpUsage,
        assign_list: Option<&ExpList>,
    ) -> Result<(), CompileError> {
        let mut statements: Vec<Statement> = Vec::new();
        let mut base_items: Vec<ChainItem> = Vec::new();
        if matches!(
            items.first(),
            Some(ChainItem::DotChain(_)) | Some(ChainItem::ColonChain(_))
        ) {
            if let Some(with_var) = self.with_vars.last().cloned() {
                base_items.push(ChainItem::Callable(Box::new(Callable::var(&with_var, range))));
            }
        }
        base_items.extend(items[..cur_idx].iter().cloned());
        let mut call_var = single_variable_from_items(&base_items)
            .map(|s| s.to_string())
            .unwrap_or_default();
        if call_var.is_empty() {
            call_var = self.scopes.fresh("_call_");
            let assignment = ExpListAssign::new(
                ExpList::var(&call_var, range),
                Some(AssignAction::Assign(Assign::single(
                    AssignValue::Exp(Exp::from_chain(ChainValue {
                        range,
                        items: base_items,
                    })),
                    range,
                ))),
            );
            statements.push(Statement {
                range,
                content: StatementContent::ExpListAssign(assignment),
                appendix: None,
            });
        }
        let mut chain_items: Vec<ChainItem> =
            vec![ChainItem::Callable(Box::new(Callable::var(&call_var, range)))];
        if cur_idx != colon_idx {
            chain_items.push(ChainItem::Existential);
        }
        chain_items.push(ChainItem::Index(Exp::string_lit(&colon.name.text, range)));
        let mut rest: Vec<ChainItem> = items[colon_idx + 1..].to_vec();
        for item in rest.iter_mut().take(2) {
            match item {
                ChainItem::Invoke(invoke) => {
                    invoke
                        .args
                        .insert(0, InvokeArg::Exp(Exp::var(&call_var, range)));
                    break;
                }
                ChainItem::InvokeArgs(invoke_args) => {
                    invoke_args
                        .args
                        .insert(0, InvokeArgsItem::Exp(Exp::var(&call_var, range)));
                    break;
                }
                _ => {}
            }
        }
        chain_items.extend(rest);
        statements.push(Statement::from_exp(Exp::from_chain(ChainValue {
            range,
            items: chain_items,
        })));
        let block = Block { range, statements };
        match usage {
            ExpUsage::Common => self.transform_block(block, out, false),
            ExpUsage::Return => self.transform_block(block, out, true),
            ExpUsage::Assignment => {
                let mut body = Body::from_block(block);
                if let Some(list) = assign_list {
                    self.assign_last_explist(list, &mut body);
                }
                match body.content {
                    BodyContent::Block(block) => self.transform_block(block, out, false),
                    BodyContent::Statement(stmt) => self.transform_codes(vec![*stmt], out, false),
                }
            }
            ExpUsage::Closure => {
                let fun = FunLit {
                    range,
                    args_def: None,
                    fat: false,
                    body: Some(Box::new(Body::from_block(block))),
                };
                let parens = Parens {
                    range,
                    expr: Box::new(Exp::from_value(Value::from_simple(
                        SimpleValueKind::FunLit(fun),
                        range,
                    ))),
                };
                let chain = ChainValue {
                    range,
                    items: vec![
                        ChainItem::Callable(Box::new(Callable {
                            range,
                            item: CallableItem::Parens(parens),
                        })),
                        ChainItem::Invoke(Invoke {
                            range,
                            args: Vec::new(),
                        }),
                    ],
                };
                self.transform_chain_value(chain, out, ExpUsage::Closure, None)
            }
        }
    }

    pub(crate) fn transform_callable(
        &mut self,
        callable: &Callable,
        out: &mut Vec<String>,
        invoke: Option<InvokeRef<'_>>,
    ) -> Result<(), CompileError> {
        match &callable.item {
            CallableItem::Variable(var) => {
                let name = var.name.text.clone();
                out.push(name.to_string());
                if self.lint && !self.scopes.is_defined(&name) {
                    self.register_global(&name, var.range);
                }
            }
            CallableItem::SelfName(self_name) => {
                let text = self.transform_self_name(self_name, invoke)?;
                out.push(text);
                if self.lint && !self.scopes.is_defined("self") {
                    self.register_global("self", self_name.range);
                }
            }
            CallableItem::VarArg => out.push(String::from("...")),
            CallableItem::Parens(parens) => self.transform_parens(parens, out)?,
        }
        Ok(())
    }

    pub(crate) fn transform_self_name(
        &mut self,
        self_name: &SelfName,
        invoke: Option<InvokeRef<'_>>,
    ) -> Result<String, CompileError> {
        let range = self_name.range;
        Ok(match &self_name.kind {
            SelfKind::ClassField(name) => {
                if crate::grammar::is_lua_keyword(&name.text) {
                    if let Some(mut invoke) = invoke {
                        invoke.prepend(Exp::from_chain(ChainValue::dotted("self.__class", range)));
                    }
                    format!("self.__class[\"{}\"]", name.text)
                } else {
                    format!(
                        "self.__class{}{}",
                        if invoke.is_some() { ":" } else { "." },
                        name.text
                    )
                }
            }
            SelfKind::Class => String::from("self.__class"),
            SelfKind::Field(name) => {
                if crate::grammar::is_lua_keyword(&name.text) {
                    if let Some(mut invoke) = invoke {
                        invoke.prepend(Exp::var("self", range));
                    }
                    format!("self[\"{}\"]", name.text)
                } else {
                    format!(
                        "self{}{}",
                        if invoke.is_some() { ":" } else { "." },
                        name.text
                    )
                }
            }
            SelfKind::Plain => String::from("self"),
        })
    }

    pub(crate) fn transform_invoke(
        &mut self,
        invoke: &Invoke,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut temp = Vec::new();
        for arg in &invoke.args {
            match arg {
                InvokeArg::Exp(exp) => self.transform_exp(exp, &mut temp)?,
                InvokeArg::SingleString(s) => self.transform_single_string(s, &mut temp)?,
                InvokeArg::DoubleString(s) => self.transform_double_string(s, &mut temp)?,
                InvokeArg::LuaString(s) => self.transform_lua_string(s, &mut temp)?,
            }
        }
        out.push(format!("({})", temp.join(", ")));
        Ok(())
    }

    pub(crate) fn transform_invoke_args(
        &mut self,
        invoke_args: &InvokeArgs,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut temp = Vec::new();
        for arg in &invoke_args.args {
            match arg {
                InvokeArgsItem::Exp(exp) => self.transform_exp(exp, &mut temp)?,
                InvokeArgsItem::TableBlock(table) => self.transform_table_block(table, &mut temp)?,
            }
        }
        out.push(format!("({})", temp.join(", ")));
        Ok(())
    }
}

/// `function(...) return _fn_0(_base_0, ...) end`
fn method_closure(base_var: &str, fn_var: &str, range: InputRange) -> FunLit {
    let vararg_exp = Exp::from_chain(ChainValue {
        range,
        items: vec![ChainItem::Callable(Box::new(Callable {
            range,
            item: CallableItem::VarArg,
        }))],
    });
    let call = ChainValue {
        range,
        items: vec![
            ChainItem::Callable(Box::new(Callable::var(fn_var, range))),
            ChainItem::Invoke(Invoke {
                range,
                args: vec![
                    InvokeArg::Exp(Exp::var(base_var, range)),
                    InvokeArg::Exp(vararg_exp),
                ],
            }),
        ],
    };
    FunLit {
        range,
        args_def: Some(FnArgsDef {
            range,
            def_list: Some(FnArgDefList {
                range,
                definitions: Vec::new(),
                var_arg: true,
            }),
            shadow: None,
        }),
        fat: false,
        body: Some(Box::new(Body::from_statement(Statement::from_exp(
            Exp::from_chain(call),
        )))),
    }
}
