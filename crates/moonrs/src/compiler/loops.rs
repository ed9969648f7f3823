// Loop lowering: numeric and generic `for`, `while`, loop bodies with
// `continue`, the accumulating value-position forms, and list/table
// comprehensions including bare-slice `*` iteration.

use super::{Compiler, ExpUsage, single_value, single_variable_from};
use crate::ast::walk::{self, NodeMut, Traversal};
use crate::ast::*;
use crate::error::CompileError;
use crate::parser::InputRange;

pub(crate) enum LoopTarget {
    Star(StarExp),
    Exp(Exp),
    ExpList(ExpList),
}

/// `continue` detection: does the body contain one that belongs to
/// this loop rather than a nested `for`?
fn body_has_continue(body: &mut Body) -> bool {
    walk::walk_body(body, &mut |node| match node {
        NodeMut::For(_) | NodeMut::ForEach(_) => Traversal::Return,
        NodeMut::BreakLoop(break_loop) => {
            if break_loop.kind == BreakKind::Continue {
                Traversal::Stop
            } else {
                Traversal::Return
            }
        }
        _ => Traversal::Continue,
    }) == Traversal::Stop
}

impl Compiler {
    /// Emits the `for ... do` head plus the loop-variable bindings for
    /// a generic iteration; leaves the loop scope pushed.
    pub(crate) fn transform_for_each_head(
        &mut self,
        name_list: AssignableNameList,
        target: LoopTarget,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let head_range = name_list.range;
        let mut temp: Vec<String> = Vec::new();
        let mut vars: Vec<String> = Vec::new();
        let mut var_before: Vec<String> = Vec::new();
        let mut var_after: Vec<String> = Vec::new();
        let mut destruct_pairs: Vec<(TableLit, String)> = Vec::new();
        for item in name_list.items {
            match item.item {
                NameOrDestructureItem::Name(var) => {
                    vars.push(var.name.text.to_string());
                    var_after.push(var.name.text.to_string());
                }
                NameOrDestructureItem::Destructure(table) => {
                    let des_var = self.scopes.fresh("_des_");
                    vars.push(des_var.clone());
                    var_after.push(des_var.clone());
                    destruct_pairs.push((table, des_var));
                }
            }
        }
        match target {
            LoopTarget::Star(star) => {
                let star_range = star.range;
                let index_var = self.scopes.fresh("_index_");
                var_after.push(index_var.clone());
                let Some(value) = single_value(&star.value) else {
                    return Err(self.logic_error("Invalid star syntax.", star_range));
                };
                let mut list_var = single_variable_from(&star.value)
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                let mut slice_handled = false;
                if let ValueItem::ChainValue(chain) = &value.item {
                    if matches!(chain.items.last(), Some(ChainItem::Slice(_))) {
                        slice_handled = true;
                        let mut chain_items = chain.items.clone();
                        if list_var.is_empty() && chain_items.len() == 2 {
                            if let ChainItem::Callable(callable) = &chain_items[0] {
                                let callable = (**callable).clone();
                                let mut tmp = Vec::new();
                                self.transform_callable(&callable, &mut tmp, None)?;
                                list_var = tmp.concat();
                            }
                        }
                        let slice = match chain_items.pop() {
                            Some(ChainItem::Slice(slice)) => slice,
                            _ => unreachable!(),
                        };
                        let start_value = match &slice.start {
                            Some(exp) => {
                                let mut tmp = Vec::new();
                                self.transform_exp(exp, &mut tmp)?;
                                tmp.concat()
                            }
                            None => String::from("1"),
                        };
                        let stop_value = match &slice.stop {
                            Some(exp) => {
                                let mut tmp = Vec::new();
                                self.transform_exp(exp, &mut tmp)?;
                                tmp.concat()
                            }
                            None => String::new(),
                        };
                        let step_value = match &slice.step {
                            Some(exp) => {
                                let mut tmp = Vec::new();
                                self.transform_exp(exp, &mut tmp)?;
                                tmp.concat()
                            }
                            None => String::new(),
                        };
                        let mut buf = String::new();
                        if list_var.is_empty() {
                            list_var = self.scopes.fresh("_list_");
                            var_before.push(list_var.clone());
                            let mut tmp = Vec::new();
                            self.transform_chain_value(
                                ChainValue {
                                    range: star_range,
                                    items: chain_items,
                                },
                                &mut tmp,
                                ExpUsage::Closure,
                                None,
                            )?;
                            buf.push_str(&format!(
                                "{}local {} = {}{}",
                                self.indent(),
                                list_var,
                                tmp.concat(),
                                self.nll(head_range)
                            ));
                        }
                        let mut max_var = String::new();
                        if !stop_value.is_empty() {
                            max_var = self.scopes.fresh("_max_");
                            var_before.push(max_var.clone());
                            buf.push_str(&format!(
                                "{}local {} = {}{}",
                                self.indent(),
                                max_var,
                                stop_value,
                                self.nll(head_range)
                            ));
                        }
                        buf.push_str(&format!(
                            "{}for {} = {}, ",
                            self.indent(),
                            index_var,
                            start_value
                        ));
                        if stop_value.is_empty() {
                            buf.push_str(&format!("#{}", list_var));
                        } else {
                            buf.push_str(&format!(
                                "{} < 0 and #{} + {} or {}",
                                max_var, list_var, max_var, max_var
                            ));
                        }
                        if !step_value.is_empty() {
                            buf.push_str(&format!(", {}", step_value));
                        }
                        buf.push_str(&format!(" do{}", self.nlr(star_range)));
                        buf.push_str(&format!(
                            "{}local {} = {}[{}]{}",
                            self.indent_level(1),
                            vars.join(", "),
                            list_var,
                            index_var,
                            self.nll(head_range)
                        ));
                        temp.push(buf);
                    }
                }
                if !slice_handled {
                    let new_list = list_var.is_empty();
                    if new_list {
                        list_var = self.scopes.fresh("_list_");
                        var_before.push(list_var.clone());
                    }
                    let mut tmp = Vec::new();
                    self.transform_exp(&star.value, &mut tmp)?;
                    let mut buf = String::new();
                    if new_list {
                        buf.push_str(&format!(
                            "{}local {} = {}{}",
                            self.indent(),
                            list_var,
                            tmp.concat(),
                            self.nll(head_range)
                        ));
                    }
                    buf.push_str(&format!(
                        "{}for {} = 1, #{} do{}",
                        self.indent(),
                        index_var,
                        list_var,
                        self.nlr(star_range)
                    ));
                    buf.push_str(&format!(
                        "{}local {} = {}[{}]{}",
                        self.indent_level(1),
                        vars.join(", "),
                        list_var,
                        index_var,
                        self.nll(head_range)
                    ));
                    temp.push(buf);
                }
            }
            LoopTarget::Exp(exp) => {
                let mut tmp = Vec::new();
                self.transform_exp(&exp, &mut tmp)?;
                temp.push(format!(
                    "{}for {} in {} do{}",
                    self.indent(),
                    vars.join(", "),
                    tmp.concat(),
                    self.nlr(exp.range)
                ));
            }
            LoopTarget::ExpList(list) => {
                let mut tmp = Vec::new();
                self.transform_exp_list(&list, &mut tmp)?;
                temp.push(format!(
                    "{}for {} in {} do{}",
                    self.indent(),
                    vars.join(", "),
                    tmp.concat(),
                    self.nlr(list.range)
                ));
            }
        }
        for var in &var_before {
            self.scopes.add_to_scope(var);
        }
        self.scopes.push();
        for var in &var_after {
            self.scopes.add_to_scope(var);
        }
        if !destruct_pairs.is_empty() {
            let mut tmp = Vec::new();
            for (table, des_var) in destruct_pairs {
                let range = table.range;
                let exp_list = ExpList::single(Exp::from_value(Value::from_simple(
                    SimpleValueKind::TableLit(table),
                    range,
                )));
                let assignment = ExpListAssign::new(
                    exp_list,
                    Some(AssignAction::Assign(Assign::single(
                        AssignValue::Exp(Exp::var(&des_var, range)),
                        range,
                    ))),
                );
                self.transform_assignment(assignment, &mut tmp)?;
            }
            if let Some(last) = temp.last_mut() {
                last.push_str(&tmp.concat());
            }
        }
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_comp_for_each(
        &mut self,
        comp: CompForEach,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let target = match comp.loop_value {
            CompForTarget::Star(star) => LoopTarget::Star(star),
            CompForTarget::Exp(exp) => LoopTarget::Exp(*exp),
        };
        self.transform_for_each_head(comp.name_list, target, out)
    }

    fn transform_for_head(
        &mut self,
        var: &Variable,
        start: &Exp,
        stop: &Exp,
        step: Option<&Exp>,
        range: InputRange,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let mut tmp = Vec::new();
        self.transform_exp(start, &mut tmp)?;
        self.transform_exp(stop, &mut tmp)?;
        if let Some(step) = step {
            self.transform_exp(step, &mut tmp)?;
        } else {
            tmp.push(String::new());
        }
        let step_text = tmp.pop().unwrap_or_default();
        let stop_text = tmp.pop().unwrap_or_default();
        let start_text = tmp.pop().unwrap_or_default();
        let var_name = var.name.text.to_string();
        out.push(format!(
            "{}for {} = {}, {}{} do{}",
            self.indent(),
            var_name,
            start_text,
            stop_text,
            if step_text.is_empty() {
                String::new()
            } else {
                format!(", {}", step_text)
            },
            self.nll(range)
        ));
        self.scopes.push();
        self.scopes.add_to_scope(&var_name);
        Ok(())
    }

    /// Wraps a body containing `continue` into `repeat ... until true`
    /// with a completion flag checked after the loop iteration.
    pub(crate) fn transform_loop_body(
        &mut self,
        body: Body,
        out: &mut Vec<String>,
        append_content: &str,
    ) -> Result<(), CompileError> {
        let mut body = body;
        let range = body.range;
        let with_continue = body_has_continue(&mut body);
        let mut temp = Vec::new();
        if with_continue {
            let continue_var = self.scopes.fresh("_continue_");
            self.scopes.add_to_scope(&continue_var);
            temp.push(format!(
                "{}local {} = false{}{}repeat{}",
                self.indent(),
                continue_var,
                self.nll(range),
                self.indent(),
                self.nll(range)
            ));
            self.continue_vars.push(continue_var);
            self.scopes.push();
        }
        self.transform_body(body, &mut temp, false)?;
        if with_continue {
            let continue_var = self.continue_vars.last().cloned().unwrap_or_default();
            let mut buf = String::new();
            if !append_content.is_empty() {
                buf.push_str(&format!("{}{}", self.indent(), append_content));
            }
            buf.push_str(&format!(
                "{}{} = true{}",
                self.indent(),
                continue_var,
                self.nll(range)
            ));
            self.scopes.pop();
            buf.push_str(&format!("{}until true{}", self.indent(), self.nlr(range)));
            buf.push_str(&format!(
                "{}if not {} then{}",
                self.indent(),
                continue_var,
                self.nlr(range)
            ));
            buf.push_str(&format!("{}break{}", self.indent_level(1), self.nlr(range)));
            buf.push_str(&format!("{}end{}", self.indent(), self.nlr(range)));
            temp.push(buf);
            self.continue_vars.pop();
        } else if !append_content.is_empty() {
            if let Some(last) = temp.last_mut() {
                last.push_str(&format!("{}{}", self.indent(), append_content));
            }
        }
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_for(
        &mut self,
        node: For,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = Vec::new();
        self.transform_for_head(
            &node.var,
            &node.start,
            &node.stop,
            node.step.as_deref(),
            range,
            &mut temp,
        )?;
        let result = self.transform_loop_body(*node.body, &mut temp, "");
        self.scopes.pop();
        result?;
        out.push(format!(
            "{}{}end{}",
            temp.concat(),
            self.indent(),
            self.nlr(range)
        ));
        Ok(())
    }

    /// Accumulating form: the body's trailing expression is collected
    /// into a fresh list. Returns the accumulator name.
    fn transform_for_inner(
        &mut self,
        node: For,
        out: &mut Vec<String>,
    ) -> Result<String, CompileError> {
        let range = node.range;
        let accum = self.scopes.fresh("_accum_");
        self.scopes.add_to_scope(&accum);
        let len = self.scopes.fresh("_len_");
        self.scopes.add_to_scope(&len);
        out.push(format!(
            "{}local {} = {{ }}{}{}local {} = 1{}",
            self.indent(),
            accum,
            self.nll(range),
            self.indent(),
            len,
            self.nll(range)
        ));
        self.transform_for_head(
            &node.var,
            &node.start,
            &node.stop,
            node.step.as_deref(),
            range,
            out,
        )?;
        let mut body = *node.body;
        let exp_list = ExpList::single(accum_index_exp(&accum, &len, range));
        self.assign_last_explist(&exp_list, &mut body);
        let body_range = body.range;
        let len_line = format!("{} = {} + 1{}", len, len, self.nlr(body_range));
        let result = self.transform_loop_body(body, out, &len_line);
        self.scopes.pop();
        result?;
        out.push(format!("{}end{}", self.indent(), self.nlr(range)));
        Ok(accum)
    }

    pub(crate) fn transform_for_closure(
        &mut self,
        node: For,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = vec![format!("(function(){}", self.nll(range))];
        self.scopes.push();
        let accum = match self.transform_for_inner(node, &mut temp) {
            Ok(accum) => accum,
            Err(err) => {
                self.scopes.pop();
                return Err(err);
            }
        };
        temp.push(format!(
            "{}return {}{}",
            self.indent(),
            accum,
            self.nlr(range)
        ));
        self.scopes.pop();
        temp.push(format!("{}end)()", self.indent()));
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_for_in_place(
        &mut self,
        node: For,
        out: &mut Vec<String>,
        assign_list: Option<&ExpList>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = Vec::new();
        if let Some(list) = assign_list {
            temp.push(format!("{}do{}", self.indent(), self.nll(range)));
            self.scopes.push();
            let accum = match self.transform_for_inner(node, &mut temp) {
                Ok(accum) => accum,
                Err(err) => {
                    self.scopes.pop();
                    return Err(err);
                }
            };
            let assignment = ExpListAssign::new(
                list.clone(),
                Some(AssignAction::Assign(Assign::single(
                    AssignValue::Exp(Exp::var(&accum, range)),
                    range,
                ))),
            );
            let result = self.transform_assignment(assignment, &mut temp);
            self.scopes.pop();
            result?;
            temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
        } else {
            let accum = self.transform_for_inner(node, &mut temp)?;
            temp.push(format!(
                "{}return {}{}",
                self.indent(),
                accum,
                self.nlr(range)
            ));
        }
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_for_each(
        &mut self,
        node: ForEach,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = Vec::new();
        let target = match node.loop_value {
            ForTarget::Star(star) => LoopTarget::Star(star),
            ForTarget::ExpList(list) => LoopTarget::ExpList(list),
        };
        self.transform_for_each_head(node.name_list, target, &mut temp)?;
        let result = self.transform_loop_body(*node.body, &mut temp, "");
        self.scopes.pop();
        result?;
        out.push(format!(
            "{}{}end{}",
            temp.concat(),
            self.indent(),
            self.nlr(range)
        ));
        Ok(())
    }

    fn transform_for_each_inner(
        &mut self,
        node: ForEach,
        out: &mut Vec<String>,
    ) -> Result<String, CompileError> {
        let range = node.range;
        let accum = self.scopes.fresh("_accum_");
        self.scopes.add_to_scope(&accum);
        let len = self.scopes.fresh("_len_");
        self.scopes.add_to_scope(&len);
        out.push(format!(
            "{}local {} = {{ }}{}{}local {} = 1{}",
            self.indent(),
            accum,
            self.nll(range),
            self.indent(),
            len,
            self.nll(range)
        ));
        let target = match node.loop_value {
            ForTarget::Star(star) => LoopTarget::Star(star),
            ForTarget::ExpList(list) => LoopTarget::ExpList(list),
        };
        self.transform_for_each_head(node.name_list, target, out)?;
        let mut body = *node.body;
        let exp_list = ExpList::single(accum_index_exp(&accum, &len, range));
        self.assign_last_explist(&exp_list, &mut body);
        let body_range = body.range;
        let len_line = format!("{} = {} + 1{}", len, len, self.nlr(body_range));
        let result = self.transform_loop_body(body, out, &len_line);
        self.scopes.pop();
        result?;
        out.push(format!("{}end{}", self.indent(), self.nlr(range)));
        Ok(accum)
    }

    pub(crate) fn transform_for_each_closure(
        &mut self,
        node: ForEach,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = vec![format!("(function(){}", self.nll(range))];
        self.scopes.push();
        let accum = match self.transform_for_each_inner(node, &mut temp) {
            Ok(accum) => accum,
            Err(err) => {
                self.scopes.pop();
                return Err(err);
            }
        };
        temp.push(format!(
            "{}return {}{}",
            self.indent(),
            accum,
            self.nlr(range)
        ));
        self.scopes.pop();
        temp.push(format!("{}end)()", self.indent()));
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_for_each_in_place(
        &mut self,
        node: ForEach,
        out: &mut Vec<String>,
        assign_list: Option<&ExpList>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = Vec::new();
        if let Some(list) = assign_list {
            temp.push(format!("{}do{}", self.indent(), self.nll(range)));
            self.scopes.push();
            let accum = match self.transform_for_each_inner(node, &mut temp) {
                Ok(accum) => accum,
                Err(err) => {
                    self.scopes.pop();
                    return Err(err);
                }
            };
            let assignment = ExpListAssign::new(
                list.clone(),
                Some(AssignAction::Assign(Assign::single(
                    AssignValue::Exp(Exp::var(&accum, range)),
                    range,
                ))),
            );
            let result = self.transform_assignment(assignment, &mut temp);
            self.scopes.pop();
            result?;
            temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
        } else {
            let accum = self.transform_for_each_inner(node, &mut temp)?;
            temp.push(format!(
                "{}return {}{}",
                self.indent(),
                accum,
                self.nlr(range)
            ));
        }
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_while(
        &mut self,
        node: While,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = Vec::new();
        self.scopes.push();
        self.transform_exp(&node.condition, &mut temp)?;
        let result = self.transform_loop_body(*node.body, &mut temp, "");
        self.scopes.pop();
        result?;
        let body = temp.pop().unwrap_or_default();
        let cond = temp.pop().unwrap_or_default();
        out.push(format!(
            "{}while {} do{}{}{}end{}",
            self.indent(),
            cond,
            self.nll(range),
            body,
            self.indent(),
            self.nlr(range)
        ));
        Ok(())
    }

    pub(crate) fn transform_while_in_place(
        &mut self,
        node: While,
        out: &mut Vec<String>,
        assign_list: Option<&ExpList>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = Vec::new();
        if assign_list.is_some() {
            temp.push(format!("{}do{}", self.indent(), self.nll(range)));
        }
        self.scopes.push();
        let accum = self.scopes.fresh("_accum_");
        self.scopes.add_to_scope(&accum);
        let len = self.scopes.fresh("_len_");
        self.scopes.add_to_scope(&len);
        temp.push(format!(
            "{}local {} = {{ }}{}{}local {} = 1{}",
            self.indent(),
            accum,
            self.nll(range),
            self.indent(),
            len,
            self.nll(range)
        ));
        let mut tmp = Vec::new();
        self.transform_exp(&node.condition, &mut tmp)?;
        temp.push(format!(
            "{}while {} do{}",
            self.indent(),
            tmp.concat(),
            self.nll(range)
        ));
        self.scopes.push();
        let mut body = *node.body;
        let exp_list = ExpList::single(accum_index_exp(&accum, &len, range));
        self.assign_last_explist(&exp_list, &mut body);
        let len_line = format!("{} = {} + 1{}", len, len, self.nlr(range));
        let result = self.transform_loop_body(body, &mut temp, &len_line);
        self.scopes.pop();
        result?;
        temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
        if let Some(list) = assign_list {
            let assignment = ExpListAssign::new(
                list.clone(),
                Some(AssignAction::Assign(Assign::single(
                    AssignValue::Exp(Exp::var(&accum, range)),
                    range,
                ))),
            );
            self.transform_assignment(assignment, &mut temp)?;
        } else {
            temp.push(format!(
                "{}return {}{}",
                self.indent(),
                accum,
                self.nlr(range)
            ));
        }
        self.scopes.pop();
        if assign_list.is_some() {
            temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
        }
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_while_closure(
        &mut self,
        node: While,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = vec![format!("(function() {}", self.nll(range))];
        self.scopes.push();
        let accum = self.scopes.fresh("_accum_");
        self.scopes.add_to_scope(&accum);
        let len = self.scopes.fresh("_len_");
        self.scopes.add_to_scope(&len);
        temp.push(format!(
            "{}local {} = {{ }}{}{}local {} = 1{}",
            self.indent(),
            accum,
            self.nll(range),
            self.indent(),
            len,
            self.nll(range)
        ));
        let mut tmp = Vec::new();
        match self.transform_exp(&node.condition, &mut tmp) {
            Ok(()) => {}
            Err(err) => {
                self.scopes.pop();
                return Err(err);
            }
        }
        temp.push(format!(
            "{}while {} do{}",
            self.indent(),
            tmp.concat(),
            self.nll(range)
        ));
        self.scopes.push();
        let mut body = *node.body;
        let exp_list = ExpList::single(accum_index_exp(&accum, &len, range));
        self.assign_last_explist(&exp_list, &mut body);
        let len_line = format!("{} = {} + 1{}", len, len, self.nlr(range));
        let result = self.transform_loop_body(body, &mut temp, &len_line);
        self.scopes.pop();
        if let Err(err) = result {
            self.scopes.pop();
            return Err(err);
        }
        temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
        temp.push(format!(
            "{}return {}{}",
            self.indent(),
            accum,
            self.nlr(range)
        ));
        self.scopes.pop();
        temp.push(format!("{}end)()", self.indent()));
        out.push(temp.concat());
        Ok(())
    }

    fn transform_comp_for(
        &mut self,
        comp: CompFor,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = comp.range;
        let mut tmp = Vec::new();
        self.transform_exp(&comp.start, &mut tmp)?;
        self.transform_exp(&comp.stop, &mut tmp)?;
        if let Some(step) = &comp.step {
            self.transform_exp(step, &mut tmp)?;
        } else {
            tmp.push(String::new());
        }
        let step_text = tmp.pop().unwrap_or_default();
        let stop_text = tmp.pop().unwrap_or_default();
        let start_text = tmp.pop().unwrap_or_default();
        let var_name = comp.var.name.text.to_string();
        out.push(format!(
            "{}for {} = {}, {}{} do{}",
            self.indent(),
            var_name,
            start_text,
            stop_text,
            if step_text.is_empty() {
                String::new()
            } else {
                format!(", {}", step_text)
            },
            self.nll(range)
        ));
        self.scopes.push();
        self.scopes.add_to_scope(&var_name);
        Ok(())
    }

    fn transform_comp_clauses(
        &mut self,
        items: Vec<CompItem>,
        temp: &mut Vec<String>,
    ) -> Result<usize, CompileError> {
        let count = items.len();
        for item in items {
            match item {
                CompItem::ForEach(comp) => self.transform_comp_for_each(comp, temp)?,
                CompItem::For(comp) => self.transform_comp_for(comp, temp)?,
                CompItem::When(exp) => {
                    let mut tmp = Vec::new();
                    self.transform_exp(&exp, &mut tmp)?;
                    temp.push(format!(
                        "{}if {} then{}",
                        self.indent(),
                        tmp.concat(),
                        self.nll(exp.range)
                    ));
                    self.scopes.push();
                }
            }
        }
        Ok(count)
    }

    /// Statement-position comprehension appendix: plain nested loops,
    /// no accumulator.
    pub(crate) fn transform_comp_common(
        &mut self,
        comp: Comprehension,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = comp.range;
        let mut temp = Vec::new();
        let count = self.transform_comp_clauses(comp.for_loop.items, &mut temp)?;
        match comp.value {
            CompValueKind::Statement(stmt) => self.transform_statement(*stmt, &mut temp)?,
            CompValueKind::Exp(exp) => {
                let stmt = Statement::from_exp(*exp);
                self.transform_statement(stmt, &mut temp)?;
            }
        }
        let value = temp.pop().unwrap_or_default();
        let mut buf = format!("{}{}", temp.concat(), value);
        for _ in 0..count {
            self.scopes.pop();
            buf.push_str(&format!("{}end{}", self.indent(), self.nll(range)));
        }
        out.push(buf);
        Ok(())
    }

    pub(crate) fn transform_comprehension(
        &mut self,
        comp: Comprehension,
        out: &mut Vec<String>,
        usage: ExpUsage,
        assign_list: Option<&ExpList>,
    ) -> Result<(), CompileError> {
        let range = comp.range;
        if matches!(usage, ExpUsage::Closure | ExpUsage::Assignment) {
            self.scopes.push();
        }
        let accum = self.scopes.fresh("_accum_");
        self.scopes.add_to_scope(&accum);
        let len = self.scopes.fresh("_len_");
        self.scopes.add_to_scope(&len);
        let mut temp = Vec::new();
        let count = self.transform_comp_clauses(comp.for_loop.items, &mut temp)?;
        let value_exp = match comp.value {
            CompValueKind::Exp(exp) => *exp,
            CompValueKind::Statement(stmt) => {
                return Err(
                    self.logic_error("Invalid comprehension value.", stmt.range)
                );
            }
        };
        let assignment = ExpListAssign::new(
            ExpList::single(accum_index_exp(&accum, &len, range)),
            Some(AssignAction::Assign(Assign::single(
                AssignValue::Exp(value_exp),
                range,
            ))),
        );
        self.transform_assignment(assignment, &mut temp)?;
        let assign_str = temp.pop().unwrap_or_default();
        for _ in 0..count {
            self.scopes.pop();
        }
        let mut buf = format!(
            "{}local {} = {{ }}{}{}local {} = 1{}",
            self.indent(),
            accum,
            self.nll(range),
            self.indent(),
            len,
            self.nll(range)
        );
        buf.push_str(&temp.concat());
        buf.push_str(&assign_str);
        buf.push_str(&format!(
            "{}{} = {} + 1{}",
            self.indent_level(temp.len() as i32),
            len,
            len,
            self.nll(range)
        ));
        for ind in (0..temp.len()).rev() {
            buf.push_str(&format!(
                "{}end{}",
                self.indent_level(ind as i32),
                self.nll(range)
            ));
        }
        match usage {
            ExpUsage::Common => out.push(buf),
            ExpUsage::Return => {
                buf.push_str(&format!(
                    "{}return {}{}",
                    self.indent(),
                    accum,
                    self.nlr(range)
                ));
                out.push(buf);
            }
            ExpUsage::Closure => {
                buf.push_str(&format!(
                    "{}return {}{}",
                    self.indent(),
                    accum,
                    self.nlr(range)
                ));
                self.scopes.pop();
                out.push(format!(
                    "(function(){}{}{}end)()",
                    self.nll(range),
                    buf,
                    self.indent()
                ));
            }
            ExpUsage::Assignment => {
                if let Some(list) = assign_list {
                    let assignment = ExpListAssign::new(
                        list.clone(),
                        Some(AssignAction::Assign(Assign::single(
                            AssignValue::Exp(Exp::var(&accum, range)),
                            range,
                        ))),
                    );
                    let mut tmp = Vec::new();
                    let result = self.transform_assignment(assignment, &mut tmp);
                    match result {
                        Ok(()) => buf.push_str(&tmp.concat()),
                        Err(err) => {
                            self.scopes.pop();
                            return Err(err);
                        }
                    }
                }
                self.scopes.pop();
                out.push(format!(
                    "{}do{}{}{}end{}",
                    self.indent(),
                    self.nll(range),
                    buf,
                    self.indent(),
                    self.nlr(range)
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn transform_tbl_comprehension(
        &mut self,
        comp: TblComprehension,
        out: &mut Vec<String>,
        usage: ExpUsage,
        assign_list: Option<&ExpList>,
    ) -> Result<(), CompileError> {
        let range = comp.range;
        if matches!(usage, ExpUsage::Closure | ExpUsage::Assignment) {
            self.scopes.push();
        }
        let tbl = self.scopes.fresh("_tbl_");
        self.scopes.add_to_scope(&tbl);
        let mut temp = Vec::new();
        let count = self.transform_comp_clauses(comp.for_loop.items, &mut temp)?;
        let mut kv: Vec<String> = Vec::new();
        let mut tmp = Vec::new();
        self.transform_exp(&comp.key, &mut tmp)?;
        kv.push(tmp.concat());
        if let Some(value) = &comp.value {
            let mut tmp = Vec::new();
            self.transform_exp(value, &mut tmp)?;
            kv.push(tmp.concat());
        }
        for _ in 0..count {
            self.scopes.pop();
        }
        let mut buf = format!("{}local {} = {{ }}{}", self.indent(), tbl, self.nll(range));
        buf.push_str(&temp.concat());
        self.scopes.push();
        if comp.value.is_none() {
            let key_var = self.scopes.fresh("_key_");
            let val_var = self.scopes.fresh("_val_");
            buf.push_str(&format!(
                "{}local {}, {} = {}{}",
                self.indent_level(temp.len() as i32 - 1),
                key_var,
                val_var,
                kv[0],
                self.nll(range)
            ));
            kv[0] = key_var;
            kv.push(val_var);
        }
        buf.push_str(&format!(
            "{}{}[{}] = {}{}",
            self.indent_level(temp.len() as i32 - 1),
            tbl,
            kv[0],
            kv.last().map(String::as_str).unwrap_or_default(),
            self.nll(range)
        ));
        for ind in (0..temp.len().saturating_sub(1)).rev() {
            buf.push_str(&format!(
                "{}end{}",
                self.indent_level(ind as i32),
                self.nll(range)
            ));
        }
        self.scopes.pop();
        buf.push_str(&format!("{}end{}", self.indent(), self.nll(range)));
        match usage {
            ExpUsage::Common => out.push(buf),
            ExpUsage::Return => {
                buf.push_str(&format!(
                    "{}return {}{}",
                    self.indent(),
                    tbl,
                    self.nlr(range)
                ));
                out.push(buf);
            }
            ExpUsage::Closure => {
                buf.push_str(&format!(
                    "{}return {}{}",
                    self.indent(),
                    tbl,
                    self.nlr(range)
                ));
                self.scopes.pop();
                out.push(format!(
                    "(function(){}{}{}end)()",
                    self.nll(range),
                    buf,
                    self.indent()
                ));
            }
            ExpUsage::Assignment => {
                if let Some(list) = assign_list {
                    let assignment = ExpListAssign::new(
                        list.clone(),
                        Some(AssignAction::Assign(Assign::single(
                            AssignValue::Exp(Exp::var(&tbl, range)),
                            range,
                        ))),
                    );
                    let mut tmp = Vec::new();
                    let result = self.transform_assignment(assignment, &mut tmp);
                    match result {
                        Ok(()) => buf.push_str(&tmp.concat()),
                        Err(err) => {
                            self.scopes.pop();
                            return Err(err);
                        }
                    }
                }
                self.scopes.pop();
                out.push(format!(
                    "{}do{}{}{}end{}",
                    self.indent(),
                    self.nll(range),
                    buf,
                    self.indent(),
                    self.nlr(range)
                ));
            }
        }
        Ok(())
    }
}

fn accum_index_exp(accum: &str, len: &str, range: InputRange) -> Exp {
    Exp::from_chain(ChainValue {
        range,
        items: vec![
            ChainItem::Callable(Box::new(Callable::var(accum, range))),
            ChainItem::Index(Exp::var(len, range)),
        ],
    })
}
