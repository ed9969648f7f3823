// `if`/`unless` and `switch` lowering. Inline condition assignments
// get their own scope; chained `elseif`s with assignments re-nest so
// every binding is freshly scoped.

use super::{Compiler, ExpUsage, single_value, single_variable_from};
use crate::ast::*;
use crate::error::CompileError;
use crate::parser::InputRange;

fn if_node_range(node: &IfNode) -> InputRange {
    match node {
        IfNode::Cond(cond) => cond.range,
        IfNode::Body(body) => body.range,
    }
}

impl Compiler {
    pub(crate) fn transform_if(
        &mut self,
        node: If,
        out: &mut Vec<String>,
        usage: ExpUsage,
    ) -> Result<(), CompileError> {
        self.transform_cond(node.nodes, out, usage, false)
    }

    pub(crate) fn transform_unless(
        &mut self,
        node: Unless,
        out: &mut Vec<String>,
        usage: ExpUsage,
    ) -> Result<(), CompileError> {
        self.transform_cond(node.nodes, out, usage, true)
    }

    pub(crate) fn transform_cond(
        &mut self,
        nodes: Vec<IfNode>,
        out: &mut Vec<String>,
        usage: ExpUsage,
        unless: bool,
    ) -> Result<(), CompileError> {
        let total = nodes.len();
        let first_range = nodes.first().map(if_node_range).unwrap_or_default();

        // An elseif with an inline assignment becomes a nested if in
        // the else position, so the binding gets its own scope.
        let mut ns: Vec<IfNode> = Vec::new();
        for (i, node) in nodes.into_iter().enumerate().rev() {
            let wrap = i != 0 && matches!(&node, IfNode::Cond(cond) if cond.assign.is_some());
            ns.push(node);
            if wrap {
                let mut inner: Vec<IfNode> = std::mem::take(&mut ns);
                inner.reverse();
                let range = inner.first().map(if_node_range).unwrap_or_default();
                let new_if = If {
                    range,
                    nodes: inner,
                };
                let stmt = Statement::from_exp(Exp::from_value(Value::from_simple(
                    SimpleValueKind::If(new_if),
                    range,
                )));
                ns.push(IfNode::Body(Body::from_statement(stmt)));
            }
        }
        if ns.len() != total {
            ns.reverse();
            return self.transform_cond(ns, out, usage, unless);
        }
        ns.reverse();
        let nodes = ns;

        let mut temp = Vec::new();
        if usage == ExpUsage::Closure {
            temp.push(format!("(function(){}", self.nll(first_range)));
            self.scopes.push();
        }

        let mut pairs: Vec<(Option<IfCond>, Option<Body>)> = vec![(None, None)];
        for node in nodes {
            match node {
                IfNode::Cond(cond) => pairs.last_mut().expect("pair").0 = Some(cond),
                IfNode::Body(body) => {
                    pairs.last_mut().expect("pair").1 = Some(body);
                    pairs.push((None, None));
                }
            }
        }

        let mut storing_value = false;
        let mut extra_assignment: Option<ExpListAssign> = None;
        if let Some(first_cond) = pairs.first_mut().and_then(|pair| pair.0.as_mut()) {
            if let Some(assign) = first_cond.assign.take() {
                let exp = (*first_cond.condition).clone();
                let cond_range = exp.range;
                match single_variable_from(&exp) {
                    None => {
                        storing_value = true;
                        let mut des_var = self.scopes.fresh("_des_");
                        if assign.values.len() == 1 {
                            if let AssignValue::Exp(value) = &assign.values[0] {
                                if let Some(var) = single_variable_from(value) {
                                    des_var = var.to_string();
                                    storing_value = false;
                                }
                            }
                        }
                        if storing_value {
                            if usage != ExpUsage::Closure {
                                temp.push(format!("{}do{}", self.indent(), self.nll(assign.range)));
                                self.scopes.push();
                            }
                            let assignment = ExpListAssign::new(
                                ExpList::var(&des_var, cond_range),
                                Some(AssignAction::Assign((*assign).clone())),
                            );
                            self.transform_assignment(assignment, &mut temp)?;
                        }
                        let val_exp = Exp::var(&des_var, cond_range);
                        extra_assignment = Some(ExpListAssign::new(
                            ExpList::single(exp),
                            Some(AssignAction::Assign(Assign::single(
                                AssignValue::Exp(val_exp.clone()),
                                cond_range,
                            ))),
                        ));
                        first_cond.condition = Box::new(val_exp);
                    }
                    Some(var) => {
                        if !self.scopes.is_defined(&var) {
                            storing_value = true;
                            if usage != ExpUsage::Closure {
                                temp.push(format!("{}do{}", self.indent(), self.nll(assign.range)));
                                self.scopes.push();
                            }
                        }
                        let assignment = ExpListAssign::new(
                            ExpList::single(exp),
                            Some(AssignAction::Assign(*assign)),
                        );
                        self.transform_assignment(assignment, &mut temp)?;
                    }
                }
            }
        }

        let mut negate = unless;
        for (idx, (cond, body)) in pairs.into_iter().enumerate() {
            let has_cond = cond.is_some();
            if let Some(cond) = cond {
                let mut tmp = Vec::new();
                if negate {
                    match single_value(&cond.condition) {
                        Some(value) => {
                            let value = value.clone();
                            self.transform_value(&value, &mut tmp)?;
                        }
                        None => {
                            self.transform_exp(&cond.condition, &mut tmp)?;
                            let inner = tmp.pop().unwrap_or_default();
                            tmp.push(format!("({})", inner));
                        }
                    }
                    let inner = tmp.pop().unwrap_or_default();
                    tmp.push(format!("not {}", inner));
                    negate = false;
                } else {
                    self.transform_exp(&cond.condition, &mut tmp)?;
                }
                temp.push(format!(
                    "{}{}if {} then{}",
                    self.indent(),
                    if idx == 0 { "" } else { "else" },
                    tmp.pop().unwrap_or_default(),
                    self.nll(cond.range)
                ));
            }
            if let Some(body) = body {
                if !has_cond {
                    temp.push(format!("{}else{}", self.indent(), self.nll(body.range)));
                }
                self.scopes.push();
                if idx == 0 {
                    if let Some(extra) = extra_assignment.take() {
                        self.transform_assignment(extra, &mut temp)?;
                    }
                }
                let result = self.transform_body(body, &mut temp, usage != ExpUsage::Common);
                self.scopes.pop();
                result?;
            }
            if !has_cond {
                temp.push(format!("{}end{}", self.indent(), self.nll(first_range)));
                break;
            }
        }

        if storing_value && usage != ExpUsage::Closure {
            self.scopes.pop();
            temp.push(format!("{}end{}", self.indent(), self.nlr(first_range)));
        }
        if usage == ExpUsage::Closure {
            self.scopes.pop();
            temp.push(format!("{}end)()", self.indent()));
        }
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_switch_closure(
        &mut self,
        node: Switch,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = Vec::new();
        temp.push(format!("(function(){}", self.nll(range)));
        self.scopes.push();
        let result = self.transform_switch(node, &mut temp, true);
        self.scopes.pop();
        result?;
        temp.push(format!("{}end)()", self.indent()));
        out.push(temp.concat());
        Ok(())
    }

    /// Lowers to `if/elseif` comparing each branch value against the
    /// switch target with `==`, OR-chained across a branch's list.
    pub(crate) fn transform_switch(
        &mut self,
        node: Switch,
        out: &mut Vec<String>,
        implicit_return: bool,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = Vec::new();
        let mut obj_var = single_variable_from(&node.target)
            .map(|s| s.to_string())
            .unwrap_or_default();
        if obj_var.is_empty() {
            obj_var = self.scopes.fresh("_exp_");
            self.scopes.add_to_scope(&obj_var);
            let mut tmp = Vec::new();
            self.transform_exp(&node.target, &mut tmp)?;
            temp.push(format!(
                "{}local {} = {}{}",
                self.indent(),
                obj_var,
                tmp.concat(),
                self.nll(range)
            ));
        }
        for (branch_idx, branch) in node.branches.into_iter().enumerate() {
            let mut line = format!(
                "{}{}",
                self.indent(),
                if branch_idx == 0 { "if" } else { "elseif" }
            );
            let expr_count = branch.value_list.exprs.len();
            for (exp_idx, exp) in branch.value_list.exprs.iter().enumerate() {
                let mut tmp = Vec::new();
                self.transform_exp(exp, &mut tmp)?;
                let mut text = tmp.concat();
                if single_value(exp).is_none() {
                    text = format!("({})", text);
                }
                line.push_str(&format!(
                    " {} == {}{}",
                    text,
                    obj_var,
                    if exp_idx + 1 == expr_count { "" } else { " or" }
                ));
            }
            line.push_str(&format!(" then{}", self.nll(branch.range)));
            temp.push(line);
            self.scopes.push();
            let result = self.transform_body(branch.body, &mut temp, implicit_return);
            self.scopes.pop();
            result?;
        }
        if let Some(last) = node.last_branch {
            temp.push(format!("{}else{}", self.indent(), self.nll(last.range)));
            self.scopes.push();
            let result = self.transform_body(last, &mut temp, implicit_return);
            self.scopes.pop();
            result?;
        }
        temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
        out.push(temp.concat());
        Ok(())
    }
}
