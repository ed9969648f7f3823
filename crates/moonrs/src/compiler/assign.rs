// Assignment lowering: pre-declaration of new locals, update operators,
// value-position constructs on the right-hand side, and destructuring
// of table-literal targets.

use super::{
    Compiler, ExpUsage, destructure_target, is_assignable_exp, single_value, single_variable_from,
    is_plain_name,
};
use crate::ast::walk;
use crate::ast::*;
use crate::error::CompileError;
use crate::grammar::is_keyword;
use crate::parser::InputRange;
use smol_str::SmolStr;

#[derive(Debug, Clone)]
pub(crate) struct DestructItem {
    pub is_variable: bool,
    pub name: String,
    /// Lua access path under the bound object, e.g. `[1]` or `.key`.
    pub structure: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Destructure {
    pub value: String,
    pub items: Vec<DestructItem>,
}

pub(crate) enum DestructTarget<'x> {
    Exp(&'x Exp),
    TableBlock(&'x TableBlock),
}

/// Variable names a destructuring assignment would introduce; pure
/// scan used by the `local *` / `local ^` pre-declaration pass.
pub(crate) fn destructure_names(ela: &ExpListAssign) -> Vec<SmolStr> {
    if !matches!(ela.action, Some(AssignAction::Assign(_))) {
        return Vec::new();
    }
    let mut names = Vec::new();
    for exp in &ela.exp_list.exprs {
        if let Some(value) = single_value(exp) {
            match &value.item {
                ValueItem::SimpleTable(table) => {
                    for pair in &table.pairs {
                        collect_pair_names(pair, &mut names);
                    }
                }
                ValueItem::SimpleValue(simple) => {
                    if let SimpleValueKind::TableLit(table) = &simple.value {
                        collect_table_lit_names(table, &mut names);
                    }
                }
                _ => {}
            }
        }
    }
    names
}

fn collect_table_lit_names(table: &TableLit, names: &mut Vec<SmolStr>) {
    for entry in &table.values {
        match entry {
            TableEntry::Exp(exp) => collect_exp_names(exp, names),
            TableEntry::VariablePair(pair) => names.push(pair.name.name.text.clone()),
            TableEntry::NormalPair(pair) => collect_pair_value_names(&pair.value, names),
        }
    }
}

fn collect_pair_names(pair: &TablePair, names: &mut Vec<SmolStr>) {
    match pair {
        TablePair::Variable(pair) => names.push(pair.name.name.text.clone()),
        TablePair::Normal(pair) => collect_pair_value_names(&pair.value, names),
    }
}

fn collect_pair_value_names(value: &PairValue, names: &mut Vec<SmolStr>) {
    match value {
        PairValue::Exp(exp) => collect_exp_names(exp, names),
        PairValue::TableBlock(table) => {
            for pair in &table.values {
                collect_pair_names(pair, names);
            }
        }
    }
}

fn collect_exp_names(exp: &Exp, names: &mut Vec<SmolStr>) {
    if let Some(name) = single_variable_from(exp) {
        names.push(name);
        return;
    }
    if let Some(value) = single_value(exp) {
        match &value.item {
            ValueItem::SimpleTable(table) => {
                for pair in &table.pairs {
                    collect_pair_names(pair, names);
                }
            }
            ValueItem::SimpleValue(simple) => {
                if let SimpleValueKind::TableLit(table) = &simple.value {
                    collect_table_lit_names(table, names);
                }
            }
            _ => {}
        }
    }
}

enum Special {
    If,
    Unless,
    Switch,
    With,
    Do,
    Comprehension,
    TblComprehension,
    For,
    ForEach,
    ClassDecl,
    While,
    Chain(super::ChainType),
    None,
}

fn classify(value: &AssignValue) -> Special {
    match value {
        AssignValue::With(_) => Special::With,
        AssignValue::If(_) => Special::If,
        AssignValue::Switch(_) => Special::Switch,
        AssignValue::TableBlock(_) => Special::None,
        AssignValue::Exp(exp) => {
            if let Some(simple) = super::simple_single_value(exp) {
                return match &simple.value {
                    SimpleValueKind::If(_) => Special::If,
                    SimpleValueKind::Unless(_) => Special::Unless,
                    SimpleValueKind::Switch(_) => Special::Switch,
                    SimpleValueKind::With(_) => Special::With,
                    SimpleValueKind::Do(_) => Special::Do,
                    SimpleValueKind::Comprehension(_) => Special::Comprehension,
                    SimpleValueKind::TblComprehension(_) => Special::TblComprehension,
                    SimpleValueKind::For(_) => Special::For,
                    SimpleValueKind::ForEach(_) => Special::ForEach,
                    SimpleValueKind::ClassDecl(_) => Special::ClassDecl,
                    SimpleValueKind::While(_) => Special::While,
                    _ => Special::None,
                };
            }
            if let Some(value) = single_value(exp) {
                if let ValueItem::ChainValue(chain) = &value.item {
                    let chain_type = super::special_chain_value(chain);
                    if chain_type != super::ChainType::Common
                        && chain_type != super::ChainType::EndWithEop
                    {
                        return Special::Chain(chain_type);
                    }
                }
            }
            Special::None
        }
    }
}

/// Unwraps the single assign value into the node the special branch
/// needs, assuming `classify` already identified it.
macro_rules! take_special {
    ($assign:expr, $direct:path, $kind:path) => {{
        match $assign.values.pop().expect("assign value") {
            $direct(node) => node,
            AssignValue::Exp(exp) => match exp.value.item {
                ValueItem::SimpleValue(simple) => match simple.value {
                    $kind(node) => node,
                    _ => unreachable!(),
                },
                _ => unreachable!(),
            },
            _ => unreachable!(),
        }
    }};
}

macro_rules! take_special_exp {
    ($assign:expr, $kind:path) => {{
        match $assign.values.pop().expect("assign value") {
            AssignValue::Exp(exp) => match exp.value.item {
                ValueItem::SimpleValue(simple) => match simple.value {
                    $kind(node) => node,
                    _ => unreachable!(),
                },
                _ => unreachable!(),
            },
            _ => unreachable!(),
        }
    }};
}

impl Compiler {
    pub(crate) fn check_assignable(&mut self, exp_list: &ExpList) -> Result<(), CompileError> {
        for exp in &exp_list.exprs {
            if !is_assignable_exp(exp) {
                return Err(
                    self.logic_error("Left hand expression is not assignable.", exp.range)
                );
            }
        }
        Ok(())
    }

    /// Names on the left-hand side not yet defined in scope; does not
    /// define them.
    pub(crate) fn get_assign_defs(
        &mut self,
        exp_list: &ExpList,
    ) -> Result<Vec<String>, CompileError> {
        self.collect_assign_defs(exp_list, false)
    }

    /// Like [`get_assign_defs`], but also defines the names.
    pub(crate) fn transform_assign_defs(
        &mut self,
        exp_list: &ExpList,
    ) -> Result<Vec<String>, CompileError> {
        self.collect_assign_defs(exp_list, true)
    }

    fn collect_assign_defs(
        &mut self,
        exp_list: &ExpList,
        define: bool,
    ) -> Result<Vec<String>, CompileError> {
        let mut defs = Vec::new();
        for exp in &exp_list.exprs {
            let Some(value) = single_value(exp) else {
                return Err(
                    self.logic_error("Left hand expression is not assignable.", exp.range)
                );
            };
            if let ValueItem::ChainValue(chain) = &value.item {
                let Some(name) = super::single_variable_from_chain(chain) else {
                    continue;
                };
                if define {
                    if self.scopes.add_to_scope(&name) {
                        defs.push(name.to_string());
                    }
                } else if !self.scopes.is_defined(&name) {
                    defs.push(name.to_string());
                }
            }
        }
        Ok(defs)
    }

    pub(crate) fn predefine_line(&self, defs: &[String]) -> String {
        if defs.is_empty() {
            String::new()
        } else {
            format!("{}local {}", self.indent(), defs.join(", "))
        }
    }

    /// The `local` pre-declaration an assignment needs before entering
    /// a nested emission scope.
    pub(crate) fn get_predefine_assignment(
        &mut self,
        ela: &ExpListAssign,
    ) -> Result<String, CompileError> {
        let Some(AssignAction::Assign(assign)) = &ela.action else {
            return Ok(String::new());
        };
        let pre = self.destructure_define(&ela.exp_list, assign)?;
        if !pre.is_empty() {
            return Ok(pre);
        }
        let defs = self.transform_assign_defs(&ela.exp_list)?;
        Ok(self.predefine_line(&defs))
    }

    fn destructure_define(
        &mut self,
        exp_list: &ExpList,
        assign: &Assign,
    ) -> Result<String, CompileError> {
        let (destructs, _) = self.extract_destructure_info(exp_list, assign, true)?;
        let mut buf = String::new();
        for destruct in &destructs {
            let mut defs = Vec::new();
            for item in &destruct.items {
                if item.is_variable && self.scopes.add_to_scope(&item.name) {
                    defs.push(item.name.clone());
                }
            }
            if !defs.is_empty() {
                buf.push_str(&format!("{}local {}", self.indent(), defs.join(", ")));
            }
        }
        Ok(buf)
    }

    pub(crate) fn transform_assign_item(
        &mut self,
        value: &AssignValue,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        match value {
            AssignValue::With(node) => self.transform_with_closure(node.clone(), out),
            AssignValue::If(node) => self.transform_if(node.clone(), out, ExpUsage::Closure),
            AssignValue::Switch(node) => self.transform_switch_closure(node.clone(), out),
            AssignValue::TableBlock(node) => self.transform_table_block(node, out),
            AssignValue::Exp(exp) => self.transform_exp(exp, out),
        }
    }

    pub(crate) fn transform_assignment(
        &mut self,
        assignment: ExpListAssign,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        self.check_assignable(&assignment.exp_list)?;
        let ExpListAssign {
            range,
            exp_list,
            action,
        } = assignment;
        match action {
            None => Ok(()),
            Some(AssignAction::Update(update)) => {
                self.transform_update(exp_list, update, range, out)
            }
            Some(AssignAction::Assign(assign)) => {
                self.transform_assign_action(range, exp_list, assign, out)
            }
        }
    }

    fn transform_assign_action(
        &mut self,
        range: InputRange,
        exp_list: ExpList,
        mut assign: Assign,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let special = if assign.values.len() == 1 {
            classify(&assign.values[0])
        } else {
            Special::None
        };
        match special {
            Special::If => {
                let mut node = take_special!(assign, AssignValue::If, SimpleValueKind::If);
                let mut temp = Vec::new();
                let defs = self.transform_assign_defs(&exp_list)?;
                if !defs.is_empty() {
                    temp.push(format!(
                        "{}{}",
                        self.predefine_line(&defs),
                        self.nll(exp_list.range)
                    ));
                }
                for if_node in &mut node.nodes {
                    if let IfNode::Body(body) = if_node {
                        self.assign_last_explist(&exp_list, body);
                    }
                }
                self.transform_if(node, &mut temp, ExpUsage::Common)?;
                out.push(temp.concat());
                Ok(())
            }
            Special::Unless => {
                let mut node = take_special_exp!(assign, SimpleValueKind::Unless);
                let mut temp = Vec::new();
                let defs = self.transform_assign_defs(&exp_list)?;
                if !defs.is_empty() {
                    temp.push(format!(
                        "{}{}",
                        self.predefine_line(&defs),
                        self.nll(exp_list.range)
                    ));
                }
                for if_node in &mut node.nodes {
                    if let IfNode::Body(body) = if_node {
                        self.assign_last_explist(&exp_list, body);
                    }
                }
                self.transform_unless(node, &mut temp, ExpUsage::Common)?;
                out.push(temp.concat());
                Ok(())
            }
            Special::Switch => {
                let mut node = take_special!(assign, AssignValue::Switch, SimpleValueKind::Switch);
                for branch in &mut node.branches {
                    self.assign_last_explist(&exp_list, &mut branch.body);
                }
                if let Some(last) = &mut node.last_branch {
                    self.assign_last_explist(&exp_list, last);
                }
                let pre = self.predefine_for(&exp_list, &assign)?;
                self.transform_switch(node, out, false)?;
                self.prepend_predefine(out, &pre, range);
                Ok(())
            }
            Special::With => {
                let node = take_special!(assign, AssignValue::With, SimpleValueKind::With);
                let pre = self.predefine_for(&exp_list, &assign)?;
                self.transform_with(node, out, Some(&exp_list), false)?;
                self.prepend_predefine(out, &pre, range);
                Ok(())
            }
            Special::Do => {
                let mut node = take_special_exp!(assign, SimpleValueKind::Do);
                self.assign_last_explist(&exp_list, &mut node.body);
                let pre = self.predefine_for(&exp_list, &assign)?;
                self.transform_do(node, out, false)?;
                self.prepend_predefine(out, &pre, range);
                Ok(())
            }
            Special::Comprehension => {
                let node = take_special_exp!(assign, SimpleValueKind::Comprehension);
                let pre = self.predefine_for(&exp_list, &assign)?;
                self.transform_comprehension(node, out, ExpUsage::Assignment, Some(&exp_list))?;
                self.prepend_predefine(out, &pre, range);
                Ok(())
            }
            Special::TblComprehension => {
                let node = take_special_exp!(assign, SimpleValueKind::TblComprehension);
                let pre = self.predefine_for(&exp_list, &assign)?;
                self.transform_tbl_comprehension(node, out, ExpUsage::Assignment, Some(&exp_list))?;
                self.prepend_predefine(out, &pre, range);
                Ok(())
            }
            Special::For => {
                let node = take_special_exp!(assign, SimpleValueKind::For);
                let pre = self.predefine_for(&exp_list, &assign)?;
                self.transform_for_in_place(node, out, Some(&exp_list))?;
                self.prepend_predefine(out, &pre, range);
                Ok(())
            }
            Special::ForEach => {
                let node = take_special_exp!(assign, SimpleValueKind::ForEach);
                let pre = self.predefine_for(&exp_list, &assign)?;
                self.transform_for_each_in_place(node, out, Some(&exp_list))?;
                self.prepend_predefine(out, &pre, range);
                Ok(())
            }
            Special::While => {
                let node = take_special_exp!(assign, SimpleValueKind::While);
                let pre = self.predefine_for(&exp_list, &assign)?;
                self.transform_while_in_place(node, out, Some(&exp_list))?;
                self.prepend_predefine(out, &pre, range);
                Ok(())
            }
            Special::ClassDecl => {
                let node = take_special_exp!(assign, SimpleValueKind::ClassDecl);
                let pre = self.predefine_for(&exp_list, &assign)?;
                self.transform_class_decl(node, out, ExpUsage::Assignment, Some(&exp_list))?;
                self.prepend_predefine(out, &pre, range);
                Ok(())
            }
            Special::Chain(chain_type) => {
                let chain = match assign.values.pop() {
                    Some(AssignValue::Exp(exp)) => match exp.value.item {
                        ValueItem::ChainValue(chain) => *chain,
                        _ => unreachable!(),
                    },
                    _ => unreachable!(),
                };
                match chain_type {
                    super::ChainType::HasEop | super::ChainType::EndWithColon => {
                        let pre = self.predefine_for(&exp_list, &assign)?;
                        self.transform_chain_value(
                            chain,
                            out,
                            ExpUsage::Assignment,
                            Some(&exp_list),
                        )?;
                        self.prepend_predefine(out, &pre, range);
                        Ok(())
                    }
                    _ => self.transform_chain_value(
                        chain,
                        out,
                        ExpUsage::Assignment,
                        Some(&exp_list),
                    ),
                }
            }
            Special::None => {
                let (destructs, leftover) =
                    self.extract_destructure_info(&exp_list, &assign, false)?;
                if destructs.is_empty() {
                    return self.transform_assignment_common(range, exp_list, assign, out);
                }
                let mut temp = Vec::new();
                for destruct in destructs {
                    if destruct.items.len() == 1 {
                        let pair = &destruct.items[0];
                        let mut buf = self.indent();
                        if pair.is_variable && !self.scopes.is_defined(&pair.name) {
                            buf.push_str("local ");
                        }
                        buf.push_str(&format!(
                            "{} = {}{}{}",
                            pair.name,
                            destruct.value,
                            pair.structure,
                            self.nll(range)
                        ));
                        self.scopes.add_to_scope(&pair.name);
                        temp.push(buf);
                    } else if is_plain_name(&destruct.value) {
                        let mut defs = Vec::new();
                        let mut names = Vec::new();
                        let mut values = Vec::new();
                        for item in &destruct.items {
                            if item.is_variable && self.scopes.add_to_scope(&item.name) {
                                defs.push(item.name.clone());
                            }
                            names.push(item.name.clone());
                            values.push(format!("{}{}", destruct.value, item.structure));
                        }
                        if defs.is_empty() {
                            temp.push(format!(
                                "{}{} = {}{}",
                                self.indent(),
                                names.join(", "),
                                values.join(", "),
                                self.nll(range)
                            ));
                        } else {
                            let mut buf = format!("{}local ", self.indent());
                            if defs.len() != names.len() {
                                buf.push_str(&format!(
                                    "{}{}{}",
                                    defs.join(", "),
                                    self.nll(range),
                                    self.indent()
                                ));
                            }
                            buf.push_str(&format!(
                                "{} = {}{}",
                                names.join(", "),
                                values.join(", "),
                                self.nll(range)
                            ));
                            temp.push(buf);
                        }
                    } else {
                        let mut defs = Vec::new();
                        let mut names = Vec::new();
                        let mut structures = Vec::new();
                        for item in &destruct.items {
                            if item.is_variable && self.scopes.add_to_scope(&item.name) {
                                defs.push(item.name.clone());
                            }
                            names.push(item.name.clone());
                            structures.push(item.structure.clone());
                        }
                        let mut buf = String::new();
                        if !defs.is_empty() {
                            buf.push_str(&format!(
                                "{}local {}{}",
                                self.indent(),
                                defs.join(", "),
                                self.nll(range)
                            ));
                        }
                        buf.push_str(&format!("{}do{}", self.indent(), self.nll(range)));
                        self.scopes.push();
                        let obj_var = self.scopes.fresh("_obj_");
                        let values: Vec<String> = structures
                            .iter()
                            .map(|s| format!("{}{}", obj_var, s))
                            .collect();
                        buf.push_str(&format!(
                            "{}local {} = {}{}",
                            self.indent(),
                            obj_var,
                            destruct.value,
                            self.nll(range)
                        ));
                        buf.push_str(&format!(
                            "{}{} = {}{}",
                            self.indent(),
                            names.join(", "),
                            values.join(", "),
                            self.nll(range)
                        ));
                        self.scopes.pop();
                        buf.push_str(&format!("{}end{}", self.indent(), self.nll(range)));
                        temp.push(buf);
                    }
                }
                if let Some(leftover) = leftover {
                    let ExpListAssign {
                        range: rest_range,
                        exp_list: rest_list,
                        action,
                    } = leftover;
                    if let Some(AssignAction::Assign(rest_assign)) = action {
                        self.transform_assignment_common(
                            rest_range,
                            rest_list,
                            rest_assign,
                            &mut temp,
                        )?;
                    }
                }
                out.push(temp.concat());
                Ok(())
            }
        }
    }

    fn predefine_for(
        &mut self,
        exp_list: &ExpList,
        assign: &Assign,
    ) -> Result<String, CompileError> {
        let pre = self.destructure_define(exp_list, assign)?;
        if !pre.is_empty() {
            return Ok(pre);
        }
        let defs = self.transform_assign_defs(exp_list)?;
        Ok(self.predefine_line(&defs))
    }

    fn prepend_predefine(&self, out: &mut Vec<String>, pre: &str, range: InputRange) {
        if pre.is_empty() {
            return;
        }
        if let Some(last) = out.last_mut() {
            last.insert_str(0, &format!("{}{}", pre, self.nll(range)));
        }
    }

    fn transform_update(
        &mut self,
        exp_list: ExpList,
        update: Update,
        range: InputRange,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        if exp_list.exprs.len() > 1 {
            return Err(self.logic_error("Can not apply update to multiple values.", exp_list.range));
        }
        let left_exp = match exp_list.exprs.into_iter().next() {
            Some(exp) => exp,
            None => return Ok(()),
        };
        if !left_exp.op_values.is_empty() {
            return Err(
                self.logic_error("Left hand expression is not assignable.", left_exp.range)
            );
        }
        let mut left_value = *left_exp.value;
        let mut temp = Vec::new();
        // Impure index expressions inside the target chain must be
        // evaluated once; bind them to temporaries first.
        if let ValueItem::ChainValue(chain) = &mut left_value.item {
            let chain_items = std::mem::take(&mut chain.items);
            let mut new_items = Vec::with_capacity(chain_items.len());
            for item in chain_items {
                if let ChainItem::Index(exp) = item {
                    if single_variable_from(&exp).is_none() {
                        let up_var = self.scopes.fresh("_update_");
                        let assignment = ExpListAssign::new(
                            ExpList::var(&up_var, range),
                            Some(AssignAction::Assign(Assign::single(
                                AssignValue::Exp(exp),
                                range,
                            ))),
                        );
                        self.transform_assignment(assignment, &mut temp)?;
                        new_items.push(ChainItem::Index(Exp::var(&up_var, range)));
                    } else {
                        new_items.push(ChainItem::Index(exp));
                    }
                } else {
                    new_items.push(item);
                }
            }
            chain.items = new_items;
        }
        let mut tmp = Vec::new();
        self.transform_value(&left_value, &mut tmp)?;
        let left = tmp.pop().unwrap_or_default();
        let mut tmp = Vec::new();
        self.transform_exp(&update.value, &mut tmp)?;
        let mut right = tmp.pop().unwrap_or_default();
        if single_value(&update.value).is_none() {
            right = format!("({})", right);
        }
        out.push(format!(
            "{}{}{} = {} {} {}{}",
            temp.concat(),
            self.indent(),
            left,
            left,
            update.op,
            right,
            self.nll(range)
        ));
        Ok(())
    }

    fn transform_assignment_common(
        &mut self,
        range: InputRange,
        exp_list: ExpList,
        mut assign: Assign,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let defs = self.get_assign_defs(&exp_list)?;
        let references = assign_references(&mut assign, &defs);
        let one_lined = defs.len() == exp_list.exprs.len() && !references;
        if one_lined {
            let mut temp = Vec::new();
            for value in &assign.values {
                self.transform_assign_item(value, &mut temp)?;
            }
            let pre = self.predefine_line(&defs);
            for def in &defs {
                self.scopes.add_to_scope(def);
            }
            if pre.is_empty() {
                let mut tmp = Vec::new();
                self.transform_exp_list(&exp_list, &mut tmp)?;
                out.push(format!(
                    "{}{} = {}{}",
                    self.indent(),
                    tmp.concat(),
                    temp.join(", "),
                    self.nll(range)
                ));
            } else {
                out.push(format!("{} = {}{}", pre, temp.join(", "), self.nll(range)));
            }
        } else {
            let pre = self.predefine_line(&defs);
            for def in &defs {
                self.scopes.add_to_scope(def);
            }
            let mut tmp = Vec::new();
            self.transform_exp_list(&exp_list, &mut tmp)?;
            let left = tmp.concat();
            let mut temp = Vec::new();
            for value in &assign.values {
                self.transform_assign_item(value, &mut temp)?;
            }
            let prefix = if pre.is_empty() {
                String::new()
            } else {
                format!("{}{}", pre, self.nll(range))
            };
            out.push(format!(
                "{}{}{} = {}{}",
                prefix,
                self.indent(),
                left,
                temp.join(", "),
                self.nll(range)
            ));
        }
        Ok(())
    }

    pub(crate) fn extract_destructure_info(
        &mut self,
        exp_list: &ExpList,
        assign: &Assign,
        var_def_only: bool,
    ) -> Result<(Vec<Destructure>, Option<ExpListAssign>), CompileError> {
        let range = exp_list.range;
        let mut exprs: Vec<Exp> = exp_list.exprs.clone();
        let mut values: Vec<AssignValue> = assign.values.clone();
        let size = exprs.len().max(values.len());
        while exprs.len() < size {
            exprs.push(Exp::var("_", range));
        }
        while values.len() < size {
            values.push(AssignValue::Exp(Exp::nil(range)));
        }
        let mut destructs = Vec::new();
        let mut keep_exprs = Vec::new();
        let mut keep_values = Vec::new();
        for (exp, value) in exprs.into_iter().zip(values.into_iter()) {
            if destructure_target(&exp) {
                let mut destruct = Destructure {
                    value: String::new(),
                    items: Vec::new(),
                };
                if !var_def_only {
                    self.scopes.push();
                    let mut tmp = Vec::new();
                    let result = self.transform_assign_item(&value, &mut tmp);
                    self.scopes.pop();
                    result?;
                    destruct.value = tmp.pop().unwrap_or_default();
                }
                destruct.items = self.destruct_items(DestructTarget::Exp(&exp), var_def_only)?;
                destructs.push(destruct);
            } else {
                keep_exprs.push(exp);
                keep_values.push(value);
            }
        }
        let leftover = if !destructs.is_empty() && !keep_exprs.is_empty() {
            Some(ExpListAssign {
                range,
                exp_list: ExpList {
                    range,
                    exprs: keep_exprs,
                },
                action: Some(AssignAction::Assign(Assign {
                    range,
                    values: keep_values,
                })),
            })
        } else {
            None
        };
        Ok((destructs, leftover))
    }

    pub(crate) fn destruct_items(
        &mut self,
        target: DestructTarget<'_>,
        pure: bool,
    ) -> Result<Vec<DestructItem>, CompileError> {
        enum Entry<'x> {
            Exp(&'x Exp),
            Var(&'x VariablePair),
            Normal(&'x NormalPair),
        }
        let entries = match &target {
            DestructTarget::Exp(exp) => {
                let Some(value) = single_value(exp) else {
                    return Err(self.logic_error("Invalid destructure value.", exp.range));
                };
                match &value.item {
                    ValueItem::SimpleValue(simple) => match &simple.value {
                        SimpleValueKind::TableLit(table) => table
                            .values
                            .iter()
                            .map(|entry| match entry {
                                TableEntry::Exp(exp) => Entry::Exp(exp),
                                TableEntry::VariablePair(pair) => Entry::Var(pair),
                                TableEntry::NormalPair(pair) => Entry::Normal(pair),
                            })
                            .collect::<Vec<_>>(),
                        _ => return Err(self.logic_error("Invalid destructure value.", exp.range)),
                    },
                    ValueItem::SimpleTable(table) => table
                        .pairs
                        .iter()
                        .map(|pair| match pair {
                            TablePair::Variable(pair) => Entry::Var(pair),
                            TablePair::Normal(pair) => Entry::Normal(pair),
                        })
                        .collect::<Vec<_>>(),
                    _ => return Err(self.logic_error("Invalid destructure value.", exp.range)),
                }
            }
            DestructTarget::TableBlock(table) => table
                .values
                .iter()
                .map(|pair| match pair {
                    TablePair::Variable(pair) => Entry::Var(pair),
                    TablePair::Normal(pair) => Entry::Normal(pair),
                })
                .collect::<Vec<_>>(),
        };
        let mut pairs: Vec<DestructItem> = Vec::new();
        let mut index = 0usize;
        for entry in entries {
            match entry {
                Entry::Exp(exp) => {
                    index += 1;
                    if !is_assignable_exp(exp) {
                        return Err(self.logic_error("Can't destructure value.", exp.range));
                    }
                    if destructure_target(exp) {
                        let sub = self.destruct_items(DestructTarget::Exp(exp), pure)?;
                        for item in sub {
                            pairs.push(DestructItem {
                                is_variable: item.is_variable,
                                name: item.name,
                                structure: format!("[{}]{}", index, item.structure),
                            });
                        }
                    } else {
                        let (is_variable, name) = self.destruct_leaf_name(exp, pure)?;
                        pairs.push(DestructItem {
                            is_variable,
                            name,
                            structure: format!("[{}]", index),
                        });
                    }
                }
                Entry::Var(pair) => {
                    let name = pair.name.name.text.to_string();
                    let structure = if is_keyword(&name) {
                        format!("[\"{}\"]", name)
                    } else {
                        format!(".{}", name)
                    };
                    pairs.push(DestructItem {
                        is_variable: true,
                        name,
                        structure,
                    });
                }
                Entry::Normal(pair) => {
                    let key = match &pair.key {
                        PairKey::KeyName(key_name) => match &key_name.item {
                            KeyNameItem::Name(name) => name.text.to_string(),
                            KeyNameItem::SelfName(self_name) => match &self_name.kind {
                                SelfKind::Field(name) | SelfKind::ClassField(name) => {
                                    name.text.to_string()
                                }
                                _ => {
                                    return Err(self.logic_error(
                                        "Invalid key for destructure.",
                                        pair.range,
                                    ));
                                }
                            },
                        },
                        _ => {
                            return Err(
                                self.logic_error("Invalid key for destructure.", pair.range)
                            );
                        }
                    };
                    match &pair.value {
                        PairValue::Exp(exp) => {
                            if !is_assignable_exp(exp) {
                                return Err(self.logic_error("Can't destructure value.", exp.range));
                            }
                            if destructure_target(exp) {
                                let sub = self.destruct_items(DestructTarget::Exp(exp), pure)?;
                                let prefix = if is_keyword(&key) {
                                    format!("[\"{}\"]", key)
                                } else {
                                    format!(".{}", key)
                                };
                                for item in sub {
                                    pairs.push(DestructItem {
                                        is_variable: item.is_variable,
                                        name: item.name,
                                        structure: format!("{}{}", prefix, item.structure),
                                    });
                                }
                            } else {
                                let (is_variable, name) = self.destruct_leaf_name(exp, pure)?;
                                let structure = if is_keyword(&key) {
                                    format!("[\"{}\"]", key)
                                } else {
                                    format!(".{}", key)
                                };
                                pairs.push(DestructItem {
                                    is_variable,
                                    name,
                                    structure,
                                });
                            }
                        }
                        PairValue::TableBlock(table) => {
                            let sub =
                                self.destruct_items(DestructTarget::TableBlock(table), pure)?;
                            for item in sub {
                                pairs.push(DestructItem {
                                    is_variable: item.is_variable,
                                    name: item.name,
                                    structure: format!(".{}{}", key, item.structure),
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(pairs)
    }

    fn destruct_leaf_name(
        &mut self,
        exp: &Exp,
        pure: bool,
    ) -> Result<(bool, String), CompileError> {
        if let Some(name) = single_variable_from(exp) {
            return Ok((true, name.to_string()));
        }
        if pure {
            return Ok((false, String::new()));
        }
        let lint = self.lint;
        self.lint = false;
        let mut tmp = Vec::new();
        let result = self.transform_exp(exp, &mut tmp);
        self.lint = lint;
        result?;
        Ok((false, tmp.pop().unwrap_or_default()))
    }
}

/// Whether any right-hand value references one of the names about to
/// be declared; if so the `local` line must precede the assignment.
fn assign_references(assign: &mut Assign, defs: &[String]) -> bool {
    if defs.is_empty() {
        return false;
    }
    walk::walk_assign(assign, &mut |node| match node {
        walk::NodeMut::Callable(callable) => match &callable.item {
            CallableItem::Variable(var) => {
                if defs.iter().any(|def| def == var.name.text.as_str()) {
                    Traversal::Stop
                } else {
                    Traversal::Return
                }
            }
            CallableItem::SelfName(_) => {
                if defs.iter().any(|def| def == "self") {
                    Traversal::Stop
                } else {
                    Traversal::Return
                }
            }
            _ => Traversal::Continue,
        },
        _ => Traversal::Continue,
    }) == Traversal::Stop
}
