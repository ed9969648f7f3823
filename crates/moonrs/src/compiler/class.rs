// Class lowering: the `_base_`/`_class_` metatable idiom, member
// classification, property members against a local `self`, and the
// `super` rewrite to `__parent` accesses.

use super::{Compiler, ExpUsage, single_value};
use crate::ast::walk::{self, NodeMut, Traversal};
use crate::ast::*;
use crate::error::CompileError;
use crate::parser::InputRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemType {
    /// `__init` and other metatable slots placed on the class table.
    Builtin,
    /// Ordinary members placed on the base table.
    Common,
    /// `@name:` members emitted as statements against `local self`.
    Property,
}

struct ClassMember {
    item: String,
    mem_type: MemType,
    range: InputRange,
}

fn insert_self_to_arguments(item: &mut ChainItem, range: InputRange) -> bool {
    match item {
        ChainItem::Invoke(invoke) => {
            invoke.args.insert(0, InvokeArg::Exp(Exp::var("self", range)));
            true
        }
        ChainItem::InvokeArgs(invoke_args) => {
            invoke_args
                .args
                .insert(0, InvokeArgsItem::Exp(Exp::var("self", range)));
            true
        }
        _ => false,
    }
}

fn rewrite_super_chain(chain: &mut ChainValue, class_var: &str, default_call: &str) {
    let is_super = matches!(
        chain.items.first(),
        Some(ChainItem::Callable(callable))
            if matches!(&callable.item, CallableItem::Variable(var) if var.name.text == "super")
    );
    if !is_super {
        return;
    }
    let range = chain.range;
    let mut new_call = default_call.to_string();
    if chain.items.len() >= 2 {
        let inserted = insert_self_to_arguments(&mut chain.items[1], range);
        if !inserted {
            let second_is_colon = matches!(chain.items[1], ChainItem::ColonChain(_));
            if second_is_colon && chain.items.len() > 2 {
                if insert_self_to_arguments(&mut chain.items[2], range) {
                    if let ChainItem::ColonChain(colon) = &mut chain.items[1] {
                        colon.switch_to_dot = true;
                    }
                }
            }
            new_call = format!("{}.__parent", class_var);
        }
    } else {
        new_call = format!("{}.__parent", class_var);
    }
    let new_chain = ChainValue::dotted(&new_call, range);
    chain.items.splice(0..1, new_chain.items);
}

fn rewrite_super_in_pair_value(value: &mut PairValue, class_var: &str, default_call: &str) {
    let mut callback = |node: NodeMut<'_>| match node {
        NodeMut::ClassDecl(_) => Traversal::Return,
        NodeMut::ChainValue(chain) => {
            rewrite_super_chain(chain, class_var, default_call);
            Traversal::Continue
        }
        _ => Traversal::Continue,
    };
    match value {
        PairValue::Exp(exp) => {
            walk::walk_exp(exp, &mut callback);
        }
        PairValue::TableBlock(table) => {
            walk::walk_table_block(table, &mut callback);
        }
    }
}

impl Compiler {
    pub(crate) fn transform_assignable(
        &mut self,
        assignable: &Assignable,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        match &assignable.item {
            AssignableItem::Chain(chain) => self.transform_assignable_chain(chain, out),
            AssignableItem::Variable(var) => {
                out.push(var.name.text.to_string());
                Ok(())
            }
            AssignableItem::SelfName(self_name) => {
                let text = self.transform_self_name(self_name, None)?;
                out.push(text);
                Ok(())
            }
        }
    }

    fn define_class_variable(&mut self, assignable: &Assignable) -> (Option<String>, bool) {
        if let AssignableItem::Variable(var) = &assignable.item {
            let name = var.name.text.to_string();
            let new_defined = self.scopes.add_to_scope(&name);
            (Some(name), new_defined)
        } else {
            (None, false)
        }
    }

    pub(crate) fn transform_class_decl_closure(
        &mut self,
        node: ClassDecl,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp = vec![format!("(function(){}", self.nll(range))];
        self.scopes.push();
        let result = self.transform_class_decl(node, &mut temp, ExpUsage::Return, None);
        self.scopes.pop();
        result?;
        temp.push(String::from("end)()"));
        out.push(temp.concat());
        Ok(())
    }

    pub(crate) fn transform_class_decl(
        &mut self,
        node: ClassDecl,
        out: &mut Vec<String>,
        usage: ExpUsage,
        exp_list: Option<&ExpList>,
    ) -> Result<(), CompileError> {
        let range = node.range;
        let mut temp: Vec<String> = Vec::new();
        let mut class_name = String::new();
        let mut assign_item = String::new();
        if let Some(assignable) = &node.name {
            if !super::is_assignable(assignable) {
                return Err(
                    self.logic_error("Left hand expression is not assignable.", assignable.range)
                );
            }
            let (name, new_defined) = self.define_class_variable(assignable);
            if new_defined {
                temp.push(format!(
                    "{}local {}{}",
                    self.indent(),
                    name.as_deref().unwrap_or_default(),
                    self.nll(range)
                ));
            }
            match &name {
                Some(name) => class_name = format!("\"{}\"", name),
                None => {
                    if let AssignableItem::Chain(chain) = &assignable.item {
                        match chain.items.last() {
                            Some(ChainItem::DotChain(dot)) => {
                                class_name = format!("\"{}\"", dot.name.text);
                            }
                            Some(ChainItem::Index(exp)) => {
                                if let Some(value) = single_value(exp) {
                                    if let ValueItem::Str(s) = &value.item {
                                        let s = s.clone();
                                        let mut tmp = Vec::new();
                                        self.transform_string(&s, &mut tmp)?;
                                        class_name = tmp.concat();
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            self.scopes.push();
            let mut tmp = Vec::new();
            let result = self.transform_assignable(assignable, &mut tmp);
            self.scopes.pop();
            result?;
            assign_item = tmp.concat();
        } else if let Some(list) = exp_list {
            if let Some(name) = super::single_variable_in_list(list) {
                class_name = format!("\"{}\"", name);
            }
        }
        temp.push(format!("{}do{}", self.indent(), self.nll(range)));
        self.scopes.push();
        let class_var = self.scopes.fresh("_class_");
        self.scopes.add_to_scope(&class_var);
        temp.push(format!(
            "{}local {}{}",
            self.indent(),
            class_var,
            self.nll(range)
        ));
        if let Some(body) = &node.body {
            let mut var_defs: Vec<String> = Vec::new();
            for content in &body.contents {
                if let ClassContent::Statement(stmt) = content {
                    if let StatementContent::ExpListAssign(ela) = &stmt.content {
                        if let Some(AssignAction::Assign(assign)) = &ela.action {
                            let names = self.transform_assign_defs(&ela.exp_list)?;
                            var_defs.extend(names);
                            let (destructs, _) =
                                self.extract_destructure_info(&ela.exp_list, assign, true)?;
                            for destruct in &destructs {
                                for item in &destruct.items {
                                    if item.is_variable && self.scopes.add_to_scope(&item.name) {
                                        var_defs.push(item.name.clone());
                                    }
                                }
                            }
                            if let Some(name) = super::class_decl_from_assignment(ela)
                                .and_then(super::class_decl_variable)
                            {
                                if self.scopes.add_to_scope(&name) {
                                    var_defs.push(name.to_string());
                                }
                            }
                        } else if ela.action.is_none() {
                            if let Some(name) = super::class_decl_from_exp_list(&ela.exp_list)
                                .and_then(super::class_decl_variable)
                            {
                                if self.scopes.add_to_scope(&name) {
                                    var_defs.push(name.to_string());
                                }
                            }
                        }
                    }
                }
            }
            if !var_defs.is_empty() {
                temp.push(format!(
                    "{}local {}{}",
                    self.indent(),
                    var_defs.join(", "),
                    self.nll(range)
                ));
            }
        }
        let has_parent = node.extend.is_some();
        let mut parent_var = String::new();
        if let Some(extend) = &node.extend {
            parent_var = self.scopes.fresh("_parent_");
            self.scopes.add_to_scope(&parent_var);
            let mut tmp = Vec::new();
            self.transform_exp(extend, &mut tmp)?;
            temp.push(format!(
                "{}local {} = {}{}",
                self.indent(),
                parent_var,
                tmp.concat(),
                self.nll(range)
            ));
        }
        let base_var = self.scopes.fresh("_base_");
        self.scopes.add_to_scope(&base_var);

        let mut members: Vec<ClassMember> = Vec::new();
        let mut statements: Vec<String> = Vec::new();
        if let Some(body) = node.body {
            for content in body.contents {
                match content {
                    ClassContent::MemberList(list) => {
                        let start = members.len();
                        self.transform_class_member_list(list, &class_var, &mut members)?;
                        for member in &mut members[start..] {
                            if member.mem_type == MemType::Property {
                                statements.push(format!(
                                    "{}{}{}",
                                    self.indent(),
                                    member.item,
                                    self.nll(member.range)
                                ));
                            } else {
                                member.item = format!("{}{}", self.indent_level(1), member.item);
                            }
                        }
                    }
                    ClassContent::Statement(stmt) => {
                        self.transform_statement(stmt, &mut statements)?;
                    }
                }
            }
        }
        let commons: Vec<&ClassMember> = members
            .iter()
            .filter(|m| m.mem_type == MemType::Common)
            .collect();
        let builtins: Vec<&ClassMember> = members
            .iter()
            .filter(|m| m.mem_type == MemType::Builtin)
            .collect();
        if commons.is_empty() {
            temp.push(format!(
                "{}local {} = {{ }}{}",
                self.indent(),
                base_var,
                self.nll(range)
            ));
        } else {
            let mut buf = format!("{}local {} = {{{}", self.indent(), base_var, self.nll(range));
            for (i, member) in commons.iter().enumerate() {
                if i > 0 {
                    buf.push_str(&format!(",{}", self.nll(member.range)));
                }
                buf.push_str(&member.item);
            }
            buf.push_str(&self.nll(range));
            buf.push_str(&format!("{}{}{}", self.indent(), "}", self.nll(range)));
            temp.push(buf);
        }
        temp.push(format!(
            "{}{}.__index = {}{}",
            self.indent(),
            base_var,
            base_var,
            self.nll(range)
        ));
        let mut assignment_code: Option<String> = None;
        if usage == ExpUsage::Assignment {
            if let Some(list) = exp_list {
                let assignment = ExpListAssign::new(
                    list.clone(),
                    Some(AssignAction::Assign(Assign::single(
                        AssignValue::Exp(Exp::var(&class_var, range)),
                        range,
                    ))),
                );
                let mut tmp = Vec::new();
                self.transform_assignment(assignment, &mut tmp)?;
                assignment_code = Some(tmp.concat());
            }
        }
        let mut buf = String::new();
        if has_parent {
            buf.push_str(&format!(
                "{}setmetatable({}, {}.__base){}",
                self.indent(),
                base_var,
                parent_var,
                self.nll(range)
            ));
        }
        buf.push_str(&format!(
            "{}{} = setmetatable({{{}",
            self.indent(),
            class_var,
            self.nll(range)
        ));
        if builtins.is_empty() {
            if has_parent {
                buf.push_str(&format!(
                    "{}__init = function(self, ...){}",
                    self.indent_level(1),
                    self.nll(range)
                ));
                buf.push_str(&format!(
                    "{}return {}.__parent.__init(self, ...){}",
                    self.indent_level(2),
                    class_var,
                    self.nll(range)
                ));
                buf.push_str(&format!("{}end,{}", self.indent_level(1), self.nll(range)));
            } else {
                buf.push_str(&format!(
                    "{}__init = function() end,{}",
                    self.indent_level(1),
                    self.nll(range)
                ));
            }
        } else {
            for (i, member) in builtins.iter().enumerate() {
                if i > 0 {
                    buf.push_str(&format!(",{}", self.nll(member.range)));
                }
                buf.push_str(&member.item);
            }
            buf.push_str(&format!(",{}", self.nll(range)));
        }
        buf.push_str(&format!("{}__base = {}", self.indent_level(1), base_var));
        if !class_name.is_empty() {
            buf.push_str(&format!(
                ",{}{}__name = {}{}{}",
                self.nll(range),
                self.indent_level(1),
                class_name,
                if has_parent { "," } else { "" },
                self.nll(range)
            ));
        } else {
            buf.push_str(&self.nll(range));
        }
        if has_parent {
            buf.push_str(&format!(
                "{}__parent = {}{}",
                self.indent_level(1),
                parent_var,
                self.nll(range)
            ));
        }
        buf.push_str(&format!("{}}}, {{{}", self.indent(), self.nll(range)));
        if has_parent {
            buf.push_str(&format!(
                "{}__index = function(cls, name){}",
                self.indent_level(1),
                self.nll(range)
            ));
            buf.push_str(&format!(
                "{}local val = rawget({}, name){}",
                self.indent_level(2),
                base_var,
                self.nll(range)
            ));
            buf.push_str(&format!(
                "{}if val == nil then{}",
                self.indent_level(2),
                self.nll(range)
            ));
            buf.push_str(&format!(
                "{}local parent = rawget(cls, \"__parent\"){}",
                self.indent_level(3),
                self.nll(range)
            ));
            buf.push_str(&format!(
                "{}if parent then{}",
                self.indent_level(3),
                self.nll(range)
            ));
            buf.push_str(&format!(
                "{}return parent[name]{}",
                self.indent_level(4),
                self.nll(range)
            ));
            buf.push_str(&format!("{}end{}", self.indent_level(3), self.nll(range)));
            buf.push_str(&format!("{}else{}", self.indent_level(2), self.nll(range)));
            buf.push_str(&format!(
                "{}return val{}",
                self.indent_level(3),
                self.nll(range)
            ));
            buf.push_str(&format!("{}end{}", self.indent_level(2), self.nll(range)));
            buf.push_str(&format!("{}end,{}", self.indent_level(1), self.nll(range)));
        } else {
            buf.push_str(&format!(
                "{}__index = {},{}",
                self.indent_level(1),
                base_var,
                self.nll(range)
            ));
        }
        buf.push_str(&format!(
            "{}__call = function(cls, ...){}",
            self.indent_level(1),
            self.nll(range)
        ));
        self.scopes.push();
        let self_var = self.scopes.fresh("_self_");
        self.scopes.add_to_scope(&self_var);
        buf.push_str(&format!(
            "{}local {} = setmetatable({{}}, {}){}",
            self.indent_level(1),
            self_var,
            base_var,
            self.nll(range)
        ));
        buf.push_str(&format!(
            "{}cls.__init({}, ...){}",
            self.indent_level(1),
            self_var,
            self.nll(range)
        ));
        buf.push_str(&format!(
            "{}return {}{}",
            self.indent_level(1),
            self_var,
            self.nll(range)
        ));
        self.scopes.pop();
        buf.push_str(&format!("{}end{}", self.indent_level(1), self.nll(range)));
        buf.push_str(&format!("{}}}){}", self.indent(), self.nll(range)));
        buf.push_str(&format!(
            "{}{}.__class = {}{}",
            self.indent(),
            base_var,
            class_var,
            self.nll(range)
        ));
        if !statements.is_empty() {
            buf.push_str(&format!(
                "{}local self = {}{}",
                self.indent(),
                class_var,
                self.nll(range)
            ));
            buf.push_str(&statements.concat());
        }
        if has_parent {
            buf.push_str(&format!(
                "{}if {}.__inherited then{}",
                self.indent(),
                parent_var,
                self.nll(range)
            ));
            buf.push_str(&format!(
                "{}{}.__inherited({}, {}){}",
                self.indent_level(1),
                parent_var,
                parent_var,
                class_var,
                self.nll(range)
            ));
            buf.push_str(&format!("{}end{}", self.indent(), self.nll(range)));
        }
        if !assign_item.is_empty() {
            buf.push_str(&format!(
                "{}{} = {}{}",
                self.indent(),
                assign_item,
                class_var,
                self.nll(range)
            ));
        }
        match usage {
            ExpUsage::Return => {
                buf.push_str(&format!(
                    "{}return {}{}",
                    self.indent(),
                    class_var,
                    self.nlr(range)
                ));
            }
            ExpUsage::Assignment => {
                if let Some(code) = assignment_code {
                    buf.push_str(&code);
                }
            }
            _ => {}
        }
        temp.push(buf);
        self.scopes.pop();
        temp.push(format!("{}end{}", self.indent(), self.nlr(range)));
        out.push(temp.concat());
        Ok(())
    }

    fn transform_class_member_list(
        &mut self,
        list: ClassMemberList,
        class_var: &str,
        members: &mut Vec<ClassMember>,
    ) -> Result<usize, CompileError> {
        let mut count = 0;
        for mut pair in list.values {
            let mut mem_type = MemType::Common;
            let pair_range = match &pair {
                TablePair::Variable(p) => p.range,
                TablePair::Normal(p) => p.range,
            };
            if let TablePair::Normal(normal) = &mut pair {
                if let PairKey::KeyName(key_name) = &mut normal.key {
                    let new_super_call = match &mut key_name.item {
                        KeyNameItem::SelfName(self_name) => {
                            mem_type = MemType::Property;
                            let name = match &self_name.kind {
                                SelfKind::Field(name) => name.text.clone(),
                                _ => {
                                    return Err(self.logic_error(
                                        "Invalid class property name.",
                                        self_name.range,
                                    ));
                                }
                            };
                            format!("{}.__parent.{}", class_var, name)
                        }
                        KeyNameItem::Name(name) => {
                            if name.text == "new" {
                                mem_type = MemType::Builtin;
                                *name = Name::synth("__init", name.range);
                                format!("{}.__parent.__init", class_var)
                            } else {
                                format!("{}.__parent.__base.{}", class_var, name.text)
                            }
                        }
                    };
                    rewrite_super_in_pair_value(&mut normal.value, class_var, &new_super_call);
                }
            }
            self.scopes.push();
            if mem_type == MemType::Property {
                self.indent_offset -= 1;
            }
            let mut tmp = Vec::new();
            let result = match &pair {
                TablePair::Variable(variable_pair) => {
                    self.transform_variable_pair(variable_pair, &mut tmp)
                }
                TablePair::Normal(normal_pair) => self.transform_normal_pair(normal_pair, &mut tmp),
            };
            if mem_type == MemType::Property {
                self.indent_offset += 1;
            }
            self.scopes.pop();
            result?;
            members.push(ClassMember {
                item: tmp.concat(),
                mem_type,
                range: pair_range,
            });
            count += 1;
        }
        Ok(count)
    }
}
