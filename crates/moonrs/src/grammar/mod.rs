// The concrete MoonScript grammar, written in the pattern DSL from
// `parser`. Indentation, keyword exclusion, heredoc matching and the
// `do`-suppression stack run as user predicates over the parser State;
// everything else is context-free.

mod actions;

use crate::ast::{AstStack, File};
use crate::parser::{
    Grammar, InputRange, ParseContext, ParseError, Pattern, Rule, State, and_, any, eof, expr,
    false_, nl, not_, plus, range, set, star, true_, user,
};

pub fn is_lua_keyword(name: &str) -> bool {
    matches!(
        name,
        "and"
            | "break"
            | "do"
            | "else"
            | "elseif"
            | "end"
            | "false"
            | "for"
            | "function"
            | "if"
            | "in"
            | "local"
            | "nil"
            | "not"
            | "or"
            | "repeat"
            | "return"
            | "then"
            | "true"
            | "until"
            | "while"
    )
}

/// Lua keywords plus the MoonScript-only ones; none of these may be
/// used as a variable name.
pub fn is_keyword(name: &str) -> bool {
    is_lua_keyword(name)
        || matches!(
            name,
            "as" | "class"
                | "continue"
                | "export"
                | "extends"
                | "from"
                | "global"
                | "import"
                | "switch"
                | "unless"
                | "using"
                | "when"
                | "with"
        )
}

fn indent_width(slice: &[char]) -> i32 {
    let mut indent = 0;
    for c in slice {
        match c {
            ' ' => indent += 1,
            '\t' => indent += 4,
            _ => {}
        }
    }
    indent
}

fn check_indent_pred(state: &mut State, slice: &[char]) -> bool {
    indent_width(slice) == *state.indents.last().unwrap_or(&0)
}

fn advance_pred(state: &mut State, slice: &[char]) -> bool {
    let indent = indent_width(slice);
    let top = *state.indents.last().unwrap_or(&0);
    if top != -1 && indent > top {
        state.indents.push(indent);
        return true;
    }
    false
}

fn push_indent_pred(state: &mut State, slice: &[char]) -> bool {
    state.indents.push(indent_width(slice));
    true
}

fn prevent_indent_pred(state: &mut State, _slice: &[char]) -> bool {
    state.indents.push(-1);
    true
}

fn pop_indent_pred(state: &mut State, _slice: &[char]) -> bool {
    state.indents.pop();
    true
}

fn disable_do_pred(state: &mut State, _slice: &[char]) -> bool {
    state.do_stack.push(false);
    true
}

fn pop_do_pred(state: &mut State, _slice: &[char]) -> bool {
    state.do_stack.pop();
    true
}

fn check_do_pred(state: &mut State, _slice: &[char]) -> bool {
    state.do_stack.last().copied().unwrap_or(true)
}

fn variable_pred(state: &mut State, slice: &[char]) -> bool {
    state.buffer.clear();
    state.buffer.extend(slice.iter());
    let valid = !is_keyword(&state.buffer);
    if valid && state.buffer == state.module_name {
        state.module_fix += 1;
        state.module_name = format!("_module_{}", state.module_fix);
    }
    state.buffer.clear();
    valid
}

fn lua_keyword_pred(state: &mut State, slice: &[char]) -> bool {
    state.buffer.clear();
    state.buffer.extend(slice.iter());
    let found = is_lua_keyword(&state.buffer);
    state.buffer.clear();
    found
}

fn lua_string_open_pred(state: &mut State, slice: &[char]) -> bool {
    state.string_open = slice.len();
    true
}

fn lua_string_close_pred(state: &mut State, slice: &[char]) -> bool {
    state.string_open == slice.len()
}

fn export_pred(state: &mut State, _slice: &[char]) -> bool {
    state.export_count += 1;
    true
}

fn ensure(patt: impl Into<Pattern>, finally: impl Into<Pattern>) -> Pattern {
    let finally = finally.into();
    (patt.into() >> finally.clone()) | (finally >> false_())
}

/// Result of a successful parse: the tree plus the module/export
/// bookkeeping collected by the grammar's user predicates.
pub struct ParseInfo {
    pub root: File,
    pub module_name: String,
    pub export_default: bool,
    pub export_count: usize,
}

/// The MoonScript parser: a built grammar plus its start rule. One
/// instance can serve any number of sequential parses.
pub struct MoonParser {
    grammar: Grammar,
    file: Rule,
}

impl MoonParser {
    pub fn new() -> MoonParser {
        build()
    }

    pub fn parse(&self, source: &str) -> Result<ParseInfo, ParseError> {
        let chars: Vec<char> = source.chars().collect();
        self.parse_chars(&chars)
    }

    /// Parses pre-decoded input. After the runtime succeeds, the queued
    /// semantic actions fire in order against a fresh construction
    /// stack; exactly one `File` node remains.
    pub fn parse_chars(&self, input: &[char]) -> Result<ParseInfo, ParseError> {
        let context = ParseContext::new(&self.grammar, input, State::new());
        let (matches, state) = context.run(self.file).map_err(|(err, _)| err)?;
        let mut stack = AstStack::new();
        for m in &matches {
            if let Some(action) = self.grammar.rules[m.rule.0].action {
                action(&mut stack, InputRange::new(m.begin, m.end), input);
            }
        }
        let root = stack.pop_file();
        debug_assert!(stack.is_empty(), "construction stack not empty after parse");
        Ok(ParseInfo {
            root,
            module_name: state.module_name,
            export_default: state.export_default,
            export_count: state.export_count,
        })
    }
}

impl Default for MoonParser {
    fn default() -> MoonParser {
        MoonParser::new()
    }
}

fn build() -> MoonParser {
    let mut g = Grammar::new();

    // Whitespace and layout.
    let plain_space = g.rule();
    let break_ = g.rule();
    let any_ = g.rule();
    let stop = g.rule();
    let indent = g.rule();
    let comment = g.rule();
    let multi_line_open = g.rule();
    let multi_line_close = g.rule();
    let multi_line_content = g.rule();
    let multi_line_comment = g.rule();
    let escape_new_line = g.rule();
    let space = g.rule();
    let space_break = g.rule();
    let white = g.rule();
    let empty_line = g.rule();
    let alpha_num = g.rule();
    let cut = g.rule();

    // Indentation and do-stack predicates.
    let check_indent = g.rule();
    let check_indent_la = g.rule();
    let advance = g.rule();
    let advance_la = g.rule();
    let push_indent = g.rule();
    let push_indent_la = g.rule();
    let prevent_indent = g.rule();
    let pop_indent = g.rule();
    let disable_do = g.rule();
    let pop_do = g.rule();
    let in_block = g.rule();

    // Leaves.
    let name = g.rule();
    let num = g.rule();
    let separator = g.rule();
    let variable = g.rule();
    let lua_keyword = g.rule();
    let self_ = g.rule();
    let self_name = g.rule();
    let self_class = g.rule();
    let self_class_name = g.rule();
    let self_item = g.rule();
    let key_name = g.rule();
    let var_arg = g.rule();

    // Statements.
    let local_flag = g.rule();
    let local_ = g.rule();
    let colon_import_name = g.rule();
    let import_name = g.rule();
    let import_name_list = g.rule();
    let import_literal_inner = g.rule();
    let import_literal_chain = g.rule();
    let import_literal = g.rule();
    let import_from = g.rule();
    let import_as = g.rule();
    let import_ = g.rule();
    let break_loop = g.rule();
    let return_ = g.rule();
    let with_exp = g.rule();
    let with_ = g.rule();
    let switch_case = g.rule();
    let switch_else = g.rule();
    let switch_block = g.rule();
    let switch_ = g.rule();
    let if_cond = g.rule();
    let if_else_if = g.rule();
    let if_else = g.rule();
    let if_ = g.rule();
    let unless_ = g.rule();
    let while_ = g.rule();
    let for_step_value = g.rule();
    let for_args = g.rule();
    let for_ = g.rule();
    let for_in = g.rule();
    let for_each = g.rule();
    let do_ = g.rule();

    // Comprehensions.
    let comprehension = g.rule();
    let comp_value = g.rule();
    let tbl_comprehension = g.rule();
    let comp_inner = g.rule();
    let star_exp = g.rule();
    let comp_for_each = g.rule();
    let comp_for = g.rule();
    let comp_clause = g.rule();

    // Assignment and operators.
    let assign = g.rule();
    let update_op = g.rule();
    let update = g.rule();
    let binary_operator = g.rule();
    let backcall_operator = g.rule();
    let assignable = g.rule();
    let exp_op_value = g.rule();
    let exp = g.rule();

    // Values and chains.
    let chain_value = g.rule();
    let simple_table = g.rule();
    let value = g.rule();
    let single_string_inner = g.rule();
    let single_string = g.rule();
    let interp = g.rule();
    let double_string_plain = g.rule();
    let double_string_inner = g.rule();
    let double_string_content = g.rule();
    let double_string = g.rule();
    let string = g.rule();
    let lua_string_open_plain = g.rule();
    let lua_string_close_plain = g.rule();
    let lua_string_open = g.rule();
    let lua_string_content = g.rule();
    let lua_string_close = g.rule();
    let lua_string = g.rule();
    let parens = g.rule();
    let callable = g.rule();
    let fn_args_exp_list = g.rule();
    let fn_args = g.rule();
    let existential_op = g.rule();
    let chain_call = g.rule();
    let chain_item_prefix = g.rule();
    let chain_dot_chain = g.rule();
    let chain = g.rule();
    let assignable_chain = g.rule();
    let chain_with_colon = g.rule();
    let chain_items = g.rule();
    let index = g.rule();
    let chain_item = g.rule();
    let dot_chain_item = g.rule();
    let colon_chain_item = g.rule();
    let invoke_chain = g.rule();
    let colon_chain = g.rule();
    let default_value = g.rule();
    let slice = g.rule();
    let invoke = g.rule();

    // Tables.
    let table_value = g.rule();
    let table_lit_lines = g.rule();
    let table_lit = g.rule();
    let table_value_list = g.rule();
    let table_lit_line = g.rule();
    let table_block_inner = g.rule();
    let table_block = g.rule();

    // Classes.
    let class_member_list = g.rule();
    let class_line = g.rule();
    let class_block = g.rule();
    let class_decl = g.rule();

    // Export.
    let export_op = g.rule();
    let export_values = g.rule();
    let export_ = g.rule();

    // Table pairs.
    let variable_pair = g.rule();
    let normal_pair = g.rule();
    let key_value = g.rule();
    let key_value_list = g.rule();
    let key_value_line = g.rule();

    // Functions.
    let fn_arg_def = g.rule();
    let fn_arg_def_list = g.rule();
    let outer_var_shadow = g.rule();
    let fn_args_def = g.rule();
    let fn_arrow = g.rule();
    let fun_lit = g.rule();
    let name_list = g.rule();
    let name_or_destructure = g.rule();
    let assignable_name_list = g.rule();
    let fn_arrow_back = g.rule();
    let backcall = g.rule();
    let exp_list = g.rule();
    let exp_list_low = g.rule();

    // Invocation argument blocks.
    let arg_line = g.rule();
    let arg_block = g.rule();
    let invoke_args_with_table = g.rule();
    let invoke_args = g.rule();

    // Simple values.
    let const_value = g.rule();
    let minus_exp = g.rule();
    let sharp_exp = g.rule();
    let tilde_exp = g.rule();
    let not_exp = g.rule();
    let unary_exp = g.rule();
    let simple_value = g.rule();

    // Statements and the file shape.
    let exp_list_assign = g.rule();
    let if_else_line = g.rule();
    let unless_line = g.rule();
    let statement_appendix = g.rule();
    let statement = g.rule();
    let body = g.rule();
    let empty_line_stop = g.rule();
    let line = g.rule();
    let block = g.rule();
    let shebang = g.rule();
    let file = g.rule();

    let sym = |s: &'static str| space >> s;
    let key = |s: &'static str| space >> s >> not_(alpha_num);

    g.def(plain_space, star(set(" \t")));
    g.def(break_, nl(-expr('\r') >> '\n'));
    g.def(any_, break_ | any());
    g.def(stop, break_ | eof());
    g.def(indent, plain_space);
    g.def(comment, expr("--") >> star(not_(set("\r\n")) >> any_) >> and_(stop));
    g.def(multi_line_open, expr("--[["));
    g.def(multi_line_close, expr("]]"));
    g.def(multi_line_content, star(not_(multi_line_close) >> any_));
    g.def(
        multi_line_comment,
        multi_line_open >> multi_line_content >> multi_line_close,
    );
    g.def(
        escape_new_line,
        expr('\\') >> star(set(" \t") | multi_line_comment) >> -comment >> break_,
    );
    g.def(
        space,
        star(set(" \t") | and_(set("-\\")) >> (multi_line_comment | escape_new_line)) >> -comment,
    );
    g.def(space_break, space >> break_);
    g.def(white, space >> star(break_ >> space));
    g.def(empty_line, space_break);
    g.def(
        alpha_num,
        range('a', 'z') | range('A', 'Z') | range('0', '9') | '_',
    );
    g.def(
        name,
        (range('a', 'z') | range('A', 'Z') | '_') >> star(alpha_num),
    );
    g.def(
        num,
        (expr("0x")
            >> plus(range('0', '9') | range('a', 'f') | range('A', 'F'))
            >> -(-set("uU") >> set("lL") >> set("lL")))
            | (plus(range('0', '9')) >> -set("uU") >> set("lL") >> set("lL"))
            | (((plus(range('0', '9')) >> -(expr('.') >> plus(range('0', '9'))))
                | (expr('.') >> plus(range('0', '9'))))
                >> -(set("eE") >> -expr('-') >> plus(range('0', '9')))),
    );
    g.def(cut, false_());
    g.def(separator, true_());

    g.def(variable, user(name, variable_pred));
    g.def(lua_keyword, user(name, lua_keyword_pred));

    g.def(self_, expr('@'));
    g.def(self_name, expr('@') >> name);
    g.def(self_class, expr("@@"));
    g.def(self_class_name, expr("@@") >> name);
    g.def(
        self_item,
        space >> (self_class_name | self_class | self_name | self_),
    );
    g.def(key_name, self_item | space >> name);
    g.def(var_arg, space >> "...");

    g.def(check_indent, user(indent, check_indent_pred));
    g.def(check_indent_la, and_(check_indent));
    g.def(advance, user(indent, advance_pred));
    g.def(advance_la, and_(advance));
    g.def(push_indent, user(indent, push_indent_pred));
    g.def(push_indent_la, and_(push_indent));
    g.def(prevent_indent, user(true_(), prevent_indent_pred));
    g.def(pop_indent, user(true_(), pop_indent_pred));
    g.def(disable_do, user(true_(), disable_do_pred));
    g.def(pop_do, user(true_(), pop_do_pred));
    g.def(in_block, advance_la >> ensure(block, pop_indent));

    g.def(local_flag, expr('*') | expr('^'));
    g.def(local_, key("local") >> ((space >> local_flag) | name_list));

    g.def(colon_import_name, sym("\\") >> space >> variable);
    g.def(import_name, colon_import_name | space >> variable);
    g.def(
        import_name_list,
        separator
            >> star(space_break)
            >> import_name
            >> star((plus(space_break) | sym(",") >> star(space_break)) >> import_name),
    );
    g.def(
        import_literal_inner,
        (range('a', 'z') | range('A', 'Z') | set("_-")) >> star(alpha_num | '-'),
    );
    g.def(
        import_literal_chain,
        separator >> import_literal_inner >> star(expr('.') >> import_literal_inner),
    );
    g.def(
        import_literal,
        sym("'") >> import_literal_chain >> expr('\'')
            | sym("\"") >> import_literal_chain >> expr('"'),
    );
    g.def(
        import_from,
        import_name_list >> star(space_break) >> key("from") >> exp,
    );
    g.def(
        import_as,
        import_literal >> -(key("as") >> (space >> variable | table_lit)),
    );
    g.def(import_, key("import") >> (import_as | import_from));

    g.def(
        break_loop,
        (expr("break") | expr("continue")) >> not_(alpha_num),
    );
    g.def(return_, key("return") >> -exp_list_low);
    g.def(with_exp, exp_list >> -assign);
    g.def(
        with_,
        key("with") >> disable_do >> ensure(with_exp, pop_do) >> -key("do") >> body,
    );

    g.def(switch_case, key("when") >> exp_list >> -key("then") >> body);
    g.def(switch_else, key("else") >> body);
    g.def(
        switch_block,
        star(empty_line)
            >> advance_la
            >> separator
            >> switch_case
            >> star(plus(space_break) >> switch_case)
            >> -(plus(space_break) >> switch_else)
            >> pop_indent,
    );
    g.def(
        switch_,
        key("switch") >> disable_do >> ensure(exp, pop_do) >> -key("do") >> -space >> break_
            >> switch_block,
    );

    g.def(if_cond, exp >> -assign);
    g.def(
        if_else_if,
        -(break_ >> star(empty_line) >> check_indent_la) >> key("elseif") >> if_cond
            >> -key("then")
            >> body,
    );
    g.def(
        if_else,
        -(break_ >> star(empty_line) >> check_indent_la) >> key("else") >> body,
    );
    g.def(
        if_,
        key("if") >> separator >> if_cond >> -key("then") >> body >> star(if_else_if) >> -if_else,
    );
    g.def(
        unless_,
        key("unless") >> separator >> if_cond >> -key("then") >> body >> star(if_else_if)
            >> -if_else,
    );
    g.def(
        while_,
        key("while") >> disable_do >> ensure(exp, pop_do) >> -key("do") >> body,
    );

    g.def(for_step_value, sym(",") >> white >> exp);
    g.def(
        for_args,
        space >> variable >> sym("=") >> exp >> sym(",") >> white >> exp >> -for_step_value,
    );
    g.def(
        for_,
        key("for") >> disable_do >> ensure(for_args, pop_do) >> -key("do") >> body,
    );
    g.def(for_in, star_exp | exp_list);
    g.def(
        for_each,
        key("for")
            >> assignable_name_list
            >> white
            >> key("in")
            >> disable_do
            >> ensure(for_in, pop_do)
            >> -key("do")
            >> body,
    );
    g.def(do_, user(key("do"), check_do_pred) >> body);

    g.def(comprehension, sym("[") >> exp >> comp_inner >> sym("]"));
    g.def(comp_value, sym(",") >> exp);
    g.def(
        tbl_comprehension,
        sym("{") >> exp >> -comp_value >> comp_inner >> sym("}"),
    );
    g.def(
        comp_inner,
        separator >> (comp_for_each | comp_for) >> star(comp_clause),
    );
    g.def(star_exp, sym("*") >> exp);
    g.def(
        comp_for_each,
        key("for") >> assignable_name_list >> key("in") >> (star_exp | exp),
    );
    g.def(
        comp_for,
        key("for") >> space >> variable >> sym("=") >> exp >> sym(",") >> white >> exp
            >> -for_step_value,
    );
    g.def(comp_clause, comp_for | comp_for_each | key("when") >> exp);

    g.def(
        assign,
        sym("=") >> separator
            >> (with_
                | if_
                | switch_
                | table_block
                | exp >> star((sym(",") | sym(";")) >> white >> exp)),
    );
    g.def(
        update_op,
        expr("..")
            | expr("+")
            | expr("-")
            | expr("*")
            | expr("/")
            | expr("%")
            | expr("or")
            | expr("and")
            | expr("&")
            | expr("|")
            | expr(">>")
            | expr("<<"),
    );
    g.def(update, space >> update_op >> expr("=") >> exp);

    g.def(
        binary_operator,
        (expr("or") >> not_(alpha_num))
            | (expr("and") >> not_(alpha_num))
            | expr("<=")
            | expr(">=")
            | expr("~=")
            | expr("!=")
            | expr("==")
            | expr("..")
            | expr("<<")
            | expr(">>")
            | expr("//")
            | set("+-*/%^><|&"),
    );
    g.def(backcall_operator, expr("|>"));

    g.def(assignable, assignable_chain | space >> variable | self_item);
    g.def(
        exp_op_value,
        space >> (backcall_operator | binary_operator) >> star(space_break) >> value,
    );
    g.def(exp, value >> star(exp_op_value));

    g.def(
        chain_value,
        separator >> (chain | callable) >> -existential_op >> -invoke_args,
    );
    g.def(simple_table, separator >> key_value >> star(sym(",") >> key_value));
    g.def(value, simple_value | simple_table | chain_value | string);

    g.def(
        single_string_inner,
        expr("\\'") | expr("\\\\") | not_(expr('\'')) >> any_,
    );
    g.def(single_string, expr('\'') >> star(single_string_inner) >> expr('\''));
    g.def(interp, expr("#{") >> exp >> sym("}"));
    g.def(
        double_string_plain,
        expr("\\\"") | expr("\\\\") | not_(expr('"')) >> any_,
    );
    g.def(double_string_inner, plus(not_(interp) >> double_string_plain));
    g.def(double_string_content, double_string_inner | interp);
    g.def(
        double_string,
        expr('"') >> separator >> star(double_string_content) >> expr('"'),
    );
    g.def(string, space >> (double_string | single_string | lua_string));

    g.def(lua_string_open_plain, expr('[') >> star(expr('=')) >> expr('['));
    g.def(lua_string_close_plain, expr(']') >> star(expr('=')) >> expr(']'));
    g.def(lua_string_open, user(lua_string_open_plain, lua_string_open_pred));
    g.def(
        lua_string_close,
        user(lua_string_close_plain, lua_string_close_pred),
    );
    g.def(lua_string_content, star(not_(lua_string_close) >> any_));
    g.def(
        lua_string,
        lua_string_open >> -break_ >> lua_string_content >> lua_string_close,
    );

    g.def(parens, sym("(") >> star(space_break) >> exp >> star(space_break) >> sym(")"));
    g.def(callable, space >> variable | self_item | var_arg | parens);
    g.def(
        fn_args_exp_list,
        exp >> star((break_ | sym(",")) >> white >> exp),
    );
    g.def(
        fn_args,
        (expr('(') >> star(space_break) >> -fn_args_exp_list >> star(space_break) >> sym(")"))
            | (sym("!") >> not_(expr('='))),
    );

    g.def(existential_op, expr('?'));
    g.def(
        chain_call,
        (callable | string) >> -existential_op >> chain_items,
    );
    g.def(chain_item_prefix, and_(set(".\\")) >> chain_items);
    g.def(
        chain_dot_chain,
        dot_chain_item >> -existential_op >> -chain_items,
    );
    g.def(
        chain,
        chain_call | chain_item_prefix | space >> (chain_dot_chain | colon_chain),
    );
    g.def(assignable_chain, separator >> chain);
    g.def(chain_with_colon, plus(chain_item) >> -colon_chain);
    g.def(chain_items, chain_with_colon | colon_chain);

    g.def(index, expr('[') >> exp >> sym("]"));
    g.def(
        chain_item,
        invoke >> -existential_op
            | dot_chain_item >> -existential_op
            | slice
            | index >> -existential_op,
    );
    g.def(dot_chain_item, expr('.') >> name);
    g.def(colon_chain_item, expr('\\') >> (lua_keyword | name));
    g.def(invoke_chain, invoke >> -existential_op >> -chain_items);
    g.def(colon_chain, colon_chain_item >> -existential_op >> -invoke_chain);

    g.def(default_value, true_());
    g.def(
        slice,
        expr('[')
            >> (exp | default_value)
            >> sym(",")
            >> (exp | default_value)
            >> (sym(",") >> exp | default_value)
            >> sym("]"),
    );
    g.def(
        invoke,
        separator
            >> (fn_args | single_string | double_string | and_(expr('[')) >> lua_string),
    );

    g.def(table_value, key_value | exp);
    g.def(
        table_lit_lines,
        space_break
            >> table_lit_line
            >> star(-sym(",") >> space_break >> table_lit_line)
            >> -sym(","),
    );
    g.def(
        table_lit,
        sym("{") >> separator >> -table_value_list >> -sym(",") >> -table_lit_lines >> white
            >> sym("}"),
    );
    g.def(table_value_list, table_value >> star(sym(",") >> table_value));
    g.def(
        table_lit_line,
        (push_indent_la >> (table_value_list >> pop_indent | pop_indent)) | space,
    );
    g.def(
        table_block_inner,
        separator >> key_value_line >> star(plus(space_break) >> key_value_line),
    );
    g.def(
        table_block,
        plus(space_break) >> advance_la >> ensure(table_block_inner, pop_indent),
    );

    g.def(class_member_list, separator >> key_value >> star(sym(",") >> key_value));
    g.def(
        class_line,
        check_indent_la >> (class_member_list | statement) >> -sym(","),
    );
    g.def(
        class_block,
        plus(space_break)
            >> advance_la
            >> separator
            >> class_line
            >> star(plus(space_break) >> class_line)
            >> pop_indent,
    );
    g.def(
        class_decl,
        key("class")
            >> not_(expr(':'))
            >> -assignable
            >> -(key("extends") >> prevent_indent >> ensure(exp, pop_indent))
            >> -class_block,
    );

    g.def(export_op, expr('*') | expr('^'));
    g.def(export_values, name_list >> -(sym("=") >> exp_list_low));
    g.def(
        export_,
        user(key("export"), export_pred) >> (class_decl | space >> export_op | export_values),
    );

    g.def(variable_pair, sym(":") >> variable);
    g.def(
        normal_pair,
        (key_name | sym("[") >> exp >> sym("]") | space >> double_string | space >> single_string)
            >> expr(':')
            >> (exp | table_block | plus(space_break) >> exp),
    );
    g.def(key_value, variable_pair | normal_pair);
    g.def(key_value_list, key_value >> star(sym(",") >> key_value));
    g.def(key_value_line, check_indent_la >> key_value_list >> -sym(","));

    g.def(
        fn_arg_def,
        (space >> variable | self_item) >> -(sym("=") >> exp),
    );
    g.def(
        fn_arg_def_list,
        separator
            >> ((fn_arg_def
                >> star((sym(",") | break_) >> white >> fn_arg_def)
                >> -((sym(",") | break_) >> white >> var_arg))
                | var_arg),
    );
    g.def(outer_var_shadow, key("using") >> (name_list | space >> "nil"));
    g.def(
        fn_args_def,
        sym("(") >> white >> -fn_arg_def_list >> -outer_var_shadow >> white >> sym(")"),
    );
    g.def(fn_arrow, expr("->") | expr("=>"));
    g.def(fun_lit, -fn_args_def >> space >> fn_arrow >> -body);

    g.def(
        name_list,
        separator >> space >> variable >> star(sym(",") >> white >> variable),
    );
    g.def(name_or_destructure, space >> variable | table_lit);
    g.def(
        assignable_name_list,
        separator >> name_or_destructure >> star(sym(",") >> white >> name_or_destructure),
    );

    g.def(fn_arrow_back, expr('<') >> set("-="));
    g.def(
        backcall,
        -fn_args_def >> space >> fn_arrow_back >> space >> chain_value,
    );

    g.def(
        exp_list,
        separator >> exp >> star(sym(",") >> white >> exp),
    );
    g.def(
        exp_list_low,
        separator >> exp >> star((sym(",") | sym(";")) >> white >> exp),
    );

    g.def(arg_line, check_indent_la >> exp >> star(sym(",") >> exp));
    g.def(
        arg_block,
        arg_line >> star(sym(",") >> space_break >> arg_line) >> pop_indent,
    );
    g.def(
        invoke_args_with_table,
        sym(",") >> (table_block | space_break >> advance_la >> arg_block >> -table_block),
    );
    g.def(
        invoke_args,
        not_(expr('-'))
            >> separator
            >> (exp >> star(sym(",") >> exp) >> -(invoke_args_with_table | table_block)
                | table_block),
    );

    g.def(
        const_value,
        (expr("nil") | expr("true") | expr("false")) >> not_(alpha_num),
    );
    g.def(minus_exp, expr('-') >> not_(set(" \t")) >> exp);
    g.def(sharp_exp, expr('#') >> exp);
    g.def(tilde_exp, expr('~') >> exp);
    g.def(not_exp, expr("not") >> not_(alpha_num) >> exp);
    g.def(unary_exp, minus_exp | sharp_exp | tilde_exp | not_exp);

    g.def(
        simple_value,
        (space >> const_value)
            | if_
            | unless_
            | switch_
            | with_
            | class_decl
            | for_each
            | for_
            | while_
            | do_
            | (space >> unary_exp)
            | tbl_comprehension
            | table_lit
            | comprehension
            | fun_lit
            | (space >> num),
    );

    g.def(exp_list_assign, exp_list >> -(update | assign));
    g.def(
        if_else_line,
        key("if") >> exp >> -assign >> (key("else") >> exp | default_value),
    );
    g.def(unless_line, key("unless") >> exp);
    g.def(
        statement_appendix,
        (if_else_line | unless_line | comp_inner) >> space,
    );
    g.def(
        statement,
        (import_
            | while_
            | for_
            | for_each
            | return_
            | local_
            | export_
            | space >> break_loop
            | backcall
            | exp_list_assign)
            >> space
            >> -statement_appendix,
    );

    g.def(body, space >> break_ >> star(empty_line) >> in_block | statement);
    g.def(empty_line_stop, space >> and_(stop));
    g.def(line, check_indent_la >> statement | empty_line_stop);
    g.def(block, separator >> line >> star(plus(break_) >> line));
    g.def(shebang, expr("#!") >> star(not_(stop) >> any_));
    g.def(file, white >> -shebang >> block >> eof());

    // Semantic actions, bottom-up.
    g.act(num, actions::num);
    g.act(name, actions::name);
    g.act(separator, actions::separator);
    g.act(variable, actions::variable);
    g.act(lua_keyword, actions::lua_keyword);
    g.act(self_, actions::self_plain);
    g.act(self_name, actions::self_field);
    g.act(self_class, actions::self_class);
    g.act(self_class_name, actions::self_class_field);
    g.act(key_name, actions::key_name);
    g.act(var_arg, actions::var_arg);
    g.act(name_list, actions::name_list);
    g.act(local_flag, actions::local_flag);
    g.act(local_, actions::local);
    g.act(colon_import_name, actions::colon_import_name);
    g.act(import_literal_inner, actions::import_literal_inner);
    g.act(import_literal, actions::import_literal);
    g.act(import_from, actions::import_from);
    g.act(import_as, actions::import_as);
    g.act(import_, actions::import);
    g.act(break_loop, actions::break_loop);
    g.act(return_, actions::return_);
    g.act(with_, actions::with);
    g.act(switch_case, actions::switch_case);
    g.act(switch_, actions::switch);
    g.act(if_cond, actions::if_cond);
    g.act(if_, actions::if_);
    g.act(unless_, actions::unless);
    g.act(while_, actions::while_);
    g.act(for_step_value, actions::for_step_value);
    g.act(for_, actions::for_);
    g.act(for_each, actions::for_each);
    g.act(do_, actions::do_);
    g.act(comprehension, actions::comprehension);
    g.act(comp_value, actions::comp_value);
    g.act(tbl_comprehension, actions::tbl_comprehension);
    g.act(star_exp, actions::star_exp);
    g.act(comp_for_each, actions::comp_for_each);
    g.act(comp_for, actions::comp_for);
    g.act(comp_inner, actions::comp_inner);
    g.act(assign, actions::assign);
    g.act(update_op, actions::update_op);
    g.act(update, actions::update);
    g.act(binary_operator, actions::binary_operator);
    g.act(backcall_operator, actions::backcall_operator);
    g.act(assignable, actions::assignable);
    g.act(assignable_chain, actions::assignable_chain);
    g.act(exp_op_value, actions::exp_op_value);
    g.act(exp, actions::exp);
    g.act(callable, actions::callable);
    g.act(chain_value, actions::chain_value);
    g.act(simple_table, actions::simple_table);
    g.act(simple_value, actions::simple_value);
    g.act(value, actions::value);
    g.act(lua_string_open, actions::lua_string_open);
    g.act(lua_string_content, actions::lua_string_content);
    g.act(lua_string_close, actions::lua_string_close);
    g.act(lua_string, actions::lua_string);
    g.act(single_string, actions::single_string);
    g.act(double_string_inner, actions::double_string_inner);
    g.act(double_string_content, actions::double_string_content);
    g.act(double_string, actions::double_string);
    g.act(string, actions::string);
    g.act(parens, actions::parens);
    g.act(dot_chain_item, actions::dot_chain_item);
    g.act(colon_chain_item, actions::colon_chain_item);
    g.act(default_value, actions::default_value);
    g.act(slice, actions::slice);
    g.act(invoke, actions::invoke);
    g.act(existential_op, actions::existential_op);
    g.act(table_lit, actions::table_lit);
    g.act(table_block, actions::table_block);
    g.act(class_member_list, actions::class_member_list);
    g.act(class_block, actions::class_block);
    g.act(class_decl, actions::class_decl);
    g.act(export_op, actions::export_op);
    g.act(export_values, actions::export_values);
    g.act(export_, actions::export);
    g.act(variable_pair, actions::variable_pair);
    g.act(normal_pair, actions::normal_pair);
    g.act(fn_arg_def, actions::fn_arg_def);
    g.act(fn_arg_def_list, actions::fn_arg_def_list);
    g.act(outer_var_shadow, actions::outer_var_shadow);
    g.act(fn_args_def, actions::fn_args_def);
    g.act(fn_arrow, actions::fn_arrow);
    g.act(fun_lit, actions::fun_lit);
    g.act(name_or_destructure, actions::name_or_destructure);
    g.act(assignable_name_list, actions::assignable_name_list);
    g.act(fn_arrow_back, actions::fn_arrow_back);
    g.act(backcall, actions::backcall);
    g.act(exp_list, actions::exp_list);
    g.act(exp_list_low, actions::exp_list_low);
    g.act(invoke_args, actions::invoke_args);
    g.act(const_value, actions::const_value);
    g.act(unary_exp, actions::unary_exp);
    g.act(exp_list_assign, actions::exp_list_assign);
    g.act(if_else_line, actions::if_line);
    g.act(unless_line, actions::unless_line);
    g.act(statement_appendix, actions::statement_appendix);
    g.act(statement, actions::statement);
    g.act(body, actions::body);
    g.act(block, actions::block);
    g.act(file, actions::file);

    MoonParser { grammar: g, file }
}
