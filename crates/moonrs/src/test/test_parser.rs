// Combinator engine and MoonScript grammar parsing tests
use crate::grammar::MoonParser;
use crate::parser::{
    Grammar, ParseContext, ParseErrorKind, State, eof, expr, nl, plus, range, user,
};

fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

#[test]
fn test_ordered_choice_backtracks() {
    let mut g = Grammar::new();
    let r = g.rule();
    let start = g.rule();
    g.def(r, expr("ab") | expr("a"));
    g.def(start, r >> eof());
    let input = chars("a");
    let result = ParseContext::new(&g, &input, State::new()).run(start);
    assert!(result.is_ok());
}

#[test]
fn test_furthest_error_position() {
    let mut g = Grammar::new();
    let start = g.rule();
    g.def(start, expr('a') >> expr('b') >> eof());
    let input = chars("ax");
    let err = ParseContext::new(&g, &input, State::new())
        .run(start)
        .err()
        .expect("parse failure")
        .0;
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.pos.col, 2);
}

#[test]
fn test_newline_tracking() {
    let mut g = Grammar::new();
    let start = g.rule();
    g.def(start, expr('a') >> nl(expr('\n')) >> expr('b') >> eof());
    let input = chars("a\nb");
    let err_input = chars("a\nc");
    assert!(
        ParseContext::new(&g, &input, State::new())
            .run(start)
            .is_ok()
    );
    let err = ParseContext::new(&g, &err_input, State::new())
        .run(start)
        .err()
        .expect("parse failure")
        .0;
    assert_eq!(err.pos.line, 2);
    assert_eq!(err.pos.col, 1);
}

#[test]
fn test_left_recursion_grows_seed() {
    // expr <- expr '+' num / num
    let mut g = Grammar::new();
    let num = g.rule();
    let sum = g.rule();
    let start = g.rule();
    g.def(num, plus(range('0', '9')));
    g.def(sum, sum >> '+' >> num | num);
    g.def(start, sum >> eof());
    for source in ["1", "1+2", "1+2+3", "10+20+30+40"] {
        let input = chars(source);
        assert!(
            ParseContext::new(&g, &input, State::new()).run(start).is_ok(),
            "failed to parse {:?}",
            source
        );
    }
    let input = chars("1+");
    assert!(
        ParseContext::new(&g, &input, State::new())
            .run(start)
            .is_err()
    );
}

#[test]
fn test_user_predicate_can_veto() {
    fn veto(state: &mut State, slice: &[char]) -> bool {
        state.buffer.clear();
        state.buffer.extend(slice.iter());
        state.buffer != "nope"
    }
    let mut g = Grammar::new();
    let word = g.rule();
    let start = g.rule();
    g.def(word, user(plus(range('a', 'z')), veto));
    g.def(start, word >> eof());
    let ok = chars("yes");
    let bad = chars("nope");
    assert!(ParseContext::new(&g, &ok, State::new()).run(start).is_ok());
    assert!(ParseContext::new(&g, &bad, State::new()).run(start).is_err());
}

#[test]
fn test_parse_empty_input() {
    let parser = MoonParser::new();
    let info = parser.parse("").expect("empty input parses");
    assert!(info.root.block.statements.is_empty());
}

#[test]
fn test_parse_comments_and_blank_lines() {
    let parser = MoonParser::new();
    let info = parser
        .parse("-- a comment\n\n--[[ multi\nline ]]\n")
        .expect("comment-only input parses");
    assert!(info.root.block.statements.is_empty());
}

#[test]
fn test_parse_simple_statements() {
    let parser = MoonParser::new();
    let info = parser.parse("x = 1\nprint x").expect("parses");
    assert_eq!(info.root.block.statements.len(), 2);
}

#[test]
fn test_parse_rejects_keyword_variable() {
    let parser = MoonParser::new();
    assert!(parser.parse("unless = 1").is_err());
    assert!(parser.parse("x = when").is_err());
}

#[test]
fn test_parse_indented_block() {
    let parser = MoonParser::new();
    assert!(parser.parse("if x\n  print 1\n  print 2").is_ok());
    assert!(parser.parse("if x\n\tprint 1").is_ok());
}

#[test]
fn test_tab_counts_as_four_columns() {
    let parser = MoonParser::new();
    // The first body line fixes the indent at one tab (width 4); a
    // four-space line continues the same block.
    assert!(parser.parse("if x\n\tprint 1\n    print 2").is_ok());
    // Two spaces do not match the established width.
    assert!(parser.parse("if x\n\tprint 1\n  print 2").is_err());
}

#[test]
fn test_node_ranges_are_ordered() {
    let parser = MoonParser::new();
    let info = parser.parse("x = 1 + 2\nprint x").expect("parses");
    for stmt in &info.root.block.statements {
        let range = stmt.range;
        assert!(
            range.begin.offset <= range.end.offset,
            "statement range inverted"
        );
        let root = info.root.range;
        assert!(root.begin.offset <= range.begin.offset);
        assert!(range.end.offset <= root.end.offset);
    }
}

#[test]
fn test_parse_error_reports_position() {
    let parser = MoonParser::new();
    let err = parser.parse("x = = 2").err().expect("syntax error");
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.pos.line, 1);
}

#[test]
fn test_module_name_bookkeeping() {
    let parser = MoonParser::new();
    let info = parser.parse("_module_0 = 1").expect("parses");
    assert_eq!(info.module_name, "_module_1");
}

#[test]
fn test_export_count_bookkeeping() {
    let parser = MoonParser::new();
    let info = parser.parse("export a = 1").expect("parses");
    assert_eq!(info.export_count, 1);
}
