/// User state threaded through a parse. The indentation predicates and
/// keyword-exclusion handlers in the grammar read and mutate this while
/// the combinator engine itself stays context-free.
pub struct State {
    /// Top element is the currently required indent width. -1 suspends
    /// indent equality checks (inside `extends` expressions).
    pub indents: Vec<i32>,
    /// A `false` on top disables the standalone `do` keyword, to avoid
    /// ambiguity after `with`, `while`, `for` and `switch` heads.
    pub do_stack: Vec<bool>,
    /// Length of the currently open long-bracket string opener, used to
    /// match the closing bracket of equal `=`-count.
    pub string_open: usize,
    /// Scratch buffer for the keyword-exclusion predicates.
    pub buffer: String,
    pub module_name: String,
    pub module_fix: usize,
    pub export_count: usize,
    pub export_default: bool,
}

impl State {
    pub fn new() -> State {
        State {
            indents: vec![0],
            do_stack: Vec::new(),
            string_open: 0,
            buffer: String::new(),
            module_name: String::from("_module_0"),
            module_fix: 0,
            export_count: 0,
            export_default: false,
        }
    }
}

impl Default for State {
    fn default() -> State {
        State::new()
    }
}
