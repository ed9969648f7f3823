use crate::parser::error::{ParseError, ParseErrorKind};
use crate::parser::pattern::{Grammar, Pattern, Rule};
use crate::parser::pos::Pos;
use crate::parser::state::State;

/// Outcome of matching a pattern. `Grown(rule)` is the non-local signal
/// raised when a left-recursive rule finishes growing its match; it
/// propagates up the call chain until the frame that initiated the
/// recursion consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchResult {
    Matched,
    Failed,
    Grown(Rule),
}

use MatchResult::{Failed, Grown, Matched};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Parse,
    Reject,
    Accept,
}

#[derive(Debug, Clone, Copy)]
struct RuleState {
    /// Input offset this rule last started at; entering again at the
    /// same offset means left recursion.
    pos: usize,
    mode: Mode,
}

const UNSET: usize = usize::MAX;

/// A deferred semantic-action record: the rule that matched and the
/// range it covered.
#[derive(Debug, Clone, Copy)]
pub struct MatchRec {
    pub rule: Rule,
    pub begin: Pos,
    pub end: Pos,
}

struct Checkpoint {
    pos: Pos,
    matches: usize,
}

/// The parser runtime: drives a [`Grammar`] against decoded input,
/// tracking position, the furthest failure, per-rule left-recursion
/// states and the deferred-action queue.
pub struct ParseContext<'a> {
    grammar: &'a Grammar,
    input: &'a [char],
    pos: Pos,
    error_pos: Pos,
    rule_states: Vec<RuleState>,
    matches: Vec<MatchRec>,
    pub state: State,
}

impl<'a> ParseContext<'a> {
    pub fn new(grammar: &'a Grammar, input: &'a [char], state: State) -> ParseContext<'a> {
        ParseContext {
            grammar,
            input,
            pos: Pos::start(),
            error_pos: Pos::start(),
            rule_states: vec![
                RuleState {
                    pos: UNSET,
                    mode: Mode::Parse,
                };
                grammar.len()
            ],
            matches: Vec::new(),
            state,
        }
    }

    /// Runs the start rule. On success the queued `(rule, begin, end)`
    /// records are returned in source order for the caller to fire.
    pub fn run(mut self, start: Rule) -> Result<(Vec<MatchRec>, State), (ParseError, State)> {
        match self.parse_rule(start) {
            Matched => {}
            Failed | Grown(_) => {
                let err = ParseError {
                    kind: ParseErrorKind::Syntax,
                    pos: self.error_pos,
                };
                return Err((err, self.state));
            }
        }
        if !self.at_end() {
            let kind = if self.error_pos.offset < self.input.len() {
                ParseErrorKind::Syntax
            } else {
                ParseErrorKind::InvalidEof
            };
            return Err((
                ParseError {
                    kind,
                    pos: self.error_pos,
                },
                self.state,
            ));
        }
        Ok((self.matches, self.state))
    }

    fn at_end(&self) -> bool {
        self.pos.offset >= self.input.len()
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos.offset).copied()
    }

    fn next_col(&mut self) {
        self.pos.offset += 1;
        self.pos.col += 1;
    }

    fn next_line(&mut self) {
        self.pos.line += 1;
        self.pos.col = 1;
    }

    fn set_error_pos(&mut self) {
        if self.pos.offset > self.error_pos.offset {
            self.error_pos = self.pos;
        }
    }

    fn save(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            matches: self.matches.len(),
        }
    }

    fn restore(&mut self, cp: &Checkpoint) {
        self.pos = cp.pos;
        self.matches.truncate(cp.matches);
    }

    fn parse(&mut self, pattern: &Pattern) -> MatchResult {
        match pattern {
            Pattern::Char(c) => {
                if self.current() == Some(*c) {
                    self.next_col();
                    return Matched;
                }
                self.set_error_pos();
                Failed
            }
            Pattern::Str(s) => {
                for c in s.chars() {
                    if self.current() != Some(c) {
                        self.set_error_pos();
                        return Failed;
                    }
                    self.next_col();
                }
                Matched
            }
            Pattern::Set(chars) => match self.current() {
                Some(c) if chars.contains(c) => {
                    self.next_col();
                    Matched
                }
                _ => {
                    self.set_error_pos();
                    Failed
                }
            },
            Pattern::Range(min, max) => match self.current() {
                Some(c) if *min <= c && c <= *max => {
                    self.next_col();
                    Matched
                }
                _ => {
                    self.set_error_pos();
                    Failed
                }
            },
            Pattern::Any => {
                if self.at_end() {
                    self.set_error_pos();
                    return Failed;
                }
                self.next_col();
                Matched
            }
            Pattern::Eof => {
                if self.at_end() {
                    Matched
                } else {
                    Failed
                }
            }
            Pattern::True => Matched,
            Pattern::False => Failed,
            Pattern::Seq(left, right) => match self.parse(left) {
                Matched => self.parse(right),
                other => other,
            },
            Pattern::Choice(left, right) => {
                let cp = self.save();
                match self.parse(left) {
                    Failed => {
                        self.restore(&cp);
                        self.parse(right)
                    }
                    other => other,
                }
            }
            Pattern::Loop0(inner) => loop {
                let cp = self.save();
                match self.parse(inner) {
                    Matched => {}
                    Failed => {
                        self.restore(&cp);
                        return Matched;
                    }
                    grown => return grown,
                }
            },
            Pattern::Loop1(inner) => {
                match self.parse(inner) {
                    Matched => {}
                    other => return other,
                }
                loop {
                    let cp = self.save();
                    match self.parse(inner) {
                        Matched => {}
                        Failed => {
                            self.restore(&cp);
                            return Matched;
                        }
                        grown => return grown,
                    }
                }
            }
            Pattern::Opt(inner) => {
                let cp = self.save();
                match self.parse(inner) {
                    Matched => Matched,
                    Failed => {
                        self.restore(&cp);
                        Matched
                    }
                    grown => grown,
                }
            }
            Pattern::And(inner) => {
                let cp = self.save();
                let result = self.parse(inner);
                self.restore(&cp);
                match result {
                    Matched => Matched,
                    Failed => Failed,
                    grown => grown,
                }
            }
            Pattern::Not(inner) => {
                let cp = self.save();
                let result = self.parse(inner);
                self.restore(&cp);
                match result {
                    Matched => Failed,
                    Failed => Matched,
                    grown => grown,
                }
            }
            Pattern::Nl(inner) => match self.parse(inner) {
                Matched => {
                    self.next_line();
                    Matched
                }
                other => other,
            },
            Pattern::User(inner, handler) => {
                let begin = self.pos.offset;
                match self.parse(inner) {
                    Matched => {
                        let slice = &self.input[begin..self.pos.offset];
                        if handler(&mut self.state, slice) {
                            Matched
                        } else {
                            Failed
                        }
                    }
                    other => other,
                }
            }
            Pattern::Ref(rule) => self.parse_rule(*rule),
        }
    }

    /// Enters a rule, handling left recursion with the Reject/Accept
    /// seed-and-grow machine: a rule re-entered at its own start
    /// position is first rejected so a non-recursive alternative can
    /// produce a seed, then repeatedly accepted at the advanced
    /// position to grow the match.
    fn parse_rule(&mut self, rule: Rule) -> MatchResult {
        let old_state = self.rule_states[rule.0];
        let new_pos = self.pos.offset;
        let lr = new_pos == old_state.pos;
        self.rule_states[rule.0].pos = new_pos;

        let result = match old_state.mode {
            Mode::Parse => {
                if lr {
                    // Seed: reject the recursive re-entry so alternative
                    // branches are examined.
                    self.rule_states[rule.0].mode = Mode::Reject;
                    let seeded = self.parse_body(rule);
                    match seeded {
                        Matched => {
                            // Grow: repeatedly re-enter at the advanced
                            // position until no further progress.
                            self.rule_states[rule.0].mode = Mode::Accept;
                            loop {
                                let cp = self.save();
                                self.rule_states[rule.0].pos = self.pos.offset;
                                match self.parse_body(rule) {
                                    Matched => {}
                                    _ => {
                                        self.restore(&cp);
                                        break;
                                    }
                                }
                            }
                            self.rule_states[rule.0] = old_state;
                            return Grown(rule);
                        }
                        other => other,
                    }
                } else {
                    match self.parse_body(rule) {
                        Grown(r) if r == rule => Matched,
                        Grown(r) => {
                            // A mutually recursive rule resolved; keep
                            // propagating to its initiating frame.
                            self.rule_states[rule.0] = old_state;
                            return Grown(r);
                        }
                        other => other,
                    }
                }
            }
            Mode::Reject => {
                if lr {
                    Failed
                } else {
                    self.rule_states[rule.0].mode = Mode::Parse;
                    let result = self.parse_body(rule);
                    if let Grown(_) = result {
                        return result;
                    }
                    self.rule_states[rule.0].mode = Mode::Reject;
                    result
                }
            }
            Mode::Accept => {
                if lr {
                    Matched
                } else {
                    self.rule_states[rule.0].mode = Mode::Parse;
                    let result = self.parse_body(rule);
                    if let Grown(_) = result {
                        return result;
                    }
                    self.rule_states[rule.0].mode = Mode::Accept;
                    result
                }
            }
        };

        self.rule_states[rule.0] = old_state;
        result
    }

    fn parse_body(&mut self, rule: Rule) -> MatchResult {
        let grammar = self.grammar;
        let def = &grammar.rules[rule.0];
        if def.action.is_some() {
            let begin = self.pos;
            let result = self.parse(&def.pattern);
            if result == Matched {
                self.matches.push(MatchRec {
                    rule,
                    begin,
                    end: self.pos,
                });
            }
            result
        } else {
            self.parse(&def.pattern)
        }
    }
}
