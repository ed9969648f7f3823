// Generic PEG machinery: the pattern DSL, the parse runtime with
// left-recursion handling, positions and parse errors. The MoonScript
// grammar itself lives in the `grammar` module.

mod context;
mod error;
mod pattern;
mod pos;
mod state;

pub use context::{MatchRec, ParseContext};
pub use error::{ParseError, ParseErrorKind};
pub use pattern::{
    Action, Grammar, Pattern, Rule, UserHandler, and_, any, eof, expr, false_, nl, not_, plus,
    range, set, star, true_, user,
};
pub use pos::{InputRange, Pos};
pub use state::State;
