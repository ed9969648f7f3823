use std::fmt;

/// Compilation failure. Parse and logic errors carry a pre-formatted
/// message of the shape `LINE: MESSAGE\nSOURCE-LINE\n    ^` along with
/// the position that produced it.
#[derive(Debug, Clone)]
pub enum CompileError {
    /// The input was not valid UTF-8.
    InvalidEncoding,
    /// The parser could not consume the input up to the position.
    Parse {
        message: String,
        line: usize,
        col: usize,
    },
    /// A structural error raised during lowering.
    Logic {
        message: String,
        line: usize,
        col: usize,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::InvalidEncoding => write!(f, "Invalid text encoding."),
            CompileError::Parse { message, .. } => write!(f, "{}", message),
            CompileError::Logic { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CompileError {}

/// Reconstructs the offending source line and points a caret at the
/// column. Tabs are shown as single spaces; the column counts code
/// points.
pub(crate) fn format_at(
    input: &[char],
    msg: &str,
    line: usize,
    col: usize,
    line_offset: usize,
) -> String {
    let mut begin = 0usize;
    let mut end = input.len();
    let mut count = 0usize;
    for (i, c) in input.iter().enumerate() {
        if *c == '\n' {
            if count + 1 == line {
                end = i;
                break;
            }
            begin = i + 1;
            count += 1;
        }
    }
    let text: String = input[begin..end]
        .iter()
        .map(|c| match c {
            '\t' => ' ',
            '\r' => ' ',
            other => *other,
        })
        .collect();
    format!(
        "{}: {}\n{}\n{}^",
        line + line_offset,
        msg,
        text,
        " ".repeat(col.saturating_sub(1))
    )
}
