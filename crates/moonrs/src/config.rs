use smol_str::SmolStr;

/// Compilation options.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Record references to identifiers not defined in any scope.
    pub lint_global_variable: bool,
    /// Turn the trailing expression of the top-level block into a
    /// `return`.
    pub implicit_return_root: bool,
    /// Append a ` -- N` comment with the source line to every emitted
    /// logical line.
    pub reserve_line_number: bool,
    /// Indent with two spaces per level instead of a tab.
    pub use_space_over_tab: bool,
    /// Added to every recorded source line before emission.
    pub line_offset: usize,
}

impl Default for CompilerConfig {
    fn default() -> CompilerConfig {
        CompilerConfig {
            lint_global_variable: false,
            implicit_return_root: true,
            reserve_line_number: true,
            use_space_over_tab: false,
            line_offset: 0,
        }
    }
}

/// A reference to an undefined identifier, reported when
/// `lint_global_variable` is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalVar {
    pub name: SmolStr,
    pub line: usize,
    pub col: usize,
}
