// MoonScript to Lua compiler
// A source-to-source compiler: PEG parser with indentation-aware state,
// typed syntax tree, and a scope-tracking lowering pass emitting Lua.

#[cfg(test)]
mod test;

pub mod ast;
pub mod compiler;
pub mod config;
pub mod error;
pub mod grammar;
pub mod parser;

pub use compiler::{CompileOutput, Compiler, ExpUsage};
pub use config::{CompilerConfig, GlobalVar};
pub use error::CompileError;
pub use grammar::{MoonParser, ParseInfo};
pub use parser::{ParseError, ParseErrorKind};

pub const VERSION: &str = "0.5.0";

/// Compiles a MoonScript source string to Lua.
pub fn compile(source: &str, config: &CompilerConfig) -> Result<CompileOutput, CompileError> {
    let mut compiler = Compiler::new(config.clone());
    compiler.compile(source)
}

/// Compiles raw bytes, reporting invalid UTF-8 as a compile error.
pub fn compile_bytes(source: &[u8], config: &CompilerConfig) -> Result<CompileOutput, CompileError> {
    match std::str::from_utf8(source) {
        Ok(text) => compile(text, config),
        Err(_) => Err(CompileError::InvalidEncoding),
    }
}

/// Compiles and returns the `(lua_text, error_message, globals)` triple:
/// on failure the Lua text is empty and the message carries the
/// formatted diagnostic, on success the message is empty.
pub fn to_lua(source: &str, config: &CompilerConfig) -> (String, String, Vec<GlobalVar>) {
    match compile(source, config) {
        Ok(output) => (output.code, String::new(), output.globals),
        Err(err) => (String::new(), err.to_string(), Vec::new()),
    }
}
