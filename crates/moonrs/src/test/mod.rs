// Test module organization
pub mod test_chain;
pub mod test_class;
pub mod test_compile;
pub mod test_errors;
pub mod test_loops;
pub mod test_parser;
pub mod test_scope;
