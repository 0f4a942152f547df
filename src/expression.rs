pub(crate) mod ast;
pub(crate) mod engine;
pub(crate) mod error;
pub(crate) mod interp;
pub(crate) mod lexer;
pub(crate) mod parser;
