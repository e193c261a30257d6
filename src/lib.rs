pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lox;
pub mod parser;
pub mod printer;
pub mod scanner;
pub mod shared_list;
pub mod token;

pub use crate::lox::Lox;
