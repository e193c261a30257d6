use crate::token::Token;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error: {message}")]
pub struct ScanError {
    pub line: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
// One space only, on purpose: "Error: msg" and "Error at 'x': msg".
#[error("[line {line}] Error{location}: {message}")]
pub struct ParseError {
    pub line: i32,
    pub location: String,
    pub message: String,
}

impl ParseError {
    pub fn new(token: &Token, message: &str) -> ParseError {
        let location = if token.is_eof() {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };
        ParseError {
            line: token.line,
            location,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}\n[line {line}]")]
pub struct RuntimeError {
    pub line: i32,
    pub lexeme: String,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: &Token, message: &str) -> RuntimeError {
        RuntimeError {
            line: token.line,
            lexeme: token.lexeme.to_string(),
            message: message.to_string(),
        }
    }
}
