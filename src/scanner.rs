use crate::error::ScanError;
use crate::token::{Token, TokenType};
use phf::phf_map;
use std::iter::Peekable;
use std::str::CharIndices;

// Note: current becomes self.iter.peek()?.0
struct Scanner<'a> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
    start: usize,
    line: i32,
}

pub fn scan_tokens(source: &str) -> (Vec<Token>, Vec<ScanError>) {
    let mut scanner = Scanner {
        source,
        iter: source.char_indices().peekable(),
        start: 0,
        line: 1,
    };
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<ScanError> = Vec::new();

    while let Some((idx, _)) = scanner.iter.peek() {
        scanner.start = *idx;
        match scanner.scan_token() {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => (),
            Err(e) => errors.push(e),
        }
    }
    tokens.push(Token {
        tokentype: TokenType::EOF,
        lexeme: "",
        line: scanner.line,
    });
    tracing::debug!(
        tokens = tokens.len(),
        errors = errors.len(),
        "scanned source"
    );
    (tokens, errors)
}

impl<'a> Scanner<'a> {
    fn scan_token(&mut self) -> Result<Option<Token<'a>>, ScanError> {
        let c = match self.iter.next() {
            Some((_, c)) => c,
            None => return Ok(None),
        };
        match c {
            '(' => Ok(Some(self.token(TokenType::LeftParen))),
            ')' => Ok(Some(self.token(TokenType::RightParen))),
            '{' => Ok(Some(self.token(TokenType::LeftBrace))),
            '}' => Ok(Some(self.token(TokenType::RightBrace))),
            ',' => Ok(Some(self.token(TokenType::Comma))),
            '.' => Ok(Some(self.token(TokenType::Dot))),
            '-' => Ok(Some(self.token(TokenType::Minus))),
            '+' => Ok(Some(self.token(TokenType::Plus))),
            ';' => Ok(Some(self.token(TokenType::Semicolon))),
            '*' => Ok(Some(self.token(TokenType::Star))),
            '!' => {
                if self.next_if('=') {
                    Ok(Some(self.token(TokenType::BangEqual)))
                } else {
                    Ok(Some(self.token(TokenType::Bang)))
                }
            }
            '=' => {
                if self.next_if('=') {
                    Ok(Some(self.token(TokenType::EqualEqual)))
                } else {
                    Ok(Some(self.token(TokenType::Equal)))
                }
            }
            '<' => {
                if self.next_if('=') {
                    Ok(Some(self.token(TokenType::LessEqual)))
                } else {
                    Ok(Some(self.token(TokenType::Less)))
                }
            }
            '>' => {
                if self.next_if('=') {
                    Ok(Some(self.token(TokenType::GreaterEqual)))
                } else {
                    Ok(Some(self.token(TokenType::Greater)))
                }
            }
            '/' => {
                if self.next_if('/') {
                    while let Some((_, c)) = self.iter.peek() {
                        match c {
                            '\n' => {
                                break;
                            }
                            _ => {
                                self.iter.next();
                            }
                        }
                    }
                    Ok(None)
                } else if self.next_if('*') {
                    self.block_comment();
                    Ok(None)
                } else {
                    Ok(Some(self.token(TokenType::Slash)))
                }
            }
            ' ' | '\r' | '\t' => Ok(None),
            '\n' => {
                self.line += 1;
                Ok(None)
            }
            '"' => self.string(),
            '0'..='9' => Ok(Some(self.number()?)),
            'a'..='z' | 'A'..='Z' | '_' => Ok(Some(self.identifier())),
            _ => Err(ScanError {
                line: self.line,
                message: "Unexpected character.".to_string(),
            }),
        }
    }
    fn current(&mut self) -> usize {
        match self.iter.peek() {
            None => self.source.len(),
            Some((idx, _)) => *idx,
        }
    }
    fn token(&mut self, token_type: TokenType<'a>) -> Token<'a> {
        let current = self.current();
        Token {
            tokentype: token_type,
            lexeme: &self.source[self.start..current],
            line: self.line,
        }
    }
    fn next_if(&mut self, expected: char) -> bool {
        self.iter.next_if(|&(_, c)| c == expected).is_some()
    }
    fn peek_next(&self) -> Option<char> {
        let mut lookahead = self.iter.clone();
        lookahead.next();
        lookahead.peek().map(|&(_, c)| c)
    }
    fn block_comment(&mut self) {
        while let Some((_, c)) = self.iter.next() {
            match c {
                '\n' => self.line += 1,
                '*' if self.next_if('/') => return,
                _ => (),
            }
        }
        tracing::debug!(line = self.line, "unterminated block comment at end of input");
    }
    fn string(&mut self) -> Result<Option<Token<'a>>, ScanError> {
        let opening_line = self.line;
        while let Some((_, c)) = self.iter.peek() {
            match c {
                '"' => {
                    break;
                }
                '\n' => {
                    self.line += 1;
                    self.iter.next();
                }
                _ => {
                    self.iter.next();
                }
            }
        }
        if self.iter.next().is_none() {
            return Err(ScanError {
                line: opening_line,
                message: "Unterminated string.".to_string(),
            });
        }
        let current = self.current();
        let literal = &self.source[self.start + 1..current - 1];
        Ok(Some(self.token(TokenType::String(literal))))
    }
    fn number(&mut self) -> Result<Token<'a>, ScanError> {
        self.digits();
        if let Some((_, '.')) = self.iter.peek() {
            if let Some('0'..='9') = self.peek_next() {
                self.iter.next();
                self.digits();
            }
        }

        let current = self.current();
        let value: f64 = self.source[self.start..current]
            .parse()
            .map_err(|e| ScanError {
                line: self.line,
                message: format!("Invalid number literal: {}.", e),
            })?;
        Ok(self.token(TokenType::Number(value)))
    }
    fn digits(&mut self) {
        while self.iter.next_if(|&(_, c)| c.is_ascii_digit()).is_some() {}
    }
    fn identifier(&mut self) -> Token<'a> {
        while self
            .iter
            .next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '_')
            .is_some()
        {}
        let current = self.current();
        let text = &self.source[self.start..current];
        match KEYWORDS.get(text) {
            None => self.token(TokenType::Identifier(text)),
            Some(x) => self.token(x.clone()),
        }
    }
}

static KEYWORDS: phf::Map<&'static str, TokenType<'static>> = phf_map! {
    "and" => TokenType::And,
    "class" => TokenType::Class,
    "else" => TokenType::Else,
    "false" => TokenType::False,
    "for" => TokenType::For,
    "fun" => TokenType::Fun,
    "if" => TokenType::If,
    "nil" => TokenType::Nil,
    "or" => TokenType::Or,
    "print" => TokenType::Print,
    "return" => TokenType::Return,
    "super" => TokenType::Super,
    "this" => TokenType::This,
    "true" => TokenType::True,
    "var" => TokenType::Var,
    "while" => TokenType::While,
};
