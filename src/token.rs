use strum_macros::Display;

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Display)]
pub enum TokenType<'a> {
    // Single-character tokens.
    LeftParen, RightParen, LeftBrace, RightBrace,
    Comma, Dot, Minus, Plus, Semicolon, Slash, Star,

    // One or two character tokens.
    Bang, BangEqual,
    Equal, EqualEqual,
    Greater, GreaterEqual,
    Less, LessEqual,

    // Literals.
    Identifier(&'a str), String(&'a str), Number(f64),

    // Keywords.
    And, Class, Else, False, Fun, For, If, Nil, Or,
    Print, Return, Super, This, True, Var, While,

    EOF
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub tokentype: TokenType<'a>,
    pub lexeme: &'a str,
    pub line: i32,
}

impl<'a> Token<'a> {
    pub fn is_eof(&self) -> bool {
        matches!(self.tokentype, TokenType::EOF)
    }
}
