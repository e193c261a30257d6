use crate::ast::{Expression, Statement, Value};
use crate::error::ParseError;
use crate::token::{Token, TokenType};
use std::mem;

struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,
    errors: Vec<ParseError>,
}

// Stands in for EOF when the slice runs out without one.
static END: Token<'static> = Token {
    tokentype: TokenType::EOF,
    lexeme: "",
    line: 0,
};

/// Statements that failed to parse are left out; their errors come back alongside.
pub fn parse<'a>(tokens: &'a [Token<'a>]) -> (Vec<Statement<'a>>, Vec<ParseError>) {
    let mut parser = Parser::new(tokens);
    let statements = parser.parse();
    tracing::debug!(
        statements = statements.len(),
        errors = parser.errors.len(),
        "parsed tokens"
    );
    (statements, parser.errors)
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Parser<'a> {
        Parser {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }
    fn parse(&mut self) -> Vec<Statement<'a>> {
        let mut statements: Vec<Statement<'a>> = Vec::new();
        while !self.is_at_end() {
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }
        statements
    }
    fn declaration(&mut self) -> Option<Statement<'a>> {
        let result = match self.peek().tokentype {
            TokenType::Var => {
                self.advance();
                self.var_declaration()
            }
            _ => self.statement(),
        };
        match result {
            Ok(statement) => Some(statement),
            Err(e) => {
                tracing::trace!(
                    line = e.line,
                    at = %self.peek().tokentype,
                    "synchronizing after parse error"
                );
                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }
    fn var_declaration(&mut self) -> Result<Statement<'a>, ParseError> {
        let name = match self.peek().tokentype {
            TokenType::Identifier(_) => self.advance(),
            _ => return Err(self.error("Expect variable name.")),
        };
        let initializer = match self.peek().tokentype {
            TokenType::Equal => {
                self.advance();
                Some(self.expression()?)
            }
            _ => None,
        };
        self.consume(
            &TokenType::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Statement::Var { name, initializer })
    }
    fn statement(&mut self) -> Result<Statement<'a>, ParseError> {
        match self.peek().tokentype {
            TokenType::If => {
                self.advance();
                self.if_statement()
            }
            TokenType::Print => {
                self.advance();
                self.print_statement()
            }
            TokenType::LeftBrace => {
                self.advance();
                Ok(Statement::Block(self.block()?))
            }
            TokenType::While => {
                self.advance();
                self.while_statement()
            }
            TokenType::For => {
                self.advance();
                self.for_statement()
            }
            _ => self.expression_statement(),
        }
    }
    fn for_statement(&mut self) -> Result<Statement<'a>, ParseError> {
        self.consume(&TokenType::LeftParen, "Expect '(' after 'for'.")?;
        let initializer: Option<Statement> = match self.peek().tokentype {
            TokenType::Semicolon => {
                self.advance();
                None
            }
            TokenType::Var => {
                self.advance();
                Some(self.var_declaration()?)
            }
            _ => Some(self.expression_statement()?),
        };

        let condition = match self.peek().tokentype {
            TokenType::Semicolon => Expression::Literal(Value::Boolean(true)),
            _ => self.expression()?,
        };
        self.consume(&TokenType::Semicolon, "Expect ';' after loop condition.")?;

        let increment: Option<Expression> = match self.peek().tokentype {
            TokenType::RightParen => None,
            _ => Some(self.expression()?),
        };
        self.consume(&TokenType::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(x) = increment {
            body = Statement::Block(vec![body, Statement::Expression(x)])
        }
        body = Statement::While {
            condition,
            body: Box::new(body),
        };
        match initializer {
            None => Ok(body),
            Some(x) => Ok(Statement::Block(vec![x, body])),
        }
    }
    fn while_statement(&mut self) -> Result<Statement<'a>, ParseError> {
        self.consume(&TokenType::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(&TokenType::RightParen, "Expect ')' after condition.")?;
        let body = self.statement()?;
        Ok(Statement::While {
            condition,
            body: Box::new(body),
        })
    }
    fn if_statement(&mut self) -> Result<Statement<'a>, ParseError> {
        self.consume(&TokenType::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(&TokenType::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);
        // A dangling else binds to the nearest if.
        let else_branch = match self.peek().tokentype {
            TokenType::Else => {
                self.advance();
                Some(Box::new(self.statement()?))
            }
            _ => None,
        };
        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
        })
    }
    fn block(&mut self) -> Result<Vec<Statement<'a>>, ParseError> {
        let mut statements: Vec<Statement<'a>> = Vec::new();
        while !self.is_at_end() {
            if let TokenType::RightBrace = self.peek().tokentype {
                break;
            }
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }
        self.consume(&TokenType::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }
    fn print_statement(&mut self) -> Result<Statement<'a>, ParseError> {
        let expr = self.expression()?;
        self.consume(&TokenType::Semicolon, "Expect ';' after value.")?;
        Ok(Statement::Print(expr))
    }
    fn expression_statement(&mut self) -> Result<Statement<'a>, ParseError> {
        let expr = self.expression()?;
        self.consume(&TokenType::Semicolon, "Expect ';' after expression.")?;
        Ok(Statement::Expression(expr))
    }
    fn expression(&mut self) -> Result<Expression<'a>, ParseError> {
        self.assignment()
    }
    fn assignment(&mut self) -> Result<Expression<'a>, ParseError> {
        let expr = self.or()?;
        match self.peek().tokentype {
            TokenType::Equal => {
                let equals = self.advance();
                let value = self.assignment()?;
                match expr {
                    Expression::Variable(name) => Ok(Expression::Assign {
                        name,
                        value: Box::new(value),
                    }),
                    _ => {
                        // Reported, but the parser is not confused, so no unwinding.
                        self.errors
                            .push(ParseError::new(equals, "Invalid assignment target."));
                        Ok(expr)
                    }
                }
            }
            _ => Ok(expr),
        }
    }
    fn or(&mut self) -> Result<Expression<'a>, ParseError> {
        let mut expr = self.and()?;
        while let TokenType::Or = self.peek().tokentype {
            let operator = self.advance();
            let right = self.and()?;
            expr = Expression::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn and(&mut self) -> Result<Expression<'a>, ParseError> {
        let mut expr = self.equality()?;
        while let TokenType::And = self.peek().tokentype {
            let operator = self.advance();
            let right = self.equality()?;
            expr = Expression::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn equality(&mut self) -> Result<Expression<'a>, ParseError> {
        let mut expr = self.comparison()?;
        loop {
            match self.peek().tokentype {
                TokenType::BangEqual | TokenType::EqualEqual => {
                    let operator = self.advance();
                    let right = self.comparison()?;
                    expr = Expression::Binary {
                        left: Box::new(expr),
                        operator,
                        right: Box::new(right),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }
    fn comparison(&mut self) -> Result<Expression<'a>, ParseError> {
        let mut expr = self.term()?;
        loop {
            match self.peek().tokentype {
                TokenType::Greater
                | TokenType::GreaterEqual
                | TokenType::Less
                | TokenType::LessEqual => {
                    let operator = self.advance();
                    let right = self.term()?;
                    expr = Expression::Binary {
                        left: Box::new(expr),
                        operator,
                        right: Box::new(right),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }
    fn term(&mut self) -> Result<Expression<'a>, ParseError> {
        let mut expr = self.factor()?;
        loop {
            match self.peek().tokentype {
                TokenType::Minus | TokenType::Plus => {
                    let operator = self.advance();
                    let right = self.factor()?;
                    expr = Expression::Binary {
                        left: Box::new(expr),
                        operator,
                        right: Box::new(right),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }
    fn factor(&mut self) -> Result<Expression<'a>, ParseError> {
        let mut expr = self.unary()?;
        loop {
            match self.peek().tokentype {
                TokenType::Slash | TokenType::Star => {
                    let operator = self.advance();
                    let right = self.unary()?;
                    expr = Expression::Binary {
                        left: Box::new(expr),
                        operator,
                        right: Box::new(right),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }
    fn unary(&mut self) -> Result<Expression<'a>, ParseError> {
        match self.peek().tokentype {
            TokenType::Bang | TokenType::Minus => {
                let operator = self.advance();
                let right = self.unary()?;
                Ok(Expression::Unary {
                    operator,
                    right: Box::new(right),
                })
            }
            _ => self.primary(),
        }
    }
    fn primary(&mut self) -> Result<Expression<'a>, ParseError> {
        let token = self.peek();
        let literal = match token.tokentype {
            TokenType::False => Value::Boolean(false),
            TokenType::True => Value::Boolean(true),
            TokenType::Nil => Value::Nil,
            TokenType::Number(x) => Value::Number(x),
            TokenType::String(x) => Value::String(x.to_string()),
            TokenType::Identifier(_) => {
                self.advance();
                return Ok(Expression::Variable(token));
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(&TokenType::RightParen, "Expect ')' after expression.")?;
                return Ok(Expression::Grouping(Box::new(expr)));
            }
            _ => return Err(self.error("Expect expression.")),
        };
        self.advance();
        Ok(Expression::Literal(literal))
    }
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if let TokenType::Semicolon = self.previous().tokentype {
                return;
            }
            match self.peek().tokentype {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => (),
            }
            self.advance();
        }
    }
    fn consume(
        &mut self,
        tokentype: &TokenType,
        message: &str,
    ) -> Result<&'a Token<'a>, ParseError> {
        if mem::discriminant(&self.peek().tokentype) == mem::discriminant(tokentype) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }
    fn advance(&mut self) -> &'a Token<'a> {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }
    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }
    fn peek(&self) -> &'a Token<'a> {
        self.tokens.get(self.current).unwrap_or(&END)
    }
    fn previous(&self) -> &'a Token<'a> {
        self.tokens
            .get(self.current.saturating_sub(1))
            .unwrap_or(&END)
    }
    fn error(&self, msg: &str) -> ParseError {
        ParseError::new(self.peek(), msg)
    }
}
