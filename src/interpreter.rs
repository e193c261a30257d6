use crate::ast::{Expression, Statement, Value};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenType};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErrorType {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("failed to write program output: {0}")]
    Io(#[from] io::Error),
}

pub struct Interpreter<W: Write> {
    globals: Environment,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Interpreter<W> {
        Interpreter {
            globals: Environment::new(),
            out,
        }
    }
    pub fn output(&mut self) -> &mut W {
        &mut self.out
    }
    pub fn into_output(self) -> W {
        self.out
    }
    pub fn interpret(&mut self, statements: &[Statement]) -> Result<(), ErrorType> {
        let mut environment = self.globals.clone();
        for stmt in statements {
            self.execute(stmt, &mut environment)?;
        }
        self.out.flush()?;
        Ok(())
    }
    pub fn execute(
        &mut self,
        stmt: &Statement,
        environment: &mut Environment,
    ) -> Result<(), ErrorType> {
        match stmt {
            Statement::Print(e) => {
                let val = self.evaluate(e, environment)?;
                writeln!(self.out, "{}", val)?;
            }
            Statement::Expression(e) => {
                self.evaluate(e, environment)?;
            }
            Statement::Var { name, initializer } => {
                let val = match initializer {
                    Some(e) => self.evaluate(e, environment)?,
                    None => Value::Nil,
                };
                environment.define(name.lexeme, val);
            }
            Statement::Block(stmts) => {
                self.execute_block(stmts, environment.new_child())?;
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, environment)?.is_truthy() {
                    self.execute(then_branch, environment)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, environment)?;
                }
            }
            Statement::While { condition, body } => {
                while self.evaluate(condition, environment)?.is_truthy() {
                    self.execute(body, environment)?;
                }
            }
        }
        Ok(())
    }
    pub fn execute_block(
        &mut self,
        statements: &[Statement],
        mut environment: Environment,
    ) -> Result<(), ErrorType> {
        tracing::trace!(depth = environment.depth(), "entering block");
        for stmt in statements {
            self.execute(stmt, &mut environment)?;
        }
        Ok(())
    }
    pub fn evaluate(
        &mut self,
        expr: &Expression,
        environment: &mut Environment,
    ) -> Result<Value, RuntimeError> {
        match expr {
            Expression::Literal(x) => Ok(x.clone()),
            Expression::Grouping(x) => self.evaluate(x, environment),
            Expression::Unary { operator, right } => {
                let rv = self.evaluate(right, environment)?;
                match operator.tokentype {
                    TokenType::Minus => match rv {
                        Value::Number(r) => Ok(Value::Number(-r)),
                        _ => Err(RuntimeError::new(operator, "Operand must be a number.")),
                    },
                    TokenType::Bang => Ok(Value::Boolean(!rv.is_truthy())),
                    _ => Err(unknown_operator(operator)),
                }
            }
            Expression::Binary {
                left,
                operator,
                right,
            } => {
                let lv = self.evaluate(left, environment)?;
                let rv = self.evaluate(right, environment)?;
                binary(operator, lv, rv)
            }
            Expression::Variable(token) => environment.get(token),
            Expression::Assign { name, value } => {
                let value = self.evaluate(value, environment)?;
                environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expression::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left, environment)?;
                match operator.tokentype {
                    TokenType::Or => {
                        if left.is_truthy() {
                            Ok(left)
                        } else {
                            self.evaluate(right, environment)
                        }
                    }
                    TokenType::And => {
                        if !left.is_truthy() {
                            Ok(left)
                        } else {
                            self.evaluate(right, environment)
                        }
                    }
                    _ => Err(unknown_operator(operator)),
                }
            }
        }
    }
}

fn binary(operator: &Token, lv: Value, rv: Value) -> Result<Value, RuntimeError> {
    match operator.tokentype {
        TokenType::EqualEqual => return Ok(Value::Boolean(lv.equals(&rv))),
        TokenType::BangEqual => return Ok(Value::Boolean(!lv.equals(&rv))),
        _ => (),
    }
    match (lv, rv) {
        (Value::Number(l), Value::Number(r)) => match operator.tokentype {
            TokenType::Minus => Ok(Value::Number(l - r)),
            TokenType::Slash => Ok(Value::Number(l / r)),
            TokenType::Star => Ok(Value::Number(l * r)),
            TokenType::Plus => Ok(Value::Number(l + r)),
            TokenType::Greater => Ok(Value::Boolean(l > r)),
            TokenType::GreaterEqual => Ok(Value::Boolean(l >= r)),
            TokenType::Less => Ok(Value::Boolean(l < r)),
            TokenType::LessEqual => Ok(Value::Boolean(l <= r)),
            _ => Err(unknown_operator(operator)),
        },
        (Value::String(mut l), Value::String(r)) => match operator.tokentype {
            TokenType::Plus => {
                l.push_str(r.as_str());
                Ok(Value::String(l))
            }
            _ => Err(RuntimeError::new(operator, "Operands must be numbers.")),
        },
        _ => match operator.tokentype {
            TokenType::Plus => Err(RuntimeError::new(
                operator,
                "Operands must be two numbers or two strings.",
            )),
            _ => Err(RuntimeError::new(operator, "Operands must be numbers.")),
        },
    }
}

fn unknown_operator(operator: &Token) -> RuntimeError {
    RuntimeError::new(
        operator,
        format!("Unknown operator '{}'.", operator.lexeme).as_str(),
    )
}

#[cfg(test)]
mod interpreter_tests {
    use crate::ast::Value;
    use crate::environment::Environment;
    use crate::interpreter::{ErrorType, Interpreter};
    use crate::parser;
    use crate::scanner;
    use pretty_assertions::assert_eq;

    fn eval(source: &str) -> Result<Value, String> {
        let program = format!("{};", source);
        let (tokens, scan_errors) = scanner::scan_tokens(&program);
        assert!(scan_errors.is_empty());
        let (statements, parse_errors) = parser::parse(&tokens);
        assert!(parse_errors.is_empty(), "{:?}", parse_errors);
        let mut interpreter = Interpreter::with_output(Vec::new());
        let mut environment = Environment::new();
        match &statements[0] {
            crate::ast::Statement::Expression(e) => interpreter
                .evaluate(e, &mut environment)
                .map_err(|e| e.message),
            _ => panic!("expected an expression statement"),
        }
    }

    fn run(source: &str) -> (String, Option<ErrorType>) {
        let (tokens, _) = scanner::scan_tokens(source);
        let (statements, parse_errors) = parser::parse(&tokens);
        assert!(parse_errors.is_empty(), "{:?}", parse_errors);
        let mut interpreter = Interpreter::with_output(Vec::new());
        let result = interpreter.interpret(&statements).err();
        let output = String::from_utf8(interpreter.into_output()).unwrap();
        (output, result)
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Ok(Value::Number(7.0)));
        assert_eq!(eval("(1 + 2) * 3"), Ok(Value::Number(9.0)));
        assert_eq!(eval("10 - 4 - 3"), Ok(Value::Number(3.0)));
        assert_eq!(eval("7 / 2"), Ok(Value::Number(3.5)));
        assert_eq!(eval("-(2)"), Ok(Value::Number(-2.0)));
        assert_eq!(eval("1 / 0"), Ok(Value::Number(f64::INFINITY)));
    }

    #[test]
    fn comparison_and_equality() {
        assert_eq!(eval("1 < 2"), Ok(Value::Boolean(true)));
        assert_eq!(eval("2 <= 1"), Ok(Value::Boolean(false)));
        assert_eq!(eval("1 == 1"), Ok(Value::Boolean(true)));
        assert_eq!(eval("nil == nil"), Ok(Value::Boolean(true)));
        assert_eq!(eval("nil == false"), Ok(Value::Boolean(false)));
        assert_eq!(eval("1 == \"1\""), Ok(Value::Boolean(false)));
        assert_eq!(eval("\"a\" != \"b\""), Ok(Value::Boolean(true)));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(
            eval("\"a\" + \"b\" + \"c\""),
            Ok(Value::String("abc".to_string()))
        );
    }

    #[test]
    fn type_errors() {
        assert_eq!(eval("-\"a\""), Err("Operand must be a number.".to_string()));
        assert_eq!(
            eval("1 + \"a\""),
            Err("Operands must be two numbers or two strings.".to_string())
        );
        assert_eq!(eval("true * 2"), Err("Operands must be numbers.".to_string()));
        assert_eq!(eval("\"a\" < \"b\""), Err("Operands must be numbers.".to_string()));
    }

    #[test]
    fn bang_uses_truthiness() {
        assert_eq!(eval("!nil"), Ok(Value::Boolean(true)));
        assert_eq!(eval("!0"), Ok(Value::Boolean(false)));
        assert_eq!(eval("!\"\""), Ok(Value::Boolean(false)));
        assert_eq!(eval("!!\"x\""), Ok(Value::Boolean(true)));
    }

    #[test]
    fn logical_returns_operand() {
        assert_eq!(eval("nil or \"x\""), Ok(Value::String("x".to_string())));
        assert_eq!(eval("1 and 2"), Ok(Value::Number(2.0)));
        assert_eq!(eval("false and 2"), Ok(Value::Boolean(false)));
    }

    #[test]
    fn short_circuit_skips_right_operand() {
        assert_eq!(eval("false and -\"boom\""), Ok(Value::Boolean(false)));
        assert_eq!(eval("true or -\"boom\""), Ok(Value::Boolean(true)));
        assert_eq!(eval("false and (1/0)"), Ok(Value::Boolean(false)));
    }

    #[test]
    fn block_scope_is_restored_after_error() {
        let mut interpreter = Interpreter::with_output(Vec::new());
        let (tokens, _) = scanner::scan_tokens("var a = 1; { var a = 2; -nil; }");
        let (statements, _) = parser::parse(&tokens);
        let err = interpreter.interpret(&statements).unwrap_err();
        assert!(matches!(err, ErrorType::Runtime(_)));
        let (tokens, _) = scanner::scan_tokens("print a;");
        let (statements, _) = parser::parse(&tokens);
        interpreter.interpret(&statements).unwrap();
        assert_eq!(String::from_utf8(interpreter.into_output()).unwrap(), "1\n");
    }

    #[test]
    fn runtime_error_stops_the_run() {
        let (output, err) = run("print 1; print -\"x\"; print 2;");
        assert_eq!(output, "1\n");
        match err {
            Some(ErrorType::Runtime(e)) => {
                assert_eq!(e.to_string(), "Operand must be a number.\n[line 1]")
            }
            _ => panic!("expected a runtime error"),
        }
    }

    #[test]
    fn statements() {
        let (output, err) = run(
            "var a = 1;
             { var a = 2; print a; }
             print a;
             if (a > 0) print \"pos\"; else print \"neg\";
             var i = 0;
             while (i < 2) { print i; i = i + 1; }",
        );
        assert!(err.is_none());
        assert_eq!(output, "2\n1\npos\n0\n1\n");
    }

    #[test]
    fn globals_survive_between_runs() {
        let mut interpreter = Interpreter::with_output(Vec::new());
        let (tokens, _) = scanner::scan_tokens("var a = \"kept\";");
        let (statements, _) = parser::parse(&tokens);
        interpreter.interpret(&statements).unwrap();
        let (tokens, _) = scanner::scan_tokens("print a;");
        let (statements, _) = parser::parse(&tokens);
        interpreter.interpret(&statements).unwrap();
        assert_eq!(String::from_utf8(interpreter.into_output()).unwrap(), "kept\n");
    }
}
