use crate::ast::{Expression, Statement, Value};

pub struct AstPrinter {}

impl AstPrinter {
    pub fn expression(expr: &Expression) -> String {
        match expr {
            Expression::Assign { name, value } => {
                format!("(assign {} {})", name.lexeme, AstPrinter::expression(value))
            }
            Expression::Binary {
                left,
                operator,
                right,
            }
            | Expression::Logical {
                left,
                operator,
                right,
            } => AstPrinter::parenthesize(operator.lexeme, &[left.as_ref(), right.as_ref()]),
            Expression::Grouping(x) => AstPrinter::parenthesize("group", &[x.as_ref()]),
            Expression::Literal(x) => match x {
                Value::String(y) => y.clone(),
                _ => x.to_string(),
            },
            Expression::Unary { operator, right } => {
                AstPrinter::parenthesize(operator.lexeme, &[right.as_ref()])
            }
            Expression::Variable(x) => x.lexeme.to_string(),
        }
    }
    pub fn statement(stmt: &Statement) -> String {
        match stmt {
            Statement::Block(stmts) => {
                let mut x = String::from("(block");
                for stmt in stmts {
                    x.push(' ');
                    x.push_str(AstPrinter::statement(stmt).as_str());
                }
                x.push(')');
                x
            }
            Statement::Expression(e) => AstPrinter::parenthesize(";", &[e]),
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                None => format!(
                    "(if {} {})",
                    AstPrinter::expression(condition),
                    AstPrinter::statement(then_branch)
                ),
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    AstPrinter::expression(condition),
                    AstPrinter::statement(then_branch),
                    AstPrinter::statement(else_branch)
                ),
            },
            Statement::Print(e) => AstPrinter::parenthesize("print", &[e]),
            Statement::Var { name, initializer } => match initializer {
                None => format!("(var {})", name.lexeme),
                Some(e) => format!("(var {} {})", name.lexeme, AstPrinter::expression(e)),
            },
            Statement::While { condition, body } => format!(
                "(while {} {})",
                AstPrinter::expression(condition),
                AstPrinter::statement(body)
            ),
        }
    }
    fn parenthesize(name: &str, args: &[&Expression]) -> String {
        let mut x = String::from("(");
        x.push_str(name);
        for arg in args {
            x.push(' ');
            x.push_str(AstPrinter::expression(arg).as_str());
        }
        x.push(')');
        x
    }
}
