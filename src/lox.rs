use crate::interpreter::{ErrorType, Interpreter};
use crate::parser;
use crate::printer::AstPrinter;
use crate::scanner;
use std::io::{self, Write};

pub struct Lox<W: Write> {
    interpreter: Interpreter<W>,
    had_error: bool,
    had_runtime_error: bool,
    print_ast: bool,
}

impl Lox<io::Stdout> {
    pub fn new() -> Lox<io::Stdout> {
        Lox::with_output(io::stdout())
    }
}

impl<W: Write> Lox<W> {
    pub fn with_output(out: W) -> Lox<W> {
        Lox {
            interpreter: Interpreter::with_output(out),
            had_error: false,
            had_runtime_error: false,
            print_ast: false,
        }
    }
    pub fn print_ast(mut self, enabled: bool) -> Lox<W> {
        self.print_ast = enabled;
        self
    }
    pub fn had_error(&self) -> bool {
        self.had_error
    }
    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }
    pub fn reset_errors(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }
    pub fn run(&mut self, source: &str) -> io::Result<()> {
        let (tokens, scan_errors) = scanner::scan_tokens(source);
        let (statements, parse_errors) = parser::parse(&tokens);

        let out = self.interpreter.output();
        for e in &scan_errors {
            writeln!(out, "{}", e)?;
        }
        for e in &parse_errors {
            writeln!(out, "{}", e)?;
        }
        if !scan_errors.is_empty() || !parse_errors.is_empty() {
            tracing::debug!(
                scan_errors = scan_errors.len(),
                parse_errors = parse_errors.len(),
                "not executing"
            );
            self.had_error = true;
        }
        if self.had_error {
            return Ok(());
        }

        if self.print_ast {
            for stmt in &statements {
                writeln!(out, "{}", AstPrinter::statement(stmt))?;
            }
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => Ok(()),
            Err(ErrorType::Runtime(e)) => {
                tracing::debug!(line = e.line, lexeme = %e.lexeme, "runtime error");
                self.had_runtime_error = true;
                writeln!(self.interpreter.output(), "{}", e)
            }
            Err(ErrorType::Io(e)) => Err(e),
        }
    }
}

#[cfg(test)]
mod lox_tests {
    use crate::lox::Lox;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> (String, bool, bool) {
        let mut lox = Lox::with_output(Vec::new());
        lox.run(source).unwrap();
        let had_error = lox.had_error();
        let had_runtime_error = lox.had_runtime_error();
        let output = String::from_utf8(lox.into_output()).unwrap();
        (output, had_error, had_runtime_error)
    }

    #[test]
    fn numbers_print_round_trip() {
        assert_eq!(run("print 1; print 1.5; print 0.25; print 100;").0, "1\n1.5\n0.25\n100\n");
    }

    #[test]
    fn concatenation_is_left_to_right() {
        assert_eq!(run("print \"a\" + \"b\" + \"c\";").0, "abc\n");
    }

    #[test]
    fn short_circuit() {
        let (output, had_error, had_runtime_error) =
            run("print false and (1/0); print true or (1/0); print nil and -\"x\";");
        assert_eq!(output, "false\ntrue\nnil\n");
        assert!(!had_error);
        assert!(!had_runtime_error);
    }

    #[test]
    fn shadowing() {
        assert_eq!(
            run("var a = 1; { var a = 2; print a; } print a;").0,
            "2\n1\n"
        );
    }

    #[test]
    fn assignment_reaches_enclosing_scope() {
        assert_eq!(run("var a = 1; { a = 2; } print a;").0, "2\n");
    }

    #[test]
    fn redeclaration_overwrites() {
        assert_eq!(run("var a = 1; var a; print a;").0, "nil\n");
    }

    #[test]
    fn assignment_is_an_expression() {
        assert_eq!(run("var a; var b; print a = b = 3; print a;").0, "3\n3\n");
    }

    #[test]
    fn undefined_variable() {
        let (output, had_error, had_runtime_error) = run("\n\nprint b;");
        assert_eq!(output, "Undefined variable 'b'.\n[line 3]\n");
        assert!(!had_error);
        assert!(had_runtime_error);
    }

    #[test]
    fn undefined_assignment() {
        let (output, _, had_runtime_error) = run("c = 1;");
        assert_eq!(output, "Undefined variable 'c'.\n[line 1]\n");
        assert!(had_runtime_error);
    }

    #[test]
    fn for_loop() {
        assert_eq!(
            run("for (var i = 0; i < 3; i = i + 1) print i;").0,
            "0\n1\n2\n"
        );
    }

    #[test]
    fn for_loop_variable_is_scoped() {
        let (output, _, had_runtime_error) =
            run("for (var i = 0; i < 1; i = i + 1) {} print i;");
        assert_eq!(output, "Undefined variable 'i'.\n[line 1]\n");
        assert!(had_runtime_error);
    }

    #[test]
    fn for_loop_with_outer_variable() {
        assert_eq!(
            run("var i = 5; for (; i > 3;) i = i - 1; print i;").0,
            "3\n"
        );
    }

    #[test]
    fn if_else() {
        assert_eq!(
            run("if (0) print \"zero is truthy\"; else print \"no\"; if (nil) print 1;").0,
            "zero is truthy\n"
        );
    }

    #[test]
    fn unterminated_string_reports_and_skips_execution() {
        let (output, had_error, had_runtime_error) = run("print 1;\n\"abc");
        assert_eq!(output, "[line 2] Error: Unterminated string.\n");
        assert!(had_error);
        assert!(!had_runtime_error);
    }

    #[test]
    fn parse_errors_are_all_reported() {
        let (output, had_error, _) = run("print 1 +;\nprint 2;\nvar 3;");
        assert_eq!(
            output,
            "[line 1] Error at ';': Expect expression.\n\
             [line 3] Error at '3': Expect variable name.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn scan_and_parse_errors_together() {
        let (output, had_error, _) = run("print @;");
        assert_eq!(
            output,
            "[line 1] Error: Unexpected character.\n\
             [line 1] Error at ';': Expect expression.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn errors_persist_until_reset() {
        let mut lox = Lox::with_output(Vec::new());
        lox.run("var a = ;").unwrap();
        assert!(lox.had_error());
        lox.run("print \"skipped\";").unwrap();
        lox.reset_errors();
        lox.run("print \"ran\";").unwrap();
        assert!(!lox.had_error());
        let output = String::from_utf8(lox.into_output()).unwrap();
        assert_eq!(
            output,
            "[line 1] Error at ';': Expect expression.\nran\n"
        );
    }

    #[test]
    fn globals_are_shared_between_runs() {
        let mut lox = Lox::with_output(Vec::new());
        lox.run("var greeting = \"hi\";").unwrap();
        lox.run("print greeting;").unwrap();
        assert_eq!(String::from_utf8(lox.into_output()).unwrap(), "hi\n");
    }

    #[test]
    fn print_ast() {
        let mut lox = Lox::with_output(Vec::new()).print_ast(true);
        lox.run("print -1 + 2;").unwrap();
        assert_eq!(
            String::from_utf8(lox.into_output()).unwrap(),
            "(print (+ (- 1) 2))\n1\n"
        );
    }

    #[test]
    fn runtime_error_aborts_remaining_statements() {
        let (output, _, had_runtime_error) = run("print 1;\nprint \"a\" - 1;\nprint 2;");
        assert_eq!(output, "1\nOperands must be numbers.\n[line 2]\n");
        assert!(had_runtime_error);
    }
}
