use clap::{App, Arg};
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;
use tracing_subscriber::EnvFilter;
use treelox::Lox;

// Exit codes from sysexits.h.
const EX_DATAERR: i32 = 65;
const EX_NOINPUT: i32 = 66;
const EX_SOFTWARE: i32 = 70;
const EX_IOERR: i32 = 74;

fn main() {
    let matches = App::new("treelox")
        .about("Tree-walking interpreter for Lox")
        .arg(
            Arg::with_name("print-ast")
                .long("print-ast")
                .help("Prints each parsed statement before running it"),
        )
        .arg(
            Arg::with_name("script")
                .help("Script to run; starts a prompt when omitted")
                .index(1),
        )
        .get_matches();

    init_tracing();

    let lox = Lox::new().print_ast(matches.is_present("print-ast"));
    let result = match matches.value_of("script") {
        Some(file) => run_file(lox, file),
        None => run_prompt(lox),
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(EX_IOERR);
    }
}

/// Logs go to stderr, filtered by `RUST_LOG`. Nothing is logged by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_file(mut lox: Lox<io::Stdout>, file: &str) -> io::Result<()> {
    let contents = match fs::read_to_string(file) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Could not read '{}': {}", file, e);
            process::exit(EX_NOINPUT);
        }
    };
    lox.run(&contents)?;
    if lox.had_error() {
        process::exit(EX_DATAERR);
    }
    if lox.had_runtime_error() {
        process::exit(EX_SOFTWARE);
    }
    Ok(())
}

fn run_prompt(mut lox: Lox<io::Stdout>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }
        lox.reset_errors();
        lox.run(&line)?;
    }
}
