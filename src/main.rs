use std::io::{self, BufRead, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};
use rcalc::{Calculator, EvalError, HISTORY_CAPACITY};
use rustyline::{DefaultEditor, error::ReadlineError};

/// Simplify expressions and solve equations written in informal algebraic notation.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Expressions or equations to evaluate, e.g. `23x - 8y = 99`.
    ///
    /// Without any, lines are read from stdin, or an interactive prompt is started when stdin
    /// is a terminal.
    inputs: Vec<String>,

    /// Number of successful evaluations kept in the history.
    #[arg(long, default_value_t = HISTORY_CAPACITY)]
    history_size: usize,

    /// Log level written to stderr; `RUST_LOG` takes precedence.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _logger = init_logging(&args.log_level);

    let mut calc = Calculator::with_history_capacity(args.history_size);

    if !args.inputs.is_empty() {
        for input in &args.inputs {
            if let Err(err) = print_evaluation(&mut calc, input) {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        }
        ExitCode::SUCCESS
    } else if !io::stdin().is_terminal() {
        run_stdin(&mut calc)
    } else {
        run_repl(&mut calc)
    }
}

fn init_logging(level: &str) -> Option<LoggerHandle> {
    let started =
        Logger::try_with_env_or_str(level).and_then(|logger| logger.log_to_stderr().start());
    match started {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("logging disabled: {err}");
            None
        }
    }
}

fn print_evaluation(calc: &mut Calculator, input: &str) -> Result<(), EvalError> {
    let evaluation = calc.evaluate(input)?;
    println!("{}", evaluation.display);
    Ok(())
}

/// One evaluation per non-empty line; keeps going past failures.
fn run_stdin(calc: &mut Calculator) -> ExitCode {
    let mut failed = false;
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        if let Err(err) = print_evaluation(calc, &line) {
            eprintln!("{err}");
            failed = true;
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// What the prompt should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    /// Print these to stdout.
    Lines(Vec<String>),
    /// Print this to stderr and keep prompting.
    Failed(String),
    Quit,
}

/// Runs a prompt command (`:history`, `:clear`, `:quit`) or evaluates the line.
fn handle_line(calc: &mut Calculator, line: &str) -> Reply {
    match line.trim() {
        "" => Reply::Lines(Vec::new()),
        ":quit" | ":q" => Reply::Quit,
        ":history" => Reply::Lines(calc.history_entries()),
        ":clear" => {
            calc.clear();
            Reply::Lines(Vec::new())
        }
        input => match calc.evaluate(input) {
            Ok(evaluation) => Reply::Lines(vec![evaluation.display]),
            Err(err) => Reply::Failed(err.to_string()),
        },
    }
}

fn run_repl(calc: &mut Calculator) -> ExitCode {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    fn process_line(rl: &mut DefaultEditor, calc: &mut Calculator) -> Result<bool, ReadlineError> {
        let input = rl.readline("> ")?;
        let trimmed = input.trim();
        if !trimmed.is_empty() {
            rl.add_history_entry(trimmed)?;
        }
        match handle_line(calc, trimmed) {
            Reply::Quit => return Ok(false),
            Reply::Lines(lines) => lines.iter().for_each(|line| println!("{line}")),
            Reply::Failed(message) => eprintln!("{message}"),
        }
        Ok(true)
    }

    loop {
        match process_line(&mut rl, calc) {
            Ok(true) => {}
            Ok(false) => break,
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
