// ion: integer expression evaluator with a token-stepping TUI

use std::fs;
use std::io;
use std::path::Path;
use std::process;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use ion::storage::StringInterner;
use ion::ui::App;
use ion::{ParseError, Session};

/// Where the expression comes from
enum Input {
    File(String),
    Inline(String),
}

/// What to do with it
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Eval,
    Tokens,
    Tui,
}

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} [--tokens | --tui] [<file> | -e <expr>]", program_name);
    eprintln!();
    eprintln!("With no input, starts an interactive session.");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} -e '2 + 3 * 4'          # Evaluate an expression", program_name);
    eprintln!("  {} --tokens -e 'FOO+1'     # Print the token trace", program_name);
    eprintln!("  {} --tui expr.txt          # Step through a file's tokens", program_name);
}

fn parse_args(args: &[String]) -> Result<(Mode, Option<Input>), String> {
    let mut mode = Mode::Eval;
    let mut input = None;
    let mut rest = args.iter().skip(1);

    while let Some(arg) = rest.next() {
        let next_input = match arg.as_str() {
            "--tokens" => {
                mode = Mode::Tokens;
                continue;
            }
            "--tui" => {
                mode = Mode::Tui;
                continue;
            }
            "-e" => match rest.next() {
                Some(expr) => Input::Inline(expr.clone()),
                None => return Err("-e requires an expression".to_string()),
            },
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("Unknown option '{}'", flag));
            }
            path => Input::File(path.to_string()),
        };
        if input.replace(next_input).is_some() {
            return Err("Only one input may be given".to_string());
        }
    }

    Ok((mode, input))
}

fn read_input(input: Input) -> Result<Vec<u8>, String> {
    match input {
        Input::Inline(expr) => Ok(expr.into_bytes()),
        Input::File(path) => {
            if !Path::new(&path).exists() {
                return Err(format!("File '{}' not found", path));
            }
            fs::read(&path).map_err(|e| format!("Cannot read '{}': {}", path, e))
        }
    }
}

fn report(err: &ParseError, source: &[u8]) -> ! {
    eprintln!("Error: {}", err.describe(source));
    process::exit(1);
}

fn run_eval(session: &mut Session, source: &[u8]) {
    match session.eval(source) {
        Ok(value) => println!("{}", value),
        Err(e) => report(&e, source),
    }
}

fn run_tokens(session: &mut Session, source: &[u8]) {
    let (trace, lex_error) = session.trace_until_error(source);
    print!("{}", trace);
    if let Some(e) = lex_error {
        report(&e, source);
    }
    run_eval(session, source);
}

fn run_tui(session: &mut Session, source: &[u8]) -> io::Result<()> {
    let source = String::from_utf8_lossy(source).into_owned();
    let mut app = App::load(session, source);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn print_symbols(interner: &StringInterner) {
    if interner.is_empty() {
        println!("(no identifiers)");
        return;
    }
    for (symbol, bytes) in interner.iter() {
        println!("{}  {}", symbol, String::from_utf8_lossy(bytes));
    }
}

fn run_repl(session: &mut Session) -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;
    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if line == ":quit" || line == ":q" {
                    break;
                } else if line == ":symbols" {
                    print_symbols(session.interner());
                } else if let Some(expr) = line.strip_prefix(":tokens") {
                    let (trace, lex_error) = session.trace_until_error(expr);
                    print!("{}", trace);
                    if let Some(e) = lex_error {
                        eprintln!("Error: {}", e.describe(expr.as_bytes()));
                    }
                } else {
                    match session.eval(line) {
                        Ok(value) => println!("{}", value),
                        Err(e) => eprintln!("Error: {}", e.describe(line.as_bytes())),
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("ion");

    let (mode, input) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!();
            print_usage(program_name);
            process::exit(1);
        }
    };

    let mut session = Session::new();

    let Some(input) = input else {
        if mode != Mode::Eval {
            eprintln!("Error: No input given");
            eprintln!();
            print_usage(program_name);
            process::exit(1);
        }
        if let Err(e) = run_repl(&mut session) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        return;
    };

    let source = match read_input(input) {
        Ok(source) => source,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            process::exit(1);
        }
    };

    match mode {
        Mode::Eval => run_eval(&mut session, &source),
        Mode::Tokens => run_tokens(&mut session, &source),
        Mode::Tui => {
            if let Err(e) = run_tui(&mut session, &source) {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }
}
