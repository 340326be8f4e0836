//! `oscine`: a CLI wrapping [`oscine::Interp`] with a `repl` and a `run`
//! subcommand, in `passerine-aspen`'s style (`structopt` subcommands,
//! `colored` diagnostics) but scaled down to what a single-binary
//! interpreter needs -- no package manifest, no subcommand for managing
//! a multi-file project.

use std::path::PathBuf;
use std::process;

use colored::Colorize;
use oscine::Interp;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use structopt::StructOpt;

use oscine::config::Config;

#[derive(StructOpt, Debug)]
#[structopt(name = "oscine", about = "A small tree-walking Scheme interpreter")]
enum Oscine {
    /// Starts an interactive read-eval-print loop
    Repl {
        #[structopt(long, parse(from_os_str))]
        config: Option<PathBuf>,
    },
    /// Evaluates every top-level form in a file, in order
    Run {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
}

/// Prints one evaluation error to stderr, in red, and returns -- the
/// caller decides whether that means "skip this form" (repl/run) or
/// "abort the process" (nothing here ever panics on user input, per
/// spec.md §7).
fn report(err: &oscine::Error) { eprintln!("{} {}", "error:".red().bold(), err); }

fn repl(config_path: Option<PathBuf>) {
    let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = match config_path {
        Some(path) => Config::load(&path),
        None => Config::discover(&dir),
    }
    .unwrap_or_else(|e| {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
        Config::default()
    });

    let interp = Interp::new();
    let mut editor = Editor::<()>::new().expect("could not start the line editor");
    let _ = editor.load_history(&config.history_file);

    loop {
        match editor.readline(&config.prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(line.as_str());
                // spec.md §7: a failed eval prints a diagnostic and
                // terminates only the current top-level form -- the
                // REPL loop keeps going, and prior `define`s stay live.
                for result in interp.eval_string_recovering(&line) {
                    match result {
                        Ok(value) => println!("{}", oscine::print::print(&value)),
                        Err(err) => report(&err),
                    }
                }
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {}", "error:".red().bold(), err);
                break;
            },
        }
    }

    let _ = editor.save_history(&config.history_file);
}

fn run(path: PathBuf) -> i32 {
    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{} could not read {}: {}", "error:".red().bold(), path.display(), e);
            return 1;
        },
    };

    let interp = Interp::new();
    let mut exit_code = 0;
    for result in interp.eval_string_recovering(&source) {
        if let Err(err) = result {
            report(&err);
            exit_code = 1;
        }
    }
    exit_code
}

fn main() {
    let code = match Oscine::from_args() {
        Oscine::Repl { config } => {
            repl(config);
            0
        },
        Oscine::Run { path } => run(path),
    };
    process::exit(code);
}
