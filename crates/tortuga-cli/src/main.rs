use std::{env, process::ExitCode};

use tortuga::{Interpreter, StdioHost};

const USAGE: &str = "\
usage: tortuga [options] [script]

options:
  --help             show this message and exit
  --version          show the interpreter version and exit
  --setlibloc PATH   override the standard-library database path
  --sethelploc PATH  override the help database path
  --QLogoGUI         speak the GUI framing protocol on stdio
";

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let mut script: Option<String> = None;
    let mut lib_loc: Option<String> = None;
    let mut help_loc: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" => {
                print!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("tortuga {}", tortuga::VERSION);
                return ExitCode::SUCCESS;
            }
            "--setlibloc" => {
                lib_loc = args.next();
                if lib_loc.is_none() {
                    eprintln!("--setlibloc requires a path");
                    return ExitCode::FAILURE;
                }
            }
            "--sethelploc" => {
                help_loc = args.next();
                if help_loc.is_none() {
                    eprintln!("--sethelploc requires a path");
                    return ExitCode::FAILURE;
                }
            }
            "--QLogoGUI" => {
                eprintln!("the GUI framing surface is not available in this build");
                return ExitCode::FAILURE;
            }
            other if other.starts_with("--") => {
                eprintln!("unknown option {other}");
                eprint!("{USAGE}");
                return ExitCode::FAILURE;
            }
            other => script = Some(other.to_string()),
        }
    }

    // The core reads library and help text through trait interfaces; the
    // default build ships without the persistent databases, so the location
    // overrides are accepted but unused.
    let _ = (lib_loc, help_loc);

    let mut interp = Interpreter::new(Box::new(StdioHost::new()));

    if let Some(path) = script {
        let source = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error reading {path}: {e}");
                return ExitCode::FAILURE;
            }
        };
        interp.execute_text(&source);
        return ExitCode::SUCCESS;
    }

    match interp.repl() {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
