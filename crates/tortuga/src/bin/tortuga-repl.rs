use std::process::ExitCode;

use tortuga::{Interpreter, StdioHost};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let mut interp = Interpreter::new(Box::new(StdioHost::new()));

    if args.len() > 1 {
        // File execution mode
        let path = &args[1];
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error reading {path}: {e}");
                return ExitCode::FAILURE;
            }
        };
        interp.execute_text(&source);
        return ExitCode::SUCCESS;
    }

    // Interactive mode
    let code = interp.repl();
    if code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
