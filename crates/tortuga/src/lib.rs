//! tortuga — a Logo-family interpreter.
//!
//! The crate implements the interpreter core: the reader that turns
//! characters into tokens, the run-parser that separates infix operators and
//! numeric literals, the tree builder that produces an AST honoring Logo's
//! variadic grammar, and the evaluator that walks the tree, manages scopes,
//! dispatches primitives, and threads the flow-control signals (OUTPUT,
//! STOP, GOTO, THROW/CATCH, PAUSE).
//!
//! The outside world is reached only through the [`Host`] trait: a terminal
//! host, a scripted host for tests and batch runs, or an embedding
//! front-end. Hosts without a canvas answer turtle operations with
//! NO-GRAPHICS.
//!
//! ```no_run
//! use tortuga::{Interpreter, StdioHost};
//!
//! let mut interp = Interpreter::new(Box::new(StdioHost::new()));
//! std::process::exit(interp.repl());
//! ```
#![expect(dead_code, reason = "the primitive surface keeps some currently-unused entry points")]

mod ast;
mod datum;
mod host;
mod interp;
mod io;
mod library;
mod plists;
mod primitives;
mod procedures;
mod reader;
mod runparser;
mod signal;
mod treeify;
mod turtle;
mod types;
mod vars;
mod workspace;

pub use crate::{
    host::{
        Color, Host, HostError, HostResult, HostSignal, PenMode, ScreenMode, ScriptHost,
        ScriptOutput, StdioHost, Transform,
    },
    interp::Interpreter,
    library::{EmptyLibrary, HelpSource, LibrarySource},
};

/// The interpreter version, as reported by the LOGOVERSION system variable
/// and `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
