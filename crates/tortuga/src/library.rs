//! Interfaces to the persistent library and help databases.
//!
//! The core itself persists nothing. An embedding front-end may provide a
//! standard-library source (procedure bodies loaded on demand when an
//! undefined name is called) and a help source; the defaults supply neither.

/// Source of standard-library procedure bodies, keyed by procedure name
/// (case-folded). The returned code is Logo source text, executed to define
/// the missing procedure.
pub trait LibrarySource {
    /// The body for `name`, or `None` when the library does not provide it.
    fn procedure_source(&mut self, name: &str) -> Option<String> {
        let _ = name;
        None
    }

    /// Every procedure name the library can provide.
    fn all_names(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// Source of HELP text: alias resolution plus per-command descriptions.
pub trait HelpSource {
    /// Resolves an alias to its canonical command name.
    fn resolve_alias(&mut self, alias: &str) -> Option<String> {
        let _ = alias;
        None
    }

    /// The help text for a command.
    fn help_text(&mut self, command: &str) -> Option<String> {
        let _ = command;
        None
    }

    /// Every command with help text.
    fn all_commands(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// The default no-op library and help source.
#[derive(Debug, Default)]
pub struct EmptyLibrary;

impl LibrarySource for EmptyLibrary {}

impl HelpSource for EmptyLibrary {}
