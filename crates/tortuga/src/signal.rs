use std::{fmt, rc::Rc};

use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    datum::{Datum, PrintOptions, show_datum},
    procedures::Procedure,
    types::Word,
};

/// Result type for every evaluation step. The `Err` arm carries the
/// flow-control value that is unwinding the evaluator stack.
pub type RunResult<T> = Result<T, Signal>;

/// A flow-control value.
///
/// Primitives signal non-local transfer by returning one of these; the
/// evaluator propagates it outward with `?` until the frame that consumes it:
/// a procedure boundary for `Output`/`Stop`/`Goto`, a CATCH or the REPL for
/// `Error`, the macro trampoline for `Continuation`, and the nested REPL for
/// `Pause`.
#[derive(Debug)]
pub enum Signal {
    /// An error (or user THROW) searching for a matching CATCH.
    Error(Box<LogoError>),
    /// OUTPUT: unwinds the current procedure, carrying its return value.
    Output(Datum),
    /// STOP: unwinds the current procedure with no value.
    Stop,
    /// GOTO: resume the current procedure body at the named tag.
    Goto(Word),
    /// Internal trampoline for tail-position macros: re-invoke `procedure`
    /// with `args` instead of growing the stack.
    Continuation {
        procedure: Rc<Procedure>,
        name: Word,
        args: Vec<Datum>,
    },
    /// CONTINUE: unwinds the nested pause REPL, carrying the resume value.
    Pause(Datum),
}

/// Numeric error codes, kept compatible with the classic interpreter's
/// numbering so ERROR output is recognizable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrCode {
    StackOverflow = 2,
    TurtleBounds = 3,
    DoesntLike = 4,
    DidntOutput = 5,
    NotEnoughInputs = 6,
    TooManyInputs = 8,
    DontSay = 9,
    ParenNotFound = 10,
    NoValue = 11,
    UnexpectedParen = 12,
    NoHow = 13,
    NoCatch = 14,
    AlreadyDefined = 15,
    AlreadyDribbling = 17,
    FileSystem = 18,
    ToInPause = 19,
    Throw = 21,
    IsPrimitive = 22,
    ToInProc = 23,
    NoTest = 25,
    UnexpectedSquare = 26,
    UnexpectedBrace = 27,
    NoGraphics = 28,
    MacroReturned = 29,
    NotInsideProcedure = 31,
    CustomThrow = 35,
    BadDefaultExpression = 37,
    CantOpen = 40,
    AlreadyOpen = 41,
    NotOpen = 42,
    NoApply = 44,
    AlreadyFilling = 45,
}

/// Default tags for built-in errors. A CATCH matches by key form; `Error` is
/// the wildcard tag that catches anything except the signal tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING-KEBAB-CASE")]
pub enum ErrTag {
    TurtleBounds,
    DoesntLike,
    DidntOutput,
    NotEnoughInputs,
    TooManyInputs,
    DontSay,
    NoValue,
    NoHow,
    AlreadyDefined,
    IsPrimitive,
    ToInProc,
    UnexpectedParen,
    UnexpectedSquare,
    UnexpectedBrace,
    ParenNotFound,
    Filesystem,
    NoGraphics,
    StackOverflow,
    MacroReturned,
    NotInsideProcedure,
    NoTest,
    BadDefault,
    NoApply,
    AlreadyDribbling,
    AlreadyFilling,
    AlreadyOpen,
    NotOpen,
    CantOpen,
    Toplevel,
    System,
    Pause,
    Error,
}

impl ErrTag {
    #[must_use]
    pub fn word(self) -> Word {
        Word::new(<&'static str>::from(self), false)
    }
}

/// An error datum: numeric code, tag word, message word, optional output
/// payload, plus the procedure and line it was raised in (filled in as it
/// propagates, for the "in «procedure»" diagnostics).
#[derive(Debug, Clone)]
pub struct LogoError {
    pub code: ErrCode,
    pub tag: Word,
    pub message: Word,
    pub output: Datum,
    pub procedure: Datum,
    pub line: Datum,
}

impl fmt::Display for LogoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.print())
    }
}

fn display(d: &Datum) -> String {
    show_datum(d, &PrintOptions::default())
}

fn err(code: ErrCode, tag: ErrTag, message: String) -> Signal {
    Signal::Error(Box::new(LogoError {
        code,
        tag: tag.word(),
        message: Word::new(message, false),
        output: Datum::Nothing,
        procedure: Datum::Nothing,
        line: Datum::Nothing,
    }))
}

impl LogoError {
    /// True when this error originated from a host signal rather than user
    /// code; these always unwind to the REPL past the CATCH wildcard.
    #[must_use]
    pub fn is_signal_tag(&self) -> bool {
        matches!(self.tag.key(), "toplevel" | "system" | "pause")
    }

    pub fn doesnt_like(who: &Word, what: &Datum) -> Signal {
        let mut signal = err(
            ErrCode::DoesntLike,
            ErrTag::DoesntLike,
            format!("{} doesn't like {} as input", who.print(), display(what)),
        );
        if let Signal::Error(e) = &mut signal {
            e.output = what.clone();
        }
        signal
    }

    pub fn not_enough_inputs(who: &Word) -> Signal {
        err(
            ErrCode::NotEnoughInputs,
            ErrTag::NotEnoughInputs,
            format!("not enough inputs to {}", who.print()),
        )
    }

    pub fn too_many_inputs(who: &Word) -> Signal {
        err(
            ErrCode::TooManyInputs,
            ErrTag::TooManyInputs,
            format!("too many inputs to {}", who.print()),
        )
    }

    pub fn didnt_output(from: &Word, to: &Word) -> Signal {
        err(
            ErrCode::DidntOutput,
            ErrTag::DidntOutput,
            format!("{} didn't output to {}", from.print(), to.print()),
        )
    }

    pub fn dont_say(value: &Datum) -> Signal {
        err(
            ErrCode::DontSay,
            ErrTag::DontSay,
            format!("You don't say what to do with {}", display(value)),
        )
    }

    pub fn no_value(name: &Word) -> Signal {
        err(
            ErrCode::NoValue,
            ErrTag::NoValue,
            format!("{} has no value", name.print()),
        )
    }

    pub fn no_how(name: &Word) -> Signal {
        let mut signal = err(
            ErrCode::NoHow,
            ErrTag::NoHow,
            format!("I don't know how to {}", name.print()),
        );
        if let Signal::Error(e) = &mut signal {
            e.output = Datum::Word(name.clone());
        }
        signal
    }

    pub fn already_defined(name: &Word) -> Signal {
        err(
            ErrCode::AlreadyDefined,
            ErrTag::AlreadyDefined,
            format!("{} is already defined", name.print()),
        )
    }

    pub fn is_primitive(name: &Word) -> Signal {
        err(
            ErrCode::IsPrimitive,
            ErrTag::IsPrimitive,
            format!("{} is a primitive", name.print()),
        )
    }

    pub fn to_in_proc(cmd: &Word) -> Signal {
        err(
            ErrCode::ToInProc,
            ErrTag::ToInProc,
            format!("can't use {} inside a procedure", cmd.print()),
        )
    }

    pub fn not_inside_procedure(cmd: &Word) -> Signal {
        err(
            ErrCode::NotInsideProcedure,
            ErrTag::NotInsideProcedure,
            format!("can only use {} inside a procedure", cmd.print()),
        )
    }

    pub fn no_test(who: &Word) -> Signal {
        err(
            ErrCode::NoTest,
            ErrTag::NoTest,
            format!("{} without TEST", who.print()),
        )
    }

    pub fn paren_not_found() -> Signal {
        err(
            ErrCode::ParenNotFound,
            ErrTag::ParenNotFound,
            "')' not found".to_string(),
        )
    }

    pub fn unexpected_close_paren() -> Signal {
        err(
            ErrCode::UnexpectedParen,
            ErrTag::UnexpectedParen,
            "unexpected ')'".to_string(),
        )
    }

    pub fn unexpected_close_square() -> Signal {
        err(
            ErrCode::UnexpectedSquare,
            ErrTag::UnexpectedSquare,
            "unexpected ']'".to_string(),
        )
    }

    pub fn unexpected_close_brace() -> Signal {
        err(
            ErrCode::UnexpectedBrace,
            ErrTag::UnexpectedBrace,
            "unexpected '}'".to_string(),
        )
    }

    pub fn file_system() -> Signal {
        err(
            ErrCode::FileSystem,
            ErrTag::Filesystem,
            "file system error".to_string(),
        )
    }

    pub fn cant_open(name: &Word) -> Signal {
        err(
            ErrCode::CantOpen,
            ErrTag::CantOpen,
            format!("I can't open file {}", name.print()),
        )
    }

    pub fn already_open(name: &Word) -> Signal {
        err(
            ErrCode::AlreadyOpen,
            ErrTag::AlreadyOpen,
            format!("file {} is already open", name.print()),
        )
    }

    pub fn not_open(name: &Word) -> Signal {
        err(
            ErrCode::NotOpen,
            ErrTag::NotOpen,
            format!("file {} is not open", name.print()),
        )
    }

    pub fn already_dribbling() -> Signal {
        err(
            ErrCode::AlreadyDribbling,
            ErrTag::AlreadyDribbling,
            "already dribbling".to_string(),
        )
    }

    pub fn already_filling() -> Signal {
        err(
            ErrCode::AlreadyFilling,
            ErrTag::AlreadyFilling,
            "already filling".to_string(),
        )
    }

    pub fn stack_overflow() -> Signal {
        err(
            ErrCode::StackOverflow,
            ErrTag::StackOverflow,
            "stack overflow".to_string(),
        )
    }

    pub fn no_graphics() -> Signal {
        err(
            ErrCode::NoGraphics,
            ErrTag::NoGraphics,
            "graphics not initialized".to_string(),
        )
    }

    pub fn turtle_bounds() -> Signal {
        err(
            ErrCode::TurtleBounds,
            ErrTag::TurtleBounds,
            "turtle out of bounds".to_string(),
        )
    }

    pub fn macro_returned(value: &Datum) -> Signal {
        err(
            ErrCode::MacroReturned,
            ErrTag::MacroReturned,
            format!("macro returned {} instead of a list", display(value)),
        )
    }

    pub fn bad_default(expr: &Datum) -> Signal {
        err(
            ErrCode::BadDefaultExpression,
            ErrTag::BadDefault,
            format!("bad default expression for optional input: {}", display(expr)),
        )
    }

    pub fn no_apply(name: &Word) -> Signal {
        err(
            ErrCode::NoApply,
            ErrTag::NoApply,
            format!("can't use {} without named inputs as a template", name.print()),
        )
    }

    /// A user THROW with an arbitrary tag and optional payload.
    ///
    /// `THROW "ERROR` (re-)raises a plain error; any other tag carries the
    /// NO-CATCH code so an uncaught throw surfaces as a NO-CATCH error at
    /// the REPL. The tag word is always the caller's own, so a matching
    /// CATCH still consumes it on the way up.
    pub fn custom_throw(tag: Word, output: Datum) -> Signal {
        let (code, message) = if tag.key() == "error" {
            match &output {
                Datum::Word(text) => (ErrCode::CustomThrow, text.clone()),
                _ => (ErrCode::Throw, Word::new("Throw \"Error", false)),
            }
        } else {
            (
                ErrCode::NoCatch,
                Word::new(format!("Can't find catch tag for {}", tag.print()), false),
            )
        };
        Signal::Error(Box::new(LogoError {
            code,
            tag,
            message,
            output,
            procedure: Datum::Nothing,
            line: Datum::Nothing,
        }))
    }

    /// A host-signal transfer: TOPLEVEL, SYSTEM, or PAUSE.
    pub fn signal_throw(tag: ErrTag) -> Signal {
        err(ErrCode::Throw, tag, String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_render_in_screaming_kebab_case() {
        assert_eq!(ErrTag::DoesntLike.word().print(), "DOESNT-LIKE");
        assert_eq!(ErrTag::NotEnoughInputs.word().print(), "NOT-ENOUGH-INPUTS");
        assert_eq!(ErrTag::Toplevel.word().print(), "TOPLEVEL");
    }

    #[test]
    fn signal_tags_bypass_the_catch_wildcard() {
        let Signal::Error(e) = LogoError::signal_throw(ErrTag::Toplevel) else {
            panic!("expected error signal");
        };
        assert!(e.is_signal_tag());
        let Signal::Error(e) = LogoError::no_value(&Word::new("x", false)) else {
            panic!("expected error signal");
        };
        assert!(!e.is_signal_tag());
    }

    #[test]
    fn custom_tag_throws_carry_the_no_catch_code() {
        // an uncaught THROW must surface as a NO-CATCH error, but the tag
        // word stays the caller's own so a matching CATCH still consumes it
        for output in [Datum::Nothing, Datum::Word(Word::new("hello", false))] {
            let Signal::Error(e) = LogoError::custom_throw(Word::new("oops", false), output)
            else {
                panic!("expected error signal");
            };
            assert_eq!(e.code, ErrCode::NoCatch);
            assert_eq!(e.tag.key(), "oops");
        }
    }

    #[test]
    fn throw_error_distinguishes_payload() {
        let Signal::Error(e) = LogoError::custom_throw(Word::new("error", false), Datum::Nothing)
        else {
            panic!("expected error signal");
        };
        assert_eq!(e.code, ErrCode::Throw);
        let Signal::Error(e) = LogoError::custom_throw(
            Word::new("Error", false),
            Datum::Word(Word::new("boom", false)),
        ) else {
            panic!("expected error signal");
        };
        assert_eq!(e.code, ErrCode::CustomThrow);
        assert_eq!(e.message.print(), "boom");
    }
}
