//! The primitive inventory: a flat table keyed by name, with per-primitive
//! arities, and the dispatcher that routes an AST node to its
//! implementation. Implementations live in per-area submodules.

mod arith;
mod comm;
mod control;
mod data;
mod plist_ops;
mod turtle_ops;
mod wksp;

use std::rc::Rc;

use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    ast::AstNode,
    datum::Datum,
    interp::Interpreter,
    signal::RunResult,
    types::Word,
};

/// Every interpreter-native primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Prim {
    // data constructors
    Word,
    List,
    Sentence,
    Fput,
    Lput,
    Array,
    Listtoarray,
    Arraytolist,
    // selectors
    First,
    Firsts,
    Last,
    Butfirst,
    Butfirsts,
    Butlast,
    Item,
    // mutators
    Setitem,
    DotSetfirst,
    DotSetbf,
    DotSetitem,
    // predicates
    Wordp,
    Listp,
    Arrayp,
    Emptyp,
    Beforep,
    DotEq,
    Memberp,
    Substringp,
    Numberp,
    Vbarredp,
    // queries
    Count,
    Ascii,
    Rawascii,
    Char,
    Member,
    Lowercase,
    Uppercase,
    Standout,
    Parse,
    Runparse,
    // arithmetic
    Sum,
    Difference,
    Minus,
    Product,
    Quotient,
    Remainder,
    Modulo,
    Int,
    Round,
    Power,
    Sqrt,
    Exp,
    Log10,
    Ln,
    Sin,
    Radsin,
    Cos,
    Radcos,
    Arctan,
    Radarctan,
    Random,
    Rerandom,
    Form,
    Bitand,
    Bitor,
    Bitxor,
    Bitnot,
    Ashift,
    Lshift,
    // logic and comparison
    And,
    Or,
    Not,
    Equalp,
    Notequalp,
    Lessp,
    Greaterp,
    Lessequalp,
    Greaterequalp,
    // console and streams
    Print,
    Show,
    Type,
    Readlist,
    Readword,
    Readrawline,
    Readchar,
    Readchars,
    Setprefix,
    Prefix,
    Openread,
    Openwrite,
    Openappend,
    Openupdate,
    Allopen,
    Setread,
    Setwrite,
    Reader,
    Writer,
    Readpos,
    Writepos,
    Setreadpos,
    Setwritepos,
    Close,
    Closeall,
    Erasefile,
    Dribble,
    Nodribble,
    Eofp,
    Keyp,
    Cleartext,
    Setcursor,
    Cursor,
    Settextcolor,
    Font,
    Setfont,
    Settextsize,
    Textsize,
    Allfonts,
    Cursorinsert,
    Cursoroverwrite,
    Cursormode,
    Wait,
    // control
    Run,
    Runresult,
    Repeat,
    Forever,
    Repcount,
    If,
    Ifelse,
    Test,
    Iftrue,
    Iffalse,
    Stop,
    Output,
    Maybeoutput,
    Catch,
    Throw,
    Error,
    Pause,
    Continue,
    Bye,
    Tag,
    Goto,
    Apply,
    NamedSlot,
    Ignore,
    To,
    Macro,
    Macrop,
    End,
    // workspace
    Make,
    Local,
    Localmake,
    Global,
    Thing,
    Procedurep,
    Primitivep,
    Definedp,
    Namep,
    Plistp,
    Contents,
    Buried,
    Traced,
    Stepped,
    Procedures,
    Primitives,
    Names,
    Plists,
    Arity,
    Printout,
    Pot,
    Erase,
    Ern,
    Erall,
    Erps,
    Erns,
    Erpls,
    Bury,
    Unbury,
    Buriedp,
    TracePrim,
    Untrace,
    Tracedp,
    StepPrim,
    Unstep,
    Steppedp,
    Text,
    Fulltext,
    Define,
    Copydef,
    Help,
    Load,
    Save,
    // property lists
    Pprop,
    Gprop,
    Remprop,
    Plist,
    // turtle and screen
    Forward,
    Back,
    Right,
    Left,
    Home,
    Setpos,
    Setxy,
    Setx,
    Sety,
    Setheading,
    Heading,
    Pos,
    Towards,
    Arc,
    Clearscreen,
    Clean,
    Penup,
    Pendown,
    Pendownp,
    Showturtle,
    Hideturtle,
    Shownp,
    Setpencolor,
    Pencolor,
    Setpalette,
    Palette,
    Setpensize,
    Pensize,
    Penpaint,
    Penerase,
    Penreverse,
    Penmode,
    Setbackground,
    Background,
    Wrap,
    Fence,
    Window,
    Turtlemode,
    Label,
    Setlabelheight,
    Labelheight,
    Textscreen,
    Fullscreen,
    Splitscreen,
    Screenmode,
    Filled,
    Setbounds,
    Bounds,
    Mousepos,
    Clickpos,
    Buttonp,
    Button,
    Savepict,
    Setscrunch,
    Scrunch,
}

/// One row of the primitive table.
pub(crate) struct PrimSpec {
    pub name: &'static str,
    pub prim: Prim,
    pub min: i32,
    pub default: i32,
    pub max: i32,
}

const fn spec(name: &'static str, prim: Prim, min: i32, default: i32, max: i32) -> PrimSpec {
    PrimSpec {
        name,
        prim,
        min,
        default,
        max,
    }
}

/// The flat primitive table, aliases included. Names are key form
/// (lowercase); lookups go through the case-folded key projection.
pub(crate) static TABLE: &[PrimSpec] = &[
    // data constructors
    spec("word", Prim::Word, 0, 2, -1),
    spec("list", Prim::List, 0, 2, -1),
    spec("sentence", Prim::Sentence, 0, 2, -1),
    spec("se", Prim::Sentence, 0, 2, -1),
    spec("fput", Prim::Fput, 2, 2, 2),
    spec("lput", Prim::Lput, 2, 2, 2),
    spec("array", Prim::Array, 1, 1, 2),
    spec("listtoarray", Prim::Listtoarray, 1, 1, 2),
    spec("arraytolist", Prim::Arraytolist, 1, 1, 1),
    // selectors
    spec("first", Prim::First, 1, 1, 1),
    spec("firsts", Prim::Firsts, 1, 1, 1),
    spec("last", Prim::Last, 1, 1, 1),
    spec("butfirst", Prim::Butfirst, 1, 1, 1),
    spec("bf", Prim::Butfirst, 1, 1, 1),
    spec("butfirsts", Prim::Butfirsts, 1, 1, 1),
    spec("bfs", Prim::Butfirsts, 1, 1, 1),
    spec("butlast", Prim::Butlast, 1, 1, 1),
    spec("bl", Prim::Butlast, 1, 1, 1),
    spec("item", Prim::Item, 2, 2, 2),
    // mutators
    spec("setitem", Prim::Setitem, 3, 3, 3),
    spec(".setfirst", Prim::DotSetfirst, 2, 2, 2),
    spec(".setbf", Prim::DotSetbf, 2, 2, 2),
    spec(".setitem", Prim::DotSetitem, 3, 3, 3),
    // predicates
    spec("wordp", Prim::Wordp, 1, 1, 1),
    spec("word?", Prim::Wordp, 1, 1, 1),
    spec("listp", Prim::Listp, 1, 1, 1),
    spec("list?", Prim::Listp, 1, 1, 1),
    spec("arrayp", Prim::Arrayp, 1, 1, 1),
    spec("array?", Prim::Arrayp, 1, 1, 1),
    spec("emptyp", Prim::Emptyp, 1, 1, 1),
    spec("empty?", Prim::Emptyp, 1, 1, 1),
    spec("beforep", Prim::Beforep, 2, 2, 2),
    spec("before?", Prim::Beforep, 2, 2, 2),
    spec(".eq", Prim::DotEq, 2, 2, 2),
    spec("memberp", Prim::Memberp, 2, 2, 2),
    spec("member?", Prim::Memberp, 2, 2, 2),
    spec("substringp", Prim::Substringp, 2, 2, 2),
    spec("substring?", Prim::Substringp, 2, 2, 2),
    spec("numberp", Prim::Numberp, 1, 1, 1),
    spec("number?", Prim::Numberp, 1, 1, 1),
    spec("vbarredp", Prim::Vbarredp, 1, 1, 1),
    spec("vbarred?", Prim::Vbarredp, 1, 1, 1),
    spec("backslashedp", Prim::Vbarredp, 1, 1, 1),
    spec("backslashed?", Prim::Vbarredp, 1, 1, 1),
    // queries
    spec("count", Prim::Count, 1, 1, 1),
    spec("ascii", Prim::Ascii, 1, 1, 1),
    spec("rawascii", Prim::Rawascii, 1, 1, 1),
    spec("char", Prim::Char, 1, 1, 1),
    spec("member", Prim::Member, 2, 2, 2),
    spec("lowercase", Prim::Lowercase, 1, 1, 1),
    spec("uppercase", Prim::Uppercase, 1, 1, 1),
    spec("standout", Prim::Standout, 1, 1, 1),
    spec("parse", Prim::Parse, 1, 1, 1),
    spec("runparse", Prim::Runparse, 1, 1, 1),
    // arithmetic
    spec("sum", Prim::Sum, 0, 2, -1),
    spec("+", Prim::Sum, 2, 2, 2),
    spec("difference", Prim::Difference, 2, 2, 2),
    spec("minus", Prim::Minus, 1, 1, 1),
    spec("-", Prim::Minus, 1, 1, 1),
    spec("product", Prim::Product, 0, 2, -1),
    spec("*", Prim::Product, 2, 2, 2),
    spec("quotient", Prim::Quotient, 1, 2, 2),
    spec("/", Prim::Quotient, 2, 2, 2),
    spec("remainder", Prim::Remainder, 2, 2, 2),
    spec("%", Prim::Remainder, 2, 2, 2),
    spec("modulo", Prim::Modulo, 2, 2, 2),
    spec("int", Prim::Int, 1, 1, 1),
    spec("round", Prim::Round, 1, 1, 1),
    spec("power", Prim::Power, 2, 2, 2),
    spec("sqrt", Prim::Sqrt, 1, 1, 1),
    spec("exp", Prim::Exp, 1, 1, 1),
    spec("log10", Prim::Log10, 1, 1, 1),
    spec("ln", Prim::Ln, 1, 1, 1),
    spec("sin", Prim::Sin, 1, 1, 1),
    spec("radsin", Prim::Radsin, 1, 1, 1),
    spec("cos", Prim::Cos, 1, 1, 1),
    spec("radcos", Prim::Radcos, 1, 1, 1),
    spec("arctan", Prim::Arctan, 1, 1, 2),
    spec("radarctan", Prim::Radarctan, 1, 1, 2),
    spec("random", Prim::Random, 1, 1, 2),
    spec("rerandom", Prim::Rerandom, 0, 0, 1),
    spec("form", Prim::Form, 3, 3, 3),
    spec("bitand", Prim::Bitand, 0, 2, -1),
    spec("bitor", Prim::Bitor, 0, 2, -1),
    spec("bitxor", Prim::Bitxor, 0, 2, -1),
    spec("bitnot", Prim::Bitnot, 1, 1, 1),
    spec("ashift", Prim::Ashift, 2, 2, 2),
    spec("lshift", Prim::Lshift, 2, 2, 2),
    // logic and comparison
    spec("and", Prim::And, 0, 2, -1),
    spec("or", Prim::Or, 0, 2, -1),
    spec("not", Prim::Not, 1, 1, 1),
    spec("equalp", Prim::Equalp, 2, 2, 2),
    spec("equal?", Prim::Equalp, 2, 2, 2),
    spec("=", Prim::Equalp, 2, 2, 2),
    spec("notequalp", Prim::Notequalp, 2, 2, 2),
    spec("notequal?", Prim::Notequalp, 2, 2, 2),
    spec("<>", Prim::Notequalp, 2, 2, 2),
    spec("lessp", Prim::Lessp, 2, 2, 2),
    spec("less?", Prim::Lessp, 2, 2, 2),
    spec("<", Prim::Lessp, 2, 2, 2),
    spec("greaterp", Prim::Greaterp, 2, 2, 2),
    spec("greater?", Prim::Greaterp, 2, 2, 2),
    spec(">", Prim::Greaterp, 2, 2, 2),
    spec("lessequalp", Prim::Lessequalp, 2, 2, 2),
    spec("lessequal?", Prim::Lessequalp, 2, 2, 2),
    spec("<=", Prim::Lessequalp, 2, 2, 2),
    spec("greaterequalp", Prim::Greaterequalp, 2, 2, 2),
    spec("greaterequal?", Prim::Greaterequalp, 2, 2, 2),
    spec(">=", Prim::Greaterequalp, 2, 2, 2),
    // console and streams
    spec("print", Prim::Print, 0, 1, -1),
    spec("pr", Prim::Print, 0, 1, -1),
    spec("show", Prim::Show, 0, 1, -1),
    spec("type", Prim::Type, 0, 1, -1),
    spec("readlist", Prim::Readlist, 0, 0, 0),
    spec("rl", Prim::Readlist, 0, 0, 0),
    spec("readword", Prim::Readword, 0, 0, 0),
    spec("rw", Prim::Readword, 0, 0, 0),
    spec("readrawline", Prim::Readrawline, 0, 0, 0),
    spec("readchar", Prim::Readchar, 0, 0, 0),
    spec("rc", Prim::Readchar, 0, 0, 0),
    spec("readchars", Prim::Readchars, 1, 1, 1),
    spec("rcs", Prim::Readchars, 1, 1, 1),
    spec("setprefix", Prim::Setprefix, 1, 1, 1),
    spec("prefix", Prim::Prefix, 0, 0, 0),
    spec("openread", Prim::Openread, 1, 1, 1),
    spec("openwrite", Prim::Openwrite, 1, 1, 1),
    spec("openappend", Prim::Openappend, 1, 1, 1),
    spec("openupdate", Prim::Openupdate, 1, 1, 1),
    spec("allopen", Prim::Allopen, 0, 0, 0),
    spec("setread", Prim::Setread, 1, 1, 1),
    spec("setwrite", Prim::Setwrite, 1, 1, 1),
    spec("reader", Prim::Reader, 0, 0, 0),
    spec("writer", Prim::Writer, 0, 0, 0),
    spec("readpos", Prim::Readpos, 0, 0, 0),
    spec("writepos", Prim::Writepos, 0, 0, 0),
    spec("setreadpos", Prim::Setreadpos, 1, 1, 1),
    spec("setwritepos", Prim::Setwritepos, 1, 1, 1),
    spec("close", Prim::Close, 1, 1, 1),
    spec("closeall", Prim::Closeall, 0, 0, 0),
    spec("erasefile", Prim::Erasefile, 1, 1, 1),
    spec("erf", Prim::Erasefile, 1, 1, 1),
    spec("dribble", Prim::Dribble, 1, 1, 1),
    spec("nodribble", Prim::Nodribble, 0, 0, 0),
    spec("eofp", Prim::Eofp, 0, 0, 0),
    spec("eof?", Prim::Eofp, 0, 0, 0),
    spec("keyp", Prim::Keyp, 0, 0, 0),
    spec("key?", Prim::Keyp, 0, 0, 0),
    spec("cleartext", Prim::Cleartext, 0, 0, 0),
    spec("ct", Prim::Cleartext, 0, 0, 0),
    spec("setcursor", Prim::Setcursor, 1, 1, 1),
    spec("cursor", Prim::Cursor, 0, 0, 0),
    spec("settextcolor", Prim::Settextcolor, 2, 2, 2),
    spec("settc", Prim::Settextcolor, 2, 2, 2),
    spec("font", Prim::Font, 0, 0, 0),
    spec("setfont", Prim::Setfont, 1, 1, 1),
    spec("settextsize", Prim::Settextsize, 1, 1, 1),
    spec("textsize", Prim::Textsize, 0, 0, 0),
    spec("allfonts", Prim::Allfonts, 0, 0, 0),
    spec("cursorinsert", Prim::Cursorinsert, 0, 0, 0),
    spec("cursoroverwrite", Prim::Cursoroverwrite, 0, 0, 0),
    spec("cursormode", Prim::Cursormode, 0, 0, 0),
    spec("wait", Prim::Wait, 1, 1, 1),
    // control
    spec("run", Prim::Run, 1, 1, 1),
    spec("runresult", Prim::Runresult, 1, 1, 1),
    spec("repeat", Prim::Repeat, 2, 2, 2),
    spec("forever", Prim::Forever, 1, 1, 1),
    spec("repcount", Prim::Repcount, 0, 0, 0),
    spec("if", Prim::If, 2, 2, 3),
    spec("ifelse", Prim::Ifelse, 3, 3, 3),
    spec("test", Prim::Test, 1, 1, 1),
    spec("iftrue", Prim::Iftrue, 1, 1, 1),
    spec("ift", Prim::Iftrue, 1, 1, 1),
    spec("iffalse", Prim::Iffalse, 1, 1, 1),
    spec("iff", Prim::Iffalse, 1, 1, 1),
    spec("stop", Prim::Stop, 0, 0, 1),
    spec("output", Prim::Output, 1, 1, 1),
    spec("op", Prim::Output, 1, 1, 1),
    spec(".maybeoutput", Prim::Maybeoutput, 1, 1, 1),
    spec("catch", Prim::Catch, 2, 2, 2),
    spec("throw", Prim::Throw, 1, -1, 2),
    spec("error", Prim::Error, 0, 0, 0),
    spec("pause", Prim::Pause, 0, 0, 0),
    spec("continue", Prim::Continue, 0, -1, 1),
    spec("co", Prim::Continue, 0, -1, 1),
    spec("bye", Prim::Bye, 0, 0, 0),
    spec("tag", Prim::Tag, 1, 1, 1),
    spec("goto", Prim::Goto, 1, 1, 1),
    spec("apply", Prim::Apply, 2, 2, 2),
    spec("?", Prim::NamedSlot, 0, 0, 1),
    spec("ignore", Prim::Ignore, 1, 1, 1),
    spec("to", Prim::To, -1, -1, -1),
    spec(".macro", Prim::Macro, -1, -1, -1),
    spec("macrop", Prim::Macrop, 1, 1, 1),
    spec("macro?", Prim::Macrop, 1, 1, 1),
    spec("end", Prim::End, 0, 0, 0),
    // workspace
    spec("make", Prim::Make, 2, 2, 2),
    spec("local", Prim::Local, 1, 1, -1),
    spec("localmake", Prim::Localmake, 2, 2, 2),
    spec("global", Prim::Global, 1, 1, -1),
    spec("thing", Prim::Thing, 1, 1, 1),
    spec("procedurep", Prim::Procedurep, 1, 1, 1),
    spec("procedure?", Prim::Procedurep, 1, 1, 1),
    spec("primitivep", Prim::Primitivep, 1, 1, 1),
    spec("primitive?", Prim::Primitivep, 1, 1, 1),
    spec("definedp", Prim::Definedp, 1, 1, 1),
    spec("defined?", Prim::Definedp, 1, 1, 1),
    spec("namep", Prim::Namep, 1, 1, 1),
    spec("name?", Prim::Namep, 1, 1, 1),
    spec("plistp", Prim::Plistp, 1, 1, 1),
    spec("plist?", Prim::Plistp, 1, 1, 1),
    spec("contents", Prim::Contents, 0, 0, 0),
    spec("buried", Prim::Buried, 0, 0, 0),
    spec("traced", Prim::Traced, 0, 0, 0),
    spec("stepped", Prim::Stepped, 0, 0, 0),
    spec("procedures", Prim::Procedures, 0, 0, 0),
    spec("primitives", Prim::Primitives, 0, 0, 0),
    spec("names", Prim::Names, 0, 0, 0),
    spec("plists", Prim::Plists, 0, 0, 0),
    spec("arity", Prim::Arity, 1, 1, 1),
    spec("printout", Prim::Printout, 1, 1, 1),
    spec("po", Prim::Printout, 1, 1, 1),
    spec("pot", Prim::Pot, 1, 1, 1),
    spec("erase", Prim::Erase, 1, 1, 1),
    spec("er", Prim::Erase, 1, 1, 1),
    spec("ern", Prim::Ern, 1, 1, 1),
    spec("erall", Prim::Erall, 0, 0, 0),
    spec("erps", Prim::Erps, 0, 0, 0),
    spec("erns", Prim::Erns, 0, 0, 0),
    spec("erpls", Prim::Erpls, 0, 0, 0),
    spec("bury", Prim::Bury, 1, 1, 1),
    spec("unbury", Prim::Unbury, 1, 1, 1),
    spec("buriedp", Prim::Buriedp, 1, 1, 1),
    spec("buried?", Prim::Buriedp, 1, 1, 1),
    spec("trace", Prim::TracePrim, 1, 1, 1),
    spec("untrace", Prim::Untrace, 1, 1, 1),
    spec("tracedp", Prim::Tracedp, 1, 1, 1),
    spec("traced?", Prim::Tracedp, 1, 1, 1),
    spec("step", Prim::StepPrim, 1, 1, 1),
    spec("unstep", Prim::Unstep, 1, 1, 1),
    spec("steppedp", Prim::Steppedp, 1, 1, 1),
    spec("stepped?", Prim::Steppedp, 1, 1, 1),
    spec("text", Prim::Text, 1, 1, 1),
    spec("fulltext", Prim::Fulltext, 1, 1, 1),
    spec("define", Prim::Define, 2, 2, 2),
    spec("copydef", Prim::Copydef, 2, 2, 2),
    spec("help", Prim::Help, 0, 0, 1),
    spec("load", Prim::Load, 1, 1, 1),
    spec("save", Prim::Save, 1, 1, 1),
    // property lists
    spec("pprop", Prim::Pprop, 3, 3, 3),
    spec("gprop", Prim::Gprop, 2, 2, 2),
    spec("remprop", Prim::Remprop, 2, 2, 2),
    spec("plist", Prim::Plist, 1, 1, 1),
    // turtle and screen
    spec("forward", Prim::Forward, 1, 1, 1),
    spec("fd", Prim::Forward, 1, 1, 1),
    spec("back", Prim::Back, 1, 1, 1),
    spec("bk", Prim::Back, 1, 1, 1),
    spec("right", Prim::Right, 1, 1, 1),
    spec("rt", Prim::Right, 1, 1, 1),
    spec("left", Prim::Left, 1, 1, 1),
    spec("lt", Prim::Left, 1, 1, 1),
    spec("home", Prim::Home, 0, 0, 0),
    spec("setpos", Prim::Setpos, 1, 1, 1),
    spec("setxy", Prim::Setxy, 2, 2, 2),
    spec("setx", Prim::Setx, 1, 1, 1),
    spec("sety", Prim::Sety, 1, 1, 1),
    spec("setheading", Prim::Setheading, 1, 1, 1),
    spec("seth", Prim::Setheading, 1, 1, 1),
    spec("heading", Prim::Heading, 0, 0, 0),
    spec("pos", Prim::Pos, 0, 0, 0),
    spec("towards", Prim::Towards, 1, 1, 1),
    spec("arc", Prim::Arc, 2, 2, 2),
    spec("clearscreen", Prim::Clearscreen, 0, 0, 0),
    spec("cs", Prim::Clearscreen, 0, 0, 0),
    spec("clean", Prim::Clean, 0, 0, 0),
    spec("penup", Prim::Penup, 0, 0, 0),
    spec("pu", Prim::Penup, 0, 0, 0),
    spec("pendown", Prim::Pendown, 0, 0, 0),
    spec("pd", Prim::Pendown, 0, 0, 0),
    spec("pendownp", Prim::Pendownp, 0, 0, 0),
    spec("pendown?", Prim::Pendownp, 0, 0, 0),
    spec("showturtle", Prim::Showturtle, 0, 0, 0),
    spec("st", Prim::Showturtle, 0, 0, 0),
    spec("hideturtle", Prim::Hideturtle, 0, 0, 0),
    spec("ht", Prim::Hideturtle, 0, 0, 0),
    spec("shownp", Prim::Shownp, 0, 0, 0),
    spec("shown?", Prim::Shownp, 0, 0, 0),
    spec("setpencolor", Prim::Setpencolor, 1, 1, 1),
    spec("setpc", Prim::Setpencolor, 1, 1, 1),
    spec("pencolor", Prim::Pencolor, 0, 0, 0),
    spec("pc", Prim::Pencolor, 0, 0, 0),
    spec("setpalette", Prim::Setpalette, 2, 2, 2),
    spec("palette", Prim::Palette, 1, 1, 1),
    spec("setpensize", Prim::Setpensize, 1, 1, 1),
    spec("pensize", Prim::Pensize, 0, 0, 0),
    spec("penpaint", Prim::Penpaint, 0, 0, 0),
    spec("ppt", Prim::Penpaint, 0, 0, 0),
    spec("penerase", Prim::Penerase, 0, 0, 0),
    spec("pe", Prim::Penerase, 0, 0, 0),
    spec("penreverse", Prim::Penreverse, 0, 0, 0),
    spec("px", Prim::Penreverse, 0, 0, 0),
    spec("penmode", Prim::Penmode, 0, 0, 0),
    spec("setbackground", Prim::Setbackground, 1, 1, 1),
    spec("setbg", Prim::Setbackground, 1, 1, 1),
    spec("background", Prim::Background, 0, 0, 0),
    spec("bg", Prim::Background, 0, 0, 0),
    spec("wrap", Prim::Wrap, 0, 0, 0),
    spec("fence", Prim::Fence, 0, 0, 0),
    spec("window", Prim::Window, 0, 0, 0),
    spec("turtlemode", Prim::Turtlemode, 0, 0, 0),
    spec("label", Prim::Label, 1, 1, 1),
    spec("setlabelheight", Prim::Setlabelheight, 1, 1, 1),
    spec("labelheight", Prim::Labelheight, 0, 0, 0),
    spec("textscreen", Prim::Textscreen, 0, 0, 0),
    spec("ts", Prim::Textscreen, 0, 0, 0),
    spec("fullscreen", Prim::Fullscreen, 0, 0, 0),
    spec("fs", Prim::Fullscreen, 0, 0, 0),
    spec("splitscreen", Prim::Splitscreen, 0, 0, 0),
    spec("ss", Prim::Splitscreen, 0, 0, 0),
    spec("screenmode", Prim::Screenmode, 0, 0, 0),
    spec("filled", Prim::Filled, 2, 2, 2),
    spec("setbounds", Prim::Setbounds, 2, 2, 2),
    spec("bounds", Prim::Bounds, 0, 0, 0),
    spec("mousepos", Prim::Mousepos, 0, 0, 0),
    spec("clickpos", Prim::Clickpos, 0, 0, 0),
    spec("buttonp", Prim::Buttonp, 0, 0, 0),
    spec("button?", Prim::Buttonp, 0, 0, 0),
    spec("button", Prim::Button, 0, 0, 0),
    spec("savepict", Prim::Savepict, 1, 1, 1),
    spec("setscrunch", Prim::Setscrunch, 2, 2, 2),
    spec("scrunch", Prim::Scrunch, 0, 0, 0),
];

/// The TRUE/FALSE word for a boolean result.
pub(crate) fn truth(value: bool) -> Datum {
    Datum::Word(Word::new(if value { "true" } else { "false" }, false))
}

/// Routes a primitive node to its implementation.
pub(crate) fn dispatch(interp: &mut Interpreter, prim: Prim, node: &Rc<AstNode>) -> RunResult<Datum> {
    match prim {
        // data
        Prim::Word => data::word(interp, node),
        Prim::List => data::list(interp, node),
        Prim::Sentence => data::sentence(interp, node),
        Prim::Fput => data::fput(interp, node),
        Prim::Lput => data::lput(interp, node),
        Prim::Array => data::array(interp, node),
        Prim::Listtoarray => data::listtoarray(interp, node),
        Prim::Arraytolist => data::arraytolist(interp, node),
        Prim::First => data::first(interp, node),
        Prim::Firsts => data::firsts(interp, node),
        Prim::Last => data::last(interp, node),
        Prim::Butfirst => data::butfirst(interp, node),
        Prim::Butfirsts => data::butfirsts(interp, node),
        Prim::Butlast => data::butlast(interp, node),
        Prim::Item => data::item(interp, node),
        Prim::Setitem => data::setitem(interp, node, true),
        Prim::DotSetfirst => data::dot_setfirst(interp, node),
        Prim::DotSetbf => data::dot_setbf(interp, node),
        Prim::DotSetitem => data::setitem(interp, node, false),
        Prim::Wordp => data::wordp(interp, node),
        Prim::Listp => data::listp(interp, node),
        Prim::Arrayp => data::arrayp(interp, node),
        Prim::Emptyp => data::emptyp(interp, node),
        Prim::Beforep => data::beforep(interp, node),
        Prim::DotEq => data::dot_eq(interp, node),
        Prim::Memberp => data::memberp(interp, node),
        Prim::Substringp => data::substringp(interp, node),
        Prim::Numberp => data::numberp(interp, node),
        Prim::Vbarredp => data::vbarredp(interp, node),
        Prim::Count => data::count(interp, node),
        Prim::Ascii => data::ascii(interp, node),
        Prim::Rawascii => data::rawascii(interp, node),
        Prim::Char => data::char_(interp, node),
        Prim::Member => data::member(interp, node),
        Prim::Lowercase => data::lowercase(interp, node),
        Prim::Uppercase => data::uppercase(interp, node),
        Prim::Standout => data::standout(interp, node),
        Prim::Parse => data::parse(interp, node),
        Prim::Runparse => data::runparse_prim(interp, node),
        // arithmetic
        Prim::Sum => arith::sum(interp, node),
        Prim::Difference => arith::difference(interp, node),
        Prim::Minus => arith::minus(interp, node),
        Prim::Product => arith::product(interp, node),
        Prim::Quotient => arith::quotient(interp, node),
        Prim::Remainder => arith::remainder(interp, node),
        Prim::Modulo => arith::modulo(interp, node),
        Prim::Int => arith::int(interp, node),
        Prim::Round => arith::round(interp, node),
        Prim::Power => arith::power(interp, node),
        Prim::Sqrt => arith::sqrt(interp, node),
        Prim::Exp => arith::exp(interp, node),
        Prim::Log10 => arith::log10(interp, node),
        Prim::Ln => arith::ln(interp, node),
        Prim::Sin => arith::sin(interp, node),
        Prim::Radsin => arith::radsin(interp, node),
        Prim::Cos => arith::cos(interp, node),
        Prim::Radcos => arith::radcos(interp, node),
        Prim::Arctan => arith::arctan(interp, node),
        Prim::Radarctan => arith::radarctan(interp, node),
        Prim::Random => arith::random(interp, node),
        Prim::Rerandom => arith::rerandom(interp, node),
        Prim::Form => arith::form(interp, node),
        Prim::Bitand => arith::bitand(interp, node),
        Prim::Bitor => arith::bitor(interp, node),
        Prim::Bitxor => arith::bitxor(interp, node),
        Prim::Bitnot => arith::bitnot(interp, node),
        Prim::Ashift => arith::ashift(interp, node),
        Prim::Lshift => arith::lshift(interp, node),
        Prim::And => arith::and(interp, node),
        Prim::Or => arith::or(interp, node),
        Prim::Not => arith::not(interp, node),
        Prim::Equalp => arith::equalp(interp, node),
        Prim::Notequalp => arith::notequalp(interp, node),
        Prim::Lessp => arith::lessp(interp, node),
        Prim::Greaterp => arith::greaterp(interp, node),
        Prim::Lessequalp => arith::lessequalp(interp, node),
        Prim::Greaterequalp => arith::greaterequalp(interp, node),
        // console and streams
        Prim::Print => comm::print(interp, node),
        Prim::Show => comm::show(interp, node),
        Prim::Type => comm::type_(interp, node),
        Prim::Readlist => comm::readlist(interp, node),
        Prim::Readword => comm::readword(interp, node),
        Prim::Readrawline => comm::readrawline(interp, node),
        Prim::Readchar => comm::readchar(interp, node),
        Prim::Readchars => comm::readchars(interp, node),
        Prim::Setprefix => comm::setprefix(interp, node),
        Prim::Prefix => comm::prefix(interp, node),
        Prim::Openread => comm::open(interp, node, crate::io::OpenMode::Read),
        Prim::Openwrite => comm::open(interp, node, crate::io::OpenMode::Write),
        Prim::Openappend => comm::open(interp, node, crate::io::OpenMode::Append),
        Prim::Openupdate => comm::open(interp, node, crate::io::OpenMode::Update),
        Prim::Allopen => comm::allopen(interp, node),
        Prim::Setread => comm::setread(interp, node),
        Prim::Setwrite => comm::setwrite(interp, node),
        Prim::Reader => comm::reader(interp, node),
        Prim::Writer => comm::writer(interp, node),
        Prim::Readpos => comm::readpos(interp, node),
        Prim::Writepos => comm::writepos(interp, node),
        Prim::Setreadpos => comm::setreadpos(interp, node),
        Prim::Setwritepos => comm::setwritepos(interp, node),
        Prim::Close => comm::close(interp, node),
        Prim::Closeall => comm::closeall(interp, node),
        Prim::Erasefile => comm::erasefile(interp, node),
        Prim::Dribble => comm::dribble(interp, node),
        Prim::Nodribble => comm::nodribble(interp, node),
        Prim::Eofp => comm::eofp(interp, node),
        Prim::Keyp => comm::keyp(interp, node),
        Prim::Cleartext => comm::cleartext(interp, node),
        Prim::Setcursor => comm::setcursor(interp, node),
        Prim::Cursor => comm::cursor(interp, node),
        Prim::Settextcolor => comm::settextcolor(interp, node),
        Prim::Font => comm::font(interp, node),
        Prim::Setfont => comm::setfont(interp, node),
        Prim::Settextsize => comm::settextsize(interp, node),
        Prim::Textsize => comm::textsize(interp, node),
        Prim::Allfonts => comm::allfonts(interp, node),
        Prim::Cursorinsert => comm::cursorinsert(interp, node),
        Prim::Cursoroverwrite => comm::cursoroverwrite(interp, node),
        Prim::Cursormode => comm::cursormode(interp, node),
        Prim::Wait => comm::wait(interp, node),
        // control
        Prim::Run => control::run(interp, node),
        Prim::Runresult => control::runresult(interp, node),
        Prim::Repeat => control::repeat(interp, node),
        Prim::Forever => control::forever(interp, node),
        Prim::Repcount => control::repcount(interp, node),
        Prim::If => control::if_(interp, node),
        Prim::Ifelse => control::ifelse(interp, node),
        Prim::Test => control::test(interp, node),
        Prim::Iftrue => control::iftrue(interp, node),
        Prim::Iffalse => control::iffalse(interp, node),
        Prim::Stop => control::stop(interp, node),
        Prim::Output => control::output(interp, node),
        Prim::Maybeoutput => control::maybeoutput(interp, node),
        Prim::Catch => control::catch(interp, node),
        Prim::Throw => control::throw(interp, node),
        Prim::Error => control::error(interp, node),
        Prim::Pause => control::pause(interp, node),
        Prim::Continue => control::continue_(interp, node),
        Prim::Bye => control::bye(interp, node),
        Prim::Tag => control::tag(interp, node),
        Prim::Goto => control::goto(interp, node),
        Prim::Apply => control::apply(interp, node),
        Prim::NamedSlot => control::named_slot(interp, node),
        Prim::Ignore => control::ignore(interp, node),
        Prim::To => interp.input_procedure(node, false),
        Prim::Macro => interp.input_procedure(node, true),
        Prim::Macrop => control::macrop(interp, node),
        Prim::End => control::end(interp, node),
        // workspace
        Prim::Make => wksp::make(interp, node),
        Prim::Local => wksp::local(interp, node),
        Prim::Localmake => wksp::localmake(interp, node),
        Prim::Global => wksp::global(interp, node),
        Prim::Thing => wksp::thing(interp, node),
        Prim::Procedurep => wksp::procedurep(interp, node),
        Prim::Primitivep => wksp::primitivep(interp, node),
        Prim::Definedp => wksp::definedp(interp, node),
        Prim::Namep => wksp::namep(interp, node),
        Prim::Plistp => wksp::plistp(interp, node),
        Prim::Contents => wksp::contents(interp, node),
        Prim::Buried => wksp::buried(interp, node),
        Prim::Traced => wksp::traced(interp, node),
        Prim::Stepped => wksp::stepped(interp, node),
        Prim::Procedures => wksp::procedures(interp, node),
        Prim::Primitives => wksp::primitives(interp, node),
        Prim::Names => wksp::names(interp, node),
        Prim::Plists => wksp::plists(interp, node),
        Prim::Arity => wksp::arity(interp, node),
        Prim::Printout => wksp::printout(interp, node),
        Prim::Pot => wksp::pot(interp, node),
        Prim::Erase => wksp::erase(interp, node),
        Prim::Ern => wksp::ern(interp, node),
        Prim::Erall => wksp::erall(interp, node),
        Prim::Erps => wksp::erps(interp, node),
        Prim::Erns => wksp::erns(interp, node),
        Prim::Erpls => wksp::erpls(interp, node),
        Prim::Bury => wksp::bury(interp, node),
        Prim::Unbury => wksp::unbury(interp, node),
        Prim::Buriedp => wksp::buriedp(interp, node),
        Prim::TracePrim => wksp::trace(interp, node),
        Prim::Untrace => wksp::untrace(interp, node),
        Prim::Tracedp => wksp::tracedp(interp, node),
        Prim::StepPrim => wksp::step(interp, node),
        Prim::Unstep => wksp::unstep(interp, node),
        Prim::Steppedp => wksp::steppedp(interp, node),
        Prim::Text => wksp::text(interp, node),
        Prim::Fulltext => wksp::fulltext(interp, node),
        Prim::Define => wksp::define(interp, node),
        Prim::Copydef => wksp::copydef(interp, node),
        Prim::Help => wksp::help(interp, node),
        Prim::Load => wksp::load(interp, node),
        Prim::Save => wksp::save(interp, node),
        // property lists
        Prim::Pprop => plist_ops::pprop(interp, node),
        Prim::Gprop => plist_ops::gprop(interp, node),
        Prim::Remprop => plist_ops::remprop(interp, node),
        Prim::Plist => plist_ops::plist(interp, node),
        // turtle and screen
        Prim::Forward => turtle_ops::forward(interp, node),
        Prim::Back => turtle_ops::back(interp, node),
        Prim::Right => turtle_ops::right(interp, node),
        Prim::Left => turtle_ops::left(interp, node),
        Prim::Home => turtle_ops::home(interp, node),
        Prim::Setpos => turtle_ops::setpos(interp, node),
        Prim::Setxy => turtle_ops::setxy(interp, node),
        Prim::Setx => turtle_ops::setx(interp, node),
        Prim::Sety => turtle_ops::sety(interp, node),
        Prim::Setheading => turtle_ops::setheading(interp, node),
        Prim::Heading => turtle_ops::heading(interp, node),
        Prim::Pos => turtle_ops::pos(interp, node),
        Prim::Towards => turtle_ops::towards(interp, node),
        Prim::Arc => turtle_ops::arc(interp, node),
        Prim::Clearscreen => turtle_ops::clearscreen(interp, node),
        Prim::Clean => turtle_ops::clean(interp, node),
        Prim::Penup => turtle_ops::penup(interp, node),
        Prim::Pendown => turtle_ops::pendown(interp, node),
        Prim::Pendownp => turtle_ops::pendownp(interp, node),
        Prim::Showturtle => turtle_ops::showturtle(interp, node),
        Prim::Hideturtle => turtle_ops::hideturtle(interp, node),
        Prim::Shownp => turtle_ops::shownp(interp, node),
        Prim::Setpencolor => turtle_ops::setpencolor(interp, node),
        Prim::Pencolor => turtle_ops::pencolor(interp, node),
        Prim::Setpalette => turtle_ops::setpalette(interp, node),
        Prim::Palette => turtle_ops::palette(interp, node),
        Prim::Setpensize => turtle_ops::setpensize(interp, node),
        Prim::Pensize => turtle_ops::pensize(interp, node),
        Prim::Penpaint => turtle_ops::penpaint(interp, node),
        Prim::Penerase => turtle_ops::penerase(interp, node),
        Prim::Penreverse => turtle_ops::penreverse(interp, node),
        Prim::Penmode => turtle_ops::penmode(interp, node),
        Prim::Setbackground => turtle_ops::setbackground(interp, node),
        Prim::Background => turtle_ops::background(interp, node),
        Prim::Wrap => turtle_ops::wrap(interp, node),
        Prim::Fence => turtle_ops::fence(interp, node),
        Prim::Window => turtle_ops::window(interp, node),
        Prim::Turtlemode => turtle_ops::turtlemode(interp, node),
        Prim::Label => turtle_ops::label(interp, node),
        Prim::Setlabelheight => turtle_ops::setlabelheight(interp, node),
        Prim::Labelheight => turtle_ops::labelheight(interp, node),
        Prim::Textscreen => turtle_ops::textscreen(interp, node),
        Prim::Fullscreen => turtle_ops::fullscreen(interp, node),
        Prim::Splitscreen => turtle_ops::splitscreen(interp, node),
        Prim::Screenmode => turtle_ops::screenmode(interp, node),
        Prim::Filled => turtle_ops::filled(interp, node),
        Prim::Setbounds => turtle_ops::setbounds(interp, node),
        Prim::Bounds => turtle_ops::bounds(interp, node),
        Prim::Mousepos => turtle_ops::mousepos(interp, node),
        Prim::Clickpos => turtle_ops::clickpos(interp, node),
        Prim::Buttonp => turtle_ops::buttonp(interp, node),
        Prim::Button => turtle_ops::button(interp, node),
        Prim::Savepict => turtle_ops::savepict(interp, node),
        Prim::Setscrunch => turtle_ops::setscrunch(interp, node),
        Prim::Scrunch => turtle_ops::scrunch(interp, node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for spec in TABLE {
            assert!(seen.insert(spec.name), "duplicate primitive name {}", spec.name);
        }
    }

    #[test]
    fn table_arities_are_consistent() {
        for spec in TABLE {
            if spec.min >= 0 && spec.default >= 0 {
                assert!(spec.min <= spec.default, "min > default for {}", spec.name);
            }
            if spec.default >= 0 && spec.max >= 0 {
                assert!(spec.default <= spec.max, "default > max for {}", spec.name);
            }
        }
    }
}
