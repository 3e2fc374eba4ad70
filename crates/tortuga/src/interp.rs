//! The evaluator: walks AST nodes, dispatches primitives, runs procedures
//! and macros, and threads the flow-control signals (OUTPUT, STOP, GOTO,
//! THROW/CATCH, PAUSE) back up the stack.
//!
//! All interpreter state lives in one `Interpreter` value owned by the entry
//! point; primitives receive it by reference.

use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    ast::{AstNode, Generator, ReturnKind},
    datum::{Datum, PrintOptions, show_datum, source_line},
    host::{Host, HostSignal, ScreenMode},
    io::IoSystem,
    library::{EmptyLibrary, HelpSource, LibrarySource},
    plists::PropertyLists,
    primitives,
    procedures::{Procedure, Procedures},
    reader::TextStream,
    runparser,
    signal::{ErrCode, ErrTag, LogoError, RunResult, Signal},
    treeify::{AstCache, ast_from_list},
    turtle::Turtle,
    types::{Array, List, ListBuilder, Word},
    vars::Vars,
};

/// Procedure activation limit; exceeding it raises STACK-OVERFLOW.
pub(crate) const MAX_PROCEDURE_DEPTH: usize = 1000;

/// What one REPL iteration decided.
enum ReplStep {
    /// Keep reading.
    Continue,
    /// End of input.
    Eof,
    /// SYSTEM: terminate the process.
    Exit,
    /// CONTINUE inside a pause, carrying the resume value.
    Resume(Datum),
}

/// The interpreter: procedure registry, variable stack, property lists,
/// streams, turtle, and the evaluator that ties them together.
pub struct Interpreter {
    pub(crate) procedures: Procedures,
    pub(crate) vars: Vars,
    pub(crate) plists: PropertyLists,
    pub(crate) io: IoSystem,
    pub(crate) turtle: Turtle,
    pub(crate) cache: AstCache,
    pub(crate) library: Box<dyn LibrarySource>,
    pub(crate) help: Box<dyn HelpSource>,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) repcount: i64,
    pub(crate) pause_level: u32,
    pub(crate) running_macro: bool,
    pub(crate) depth: usize,
    pub(crate) screen_mode: ScreenMode,
    pub(crate) font_name: String,
    pub(crate) text_size: f64,
    pub(crate) overwrite_mode: bool,
    pub(crate) current_procedure: Datum,
    pub(crate) current_line: Datum,
    pub(crate) last_error: Option<Box<LogoError>>,
}

impl Interpreter {
    #[must_use]
    pub fn new(host: Box<dyn Host>) -> Self {
        let mut interp = Self {
            procedures: Procedures::new(),
            vars: Vars::new(),
            plists: PropertyLists::new(),
            io: IoSystem::new(host),
            turtle: Turtle::new(),
            cache: AstCache::default(),
            library: Box::new(EmptyLibrary),
            help: Box::new(EmptyLibrary),
            rng: ChaCha8Rng::from_entropy(),
            repcount: -1,
            pause_level: 0,
            running_macro: false,
            depth: 0,
            screen_mode: ScreenMode::Text,
            font_name: String::from("monospace"),
            text_size: 12.0,
            overwrite_mode: false,
            current_procedure: Datum::Nothing,
            current_line: Datum::Nothing,
            last_error: None,
        };
        interp.init_variables();
        interp
    }

    /// Replaces the standard-library source used to satisfy undefined names.
    #[must_use]
    pub fn with_library(mut self, library: Box<dyn LibrarySource>) -> Self {
        self.library = library;
        self
    }

    /// Replaces the HELP text source.
    #[must_use]
    pub fn with_help(mut self, help: Box<dyn HelpSource>) -> Self {
        self.help = help;
        self
    }

    fn init_variables(&mut self) {
        let system_vars: [(&str, Datum); 4] = [
            ("logoplatform", Datum::Word(Word::new(std::env::consts::OS, false))),
            (
                "logoversion",
                Datum::Word(Word::new(env!("CARGO_PKG_VERSION"), false)),
            ),
            ("allowgetset", Datum::Word(Word::new("true", false))),
            ("caseignoredp", Datum::Word(Word::new("true", false))),
        ];
        for (name, value) in system_vars {
            self.vars.set_value(name, value);
            self.vars.ws.bury(name);
        }
    }

    // --- system variable views ---

    pub(crate) fn case_ignored(&self) -> bool {
        match self.vars.value_for("caseignoredp") {
            Some(Datum::Word(w)) => w.as_bool().unwrap_or(true),
            _ => true,
        }
    }

    fn numeric_var(&self, name: &str, fallback: i64) -> i64 {
        match self.vars.value_for(name) {
            Some(Datum::Word(w)) => w.as_number().map_or(fallback, |n| n as i64),
            _ => fallback,
        }
    }

    pub(crate) fn print_options(&self) -> PrintOptions {
        let full = matches!(
            self.vars.value_for("fullprintp"),
            Some(Datum::Word(w)) if w.as_bool() == Some(true)
        );
        PrintOptions {
            full,
            depth: self.numeric_var("printdepthlimit", -1),
            width: self.numeric_var("printwidthlimit", -1),
        }
    }

    fn erract_set(&self) -> bool {
        match self.vars.value_for("erract") {
            None | Some(Datum::Nothing) => false,
            Some(Datum::Word(w)) => w.as_bool() != Some(false),
            Some(Datum::List(l)) => !l.is_empty(),
            Some(_) => true,
        }
    }

    pub(crate) fn in_procedure(&self) -> bool {
        !self.current_procedure.is_nothing()
    }

    // --- printing ---

    pub(crate) fn sys_print(&mut self, text: &str) {
        let _ = self.io.sys_print(text);
    }

    pub(crate) fn std_print(&mut self, text: &str) -> RunResult<()> {
        self.io.std_print(text)
    }

    // --- argument evaluation and validation ---

    /// Evaluates child `i`. A subexpression that outputs nothing raises
    /// DIDNT-OUTPUT; non-AST children (literals, raw tokens) pass through.
    pub(crate) fn arg(&mut self, node: &AstNode, i: usize) -> RunResult<Datum> {
        match node.children.get(i) {
            Some(Datum::Ast(child)) => {
                let child = child.clone();
                let value = self.eval_node(&child)?;
                if value.is_nothing() {
                    Err(LogoError::didnt_output(&child.name, &node.name))
                } else {
                    Ok(value)
                }
            }
            Some(other) => Ok(other.clone()),
            None => Err(LogoError::not_enough_inputs(&node.name)),
        }
    }

    /// Like `arg` but a nothing result is passed through (STOP's wrapped
    /// expression, .MAYBEOUTPUT).
    pub(crate) fn raw_arg(&mut self, node: &AstNode, i: usize) -> RunResult<Datum> {
        match node.children.get(i) {
            Some(Datum::Ast(child)) => {
                let child = child.clone();
                self.eval_node(&child)
            }
            Some(other) => Ok(other.clone()),
            None => Ok(Datum::Nothing),
        }
    }

    pub(crate) fn word_arg(&mut self, node: &AstNode, i: usize) -> RunResult<Word> {
        let value = self.arg(node, i)?;
        match value {
            Datum::Word(w) => Ok(w),
            other => Err(LogoError::doesnt_like(&node.name, &other)),
        }
    }

    pub(crate) fn list_arg(&mut self, node: &AstNode, i: usize) -> RunResult<List> {
        let value = self.arg(node, i)?;
        match value {
            Datum::List(l) => Ok(l),
            other => Err(LogoError::doesnt_like(&node.name, &other)),
        }
    }

    pub(crate) fn array_arg(&mut self, node: &AstNode, i: usize) -> RunResult<Array> {
        let value = self.arg(node, i)?;
        match value {
            Datum::Array(a) => Ok(a),
            other => Err(LogoError::doesnt_like(&node.name, &other)),
        }
    }

    pub(crate) fn num_arg(&mut self, node: &AstNode, i: usize) -> RunResult<f64> {
        let value = self.arg(node, i)?;
        match value.as_word().and_then(Word::as_number) {
            Some(n) => Ok(n),
            None => Err(LogoError::doesnt_like(&node.name, &value)),
        }
    }

    pub(crate) fn int_arg(&mut self, node: &AstNode, i: usize) -> RunResult<i64> {
        let value = self.arg(node, i)?;
        match value.as_word().and_then(Word::as_number) {
            Some(n) if n == n.trunc() => Ok(n as i64),
            _ => Err(LogoError::doesnt_like(&node.name, &value)),
        }
    }

    pub(crate) fn nonneg_int_arg(&mut self, node: &AstNode, i: usize) -> RunResult<i64> {
        let n = self.int_arg(node, i)?;
        if n < 0 {
            let value = Datum::Word(Word::from_number(n as f64));
            return Err(LogoError::doesnt_like(&node.name, &value));
        }
        Ok(n)
    }

    pub(crate) fn bool_arg(&mut self, node: &AstNode, i: usize) -> RunResult<bool> {
        let value = self.arg(node, i)?;
        match value.as_word().and_then(Word::as_bool) {
            Some(b) => Ok(b),
            None => Err(LogoError::doesnt_like(&node.name, &value)),
        }
    }

    pub(crate) fn eval_args(&mut self, node: &AstNode) -> RunResult<Vec<Datum>> {
        let mut args = Vec::with_capacity(node.children.len());
        for i in 0..node.children.len() {
            args.push(self.arg(node, i)?);
        }
        Ok(args)
    }

    // --- node evaluation ---

    pub(crate) fn eval_node(&mut self, node: &Rc<AstNode>) -> RunResult<Datum> {
        match &node.generator {
            Generator::Literal => Ok(node.children.first().cloned().unwrap_or(Datum::Nothing)),
            Generator::ValueOf => {
                let name = match node.children.first() {
                    Some(Datum::Word(w)) => w.clone(),
                    _ => return Ok(Datum::Nothing),
                };
                match self.vars.value_for(name.key()) {
                    Some(v) if !v.is_nothing() => Ok(v),
                    _ => self.recoverable_no_value(&name),
                }
            }
            Generator::GetVar => {
                let name = node.name.clone();
                match self.vars.value_for(name.key()) {
                    Some(v) if !v.is_nothing() => Ok(v),
                    _ => self.recoverable_no_value(&name),
                }
            }
            Generator::SetVar => {
                let value = self.arg(node, 0)?;
                let name = node.name.key()[3..].to_string();
                self.trace_assignment(&name, &value);
                self.vars.set_value(&name, value);
                Ok(Datum::Nothing)
            }
            Generator::Tag | Generator::Noop => Ok(Datum::Nothing),
            Generator::Prim(p) => primitives::dispatch(self, *p, node),
            Generator::Proc(p) => {
                let p = p.clone();
                let args = self.eval_args(node)?;
                self.apply_procedure(p, node, args)
            }
            Generator::Macro(p) => {
                let p = p.clone();
                let args = self.eval_args(node)?;
                self.run_macro(p, node.name.clone(), args)
            }
        }
    }

    pub(crate) fn trace_assignment(&mut self, name: &str, value: &Datum) {
        if self.vars.ws.is_traced(name) {
            let rendered = show_datum(value, &self.print_options());
            self.sys_print(&format!("Make \"{name} {rendered}\n"));
        }
    }

    /// NO-VALUE with ERRACT recovery: when ERRACT is set inside a procedure,
    /// pause and let the user CONTINUE with a substitute value.
    fn recoverable_no_value(&mut self, name: &Word) -> RunResult<Datum> {
        if self.erract_set() && self.in_procedure() {
            self.sys_print(&format!("{} has no value\n", name.print()));
            let value = self.pause()?;
            if value.is_nothing() {
                return Err(LogoError::signal_throw(ErrTag::Toplevel));
            }
            return Ok(value);
        }
        Err(LogoError::no_value(name))
    }

    // --- list execution ---

    /// Runs an instruction list (or word). `start_tag` skips to the named
    /// tag first, for GOTO resumption.
    pub(crate) fn run_list(&mut self, code: &Datum, start_tag: Option<&str>) -> RunResult<Datum> {
        self.interrupt_check()?;
        let list = match code {
            Datum::List(l) => l.clone(),
            Datum::Word(_) => runparser::runparse(code)?,
            other => {
                return Err(LogoError::doesnt_like(&Word::new("run", false), other));
            }
        };
        if list.is_empty() {
            return Ok(Datum::Nothing);
        }
        let nodes = self.nodes_for(&list)?;
        let mut found_tag = start_tag.is_none();
        let mut result = Datum::Nothing;
        let count = nodes.len();
        for (i, node) in nodes.iter().enumerate() {
            if !result.is_nothing() {
                return Err(LogoError::dont_say(&result));
            }
            if !found_tag {
                if let (Some(tag), Some(wanted)) = (node.tag_name(), start_tag) {
                    if tag.key() == wanted {
                        found_tag = true;
                    }
                }
                continue;
            }
            // A macro in tail position of macro output trampolines instead
            // of growing the stack.
            if self.running_macro && i + 1 == count {
                if let Generator::Macro(p) = &node.generator {
                    let procedure = p.clone();
                    let name = node.name.clone();
                    let args = self.eval_args(node)?;
                    return Err(Signal::Continuation {
                        procedure,
                        name,
                        args,
                    });
                }
            }
            result = self.eval_node(node)?;
        }
        Ok(result)
    }

    /// Builds the AST for a list, loading missing procedures from the
    /// library source before giving up with NO-HOW.
    fn nodes_for(&mut self, list: &List) -> RunResult<Rc<Vec<Rc<AstNode>>>> {
        let mut attempted: Option<String> = None;
        loop {
            match ast_from_list(&mut self.cache, &self.procedures, &self.vars, list) {
                Ok(nodes) => return Ok(nodes),
                Err(Signal::Error(e)) if e.code == ErrCode::NoHow => {
                    let name = match &e.output {
                        Datum::Word(w) => w.key().to_string(),
                        _ => return Err(Signal::Error(e)),
                    };
                    if attempted.as_deref() == Some(name.as_str()) {
                        return Err(Signal::Error(e));
                    }
                    let Some(source) = self.library.procedure_source(&name) else {
                        return Err(Signal::Error(e));
                    };
                    attempted = Some(name.clone());
                    self.execute_text(&source);
                    if !self.procedures.is_defined(&name) {
                        return Err(Signal::Error(e));
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    // --- procedure execution ---

    pub(crate) fn apply_procedure(
        &mut self,
        procedure: Rc<Procedure>,
        node: &Rc<AstNode>,
        args: Vec<Datum>,
    ) -> RunResult<Datum> {
        if self.depth >= MAX_PROCEDURE_DEPTH {
            return Err(LogoError::stack_overflow());
        }
        let traced = self.procedures.ws.is_traced(node.name.key());
        if traced {
            let opts = self.print_options();
            let mut line = format!("{}( {}", "  ".repeat(self.depth.min(20)), node.name.print());
            for a in &args {
                line.push(' ');
                line.push_str(&show_datum(a, &opts));
            }
            line.push_str(" )\n");
            self.sys_print(&line);
        }

        self.depth += 1;
        let saved_procedure =
            std::mem::replace(&mut self.current_procedure, Datum::Ast(node.clone()));
        let saved_line = self.current_line.clone();
        // the tail-macro flag applies to macro output, never to a body
        let was_macro = std::mem::replace(&mut self.running_macro, false);
        self.vars.push_frame(Datum::Ast(node.clone()));
        let result = self.procedure_body(&procedure, node, args);
        self.vars.pop_frame();
        self.running_macro = was_macro;
        self.current_procedure = saved_procedure;
        self.current_line = saved_line;
        self.depth -= 1;

        let outcome = match result {
            Ok(v) if v.is_nothing() => Ok(Datum::Nothing),
            Ok(v) => Err(LogoError::dont_say(&v)),
            Err(Signal::Output(v)) => Ok(v),
            Err(Signal::Stop) => Ok(Datum::Nothing),
            Err(e) => Err(e),
        };
        if traced {
            match &outcome {
                Ok(v) if v.is_nothing() => {
                    self.sys_print(&format!("{} stops\n", node.name.print()));
                }
                Ok(v) => {
                    let rendered = show_datum(v, &self.print_options());
                    self.sys_print(&format!("{} outputs {rendered}\n", node.name.print()));
                }
                Err(_) => {}
            }
        }
        outcome
    }

    fn make_parameter(&mut self, name: &str, value: Datum) {
        if self.vars.ws.is_stepped(name) {
            let context = match &self.current_procedure {
                Datum::Ast(n) => format!(" in {}", n.name.print()),
                _ => String::new(),
            };
            self.sys_print(&format!("{name} shadowed by local{context}\n"));
        }
        self.vars.set_local(name);
        self.vars.set_value(name, value);
    }

    fn procedure_body(
        &mut self,
        procedure: &Procedure,
        node: &Rc<AstNode>,
        args: Vec<Datum>,
    ) -> RunResult<Datum> {
        // bind required parameters positionally
        let mut supplied = std::collections::VecDeque::from(args);
        for name in &procedure.required_inputs {
            let Some(value) = supplied.pop_front() else {
                return Err(LogoError::not_enough_inputs(&node.name));
            };
            self.make_parameter(name, value);
        }
        // optional parameters: supplied value, or the default expression
        // evaluated in the new frame
        for (name, default) in procedure
            .optional_inputs
            .iter()
            .zip(&procedure.optional_defaults)
        {
            let value = match supplied.pop_front() {
                Some(v) => v,
                None => {
                    let v = self.run_list(&Datum::List(default.clone()), None)?;
                    if v.is_nothing() {
                        return Err(LogoError::bad_default(&Datum::List(default.clone())));
                    }
                    v
                }
            };
            self.make_parameter(name, value);
        }
        // the rest parameter collects everything left over
        let leftovers: Vec<Datum> = supplied.into_iter().collect();
        if let Some(rest) = &procedure.rest_input {
            self.make_parameter(rest, Datum::List(List::from_vec(leftovers)));
        } else if !leftovers.is_empty() {
            return Err(LogoError::too_many_inputs(&node.name));
        }

        let stepped = self.procedures.ws.is_stepped(node.name.key());
        let mut index = 0;
        let mut start_tag: Option<String> = None;
        while index < procedure.lines.len() {
            let line = procedure.lines[index].clone();
            self.current_line = Datum::List(line.clone());
            if stepped {
                let text = source_line(&line);
                self.sys_print(&text);
                self.io.sys_read_raw_line(" >>> ")?;
            }
            let tag = start_tag.take();
            match self.run_list(&Datum::List(line), tag.as_deref()) {
                Ok(v) if v.is_nothing() => index += 1,
                Ok(v) => return Err(LogoError::dont_say(&v)),
                Err(Signal::Goto(tag)) => match procedure.tag_to_line.get(tag.key()) {
                    Some(&target) => {
                        index = target;
                        start_tag = Some(tag.key().to_string());
                    }
                    None => {
                        return Err(LogoError::doesnt_like(
                            &Word::new("goto", false),
                            &Datum::Word(tag),
                        ));
                    }
                },
                Err(Signal::Error(mut e)) => {
                    if e.procedure.is_nothing() {
                        e.procedure = self.current_procedure.clone();
                        e.line = self.current_line.clone();
                    }
                    return Err(Signal::Error(e));
                }
                Err(other) => return Err(other),
            }
        }
        Ok(Datum::Nothing)
    }

    /// Runs a macro: the body executes like a procedure, then its output
    /// list is re-evaluated in the caller's frame. Tail-position macro calls
    /// come back as `Continuation` and loop here instead of recursing.
    pub(crate) fn run_macro(
        &mut self,
        mut procedure: Rc<Procedure>,
        mut name: Word,
        mut args: Vec<Datum>,
    ) -> RunResult<Datum> {
        let was_running = self.running_macro;
        self.running_macro = true;
        let result = loop {
            let mut call = AstNode::new(
                name.clone(),
                Generator::Macro(procedure.clone()),
                ReturnKind::Datum,
            );
            for a in &args {
                call.add_child(a.clone());
            }
            let call = Rc::new(call);
            let output = match self.apply_procedure(procedure.clone(), &call, args) {
                Ok(v) => v,
                Err(e) => break Err(e),
            };
            let Datum::List(out_list) = output else {
                break Err(LogoError::macro_returned(&output));
            };
            match self.run_list(&Datum::List(out_list), None) {
                Err(Signal::Continuation {
                    procedure: p,
                    name: n,
                    args: a,
                }) => {
                    procedure = p;
                    name = n;
                    args = a;
                }
                other => break other,
            }
        };
        self.running_macro = was_running;
        result
    }

    /// TO / .MACRO: reads body lines from the current system stream until
    /// END, then installs the procedure. The raw source is preserved for
    /// FULLTEXT.
    pub(crate) fn input_procedure(
        &mut self,
        node: &Rc<AstNode>,
        is_macro: bool,
    ) -> RunResult<Datum> {
        let to_word = node.name.clone();
        if self.in_procedure() {
            return Err(LogoError::to_in_proc(&to_word));
        }
        let Some(Datum::Word(name)) = node.children.first().cloned() else {
            return Err(LogoError::not_enough_inputs(&to_word));
        };
        if name.as_number().is_some() {
            return Err(LogoError::doesnt_like(&to_word, &Datum::Word(name)));
        }
        match name.key().chars().next() {
            None | Some('"' | ':' | '(' | ')') => {
                return Err(LogoError::doesnt_like(&to_word, &Datum::Word(name)));
            }
            Some(_) => {}
        }
        if self.procedures.is_procedure(name.key()) {
            return Err(LogoError::already_defined(&name));
        }
        if self.procedures.is_primitive(name.key()) {
            return Err(LogoError::is_primitive(&name));
        }

        let mut text = ListBuilder::new();
        text.push(Datum::List(List::from_vec(
            node.children.iter().skip(1).cloned().collect(),
        )));
        loop {
            match self.io.sys_read_body_line("> ")? {
                None => break,
                Some(Datum::List(line)) => {
                    if line.is_empty() {
                        continue;
                    }
                    if let Some(Datum::Word(first)) = line.head() {
                        if first.key() == "end" {
                            break;
                        }
                    }
                    text.push(Datum::List(line));
                }
                Some(_) => break,
            }
        }

        let source_lines = self.io.sys_history();
        let source_text = Datum::List(List::from_vec(
            source_lines
                .into_iter()
                .map(|l| Datum::Word(Word::new(l, false)))
                .collect(),
        ));
        let procedure =
            Procedures::create_procedure(&to_word, &text.finish(), source_text, is_macro)?;
        self.procedures.define(&name, Rc::new(procedure))?;
        self.sys_print(&format!("{} defined\n", name.print()));
        Ok(Datum::Nothing)
    }

    // --- interrupts, pause, REPL ---

    pub(crate) fn interrupt_check(&mut self) -> RunResult<()> {
        match self.io.host.latest_signal() {
            HostSignal::None => Ok(()),
            HostSignal::Toplevel => {
                if self.in_procedure() {
                    Err(LogoError::signal_throw(ErrTag::Toplevel))
                } else {
                    Ok(())
                }
            }
            HostSignal::Pause => {
                if self.in_procedure() {
                    self.pause().map(|_| ())
                } else {
                    Ok(())
                }
            }
            HostSignal::System => Err(LogoError::signal_throw(ErrTag::System)),
        }
    }

    /// PAUSE: a nested REPL in the current frame. CONTINUE supplies the
    /// return value.
    pub(crate) fn pause(&mut self) -> RunResult<Datum> {
        self.pause_level += 1;
        self.sys_print("Pausing...\n");
        let saved_line = self.current_line.clone();
        let result = self.pause_loop();
        self.current_line = saved_line;
        self.pause_level -= 1;
        result
    }

    fn pause_loop(&mut self) -> RunResult<Datum> {
        loop {
            match self.repl_step() {
                Ok(ReplStep::Continue) => {}
                Ok(ReplStep::Eof) => return Ok(Datum::Nothing),
                Ok(ReplStep::Exit) => return Err(LogoError::signal_throw(ErrTag::System)),
                Ok(ReplStep::Resume(value)) => return Ok(value),
                Err(signal) => return Err(signal),
            }
        }
    }

    fn print_error(&mut self, e: &LogoError) {
        let message = e.message.print().to_string();
        if message.is_empty() {
            return;
        }
        self.sys_print(&message);
        if let Datum::Ast(node) = &e.procedure {
            let name = node.name.print().to_string();
            self.sys_print(&format!(" in {name}"));
        }
        self.sys_print("\n");
        if let Datum::List(line) = &e.line {
            let text = source_line(line);
            self.sys_print(&format!("{text}\n"));
        }
    }

    /// One REPL iteration: read a line, build it, run it, report.
    fn repl_step(&mut self) -> Result<ReplStep, Signal> {
        let mut prompt = String::new();
        if let Datum::Ast(node) = &self.current_procedure {
            prompt.push_str(node.name.print());
        }
        prompt.push_str("? ");

        let line = match self.io.sys_read_list(&prompt, false) {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(ReplStep::Eof),
            Err(Signal::Error(e)) => {
                // reader errors (unmatched closers) report and re-prompt
                self.print_error(&e);
                return Ok(ReplStep::Continue);
            }
            Err(signal) => return Err(signal),
        };
        let Datum::List(l) = &line else {
            return Ok(ReplStep::Continue);
        };
        if l.is_empty() {
            return Ok(ReplStep::Continue);
        }

        match self.run_list(&line, None) {
            Ok(v) if v.is_nothing() => Ok(ReplStep::Continue),
            Ok(v) => {
                let Signal::Error(e) = LogoError::dont_say(&v) else {
                    return Ok(ReplStep::Continue);
                };
                self.print_error(&e);
                Ok(ReplStep::Continue)
            }
            Err(Signal::Pause(value)) => {
                if self.pause_level > 0 {
                    Ok(ReplStep::Resume(value))
                } else {
                    self.sys_print("Can only use CONTINUE inside PAUSE\n");
                    Ok(ReplStep::Continue)
                }
            }
            Err(Signal::Error(e)) => match e.tag.key() {
                "toplevel" => {
                    if self.pause_level > 0 {
                        return Err(Signal::Error(e));
                    }
                    self.sys_print("\n");
                    Ok(ReplStep::Continue)
                }
                "system" => {
                    self.sys_print("\n");
                    Ok(ReplStep::Exit)
                }
                "pause" => {
                    let _ = self.pause();
                    Ok(ReplStep::Continue)
                }
                _ => {
                    self.print_error(&e);
                    self.last_error = Some(e);
                    Ok(ReplStep::Continue)
                }
            },
            Err(_) => Ok(ReplStep::Continue),
        }
    }

    fn run_startup(&mut self) {
        if let Some(Datum::List(startup)) = self.vars.value_for("startup") {
            if !startup.is_empty() {
                if let Err(Signal::Error(e)) = self.run_list(&Datum::List(startup), None) {
                    self.print_error(&e);
                }
            }
        }
    }

    /// The interactive read-eval-print loop. Returns the process exit code.
    pub fn repl(&mut self) -> i32 {
        self.run_startup();
        loop {
            match self.repl_step() {
                Ok(ReplStep::Continue | ReplStep::Resume(_)) => {}
                Ok(ReplStep::Eof | ReplStep::Exit) => return 0,
                Err(_) => {}
            }
        }
    }

    /// Executes a text buffer as if its lines were typed at the REPL.
    /// Errors report to the console exactly as interactive ones do.
    pub fn execute_text(&mut self, text: &str) {
        self.io.push_system_read(TextStream::from_text(text));
        loop {
            match self.repl_step() {
                Ok(ReplStep::Eof | ReplStep::Exit) => break,
                Ok(_) => {}
                Err(_) => break,
            }
        }
        self.io.pop_system_read();
    }
}
