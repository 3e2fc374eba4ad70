use std::rc::Rc;

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::{
    datum::{Datum, source_line},
    primitives::{Prim, TABLE},
    signal::{LogoError, RunResult},
    types::{List, ListBuilder, Word},
    workspace::Workspace,
};

/// Arity triple for a primitive. `max == -1` means unbounded; `default < 0`
/// marks a special form that consumes tokens to the end of the line;
/// `min < 0` makes the tree builder collect raw tokens instead of parsed
/// expressions.
#[derive(Debug, Clone, Copy)]
pub struct PrimEntry {
    pub prim: Prim,
    pub min: i32,
    pub default: i32,
    pub max: i32,
}

/// A user-defined procedure or macro.
#[derive(Debug)]
pub struct Procedure {
    pub required_inputs: Vec<String>,
    pub optional_inputs: Vec<String>,
    /// Default expression list per optional input, evaluated in the new
    /// frame when the caller did not supply the argument.
    pub optional_defaults: Vec<List>,
    pub rest_input: Option<String>,
    pub min_params: i32,
    pub default_params: i32,
    pub max_params: i32,
    /// The instruction body, one list per line.
    pub lines: Vec<List>,
    /// GOTO jump table: tag key → line index.
    pub tag_to_line: AHashMap<String, usize>,
    pub is_macro: bool,
    /// Raw source lines preserved for FULLTEXT, or nothing when the
    /// procedure was built by DEFINE.
    pub source_text: Datum,
}

/// What a command name resolves to.
#[derive(Debug, Clone)]
pub enum CommandEntry {
    Prim(PrimEntry),
    User(Rc<Procedure>),
}

impl CommandEntry {
    /// The (min, default, max) arity triple the tree builder consumes.
    #[must_use]
    pub fn arity(&self) -> (i32, i32, i32) {
        match self {
            Self::Prim(e) => (e.min, e.default, e.max),
            Self::User(p) => (p.min_params, p.default_params, p.max_params),
        }
    }
}

/// The procedure registry: the primitive table, user definitions, aliases
/// made by COPYDEF, and the generation counter that invalidates cached ASTs.
pub struct Procedures {
    primitives: IndexMap<String, PrimEntry>,
    alt_names: AHashMap<String, PrimEntry>,
    user: IndexMap<String, Rc<Procedure>>,
    generation: u64,
    pub ws: Workspace,
}

fn strip_param_marker(name: &str) -> &str {
    name.strip_prefix(':')
        .or_else(|| name.strip_prefix('"'))
        .unwrap_or(name)
}

impl Procedures {
    #[must_use]
    pub fn new() -> Self {
        let mut primitives = IndexMap::new();
        for spec in TABLE {
            primitives.insert(
                spec.name.to_string(),
                PrimEntry {
                    prim: spec.prim,
                    min: spec.min,
                    default: spec.default,
                    max: spec.max,
                },
            );
        }
        Self {
            primitives,
            alt_names: AHashMap::new(),
            user: IndexMap::new(),
            generation: 1,
            ws: Workspace::default(),
        }
    }

    /// The current registry generation. Bumped on every definition,
    /// redefinition, or erase; cached ASTs from older generations are
    /// invalid.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<CommandEntry> {
        if let Some(p) = self.user.get(key) {
            return Some(CommandEntry::User(p.clone()));
        }
        if let Some(e) = self.primitives.get(key) {
            return Some(CommandEntry::Prim(*e));
        }
        self.alt_names.get(key).map(|e| CommandEntry::Prim(*e))
    }

    #[must_use]
    pub fn is_primitive(&self, key: &str) -> bool {
        self.primitives.contains_key(key) || self.alt_names.contains_key(key)
    }

    #[must_use]
    pub fn is_procedure(&self, key: &str) -> bool {
        self.user.contains_key(key)
    }

    #[must_use]
    pub fn is_defined(&self, key: &str) -> bool {
        self.is_procedure(key) || self.is_primitive(key)
    }

    #[must_use]
    pub fn is_macro(&self, key: &str) -> bool {
        self.user.get(key).is_some_and(|p| p.is_macro)
    }

    #[must_use]
    pub fn get_user(&self, key: &str) -> Option<Rc<Procedure>> {
        self.user.get(key).cloned()
    }

    /// Parses a procedure from its text form: the first element is the
    /// parameter spec line, the rest are instruction lines.
    ///
    /// Parameter spec grammar, per element:
    /// - a word `:foo` is a required parameter,
    /// - a list `[:foo expr…]` is an optional parameter with a default
    ///   expression,
    /// - a single-element list `[:foo]` is the rest parameter,
    /// - a trailing bare number sets the default arity.
    pub fn create_procedure(
        cmd: &Word,
        text: &List,
        source_text: Datum,
        is_macro: bool,
    ) -> RunResult<Procedure> {
        let Some(param_line) = text.head() else {
            return Err(LogoError::not_enough_inputs(cmd));
        };
        let Datum::List(param_line) = param_line else {
            return Err(LogoError::doesnt_like(cmd, &param_line));
        };

        let mut proc_ = Procedure {
            required_inputs: Vec::new(),
            optional_inputs: Vec::new(),
            optional_defaults: Vec::new(),
            rest_input: None,
            min_params: 0,
            default_params: 0,
            max_params: 0,
            lines: Vec::new(),
            tag_to_line: AHashMap::new(),
            is_macro,
            source_text,
        };

        let mut optional_defined = false;
        let mut rest_defined = false;
        let mut default_defined = false;

        for param in param_line.iter() {
            match &param {
                Datum::Word(w) => {
                    if let Some(n) = w.as_number() {
                        // trailing bare number: explicit default arity
                        if default_defined
                            || n != n.trunc()
                            || n < f64::from(proc_.min_params)
                            || (proc_.max_params >= 0 && n > f64::from(proc_.max_params))
                        {
                            return Err(LogoError::doesnt_like(cmd, &param));
                        }
                        proc_.default_params = n as i32;
                        default_defined = true;
                    } else {
                        if default_defined || rest_defined || optional_defined {
                            return Err(LogoError::doesnt_like(cmd, &param));
                        }
                        let name = strip_param_marker(w.key());
                        if name.is_empty() {
                            return Err(LogoError::doesnt_like(cmd, &param));
                        }
                        proc_.required_inputs.push(name.to_string());
                        proc_.default_params += 1;
                        proc_.min_params += 1;
                        proc_.max_params += 1;
                    }
                }
                Datum::List(l) => {
                    let count = l.count();
                    if count == 0 {
                        return Err(LogoError::doesnt_like(cmd, &param));
                    }
                    let first = l.head().unwrap_or(Datum::Nothing);
                    let Datum::Word(w) = &first else {
                        return Err(LogoError::doesnt_like(cmd, &first));
                    };
                    let name = strip_param_marker(w.key());
                    if name.is_empty() {
                        return Err(LogoError::doesnt_like(cmd, &first));
                    }
                    if count == 1 {
                        // rest parameter
                        if rest_defined || default_defined {
                            return Err(LogoError::doesnt_like(cmd, &param));
                        }
                        proc_.rest_input = Some(name.to_string());
                        rest_defined = true;
                        proc_.max_params = -1;
                    } else {
                        // optional parameter with default expression
                        if rest_defined || default_defined {
                            return Err(LogoError::doesnt_like(cmd, &param));
                        }
                        proc_.optional_inputs.push(name.to_string());
                        proc_.optional_defaults.push(l.butfirst());
                        optional_defined = true;
                        if proc_.max_params >= 0 {
                            proc_.max_params += 1;
                        }
                    }
                }
                other => return Err(LogoError::doesnt_like(cmd, other)),
            }
        }

        for line in text.butfirst().iter() {
            let Datum::List(line) = line else {
                return Err(LogoError::doesnt_like(cmd, &line));
            };
            record_tags(&line, proc_.lines.len(), &mut proc_.tag_to_line);
            proc_.lines.push(line);
        }

        Ok(proc_)
    }

    /// Installs a user procedure. Raises IS-PRIMITIVE when the name shadows
    /// a primitive.
    pub fn define(&mut self, name: &Word, proc_: Rc<Procedure>) -> RunResult<()> {
        if name.as_number().is_some() {
            return Err(LogoError::doesnt_like(name, &Datum::Word(name.clone())));
        }
        let key = name.key();
        if matches!(key.chars().next(), Some('"' | ':') | None) {
            return Err(LogoError::doesnt_like(name, &Datum::Word(name.clone())));
        }
        if self.is_primitive(key) {
            return Err(LogoError::is_primitive(name));
        }
        self.user.insert(key.to_string(), proc_);
        self.touch();
        Ok(())
    }

    /// COPYDEF: aliases `old` under `new`. A primitive alias keeps the
    /// primitive's arity; a user procedure is shared, not copied.
    pub fn copy_def(&mut self, new: &Word, old: &Word) -> RunResult<()> {
        if self.is_primitive(new.key()) {
            return Err(LogoError::is_primitive(new));
        }
        if let Some(p) = self.user.get(old.key()).cloned() {
            self.user.insert(new.key().to_string(), p);
        } else if let Some(e) = self.alt_names.get(old.key()).copied() {
            self.alt_names.insert(new.key().to_string(), e);
        } else if let Some(e) = self.primitives.get(old.key()).copied() {
            self.alt_names.insert(new.key().to_string(), e);
        } else {
            return Err(LogoError::no_how(old));
        }
        self.touch();
        Ok(())
    }

    pub fn erase(&mut self, name: &Word) -> RunResult<()> {
        if self.is_primitive(name.key()) {
            return Err(LogoError::is_primitive(name));
        }
        self.user.shift_remove(name.key());
        self.ws.forget(name.key());
        self.touch();
        Ok(())
    }

    /// Erases every unburied user procedure.
    pub fn erase_all(&mut self) {
        let buried: Vec<String> = self
            .user
            .keys()
            .filter(|name| self.ws.is_buried(name))
            .cloned()
            .collect();
        self.user.retain(|name, _| buried.contains(name));
        self.touch();
    }

    /// User procedure names on one side of the bury partition, in
    /// definition order.
    #[must_use]
    pub fn user_names(&self, buried: bool) -> Vec<String> {
        self.user
            .keys()
            .filter(|name| self.ws.is_buried(name) == buried)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn primitive_names(&self) -> Vec<String> {
        self.primitives.keys().cloned().collect()
    }

    fn user_or_no_how(&self, name: &Word) -> RunResult<Rc<Procedure>> {
        if self.is_primitive(name.key()) {
            return Err(LogoError::is_primitive(name));
        }
        self.get_user(name.key()).ok_or_else(|| LogoError::no_how(name))
    }

    /// TEXT: the parameter spec plus the instruction lines, as data.
    pub fn text(&self, name: &Word) -> RunResult<Datum> {
        let p = self.user_or_no_how(name)?;
        let mut params = ListBuilder::new();
        for r in &p.required_inputs {
            params.push(Datum::Word(Word::new(r.clone(), false)));
        }
        for (o, d) in p.optional_inputs.iter().zip(&p.optional_defaults) {
            params.push(Datum::List(List::cons(
                Datum::Word(Word::new(o.clone(), false)),
                d.clone(),
            )));
        }
        if let Some(rest) = &p.rest_input {
            params.push(Datum::List(List::from_vec(vec![Datum::Word(Word::new(
                rest.clone(),
                false,
            ))])));
        }
        if p.default_params != p.required_inputs.len() as i32 {
            params.push(Datum::Word(Word::from_number(f64::from(p.default_params))));
        }
        let mut out = ListBuilder::new();
        out.push(Datum::List(params.finish()));
        for line in &p.lines {
            out.push(Datum::List(line.clone()));
        }
        Ok(Datum::List(out.finish()))
    }

    /// FULLTEXT: the original source lines when they were captured, else a
    /// reconstruction from the stored body.
    pub fn full_text(&self, name: &Word) -> RunResult<Datum> {
        let p = self.user_or_no_how(name)?;
        if let Datum::List(src) = &p.source_text {
            if !src.is_empty() {
                return Ok(Datum::List(src.clone()));
            }
        }
        let mut out = ListBuilder::new();
        out.push(Datum::Word(Word::new(title_of(name, &p), false)));
        for line in &p.lines {
            out.push(Datum::Word(Word::new(source_line(line), false)));
        }
        out.push(Datum::Word(Word::new("end", false)));
        Ok(Datum::List(out.finish()))
    }

    /// TITLE: the definition's first line.
    pub fn title(&self, name: &Word) -> RunResult<String> {
        let p = self.user_or_no_how(name)?;
        Ok(title_of(name, &p))
    }

    /// ARITY: the [min default max] triple for any defined name.
    pub fn arity(&self, name: &Word) -> RunResult<Datum> {
        let (min, default, max) = self
            .lookup(name.key())
            .ok_or_else(|| LogoError::no_how(name))?
            .arity();
        Ok(Datum::List(List::from_vec(vec![
            Datum::Word(Word::from_number(f64::from(min))),
            Datum::Word(Word::from_number(f64::from(default))),
            Datum::Word(Word::from_number(f64::from(max))),
        ])))
    }
}

impl Default for Procedures {
    fn default() -> Self {
        Self::new()
    }
}

fn title_of(name: &Word, p: &Procedure) -> String {
    let mut out = String::from(if p.is_macro { ".macro " } else { "to " });
    out.push_str(name.print());
    for r in &p.required_inputs {
        out.push_str(&format!(" :{r}"));
    }
    for (o, d) in p.optional_inputs.iter().zip(&p.optional_defaults) {
        out.push_str(&format!(" [:{o} {}]", source_line(d)));
    }
    if let Some(rest) = &p.rest_input {
        out.push_str(&format!(" [:{rest}]"));
    }
    if p.default_params != p.required_inputs.len() as i32 {
        out.push_str(&format!(" {}", p.default_params));
    }
    out
}

/// Scans one body line for `TAG "name` pairs and records the line index.
fn record_tags(line: &List, index: usize, table: &mut AHashMap<String, usize>) {
    let mut iter = line.iter().peekable();
    while let Some(item) = iter.next() {
        let Datum::Word(w) = &item else { continue };
        if w.key() != "tag" {
            continue;
        }
        if let Some(Datum::Word(arg)) = iter.peek() {
            let key = arg.key();
            if let Some(tag) = key.strip_prefix('"') {
                if !tag.is_empty() {
                    table.insert(tag.to_string(), index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::tokenize_text;

    fn list_of(text: &str) -> List {
        match tokenize_text(text).unwrap() {
            Datum::List(l) => l,
            other => panic!("expected list, got {other}"),
        }
    }

    fn w(s: &str) -> Word {
        Word::new(s, false)
    }

    #[test]
    fn parses_required_optional_rest_and_default() {
        let text = list_of("[:a :b [:c 5] [:rest] 2] [print :a]");
        let p = Procedures::create_procedure(&w("to"), &text, Datum::Nothing, false).unwrap();
        assert_eq!(p.required_inputs, ["a", "b"]);
        assert_eq!(p.optional_inputs, ["c"]);
        assert_eq!(p.rest_input.as_deref(), Some("rest"));
        assert_eq!((p.min_params, p.default_params, p.max_params), (2, 2, -1));
        assert_eq!(p.lines.len(), 1);
    }

    #[test]
    fn required_after_optional_is_rejected() {
        let text = list_of("[[:opt 1] :req] [print 1]");
        assert!(Procedures::create_procedure(&w("to"), &text, Datum::Nothing, false).is_err());
    }

    #[test]
    fn records_goto_tags_by_line() {
        let text = list_of("[] [tag \"top print 1] [print 2] [tag \"bottom]");
        let p = Procedures::create_procedure(&w("to"), &text, Datum::Nothing, false).unwrap();
        assert_eq!(p.tag_to_line.get("top"), Some(&0));
        assert_eq!(p.tag_to_line.get("bottom"), Some(&2));
    }

    #[test]
    fn define_rejects_primitive_names() {
        let mut procs = Procedures::new();
        let text = list_of("[] [print 1]");
        let p = Rc::new(Procedures::create_procedure(&w("to"), &text, Datum::Nothing, false).unwrap());
        assert!(procs.define(&w("print"), p.clone()).is_err());
        assert!(procs.define(&w("myproc"), p).is_ok());
        assert!(procs.is_procedure("myproc"));
    }

    #[test]
    fn generation_bumps_on_every_mutation() {
        let mut procs = Procedures::new();
        let g0 = procs.generation();
        let text = list_of("[] [print 1]");
        let p = Rc::new(Procedures::create_procedure(&w("to"), &text, Datum::Nothing, false).unwrap());
        procs.define(&w("f"), p).unwrap();
        let g1 = procs.generation();
        assert!(g1 > g0);
        procs.erase(&w("f")).unwrap();
        assert!(procs.generation() > g1);
    }

    #[test]
    fn copydef_aliases_primitives() {
        let mut procs = Procedures::new();
        procs.copy_def(&w("say"), &w("print")).unwrap();
        assert!(matches!(procs.lookup("say"), Some(CommandEntry::Prim(_))));
    }

    #[test]
    fn title_reconstructs_the_definition_line() {
        let mut procs = Procedures::new();
        let text = list_of("[:x [:y 5]] [output :x]");
        let p = Rc::new(Procedures::create_procedure(&w("to"), &text, Datum::Nothing, false).unwrap());
        procs.define(&w("f"), p).unwrap();
        assert_eq!(procs.title(&w("f")).unwrap(), "to f :x [:y 5]");
    }
}
