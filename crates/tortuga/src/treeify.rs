//! The tree builder: turns a run-parsed token list into AST root nodes.
//!
//! The grammar is precedence-climbing over the infix operators, with
//! parenthesised variadic calls, quoted-word and `:name` literals, numeric
//! literals, and fixed-arity command calls. Arity errors are raised here, at
//! build time, never at execute time.
//!
//! Built trees are memoized in a side table keyed by list identity together
//! with the procedure-registry generation; any mutation of the registry
//! invalidates the whole cache.

use std::rc::Rc;

use ahash::AHashMap;

use crate::{
    ast::{AstNode, Generator, ReturnKind},
    datum::Datum,
    primitives::Prim,
    procedures::{CommandEntry, Procedures},
    runparser::runparse_list,
    signal::{LogoError, RunResult},
    types::{List, ListIter, Word, word::decode_raw},
    vars::Vars,
};

const SPECIAL: &str = "+-()*%/<>=";

#[derive(Debug)]
struct CacheEntry {
    /// Strong handle on the source list: while the entry lives, the key
    /// address cannot be reused by another list.
    source: List,
    nodes: Rc<Vec<Rc<AstNode>>>,
}

/// Memoized ASTs keyed by list identity.
#[derive(Debug, Default)]
pub(crate) struct AstCache {
    generation: u64,
    entries: AHashMap<usize, CacheEntry>,
}

/// Builds (or fetches from cache) the AST root nodes for an instruction
/// list.
pub(crate) fn ast_from_list(
    cache: &mut AstCache,
    procs: &Procedures,
    vars: &Vars,
    list: &List,
) -> RunResult<Rc<Vec<Rc<AstNode>>>> {
    if cache.generation != procs.generation() {
        cache.entries.clear();
        cache.generation = procs.generation();
    }
    let key = list.ptr_id();
    if key != 0 {
        if let Some(entry) = cache.entries.get(&key) {
            if entry.source.ptr_eq(list) {
                return Ok(entry.nodes.clone());
            }
        }
    }

    let runparsed = runparse_list(list);
    let mut builder = Treeifier {
        procs,
        vars,
        tokens: runparsed.iter(),
        current: None,
    };
    builder.advance();
    let mut nodes = Vec::new();
    while builder.current.is_some() {
        match builder.root_exp() {
            Ok(Some(node)) => nodes.push(node),
            Ok(None) => break,
            Err(e) => {
                cache.entries.remove(&key);
                return Err(e);
            }
        }
    }
    // A trailing tag needs an instruction to land on.
    if nodes.last().is_some_and(|n| n.is_tag()) {
        nodes.push(Rc::new(AstNode::new(
            Word::new("noop", false),
            Generator::Noop,
            ReturnKind::Nothing,
        )));
    }
    let nodes = Rc::new(nodes);
    if key != 0 {
        cache.entries.insert(
            key,
            CacheEntry {
                source: list.clone(),
                nodes: nodes.clone(),
            },
        );
    }
    Ok(nodes)
}

fn allow_get_set(vars: &Vars) -> bool {
    matches!(
        vars.value_for("allowgetset"),
        Some(Datum::Word(w)) if w.as_bool() == Some(true)
    )
}

struct Treeifier<'a> {
    procs: &'a Procedures,
    vars: &'a Vars,
    tokens: ListIter,
    current: Option<Datum>,
}

impl Treeifier<'_> {
    fn advance(&mut self) {
        self.current = self.tokens.next();
    }

    /// The current token as a word matching one of `ops`, by print form.
    fn current_op(&self, ops: &[&str]) -> Option<Word> {
        match &self.current {
            Some(Datum::Word(w)) if ops.contains(&w.print()) => Some(w.clone()),
            _ => None,
        }
    }

    fn binary(
        &mut self,
        op: &Word,
        prim: Prim,
        returns: ReturnKind,
        left: Option<Rc<AstNode>>,
        right: Option<Rc<AstNode>>,
    ) -> RunResult<Rc<AstNode>> {
        let (Some(left), Some(right)) = (left, right) else {
            return Err(LogoError::not_enough_inputs(op));
        };
        let mut node = AstNode::new(op.clone(), Generator::Prim(prim), returns);
        node.add_child(Datum::Ast(left));
        node.add_child(Datum::Ast(right));
        Ok(Rc::new(node))
    }

    /// root := expr (postfix STOP wraps the expression so the line still has
    /// a single root).
    fn root_exp(&mut self) -> RunResult<Option<Rc<AstNode>>> {
        let node = self.exp()?;
        if let (Some(inner), Some(op)) = (&node, self.current_stop_word()) {
            let mut stop = AstNode::new(op, Generator::Prim(Prim::Stop), ReturnKind::Nothing);
            stop.add_child(Datum::Ast(inner.clone()));
            self.advance();
            return Ok(Some(Rc::new(stop)));
        }
        Ok(node)
    }

    fn current_stop_word(&self) -> Option<Word> {
        match &self.current {
            Some(Datum::Word(w)) if w.key() == "stop" => Some(w.clone()),
            _ => None,
        }
    }

    /// expr := sum ((= | <> | < | > | <= | >=) sum)*
    fn exp(&mut self) -> RunResult<Option<Rc<AstNode>>> {
        let mut left = self.sum_exp()?;
        while let Some(op) = self.current_op(&["=", "<>", "<", ">", "<=", ">="]) {
            self.advance();
            let right = self.sum_exp()?;
            let prim = match op.print() {
                "=" => Prim::Equalp,
                "<>" => Prim::Notequalp,
                "<" => Prim::Lessp,
                ">" => Prim::Greaterp,
                "<=" => Prim::Lessequalp,
                _ => Prim::Greaterequalp,
            };
            left = Some(self.binary(&op, prim, ReturnKind::Bool, left, right)?);
        }
        Ok(left)
    }

    /// sum := mul ((+ | -) mul)*
    fn sum_exp(&mut self) -> RunResult<Option<Rc<AstNode>>> {
        let mut left = self.mul_exp()?;
        while let Some(op) = self.current_op(&["+", "-"]) {
            self.advance();
            let right = self.mul_exp()?;
            let prim = if op.print() == "+" {
                Prim::Sum
            } else {
                Prim::Difference
            };
            left = Some(self.binary(&op, prim, ReturnKind::Real, left, right)?);
        }
        Ok(left)
    }

    /// mul := minus ((* | / | %) minus)*
    fn mul_exp(&mut self) -> RunResult<Option<Rc<AstNode>>> {
        let mut left = self.minus_exp()?;
        while let Some(op) = self.current_op(&["*", "/", "%"]) {
            self.advance();
            let right = self.minus_exp()?;
            let prim = match op.print() {
                "*" => Prim::Product,
                "/" => Prim::Quotient,
                _ => Prim::Remainder,
            };
            left = Some(self.binary(&op, prim, ReturnKind::Real, left, right)?);
        }
        Ok(left)
    }

    /// minus := term (-- term)*  — the run-parser's unary-minus rewrite.
    fn minus_exp(&mut self) -> RunResult<Option<Rc<AstNode>>> {
        let mut left = self.term()?;
        while let Some(op) = self.current_op(&["--"]) {
            self.advance();
            let right = self.term()?;
            left = Some(self.binary(&op, Prim::Difference, ReturnKind::Real, left, right)?);
        }
        Ok(left)
    }

    fn literal(&mut self, name: &str, value: Datum) -> Rc<AstNode> {
        let mut node = AstNode::new(
            Word::new(name, false),
            Generator::Literal,
            ReturnKind::Datum,
        );
        node.add_child(value);
        self.advance();
        Rc::new(node)
    }

    fn term(&mut self) -> RunResult<Option<Rc<AstNode>>> {
        let Some(current) = self.current.clone() else {
            return Ok(None);
        };
        match current {
            Datum::List(_) => Ok(Some(self.literal("list", current))),
            Datum::Array(_) => Ok(Some(self.literal("array", current))),
            Datum::Word(w) => {
                if w.print() == "(" {
                    return self.paren_exp();
                }
                let raw = w.raw();
                match raw.chars().next() {
                    Some('"') => {
                        let content = &raw[1..];
                        let name = if w.is_forever_special() {
                            content.to_string()
                        } else {
                            decode_raw(content)
                        };
                        Ok(Some(self.literal(
                            "quoted",
                            Datum::Word(Word::new(name, w.is_forever_special())),
                        )))
                    }
                    Some(':') => {
                        let name = decode_raw(&raw[1..]);
                        let mut node = AstNode::new(
                            Word::new("valueof", false),
                            Generator::ValueOf,
                            ReturnKind::Datum,
                        );
                        node.add_child(Datum::Word(Word::new(name, false)));
                        self.advance();
                        Ok(Some(Rc::new(node)))
                    }
                    _ => match w.as_number() {
                        Some(n) => {
                            Ok(Some(self.literal("number", Datum::Word(Word::from_number(n)))))
                        }
                        None => self.command(false),
                    },
                }
            }
            other => Ok(Some(self.literal("literal", other))),
        }
    }

    /// `( … )`: a variadic call when the first token looks like a command
    /// name, otherwise a parenthesised expression.
    fn paren_exp(&mut self) -> RunResult<Option<Rc<AstNode>>> {
        self.advance();
        let is_command = match &self.current {
            Some(Datum::Word(w)) => {
                let key = w.key();
                match key.chars().next() {
                    Some(c) => c != '"' && c != ':' && !c.is_ascii_digit() && !SPECIAL.contains(c),
                    None => false,
                }
            }
            _ => false,
        };
        let result = if is_command {
            self.command(true)?
        } else {
            self.exp()?
        };
        match &self.current {
            Some(Datum::Word(w)) if w.print() == ")" => {}
            _ => return Err(LogoError::paren_not_found()),
        }
        self.advance();
        Ok(result)
    }

    /// A command call. Consumes `default` expressions without parens,
    /// expressions until `)` with parens, and until end of line for special
    /// forms (`default < 0`). Commands with `min < 0` collect raw tokens
    /// because their arguments are names, not values.
    fn command(&mut self, is_vararg: bool) -> RunResult<Option<Rc<AstNode>>> {
        let Some(Datum::Word(cmd)) = self.current.clone() else {
            return Ok(None);
        };
        if cmd.print() == ")" {
            return Err(LogoError::unexpected_close_paren());
        }
        let (mut node, min, default, max) = self.resolve_command(&cmd)?;
        self.advance();

        let mut count: i32 = 0;
        if is_vararg {
            loop {
                match &self.current {
                    None => break,
                    Some(Datum::Word(w)) if w.print() == ")" => break,
                    _ => {}
                }
                let child = if min < 0 {
                    let raw = self.current.clone().unwrap_or(Datum::Nothing);
                    self.advance();
                    raw
                } else {
                    match self.exp()? {
                        Some(e) => Datum::Ast(e),
                        None => break,
                    }
                };
                node.add_child(child);
                count += 1;
            }
        } else if default < 0 {
            // special form: everything to the end of the line
            while self.current.is_some() {
                let child = if min < 0 {
                    let raw = self.current.clone().unwrap_or(Datum::Nothing);
                    self.advance();
                    raw
                } else {
                    match self.exp()? {
                        Some(e) => Datum::Ast(e),
                        None => break,
                    }
                };
                node.add_child(child);
                count += 1;
            }
        } else {
            for _ in 0..default {
                let Some(e) = self.exp()? else {
                    return Err(LogoError::not_enough_inputs(&cmd));
                };
                node.add_child(Datum::Ast(e));
                count += 1;
            }
        }

        if min >= 0 && count < min {
            return Err(LogoError::not_enough_inputs(&node.name));
        }
        if max >= 0 && count > max {
            return Err(LogoError::too_many_inputs(&node.name));
        }
        Ok(Some(Rc::new(node)))
    }

    fn resolve_command(&self, cmd: &Word) -> RunResult<(AstNode, i32, i32, i32)> {
        let key = cmd.key();
        match self.procs.lookup(key) {
            Some(CommandEntry::User(p)) => {
                let generator = if p.is_macro {
                    Generator::Macro(p.clone())
                } else {
                    Generator::Proc(p.clone())
                };
                let arity = (p.min_params, p.default_params, p.max_params);
                Ok((
                    AstNode::new(cmd.clone(), generator, ReturnKind::Datum),
                    arity.0,
                    arity.1,
                    arity.2,
                ))
            }
            Some(CommandEntry::Prim(e)) => Ok((
                AstNode::new(cmd.clone(), Generator::Prim(e.prim), ReturnKind::Datum),
                e.min,
                e.default,
                e.max,
            )),
            None => {
                let gs = allow_get_set(self.vars);
                if gs && key.len() > 3 && key.starts_with("set") {
                    Ok((
                        AstNode::new(cmd.clone(), Generator::SetVar, ReturnKind::Nothing),
                        1,
                        1,
                        1,
                    ))
                } else if gs && self.vars.exists(key) {
                    Ok((
                        AstNode::new(cmd.clone(), Generator::GetVar, ReturnKind::Datum),
                        0,
                        0,
                        0,
                    ))
                } else {
                    Err(LogoError::no_how(cmd))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::tokenize_text;

    fn build(text: &str) -> RunResult<Rc<Vec<Rc<AstNode>>>> {
        let mut cache = AstCache::default();
        let procs = Procedures::new();
        let vars = Vars::new();
        let Datum::List(l) = tokenize_text(text).unwrap() else {
            panic!("expected list");
        };
        ast_from_list(&mut cache, &procs, &vars, &l)
    }

    #[test]
    fn fixed_arity_call_consumes_default_inputs() {
        let nodes = build("print sum 2 3").unwrap();
        assert_eq!(nodes.len(), 1);
        let print = &nodes[0];
        assert_eq!(print.name.key(), "print");
        assert_eq!(print.children.len(), 1);
    }

    #[test]
    fn infix_precedence_product_binds_tighter() {
        // print 2 + 3 * 4 must parse as 2 + (3 * 4)
        let nodes = build("print 2 + 3 * 4").unwrap();
        let Datum::Ast(plus) = &nodes[0].children[0] else {
            panic!()
        };
        assert_eq!(plus.name.print(), "+");
        let Datum::Ast(right) = &plus.children[1] else {
            panic!()
        };
        assert_eq!(right.name.print(), "*");
    }

    #[test]
    fn paren_call_is_variadic() {
        let nodes = build("print (sum 1 2 3 4)").unwrap();
        let Datum::Ast(sum) = &nodes[0].children[0] else {
            panic!()
        };
        assert_eq!(sum.name.key(), "sum");
        assert_eq!(sum.children.len(), 4);
    }

    #[test]
    fn missing_close_paren_is_an_error() {
        assert!(matches!(
            build("print (sum 1 2"),
            Err(crate::signal::Signal::Error(e))
                if e.code == crate::signal::ErrCode::ParenNotFound
        ));
    }

    #[test]
    fn arity_errors_are_raised_at_build_time() {
        assert!(matches!(
            build("print sum 1"),
            Err(crate::signal::Signal::Error(e))
                if e.code == crate::signal::ErrCode::NotEnoughInputs
        ));
        assert!(matches!(
            build("(quotient 1 2 3)"),
            Err(crate::signal::Signal::Error(e))
                if e.code == crate::signal::ErrCode::TooManyInputs
        ));
    }

    #[test]
    fn unknown_name_is_no_how() {
        assert!(matches!(
            build("frobnicate 1"),
            Err(crate::signal::Signal::Error(e))
                if e.code == crate::signal::ErrCode::NoHow
        ));
    }

    #[test]
    fn quoted_and_variable_terms() {
        let nodes = build("print \"hello").unwrap();
        let Datum::Ast(lit) = &nodes[0].children[0] else {
            panic!()
        };
        assert!(matches!(lit.generator, Generator::Literal));
        assert_eq!(lit.children[0].to_display_string(), "hello");

        let nodes = build("print :x").unwrap();
        let Datum::Ast(value_of) = &nodes[0].children[0] else {
            panic!()
        };
        assert!(matches!(value_of.generator, Generator::ValueOf));
    }

    #[test]
    fn cache_hits_until_registry_changes() {
        let mut cache = AstCache::default();
        let mut procs = Procedures::new();
        let vars = Vars::new();
        let Datum::List(l) = tokenize_text("print 1").unwrap() else {
            panic!()
        };
        let a = ast_from_list(&mut cache, &procs, &vars, &l).unwrap();
        let b = ast_from_list(&mut cache, &procs, &vars, &l).unwrap();
        assert!(Rc::ptr_eq(&a, &b), "second build must hit the cache");

        // registry mutation invalidates
        procs.copy_def(&Word::new("say", false), &Word::new("print", false)).unwrap();
        let c = ast_from_list(&mut cache, &procs, &vars, &l).unwrap();
        assert!(!Rc::ptr_eq(&a, &c), "generation bump must evict the cache");
    }

    #[test]
    fn trailing_tag_gets_a_noop_landing() {
        let nodes = build("tag \"top").unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].is_tag());
        assert!(matches!(nodes[1].generator, Generator::Noop));
    }
}
