//! Data-structure primitives: constructors, selectors, mutators, predicates,
//! and queries over words, lists, and arrays.

use std::rc::Rc;

use super::truth;
use crate::{
    ast::AstNode,
    datum::{Datum, contains_or_is, datums_equal, identity_eq},
    interp::Interpreter,
    reader::tokenize_text,
    runparser,
    signal::{LogoError, RunResult},
    types::{Array, List, ListBuilder, Word, word::raw_to_char},
};

/// The selector family rejects empty inputs at validation time.
fn nonempty_word(node: &AstNode, w: &Word) -> RunResult<()> {
    if w.print().is_empty() {
        return Err(LogoError::not_enough_inputs(&node.name));
    }
    Ok(())
}

fn char_word(c: char) -> Datum {
    Datum::Word(Word::new(c.to_string(), false))
}

pub(super) fn word(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let mut result = Word::new("", false);
    for i in 0..node.children.len() {
        let part = interp.word_arg(node, i)?;
        result = result.concat(&part);
    }
    Ok(Datum::Word(result))
}

pub(super) fn list(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let mut out = ListBuilder::new();
    for i in 0..node.children.len() {
        out.push(interp.arg(node, i)?);
    }
    Ok(Datum::List(out.finish()))
}

pub(super) fn sentence(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let mut out = ListBuilder::new();
    for i in 0..node.children.len() {
        match interp.arg(node, i)? {
            Datum::List(l) => {
                for item in l.iter() {
                    out.push(item);
                }
            }
            other => out.push(other),
        }
    }
    Ok(Datum::List(out.finish()))
}

pub(super) fn fput(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let thing = interp.arg(node, 0)?;
    let target = interp.arg(node, 1)?;
    match target {
        Datum::List(l) => Ok(Datum::List(List::cons(thing, l))),
        Datum::Word(w) => match &thing {
            Datum::Word(t) if t.char_len() == 1 => Ok(Datum::Word(t.concat(&w))),
            other => Err(LogoError::doesnt_like(&node.name, other)),
        },
        other => Err(LogoError::doesnt_like(&node.name, &other)),
    }
}

pub(super) fn lput(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let thing = interp.arg(node, 0)?;
    let target = interp.arg(node, 1)?;
    match target {
        Datum::List(l) => {
            let mut out = ListBuilder::new();
            for item in l.iter() {
                out.push(item);
            }
            out.push(thing);
            Ok(Datum::List(out.finish()))
        }
        Datum::Word(w) => match &thing {
            Datum::Word(t) if t.char_len() == 1 => Ok(Datum::Word(w.concat(t))),
            other => Err(LogoError::doesnt_like(&node.name, other)),
        },
        other => Err(LogoError::doesnt_like(&node.name, &other)),
    }
}

pub(super) fn array(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let size = interp.nonneg_int_arg(node, 0)?;
    let origin = if node.children.len() > 1 {
        interp.int_arg(node, 1)?
    } else {
        1
    };
    Ok(Datum::Array(Array::new(origin, size as usize)))
}

pub(super) fn listtoarray(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let source = interp.list_arg(node, 0)?;
    let origin = if node.children.len() > 1 {
        interp.int_arg(node, 1)?
    } else {
        1
    };
    Ok(Datum::Array(Array::from_list(origin, &source)))
}

pub(super) fn arraytolist(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let source = interp.array_arg(node, 0)?;
    Ok(Datum::List(source.to_list()))
}

pub(super) fn first(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    match &value {
        Datum::Word(w) => {
            nonempty_word(node, w)?;
            Ok(char_word(w.print().chars().next().unwrap_or(' ')))
        }
        Datum::List(l) => l
            .head()
            .ok_or_else(|| LogoError::not_enough_inputs(&node.name)),
        other => Err(LogoError::doesnt_like(&node.name, other)),
    }
}

pub(super) fn firsts(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let source = interp.list_arg(node, 0)?;
    let mut out = ListBuilder::new();
    for item in source.iter() {
        match &item {
            Datum::Word(w) => {
                nonempty_word(node, w)?;
                out.push(char_word(w.print().chars().next().unwrap_or(' ')));
            }
            Datum::List(l) => {
                let head = l
                    .head()
                    .ok_or_else(|| LogoError::not_enough_inputs(&node.name))?;
                out.push(head);
            }
            other => return Err(LogoError::doesnt_like(&node.name, other)),
        }
    }
    Ok(Datum::List(out.finish()))
}

pub(super) fn last(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    match &value {
        Datum::Word(w) => {
            nonempty_word(node, w)?;
            Ok(char_word(w.print().chars().last().unwrap_or(' ')))
        }
        Datum::List(l) => l
            .last()
            .ok_or_else(|| LogoError::not_enough_inputs(&node.name)),
        other => Err(LogoError::doesnt_like(&node.name, other)),
    }
}

pub(super) fn butfirst(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    match &value {
        Datum::Word(w) => {
            nonempty_word(node, w)?;
            let rest: String = w.print().chars().skip(1).collect();
            Ok(Datum::Word(Word::new(rest, false)))
        }
        Datum::List(l) => {
            if l.is_empty() {
                return Err(LogoError::not_enough_inputs(&node.name));
            }
            Ok(Datum::List(l.butfirst()))
        }
        other => Err(LogoError::doesnt_like(&node.name, other)),
    }
}

pub(super) fn butfirsts(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let source = interp.list_arg(node, 0)?;
    let mut out = ListBuilder::new();
    for item in source.iter() {
        match &item {
            Datum::Word(w) => {
                nonempty_word(node, w)?;
                let rest: String = w.print().chars().skip(1).collect();
                out.push(Datum::Word(Word::new(rest, false)));
            }
            Datum::List(l) => {
                if l.is_empty() {
                    return Err(LogoError::not_enough_inputs(&node.name));
                }
                out.push(Datum::List(l.butfirst()));
            }
            other => return Err(LogoError::doesnt_like(&node.name, other)),
        }
    }
    Ok(Datum::List(out.finish()))
}

pub(super) fn butlast(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    match &value {
        Datum::Word(w) => {
            nonempty_word(node, w)?;
            let chars: Vec<char> = w.print().chars().collect();
            let rest: String = chars[..chars.len() - 1].iter().collect();
            Ok(Datum::Word(Word::new(rest, false)))
        }
        Datum::List(l) => {
            if l.is_empty() {
                return Err(LogoError::not_enough_inputs(&node.name));
            }
            Ok(Datum::List(l.butlast()))
        }
        other => Err(LogoError::doesnt_like(&node.name, other)),
    }
}

pub(super) fn item(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let index = interp.int_arg(node, 0)?;
    let value = interp.arg(node, 1)?;
    match &value {
        Datum::Word(w) => {
            let c = usize::try_from(index)
                .ok()
                .filter(|i| *i >= 1)
                .and_then(|i| w.print().chars().nth(i - 1));
            match c {
                Some(c) => Ok(char_word(c)),
                None => Err(LogoError::doesnt_like(&node.name, &value)),
            }
        }
        Datum::List(l) => {
            let item = usize::try_from(index)
                .ok()
                .filter(|i| *i >= 1)
                .and_then(|i| l.item_at(i));
            item.ok_or_else(|| LogoError::doesnt_like(&node.name, &value))
        }
        Datum::Array(a) => a
            .get(index)
            .ok_or_else(|| LogoError::doesnt_like(&node.name, &value)),
        other => Err(LogoError::doesnt_like(&node.name, other)),
    }
}

/// SETITEM and .SETITEM. The checked variant refuses a value that is, or
/// transitively contains, the target array, so shared structure can never
/// become cyclic through it.
pub(super) fn setitem(
    interp: &mut Interpreter,
    node: &Rc<AstNode>,
    checked: bool,
) -> RunResult<Datum> {
    let index = interp.int_arg(node, 0)?;
    let target = interp.array_arg(node, 1)?;
    let value = interp.arg(node, 2)?;
    if checked && contains_or_is(&value, &Datum::Array(target.clone())) {
        return Err(LogoError::doesnt_like(&node.name, &value));
    }
    if !target.set(index, value) {
        return Err(LogoError::doesnt_like(
            &node.name,
            &Datum::Word(Word::from_number(index as f64)),
        ));
    }
    Ok(Datum::Nothing)
}

pub(super) fn dot_setfirst(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let target = interp.list_arg(node, 0)?;
    let value = interp.arg(node, 1)?;
    if !target.set_head(value) {
        return Err(LogoError::doesnt_like(&node.name, &Datum::List(target)));
    }
    Ok(Datum::Nothing)
}

pub(super) fn dot_setbf(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let target = interp.list_arg(node, 0)?;
    let value = interp.list_arg(node, 1)?;
    if !target.set_tail(value) {
        return Err(LogoError::doesnt_like(&node.name, &Datum::List(target)));
    }
    Ok(Datum::Nothing)
}

pub(super) fn wordp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    Ok(truth(matches!(value, Datum::Word(_))))
}

pub(super) fn listp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    Ok(truth(matches!(value, Datum::List(_))))
}

pub(super) fn arrayp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    Ok(truth(matches!(value, Datum::Array(_))))
}

pub(super) fn emptyp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    let empty = match &value {
        Datum::Word(w) => w.print().is_empty(),
        Datum::List(l) => l.is_empty(),
        _ => false,
    };
    Ok(truth(empty))
}

pub(super) fn beforep(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.word_arg(node, 0)?;
    let b = interp.word_arg(node, 1)?;
    let case_ignored = interp.case_ignored();
    Ok(truth(a.cmp_words(&b, case_ignored) == std::cmp::Ordering::Less))
}

pub(super) fn dot_eq(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.arg(node, 0)?;
    let b = interp.arg(node, 1)?;
    Ok(truth(identity_eq(&a, &b)))
}

pub(super) fn memberp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let thing = interp.arg(node, 0)?;
    let container = interp.arg(node, 1)?;
    let case_ignored = interp.case_ignored();
    let found = match &container {
        Datum::List(l) => l.iter().any(|item| datums_equal(&item, &thing, case_ignored)),
        Datum::Array(a) => a
            .items()
            .iter()
            .any(|item| datums_equal(item, &thing, case_ignored)),
        Datum::Word(w) => match &thing {
            Datum::Word(t) if t.char_len() == 1 => {
                if case_ignored {
                    w.key().contains(t.key())
                } else {
                    w.print().contains(t.print())
                }
            }
            _ => false,
        },
        _ => false,
    };
    Ok(truth(found))
}

pub(super) fn substringp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let sub = interp.arg(node, 0)?;
    let full = interp.arg(node, 1)?;
    let case_ignored = interp.case_ignored();
    let found = match (&sub, &full) {
        (Datum::Word(s), Datum::Word(f)) => {
            if case_ignored {
                f.key().contains(s.key())
            } else {
                f.print().contains(s.print())
            }
        }
        _ => false,
    };
    Ok(truth(found))
}

pub(super) fn numberp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    Ok(truth(
        value.as_word().and_then(Word::as_number).is_some(),
    ))
}

pub(super) fn vbarredp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.word_arg(node, 0)?;
    Ok(truth(value.is_forever_special()))
}

pub(super) fn count(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    let n = match &value {
        Datum::Word(w) => w.char_len(),
        Datum::List(l) => l.count(),
        Datum::Array(a) => a.len(),
        other => return Err(LogoError::doesnt_like(&node.name, other)),
    };
    Ok(Datum::Word(Word::from_number(n as f64)))
}

pub(super) fn ascii(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.word_arg(node, 0)?;
    match value.print().chars().next() {
        Some(c) if value.char_len() == 1 => Ok(Datum::Word(Word::from_number(c as u32 as f64))),
        _ => Err(LogoError::doesnt_like(&node.name, &Datum::Word(value))),
    }
}

pub(super) fn rawascii(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.word_arg(node, 0)?;
    match value.raw().chars().next() {
        Some(c) if value.raw().chars().count() == 1 => {
            Ok(Datum::Word(Word::from_number(raw_to_char(c) as u32 as f64)))
        }
        _ => Err(LogoError::doesnt_like(&node.name, &Datum::Word(value))),
    }
}

pub(super) fn char_(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let code = interp.nonneg_int_arg(node, 0)?;
    let c = u32::try_from(code).ok().and_then(char::from_u32);
    match c {
        Some(c) => Ok(char_word(c)),
        None => Err(LogoError::doesnt_like(
            &node.name,
            &Datum::Word(Word::from_number(code as f64)),
        )),
    }
}

pub(super) fn member(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let thing = interp.arg(node, 0)?;
    let container = interp.arg(node, 1)?;
    let case_ignored = interp.case_ignored();
    match &container {
        Datum::List(l) => {
            let mut current = l.clone();
            loop {
                let Some(head) = current.head() else {
                    return Ok(Datum::List(List::new()));
                };
                if datums_equal(&head, &thing, case_ignored) {
                    return Ok(Datum::List(current));
                }
                current = current.butfirst();
            }
        }
        Datum::Word(w) => {
            let Datum::Word(t) = &thing else {
                return Ok(Datum::Word(Word::new("", false)));
            };
            let (haystack, needle) = if case_ignored {
                (w.key().to_string(), t.key().to_string())
            } else {
                (w.print().to_string(), t.print().to_string())
            };
            match haystack.find(&needle) {
                Some(at) => {
                    let suffix: String = w.print().chars().skip(haystack[..at].chars().count()).collect();
                    Ok(Datum::Word(Word::new(suffix, false)))
                }
                None => Ok(Datum::Word(Word::new("", false))),
            }
        }
        other => Err(LogoError::doesnt_like(&node.name, other)),
    }
}

pub(super) fn lowercase(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.word_arg(node, 0)?;
    Ok(Datum::Word(Word::new(value.print().to_lowercase(), false)))
}

pub(super) fn uppercase(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.word_arg(node, 0)?;
    Ok(Datum::Word(Word::new(value.print().to_uppercase(), false)))
}

pub(super) fn standout(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.word_arg(node, 0)?;
    let marked = interp.io.host.add_standout_markup(value.print());
    Ok(Datum::Word(Word::new(marked, true)))
}

pub(super) fn parse(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    // tokenize the print form: vertical-bar quoting protected the word at
    // read time, PARSE deliberately re-tokenizes the visible text
    let value = interp.word_arg(node, 0)?;
    tokenize_text(value.print())
}

pub(super) fn runparse_prim(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    match &value {
        Datum::Word(_) | Datum::List(_) => Ok(Datum::List(runparser::runparse(&value)?)),
        other => Err(LogoError::doesnt_like(&node.name, other)),
    }
}
