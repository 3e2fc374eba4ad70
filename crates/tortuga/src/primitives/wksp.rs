//! Workspace primitives: variables, definitions, introspection, listings,
//! bury/trace/step management, and workspace save/load.

use std::rc::Rc;

use super::truth;
use crate::{
    ast::AstNode,
    datum::{Datum, show_datum},
    interp::Interpreter,
    procedures::Procedures,
    signal::{LogoError, RunResult},
    types::{List, ListBuilder, Word},
};

pub(super) fn make(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    let value = interp.arg(node, 1)?;
    interp.trace_assignment(name.key(), &value);
    interp.vars.set_value(name.key(), value);
    Ok(Datum::Nothing)
}

/// The LOCAL/GLOBAL argument: one name word, or a list of name words.
fn name_args(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Vec<String>> {
    let mut names = Vec::new();
    for i in 0..node.children.len() {
        match interp.arg(node, i)? {
            Datum::Word(w) => names.push(w.key().to_string()),
            Datum::List(l) => {
                for item in l.iter() {
                    match item {
                        Datum::Word(w) => names.push(w.key().to_string()),
                        other => return Err(LogoError::doesnt_like(&node.name, &other)),
                    }
                }
            }
            other => return Err(LogoError::doesnt_like(&node.name, &other)),
        }
    }
    Ok(names)
}

pub(super) fn local(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let names = name_args(interp, node)?;
    if interp.vars.depth() > 1 {
        for name in names {
            interp.vars.set_local(&name);
        }
    }
    Ok(Datum::Nothing)
}

pub(super) fn localmake(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    let value = interp.arg(node, 1)?;
    if interp.vars.depth() > 1 {
        interp.vars.set_local(name.key());
    }
    interp.trace_assignment(name.key(), &value);
    interp.vars.set_value(name.key(), value);
    Ok(Datum::Nothing)
}

pub(super) fn global(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let names = name_args(interp, node)?;
    for name in names {
        interp.vars.set_global(&name);
    }
    Ok(Datum::Nothing)
}

pub(super) fn thing(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    match interp.vars.value_for(name.key()) {
        Some(v) if !v.is_nothing() => Ok(v),
        _ => Err(LogoError::no_value(&name)),
    }
}

pub(super) fn procedurep(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    Ok(truth(interp.procedures.is_procedure(name.key())))
}

pub(super) fn primitivep(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    Ok(truth(interp.procedures.is_primitive(name.key())))
}

pub(super) fn definedp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    Ok(truth(interp.procedures.is_defined(name.key())))
}

pub(super) fn namep(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    let bound = matches!(interp.vars.value_for(name.key()), Some(v) if !v.is_nothing());
    Ok(truth(bound))
}

pub(super) fn plistp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    Ok(truth(interp.plists.has_plist(name.key())))
}

fn words(names: Vec<String>) -> Datum {
    let mut out = ListBuilder::new();
    for name in names {
        out.push(Datum::Word(Word::new(name, false)));
    }
    Datum::List(out.finish())
}

fn triple(procs: Vec<String>, vars: Vec<String>, plists: Vec<String>) -> Datum {
    Datum::List(List::from_vec(vec![words(procs), words(vars), words(plists)]))
}

pub(super) fn contents(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(triple(
        interp.procedures.user_names(false),
        interp.vars.all_names(false),
        interp.plists.all_names(false),
    ))
}

pub(super) fn buried(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(triple(
        interp.procedures.user_names(true),
        interp.vars.all_names(true),
        interp.plists.all_names(true),
    ))
}

pub(super) fn traced(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(triple(
        interp.procedures.ws.traced_names(),
        interp.vars.ws.traced_names(),
        interp.plists.ws.traced_names(),
    ))
}

pub(super) fn stepped(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(triple(
        interp.procedures.ws.stepped_names(),
        interp.vars.ws.stepped_names(),
        interp.plists.ws.stepped_names(),
    ))
}

pub(super) fn procedures(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(words(interp.procedures.user_names(false)))
}

pub(super) fn primitives(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(words(interp.procedures.primitive_names()))
}

pub(super) fn names(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(Datum::List(List::from_vec(vec![
        Datum::List(List::new()),
        words(interp.vars.all_names(false)),
    ])))
}

pub(super) fn plists(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(Datum::List(List::from_vec(vec![
        Datum::List(List::new()),
        Datum::List(List::new()),
        words(interp.plists.all_names(false)),
    ])))
}

pub(super) fn arity(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    interp.procedures.arity(&name)
}

/// A contents-list argument: a word (one procedure name), a list of words
/// (procedure names), or a list of up to three sublists naming procedures,
/// variables, and property lists.
fn contents_triple(
    interp: &mut Interpreter,
    node: &Rc<AstNode>,
) -> RunResult<(Vec<Word>, Vec<Word>, Vec<Word>)> {
    let value = interp.arg(node, 0)?;
    let mut procs = Vec::new();
    let mut vars = Vec::new();
    let mut plists = Vec::new();
    match &value {
        Datum::Word(w) => procs.push(w.clone()),
        Datum::List(l) => {
            let sublists = l.iter().any(|d| matches!(d, Datum::List(_)));
            if sublists {
                for (i, part) in l.iter().enumerate() {
                    let Datum::List(part) = part else {
                        return Err(LogoError::doesnt_like(&node.name, &part));
                    };
                    let bucket = match i {
                        0 => &mut procs,
                        1 => &mut vars,
                        2 => &mut plists,
                        _ => return Err(LogoError::doesnt_like(&node.name, &value)),
                    };
                    for item in part.iter() {
                        match item {
                            Datum::Word(w) => bucket.push(w),
                            other => return Err(LogoError::doesnt_like(&node.name, &other)),
                        }
                    }
                }
            } else {
                for item in l.iter() {
                    match item {
                        Datum::Word(w) => procs.push(w),
                        other => return Err(LogoError::doesnt_like(&node.name, &other)),
                    }
                }
            }
        }
        other => return Err(LogoError::doesnt_like(&node.name, other)),
    }
    Ok((procs, vars, plists))
}

fn variable_line(interp: &Interpreter, name: &str) -> Option<String> {
    let value = interp.vars.value_for(name)?;
    if value.is_nothing() {
        return None;
    }
    let rendered = show_datum(&value, &interp.print_options());
    Some(format!("Make \"{name} {rendered}\n"))
}

pub(super) fn printout(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (procs, vars, plists) = contents_triple(interp, node)?;
    let mut out = String::new();
    for name in &procs {
        let Datum::List(lines) = interp.procedures.full_text(name)? else {
            continue;
        };
        for line in lines.iter() {
            if let Datum::Word(w) = line {
                out.push_str(w.print());
                out.push('\n');
            }
        }
    }
    for name in &vars {
        if let Some(line) = variable_line(interp, name.key()) {
            out.push_str(&line);
        }
    }
    for name in &plists {
        let flat = interp.plists.plist(name);
        let mut iter = flat.iter();
        while let (Some(prop), Some(value)) = (iter.next(), iter.next()) {
            let rendered = show_datum(&value, &interp.print_options());
            out.push_str(&format!("Pprop \"{} \"{} {}\n", name.print(), prop, rendered));
        }
    }
    interp.std_print(&out)?;
    Ok(Datum::Nothing)
}

pub(super) fn pot(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (procs, vars, plists) = contents_triple(interp, node)?;
    let mut out = String::new();
    for name in &procs {
        out.push_str(&interp.procedures.title(name)?);
        out.push('\n');
    }
    for name in &vars {
        if let Some(line) = variable_line(interp, name.key()) {
            out.push_str(&line);
        }
    }
    for name in &plists {
        let count = interp.plists.plist(name).count() / 2;
        out.push_str(&format!("Plist \"{} has {count} properties\n", name.print()));
    }
    interp.std_print(&out)?;
    Ok(Datum::Nothing)
}

pub(super) fn erase(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (procs, vars, plists) = contents_triple(interp, node)?;
    for name in &procs {
        interp.procedures.erase(name)?;
    }
    for name in &vars {
        interp.vars.erase(name.key());
    }
    for name in &plists {
        interp.plists.erase(name.key());
    }
    Ok(Datum::Nothing)
}

/// ERN: erases variables named by a word or a list of words.
pub(super) fn ern(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let names = name_args(interp, node)?;
    for name in names {
        interp.vars.erase(&name);
    }
    Ok(Datum::Nothing)
}

pub(super) fn erall(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.procedures.erase_all();
    interp.vars.erase_all();
    interp.plists.erase_all();
    Ok(Datum::Nothing)
}

pub(super) fn erps(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.procedures.erase_all();
    Ok(Datum::Nothing)
}

pub(super) fn erns(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.vars.erase_all();
    Ok(Datum::Nothing)
}

pub(super) fn erpls(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.plists.erase_all();
    Ok(Datum::Nothing)
}

pub(super) fn bury(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (procs, vars, plists) = contents_triple(interp, node)?;
    for name in &procs {
        interp.procedures.ws.bury(name.key());
    }
    for name in &vars {
        interp.vars.ws.bury(name.key());
    }
    for name in &plists {
        interp.plists.ws.bury(name.key());
    }
    Ok(Datum::Nothing)
}

pub(super) fn unbury(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (procs, vars, plists) = contents_triple(interp, node)?;
    for name in &procs {
        interp.procedures.ws.unbury(name.key());
    }
    for name in &vars {
        interp.vars.ws.unbury(name.key());
    }
    for name in &plists {
        interp.plists.ws.unbury(name.key());
    }
    Ok(Datum::Nothing)
}

pub(super) fn buriedp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    let key = name.key();
    Ok(truth(
        interp.procedures.ws.is_buried(key)
            || interp.vars.ws.is_buried(key)
            || interp.plists.ws.is_buried(key),
    ))
}

pub(super) fn trace(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (procs, vars, plists) = contents_triple(interp, node)?;
    for name in &procs {
        interp.procedures.ws.trace(name.key());
    }
    for name in &vars {
        interp.vars.ws.trace(name.key());
    }
    for name in &plists {
        interp.plists.ws.trace(name.key());
    }
    Ok(Datum::Nothing)
}

pub(super) fn untrace(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (procs, vars, plists) = contents_triple(interp, node)?;
    for name in &procs {
        interp.procedures.ws.untrace(name.key());
    }
    for name in &vars {
        interp.vars.ws.untrace(name.key());
    }
    for name in &plists {
        interp.plists.ws.untrace(name.key());
    }
    Ok(Datum::Nothing)
}

pub(super) fn tracedp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    let key = name.key();
    Ok(truth(
        interp.procedures.ws.is_traced(key) || interp.vars.ws.is_traced(key),
    ))
}

pub(super) fn step(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (procs, vars, _) = contents_triple(interp, node)?;
    for name in &procs {
        interp.procedures.ws.step(name.key());
    }
    for name in &vars {
        interp.vars.ws.step(name.key());
    }
    Ok(Datum::Nothing)
}

pub(super) fn unstep(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (procs, vars, _) = contents_triple(interp, node)?;
    for name in &procs {
        interp.procedures.ws.unstep(name.key());
    }
    for name in &vars {
        interp.vars.ws.unstep(name.key());
    }
    Ok(Datum::Nothing)
}

pub(super) fn steppedp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    let key = name.key();
    Ok(truth(
        interp.procedures.ws.is_stepped(key) || interp.vars.ws.is_stepped(key),
    ))
}

pub(super) fn text(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    interp.procedures.text(&name)
}

pub(super) fn fulltext(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    interp.procedures.full_text(&name)
}

pub(super) fn define(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    let body = interp.list_arg(node, 1)?;
    let procedure = Procedures::create_procedure(&node.name, &body, Datum::Nothing, false)?;
    interp.procedures.define(&name, Rc::new(procedure))?;
    Ok(Datum::Nothing)
}

pub(super) fn copydef(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let new = interp.word_arg(node, 0)?;
    let old = interp.word_arg(node, 1)?;
    interp.procedures.copy_def(&new, &old)
        .map(|()| Datum::Nothing)
}

pub(super) fn help(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    if node.children.is_empty() {
        let commands = interp.help.all_commands();
        if commands.is_empty() {
            interp.sys_print("No help is available.\n");
        } else {
            let listing = commands.join("\n");
            interp.sys_print(&listing);
            interp.sys_print("\n");
        }
        return Ok(Datum::Nothing);
    }
    let name = interp.word_arg(node, 0)?;
    let canonical = interp
        .help
        .resolve_alias(name.key())
        .unwrap_or_else(|| name.key().to_string());
    match interp.help.help_text(&canonical) {
        Some(text) => {
            interp.sys_print(&text);
            interp.sys_print("\n");
        }
        None => {
            let message = format!("No help is available for {}.\n", name.print());
            interp.sys_print(&message);
        }
    }
    Ok(Datum::Nothing)
}

pub(super) fn load(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    let source = interp.io.read_file(&name)?;
    interp.execute_text(&source);
    Ok(Datum::Nothing)
}

pub(super) fn save(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    let mut out = String::new();
    for proc_name in interp.procedures.user_names(false) {
        let word = Word::new(proc_name, false);
        if let Datum::List(lines) = interp.procedures.full_text(&word)? {
            for line in lines.iter() {
                if let Datum::Word(w) = line {
                    out.push_str(w.print());
                    out.push('\n');
                }
            }
        }
    }
    for var_name in interp.vars.all_names(false) {
        if let Some(line) = variable_line(interp, &var_name) {
            out.push_str(&line);
        }
    }
    for plist_name in interp.plists.all_names(false) {
        let word = Word::new(plist_name.clone(), false);
        let flat = interp.plists.plist(&word);
        let mut iter = flat.iter();
        while let (Some(prop), Some(value)) = (iter.next(), iter.next()) {
            let rendered = show_datum(&value, &interp.print_options());
            out.push_str(&format!("Pprop \"{plist_name} \"{prop} {rendered}\n"));
        }
    }
    interp.io.write_file(&name, &out)?;
    Ok(Datum::Nothing)
}
