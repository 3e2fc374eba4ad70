//! Control primitives: running lists, conditionals, loops, flow-control
//! signals, CATCH/THROW, PAUSE/CONTINUE, APPLY and the explicit slots.

use std::rc::Rc;

use super::truth;
use crate::{
    ast::{AstNode, Generator, ReturnKind},
    datum::Datum,
    interp::Interpreter,
    procedures::CommandEntry,
    signal::{ErrTag, LogoError, RunResult, Signal},
    types::{List, ListBuilder, Word},
};

pub(super) fn run(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let body = interp.arg(node, 0)?;
    match &body {
        Datum::Word(_) | Datum::List(_) => interp.run_list(&body, None),
        other => Err(LogoError::doesnt_like(&node.name, other)),
    }
}

pub(super) fn runresult(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let body = interp.arg(node, 0)?;
    let value = interp.run_list(&body, None)?;
    if value.is_nothing() {
        Ok(Datum::List(List::new()))
    } else {
        Ok(Datum::List(List::from_vec(vec![value])))
    }
}

pub(super) fn repeat(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let times = interp.nonneg_int_arg(node, 0)?;
    let body = interp.arg(node, 1)?;
    let saved = interp.repcount;
    for i in 1..=times {
        interp.repcount = i;
        match interp.run_list(&body, None) {
            Ok(v) if v.is_nothing() => {}
            Ok(v) => {
                interp.repcount = saved;
                return Err(LogoError::dont_say(&v));
            }
            Err(e) => {
                interp.repcount = saved;
                return Err(e);
            }
        }
    }
    interp.repcount = saved;
    Ok(Datum::Nothing)
}

pub(super) fn forever(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let body = interp.arg(node, 0)?;
    let saved = interp.repcount;
    let mut i: i64 = 0;
    loop {
        i += 1;
        interp.repcount = i;
        match interp.run_list(&body, None) {
            Ok(v) if v.is_nothing() => {}
            Ok(v) => {
                interp.repcount = saved;
                return Err(LogoError::dont_say(&v));
            }
            Err(e) => {
                interp.repcount = saved;
                return Err(e);
            }
        }
    }
}

pub(super) fn repcount(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(Datum::Word(Word::from_number(interp.repcount as f64)))
}

pub(super) fn if_(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let condition = interp.bool_arg(node, 0)?;
    if condition {
        let then = interp.arg(node, 1)?;
        return interp.run_list(&then, None);
    }
    if node.children.len() > 2 {
        let otherwise = interp.arg(node, 2)?;
        return interp.run_list(&otherwise, None);
    }
    Ok(Datum::Nothing)
}

pub(super) fn ifelse(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let condition = interp.bool_arg(node, 0)?;
    let branch = if condition {
        interp.arg(node, 1)?
    } else {
        interp.arg(node, 2)?
    };
    interp.run_list(&branch, None)
}

pub(super) fn test(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let condition = interp.bool_arg(node, 0)?;
    interp.vars.set_test(condition);
    Ok(Datum::Nothing)
}

pub(super) fn iftrue(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    match interp.vars.tested_state() {
        None => Err(LogoError::no_test(&node.name)),
        Some(true) => {
            let body = interp.arg(node, 0)?;
            interp.run_list(&body, None)
        }
        Some(false) => Ok(Datum::Nothing),
    }
}

pub(super) fn iffalse(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    match interp.vars.tested_state() {
        None => Err(LogoError::no_test(&node.name)),
        Some(false) => {
            let body = interp.arg(node, 0)?;
            interp.run_list(&body, None)
        }
        Some(true) => Ok(Datum::Nothing),
    }
}

pub(super) fn stop(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    // a wrapped `expr STOP` line evaluates the expression for effect first
    if !node.children.is_empty() {
        let value = interp.raw_arg(node, 0)?;
        if !value.is_nothing() {
            return Err(LogoError::dont_say(&value));
        }
    }
    if !interp.in_procedure() {
        return Err(LogoError::not_inside_procedure(&node.name));
    }
    Err(Signal::Stop)
}

pub(super) fn output(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    if !interp.in_procedure() {
        return Err(LogoError::not_inside_procedure(&node.name));
    }
    Err(Signal::Output(value))
}

pub(super) fn maybeoutput(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.raw_arg(node, 0)?;
    if !interp.in_procedure() {
        return Err(LogoError::not_inside_procedure(&node.name));
    }
    if value.is_nothing() {
        Err(Signal::Stop)
    } else {
        Err(Signal::Output(value))
    }
}

pub(super) fn catch(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let tag = interp.word_arg(node, 0)?;
    let body = interp.arg(node, 1)?;
    match interp.run_list(&body, None) {
        Err(Signal::Error(e)) => {
            if e.tag.key() == tag.key() {
                return Ok(e.output.clone());
            }
            if tag.key() == "error" && !e.is_signal_tag() {
                interp.last_error = Some(e);
                return Ok(Datum::Nothing);
            }
            Err(Signal::Error(e))
        }
        other => other,
    }
}

pub(super) fn throw(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let tag = interp.word_arg(node, 0)?;
    let value = if node.children.len() > 1 {
        interp.arg(node, 1)?
    } else {
        Datum::Nothing
    };
    // the signal tags included: the REPL dispatches on the tag word
    Err(LogoError::custom_throw(tag, value))
}

pub(super) fn error(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let Some(e) = interp.last_error.take() else {
        return Ok(Datum::List(List::new()));
    };
    let mut out = ListBuilder::new();
    out.push(Datum::Word(Word::from_number(e.code as i32 as f64)));
    out.push(Datum::Word(e.message.clone()));
    match &e.procedure {
        Datum::Ast(n) => out.push(Datum::Word(n.name.clone())),
        _ => out.push(Datum::List(List::new())),
    }
    match &e.line {
        Datum::List(l) => out.push(Datum::List(l.clone())),
        _ => out.push(Datum::List(List::new())),
    }
    Ok(Datum::List(out.finish()))
}

pub(super) fn pause(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.pause()
}

pub(super) fn continue_(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.raw_arg(node, 0)?;
    if interp.pause_level == 0 {
        return Err(LogoError::not_inside_procedure(&node.name));
    }
    Err(Signal::Pause(value))
}

pub(super) fn bye(_interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Err(LogoError::signal_throw(ErrTag::System))
}

pub(super) fn tag(_interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(Datum::Nothing)
}

pub(super) fn goto(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let target = interp.word_arg(node, 0)?;
    if !interp.in_procedure() {
        return Err(LogoError::not_inside_procedure(&node.name));
    }
    Err(Signal::Goto(target))
}

pub(super) fn apply(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let template = interp.arg(node, 0)?;
    let inputs = interp.list_arg(node, 1)?;
    let args: Vec<Datum> = inputs.iter().collect();
    match &template {
        Datum::Word(name) => apply_name(interp, node, name, args),
        Datum::List(_) => {
            // explicit-slot template: run with ?-placeholders bound
            interp.vars.push_frame(Datum::Ast(node.clone()));
            interp.vars.set_explicit_slots(Datum::List(inputs));
            let result = interp.run_list(&template, None);
            interp.vars.pop_frame();
            match result {
                Err(Signal::Output(v)) => Ok(v),
                Err(Signal::Stop) => Ok(Datum::Nothing),
                other => other,
            }
        }
        other => Err(LogoError::doesnt_like(&node.name, other)),
    }
}

fn apply_name(
    interp: &mut Interpreter,
    node: &Rc<AstNode>,
    name: &Word,
    args: Vec<Datum>,
) -> RunResult<Datum> {
    let entry = interp
        .procedures
        .lookup(name.key())
        .ok_or_else(|| LogoError::no_how(name))?;
    let (min, _, max) = entry.arity();
    if min < 0 {
        return Err(LogoError::no_apply(name));
    }
    let count = args.len() as i32;
    if count < min {
        return Err(LogoError::not_enough_inputs(name));
    }
    if max >= 0 && count > max {
        return Err(LogoError::too_many_inputs(name));
    }
    match entry {
        CommandEntry::User(p) => {
            let mut call = AstNode::new(
                name.clone(),
                if p.is_macro {
                    Generator::Macro(p.clone())
                } else {
                    Generator::Proc(p.clone())
                },
                ReturnKind::Datum,
            );
            for a in &args {
                call.add_child(a.clone());
            }
            let call = Rc::new(call);
            if p.is_macro {
                interp.run_macro(p, name.clone(), args)
            } else {
                interp.apply_procedure(p, &call, args)
            }
        }
        CommandEntry::Prim(e) => {
            let mut call = AstNode::new(name.clone(), Generator::Prim(e.prim), ReturnKind::Datum);
            for a in args {
                call.add_child(a);
            }
            let call = Rc::new(call);
            super::dispatch(interp, e.prim, &call)
        }
    }
}

pub(super) fn named_slot(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let index = if node.children.is_empty() {
        1
    } else {
        interp.int_arg(node, 0)?
    };
    let slots = interp.vars.explicit_slots();
    let Datum::List(slots) = slots else {
        return Err(LogoError::no_apply(&node.name));
    };
    usize::try_from(index)
        .ok()
        .filter(|i| *i >= 1)
        .and_then(|i| slots.item_at(i))
        .ok_or_else(|| {
            LogoError::doesnt_like(&node.name, &Datum::Word(Word::from_number(index as f64)))
        })
}

pub(super) fn ignore(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.arg(node, 0)?;
    Ok(Datum::Nothing)
}

pub(super) fn macrop(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    Ok(truth(interp.procedures.is_macro(name.key())))
}

pub(super) fn end(_interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    Err(LogoError::not_inside_procedure(&node.name))
}
