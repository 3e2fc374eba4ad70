//! Property-list primitives.

use std::rc::Rc;

use crate::{
    ast::AstNode,
    datum::Datum,
    interp::Interpreter,
    signal::RunResult,
};

pub(super) fn pprop(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let plist = interp.word_arg(node, 0)?;
    let prop = interp.word_arg(node, 1)?;
    let value = interp.arg(node, 2)?;
    if interp.plists.ws.is_traced(plist.key()) {
        let message = format!(
            "Pprop \"{} \"{} {}\n",
            plist.print(),
            prop.print(),
            value.to_display_string()
        );
        interp.sys_print(&message);
    }
    interp.plists.put(&plist, &prop, value);
    Ok(Datum::Nothing)
}

pub(super) fn gprop(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let plist = interp.word_arg(node, 0)?;
    let prop = interp.word_arg(node, 1)?;
    Ok(interp.plists.get(&plist, &prop))
}

pub(super) fn remprop(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let plist = interp.word_arg(node, 0)?;
    let prop = interp.word_arg(node, 1)?;
    interp.plists.remove(&plist, &prop);
    Ok(Datum::Nothing)
}

pub(super) fn plist(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let plist = interp.word_arg(node, 0)?;
    Ok(Datum::List(interp.plists.plist(&plist)))
}
