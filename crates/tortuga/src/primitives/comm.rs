//! Console and stream primitives: printing, reading, the open-file table,
//! redirection, dribbling, and text attributes.

use std::rc::Rc;

use crate::{
    ast::AstNode,
    datum::{Datum, print_datum, show_datum},
    interp::Interpreter,
    io::OpenMode,
    signal::{LogoError, RunResult},
    types::{List, ListBuilder, Word},
    turtle::gfx,
};

pub(super) fn print(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let opts = interp.print_options();
    let mut out = String::new();
    for i in 0..node.children.len() {
        let value = interp.arg(node, i)?;
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&print_datum(&value, &opts));
    }
    out.push('\n');
    interp.std_print(&out)?;
    Ok(Datum::Nothing)
}

pub(super) fn show(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let opts = interp.print_options();
    let mut out = String::new();
    for i in 0..node.children.len() {
        let value = interp.arg(node, i)?;
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&show_datum(&value, &opts));
    }
    out.push('\n');
    interp.std_print(&out)?;
    Ok(Datum::Nothing)
}

pub(super) fn type_(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let opts = interp.print_options();
    let mut out = String::new();
    for i in 0..node.children.len() {
        let value = interp.arg(node, i)?;
        out.push_str(&print_datum(&value, &opts));
    }
    interp.std_print(&out)?;
    Ok(Datum::Nothing)
}

pub(super) fn readlist(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    match interp.io.read_list("", true)? {
        Some(list) => Ok(list),
        // end of file reads as the empty word
        None => Ok(Datum::Word(Word::new("", false))),
    }
}

pub(super) fn readword(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    match interp.io.read_word("")? {
        Some(word) => Ok(Datum::Word(word)),
        None => Ok(Datum::List(List::new())),
    }
}

pub(super) fn readrawline(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    match interp.io.read_raw_line("")? {
        Some(line) => Ok(Datum::Word(Word::new(line, false))),
        None => Ok(Datum::List(List::new())),
    }
}

pub(super) fn readchar(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    match interp.io.read_char()? {
        Some(c) => Ok(Datum::Word(Word::new(c.to_string(), false))),
        None => Ok(Datum::List(List::new())),
    }
}

pub(super) fn readchars(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let count = interp.nonneg_int_arg(node, 0)?;
    let mut out = String::new();
    for _ in 0..count {
        match interp.io.read_char()? {
            Some(c) => out.push(c),
            None => break,
        }
    }
    if out.is_empty() && count > 0 {
        return Ok(Datum::List(List::new()));
    }
    Ok(Datum::Word(Word::new(out, false)))
}

pub(super) fn setprefix(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    match &value {
        Datum::Word(w) => interp.io.set_prefix(Some(w.print().to_string())),
        Datum::List(l) if l.is_empty() => interp.io.set_prefix(None),
        other => return Err(LogoError::doesnt_like(&node.name, other)),
    }
    Ok(Datum::Nothing)
}

pub(super) fn prefix(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(match interp.io.prefix() {
        Some(p) => Datum::Word(Word::new(p, false)),
        None => Datum::List(List::new()),
    })
}

pub(super) fn open(interp: &mut Interpreter, node: &Rc<AstNode>, mode: OpenMode) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    interp.io.open(&name, mode)?;
    Ok(Datum::Nothing)
}

pub(super) fn allopen(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let mut out = ListBuilder::new();
    for name in interp.io.all_open() {
        out.push(Datum::Word(name));
    }
    Ok(Datum::List(out.finish()))
}

pub(super) fn setread(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    match &value {
        Datum::Word(w) => interp.io.set_read(Some(w))?,
        Datum::List(l) if l.is_empty() => interp.io.set_read(None)?,
        other => return Err(LogoError::doesnt_like(&node.name, other)),
    }
    Ok(Datum::Nothing)
}

pub(super) fn setwrite(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    match &value {
        Datum::Word(w) => interp.io.set_write(Some(w))?,
        Datum::List(l) if l.is_empty() => interp.io.set_write(None)?,
        other => return Err(LogoError::doesnt_like(&node.name, other)),
    }
    Ok(Datum::Nothing)
}

pub(super) fn reader(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(interp.io.reader_name())
}

pub(super) fn writer(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(interp.io.writer_name())
}

pub(super) fn readpos(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let pos = interp.io.read_position()?;
    Ok(Datum::Word(Word::from_number(pos as f64)))
}

pub(super) fn writepos(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let pos = interp.io.write_position()?;
    Ok(Datum::Word(Word::from_number(pos as f64)))
}

pub(super) fn setreadpos(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let pos = interp.nonneg_int_arg(node, 0)?;
    interp.io.set_read_position(pos as u64)?;
    Ok(Datum::Nothing)
}

pub(super) fn setwritepos(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let pos = interp.nonneg_int_arg(node, 0)?;
    interp.io.set_write_position(pos as u64)?;
    Ok(Datum::Nothing)
}

pub(super) fn close(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    interp.io.close(&name)?;
    Ok(Datum::Nothing)
}

pub(super) fn closeall(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.io.close_all();
    Ok(Datum::Nothing)
}

pub(super) fn erasefile(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    interp.io.erase_file(&name)?;
    Ok(Datum::Nothing)
}

pub(super) fn dribble(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    interp.io.start_dribble(&name)?;
    Ok(Datum::Nothing)
}

pub(super) fn nodribble(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.io.stop_dribble();
    Ok(Datum::Nothing)
}

pub(super) fn eofp(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(super::truth(interp.io.read_at_end()))
}

pub(super) fn keyp(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    // a character is knowably available only on redirected input
    Ok(super::truth(!interp.io.read_at_end() && interp.io.reader_name().as_word().is_some()))
}

pub(super) fn cleartext(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    gfx(interp.io.host.clear_text())?;
    Ok(Datum::Nothing)
}

pub(super) fn setcursor(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.list_arg(node, 0)?;
    let parts: Vec<i64> = value
        .iter()
        .filter_map(|d| d.as_word().and_then(Word::as_number).map(|n| n as i64))
        .collect();
    if parts.len() != 2 {
        return Err(LogoError::doesnt_like(&node.name, &Datum::List(value)));
    }
    gfx(interp.io.host.set_cursor_position(parts[1], parts[0]))?;
    Ok(Datum::Nothing)
}

pub(super) fn cursor(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let (row, col) = gfx(interp.io.host.get_cursor_position())?;
    Ok(Datum::List(List::from_vec(vec![
        Datum::Word(Word::from_number(col as f64)),
        Datum::Word(Word::from_number(row as f64)),
    ])))
}

pub(super) fn settextcolor(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let fg_datum = interp.arg(node, 0)?;
    let bg_datum = interp.arg(node, 1)?;
    let fg = interp
        .turtle
        .color_from_datum(&fg_datum)
        .ok_or_else(|| LogoError::doesnt_like(&node.name, &fg_datum))?;
    let bg = interp
        .turtle
        .color_from_datum(&bg_datum)
        .ok_or_else(|| LogoError::doesnt_like(&node.name, &bg_datum))?;
    gfx(interp.io.host.set_text_color(fg, bg))?;
    Ok(Datum::Nothing)
}

pub(super) fn font(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(Datum::Word(Word::new(interp.font_name.clone(), false)))
}

pub(super) fn setfont(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    gfx(interp.io.host.set_font_name(name.print()))?;
    interp.font_name = name.print().to_string();
    Ok(Datum::Nothing)
}

pub(super) fn settextsize(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let size = interp.num_arg(node, 0)?;
    gfx(interp.io.host.set_font_size(size))?;
    interp.text_size = size;
    Ok(Datum::Nothing)
}

pub(super) fn textsize(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(Datum::Word(Word::from_number(interp.text_size)))
}

pub(super) fn allfonts(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let names = gfx(interp.io.host.list_font_names())?;
    let mut out = ListBuilder::new();
    for name in names {
        out.push(Datum::Word(Word::new(name, false)));
    }
    Ok(Datum::List(out.finish()))
}

pub(super) fn cursorinsert(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    gfx(interp.io.host.set_overwrite_mode(false))?;
    interp.overwrite_mode = false;
    Ok(Datum::Nothing)
}

pub(super) fn cursoroverwrite(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    gfx(interp.io.host.set_overwrite_mode(true))?;
    interp.overwrite_mode = true;
    Ok(Datum::Nothing)
}

pub(super) fn cursormode(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let mode = if interp.overwrite_mode {
        "overwrite"
    } else {
        "insert"
    };
    Ok(Datum::Word(Word::new(mode, false)))
}

pub(super) fn wait(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let ticks = interp.nonneg_int_arg(node, 0)?;
    interp.interrupt_check()?;
    interp.io.host.mwait((ticks as u64) * 1000 / 60);
    Ok(Datum::Nothing)
}
