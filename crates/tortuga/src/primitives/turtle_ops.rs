//! Turtle, canvas, screen-mode, and mouse primitives. All visible effects
//! route through the host; on hosts without a canvas these raise
//! NO-GRAPHICS.

use std::rc::Rc;

use super::truth;
use crate::{
    ast::AstNode,
    datum::Datum,
    host::{PenMode, ScreenMode},
    interp::Interpreter,
    signal::{LogoError, RunResult},
    turtle::{Turtle, TurtleMode, gfx},
    types::{List, Word},
};

fn number(n: f64) -> Datum {
    Datum::Word(Word::from_number(n))
}

fn point(x: f64, y: f64) -> Datum {
    Datum::List(List::from_vec(vec![number(x), number(y)]))
}

/// Reads an `[x y]` list argument.
fn point_arg(interp: &mut Interpreter, node: &Rc<AstNode>, i: usize) -> RunResult<(f64, f64)> {
    let value = interp.list_arg(node, i)?;
    let parts: Vec<f64> = value
        .iter()
        .filter_map(|d| d.as_word().and_then(Word::as_number))
        .collect();
    if parts.len() != 2 || value.count() != 2 {
        return Err(LogoError::doesnt_like(&node.name, &Datum::List(value)));
    }
    Ok((parts[0], parts[1]))
}

fn color_arg(
    interp: &mut Interpreter,
    node: &Rc<AstNode>,
    i: usize,
) -> RunResult<crate::host::Color> {
    let value = interp.arg(node, i)?;
    interp
        .turtle
        .color_from_datum(&value)
        .ok_or_else(|| LogoError::doesnt_like(&node.name, &value))
}

pub(super) fn forward(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let distance = interp.num_arg(node, 0)?;
    interp.turtle.forward(interp.io.host.as_mut(), distance)?;
    Ok(Datum::Nothing)
}

pub(super) fn back(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let distance = interp.num_arg(node, 0)?;
    interp.turtle.forward(interp.io.host.as_mut(), -distance)?;
    Ok(Datum::Nothing)
}

pub(super) fn right(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let degrees = interp.num_arg(node, 0)?;
    interp.turtle.turn(interp.io.host.as_mut(), degrees)?;
    Ok(Datum::Nothing)
}

pub(super) fn left(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let degrees = interp.num_arg(node, 0)?;
    interp.turtle.turn(interp.io.host.as_mut(), -degrees)?;
    Ok(Datum::Nothing)
}

pub(super) fn home(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.turtle.home(interp.io.host.as_mut())?;
    Ok(Datum::Nothing)
}

pub(super) fn setpos(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (x, y) = point_arg(interp, node, 0)?;
    interp.turtle.set_position(interp.io.host.as_mut(), x, y)?;
    Ok(Datum::Nothing)
}

pub(super) fn setxy(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let x = interp.num_arg(node, 0)?;
    let y = interp.num_arg(node, 1)?;
    interp.turtle.set_position(interp.io.host.as_mut(), x, y)?;
    Ok(Datum::Nothing)
}

pub(super) fn setx(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let x = interp.num_arg(node, 0)?;
    let (_, y) = interp.turtle.position();
    interp.turtle.set_position(interp.io.host.as_mut(), x, y)?;
    Ok(Datum::Nothing)
}

pub(super) fn sety(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let y = interp.num_arg(node, 0)?;
    let (x, _) = interp.turtle.position();
    interp.turtle.set_position(interp.io.host.as_mut(), x, y)?;
    Ok(Datum::Nothing)
}

pub(super) fn setheading(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let degrees = interp.num_arg(node, 0)?;
    interp.turtle.set_heading(interp.io.host.as_mut(), degrees)?;
    Ok(Datum::Nothing)
}

pub(super) fn heading(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(number(interp.turtle.heading()))
}

pub(super) fn pos(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let (x, y) = interp.turtle.position();
    Ok(point(x, y))
}

pub(super) fn towards(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (x, y) = point_arg(interp, node, 0)?;
    Ok(number(interp.turtle.towards(x, y)))
}

pub(super) fn arc(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let angle = interp.num_arg(node, 0)?;
    let radius = interp.num_arg(node, 1)?;
    interp.turtle.arc(interp.io.host.as_mut(), angle, radius)?;
    Ok(Datum::Nothing)
}

pub(super) fn clearscreen(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.turtle.clear_screen(interp.io.host.as_mut())?;
    Ok(Datum::Nothing)
}

pub(super) fn clean(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.turtle.clean(interp.io.host.as_mut())?;
    Ok(Datum::Nothing)
}

pub(super) fn penup(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.turtle.set_pen_down(interp.io.host.as_mut(), false)?;
    Ok(Datum::Nothing)
}

pub(super) fn pendown(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.turtle.set_pen_down(interp.io.host.as_mut(), true)?;
    Ok(Datum::Nothing)
}

pub(super) fn pendownp(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(truth(interp.turtle.is_pen_down()))
}

pub(super) fn showturtle(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.turtle.set_visible(interp.io.host.as_mut(), true)?;
    Ok(Datum::Nothing)
}

pub(super) fn hideturtle(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.turtle.set_visible(interp.io.host.as_mut(), false)?;
    Ok(Datum::Nothing)
}

pub(super) fn shownp(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(truth(interp.turtle.is_visible()))
}

pub(super) fn setpencolor(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let color = color_arg(interp, node, 0)?;
    interp.turtle.set_pen_color(interp.io.host.as_mut(), color)?;
    Ok(Datum::Nothing)
}

pub(super) fn pencolor(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let [r, g, b] = Turtle::color_components(interp.turtle.pen_color());
    Ok(Datum::List(List::from_vec(vec![
        number(r),
        number(g),
        number(b),
    ])))
}

pub(super) fn setpalette(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let index = interp.nonneg_int_arg(node, 0)?;
    let color = color_arg(interp, node, 1)?;
    if !interp.turtle.set_palette_color(index as usize, color) {
        return Err(LogoError::doesnt_like(&node.name, &number(index as f64)));
    }
    Ok(Datum::Nothing)
}

pub(super) fn palette(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let index = interp.nonneg_int_arg(node, 0)?;
    let Some(color) = interp.turtle.palette_color(index as usize) else {
        return Err(LogoError::doesnt_like(&node.name, &number(index as f64)));
    };
    let [r, g, b] = Turtle::color_components(color);
    Ok(Datum::List(List::from_vec(vec![
        number(r),
        number(g),
        number(b),
    ])))
}

pub(super) fn setpensize(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let size = interp.num_arg(node, 0)?;
    interp.turtle.set_pen_size(interp.io.host.as_mut(), size)?;
    Ok(Datum::Nothing)
}

pub(super) fn pensize(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(number(interp.turtle.pen_size()))
}

pub(super) fn penpaint(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp
        .turtle
        .set_pen_mode(interp.io.host.as_mut(), PenMode::Paint)?;
    Ok(Datum::Nothing)
}

pub(super) fn penerase(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp
        .turtle
        .set_pen_mode(interp.io.host.as_mut(), PenMode::Erase)?;
    Ok(Datum::Nothing)
}

pub(super) fn penreverse(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp
        .turtle
        .set_pen_mode(interp.io.host.as_mut(), PenMode::Reverse)?;
    Ok(Datum::Nothing)
}

pub(super) fn penmode(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(Datum::Word(Word::new(interp.turtle.pen_mode_name(), false)))
}

pub(super) fn setbackground(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let color = color_arg(interp, node, 0)?;
    interp.turtle.set_background(interp.io.host.as_mut(), color)?;
    Ok(Datum::Nothing)
}

pub(super) fn background(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let [r, g, b] = Turtle::color_components(interp.turtle.background());
    Ok(Datum::List(List::from_vec(vec![
        number(r),
        number(g),
        number(b),
    ])))
}

pub(super) fn wrap(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.turtle.set_mode(interp.io.host.as_mut(), TurtleMode::Wrap)?;
    Ok(Datum::Nothing)
}

pub(super) fn fence(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.turtle.set_mode(interp.io.host.as_mut(), TurtleMode::Fence)?;
    Ok(Datum::Nothing)
}

pub(super) fn window(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    interp.turtle.set_mode(interp.io.host.as_mut(), TurtleMode::Window)?;
    Ok(Datum::Nothing)
}

pub(super) fn turtlemode(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(Datum::Word(Word::new(interp.turtle.mode_name(), false)))
}

pub(super) fn label(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    let text = crate::datum::print_datum(&value, &interp.print_options());
    interp.turtle.label(interp.io.host.as_mut(), &text)?;
    Ok(Datum::Nothing)
}

pub(super) fn setlabelheight(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let height = interp.num_arg(node, 0)?;
    interp.turtle.set_label_height(interp.io.host.as_mut(), height)?;
    Ok(Datum::Nothing)
}

pub(super) fn labelheight(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(number(interp.turtle.label_height()))
}

fn set_screen_mode(interp: &mut Interpreter, mode: ScreenMode) -> RunResult<Datum> {
    gfx(interp.io.host.set_screen_mode(mode))?;
    interp.screen_mode = mode;
    Ok(Datum::Nothing)
}

pub(super) fn textscreen(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    set_screen_mode(interp, ScreenMode::Text)
}

pub(super) fn fullscreen(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    set_screen_mode(interp, ScreenMode::Full)
}

pub(super) fn splitscreen(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    set_screen_mode(interp, ScreenMode::Split)
}

pub(super) fn screenmode(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = match interp.screen_mode {
        ScreenMode::Text => "textscreen",
        ScreenMode::Full => "fullscreen",
        ScreenMode::Split => "splitscreen",
    };
    Ok(Datum::Word(Word::new(name, false)))
}

pub(super) fn filled(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let color = color_arg(interp, node, 0)?;
    let body = interp.arg(node, 1)?;
    interp.turtle.begin_fill(interp.io.host.as_mut(), color)?;
    let result = interp.run_list(&body, None);
    interp.turtle.end_fill(interp.io.host.as_mut())?;
    result
}

pub(super) fn setbounds(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let x = interp.num_arg(node, 0)?;
    let y = interp.num_arg(node, 1)?;
    interp.turtle.set_bounds(interp.io.host.as_mut(), x, y)?;
    Ok(Datum::Nothing)
}

pub(super) fn bounds(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let (x, y) = interp.turtle.bounds();
    Ok(point(x, y))
}

pub(super) fn mousepos(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let (x, y) = gfx(interp.io.host.mouse_position())?;
    Ok(point(x, y))
}

pub(super) fn clickpos(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let (x, y) = gfx(interp.io.host.last_click_position())?;
    Ok(point(x, y))
}

pub(super) fn buttonp(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    Ok(truth(gfx(interp.io.host.is_button_down())?))
}

pub(super) fn button(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let button = gfx(interp.io.host.last_click_button())?;
    Ok(number(button as f64))
}

pub(super) fn savepict(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let name = interp.word_arg(node, 0)?;
    let bytes = if name.key().ends_with(".svg") {
        gfx(interp.io.host.get_svg())?
    } else {
        gfx(interp.io.host.get_image())?
    };
    interp.io.write_binary_file(&name, &bytes)?;
    Ok(Datum::Nothing)
}

pub(super) fn setscrunch(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let x = interp.num_arg(node, 0)?;
    let y = interp.num_arg(node, 1)?;
    interp.turtle.set_scrunch(interp.io.host.as_mut(), x, y)?;
    Ok(Datum::Nothing)
}

pub(super) fn scrunch(interp: &mut Interpreter, _node: &Rc<AstNode>) -> RunResult<Datum> {
    let (x, y) = interp.turtle.scrunch();
    Ok(point(x, y))
}
