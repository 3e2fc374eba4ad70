//! Arithmetic, bitwise, logic, and comparison primitives.

use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::truth;
use crate::{
    ast::AstNode,
    datum::{Datum, datums_equal},
    interp::Interpreter,
    signal::{LogoError, RunResult},
    types::Word,
};

fn number(n: f64) -> Datum {
    Datum::Word(Word::from_number(n))
}

pub(super) fn sum(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let mut total = 0.0;
    for i in 0..node.children.len() {
        total += interp.num_arg(node, i)?;
    }
    Ok(number(total))
}

pub(super) fn difference(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.num_arg(node, 0)?;
    let b = interp.num_arg(node, 1)?;
    Ok(number(a - b))
}

pub(super) fn minus(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    Ok(number(-n))
}

pub(super) fn product(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let mut total = 1.0;
    for i in 0..node.children.len() {
        total *= interp.num_arg(node, i)?;
    }
    Ok(number(total))
}

pub(super) fn quotient(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let (a, b) = if node.children.len() == 1 {
        (1.0, interp.num_arg(node, 0)?)
    } else {
        (interp.num_arg(node, 0)?, interp.num_arg(node, 1)?)
    };
    if b == 0.0 {
        return Err(LogoError::doesnt_like(&node.name, &number(0.0)));
    }
    Ok(number(a / b))
}

pub(super) fn remainder(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.int_arg(node, 0)?;
    let b = interp.int_arg(node, 1)?;
    if b == 0 {
        return Err(LogoError::doesnt_like(&node.name, &number(0.0)));
    }
    Ok(number((a % b) as f64))
}

pub(super) fn modulo(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.int_arg(node, 0)?;
    let b = interp.int_arg(node, 1)?;
    if b == 0 {
        return Err(LogoError::doesnt_like(&node.name, &number(0.0)));
    }
    // result takes the sign of the divisor
    let m = a % b;
    let m = if m != 0 && (m < 0) != (b < 0) { m + b } else { m };
    Ok(number(m as f64))
}

pub(super) fn int(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    Ok(number(n.trunc()))
}

pub(super) fn round(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    Ok(number(n.round()))
}

pub(super) fn power(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.num_arg(node, 0)?;
    let b = interp.num_arg(node, 1)?;
    let result = a.powf(b);
    if result.is_nan() {
        return Err(LogoError::doesnt_like(&node.name, &number(a)));
    }
    Ok(number(result))
}

pub(super) fn sqrt(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    if n < 0.0 {
        return Err(LogoError::doesnt_like(&node.name, &number(n)));
    }
    Ok(number(n.sqrt()))
}

pub(super) fn exp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    Ok(number(n.exp()))
}

pub(super) fn log10(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    if n <= 0.0 {
        return Err(LogoError::doesnt_like(&node.name, &number(n)));
    }
    Ok(number(n.log10()))
}

pub(super) fn ln(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    if n <= 0.0 {
        return Err(LogoError::doesnt_like(&node.name, &number(n)));
    }
    Ok(number(n.ln()))
}

pub(super) fn sin(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    Ok(number(n.to_radians().sin()))
}

pub(super) fn radsin(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    Ok(number(n.sin()))
}

pub(super) fn cos(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    Ok(number(n.to_radians().cos()))
}

pub(super) fn radcos(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    Ok(number(n.cos()))
}

pub(super) fn arctan(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    if node.children.len() == 2 {
        let x = interp.num_arg(node, 0)?;
        let y = interp.num_arg(node, 1)?;
        Ok(number(y.atan2(x).to_degrees()))
    } else {
        let n = interp.num_arg(node, 0)?;
        Ok(number(n.atan().to_degrees()))
    }
}

pub(super) fn radarctan(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    if node.children.len() == 2 {
        let x = interp.num_arg(node, 0)?;
        let y = interp.num_arg(node, 1)?;
        Ok(number(y.atan2(x)))
    } else {
        let n = interp.num_arg(node, 0)?;
        Ok(number(n.atan()))
    }
}

pub(super) fn random(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    if node.children.len() == 2 {
        let low = interp.int_arg(node, 0)?;
        let high = interp.int_arg(node, 1)?;
        if high < low {
            return Err(LogoError::doesnt_like(&node.name, &number(high as f64)));
        }
        let value = interp.rng.gen_range(low..=high);
        Ok(number(value as f64))
    } else {
        let limit = interp.nonneg_int_arg(node, 0)?;
        if limit == 0 {
            return Err(LogoError::doesnt_like(&node.name, &number(0.0)));
        }
        let value = interp.rng.gen_range(0..limit);
        Ok(number(value as f64))
    }
}

pub(super) fn rerandom(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let seed = if node.children.is_empty() {
        0
    } else {
        interp.int_arg(node, 0)?
    };
    interp.rng = ChaCha8Rng::seed_from_u64(seed as u64);
    Ok(Datum::Nothing)
}

pub(super) fn form(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.num_arg(node, 0)?;
    let width = interp.nonneg_int_arg(node, 1)? as usize;
    let precision = interp.nonneg_int_arg(node, 2)? as usize;
    Ok(Datum::Word(Word::new(
        format!("{n:>width$.precision$}"),
        false,
    )))
}

pub(super) fn bitand(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let mut total: i64 = -1;
    for i in 0..node.children.len() {
        total &= interp.int_arg(node, i)?;
    }
    Ok(number(total as f64))
}

pub(super) fn bitor(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let mut total: i64 = 0;
    for i in 0..node.children.len() {
        total |= interp.int_arg(node, i)?;
    }
    Ok(number(total as f64))
}

pub(super) fn bitxor(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let mut total: i64 = 0;
    for i in 0..node.children.len() {
        total ^= interp.int_arg(node, i)?;
    }
    Ok(number(total as f64))
}

pub(super) fn bitnot(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.int_arg(node, 0)?;
    Ok(number(!n as f64))
}

pub(super) fn ashift(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.int_arg(node, 0)?;
    let bits = interp.int_arg(node, 1)?;
    let shifted = if bits >= 0 {
        n.wrapping_shl(bits.unsigned_abs().min(63) as u32)
    } else {
        n.wrapping_shr(bits.unsigned_abs().min(63) as u32)
    };
    Ok(number(shifted as f64))
}

pub(super) fn lshift(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let n = interp.int_arg(node, 0)? as u64;
    let bits = interp.int_arg(node, 1)?;
    let shifted = if bits >= 0 {
        n.wrapping_shl(bits.unsigned_abs().min(63) as u32)
    } else {
        n.wrapping_shr(bits.unsigned_abs().min(63) as u32)
    };
    Ok(number(shifted as i64 as f64))
}

/// A boolean operand for AND/OR/NOT: a TRUE/FALSE word, or a list evaluated
/// lazily that must output one.
fn bool_operand(interp: &mut Interpreter, node: &AstNode, value: Datum) -> RunResult<bool> {
    match &value {
        Datum::Word(w) => w
            .as_bool()
            .ok_or_else(|| LogoError::doesnt_like(&node.name, &value)),
        Datum::List(_) => {
            let result = interp.run_list(&value, None)?;
            result
                .as_word()
                .and_then(Word::as_bool)
                .ok_or_else(|| LogoError::doesnt_like(&node.name, &result))
        }
        other => Err(LogoError::doesnt_like(&node.name, other)),
    }
}

pub(super) fn and(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    for i in 0..node.children.len() {
        let value = interp.arg(node, i)?;
        if !bool_operand(interp, node, value)? {
            return Ok(truth(false));
        }
    }
    Ok(truth(true))
}

pub(super) fn or(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    for i in 0..node.children.len() {
        let value = interp.arg(node, i)?;
        if bool_operand(interp, node, value)? {
            return Ok(truth(true));
        }
    }
    Ok(truth(false))
}

pub(super) fn not(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let value = interp.arg(node, 0)?;
    let b = bool_operand(interp, node, value)?;
    Ok(truth(!b))
}

pub(super) fn equalp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.arg(node, 0)?;
    let b = interp.arg(node, 1)?;
    let case_ignored = interp.case_ignored();
    Ok(truth(datums_equal(&a, &b, case_ignored)))
}

pub(super) fn notequalp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.arg(node, 0)?;
    let b = interp.arg(node, 1)?;
    let case_ignored = interp.case_ignored();
    Ok(truth(!datums_equal(&a, &b, case_ignored)))
}

pub(super) fn lessp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.num_arg(node, 0)?;
    let b = interp.num_arg(node, 1)?;
    Ok(truth(a < b))
}

pub(super) fn greaterp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.num_arg(node, 0)?;
    let b = interp.num_arg(node, 1)?;
    Ok(truth(a > b))
}

pub(super) fn lessequalp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.num_arg(node, 0)?;
    let b = interp.num_arg(node, 1)?;
    Ok(truth(a <= b))
}

pub(super) fn greaterequalp(interp: &mut Interpreter, node: &Rc<AstNode>) -> RunResult<Datum> {
    let a = interp.num_arg(node, 0)?;
    let b = interp.num_arg(node, 1)?;
    Ok(truth(a >= b))
}
