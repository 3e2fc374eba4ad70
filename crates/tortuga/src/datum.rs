use std::{fmt, rc::Rc};

use crate::{
    ast::AstNode,
    procedures::Procedure,
    types::{Array, List, Word},
};

/// The universal Logo value.
///
/// One tagged type serves as word, list, array, AST node, and procedure, so
/// any of them can travel through variables, lists, and primitive arguments.
/// `Nothing` is the shared no-value instance: the initial value of a freshly
/// declared variable and the result of every command that outputs nothing.
///
/// Cloning is cheap everywhere: all content is reference-counted.
#[derive(Debug, Clone)]
pub enum Datum {
    Nothing,
    Word(Word),
    List(List),
    Array(Array),
    Ast(Rc<AstNode>),
    Procedure(Rc<Procedure>),
}

impl Datum {
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    #[must_use]
    pub fn as_word(&self) -> Option<&Word> {
        match self {
            Self::Word(w) => Some(w),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Show-form rendering with default limits. The workhorse for error
    /// messages and tests.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        show_datum(self, &PrintOptions::default())
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// Identity equality, the `.EQ` notion: same shared object, or both nothing,
/// or both the empty list.
#[must_use]
pub(crate) fn identity_eq(a: &Datum, b: &Datum) -> bool {
    match (a, b) {
        (Datum::Nothing, Datum::Nothing) => true,
        (Datum::Word(x), Datum::Word(y)) => x.ptr_eq(y),
        (Datum::List(x), Datum::List(y)) => x.ptr_eq(y),
        (Datum::Array(x), Datum::Array(y)) => x.ptr_eq(y),
        (Datum::Ast(x), Datum::Ast(y)) => Rc::ptr_eq(x, y),
        (Datum::Procedure(x), Datum::Procedure(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Value equality, the EQUALP notion. Words compare by content (numeric when
/// both are numbers), lists element-wise, arrays by identity.
#[must_use]
pub(crate) fn datums_equal(a: &Datum, b: &Datum, case_ignored: bool) -> bool {
    match (a, b) {
        (Datum::Nothing, Datum::Nothing) => true,
        (Datum::Word(x), Datum::Word(y)) => x.matches(y, case_ignored),
        (Datum::List(x), Datum::List(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            let mut xi = x.iter();
            let mut yi = y.iter();
            loop {
                match (xi.next(), yi.next()) {
                    (None, None) => return true,
                    (Some(xe), Some(ye)) => {
                        if !datums_equal(&xe, &ye, case_ignored) {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
        }
        (Datum::Array(x), Datum::Array(y)) => x.ptr_eq(y),
        _ => identity_eq(a, b),
    }
}

/// True when `candidate` is `target` or transitively contains it, following
/// both list and array links by identity. This is the guard the non-dot
/// mutators use to refuse cycle-creating arguments.
#[must_use]
pub(crate) fn contains_or_is(candidate: &Datum, target: &Datum) -> bool {
    let mut visited = Vec::new();
    contains_inner(candidate, target, &mut visited)
}

fn contains_inner(candidate: &Datum, target: &Datum, visited: &mut Vec<usize>) -> bool {
    if identity_eq(candidate, target) {
        return true;
    }
    match candidate {
        Datum::List(l) => {
            if l.is_empty() || visited.contains(&l.ptr_id()) {
                return false;
            }
            visited.push(l.ptr_id());
            let mut current = l.clone();
            loop {
                let Some(head) = current.head() else { return false };
                if contains_inner(&head, target, visited) {
                    return true;
                }
                let next = current.butfirst();
                if next.is_empty() || visited.contains(&next.ptr_id()) {
                    return false;
                }
                visited.push(next.ptr_id());
                current = next;
            }
        }
        Datum::Array(a) => {
            if visited.contains(&a.ptr_id()) {
                return false;
            }
            visited.push(a.ptr_id());
            a.items().iter().any(|item| contains_inner(item, target, visited))
        }
        _ => false,
    }
}

/// Options controlling datum rendering.
///
/// `depth` and `width` follow the PRINTDEPTHLIMIT / PRINTWIDTHLIMIT
/// conventions: −1 means unlimited, a depth of 0 renders the container as
/// `...`, a width of N renders at most N elements of a container (and N
/// characters of a word) before `...`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PrintOptions {
    pub full: bool,
    pub depth: i64,
    pub width: i64,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            full: false,
            depth: -1,
            width: -1,
        }
    }
}

/// PRINT-form rendering: lists lose their outermost brackets.
#[must_use]
pub(crate) fn print_datum(d: &Datum, opts: &PrintOptions) -> String {
    let mut out = String::new();
    let mut visited = Vec::new();
    write_datum(&mut out, d, opts, opts.depth, &mut visited, false);
    out
}

/// SHOW-form rendering: lists keep their brackets.
#[must_use]
pub(crate) fn show_datum(d: &Datum, opts: &PrintOptions) -> String {
    let mut out = String::new();
    let mut visited = Vec::new();
    write_datum(&mut out, d, opts, opts.depth, &mut visited, true);
    out
}

fn write_word(out: &mut String, w: &Word, opts: &PrintOptions) {
    let text = w.print();
    let needs_bars = opts.full && text.chars().any(|c| " \t\n[]{}();\"\\|".contains(c));
    if needs_bars {
        out.push('|');
        for c in text.chars() {
            if c == '|' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('|');
        return;
    }
    if opts.width >= 0 {
        let mut count = 0;
        for c in text.chars() {
            if count >= opts.width {
                out.push_str("...");
                return;
            }
            out.push(c);
            count += 1;
        }
    } else {
        out.push_str(text);
    }
}

fn write_items(
    out: &mut String,
    items: impl Iterator<Item = Datum>,
    opts: &PrintOptions,
    depth: i64,
    visited: &mut Vec<usize>,
) {
    let mut first = true;
    let mut count = 0;
    for item in items {
        if !first {
            out.push(' ');
        }
        first = false;
        if opts.width >= 0 && count >= opts.width {
            out.push_str("...");
            return;
        }
        write_datum(out, &item, opts, depth, visited, true);
        count += 1;
    }
}

fn write_datum(
    out: &mut String,
    d: &Datum,
    opts: &PrintOptions,
    depth: i64,
    visited: &mut Vec<usize>,
    brackets: bool,
) {
    match d {
        Datum::Nothing => {}
        Datum::Word(w) => write_word(out, w, opts),
        Datum::List(l) => {
            if depth == 0 {
                out.push_str("...");
                return;
            }
            if !l.is_empty() && visited.contains(&l.ptr_id()) {
                out.push_str("...");
                return;
            }
            if brackets {
                out.push('[');
            }
            let inner_depth = if depth > 0 { depth - 1 } else { depth };
            // walk cell by cell: cyclic tails (buildable with the
            // dot-mutators) must render finitely
            let mut pushed: Vec<usize> = Vec::new();
            if !l.is_empty() {
                visited.push(l.ptr_id());
                pushed.push(l.ptr_id());
            }
            let mut current = l.clone();
            let mut first = true;
            let mut count = 0;
            while let Some(head) = current.head() {
                if !first {
                    out.push(' ');
                }
                first = false;
                if opts.width >= 0 && count >= opts.width {
                    out.push_str("...");
                    break;
                }
                write_datum(out, &head, opts, inner_depth, visited, true);
                count += 1;
                let next = current.butfirst();
                if next.is_empty() {
                    break;
                }
                if visited.contains(&next.ptr_id()) {
                    out.push_str(" ...");
                    break;
                }
                visited.push(next.ptr_id());
                pushed.push(next.ptr_id());
                current = next;
            }
            visited.retain(|id| !pushed.contains(id));
            if brackets {
                out.push(']');
            }
        }
        Datum::Array(a) => {
            if depth == 0 {
                out.push_str("...");
                return;
            }
            if visited.contains(&a.ptr_id()) {
                out.push_str("...");
                return;
            }
            visited.push(a.ptr_id());
            out.push('{');
            let inner_depth = if depth > 0 { depth - 1 } else { depth };
            write_items(out, a.items().into_iter(), opts, inner_depth, visited);
            out.push('}');
            if a.origin() != 1 {
                out.push('@');
                out.push_str(&a.origin().to_string());
            }
            visited.retain(|id| *id != a.ptr_id());
        }
        Datum::Ast(node) => {
            out.push_str(node.name.print());
        }
        Datum::Procedure(_) => out.push_str("[procedure]"),
    }
}

/// Source (re-readable) form of a word: vertical bars added when the print
/// form would not survive re-tokenization.
#[must_use]
pub(crate) fn source_word(w: &Word) -> String {
    let text = w.print();
    let needs_bars =
        text.is_empty() || text.chars().any(|c| " \t\n[]{}();|\\".contains(c));
    if !needs_bars {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('|');
    for c in text.chars() {
        if c == '|' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('|');
    out
}

/// Source form of one instruction line: elements joined by spaces, no outer
/// brackets. Words round-trip because tokenized lines keep their `"` and `:`
/// prefixes in the raw form.
#[must_use]
pub(crate) fn source_line(l: &List) -> String {
    let mut out = String::new();
    let mut first = true;
    for item in l.iter() {
        if !first {
            out.push(' ');
        }
        first = false;
        write_source(&mut out, &item);
    }
    out
}

fn write_source(out: &mut String, d: &Datum) {
    match d {
        Datum::Word(w) => out.push_str(&source_word(w)),
        Datum::List(l) => {
            out.push('[');
            out.push_str(&source_line(l));
            out.push(']');
        }
        Datum::Array(a) => {
            out.push('{');
            let mut first = true;
            for item in a.items() {
                if !first {
                    out.push(' ');
                }
                first = false;
                write_source(out, &item);
            }
            out.push('}');
            if a.origin() != 1 {
                out.push('@');
                out.push_str(&a.origin().to_string());
            }
        }
        other => out.push_str(&other.to_display_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Datum {
        Datum::Word(Word::new(s, false))
    }

    #[test]
    fn print_strips_outer_brackets_show_keeps_them() {
        let l = Datum::List(List::from_vec(vec![
            word("a"),
            Datum::List(List::from_vec(vec![word("b")])),
        ]));
        assert_eq!(print_datum(&l, &PrintOptions::default()), "a [b]");
        assert_eq!(show_datum(&l, &PrintOptions::default()), "[a [b]]");
    }

    #[test]
    fn array_rendering_includes_nondefault_origin() {
        let a = Datum::Array(Array::from_list(0, &List::from_vec(vec![word("x")])));
        assert_eq!(show_datum(&a, &PrintOptions::default()), "{x}@0");
        let b = Datum::Array(Array::from_list(1, &List::from_vec(vec![word("x")])));
        assert_eq!(show_datum(&b, &PrintOptions::default()), "{x}");
    }

    #[test]
    fn depth_limit_elides_sublists() {
        let inner = Datum::List(List::from_vec(vec![word("deep")]));
        let l = Datum::List(List::from_vec(vec![word("a"), inner]));
        let opts = PrintOptions {
            depth: 1,
            ..PrintOptions::default()
        };
        assert_eq!(show_datum(&l, &opts), "[a ...]");
    }

    #[test]
    fn width_limit_elides_elements() {
        let l = Datum::List(List::from_vec(vec![word("a"), word("b"), word("c")]));
        let opts = PrintOptions {
            width: 2,
            ..PrintOptions::default()
        };
        assert_eq!(show_datum(&l, &opts), "[a b ...]");
    }

    #[test]
    fn cyclic_list_prints_finitely() {
        let l = List::from_vec(vec![word("a")]);
        // tie the knot with the dangerous mutator
        assert!(l.set_tail(l.clone()));
        let rendered = show_datum(&Datum::List(l), &PrintOptions::default());
        assert!(rendered.contains("..."));
    }

    #[test]
    fn containment_check_is_transitive() {
        let inner = List::from_vec(vec![word("x")]);
        let outer = List::from_vec(vec![Datum::List(inner.clone())]);
        assert!(contains_or_is(&Datum::List(outer.clone()), &Datum::List(inner)));
        assert!(!contains_or_is(&word("x"), &Datum::List(outer)));
    }

    #[test]
    fn equality_numeric_and_case_rules() {
        assert!(datums_equal(&word("2"), &word("2.0"), true));
        assert!(datums_equal(&word("AB"), &word("ab"), true));
        assert!(!datums_equal(&word("AB"), &word("ab"), false));
        let a = Datum::Array(Array::new(1, 1));
        let b = Datum::Array(Array::new(1, 1));
        assert!(!datums_equal(&a, &b, true));
        assert!(datums_equal(&a, &a.clone(), true));
    }

    #[test]
    fn source_word_adds_bars_when_needed() {
        assert_eq!(source_word(&Word::new("plain", false)), "plain");
        assert_eq!(
            source_word(&Word::new("two words".chars().map(crate::types::word::char_to_raw).collect::<String>(), true)),
            "|two words|"
        );
    }
}
