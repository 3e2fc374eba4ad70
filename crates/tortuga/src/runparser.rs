//! The run-parser: the second tokenization pass.
//!
//! Takes a token list and splits every word so that infix operators and
//! parentheses become their own one-element words, numeric literals become
//! numeric words, and `?n` becomes the four-token sequence `( ? n )`. A
//! leading minus that is not the whole token is the unary minus and is
//! rewritten as `0 -- x`.
//!
//! Forever-special words are never re-tokenized, which also makes the pass
//! idempotent: the operator words it emits are themselves forever-special.

use crate::{
    datum::Datum,
    reader::tokenize_text,
    signal::{LogoError, RunResult},
    types::{List, ListBuilder, Word},
};

const SPECIAL: &str = "+-()*%/<>=";

fn is_special(c: char) -> bool {
    SPECIAL.contains(c)
}

struct WordScan<'a> {
    chars: Vec<char>,
    pos: usize,
    out: &'a mut ListBuilder,
}

impl WordScan<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn emit_operator(&mut self, text: &str) {
        self.out.push(Datum::Word(Word::new(text, true)));
    }

    /// One or two special characters; `<=`, `>=`, and `<>` combine.
    fn scan_special(&mut self) {
        let first = self.chars[self.pos];
        self.pos += 1;
        let mut token = String::from(first);
        if let Some(second) = self.peek() {
            let combines = matches!((first, second), ('<', '=') | ('<', '>') | ('>', '='));
            if combines {
                token.push(second);
                self.pos += 1;
            }
        }
        self.emit_operator(&token);
    }

    /// A run of ordinary characters, ending at a special character. Handles
    /// the `?n` expansion at the start of a token.
    fn scan_string(&mut self) {
        let mut token = String::new();
        if self.peek() == Some('?') {
            self.pos += 1;
            if let Some(number) = self.scan_number() {
                self.emit_operator("(");
                self.emit_operator("?");
                self.out.push(Datum::Word(number));
                self.emit_operator(")");
                return;
            }
            token.push('?');
        }
        while let Some(c) = self.peek() {
            if is_special(c) {
                break;
            }
            token.push(c);
            self.pos += 1;
        }
        self.out.push(Datum::Word(Word::new(token, false)));
    }

    /// A leading minus that is not the whole token: either the sign of a
    /// numeric literal, or the unary minus, which is emitted as `0 --`.
    fn scan_minus(&mut self) {
        if self.pos + 1 >= self.chars.len() {
            self.scan_special();
            return;
        }
        if let Some(number) = self.scan_number() {
            self.out.push(Datum::Word(number));
            return;
        }
        self.emit_operator("0");
        self.emit_operator("--");
        self.pos += 1;
    }

    /// Numeric literal recognition: sign, integer part, optional fraction,
    /// optional exponent; the literal must be terminated by the end of the
    /// token or a special character.
    fn scan_number(&mut self) -> Option<Word> {
        let n = self.chars.len();
        let mut i = self.pos;
        let mut text = String::new();
        let mut has_digit = false;

        if i < n && self.chars[i] == '-' {
            text.push('-');
            i += 1;
        }
        if i >= n {
            return None;
        }
        while i < n && self.chars[i].is_ascii_digit() {
            text.push(self.chars[i]);
            i += 1;
            has_digit = true;
        }
        if i < n && self.chars[i] == '.' {
            text.push('.');
            i += 1;
            while i < n && self.chars[i].is_ascii_digit() {
                text.push(self.chars[i]);
                i += 1;
                has_digit = true;
            }
        }
        if !has_digit {
            return None;
        }
        if i < n && matches!(self.chars[i], 'e' | 'E') {
            let mut j = i + 1;
            let mut exponent = String::from(self.chars[i]);
            if j < n && matches!(self.chars[j], '+' | '-') {
                exponent.push(self.chars[j]);
                j += 1;
            }
            let mut exp_digit = false;
            while j < n && self.chars[j].is_ascii_digit() {
                exponent.push(self.chars[j]);
                j += 1;
                exp_digit = true;
            }
            if !exp_digit {
                return None;
            }
            text.push_str(&exponent);
            i = j;
        }
        if i < n && !is_special(self.chars[i]) {
            return None;
        }
        let value: f64 = text.parse().ok()?;
        self.pos = i;
        Some(Word::from_number(value))
    }

    /// A token starting with `"`: copied through to the end of the word,
    /// stopping only at parentheses.
    fn scan_quoted(&mut self) {
        let mut token = String::new();
        while let Some(c) = self.peek() {
            if c == '(' || c == ')' {
                break;
            }
            token.push(c);
            self.pos += 1;
        }
        self.out.push(Datum::Word(Word::new(token, false)));
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            if is_special(c) {
                if c == '-' && self.pos == 0 && self.chars.len() != 1 {
                    self.scan_minus();
                } else {
                    self.scan_special();
                }
                continue;
            }
            if c == '"' {
                self.scan_quoted();
                continue;
            }
            match self.scan_number() {
                Some(number) => self.out.push(Datum::Word(number)),
                None => self.scan_string(),
            }
        }
    }
}

/// Run-parses a token list.
pub(crate) fn runparse_list(src: &List) -> List {
    let mut out = ListBuilder::new();
    for element in src.iter() {
        match &element {
            Datum::Word(w) => {
                if w.is_forever_special() {
                    out.push(element.clone());
                    continue;
                }
                let mut scan = WordScan {
                    chars: w.raw().chars().collect(),
                    pos: 0,
                    out: &mut out,
                };
                scan.run();
            }
            other => out.push(other.clone()),
        }
    }
    out.finish()
}

/// Run-parses any word-or-list input: words are tokenized first, the way the
/// RUNPARSE primitive and RUN over words behave.
pub(crate) fn runparse(src: &Datum) -> RunResult<List> {
    match src {
        Datum::List(l) => Ok(runparse_list(l)),
        Datum::Word(w) => {
            if w.is_forever_special() {
                return Ok(List::from_vec(vec![src.clone()]));
            }
            match tokenize_text(w.raw())? {
                Datum::List(l) => Ok(runparse_list(&l)),
                other => Ok(List::from_vec(vec![other])),
            }
        }
        other => Err(LogoError::doesnt_like(&Word::new("runparse", false), other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<String> {
        let Datum::List(tokens) = tokenize_text(text).unwrap() else {
            panic!("expected list");
        };
        runparse_list(&tokens)
            .iter()
            .map(|d| d.to_display_string())
            .collect()
    }

    #[test]
    fn infix_operators_become_their_own_tokens() {
        assert_eq!(parse("2+3"), ["2", "+", "3"]);
        assert_eq!(parse("a*b"), ["a", "*", "b"]);
        assert_eq!(parse("(f 1)"), ["(", "f", "1", ")"]);
    }

    #[test]
    fn comparison_operators_combine() {
        assert_eq!(parse("a<=b"), ["a", "<=", "b"]);
        assert_eq!(parse("a>=b"), ["a", ">=", "b"]);
        assert_eq!(parse("a<>b"), ["a", "<>", "b"]);
        assert_eq!(parse("a<b"), ["a", "<", "b"]);
    }

    #[test]
    fn numeric_literals_are_recognized() {
        assert_eq!(parse("12.5"), ["12.5"]);
        assert_eq!(parse("1e3"), ["1000"]);
        assert_eq!(parse("-4"), ["-4"]);
        assert_eq!(parse("5."), ["5"]);
        assert_eq!(parse(".5"), ["0.5"]);
    }

    #[test]
    fn number_must_end_at_special_or_token_end() {
        assert_eq!(parse("5x"), ["5x"]);
        assert_eq!(parse("5e"), ["5e"]);
        assert_eq!(parse("5+x"), ["5", "+", "x"]);
    }

    #[test]
    fn unary_minus_emits_zero_minus_minus() {
        // a leading minus that is not the whole token is the unary minus
        assert_eq!(parse("-:x"), ["0", "--", ":x"]);
        // mid-word it is the ordinary binary operator
        assert_eq!(parse(":n-1"), [":n", "-", "1"]);
    }

    #[test]
    fn lone_minus_is_an_operator() {
        assert_eq!(parse("5 - 3"), ["5", "-", "3"]);
    }

    #[test]
    fn quoted_words_copy_through_to_parens() {
        assert_eq!(parse("\"a+b"), ["\"a+b"]);
        assert_eq!(parse("(\"x)"), ["(", "\"x", ")"]);
    }

    #[test]
    fn explicit_slot_numbers_expand() {
        assert_eq!(parse("?2"), ["(", "?", "2", ")"]);
        assert_eq!(parse("?"), ["?"]);
    }

    #[test]
    fn runparse_is_idempotent() {
        for text in ["print 2+3*4", ":n-1", "(sum 1 2)", "?3", "- -5", "a<=b"] {
            let Datum::List(tokens) = tokenize_text(text).unwrap() else {
                panic!();
            };
            let once = runparse_list(&tokens);
            let twice = runparse_list(&once);
            assert!(
                crate::datum::datums_equal(
                    &Datum::List(once.clone()),
                    &Datum::List(twice),
                    true
                ),
                "runparse not idempotent for {text:?}: {:?}",
                once.iter().map(|d| d.to_display_string()).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn forever_special_words_are_never_retokenized() {
        let vbarred = Word::new(
            "a+b".chars().map(crate::types::word::char_to_raw).collect::<String>(),
            true,
        );
        let src = List::from_vec(vec![Datum::Word(vbarred)]);
        let parsed = runparse_list(&src);
        assert_eq!(parsed.count(), 1);
        assert_eq!(parsed.item_at(1).unwrap().to_display_string(), "a+b");
    }
}
