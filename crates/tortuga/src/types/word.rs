use std::{cell::OnceCell, cmp::Ordering, fmt, rc::Rc};

/// Characters with syntactic meaning to the reader or run-parser.
///
/// A character in this set that entered the program through vertical bars or a
/// backslash escape is stored *raw-encoded* (shifted into the Unicode private
/// use area) so later tokenization passes treat it as an ordinary character.
const PROTECTED: &str = " \t\n[]{}()+-*/%<>=\";:|\\~?#";

/// Offset into the private use area used for raw encoding.
const RAW_OFFSET: u32 = 0xE000;

/// Encodes a protected character for storage in a word's raw form.
///
/// Non-protected characters pass through unchanged.
#[must_use]
pub(crate) fn char_to_raw(c: char) -> char {
    if PROTECTED.contains(c) {
        char::from_u32(c as u32 + RAW_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

/// Decodes a raw-encoded character back to its source character.
///
/// Characters outside the raw-encoded range pass through unchanged.
#[must_use]
pub(crate) fn raw_to_char(c: char) -> char {
    let u = c as u32;
    if (RAW_OFFSET..RAW_OFFSET + 0x80).contains(&u) {
        match char::from_u32(u - RAW_OFFSET) {
            Some(base) if PROTECTED.contains(base) => base,
            _ => c,
        }
    } else {
        c
    }
}

/// Decodes every raw-encoded character in a string.
#[must_use]
pub(crate) fn decode_raw(s: &str) -> String {
    s.chars().map(raw_to_char).collect()
}

/// Formats a number the way Logo prints it: integers without a decimal point,
/// everything else in shortest-roundtrip form.
#[must_use]
pub fn fmt_number(n: f64) -> String {
    if n.is_finite() && n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let mut buffer = ryu::Buffer::new();
        buffer.format(n).to_string()
    }
}

/// Parses a word's print form as a Logo number.
///
/// Accepts sign, digits, fraction, and exponent; rejects anything containing
/// other characters (so `inf`, `NaN`, and hex forms never count as numbers)
/// and rejects non-finite results.
fn parse_number(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    let mut has_digit = false;
    for c in s.chars() {
        match c {
            '0'..='9' => has_digit = true,
            '.' | '+' | '-' | 'e' | 'E' => {}
            _ => return None,
        }
    }
    if !has_digit {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug)]
struct WordInner {
    /// Raw form: byte-exact input with protected characters raw-encoded.
    /// Immutable after construction.
    raw: String,
    /// Set when the raw form came from between vertical bars. Such words are
    /// never re-tokenized by the run-parser.
    forever_special: bool,
    /// Set when the word was constructed from a number.
    source_number: Option<f64>,
    print: OnceCell<String>,
    key: OnceCell<String>,
    number: OnceCell<Option<f64>>,
    boolean: OnceCell<Option<bool>>,
}

/// The atomic Logo value: a name, a number, or a literal string.
///
/// A word carries three lazily-computed projections of its raw form:
/// - *print*: raw-encoded characters decoded, used for output,
/// - *key*: print form case-folded, used for every name lookup,
/// - plus cached number and boolean interpretations with separate validity.
///
/// Cloning a word is cheap: the content is shared behind an `Rc`.
#[derive(Debug, Clone)]
pub struct Word {
    inner: Rc<WordInner>,
}

impl Word {
    /// Creates a word from a raw string.
    #[must_use]
    pub fn new(raw: impl Into<String>, forever_special: bool) -> Self {
        Self {
            inner: Rc::new(WordInner {
                raw: raw.into(),
                forever_special,
                source_number: None,
                print: OnceCell::new(),
                key: OnceCell::new(),
                number: OnceCell::new(),
                boolean: OnceCell::new(),
            }),
        }
    }

    /// Creates a word from a number. The printed form is canonical and the
    /// number cache is pre-filled.
    #[must_use]
    pub fn from_number(n: f64) -> Self {
        let raw = fmt_number(n);
        let number = OnceCell::new();
        let _ = number.set(Some(n));
        Self {
            inner: Rc::new(WordInner {
                raw,
                forever_special: false,
                source_number: Some(n),
                print: OnceCell::new(),
                key: OnceCell::new(),
                number,
                boolean: OnceCell::new(),
            }),
        }
    }

    /// The raw form, exactly as constructed.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.inner.raw
    }

    /// The print form: raw-encoded characters decoded.
    #[must_use]
    pub fn print(&self) -> &str {
        self.inner.print.get_or_init(|| decode_raw(&self.inner.raw))
    }

    /// The key form: print form case-folded, used for name lookups.
    #[must_use]
    pub fn key(&self) -> &str {
        self.inner.key.get_or_init(|| self.print().to_lowercase())
    }

    #[must_use]
    pub fn is_forever_special(&self) -> bool {
        self.inner.forever_special
    }

    /// True when the word was constructed directly from a number.
    #[must_use]
    pub fn source_is_number(&self) -> bool {
        self.inner.source_number.is_some()
    }

    /// The numeric interpretation of the word, if the print form is a finite
    /// number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        *self
            .inner
            .number
            .get_or_init(|| self.inner.source_number.or_else(|| parse_number(self.print())))
    }

    /// The boolean interpretation of the word, if the key form is `true` or
    /// `false`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        *self.inner.boolean.get_or_init(|| match self.key() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        })
    }

    /// Number of characters in the print form.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.print().chars().count()
    }

    /// True when the two words share content storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Word equality. Numeric words compare numerically; everything else
    /// compares by print form, case-folded when `case_ignored` is set.
    #[must_use]
    pub fn matches(&self, other: &Self, case_ignored: bool) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a == b;
        }
        if case_ignored {
            self.key() == other.key()
        } else {
            self.print() == other.print()
        }
    }

    /// Lexicographic ordering on the print form, honoring the case-fold
    /// setting. Used by BEFOREP.
    #[must_use]
    pub fn cmp_words(&self, other: &Self, case_ignored: bool) -> Ordering {
        if case_ignored {
            self.key().cmp(other.key())
        } else {
            self.print().cmp(other.print())
        }
    }

    /// Concatenates the raw forms of two words. The result is forever-special
    /// if either input was.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut raw = String::with_capacity(self.raw().len() + other.raw().len());
        raw.push_str(self.raw());
        raw.push_str(other.raw());
        Self::new(raw, self.is_forever_special() || other.is_forever_special())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.print())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_decodes_raw_encoding() {
        let raw: String = "a b".chars().map(char_to_raw).collect();
        let w = Word::new(raw, true);
        assert_eq!(w.print(), "a b");
    }

    #[test]
    fn key_is_case_folded() {
        let w = Word::new("ForWard", false);
        assert_eq!(w.key(), "forward");
    }

    #[test]
    fn number_projection_validity() {
        assert_eq!(Word::new("12.5", false).as_number(), Some(12.5));
        assert_eq!(Word::new("1e3", false).as_number(), Some(1000.0));
        assert_eq!(Word::new("0", false).as_number(), Some(0.0));
        assert_eq!(Word::new("twelve", false).as_number(), None);
        assert_eq!(Word::new("inf", false).as_number(), None);
        assert_eq!(Word::new("", false).as_number(), None);
    }

    #[test]
    fn bool_projection_is_case_insensitive() {
        assert_eq!(Word::new("TRUE", false).as_bool(), Some(true));
        assert_eq!(Word::new("False", false).as_bool(), Some(false));
        assert_eq!(Word::new("maybe", false).as_bool(), None);
    }

    #[test]
    fn numbers_print_like_logo() {
        assert_eq!(Word::from_number(120.0).print(), "120");
        assert_eq!(Word::from_number(0.5).print(), "0.5");
        assert_eq!(Word::from_number(-3.0).print(), "-3");
    }

    #[test]
    fn numeric_words_compare_numerically() {
        assert!(Word::new("2", false).matches(&Word::new("2.0", false), true));
        assert!(!Word::new("2", false).matches(&Word::new("3", false), true));
    }

    #[test]
    fn case_fold_honored_by_equality() {
        let a = Word::new("Hello", false);
        let b = Word::new("hello", false);
        assert!(a.matches(&b, true));
        assert!(!a.matches(&b, false));
    }

    #[test]
    fn concat_preserves_forever_special() {
        let a = Word::new("ab", true);
        let b = Word::new("cd", false);
        assert!(a.concat(&b).is_forever_special());
        assert_eq!(a.concat(&b).print(), "abcd");
    }
}
