//! The reader: turns raw characters into words and token lists.
//!
//! One `TextStream` wraps a character source (the host console, an open file,
//! or in-memory text) and provides the READRAWLINE / READWORD / READLIST
//! layers on top of it. READLIST is the tokenizer: it honors vertical bars,
//! backslash escapes, `~` continuation, `;` and `#!` comments, `[...]`
//! sublists, and `{...}@origin` array literals.

use std::{
    fs::File,
    io::{Read, Seek, Write as _},
};

use crate::{
    datum::Datum,
    host::{Host, NullHost},
    signal::{LogoError, RunResult},
    types::{Array, List, ListBuilder, Word, word::char_to_raw},
};

#[derive(Debug)]
enum Source {
    Console,
    File(File),
    Text { chars: Vec<char>, pos: usize },
}

/// A line-oriented text stream with Logo tokenization layered on top.
#[derive(Debug)]
pub(crate) struct TextStream {
    source: Source,
    /// Raw lines read since the last history reset; FULLTEXT replays these.
    history: Vec<String>,
    /// Characters of the line group currently being tokenized.
    src: Vec<char>,
    src_pos: usize,
}

fn last_non_space(line: &str) -> Option<char> {
    line.trim_end_matches([' ', '\t']).chars().last()
}

fn read_line_from_file(f: &mut File) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match f.read(&mut byte)? {
            0 => {
                if buf.is_empty() {
                    return Ok(None);
                }
                break;
            }
            _ => {
                if byte[0] == b'\n' {
                    break;
                }
                buf.push(byte[0]);
            }
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

impl TextStream {
    #[must_use]
    pub fn console() -> Self {
        Self {
            source: Source::Console,
            history: Vec::new(),
            src: Vec::new(),
            src_pos: 0,
        }
    }

    #[must_use]
    pub fn from_file(file: File) -> Self {
        Self {
            source: Source::File(file),
            history: Vec::new(),
            src: Vec::new(),
            src_pos: 0,
        }
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            source: Source::Text {
                chars: text.chars().collect(),
                pos: 0,
            },
            history: Vec::new(),
            src: Vec::new(),
            src_pos: 0,
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Raw lines read since the last reset.
    #[must_use]
    pub fn recent_history(&self) -> &[String] {
        &self.history
    }

    /// Reads one raw line. Prompting only happens on the console source.
    pub fn read_raw_line(
        &mut self,
        host: &mut dyn Host,
        prompt: &str,
        save_history: bool,
    ) -> RunResult<Option<String>> {
        if !save_history {
            self.history.clear();
        }
        let line = match &mut self.source {
            Source::Console => host.read_raw_line(prompt),
            Source::File(f) => match read_line_from_file(f) {
                Ok(line) => line,
                Err(_) => return Err(LogoError::file_system()),
            },
            Source::Text { chars, pos } => {
                if *pos >= chars.len() {
                    None
                } else {
                    let mut line = String::new();
                    while *pos < chars.len() {
                        let c = chars[*pos];
                        *pos += 1;
                        if c == '\n' {
                            break;
                        }
                        line.push(c);
                    }
                    Some(line)
                }
            }
        };
        if let Some(line) = &line {
            self.history.push(line.clone());
        }
        Ok(line)
    }

    /// READWORD: reads a line, resolving backslash escapes and joining
    /// continuation lines (escaped newline, open vertical bars, trailing `~`).
    pub fn read_word(
        &mut self,
        host: &mut dyn Host,
        prompt: &str,
        save_history: bool,
    ) -> RunResult<Option<Word>> {
        let Some(mut line) = self.read_raw_line(host, prompt, save_history)? else {
            return Ok(None);
        };
        let mut out = String::new();
        let mut vbarred = false;
        let mut escaped = false;
        loop {
            for c in line.chars() {
                if escaped {
                    escaped = false;
                    out.push(char_to_raw(c));
                    continue;
                }
                if c == '|' {
                    vbarred = !vbarred;
                }
                if c == '\\' {
                    escaped = true;
                    continue;
                }
                out.push(c);
            }
            if escaped {
                escaped = false;
                out.push('\n');
                match self.read_raw_line(host, "\\ ", true)? {
                    Some(next) => {
                        line = next;
                        continue;
                    }
                    None => break,
                }
            }
            if vbarred {
                out.push(char_to_raw('\n'));
                match self.read_raw_line(host, "| ", true)? {
                    Some(next) => {
                        line = next;
                        continue;
                    }
                    None => break,
                }
            }
            if last_non_space(&line) == Some('~') {
                out.push('\n');
                match self.read_raw_line(host, "~ ", true)? {
                    Some(next) => {
                        line = next;
                        continue;
                    }
                    None => break,
                }
            }
            break;
        }
        Ok(Some(Word::new(out, false)))
    }

    /// READLIST: tokenizes one statement's worth of input into a list.
    /// `None` means end of input.
    pub fn read_list(
        &mut self,
        host: &mut dyn Host,
        prompt: &str,
        remove_comments: bool,
        save_history: bool,
    ) -> RunResult<Option<Datum>> {
        if !save_history {
            self.history.clear();
        }
        self.tokenize_list(host, prompt, true, false, remove_comments)
    }

    /// Reads one character.
    pub fn read_char(&mut self, host: &mut dyn Host) -> RunResult<Option<char>> {
        match &mut self.source {
            Source::Console => Ok(host.read_char()),
            Source::File(f) => {
                let mut byte = [0u8; 1];
                match f.read(&mut byte) {
                    Ok(0) => Ok(None),
                    Ok(_) => Ok(Some(byte[0] as char)),
                    Err(_) => Err(LogoError::file_system()),
                }
            }
            Source::Text { chars, pos } => {
                if *pos >= chars.len() {
                    Ok(None)
                } else {
                    let c = chars[*pos];
                    *pos += 1;
                    Ok(Some(c))
                }
            }
        }
    }

    pub fn at_end(&mut self) -> bool {
        match &mut self.source {
            Source::Console => false,
            Source::File(f) => match (f.stream_position(), f.metadata()) {
                (Ok(p), Ok(m)) => p >= m.len(),
                _ => true,
            },
            Source::Text { chars, pos } => *pos >= chars.len(),
        }
    }

    pub fn position(&mut self) -> RunResult<u64> {
        match &mut self.source {
            Source::Console => Ok(0),
            Source::File(f) => f.stream_position().map_err(|_| LogoError::file_system()),
            Source::Text { pos, .. } => Ok(*pos as u64),
        }
    }

    pub fn seek(&mut self, position: u64) -> RunResult<()> {
        match &mut self.source {
            Source::Console => Ok(()),
            Source::File(f) => f
                .seek(std::io::SeekFrom::Start(position))
                .map(|_| ())
                .map_err(|_| LogoError::file_system()),
            Source::Text { chars, pos } => {
                *pos = (position as usize).min(chars.len());
                Ok(())
            }
        }
    }

    pub fn write(&mut self, host: &mut dyn Host, text: &str) -> RunResult<()> {
        match &mut self.source {
            Source::Console => {
                host.print(text);
                Ok(())
            }
            Source::File(f) => f
                .write_all(text.as_bytes())
                .map_err(|_| LogoError::file_system()),
            Source::Text { .. } => Ok(()),
        }
    }

    fn peek_src(&self) -> Option<char> {
        self.src.get(self.src_pos).copied()
    }

    /// Handles `~` at end of line inside tokenization: consumes trailing
    /// spaces and the newline so the next line continues the current token
    /// stream. Returns false when the `~` is mid-line (and therefore literal).
    fn tilde_continuation(&mut self) -> bool {
        let mut look = self.src_pos;
        while look < self.src.len() && self.src[look] == ' ' {
            look += 1;
        }
        if look < self.src.len() && self.src[look] == '\n' {
            self.src_pos = look + 1;
            return true;
        }
        // `~` as the very last character of the source word also continues;
        // the continuation line arrives via the refill path.
        false
    }

    fn skip_comment(&mut self) {
        while self.src_pos < self.src.len() && self.src[self.src_pos] != '\n' {
            self.src_pos += 1;
        }
        if self.src_pos < self.src.len() {
            self.src_pos += 1;
        }
    }

    fn parse_array_origin(&mut self) -> i64 {
        if self.peek_src() != Some('@') {
            return 1;
        }
        self.src_pos += 1;
        let mut digits = String::new();
        if self.peek_src() == Some('-') {
            digits.push('-');
            self.src_pos += 1;
        }
        while let Some(c) = self.peek_src() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.src_pos += 1;
            } else {
                break;
            }
        }
        digits.parse().unwrap_or(0)
    }

    fn tokenize_list(
        &mut self,
        host: &mut dyn Host,
        prompt: &str,
        is_base_level: bool,
        make_array: bool,
        remove_comments: bool,
    ) -> RunResult<Option<Datum>> {
        if is_base_level {
            match self.read_word(host, prompt, true)? {
                Some(word) => {
                    self.src = word.raw().chars().collect();
                    self.src_pos = 0;
                }
                None => return Ok(None),
            }
        }

        let mut builder = ListBuilder::new();
        let mut current = String::new();
        let mut word_vbarred = false;

        loop {
            let mut vbarred = false;
            while self.src_pos < self.src.len() {
                let c = self.src[self.src_pos];
                self.src_pos += 1;

                if vbarred {
                    if c == '|' {
                        vbarred = false;
                    } else {
                        current.push(char_to_raw(c));
                    }
                    continue;
                }
                if c == '|' {
                    vbarred = true;
                    word_vbarred = true;
                    continue;
                }
                if c == '~' && self.tilde_continuation() {
                    continue;
                }
                if remove_comments && (c == ';' || (c == '#' && self.peek_src() == Some('!'))) {
                    self.skip_comment();
                    continue;
                }
                if matches!(c, ' ' | '\t' | '\n' | '[' | ']' | '{' | '}') {
                    if !current.is_empty() {
                        builder.push(Datum::Word(Word::new(std::mem::take(&mut current), word_vbarred)));
                        word_vbarred = false;
                    }
                    match c {
                        '[' => {
                            let sub = self
                                .tokenize_list(host, "", false, false, remove_comments)?
                                .unwrap_or_else(|| Datum::List(List::new()));
                            builder.push(sub);
                        }
                        ']' => {
                            if is_base_level || make_array {
                                return Err(LogoError::unexpected_close_square());
                            }
                            return Ok(Some(Datum::List(builder.finish())));
                        }
                        '{' => {
                            let sub = self
                                .tokenize_list(host, "", false, true, remove_comments)?
                                .unwrap_or_else(|| Datum::List(List::new()));
                            builder.push(sub);
                        }
                        '}' => {
                            if is_base_level || !make_array {
                                return Err(LogoError::unexpected_close_brace());
                            }
                            let origin = self.parse_array_origin();
                            return Ok(Some(Datum::Array(Array::from_list(origin, &builder.finish()))));
                        }
                        _ => {}
                    }
                } else {
                    current.push(c);
                }
            }

            // Current source word exhausted.
            if !current.is_empty() {
                builder.push(Datum::Word(Word::new(std::mem::take(&mut current), word_vbarred)));
                word_vbarred = false;
            }
            if is_base_level {
                return Ok(Some(Datum::List(builder.finish())));
            }
            // Inside an open bracket or brace: ask for more input.
            let continue_prompt = if make_array { "{ " } else { "[ " };
            match self.read_word(host, continue_prompt, true)? {
                Some(word) => {
                    self.src = word.raw().chars().collect();
                    self.src_pos = 0;
                }
                None => {
                    // Input exhausted mid-structure: return what we have.
                    let finished = builder.finish();
                    return Ok(Some(if make_array {
                        Datum::Array(Array::from_list(1, &finished))
                    } else {
                        Datum::List(finished)
                    }));
                }
            }
        }
    }
}

/// Tokenizes in-memory text as READLIST would. Used by PARSE, RUNPARSE over
/// words, and workspace loading.
pub(crate) fn tokenize_text(text: &str) -> RunResult<Datum> {
    let mut stream = TextStream::from_text(text);
    let mut host = NullHost;
    Ok(stream
        .read_list(&mut host, "", false, false)?
        .unwrap_or_else(|| Datum::List(List::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        let Datum::List(l) = tokenize_text(text).unwrap() else {
            panic!("expected list");
        };
        l.iter().map(|d| d.to_display_string()).collect()
    }

    #[test]
    fn whitespace_separates_tokens() {
        assert_eq!(tokens("print sum 2\t3"), ["print", "sum", "2", "3"]);
    }

    #[test]
    fn brackets_build_sublists() {
        assert_eq!(tokens("if :x [print 1]"), ["if", ":x", "[print 1]"]);
    }

    #[test]
    fn braces_build_arrays_with_origin() {
        assert_eq!(tokens("{a b c}"), ["{a b c}"]);
        assert_eq!(tokens("{a b}@0"), ["{a b}@0"]);
    }

    #[test]
    fn vertical_bars_protect_delimiters() {
        let toks = tokens("print |hello world|");
        assert_eq!(toks, ["print", "hello world"]);
        let Datum::List(l) = tokenize_text("print |a[b|").unwrap() else {
            panic!()
        };
        let w = l.item_at(2).unwrap();
        let w = w.as_word().cloned().unwrap();
        assert!(w.is_forever_special());
        assert_eq!(w.print(), "a[b");
    }

    #[test]
    fn unmatched_closers_raise_specific_errors() {
        assert!(matches!(
            tokenize_text("a ]"),
            Err(crate::signal::Signal::Error(e)) if e.code == crate::signal::ErrCode::UnexpectedSquare
        ));
        assert!(matches!(
            tokenize_text("a }"),
            Err(crate::signal::Signal::Error(e)) if e.code == crate::signal::ErrCode::UnexpectedBrace
        ));
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let mut stream = TextStream::from_text("print 1 ; a comment\n");
        let mut host = NullHost;
        let Some(Datum::List(l)) = stream.read_list(&mut host, "", true, false).unwrap() else {
            panic!()
        };
        assert_eq!(l.count(), 2);
    }

    #[test]
    fn tilde_continuation_joins_lines() {
        let mut stream = TextStream::from_text("print ~\n5\n");
        let mut host = NullHost;
        let Some(Datum::List(l)) = stream.read_list(&mut host, "", true, false).unwrap() else {
            panic!()
        };
        let toks: Vec<String> = l.iter().map(|d| d.to_display_string()).collect();
        assert_eq!(toks, ["print", "5"]);
    }

    #[test]
    fn backslash_escapes_delimiters_into_words() {
        let toks = tokens("print a\\ b");
        assert_eq!(toks, ["print", "a b"]);
    }

    #[test]
    fn open_bracket_reads_more_lines() {
        let mut stream = TextStream::from_text("print [a\nb]\n");
        let mut host = NullHost;
        let Some(Datum::List(l)) = stream.read_list(&mut host, "", true, false).unwrap() else {
            panic!()
        };
        assert_eq!(l.count(), 2);
        let sub = l.item_at(2).unwrap();
        assert_eq!(sub.as_list().unwrap().count(), 2);
    }

    #[test]
    fn read_word_joins_continuations() {
        let mut stream = TextStream::from_text("hello~\nworld\n");
        let mut host = NullHost;
        let w = stream.read_word(&mut host, "", false).unwrap().unwrap();
        assert_eq!(w.print(), "hello~\nworld");
    }

    #[test]
    fn reparsing_a_printed_word_preserves_its_print_form() {
        for text in ["hello", "2.5", "a+b?", "forward"] {
            let Datum::List(l) = tokenize_text(text).unwrap() else {
                panic!()
            };
            let first = l.head().unwrap();
            assert_eq!(first.as_word().unwrap().print(), text);
        }
    }
}
