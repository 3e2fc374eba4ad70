//! The stream table: open files, the current read/write redirection, the
//! dribble log, and the system console stream the REPL reads from.

use std::{fs::OpenOptions, path::PathBuf};

use ahash::AHashMap;

use crate::{
    datum::Datum,
    host::Host,
    reader::TextStream,
    signal::{LogoError, RunResult},
    types::{List, Word},
};

/// How a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpenMode {
    Read,
    Write,
    Append,
    Update,
}

struct OpenFile {
    stream: TextStream,
    /// The user-supplied name, preserved for ALLOPEN listings.
    display: Word,
    readable: bool,
    writable: bool,
}

/// Owns the host and every stream the interpreter can read or write.
///
/// File streams are identified by their user-provided filename (case-folded
/// key form). The REPL reads from the system stream, which is the console
/// unless text execution has pushed an in-memory source.
pub(crate) struct IoSystem {
    pub host: Box<dyn Host>,
    stdio: TextStream,
    files: AHashMap<String, OpenFile>,
    read_target: Option<String>,
    write_target: Option<String>,
    system_read: Vec<TextStream>,
    dribble: Option<TextStream>,
    prefix: Option<String>,
}

impl IoSystem {
    pub fn new(host: Box<dyn Host>) -> Self {
        Self {
            host,
            stdio: TextStream::console(),
            files: AHashMap::new(),
            read_target: None,
            write_target: None,
            system_read: Vec::new(),
            dribble: None,
            prefix: None,
        }
    }

    pub fn set_prefix(&mut self, prefix: Option<String>) {
        self.prefix = prefix;
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn path_for(&self, name: &Word) -> PathBuf {
        match &self.prefix {
            Some(prefix) => PathBuf::from(prefix).join(name.print()),
            None => PathBuf::from(name.print()),
        }
    }

    pub fn open(&mut self, name: &Word, mode: OpenMode) -> RunResult<()> {
        let key = name.key().to_string();
        if self.files.contains_key(&key) {
            return Err(LogoError::already_open(name));
        }
        let path = self.path_for(name);
        let mut options = OpenOptions::new();
        match mode {
            OpenMode::Read => {
                options.read(true);
            }
            OpenMode::Write => {
                options.write(true).create(true).truncate(true);
            }
            OpenMode::Append => {
                options.append(true).create(true);
            }
            OpenMode::Update => {
                options.read(true).write(true).create(true);
            }
        }
        let file = options.open(path).map_err(|_| LogoError::cant_open(name))?;
        self.files.insert(
            key,
            OpenFile {
                stream: TextStream::from_file(file),
                display: name.clone(),
                readable: matches!(mode, OpenMode::Read | OpenMode::Update),
                writable: matches!(mode, OpenMode::Write | OpenMode::Append | OpenMode::Update),
            },
        );
        Ok(())
    }

    pub fn close(&mut self, name: &Word) -> RunResult<()> {
        let key = name.key();
        if self.files.remove(key).is_none() {
            return Err(LogoError::not_open(name));
        }
        if self.read_target.as_deref() == Some(key) {
            self.read_target = None;
        }
        if self.write_target.as_deref() == Some(key) {
            self.write_target = None;
        }
        Ok(())
    }

    pub fn close_all(&mut self) {
        self.files.clear();
        self.read_target = None;
        self.write_target = None;
    }

    pub fn all_open(&self) -> Vec<Word> {
        let mut names: Vec<Word> = self.files.values().map(|f| f.display.clone()).collect();
        names.sort_by(|a, b| a.key().cmp(b.key()));
        names
    }

    pub fn erase_file(&mut self, name: &Word) -> RunResult<()> {
        let path = self.path_for(name);
        std::fs::remove_file(path).map_err(|_| LogoError::file_system())
    }

    pub fn set_read(&mut self, name: Option<&Word>) -> RunResult<()> {
        match name {
            None => {
                self.read_target = None;
                Ok(())
            }
            Some(n) => match self.files.get(n.key()) {
                Some(f) if f.readable => {
                    self.read_target = Some(n.key().to_string());
                    Ok(())
                }
                _ => Err(LogoError::not_open(n)),
            },
        }
    }

    pub fn set_write(&mut self, name: Option<&Word>) -> RunResult<()> {
        match name {
            None => {
                self.write_target = None;
                Ok(())
            }
            Some(n) => match self.files.get(n.key()) {
                Some(f) if f.writable => {
                    self.write_target = Some(n.key().to_string());
                    Ok(())
                }
                _ => Err(LogoError::not_open(n)),
            },
        }
    }

    pub fn reader_name(&self) -> Datum {
        match &self.read_target {
            Some(key) => self
                .files
                .get(key)
                .map_or_else(|| Datum::List(List::new()), |f| Datum::Word(f.display.clone())),
            None => Datum::List(List::new()),
        }
    }

    pub fn writer_name(&self) -> Datum {
        match &self.write_target {
            Some(key) => self
                .files
                .get(key)
                .map_or_else(|| Datum::List(List::new()), |f| Datum::Word(f.display.clone())),
            None => Datum::List(List::new()),
        }
    }

    fn read_stream(&mut self) -> (&mut TextStream, &mut dyn Host) {
        let Self {
            host,
            stdio,
            files,
            read_target,
            ..
        } = self;
        let stream = match read_target.as_deref().and_then(|key| files.get_mut(key)) {
            Some(f) => &mut f.stream,
            None => stdio,
        };
        (stream, host.as_mut())
    }

    pub fn read_list(&mut self, prompt: &str, remove_comments: bool) -> RunResult<Option<Datum>> {
        let (stream, host) = self.read_stream();
        stream.read_list(host, prompt, remove_comments, false)
    }

    pub fn read_word(&mut self, prompt: &str) -> RunResult<Option<Word>> {
        let (stream, host) = self.read_stream();
        stream.read_word(host, prompt, false)
    }

    pub fn read_raw_line(&mut self, prompt: &str) -> RunResult<Option<String>> {
        let (stream, host) = self.read_stream();
        stream.read_raw_line(host, prompt, false)
    }

    pub fn read_char(&mut self) -> RunResult<Option<char>> {
        let (stream, host) = self.read_stream();
        stream.read_char(host)
    }

    pub fn read_at_end(&mut self) -> bool {
        self.read_stream().0.at_end()
    }

    pub fn read_position(&mut self) -> RunResult<u64> {
        self.read_stream().0.position()
    }

    pub fn set_read_position(&mut self, position: u64) -> RunResult<()> {
        self.read_stream().0.seek(position)
    }

    pub fn write_position(&mut self) -> RunResult<u64> {
        match self.write_target.as_deref().and_then(|key| self.files.get_mut(key)) {
            Some(f) => f.stream.position(),
            None => Ok(0),
        }
    }

    pub fn set_write_position(&mut self, position: u64) -> RunResult<()> {
        match self.write_target.as_deref().and_then(|key| self.files.get_mut(key)) {
            Some(f) => f.stream.seek(position),
            None => Ok(()),
        }
    }

    /// Writes to the current write stream (PRINT, SHOW, TYPE).
    pub fn std_print(&mut self, text: &str) -> RunResult<()> {
        let Self {
            host,
            files,
            write_target,
            dribble,
            ..
        } = self;
        match write_target.as_deref().and_then(|key| files.get_mut(key)) {
            Some(f) => f.stream.write(host.as_mut(), text),
            None => {
                host.print(text);
                if let Some(log) = dribble {
                    log.write(host.as_mut(), text)?;
                }
                Ok(())
            }
        }
    }

    /// Writes to the console regardless of redirection (prompts, error
    /// messages, trace output).
    pub fn sys_print(&mut self, text: &str) -> RunResult<()> {
        let Self { host, dribble, .. } = self;
        host.print(text);
        if let Some(log) = dribble {
            log.write(host.as_mut(), text)?;
        }
        Ok(())
    }

    /// Reads a statement from the system stream the REPL listens on.
    pub fn sys_read_list(&mut self, prompt: &str, save_history: bool) -> RunResult<Option<Datum>> {
        let Self {
            host,
            stdio,
            system_read,
            ..
        } = self;
        let stream = system_read.last_mut().unwrap_or(stdio);
        stream.read_list(host.as_mut(), prompt, true, save_history)
    }

    /// Reads a raw line from the system stream (STEP pauses, TO bodies).
    pub fn sys_read_raw_line(&mut self, prompt: &str) -> RunResult<Option<String>> {
        let Self {
            host,
            stdio,
            system_read,
            ..
        } = self;
        let stream = system_read.last_mut().unwrap_or(stdio);
        stream.read_raw_line(host.as_mut(), prompt, true)
    }

    /// Reads one statement's worth of tokens for a TO body line.
    pub fn sys_read_body_line(&mut self, prompt: &str) -> RunResult<Option<Datum>> {
        let Self {
            host,
            stdio,
            system_read,
            ..
        } = self;
        let stream = system_read.last_mut().unwrap_or(stdio);
        stream.read_list(host.as_mut(), prompt, true, true)
    }

    /// History of raw lines on the system stream, for FULLTEXT capture.
    pub fn sys_history(&mut self) -> Vec<String> {
        let Self {
            stdio, system_read, ..
        } = self;
        let stream = system_read.last_mut().unwrap_or(stdio);
        stream.recent_history().to_vec()
    }

    pub fn push_system_read(&mut self, stream: TextStream) {
        self.system_read.push(stream);
    }

    pub fn pop_system_read(&mut self) {
        self.system_read.pop();
    }

    /// True when the REPL is reading from redirected (non-console) input.
    pub fn input_redirected(&self) -> bool {
        !self.system_read.is_empty()
    }

    /// Reads a whole file (honoring the prefix) for LOAD.
    pub fn read_file(&self, name: &Word) -> RunResult<String> {
        std::fs::read_to_string(self.path_for(name)).map_err(|_| LogoError::cant_open(name))
    }

    /// Writes a whole file (honoring the prefix) for SAVE.
    pub fn write_file(&self, name: &Word, contents: &str) -> RunResult<()> {
        std::fs::write(self.path_for(name), contents).map_err(|_| LogoError::file_system())
    }

    /// Writes raw bytes (honoring the prefix) for SAVEPICT.
    pub fn write_binary_file(&self, name: &Word, contents: &[u8]) -> RunResult<()> {
        std::fs::write(self.path_for(name), contents).map_err(|_| LogoError::file_system())
    }

    pub fn start_dribble(&mut self, name: &Word) -> RunResult<()> {
        if self.dribble.is_some() {
            return Err(LogoError::already_dribbling());
        }
        let path = self.path_for(name);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|_| LogoError::cant_open(name))?;
        self.dribble = Some(TextStream::from_file(file));
        Ok(())
    }

    pub fn stop_dribble(&mut self) {
        self.dribble = None;
    }
}
