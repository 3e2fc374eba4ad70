use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, Read, Write as _},
    rc::Rc,
    time::Duration,
};

/// RGBA color carried across the host boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Pen composition mode for canvas drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenMode {
    Paint,
    Erase,
    Reverse,
}

/// Console/canvas split of the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenMode {
    Text,
    Full,
    Split,
}

/// A 3×3 transform, nine doubles row-major, carrying the turtle's rotation
/// and translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub m: [f64; 9],
}

/// Interrupt latched by the host since the last query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostSignal {
    #[default]
    None,
    Toplevel,
    Pause,
    System,
}

/// Failure from a host operation.
#[derive(Debug)]
pub enum HostError {
    /// The host has no canvas; turtle and canvas operations are rejected.
    NoGraphics,
    Io(io::Error),
}

impl From<io::Error> for HostError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub type HostResult<T> = Result<T, HostError>;

/// The narrow interface through which the interpreter core reaches the
/// outside world. The core calls these operations and no others.
///
/// Console operations are required. Everything touching a canvas, text
/// attributes, or a mouse has a default implementation that raises
/// `HostError::NoGraphics`, which surfaces to user code as a NO-GRAPHICS
/// error — the contract for hosts without graphics.
///
/// Host callbacks are synchronous and must not retain datum handles past the
/// call (they never receive any: the boundary traffics in strings, numbers,
/// and plain structs).
pub trait Host {
    /// Reads one raw line, prompting interactive surfaces. `None` is EOF.
    fn read_raw_line(&mut self, prompt: &str) -> Option<String>;

    /// Reads a single character. `None` is EOF.
    fn read_char(&mut self) -> Option<char>;

    /// Atomic write to the current console.
    fn print(&mut self, text: &str);

    /// Wraps text in reverse-video markers for STANDOUT.
    fn add_standout_markup(&self, text: &str) -> String {
        format!("\u{1b}[7m{text}\u{1b}[27m")
    }

    /// Sleeps for the given number of milliseconds.
    fn mwait(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }

    /// Asks the host to pick a file. Used by library-level editors.
    fn file_dialog_request(&mut self) -> Option<String> {
        None
    }

    /// The most recent interrupt. Latched state resets on read.
    fn latest_signal(&mut self) -> HostSignal {
        HostSignal::None
    }

    // --- turtle & canvas ---

    fn set_turtle_transform(&mut self, _t: &Transform) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_turtle_visible(&mut self, _visible: bool) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn emit_vertex(&mut self) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn begin_polygon(&mut self, _color: Color) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn end_polygon(&mut self) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn draw_label(&mut self, _text: &str) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn draw_arc(&mut self, _angle: f64, _radius: f64) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_pen_color(&mut self, _color: Color) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_pen_size(&mut self, _size: f64) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_pen_mode(&mut self, _mode: PenMode) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_pen_down(&mut self, _down: bool) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn clear_screen(&mut self) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_bounds(&mut self, _x: f64, _y: f64) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_is_bounded(&mut self, _bounded: bool) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_background_color(&mut self, _color: Color) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_background_image(&mut self, _bytes: &[u8]) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn get_image(&mut self) -> HostResult<Vec<u8>> {
        Err(HostError::NoGraphics)
    }
    fn get_svg(&mut self) -> HostResult<Vec<u8>> {
        Err(HostError::NoGraphics)
    }

    // --- screen mode ---

    fn set_screen_mode(&mut self, _mode: ScreenMode) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_splitter_ratio(&mut self, _ratio: f64) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }

    // --- text attributes ---

    fn set_cursor_position(&mut self, _row: i64, _col: i64) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn get_cursor_position(&mut self) -> HostResult<(i64, i64)> {
        Err(HostError::NoGraphics)
    }
    fn set_text_color(&mut self, _fg: Color, _bg: Color) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_font_name(&mut self, _name: &str) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_font_size(&mut self, _size: f64) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn set_overwrite_mode(&mut self, _overwrite: bool) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }
    fn list_font_names(&mut self) -> HostResult<Vec<String>> {
        Err(HostError::NoGraphics)
    }
    fn clear_text(&mut self) -> HostResult<()> {
        Err(HostError::NoGraphics)
    }

    // --- mouse ---

    fn last_click_position(&mut self) -> HostResult<(f64, f64)> {
        Err(HostError::NoGraphics)
    }
    fn last_click_button(&mut self) -> HostResult<i64> {
        Err(HostError::NoGraphics)
    }
    fn is_button_down(&mut self) -> HostResult<bool> {
        Err(HostError::NoGraphics)
    }
    fn mouse_position(&mut self) -> HostResult<(f64, f64)> {
        Err(HostError::NoGraphics)
    }
}

/// Console host over stdin/stdout. No canvas: turtle operations raise
/// NO-GRAPHICS.
#[derive(Debug, Default)]
pub struct StdioHost;

impl StdioHost {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Host for StdioHost {
    fn read_raw_line(&mut self, prompt: &str) -> Option<String> {
        if !prompt.is_empty() {
            print!("{prompt}");
            let _ = io::stdout().flush();
        }
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }

    fn read_char(&mut self) -> Option<char> {
        let mut buf = [0u8; 1];
        match io::stdin().read(&mut buf) {
            Ok(1) => Some(buf[0] as char),
            _ => None,
        }
    }

    fn print(&mut self, text: &str) {
        print!("{text}");
        let _ = io::stdout().flush();
    }
}

/// A handle onto a [`ScriptHost`]'s collected output, readable after the
/// interpreter has taken ownership of the host.
#[derive(Debug, Clone, Default)]
pub struct ScriptOutput(Rc<RefCell<String>>);

impl ScriptOutput {
    /// Everything printed so far.
    #[must_use]
    pub fn text(&self) -> String {
        self.0.borrow().clone()
    }
}

/// Scripted host: reads input from a pre-loaded script and collects all
/// console output. Used by tests and non-interactive runs.
#[derive(Debug, Default)]
pub struct ScriptHost {
    lines: VecDeque<String>,
    chars: VecDeque<char>,
    output: ScriptOutput,
    signals: VecDeque<HostSignal>,
}

impl ScriptHost {
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            lines: input.lines().map(str::to_string).collect(),
            chars: VecDeque::new(),
            output: ScriptOutput::default(),
            signals: VecDeque::new(),
        }
    }

    /// Queues characters for READCHAR.
    pub fn push_chars(&mut self, chars: &str) {
        self.chars.extend(chars.chars());
    }

    /// Queues an interrupt to be delivered at the next poll.
    pub fn push_signal(&mut self, signal: HostSignal) {
        self.signals.push_back(signal);
    }

    /// A shared handle on the collected output.
    #[must_use]
    pub fn output_handle(&self) -> ScriptOutput {
        self.output.clone()
    }
}

impl Host for ScriptHost {
    fn read_raw_line(&mut self, _prompt: &str) -> Option<String> {
        self.lines.pop_front()
    }

    fn read_char(&mut self) -> Option<char> {
        self.chars.pop_front()
    }

    fn print(&mut self, text: &str) {
        self.output.0.borrow_mut().push_str(text);
    }

    fn mwait(&mut self, _ms: u64) {}

    fn latest_signal(&mut self) -> HostSignal {
        self.signals.pop_front().unwrap_or(HostSignal::None)
    }
}

/// Host that supplies no input and discards all output. Used internally for
/// tokenizing in-memory text.
#[derive(Debug, Default)]
pub(crate) struct NullHost;

impl Host for NullHost {
    fn read_raw_line(&mut self, _prompt: &str) -> Option<String> {
        None
    }

    fn read_char(&mut self) -> Option<char> {
        None
    }

    fn print(&mut self, _text: &str) {}
}
