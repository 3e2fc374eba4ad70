//! Turtle state. The interpreter owns the position, heading, pen, palette,
//! and bounds; every visible effect is forwarded through the host interface.

use crate::{
    datum::Datum,
    host::{Color, Host, HostError, HostResult, PenMode, Transform},
    signal::{LogoError, RunResult},
};

/// What happens when the turtle reaches the edge of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurtleMode {
    Wrap,
    Fence,
    Window,
}

const INITIAL_BOUND: f64 = 150.0;
const PALETTE_SIZE: usize = 101;

/// The 16 classic palette entries; the rest of the palette starts black and
/// is writable with SETPALETTE.
const BASE_PALETTE: [Color; 16] = [
    Color::rgb(0, 0, 0),       // black
    Color::rgb(0, 0, 255),     // blue
    Color::rgb(0, 255, 0),     // green
    Color::rgb(0, 255, 255),   // cyan
    Color::rgb(255, 0, 0),     // red
    Color::rgb(255, 0, 255),   // magenta
    Color::rgb(255, 255, 0),   // yellow
    Color::rgb(255, 255, 255), // white
    Color::rgb(150, 75, 0),    // brown
    Color::rgb(210, 180, 140), // tan
    Color::rgb(34, 139, 34),   // forest green
    Color::rgb(0, 255, 255),   // aqua
    Color::rgb(250, 128, 114), // salmon
    Color::rgb(128, 0, 128),   // purple
    Color::rgb(255, 165, 0),   // orange
    Color::rgb(128, 128, 128), // grey
];

const COLOR_NAMES: [(&str, usize); 17] = [
    ("black", 0),
    ("blue", 1),
    ("green", 2),
    ("cyan", 3),
    ("red", 4),
    ("magenta", 5),
    ("yellow", 6),
    ("white", 7),
    ("brown", 8),
    ("tan", 9),
    ("forestgreen", 10),
    ("aqua", 11),
    ("salmon", 12),
    ("purple", 13),
    ("orange", 14),
    ("grey", 15),
    ("gray", 15),
];

/// Maps a host failure to the matching Logo error.
pub(crate) fn gfx<T>(result: HostResult<T>) -> RunResult<T> {
    result.map_err(|e| match e {
        HostError::NoGraphics => LogoError::no_graphics(),
        HostError::Io(_) => LogoError::file_system(),
    })
}

pub(crate) struct Turtle {
    x: f64,
    y: f64,
    heading: f64,
    pen_down: bool,
    pen_mode: PenMode,
    pen_size: f64,
    pen_color: Color,
    background: Color,
    visible: bool,
    mode: TurtleMode,
    bound_x: f64,
    bound_y: f64,
    label_height: f64,
    scrunch: (f64, f64),
    filling: bool,
    palette: Vec<Color>,
}

impl Turtle {
    pub fn new() -> Self {
        let mut palette = vec![Color::rgb(0, 0, 0); PALETTE_SIZE];
        palette[..16].copy_from_slice(&BASE_PALETTE);
        Self {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            pen_down: true,
            pen_mode: PenMode::Paint,
            pen_size: 1.0,
            pen_color: BASE_PALETTE[7],
            background: BASE_PALETTE[0],
            visible: true,
            mode: TurtleMode::Wrap,
            bound_x: INITIAL_BOUND,
            bound_y: INITIAL_BOUND,
            label_height: 12.0,
            scrunch: (1.0, 1.0),
            filling: false,
            palette,
        }
    }

    fn transform(&self) -> Transform {
        let r = self.heading.to_radians();
        let (s, c) = r.sin_cos();
        let (sx, sy) = self.scrunch;
        Transform {
            m: [
                c * sx,
                -s * sx,
                0.0,
                s * sy,
                c * sy,
                0.0,
                self.x * sx,
                self.y * sy,
                1.0,
            ],
        }
    }

    fn sync(&self, host: &mut dyn Host) -> RunResult<()> {
        gfx(host.set_turtle_transform(&self.transform()))
    }

    fn wrap_coordinate(value: f64, bound: f64) -> f64 {
        if bound <= 0.0 {
            return value;
        }
        (value + bound).rem_euclid(2.0 * bound) - bound
    }

    fn move_to(&mut self, host: &mut dyn Host, x: f64, y: f64) -> RunResult<()> {
        match self.mode {
            TurtleMode::Window => {
                self.x = x;
                self.y = y;
            }
            TurtleMode::Fence => {
                if x.abs() > self.bound_x || y.abs() > self.bound_y {
                    return Err(LogoError::turtle_bounds());
                }
                self.x = x;
                self.y = y;
            }
            TurtleMode::Wrap => {
                self.x = Self::wrap_coordinate(x, self.bound_x);
                self.y = Self::wrap_coordinate(y, self.bound_y);
            }
        }
        self.sync(host)?;
        if self.pen_down {
            gfx(host.emit_vertex())?;
        }
        Ok(())
    }

    pub fn forward(&mut self, host: &mut dyn Host, distance: f64) -> RunResult<()> {
        let r = self.heading.to_radians();
        let x = self.x + distance * r.sin();
        let y = self.y + distance * r.cos();
        self.move_to(host, x, y)
    }

    pub fn turn(&mut self, host: &mut dyn Host, degrees: f64) -> RunResult<()> {
        self.heading = (self.heading + degrees).rem_euclid(360.0);
        self.sync(host)
    }

    pub fn set_heading(&mut self, host: &mut dyn Host, degrees: f64) -> RunResult<()> {
        self.heading = degrees.rem_euclid(360.0);
        self.sync(host)
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, host: &mut dyn Host, x: f64, y: f64) -> RunResult<()> {
        self.move_to(host, x, y)
    }

    pub fn home(&mut self, host: &mut dyn Host) -> RunResult<()> {
        self.heading = 0.0;
        self.move_to(host, 0.0, 0.0)
    }

    /// Bearing from the turtle to a point, in compass degrees.
    pub fn towards(&self, x: f64, y: f64) -> f64 {
        (x - self.x).atan2(y - self.y).to_degrees().rem_euclid(360.0)
    }

    pub fn arc(&mut self, host: &mut dyn Host, angle: f64, radius: f64) -> RunResult<()> {
        self.sync(host)?;
        gfx(host.draw_arc(angle, radius))
    }

    pub fn label(&mut self, host: &mut dyn Host, text: &str) -> RunResult<()> {
        self.sync(host)?;
        gfx(host.draw_label(text))
    }

    pub fn set_label_height(&mut self, host: &mut dyn Host, height: f64) -> RunResult<()> {
        self.label_height = height;
        gfx(host.set_font_size(height))
    }

    pub fn label_height(&self) -> f64 {
        self.label_height
    }

    pub fn clear_screen(&mut self, host: &mut dyn Host) -> RunResult<()> {
        gfx(host.clear_screen())?;
        self.home(host)
    }

    pub fn clean(&mut self, host: &mut dyn Host) -> RunResult<()> {
        gfx(host.clear_screen())?;
        self.sync(host)
    }

    pub fn set_pen_down(&mut self, host: &mut dyn Host, down: bool) -> RunResult<()> {
        self.pen_down = down;
        gfx(host.set_pen_down(down))
    }

    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    pub fn set_pen_mode(&mut self, host: &mut dyn Host, mode: PenMode) -> RunResult<()> {
        self.pen_mode = mode;
        gfx(host.set_pen_mode(mode))
    }

    pub fn pen_mode_name(&self) -> &'static str {
        match self.pen_mode {
            PenMode::Paint => "paint",
            PenMode::Erase => "erase",
            PenMode::Reverse => "reverse",
        }
    }

    pub fn set_pen_size(&mut self, host: &mut dyn Host, size: f64) -> RunResult<()> {
        self.pen_size = size;
        gfx(host.set_pen_size(size))
    }

    pub fn pen_size(&self) -> f64 {
        self.pen_size
    }

    pub fn set_pen_color(&mut self, host: &mut dyn Host, color: Color) -> RunResult<()> {
        self.pen_color = color;
        gfx(host.set_pen_color(color))
    }

    pub fn pen_color(&self) -> Color {
        self.pen_color
    }

    pub fn set_background(&mut self, host: &mut dyn Host, color: Color) -> RunResult<()> {
        self.background = color;
        gfx(host.set_background_color(color))
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_visible(&mut self, host: &mut dyn Host, visible: bool) -> RunResult<()> {
        self.visible = visible;
        gfx(host.set_turtle_visible(visible))
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_mode(&mut self, host: &mut dyn Host, mode: TurtleMode) -> RunResult<()> {
        self.mode = mode;
        gfx(host.set_is_bounded(mode != TurtleMode::Window))
    }

    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            TurtleMode::Wrap => "wrap",
            TurtleMode::Fence => "fence",
            TurtleMode::Window => "window",
        }
    }

    pub fn set_bounds(&mut self, host: &mut dyn Host, x: f64, y: f64) -> RunResult<()> {
        self.bound_x = x;
        self.bound_y = y;
        gfx(host.set_bounds(x, y))
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.bound_x, self.bound_y)
    }

    pub fn set_scrunch(&mut self, host: &mut dyn Host, x: f64, y: f64) -> RunResult<()> {
        self.scrunch = (x, y);
        self.sync(host)
    }

    pub fn scrunch(&self) -> (f64, f64) {
        self.scrunch
    }

    pub fn begin_fill(&mut self, host: &mut dyn Host, color: Color) -> RunResult<()> {
        if self.filling {
            return Err(LogoError::already_filling());
        }
        self.filling = true;
        gfx(host.begin_polygon(color))
    }

    pub fn end_fill(&mut self, host: &mut dyn Host) -> RunResult<()> {
        self.filling = false;
        gfx(host.end_polygon())
    }

    pub fn palette_color(&self, index: usize) -> Option<Color> {
        self.palette.get(index).copied()
    }

    pub fn set_palette_color(&mut self, index: usize, color: Color) -> bool {
        match self.palette.get_mut(index) {
            Some(slot) => {
                *slot = color;
                true
            }
            None => false,
        }
    }

    /// Resolves a user color datum: a palette index, a color name word, or a
    /// [r g b] list of 0–100 percentages.
    pub fn color_from_datum(&self, d: &Datum) -> Option<Color> {
        match d {
            Datum::Word(w) => {
                if let Some(n) = w.as_number() {
                    if n != n.trunc() || n < 0.0 || n >= self.palette.len() as f64 {
                        return None;
                    }
                    return self.palette_color(n as usize);
                }
                COLOR_NAMES
                    .iter()
                    .find(|(name, _)| *name == w.key())
                    .map(|(_, index)| BASE_PALETTE[(*index).min(15)])
            }
            Datum::List(l) => {
                let mut parts = [0.0f64; 3];
                let mut count = 0;
                for item in l.iter() {
                    let n = item.as_word().and_then(crate::types::Word::as_number)?;
                    if !(0.0..=100.0).contains(&n) || count >= 3 {
                        return None;
                    }
                    parts[count] = n;
                    count += 1;
                }
                if count != 3 {
                    return None;
                }
                Some(Color::rgb(
                    (parts[0] * 255.0 / 100.0) as u8,
                    (parts[1] * 255.0 / 100.0) as u8,
                    (parts[2] * 255.0 / 100.0) as u8,
                ))
            }
            _ => None,
        }
    }

    /// The [r g b] percentage list form of a color.
    pub fn color_components(color: Color) -> [f64; 3] {
        [
            f64::from(color.r) * 100.0 / 255.0,
            f64::from(color.g) * 100.0 / 255.0,
            f64::from(color.b) * 100.0 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{List, Word};

    #[test]
    fn wrap_mode_folds_coordinates() {
        assert_eq!(Turtle::wrap_coordinate(160.0, 150.0), -140.0);
        assert_eq!(Turtle::wrap_coordinate(-160.0, 150.0), 140.0);
        assert_eq!(Turtle::wrap_coordinate(10.0, 150.0), 10.0);
    }

    #[test]
    fn towards_uses_compass_bearings() {
        let t = Turtle::new();
        assert_eq!(t.towards(0.0, 10.0), 0.0);
        assert_eq!(t.towards(10.0, 0.0), 90.0);
        assert_eq!(t.towards(0.0, -10.0), 180.0);
        assert_eq!(t.towards(-10.0, 0.0), 270.0);
    }

    #[test]
    fn color_from_index_name_and_list() {
        let t = Turtle::new();
        assert_eq!(
            t.color_from_datum(&Datum::Word(Word::from_number(4.0))),
            Some(Color::rgb(255, 0, 0))
        );
        assert_eq!(
            t.color_from_datum(&Datum::Word(Word::new("Red", false))),
            Some(Color::rgb(255, 0, 0))
        );
        let rgb = Datum::List(List::from_vec(vec![
            Datum::Word(Word::from_number(100.0)),
            Datum::Word(Word::from_number(0.0)),
            Datum::Word(Word::from_number(0.0)),
        ]));
        assert_eq!(t.color_from_datum(&rgb), Some(Color::rgb(255, 0, 0)));
        assert_eq!(t.color_from_datum(&Datum::Word(Word::new("no-such", false))), None);
    }
}
