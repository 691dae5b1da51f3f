//! Terminal renderer: rasterizes world bodies into a grid of two-column
//! cells and redraws only the cells that changed since the last frame.

use std::io::{self, Write};
use std::ops::Range;

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::physics::{Body, BodyLabel, Shape};

/// Terminal columns per world unit.
pub const CELL_W: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Glyph {
    Empty,
    Boundary,
    Wall,
    FallingWall,
    Goal,
    Ball,
}

impl Glyph {
    fn look(self) -> (&'static str, Color) {
        match self {
            Glyph::Empty => ("  ", Color::Reset),
            Glyph::Boundary => ("██", Color::Grey),
            Glyph::Wall => ("██", Color::Red),
            Glyph::FallingWall => ("▒▒", Color::Red),
            Glyph::Goal => ("▓▓", Color::Green),
            Glyph::Ball => ("●", Color::Blue),
        }
    }
}

/// A `width` x `height` raster of glyphs, one per world unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    cells: Vec<Glyph>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Glyph::Empty; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Glyph {
        self.cells[y * self.width + x]
    }

    fn fill(&mut self, xs: Range<i64>, ys: Range<i64>, glyph: Glyph) {
        for y in ys {
            for x in xs.clone() {
                if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
                    continue;
                }
                self.cells[y as usize * self.width + x as usize] = glyph;
            }
        }
    }

    /// Paints rectangles first and the ball last so it is never hidden.
    pub fn rasterize(&mut self, bodies: &[Body]) {
        self.cells.fill(Glyph::Empty);
        for body in bodies {
            let Shape::Rect { width, height } = body.shape else {
                continue;
            };
            let glyph = match body.label {
                BodyLabel::Boundary => Glyph::Boundary,
                BodyLabel::Goal => Glyph::Goal,
                BodyLabel::Wall if body.is_static => Glyph::Wall,
                BodyLabel::Wall | BodyLabel::Ball => Glyph::FallingWall,
            };
            self.fill(
                span(body.position.x, width),
                span(body.position.y, height),
                glyph,
            );
        }
        for body in bodies {
            if let Shape::Circle { .. } = body.shape {
                let x = body.position.x.floor() as i64;
                let y = body.position.y.floor() as i64;
                self.fill(x..x + 1, y..y + 1, Glyph::Ball);
            }
        }
    }
}

/// Raster cells covered by an extent centered on `center`; anything thinner
/// than one cell lands in exactly one.
fn span(center: f32, extent: f32) -> Range<i64> {
    if extent <= 1.0 {
        let c = center.floor() as i64;
        return c..c + 1;
    }
    let start = (center - extent / 2.0).round() as i64;
    let end = (center + extent / 2.0).round() as i64;
    start..end.max(start + 1)
}

pub struct Renderer {
    last: Vec<Glyph>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            last: Vec::new(),
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn render<W: Write>(&mut self, out: &mut W, frame: &Frame, hud: &str) -> io::Result<()> {
        let needed_h = (frame.height + 1) as u16;
        let needed_w = (frame.width * CELL_W) as u16;

        out.queue(MoveTo(0, 0))?;
        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            out.queue(Print(msg))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.last.len() != frame.cells.len() {
            self.last = vec![Glyph::Empty; frame.cells.len()];
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(hud))?;
            out.queue(ResetColor)?;
            self.last_hud = hud.to_string();
        }

        for y in 0..frame.height {
            for x in 0..frame.width {
                let idx = y * frame.width + x;
                let glyph = frame.cells[idx];
                if self.needs_full || glyph != self.last[idx] {
                    self.last[idx] = glyph;
                    self.draw_cell(out, x, y, glyph)?;
                }
            }
        }
        self.needs_full = false;

        out.flush()
    }

    fn draw_cell<W: Write>(&self, out: &mut W, x: usize, y: usize, glyph: Glyph) -> io::Result<()> {
        let (text, color) = glyph.look();
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        out.queue(MoveTo(x_pos, y_pos))?;
        out.queue(SetForegroundColor(color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                out.queue(Print(' '))?;
            }
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
