/// Rendering layer: the `Canvas` drawing boundary and its terminal backend.
///
/// Game code only ever talks to `Canvas`.  `TerminalCanvas` maps the logical
/// canvas (1000×600 px by default) onto the terminal cell grid; all terminal
/// commands are queued and flushed once per frame by `present`.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Attribute, Color, Print},
    terminal, QueueableCommand,
};

use crate::assets::Background;
use crate::entities::{Rect, Rgb};
use crate::tuning::CanvasTuning;

// ── Drawing boundary ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in logical pixels.
    pub size: u16,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub color: Rgb,
}

impl TextStyle {
    pub fn centered(size: u16, color: Rgb) -> Self {
        Self {
            size,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
            color,
        }
    }

    pub fn left(size: u16, color: Rgb) -> Self {
        Self {
            size,
            align: TextAlign::Left,
            baseline: TextBaseline::Middle,
            color,
        }
    }
}

/// Opaque 2D drawing surface.  The only transform is a translation, used
/// for the hit shake.
pub trait Canvas {
    fn draw_background(&mut self, background: &Background) -> std::io::Result<()>;
    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> std::io::Result<()>;
    fn fill_text(&mut self, text: &str, x: f32, y: f32, look: TextStyle) -> std::io::Result<()>;
    fn set_offset(&mut self, dx: f32, dy: f32);
    fn reset_transform(&mut self);
}

// ── Terminal backend ──────────────────────────────────────────────────────────

const C_BACKGROUND: Color = Color::DarkGrey;
const BLOCK: char = '█';

/// Fonts at or above this size are drawn bold.
const BOLD_FONT_SIZE: u16 = 50;

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

pub struct TerminalCanvas<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
    logical: CanvasTuning,
    offset: (f32, f32),
}

impl<W: Write> TerminalCanvas<W> {
    pub fn new(out: W, cols: u16, rows: u16, logical: CanvasTuning) -> Self {
        Self {
            out,
            cols: cols.max(1),
            rows: rows.max(1),
            logical,
            offset: (0.0, 0.0),
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn begin_frame(&mut self) -> std::io::Result<()> {
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    /// Park the cursor in a harmless spot and flush the frame.
    pub fn present(&mut self) -> std::io::Result<()> {
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, self.rows.saturating_sub(1)))?;
        self.out.flush()
    }

    /// Terminal bell, used as the fire sound.
    pub fn bell(&mut self) -> std::io::Result<()> {
        self.out.queue(Print('\x07'))?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn col_of(&self, x: f32) -> i32 {
        ((x + self.offset.0) / self.logical.width * self.cols as f32).floor() as i32
    }

    fn row_of(&self, y: f32) -> i32 {
        ((y + self.offset.1) / self.logical.height * self.rows as f32).floor() as i32
    }

    fn offset_cells(&self) -> (i32, i32) {
        (self.col_of(0.0), self.row_of(0.0))
    }

    /// Print `text` at a cell position, clipped to the visible grid.
    fn print_clipped(&mut self, col: i32, row: i32, text: &str) -> std::io::Result<()> {
        if row < 0 || row >= self.rows as i32 {
            return Ok(());
        }
        let skip = (-col).max(0) as usize;
        let start = col.max(0);
        let room = (self.cols as i32 - start).max(0) as usize;
        let visible: String = text.chars().skip(skip).take(room).collect();
        if visible.is_empty() {
            return Ok(());
        }
        self.out.queue(cursor::MoveTo(start as u16, row as u16))?;
        self.out.queue(Print(visible))?;
        Ok(())
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    fn draw_background(&mut self, background: &Background) -> std::io::Result<()> {
        let (dc, dr) = self.offset_cells();
        self.out.queue(style::SetForegroundColor(C_BACKGROUND))?;
        for (i, line) in background.lines.iter().enumerate() {
            self.print_clipped(dc, i as i32 + dr, line)?;
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> std::io::Result<()> {
        let c0 = self.col_of(rect.x);
        let r0 = self.row_of(rect.y);
        // Every rect covers at least one cell so thin bullets stay visible.
        let c1 = self.col_of(rect.right() - 0.001).max(c0);
        let r1 = self.row_of(rect.bottom() - 0.001).max(r0);

        self.out.queue(style::SetForegroundColor(to_color(color)))?;
        let width = (c1 - c0 + 1) as usize;
        let fill: String = std::iter::repeat(BLOCK).take(width).collect();
        for row in r0..=r1 {
            self.print_clipped(c0, row, &fill)?;
        }
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, look: TextStyle) -> std::io::Result<()> {
        let len = text.chars().count() as i32;
        let col = match look.align {
            TextAlign::Left => self.col_of(x),
            TextAlign::Center => self.col_of(x) - len / 2,
        };
        // A terminal glyph is one row tall; place it on the row holding the
        // vertical centre of the logical text box.
        let row = match look.baseline {
            TextBaseline::Top => self.row_of(y + look.size as f32 / 2.0),
            TextBaseline::Middle => self.row_of(y),
        };

        self.out.queue(style::SetForegroundColor(to_color(look.color)))?;
        let bold = look.size >= BOLD_FONT_SIZE;
        if bold {
            self.out.queue(style::SetAttribute(Attribute::Bold))?;
        }
        self.print_clipped(col, row, text)?;
        if bold {
            self.out.queue(style::SetAttribute(Attribute::NormalIntensity))?;
        }
        Ok(())
    }

    fn set_offset(&mut self, dx: f32, dy: f32) {
        self.offset = (dx, dy);
    }

    fn reset_transform(&mut self) {
        self.offset = (0.0, 0.0);
    }
}
