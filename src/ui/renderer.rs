/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Facing, Guard};
use crate::domain::tile::Tile;
use crate::sim::world::{Phase, World};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every cell, so row gaps match the map.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    /// Cells that differ from `prev`, in screen order. Both buffers have
    /// the same size.
    fn changes<'a>(
        &'a self,
        prev: &'a FrameBuffer,
    ) -> impl Iterator<Item = (usize, usize, Cell)> + 'a {
        let w = self.width;
        self.cells
            .iter()
            .zip(&prev.cells)
            .enumerate()
            .filter(|(_, (new, old))| new != old)
            .map(move |(i, (new, _))| (i % w, i / w, *new))
    }
}

// ── Renderer ──

/// Each map cell takes two terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const BRICK_FG: Color = Color::Rgb { r: 180, g: 120, b: 60 };
const BRICK_BG: Color = Color::Rgb { r: 100, g: 65, b: 30 };
const HOLE_BG: Color = Color::Rgb { r: 10, g: 8, b: 0 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.fit_terminal();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &World) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.fit_terminal();
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Repaint everything when the phase changes.
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        self.compose(world);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn fit_terminal(&mut self) {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front = FrameBuffer::new(self.term_w, self.term_h);
        self.back = FrameBuffer::new(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for (x, y, cell) in self.front.changes(&self.back) {
            if cursor_at != Some((x, y)) {
                queue!(self.writer, MoveTo(x as u16, y as u16))?;
            }
            if cell.fg != last_fg {
                queue!(self.writer, SetForegroundColor(cell.fg))?;
                last_fg = cell.fg;
            }
            if cell.bg != last_bg {
                queue!(self.writer, SetBackgroundColor(cell.bg))?;
                last_bg = cell.bg;
            }
            queue!(self.writer, Print(cell.ch))?;
            cursor_at = Some((x + 1, y));
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, w: &World) {
        let hud = format!(
            " {}  Gold:{}/{}  Tick:{} ",
            w.name,
            w.runner.gold_collected,
            w.runner.gold_collected + w.gold_left(),
            w.tick,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        for gy in 0..w.grid.height() {
            let row = MAP_ROW + gy;
            for gx in 0..w.grid.width() {
                let col = gx * CELL_W;
                let [c0, c1] = self.cell_glyphs(w, gx as i32, gy as i32);
                self.front.set(col, row, c0);
                self.front.set(col + 1, row, c1);
            }
        }

        let msg_row = MAP_ROW + w.grid.height() + 1;
        let msg = match w.phase {
            Phase::Playing => None,
            Phase::Dead => Some(" Caught!  R: restart  Q: quit "),
            Phase::Cleared => Some(" Level cleared!  R: play again  Q: quit "),
        };
        if let Some(msg) = msg {
            let bg = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill_row(msg_row, bg);
            self.front.put_str(0, msg_row, msg, Color::Black, bg);
        }

        let help = " Arrows:Move  Z:DigL  X:DigR  R:Restart  Q/Esc:Quit";
        self.front.put_str(0, msg_row + 2, help, Color::DarkGrey, Color::Reset);
    }

    /// The two terminal cells for map cell (x, y): runner, then guards,
    /// then gold, then holes, then terrain.
    fn cell_glyphs(&self, w: &World, x: i32, y: i32) -> [Cell; 2] {
        let pair = |c0: char, c1: char, fg: Color, bg: Color| [Cell::new(c0, fg, bg), Cell::new(c1, fg, bg)];

        let r = &w.runner.body;
        if (r.x, r.y) == (x, y) {
            let fg = if w.phase == Phase::Dead { Color::Red } else { Color::Green };
            return match w.runner.facing() {
                Facing::Left => pair('◄', '▌', fg, Color::Reset),
                Facing::Right => pair('▐', '►', fg, Color::Reset),
            };
        }

        if let Some(idx) = w.guard_in(x, y) {
            return guard_glyphs(&w.guards[idx]);
        }

        if w.gold.iter().any(|g| g.visible() && (g.x, g.y) == (x, y)) {
            return pair('$', '$', Color::Yellow, Color::Reset);
        }

        if let Some(hole) = w.hole_at(x, y) {
            if hole.is_closing() {
                let ch = match hole.close_progress(w.speed.hole_close_ticks) {
                    p if p < 0.33 => '▁',
                    p if p < 0.66 => '▃',
                    _ => '▅',
                };
                return pair(ch, ch, Color::DarkYellow, HOLE_BG);
            }
            return pair(' ', ' ', Color::Reset, HOLE_BG);
        }

        match w.grid.current(x, y) {
            Tile::Empty => pair(' ', ' ', Color::Reset, Color::Reset),
            Tile::Brick => pair('░', '░', BRICK_FG, BRICK_BG),
            Tile::Solid => pair('█', '█', Color::Grey, Color::DarkGrey),
            Tile::Ladder => pair('╠', '╣', Color::Rgb { r: 100, g: 200, b: 255 }, Color::Reset),
            Tile::Rope => pair('━', '━', Color::Rgb { r: 180, g: 100, b: 200 }, Color::Reset),
        }
    }
}

fn guard_glyphs(g: &Guard) -> [Cell; 2] {
    let fg = if g.state.is_trapped() {
        Color::Magenta
    } else if g.gold.is_some() {
        Color::Yellow
    } else {
        Color::Red
    };
    let (c0, c1) = match g.facing() {
        Facing::Left => ('◄', '▌'),
        Facing::Right => ('▐', '►'),
    };
    [Cell::new(c0, fg, Color::Reset), Cell::new(c1, fg, Color::Reset)]
}
