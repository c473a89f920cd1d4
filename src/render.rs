use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::game::Game;
use crate::grid::{Cell, Pos};

const CELL_W: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Glyph {
    Player,
    Adversary,
    Wall,
    Empty,
    Pip,
}

pub fn glyph_for(cell: Cell) -> Glyph {
    match cell {
        Cell::Wall => Glyph::Wall,
        Cell::Open => Glyph::Empty,
        Cell::Pip => Glyph::Pip,
        Cell::Player => Glyph::Player,
        Cell::Adversary | Cell::AdversaryOnPip => Glyph::Adversary,
    }
}

fn paint(glyph: Glyph) -> (&'static str, Color) {
    match glyph {
        Glyph::Player => ("😃", Color::Yellow),
        Glyph::Adversary => ("👻", Color::Red),
        Glyph::Wall => ("██", Color::Blue),
        Glyph::Empty => ("  ", Color::Reset),
        Glyph::Pip => ("· ", Color::White),
    }
}

/// Redraws only the cells that changed since the previous frame.
pub struct Renderer {
    last: Vec<Option<Glyph>>,
    last_hud: String,
    size: (usize, usize),
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            last: Vec::new(),
            last_hud: String::new(),
            size: (0, 0),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn render(&mut self, stdout: &mut Stdout, game: &Game) -> io::Result<()> {
        let grid = game.grid();
        let (height, width) = (grid.height(), grid.width());
        if self.size != (height, width) {
            self.size = (height, width);
            self.last = vec![None; height * width];
            self.needs_full = true;
        }

        let needed_h = (height + 3) as u16;
        let needed_w = (width * CELL_W) as u16;
        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            stdout.queue(MoveTo(0, 0))?;
            stdout.queue(Clear(ClearType::All))?;
            stdout.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            )))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if (origin_x, origin_y) != (self.origin_x, self.origin_y) {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            stdout.queue(Clear(ClearType::All))?;
        }

        let hud = format!(
            "Level: {}  Score: {}  Pips: {}  Adversaries: {}",
            game.level(),
            game.score(),
            game.pips_left(),
            game.adversaries().len()
        );
        if self.needs_full || hud != self.last_hud {
            stdout.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            stdout.queue(SetForegroundColor(Color::White))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(Print(&hud))?;
            stdout.queue(ResetColor)?;
            self.last_hud = hud;
        }

        for pos in grid.positions() {
            let glyph = glyph_for(grid.get(pos));
            let idx = pos.row * width + pos.col;
            if self.needs_full || self.last[idx] != Some(glyph) {
                self.last[idx] = Some(glyph);
                self.draw_cell(stdout, pos, glyph)?;
            }
        }

        let footer = if game.is_over() {
            "GAME OVER - r to restart, q to quit".to_string()
        } else if game.level() == 1 {
            "hjkl/arrows to move, n to skip level, r to restart, q to quit".to_string()
        } else {
            "hjkl/arrows to move, r to restart, q to quit".to_string()
        };
        stdout.queue(MoveTo(self.origin_x, self.origin_y + height as u16))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(footer))?;

        self.needs_full = false;
        stdout.flush()?;
        Ok(())
    }

    fn draw_cell(&self, stdout: &mut Stdout, pos: Pos, glyph: Glyph) -> io::Result<()> {
        let (text, color) = paint(glyph);
        let x = self.origin_x + (pos.col * CELL_W) as u16;
        let y = self.origin_y + pos.row as u16;
        stdout.queue(MoveTo(x, y))?;
        stdout.queue(SetForegroundColor(color))?;
        stdout.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            stdout.queue(Print(' '))?;
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
