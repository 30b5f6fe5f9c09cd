use crate::error::GameError;
use crate::{Position, TermInt};
use std::{io::{Stdout, Write, stdout}, panic, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, KeyEventKind, read, poll};
use log::warn;

/// The grid of text cells the game draws on. Positions are `(row, col)`.
///
/// Writes only touch the cell buffer; nothing reaches the screen until
/// `refresh` is called.
pub trait Surface {
    /// `(rows, cols)`
    fn dimensions(&self) -> (TermInt, TermInt);
    fn clear(&mut self);
    fn write_cell(&mut self, pos: Position, glyph: char, fg: Option<Color>) -> Result<(), GameError>;
    fn write_text(&mut self, pos: Position, text: &str, fg: Option<Color>) -> Result<(), GameError>;
    fn refresh(&mut self) -> Result<(), GameError>;
    /// Non-blocking. Returns at most one pending key press and drops the rest.
    fn poll_key(&mut self) -> Result<Option<KeyEvent>, GameError>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
}

impl Cell {
    pub const BLANK: Cell = Cell { ch: ' ', fg: None };
}

/// Row-major cell storage with strict bounds checking.
pub struct CellBuffer {
    rows: TermInt,
    cols: TermInt,
    cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(rows: TermInt, cols: TermInt) -> Self {
        CellBuffer { rows, cols, cells: vec![Cell::BLANK; rows as usize * cols as usize] }
    }

    pub fn dimensions(&self) -> (TermInt, TermInt) {
        (self.rows, self.cols)
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    pub fn put(&mut self, pos: Position, ch: char, fg: Option<Color>) -> Result<(), GameError> {
        let i = self.index(pos)?;
        self.cells[i] = Cell { ch, fg };
        Ok(())
    }

    /// Writes `text` left to right starting at `pos`. The whole string must
    /// fit on the row; if any cell falls outside, nothing is written.
    pub fn put_str(&mut self, pos: Position, text: &str, fg: Option<Color>) -> Result<(), GameError> {
        let indices = text.chars()
            .enumerate()
            .map(|(i, _)| self.index((pos.0, pos.1 + i as i32)))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, ch) in indices.into_iter().zip(text.chars()) {
            self.cells[i] = Cell { ch, fg };
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.index(pos).ok().map(|i| self.cells[i])
    }

    pub fn row(&self, row: TermInt) -> &[Cell] {
        let start = row as usize * self.cols as usize;
        &self.cells[start..start + self.cols as usize]
    }

    #[cfg(test)]
    pub fn row_text(&self, row: TermInt) -> String {
        self.row(row).iter().map(|c| c.ch).collect()
    }

    fn index(&self, (row, col): Position) -> Result<usize, GameError> {
        if row < 0 || col < 0 || row >= self.rows as i32 || col >= self.cols as i32 {
            return Err(GameError::OutOfBounds { row, col, rows: self.rows, cols: self.cols });
        }

        Ok(row as usize * self.cols as usize + col as usize)
    }
}

/// The real terminal. Holding a `TermManager` means the terminal is in raw
/// mode on the alternate screen; dropping it puts everything back.
pub struct TermManager {
    stdout: Stdout,
    screen: CellBuffer,
    active: bool,
}

impl TermManager {
    pub fn setup() -> Result<Self, GameError> {
        let (cols, rows) = terminal::size().map_err(GameError::SurfaceInit)?;
        terminal::enable_raw_mode().map_err(GameError::SurfaceInit)?;

        // From here on, an early return drops `term` and restores the terminal
        let mut term = TermManager { stdout: stdout(), screen: CellBuffer::new(rows, cols), active: true };
        execute!(
            term.stdout,
            EnterAlternateScreen,
            cursor::Hide,
            cursor::DisableBlinking,
            DisableLineWrap,
            terminal::Clear(terminal::ClearType::All)
        ).map_err(GameError::SurfaceInit)?;

        Ok(term)
    }

    /// Leaves raw mode and the alternate screen. Safe to call more than once.
    pub fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        reset_terminal();
    }

    fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>, GameError> {
        let mut events = vec![];

        while poll(Duration::ZERO)? {
            events.extend(key_press(read()?));
        }

        Ok(events)
    }
}

/// Puts the terminal back in cooked mode on the main screen. Needs no
/// `TermManager`, so the panic hook can call it too.
pub fn reset_terminal() {
    if let Err(err) = execute!(
        stdout(),
        style::ResetColor,
        EnableLineWrap,
        cursor::EnableBlinking,
        cursor::Show,
        LeaveAlternateScreen
    ) {
        warn!("failed to reset the screen: {err}");
    }

    if let Err(err) = terminal::disable_raw_mode() {
        warn!("failed to disable raw mode: {err}");
    }
}

/// Runs `before` ahead of the current panic hook, so the panic message lands
/// on a usable screen instead of the alternate one.
pub fn chain_panic_hook<F>(before: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let next = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        before();
        next(info);
    }));
}

/// Keeps key presses. The cell buffer keeps its startup size, so a resize
/// is only reported.
fn key_press(event: Event) -> Option<KeyEvent> {
    match event {
        Event::Key(ev) if ev.kind == KeyEventKind::Press => Some(ev),
        Event::Resize(cols, rows) => {
            warn!("terminal resized to {rows}x{cols}; still drawing at the startup size");
            None
        }
        _ => None,
    }
}

impl Surface for TermManager {
    fn dimensions(&self) -> (TermInt, TermInt) {
        self.screen.dimensions()
    }

    fn clear(&mut self) {
        self.screen.clear();
    }

    fn write_cell(&mut self, pos: Position, glyph: char, fg: Option<Color>) -> Result<(), GameError> {
        self.screen.put(pos, glyph, fg)
    }

    fn write_text(&mut self, pos: Position, text: &str, fg: Option<Color>) -> Result<(), GameError> {
        self.screen.put_str(pos, text, fg)
    }

    fn refresh(&mut self) -> Result<(), GameError> {
        let (rows, _) = self.screen.dimensions();

        for row in 0..rows {
            queue!(self.stdout, cursor::MoveTo(0, row), style::ResetColor)?;
            let mut current: Option<Color> = None;

            for cell in self.screen.row(row) {
                if cell.fg != current {
                    match cell.fg {
                        Some(color) => queue!(self.stdout, style::SetForegroundColor(color))?,
                        None => queue!(self.stdout, style::ResetColor)?,
                    }
                    current = cell.fg;
                }
                queue!(self.stdout, style::Print(cell.ch))?;
            }
        }

        queue!(self.stdout, style::ResetColor)?;
        self.stdout.flush()?;
        Ok(())
    }

    fn poll_key(&mut self) -> Result<Option<KeyEvent>, GameError> {
        Ok(self.read_key_events_queue()?.into_iter().next())
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        self.restore();
    }
}
