//! Test doubles for the terminal and the asset source.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;

use crate::assets::AssetSource;
use crate::error::GameError;
use crate::term::{CellBuffer, Surface};
use crate::{Position, TermInt};

/// An in-memory surface with scripted input. Each entry in `keys` is what is
/// queued by the time of one `poll_key` call; like the real terminal, a poll
/// returns the first key of its batch and drops the rest.
pub struct MockSurface {
    pub buffer: CellBuffer,
    pub keys: VecDeque<Vec<KeyEvent>>,
    pub refreshes: usize,
}

impl MockSurface {
    pub fn new(rows: TermInt, cols: TermInt) -> Self {
        MockSurface { buffer: CellBuffer::new(rows, cols), keys: VecDeque::new(), refreshes: 0 }
    }

    /// One key per poll.
    pub fn with_keys(mut self, codes: &[KeyCode]) -> Self {
        self.keys.extend(codes.iter().map(|code| vec![key(*code)]));
        self
    }

    /// Several keys pressed before a single poll.
    pub fn with_batch(mut self, codes: &[KeyCode]) -> Self {
        self.keys.push_back(codes.iter().map(|code| key(*code)).collect());
        self
    }

    pub fn text_at(&self, (row, col): Position, len: usize) -> String {
        self.buffer.row_text(row as TermInt).chars().skip(col as usize).take(len).collect()
    }

    pub fn glyph_at(&self, pos: Position) -> char {
        self.buffer.cell(pos).map(|c| c.ch).unwrap_or('?')
    }

    pub fn color_at(&self, pos: Position) -> Option<Color> {
        self.buffer.cell(pos).and_then(|c| c.fg)
    }
}

impl Surface for MockSurface {
    fn dimensions(&self) -> (TermInt, TermInt) {
        self.buffer.dimensions()
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn write_cell(&mut self, pos: Position, glyph: char, fg: Option<Color>) -> Result<(), GameError> {
        self.buffer.put(pos, glyph, fg)
    }

    fn write_text(&mut self, pos: Position, text: &str, fg: Option<Color>) -> Result<(), GameError> {
        self.buffer.put_str(pos, text, fg)
    }

    fn refresh(&mut self) -> Result<(), GameError> {
        self.refreshes += 1;
        Ok(())
    }

    fn poll_key(&mut self) -> Result<Option<KeyEvent>, GameError> {
        Ok(self.keys.pop_front().and_then(|batch| batch.into_iter().next()))
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Text assets held in memory, keyed by path.
#[derive(Default)]
pub struct MemoryAssets {
    files: HashMap<PathBuf, Vec<String>>,
}

impl MemoryAssets {
    pub fn with(mut self, path: impl Into<PathBuf>, lines: &[&str]) -> Self {
        self.files.insert(path.into(), lines.iter().map(|l| l.to_string()).collect());
        self
    }
}

impl AssetSource for MemoryAssets {
    fn lines(&self, path: &Path) -> Result<Vec<String>, GameError> {
        self.files.get(path).cloned().ok_or_else(|| GameError::AssetNotFound {
            path: path.to_path_buf(),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    }
}
