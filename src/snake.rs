use crate::Position;
use crossterm::event::KeyCode;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    /// Unit step as `(d_row, d_col)`.
    pub fn delta(self) -> Position {
        match self {
            Up => (-1, 0),
            Down => (1, 0),
            Left => (0, -1),
            Right => (0, 1),
        }
    }

    pub fn from_key(code: KeyCode) -> Option<Direction> {
        match code {
            KeyCode::Char('w') | KeyCode::Up => Some(Up),
            KeyCode::Char('a') | KeyCode::Left => Some(Left),
            KeyCode::Char('s') | KeyCode::Down => Some(Down),
            KeyCode::Char('d') | KeyCode::Right => Some(Right),
            _ => None,
        }
    }
}

/// Body segments from tail (first) to head (last). Never empty.
pub struct Snake {
    body: Vec<Position>,
    direction: Direction,
}

impl Snake {
    pub fn new(pos: Position, direction: Direction) -> Self {
        Snake { body: vec![pos], direction }
    }

    #[cfg(test)]
    pub fn from_body(body: Vec<Position>, direction: Direction) -> Self {
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Snake { body, direction }
    }

    pub fn body(&self) -> &[Position] {
        &self.body
    }

    pub fn head(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn next_head(&self) -> Position {
        let (head, delta) = (self.head(), self.direction.delta());
        (head.0 + delta.0, head.1 + delta.1)
    }

    /// Pushes `new_head` and drops the tail, keeping the length constant.
    /// Returns the dropped tail segment.
    pub fn advance(&mut self, new_head: Position) -> Position {
        self.body.push(new_head);
        self.body.remove(0)
    }

    /// Re-attaches a tail segment dropped by `advance`.
    pub fn grow(&mut self, old_tail: Position) {
        self.body.insert(0, old_tail);
    }

    /// Any direction is accepted, including a reversal into the body.
    pub fn set_direction(&mut self, new_direction: Direction) {
        self.direction = new_direction;
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn contains(&self, pos: &Position) -> bool {
        self.body.contains(pos)
    }
}
