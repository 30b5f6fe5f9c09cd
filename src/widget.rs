use crate::error::GameError;
use crate::term::Surface;
use crate::Position;

use crossterm::style::Color;

/// Anything that can paint itself onto a surface. Widgets never refresh
/// unless they own the whole screen.
pub trait Widget {
    fn draw<S: Surface>(&self, surface: &mut S) -> Result<(), GameError>;
}

/// A bordered box with an optional label.
///
/// Occupies rows `top_left.0 ..= top_left.0 + height` and columns
/// `top_left.1 .. top_left.1 + width`. The label is anchored at
/// `top_left + (height / 3, width / 3)`, which is only roughly centred.
pub struct RectWidget<'a> {
    pub top_left: Position,
    /// `(height, width)`
    pub dimensions: (i32, i32),
    pub label: Option<&'a str>,
    pub fg: Option<Color>,
}

impl Widget for RectWidget<'_> {
    /// # Panics
    ///
    /// If `height < 2` or `width < 6`; the border pieces don't fit below that.
    fn draw<S: Surface>(&self, surface: &mut S) -> Result<(), GameError> {
        let (top, left) = self.top_left;
        let (height, width) = self.dimensions;
        assert!(height >= 2 && width >= 6, "rectangle {height}x{width} is too small for a border");

        let (w, fg) = (width as usize, self.fg);
        let bottom = top + height;

        surface.write_text((top, left), &format!("/{}", "$".repeat(w - 1)), fg)?;

        for row in top + 1..bottom {
            let fill = if row == bottom - 1 { "_" } else { " " };
            surface.write_text((row, left), &format!("|$${}|$$", fill.repeat(w - 6)), fg)?;
        }

        surface.write_text((bottom, left), &format!("|{} /", "_".repeat(w - 3)), fg)?;

        if let Some(label) = self.label {
            surface.write_text((top + height / 3, left + width / 3), label, fg)?;
        }

        Ok(())
    }
}
