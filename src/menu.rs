use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use log::{debug, info};

use crate::assets::AssetSource;
use crate::error::GameError;
use crate::game::sleep_until_next_tick;
use crate::term::Surface;
use crate::widget::{RectWidget, Widget};

const TITLE_COLOR: Color = Color::Green;
const HOVER_COLOR: Color = Color::Yellow;
const BUTTON_SIZE: (i32, i32) = (3, 25);
const PLAY_COL: i32 = 1;
const SETTINGS_COL: i32 = 34;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    Play,
    Settings,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MenuSelection {
    None,
    Play,
    Settings,
    Quit,
}

impl From<Button> for MenuSelection {
    fn from(button: Button) -> Self {
        match button {
            Button::Play => MenuSelection::Play,
            Button::Settings => MenuSelection::Settings,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Hover(Button),
    Choose(Button),
    Quit,
    Ignore,
}

/// What a key press does given the currently hovered button.
pub fn transition(hovering: Button, key: &KeyEvent) -> MenuAction {
    use Button::*;

    if is_ctrl_c(key) {
        return MenuAction::Quit;
    }

    match (hovering, key.code) {
        (_, KeyCode::Esc | KeyCode::Char('q')) => MenuAction::Quit,
        (_, KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h')) => MenuAction::Hover(Play),
        (_, KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l')) => MenuAction::Hover(Settings),
        (Play, KeyCode::Tab | KeyCode::BackTab) => MenuAction::Hover(Settings),
        (Settings, KeyCode::Tab | KeyCode::BackTab) => MenuAction::Hover(Play),
        (b, KeyCode::Enter | KeyCode::Char(' ')) => MenuAction::Choose(b),
        _ => MenuAction::Ignore,
    }
}

/// Title art above a "Play" and a "Settings" button.
pub struct MainMenu<'a, A: AssetSource> {
    assets: &'a A,
    art_path: PathBuf,
    hovering: Button,
    chosen: MenuSelection,
}

impl<'a, A: AssetSource> MainMenu<'a, A> {
    pub fn new(assets: &'a A, art_path: impl Into<PathBuf>) -> Self {
        MainMenu { assets, art_path: art_path.into(), hovering: Button::Play, chosen: MenuSelection::None }
    }

    #[cfg(test)]
    pub fn hovering(&self) -> Button {
        self.hovering
    }

    #[cfg(test)]
    pub fn chosen(&self) -> MenuSelection {
        self.chosen
    }

    /// Consumes at most one key and applies it. Returns the selection so far.
    pub fn poll<S: Surface>(&mut self, surface: &mut S) -> Result<MenuSelection, GameError> {
        if self.chosen != MenuSelection::None {
            return Ok(self.chosen);
        }

        let Some(key) = surface.poll_key()? else {
            return Ok(self.chosen);
        };

        match transition(self.hovering, &key) {
            MenuAction::Hover(button) if button != self.hovering => {
                debug!("menu hovering {button:?}");
                self.hovering = button;
                self.draw(surface)?;
            }
            MenuAction::Choose(button) => self.chosen = button.into(),
            MenuAction::Quit => self.chosen = MenuSelection::Quit,
            MenuAction::Hover(_) | MenuAction::Ignore => {}
        }

        Ok(self.chosen)
    }

    /// Draws the menu and polls once per tick until something is chosen.
    pub fn run<S: Surface>(&mut self, surface: &mut S, tick: Duration) -> Result<MenuSelection, GameError> {
        self.draw(surface)?;

        loop {
            let tick_start = Instant::now();
            let selection = self.poll(surface)?;
            if selection != MenuSelection::None {
                info!("menu selection: {selection:?}");
                return Ok(selection);
            }
            sleep_until_next_tick(tick_start, tick);
        }
    }

    fn button_color(&self, button: Button) -> Option<Color> {
        (self.hovering == button).then_some(HOVER_COLOR)
    }
}

impl<A: AssetSource> Widget for MainMenu<'_, A> {
    fn draw<S: Surface>(&self, surface: &mut S) -> Result<(), GameError> {
        let art = self.assets.lines(&self.art_path)?;

        surface.clear();
        for (i, line) in art.iter().enumerate() {
            surface.write_text((i as i32, 0), line, Some(TITLE_COLOR))?;
        }

        let row = art.len() as i32 + 2;
        let buttons = [(Button::Play, PLAY_COL, "Play"), (Button::Settings, SETTINGS_COL, "Settings")];
        for (button, col, label) in buttons {
            RectWidget {
                top_left: (row, col),
                dimensions: BUTTON_SIZE,
                label: Some(label),
                fg: self.button_color(button),
            }.draw(surface)?;
        }

        surface.refresh()
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}
