use log::info;
use rand::Rng;

use crate::assets::AssetSource;
use crate::config::Settings;
use crate::error::GameError;
use crate::game::{GameEngine, GameState};
use crate::menu::MainMenu;
use crate::term::Surface;

/// Walks the game states from startup to termination on `surface`.
/// Returns the score if a round was played, `None` if the user quit from the menu.
pub fn run<S, A, R>(surface: &mut S, assets: &A, settings: &Settings, mut rng: R) -> Result<Option<u32>, GameError>
where
    S: Surface,
    A: AssetSource,
    R: Rng,
{
    let mut state = GameState::Unknown;
    let mut score = None;

    loop {
        let next = match state {
            GameState::Unknown => GameState::MainMenu,
            GameState::MainMenu => {
                let mut menu = MainMenu::new(assets, &settings.title_art);
                GameState::after_menu(menu.run(surface, settings.tick())?)
            }
            GameState::Playing => {
                let (rows, cols) = surface.dimensions();
                let mut engine = GameEngine::new(rows, cols, settings.tick(), &mut rng);
                score = Some(engine.play(surface)?);
                GameState::Terminated
            }
            GameState::Terminated => return Ok(score),
        };

        info!("{state:?} -> {next:?}");
        state = next;
    }
}
