use std::{thread::sleep, time::{Duration, Instant}};

use crate::{Position, TermInt};
use crate::error::GameError;
use crate::menu::MenuSelection;
use crate::term::Surface;
use crate::snake::{Snake, Direction};

use crossterm::style::Color;
use log::{debug, info, warn};
use rand::{Rng, seq::SliceRandom};

pub const TICK_RATE: u32 = 6;

const SNAKE_GLYPH: char = '#';
const FOOD_GLYPH: char = '*';
const SNAKE_COLOR: Color = Color::Green;
const FOOD_COLOR: Color = Color::Red;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Unknown,
    MainMenu,
    Playing,
    Terminated,
}

impl GameState {
    /// Where the main menu leads. There is no settings screen, so choosing
    /// "Settings" shows the menu again.
    pub fn after_menu(selection: MenuSelection) -> GameState {
        match selection {
            MenuSelection::Play => GameState::Playing,
            MenuSelection::Quit => GameState::Terminated,
            MenuSelection::Settings | MenuSelection::None => GameState::MainMenu,
        }
    }
}

pub fn tick_duration(rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / rate as f64)
}

/// Sleeps for whatever is left of the tick that started at `tick_start`.
pub fn sleep_until_next_tick(tick_start: Instant, tick: Duration) {
    if let Some(rest) = tick.checked_sub(tick_start.elapsed()) {
        sleep(rest);
    }
}

/// Snake, food and score for one round, plus the fixed-rate loop driving them.
pub struct GameEngine<R: Rng> {
    rows: TermInt,
    cols: TermInt,
    snake: Snake,
    food: Option<Position>,
    score: u32,
    tick: Duration,
    rng: R,
}

impl<R: Rng> GameEngine<R> {
    pub fn new(rows: TermInt, cols: TermInt, tick: Duration, rng: R) -> Self {
        let center = (rows as i32 / 2, cols as i32 / 2);
        let snake = Snake::new(center, Direction::Right);
        GameEngine { rows, cols, snake, food: None, score: 0, tick, rng }
    }

    #[cfg(test)]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[cfg(test)]
    pub fn food(&self) -> Option<Position> {
        self.food
    }

    #[cfg(test)]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Runs ticks until the snake leaves the board. Returns the final score.
    pub fn play<S: Surface>(&mut self, surface: &mut S) -> Result<u32, GameError> {
        info!("game started on a {}x{} board", self.rows, self.cols);
        surface.clear();
        surface.refresh()?;

        loop {
            let tick_start = Instant::now();
            if !self.update(surface)? {
                break;
            }
            self.draw(surface)?;
            surface.refresh()?;
            sleep_until_next_tick(tick_start, self.tick);
        }

        info!("game over, score {}", self.score);
        Ok(self.score)
    }

    /// Advances one tick. Returns `false` once the snake's next head is off
    /// the board, in which case nothing moves.
    pub fn update<S: Surface>(&mut self, surface: &mut S) -> Result<bool, GameError> {
        if self.food.is_none() {
            self.food = self.spawn_food();
        }

        if let Some(dir) = surface.poll_key()?.and_then(|ev| Direction::from_key(ev.code)) {
            if dir != self.snake.get_direction() {
                debug!("facing {dir:?}");
            }
            self.snake.set_direction(dir);
        }

        let head = self.snake.head();
        let new_head = self.snake.next_head();

        if !self.in_bounds(new_head) {
            info!("snake left the board at {new_head:?}");
            return Ok(false);
        }

        let old_tail = self.snake.advance(new_head);

        // Food is checked against where the head was before this move, so it is
        // eaten one tick after the head reaches it.
        if self.food == Some(head) {
            self.snake.grow(old_tail);
            self.score += 1;
            debug!("ate food at {head:?}, length {}", self.snake.body().len());
            self.food = self.spawn_food();
        }

        Ok(true)
    }

    pub fn draw<S: Surface>(&self, surface: &mut S) -> Result<(), GameError> {
        surface.clear();

        for pos in self.snake.body() {
            surface.write_cell(*pos, SNAKE_GLYPH, Some(SNAKE_COLOR))?;
        }

        if let Some(food) = self.food {
            surface.write_cell(food, FOOD_GLYPH, Some(FOOD_COLOR))?;
        }

        Ok(())
    }

    /// Column 0 counts as a wall; row 0 does not.
    fn in_bounds(&self, (row, col): Position) -> bool {
        (0..self.rows as i32).contains(&row) && (1..self.cols as i32).contains(&col)
    }

    fn spawn_food(&mut self) -> Option<Position> {
        let snake = &self.snake;
        let cols = self.cols as i32;
        let choices: Vec<Position> = (0..self.rows as i32)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .filter(|pos| !snake.contains(pos))
            .collect();

        let res = choices.choose(&mut self.rng).copied();
        match res {
            Some(food) => debug!("food placed at {food:?}"),
            None => warn!("no free cell left for food"),
        }
        res
    }

    #[cfg(test)]
    fn with_state(rows: TermInt, cols: TermInt, snake: Snake, food: Option<Position>, rng: R) -> Self {
        GameEngine { rows, cols, snake, food, score: 0, tick: Duration::ZERO, rng }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;
    use crate::test_support::MockSurface;
    use crossterm::event::KeyCode;
    use rand::{rngs::StdRng, SeedableRng};

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn engine(body: Vec<Position>, facing: Direction, food: Option<Position>) -> GameEngine<StdRng> {
        GameEngine::with_state(24, 80, Snake::from_body(body, facing), food, seeded_rng())
    }

    #[test]
    fn first_tick_places_food_and_moves() {
        let mut game = engine(vec![(5, 5)], Right, None);
        let mut surface = MockSurface::new(24, 80);

        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().body(), &[(5, 6)]);

        let food = game.food().unwrap();
        assert!((0..24).contains(&food.0) && (0..80).contains(&food.1));
        assert_ne!(food, (5, 5));
    }

    #[test]
    fn movement_keeps_length_and_shifts_every_segment() {
        let mut game = engine(vec![(10, 10), (10, 11), (10, 12)], Right, Some((0, 0)));
        let mut surface = MockSurface::new(24, 80).with_keys(&[KeyCode::Down]);

        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().body(), &[(10, 11), (10, 12), (11, 12)]);

        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().body(), &[(10, 12), (11, 12), (12, 12)]);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn eating_uses_the_pre_move_head_and_keeps_the_old_tail() {
        let mut game = engine(vec![(5, 5), (5, 6)], Right, Some((5, 6)));
        let mut surface = MockSurface::new(24, 80);

        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().body(), &[(5, 5), (5, 6), (5, 7)]);
        assert_eq!(game.score(), 1);

        let food = game.food().unwrap();
        assert_ne!(food, (5, 6));
        assert!(!game.snake().contains(&food));
    }

    #[test]
    fn food_under_the_next_head_is_eaten_a_tick_later() {
        let mut game = engine(vec![(5, 5)], Right, Some((5, 6)));
        let mut surface = MockSurface::new(24, 80);

        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().body(), &[(5, 6)]);
        assert_eq!(game.food(), Some((5, 6)));
        assert_eq!(game.score(), 0);

        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().body(), &[(5, 6), (5, 7)]);
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn food_under_the_tail_is_not_eaten() {
        let mut game = engine(vec![(5, 5), (5, 6)], Right, Some((5, 5)));
        let mut surface = MockSurface::new(24, 80);

        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().body(), &[(5, 6), (5, 7)]);
        assert_eq!(game.food(), Some((5, 5)));
    }

    #[test]
    fn column_zero_is_a_wall() {
        let mut game = engine(vec![(0, 1)], Left, Some((9, 9)));
        let mut surface = MockSurface::new(24, 80);

        assert!(!game.update(&mut surface).unwrap());
        assert_eq!(game.snake().body(), &[(0, 1)]);
    }

    #[test]
    fn row_zero_is_playable() {
        let mut game = engine(vec![(1, 5)], Up, Some((9, 9)));
        let mut surface = MockSurface::new(24, 80);

        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().body(), &[(0, 5)]);

        assert!(!game.update(&mut surface).unwrap());
    }

    #[test]
    fn last_row_and_column_are_the_far_walls() {
        let mut surface = MockSurface::new(24, 80);

        let mut game = engine(vec![(5, 78)], Right, Some((9, 9)));
        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().head(), (5, 79));
        assert!(!game.update(&mut surface).unwrap());

        let mut game = engine(vec![(22, 5)], Down, Some((9, 9)));
        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().head(), (23, 5));
        assert!(!game.update(&mut surface).unwrap());
    }

    #[test]
    fn unmapped_keys_leave_the_facing_alone() {
        let mut game = engine(vec![(5, 5)], Right, Some((9, 9)));
        let mut surface = MockSurface::new(24, 80)
            .with_keys(&[KeyCode::Char('x'), KeyCode::Char('w')]);

        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().get_direction(), Right);
        assert_eq!(game.snake().head(), (5, 6));

        assert!(game.update(&mut surface).unwrap());
        assert_eq!(game.snake().get_direction(), Up);
        assert_eq!(game.snake().head(), (4, 6));
    }

    #[test]
    fn extra_keys_queued_in_one_tick_are_dropped() {
        let mut game = engine(vec![(5, 5)], Right, Some((9, 9)));
        let mut surface = MockSurface::new(24, 80).with_batch(&[KeyCode::Down, KeyCode::Up]);

        assert!(game.update(&mut surface).unwrap());
        assert!(game.update(&mut surface).unwrap());

        assert_eq!(game.snake().get_direction(), Down);
        assert_eq!(game.snake().body(), &[(7, 5)]);
        assert!(surface.keys.is_empty());
    }

    #[test]
    fn food_never_lands_on_the_snake() {
        // 2x3 board with five cells taken leaves exactly one free cell
        let body = vec![(0, 0), (0, 1), (0, 2), (1, 2), (1, 1)];
        let mut game = GameEngine::with_state(2, 3, Snake::from_body(body, Left), None, seeded_rng());

        assert_eq!(game.spawn_food(), Some((1, 0)));
    }

    #[test]
    fn full_board_leaves_food_absent() {
        let body = vec![(0, 0), (0, 1), (1, 1), (1, 0)];
        let mut game = GameEngine::with_state(2, 2, Snake::from_body(body, Up), None, seeded_rng());

        assert_eq!(game.spawn_food(), None);
    }

    #[test]
    fn draw_paints_snake_and_food() {
        let game = engine(vec![(3, 3), (3, 4)], Right, Some((7, 7)));
        let mut surface = MockSurface::new(24, 80);
        surface.write_cell((0, 0), 'x', None).unwrap();
        game.draw(&mut surface).unwrap();

        assert_eq!(surface.glyph_at((0, 0)), ' ');
        assert_eq!(surface.glyph_at((3, 3)), SNAKE_GLYPH);
        assert_eq!(surface.glyph_at((3, 4)), SNAKE_GLYPH);
        assert_eq!(surface.color_at((3, 4)), Some(SNAKE_COLOR));
        assert_eq!(surface.glyph_at((7, 7)), FOOD_GLYPH);
        assert_eq!(surface.refreshes, 0);
    }

    #[test]
    fn play_runs_until_the_wall_and_refreshes_every_tick() {
        let mut game = GameEngine::new(4, 10, Duration::ZERO, seeded_rng());
        let mut surface = MockSurface::new(4, 10);

        assert_eq!(game.snake().body(), &[(2, 5)]);
        let score = game.play(&mut surface).unwrap();

        assert_eq!(game.snake().head(), (2, 9));
        assert_eq!(score, game.score());
        // the initial clear plus one refresh per successful tick
        assert_eq!(surface.refreshes, 1 + 4);
    }

    #[test]
    fn menu_selection_drives_the_state_machine() {
        assert_eq!(GameState::after_menu(MenuSelection::Play), GameState::Playing);
        assert_eq!(GameState::after_menu(MenuSelection::Settings), GameState::MainMenu);
        assert_eq!(GameState::after_menu(MenuSelection::Quit), GameState::Terminated);
    }

    #[test]
    fn tick_rate_sets_the_period() {
        assert_eq!(tick_duration(TICK_RATE).as_millis(), 166);
        assert_eq!(tick_duration(4), Duration::from_millis(250));
    }
}
