//! Board simulation: bird, pipe-pairs, scoring and the terminal state.
//!
//! Everything here is plain data advanced one frame at a time by
//! [`Game::step`]. Nothing touches the DOM, so the whole module runs under
//! native `cargo test`.

use crate::input::{InputEvent, InputQueue};

pub const BASE_WIDTH: f64 = 360.0;
pub const BASE_HEIGHT: f64 = 640.0;

/// Tuning constants for one board. `Default` is the classic layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameConfig {
    pub board_width: f64,
    pub board_height: f64,
    pub bird_width: f64,
    pub bird_height: f64,
    pub pipe_width: f64,
    pub pipe_height: f64,
    /// Top edge the random pipe offset is measured from.
    pub pipe_y: f64,
    /// Horizontal scroll per frame; negative moves pipes left.
    pub velocity_x: f64,
    pub gravity: f64,
    pub flap_velocity: f64,
    pub spawn_interval_ms: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: BASE_WIDTH,
            board_height: BASE_HEIGHT,
            bird_width: 60.0,
            bird_height: 60.0,
            pipe_width: 64.0,
            pipe_height: 450.0,
            pipe_y: 0.0,
            velocity_x: -2.0,
            gravity: 0.4,
            flap_velocity: -6.0,
            spawn_interval_ms: 1500,
        }
    }
}

impl GameConfig {
    pub fn bird_x(&self) -> f64 {
        self.board_width / 8.0
    }

    pub fn bird_start_y(&self) -> f64 {
        self.board_height / 2.0
    }

    pub fn opening_space(&self) -> f64 {
        self.board_height / 4.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bird {
    fn spawn(config: &GameConfig) -> Self {
        Self {
            x: config.bird_x(),
            y: config.bird_start_y(),
            width: config.bird_width,
            height: config.bird_height,
        }
    }
}

/// Which sprite a pipe is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipeImage {
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pipe {
    pub image: PipeImage,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub passed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipePair {
    pub top: Pipe,
    pub bottom: Pipe,
}

impl PipePair {
    /// Builds a pair whose top pipe starts at `top_y`; the bottom pipe sits
    /// one pipe height plus the opening below it.
    pub fn new(config: &GameConfig, x: f64, top_y: f64) -> Self {
        let top = Pipe {
            image: PipeImage::Top,
            x,
            y: top_y,
            width: config.pipe_width,
            height: config.pipe_height,
            passed: false,
        };
        let bottom = Pipe {
            image: PipeImage::Bottom,
            y: top_y + config.pipe_height + config.opening_space(),
            ..top
        };
        Self { top, bottom }
    }

    fn shift(&mut self, dx: f64) {
        self.top.x += dx;
        self.bottom.x += dx;
    }

    fn right_edge(&self) -> f64 {
        self.top.x + self.top.width
    }
}

/// Axis-aligned bounding-box overlap between the bird and one pipe.
pub fn check_collision(bird: &Bird, pipe: &Pipe) -> bool {
    bird.x < pipe.x + pipe.width
        && bird.x + bird.width > pipe.x
        && bird.y < pipe.y + pipe.height
        && bird.y + bird.height > pipe.y
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The board advanced and is still in play.
    Advanced,
    /// The board advanced and this frame ended the run.
    Ended { new_high_score: bool },
    /// The run is over; nothing moved.
    Halted,
}

#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    pub bird: Bird,
    pub velocity_y: f64,
    pub pipes: Vec<PipePair>,
    pub score: u32,
    pub high_score: u32,
    pub game_over: bool,
    inputs: InputQueue,
}

impl Game {
    pub fn new(config: GameConfig, high_score: u32) -> Self {
        Self {
            bird: Bird::spawn(&config),
            config,
            velocity_y: 0.0,
            pipes: Vec::new(),
            score: 0,
            high_score,
            game_over: false,
            inputs: InputQueue::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn queue_input(&mut self, input: InputEvent) {
        self.inputs.push(input);
    }

    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    fn apply_inputs(&mut self) {
        let inputs: Vec<InputEvent> = self.inputs.drain().collect();
        for input in inputs {
            match input {
                InputEvent::Flap if !self.game_over => {
                    self.velocity_y = self.config.flap_velocity;
                }
                InputEvent::Restart if self.game_over => self.restart(),
                InputEvent::Flap | InputEvent::Restart => {}
            }
        }
    }

    /// Advances the board by one frame.
    pub fn step(&mut self) -> StepOutcome {
        self.apply_inputs();

        if self.game_over {
            return StepOutcome::Halted;
        }

        self.velocity_y += self.config.gravity;
        self.bird.y = (self.bird.y + self.velocity_y).max(0.0);

        if self.bird.y > self.config.board_height {
            self.game_over = true;
        }

        let bird = self.bird;
        let dx = self.config.velocity_x;
        for pair in &mut self.pipes {
            pair.shift(dx);

            if check_collision(&bird, &pair.top) || check_collision(&bird, &pair.bottom) {
                self.game_over = true;
            }

            if !pair.top.passed && bird.x > pair.right_edge() {
                self.score += 1;
                pair.top.passed = true;
            }
        }

        self.pipes.retain(|pair| pair.right_edge() > 0.0);

        if self.game_over {
            StepOutcome::Ended {
                new_high_score: self.record_high_score(),
            }
        } else {
            StepOutcome::Advanced
        }
    }

    /// Appends a pipe-pair just past the right edge. `random` is a sample
    /// from `[0, 1)` choosing how far the top pipe hangs down.
    /// Returns `false` without spawning while the run is over.
    pub fn spawn_pipes(&mut self, random: f64) -> bool {
        if self.game_over {
            return false;
        }

        let pipe_height = self.config.pipe_height;
        let top_y = self.config.pipe_y - pipe_height / 4.0 - random * (pipe_height / 2.0);
        self.pipes
            .push(PipePair::new(&self.config, self.config.board_width, top_y));
        true
    }

    /// Raises the high score to the current score if it was beaten.
    pub fn record_high_score(&mut self) -> bool {
        if self.score > self.high_score {
            self.high_score = self.score;
            true
        } else {
            false
        }
    }

    pub fn restart(&mut self) {
        self.game_over = false;
        self.score = 0;
        self.velocity_y = 0.0;
        self.bird.y = self.config.bird_start_y();
        self.pipes.clear();
        self.inputs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(GameConfig::default(), 0)
    }

    fn pipe_at(x: f64, y: f64) -> Pipe {
        Pipe {
            image: PipeImage::Top,
            x,
            y,
            width: 64.0,
            height: 450.0,
            passed: false,
        }
    }

    fn bird_at(x: f64, y: f64) -> Bird {
        Bird {
            x,
            y,
            width: 60.0,
            height: 60.0,
        }
    }

    #[test]
    fn default_layout() {
        let game = game();
        assert_eq!(game.bird.x, 45.0);
        assert_eq!(game.bird.y, 320.0);
        assert_eq!(game.config().opening_space(), 160.0);
        assert!(game.pipes.is_empty());
        assert!(!game.game_over);
    }

    #[test]
    fn overlapping_boxes_collide() {
        assert!(check_collision(&bird_at(45.0, 300.0), &pipe_at(40.0, 280.0)));
    }

    #[test]
    fn boxes_apart_on_x_do_not_collide() {
        assert!(!check_collision(&bird_at(45.0, 300.0), &pipe_at(200.0, 280.0)));
    }

    #[test]
    fn touching_edges_do_not_collide() {
        // bird spans x 45..105, pipe starts exactly at 105
        assert!(!check_collision(&bird_at(45.0, 300.0), &pipe_at(105.0, 280.0)));
        // bird spans y 300..360, pipe ends exactly at 300
        assert!(!check_collision(&bird_at(45.0, 300.0), &pipe_at(40.0, -150.0)));
    }

    #[test]
    fn gravity_integrates_velocity_then_position() {
        let mut game = game();
        let mut expected_v = 0.0;
        let mut expected_y = game.bird.y;
        for _ in 0..20 {
            expected_v += 0.4;
            expected_y = f64::max(expected_y + expected_v, 0.0);
            assert_eq!(game.step(), StepOutcome::Advanced);
            assert_eq!(game.velocity_y, expected_v);
            assert_eq!(game.bird.y, expected_y);
        }
    }

    #[test]
    fn bird_is_clamped_at_the_top() {
        let mut game = game();
        game.bird.y = 3.0;
        game.queue_input(InputEvent::Flap);
        game.step();
        assert_eq!(game.velocity_y, -6.0 + 0.4);
        assert_eq!(game.bird.y, 0.0);

        for _ in 0..5 {
            game.queue_input(InputEvent::Flap);
            game.step();
            assert!(game.bird.y >= 0.0);
        }
    }

    #[test]
    fn flap_sets_velocity_absolutely() {
        let mut game = game();
        game.velocity_y = 9.0;
        game.queue_input(InputEvent::Flap);
        game.queue_input(InputEvent::Flap);
        game.step();
        assert!((game.velocity_y - (-5.6)).abs() < 1e-9);
    }

    #[test]
    fn falling_below_the_board_ends_the_run() {
        let mut game = game();
        game.bird.y = 639.0;
        game.velocity_y = 5.0;
        assert_eq!(
            game.step(),
            StepOutcome::Ended {
                new_high_score: false
            }
        );
        assert!(game.game_over);
        assert_eq!(game.step(), StepOutcome::Halted);
    }

    #[test]
    fn halted_board_does_not_move() {
        let mut game = game();
        game.spawn_pipes(0.5);
        game.game_over = true;
        let before_bird = game.bird;
        let before_pipes = game.pipes.clone();
        game.queue_input(InputEvent::Flap);
        assert_eq!(game.step(), StepOutcome::Halted);
        assert_eq!(game.bird, before_bird);
        assert_eq!(game.pipes, before_pipes);
        assert_eq!(game.velocity_y, 0.0);
    }

    #[test]
    fn spawned_gap_is_fixed() {
        let mut game = game();
        for random in [0.0, 0.25, 0.5, 0.75] {
            assert!(game.spawn_pipes(random));
            let pair = game.pipes.last().unwrap();
            assert_eq!(pair.bottom.y - pair.top.y, 610.0);
            assert_eq!(pair.top.x, 360.0);
            assert_eq!(pair.bottom.x, 360.0);
            assert_eq!(pair.top.image, PipeImage::Top);
            assert_eq!(pair.bottom.image, PipeImage::Bottom);
        }
    }

    #[test]
    fn spawn_offset_stays_in_band() {
        let mut game = game();
        game.spawn_pipes(0.0);
        game.spawn_pipes(0.999);
        assert_eq!(game.pipes[0].top.y, -112.5);
        assert!(game.pipes[1].top.y > -337.5 && game.pipes[1].top.y < -112.5);
    }

    #[test]
    fn gap_survives_scrolling() {
        let mut game = game();
        game.spawn_pipes(0.5);
        for _ in 0..50 {
            game.queue_input(InputEvent::Flap);
            game.step();
            for pair in &game.pipes {
                assert_eq!(pair.bottom.y - pair.top.y, 610.0);
                assert_eq!(pair.top.x, pair.bottom.x);
            }
        }
    }

    #[test]
    fn spawner_is_gated_by_game_over() {
        let mut game = game();
        game.game_over = true;
        assert!(!game.spawn_pipes(0.5));
        assert!(game.pipes.is_empty());
    }

    /// A pair placed with a gap the bird cannot touch, so only scoring and
    /// pruning are observed.
    fn harmless_pair(game: &Game, x: f64) -> PipePair {
        let mut pair = PipePair::new(game.config(), x, -10_000.0);
        pair.bottom.y = 10_000.0;
        pair
    }

    #[test]
    fn passing_a_pair_scores_once() {
        let mut game = game();
        // right edge at 45.0 + 2.0: after one step it sits at 45.0, not yet passed
        game.pipes.push(harmless_pair(&game, 47.0 - 64.0));
        game.bird.y = 300.0;

        game.queue_input(InputEvent::Flap);
        game.step();
        assert_eq!(game.score, 0);

        game.queue_input(InputEvent::Flap);
        game.step();
        assert_eq!(game.score, 1);
        assert!(game.pipes[0].top.passed);

        for _ in 0..10 {
            game.queue_input(InputEvent::Flap);
            game.step();
        }
        assert_eq!(game.score, 1);
    }

    #[test]
    fn pairs_are_pruned_once_fully_off_screen() {
        let mut game = game();
        game.bird.y = 300.0;
        game.pipes.push(harmless_pair(&game, -60.0));

        // right edge 4 -> 2: still visible
        game.queue_input(InputEvent::Flap);
        game.step();
        assert_eq!(game.pipes.len(), 1);

        // right edge 2 -> 0: gone
        game.queue_input(InputEvent::Flap);
        game.step();
        assert!(game.pipes.is_empty());
    }

    #[test]
    fn hitting_a_pipe_ends_the_run_and_records_high_score() {
        let mut game = Game::new(GameConfig::default(), 2);
        game.score = 3;
        game.bird.y = 300.0;
        game.pipes.push(PipePair::new(game.config(), 42.0, 280.0));

        assert_eq!(
            game.step(),
            StepOutcome::Ended {
                new_high_score: true
            }
        );
        assert_eq!(game.high_score, 3);
    }

    #[test]
    fn high_score_is_max_of_previous_and_run() {
        let mut game = Game::new(GameConfig::default(), 7);
        game.score = 4;
        assert!(!game.record_high_score());
        assert_eq!(game.high_score, 7);

        game.score = 9;
        assert!(game.record_high_score());
        assert_eq!(game.high_score, 9);
    }

    #[test]
    fn restart_resets_the_run() {
        let mut game = game();
        game.spawn_pipes(0.1);
        game.spawn_pipes(0.9);
        game.score = 5;
        game.velocity_y = 3.2;
        game.bird.y = 700.0;
        game.game_over = true;

        game.restart();

        assert_eq!(game.score, 0);
        assert!(!game.game_over);
        assert!(game.pipes.is_empty());
        assert_eq!(game.bird.y, 320.0);
        assert_eq!(game.velocity_y, 0.0);
    }

    #[test]
    fn restart_input_only_applies_after_game_over() {
        let mut game = game();
        game.score = 2;
        game.queue_input(InputEvent::Restart);
        game.step();
        assert_eq!(game.score, 2);

        game.game_over = true;
        game.queue_input(InputEvent::Flap);
        game.queue_input(InputEvent::Restart);
        assert_eq!(game.step(), StepOutcome::Advanced);
        assert_eq!(game.score, 0);
        // the flap came before the restart and was ignored
        assert_eq!(game.velocity_y, 0.4);
    }

    #[test]
    fn flap_after_restart_in_same_frame_applies() {
        let mut game = game();
        game.game_over = true;
        game.queue_input(InputEvent::Restart);
        game.queue_input(InputEvent::Flap);
        game.step();
        assert!((game.velocity_y - (-5.6)).abs() < 1e-9);
        assert_eq!(game.pending_inputs(), 0);
    }
}
