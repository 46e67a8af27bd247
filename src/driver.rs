//! Fixed-timestep driver and level status machine
//!
//! The driver owns the one authoritative session. Frame time goes into an
//! accumulator that is drained in whole `SIM_DT` sub-steps, at most
//! `MAX_SUBSTEPS` per frame. Status changes out of `Playing` come only from
//! the session flags the step function sets.

use crate::consts::*;
use crate::sim::{Session, TickInput, tick};

/// Where the player is in the game flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    LevelComplete,
    Won,
    GameOver,
}

/// One-way report to the external progress system
pub trait ProgressSink {
    fn report_total_score(&mut self, total_score: u64);
}

/// Single-shot inputs, latched until a sub-step consumes them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Jump,
    Interact,
    Recolor,
    Rematerial,
}

pub struct Driver {
    session: Session,
    status: GameStatus,
    accumulator: f32,
    /// Timestamp handed to the step function, advanced per sub-step
    sim_time_ms: f64,
    input: TickInput,
    progress: Option<Box<dyn ProgressSink>>,
    reported: bool,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    pub fn new() -> Self {
        Self {
            session: Session::new(0, 0.0),
            status: GameStatus::Menu,
            accumulator: 0.0,
            sim_time_ms: 0.0,
            input: TickInput::default(),
            progress: None,
            reported: false,
        }
    }

    pub fn with_progress_sink(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Held buttons, tuning and viewport for the coming sub-steps
    pub fn input_mut(&mut self) -> &mut TickInput {
        &mut self.input
    }

    /// Queue a single-shot input for the next sub-step
    pub fn press(&mut self, edge: Edge) {
        let edges = &mut self.input.edges;
        match edge {
            Edge::Jump => edges.jump = true,
            Edge::Interact => edges.interact = true,
            Edge::Recolor => edges.recolor = true,
            Edge::Rematerial => edges.rematerial = true,
        }
    }

    /// Begin a fresh run at `level_index`
    pub fn start(&mut self, level_index: usize) {
        self.begin(Session::new(level_index, self.sim_time_ms));
        self.reported = false;
        log::info!("Starting level {}", self.session.level_index);
    }

    pub fn toggle_pause(&mut self) {
        let next = match self.status {
            GameStatus::Playing => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Playing,
            _ => return,
        };
        self.session.paused = next == GameStatus::Paused;
        self.set_status(next);
    }

    /// Advance to the following level; only valid after a completion
    pub fn next_level(&mut self) -> bool {
        if self.status != GameStatus::LevelComplete {
            return false;
        }
        let s = &self.session;
        let next = Session::carry_over(s.level_index + 1, self.sim_time_ms, s.lives, s.total_score);
        self.begin(next);
        log::info!("Advancing to level {}", self.session.level_index);
        true
    }

    /// Replay the current level with full lives; only valid after game over
    pub fn retry(&mut self) -> bool {
        if self.status != GameStatus::GameOver {
            return false;
        }
        let s = &self.session;
        let next = Session::carry_over(s.level_index, self.sim_time_ms, START_LIVES, s.total_score);
        self.begin(next);
        log::info!("Retrying level {}", self.session.level_index);
        true
    }

    /// Feed one frame of wall time; returns the number of sub-steps run
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        if !matches!(self.status, GameStatus::Playing | GameStatus::Paused) {
            self.accumulator = 0.0;
            return 0;
        }

        self.accumulator += frame_dt.max(0.0);
        self.input.dt = SIM_DT;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.sim_time_ms += SIM_DT as f64 * 1000.0;
            self.session = tick(&self.session, &self.input, self.sim_time_ms);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.edges.clear();

            self.sync_status();
            if !matches!(self.status, GameStatus::Playing | GameStatus::Paused) {
                self.accumulator = 0.0;
                break;
            }
        }

        if self.accumulator >= SIM_DT {
            log::debug!("Dropping {:.1} ms of catch-up time", self.accumulator * 1000.0);
            self.accumulator = 0.0;
        }

        substeps
    }

    fn begin(&mut self, session: Session) {
        self.session = session;
        self.accumulator = 0.0;
        self.input.edges.clear();
        self.set_status(GameStatus::Playing);
    }

    fn set_status(&mut self, status: GameStatus) {
        if status != self.status {
            log::info!("Status {:?} -> {:?}", self.status, status);
            self.status = status;
        }
    }

    fn sync_status(&mut self) {
        let s = &self.session;
        let status = if s.won {
            GameStatus::Won
        } else if s.game_over {
            GameStatus::GameOver
        } else if s.completed {
            GameStatus::LevelComplete
        } else if s.paused {
            GameStatus::Paused
        } else {
            GameStatus::Playing
        };
        self.set_status(status);

        if status == GameStatus::Won && !self.reported {
            self.reported = true;
            let total = self.session.total_score;
            match self.progress.as_mut() {
                Some(sink) => sink.report_total_score(total),
                None => log::info!("Run won with {} points (no progress sink)", total),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::sim::level_count;

    struct Recorder(Rc<RefCell<Vec<u64>>>);

    impl ProgressSink for Recorder {
        fn report_total_score(&mut self, total_score: u64) {
            self.0.borrow_mut().push(total_score);
        }
    }

    fn playing() -> Driver {
        let mut driver = Driver::new();
        driver.start(0);
        driver
    }

    #[test]
    fn test_menu_runs_no_steps() {
        let mut driver = Driver::new();
        assert_eq!(driver.status(), GameStatus::Menu);
        assert_eq!(driver.update(1.0), 0);
    }

    #[test]
    fn test_substeps_follow_accumulator() {
        let mut driver = playing();
        assert_eq!(driver.update(0.04), 2);
        assert_eq!(driver.update(0.005), 0);
        assert_eq!(driver.update(0.03), 2);
        assert!(driver.session().clock.now_ms > 60.0);
    }

    #[test]
    fn test_long_frame_is_capped_and_excess_dropped() {
        let mut driver = playing();
        assert_eq!(driver.update(1.0), MAX_SUBSTEPS);
        assert_eq!(driver.update(0.0), 0);
    }

    #[test]
    fn test_edge_consumed_by_one_substep() {
        let mut driver = playing();
        let chest = driver.session.props.iter().position(|p| p.openable).unwrap();
        let pos = driver.session.props[chest].pos;
        driver.session.player.pos = Vec2::new(pos.x - PLAYER_WIDTH - 4.0, 640.0 - PLAYER_HEIGHT);

        driver.press(Edge::Interact);
        assert_eq!(driver.update(0.04), 2);
        // Toggled once, not once per sub-step
        assert!(driver.session().props[chest].open);
        assert!(!driver.input_mut().edges.any());
    }

    #[test]
    fn test_short_jump_tap_is_not_lost() {
        let mut driver = playing();
        // Settle onto the ground first
        for _ in 0..30 {
            driver.update(SIM_DT);
        }
        assert!(driver.session().player.on_ground);

        driver.press(Edge::Jump);
        assert_eq!(driver.update(0.004), 0);
        assert_eq!(driver.update(0.016), 1);
        assert_eq!(driver.session().player.jumps_used, 1);
        assert!(driver.session().player.vel.y < 0.0);

        // Latched press fires once only
        assert_eq!(driver.update(0.04), 2);
        assert_eq!(driver.session().player.jumps_used, 1);
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut driver = playing();
        driver.toggle_pause();
        assert_eq!(driver.status(), GameStatus::Paused);
        assert!(driver.session().paused);

        let before = driver.session().player.pos;
        driver.input_mut().right = true;
        driver.update(0.1);
        assert_eq!(driver.session().player.pos, before);
        assert_eq!(driver.session().clock.elapsed_ms, 0.0);

        driver.toggle_pause();
        assert_eq!(driver.status(), GameStatus::Playing);
        assert!(driver.update(0.1) > 0);
        assert!(driver.session().player.pos.x > before.x);
    }

    #[test]
    fn test_next_level_carries_lives_and_total() {
        let mut driver = playing();
        assert!(!driver.next_level());

        driver.session.completed = true;
        driver.session.lives = 2;
        driver.session.total_score = 120;
        driver.update(SIM_DT);
        assert_eq!(driver.status(), GameStatus::LevelComplete);

        assert!(driver.next_level());
        assert_eq!(driver.status(), GameStatus::Playing);
        assert_eq!(driver.session().level_index, 1);
        assert_eq!(driver.session().lives, 2);
        assert_eq!(driver.session().total_score, 120);
    }

    #[test]
    fn test_retry_after_game_over() {
        let mut driver = playing();
        driver.session.game_over = true;
        driver.session.lives = 0;
        driver.session.total_score = 40;
        driver.update(SIM_DT);
        assert_eq!(driver.status(), GameStatus::GameOver);
        assert!(!driver.next_level());

        assert!(driver.retry());
        assert_eq!(driver.session().level_index, 0);
        assert_eq!(driver.session().lives, START_LIVES);
        assert_eq!(driver.session().total_score, 40);
        assert!(!driver.session().is_terminal());
    }

    #[test]
    fn test_win_reports_total_once() {
        let reports = Rc::new(RefCell::new(Vec::new()));
        let mut driver = Driver::new().with_progress_sink(Box::new(Recorder(reports.clone())));
        driver.start(level_count() - 1);

        driver.session.completed = true;
        driver.session.won = true;
        driver.session.total_score = 999;
        driver.update(SIM_DT);
        assert_eq!(driver.status(), GameStatus::Won);
        driver.update(1.0);

        assert_eq!(*reports.borrow(), vec![999]);
        assert!(!driver.next_level());
    }
}
