//! Eco Platformer headless runner
//!
//! Drives the fixed-step core with a scripted input and logs the run.
//! Usage: `eco-platformer [tuning.json]`

use eco_platformer::{Driver, Edge, GameStatus, HudSnapshot, ProgressSink, Tuning};

/// Scripted run length (two minutes of game time)
const MAX_FRAMES: u32 = 60 * 120;
const FRAME_DT: f32 = 1.0 / 60.0;

/// Stands in for the external progress system
struct LogProgress;

impl ProgressSink for LogProgress {
    fn report_total_score(&mut self, total_score: u64) {
        log::info!("Progress report: total score {}", total_score);
    }
}

fn load_tuning() -> Tuning {
    let Some(path) = std::env::args().nth(1) else {
        return Tuning::default();
    };

    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Could not read tuning file {}: {}", path, e);
            return Tuning::default();
        }
    };

    match Tuning::from_json(&json) {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("Invalid tuning file {}: {}", path, e);
            Tuning::default()
        }
    }
}

fn print_hud(driver: &Driver) {
    match HudSnapshot::from_session(driver.session()).to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize HUD: {}", e),
    }
}

fn main() {
    env_logger::init();
    log::info!("Eco Platformer (headless) starting...");

    let mut driver = Driver::new().with_progress_sink(Box::new(LogProgress));
    driver.input_mut().tuning = load_tuning();
    driver.start(0);

    for frame in 0..MAX_FRAMES {
        let input = driver.input_mut();
        input.right = true;
        input.run = frame % 240 < 180;
        input.jump = frame % 45 < 14;
        if frame % 45 == 0 {
            driver.press(Edge::Jump);
        }
        if frame % 300 == 150 {
            driver.press(Edge::Interact);
        }

        driver.update(FRAME_DT);

        match driver.status() {
            GameStatus::LevelComplete => {
                print_hud(&driver);
                driver.next_level();
            }
            GameStatus::GameOver | GameStatus::Won => break,
            _ => {}
        }
    }

    log::info!("Run finished with status {:?}", driver.status());
    print_hud(&driver);
}
