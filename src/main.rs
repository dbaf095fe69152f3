//! Maze Race headless runner
//!
//! Generates a race from a seed, drives both players with scripted bots
//! until someone crosses the win zone, prints the map and verdict, writes
//! the generated map to `maze.json`, and folds the result into
//! `leaderboard.json`.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use maze_race::Settings;
use maze_race::consts::TICK_RATE;
use maze_race::sim::{CellKind, Intent, PlayerId, RaceState, TickInput, tick};
use maze_race::stats::{Leaderboard, RaceRecord};

const LEADERBOARD_PATH: &str = "leaderboard.json";
const MAP_PATH: &str = "maze.json";
/// Bail out of a race no bot manages to finish
const MAX_RACE_TICKS: u64 = 60 * 60 * TICK_RATE as u64;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    let maze_width: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(7);
    let maze_height: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(maze_width);

    if let Err(err) = run(seed, maze_width, maze_height) {
        log::error!("race failed: {err}");
        std::process::exit(1);
    }
}

fn run(seed: u64, maze_width: usize, maze_height: usize) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new(1280.0, 720.0, maze_width, maze_height)?;
    let mut state = RaceState::new(settings, seed)?;
    std::fs::write(MAP_PATH, state.map_file().to_json())?;

    let mut bot_rng = Pcg32::seed_from_u64(seed ^ 0x00c0_ffee);
    let mut intents = [Intent::default(); 2];
    let mut last_pos = [state.actors[0].pos, state.actors[1].pos];

    while state.outcome.is_none() && state.ticks < MAX_RACE_TICKS {
        for (i, actor) in state.actors.iter().enumerate() {
            // Re-roll when wedged against a wall, plus occasional wandering
            if actor.pos == last_pos[i] || bot_rng.random_ratio(1, 30) {
                intents[i] = bot_intent(&mut bot_rng, actor.id);
            }
            last_pos[i] = actor.pos;
        }
        tick(
            &mut state,
            TickInput {
                p1: intents[0],
                p2: intents[1],
            },
        );
    }

    println!("{}", render_ascii(&state));
    match state.outcome {
        Some(outcome) => {
            println!(
                "seed {seed}: player {:?} wins in {:.1}s ({} ticks)",
                outcome.winner,
                outcome.elapsed_secs(),
                outcome.elapsed_ticks
            );
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as f64)
                .unwrap_or(0.0);
            let mut board = std::fs::read_to_string(LEADERBOARD_PATH)
                .ok()
                .and_then(|json| Leaderboard::from_json(&json).ok())
                .unwrap_or_default();
            match board.add(RaceRecord::from_outcome(&outcome, timestamp)) {
                Some(rank) => println!("leaderboard rank #{rank}"),
                None => println!("did not make the leaderboard"),
            }
            std::fs::write(LEADERBOARD_PATH, board.to_json())?;
        }
        None => println!("seed {seed}: no winner within {MAX_RACE_TICKS} ticks"),
    }
    Ok(())
}

/// Random direction biased toward the opposing half.
fn bot_intent(rng: &mut impl Rng, id: PlayerId) -> Intent {
    let toward_center = matches!(id, PlayerId::One);
    match rng.random_range(0u8..6) {
        0..=2 => Intent {
            right: toward_center,
            left: !toward_center,
            ..Default::default()
        },
        3 => Intent {
            left: toward_center,
            right: !toward_center,
            ..Default::default()
        },
        4 => Intent {
            up: true,
            ..Default::default()
        },
        _ => Intent {
            down: true,
            ..Default::default()
        },
    }
}

/// Cell-resolution snapshot of the race for the terminal.
fn render_ascii(state: &RaceState) -> String {
    let maze = state.grid.maze();
    let mut rows: Vec<Vec<char>> = maze
        .rows()
        .map(|row| {
            row.iter()
                .map(|&k| if k == CellKind::Wall { '#' } else { '.' })
                .collect()
        })
        .collect();

    for p in state.grid.power_ups.iter().filter(|p| p.active) {
        let (row, col) = state.grid.cell_at(p.rect.center());
        rows[row as usize][col as usize] = '*';
    }
    for (glyph, actor) in ['1', '2'].into_iter().zip(&state.actors) {
        let (row, col) = state.grid.cell_at(actor.rect().center());
        if row >= 0 && col >= 0 && (row as usize) < maze.height() && (col as usize) < maze.width() {
            rows[row as usize][col as usize] = glyph;
        }
    }

    rows.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
