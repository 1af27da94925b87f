use grid_war::game::Game;
use grid_war::game_config::GameConfig;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Args {
    games: u64,
    opponents: usize,
    max_turns: u32,
}

// Parse command line arguments (format: simulate_games <games> <opponents> <max_turns>)
lazy_static::lazy_static! {
    static ref ARGS: Args = {
        let args: Vec<String> = std::env::args().collect();

        let games = args.get(1).and_then(|a| a.parse().ok()).unwrap_or(200);
        let opponents = args.get(2).and_then(|a| a.parse().ok()).unwrap_or(5);
        let max_turns = args.get(3).and_then(|a| a.parse().ok()).unwrap_or(2_000);

        Args {
            games,
            opponents,
            max_turns,
        }
    };
}

#[derive(Default)]
struct Tally {
    wins: BTreeMap<String, u64>,
    unfinished: u64,
    failed: u64,
    total_turns: u64,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Tally {
        for (name, wins) in other.wins {
            *self.wins.entry(name).or_insert(0) += wins;
        }
        self.unfinished += other.unfinished;
        self.failed += other.failed;
        self.total_turns += other.total_turns;
        self
    }
}

fn play(seed: u64) -> Tally {
    let mut tally = Tally::default();
    let config = GameConfig::with_opponents(ARGS.opponents).with_seed(seed);
    let mut game = match Game::new(config) {
        Ok(game) => game,
        Err(e) => {
            warn!(seed, error = %e, "could not set up game");
            tally.failed = 1;
            return tally;
        }
    };

    while !game.is_game_over() && game.turn() < ARGS.max_turns {
        let player = game.player_id();
        let planned = if game.country(player).map_or(false, |c| c.is_active()) {
            game.plan_move_for(player)
        } else {
            None
        };
        let advanced = match planned {
            Some(planned) => game.attempt_player_move(planned.from, planned.to).accepted,
            None => game.pass_turn().is_ok(),
        };
        if !advanced {
            break;
        }
    }

    tally.total_turns = u64::from(game.turn());
    match game.winner().and_then(|id| game.country(id)) {
        Some(winner) => {
            tally.wins.insert(winner.name.clone(), 1);
        }
        None => tally.unfinished = 1,
    }
    tally
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let start_time = Instant::now();
    info!(games = ARGS.games, opponents = ARGS.opponents, "simulating");

    let tally = (0..ARGS.games)
        .into_par_iter()
        .map(play)
        .reduce(Tally::default, Tally::merge);

    let finished = ARGS.games - tally.unfinished - tally.failed;
    println!(
        "Played {} games with {} opponents in {:?}",
        ARGS.games,
        ARGS.opponents,
        start_time.elapsed()
    );
    println!(
        "Finished: {}  unfinished after {} turns: {}  failed to start: {}",
        finished, ARGS.max_turns, tally.unfinished, tally.failed
    );
    if ARGS.games > tally.failed {
        println!(
            "Average turns: {:.1}",
            tally.total_turns as f64 / (ARGS.games - tally.failed) as f64
        );
    }
    for (name, wins) in &tally.wins {
        println!(
            "{:>10}: {:>6} wins ({:.1}%)",
            name,
            wins,
            *wins as f64 * 100.0 / ARGS.games as f64
        );
    }
}
