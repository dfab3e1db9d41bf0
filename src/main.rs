//! Growgame entry point
//!
//! Natively this runs every game in idle mode against a save directory and
//! prints the resulting leaderboards, stats and achievements. On the web the
//! same idle run logs to the browser console using LocalStorage.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;

    use growgame::Hub;
    use growgame::demo;
    use growgame::platform::{LocalStore, now_ms};

    #[wasm_bindgen(start)]
    pub fn wasm_main() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }
        log::info!("Growgame starting...");

        let now = now_ms();
        let hub = Hub::new(Rc::new(LocalStore::new()), now);
        let seed = now as u64;
        log::info!("Idle run with seed: {}", seed);

        for report in demo::run_all(&hub, seed, now) {
            for a in &report.unlocked {
                log::info!("{} {} - {}", a.icon, a.title, a.description);
            }
        }
        let progress = hub.achievements.progress();
        log::info!(
            "{} games played, {}/{} achievements",
            hub.stats.snapshot().total_games_played,
            progress.unlocked,
            progress.total
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::rc::Rc;

    use growgame::leaderboard::format_date;
    use growgame::platform::{FileStore, KeyValueStore, MemoryStore, now_ms};
    use growgame::{GameId, Hub, demo};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Growgame (native) starting...");

    let mut args = std::env::args().skip(1);
    let save_dir = args.next().unwrap_or_else(|| "growgame-save".to_string());
    let now = now_ms();
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(now as u64);

    let store: Rc<dyn KeyValueStore> = match FileStore::open(&save_dir) {
        Ok(store) => Rc::new(store),
        Err(e) => {
            log::error!("Cannot use save directory {save_dir}: {e}; progress will not persist");
            Rc::new(MemoryStore::new())
        }
    };
    let hub = Hub::new(store, now);
    log::info!("Idle run with seed: {}", seed);

    let reports = demo::run_all(&hub, seed, now);

    println!("\nSessions");
    for report in &reports {
        let game = report.outcome.game;
        let result = match (report.outcome.won, report.outcome.draw) {
            (_, true) => "draw".to_string(),
            (Some(true), _) => "won".to_string(),
            (Some(false), _) => "lost".to_string(),
            _ => match (report.outcome.score, report.outcome.moves) {
                (_, Some(moves)) => format!("{moves} moves"),
                (Some(score), _) => format!("{score} points"),
                _ => String::new(),
            },
        };
        let rank = report
            .placement
            .and_then(|p| p.rank)
            .map(|r| format!(" (rank #{r})"))
            .unwrap_or_default();
        println!("  {} {:<12} {}{}", game.emoji(), game.title(), result, rank);
        for a in &report.unlocked {
            println!("      {} unlocked: {} - {}", a.icon, a.title, a.description);
        }
    }

    println!("\nLeaderboards");
    let now = now_ms();
    for game in GameId::ALL {
        let entries = hub.leaderboards.entries(game);
        if entries.is_empty() {
            continue;
        }
        println!("  {} {}", game.emoji(), game.title());
        for (i, entry) in entries.iter().take(3).enumerate() {
            let detail = entry
                .moves
                .map(|m| format!("{m} moves"))
                .unwrap_or_else(|| entry.score.to_string());
            println!("    {}. {:<10} {}", i + 1, detail, format_date(entry.date, now));
        }
    }

    let stats = hub.stats.snapshot();
    let progress = hub.achievements.progress();
    println!(
        "\n{} games played, {} tried, {}s total playtime",
        stats.total_games_played,
        stats.games_tried(),
        stats.total_playtime_seconds
    );
    println!(
        "{}/{} achievements ({}%)",
        progress.unlocked, progress.total, progress.percentage
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
