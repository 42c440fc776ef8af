//! Fruit Merge headless runner
//!
//! Drops fruit at seeded random positions, runs the fixed-step loop and
//! prints the final score with a share link. The browser build uses
//! `web::WebGame` instead.
//!
//! Usage: `fruit-merge [seed] [seconds] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use fruit_merge::consts::SIM_DT;
    use fruit_merge::physics::World;
    use fruit_merge::sim::{Command, Session, TierTable};
    use fruit_merge::Settings;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed: u64 = args.first().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let seconds: f32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(60.0);
    let settings = match args.get(2) {
        Some(path) => match Settings::load_from_path(Path::new(path)) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Settings::load(),
    };

    log::info!("Fruit Merge (native) starting, seed {seed}, {seconds}s");

    let width = settings.arena_width;
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut session = Session::new(World::default(), TierTable::default(), settings);

    // One drop every half second
    let drop_every = (0.5 / SIM_DT).round() as u64;
    let total_ticks = (seconds / SIM_DT).round() as u64;
    let mut best_tier = 0;

    for tick in 0..total_ticks {
        if tick % drop_every == 0 {
            session.queue(Command::Drop {
                x: rng.random_range(0.0..width),
            });
        }
        session.step();

        for event in session.drain_events() {
            best_tier = best_tier.max(event.spawned.tier);
            log::info!(
                "t={:.2}s merged tier {} -> {} (+{}), score {}",
                tick as f32 * SIM_DT,
                event.from_tier,
                event.spawned.tier,
                event.credited,
                session.current_score()
            );
        }
    }

    println!("Score: {}", session.current_score());
    println!("Pieces on board: {}", session.piece_count());
    println!("Largest fruit tier: {best_tier}");
    match session.request_share_link("https://fruit-merge.example") {
        Ok(link) => println!("Share: {link}"),
        Err(err) => log::error!("No share link: {err}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
