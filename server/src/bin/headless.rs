//! Headless table runner.
//!
//! Racks a table, charges a single shot, fires it from behind the cue ball
//! and runs until everything stops. Useful for checking physics changes
//! without a viewer.
//!
//! Usage: cargo run --bin headless -- [OPTIONS]
//!
//! Options:
//!   --charge-ticks N  Ticks to hold the trigger (default: 200)
//!   --aim-x X         Shot direction x (default: -1.0)
//!   --aim-z Z         Shot direction z (default: 0.0)
//!   --max-ticks N     Give up after this many ticks (default: 20000)

use billiards_shared::ball::CUE_BALL;
use billiards_shared::config::SimConfig;
use billiards_shared::session::Session;
use billiards_shared::shot::AimRay;
use billiards_shared::simulation::TickEvent;
use billiards_shared::vec3::{sub, try_normalize, vec3};

/// Camera placement relative to the cue ball
const CAMERA_BACK: f64 = 1.0;
const CAMERA_UP: f64 = 0.75;

struct Args {
    charge_ticks: u32,
    aim_x: f64,
    aim_z: f64,
    max_ticks: u64,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        charge_ticks: 200,
        aim_x: -1.0,
        aim_z: 0.0,
        max_ticks: 20_000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--charge-ticks" => {
                i += 1;
                parsed.charge_ticks = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(200);
            }
            "--aim-x" => {
                i += 1;
                parsed.aim_x = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(-1.0);
            }
            "--aim-z" => {
                i += 1;
                parsed.aim_z = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(0.0);
            }
            "--max-ticks" => {
                i += 1;
                parsed.max_ticks = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(20_000);
            }
            other => {
                eprintln!("Ignoring unknown argument {}", other);
            }
        }
        i += 1;
    }
    parsed
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = parse_args();
    let config = SimConfig::default();
    if let Err(e) = config.validate() {
        eprintln!("Invalid simulation configuration: {}", e);
        std::process::exit(1);
    }

    let Some(heading) = try_normalize(vec3(args.aim_x, 0.0, args.aim_z)) else {
        eprintln!("Aim direction must have a horizontal component");
        std::process::exit(1);
    };

    let mut session = Session::new(config);

    session.press_trigger();
    for _ in 0..args.charge_ticks {
        session.tick();
    }

    let Some(cue) = session.balls().get(CUE_BALL).map(|b| b.position) else {
        eprintln!("Table has no cue ball");
        std::process::exit(1);
    };
    let origin = vec3(
        cue.x - heading.x * CAMERA_BACK,
        cue.y + CAMERA_UP,
        cue.z - heading.z * CAMERA_BACK,
    );
    let charged = session.strength();
    let Some(shot) = session.release_trigger(AimRay::new(origin, sub(cue, origin))) else {
        eprintln!("No shot fired (strength {:.5})", charged);
        std::process::exit(1);
    };
    tracing::info!(
        "Shot fired at strength {:.5}, velocity ({:.5}, {:.5})",
        shot.strength,
        shot.velocity.x,
        shot.velocity.z
    );

    let start_tick = session.tick_count();
    let mut contacts = 0usize;
    let mut cushions = 0usize;
    while !session.at_rest() && session.tick_count() - start_tick < args.max_ticks {
        let report = session.tick();
        for event in &report.events {
            match event {
                TickEvent::Pocketed { ball } => {
                    tracing::info!("Ball {} pocketed on tick {}", ball, report.tick);
                }
                TickEvent::Contact { .. } => contacts += 1,
                TickEvent::Cushion { .. } => cushions += 1,
            }
        }
    }

    let elapsed = session.tick_count() - start_tick;
    if session.at_rest() {
        println!(
            "Table at rest after {} ticks ({:.1} s at {} Hz)",
            elapsed,
            elapsed as f64 / config.physics.tick_rate_hz as f64,
            config.physics.tick_rate_hz
        );
    } else {
        println!("Stopped after {} ticks with balls still moving", elapsed);
    }
    println!("Ball contacts: {}, cushion hits: {}", contacts, cushions);
    println!();
    println!("{:>4}  {:>8}  {:>8}  {}", "ball", "x", "z", "state");
    for (i, ball) in session.balls().iter().enumerate() {
        let state = if ball.active { "on table" } else { "pocketed" };
        println!(
            "{:>4}  {:>8.4}  {:>8.4}  {}",
            i, ball.position.x, ball.position.z, state
        );
    }
}
