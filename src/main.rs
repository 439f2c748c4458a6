//! Ridge Runner Core Demo
//!
//! Builds a small level in code, runs a scripted play session, then
//! replays it and verifies the final state hashes match.

use anyhow::Context;
use tracing::{info, Level as LogLevel};
use tracing_subscriber::FmtSubscriber;

use ridge_runner::core::fixed::to_fixed;
use ridge_runner::core::rect::FixedRect;
use ridge_runner::core::vec2::FixedVec2;
use ridge_runner::game::boxes::{BoxContent, BoxData, BoxKind, SpinState};
use ridge_runner::game::events::GameEventData;
use ridge_runner::game::follower::{EnemyData, Facing, PlatformData};
use ridge_runner::game::level::Level;
use ridge_runner::game::path::{Path, PathMode};
use ridge_runner::game::player::PlayerData;
use ridge_runner::game::sprite::{ArrayKind, SpriteBase, SpriteKind};
use ridge_runner::{InputFrame, SpriteId, TICK_RATE, VERSION};

const DEMO_TICKS: u32 = 1800;
const DEMO_SEED: u64 = 12345;

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LogLevel::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Ridge Runner Core v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let first = run_session(true);
    let second = run_session(false);
    if first == second {
        info!("Replay verified: state hashes match");
        Ok(())
    } else {
        anyhow::bail!("replay diverged: state hashes differ");
    }
}

/// Run the scripted demo session and return the final state hash.
fn run_session(verbose: bool) -> [u8; 32] {
    let mut level = demo_level();
    if verbose {
        info!("RNG Seed: {}", DEMO_SEED);
        info!("Sprites: {}", level.sprites.len());
        info!("Running {} ticks...", DEMO_TICKS);
    }

    let mut total_events = 0;
    for t in 0..DEMO_TICKS {
        let result = level.update(scripted_input(t));
        total_events += result.events.len();

        if verbose {
            for event in &result.events {
                match &event.data {
                    GameEventData::BoxActivated { sprite_id, content } => {
                        info!("Box {} activated (content: {:?})", sprite_id, content);
                    }
                    GameEventData::EnemyKilled { sprite_id, .. } => {
                        info!("Enemy {} killed", sprite_id);
                    }
                    GameEventData::BallExploded { sprite_id, element, .. } => {
                        info!("Ball {} exploded ({:?})", sprite_id, element);
                    }
                    GameEventData::PlayerHurt { sprite_id } => {
                        info!("Player {} hurt", sprite_id);
                    }
                    GameEventData::TextShown { text } => {
                        info!("Text box: {}", text);
                    }
                    _ => {}
                }
            }
            if t % 600 == 599 {
                info!(
                    "Tick {}: {} sprites, {} events so far",
                    t,
                    level.sprites.len(),
                    total_events
                );
            }
        }
    }

    let hash = level.compute_hash();
    if verbose {
        let hex: String = hash.iter().map(|b| format!("{b:02x}")).collect();
        info!("Final State Hash: {}", hex);
        info!("Total Events: {}", total_events);
    }
    hash
}

/// A fixed input script: run right, hop periodically, throw a ball
/// once a second.
fn scripted_input(tick: u32) -> InputFrame {
    InputFrame {
        move_x: if (tick / 300) % 2 == 0 { 1 } else { -1 },
        jump: tick % 90 == 0,
        shoot: tick % 60 == 30,
    }
}

/// Build the demo level: a floor, a couple of boxes, a patrolling
/// enemy and a moving platform.
fn demo_level() -> Level {
    let bounds = FixedRect::new(
        FixedVec2::ZERO,
        FixedVec2::new(to_fixed(120.0), to_fixed(30.0)),
    );
    let mut level = Level::new(bounds, DEMO_SEED);
    level.info.name = "Demo Ridge".to_string();

    // Floor
    level.sprites.add_terrain(
        FixedVec2::new(0, to_fixed(20.0)),
        FixedVec2::new(to_fixed(120.0), to_fixed(2.0)),
        ArrayKind::Massive,
        "gfx/ground.png",
    );
    // A wall at each end keeps the script inside the level
    level.sprites.add_terrain(
        FixedVec2::new(0, 0),
        FixedVec2::new(to_fixed(1.0), to_fixed(20.0)),
        ArrayKind::Massive,
        "gfx/wall.png",
    );
    level.sprites.add_terrain(
        FixedVec2::new(to_fixed(119.0), 0),
        FixedVec2::new(to_fixed(1.0), to_fixed(20.0)),
        ArrayKind::Massive,
        "gfx/wall.png",
    );

    // Boxes above head height
    add_box(
        &mut level,
        12.0,
        BoxKind::Bonus {
            content: BoxContent::Random,
        },
    );
    add_box(&mut level, 16.0, BoxKind::Spin(SpinState::Idle));
    add_box(
        &mut level,
        20.0,
        BoxKind::Text {
            text: "Welcome to the ridge!".to_string(),
        },
    );

    // Patrolling enemy
    let enemy = level.sprites.alloc_id();
    let mut base = SpriteBase::new(
        enemy,
        FixedVec2::new(to_fixed(30.0), to_fixed(19.0)),
        FixedVec2::new(to_fixed(1.0), to_fixed(1.0)),
    );
    base.array = ArrayKind::Enemy;
    base.image = "gfx/crawler.png".to_string();
    level
        .sprites
        .add(base, SpriteKind::Enemy(EnemyData::walker(to_fixed(1.5), Facing::Left)));

    // Moving platform on a rewind path
    let mut rail = Path::new(
        "rail",
        FixedVec2::new(to_fixed(40.0), to_fixed(14.0)),
        PathMode::Rewind,
    );
    rail.add_segment(FixedVec2::ZERO, FixedVec2::new(to_fixed(15.0), 0));
    rail.add_segment(
        FixedVec2::new(to_fixed(15.0), 0),
        FixedVec2::new(to_fixed(15.0), to_fixed(4.0)),
    );
    level.add_path(rail);
    let platform = level.sprites.alloc_id();
    let mut base = SpriteBase::new(
        platform,
        FixedVec2::new(to_fixed(40.0), to_fixed(14.0)),
        FixedVec2::new(to_fixed(3.0), to_fixed(0.5)),
    );
    base.array = ArrayKind::Massive;
    base.image = "gfx/platform.png".to_string();
    level.sprites.add(
        base,
        SpriteKind::Platform(PlatformData::new("rail", to_fixed(2.0))),
    );

    // The player
    let player = level.sprites.alloc_id();
    let mut base = SpriteBase::new(
        player,
        FixedVec2::new(to_fixed(5.0), to_fixed(17.0)),
        FixedVec2::new(to_fixed(0.9), to_fixed(1.8)),
    );
    base.array = ArrayKind::Player;
    base.image = "gfx/player.png".to_string();
    let player = level.sprites.add(base, SpriteKind::Player(PlayerData::new()));
    level.context.active_player = Some(player);

    level
}

fn add_box(level: &mut Level, x: f64, kind: BoxKind) -> SpriteId {
    let id = level.sprites.alloc_id();
    let mut base = SpriteBase::new(
        id,
        FixedVec2::new(to_fixed(x), to_fixed(15.0)),
        FixedVec2::new(to_fixed(1.0), to_fixed(1.0)),
    );
    base.array = ArrayKind::Active;
    base.image = "gfx/box.png".to_string();
    level
        .sprites
        .add(base, SpriteKind::Box(BoxData::new(kind)))
}
