//! Plays an AI-only skirmish from a content directory and prints the outcome.
//!
//! Usage: `skirmish [DATA_DIR] [SEED]`. The directory needs the `human` and
//! `orc` races, the `fighter` and `warrior` classes and the `longsword`,
//! `falchion` and `chain_shirt` items; the bundled `data/skirmish` has them.
use anyhow::{Context, Result};
use tactics_content::DirectorySource;
use tactics_core::stats::paths;
use tactics_core::{AbilityScores, CharacterSpec, Faction, GameEvent, Position};
use tactics_runtime::{Session, logging};

const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/skirmish");
const MAX_TURNS: usize = 200;

fn hero(name: &str, x: i32) -> CharacterSpec {
    CharacterSpec::new(name, Faction::Player)
        .race("human")
        .class("fighter", 3)
        .abilities(AbilityScores::new(16, 13, 14, 10, 12, 8))
        .equip("longsword")
        .equip("chain_shirt")
        .at(Position::new(x, 2))
}

fn orc(name: &str, x: i32) -> CharacterSpec {
    CharacterSpec::new(name, Faction::Hostile)
        .race("orc")
        .class("warrior", 2)
        .equip("falchion")
        .at(Position::new(x, 9))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let data_dir = args.next().unwrap_or_else(|| DEFAULT_DATA_DIR.to_owned());
    let mut builder = Session::builder()
        .content(DirectorySource::new(&data_dir))
        .require_content()
        .character(hero("Valeros", 3))
        .character(hero("Kyra", 5))
        .character(orc("Grask", 2))
        .character(orc("Uthak", 6));
    if let Some(seed) = args.next() {
        builder = builder.seed(seed.parse().context("seed must be an integer")?);
    }

    let mut session = builder
        .build()
        .await
        .with_context(|| format!("failed to set up a skirmish from {data_dir}"))?;
    session.start_combat(&[])?;
    let turns = session.run_npc_turns(MAX_TURNS);

    let events = session.drain_events();
    let attacks = events
        .iter()
        .filter(|event| matches!(event, GameEvent::AttackResolved(_)))
        .count();
    println!(
        "seed {}: {} turns, {} rounds, {} attacks",
        session.seed(),
        turns,
        session.world().round(),
        attacks
    );
    for &id in session.roster() {
        let identity = session.world().entities.identity(id)?;
        println!(
            "  {:<8} {:<8} {:>3} hp",
            identity.name,
            identity.faction,
            session.query_stat(id, paths::CURRENT_HIT_POINTS)
        );
    }
    Ok(())
}
