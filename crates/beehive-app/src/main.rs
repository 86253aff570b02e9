use anyhow::{Context, Result, bail};
use beehive_core::{BeePosition, Colony, ColonyConfig, ColonyObserver, ColonySnapshot};
use clap::Parser;
use rand::{SeedableRng, rngs::SmallRng};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

mod layout;

use layout::{LayoutOptions, random_layout};

#[derive(Parser, Debug)]
#[command(
    name = "beehive",
    version,
    about = "Simulate worker bees foraging nectar from flowers into hive combs"
)]
struct Cli {
    /// Number of worker bees.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=6))]
    bees: u8,
    /// Number of flowers; defaults to the number of bees and may not exceed it.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=6))]
    flowers: Option<u8>,
    /// Simulation length in ticks (overrides the config file).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    ticks: Option<u32>,
    /// Seed for layout generation.
    #[arg(long, env = "BEEHIVE_SEED", default_value_t = 0xB33_5EED)]
    seed: u64,
    /// Upper bound on randomly placed trees.
    #[arg(long, default_value_t = 10)]
    max_trees: u32,
    /// Upper bound on randomly placed barriers.
    #[arg(long, default_value_t = 10)]
    max_barriers: u32,
    /// Send bee i to flower i before the first tick.
    #[arg(long)]
    preassign_flowers: bool,
    /// Print the final colony snapshot as JSON on stdout.
    #[arg(long)]
    json: bool,
    /// JSON file with `ColonyConfig` overrides.
    #[arg(long, env = "BEEHIVE_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(ticks) = cli.ticks {
        config.simulation_length = ticks;
    }
    config.preassign_flowers |= cli.preassign_flowers;
    let bees = usize::from(cli.bees);
    let flowers = cli.flowers.map_or(bees, usize::from);
    if flowers > bees {
        bail!("--flowers ({flowers}) may not exceed --bees ({bees})");
    }

    let mut rng = SmallRng::seed_from_u64(cli.seed);
    let options = LayoutOptions {
        bees,
        flowers,
        max_trees: cli.max_trees,
        max_barriers: cli.max_barriers,
    };
    let layout = random_layout(&config, &options, &mut rng).context("failed to place entities")?;
    let mut colony = Colony::with_observer(config, layout, Box::new(TracingObserver))
        .context("failed to build colony")?;

    info!(
        bees,
        flowers,
        seed = cli.seed,
        ticks = colony.config().simulation_length,
        steps_per_tick = colony.steps_per_tick(),
        "Starting beehive simulation"
    );

    let events = colony.run();
    let collections: usize = events.iter().map(|e| e.collections).sum();
    let deposits: usize = events.iter().map(|e| e.deposits).sum();
    let depletions: usize = events.iter().map(|e| e.depletions.len()).sum();
    let stalled = events.last().map_or(0, |e| e.stalled_deposits);

    match colony.history().last() {
        Some(summary) => info!(
            tick = summary.tick.0,
            collections,
            deposits,
            depletions,
            stored = summary.stored_nectar,
            carrying = summary.bees_carrying,
            active_flowers = summary.active_flowers,
            "Simulation finished",
        ),
        None => warn!("Simulation finished without recording any ticks"),
    }
    if stalled > 0 {
        warn!(stalled, "Bees still holding nectar with no comb space left");
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&colony.snapshot())
            .context("failed to encode snapshot")?;
        println!("{json}");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<ColonyConfig> {
    let Some(path) = path else {
        return Ok(ColonyConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), "loaded colony config");
    Ok(config)
}

/// Logs a one-line population summary after every tick.
struct TracingObserver;

impl ColonyObserver for TracingObserver {
    fn on_tick(&mut self, snapshot: &ColonySnapshot) {
        let in_world = snapshot
            .bees
            .iter()
            .filter(|bee| matches!(bee.position, BeePosition::World(_)))
            .count();
        let carrying = snapshot.bees.iter().filter(|bee| bee.carrying).count();
        let active_flowers = snapshot.flowers.iter().filter(|f| f.active).count();
        info!(
            tick = snapshot.tick.0,
            in_world,
            carrying,
            stored = snapshot.stored_nectar(),
            active_flowers,
            "tick"
        );
    }
}
