//! wayfarer-sim: drives a navigator across a charted tile world.
//!
//! The map, transport table and account profile default to the demo assets
//! bundled with the binary. Logging follows `RUST_LOG`.

mod world;

use std::sync::Arc;

use anyhow::{Context as _, bail};
use clap::Parser;
use log::info;
use tracing_subscriber::EnvFilter;
use wayfarer_core::{Chart, Position};
use wayfarer_travel::{NavConfig, Navigator, TickOutcome, TransportTable, WorldState};

use world::{Outbox, Profile, SimWorld};

const DEMO_CHART: &str = include_str!("../assets/demo.chart");
const DEMO_TRANSPORTS: &str = include_str!("../assets/transports.json");
const DEMO_PROFILE: &str = include_str!("../assets/profile.json");

#[derive(Parser, Debug)]
#[command(name = "wayfarer-sim", version, about = "Walk and ride a simulated agent across a chart")]
struct Args {
    /// Chart file; chart marks `S` and `G` give the default start and goals.
    #[arg(long, value_name = "PATH")]
    map: Option<String>,

    /// Transport table (JSON).
    #[arg(long, value_name = "PATH")]
    transports: Option<String>,

    /// Navigation tuning (JSON).
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Account profile answering requirement checks (JSON).
    #[arg(long, value_name = "PATH")]
    profile: Option<String>,

    /// Start position as `x,y,plane`.
    #[arg(long, value_parser = parse_position)]
    from: Option<Position>,

    /// Goal position as `x,y,plane`. Repeat to accept whichever is closest.
    #[arg(long, value_parser = parse_position)]
    to: Vec<Position>,

    /// Give up after this many ticks.
    #[arg(long, default_value_t = 500)]
    ticks: u32,

    /// Cancel the journey at this tick.
    #[arg(long, value_name = "TICK")]
    cancel_at: Option<u32>,

    /// Seed for walk lookahead, overriding the config.
    #[arg(long)]
    seed: Option<u64>,

    /// Drop an obstacle during the run, as `tick@x,y,plane`. Repeatable.
    #[arg(long = "block", value_name = "TICK@X,Y,PLANE", value_parser = parse_blockade)]
    blocks: Vec<Blockade>,

    /// Print the transport graph and exit.
    #[arg(long)]
    list_edges: bool,
}

#[derive(Debug, Clone, Copy)]
struct Blockade {
    tick: u32,
    at: Position,
}

fn parse_position(s: &str) -> Result<Position, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, plane] = parts.as_slice() else {
        return Err(format!("expected x,y,plane, got \u{201c}{s}\u{201d}"));
    };
    let x = x.parse().map_err(|e| format!("x: {e}"))?;
    let y = y.parse().map_err(|e| format!("y: {e}"))?;
    let plane = plane.parse().map_err(|e| format!("plane: {e}"))?;
    Ok(Position::new(x, y, plane))
}

fn parse_blockade(s: &str) -> Result<Blockade, String> {
    let (tick, at) = s
        .split_once('@')
        .ok_or_else(|| format!("expected tick@x,y,plane, got \u{201c}{s}\u{201d}"))?;
    let tick = tick.trim().parse().map_err(|e| format!("tick: {e}"))?;
    Ok(Blockade {
        tick,
        at: parse_position(at)?,
    })
}

fn read_or(path: Option<&str>, fallback: &str) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}")),
        None => Ok(fallback.to_owned()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let table = match &args.transports {
        Some(path) => TransportTable::load(path)?,
        None => TransportTable::from_json(DEMO_TRANSPORTS).context("bundled transport table")?,
    };
    let graph = Arc::new(table.build());
    if args.list_edges {
        for edge in graph.edges() {
            let from = edge.origin.map_or_else(|| "anywhere".to_owned(), |p| p.to_string());
            println!(
                "{edge}: {from} -> {} cost {} [{}]",
                edge.destination, edge.cost, edge.requirements.len()
            );
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => NavConfig::load(path)?,
        None => NavConfig::default(),
    };
    if args.seed.is_some() {
        config.executor.seed = args.seed;
    }
    let profile = match &args.profile {
        Some(path) => Profile::load(path)?,
        None => Profile::from_json(DEMO_PROFILE)?,
    };

    let chart = Chart::new(&read_or(args.map.as_deref(), DEMO_CHART)?)?;
    let origin = Position::new(0, 0, 0);
    let map = chart.snapshot(origin)?;
    let from = match args.from {
        Some(p) => p,
        None => chart.mark('S', origin).context("no --from and no S on the chart")?,
    };
    let goals = if args.to.is_empty() {
        chart.marks('G', origin)
    } else {
        args.to.clone()
    };
    if goals.is_empty() {
        bail!("no --to and no G on the chart");
    }
    let to = goals
        .iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(" or ");
    info!("{} transport edges, map {} over {} planes", graph.len(), map.area(), map.planes());

    let mut world = SimWorld::new(map, Arc::clone(&graph), profile, from);
    let mut nav = Navigator::new(graph, config);
    nav.travel_to_any(&world, &goals)
        .with_context(|| format!("planning {from} -> {to}"))?;

    for tick in 0..args.ticks {
        if args.cancel_at == Some(tick) {
            nav.cancel();
        }
        for b in args.blocks.iter().filter(|b| b.tick == tick) {
            if world.block(b.at) {
                info!("tick {tick}: obstacle dropped at {}", b.at);
            }
        }
        let mut outbox = Outbox::default();
        let outcome = nav.tick(&world, &mut outbox);
        if !outbox.is_empty() {
            world.apply(outbox);
        }
        world.step();
        match outcome {
            Some(TickOutcome::Arrived) => {
                println!("arrived at {} after {} ticks", world.position(), tick + 1);
                return Ok(());
            }
            Some(TickOutcome::Cancelled) => {
                println!("cancelled at {} on tick {tick}", world.position());
                return Ok(());
            }
            Some(TickOutcome::NoPathFound) => {
                bail!("no path from {} to {to}", world.position())
            }
            Some(TickOutcome::Running | TickOutcome::Replanned) => {}
            None => bail!("navigator went idle before reaching {to}"),
        }
    }
    bail!("gave up after {} ticks at {}", args.ticks, world.position())
}
