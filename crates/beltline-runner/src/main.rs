use std::path::{Path, PathBuf};
use std::process::ExitCode;

use beltline_core::rng::SimRng;
use beltline_core::world::WorldState;
use beltline_runner::config::RunnerConfig;
use beltline_runner::layout::Layout;
use beltline_runner::persistence::SaveStore;
use beltline_runner::report::render_world;
use beltline_runner::{RunnerError, Scheduler};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "beltline", about = "Two-lane belt factory simulation")]
struct Cli {
    /// Runner config (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run in real time, saving periodically, until Ctrl-C or --ticks.
    Run {
        /// Starting layout (RON), applied only to a fresh world.
        #[arg(short, long)]
        layout: Option<PathBuf>,
        /// Stop after this many ticks.
        #[arg(short, long)]
        ticks: Option<u64>,
        /// Speed multiplier, overriding the config.
        #[arg(short, long)]
        speed: Option<f64>,
        /// Seed for a fresh world, overriding the config.
        #[arg(long)]
        seed: Option<u64>,
        /// Ignore and delete any existing save.
        #[arg(long)]
        fresh: bool,
    },
    /// Run a fixed number of ticks as fast as possible, without saving.
    Simulate {
        #[arg(short, long)]
        layout: Option<PathBuf>,
        #[arg(short, long, default_value_t = 600)]
        ticks: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Print the saved world.
    Inspect,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn apply_layout(world: &mut WorldState, path: Option<&Path>) -> Result<(), RunnerError> {
    let Some(path) = path else {
        return Ok(());
    };
    let layout = Layout::load(path)?;
    let outcome = layout.apply(world);
    info!(
        placed = outcome.placed.len(),
        rejected = outcome.rejected.len(),
        "layout applied"
    );
    Ok(())
}

async fn run(
    mut config: RunnerConfig,
    layout: Option<PathBuf>,
    ticks: Option<u64>,
    speed: Option<f64>,
    seed: Option<u64>,
    fresh: bool,
) -> Result<(), RunnerError> {
    if seed.is_some() {
        config.seed = seed;
    }
    let sim = config.sim.to_sim_config();
    let store = SaveStore::new(&config.save_path);
    if fresh {
        store.clear()?;
    }
    let saved = store.load();
    let mut world = WorldState::restore_or_fresh(saved.as_deref(), &sim, config.seed_or_clock());
    if world.ticks() == 0 && world.building_count() == 0 {
        apply_layout(&mut world, layout.as_deref())?;
    }

    let start_tick = world.ticks();
    let mut scheduler = Scheduler::new(world, &config, Some(store));
    if let Some(speed) = speed {
        scheduler.set_speed(speed).await?;
    }
    let mut tick_rx = scheduler.subscribe_ticks();
    scheduler.start().await;

    let until_done = async {
        match ticks {
            Some(n) => {
                let target = start_tick + n;
                let _ = tick_rx.wait_for(|&t| t >= target).await;
            }
            None => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        _ = until_done => info!("tick limit reached"),
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }

    let world = scheduler.shutdown().await?;
    print!("{}", render_world(&world));
    Ok(())
}

fn simulate(
    config: RunnerConfig,
    layout: Option<PathBuf>,
    ticks: u64,
    seed: u64,
) -> Result<(), RunnerError> {
    let mut world = WorldState::new(config.sim.to_sim_config(), SimRng::new(seed));
    apply_layout(&mut world, layout.as_deref())?;
    world.advance(ticks);
    print!("{}", render_world(&world));
    println!("hash {:016x}", world.state_hash());
    Ok(())
}

fn inspect(config: RunnerConfig) -> Result<(), RunnerError> {
    let store = SaveStore::new(&config.save_path);
    let Some(data) = store.load() else {
        println!("no save at {}", store.path().display());
        return Ok(());
    };
    match WorldState::deserialize(&data, &config.sim.to_sim_config()) {
        Ok(world) => print!("{}", render_world(&world)),
        Err(err) => println!("save at {} is unusable: {err}", store.path().display()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match RunnerConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Command::Run {
                layout,
                ticks,
                speed,
                seed,
                fresh,
            } => run(config, layout, ticks, speed, seed, fresh).await,
            Command::Simulate { layout, ticks, seed } => simulate(config, layout, ticks, seed),
            Command::Inspect => inspect(config),
        },
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "beltline failed");
            ExitCode::FAILURE
        }
    }
}
