use clap::Parser;
use shared::constants::TICKS_PER_SECOND;
use sim::init::{self, SimSettings};
use sim::scenario::load_scenario;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Headless ship buoyancy simulation", long_about = None)]
struct Args {
    /// Scenario file (RON). The built-in scenario is used when omitted.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Stop after this many fixed steps
    #[arg(short, long)]
    ticks: Option<u64>,

    #[arg(long, default_value_t = TICKS_PER_SECOND as f64)]
    tick_rate: f64,

    /// Log ship state every N ticks (0 disables it)
    #[arg(short, long, default_value_t = TICKS_PER_SECOND)]
    log_every: u64,
}

fn main() {
    let args = Args::parse();

    if !args.tick_rate.is_finite() || args.tick_rate <= 0.0 || args.tick_rate > 1000.0 {
        eprintln!("Error: tick_rate must be in (0, 1000] Hz.");
        eprintln!("Got: {}", args.tick_rate);
        std::process::exit(1);
    }

    let (scenario, base_dir) = match load_scenario(args.scenario.as_deref()) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("Failed to load scenario: {err}");
            std::process::exit(1);
        }
    };

    init::init(
        scenario,
        &base_dir,
        SimSettings {
            tick_rate: args.tick_rate,
            max_ticks: args.ticks,
            log_every: args.log_every,
        },
    );
}
