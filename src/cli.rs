use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::MarketParameters;
use crate::simulation::{MeshSnapshot, Simulation};

#[derive(Parser)]
#[command(name = "cre-mesh")]
#[command(version)]
#[command(about = "Simulated CRE financing agent mesh", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration directory
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the settlement loop and HTTP API (default)
    Serve {
        /// Override the configured HTTP port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run settlement ticks in-process and print the final state as JSON
    Simulate {
        /// Number of ticks to run
        #[arg(short, long, default_value = "10")]
        ticks: u32,
        /// Shock occupancy before the first tick (e.g. 0.3)
        #[arg(long)]
        occupancy: Option<Decimal>,
        /// Shock the interest rate before the first tick (e.g. 0.08)
        #[arg(long)]
        interest_rate: Option<Decimal>,
    },
}

/// Run `ticks` settlement ticks back to back, without sleeping.
///
/// When either shock is given the market is updated first, the other field
/// keeping its configured default. Failing ticks are logged and skipped.
pub fn run_simulation(
    config: &AppConfig,
    ticks: u32,
    occupancy: Option<Decimal>,
    interest_rate: Option<Decimal>,
) -> MeshSnapshot {
    let mut sim = Simulation::new(config);

    if occupancy.is_some() || interest_rate.is_some() {
        let defaults = config.defaults.market();
        sim.update_market(MarketParameters::new(
            occupancy.unwrap_or(defaults.occupancy),
            defaults.rent_price,
            interest_rate.unwrap_or(defaults.interest_rate),
        ));
    }

    for tick in 1..=ticks {
        if let Err(e) = sim.settle() {
            warn!(tick, error = %e, "Settlement tick failed");
        }
    }

    sim.snapshot()
}
