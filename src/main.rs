//! ss2l_cutflow: A cutflow analysis for same-sign dileptons with b-jets
//!
//!
//! # Introduction (for the physicist)
//!
//! This program estimates how many events of a given process would be
//! selected by a search for new physics in final states with two leptons of
//! the same electric charge, b-jets, and missing transverse momentum, in the
//! style of the CMS SUS-12-017 analysis.
//!
//! The detector is not simulated. Instead, lepton identification and
//! isolation, b-tagging, triggering, and the MET and HT requirements are
//! given kinematics-dependent efficiencies, and each event rolls the dice
//! against them.
//!
//!
//! # Introduction (for the numerical guy)
//!
//! Each event is sent through an ordered sequence of cuts, some deterministic
//! and some stochastic. We count how many events reach each stage (the
//! "cutflow"), and the fraction of events which pass everything is a Monte
//! Carlo estimate of the selection efficiency.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The program is structured as follows:
//!
//! * read in the command line and the run configuration
//! * set up the signal region, efficiencies, random numbers and event source
//! * loop over events, pulled one at a time from the source,
//!     * sorting their particles into leptons and jets,
//!     * running them through the cuts, stopping at the first failure,
//!     * recording the last stage which they reached
//! * then display / store the cutflow and the efficiency.
//!
//! Signal and background selections only differ in a couple of places, which
//! a PipelineVariant parameter takes care of.

#![warn(missing_docs)]

mod config;
mod cutflow;
mod efficiency;
mod evclass;
mod evcut;
mod event;
mod evgen;
mod lhe;
mod momentum;
mod numeric;
mod output;
mod pipeline;
mod random;
mod region;
mod resfin;

use eyre::WrapErr;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Arguments, Configuration},
    lhe::LheReader,
    pipeline::{Analysis, RunPlan},
    random::RandomGenerator,
    region::SignalRegionTable,
};

use std::{env, time::Instant};

/// We'll use eyre's type-erased result type throughout the application
type Result<T> = eyre::Result<T>;

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    // Diagnostics go to stderr, results go to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ### CONFIGURATION READOUT ###

    let args = Arguments::parse(env::args().skip(1)).wrap_err("Bad command line")?;
    let cfg = Configuration::load(&args.run_config_path)
        .wrap_err("Failed to load the configuration")?;

    // ### SELECTION INITIALIZATION ###

    // Pick the signal region
    let regions = SignalRegionTable::same_sign_dilepton()?;

    // Seed the random number generator, once and for all
    let rng = match cfg.seed {
        Some(seed) => RandomGenerator::seeded(seed),
        None => RandomGenerator::from_wall_clock(),
    };
    tracing::info!(seed = rng.seed(), "Random number generator initialized");

    // Set up the analysis and the event source
    let mut analysis = Analysis::new(&regions, args.region_index, rng)?;
    let mut source = LheReader::open(&args.sample_path)?;
    let plan = RunPlan::new(&cfg, &source).wrap_err("Inconsistent run configuration")?;

    // Start the clock after configuration I/O
    let saved_time = Instant::now();

    // ### SELECTION EXECUTION ###

    let result = pipeline::run_cutflow(&mut source, &plan, &mut analysis)?;

    // ### RESULTS DISPLAY AND STORAGE ###

    // Measure how much time has elapsed
    let elapsed_time = saved_time.elapsed();

    // Send the results to the standard output and to disk and we're done
    output::dump_results(&result, &args.output_path, elapsed_time)
        .wrap_err("Failed to output the results")?;

    // ...and we're done
    Ok(())
}
