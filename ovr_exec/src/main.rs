//! Override pipeline replay executable entry point.
//!
//! # Architecture
//!
//! The replay drives the override pipeline from a recorded telemetry log, one recorded cycle at a
//! time:
//!
//!     - Initialise the session, logging and parameters
//!     - Load the replay
//!     - For each recorded cycle:
//!         - Set the simulated clock to the cycle time
//!         - Telecommand processing
//!         - Override pipeline processing
//!         - Archive the pipeline output
//!
//! Events raised by the controllers go to the log, and the per-cycle output is archived in the
//! session's `arch/pipeline/output.csv`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use structopt::StructOpt;

// Internal
use ovr_lib::{
    ctrl::{CtrlContext, OverrideCtrl},
    events::LogSink,
    pipeline::{self, OvrPipeline, PipelineRecord},
    replay::Replay,
    stuck_ctrl::StuckPhase,
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::Session,
    time::SimClock,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parameter file used if none is given on the command line, relative to the params directory.
const DEFAULT_PARAMS_FILE: &str = "override.toml";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Replay recorded telemetry through the safety override pipeline.
#[derive(Debug, StructOpt)]
#[structopt(name = "ovr_exec")]
struct Opts {
    /// Pipeline parameter file. Defaults to `params/override.toml` under the software root.
    #[structopt(long, parse(from_os_str))]
    params: Option<PathBuf>,

    /// Directory sessions are created in, relative to the software root.
    #[structopt(long, default_value = "sessions")]
    sessions_dir: String,

    /// Minimum level of log messages, one of info, debug or trace.
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,

    /// Telemetry replay (JSON lines).
    #[structopt(parse(from_os_str))]
    telemetry: PathBuf,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("ovr_exec", &opts.sessions_dir)
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Safety Override Replay Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let params: pipeline::Params = match opts.params {
        Some(ref path) => util::params::load_path(path)
            .wrap_err_with(|| format!("Could not load pipeline params from {:?}", path))?,
        None => util::params::load(DEFAULT_PARAMS_FILE)
            .wrap_err("Could not load pipeline params")?,
    };

    info!("Pipeline parameters loaded");

    // ---- LOAD REPLAY ----

    let replay = Replay::load(&opts.telemetry)
        .wrap_err_with(|| format!("Failed to load the replay from {:?}", opts.telemetry))?;

    info!(
        "Loaded replay lasts {:.02} s and contains {} ticks and {} TCs\n",
        replay.duration_s(),
        replay.num_ticks(),
        replay.num_tcs()
    );

    // ---- INITIALISE PIPELINE ----

    let start_s = replay.ticks().first().map(|t| t.time_s).unwrap_or(0.0);
    let clock = Arc::new(SimClock::new(start_s));

    let mut pipeline = OvrPipeline::init(
        params,
        CtrlContext::new(clock.clone(), Arc::new(LogSink)),
    )
    .wrap_err("Failed to initialise the override pipeline")?;

    let mut archiver = Archiver::from_path(&session, "pipeline/output.csv")
        .wrap_err("Failed to initialise the pipeline archive")?;

    info!("Initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining replay\n");

    let mut num_overridden = 0usize;
    let mut num_recovering = 0usize;

    for tick in replay.ticks() {
        clock.set(tick.time_s);

        // ---- TELECOMMAND PROCESSING ----

        for tc in tick.tcs.iter() {
            pipeline.exec_tc(tc);
        }

        // ---- PIPELINE PROCESSING ----

        let (cmd, report) = pipeline.proc(tick.cmd, &tick.telemetry);

        if cmd != report.cmd_in.clamped() {
            num_overridden += 1;
        }
        if let Some(StuckPhase::Recovering) = report.stuck.map(|s| s.phase) {
            num_recovering += 1;
        }

        // ---- ARCHIVING ----

        archiver
            .serialise(PipelineRecord::new(tick.time_s, tick.telemetry.mode, &report))
            .wrap_err("Failed to archive the pipeline output")?;
    }

    info!(
        "Replay complete: {} of {} ticks overridden, {} ticks in stuck recovery",
        num_overridden,
        replay.num_ticks(),
        num_recovering
    );
    info!("End of execution");

    Ok(())
}
