use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dynbayes::constants::SURFACE_GRID_STEP;
use dynbayes::generative::constants::DEFAULT_SAMPLING_INTERVAL;
use dynbayes::{
    CoefficientTimeSeries, CoupledPhaseModel, CouplingEstimationPipeline, CouplingSummarizer,
    CouplingSummary, CouplingSurfaceReconstructor, InferenceConfig, PhaseOscillatorParams,
    PhasePair, WindowSpec,
};

// --- CLI Arguments ---
#[derive(Parser, Debug)]
#[command(version, about = "Dynamical Bayesian inference of phase coupling", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML configuration (defaults are used if it does not exist)
    #[arg(short, long, default_value = "dynbayes.toml", global = true)]
    config: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a noisy coupled phase pair
    Simulate {
        #[arg(long, default_value_t = 10_000)]
        samples: usize,

        /// Sampling interval in seconds
        #[arg(long, default_value_t = DEFAULT_SAMPLING_INTERVAL)]
        sampling_interval: f64,

        /// Natural frequency of oscillator 1 (rad/s)
        #[arg(long, default_value_t = 7.0)]
        omega1: f64,

        /// Natural frequency of oscillator 2 (rad/s)
        #[arg(long, default_value_t = 11.0)]
        omega2: f64,

        /// Coupling from oscillator 2 onto oscillator 1
        #[arg(long, default_value_t = 0.0)]
        coupling12: f64,

        /// Coupling from oscillator 1 onto oscillator 2
        #[arg(long, default_value_t = 0.0)]
        coupling21: f64,

        /// Noise intensity D, shared by both oscillators
        #[arg(long, default_value_t = 0.01)]
        noise: f64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Estimate the coupling time series of a phase pair
    Analyze {
        /// Phase JSON: {"phase1": [...], "phase2": [...], "sampling_interval": h}
        #[arg(short, long)]
        input: PathBuf,

        /// Override the configured window length with a duration in seconds
        #[arg(long)]
        window_seconds: Option<f64>,
    },
    /// Reconstruct the coupling surface of one window
    Surface {
        #[arg(short, long)]
        input: PathBuf,

        /// Window index
        #[arg(short, long, default_value_t = 0)]
        window: usize,

        /// Grid spacing in radians
        #[arg(long, default_value_t = SURFACE_GRID_STEP)]
        step: f64,

        /// Override the configured window length with a duration in seconds
        #[arg(long)]
        window_seconds: Option<f64>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logging goes to stderr so stdout stays clean JSON
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config = InferenceConfig::load(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;

    match args.command {
        Commands::Simulate {
            samples,
            sampling_interval,
            omega1,
            omega2,
            coupling12,
            coupling21,
            noise,
            seed,
            output,
        } => {
            let model = CoupledPhaseModel::new(
                PhaseOscillatorParams::new(omega1, coupling12, noise),
                PhaseOscillatorParams::new(omega2, coupling21, noise),
            );
            let pair = model.simulate(samples, sampling_interval, seed)?;
            let body = serde_json::to_string(&pair)?;
            match output {
                Some(path) => {
                    fs::write(&path, body)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), samples, "wrote simulated phases");
                }
                None => println!("{}", body),
            }
        }
        Commands::Analyze {
            input,
            window_seconds,
        } => {
            let pair = read_phases(&input)?;
            let series = estimate(&config, &pair, window_seconds)?;
            let summarizer = CouplingSummarizer::new(series.harmonic_order())?;

            // A window with no coupling at all has no directionality; report it as null
            let summaries: Vec<Option<CouplingSummary>> =
                match summarizer.summarize_series(&series) {
                    Ok(all) => all.into_iter().map(Some).collect(),
                    Err(_) => series
                        .iter()
                        .map(|w| summarizer.summarize(&w.coefficients).ok())
                        .collect(),
                };

            let output = json!({
                "series": series,
                "summaries": summaries,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Surface {
            input,
            window,
            step,
            window_seconds,
        } => {
            let pair = read_phases(&input)?;
            let series = estimate(&config, &pair, window_seconds)?;

            let Some(selected) = series.get(window) else {
                bail!(
                    "window {} out of range, run produced {} windows",
                    window,
                    series.len()
                );
            };
            let surface = CouplingSurfaceReconstructor::with_step(series.harmonic_order(), step)?
                .reconstruct(&selected.coefficients)?;

            let output = json!({
                "window": window,
                "center_time": selected.center_time,
                "surface": surface,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn read_phases(path: &Path) -> anyhow::Result<PhasePair> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let pair: PhasePair = serde_json::from_str(&content)
        .with_context(|| format!("invalid phase JSON in {}", path.display()))?;
    pair.validate()?;
    info!(
        samples = pair.len(),
        duration = pair.duration(),
        "loaded phases from {}",
        path.display()
    );
    Ok(pair)
}

fn estimate(
    config: &InferenceConfig,
    pair: &PhasePair,
    window_seconds: Option<f64>,
) -> anyhow::Result<CoefficientTimeSeries> {
    let mut spec = config.window.clone();
    if let Some(seconds) = window_seconds {
        let from_seconds = WindowSpec::with_window_seconds(seconds, pair.sampling_interval)?;
        spec.window_length = from_seconds.window_length;
    }
    let pipeline = CouplingEstimationPipeline::with_solver(spec, config.solver.build())?;
    Ok(pipeline.run(pair)?)
}
