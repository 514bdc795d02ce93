//! Cue Player CLI - inspect, analyze and simulate shows
use anyhow::Context;
use clap::{Parser, Subcommand};
use cue_cli::{
    config::PlayerConfig,
    inspect, peaks,
    show::Show,
    simulate::{self, SimulationOptions},
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cue")]
#[command(about = "Cue Player show tools", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CUE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the cues of a show file
    Inspect {
        /// Show file (JSON)
        show: PathBuf,
    },
    /// Decode an audio file and print its waveform peaks as JSON
    Peaks {
        /// Audio file
        file: PathBuf,
        /// Number of peaks (pixel columns)
        #[arg(short, long, default_value_t = 200)]
        width: u32,
    },
    /// Trigger a cue and print what happens on the simulated clock
    Simulate {
        /// Show file (JSON)
        show: PathBuf,
        /// Index of the cue to trigger
        #[arg(long)]
        cue: usize,
        /// How long to run (seconds)
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,
        /// Clock step (milliseconds)
        #[arg(long, default_value_t = 50)]
        step_ms: u64,
        /// Length of the simulated media (seconds)
        #[arg(long, default_value_t = 120.0)]
        media_secs: f64,
        /// Also log position and volume updates
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cue_cli=info,cue_playback=info,cue_waveform=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = PlayerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { show } => {
            let show = Show::load(&show, config.audio_folder.as_deref())?;
            print!("{}", inspect::render(&show));
        }
        Commands::Peaks { file, width } => {
            let report = peaks::compute(&file, width, config.waveform)?;
            let json = serde_json::to_string_pretty(&report).context("Failed to encode peaks")?;
            println!("{}", json);
        }
        Commands::Simulate {
            show,
            cue,
            seconds,
            step_ms,
            media_secs,
            verbose,
        } => {
            let show = Show::load(&show, config.audio_folder.as_deref())?;
            let options = SimulationOptions {
                cue_index: cue,
                seconds,
                step_ms,
                media_secs,
                verbose,
            };
            let log = simulate::run(&show, &config, options)?;
            print!("{}", simulate::render(&show, &log));
        }
    }

    Ok(())
}
