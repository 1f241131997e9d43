//! Pitching motion analysis from pose and ball detector output.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use pitch_kinematics::{
    analysis::{AnalysisRequest, PitchAnalyzer},
    ball::{BallDetectionResult, LogisticBallClassifier},
    config::{Config, EXAMPLE_CONFIG},
    loader::PoseDetectionResult,
    profile::{build_cohort_profile, Cohort, PitchRecord},
    scoring::InMemoryProfileRepository,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one pitch and print the report as JSON
    Analyze {
        /// Pose detection result (JSON)
        #[arg(short, long)]
        pose: PathBuf,

        /// Ball detection result (JSON)
        #[arg(short, long)]
        ball: Option<PathBuf>,

        /// Name of the pitcher being analyzed
        #[arg(long)]
        pitcher: String,

        /// Reference pitcher (defaults to the analyzed pitcher)
        #[arg(long)]
        benchmark: Option<String>,

        /// Profile store (YAML or JSON map of model name to profile)
        #[arg(long)]
        profiles: Option<PathBuf>,

        /// Ball quality classifier weights (YAML)
        #[arg(long)]
        classifier: Option<PathBuf>,
    },

    /// Build a reference profile from historical pitch records
    BuildProfile {
        /// Pitch records (JSON array)
        #[arg(short, long)]
        records: PathBuf,

        /// Pitcher to build the profile for
        #[arg(long)]
        pitcher: String,

        /// Restrict to one pitch type
        #[arg(long)]
        pitch_type: Option<String>,

        /// Profile store to insert into; created when missing
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write an example configuration file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "pitch-kinematics.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let config = load_config(args.config.as_deref());

    match args.command {
        Command::Analyze {
            pose,
            ball,
            pitcher,
            benchmark,
            profiles,
            classifier,
        } => {
            let repository = match profiles {
                Some(path) => InMemoryProfileRepository::from_file(&path)
                    .with_context(|| format!("Failed to load profiles from {}", path.display()))?,
                None => {
                    warn!("No profile store given; the pitch score will be 0");
                    InMemoryProfileRepository::new()
                }
            };

            let mut analyzer = PitchAnalyzer::new(config, Box::new(repository))?;
            if let Some(path) = classifier {
                let model = LogisticBallClassifier::from_file(&path)
                    .with_context(|| format!("Failed to load classifier from {}", path.display()))?;
                analyzer = analyzer.with_classifier(Box::new(model));
            }

            let pose = PoseDetectionResult::from_json_str(&read(&pose)?)?;
            let ball = ball
                .map(|path| -> Result<BallDetectionResult> { Ok(BallDetectionResult::from_json_str(&read(&path)?)?) })
                .transpose()?;

            let mut request = AnalysisRequest::new(pitcher);
            request.benchmark_pitcher = benchmark;

            let report = analyzer.analyze(&pose, ball.as_ref(), &request)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::BuildProfile {
            records,
            pitcher,
            pitch_type,
            output,
        } => {
            let records: Vec<PitchRecord> = serde_json::from_str(&read(&records)?)
                .with_context(|| format!("Failed to parse pitch records from {}", records.display()))?;
            let cohort = Cohort::new(pitcher, pitch_type);

            let Some(model) = build_cohort_profile(&cohort, &records) else {
                anyhow::bail!("Not enough data to build profile '{}'", cohort.model_name());
            };

            let mut repository = if output.exists() {
                InMemoryProfileRepository::from_file(&output)?
            } else {
                InMemoryProfileRepository::new()
            };
            if repository.insert(model.model_name.clone(), model.profile.clone()).is_some() {
                info!("Replaced existing profile '{}'", model.model_name);
            }
            repository.to_file(&output)?;

            info!(
                "Saved profile '{}' ({} features from {} records) to {}",
                model.model_name,
                model.profile.len(),
                model.source_feature_count,
                output.display()
            );
            println!("{}", serde_json::to_string_pretty(&model)?);
        }

        Command::InitConfig { output } => {
            std::fs::write(&output, EXAMPLE_CONFIG)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Wrote example configuration to {}", output.display());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };

    info!("Loading configuration from: {}", path.display());
    match Config::from_file(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Failed to load config file: {e}. Using defaults.");
            Config::default()
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
