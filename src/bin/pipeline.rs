//! Offline pipeline: synthesize the dataset, train the models, try them out.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use valorant_recommender::{
    ml::ForestParams,
    models::{AimType, MapName, PlayerProfile, Playstyle, Role},
    services::{
        dataset::{self, DatasetGenerator, DEFAULT_ROWS},
        train_and_save, ArtifactStore, Predictor, QualityGate, Recommender, TrainingOptions,
    },
    telemetry,
};

#[derive(Parser)]
#[command(name = "pipeline")]
#[command(about = "Generate the synthetic dataset and train the recommendation models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic player profiles
    Generate {
        /// Number of players to generate
        #[arg(long, default_value_t = DEFAULT_ROWS)]
        rows: usize,

        /// Seed for reproducible output (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Output CSV path
        #[arg(long, default_value = "valorant_dataset.csv")]
        out: PathBuf,
    },

    /// Train the encoder, agent classifier and sensitivity regressor
    Train {
        /// Input CSV path
        #[arg(long, default_value = "valorant_dataset.csv")]
        dataset: PathBuf,

        /// Directory the artifacts are written to
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,

        /// Trees per forest
        #[arg(long, default_value_t = 100)]
        trees: usize,

        /// Seed for the split and the forests
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Fraction of rows held out for scoring
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,

        /// Refuse to save when agent accuracy is below this value
        #[arg(long)]
        min_accuracy: Option<f64>,

        /// Refuse to save when sensitivity R² is below this value
        #[arg(long)]
        min_r2: Option<f64>,
    },

    /// Print recommendations for a few sample profiles
    Demo {
        /// Directory holding trained artifacts
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,
    },
}

fn sample_profiles() -> Vec<(&'static str, PlayerProfile)> {
    vec![
        (
            "Aggressive Duelist",
            PlayerProfile {
                playstyle: Playstyle::Aggressive,
                preferred_role: Role::Duelist,
                favorite_map: MapName::Ascent,
                aim_type: AimType::Precise,
                edpi: 320,
                ability_usage: 3,
                aggressiveness: 9,
                hours_played: 500,
            },
        ),
        (
            "Passive Sentinel",
            PlayerProfile {
                playstyle: Playstyle::Passive,
                preferred_role: Role::Sentinel,
                favorite_map: MapName::Bind,
                aim_type: AimType::Spray,
                edpi: 220,
                ability_usage: 8,
                aggressiveness: 2,
                hours_played: 800,
            },
        ),
        (
            "Balanced Initiator",
            PlayerProfile {
                playstyle: Playstyle::Balanced,
                preferred_role: Role::Initiator,
                favorite_map: MapName::Lotus,
                aim_type: AimType::Burst,
                edpi: 280,
                ability_usage: 7,
                aggressiveness: 5,
                hours_played: 350,
            },
        ),
    ]
}

fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { rows, seed, out } => {
            let records = match seed {
                Some(seed) => DatasetGenerator::seeded(seed).generate(rows)?,
                None => DatasetGenerator::from_entropy().generate(rows)?,
            };
            dataset::write_csv_file(&out, &records)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            tracing::info!(rows = records.len(), path = %out.display(), "Dataset generated");
        }
        Commands::Train {
            dataset: dataset_path,
            models_dir,
            trees,
            seed,
            test_size,
            min_accuracy,
            min_r2,
        } => {
            let records = dataset::read_csv_file(&dataset_path)
                .with_context(|| format!("Failed to read {}", dataset_path.display()))?;

            let options = TrainingOptions {
                forest: ForestParams {
                    n_estimators: trees,
                    seed,
                    ..ForestParams::default()
                },
                test_fraction: test_size,
                split_seed: seed,
                quality_gate: QualityGate {
                    min_accuracy,
                    min_r2,
                },
            };

            let store = ArtifactStore::new(&models_dir);
            let report = train_and_save(&records, &options, &store)?;
            println!("[Model Training] Agent prediction accuracy: {:.2}%", report.agent_accuracy * 100.0);
            println!("[Model Training] Sensitivity prediction R²: {:.4}", report.sens_r2);
            println!("Artifacts written to {}", store.dir().display());
        }
        Commands::Demo { models_dir } => {
            let predictor = Predictor::load(&ArtifactStore::new(&models_dir));
            for (name, profile) in sample_profiles() {
                let prediction = predictor.recommend(&profile)?;
                println!("\n[{}]", name);
                println!(
                    "  Profile: {}, {}, {}",
                    profile.playstyle, profile.preferred_role, profile.aim_type
                );
                println!("  eDPI: {}", profile.edpi);
                println!("  Recommended agent: {}", prediction.recommended_agent);
                println!("  Recommended sens @ 800 DPI: {}", prediction.recommended_sens_800);
                println!("  Recommended sens @ 1600 DPI: {}", prediction.recommended_sens_1600);
            }
        }
    }

    Ok(())
}
