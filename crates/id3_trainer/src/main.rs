//! ID3 Trainer CLI
//!
//! Trains, cross-validates and inspects ID3 decision trees over
//! categorical example files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use id3_core::TreeBuilder;
use id3_trainer::{
    accuracy_line, cross_validation_summary, load_examples, predict_from_csv, write_predictions,
    write_report, LoadedData, TrainerConfig,
};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "id3")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ID3 decision tree trainer and evaluator", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a tree from a schema and a data file and print it
    Train {
        /// Attribute schema file (`name:v1,v2,...` per line)
        #[arg(short, long)]
        schema: PathBuf,

        /// Training data file
        #[arg(short, long)]
        data: PathBuf,

        /// Held-out data file to score the tree on
        #[arg(short, long)]
        test: Option<PathBuf>,

        /// Classifier attribute (defaults to the last schema attribute)
        #[arg(long)]
        classifier: Option<String>,

        /// Use depth-bounded binary splits (0 or less means unbounded)
        #[arg(long, allow_negative_numbers = true)]
        max_depth: Option<i64>,

        /// Fail on values with no branch instead of predicting "unknown"
        #[arg(long)]
        strict: bool,
    },

    /// Estimate accuracy with round-robin k-fold cross-validation
    Kfold {
        /// Attribute schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Data file
        #[arg(short, long)]
        data: PathBuf,

        /// Number of folds (values below 2 are raised to 2)
        #[arg(short = 'k', long, allow_negative_numbers = true)]
        folds: Option<i64>,

        /// Classifier attribute (defaults to the last schema attribute)
        #[arg(long)]
        classifier: Option<String>,

        /// Use depth-bounded binary splits (0 or less means unbounded)
        #[arg(long, allow_negative_numbers = true)]
        max_depth: Option<i64>,

        /// Evaluate folds on the rayon thread pool
        #[arg(long)]
        parallel: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fit on a headered CSV, label train and test rows, report error rates
    Predict {
        /// Headered training CSV (last column is the classifier)
        train: PathBuf,

        /// Headered test CSV with the same columns
        test: PathBuf,

        /// Maximum split depth (0 or less means unbounded)
        #[arg(long, allow_negative_numbers = true, default_value = "0")]
        max_depth: i64,

        /// Output file for training predictions
        #[arg(long, default_value = "train.labels")]
        train_out: PathBuf,

        /// Output file for test predictions
        #[arg(long, default_value = "test.labels")]
        test_out: PathBuf,

        /// Output file for the error metrics
        #[arg(long, default_value = "metrics.txt")]
        metrics_out: PathBuf,
    },

    /// Report label entropy and majority-vote error of a headered CSV
    Inspect {
        /// Headered CSV (last column is the label)
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    info!("ID3 Trainer v{}", env!("CARGO_PKG_VERSION"));

    let mut config = TrainerConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Train {
            schema,
            data,
            test,
            classifier,
            max_depth,
            strict,
        } => {
            if let Some(depth) = max_depth {
                config.set_max_depth(depth);
            }
            config.strict |= strict;
            train(&config, &schema, &data, test.as_deref(), classifier.as_deref())
        }
        Commands::Kfold {
            schema,
            data,
            folds,
            classifier,
            max_depth,
            parallel,
            json,
        } => {
            if let Some(depth) = max_depth {
                config.set_max_depth(depth);
            }
            if let Some(folds) = folds {
                // Negative counts fall through to the minimum fold clamp
                config.cross_validation.folds = usize::try_from(folds).unwrap_or(0);
            }
            config.cross_validation.parallel |= parallel;
            kfold(&config, &schema, &data, classifier.as_deref(), json)
        }
        Commands::Predict {
            train,
            test,
            max_depth,
            train_out,
            test_out,
            metrics_out,
        } => {
            config.set_max_depth(max_depth);
            predict(&config, &train, &test, &train_out, &test_out, &metrics_out)
        }
        Commands::Inspect { input, output } => inspect(&input, output.as_deref()),
    }
}

fn train(
    config: &TrainerConfig,
    schema: &Path,
    data: &Path,
    test: Option<&Path>,
    classifier: Option<&str>,
) -> Result<()> {
    info!("Loading schema from: {}", schema.display());
    info!("Loading examples from: {}", data.display());
    let loaded = LoadedData::load(schema, data).context("Failed to load training data")?;
    let classifier = loaded.classifier(classifier)?;

    info!("Training configuration:");
    info!("  Classifier: {}", classifier.name());
    info!("  Mode: {:?}", config.tree.mode);
    info!("  Fallback: {:?}", config.tree.fallback);

    let tree = TreeBuilder::new(config.tree)
        .build(&loaded.table, classifier, &loaded.catalog)
        .context("Failed to build tree")?;
    info!(
        "Built tree with {} nodes, {} leaves, depth {}",
        tree.len(),
        tree.leaf_count(),
        tree.depth()
    );
    print!("{}", tree.dump());

    if let Some(test) = test {
        let held_out = load_examples(test, &loaded.catalog).context("Failed to load test data")?;
        let correct = tree.count_correct(&held_out, &config.unknown_policy())?;
        println!("{}", accuracy_line(correct, held_out.len()));
    }

    Ok(())
}

fn kfold(
    config: &TrainerConfig,
    schema: &Path,
    data: &Path,
    classifier: Option<&str>,
    json: bool,
) -> Result<()> {
    let report = id3_trainer::cross_validate_files(schema, data, classifier, config)
        .context("Cross-validation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", cross_validation_summary(&report));
    }
    Ok(())
}

fn predict(
    config: &TrainerConfig,
    train: &Path,
    test: &Path,
    train_out: &Path,
    test_out: &Path,
    metrics_out: &Path,
) -> Result<()> {
    let run = predict_from_csv(train, test, config).context("Prediction failed")?;

    print!("{}", run.tree.dump());

    info!("Saving training predictions to: {}", train_out.display());
    write_predictions(train_out, &run.train_predictions)?;
    info!("Saving test predictions to: {}", test_out.display());
    write_predictions(test_out, &run.test_predictions)?;
    info!("Saving metrics to: {}", metrics_out.display());
    write_report(metrics_out, &run.metrics)?;

    info!("  Train error: {}", run.metrics.train_error);
    info!("  Test error: {}", run.metrics.test_error);
    Ok(())
}

fn inspect(input: &Path, output: Option<&Path>) -> Result<()> {
    let report = id3_trainer::inspect_csv(input).context("Failed to inspect labels")?;
    match output {
        Some(path) => {
            write_report(path, &report)?;
            info!("Saved inspection to: {}", path.display());
        }
        None => print!("{report}"),
    }
    Ok(())
}
