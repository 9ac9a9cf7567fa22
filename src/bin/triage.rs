//! Triage CLI - batch churn scoring for WellCo member cohorts
//!
//! Commands:
//! - run: full pipeline from raw tables to outreach list + run report
//! - evaluate: cross-validated AUC-ROC report for all classifier variants
//! - features: build and dump the feature table for a cohort
//! - score: train and score, printing the top-ranked members

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use wellco_triage::dataset::{ScoringTables, TrainingTables};
use wellco_triage::features::FeatureBuilder;
use wellco_triage::model::evaluate::evaluate_models;
use wellco_triage::pipeline::{run_end_to_end, run_scoring, run_training};
use wellco_triage::types::MemberFeatures;
use wellco_triage::{PipelineError, TRIAGE_VERSION};

/// Triage - churn-risk scoring and outreach prioritization for WellCo
#[derive(Parser)]
#[command(name = "triage")]
#[command(author = "WellCo Analytics")]
#[command(version = TRIAGE_VERSION)]
#[command(about = "Score churn risk and rank members for outreach", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: train, score, size the cohort, write outputs
    Run {
        /// Directory holding the training tables
        #[arg(long, default_value = "train_data")]
        train_dir: PathBuf,

        /// Directory holding the scoring tables
        #[arg(long, default_value = "test_data")]
        score_dir: PathBuf,

        /// Output directory for the outreach list and run report
        #[arg(long, default_value = "test_results")]
        out_dir: PathBuf,
    },

    /// Cross-validate all classifier variants and report AUC-ROC
    Evaluate {
        /// Directory holding the training tables
        #[arg(long, default_value = "train_data")]
        train_dir: PathBuf,

        /// Output the full ROC curves as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build and dump the feature table for a cohort as CSV
    Features {
        /// Directory holding the cohort's tables
        #[arg(long, default_value = "train_data")]
        data_dir: PathBuf,

        /// Which cohort the directory holds
        #[arg(value_enum, long, default_value = "train")]
        cohort: Cohort,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Train on the training cohort, score the test cohort, print the top
    /// ranked members
    Score {
        /// Directory holding the training tables
        #[arg(long, default_value = "train_data")]
        train_dir: PathBuf,

        /// Directory holding the scoring tables
        #[arg(long, default_value = "test_data")]
        score_dir: PathBuf,

        /// Number of top-ranked members to print
        #[arg(long, default_value = "20")]
        top: usize,
    },
}

#[derive(Clone, ValueEnum)]
enum Cohort {
    /// Labeled training tables (churn_labels.csv and friends)
    Train,
    /// Unlabeled scoring tables (test_members.csv and friends)
    Score,
}

#[derive(serde::Serialize)]
struct CliError {
    error: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let payload = CliError {
                error: e.to_string(),
            };
            eprintln!(
                "{}",
                serde_json::to_string(&payload).unwrap_or_else(|_| e.to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    match cli.command {
        Commands::Run {
            train_dir,
            score_dir,
            out_dir,
        } => cmd_run(&train_dir, &score_dir, &out_dir),
        Commands::Evaluate { train_dir, json } => cmd_evaluate(&train_dir, json),
        Commands::Features {
            data_dir,
            cohort,
            output,
        } => cmd_features(&data_dir, cohort, &output),
        Commands::Score {
            train_dir,
            score_dir,
            top,
        } => cmd_score(&train_dir, &score_dir, top),
    }
}

fn cmd_run(train_dir: &Path, score_dir: &Path, out_dir: &Path) -> Result<(), PipelineError> {
    let report = run_end_to_end(train_dir, score_dir, out_dir)?;

    for (variant, auc) in &report.evaluation {
        println!("{variant}: AUC-ROC = {auc:.4}");
    }
    println!("model trained successfully");
    for entry in &report.coefficients {
        println!("{}: {:.4}", entry.feature, entry.coefficient);
    }
    println!("optimal n: {}", report.optimal_n);
    println!(
        "saved top {} members to {}",
        report.outreach_members,
        out_dir.join("outreach_list.csv").display()
    );
    Ok(())
}

fn cmd_evaluate(train_dir: &Path, json: bool) -> Result<(), PipelineError> {
    let tables = TrainingTables::load_from_dir(train_dir)?;
    let features = FeatureBuilder::build_training(&tables)?;
    let summaries = evaluate_models(&features)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for (variant, summary) in &summaries {
            println!("{variant}: AUC-ROC = {:.4}", summary.mean_auc);
        }
    }
    Ok(())
}

fn cmd_features(data_dir: &Path, cohort: Cohort, output: &Path) -> Result<(), PipelineError> {
    let features = match cohort {
        Cohort::Train => {
            let tables = TrainingTables::load_from_dir(data_dir)?;
            FeatureBuilder::build_training(&tables)?
        }
        Cohort::Score => {
            let tables = ScoringTables::load_from_dir(data_dir)?;
            FeatureBuilder::build_scoring(&tables)?
        }
    };

    if output == Path::new("-") {
        write_features_csv(io::stdout().lock(), &features)
    } else {
        let file = File::create(output)?;
        write_features_csv(file, &features)?;
        eprintln!("wrote {} feature rows to {}", features.len(), output.display());
        Ok(())
    }
}

fn write_features_csv<W: Write>(
    writer: W,
    features: &[MemberFeatures],
) -> Result<(), PipelineError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in features {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn cmd_score(train_dir: &Path, score_dir: &Path, top: usize) -> Result<(), PipelineError> {
    let trained = run_training(train_dir)?;
    let outcome = run_scoring(&trained, score_dir)?;

    let shown = outcome.results.iter().take(top);

    if atty::is(atty::Stream::Stdout) {
        println!(
            "{:>5} {:>12} {:>10} {:>10} {:>8} {:>8}",
            "rank", "member_id", "p(churn)", "p(+outr)", "benefit", "score"
        );
        for result in shown {
            println!(
                "{:>5} {:>12} {:>10.4} {:>10.4} {:>8.4} {:>8.4}",
                result.rank,
                result.member_id,
                result.churn_prob_no_outreach,
                result.churn_prob_with_outreach,
                result.outreach_benefit,
                result.prioritization_score
            );
        }
        println!("optimal n: {}", outcome.cohort.optimal_n);
    } else {
        // Piped output: one JSON record per line
        let mut stdout = io::stdout().lock();
        for result in shown {
            serde_json::to_writer(&mut stdout, result)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
