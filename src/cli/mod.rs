//! Hyperdrive training CLI
//!
//! Maps process flags onto a [`HyperparameterConfig`] and a [`RunConfig`],
//! runs the pipeline once and stores the tracked run.

use clap::Parser;
use colored::*;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

use crate::data::LocalRegistry;
use crate::pipeline::{RunConfig, RunSummary, TrainingRun};
use crate::tracking::{LocalStorage, Run, StorageBackend};
use crate::training::HyperparameterConfig;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<18} {}", muted(key), val.white());
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_failed(detail: &str) {
    println!("{} {}", "failed".red(), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "hyperdrive-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train one gradient boosted attrition classifier for a hyperparameter sweep")]
#[command(long_about = None)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Dataset name resolved under --data_dir
    #[arg(long, default_value = "attrition_train")]
    pub dataset: String,

    /// Directory holding <dataset>.csv or <dataset>.json
    #[arg(long = "data_dir", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory receiving hyperdrive_model.bin
    #[arg(long = "output_dir", default_value = "outputs")]
    pub output_dir: PathBuf,

    /// Directory receiving tracked runs
    #[arg(long = "tracking_dir", default_value = "runs")]
    pub tracking_dir: PathBuf,

    /// Boosting learning rate
    #[arg(long = "learning_rate", default_value_t = 0.3)]
    pub learning_rate: f64,

    /// Number of boosting rounds
    #[arg(long = "n_estimators", default_value_t = 100)]
    pub n_estimators: usize,

    /// Maximum tree depth
    #[arg(long = "max_depth", default_value_t = 6)]
    pub max_depth: usize,

    /// Minimum hessian sum in a child
    #[arg(long = "min_child_weight", default_value_t = 1)]
    pub min_child_weight: u32,

    /// Minimum loss reduction to split
    #[arg(long, default_value_t = 0.0)]
    pub gamma: f64,

    /// Row subsample ratio per tree
    #[arg(long, default_value_t = 1.0)]
    pub subsample: f64,

    /// Column subsample ratio per tree
    #[arg(long = "colsample_bytree", default_value_t = 1.0)]
    pub colsample_bytree: f64,

    /// L2 regularization on leaf weights
    #[arg(long = "reg_lambda", default_value_t = 1.0)]
    pub reg_lambda: f64,

    /// L1 regularization on leaf weights
    #[arg(long = "reg_alpha", default_value_t = 0.0)]
    pub reg_alpha: f64,
}

impl Cli {
    pub fn hyperparameters(&self) -> HyperparameterConfig {
        HyperparameterConfig {
            learning_rate: self.learning_rate,
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            min_child_weight: self.min_child_weight,
            gamma: self.gamma,
            subsample: self.subsample,
            colsample_bytree: self.colsample_bytree,
            reg_lambda: self.reg_lambda,
            reg_alpha: self.reg_alpha,
        }
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig::new()
            .with_dataset(self.dataset.clone())
            .with_data_dir(self.data_dir.clone())
            .with_output_dir(self.output_dir.clone())
            .with_tracking_dir(self.tracking_dir.clone())
    }
}

fn print_hyperparameters(hp: &HyperparameterConfig) {
    kv("learning_rate", &hp.learning_rate.to_string());
    kv("n_estimators", &hp.n_estimators.to_string());
    kv("max_depth", &hp.max_depth.to_string());
    kv("min_child_weight", &hp.min_child_weight.to_string());
    kv("gamma", &hp.gamma.to_string());
    kv("subsample", &hp.subsample.to_string());
    kv("colsample_bytree", &hp.colsample_bytree.to_string());
    kv("reg_lambda", &hp.reg_lambda.to_string());
    kv("reg_alpha", &hp.reg_alpha.to_string());
}

fn print_summary(summary: &RunSummary, run: &Run) {
    section("Result");
    kv("rows", &format!("{} ({} train / {} validation)", summary.n_rows, summary.n_train, summary.n_validation));
    kv("features", &summary.n_features.to_string());
    kv("trees", &summary.n_trees.to_string());
    for (name, value) in summary.metrics.entries() {
        println!("  {:<18} {}", muted(name), format!("{:.3}", value).white().bold());
    }
    kv("artifact", &summary.artifact_path.display().to_string());
    kv("run", &run.run_id);
    println!();
}

/// Execute one training run from parsed flags.
///
/// The tracked run is saved whether the pipeline succeeds or not.
pub fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let hyperparameters = cli.hyperparameters();
    let config = cli.run_config();

    section("Hyperdrive train");
    kv("dataset", &config.dataset);
    print_hyperparameters(&hyperparameters);

    let registry = LocalRegistry::new(config.data_dir.clone());
    let storage = LocalStorage::new(config.tracking_dir.clone());

    let mut tracked = Run::new(format!("{}-hyperdrive", config.dataset));
    tracked.set_tag("dataset", config.dataset.clone());
    tracked.set_tag("target", config.target_column.clone());

    println!();
    step_run("Training");
    let result = {
        let mut training = TrainingRun::new(config, hyperparameters, &mut tracked);
        training.execute(&registry)
    };

    match result {
        Ok(summary) => {
            step_done(&format!("{:.2}s", summary.elapsed_secs));
            tracked.log_artifact(summary.artifact_path.display().to_string());
            tracked.finish();
            storage.save_run(&tracked)?;
            print_summary(&summary, &tracked);
            Ok(summary)
        }
        Err(err) => {
            step_failed(&err.to_string());
            tracked.fail(err.to_string());
            if let Err(save_err) = storage.save_run(&tracked) {
                warn!(error = %save_err, "Could not save failed run");
            }
            Err(err.into())
        }
    }
}
