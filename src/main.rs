//! StudentClusters: student profile segmentation CLI
//!
//! Two modes: training (fit transformer + K-Means on historical records,
//! report per-cluster diagnostics, persist artifacts) and classification
//! (load artifacts, assign one profile to its nearest cluster).

use anyhow::{Context, Result};
use clap::Parser;
use studentclusters::{
    train_from_csv, Args, InferenceService, KMeansConfig, StudentRecord, TrainingConfig,
};
use std::time::Instant;

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        println!("StudentClusters - Student Profile Segmentation");
        println!("==============================================\n");
    }

    if let Some(record) = args.parse_profile()? {
        run_classification_mode(&args, &record)?;
    } else {
        run_training_mode(&args)?;
    }

    Ok(())
}

/// Classify a single profile against previously fitted artifacts.
fn run_classification_mode(args: &Args, record: &StudentRecord) -> Result<()> {
    println!("=== Classification Mode ===");

    let start_time = Instant::now();

    // Artifacts are the only fitted state; without them there is nothing
    // meaningful to predict, so a load failure aborts here.
    let service = InferenceService::load(&args.model_dir).with_context(|| {
        format!(
            "failed to load model artifacts from '{}' (run training mode first)",
            args.model_dir
        )
    })?;

    let result = service.classify(record)?;
    let elapsed = start_time.elapsed();

    println!("\n✓ Predicted Cluster: {}", result.cluster_id);
    println!("  {}", result.description.headline);
    println!("  Processing time: {:.2}s", elapsed.as_secs_f64());

    println!("\nCluster profile:");
    for (column, mean) in &result.description.numeric_means {
        println!("  {column}: {mean:.2}");
    }
    for (column, value, pct) in &result.description.dominant_categories {
        println!("  {column}: mostly {value} ({pct:.1}%)");
    }

    if args.verbose {
        println!(
            "\nDescription payload:\n{}",
            serde_json::to_string_pretty(&result)?
        );
    }

    Ok(())
}

/// Run the full training pipeline and persist the fitted artifacts.
fn run_training_mode(args: &Args) -> Result<()> {
    println!("=== Training Pipeline ===\n");

    let start_time = Instant::now();

    if args.verbose {
        println!("Step 1: Loading historical records");
        println!("  Input file: {}", args.input);
    }

    let config = TrainingConfig {
        k: args.clusters,
        seed: args.seed,
        kmeans: KMeansConfig {
            n_init: args.n_init,
            max_iters: args.max_iters,
            tolerance: args.tolerance,
        },
    };

    let fit_start = Instant::now();
    let outcome = train_from_csv(&args.input, &config)
        .with_context(|| format!("training failed on '{}'", args.input))?;
    let fit_time = fit_start.elapsed();

    println!("✓ Model fitted: {} records", outcome.labels.len());
    if args.verbose {
        println!("  Fitting time: {:.2}s", fit_time.as_secs_f64());
        println!("  Inertia: {:.2}", outcome.model.inertia);
        println!("  Seed: {}, restarts: {}", args.seed, args.n_init);
    }

    println!("\n=== Cluster Statistics ===");
    let sizes = outcome.cluster_sizes();
    let total = outcome.labels.len();
    for (cluster_id, &size) in sizes.iter().enumerate() {
        let percentage = (size as f64 / total as f64) * 100.0;
        println!("Cluster {cluster_id}: {size} students ({percentage:.1}%)");
    }

    println!("\n=== Numerical averages per cluster ===");
    for summary in &outcome.summaries {
        print!("Cluster {}:", summary.cluster_id);
        for (column, mean) in &summary.numeric_means {
            print!("  {column}={mean:.2}");
        }
        println!();
    }

    println!("\n=== Key categorical distributions per cluster ===");
    for summary in &outcome.summaries {
        println!(
            "\nCluster {} ({} students):",
            summary.cluster_id, summary.size
        );
        for (column, ranked) in &summary.category_frequencies {
            let formatted: Vec<String> = ranked
                .iter()
                .map(|(value, pct)| format!("{value} {pct:.1}%"))
                .collect();
            println!("  {column}: {}", formatted.join(", "));
        }
        if let Some(description) = outcome.descriptions.get(summary.cluster_id) {
            println!("  => {}", description.headline);
        }
    }

    outcome
        .persist(&args.model_dir)
        .with_context(|| format!("failed to persist artifacts to '{}'", args.model_dir))?;

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    println!("Artifacts saved to: {}", args.model_dir);

    Ok(())
}
