//! Command-line interface definitions and argument parsing

use crate::error::{Error, Result};
use crate::feature::StudentRecord;
use clap::Parser;

/// Student profile clustering CLI: fit K-Means on historical records or
/// classify a single profile against previously fitted artifacts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the historical records CSV file
    #[arg(short, long, default_value = "jamb_exam_results.csv")]
    pub input: String,

    /// Number of clusters for K-Means
    #[arg(short = 'k', long, default_value = "5")]
    pub clusters: usize,

    /// Seed for the reproducible multi-restart K-Means search
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of independent K-Means restarts
    #[arg(long, default_value = "30")]
    pub n_init: usize,

    /// Maximum iterations per K-Means run
    #[arg(long, default_value = "800")]
    pub max_iters: usize,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Directory holding the persisted model artifacts
    #[arg(short, long, default_value = "artifacts")]
    pub model_dir: String,

    /// Classification mode: provide all 11 attribute values as a
    /// comma-separated string, numeric attributes first.
    /// Example: --classify "31,89,3,3,Private,Urban,Yes,High,High,Tertiary,High"
    #[arg(short, long)]
    pub classify: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the profile from the classify string.
    /// Expected order: study hours, attendance rate, teacher quality,
    /// assignments completed, school type, school location, extra
    /// tutorials, socioeconomic status, IT knowledge, parent education
    /// level, parent involvement.
    pub fn parse_profile(&self) -> Result<Option<StudentRecord>> {
        let Some(ref profile_str) = self.classify else {
            return Ok(None);
        };

        let parts: Vec<&str> = profile_str.split(',').map(str::trim).collect();
        if parts.len() != 11 {
            return Err(Error::InvalidProfile(format!(
                "expected 11 comma-separated values, got {}",
                parts.len()
            )));
        }

        let numeric = |idx: usize, name: &str| -> Result<f64> {
            parts[idx]
                .parse()
                .map_err(|_| Error::InvalidProfile(format!("invalid {name} value: {}", parts[idx])))
        };

        Ok(Some(StudentRecord {
            study_hours_per_week: numeric(0, "study hours")?,
            attendance_rate: numeric(1, "attendance rate")?,
            teacher_quality: numeric(2, "teacher quality")?,
            assignments_completed: numeric(3, "assignments completed")?,
            school_type: parts[4].to_string(),
            school_location: parts[5].to_string(),
            extra_tutorials: parts[6].to_string(),
            socioeconomic_status: parts[7].to_string(),
            it_knowledge: parts[8].to_string(),
            parent_education_level: parts[9].to_string(),
            parent_involvement: parts[10].to_string(),
        }))
    }
}
