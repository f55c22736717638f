//! # apply-config
//!
//! Applies the YAML documents under `iam/`, `cloudrun/` and `cloudbuild/` to a GCP project.
//!
//! ## Usage
//!
//! ```bash
//! # Apply ./iam, ./cloudrun and ./cloudbuild to $GCP_PROJECT_ID
//! apply-config
//!
//! # Apply a config checkout to an explicit project
//! apply-config --project-id my-project --config-root ./gcp
//! ```
//!
//! Directories that do not exist are skipped. The first failing file stops the run
//! with a non-zero exit code.

use anyhow::Result;
use clap::Parser;
use gcp_config_tools::runtime::initialize;
use gcp_config_tools::{resolve_project_id, ConfigApplier, ToolConfig};
use std::path::PathBuf;
use tracing::info;

/// Apply IAM, Cloud Run and Cloud Build configuration files to a GCP project
#[derive(Parser)]
#[command(name = "apply-config")]
#[command(about = "Apply IAM, Cloud Run and Cloud Build YAML configuration to a GCP project", long_about = None)]
struct Args {
    /// GCP project ID (defaults to GCP_PROJECT_ID)
    #[arg(long)]
    project_id: Option<String>,

    /// Directory containing the iam/, cloudrun/ and cloudbuild/ directories
    #[arg(long, default_value = ".")]
    config_root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    initialize()?;
    let args = Args::parse();

    let project_id = resolve_project_id(args.project_id)?;
    let config = ToolConfig::from_env();
    let applier = ConfigApplier::from_config(&project_id, &config)?;

    info!(
        "Applying configuration from {} to project {}",
        args.config_root.display(),
        applier.project_id()
    );
    let summary = applier.apply_all(&args.config_root).await?;

    info!(
        iam = summary.iam_files,
        cloudrun = summary.cloudrun_files,
        cloudbuild = summary.cloudbuild_files,
        skipped = summary.skipped_dirs.len(),
        "Applied {} configuration files",
        summary.total_files()
    );
    Ok(())
}
