//! # opsctl
//!
//! Operational CLI for the Secret Manager secrets an environment depends on.
//!
//! ## Usage
//!
//! ```bash
//! # Store a new version (the secret is created if needed)
//! opsctl --action update-secret --secret-id api-key --secret-value "$API_KEY"
//!
//! # Print the latest version
//! opsctl --action get-secret --secret-id api-key
//!
//! # Push DATABASE_URL, REDIS_URL, JWT_SECRET and API_KEY from a .env file
//! opsctl --action update-from-env --env-file .env.production
//!
//! # Exit 1 unless all required secrets exist
//! opsctl --action validate
//! ```

use anyhow::Result;
use clap::Parser;
use gcp_config_tools::constants::DEFAULT_ENV_FILE;
use gcp_config_tools::manager::run_action;
use gcp_config_tools::runtime::initialize;
use gcp_config_tools::{
    resolve_project_id, Action, ActionOutcome, ActionRequest, SecretOperations, ToolConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use zeroize::Zeroizing;

/// GCP Secret Manager operations CLI
#[derive(Parser)]
#[command(name = "opsctl")]
#[command(about = "Manage the Secret Manager secrets of a GCP project", long_about = None)]
struct Cli {
    /// GCP project ID (defaults to GCP_PROJECT_ID)
    #[arg(long)]
    project_id: Option<String>,

    /// Action to perform
    #[arg(long, value_enum)]
    action: Action,

    /// Secret ID for update-secret and get-secret
    #[arg(long)]
    secret_id: Option<String>,

    /// Secret value for update-secret
    #[arg(long)]
    secret_value: Option<String>,

    /// Env file for update-from-env
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    initialize()?;
    let cli = Cli::parse();

    let project_id = resolve_project_id(cli.project_id)?;
    let config = ToolConfig::from_env();
    let operations = SecretOperations::from_config(&project_id, &config)?;

    let request = ActionRequest {
        action: cli.action,
        secret_id: cli.secret_id,
        secret_value: cli.secret_value.map(Zeroizing::new),
        env_file: cli.env_file,
    };

    info!("Running {} against project {}", request.action, operations.project_id());
    let outcome = run_action(&operations, &request).await?;
    print_outcome(&outcome);
    Ok(ExitCode::from(outcome.exit_code()))
}

fn print_outcome(outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Updated { secret_id, version } => {
            println!("Updated secret '{secret_id}'");
            println!("   Version: {version}");
        }
        ActionOutcome::Listed(secret_ids) => {
            if secret_ids.is_empty() {
                println!("No secrets found.");
            }
            for secret_id in secret_ids {
                println!("{secret_id}");
            }
        }
        ActionOutcome::Value { value, .. } => println!("{}", value.as_str()),
        ActionOutcome::EnvUpdated(report) => {
            for mapping in &report.updated {
                println!("Updated {} from {}", mapping.secret_id, mapping.env_var);
            }
            for mapping in &report.missing {
                println!("Skipped {}: {} not set", mapping.secret_id, mapping.env_var);
            }
        }
        ActionOutcome::Validated(true) => println!("All required secrets are present"),
        ActionOutcome::Validated(false) => println!("Validation failed: required secrets are missing"),
    }
}
