//! Driving the `terraform` CLI against a generated module directory.

mod runner;
mod state;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use runner::{DEFAULT_RETRYABLE_ERRORS, Terraform};
pub use state::Outputs;

#[derive(Debug, Error)]
pub enum TerraformError {
    #[error("failed to run terraform: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("terraform {command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("invalid retryable error pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to parse terraform output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("terraform output {0} not found")]
    MissingOutput(String),
}

/// The terraform operations scenarios depend on. Implemented by
/// [`Terraform`]; tests substitute a recording fake.
#[async_trait]
pub trait TerraformExecutor: Send + Sync {
    /// Directory holding `main.tf`.
    fn working_dir(&self) -> &Path;

    async fn init(&self) -> Result<String, TerraformError>;

    async fn apply(&self) -> Result<String, TerraformError>;

    async fn init_and_apply(&self) -> Result<String, TerraformError> {
        self.init().await?;
        self.apply().await
    }

    async fn destroy(&self) -> Result<String, TerraformError>;

    async fn output(&self) -> Result<Outputs, TerraformError>;
}
