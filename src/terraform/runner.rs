use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use regex::RegexSet;
use tokio::process::Command;

use super::{Outputs, TerraformError, TerraformExecutor};

/// Transient provider and plugin failures worth another attempt.
pub const DEFAULT_RETRYABLE_ERRORS: [&str; 9] = [
    ".*connection reset by peer.*",
    ".*transport is closing.*",
    ".*Error installing provider.*",
    ".*Failed to query available provider packages.*",
    ".*timeout while waiting for plugin to start.*",
    ".*timed out waiting for server handshake.*",
    ".*could not query provider registry for.*",
    ".*Client.Timeout exceeded while awaiting headers.*",
    ".*Failed to install provider.*",
];

const MAX_RETRIES: u32 = 3;
const TIME_BETWEEN_RETRIES: Duration = Duration::from_secs(5);

/// Runs the `terraform` binary in one working directory.
#[derive(Debug, Clone)]
pub struct Terraform {
    binary: String,
    working_dir: PathBuf,
    retryable: RegexSet,
    max_retries: u32,
    time_between_retries: Duration,
}

impl Terraform {
    pub fn new(working_dir: impl Into<PathBuf>) -> Result<Self, TerraformError> {
        Ok(Self {
            binary: "terraform".to_string(),
            working_dir: working_dir.into(),
            retryable: RegexSet::new(DEFAULT_RETRYABLE_ERRORS)?,
            max_retries: MAX_RETRIES,
            time_between_retries: TIME_BETWEEN_RETRIES,
        })
    }

    /// Uses a different executable, e.g. `tofu` or a test double.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.time_between_retries = delay;
        self
    }

    pub fn is_retryable(&self, output: &str) -> bool {
        self.retryable.is_match(output)
    }

    async fn run_once(&self, args: &[&str]) -> Result<String, TerraformError> {
        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.working_dir)
            .env("TF_IN_AUTOMATION", "1")
            .output()
            .await
            .map_err(TerraformError::Spawn)?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(TerraformError::Failed {
            command: args.first().copied().unwrap_or_default().to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: format!("{stdout}{stderr}").trim().to_string(),
        })
    }

    /// Runs terraform, retrying when the combined output matches one of the
    /// retryable patterns.
    async fn run(&self, args: &[&str]) -> Result<String, TerraformError> {
        let mut attempt = 0;
        loop {
            tracing::info!(
                dir = %self.working_dir.display(),
                args = %args.join(" "),
                attempt,
                "running terraform"
            );

            match self.run_once(args).await {
                Ok(stdout) => return Ok(stdout),
                Err(TerraformError::Failed { stderr, .. })
                    if attempt < self.max_retries && self.is_retryable(&stderr) =>
                {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max = self.max_retries,
                        "terraform hit a retryable error, retrying"
                    );
                    tokio::time::sleep(self.time_between_retries).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl TerraformExecutor for Terraform {
    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    async fn init(&self) -> Result<String, TerraformError> {
        self.run(&["init", "-upgrade=false", "-input=false", "-no-color"])
            .await
    }

    async fn apply(&self) -> Result<String, TerraformError> {
        self.run(&["apply", "-input=false", "-auto-approve", "-no-color"])
            .await
    }

    async fn destroy(&self) -> Result<String, TerraformError> {
        self.run(&["destroy", "-input=false", "-auto-approve", "-no-color"])
            .await
    }

    async fn output(&self) -> Result<Outputs, TerraformError> {
        let json = self.run(&["output", "-json", "-no-color"]).await?;
        Outputs::parse(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_patterns() {
        let terraform = Terraform::new("/tmp").unwrap();
        assert!(terraform.is_retryable(
            "Error: Failed to install provider\n\nError while installing rancher/rancher2"
        ));
        assert!(terraform.is_retryable("read tcp 10.0.0.1: connection reset by peer"));
        assert!(terraform.is_retryable(
            "net/http: request canceled (Client.Timeout exceeded while awaiting headers)"
        ));
        assert!(!terraform.is_retryable("Error: Invalid reference"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let terraform = Terraform::new(dir.path())
            .unwrap()
            .with_binary("tfpa-no-such-terraform-binary");

        let err = terraform.init().await.unwrap_err();
        assert!(matches!(err, TerraformError::Spawn(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_retries_retryable_failures() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("attempts");
        let script = dir.path().join("fake-terraform");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\necho x >> {}\necho 'Error: transport is closing' >&2\nexit 1\n",
                counter.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let terraform = Terraform::new(dir.path())
            .unwrap()
            .with_binary(script.display().to_string())
            .with_retry_delay(Duration::from_millis(1));

        let err = terraform.apply().await.unwrap_err();
        assert!(matches!(err, TerraformError::Failed { status: 1, .. }));

        let attempts = std::fs::read_to_string(&counter).unwrap();
        assert_eq!(attempts.lines().count(), 1 + MAX_RETRIES as usize);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_retryable_failure_runs_once() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("attempts");
        let script = dir.path().join("fake-terraform");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\necho x >> {}\necho 'Error: Unsupported argument' >&2\nexit 1\n",
                counter.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let terraform = Terraform::new(dir.path())
            .unwrap()
            .with_binary(script.display().to_string())
            .with_retry_delay(Duration::from_millis(1));

        let err = terraform.apply().await.unwrap_err();
        assert!(err.to_string().contains("Unsupported argument"));
        assert_eq!(std::fs::read_to_string(&counter).unwrap().lines().count(), 1);
    }
}
