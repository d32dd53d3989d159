//! End-to-end test flows against a live Rancher server: provision a
//! cluster, verify it, upgrade Kubernetes, back up and restore etcd, and
//! tear everything down again.

mod cleanup;
mod provision;
mod snapshot;
mod upgrade;
mod workloads;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::TfpConfigs;
use crate::credentials::Credentials;
use crate::provisioning::{self, GenerateContext, ProvisioningError};
use crate::rancher::{RancherClient, RancherError, WaitConfig};
use crate::terraform::{TerraformError, TerraformExecutor};

pub use cleanup::cleanup;
pub use upgrade::version_matches;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Rancher(#[from] RancherError),

    #[error(transparent)]
    Terraform(#[from] TerraformError),

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error("unhealthy pods in cluster {cluster}: {}", errors.join("; "))]
    UnhealthyPods {
        cluster: String,
        errors: Vec<String>,
    },

    #[error("{what} mismatch: expected {expected}, found {actual}")]
    Mismatch {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("failed to remove {path}: {source}")]
    Cleanup {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScenarioError {
    pub(crate) fn mismatch(
        what: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ScenarioError::Mismatch {
            what: what.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// One test run: the Rancher client, the terraform module directory and
/// the configuration that is regenerated as the scenario mutates it.
pub struct Harness {
    pub client: RancherClient,
    pub executor: Arc<dyn TerraformExecutor>,
    pub configs: TfpConfigs,
    pub credentials: Credentials,
    pub wait: WaitConfig,
}

impl Harness {
    pub fn new(
        client: RancherClient,
        executor: Arc<dyn TerraformExecutor>,
        configs: TfpConfigs,
        credentials: Credentials,
    ) -> Self {
        Self {
            client,
            executor,
            configs,
            credentials,
            wait: WaitConfig::default(),
        }
    }

    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    pub fn cluster_name(&self) -> &str {
        &self.credentials.cluster_name
    }

    /// Rewrites `main.tf` from the current configuration.
    pub fn regenerate(&self) -> Result<PathBuf, ScenarioError> {
        let ctx = GenerateContext::new(&self.configs, &self.credentials);
        Ok(provisioning::write_config_tf(
            &ctx,
            self.executor.working_dir(),
        )?)
    }

    async fn check_pods(&self, cluster_id: &str) -> Result<(), ScenarioError> {
        let errors = self.client.pod_status_errors(cluster_id).await?;
        if errors.is_empty() {
            return Ok(());
        }
        Err(ScenarioError::UnhealthyPods {
            cluster: cluster_id.to_string(),
            errors,
        })
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("client", &self.client)
            .field("working_dir", &self.executor.working_dir())
            .field("module", &self.configs.terraform.module)
            .field("credentials", &self.credentials)
            .finish()
    }
}
