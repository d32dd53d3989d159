use thiserror::Error;

use crate::config::ConfigError;
use crate::providers::ProviderError;
use crate::provisioning::ProvisioningError;
use crate::rancher::RancherError;
use crate::scenarios::ScenarioError;
use crate::standalone::StandaloneError;
use crate::terraform::TerraformError;

#[derive(Debug, Error)]
pub enum TfpaError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error(transparent)]
    Rancher(#[from] RancherError),

    #[error(transparent)]
    Terraform(#[from] TerraformError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error(transparent)]
    Standalone(#[from] StandaloneError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
