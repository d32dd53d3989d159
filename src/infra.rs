//! Host-level infrastructure blocks shared by custom clusters, imported
//! clusters and the standalone Rancher server: cloud instances, vSphere
//! virtual machines and SSH provisioning.

pub mod aws;
pub mod ssh;
pub mod vsphere;

use crate::config::{InfraProvider, TerraformConfig};
use crate::hcl::Body;

/// Writes the `provider` block for the configured infrastructure provider.
pub fn set_provider_block(
    root: &mut Body,
    config: &TerraformConfig,
) -> Result<(), crate::config::ConfigError> {
    match config.provider {
        Some(InfraProvider::Aws) => aws::set_provider_block(root, config),
        Some(InfraProvider::Vsphere) => vsphere::set_provider_block(root, config),
        None => Err(crate::config::ConfigError::Missing(
            "terraform.provider".to_string(),
        )),
    }
}
