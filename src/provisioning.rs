//! Generation of the cluster `main.tf`: provider wiring, then one of the
//! RKE1, RKE2/K3s node-driver, custom, imported or EKS layouts.

mod custom;
mod eks;
mod imported;
mod psact;
mod rbac;
mod rke1;
mod rke2k3s;
mod snapshots;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{ConfigError, InfraProvider, Module, Nodepool, TfpConfigs};
use crate::credentials::Credentials;
use crate::defaults::{
    ALIAS, PROVIDER, RANCHER2, RANCHER2_SOURCE, REQUIRED_PROVIDERS, SOURCE, STANDARD_USER,
    TERRAFORM, VERSION,
};
use crate::hcl::{Body, HclFile, Value};
use crate::infra;
use crate::keypath;
use crate::providers::ProviderError;

pub use eks::validate_eks_nodepool;

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no node pools configured")]
    NoNodepools,

    #[error("invalid node pool {index}: {reason}")]
    InvalidNodepool { index: usize, reason: String },

    #[error("failed to read script {path}: {source}")]
    Script {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything one generation pass reads.
#[derive(Debug, Clone, Copy)]
pub struct GenerateContext<'a> {
    pub configs: &'a TfpConfigs,
    pub credentials: &'a Credentials,
}

impl<'a> GenerateContext<'a> {
    pub fn new(configs: &'a TfpConfigs, credentials: &'a Credentials) -> Self {
        Self {
            configs,
            credentials,
        }
    }

    pub fn cluster_name(&self) -> &'a str {
        &self.credentials.cluster_name
    }

    pub fn module(&self) -> Module {
        self.configs.terraform.module
    }

    /// `provider = rancher2.standard_user` for resources owned by the
    /// standard user, when a standard-user token is configured.
    fn set_standard_user_provider(&self, body: &mut Body) {
        if self.configs.rancher.standard_user_token.is_some() {
            body.set_attribute(
                PROVIDER,
                Value::traversal(&[RANCHER2, STANDARD_USER]),
            );
        }
    }
}

/// Builds the full cluster configuration for the configured module.
pub fn config_tf(ctx: &GenerateContext<'_>) -> Result<HclFile, ProvisioningError> {
    let module = ctx.module();
    let mut file = HclFile::new();
    let root = file.body_mut();

    set_terraform_block(root, ctx);
    root.append_newline();
    set_rancher2_providers(root, ctx.configs);
    root.append_newline();

    if module.is_custom() {
        custom::set_custom_rke2k3s(root, ctx)?;
    } else if module.is_imported() {
        imported::set_imported_rke2k3s(root, ctx)?;
    } else if module == Module::Ec2Eks {
        eks::set_eks(root, ctx)?;
    } else if module.distribution() == crate::config::Distribution::Rke1 {
        rke1::set_rke1(root, ctx)?;
    } else {
        rke2k3s::set_rke2k3s(root, ctx)?;
    }

    tracing::info!(
        module = %module,
        cluster = %ctx.cluster_name(),
        "generated cluster configuration"
    );

    Ok(file)
}

/// Generates the configuration and writes it to `<dir>/main.tf`.
pub fn write_config_tf(
    ctx: &GenerateContext<'_>,
    dir: &Path,
) -> Result<PathBuf, ProvisioningError> {
    let file = config_tf(ctx)?;
    keypath::write_main_tf(dir, &file.to_bytes()).map_err(|source| ProvisioningError::Write {
        path: keypath::main_tf_path(dir).display().to_string(),
        source,
    })
}

fn set_terraform_block(root: &mut Body, ctx: &GenerateContext<'_>) {
    let terraform = &ctx.configs.terraform;
    let required = root
        .append_block(TERRAFORM, &[])
        .append_block(REQUIRED_PROVIDERS, &[]);

    let mut rancher2 = vec![(SOURCE, Value::string(RANCHER2_SOURCE))];
    if let Some(version) = terraform.rancher2_version() {
        rancher2.push((VERSION, Value::string(version)));
    }
    required.set_attribute(RANCHER2, Value::object(rancher2));

    if ctx.module().is_custom() || ctx.module().is_imported() {
        match terraform.provider {
            Some(InfraProvider::Aws) => {
                infra::aws::set_required_provider(required, terraform.aws_version())
            }
            Some(InfraProvider::Vsphere) => infra::vsphere::set_required_provider(required),
            None => {}
        }
    }
}

fn set_rancher2_providers(root: &mut Body, configs: &TfpConfigs) {
    let rancher = &configs.rancher;
    let api_url = crate::rancher::host_base_url(&rancher.host);

    let admin = root.append_block(PROVIDER, &[RANCHER2]);
    admin.set_attribute("api_url", &api_url);
    admin.set_attribute("token_key", &rancher.admin_token);
    admin.set_attribute("insecure", rancher.insecure);

    if let Some(token) = &rancher.standard_user_token {
        root.append_newline();
        let standard = root.append_block(PROVIDER, &[RANCHER2]);
        standard.set_attribute(ALIAS, STANDARD_USER);
        standard.set_attribute("api_url", &api_url);
        standard.set_attribute("token_key", token);
        standard.set_attribute("insecure", rancher.insecure);
    }
}

/// Node pools must exist, each with a positive quantity and at least one
/// role.
fn validate_nodepools(nodepools: &[Nodepool]) -> Result<(), ProvisioningError> {
    if nodepools.is_empty() {
        return Err(ProvisioningError::NoNodepools);
    }

    for (index, pool) in nodepools.iter().enumerate() {
        if pool.quantity < 1 {
            return Err(ProvisioningError::InvalidNodepool {
                index,
                reason: format!("quantity must be at least 1, got {}", pool.quantity),
            });
        }
        if !(pool.etcd || pool.controlplane || pool.worker) {
            return Err(ProvisioningError::InvalidNodepool {
                index,
                reason: "no role selected".to_string(),
            });
        }
    }

    Ok(())
}

fn pool_name(ctx: &GenerateContext<'_>, index: usize) -> String {
    format!("{}{index}", ctx.credentials.pool_name)
}

fn read_script(ctx: &GenerateContext<'_>, relative: &str) -> Result<String, ProvisioningError> {
    read_repo_script(&ctx.configs.terratest.path_to_repo, relative)
}

/// Reads a helper script shipped under `<pathToRepo>/scripts/`.
pub(crate) fn read_repo_script(
    path_to_repo: &str,
    relative: &str,
) -> Result<String, ProvisioningError> {
    let path = keypath::set_key_path(path_to_repo)
        .join("scripts")
        .join(relative);
    std::fs::read_to_string(&path).map_err(|source| ProvisioningError::Script {
        path: path.display().to_string(),
        source,
    })
}
