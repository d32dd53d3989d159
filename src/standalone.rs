//! Standalone Rancher server: three RKE2 hosts behind AWS network load
//! balancers, an optional image registry, and Rancher installed with Helm.
//!
//! The configuration is built in stages. Each stage extends the same
//! document, rewrites `main.tf` and applies it, because later stages need
//! addresses that only exist once the hosts are up.

mod loadbalancer;
mod rancher;
mod registries;
mod rke2;
mod sanity;

use thiserror::Error;

use crate::config::{ConfigError, TfpConfigs};
use crate::hcl::HclFile;
use crate::keypath;
use crate::provisioning::ProvisioningError;
use crate::terraform::{Outputs, TerraformError, TerraformExecutor};

const SERVER_ONE_PUBLIC_DNS: &str = "rke2_server1_public_dns";
const SERVER_ONE_PRIVATE_IP: &str = "rke2_server1_private_ip";
const SERVER_TWO_PUBLIC_DNS: &str = "rke2_server2_public_dns";
const SERVER_THREE_PUBLIC_DNS: &str = "rke2_server3_public_dns";
const REGISTRY_PUBLIC_DNS: &str = "registry_public_dns";

#[derive(Debug, Error)]
pub enum StandaloneError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error(transparent)]
    Terraform(#[from] TerraformError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Addresses of the hosts created by the first stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddresses {
    pub server_one_public_dns: String,
    pub server_one_private_ip: String,
    pub server_two_public_dns: String,
    pub server_three_public_dns: String,
    pub registry_public_dns: Option<String>,
}

impl ServerAddresses {
    pub fn from_outputs(outputs: &Outputs, with_registry: bool) -> Result<Self, TerraformError> {
        Ok(Self {
            server_one_public_dns: outputs.get(SERVER_ONE_PUBLIC_DNS)?,
            server_one_private_ip: outputs.get(SERVER_ONE_PRIVATE_IP)?,
            server_two_public_dns: outputs.get(SERVER_TWO_PUBLIC_DNS)?,
            server_three_public_dns: outputs.get(SERVER_THREE_PUBLIC_DNS)?,
            registry_public_dns: with_registry
                .then(|| outputs.get(REGISTRY_PUBLIC_DNS))
                .transpose()?,
        })
    }

    pub fn public_dns(&self) -> [&str; 3] {
        [
            &self.server_one_public_dns,
            &self.server_two_public_dns,
            &self.server_three_public_dns,
        ]
    }
}

/// Creates the Rancher server in the executor's working directory.
///
/// 1. hosts, load balancers and outputs; apply; read the addresses
/// 2. registry (when configured) and the RKE2 cluster; apply
/// 3. Rancher itself; apply
pub async fn create_main_tf(
    executor: &dyn TerraformExecutor,
    configs: &TfpConfigs,
) -> Result<ServerAddresses, StandaloneError> {
    let terraform = &configs.terraform;
    let dir = executor.working_dir();

    let mut file = sanity::sanity_file(terraform)?;
    write(dir, &file)?;
    executor.init_and_apply().await?;

    let outputs = executor.output().await?;
    let addresses = ServerAddresses::from_outputs(&outputs, terraform.standalone_registry.is_some())?;
    tracing::info!(
        server1 = %addresses.server_one_public_dns,
        registry = ?addresses.registry_public_dns,
        "standalone hosts are up"
    );

    let repo = &configs.terratest.path_to_repo;
    if let Some(registry) = &terraform.standalone_registry {
        registries::set_registry(file.body_mut(), terraform, registry, repo, &addresses)?;
    }
    rke2::set_rke2_servers(file.body_mut(), terraform, repo, &addresses)?;
    write(dir, &file)?;
    executor.init_and_apply().await?;
    tracing::info!("rke2 cluster created");

    rancher::set_rancher(file.body_mut(), terraform, repo, &addresses)?;
    write(dir, &file)?;
    executor.init_and_apply().await?;
    tracing::info!(
        hostname = %terraform.standalone()?.rancher_hostname,
        "rancher installed"
    );

    Ok(addresses)
}

fn write(dir: &std::path::Path, file: &HclFile) -> Result<(), StandaloneError> {
    keypath::write_main_tf(dir, &file.to_bytes()).map_err(|source| StandaloneError::Write {
        path: keypath::main_tf_path(dir).display().to_string(),
        source,
    })?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::terraform::testing::FakeTerraform;

    #[tokio::test]
    async fn test_create_main_tf_stages() {
        let repo = test_support::scripts_repo();
        let workdir = tempfile::tempdir().unwrap();
        let configs = test_support::configs(repo.path());
        let fake = FakeTerraform::new(workdir.path(), test_support::OUTPUTS);

        let addresses = create_main_tf(&fake, &configs).await.unwrap();
        assert_eq!(addresses.server_one_private_ip, "10.0.0.11");
        assert_eq!(addresses.registry_public_dns, None);

        assert_eq!(
            fake.calls(),
            ["init", "apply", "output", "init", "apply", "init", "apply"]
        );

        let applied = fake.applied();
        assert_eq!(applied.len(), 3);
        assert!(applied[0].contains(r#"resource "aws_instance" "rke2_server1" {"#));
        assert!(!applied[0].contains("null_resource"));
        assert!(applied[1].contains(r#"resource "null_resource" "rke2_server3" {"#));
        assert!(!applied[1].contains("install_rancher"));
        assert!(applied[2].starts_with(&applied[1]));
        assert!(applied[2].contains(r#"resource "null_resource" "install_rancher" {"#));
    }

    #[tokio::test]
    async fn test_create_main_tf_with_registry() {
        let repo = test_support::scripts_repo();
        let workdir = tempfile::tempdir().unwrap();
        let mut configs = test_support::configs(repo.path());
        configs.terraform.standalone_registry = Some(crate::config::StandaloneRegistry {
            authenticated: true,
            registry_name: "auth_registry".to_string(),
            registry_username: "reguser".to_string(),
            registry_password: "regpass".to_string(),
            assets_path: "/home/ubuntu".to_string(),
        });
        let fake = FakeTerraform::new(workdir.path(), test_support::OUTPUTS);

        let addresses = create_main_tf(&fake, &configs).await.unwrap();
        assert_eq!(
            addresses.registry_public_dns.as_deref(),
            Some("ec2-registry.compute.amazonaws.com")
        );

        let applied = fake.applied();
        assert!(applied[0].contains(r#"resource "aws_instance" "registry" {"#));
        assert!(applied[1].contains(r#"resource "null_resource" "registry" {"#));
    }

    #[tokio::test]
    async fn test_missing_output_stops_after_first_stage() {
        let repo = test_support::scripts_repo();
        let workdir = tempfile::tempdir().unwrap();
        let configs = test_support::configs(repo.path());
        let fake = FakeTerraform::new(workdir.path(), "{}");

        let err = create_main_tf(&fake, &configs).await.unwrap_err();
        assert!(matches!(
            err,
            StandaloneError::Terraform(TerraformError::MissingOutput(name)) if name == "rke2_server1_public_dns"
        ));
        assert_eq!(fake.calls(), ["init", "apply", "output"]);
    }
}
