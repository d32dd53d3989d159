//! Harness configuration, loaded from the YAML file named by
//! `CATTLE_TEST_CONFIG` (or `--config`).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENVIRONMENT_KEY: &str = "CATTLE_TEST_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown module: {0}")]
    UnknownModule(String),

    #[error("missing configuration: {0}")]
    Missing(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The three sections of the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct TfpConfigs {
    pub rancher: RancherConfig,
    pub terraform: TerraformConfig,
    #[serde(default)]
    pub terratest: TerratestConfig,
}

impl TfpConfigs {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let configs: TfpConfigs = serde_yaml::from_str(content)?;
        configs.validate()?;
        Ok(configs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rancher.host.is_empty() {
            return Err(ConfigError::Missing("rancher.host".to_string()));
        }

        let module = self.terraform.module;
        if (module.is_custom() || module.is_imported()) && self.terraform.provider.is_none() {
            return Err(ConfigError::Missing(format!(
                "terraform.provider (required by module {module})"
            )));
        }

        Ok(())
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RancherConfig {
    pub host: String,
    #[serde(default)]
    pub admin_token: String,
    #[serde(default)]
    pub standard_user_token: Option<String>,
    #[serde(default = "default_true")]
    pub insecure: bool,
    #[serde(default = "default_true")]
    pub cleanup: bool,
}

impl fmt::Debug for RancherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RancherConfig")
            .field("host", &self.host)
            .field("admin_token", &"[REDACTED]")
            .field("insecure", &self.insecure)
            .field("cleanup", &self.cleanup)
            .finish()
    }
}

fn default_true() -> bool {
    true
}

/// Kubernetes distribution managed by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Distribution {
    Rke1,
    Rke2,
    K3s,
    Eks,
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Distribution::Rke1 => "rke1",
            Distribution::Rke2 => "rke2",
            Distribution::K3s => "k3s",
            Distribution::Eks => "eks",
        };
        f.write_str(name)
    }
}

/// Which cluster configuration gets generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Ec2Rke1,
    AzureRke1,
    LinodeRke1,
    VsphereRke1,
    Ec2Rke2,
    Ec2K3s,
    AzureRke2,
    AzureK3s,
    LinodeRke2,
    LinodeK3s,
    VsphereRke2,
    VsphereK3s,
    CustomRke2,
    CustomRke2Windows,
    CustomK3s,
    ImportedRke2,
    ImportedK3s,
    Ec2Eks,
}

impl Module {
    pub const ALL: [Module; 18] = [
        Module::Ec2Rke1,
        Module::AzureRke1,
        Module::LinodeRke1,
        Module::VsphereRke1,
        Module::Ec2Rke2,
        Module::Ec2K3s,
        Module::AzureRke2,
        Module::AzureK3s,
        Module::LinodeRke2,
        Module::LinodeK3s,
        Module::VsphereRke2,
        Module::VsphereK3s,
        Module::CustomRke2,
        Module::CustomRke2Windows,
        Module::CustomK3s,
        Module::ImportedRke2,
        Module::ImportedK3s,
        Module::Ec2Eks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Ec2Rke1 => "ec2_rke1",
            Module::AzureRke1 => "azure_rke1",
            Module::LinodeRke1 => "linode_rke1",
            Module::VsphereRke1 => "vsphere_rke1",
            Module::Ec2Rke2 => "ec2_rke2",
            Module::Ec2K3s => "ec2_k3s",
            Module::AzureRke2 => "azure_rke2",
            Module::AzureK3s => "azure_k3s",
            Module::LinodeRke2 => "linode_rke2",
            Module::LinodeK3s => "linode_k3s",
            Module::VsphereRke2 => "vsphere_rke2",
            Module::VsphereK3s => "vsphere_k3s",
            Module::CustomRke2 => "custom_rke2",
            Module::CustomRke2Windows => "custom_rke2_windows",
            Module::CustomK3s => "custom_k3s",
            Module::ImportedRke2 => "imported_rke2",
            Module::ImportedK3s => "imported_k3s",
            Module::Ec2Eks => "ec2_eks",
        }
    }

    pub fn distribution(&self) -> Distribution {
        match self {
            Module::Ec2Rke1 | Module::AzureRke1 | Module::LinodeRke1 | Module::VsphereRke1 => {
                Distribution::Rke1
            }
            Module::Ec2Rke2
            | Module::AzureRke2
            | Module::LinodeRke2
            | Module::VsphereRke2
            | Module::CustomRke2
            | Module::CustomRke2Windows
            | Module::ImportedRke2 => Distribution::Rke2,
            Module::Ec2K3s
            | Module::AzureK3s
            | Module::LinodeK3s
            | Module::VsphereK3s
            | Module::CustomK3s
            | Module::ImportedK3s => Distribution::K3s,
            Module::Ec2Eks => Distribution::Eks,
        }
    }

    /// Node driver used for node-driver modules.
    pub fn node_provider(&self) -> Option<&'static str> {
        match self {
            Module::Ec2Rke1 | Module::Ec2Rke2 | Module::Ec2K3s => Some("aws"),
            Module::AzureRke1 | Module::AzureRke2 | Module::AzureK3s => Some("azure"),
            Module::LinodeRke1 | Module::LinodeRke2 | Module::LinodeK3s => Some("linode"),
            Module::VsphereRke1 | Module::VsphereRke2 | Module::VsphereK3s => Some("vsphere"),
            _ => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(
            self,
            Module::CustomRke2 | Module::CustomRke2Windows | Module::CustomK3s
        )
    }

    pub fn is_imported(&self) -> bool {
        matches!(self, Module::ImportedRke2 | Module::ImportedK3s)
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Module::CustomRke2Windows)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownModule(s.to_string()))
    }
}

/// Infrastructure provider for custom, imported and standalone hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfraProvider {
    Aws,
    Vsphere,
}

impl fmt::Display for InfraProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfraProvider::Aws => f.write_str("aws"),
            InfraProvider::Vsphere => f.write_str("vsphere"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerraformConfig {
    pub module: Module,
    #[serde(default)]
    pub provider: Option<InfraProvider>,
    #[serde(default)]
    pub resource_prefix: String,
    #[serde(default = "default_network_plugin")]
    pub network_plugin: String,
    #[serde(default)]
    pub node_template_name: String,
    #[serde(default)]
    pub private_key_path: String,
    #[serde(default)]
    pub rancher2_provider_version: Option<String>,
    #[serde(default)]
    pub aws_provider_version: Option<String>,
    #[serde(default)]
    pub enable_network_policy: bool,

    #[serde(default)]
    pub aws_credentials: Option<AwsCredentials>,
    #[serde(default)]
    pub aws_config: Option<AwsConfig>,
    #[serde(default)]
    pub azure_credentials: Option<AzureCredentials>,
    #[serde(default)]
    pub azure_config: Option<AzureConfig>,
    #[serde(default)]
    pub linode_credentials: Option<LinodeCredentials>,
    #[serde(default)]
    pub linode_config: Option<LinodeConfig>,
    #[serde(default)]
    pub vsphere_credentials: Option<VsphereCredentials>,
    #[serde(default)]
    pub vsphere_config: Option<VsphereConfig>,

    #[serde(default)]
    pub private_registries: Option<PrivateRegistries>,
    #[serde(default, rename = "etcdRKE1")]
    pub etcd_rke1: Option<EtcdRke1>,
    #[serde(default)]
    pub etcd: Option<Etcd>,
    #[serde(default)]
    pub standalone: Option<Standalone>,
    #[serde(default)]
    pub standalone_registry: Option<StandaloneRegistry>,
}

fn default_network_plugin() -> String {
    "canal".to_string()
}

impl TerraformConfig {
    pub fn aws_credentials(&self) -> Result<&AwsCredentials, ConfigError> {
        self.aws_credentials
            .as_ref()
            .ok_or_else(|| ConfigError::Missing("terraform.awsCredentials".to_string()))
    }

    pub fn aws_config(&self) -> Result<&AwsConfig, ConfigError> {
        self.aws_config
            .as_ref()
            .ok_or_else(|| ConfigError::Missing("terraform.awsConfig".to_string()))
    }

    pub fn vsphere_config(&self) -> Result<&VsphereConfig, ConfigError> {
        self.vsphere_config
            .as_ref()
            .ok_or_else(|| ConfigError::Missing("terraform.vsphereConfig".to_string()))
    }

    pub fn vsphere_credentials(&self) -> Result<&VsphereCredentials, ConfigError> {
        self.vsphere_credentials
            .as_ref()
            .ok_or_else(|| ConfigError::Missing("terraform.vsphereCredentials".to_string()))
    }

    pub fn standalone(&self) -> Result<&Standalone, ConfigError> {
        self.standalone
            .as_ref()
            .ok_or_else(|| ConfigError::Missing("terraform.standalone".to_string()))
    }

    /// Version pin for the rancher2 provider: config first, then environment.
    pub fn rancher2_version(&self) -> Option<String> {
        self.rancher2_provider_version
            .clone()
            .or_else(|| std::env::var("RANCHER2_PROVIDER_VERSION").ok())
            .filter(|v| !v.is_empty())
    }

    pub fn aws_version(&self) -> Option<String> {
        self.aws_provider_version
            .clone()
            .or_else(|| std::env::var("AWS_PROVIDER_VERSION").ok())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentials {
    pub aws_access_key: String,
    pub aws_secret_key: String,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("aws_access_key", &"[REDACTED]")
            .field("aws_secret_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsConfig {
    #[serde(default)]
    pub ami: String,
    #[serde(default)]
    pub windows_ami: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub aws_instance_type: String,
    #[serde(default)]
    pub windows_instance_type: String,
    #[serde(default)]
    pub aws_user: String,
    #[serde(default)]
    pub windows_user: String,
    #[serde(default)]
    pub aws_volume_type: String,
    #[serde(default)]
    pub aws_root_size: i64,
    #[serde(default)]
    pub aws_security_group_names: Vec<String>,
    #[serde(default)]
    pub aws_security_groups: Vec<String>,
    #[serde(default, rename = "awsSubnetID")]
    pub aws_subnet_id: String,
    #[serde(default)]
    pub aws_subnets: Vec<String>,
    #[serde(default, rename = "awsVpcID")]
    pub aws_vpc_id: String,
    #[serde(default)]
    pub aws_zone_letter: String,
    #[serde(default)]
    pub aws_key_name: String,
    #[serde(default)]
    pub private_access: bool,
    #[serde(default)]
    pub public_access: bool,
    #[serde(default = "default_ip_address_type")]
    pub load_balancer_type: String,
    #[serde(default, rename = "clusterCIDR")]
    pub cluster_cidr: String,
    #[serde(default, rename = "serviceCIDR")]
    pub service_cidr: String,
}

fn default_ip_address_type() -> String {
    "ipv4".to_string()
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub subscription_id: String,
    #[serde(default = "default_azure_environment")]
    pub environment: String,
}

impl fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

fn default_azure_environment() -> String {
    "AzurePublicCloud".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureConfig {
    #[serde(default)]
    pub availability_set: String,
    #[serde(default)]
    pub disk_size: String,
    #[serde(default)]
    pub fault_domain_count: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub managed_disks: bool,
    #[serde(default)]
    pub no_public_ip: bool,
    #[serde(default)]
    pub open_port: Vec<String>,
    #[serde(default)]
    pub resource_group: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub ssh_user: String,
    #[serde(default)]
    pub storage_type: String,
    #[serde(default)]
    pub subnet: String,
    #[serde(default)]
    pub subnet_prefix: String,
    #[serde(default)]
    pub update_domain_count: String,
    #[serde(default)]
    pub vnet: String,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinodeCredentials {
    pub linode_token: String,
}

impl fmt::Debug for LinodeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinodeCredentials")
            .field("linode_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinodeConfig {
    #[serde(default)]
    pub linode_image: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub linode_root_pass: String,
    #[serde(default)]
    pub instance_type: String,
    #[serde(default)]
    pub ssh_user: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub swap_size: String,
    #[serde(default)]
    pub private_ip: bool,
}

impl fmt::Debug for LinodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinodeConfig")
            .field("linode_image", &self.linode_image)
            .field("region", &self.region)
            .field("linode_root_pass", &"[REDACTED]")
            .field("instance_type", &self.instance_type)
            .field("ssh_user", &self.ssh_user)
            .field("tags", &self.tags)
            .field("swap_size", &self.swap_size)
            .field("private_ip", &self.private_ip)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsphereCredentials {
    pub username: String,
    pub password: String,
    pub vcenter: String,
    #[serde(default = "default_vcenter_port")]
    pub vcenter_port: String,
}

impl fmt::Debug for VsphereCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VsphereCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("vcenter", &self.vcenter)
            .field("vcenter_port", &self.vcenter_port)
            .finish()
    }
}

fn default_vcenter_port() -> String {
    "443".to_string()
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsphereConfig {
    #[serde(default)]
    pub clone_from: String,
    #[serde(default)]
    pub cloud_config: String,
    #[serde(default)]
    pub content_library: String,
    #[serde(default)]
    pub cpu_count: String,
    #[serde(default)]
    pub creation_type: String,
    #[serde(default)]
    pub datacenter: String,
    #[serde(default)]
    pub datastore: String,
    #[serde(default)]
    pub datastore_cluster: String,
    #[serde(default)]
    pub disk_size: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub hostsystem: String,
    #[serde(default)]
    pub memory_size: String,
    #[serde(default)]
    pub network: Vec<String>,
    #[serde(default)]
    pub pool: String,
    #[serde(default)]
    pub ssh_password: String,
    #[serde(default)]
    pub ssh_port: String,
    #[serde(default)]
    pub ssh_user: String,
    #[serde(default)]
    pub ssh_user_group: String,
    #[serde(default)]
    pub compute_cluster: String,
    #[serde(default)]
    pub standalone_network: String,
    #[serde(default)]
    pub vm_template: String,
    #[serde(default)]
    pub guest_id: String,
}

impl fmt::Debug for VsphereConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VsphereConfig")
            .field("clone_from", &self.clone_from)
            .field("creation_type", &self.creation_type)
            .field("datacenter", &self.datacenter)
            .field("datastore", &self.datastore)
            .field("folder", &self.folder)
            .field("network", &self.network)
            .field("ssh_password", &"[REDACTED]")
            .field("ssh_user", &self.ssh_user)
            .field("vm_template", &self.vm_template)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateRegistries {
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub insecure: bool,
    #[serde(default)]
    pub system_default_registry: String,
}

impl fmt::Debug for PrivateRegistries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateRegistries")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("insecure", &self.insecure)
            .finish()
    }
}

/// RKE1 etcd backup settings (`services.etcd`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdRke1 {
    #[serde(default)]
    pub backup_config: Option<EtcdBackupConfig>,
    #[serde(default)]
    pub retention: String,
    #[serde(default)]
    pub snapshot: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdBackupConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub interval_hours: i64,
    #[serde(default)]
    pub safe_timestamp: bool,
    #[serde(default)]
    pub timeout: i64,
    #[serde(default)]
    pub retention: i64,
    #[serde(default)]
    pub s3_backup_config: Option<S3BackupConfig>,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3BackupConfig {
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub bucket_name: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub secret_key: String,
}

impl fmt::Debug for S3BackupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3BackupConfig")
            .field("bucket_name", &self.bucket_name)
            .field("endpoint", &self.endpoint)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// RKE2/K3s etcd settings (`rke_config.etcd`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Etcd {
    #[serde(default)]
    pub disable_snapshots: bool,
    #[serde(default)]
    pub snapshot_schedule_cron: String,
    #[serde(default)]
    pub snapshot_retention: i64,
    #[serde(default)]
    pub s3_config: Option<S3BackupConfig>,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standalone {
    #[serde(default)]
    pub os_user: String,
    #[serde(default)]
    pub os_group: String,
    #[serde(default, rename = "rke2Version")]
    pub rke2_version: String,
    #[serde(default)]
    pub rancher_hostname: String,
    #[serde(default)]
    pub rancher_image: String,
    #[serde(default)]
    pub rancher_tag_version: String,
    #[serde(default)]
    pub rancher_agent_image: String,
    #[serde(default)]
    pub rancher_chart_repository: String,
    #[serde(default)]
    pub bootstrap_password: String,
    #[serde(default)]
    pub registry_username: String,
    #[serde(default)]
    pub registry_password: String,
}

impl fmt::Debug for Standalone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Standalone")
            .field("os_user", &self.os_user)
            .field("rke2_version", &self.rke2_version)
            .field("rancher_hostname", &self.rancher_hostname)
            .field("rancher_tag_version", &self.rancher_tag_version)
            .field("bootstrap_password", &"[REDACTED]")
            .field("registry_password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandaloneRegistry {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub registry_name: String,
    #[serde(default)]
    pub registry_username: String,
    #[serde(default)]
    pub registry_password: String,
    #[serde(default)]
    pub assets_path: String,
}

impl fmt::Debug for StandaloneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandaloneRegistry")
            .field("authenticated", &self.authenticated)
            .field("registry_name", &self.registry_name)
            .field("registry_password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerratestConfig {
    #[serde(default)]
    pub kubernetes_version: String,
    #[serde(default)]
    pub upgraded_kubernetes_version: String,
    #[serde(default)]
    pub nodepools: Vec<Nodepool>,
    #[serde(default)]
    pub psact: String,
    #[serde(default)]
    pub snapshot_input: Snapshots,
    #[serde(default)]
    pub path_to_repo: String,
    #[serde(default)]
    pub rbac_role: Option<Role>,
}

/// One node pool (or EKS node group).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nodepool {
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub etcd: bool,
    #[serde(default)]
    pub controlplane: bool,
    #[serde(default)]
    pub worker: bool,
    #[serde(default)]
    pub instance_type: String,
    #[serde(default)]
    pub disk_size: i64,
    #[serde(default)]
    pub desired_size: i64,
    #[serde(default)]
    pub max_size: i64,
    #[serde(default)]
    pub min_size: i64,
}

impl Nodepool {
    /// Registration flags for custom clusters.
    pub fn role_flags(&self) -> String {
        let mut flags = Vec::new();
        if self.etcd {
            flags.push("--etcd");
        }
        if self.controlplane {
            flags.push("--controlplane");
        }
        if self.worker {
            flags.push("--worker");
        }
        flags.join(" ")
    }
}

/// What a snapshot restore brings back.
pub const RESTORE_NONE: &str = "none";
pub const RESTORE_KUBERNETES_VERSION: &str = "kubernetesVersion";
pub const RESTORE_ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshots {
    #[serde(default)]
    pub create_snapshot: bool,
    #[serde(default)]
    pub restore_snapshot: bool,
    #[serde(default)]
    pub snapshot_name: String,
    #[serde(default = "default_snapshot_restore")]
    pub snapshot_restore: String,
    #[serde(default)]
    pub upgrade_kubernetes_version: String,
    #[serde(default)]
    pub control_plane_concurrency_value: String,
    #[serde(default)]
    pub worker_concurrency_value: String,
    #[serde(default)]
    pub control_plane_unavailable_value: String,
    #[serde(default)]
    pub worker_unavailable_value: String,
    #[serde(default = "default_recurring_restores")]
    pub recurring_restores: u32,
    #[serde(skip)]
    pub create_generation: i64,
    #[serde(skip)]
    pub restore_generation: i64,
}

fn default_snapshot_restore() -> String {
    RESTORE_NONE.to_string()
}

fn default_recurring_restores() -> u32 {
    1
}

impl Default for Snapshots {
    fn default() -> Self {
        Self {
            create_snapshot: false,
            restore_snapshot: false,
            snapshot_name: String::new(),
            snapshot_restore: default_snapshot_restore(),
            upgrade_kubernetes_version: String::new(),
            control_plane_concurrency_value: String::new(),
            worker_concurrency_value: String::new(),
            control_plane_unavailable_value: String::new(),
            worker_unavailable_value: String::new(),
            recurring_restores: default_recurring_restores(),
            create_generation: 0,
            restore_generation: 0,
        }
    }
}

impl Snapshots {
    /// Whether the restore should also roll back the Kubernetes version.
    pub fn restores_kubernetes_version(&self) -> bool {
        self.snapshot_restore == RESTORE_KUBERNETES_VERSION || self.snapshot_restore == RESTORE_ALL
    }

    pub fn has_concurrency_values(&self) -> bool {
        !self.control_plane_concurrency_value.is_empty()
            && !self.worker_concurrency_value.is_empty()
    }

    pub fn has_unavailable_values(&self) -> bool {
        !self.control_plane_unavailable_value.is_empty()
            && !self.worker_unavailable_value.is_empty()
    }
}

/// Role template bound to the test user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    ClusterOwner,
    ClusterMember,
    ProjectOwner,
    ProjectMember,
    CreateNs,
    ReadOnly,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ClusterOwner => "cluster-owner",
            Role::ClusterMember => "cluster-member",
            Role::ProjectOwner => "project-owner",
            Role::ProjectMember => "project-member",
            Role::CreateNs => "create-ns",
            Role::ReadOnly => "read-only",
        }
    }

    /// Project-scoped roles bind through a project, not the cluster.
    pub fn is_project_scoped(&self) -> bool {
        self.as_str().contains("project") || matches!(self, Role::CreateNs | Role::ReadOnly)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
