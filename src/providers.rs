pub mod aws;
pub mod azure;
pub mod linode;
pub mod vsphere;

use thiserror::Error;

use crate::config::{ConfigError, TerraformConfig};
use crate::hcl::Body;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("missing provider configuration: {0}")]
    MissingConfig(String),
}

impl From<ConfigError> for ProviderError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing(field) => ProviderError::MissingConfig(field),
            other => ProviderError::MissingConfig(other.to_string()),
        }
    }
}

/// Writes the provider-specific blocks of a node-driver cluster.
pub trait NodeProvider: Send + Sync {
    fn name(&self) -> &str;

    /// `<driver>_credential_config` inside a `rancher2_cloud_credential`.
    fn set_credential_config(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError>;

    /// `<driver>_config` inside an RKE1 `rancher2_node_template`. Node
    /// templates carry their own credentials.
    fn set_node_template(&self, body: &mut Body, config: &TerraformConfig)
    -> Result<(), ProviderError>;

    /// `<driver>_config` inside an RKE2/K3s `rancher2_machine_config_v2`.
    fn set_machine_config(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError>;
}

pub fn get_provider(name: &str) -> Result<Box<dyn NodeProvider>, ProviderError> {
    match name {
        "aws" => Ok(Box::new(aws::AwsProvider)),
        "azure" => Ok(Box::new(azure::AzureProvider)),
        "linode" => Ok(Box::new(linode::LinodeProvider)),
        "vsphere" => Ok(Box::new(vsphere::VsphereProvider)),
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}

/// Sets a string attribute only when the configured value is non-empty.
pub(crate) fn set_non_empty(body: &mut Body, name: &str, value: &str) {
    if !value.is_empty() {
        body.set_attribute(name, value);
    }
}

fn missing(field: &str) -> ProviderError {
    ProviderError::MissingConfig(format!("terraform.{field}"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::TfpConfigs;

    /// Config with every node-provider section filled in.
    pub fn all_providers_config() -> TfpConfigs {
        TfpConfigs::from_yaml(
            r#"
rancher:
  host: rancher.example.com
  adminToken: token-abc:secret
terraform:
  module: ec2_rke2
  nodeTemplateName: tfp-template
  awsCredentials:
    awsAccessKey: AKIAEXAMPLE
    awsSecretKey: aws-secret
  awsConfig:
    ami: ami-123
    region: us-east-2
    awsInstanceType: t3.xlarge
    awsUser: ubuntu
    awsVolumeType: gp3
    awsRootSize: 100
    awsSecurityGroupNames: [rancher-nodes]
    awsSecurityGroups: [sg-1, sg-2]
    awsSubnetID: subnet-1
    awsSubnets: [subnet-1, subnet-2]
    awsVpcID: vpc-1
    awsZoneLetter: a
  azureCredentials:
    clientId: azure-client
    clientSecret: azure-secret
    subscriptionId: azure-sub
  azureConfig:
    image: canonical:UbuntuServer:18.04-LTS:latest
    location: westus2
    size: Standard_D2_v2
    sshUser: azureuser
    resourceGroup: tfp-rg
    openPort: ["6443/tcp", "2379/tcp"]
    managedDisks: true
  linodeCredentials:
    linodeToken: linode-secret
  linodeConfig:
    linodeImage: linode/ubuntu22.04
    region: us-west
    linodeRootPass: root-pass
    instanceType: g6-standard-8
  vsphereCredentials:
    username: administrator@vsphere.local
    password: vsphere-secret
    vcenter: vcenter.example.com
  vsphereConfig:
    cloneFrom: /dc/vm/ubuntu-template
    cpuCount: "4"
    creationType: template
    datacenter: /dc
    datastore: /dc/datastore/ds1
    diskSize: "40000"
    memorySize: "8192"
    network: [/dc/network/VM Network]
    sshUser: docker
"#,
        )
        .unwrap()
    }
}
