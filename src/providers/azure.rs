use super::{NodeProvider, ProviderError, missing, set_non_empty};
use crate::config::{AzureConfig, AzureCredentials, TerraformConfig};
use crate::hcl::{Body, list_of_strings};

pub const AZURE_CONFIG: &str = "azure_config";
pub const AZURE_CREDENTIAL_CONFIG: &str = "azure_credential_config";

const CLIENT_ID: &str = "client_id";
const CLIENT_SECRET: &str = "client_secret";
const SUBSCRIPTION_ID: &str = "subscription_id";
const ENVIRONMENT: &str = "environment";

pub struct AzureProvider;

impl AzureProvider {
    fn credentials(config: &TerraformConfig) -> Result<&AzureCredentials, ProviderError> {
        config
            .azure_credentials
            .as_ref()
            .ok_or_else(|| missing("azureCredentials"))
    }

    fn azure_config(config: &TerraformConfig) -> Result<&AzureConfig, ProviderError> {
        config
            .azure_config
            .as_ref()
            .ok_or_else(|| missing("azureConfig"))
    }

    fn set_vm_attributes(body: &mut Body, azure: &AzureConfig) {
        set_non_empty(body, "availability_set", &azure.availability_set);
        set_non_empty(body, "disk_size", &azure.disk_size);
        set_non_empty(body, "fault_domain_count", &azure.fault_domain_count);
        body.set_attribute("image", &azure.image);
        body.set_attribute("location", &azure.location);
        body.set_attribute("managed_disks", azure.managed_disks);
        body.set_attribute("no_public_ip", azure.no_public_ip);
        if !azure.open_port.is_empty() {
            body.set_attribute("open_port", list_of_strings(&azure.open_port));
        }
        set_non_empty(body, "resource_group", &azure.resource_group);
        body.set_attribute("size", &azure.size);
        set_non_empty(body, "ssh_user", &azure.ssh_user);
        set_non_empty(body, "storage_type", &azure.storage_type);
        set_non_empty(body, "subnet", &azure.subnet);
        set_non_empty(body, "subnet_prefix", &azure.subnet_prefix);
        set_non_empty(body, "update_domain_count", &azure.update_domain_count);
        set_non_empty(body, "vnet", &azure.vnet);
    }
}

impl NodeProvider for AzureProvider {
    fn name(&self) -> &str {
        "azure"
    }

    fn set_credential_config(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let credentials = Self::credentials(config)?;

        let cred = body.append_block(AZURE_CREDENTIAL_CONFIG, &[]);
        cred.set_attribute(CLIENT_ID, &credentials.client_id);
        cred.set_attribute(CLIENT_SECRET, &credentials.client_secret);
        cred.set_attribute(SUBSCRIPTION_ID, &credentials.subscription_id);
        cred.set_attribute(ENVIRONMENT, &credentials.environment);

        Ok(())
    }

    fn set_node_template(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let credentials = Self::credentials(config)?;
        let azure = Self::azure_config(config)?;

        let block = body.append_block(AZURE_CONFIG, &[]);
        block.set_attribute(CLIENT_ID, &credentials.client_id);
        block.set_attribute(CLIENT_SECRET, &credentials.client_secret);
        block.set_attribute(SUBSCRIPTION_ID, &credentials.subscription_id);
        block.set_attribute(ENVIRONMENT, &credentials.environment);
        Self::set_vm_attributes(block, azure);

        Ok(())
    }

    fn set_machine_config(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let azure = Self::azure_config(config)?;

        let block = body.append_block(AZURE_CONFIG, &[]);
        Self::set_vm_attributes(block, azure);

        Ok(())
    }
}
