use super::{NodeProvider, ProviderError, set_non_empty};
use crate::config::{TerraformConfig, VsphereConfig, VsphereCredentials};
use crate::hcl::{Body, list_of_strings};

pub const VSPHERE_CONFIG: &str = "vsphere_config";
pub const VSPHERE_CREDENTIAL_CONFIG: &str = "vsphere_credential_config";

const USERNAME: &str = "username";
const PASSWORD: &str = "password";
const VCENTER: &str = "vcenter";
const VCENTER_PORT: &str = "vcenter_port";

pub struct VsphereProvider;

impl VsphereProvider {
    fn set_credentials(body: &mut Body, credentials: &VsphereCredentials) {
        body.set_attribute(USERNAME, &credentials.username);
        body.set_attribute(PASSWORD, &credentials.password);
        body.set_attribute(VCENTER, &credentials.vcenter);
        body.set_attribute(VCENTER_PORT, &credentials.vcenter_port);
    }

    fn set_vm_attributes(body: &mut Body, vsphere: &VsphereConfig) {
        set_non_empty(body, "clone_from", &vsphere.clone_from);
        set_non_empty(body, "cloud_config", &vsphere.cloud_config);
        set_non_empty(body, "content_library", &vsphere.content_library);
        body.set_attribute("cpu_count", &vsphere.cpu_count);
        body.set_attribute("creation_type", &vsphere.creation_type);
        body.set_attribute("datacenter", &vsphere.datacenter);
        set_non_empty(body, "datastore", &vsphere.datastore);
        set_non_empty(body, "datastore_cluster", &vsphere.datastore_cluster);
        body.set_attribute("disk_size", &vsphere.disk_size);
        set_non_empty(body, "folder", &vsphere.folder);
        set_non_empty(body, "hostsystem", &vsphere.hostsystem);
        body.set_attribute("memory_size", &vsphere.memory_size);
        body.set_attribute("network", list_of_strings(&vsphere.network));
        set_non_empty(body, "pool", &vsphere.pool);
        set_non_empty(body, "ssh_password", &vsphere.ssh_password);
        set_non_empty(body, "ssh_port", &vsphere.ssh_port);
        set_non_empty(body, "ssh_user", &vsphere.ssh_user);
        set_non_empty(body, "ssh_user_group", &vsphere.ssh_user_group);
    }
}

impl NodeProvider for VsphereProvider {
    fn name(&self) -> &str {
        "vsphere"
    }

    fn set_credential_config(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let credentials = config.vsphere_credentials()?;
        Self::set_credentials(body.append_block(VSPHERE_CREDENTIAL_CONFIG, &[]), credentials);
        Ok(())
    }

    fn set_node_template(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let credentials = config.vsphere_credentials()?;
        let vsphere = config.vsphere_config()?;

        let block = body.append_block(VSPHERE_CONFIG, &[]);
        Self::set_credentials(block, credentials);
        Self::set_vm_attributes(block, vsphere);

        Ok(())
    }

    fn set_machine_config(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let vsphere = config.vsphere_config()?;
        Self::set_vm_attributes(body.append_block(VSPHERE_CONFIG, &[]), vsphere);
        Ok(())
    }
}
