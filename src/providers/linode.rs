use super::{NodeProvider, ProviderError, missing, set_non_empty};
use crate::config::{LinodeConfig, TerraformConfig};
use crate::hcl::Body;

pub const LINODE_CONFIG: &str = "linode_config";
pub const LINODE_CREDENTIAL_CONFIG: &str = "linode_credential_config";

const TOKEN: &str = "token";

pub struct LinodeProvider;

impl LinodeProvider {
    fn token(config: &TerraformConfig) -> Result<&str, ProviderError> {
        config
            .linode_credentials
            .as_ref()
            .map(|c| c.linode_token.as_str())
            .ok_or_else(|| missing("linodeCredentials"))
    }

    fn linode_config(config: &TerraformConfig) -> Result<&LinodeConfig, ProviderError> {
        config
            .linode_config
            .as_ref()
            .ok_or_else(|| missing("linodeConfig"))
    }

    fn set_vm_attributes(body: &mut Body, linode: &LinodeConfig) {
        body.set_attribute("image", &linode.linode_image);
        body.set_attribute("region", &linode.region);
        body.set_attribute("root_pass", &linode.linode_root_pass);
        body.set_attribute("instance_type", &linode.instance_type);
        set_non_empty(body, "ssh_user", &linode.ssh_user);
        set_non_empty(body, "tags", &linode.tags);
        set_non_empty(body, "swap_size", &linode.swap_size);
        body.set_attribute("create_private_ip", linode.private_ip);
    }
}

impl NodeProvider for LinodeProvider {
    fn name(&self) -> &str {
        "linode"
    }

    fn set_credential_config(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let token = Self::token(config)?;
        body.append_block(LINODE_CREDENTIAL_CONFIG, &[])
            .set_attribute(TOKEN, token);
        Ok(())
    }

    fn set_node_template(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let token = Self::token(config)?;
        let linode = Self::linode_config(config)?;

        let block = body.append_block(LINODE_CONFIG, &[]);
        block.set_attribute(TOKEN, token);
        Self::set_vm_attributes(block, linode);

        Ok(())
    }

    fn set_machine_config(
        &self,
        body: &mut Body,
        config: &TerraformConfig,
    ) -> Result<(), ProviderError> {
        let linode = Self::linode_config(config)?;
        Self::set_vm_attributes(body.append_block(LINODE_CONFIG, &[]), linode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hcl::Value;
    use crate::providers::test_support::all_providers_config;

    #[test]
    fn test_node_template_has_token() {
        let configs = all_providers_config();
        let mut body = Body::default();
        LinodeProvider
            .set_node_template(&mut body, &configs.terraform)
            .unwrap();

        let block = body.find_block(LINODE_CONFIG, &[]).unwrap().body();
        assert_eq!(block.attribute(TOKEN), Some(&Value::string("linode-secret")));
        assert_eq!(
            block.attribute("instance_type"),
            Some(&Value::string("g6-standard-8"))
        );
        assert_eq!(block.attribute("create_private_ip"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_machine_config_has_no_token() {
        let configs = all_providers_config();
        let mut body = Body::default();
        LinodeProvider
            .set_machine_config(&mut body, &configs.terraform)
            .unwrap();

        let block = body.find_block(LINODE_CONFIG, &[]).unwrap().body();
        assert!(block.attribute(TOKEN).is_none());
        assert_eq!(block.attribute("region"), Some(&Value::string("us-west")));
    }

    #[test]
    fn test_credential_config() {
        let configs = all_providers_config();
        let mut body = Body::default();
        LinodeProvider
            .set_credential_config(&mut body, &configs.terraform)
            .unwrap();

        assert!(body.find_block(LINODE_CREDENTIAL_CONFIG, &[]).is_some());
    }
}
