use crate::config::{StandaloneRegistry, TerraformConfig};
use crate::hcl::{Body, Value};
use crate::infra::ssh::{self, SshTarget};
use crate::provisioning::read_repo_script;

use super::sanity::REGISTRY;
use super::{ServerAddresses, StandaloneError};

/// Name of the `null_resource` that populates the registry.
pub(super) const REGISTRY_RESOURCE: &str = REGISTRY;

const AUTH_SCRIPT: &str = "auth-registry.sh";
const NON_AUTH_SCRIPT: &str = "non-auth-registry.sh";

/// Runs a registry on the registry host and mirrors the Rancher images
/// for `rancherTagVersion` into it.
pub(super) fn set_registry(
    root: &mut Body,
    terraform: &TerraformConfig,
    registry: &StandaloneRegistry,
    path_to_repo: &str,
    addresses: &ServerAddresses,
) -> Result<(), StandaloneError> {
    let standalone = terraform.standalone()?;
    let aws = terraform.aws_config()?;
    let Some(host) = addresses.registry_public_dns.as_deref() else {
        return Ok(());
    };

    let script_name = if registry.authenticated {
        AUTH_SCRIPT
    } else {
        NON_AUTH_SCRIPT
    };
    let script = read_repo_script(path_to_repo, &format!("registries/{script_name}"))?;

    let mut args = Vec::new();
    if registry.authenticated {
        args.push(registry.registry_username.clone());
        args.push(registry.registry_password.clone());
    }
    args.extend([
        registry.registry_name.clone(),
        host.to_string(),
        standalone.rancher_tag_version.clone(),
        registry.assets_path.clone(),
        aws.aws_user.clone(),
        standalone.rancher_image.clone(),
    ]);
    if !standalone.rancher_agent_image.is_empty() {
        args.push(standalone.rancher_agent_image.clone());
    }

    let target = SshTarget::new(Value::string(host), &aws.aws_user, &terraform.private_key_path);
    ssh::ssh_null_resource(
        root,
        REGISTRY_RESOURCE,
        &target,
        ssh::script_commands(script_name, &script, &args),
    );
    root.append_newline();

    tracing::debug!(
        registry = %registry.registry_name,
        authenticated = registry.authenticated,
        "added registry resource"
    );
    Ok(())
}
