use crate::config::{ConfigError, InfraProvider};
use crate::defaults::{CLUSTER_V2, COUNT, DEPENDS_ON, RESOURCE, RKE_CONFIG};
use crate::hcl::{Body, Value};
use crate::infra::aws::{self, InstanceOs};
use crate::infra::ssh::{self, SshTarget};
use crate::infra::{self, vsphere};

use super::rke2k3s::{cluster_v2_ref, set_cluster_v2_attributes, set_rke_config_extras};
use super::{GenerateContext, ProvisioningError, rbac, validate_nodepools};

const WINDOWS_POOL: &str = "windows";

/// Custom RKE2/K3s cluster: hosts created directly on AWS or vSphere, a
/// pool-less `rancher2_cluster_v2`, and one registration `null_resource`
/// per pool that runs the node command with the pool's role flags.
pub(super) fn set_custom_rke2k3s(
    root: &mut Body,
    ctx: &GenerateContext<'_>,
) -> Result<(), ProvisioningError> {
    let terraform = &ctx.configs.terraform;
    let terratest = &ctx.configs.terratest;
    let cluster_name = ctx.cluster_name();
    let prefix = resource_prefix(ctx);

    validate_nodepools(&terratest.nodepools)?;

    infra::set_provider_block(root, terraform)?;
    root.append_newline();

    let provider = terraform
        .provider
        .ok_or_else(|| ConfigError::Missing("terraform.provider".to_string()))?;

    if provider == InfraProvider::Vsphere {
        vsphere::create_data_sources(root, terraform.vsphere_config()?);
    }

    let mut hosts = Vec::with_capacity(terratest.nodepools.len());
    for (index, pool) in terratest.nodepools.iter().enumerate() {
        let name = format!("{prefix}_pool{index}");
        let host = match provider {
            InfraProvider::Aws => {
                aws::create_instance(
                    root,
                    terraform.aws_config()?,
                    &name,
                    Some(pool.quantity),
                    InstanceOs::Linux,
                    &format!("{prefix}-pool{index}"),
                );
                aws::instance_attribute(&name, "public_ip", true)
            }
            InfraProvider::Vsphere => {
                vsphere::create_virtual_machine(
                    root,
                    terraform.vsphere_config()?,
                    &name,
                    Some(pool.quantity),
                )?;
                vsphere::ip_address(&name, true)
            }
        };
        root.append_newline();
        hosts.push((name, host, pool));
    }

    let windows_host = if terraform.module.is_windows() {
        let name = format!("{prefix}_{WINDOWS_POOL}");
        aws::create_instance(
            root,
            terraform.aws_config()?,
            &name,
            Some(1),
            InstanceOs::Windows,
            &format!("{prefix}-{WINDOWS_POOL}"),
        );
        root.append_newline();
        Some((name.clone(), aws::instance_attribute(&name, "public_ip", true)))
    } else {
        None
    };

    let cluster = root.append_block(RESOURCE, &[CLUSTER_V2, cluster_name]);
    set_cluster_v2_attributes(cluster, ctx);
    set_rke_config_extras(cluster.append_block(RKE_CONFIG, &[]), ctx);
    root.append_newline();

    let ssh_user = node_user(ctx)?;
    let cluster_resource = format!("{CLUSTER_V2}.{cluster_name}");
    let token = format!("{cluster_resource}.cluster_registration_token[0]");

    for (name, host, pool) in &hosts {
        let target = SshTarget::new(Value::template(host), ssh_user, &terraform.private_key_path);
        let command = format!("sudo ${{{token}.insecure_node_command}} {}", pool.role_flags());

        let registration = ssh::ssh_null_resource(
            root,
            &format!("register_{name}"),
            &target,
            vec![Value::template(command)],
        );
        registration.set_attribute(COUNT, pool.quantity);
        registration.set_attribute(DEPENDS_ON, Value::references([cluster_resource.clone()]));
        root.append_newline();
    }

    if let Some((name, host)) = windows_host {
        let aws_config = terraform.aws_config()?;
        let target = SshTarget::new(
            Value::template(host),
            &aws_config.windows_user,
            &terraform.private_key_path,
        )
        .windows();
        let command = format!("powershell.exe ${{{token}.insecure_windows_node_command}} --worker");

        let registration = ssh::ssh_null_resource(
            root,
            &format!("register_{name}"),
            &target,
            vec![Value::template(command)],
        );
        registration.set_attribute(COUNT, 1);
        // Windows workers join after the Linux control plane is up.
        let mut depends_on = vec![cluster_resource.clone()];
        depends_on.extend(
            hosts
                .iter()
                .map(|(linux, _, _)| format!("null_resource.register_{linux}")),
        );
        registration.set_attribute(DEPENDS_ON, Value::references(depends_on));
        root.append_newline();
    }

    if let Some(role) = &terratest.rbac_role {
        rbac::set_rbac(root, ctx, role, &cluster_v2_ref(cluster_name));
    }

    Ok(())
}

/// Prefix for infrastructure resource labels, falling back to the cluster
/// name.
pub(super) fn resource_prefix(ctx: &GenerateContext<'_>) -> String {
    let prefix = &ctx.configs.terraform.resource_prefix;
    if prefix.is_empty() {
        ctx.cluster_name().replace('-', "_")
    } else {
        prefix.clone()
    }
}

/// SSH login for Linux hosts on the configured infrastructure provider.
pub(super) fn node_user<'a>(ctx: &GenerateContext<'a>) -> Result<&'a str, ProvisioningError> {
    let terraform = &ctx.configs.terraform;
    match terraform.provider {
        Some(InfraProvider::Vsphere) => Ok(&terraform.vsphere_config()?.ssh_user),
        _ => Ok(&terraform.aws_config()?.aws_user),
    }
}
