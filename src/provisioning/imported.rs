use crate::config::{ConfigError, Distribution, InfraProvider};
use crate::credentials::append_random_string;
use crate::defaults::{CLUSTER, DEPENDS_ON, NAME, NULL_RESOURCE, RESOURCE};
use crate::hcl::{Body, Value};
use crate::infra::aws::{self, InstanceOs};
use crate::infra::ssh::{self, SshTarget};
use crate::infra::{self, vsphere};

use super::custom::{node_user, resource_prefix};
use super::{GenerateContext, ProvisioningError, rbac, read_script};

const SERVERS: [&str; 3] = ["server1", "server2", "server3"];

/// Public and private addresses of the three server hosts, as template
/// expressions resolved at apply time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ServerAddresses {
    pub server_one_public: String,
    pub server_one_private: String,
    pub server_two_public: String,
    pub server_three_public: String,
}

/// Creates the three server hosts and returns their addresses.
fn provider_ip_addresses(
    root: &mut Body,
    ctx: &GenerateContext<'_>,
    names: &[String; 3],
) -> Result<ServerAddresses, ProvisioningError> {
    let terraform = &ctx.configs.terraform;
    let provider = terraform
        .provider
        .ok_or_else(|| ConfigError::Missing("terraform.provider".to_string()))?;

    match provider {
        InfraProvider::Aws => {
            let aws_config = terraform.aws_config()?;
            for name in names {
                aws::create_instance(
                    root,
                    aws_config,
                    name,
                    None,
                    InstanceOs::Linux,
                    &name.replace('_', "-"),
                );
                root.append_newline();
            }

            Ok(ServerAddresses {
                server_one_public: aws::instance_attribute(&names[0], "public_ip", false),
                server_one_private: aws::instance_attribute(&names[0], "private_ip", false),
                server_two_public: aws::instance_attribute(&names[1], "public_ip", false),
                server_three_public: aws::instance_attribute(&names[2], "public_ip", false),
            })
        }
        InfraProvider::Vsphere => {
            let vsphere_config = terraform.vsphere_config()?;
            vsphere::create_data_sources(root, vsphere_config);
            for name in names {
                vsphere::create_virtual_machine(root, vsphere_config, name, None)?;
                root.append_newline();
            }

            let server_one = vsphere::ip_address(&names[0], false);
            Ok(ServerAddresses {
                server_one_public: server_one.clone(),
                server_one_private: server_one,
                server_two_public: vsphere::ip_address(&names[1], false),
                server_three_public: vsphere::ip_address(&names[2], false),
            })
        }
    }
}

/// Imported RKE2/K3s cluster: three self-installed servers joined with a
/// shared token, then a `rancher2_cluster` whose registration manifest is
/// applied from server1.
pub(super) fn set_imported_rke2k3s(
    root: &mut Body,
    ctx: &GenerateContext<'_>,
) -> Result<(), ProvisioningError> {
    let terraform = &ctx.configs.terraform;
    let terratest = &ctx.configs.terratest;
    let cluster_name = ctx.cluster_name();
    let prefix = resource_prefix(ctx);
    let distribution = terraform.module.distribution();

    let init_script = read_script(ctx, &format!("{distribution}/init-server.sh"))?;
    let add_script = read_script(ctx, &format!("{distribution}/add-servers.sh"))?;

    infra::set_provider_block(root, terraform)?;
    root.append_newline();

    let names = SERVERS.map(|server| format!("{prefix}_{server}"));
    let addresses = provider_ip_addresses(root, ctx, &names)?;

    let user = node_user(ctx)?;
    let (os_user, os_group) = terraform
        .standalone
        .as_ref()
        .map(|s| (s.os_user.clone(), s.os_group.clone()))
        .unwrap_or_else(|| (user.to_string(), user.to_string()));
    let token = append_random_string("token");

    let args = |host_private: &str| {
        vec![
            os_user.clone(),
            os_group.clone(),
            terratest.kubernetes_version.clone(),
            host_private.to_string(),
            token.clone(),
        ]
    };

    let server_one_target = SshTarget::new(
        Value::template(&addresses.server_one_public),
        user,
        &terraform.private_key_path,
    );
    ssh::ssh_null_resource(
        root,
        &names[0],
        &server_one_target,
        ssh::script_commands(
            "init-server.sh",
            &init_script,
            &args(&addresses.server_one_private),
        ),
    );
    root.append_newline();

    for (name, host) in names[1..]
        .iter()
        .zip([&addresses.server_two_public, &addresses.server_three_public])
    {
        let target = SshTarget::new(Value::template(host), user, &terraform.private_key_path);
        let server = ssh::ssh_null_resource(
            root,
            name,
            &target,
            ssh::script_commands(
                "add-servers.sh",
                &add_script,
                &args(&addresses.server_one_private),
            ),
        );
        ssh::depends_on_null_resources(server, &[&names[0]]);
        root.append_newline();
    }

    let cluster = root.append_block(RESOURCE, &[CLUSTER, cluster_name]);
    cluster.set_attribute(NAME, cluster_name);
    cluster.set_attribute("description", format!("Imported {distribution} cluster"));
    root.append_newline();

    let import = ssh::ssh_null_resource(
        root,
        &format!("{prefix}_import"),
        &server_one_target,
        vec![Value::template(import_command(distribution, cluster_name))],
    );
    let mut depends_on: Vec<String> = names
        .iter()
        .map(|name| format!("{NULL_RESOURCE}.{name}"))
        .collect();
    depends_on.push(format!("{CLUSTER}.{cluster_name}"));
    import.set_attribute(DEPENDS_ON, Value::references(depends_on));
    root.append_newline();

    if let Some(role) = &terratest.rbac_role {
        let cluster = rbac::ClusterRef {
            resource: format!("{CLUSTER}.{cluster_name}"),
            id: Value::traversal(&[CLUSTER, cluster_name, "id"]),
        };
        rbac::set_rbac(root, ctx, role, &cluster);
    }

    tracing::debug!(cluster = %cluster_name, servers = names.len(), "added imported cluster hosts");
    Ok(())
}

fn import_command(distribution: Distribution, cluster_name: &str) -> String {
    let registration =
        format!("${{{CLUSTER}.{cluster_name}.cluster_registration_token[0].insecure_command}}");
    match distribution {
        Distribution::K3s => format!(
            "sudo bash -c 'export KUBECONFIG=/etc/rancher/k3s/k3s.yaml && {registration}'"
        ),
        _ => format!(
            "sudo bash -c 'export KUBECONFIG=/etc/rancher/rke2/rke2.yaml PATH=$PATH:/var/lib/rancher/rke2/bin && {registration}'"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TfpConfigs;
    use crate::defaults::AWS_INSTANCE;
    use crate::hcl::HclFile;
    use crate::provisioning::test_support;

    fn scripts_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for distribution in ["rke2", "k3s"] {
            let scripts = dir.path().join("scripts").join(distribution);
            std::fs::create_dir_all(&scripts).unwrap();
            std::fs::write(scripts.join("init-server.sh"), "#!/bin/bash\necho init $1\n").unwrap();
            std::fs::write(scripts.join("add-servers.sh"), "#!/bin/bash\necho add $1\n").unwrap();
        }
        dir
    }

    fn configs(module: &str, repo: &tempfile::TempDir) -> TfpConfigs {
        let mut configs = test_support::configs(module, "kubernetesVersion: v1.30.4+k3s1");
        configs.terraform.provider = Some(InfraProvider::Aws);
        configs.terraform.resource_prefix = "tfp".to_string();
        configs.terratest.path_to_repo = repo.path().display().to_string();
        configs
    }

    fn generate(configs: &TfpConfigs) -> Result<Body, ProvisioningError> {
        let creds = test_support::credentials();
        let ctx = GenerateContext::new(configs, &creds);
        let mut root = Body::default();
        set_imported_rke2k3s(&mut root, &ctx)?;
        Ok(root)
    }

    #[test]
    fn test_three_servers_and_import() {
        let repo = scripts_repo();
        let root = generate(&configs("imported_k3s", &repo)).unwrap();

        for server in ["tfp_server1", "tfp_server2", "tfp_server3"] {
            assert!(root.find_block(RESOURCE, &[AWS_INSTANCE, server]).is_some());
            assert!(root.find_block(RESOURCE, &[NULL_RESOURCE, server]).is_some());
        }

        let server_two = root
            .find_block(RESOURCE, &[NULL_RESOURCE, "tfp_server2"])
            .unwrap()
            .body();
        assert_eq!(
            server_two.attribute(DEPENDS_ON),
            Some(&Value::references(["null_resource.tfp_server1"]))
        );

        let import = root
            .find_block(RESOURCE, &[NULL_RESOURCE, "tfp_import"])
            .unwrap()
            .body();
        assert_eq!(
            import.attribute(DEPENDS_ON),
            Some(&Value::references([
                "null_resource.tfp_server1",
                "null_resource.tfp_server2",
                "null_resource.tfp_server3",
                "rancher2_cluster.tfp-abcde",
            ]))
        );
    }

    #[test]
    fn test_init_server_uses_private_ip_and_token() {
        let repo = scripts_repo();
        let root = generate(&configs("imported_rke2", &repo)).unwrap();
        let out = HclFile::from(root).to_string();

        assert!(out.contains("printf '#!/bin/bash\\necho init $1\\n' > /tmp/init-server.sh"));
        assert!(out.contains("/tmp/init-server.sh ubuntu ubuntu v1.30.4+k3s1 ${aws_instance.tfp_server1.private_ip} token-"));
        assert!(out.contains("PATH=$PATH:/var/lib/rancher/rke2/bin"));
    }

    #[test]
    fn test_missing_script() {
        let repo = tempfile::tempdir().unwrap();
        let err = generate(&configs("imported_rke2", &repo)).unwrap_err();
        assert!(matches!(err, ProvisioningError::Script { path, .. } if path.ends_with("init-server.sh")));
    }

    #[test]
    fn test_import_command_by_distribution() {
        let k3s = import_command(Distribution::K3s, "c1");
        assert!(k3s.contains("/etc/rancher/k3s/k3s.yaml"));
        assert!(k3s.contains("${rancher2_cluster.c1.cluster_registration_token[0].insecure_command}"));
        let rke2 = import_command(Distribution::Rke2, "c1");
        assert!(rke2.contains("/etc/rancher/rke2/rke2.yaml"));
    }
}
