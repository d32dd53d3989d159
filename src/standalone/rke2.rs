use crate::config::TerraformConfig;
use crate::credentials::append_random_string;
use crate::hcl::{Body, Value};
use crate::infra::ssh::{self, SshTarget};
use crate::provisioning::read_repo_script;

use super::registries::REGISTRY_RESOURCE;
use super::sanity::SERVERS;
use super::{ServerAddresses, StandaloneError};

const INIT_SCRIPT: &str = "init-server.sh";
const ADD_SCRIPT: &str = "add-servers.sh";

/// HA RKE2 cluster on the three hosts. Server1 initialises the cluster and
/// servers 2 and 3 join it with the same random token. When a registry is
/// configured the servers pull through it and wait for it to be populated.
pub(super) fn set_rke2_servers(
    root: &mut Body,
    terraform: &TerraformConfig,
    path_to_repo: &str,
    addresses: &ServerAddresses,
) -> Result<(), StandaloneError> {
    let standalone = terraform.standalone()?;
    let aws = terraform.aws_config()?;

    let init_script = read_repo_script(path_to_repo, &format!("rke2/{INIT_SCRIPT}"))?;
    let add_script = read_repo_script(path_to_repo, &format!("rke2/{ADD_SCRIPT}"))?;

    let token = append_random_string("token");
    let mut args = vec![
        standalone.os_user.clone(),
        standalone.os_group.clone(),
        standalone.rke2_version.clone(),
        addresses.server_one_private_ip.clone(),
        token,
    ];
    if let (Some(registry), Some(host)) = (
        terraform.standalone_registry.as_ref(),
        addresses.registry_public_dns.as_ref(),
    ) {
        args.push(host.clone());
        if registry.authenticated {
            args.push(registry.registry_username.clone());
            args.push(registry.registry_password.clone());
        }
    }

    for (index, (server, host)) in SERVERS.iter().zip(addresses.public_dns()).enumerate() {
        let target = SshTarget::new(Value::string(host), &aws.aws_user, &terraform.private_key_path);
        let (script_name, script) = if index == 0 {
            (INIT_SCRIPT, &init_script)
        } else {
            (ADD_SCRIPT, &add_script)
        };

        let resource = ssh::ssh_null_resource(
            root,
            server,
            &target,
            ssh::script_commands(script_name, script, &args),
        );

        if index == 0 {
            if addresses.registry_public_dns.is_some() {
                ssh::depends_on_null_resources(resource, &[REGISTRY_RESOURCE]);
            }
        } else {
            ssh::depends_on_null_resources(resource, &[SERVERS[0]]);
        }
        root.append_newline();
    }

    tracing::debug!(servers = SERVERS.len(), "added rke2 server resources");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StandaloneRegistry;
    use crate::defaults::{DEPENDS_ON, NULL_RESOURCE, RESOURCE};
    use crate::hcl::HclFile;
    use crate::standalone::test_support;
    use crate::terraform::Outputs;

    fn addresses(with_registry: bool) -> ServerAddresses {
        let outputs = Outputs::parse(test_support::OUTPUTS).unwrap();
        ServerAddresses::from_outputs(&outputs, with_registry).unwrap()
    }

    #[test]
    fn test_init_and_join() {
        let repo = test_support::scripts_repo();
        let configs = test_support::configs(repo.path());
        let mut root = Body::default();
        set_rke2_servers(&mut root, &configs.terraform, &configs.terratest.path_to_repo, &addresses(false)).unwrap();

        let server_one = root.find_block(RESOURCE, &[NULL_RESOURCE, "rke2_server1"]).unwrap().body();
        assert!(server_one.attribute(DEPENDS_ON).is_none());

        for server in ["rke2_server2", "rke2_server3"] {
            let body = root.find_block(RESOURCE, &[NULL_RESOURCE, server]).unwrap().body();
            assert_eq!(
                body.attribute(DEPENDS_ON),
                Some(&Value::references(["null_resource.rke2_server1"]))
            );
        }

        let out = HclFile::from(root).to_string();
        assert!(out.contains(r#""ec2-two.compute.amazonaws.com""#));
        assert!(out.contains("/tmp/init-server.sh ubuntu ubuntu v1.30.4+rke2r1 10.0.0.11 token-"));
        assert_eq!(out.matches("/tmp/add-servers.sh ubuntu").count(), 2);
    }

    #[test]
    fn test_shared_token() {
        let repo = test_support::scripts_repo();
        let configs = test_support::configs(repo.path());
        let mut root = Body::default();
        set_rke2_servers(&mut root, &configs.terraform, &configs.terratest.path_to_repo, &addresses(false)).unwrap();

        let out = HclFile::from(root).to_string();
        let tokens: Vec<&str> = out
            .split_whitespace()
            .filter(|word| word.starts_with("token-"))
            .collect();
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| *t == tokens[0]));
    }

    #[test]
    fn test_authenticated_registry_args() {
        let repo = test_support::scripts_repo();
        let mut configs = test_support::configs(repo.path());
        configs.terraform.standalone_registry = Some(StandaloneRegistry {
            authenticated: true,
            registry_username: "reguser".to_string(),
            registry_password: "regpass".to_string(),
            ..Default::default()
        });
        let mut root = Body::default();
        set_rke2_servers(&mut root, &configs.terraform, &configs.terratest.path_to_repo, &addresses(true)).unwrap();

        let server_one = root.find_block(RESOURCE, &[NULL_RESOURCE, "rke2_server1"]).unwrap().body();
        assert_eq!(
            server_one.attribute(DEPENDS_ON),
            Some(&Value::references(["null_resource.registry"]))
        );

        let out = HclFile::from(root).to_string();
        assert!(out.contains("ec2-registry.compute.amazonaws.com reguser regpass || true"));
    }

    #[test]
    fn test_missing_standalone_section() {
        let repo = test_support::scripts_repo();
        let mut configs = test_support::configs(repo.path());
        configs.terraform.standalone = None;
        let mut root = Body::default();
        let err = set_rke2_servers(&mut root, &configs.terraform, "", &addresses(false)).unwrap_err();
        assert!(matches!(err, StandaloneError::Config(_)));
    }
}
