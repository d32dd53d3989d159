use crate::config::TerraformConfig;
use crate::hcl::{Body, Value};
use crate::infra::ssh::{self, SshTarget};
use crate::provisioning::read_repo_script;

use super::sanity::SERVERS;
use super::{ServerAddresses, StandaloneError};

pub(super) const INSTALL_RANCHER: &str = "install_rancher";
const SETUP_SCRIPT: &str = "setup.sh";

/// Installs cert-manager and Rancher with Helm from server1 once all three
/// servers have joined.
pub(super) fn set_rancher(
    root: &mut Body,
    terraform: &TerraformConfig,
    path_to_repo: &str,
    addresses: &ServerAddresses,
) -> Result<(), StandaloneError> {
    let standalone = terraform.standalone()?;
    let aws = terraform.aws_config()?;
    let script = read_repo_script(path_to_repo, &format!("rancher/{SETUP_SCRIPT}"))?;

    let mut args = vec![
        standalone.rancher_chart_repository.clone(),
        standalone.rancher_hostname.clone(),
        standalone.bootstrap_password.clone(),
        standalone.rancher_tag_version.clone(),
        standalone.rancher_image.clone(),
    ];
    if !standalone.rancher_agent_image.is_empty() {
        args.push(standalone.rancher_agent_image.clone());
    }

    let target = SshTarget::new(
        Value::string(&addresses.server_one_public_dns),
        &aws.aws_user,
        &terraform.private_key_path,
    );
    let install = ssh::ssh_null_resource(
        root,
        INSTALL_RANCHER,
        &target,
        ssh::script_commands(SETUP_SCRIPT, &script, &args),
    );
    ssh::depends_on_null_resources(install, &SERVERS);
    root.append_newline();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{DEPENDS_ON, NULL_RESOURCE, RESOURCE};
    use crate::hcl::HclFile;
    use crate::standalone::test_support;
    use crate::terraform::Outputs;

    #[test]
    fn test_install_after_servers() {
        let repo = test_support::scripts_repo();
        let configs = test_support::configs(repo.path());
        let outputs = Outputs::parse(test_support::OUTPUTS).unwrap();
        let addresses = ServerAddresses::from_outputs(&outputs, false).unwrap();

        let mut root = Body::default();
        set_rancher(&mut root, &configs.terraform, &configs.terratest.path_to_repo, &addresses).unwrap();

        let install = root
            .find_block(RESOURCE, &[NULL_RESOURCE, INSTALL_RANCHER])
            .unwrap()
            .body();
        assert_eq!(
            install.attribute(DEPENDS_ON),
            Some(&Value::references([
                "null_resource.rke2_server1",
                "null_resource.rke2_server2",
                "null_resource.rke2_server3",
            ]))
        );

        let out = HclFile::from(root).to_string();
        assert!(out.contains("\"ec2-one.compute.amazonaws.com\""));
        assert!(out.contains(
            "/tmp/setup.sh https://releases.rancher.com/server-charts/latest rancher.example.com admin-pass v2.9.2 rancher/rancher || true"
        ));
    }

    #[test]
    fn test_missing_setup_script() {
        let repo = tempfile::tempdir().unwrap();
        let configs = test_support::configs(repo.path());
        let outputs = Outputs::parse(test_support::OUTPUTS).unwrap();
        let addresses = ServerAddresses::from_outputs(&outputs, false).unwrap();

        let mut root = Body::default();
        let err = set_rancher(&mut root, &configs.terraform, &configs.terratest.path_to_repo, &addresses)
            .unwrap_err();
        assert!(matches!(err, StandaloneError::Provisioning(_)));
        assert!(root.is_empty());
    }
}
