use crate::config::TerraformConfig;
use crate::defaults::{AWS_INSTANCE, LOCALS, OUTPUT, REQUIRED_PROVIDERS, TERRAFORM};
use crate::hcl::{Body, HclFile, Value};
use crate::infra::aws::{self, InstanceOs};

use super::{
    REGISTRY_PUBLIC_DNS, SERVER_ONE_PRIVATE_IP, SERVER_ONE_PUBLIC_DNS, SERVER_THREE_PUBLIC_DNS,
    SERVER_TWO_PUBLIC_DNS, StandaloneError, loadbalancer,
};

pub(super) const SERVERS: [&str; 3] = ["rke2_server1", "rke2_server2", "rke2_server3"];
pub(super) const REGISTRY: &str = "registry";

/// Instance IDs keyed by server name, iterated by the target group
/// attachments.
pub(super) const INSTANCE_IDS_LOCAL: &str = "rke2_instance_ids";

/// First stage: aws provider, server hosts, load balancers and the outputs
/// the later stages read.
pub(super) fn sanity_file(terraform: &TerraformConfig) -> Result<HclFile, StandaloneError> {
    let aws_config = terraform.aws_config()?;
    let mut file = HclFile::new();
    let root = file.body_mut();

    let required = root
        .append_block(TERRAFORM, &[])
        .append_block(REQUIRED_PROVIDERS, &[]);
    aws::set_required_provider(required, terraform.aws_version());
    root.append_newline();

    aws::set_provider_block(root, terraform)?;
    root.append_newline();

    root.append_block(LOCALS, &[]).set_attribute(
        INSTANCE_IDS_LOCAL,
        Value::object(
            SERVERS.map(|server| (server, Value::traversal(&[AWS_INSTANCE, server, "id"]))),
        ),
    );
    root.append_newline();

    for server in SERVERS {
        let tag = format!("{}-{}", terraform.resource_prefix, server.replace('_', "-"));
        aws::create_instance(root, aws_config, server, None, InstanceOs::Linux, &tag);
        root.append_newline();
    }

    if terraform.standalone_registry.is_some() {
        let tag = format!("{}-{REGISTRY}", terraform.resource_prefix);
        aws::create_instance(root, aws_config, REGISTRY, None, InstanceOs::Linux, &tag);
        root.append_newline();
    }

    loadbalancer::set_load_balancers(root, terraform)?;

    set_output(root, SERVER_ONE_PUBLIC_DNS, SERVERS[0], "public_dns");
    set_output(root, SERVER_ONE_PRIVATE_IP, SERVERS[0], "private_ip");
    set_output(root, SERVER_TWO_PUBLIC_DNS, SERVERS[1], "public_dns");
    set_output(root, SERVER_THREE_PUBLIC_DNS, SERVERS[2], "public_dns");
    if terraform.standalone_registry.is_some() {
        set_output(root, REGISTRY_PUBLIC_DNS, REGISTRY, "public_dns");
    }

    Ok(file)
}

fn set_output(root: &mut Body, name: &str, instance: &str, attribute: &str) {
    root.append_block(OUTPUT, &[name])
        .set_attribute("value", Value::traversal(&[AWS_INSTANCE, instance, attribute]));
    root.append_newline();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StandaloneRegistry;
    use crate::defaults::RESOURCE;

    fn terraform() -> TerraformConfig {
        let mut configs = crate::providers::test_support::all_providers_config();
        configs.terraform.resource_prefix = "tfp".to_string();
        configs.terraform
    }

    #[test]
    fn test_servers_locals_and_outputs() {
        let file = sanity_file(&terraform()).unwrap();
        let root = file.body();

        for server in SERVERS {
            assert!(root.find_block(RESOURCE, &[AWS_INSTANCE, server]).is_some());
        }
        assert!(root.find_block(RESOURCE, &[AWS_INSTANCE, REGISTRY]).is_none());
        assert!(root.find_block(OUTPUT, &[REGISTRY_PUBLIC_DNS]).is_none());

        let locals = root.find_block(LOCALS, &[]).unwrap().body();
        assert_eq!(
            locals.attribute(INSTANCE_IDS_LOCAL),
            Some(&Value::object([
                ("rke2_server1", Value::expr("aws_instance.rke2_server1.id")),
                ("rke2_server2", Value::expr("aws_instance.rke2_server2.id")),
                ("rke2_server3", Value::expr("aws_instance.rke2_server3.id")),
            ]))
        );

        let private_ip = root.find_block(OUTPUT, &[SERVER_ONE_PRIVATE_IP]).unwrap().body();
        assert_eq!(
            private_ip.attribute("value"),
            Some(&Value::expr("aws_instance.rke2_server1.private_ip"))
        );

        let out = file.to_string();
        assert!(out.contains(r#"Name = "tfp-rke2-server2""#));
        assert!(out.starts_with("terraform {\n  required_providers {\n    aws = {"));
    }

    #[test]
    fn test_registry_host() {
        let mut terraform = terraform();
        terraform.standalone_registry = Some(StandaloneRegistry::default());

        let file = sanity_file(&terraform).unwrap();
        assert!(file.body().find_block(RESOURCE, &[AWS_INSTANCE, REGISTRY]).is_some());
        assert!(file.body().find_block(OUTPUT, &[REGISTRY_PUBLIC_DNS]).is_some());
    }

    #[test]
    fn test_missing_aws_config() {
        let mut terraform = terraform();
        terraform.aws_config = None;
        assert!(matches!(
            sanity_file(&terraform),
            Err(StandaloneError::Config(_))
        ));
    }
}
