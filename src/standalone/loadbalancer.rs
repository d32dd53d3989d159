use crate::config::{ConfigError, TerraformConfig};
use crate::defaults::{
    INTERNAL_LOAD_BALANCER, LISTENER, LOAD_BALANCER, NAME, RESOURCE, SECURITY_GROUPS, SUBNETS,
    TARGET_GROUP, TARGET_GROUP_ATTACHMENT,
};
use crate::hcl::{Body, Value, list_of_strings};

use super::sanity::INSTANCE_IDS_LOCAL;

const EXTERNAL_PORTS: [i64; 4] = [80, 443, 6443, 9345];
const INTERNAL_PORTS: [i64; 2] = [6443, 9345];

#[derive(Debug, Clone, Copy)]
struct Balancer {
    resource: &'static str,
    internal: bool,
}

const EXTERNAL: Balancer = Balancer {
    resource: LOAD_BALANCER,
    internal: false,
};
const INTERNAL: Balancer = Balancer {
    resource: INTERNAL_LOAD_BALANCER,
    internal: true,
};

impl Balancer {
    fn name(&self, prefix: &str) -> String {
        if self.internal {
            format!("{prefix}-internal")
        } else {
            prefix.to_string()
        }
    }

    fn suffix(&self, port: i64) -> String {
        if self.internal {
            format!("internal_{port}")
        } else {
            port.to_string()
        }
    }

    fn target_group(&self, port: i64) -> String {
        format!("{TARGET_GROUP}_{}", self.suffix(port))
    }
}

/// Network load balancers in front of the server hosts: an external one
/// for HTTP(S), the API and supervisor ports, and an internal one for the
/// API and supervisor ports only.
pub(super) fn set_load_balancers(
    root: &mut Body,
    terraform: &TerraformConfig,
) -> Result<(), ConfigError> {
    let aws = terraform.aws_config()?;
    let prefix = &terraform.resource_prefix;

    for (balancer, ports) in [(EXTERNAL, &EXTERNAL_PORTS[..]), (INTERNAL, &INTERNAL_PORTS[..])] {
        let lb = root.append_block(RESOURCE, &[LOAD_BALANCER, balancer.resource]);
        lb.set_attribute("internal", balancer.internal);
        lb.set_attribute("load_balancer_type", "network");
        lb.set_attribute("ip_address_type", &aws.load_balancer_type);
        lb.set_attribute(SECURITY_GROUPS, list_of_strings(&aws.aws_security_groups));
        lb.set_attribute(SUBNETS, list_of_strings(std::slice::from_ref(&aws.aws_subnet_id)));
        lb.set_attribute(NAME, balancer.name(prefix));
        root.append_newline();

        for &port in ports {
            set_target_group(root, balancer, port, &aws.aws_vpc_id, prefix);
            set_attachment(root, balancer, port);
            set_listener(root, balancer, port);
        }
    }

    Ok(())
}

fn set_target_group(root: &mut Body, balancer: Balancer, port: i64, vpc_id: &str, prefix: &str) {
    let name = balancer.target_group(port);
    let group = root.append_block(RESOURCE, &[TARGET_GROUP, &name]);
    group.set_attribute("port", port);
    group.set_attribute("protocol", "TCP");
    group.set_attribute("target_type", "instance");
    group.set_attribute("vpc_id", vpc_id);
    group.set_attribute(NAME, format!("{}-tg-{port}", balancer.name(prefix)));

    let health = group.append_block("health_check", &[]);
    health.set_attribute("protocol", "TCP");
    health.set_attribute("port", "traffic-port");
    health.set_attribute("interval", 10i64);
    health.set_attribute("healthy_threshold", 3i64);
    health.set_attribute("unhealthy_threshold", 3i64);
    root.append_newline();
}

fn set_attachment(root: &mut Body, balancer: Balancer, port: i64) {
    let group = balancer.target_group(port);
    let name = format!("attach_{group}");
    let attachment = root.append_block(RESOURCE, &[TARGET_GROUP_ATTACHMENT, &name]);
    attachment.set_attribute("for_each", Value::expr(format!("local.{INSTANCE_IDS_LOCAL}")));
    attachment.set_attribute("target_group_arn", Value::traversal(&[TARGET_GROUP, &group, "arn"]));
    attachment.set_attribute("target_id", Value::expr("each.value"));
    attachment.set_attribute("port", port);
    root.append_newline();
}

fn set_listener(root: &mut Body, balancer: Balancer, port: i64) {
    let group = balancer.target_group(port);
    let name = format!("{LISTENER}_{}", balancer.suffix(port));
    let listener = root.append_block(RESOURCE, &[LISTENER, &name]);
    listener.set_attribute(
        "load_balancer_arn",
        Value::traversal(&[LOAD_BALANCER, balancer.resource, "arn"]),
    );
    listener.set_attribute("port", port);
    listener.set_attribute("protocol", "TCP");

    let action = listener.append_block("default_action", &[]);
    action.set_attribute("type", "forward");
    action.set_attribute("target_group_arn", Value::traversal(&[TARGET_GROUP, &group, "arn"]));
    root.append_newline();
}
