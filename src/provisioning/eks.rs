use crate::config::Nodepool;
use crate::defaults::{
    CLOUD_CREDENTIAL, CLOUD_CREDENTIAL_ID, CLUSTER, KUBERNETES_VERSION, NAME, REGION, RESOURCE,
    SECURITY_GROUPS, SUBNETS,
};
use crate::hcl::{Body, Value, list_of_strings};
use crate::providers::{self, NodeProvider};

use super::rbac::{self, ClusterRef};
use super::{GenerateContext, ProvisioningError};

const EKS_CONFIG: &str = "eks_config_v2";
const NODE_GROUPS: &str = "node_groups";

/// Sizes must be positive and ordered `min <= desired <= max`.
pub fn validate_eks_nodepool(index: usize, pool: &Nodepool) -> Result<(), ProvisioningError> {
    let invalid = |reason: String| ProvisioningError::InvalidNodepool { index, reason };

    if pool.instance_type.is_empty() {
        return Err(invalid("instanceType is required".to_string()));
    }
    for (field, value) in [
        ("diskSize", pool.disk_size),
        ("desiredSize", pool.desired_size),
        ("maxSize", pool.max_size),
        ("minSize", pool.min_size),
    ] {
        if value < 1 {
            return Err(invalid(format!("{field} must be positive, got {value}")));
        }
    }
    if pool.min_size > pool.desired_size || pool.desired_size > pool.max_size {
        return Err(invalid(format!(
            "sizes must satisfy min <= desired <= max, got {} <= {} <= {}",
            pool.min_size, pool.desired_size, pool.max_size
        )));
    }

    Ok(())
}

/// Hosted EKS cluster with one node group per configured pool.
pub(super) fn set_eks(root: &mut Body, ctx: &GenerateContext<'_>) -> Result<(), ProvisioningError> {
    let terraform = &ctx.configs.terraform;
    let terratest = &ctx.configs.terratest;
    let cluster_name = ctx.cluster_name();
    let aws = terraform.aws_config()?;

    if terratest.nodepools.is_empty() {
        return Err(ProvisioningError::NoNodepools);
    }
    for (index, pool) in terratest.nodepools.iter().enumerate() {
        validate_eks_nodepool(index, pool)?;
    }

    let credential = root.append_block(RESOURCE, &[CLOUD_CREDENTIAL, cluster_name]);
    ctx.set_standard_user_provider(credential);
    credential.set_attribute(NAME, cluster_name);
    providers::aws::AwsProvider.set_credential_config(credential, terraform)?;
    root.append_newline();

    let cluster = root.append_block(RESOURCE, &[CLUSTER, cluster_name]);
    cluster.set_attribute(NAME, cluster_name);

    let eks = cluster.append_block(EKS_CONFIG, &[]);
    eks.set_attribute(
        CLOUD_CREDENTIAL_ID,
        Value::traversal(&[CLOUD_CREDENTIAL, cluster_name, "id"]),
    );
    eks.set_attribute(REGION, &aws.region);
    eks.set_attribute(KUBERNETES_VERSION, &terratest.kubernetes_version);
    eks.set_attribute(SUBNETS, list_of_strings(&aws.aws_subnets));
    eks.set_attribute(SECURITY_GROUPS, list_of_strings(&aws.aws_security_groups));
    eks.set_attribute("private_access", aws.private_access);
    eks.set_attribute("public_access", aws.public_access);

    let prefix = if terraform.resource_prefix.is_empty() {
        cluster_name
    } else {
        terraform.resource_prefix.as_str()
    };

    for (index, pool) in terratest.nodepools.iter().enumerate() {
        let group = eks.append_block(NODE_GROUPS, &[]);
        group.set_attribute(NAME, format!("{prefix}-pool{index}"));
        group.set_attribute("disk_size", pool.disk_size);
        group.set_attribute("instance_type", &pool.instance_type);
        group.set_attribute("desired_size", pool.desired_size);
        group.set_attribute("max_size", pool.max_size);
        group.set_attribute("min_size", pool.min_size);
    }
    root.append_newline();

    if let Some(role) = &terratest.rbac_role {
        let cluster = ClusterRef {
            resource: format!("{CLUSTER}.{cluster_name}"),
            id: Value::traversal(&[CLUSTER, cluster_name, "id"]),
        };
        rbac::set_rbac(root, ctx, role, &cluster);
    }

    Ok(())
}
