use crate::config::{EtcdRke1, Module, PrivateRegistries};
use crate::defaults::{
    CLUSTER, CLUSTER_ID, CLUSTER_SYNC, DEFAULT_POD_SECURITY_ADMISSION, DEPENDS_ON,
    ENABLE_NETWORK_POLICY, ENGINE_INSECURE_REGISTRY, ETCD, KUBERNETES_VERSION, NAME, NETWORK,
    NODE_POOL, NODE_TEMPLATE, PLUGIN, RESOURCE, RKE1_PRIVATE_REGISTRIES, RKE_CONFIG, SERVICES,
    UPGRADE_STRATEGY,
};
use crate::hcl::{Body, Value};
use crate::providers::{self, ProviderError};

use super::rbac::{self, ClusterRef};
use super::{GenerateContext, ProvisioningError, pool_name, psact, validate_nodepools};

const NODE_TEMPLATE_ID: &str = "node_template_id";
const HOSTNAME_PREFIX: &str = "hostname_prefix";

/// RKE1 node-driver cluster: node template, optional baseline PSACT,
/// `rancher2_cluster`, one node pool per configured pool, cluster sync and
/// RBAC.
pub(super) fn set_rke1(root: &mut Body, ctx: &GenerateContext<'_>) -> Result<(), ProvisioningError> {
    let terraform = &ctx.configs.terraform;
    let terratest = &ctx.configs.terratest;
    let cluster_name = ctx.cluster_name();
    let module = terraform.module;

    validate_nodepools(&terratest.nodepools)?;

    let provider_name = module
        .node_provider()
        .ok_or_else(|| ProviderError::UnknownProvider(module.to_string()))?;
    let provider = providers::get_provider(provider_name)?;

    let template = root.append_block(RESOURCE, &[NODE_TEMPLATE, cluster_name]);
    template.set_attribute(NAME, &terraform.node_template_name);
    if let Some(registries) = &terraform.private_registries {
        template.set_attribute(ENGINE_INSECURE_REGISTRY, Value::strings([registries.url.as_str()]));
    }
    provider.set_node_template(template, terraform)?;
    root.append_newline();

    let mut depends_on = vec![format!("{NODE_TEMPLATE}.{cluster_name}")];
    if psact::is_baseline(&terratest.psact) {
        depends_on.push(psact::set_baseline_psact(root, cluster_name));
    }

    let cluster = root.append_block(RESOURCE, &[CLUSTER, cluster_name]);
    cluster.set_attribute(DEPENDS_ON, Value::references(depends_on));
    cluster.set_attribute(NAME, cluster_name);
    if !terratest.psact.is_empty() {
        cluster.set_attribute(DEFAULT_POD_SECURITY_ADMISSION, &terratest.psact);
    }
    if terraform.enable_network_policy {
        cluster.set_attribute(ENABLE_NETWORK_POLICY, true);
    }

    let rke_config = cluster.append_block(RKE_CONFIG, &[]);
    rke_config.set_attribute(KUBERNETES_VERSION, &terratest.kubernetes_version);
    rke_config
        .append_block(NETWORK, &[])
        .set_attribute(PLUGIN, &terraform.network_plugin);

    if let Some(registries) = &terraform.private_registries {
        if module == Module::Ec2Rke1 {
            set_private_registry(rke_config, registries);
        }
    }

    if let Some(etcd) = &terraform.etcd_rke1 {
        set_etcd_services(rke_config, etcd);
    }

    let snapshots = &terratest.snapshot_input;
    if snapshots.has_unavailable_values() {
        let strategy = rke_config.append_block(UPGRADE_STRATEGY, &[]);
        strategy.set_attribute(
            "max_unavailable_controlplane",
            &snapshots.control_plane_unavailable_value,
        );
        strategy.set_attribute("max_unavailable_worker", &snapshots.worker_unavailable_value);
    }
    root.append_newline();

    let cluster_id = Value::traversal(&[CLUSTER, cluster_name, "id"]);
    let mut node_pool_ids = Vec::with_capacity(terratest.nodepools.len());

    for (index, pool) in terratest.nodepools.iter().enumerate() {
        let name = pool_name(ctx, index);

        let node_pool = root.append_block(RESOURCE, &[NODE_POOL, &name]);
        node_pool.set_attribute(CLUSTER_ID, cluster_id.clone());
        node_pool.set_attribute(NAME, &name);
        node_pool.set_attribute(HOSTNAME_PREFIX, format!("{cluster_name}-{name}-"));
        node_pool.set_attribute(
            NODE_TEMPLATE_ID,
            Value::traversal(&[NODE_TEMPLATE, cluster_name, "id"]),
        );
        node_pool.set_attribute("quantity", pool.quantity);
        node_pool.set_attribute("control_plane", pool.controlplane);
        node_pool.set_attribute(ETCD, pool.etcd);
        node_pool.set_attribute("worker", pool.worker);
        root.append_newline();

        node_pool_ids.push(format!("{NODE_POOL}.{name}.id"));
    }

    let sync = root.append_block(RESOURCE, &[CLUSTER_SYNC, cluster_name]);
    sync.set_attribute(CLUSTER_ID, cluster_id.clone());
    sync.set_attribute("node_pool_ids", Value::references(node_pool_ids));
    sync.set_attribute("state_confirm", 2);
    root.append_newline();

    if let Some(role) = &terratest.rbac_role {
        let cluster = ClusterRef {
            resource: format!("{CLUSTER}.{cluster_name}"),
            id: cluster_id,
        };
        rbac::set_rbac(root, ctx, role, &cluster);
    }

    Ok(())
}

fn set_private_registry(rke_config: &mut Body, registries: &PrivateRegistries) {
    let registry = rke_config.append_block(RKE1_PRIVATE_REGISTRIES, &[]);
    registry.set_attribute("url", &registries.url);
    if !registries.username.is_empty() {
        registry.set_attribute("user", &registries.username);
        registry.set_attribute("password", &registries.password);
    }
    registry.set_attribute("is_default", true);
}

fn set_etcd_services(rke_config: &mut Body, etcd: &EtcdRke1) {
    let etcd_block = rke_config
        .append_block(SERVICES, &[])
        .append_block(ETCD, &[]);

    if let Some(backup) = &etcd.backup_config {
        let backup_block = etcd_block.append_block("backup_config", &[]);
        backup_block.set_attribute("enabled", backup.enabled);
        backup_block.set_attribute("interval_hours", backup.interval_hours);
        backup_block.set_attribute("safe_timestamp", backup.safe_timestamp);
        backup_block.set_attribute("timeout", backup.timeout);
        backup_block.set_attribute("retention", backup.retention);

        if let Some(s3) = &backup.s3_backup_config {
            let s3_block = backup_block.append_block("s3_backup_config", &[]);
            s3_block.set_attribute("access_key", &s3.access_key);
            s3_block.set_attribute("bucket_name", &s3.bucket_name);
            s3_block.set_attribute("endpoint", &s3.endpoint);
            s3_block.set_attribute("folder", &s3.folder);
            s3_block.set_attribute("region", &s3.region);
            s3_block.set_attribute("secret_key", &s3.secret_key);
        }
    }

    if !etcd.retention.is_empty() {
        etcd_block.set_attribute("retention", &etcd.retention);
    }
    etcd_block.set_attribute("snapshot", etcd.snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EtcdBackupConfig, Role};
    use crate::defaults::POD_SECURITY_ADMISSION;
    use crate::provisioning::test_support;

    const TERRATEST: &str = r#"
kubernetesVersion: v1.28.9-rancher1-1
psact: rancher-baseline
nodepools:
  - {quantity: 1, etcd: true}
  - {quantity: 1, controlplane: true}
  - {quantity: 2, worker: true}
"#;

    fn generate(configs: &crate::config::TfpConfigs) -> Body {
        let creds = test_support::credentials();
        let ctx = GenerateContext::new(configs, &creds);
        let mut root = Body::default();
        set_rke1(&mut root, &ctx).unwrap();
        root
    }

    #[test]
    fn test_cluster_depends_on_template_and_psact() {
        let configs = test_support::configs("ec2_rke1", TERRATEST);
        let root = generate(&configs);

        assert!(
            root.find_block(RESOURCE, &[POD_SECURITY_ADMISSION, "tfp-abcde"])
                .is_some()
        );
        let cluster = root.find_block(RESOURCE, &[CLUSTER, "tfp-abcde"]).unwrap().body();
        assert_eq!(
            cluster.attribute(DEPENDS_ON),
            Some(&Value::references([
                "rancher2_node_template.tfp-abcde",
                "rancher2_pod_security_admission_configuration_template.tfp-abcde",
            ]))
        );
        assert_eq!(
            cluster.attribute(DEFAULT_POD_SECURITY_ADMISSION),
            Some(&Value::string("rancher-baseline"))
        );
        let rke = cluster.find_block(RKE_CONFIG, &[]).unwrap().body();
        assert_eq!(
            rke.attribute(KUBERNETES_VERSION),
            Some(&Value::string("v1.28.9-rancher1-1"))
        );
    }

    #[test]
    fn test_node_pools_and_sync() {
        let configs = test_support::configs("ec2_rke1", TERRATEST);
        let root = generate(&configs);

        let worker = root
            .find_block(RESOURCE, &[NODE_POOL, "pool-fghij2"])
            .unwrap()
            .body();
        assert_eq!(worker.attribute("quantity"), Some(&Value::Number(2)));
        assert_eq!(worker.attribute("worker"), Some(&Value::Bool(true)));
        assert_eq!(worker.attribute(ETCD), Some(&Value::Bool(false)));

        let sync = root
            .find_block(RESOURCE, &[CLUSTER_SYNC, "tfp-abcde"])
            .unwrap()
            .body();
        assert_eq!(
            sync.attribute("node_pool_ids"),
            Some(&Value::references([
                "rancher2_node_pool.pool-fghij0.id",
                "rancher2_node_pool.pool-fghij1.id",
                "rancher2_node_pool.pool-fghij2.id",
            ]))
        );
        assert_eq!(sync.attribute("state_confirm"), Some(&Value::Number(2)));
    }

    #[test]
    fn test_private_registry_only_on_ec2() {
        let mut configs = test_support::configs("ec2_rke1", TERRATEST);
        configs.terraform.private_registries = Some(PrivateRegistries {
            url: "registry.example.com".to_string(),
            ..Default::default()
        });
        let root = generate(&configs);
        let template = root
            .find_block(RESOURCE, &[NODE_TEMPLATE, "tfp-abcde"])
            .unwrap()
            .body();
        assert_eq!(
            template.attribute(ENGINE_INSECURE_REGISTRY),
            Some(&Value::strings(["registry.example.com"]))
        );
        let cluster = root.find_block(RESOURCE, &[CLUSTER, "tfp-abcde"]).unwrap().body();
        let rke = cluster.find_block(RKE_CONFIG, &[]).unwrap().body();
        assert!(rke.find_block(RKE1_PRIVATE_REGISTRIES, &[]).is_some());

        configs.terraform.module = Module::LinodeRke1;
        let root = generate(&configs);
        let cluster = root.find_block(RESOURCE, &[CLUSTER, "tfp-abcde"]).unwrap().body();
        let rke = cluster.find_block(RKE_CONFIG, &[]).unwrap().body();
        assert!(rke.find_block(RKE1_PRIVATE_REGISTRIES, &[]).is_none());
    }

    #[test]
    fn test_etcd_backup_and_upgrade_strategy() {
        let mut configs = test_support::configs("ec2_rke1", TERRATEST);
        configs.terraform.etcd_rke1 = Some(EtcdRke1 {
            backup_config: Some(EtcdBackupConfig {
                enabled: true,
                interval_hours: 12,
                retention: 6,
                ..Default::default()
            }),
            retention: "72h".to_string(),
            snapshot: false,
        });
        configs.terratest.snapshot_input.control_plane_unavailable_value = "1".to_string();
        configs.terratest.snapshot_input.worker_unavailable_value = "10%".to_string();
        let root = generate(&configs);

        let cluster = root.find_block(RESOURCE, &[CLUSTER, "tfp-abcde"]).unwrap().body();
        let rke = cluster.find_block(RKE_CONFIG, &[]).unwrap().body();
        let etcd = rke
            .find_block(SERVICES, &[])
            .unwrap()
            .body()
            .find_block(ETCD, &[])
            .unwrap()
            .body();
        let backup = etcd.find_block("backup_config", &[]).unwrap().body();
        assert_eq!(backup.attribute("interval_hours"), Some(&Value::Number(12)));
        assert_eq!(etcd.attribute("retention"), Some(&Value::string("72h")));

        let strategy = rke.find_block(UPGRADE_STRATEGY, &[]).unwrap().body();
        assert_eq!(
            strategy.attribute("max_unavailable_worker"),
            Some(&Value::string("10%"))
        );
    }

    #[test]
    fn test_rbac_uses_v3_cluster_id() {
        let mut configs = test_support::configs("ec2_rke1", TERRATEST);
        configs.terratest.rbac_role = Some(Role::ClusterMember);
        let root = generate(&configs);

        let binding = root
            .find_block(
                RESOURCE,
                &[crate::defaults::CLUSTER_ROLE_TEMPLATE_BINDING, "testuser-klmno"],
            )
            .unwrap()
            .body();
        assert_eq!(
            binding.attribute(CLUSTER_ID),
            Some(&Value::expr("rancher2_cluster.tfp-abcde.id"))
        );
    }
}
