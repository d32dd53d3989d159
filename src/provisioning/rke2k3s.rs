use crate::config::{Distribution, Etcd, PrivateRegistries};
use crate::defaults::{
    CLOUD_CREDENTIAL, CLUSTER_V2, DEFAULT_POD_SECURITY_ADMISSION, DEPENDS_ON,
    ENABLE_NETWORK_POLICY, ETCD, KUBERNETES_VERSION, MACHINE_CONFIG_V2, NAME, REGISTRIES,
    RESOURCE, RKE_CONFIG, UPGRADE_STRATEGY,
};
use crate::hcl::{Body, Value};
use crate::providers::{self, ProviderError};

use super::rbac::{self, ClusterRef};
use super::{GenerateContext, ProvisioningError, pool_name, psact, snapshots, validate_nodepools};

const MACHINE_POOLS: &str = "machine_pools";
const MACHINE_CONFIG: &str = "machine_config";
const MACHINE_GLOBAL_CONFIG: &str = "machine_global_config";

/// RKE2/K3s node-driver cluster: cloud credential, machine config,
/// optional baseline PSACT and a `rancher2_cluster_v2` with one machine
/// pool per configured pool.
pub(super) fn set_rke2k3s(root: &mut Body, ctx: &GenerateContext<'_>) -> Result<(), ProvisioningError> {
    let terraform = &ctx.configs.terraform;
    let terratest = &ctx.configs.terratest;
    let cluster_name = ctx.cluster_name();
    let module = terraform.module;

    validate_nodepools(&terratest.nodepools)?;

    let provider_name = module
        .node_provider()
        .ok_or_else(|| ProviderError::UnknownProvider(module.to_string()))?;
    let provider = providers::get_provider(provider_name)?;

    let credential = root.append_block(RESOURCE, &[CLOUD_CREDENTIAL, cluster_name]);
    ctx.set_standard_user_provider(credential);
    credential.set_attribute(NAME, cluster_name);
    provider.set_credential_config(credential, terraform)?;
    root.append_newline();

    let machine_config = root.append_block(RESOURCE, &[MACHINE_CONFIG_V2, cluster_name]);
    machine_config.set_attribute("generate_name", &ctx.credentials.pool_name);
    provider.set_machine_config(machine_config, terraform)?;
    root.append_newline();

    let mut depends_on = Vec::new();
    if psact::is_baseline(&terratest.psact) {
        depends_on.push(psact::set_baseline_psact(root, cluster_name));
    }

    let cluster = root.append_block(RESOURCE, &[CLUSTER_V2, cluster_name]);
    if !depends_on.is_empty() {
        cluster.set_attribute(DEPENDS_ON, Value::references(depends_on));
    }
    set_cluster_v2_attributes(cluster, ctx);

    let rke_config = cluster.append_block(RKE_CONFIG, &[]);
    if module.distribution() == Distribution::Rke2 {
        rke_config.set_attribute(
            MACHINE_GLOBAL_CONFIG,
            format!("cni: {}\n", terraform.network_plugin),
        );
    }

    for (index, pool) in terratest.nodepools.iter().enumerate() {
        let machine_pool = rke_config.append_block(MACHINE_POOLS, &[]);
        machine_pool.set_attribute(NAME, pool_name(ctx, index));
        machine_pool.set_attribute(
            "cloud_credential_secret_name",
            Value::traversal(&[CLOUD_CREDENTIAL, cluster_name, "id"]),
        );
        machine_pool.set_attribute("control_plane_role", pool.controlplane);
        machine_pool.set_attribute("etcd_role", pool.etcd);
        machine_pool.set_attribute("worker_role", pool.worker);
        machine_pool.set_attribute("quantity", pool.quantity);

        let config_ref = machine_pool.append_block(MACHINE_CONFIG, &[]);
        config_ref.set_attribute("kind", Value::traversal(&[MACHINE_CONFIG_V2, cluster_name, "kind"]));
        config_ref.set_attribute(NAME, Value::traversal(&[MACHINE_CONFIG_V2, cluster_name, "name"]));
    }

    set_rke_config_extras(rke_config, ctx);
    root.append_newline();

    if let Some(role) = &terratest.rbac_role {
        rbac::set_rbac(root, ctx, role, &cluster_v2_ref(cluster_name));
    }

    Ok(())
}

/// Top-level `rancher2_cluster_v2` attributes shared with custom clusters.
pub(super) fn set_cluster_v2_attributes(cluster: &mut Body, ctx: &GenerateContext<'_>) {
    let terraform = &ctx.configs.terraform;
    let terratest = &ctx.configs.terratest;

    cluster.set_attribute(NAME, ctx.cluster_name());
    cluster.set_attribute(KUBERNETES_VERSION, &terratest.kubernetes_version);
    cluster.set_attribute(ENABLE_NETWORK_POLICY, terraform.enable_network_policy);
    if !terratest.psact.is_empty() {
        cluster.set_attribute(DEFAULT_POD_SECURITY_ADMISSION, &terratest.psact);
    }
}

/// Upgrade strategy, etcd settings, registries and snapshot requests; the
/// parts of `rke_config` that do not depend on how nodes are created.
pub(super) fn set_rke_config_extras(rke_config: &mut Body, ctx: &GenerateContext<'_>) {
    let terraform = &ctx.configs.terraform;
    let snapshot_input = &ctx.configs.terratest.snapshot_input;

    if snapshot_input.has_concurrency_values() {
        let strategy = rke_config.append_block(UPGRADE_STRATEGY, &[]);
        strategy.set_attribute(
            "control_plane_concurrency",
            &snapshot_input.control_plane_concurrency_value,
        );
        strategy.set_attribute("worker_concurrency", &snapshot_input.worker_concurrency_value);
    }

    if let Some(etcd) = &terraform.etcd {
        set_etcd(rke_config, etcd);
    }

    if let Some(registries) = &terraform.private_registries {
        set_registries(rke_config, registries);
    }

    snapshots::set_snapshot_blocks(rke_config, snapshot_input);
}

pub(super) fn cluster_v2_ref(cluster_name: &str) -> ClusterRef {
    ClusterRef {
        resource: format!("{CLUSTER_V2}.{cluster_name}"),
        id: Value::traversal(&[CLUSTER_V2, cluster_name, "cluster_v1_id"]),
    }
}

fn set_etcd(rke_config: &mut Body, etcd: &Etcd) {
    let etcd_block = rke_config.append_block(ETCD, &[]);
    etcd_block.set_attribute("disable_snapshots", etcd.disable_snapshots);
    if !etcd.snapshot_schedule_cron.is_empty() {
        etcd_block.set_attribute("snapshot_schedule_cron", &etcd.snapshot_schedule_cron);
    }
    if etcd.snapshot_retention > 0 {
        etcd_block.set_attribute("snapshot_retention", etcd.snapshot_retention);
    }

    if let Some(s3) = &etcd.s3_config {
        let s3_block = etcd_block.append_block("s3_config", &[]);
        s3_block.set_attribute("bucket", &s3.bucket_name);
        s3_block.set_attribute("endpoint", &s3.endpoint);
        s3_block.set_attribute("folder", &s3.folder);
        s3_block.set_attribute("region", &s3.region);
    }
}

fn set_registries(rke_config: &mut Body, registries: &PrivateRegistries) {
    let registry = rke_config.append_block(REGISTRIES, &[]);
    let configs = registry.append_block("configs", &[]);
    configs.set_attribute("hostname", &registries.url);
    configs.set_attribute("insecure", registries.insecure);

    if !registries.system_default_registry.is_empty() {
        rke_config
            .append_block("machine_selector_config", &[])
            .set_attribute(
                "config",
                format!("system-default-registry: {}\n", registries.system_default_registry),
            );
    }
}
