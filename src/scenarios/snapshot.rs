//! Etcd snapshot and restore: take a snapshot, change the cluster, restore
//! and check that the changes are gone.

use super::workloads::{self, DEFAULT_NAMESPACE, INITIAL_INGRESS, INITIAL_WORKLOAD, POST_BACKUP_WORKLOAD};
use super::{Harness, ScenarioError};
use crate::config::Distribution;
use crate::rancher::RancherError;
use crate::rancher::types::{ProvisioningCluster, RkeConfig, SteveType};

fn expect_eq(what: &str, expected: &str, actual: &str) -> Result<(), ScenarioError> {
    if expected == actual {
        return Ok(());
    }
    Err(ScenarioError::mismatch(what, expected, actual))
}

impl Harness {
    /// Runs the snapshot/restore flow for the cluster. RKE1 clusters are
    /// backed up and restored through the management API; RKE2/K3s
    /// clusters through generation counters in `main.tf`.
    pub async fn snapshot_restore(&mut self, cluster_id: &str) -> Result<(), ScenarioError> {
        self.create_workload(cluster_id, INITIAL_WORKLOAD).await?;
        self.client
            .create_resource(
                cluster_id,
                SteveType::Ingress,
                &workloads::ingress(INITIAL_INGRESS, INITIAL_WORKLOAD),
            )
            .await?;

        match self.client.provisioning_cluster(self.cluster_name()).await? {
            Some(_) => self.snapshot_restore_rke2(cluster_id).await?,
            None => {
                if !self.client.cluster(cluster_id).await?.is_rke1() {
                    return Err(RancherError::not_found("rke config of cluster", cluster_id).into());
                }
                self.snapshot_restore_rke1(cluster_id).await?
            }
        }

        tracing::info!(cluster = %cluster_id, "deleting restore workloads");
        self.delete_workload(cluster_id, INITIAL_WORKLOAD).await?;
        self.client
            .delete_resource(cluster_id, SteveType::Ingress, DEFAULT_NAMESPACE, INITIAL_INGRESS)
            .await?;
        Ok(())
    }

    async fn rke1_config(&self, cluster_id: &str) -> Result<RkeConfig, ScenarioError> {
        Ok(self
            .client
            .cluster(cluster_id)
            .await?
            .rancher_kubernetes_engine_config
            .ok_or_else(|| RancherError::not_found("rke config of cluster", cluster_id))?)
    }

    async fn current_provisioning_cluster(&self) -> Result<ProvisioningCluster, ScenarioError> {
        let name = self.cluster_name();
        Ok(self
            .client
            .provisioning_cluster(name)
            .await?
            .ok_or_else(|| RancherError::not_found("provisioning cluster", name))?)
    }

    async fn snapshot_restore_rke1(&mut self, cluster_id: &str) -> Result<(), ScenarioError> {
        let existing = self.client.rke1_backups(cluster_id).await?.len();
        self.client.create_rke1_backup(cluster_id).await?;

        let initial = self.rke1_config(cluster_id).await?;
        let initial_strategy = initial.upgrade_strategy.clone().unwrap_or_default();
        self.check_pods(cluster_id).await?;

        self.create_workload(cluster_id, POST_BACKUP_WORKLOAD).await?;

        let etcd_nodes = self.client.etcd_node_count(cluster_id).await?;
        let snapshot = self
            .client
            .verify_rke1_snapshots(cluster_id, etcd_nodes + existing, &self.wait)
            .await?;
        tracing::info!(cluster = %cluster_id, backup = %snapshot.name, count = snapshot.count, "etcd backup available");

        let input = self.configs.terratest.snapshot_input.clone();
        if input.restores_kubernetes_version() {
            let version = if input.upgrade_kubernetes_version.is_empty() {
                self.client.default_kubernetes_version(Distribution::Rke1).await?
            } else {
                input.upgrade_kubernetes_version.clone()
            };
            self.configs.terratest.snapshot_input.upgrade_kubernetes_version = version.clone();
            self.configs.terratest.kubernetes_version = version.clone();

            self.regenerate()?;
            self.executor.apply().await?;
            self.client.wait_cluster_upgraded(cluster_id, &self.wait).await?;
            self.client.wait_all_nodes_active(cluster_id, &self.wait).await?;
            self.check_pods(cluster_id).await?;

            let upgraded = self.rke1_config(cluster_id).await?;
            expect_eq("kubernetes version", &version, &upgraded.kubernetes_version)?;
            if input.has_unavailable_values() {
                let strategy = upgraded.upgrade_strategy.unwrap_or_default();
                expect_eq(
                    "max unavailable controlplane",
                    &input.control_plane_unavailable_value,
                    &strategy.max_unavailable_controlplane,
                )?;
                expect_eq(
                    "max unavailable worker",
                    &input.worker_unavailable_value,
                    &strategy.max_unavailable_worker,
                )?;
            }
            tracing::info!(cluster = %cluster_id, %version, "cluster upgraded");
        }

        for restore in 1..=input.recurring_restores {
            self.client
                .restore_rke1_backup(cluster_id, &snapshot.name, &input.snapshot_restore)
                .await?;
            self.client.wait_cluster_upgraded(cluster_id, &self.wait).await?;
            self.client.wait_all_nodes_active(cluster_id, &self.wait).await?;
            self.check_pods(cluster_id).await?;

            let restored = self.rke1_config(cluster_id).await?;
            expect_eq("kubernetes version", &initial.kubernetes_version, &restored.kubernetes_version)?;
            if input.restores_kubernetes_version() && input.has_unavailable_values() {
                let strategy = restored.upgrade_strategy.unwrap_or_default();
                expect_eq(
                    "max unavailable controlplane",
                    &initial_strategy.max_unavailable_controlplane,
                    &strategy.max_unavailable_controlplane,
                )?;
                expect_eq(
                    "max unavailable worker",
                    &initial_strategy.max_unavailable_worker,
                    &strategy.max_unavailable_worker,
                )?;
            }

            self.configs.terratest.kubernetes_version = initial.kubernetes_version.clone();
            tracing::info!(cluster = %cluster_id, restore, version = %restored.kubernetes_version, "cluster restored");
        }
        Ok(())
    }

    async fn snapshot_restore_rke2(&mut self, cluster_id: &str) -> Result<(), ScenarioError> {
        let name = self.cluster_name().to_string();
        let existing = self.client.rke2_snapshots(&name).await?.len();

        let input = &mut self.configs.terratest.snapshot_input;
        input.create_snapshot = true;
        input.create_generation += 1;
        self.regenerate()?;
        self.executor.apply().await?;
        self.client.wait_cluster_upgraded(cluster_id, &self.wait).await?;

        let initial = self.current_provisioning_cluster().await?;
        self.check_pods(cluster_id).await?;
        let initial_version = initial.spec.kubernetes_version.clone();
        let initial_strategy = initial.upgrade_strategy();

        self.create_workload(cluster_id, POST_BACKUP_WORKLOAD).await?;

        let etcd_nodes = self.client.etcd_node_count(cluster_id).await?;
        let snapshot = self
            .client
            .verify_rke2_snapshots(&name, etcd_nodes + existing, &self.wait)
            .await?;
        tracing::info!(cluster = %name, snapshot = %snapshot.name, count = snapshot.count, "etcd snapshot available");

        let input = self.configs.terratest.snapshot_input.clone();
        if input.restores_kubernetes_version() {
            let version = if input.upgrade_kubernetes_version.is_empty() {
                let distribution = self.configs.terraform.module.distribution();
                self.client.default_kubernetes_version(distribution).await?
            } else {
                input.upgrade_kubernetes_version.clone()
            };
            self.configs.terratest.snapshot_input.upgrade_kubernetes_version = version.clone();
            self.configs.terratest.snapshot_input.create_snapshot = false;
            self.configs.terratest.kubernetes_version = version.clone();

            self.regenerate()?;
            self.executor.apply().await?;
            self.client.wait_cluster_upgraded(cluster_id, &self.wait).await?;
            self.check_pods(cluster_id).await?;

            let upgraded = self.current_provisioning_cluster().await?;
            expect_eq("kubernetes version", &version, &upgraded.spec.kubernetes_version)?;
            if input.has_concurrency_values() {
                let strategy = upgraded.upgrade_strategy();
                expect_eq(
                    "control plane concurrency",
                    &input.control_plane_concurrency_value,
                    &strategy.control_plane_concurrency,
                )?;
                expect_eq(
                    "worker concurrency",
                    &input.worker_concurrency_value,
                    &strategy.worker_concurrency,
                )?;
            }
            tracing::info!(cluster = %name, %version, "cluster upgraded");
        }

        for restore in 1..=input.recurring_restores {
            let snapshots = &mut self.configs.terratest.snapshot_input;
            snapshots.create_snapshot = false;
            snapshots.restore_snapshot = true;
            snapshots.snapshot_name = snapshot.name.clone();
            snapshots.restore_generation += 1;

            self.regenerate()?;
            self.executor.apply().await?;
            self.client.wait_cluster_upgraded(cluster_id, &self.wait).await?;

            let restored = self.current_provisioning_cluster().await?;
            self.check_pods(cluster_id).await?;
            expect_eq("kubernetes version", &initial_version, &restored.spec.kubernetes_version)?;

            let deployments = self.deployment_names(cluster_id).await?;
            if deployments != [INITIAL_WORKLOAD] {
                return Err(ScenarioError::mismatch(
                    "deployments after restore",
                    INITIAL_WORKLOAD,
                    deployments.join(", "),
                ));
            }

            if input.restores_kubernetes_version() && input.has_concurrency_values() {
                let strategy = restored.upgrade_strategy();
                expect_eq(
                    "control plane concurrency",
                    &initial_strategy.control_plane_concurrency,
                    &strategy.control_plane_concurrency,
                )?;
                expect_eq(
                    "worker concurrency",
                    &initial_strategy.worker_concurrency,
                    &strategy.worker_concurrency,
                )?;
            }

            // Later regenerations must not re-apply the upgraded version.
            self.configs.terratest.kubernetes_version = initial_version.clone();
            tracing::info!(cluster = %name, restore, version = %restored.spec.kubernetes_version, "cluster restored");
        }
        Ok(())
    }
}
