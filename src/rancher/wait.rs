//! Health checks that poll the API until the platform settles.

use std::time::Duration;

use super::types::STATE_ACTIVE;
use super::{RancherClient, RancherError};
use crate::retry::{
    FIVE_MINUTE_TIMEOUT, FIVE_SECOND_INTERVAL, PollConfig, TEN_SECOND_INTERVAL,
    THIRTY_MINUTE_TIMEOUT, poll_until,
};

/// Timeouts for the waits in this module.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    /// Long waits: cluster active, nodes ready, snapshots appearing.
    pub ready: PollConfig,
    /// How long to watch for an upgrade to start.
    pub transition: PollConfig,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            ready: PollConfig::new(TEN_SECOND_INTERVAL, THIRTY_MINUTE_TIMEOUT),
            transition: PollConfig::new(FIVE_SECOND_INTERVAL, FIVE_MINUTE_TIMEOUT),
        }
    }
}

impl WaitConfig {
    pub fn fast(interval: Duration, timeout: Duration) -> Self {
        let config = PollConfig::new(interval, timeout);
        Self {
            ready: config,
            transition: config,
        }
    }
}

/// Snapshot picked for a restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRef {
    /// Backup ID (RKE1) or snapshot object name (RKE2/K3s).
    pub name: String,
    pub count: usize,
}

impl RancherClient {
    pub async fn wait_cluster_active(
        &self,
        cluster_id: &str,
        wait: &WaitConfig,
    ) -> Result<(), RancherError> {
        let active: Result<(), RancherError> =
            poll_until(&wait.ready, &format!("cluster {cluster_id} active"), || async {
                let cluster = self.cluster(cluster_id).await?;
                Ok(cluster.is_active().then_some(()))
            })
            .await;
        active?;
        tracing::info!(cluster = %cluster_id, "cluster is active");
        Ok(())
    }

    /// Waits for the cluster to leave `active` and come back. An upgrade
    /// that finishes before the first check is treated as already done.
    pub async fn wait_cluster_upgraded(
        &self,
        cluster_id: &str,
        wait: &WaitConfig,
    ) -> Result<(), RancherError> {
        let started = poll_until(
            &wait.transition,
            &format!("cluster {cluster_id} to start updating"),
            || async {
                let cluster = self.cluster(cluster_id).await?;
                Ok((!cluster.is_active()).then_some(()))
            },
        )
        .await;

        match started {
            Ok(()) => tracing::info!(cluster = %cluster_id, "cluster is updating"),
            Err(RancherError::Timeout(_)) => {
                tracing::warn!(cluster = %cluster_id, "no transition observed, checking state")
            }
            Err(err) => return Err(err),
        }

        self.wait_cluster_active(cluster_id, wait).await
    }

    pub async fn wait_all_nodes_active(
        &self,
        cluster_id: &str,
        wait: &WaitConfig,
    ) -> Result<(), RancherError> {
        poll_until(&wait.ready, &format!("nodes of {cluster_id} active"), || async {
            let nodes = self.nodes(cluster_id).await?;
            let ready = !nodes.is_empty() && nodes.iter().all(|n| n.state == STATE_ACTIVE);
            Ok(ready.then_some(()))
        })
        .await
    }

    pub async fn etcd_node_count(&self, cluster_id: &str) -> Result<usize, RancherError> {
        Ok(self
            .nodes(cluster_id)
            .await?
            .iter()
            .filter(|n| n.etcd)
            .count())
    }

    /// One message per unhealthy pod; empty when all pods are healthy.
    pub async fn pod_status_errors(&self, cluster_id: &str) -> Result<Vec<String>, RancherError> {
        Ok(self
            .pods(cluster_id)
            .await?
            .iter()
            .filter_map(|p| p.status_error())
            .collect())
    }

    pub async fn wait_deployment_ready(
        &self,
        cluster_id: &str,
        namespace: &str,
        name: &str,
        wait: &WaitConfig,
    ) -> Result<(), RancherError> {
        poll_until(
            &wait.ready,
            &format!("deployment {namespace}/{name} ready"),
            || async {
                let deployment = self.deployment(cluster_id, namespace, name).await?;
                Ok(deployment.filter(|d| d.is_ready()).map(|_| ()))
            },
        )
        .await
    }

    /// Waits until at least `expected` RKE1 backups exist and returns the
    /// newest. Backups created in the same second are ordered by ID.
    pub async fn verify_rke1_snapshots(
        &self,
        cluster_id: &str,
        expected: usize,
        wait: &WaitConfig,
    ) -> Result<SnapshotRef, RancherError> {
        poll_until(
            &wait.ready,
            &format!("{expected} etcd backups of {cluster_id}"),
            || async {
                let backups = self.rke1_backups(cluster_id).await?;
                if backups.len() < expected {
                    return Ok(None);
                }
                let count = backups.len();
                Ok(backups
                    .into_iter()
                    .max_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)))
                    .map(|newest| SnapshotRef {
                        name: newest.id,
                        count,
                    }))
            },
        )
        .await
    }

    /// Waits until at least `expected` RKE2/K3s snapshots exist and returns
    /// the newest.
    pub async fn verify_rke2_snapshots(
        &self,
        cluster_name: &str,
        expected: usize,
        wait: &WaitConfig,
    ) -> Result<SnapshotRef, RancherError> {
        poll_until(
            &wait.ready,
            &format!("{expected} etcd snapshots of {cluster_name}"),
            || async {
                let snapshots = self.rke2_snapshots(cluster_name).await?;
                if snapshots.len() < expected {
                    return Ok(None);
                }
                let count = snapshots.len();
                Ok(snapshots
                    .into_iter()
                    .max_by(|a, b| {
                        a.metadata
                            .creation_timestamp
                            .cmp(&b.metadata.creation_timestamp)
                            .then_with(|| a.metadata.name.cmp(&b.metadata.name))
                    })
                    .map(|newest| SnapshotRef {
                        name: newest.metadata.name,
                        count,
                    }))
            },
        )
        .await
    }
}
