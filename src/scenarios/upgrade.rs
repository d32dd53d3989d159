use super::{Harness, ScenarioError};

/// Whether a reported version satisfies the requested one. Hosted clusters
/// report a full build string (`v1.30.4-eks-a737599`) for a requested
/// minor version (`1.30`).
pub fn version_matches(actual: &str, expected: &str) -> bool {
    if actual == expected {
        return true;
    }
    let actual = actual.trim_start_matches('v');
    let expected = expected.trim_start_matches('v');
    !expected.is_empty()
        && actual.starts_with(expected)
        && actual[expected.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_ascii_digit())
}

impl Harness {
    /// `upgradedKubernetesVersion`, or the server default for the module's
    /// distribution when unset. The resolved value is kept on the config.
    pub async fn upgraded_kubernetes_version(&mut self) -> Result<String, ScenarioError> {
        let terratest = &mut self.configs.terratest;
        if terratest.upgraded_kubernetes_version.is_empty() {
            let distribution = self.configs.terraform.module.distribution();
            terratest.upgraded_kubernetes_version =
                self.client.default_kubernetes_version(distribution).await?;
        }
        Ok(terratest.upgraded_kubernetes_version.clone())
    }

    /// Version the server reports for the cluster: the provisioning spec
    /// for RKE2/K3s, the RKE config for RKE1, otherwise the live version.
    pub async fn current_kubernetes_version(&self, cluster_id: &str) -> Result<String, ScenarioError> {
        if let Some(cluster) = self.client.provisioning_cluster(self.cluster_name()).await? {
            if !cluster.spec.kubernetes_version.is_empty() {
                return Ok(cluster.spec.kubernetes_version);
            }
        }

        let cluster = self.client.cluster(cluster_id).await?;
        let rke1 = cluster
            .rancher_kubernetes_engine_config
            .map(|rke| rke.kubernetes_version)
            .filter(|version| !version.is_empty());
        Ok(rke1
            .or(cluster.version.map(|v| v.git_version))
            .unwrap_or_default())
    }

    /// Regenerates the configuration at the upgraded version, applies it
    /// and waits for the cluster to settle on that version.
    pub async fn kubernetes_upgrade(&mut self, cluster_id: &str) -> Result<String, ScenarioError> {
        let version = self.upgraded_kubernetes_version().await?;
        let previous = std::mem::replace(
            &mut self.configs.terratest.kubernetes_version,
            version.clone(),
        );
        tracing::info!(cluster = %cluster_id, from = %previous, to = %version, "upgrading kubernetes");

        self.regenerate()?;
        self.executor.apply().await?;
        self.client.wait_cluster_upgraded(cluster_id, &self.wait).await?;
        self.client.wait_all_nodes_active(cluster_id, &self.wait).await?;

        let actual = self.current_kubernetes_version(cluster_id).await?;
        if !version_matches(&actual, &version) {
            return Err(ScenarioError::mismatch("kubernetes version", version, actual));
        }
        self.check_pods(cluster_id).await?;

        tracing::info!(cluster = %cluster_id, version = %actual, "kubernetes upgraded");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::MockServer;

    use super::*;
    use crate::scenarios::test_support::{self, CLUSTER_ID};

    const TERRATEST: &str = "kubernetesVersion: v1.30.4+rke2r1\nnodepools: [{quantity: 1, etcd: true, controlplane: true, worker: true}]";

    #[test]
    fn test_version_matches() {
        assert!(version_matches("v1.30.4+rke2r1", "v1.30.4+rke2r1"));
        assert!(version_matches("v1.30.4-eks-a737599", "1.30"));
        assert!(!version_matches("v1.31.0-eks-a737599", "1.3"));
        assert!(!version_matches("v1.30.4+rke2r1", "v1.31.1+rke2r1"));
        assert!(!version_matches("v1.30.4", ""));
    }

    #[tokio::test]
    async fn test_upgrade_uses_configured_version() {
        let server = MockServer::start().await;
        test_support::mount_healthy_cluster(&server, json!(null)).await;
        test_support::mount_json(
            &server,
            "GET",
            "/v1/provisioning.cattle.io.clusters/fleet-default/tfp-abcde",
            json!({
                "metadata": {"name": "tfp-abcde", "namespace": "fleet-default"},
                "spec": {"kubernetesVersion": "v1.31.1+rke2r1"}
            }),
        )
        .await;
        let terratest = format!("{TERRATEST}\nupgradedKubernetesVersion: v1.31.1+rke2r1");
        let (mut harness, fake, _dir) = test_support::harness(&server, "ec2_rke2", &terratest);

        let version = harness.kubernetes_upgrade(CLUSTER_ID).await.unwrap();
        assert_eq!(version, "v1.31.1+rke2r1");
        assert_eq!(fake.calls(), ["apply"]);
        assert!(fake.applied()[0].contains("v1.31.1+rke2r1"));
        assert!(!fake.applied()[0].contains("v1.30.4+rke2r1"));
    }

    #[tokio::test]
    async fn test_upgrade_detects_version_mismatch() {
        let server = MockServer::start().await;
        test_support::mount_healthy_cluster(&server, json!({"kubernetesVersion": "v1.28.9-rancher1-1"})).await;
        test_support::mount_json(
            &server,
            "GET",
            "/v3/settings/k8s-version",
            json!({"value": "v1.29.4-rancher1-1"}),
        )
        .await;
        let terratest = "kubernetesVersion: v1.28.9-rancher1-1\nnodepools: [{quantity: 1, etcd: true, controlplane: true, worker: true}]";
        let (mut harness, _fake, _dir) = test_support::harness(&server, "ec2_rke1", terratest);

        let err = harness.kubernetes_upgrade(CLUSTER_ID).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "kubernetes version mismatch: expected v1.29.4-rancher1-1, found v1.28.9-rancher1-1"
        );
        assert_eq!(harness.configs.terratest.upgraded_kubernetes_version, "v1.29.4-rancher1-1");
    }
}
