use super::{Harness, ScenarioError};
use crate::credentials::append_random_string;

impl Harness {
    /// Generates and applies the cluster configuration and returns the IDs
    /// of the clusters it created. An empty `kubernetesVersion` is filled
    /// with the server's default for the module's distribution.
    pub async fn provision(&mut self) -> Result<Vec<String>, ScenarioError> {
        if self.configs.terratest.kubernetes_version.is_empty() {
            let distribution = self.configs.terraform.module.distribution();
            let version = self.client.default_kubernetes_version(distribution).await?;
            tracing::info!(%distribution, %version, "using default kubernetes version");
            self.configs.terratest.kubernetes_version = version;
        }

        self.regenerate()?;
        self.executor.init_and_apply().await?;

        let cluster_id = self.client.cluster_id_by_name(self.cluster_name()).await?;
        tracing::info!(
            cluster = %self.cluster_name(),
            id = %cluster_id,
            module = %self.configs.terraform.module,
            "cluster provisioned"
        );
        Ok(vec![cluster_id])
    }

    /// Every cluster active, every node active and no unhealthy pods.
    pub async fn verify_clusters_state(&self, cluster_ids: &[String]) -> Result<(), ScenarioError> {
        for cluster_id in cluster_ids {
            self.client.wait_cluster_active(cluster_id, &self.wait).await?;
            self.client.wait_all_nodes_active(cluster_id, &self.wait).await?;
            self.check_pods(cluster_id).await?;
            tracing::info!(cluster = %cluster_id, "cluster state verified");
        }
        Ok(())
    }

    /// Schedules a throwaway workload on each cluster and removes it once
    /// it is ready.
    pub async fn verify_workloads(&self, cluster_ids: &[String]) -> Result<(), ScenarioError> {
        for cluster_id in cluster_ids {
            let name = append_random_string("wload-verify");
            self.create_workload(cluster_id, &name).await?;
            self.delete_workload(cluster_id, &name).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::scenarios::ScenarioError;
    use crate::scenarios::test_support::{self, CLUSTER_ID};

    const POOLS: &str = "nodepools: [{quantity: 1, etcd: true, controlplane: true, worker: true}]";

    async fn mount_cluster_lookup(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v3/clusters"))
            .and(query_param("name", "tfp-abcde"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": CLUSTER_ID, "name": "tfp-abcde", "state": "provisioning"}]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_provision_applies_and_returns_id() {
        let server = MockServer::start().await;
        mount_cluster_lookup(&server).await;
        let terratest = format!("kubernetesVersion: v1.28.9-rancher1-1\n{POOLS}");
        let (mut harness, fake, _dir) = test_support::harness(&server, "ec2_rke1", &terratest);

        let ids = harness.provision().await.unwrap();
        assert_eq!(ids, [CLUSTER_ID]);
        assert_eq!(fake.calls(), ["init", "apply"]);
        assert!(fake.applied()[0].contains(r#""v1.28.9-rancher1-1""#));
    }

    #[tokio::test]
    async fn test_provision_resolves_default_version() {
        let server = MockServer::start().await;
        mount_cluster_lookup(&server).await;
        test_support::mount_json(
            &server,
            "GET",
            "/v3/settings/rke2-default-version",
            json!({"value": "", "default": "v1.30.4+rke2r1"}),
        )
        .await;
        let (mut harness, fake, _dir) = test_support::harness(&server, "ec2_rke2", POOLS);

        harness.provision().await.unwrap();
        assert_eq!(harness.configs.terratest.kubernetes_version, "v1.30.4+rke2r1");
        assert!(fake.applied()[0].contains("v1.30.4+rke2r1"));
    }

    #[tokio::test]
    async fn test_verify_clusters_state() {
        let server = MockServer::start().await;
        test_support::mount_healthy_cluster(&server, json!(null)).await;
        let (harness, _fake, _dir) = test_support::harness(&server, "ec2_rke2", POOLS);

        harness
            .verify_clusters_state(&[CLUSTER_ID.to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_verify_clusters_state_times_out_on_inactive_node() {
        let server = MockServer::start().await;
        test_support::mount_json(
            &server,
            "GET",
            &format!("/v3/clusters/{CLUSTER_ID}"),
            json!({"id": CLUSTER_ID, "name": "tfp-abcde", "state": "active"}),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/v3/nodes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "m-1", "state": "provisioning", "etcd": true}]
            })))
            .mount(&server)
            .await;
        let (harness, _fake, _dir) = test_support::harness(&server, "ec2_rke2", POOLS);

        let err = harness
            .verify_clusters_state(&[CLUSTER_ID.to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Rancher(crate::rancher::RancherError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_verify_workloads_creates_and_deletes() {
        let server = MockServer::start().await;
        let proxy = format!("/k8s/clusters/{CLUSTER_ID}/v1");
        Mock::given(method("POST"))
            .and(path_regex(format!(r"^{proxy}/(apps\.deployments|services)$")))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "metadata": {"name": "wload-verify", "namespace": "default"}
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(format!(r"^{proxy}/apps\.deployments/default/wload-verify-[a-z0-9]+$")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": {"name": "wload-verify"},
                "spec": {"replicas": 1},
                "status": {"readyReplicas": 1, "availableReplicas": 1}
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path_regex(format!(r"^{proxy}/(apps\.deployments|services)/default/.+$")))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;
        let (harness, _fake, _dir) = test_support::harness(&server, "ec2_rke2", POOLS);

        harness
            .verify_workloads(&[CLUSTER_ID.to_string()])
            .await
            .unwrap();
    }
}
