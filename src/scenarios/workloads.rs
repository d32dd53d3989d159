//! Nginx deployment, ClusterIP service and ingress used to check that a
//! restore really rolls the cluster back.

use serde_json::{Value, json};

use super::{Harness, ScenarioError};
use crate::rancher::types::SteveType;

pub(super) const DEFAULT_NAMESPACE: &str = "default";
pub(super) const INITIAL_WORKLOAD: &str = "wload-before-restore";
pub(super) const POST_BACKUP_WORKLOAD: &str = "wload-after-backup";
pub(super) const INITIAL_INGRESS: &str = "ingress-before-restore";

const SERVICE_PREFIX: &str = "service-";
const INGRESS_PATH: &str = "/index.html";
const WORKLOAD_SELECTOR: &str = "workload.user.cattle.io/workloadselector";
const CONTAINER: &str = "nginx";
const PORT: i64 = 80;

pub(super) fn service_name(workload: &str) -> String {
    format!("{SERVICE_PREFIX}{workload}")
}

fn selector(name: &str) -> Value {
    json!({ WORKLOAD_SELECTOR: format!("apps.deployment-{DEFAULT_NAMESPACE}-{name}") })
}

pub(super) fn deployment(name: &str) -> Value {
    json!({
        "metadata": {
            "name": name,
            "namespace": DEFAULT_NAMESPACE,
            "labels": { "cattle.io/creator": "norman" },
        },
        "spec": {
            "replicas": 1,
            "selector": { "matchLabels": selector(name) },
            "template": {
                "metadata": { "labels": selector(name) },
                "spec": {
                    "containers": [{
                        "name": CONTAINER,
                        "image": CONTAINER,
                        "imagePullPolicy": "Always",
                    }],
                },
            },
        },
    })
}

pub(super) fn service(workload: &str) -> Value {
    json!({
        "metadata": { "name": service_name(workload), "namespace": DEFAULT_NAMESPACE },
        "spec": {
            "type": "ClusterIP",
            "ports": [{ "name": "port", "port": PORT }],
            "selector": selector(workload),
        },
    })
}

pub(super) fn ingress(name: &str, workload: &str) -> Value {
    json!({
        "metadata": { "name": name, "namespace": DEFAULT_NAMESPACE },
        "spec": {
            "rules": [{
                "http": {
                    "paths": [{
                        "path": INGRESS_PATH,
                        "pathType": "Exact",
                        "backend": {
                            "service": {
                                "name": service_name(workload),
                                "port": { "number": PORT },
                            },
                        },
                    }],
                },
            }],
        },
    })
}

impl Harness {
    /// Creates `name` with its service and waits for it to become ready.
    pub(super) async fn create_workload(
        &self,
        cluster_id: &str,
        name: &str,
    ) -> Result<(), ScenarioError> {
        self.client
            .create_resource(cluster_id, SteveType::Deployment, &deployment(name))
            .await?;
        self.client
            .create_resource(cluster_id, SteveType::Service, &service(name))
            .await?;
        self.client
            .wait_deployment_ready(cluster_id, DEFAULT_NAMESPACE, name, &self.wait)
            .await?;
        tracing::info!(cluster = %cluster_id, workload = %name, "workload is ready");
        Ok(())
    }

    pub(super) async fn delete_workload(
        &self,
        cluster_id: &str,
        name: &str,
    ) -> Result<(), ScenarioError> {
        self.client
            .delete_resource(cluster_id, SteveType::Deployment, DEFAULT_NAMESPACE, name)
            .await?;
        self.client
            .delete_resource(cluster_id, SteveType::Service, DEFAULT_NAMESPACE, &service_name(name))
            .await?;
        Ok(())
    }

    /// Names of the deployments in the default namespace.
    pub(super) async fn deployment_names(&self, cluster_id: &str) -> Result<Vec<String>, ScenarioError> {
        Ok(self
            .client
            .list_resources(cluster_id, SteveType::Deployment, DEFAULT_NAMESPACE)
            .await?
            .into_iter()
            .map(|object| object.metadata.name)
            .collect())
    }
}
