use serde::{Deserialize, Serialize};

pub const STATE_ACTIVE: &str = "active";
pub const FLEET_DEFAULT_NAMESPACE: &str = "fleet-default";

/// Norman (`/v3`) collection envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub transitioning: String,
    #[serde(default)]
    pub rancher_kubernetes_engine_config: Option<RkeConfig>,
    #[serde(default)]
    pub version: Option<VersionInfo>,
}

impl Cluster {
    pub fn is_active(&self) -> bool {
        self.state == STATE_ACTIVE && self.transitioning != "yes"
    }

    /// RKE1 clusters carry a management-side RKE config.
    pub fn is_rke1(&self) -> bool {
        self.rancher_kubernetes_engine_config.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RkeConfig {
    #[serde(default)]
    pub kubernetes_version: String,
    #[serde(default)]
    pub upgrade_strategy: Option<RkeUpgradeStrategy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RkeUpgradeStrategy {
    #[serde(default)]
    pub max_unavailable_controlplane: String,
    #[serde(default)]
    pub max_unavailable_worker: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    #[serde(default)]
    pub git_version: String,
}

/// `provisioning.cattle.io.cluster` as served by the steve (`/v1`) API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningCluster {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ProvisioningClusterSpec,
    #[serde(default)]
    pub status: ProvisioningClusterStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningClusterSpec {
    #[serde(default)]
    pub kubernetes_version: String,
    #[serde(default)]
    pub rke_config: Option<ProvisioningRkeConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningRkeConfig {
    #[serde(default)]
    pub upgrade_strategy: Option<ProvisioningUpgradeStrategy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningUpgradeStrategy {
    #[serde(default)]
    pub control_plane_concurrency: String,
    #[serde(default)]
    pub worker_concurrency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningClusterStatus {
    #[serde(default)]
    pub ready: bool,
    /// Management cluster ID (`c-m-xxxxx`).
    #[serde(default)]
    pub cluster_name: String,
}

impl ProvisioningCluster {
    pub fn upgrade_strategy(&self) -> ProvisioningUpgradeStrategy {
        self.spec
            .rke_config
            .as_ref()
            .and_then(|rke| rke.upgrade_strategy.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub etcd: bool,
    #[serde(default)]
    pub control_plane: bool,
    #[serde(default)]
    pub worker: bool,
}

/// RKE1 `etcdBackup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdBackup {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub state: String,
}

/// RKE2/K3s `rke.cattle.io.etcdsnapshot`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdSnapshot {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: EtcdSnapshotSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdSnapshotSpec {
    #[serde(default)]
    pub cluster_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub creation_timestamp: String,
}

/// Any steve object where only the metadata matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KubeObject {
    pub metadata: ObjectMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pod {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatus {
    pub name: String,
    #[serde(default)]
    pub state: ContainerState,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerState {
    #[serde(default)]
    pub waiting: Option<ContainerStateReason>,
    #[serde(default)]
    pub terminated: Option<ContainerStateReason>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerStateReason {
    #[serde(default)]
    pub reason: String,
}

impl Pod {
    /// Why this pod is unhealthy, if it is.
    pub fn status_error(&self) -> Option<String> {
        let name = format!("{}/{}", self.metadata.namespace, self.metadata.name);
        match self.status.phase.as_str() {
            "Running" | "Succeeded" => {}
            phase => return Some(format!("pod {name} is in phase {phase}")),
        }

        for container in &self.status.container_statuses {
            if let Some(waiting) = &container.state.waiting
                && waiting.reason != "ContainerCreating"
            {
                return Some(format!(
                    "pod {name} container {} is waiting: {}",
                    container.name, waiting.reason
                ));
            }
            if let Some(terminated) = &container.state.terminated
                && (terminated.reason == "Error" || terminated.reason == "OOMKilled")
            {
                return Some(format!(
                    "pod {name} container {} terminated: {}",
                    container.name, terminated.reason
                ));
            }
        }

        None
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Deployment {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DeploymentSpec,
    #[serde(default)]
    pub status: DeploymentStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentSpec {
    #[serde(default)]
    pub replicas: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    #[serde(default)]
    pub ready_replicas: i64,
    #[serde(default)]
    pub available_replicas: i64,
}

impl Deployment {
    pub fn is_ready(&self) -> bool {
        let wanted = self.spec.replicas.unwrap_or(1);
        self.status.ready_replicas >= wanted && self.status.available_replicas >= wanted
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Setting {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub default: String,
}

impl Setting {
    pub fn effective(&self) -> &str {
        if self.value.is_empty() {
            &self.default
        } else {
            &self.value
        }
    }
}

/// Steve resource types reachable through the downstream cluster proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteveType {
    Deployment,
    Service,
    Ingress,
    Pod,
}

impl SteveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SteveType::Deployment => "apps.deployments",
            SteveType::Service => "services",
            SteveType::Ingress => "networking.k8s.io.ingresses",
            SteveType::Pod => "pods",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_deserialize() {
        let cluster: Cluster = serde_json::from_value(serde_json::json!({
            "id": "c-abc12",
            "name": "tfp-abcde",
            "state": "active",
            "transitioning": "no",
            "rancherKubernetesEngineConfig": {
                "kubernetesVersion": "v1.28.9-rancher1-1",
                "upgradeStrategy": {"maxUnavailableControlplane": "1", "maxUnavailableWorker": "10%"}
            }
        }))
        .unwrap();

        assert!(cluster.is_active());
        assert!(cluster.is_rke1());
        let rke = cluster.rancher_kubernetes_engine_config.unwrap();
        assert_eq!(rke.kubernetes_version, "v1.28.9-rancher1-1");
        assert_eq!(rke.upgrade_strategy.unwrap().max_unavailable_worker, "10%");
    }

    #[test]
    fn test_transitioning_cluster_is_not_active() {
        let cluster = Cluster {
            state: "active".to_string(),
            transitioning: "yes".to_string(),
            ..Default::default()
        };
        assert!(!cluster.is_active());
    }

    #[test]
    fn test_pod_status_error() {
        let pod: Pod = serde_json::from_value(serde_json::json!({
            "metadata": {"name": "web-1", "namespace": "default"},
            "status": {
                "phase": "Running",
                "containerStatuses": [{"name": "nginx", "state": {"waiting": {"reason": "CrashLoopBackOff"}}}]
            }
        }))
        .unwrap();
        assert_eq!(
            pod.status_error().unwrap(),
            "pod default/web-1 container nginx is waiting: CrashLoopBackOff"
        );

        let pending: Pod = serde_json::from_value(serde_json::json!({
            "metadata": {"name": "web-2", "namespace": "default"},
            "status": {"phase": "Pending"}
        }))
        .unwrap();
        assert!(pending.status_error().unwrap().contains("phase Pending"));

        let healthy: Pod = serde_json::from_value(serde_json::json!({
            "metadata": {"name": "web-3", "namespace": "default"},
            "status": {"phase": "Succeeded"}
        }))
        .unwrap();
        assert!(healthy.status_error().is_none());
    }

    #[test]
    fn test_container_states() {
        let pod = |state: serde_json::Value| -> Pod {
            serde_json::from_value(serde_json::json!({
                "metadata": {"name": "web-1", "namespace": "default"},
                "status": {
                    "phase": "Running",
                    "containerStatuses": [{"name": "nginx", "state": state}]
                }
            }))
            .unwrap()
        };

        assert!(pod(serde_json::json!({"waiting": {"reason": "ContainerCreating"}}))
            .status_error()
            .is_none());
        assert!(pod(serde_json::json!({"terminated": {"reason": "Completed"}}))
            .status_error()
            .is_none());
        assert_eq!(
            pod(serde_json::json!({"terminated": {"reason": "OOMKilled"}}))
                .status_error()
                .unwrap(),
            "pod default/web-1 container nginx terminated: OOMKilled"
        );
    }

    #[test]
    fn test_deployment_ready() {
        let mut deployment = Deployment::default();
        assert!(!deployment.is_ready());
        deployment.status.ready_replicas = 1;
        deployment.status.available_replicas = 1;
        assert!(deployment.is_ready());
        deployment.spec.replicas = Some(3);
        assert!(!deployment.is_ready());
    }

    #[test]
    fn test_setting_falls_back_to_default() {
        let setting = Setting {
            value: String::new(),
            default: "v1.30.4+rke2r1".to_string(),
        };
        assert_eq!(setting.effective(), "v1.30.4+rke2r1");
    }
}
