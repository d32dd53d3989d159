use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::RancherError;
use super::host_base_url;
use super::types::{
    Cluster, Collection, Deployment, EtcdBackup, EtcdSnapshot, FLEET_DEFAULT_NAMESPACE,
    KubeObject, Node, Pod, ProvisioningCluster, Setting, SteveType,
};
use crate::config::Distribution;

/// Authenticated client for one Rancher server.
#[derive(Clone)]
pub struct RancherClient {
    client: reqwest::Client,
    base_url: String,
}

impl RancherClient {
    pub fn new(host: &str, token: &str, insecure: bool) -> Result<Self, RancherError> {
        Self::with_base_url(token, host_base_url(host), insecure)
    }

    /// NOTE: Primarily used for testing with mock servers.
    pub fn with_base_url(
        token: &str,
        base_url: String,
        insecure: bool,
    ) -> Result<Self, RancherError> {
        let mut headers = HeaderMap::new();
        let header_value =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| RancherError::Auth {
                message: "Invalid token format".to_string(),
            })?;
        headers.insert(AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(insecure)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RancherError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&message)
            .ok()
            .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(message);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RancherError::Auth { message });
        }
        Err(RancherError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, RancherError> {
        response.json().await.map_err(|e| RancherError::Decode {
            what: what.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RancherError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let response = Self::check(self.client.get(&url).send().await?).await?;
        Self::decode(response, path).await
    }

    /// Like `get_json`, but a 404 is `None`.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, RancherError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response).await?;
        Self::decode(response, path).await.map(Some)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RancherError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let response = Self::check(self.client.post(&url).json(body).send().await?).await?;
        Self::decode(response, path).await
    }

    async fn post_action<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), RancherError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        Self::check(self.client.post(&url).json(body).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), RancherError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "DELETE");
        let response = self.client.delete(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response).await?;
        Ok(())
    }

    // Clusters

    pub async fn cluster_by_name(&self, name: &str) -> Result<Cluster, RancherError> {
        let path = format!("/v3/clusters?name={}", urlencoding::encode(name));
        let clusters: Collection<Cluster> = self.get_json(&path).await?;
        clusters
            .data
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| RancherError::not_found("cluster", name))
    }

    pub async fn cluster_id_by_name(&self, name: &str) -> Result<String, RancherError> {
        Ok(self.cluster_by_name(name).await?.id)
    }

    pub async fn cluster(&self, id: &str) -> Result<Cluster, RancherError> {
        self.get_optional(&format!("/v3/clusters/{}", urlencoding::encode(id)))
            .await?
            .ok_or_else(|| RancherError::not_found("cluster", id))
    }

    /// The `provisioning.cattle.io.cluster` named `name` in `fleet-default`.
    /// RKE1 and imported clusters have none.
    pub async fn provisioning_cluster(
        &self,
        name: &str,
    ) -> Result<Option<ProvisioningCluster>, RancherError> {
        let path = format!(
            "/v1/provisioning.cattle.io.clusters/{FLEET_DEFAULT_NAMESPACE}/{}",
            urlencoding::encode(name)
        );
        self.get_optional(&path).await
    }

    pub async fn nodes(&self, cluster_id: &str) -> Result<Vec<Node>, RancherError> {
        let path = format!("/v3/nodes?clusterId={}", urlencoding::encode(cluster_id));
        let nodes: Collection<Node> = self.get_json(&path).await?;
        Ok(nodes.data)
    }

    pub async fn pods(&self, cluster_id: &str) -> Result<Vec<Pod>, RancherError> {
        let path = format!("{}/{}", proxy_prefix(cluster_id), SteveType::Pod.as_str());
        let pods: Collection<Pod> = self.get_json(&path).await?;
        Ok(pods.data)
    }

    // Snapshots

    pub async fn rke1_backups(&self, cluster_id: &str) -> Result<Vec<EtcdBackup>, RancherError> {
        let path = format!(
            "/v3/etcdBackups?clusterId={}",
            urlencoding::encode(cluster_id)
        );
        let backups: Collection<EtcdBackup> = self.get_json(&path).await?;
        Ok(backups.data)
    }

    pub async fn create_rke1_backup(&self, cluster_id: &str) -> Result<(), RancherError> {
        let path = format!(
            "/v3/clusters/{}?action=backupEtcd",
            urlencoding::encode(cluster_id)
        );
        tracing::info!(cluster = %cluster_id, "creating RKE1 etcd backup");
        self.post_action(&path, &serde_json::json!({})).await
    }

    pub async fn restore_rke1_backup(
        &self,
        cluster_id: &str,
        backup_id: &str,
        restore_rke_config: &str,
    ) -> Result<(), RancherError> {
        let path = format!(
            "/v3/clusters/{}?action=restoreFromEtcdBackup",
            urlencoding::encode(cluster_id)
        );
        tracing::info!(cluster = %cluster_id, backup = %backup_id, "restoring RKE1 etcd backup");
        self.post_action(
            &path,
            &serde_json::json!({
                "etcdBackupId": backup_id,
                "restoreRkeConfig": restore_rke_config,
            }),
        )
        .await
    }

    /// Snapshots of the provisioning cluster named `cluster_name`.
    pub async fn rke2_snapshots(
        &self,
        cluster_name: &str,
    ) -> Result<Vec<EtcdSnapshot>, RancherError> {
        let path = format!("/v1/rke.cattle.io.etcdsnapshots/{FLEET_DEFAULT_NAMESPACE}");
        let snapshots: Collection<EtcdSnapshot> = self.get_json(&path).await?;
        Ok(snapshots
            .data
            .into_iter()
            .filter(|s| s.spec.cluster_name == cluster_name)
            .collect())
    }

    // Settings

    pub async fn setting(&self, name: &str) -> Result<String, RancherError> {
        let setting: Setting = self
            .get_optional(&format!("/v3/settings/{}", urlencoding::encode(name)))
            .await?
            .ok_or_else(|| RancherError::not_found("setting", name))?;
        Ok(setting.effective().to_string())
    }

    /// Default Kubernetes version the server offers for a distribution.
    pub async fn default_kubernetes_version(
        &self,
        distribution: Distribution,
    ) -> Result<String, RancherError> {
        let setting = match distribution {
            Distribution::Rke1 => "k8s-version",
            Distribution::Rke2 => "rke2-default-version",
            Distribution::K3s => "k3s-default-version",
            Distribution::Eks => "eks-default-version",
        };
        let version = self.setting(setting).await?;
        if version.is_empty() {
            return Err(RancherError::not_found("setting value", setting));
        }
        Ok(version)
    }

    // Downstream workloads

    pub async fn create_resource(
        &self,
        cluster_id: &str,
        kind: SteveType,
        body: &serde_json::Value,
    ) -> Result<KubeObject, RancherError> {
        let path = format!("{}/{}", proxy_prefix(cluster_id), kind.as_str());
        self.post_json(&path, body).await
    }

    pub async fn list_resources(
        &self,
        cluster_id: &str,
        kind: SteveType,
        namespace: &str,
    ) -> Result<Vec<KubeObject>, RancherError> {
        let path = format!(
            "{}/{}/{}",
            proxy_prefix(cluster_id),
            kind.as_str(),
            urlencoding::encode(namespace)
        );
        let objects: Collection<KubeObject> = self.get_json(&path).await?;
        Ok(objects.data)
    }

    /// Deletes `namespace/name`. Already-gone objects are not an error.
    pub async fn delete_resource(
        &self,
        cluster_id: &str,
        kind: SteveType,
        namespace: &str,
        name: &str,
    ) -> Result<(), RancherError> {
        let path = format!(
            "{}/{}/{}/{}",
            proxy_prefix(cluster_id),
            kind.as_str(),
            urlencoding::encode(namespace),
            urlencoding::encode(name)
        );
        self.delete(&path).await
    }

    pub async fn deployment(
        &self,
        cluster_id: &str,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Deployment>, RancherError> {
        let path = format!(
            "{}/{}/{}/{}",
            proxy_prefix(cluster_id),
            SteveType::Deployment.as_str(),
            urlencoding::encode(namespace),
            urlencoding::encode(name)
        );
        self.get_optional(&path).await
    }
}

fn proxy_prefix(cluster_id: &str) -> String {
    format!("/k8s/clusters/{}/v1", urlencoding::encode(cluster_id))
}

impl std::fmt::Debug for RancherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RancherClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RancherClient::new("rancher.example.com", "token-abc:secret", true).unwrap();
        assert_eq!(client.api_base(), "https://rancher.example.com");
    }

    #[test]
    fn test_debug_does_not_expose_token() {
        let client = RancherClient::new("rancher.example.com", "token-abc:super-secret", false)
            .unwrap();
        let debug_output = format!("{:?}", client);

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret"));
    }

    #[test]
    fn test_invalid_token_is_auth_error() {
        let err = RancherClient::new("rancher.example.com", "bad\ntoken", false).unwrap_err();
        assert!(matches!(err, RancherError::Auth { .. }));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client =
            RancherClient::with_base_url("t", "http://127.0.0.1:8080/".to_string(), false)
                .unwrap();
        assert_eq!(client.api_base(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_proxy_prefix() {
        assert_eq!(proxy_prefix("c-m-abc"), "/k8s/clusters/c-m-abc/v1");
    }
}
