//! Tables printed at the end of a run.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::rancher::types::Cluster;
use crate::standalone::ServerAddresses;

#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct ClusterRow {
    #[tabled(rename = "CLUSTER")]
    pub name: String,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "STATE")]
    pub state: String,
    #[tabled(rename = "KUBERNETES")]
    pub version: String,
}

impl ClusterRow {
    pub fn new(cluster: &Cluster, version: impl Into<String>) -> Self {
        Self {
            name: cluster.name.clone(),
            id: cluster.id.clone(),
            state: cluster.state.clone(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct HostRow {
    #[tabled(rename = "HOST")]
    pub role: String,
    #[tabled(rename = "ADDRESS")]
    pub address: String,
}

pub fn clusters_table(rows: &[ClusterRow]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Server and registry addresses of a standalone Rancher install.
pub fn hosts_table(addresses: &ServerAddresses) -> String {
    let mut rows: Vec<HostRow> = addresses
        .public_dns()
        .iter()
        .enumerate()
        .map(|(i, dns)| HostRow {
            role: format!("rke2 server {}", i + 1),
            address: dns.to_string(),
        })
        .collect();
    if let Some(registry) = &addresses.registry_public_dns {
        rows.push(HostRow {
            role: "registry".to_string(),
            address: registry.clone(),
        });
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clusters_table() {
        let cluster = Cluster {
            id: "c-m-abcde".to_string(),
            name: "tfp-abcde".to_string(),
            state: "active".to_string(),
            ..Default::default()
        };
        let table = clusters_table(&[ClusterRow::new(&cluster, "v1.30.4+rke2r1")]);

        assert!(table.starts_with('╭'));
        for expected in ["CLUSTER", "KUBERNETES", "tfp-abcde", "c-m-abcde", "active", "v1.30.4+rke2r1"] {
            assert!(table.contains(expected), "missing {expected} in\n{table}");
        }
    }

    #[test]
    fn test_hosts_table_lists_registry_last() {
        let addresses = ServerAddresses {
            server_one_public_dns: "ec2-one".to_string(),
            server_one_private_ip: "10.0.0.11".to_string(),
            server_two_public_dns: "ec2-two".to_string(),
            server_three_public_dns: "ec2-three".to_string(),
            registry_public_dns: Some("ec2-registry".to_string()),
        };
        let table = hosts_table(&addresses);

        let one = table.find("ec2-one").unwrap();
        let three = table.find("ec2-three").unwrap();
        let registry = table.find("ec2-registry").unwrap();
        assert!(one < three && three < registry);
        assert!(!table.contains("10.0.0.11"));
    }
}
