//! tfpa - Terraform provisioning automation
//!
//! Generates Terraform configuration for Rancher-managed clusters and drives
//! provisioning, upgrade and etcd snapshot scenarios against a live server.

pub mod config;
pub mod credentials;
pub mod hcl;
pub mod keypath;
pub mod output;
pub mod providers;
pub mod provisioning;
pub mod rancher;
pub mod retry;
pub mod scenarios;
pub mod standalone;
pub mod terraform;

mod defaults;
mod error;
mod infra;

pub use config::TfpConfigs;
pub use credentials::Credentials;
pub use error::TfpaError;
pub use rancher::RancherClient;
pub use scenarios::Harness;
pub use terraform::{Terraform, TerraformExecutor};
