//! Rancher REST API: authenticated client, token login and health waits.

mod client;
mod error;
mod token;
pub mod types;
mod wait;

pub use client::RancherClient;
pub use error::RancherError;
pub use token::{TokenApi, generate_user_token};
pub use wait::{SnapshotRef, WaitConfig};

/// `https://<host>` unless `host` already carries a scheme.
pub fn host_base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
