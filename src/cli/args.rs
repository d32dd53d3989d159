use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// YAML test configuration.
    #[arg(long, global = true, env = "CATTLE_TEST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write main.tf for the configured module without applying it.
    Generate(GenerateArgs),
    /// Provision a cluster and verify its state and workloads.
    Provision(RunArgs),
    /// Provision a cluster, then upgrade its Kubernetes version.
    Upgrade(RunArgs),
    /// Provision a cluster, then snapshot and restore etcd.
    SnapshotRestore(RunArgs),
    /// Stand up a Rancher server on three RKE2 hosts and keep it running.
    Standalone(ModuleArgs),
    /// Exchange a username and password for an API token.
    Token(TokenArgs),
    /// Destroy a module's resources and remove its generated files.
    Cleanup(ModuleArgs),
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Directory to write main.tf into (default: the rancher2 module).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print the block outline of the generated file.
    #[arg(long)]
    pub outline: bool,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Terraform module directory (default: under the home directory).
    #[arg(long)]
    pub module_dir: Option<PathBuf>,

    /// Keep the created resources regardless of `rancher.cleanup`.
    #[arg(long)]
    pub no_cleanup: bool,
}

#[derive(clap::Args, Debug)]
pub struct ModuleArgs {
    /// Terraform module directory (default: under the home directory).
    #[arg(long)]
    pub module_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct TokenArgs {
    /// Rancher host (default: `rancher.host` from the config).
    #[arg(long, env = "RANCHER_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "RANCHER_USERNAME")]
    pub username: String,

    #[arg(long, env = "RANCHER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Log in through /v3/token instead of /v1/token.
    #[arg(long)]
    pub v3: bool,
}
