mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, GenerateArgs, ModuleArgs, RunArgs, TokenArgs};
use tfpa::config::{CONFIG_ENVIRONMENT_KEY, ConfigError};
use tfpa::output::{self, ClusterRow};
use tfpa::provisioning::{self, GenerateContext};
use tfpa::rancher::{TokenApi, generate_user_token};
use tfpa::{
    Credentials, Harness, RancherClient, Terraform, TerraformExecutor, TfpConfigs, TfpaError,
    keypath, scenarios, standalone,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    Provision,
    Upgrade,
    SnapshotRestore,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Command::Generate(args) => generate(&load(config)?, &args)?,
        Command::Provision(args) => run(load(config)?, &args, Scenario::Provision).await?,
        Command::Upgrade(args) => run(load(config)?, &args, Scenario::Upgrade).await?,
        Command::SnapshotRestore(args) => {
            run(load(config)?, &args, Scenario::SnapshotRestore).await?
        }
        Command::Standalone(args) => run_standalone(&load(config)?, &args).await?,
        Command::Token(args) => token(config, &args).await?,
        Command::Cleanup(args) => {
            let dir = module_dir(args.module_dir.as_deref(), keypath::RANCHER_KEY_PATH);
            let terraform = Terraform::new(dir)?;
            scenarios::cleanup(&terraform, true).await?;
        }
    }

    Ok(())
}

fn load(path: Option<&Path>) -> Result<TfpConfigs, TfpaError> {
    let path = path.ok_or_else(|| {
        ConfigError::Missing(format!("--config or {CONFIG_ENVIRONMENT_KEY}"))
    })?;
    Ok(TfpConfigs::load(path)?)
}

fn module_dir(flag: Option<&Path>, default_key_path: &str) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| keypath::set_key_path(default_key_path))
}

fn generate(configs: &TfpConfigs, args: &GenerateArgs) -> Result<(), TfpaError> {
    let credentials = Credentials::random();
    let ctx = GenerateContext::new(configs, &credentials);
    let dir = module_dir(args.output_dir.as_deref(), keypath::RANCHER_KEY_PATH);

    let file = provisioning::config_tf(&ctx)?;
    let path = keypath::write_main_tf(&dir, &file.to_bytes())?;
    tracing::info!(path = %path.display(), cluster = %credentials.cluster_name, "wrote configuration");

    if args.outline {
        println!("{}", file.outline(&path.display().to_string()));
    }
    Ok(())
}

/// Provisions, runs the scenario and tears down. Cleanup runs even when
/// the scenario fails; the scenario's error wins.
async fn run(configs: TfpConfigs, args: &RunArgs, scenario: Scenario) -> Result<(), TfpaError> {
    let rancher = &configs.rancher;
    let client = RancherClient::new(&rancher.host, &rancher.admin_token, rancher.insecure)?;
    let cleanup_enabled = rancher.cleanup && !args.no_cleanup;
    let dir = module_dir(args.module_dir.as_deref(), keypath::RANCHER_KEY_PATH);
    let executor: Arc<dyn TerraformExecutor> = Arc::new(Terraform::new(dir)?);

    let mut harness = Harness::new(client, executor.clone(), configs, Credentials::random());
    tracing::info!(?scenario, cluster = %harness.cluster_name(), "starting");

    let result = run_scenario(&mut harness, scenario).await;
    if let Ok(rows) = &result {
        println!("{}", output::clusters_table(rows));
    }

    let cleaned = scenarios::cleanup(executor.as_ref(), cleanup_enabled).await;
    if let (Err(_), Err(err)) = (&result, &cleaned) {
        tracing::error!(error = %err, "cleanup failed");
    }

    result?;
    cleaned?;
    Ok(())
}

async fn run_scenario(
    harness: &mut Harness,
    scenario: Scenario,
) -> Result<Vec<ClusterRow>, TfpaError> {
    let cluster_ids = harness.provision().await?;
    harness.verify_clusters_state(&cluster_ids).await?;
    harness.verify_workloads(&cluster_ids).await?;

    for cluster_id in &cluster_ids {
        match scenario {
            Scenario::Provision => {}
            Scenario::Upgrade => {
                harness.kubernetes_upgrade(cluster_id).await?;
            }
            Scenario::SnapshotRestore => harness.snapshot_restore(cluster_id).await?,
        }
    }
    if scenario != Scenario::Provision {
        harness.verify_clusters_state(&cluster_ids).await?;
    }

    let mut rows = Vec::with_capacity(cluster_ids.len());
    for cluster_id in &cluster_ids {
        let cluster = harness.client.cluster(cluster_id).await?;
        let version = harness.current_kubernetes_version(cluster_id).await?;
        rows.push(ClusterRow::new(&cluster, version));
    }
    Ok(rows)
}

async fn run_standalone(configs: &TfpConfigs, args: &ModuleArgs) -> Result<(), TfpaError> {
    let default_key_path = if configs.terraform.standalone_registry.is_some() {
        keypath::REGISTRY_KEY_PATH
    } else {
        keypath::SANITY_KEY_PATH
    };
    let terraform = Terraform::new(module_dir(args.module_dir.as_deref(), default_key_path))?;

    let addresses = standalone::create_main_tf(&terraform, configs).await?;
    println!("{}", output::hosts_table(&addresses));
    Ok(())
}

async fn token(config: Option<&Path>, args: &TokenArgs) -> Result<(), TfpaError> {
    let host = match &args.host {
        Some(host) => host.clone(),
        None => load(config)?.rancher.host,
    };
    let api = if args.v3 { TokenApi::V3 } else { TokenApi::V1 };

    let token = generate_user_token(&host, &args.username, &args.password, api).await?;
    println!("{token}");
    Ok(())
}
