use azure_outbound_network::azure::{ArmClient, InMemoryNetworkClient, NetworkClient};
use azure_outbound_network::config::{ClientAuth, MANAGEMENT_ENDPOINT};
use azure_outbound_network::models::{
    InfrastructureConfig, InfrastructureSpec, InfrastructureStatus,
};
use azure_outbound_network::output::{
    print_error_list, print_status, read_json_file, read_status, write_status,
};
use azure_outbound_network::validation::{
    validate_infrastructure_config, validate_infrastructure_config_update,
};
use azure_outbound_network::{reconcile, Error};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "azure-outbound-network")]
#[command(
    about = "Validate cluster network ranges and converge the outbound load balancer",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the network section of an infrastructure config
    Validate {
        /// Infrastructure config JSON file
        #[arg(short, long)]
        config: PathBuf,
        /// Cluster resource group
        #[arg(short = 'g', long)]
        resource_group: String,
        /// Cluster node range
        #[arg(long)]
        nodes: Option<String>,
        /// Cluster pod range
        #[arg(long)]
        pods: Option<String>,
        /// Cluster service range
        #[arg(long)]
        services: Option<String>,
        /// Previous config; its network section must not change
        #[arg(long)]
        old_config: Option<PathBuf>,
    },
    /// Run one reconciliation pass of the outbound public IP and load balancer
    Reconcile {
        /// Infrastructure config JSON file
        #[arg(short, long)]
        config: PathBuf,
        /// Cluster resource group
        #[arg(short = 'g', long)]
        resource_group: String,
        /// Azure region
        #[arg(short, long, env = "AZURE_REGION")]
        region: String,
        /// Status JSON file, read before and written after the pass
        #[arg(short, long)]
        status_file: Option<PathBuf>,
        /// Resource Manager endpoint
        #[arg(long, env = "AZURE_MANAGEMENT_ENDPOINT", default_value = MANAGEMENT_ENDPOINT)]
        endpoint: String,
        /// Run against an in-memory provider instead of Azure
        #[arg(long)]
        dry_run: bool,
        /// Existing public IP to seed the in-memory provider with
        #[arg(long, requires = "dry_run")]
        public_ip_file: Option<PathBuf>,
        /// Existing load balancer to seed the in-memory provider with
        #[arg(long, requires = "dry_run")]
        load_balancer_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Do as little as possible in main.rs as it can't contain any tests
    if let Err(e) = log4rs::init_file("log4rs.yml", Default::default()) {
        eprintln!("Error initializing log4rs: {e}");
    }
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate {
            config,
            resource_group,
            nodes,
            pods,
            services,
            old_config,
        } => validate(
            &config,
            &resource_group,
            nodes.as_deref(),
            pods.as_deref(),
            services.as_deref(),
            old_config.as_deref(),
        ),
        Commands::Reconcile {
            config,
            resource_group,
            region,
            status_file,
            endpoint,
            dry_run,
            public_ip_file,
            load_balancer_file,
        } => {
            let client = if dry_run {
                dry_run_client(&resource_group, public_ip_file, load_balancer_file)
            } else {
                arm_client(&endpoint)
            };
            match client {
                Ok(client) => {
                    run_reconcile(client.as_ref(), &config, &resource_group, &region, status_file)
                        .await
                }
                Err(e) => Err(e),
            }
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e}");
            eprintln!("#{}# {e}", "ERROR".on_red());
            if let Some(after) = e.requeue_after() {
                eprintln!("retry in {}s", after.as_secs());
            }
            ExitCode::FAILURE
        }
    }
}

fn arm_client(endpoint: &str) -> Result<Box<dyn NetworkClient>, Error> {
    let auth = ClientAuth::from_env()?;
    Ok(Box::new(ArmClient::new(&auth)?.with_endpoint(endpoint)))
}

fn validate(
    config: &Path,
    resource_group: &str,
    nodes: Option<&str>,
    pods: Option<&str>,
    services: Option<&str>,
    old_config: Option<&Path>,
) -> Result<bool, Error> {
    let infra: InfrastructureConfig = read_json_file("config", config)?;
    let mut errors = validate_infrastructure_config(&infra, resource_group, nodes, pods, services);
    if let Some(old_config) = old_config {
        let old: InfrastructureConfig = read_json_file("config", old_config)?;
        errors.extend(validate_infrastructure_config_update(&old, &infra));
    }
    Ok(print_error_list(&errors))
}

fn dry_run_client(
    resource_group: &str,
    public_ip_file: Option<PathBuf>,
    load_balancer_file: Option<PathBuf>,
) -> Result<Box<dyn NetworkClient>, Error> {
    let subscription =
        std::env::var("AZURE_SUBSCRIPTION_ID").unwrap_or_else(|_| "dry-run".to_string());
    let mut client = InMemoryNetworkClient::new(&subscription);
    if let Some(path) = public_ip_file {
        client = client.with_public_ip(resource_group, read_json_file("publicip", &path)?);
    }
    if let Some(path) = load_balancer_file {
        client = client.with_load_balancer(resource_group, read_json_file("loadbalancer", &path)?);
    }
    Ok(Box::new(client))
}

async fn run_reconcile(
    client: &dyn NetworkClient,
    config: &Path,
    resource_group: &str,
    region: &str,
    status_file: Option<PathBuf>,
) -> Result<bool, Error> {
    let infra: InfrastructureConfig = read_json_file("config", config)?;
    let spec = InfrastructureSpec::new(region, &infra);
    let mut status = match &status_file {
        Some(path) => read_status(path, resource_group)?,
        None => InfrastructureStatus::new(resource_group),
    };

    tokio::select! {
        result = reconcile(client, &spec, &mut status) => result?,
        _ = tokio::signal::ctrl_c() => {
            log::warn!("{} reconcile cancelled", "CTRL-C".on_red());
            return Ok(false);
        }
    }

    print_status(&status);
    if let Some(path) = &status_file {
        write_status(path, &status)?;
    }
    Ok(true)
}
