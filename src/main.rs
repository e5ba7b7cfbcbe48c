//! cluster-guard
//!
//! Operator CLI for the transport security layer.
//!
//! ```text
//!   validate     load + validate a config file
//!   check-index  run the protected index guard offline
//!   watch        run the guard runtime and apply config reloads
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cluster_guard::audit::RequestSummary;
use cluster_guard::config::watcher::ConfigWatcher;
use cluster_guard::config::{load_config, GuardConfig};
use cluster_guard::lifecycle::{wait_for_signal, GuardRuntime, Shutdown};
use cluster_guard::observability::{logging, metrics};
use cluster_guard::privileges::{IndicesRequest, ProtectedIndexDecision, ResolvedIndices};

#[derive(Parser)]
#[command(name = "cluster-guard")]
#[command(about = "Security interception for the cluster transport layer", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "cluster-guard.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration
    Validate,
    /// Evaluate an index request against the protected index
    CheckIndex {
        /// Action name, e.g. indices:data/write/index
        #[arg(short, long)]
        action: String,

        /// Resolved target index (repeatable)
        #[arg(short, long = "index")]
        indices: Vec<String>,

        /// The request targets all indices
        #[arg(long)]
        all: bool,
    },
    /// Run the guard runtime and apply config changes until stopped
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Validate => {
            print_summary(&cli.config, &config);
            ExitCode::SUCCESS
        }
        Commands::CheckIndex { action, indices, all } => {
            let _ = logging::init_logging(&config.observability);
            check_index(config, &action, indices, all)
        }
        Commands::Watch => match watch(&cli.config, config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn print_summary(path: &Path, config: &GuardConfig) {
    println!("{}: ok", path.display());
    println!("  cluster          {}", config.cluster.name);
    println!("  protected index  {}", config.protected_index.name);
    println!("  filter mode      {}", config.protected_index.filter_mode);
    println!("  restore enabled  {}", config.protected_index.restore_enabled);
    println!("  node patterns    {}", config.transport.nodes_dn.len());
    println!("  principals       {}", config.authentication.principals.len());
    println!("  audit            {}", if config.audit.enabled { "on" } else { "off" });
}

fn check_index(config: GuardConfig, action: &str, indices: Vec<String>, all: bool) -> ExitCode {
    let runtime = GuardRuntime::build(config);

    let resolved = if all {
        ResolvedIndices::all()
    } else {
        ResolvedIndices::of(indices.iter().cloned())
    };
    let mut request = if all {
        IndicesRequest::new(["_all"])
    } else {
        IndicesRequest::new(indices)
    };
    let summary = RequestSummary {
        action: action.to_string(),
        request_class: "IndicesRequest".to_string(),
        ..RequestSummary::default()
    };

    let decision = runtime.protected_index.evaluate(action, &mut request, &resolved, &summary);
    println!("decision       {}", decision.as_str());
    println!("targets        {}", request.indices.join(","));
    println!("request_cache  {:?}", request.request_cache);
    println!("realtime       {:?}", request.realtime);

    match decision {
        ProtectedIndexDecision::Deny => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

async fn watch(path: &Path, config: GuardConfig) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cluster-guard starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let runtime = GuardRuntime::build(config);
    let shutdown = Shutdown::new();

    let (watcher, mut updates) = ConfigWatcher::new(path);
    let _watcher = watcher.run()?;

    let mut stop = shutdown.subscribe();
    let reloads = async {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(next) => {
                        runtime.apply_reload(&next);
                        tracing::info!("Configuration reloaded");
                    }
                    None => break,
                },
                _ = stop.recv() => break,
            }
        }
    };

    tokio::join!(reloads, async {
        wait_for_signal().await;
        shutdown.trigger();
    });

    tracing::info!(
        inflight = runtime.interceptor.inflight().active_count(),
        open_cursors = runtime.cursors.open_cursors(),
        "Shutdown complete"
    );
    Ok(())
}
