//! WealthDesk server and CLI
//!
//! - `wealthdesk serve` - run the HTTP server
//! - `wealthdesk config [-o FILE]` - print or write a default config file
//! - `wealthdesk access ROLE PATH` - show the guard decision for a role and path

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wealthdesk::auth::required_roles_for;
use wealthdesk::config::{generate_default_config, LoggingConfig};
use wealthdesk::{get_redirect_path, serve, validate_role_access, AppState, Backend, Config, Role};

#[derive(Parser)]
#[command(name = "wealthdesk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Role-based wealth management service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show whether a role may open a path, and where it would be sent
    Access {
        /// Role label, e.g. "Wealth Partner"
        role: String,
        /// Dashboard path, e.g. /dashboard/admin/approvals
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = match &cli.config {
                Some(path) => Config::load_with_env(path),
                None => Config::load_default(),
            }
            .context("Failed to load configuration")?;

            init_logging(&config.logging);
            tracing::info!("Starting WealthDesk v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!(
                mode = %config.backend.mode,
                addr = %config.api.addr(),
                "Configuration loaded"
            );

            let backend =
                Backend::from_config(&config.backend).context("Failed to set up backend")?;
            serve(AppState::new(backend, config))
                .await
                .context("Server failed")?;
        }

        Commands::Config { output } => {
            let template = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, template)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote default config to {}", path.display());
                }
                None => print!("{}", template),
            }
        }

        Commands::Access { role, path } => {
            let allowed = validate_role_access(&role, &path);
            let restricted_to = required_roles_for(&path);
            let renders = allowed
                && match (role.parse::<Role>(), restricted_to) {
                    (Ok(role), Some(required)) => required.contains(&role),
                    _ => true,
                };

            println!("role:         {}", role);
            println!("path:         {}", path);
            println!("prefix match: {}", if allowed { "yes" } else { "no" });
            if let Some(required) = restricted_to {
                let names: Vec<&str> = required.iter().map(|r| r.as_str()).collect();
                println!("restricted:   {}", names.join(", "));
            }
            if renders {
                println!("decision:     render");
            } else {
                println!("decision:     redirect to {}", get_redirect_path(&role));
            }
        }
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("wealthdesk={0},tower_http={0}", config.level))
    });
    let registry = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
