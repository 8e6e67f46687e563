//! agentdesk CLI entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agentdesk::ui;

#[derive(Parser)]
#[command(name = "agentdesk")]
#[command(about = "Token bridge and agent provisioning proxy")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Config file (defaults to ~/.agentdesk/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Bind address, overrides the config file
        #[arg(short, long)]
        bind: Option<String>,

        /// Port, overrides the config file
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show the effective configuration
    Status {
        /// Config file (defaults to ~/.agentdesk/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Where to write it (defaults to ~/.agentdesk/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, bind, port } => {
            let mut config = agentdesk::config::load(config.as_deref())?;
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }

            ui::print_header(config.provider_base(), &format!("{}:{}", config.bind, config.port));
            agentdesk::server::serve(config).await?;
        }

        Commands::Status { config } => {
            run_status(config)?;
        }

        Commands::Init { config } => {
            let path = config.unwrap_or_else(agentdesk::config::config_path);
            if agentdesk::config::init(&path)? {
                ui::print_success(&format!("Wrote default config to {:?}", path));
                ui::print_step("Set provider_url and api_key (or PROVIDER_URL / PROVIDER_API_KEY)");
            } else {
                ui::print_warning(&format!("Config already exists at {:?}", path));
            }
        }
    }

    Ok(())
}

fn run_status(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(agentdesk::config::config_path);
    let mut config = agentdesk::config::load_from(&path)?;
    config.apply_overrides(|key| std::env::var(key).ok())?;

    println!("agentdesk status\n");
    println!("Config file: {:?}", path);
    println!("Provider URL: {}", if config.provider_url.is_empty() { "not set" } else { config.provider_base() });
    println!("API key: {}", ui::presence(&config.api_key));
    println!("Listen: {}:{}", config.bind, config.port);
    println!("Agent tags: {} / {}", config.agent_provider, config.agent_model);
    println!("Knowledge base by default: {}", config.knowledge_base_by_default);
    println!("Compensate orphaned knowledge bases: {}", config.compensate_orphaned_knowledge_base);

    match config.validate() {
        Ok(()) => ui::print_success("Configuration is complete"),
        Err(e) => ui::print_error(&e.to_string()),
    }

    Ok(())
}
