//! giftai - personal assistant backend
//!
//! Serves the web client and forwards its chat, image and video requests to
//! Gemini, Groq, Freepik and pollinations.ai.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use giftai::config::{Config, KeySource};

#[derive(Parser)]
#[command(name = "giftai")]
#[command(about = "Personal assistant backend for chat, image and video generation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Optional TOML configuration file (environment only when omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Override listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Validate configuration and report where each key came from
    Check {
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Show which providers are usable
    Providers {
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn init_tracing(default_level: &str) {
    let default_filter = format!("giftai={},tower_http={}", default_level, default_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn configured(present: bool) -> &'static str {
    if present {
        "configured"
    } else {
        "missing"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = match &cli.command {
        Commands::Serve { config, .. }
        | Commands::Check { config }
        | Commands::Providers { config } => config.clone(),
    };

    let (mut config, key_sources) = Config::load(config_path.as_deref())?;
    init_tracing(&config.logging.level);

    match &dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env"),
        Err(e) => tracing::debug!(error = %e, "No .env loaded"),
    }

    match cli.command {
        Commands::Serve { listen, .. } => {
            if let Some(addr) = listen {
                tracing::info!(listen = %addr, "Override listen address");
                config.server.listen = addr;
            }

            giftai::proxy::run_server(config).await
        }

        Commands::Check { .. } => {
            println!("Configuration OK");
            println!("  listen:     {}", config.server.listen);
            println!("  static dir: {}", config.server.static_dir);
            for (key, source) in &key_sources {
                let note = match source {
                    KeySource::None => "not set".to_string(),
                    other => other.to_string(),
                };
                println!("  {:<18} {}", key, note);
            }
            Ok(())
        }

        Commands::Providers { .. } => {
            let p = &config.providers;
            println!("Chat");
            println!(
                "  gemini ({}): {}",
                p.gemini_model,
                configured(p.gemini_api_key.is_some())
            );
            println!(
                "  groq ({}): {}",
                p.groq_model,
                configured(p.groq_api_key.is_some())
            );
            println!("Image");
            println!("  freepik: {}", configured(p.freepik_api_key.is_some()));
            println!("  pollinations.ai: always available");
            println!("Video (placeholder)");
            println!("  {}", giftai::video::provider_label(p));
            Ok(())
        }
    }
}
