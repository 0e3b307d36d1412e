//! AIDSCRO CLI
//!
//! Command-line front end for the same dashboard view the server hosts:
//! - Show feature importance
//! - Request a tabular prediction
//! - Request congestion hotspots for a city
//! - List optimisation strategies
//! - Check the prediction service

use aidscro::config::{generate_default_config, Config};
use aidscro::dashboard::{parse_assignments, DashboardView, FieldEdit, SubmitKind, SubmitOutcome};
use aidscro::render::render_text;
use aidscro::service::{ClientConfig, PredictionClient, PredictionService};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "aidscro-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Smart-city prediction dashboard")]
#[command(long_about = "Query the AIDSCRO prediction service from the terminal.\nTravel-time predictions, congestion hotspots, and optimisation strategies.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Prediction service URL (overrides config and AIDSCRO_SERVICE_URL)
    #[arg(long, global = true)]
    pub service_url: Option<String>,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Log at debug level (overrides the configured level)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show feature importance
    Importance,

    /// Request a travel-time prediction
    Predict {
        /// Form fields in name=value format (e.g. -F origin=Docks -F hour=8)
        #[arg(short = 'F', long = "field")]
        fields: Vec<String>,
    },

    /// Request congestion hotspots for a city
    City {
        /// City name
        name: String,
    },

    /// List optimisation strategies
    Strategies,

    /// Check the prediction service
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    apply_flags(&cli, &mut config);
    aidscro::logging::init(&config.logging, "");

    let client = Arc::new(PredictionClient::new(ClientConfig::new(
        config.service.base_url.clone(),
    ))?);

    match cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }

        Commands::Status => match client.status().await {
            Ok(message) => {
                println!("AIDSCRO CLI v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Service: {}", config.service.base_url);
                println!("Status: {}", message);
            }
            Err(e) => {
                eprintln!(
                    "Cannot reach prediction service at {}",
                    config.service.base_url
                );
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },

        Commands::Importance => {
            let mut view = DashboardView::new(client, config.dashboard.map_view());
            let outcome = view.mount().await;
            finish(&view, cli.format, outcome)?;
        }

        Commands::Predict { fields } => {
            let edits = match parse_assignments(&fields) {
                Ok(edits) => edits,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(2);
                }
            };

            let mut view = DashboardView::new(client, config.dashboard.map_view());
            for edit in edits {
                view.edit(edit);
            }
            let outcome = view.submit(SubmitKind::Tabular).await;
            finish(&view, cli.format, Some(outcome))?;
        }

        Commands::City { name } => {
            let mut view = DashboardView::new(client, config.dashboard.map_view());
            view.edit(FieldEdit::City(name));
            let outcome = view.submit(SubmitKind::City).await;
            finish(&view, cli.format, Some(outcome))?;
        }

        Commands::Strategies => {
            let mut view = DashboardView::new(client, config.dashboard.map_view());
            let outcome = view.load_strategies().await;
            finish(&view, cli.format, Some(outcome))?;
        }
    }

    Ok(())
}

/// Command-line flags win over the config file and environment
fn apply_flags(cli: &Cli, config: &mut Config) {
    if let Some(url) = &cli.service_url {
        config.service.base_url = url.clone();
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
}

/// Print the view and exit non-zero if the request failed
fn finish(
    view: &DashboardView,
    format: OutputFormat,
    outcome: Option<SubmitOutcome>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view.state())?),
        OutputFormat::Text => print!("{}", render_text(view.state())),
    }

    if let Some(SubmitOutcome::Failed(_)) = outcome {
        std::process::exit(1);
    }
    Ok(())
}
