//! prompt2json - CLI and HTTP server for the prompt enhancer

use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prompt2json::config::{Config, ConfigOverrides};
use prompt2json::enhancement_log::{self, LogEntry};
use prompt2json::enhancer::{EnhancerServer, PromptEnhancer};
use prompt2json::output;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "prompt2json", version)]
#[command(about = "Turn plain-text prompts into structured JSON")]
struct Args {
    /// JSON config file (falls back to $PROMPT2JSON_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append every enhancement to the configured log file
    #[arg(long, global = true)]
    enable_logging: bool,

    /// Maximum prompt length in characters
    #[arg(long, global = true)]
    max_length: Option<usize>,

    /// Minimum prompt length in characters
    #[arg(long, global = true)]
    min_length: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the /enhance endpoint for the browser extension
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Enhance one prompt and print the JSON record
    Enhance {
        /// Prompt text, or "-" to read stdin
        prompt: String,

        /// Single-line JSON instead of pretty output
        #[arg(long)]
        compact: bool,

        /// Also save the record; without a value a timestamped file under enhanced_prompts/ is used
        #[arg(long, num_args = 0..=1)]
        save: Option<Option<PathBuf>>,
    },
    /// Print the effective configuration
    PrintConfig,
}

fn init_tracing(level: LevelFilter) {
    // Logs go to stderr so stdout stays clean JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        max_prompt_length: args.max_length,
        min_prompt_length: args.min_length,
        log_level: args.log_level.clone(),
        enable_logging: args.enable_logging.then_some(true),
        log_file: None,
    };

    let config = match Config::resolve(args.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LevelFilter::INFO);
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.level_filter()?);

    if let Err(e) = run(args.command, config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command, config: Arc<Config>) -> Result<()> {
    match command {
        Command::Serve { host, port } => {
            let enhancer = Arc::new(PromptEnhancer::new(config));
            let server = EnhancerServer::bind(SocketAddr::new(host, port), enhancer).await?;

            info!("Starting prompt2json server");
            server
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for Ctrl-C: {}", e);
                    }
                })
                .await
        }
        Command::Enhance {
            prompt,
            compact,
            save,
        } => {
            let prompt = if prompt == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read prompt from stdin")?;
                buf
            } else {
                prompt
            };

            let enhancer = PromptEnhancer::new(config.clone());
            let record = match enhancer.enhance(&prompt) {
                Ok(record) => record,
                Err(e) => {
                    enhancement_log::log_entry(
                        &config,
                        &LogEntry::Rejected {
                            prompt: &prompt,
                            error: &e,
                        },
                    );
                    return Err(e.into());
                }
            };
            enhancement_log::log_entry(&config, &LogEntry::Enhanced(&record));

            let rendered = if compact {
                output::to_json_compact(&record)?
            } else {
                output::to_json_pretty(&record)?
            };
            println!("{}", rendered);

            if let Some(path) = save {
                output::save_record(&record, path.as_deref())?;
            }
            Ok(())
        }
        Command::PrintConfig => {
            println!("{}", serde_json::to_string_pretty(config.as_ref())?);
            Ok(())
        }
    }
}
